//! Simulation Tick
//!
//! The deterministic game loop. One call to [`tick`] is one "step":
//!
//! 1. Deliver inbound signals (human frames, animation completions, resume)
//! 2. Run one fixed physics tick (commands, attack resolution, integration)
//! 3. Poll the round/match controller
//!
//! [`FrameStepper`] runs the same pieces at two rates: any number of fixed
//! physics ticks per rendered frame, then a single controller poll.

use tracing::trace;

use crate::core::fixed::{Fixed, TICK_DURATION};
use crate::game::combat::{HitReport, resolve_attack};
use crate::game::events::GameEvent;
use crate::game::fighter::{FighterId, Side};
use crate::game::input::{AnimationEvent, TickInputs};
use crate::game::replay::{MatchRecording, ReplayError};
use crate::game::round::update_round;
use crate::game::state::MatchState;

/// Result of a step.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this step
    pub events: Vec<GameEvent>,
    /// Hits resolved this step
    pub hits: Vec<HitReport>,
    /// Physics ticks run (0 while paused)
    pub physics_ticks: u32,
    /// Whether the match is over after this step
    pub match_over: bool,
    /// Winner, once the match is over
    pub winner: Option<Side>,
}

/// Run one step: deliver inputs, one physics tick, one controller poll.
///
/// # Determinism
///
/// Identical states fed identical inputs produce identical states:
/// - Fighters are processed in BTreeMap (id) order
/// - Fixed-point math only
/// - No system calls, no floating point
pub fn tick(state: &mut MatchState, inputs: &TickInputs) -> TickResult {
    deliver_inputs(state, inputs);
    let hits = physics_tick(state);
    let physics_ticks = u32::from(!state.paused);

    if !state.paused {
        update_round(state);
    }

    finish(state, hits, physics_ticks)
}

/// Apply inbound signals for this step.
///
/// Human frames update the held stick and queue attack presses even while
/// the fighter is disabled; the fighter itself decides whether to act on
/// them. Animation completions always apply.
pub fn deliver_inputs(state: &mut MatchState, inputs: &TickInputs) {
    let now = state.tick;

    if inputs.resume {
        state.resume();
    }

    // BTreeMap iterates in sorted key order
    for (fighter_id, frame) in &inputs.frames {
        if let Some(fighter) = state.fighters.get_mut(fighter_id) {
            fighter.input.receive_frame(frame);
        }
        if frame.pause_pressed() {
            state.request_pause();
        }
    }

    for (fighter_id, event) in &inputs.animation {
        apply_animation_event(state, *fighter_id, *event, now);
    }
}

/// Run one fixed physics tick. Does nothing while paused.
///
/// Every fighter first acts on its command; an attack activation is resolved
/// immediately, so a fighter later in id order may already be stunned when
/// its own turn comes. Movement is integrated for everyone afterwards.
pub fn physics_tick(state: &mut MatchState) -> Vec<HitReport> {
    if state.paused {
        return Vec::new();
    }

    state.tick += 1;
    let now = state.tick;
    let mut hits = Vec::new();

    let ids: Vec<FighterId> = state.fighters.keys().copied().collect();
    for id in ids {
        let target_position = state
            .fighters
            .get(&id)
            .and_then(|fighter| fighter.input.target())
            .and_then(|target| state.fighters.get(&target))
            .map(|target| target.position);

        let Some(fighter) = state.fighters.get_mut(&id) else {
            continue;
        };

        if !fighter.can_act() {
            fighter.input.discard_pending();
            continue;
        }

        let command = fighter.input.next_command(fighter.position, target_position, now);
        if fighter.apply_command(command, now, &mut state.pending_events) {
            hits.extend(resolve_attack(&mut state.fighters, id, now, &mut state.pending_events));
        }
    }

    let half_width = state.config.stage_half_width;
    let half_height = state.config.stage_half_height;
    for fighter in state.fighters.values_mut() {
        fighter.physics_step(half_width, half_height, now, &mut state.pending_events);
    }

    trace!(tick = now, hits = hits.len(), "physics tick");
    hits
}

fn apply_animation_event(state: &mut MatchState, fighter_id: FighterId, event: AnimationEvent, now: u32) {
    let Some(fighter) = state.fighters.get_mut(&fighter_id) else {
        return;
    };
    match event {
        AnimationEvent::AttackComplete => fighter.on_attack_complete(now, &mut state.pending_events),
        AnimationEvent::HitComplete => fighter.on_hit_complete(now, &mut state.pending_events),
    }
}

fn finish(state: &mut MatchState, hits: Vec<HitReport>, physics_ticks: u32) -> TickResult {
    TickResult {
        events: state.take_events(),
        hits,
        physics_ticks,
        match_over: state.is_match_over(),
        winner: state.round.winner(),
    }
}

// =============================================================================
// VARIABLE-RATE DRIVER
// =============================================================================

/// Runs fixed physics ticks against variable frame times.
///
/// Frame time is accumulated in fixed-point seconds; each whole
/// `TICK_DURATION` becomes one physics tick. The controller is polled once
/// per frame, after the frame's physics ticks.
#[derive(Clone, Debug)]
pub struct FrameStepper {
    accumulator: Fixed,
    max_ticks_per_frame: u32,
}

impl Default for FrameStepper {
    fn default() -> Self {
        Self::new(8)
    }
}

impl FrameStepper {
    /// Create a stepper that runs at most `max_ticks_per_frame` physics
    /// ticks per frame; time beyond that is dropped.
    pub fn new(max_ticks_per_frame: u32) -> Self {
        Self {
            accumulator: 0,
            max_ticks_per_frame: max_ticks_per_frame.max(1),
        }
    }

    /// Time carried over to the next frame.
    pub fn carried(&self) -> Fixed {
        self.accumulator
    }

    /// Advance by one rendered frame of `frame_time` seconds.
    pub fn advance(&mut self, state: &mut MatchState, inputs: &TickInputs, frame_time: Fixed) -> TickResult {
        deliver_inputs(state, inputs);

        self.accumulator = self.accumulator.saturating_add(frame_time.max(0));

        let mut hits = Vec::new();
        let mut physics_ticks = 0;
        while self.accumulator >= TICK_DURATION && physics_ticks < self.max_ticks_per_frame {
            if state.paused {
                break;
            }
            hits.extend(physics_tick(state));
            self.accumulator -= TICK_DURATION;
            physics_ticks += 1;
        }

        if state.paused || physics_ticks == self.max_ticks_per_frame {
            self.accumulator = self.accumulator.min(TICK_DURATION - 1);
        }

        if !state.paused {
            update_round(state);
        }

        finish(state, hits, physics_ticks)
    }
}

// =============================================================================
// REPLAY
// =============================================================================

/// Replay a recording from a fresh match.
///
/// Returns the final state and every event produced along the way.
pub fn replay_match(recording: &MatchRecording) -> Result<(MatchState, Vec<GameEvent>), ReplayError> {
    let mut state = MatchState::new(recording.config.clone());

    for fighter_id in recording.inputs.keys() {
        let human = state
            .get_fighter(*fighter_id)
            .map(|fighter| fighter.input.is_human())
            .unwrap_or(false);
        if !human {
            return Err(ReplayError::UnknownFighter(*fighter_id));
        }
    }

    let mut all_events = Vec::new();
    for step in 0..recording.total_steps {
        let inputs = recording.inputs_at(step);
        let result = tick(&mut state, &inputs);
        all_events.extend(result.events);
    }

    Ok((state, all_events))
}

/// Replay a recording and check it reproduces the recorded final hash.
pub fn verify_replay(recording: &MatchRecording) -> Result<MatchState, ReplayError> {
    let (state, _) = replay_match(recording)?;
    let actual = state.compute_hash();
    if actual != recording.final_hash {
        return Err(ReplayError::HashMismatch {
            expected: hex::encode(recording.final_hash),
            actual: hex::encode(actual),
        });
    }
    Ok(state)
}
