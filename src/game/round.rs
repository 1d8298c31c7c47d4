//! Round/Match Controller
//!
//! Polled once per frame after all physics ticks of that frame, so every
//! health change from the combat resolver is visible before the knockout
//! check runs.
//!
//! ```text
//! RoundStart ──countdown done──▶ InRound ──KO──▶ RoundEndPending ──delay──┬─▶ RoundEnd ──▶ RoundStart
//!                                                                         └─▶ MatchOver (terminal)
//! ```
//!
//! `RoundEndPending` is the pending-transition guard: while a delayed
//! transition is outstanding no further knockout can be scored. Round Tracks
//! are incremented when the knockout is detected, not when the delay ends.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::TICK_RATE;
use crate::core::hash::StateHasher;
use crate::game::events::{EventPriority, GameEvent, GameEventData, UiElement};
use crate::game::fighter::Side;
use crate::game::state::MatchState;
use crate::game::timer::{TimerToken, TransitionTimer};
use crate::game::track::RoundTrack;

// =============================================================================
// PHASES
// =============================================================================

/// How a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// One side knocked the other out
    Won(Side),
    /// Both sides were knocked out in the same poll; nobody scores
    Draw,
}

/// Where the delayed transition leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Replay: reset and count down again
    RoundEnd,
    /// `Side` reached the win threshold
    MatchOver(Side),
}

/// Round/match phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Fighters frozen at origin while the countdown runs
    RoundStart,
    /// Fighting
    InRound,
    /// Round decided, waiting for the delayed transition
    RoundEndPending {
        /// Result of the round
        outcome: RoundOutcome,
        /// Timer entry that ends the wait
        token: TimerToken,
    },
    /// Between rounds; always moves to RoundStart on the next poll
    RoundEnd,
    /// Terminal
    MatchOver {
        /// Match winner
        winner: Side,
    },
}

impl RoundPhase {
    /// Short name for logs and phase-change events.
    pub fn name(&self) -> &'static str {
        match self {
            RoundPhase::RoundStart => "RoundStart",
            RoundPhase::InRound => "InRound",
            RoundPhase::RoundEndPending { .. } => "RoundEndPending",
            RoundPhase::RoundEnd => "RoundEnd",
            RoundPhase::MatchOver { .. } => "MatchOver",
        }
    }

    fn code(&self) -> u8 {
        match self {
            RoundPhase::RoundStart => 0,
            RoundPhase::InRound => 1,
            RoundPhase::RoundEndPending { .. } => 2,
            RoundPhase::RoundEnd => 3,
            RoundPhase::MatchOver { .. } => 4,
        }
    }
}

// =============================================================================
// CONTROLLER STATE
// =============================================================================

/// Round/match bookkeeping owned by the controller.
#[derive(Clone, Debug)]
pub struct RoundController {
    /// Current phase
    pub phase: RoundPhase,
    /// Rounds won per side
    pub rounds: BTreeMap<Side, RoundTrack>,
    /// 1-based round counter (draws count as rounds)
    pub round_number: u32,
    /// Delayed transitions
    pub timer: TransitionTimer<Transition>,
    /// Tick at which the current countdown ends
    pub countdown_ends_at: Option<u32>,
    /// Tick at which the current round began
    pub round_started_at: Option<u32>,
    /// Tick at which the current match began (reset by `restart_match`)
    pub match_started_at: u32,
}

impl Default for RoundController {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundController {
    /// Fresh controller at RoundStart of round 1.
    pub fn new() -> Self {
        Self {
            phase: RoundPhase::RoundStart,
            rounds: Side::ALL.iter().map(|side| (*side, RoundTrack::default())).collect(),
            round_number: 1,
            timer: TransitionTimer::new(),
            countdown_ends_at: None,
            round_started_at: None,
            match_started_at: 0,
        }
    }

    /// Rounds won by `side`.
    pub fn rounds_won(&self, side: Side) -> u32 {
        self.rounds.get(&side).map(RoundTrack::rounds_won).unwrap_or(0)
    }

    /// True while a delayed round transition is outstanding.
    pub fn is_transition_pending(&self) -> bool {
        matches!(self.phase, RoundPhase::RoundEndPending { .. })
    }

    /// Winner once the match is over.
    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            RoundPhase::MatchOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub(crate) fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.phase.code());
        match self.phase {
            RoundPhase::RoundEndPending { outcome, token } => {
                match outcome {
                    RoundOutcome::Draw => hasher.update_u8(0),
                    RoundOutcome::Won(side) => hasher.update_u8(1 + side as u8),
                }
                hasher.update_bytes(&token.0.to_le_bytes());
                hasher.update_u32(self.timer.due_tick(token).unwrap_or(u32::MAX));
            }
            RoundPhase::MatchOver { winner } => hasher.update_u8(winner as u8),
            _ => {}
        }
        for track in self.rounds.values() {
            hasher.update_u32(track.rounds_won());
        }
        hasher.update_u32(self.round_number);
        hasher.update_u32(self.countdown_ends_at.unwrap_or(u32::MAX));
        hasher.update_u32(self.round_started_at.unwrap_or(u32::MAX));
        hasher.update_u32(self.match_started_at);
    }
}

// =============================================================================
// POLL
// =============================================================================

/// Poll the controller once.
///
/// Runs the current phase's handler, then fires any delayed transition that
/// has come due. A phase entered by a delayed transition is handled on the
/// next poll.
pub fn update_round(state: &mut MatchState) {
    let now = state.tick;

    match state.round.phase {
        RoundPhase::RoundStart => round_start(state, now),
        RoundPhase::InRound => in_round(state, now),
        RoundPhase::RoundEndPending { .. } => advance_round_timer(state, now),
        RoundPhase::RoundEnd => round_end(state, now),
        RoundPhase::MatchOver { .. } => match_over(state, now),
    }

    fire_due_transitions(state, now);
}

/// Reinitialize for a new match: cancel outstanding transitions, clear Round
/// Tracks and presentation state, and return to RoundStart.
pub fn restart_match(state: &mut MatchState) {
    let now = state.tick;

    if let RoundPhase::RoundEndPending { token, .. } = state.round.phase {
        if state.round.timer.cancel(token) {
            debug!(tick = now, token = token.0, "pending round transition cancelled");
        }
    }
    state.round.timer.cancel_all();
    for (side, track) in state.round.rounds.iter_mut() {
        track.reset();
        state.pending_events.push(round_indicator(now, *side, 0));
    }
    state.round.round_number = 1;
    state.round.countdown_ends_at = None;
    state.round.round_started_at = None;
    state.round.match_started_at = now;
    state.paused = false;

    freeze_at_origin(state, now);

    state.presentation.restore_defaults(now, &mut state.pending_events);
    set_phase(state, RoundPhase::RoundStart, now);
    info!(tick = now, "match restarted");
}

fn round_start(state: &mut MatchState, now: u32) {
    // Re-applied every poll; each call is a no-op once it has taken effect
    freeze_at_origin(state, now);

    state.round.round_started_at = None;
    state
        .presentation
        .set_visible(UiElement::CountdownPanel, true, now, &mut state.pending_events);

    let countdown_ticks = state.config.countdown_ticks;
    let ends_at = *state
        .round
        .countdown_ends_at
        .get_or_insert(now.saturating_add(countdown_ticks));
    let remaining = ends_at.saturating_sub(now);
    state
        .presentation
        .show_countdown(remaining.div_ceil(TICK_RATE), now, &mut state.pending_events);

    if remaining > 0 {
        return;
    }

    state
        .presentation
        .set_visible(UiElement::CountdownPanel, false, now, &mut state.pending_events);
    for fighter in state.fighters.values_mut() {
        fighter.set_enabled(true);
    }
    state.round.countdown_ends_at = None;
    state.round.round_started_at = Some(now);
    state.presentation.show_round_timer(0, now, &mut state.pending_events);

    info!(round = state.round.round_number, tick = now, "round started");
    set_phase(state, RoundPhase::InRound, now);
}

fn in_round(state: &mut MatchState, now: u32) {
    advance_round_timer(state, now);

    let one_out = side_knocked_out(state, Side::One);
    let two_out = side_knocked_out(state, Side::Two);

    let outcome = match (one_out, two_out) {
        (false, false) => return,
        (true, true) => RoundOutcome::Draw,
        (true, false) => RoundOutcome::Won(Side::Two),
        (false, true) => RoundOutcome::Won(Side::One),
    };

    let transition = match outcome {
        RoundOutcome::Won(side) => {
            let won = state
                .round
                .rounds
                .entry(side)
                .or_default()
                .add_round();
            state.pending_events.push(round_indicator(now, side, won));
            info!(
                winner = side.label(),
                rounds_won = won,
                round = state.round.round_number,
                tick = now,
                "round won"
            );

            if won >= state.config.rounds_to_win {
                let text = format!("{} WINS", side.label());
                state.presentation.announce(text, now, &mut state.pending_events);
                Transition::MatchOver(side)
            } else {
                Transition::RoundEnd
            }
        }
        RoundOutcome::Draw => {
            info!(round = state.round.round_number, tick = now, "double knockout, round drawn");
            Transition::RoundEnd
        }
    };

    state.pending_events.push(GameEvent::new(
        now,
        EventPriority::Round,
        GameEventData::RoundDecided { outcome },
    ));

    let token = state
        .round
        .timer
        .schedule(now, state.config.ko_transition_delay_ticks, transition);
    set_phase(state, RoundPhase::RoundEndPending { outcome, token }, now);
}

fn round_end(state: &mut MatchState, now: u32) {
    state.presentation.reset_timers(now, &mut state.pending_events);
    state.round.round_started_at = None;
    state.round.countdown_ends_at = None;
    state.round.round_number += 1;
    set_phase(state, RoundPhase::RoundStart, now);
}

fn match_over(state: &mut MatchState, now: u32) {
    state.presentation.stop_background_music(now, &mut state.pending_events);
    state.presentation.start_match_end_music(now, &mut state.pending_events);

    for fighter in state.fighters.values_mut() {
        fighter.halt();
        fighter.reset_animation(now, &mut state.pending_events);
        fighter.set_enabled(false);
    }

    state.paused = false;
    for element in [
        UiElement::RoundTimerPanel,
        UiElement::HealthBars,
        UiElement::PausePanel,
        UiElement::InstructionText,
    ] {
        state.presentation.set_visible(element, false, now, &mut state.pending_events);
    }
    state
        .presentation
        .set_visible(UiElement::EndOfMatchPanel, true, now, &mut state.pending_events);
}

fn advance_round_timer(state: &mut MatchState, now: u32) {
    if let Some(started) = state.round.round_started_at {
        let elapsed = now.saturating_sub(started) / TICK_RATE;
        state.presentation.show_round_timer(elapsed, now, &mut state.pending_events);
    }
}

fn fire_due_transitions(state: &mut MatchState, now: u32) {
    for (token, transition) in state.round.timer.poll(now) {
        let RoundPhase::RoundEndPending { token: pending, .. } = state.round.phase else {
            continue;
        };
        if pending != token {
            continue;
        }

        match transition {
            Transition::RoundEnd => set_phase(state, RoundPhase::RoundEnd, now),
            Transition::MatchOver(winner) => {
                set_phase(state, RoundPhase::MatchOver { winner }, now);
                state
                    .pending_events
                    .push(GameEvent::match_ended(now, winner, state.round.match_started_at));
                info!(winner = winner.label(), tick = now, "match over");
            }
        }
    }
}

/// Disable every fighter, put it back at its origin and refill its health.
fn freeze_at_origin(state: &mut MatchState, now: u32) {
    for fighter in state.fighters.values_mut() {
        fighter.set_enabled(false);
        fighter.reset_to_origin(now, &mut state.pending_events);
        if fighter.health.reset() {
            state.pending_events.push(GameEvent::health_display(
                now,
                fighter.id,
                fighter.health.remaining(),
                fighter.health.max(),
            ));
        }
    }
}

/// A side is out once every fighter on it has an empty Health Track.
fn side_knocked_out(state: &MatchState, side: Side) -> bool {
    let mut members = state.fighters.values().filter(|f| f.side == side).peekable();
    members.peek().is_some() && members.all(|f| f.health.is_empty())
}

fn round_indicator(tick: u32, side: Side, rounds_won: u32) -> GameEvent {
    GameEvent::new(
        tick,
        EventPriority::Presentation,
        GameEventData::RoundIndicator { side, rounds_won },
    )
}

fn set_phase(state: &mut MatchState, next: RoundPhase, now: u32) {
    let prev = state.round.phase;
    if prev == next {
        return;
    }
    state.round.phase = next;
    state.pending_events.push(GameEvent::phase_changed(now, prev.name(), next.name()));
}
