//! Fighter State Machine
//!
//! One type for every combatant. Human and CPU fighters differ only in the
//! [`InputSource`] injected at construction; movement, facing, attack
//! activation, hit reactions and death all run through the same code.
//!
//! ```text
//!            axis != 0             attack              AttackComplete
//!   Idle ────────────────▶ Moving ────────▶ Attacking ────────────────▶ Idle
//!     ▲        axis == 0     │                  │
//!     └──────────────────────┘                  │ hit
//!                                               ▼
//!   any non-Dead ─────── hit (health > 0) ───▶ Stunned ── HitComplete ──▶ Idle
//!   any ──────────────── hit (health == 0) ──▶ Dead (until reset)
//! ```

use serde::{Serialize, Deserialize};
use tracing::{debug, trace};

use crate::core::fixed::{Fixed, TICK_DURATION};
use crate::core::hash::StateHasher;
use crate::core::vec2::FixedVec2;
use crate::game::config::FighterConfig;
use crate::game::cpu::CpuPolicy;
use crate::game::events::{AnimFlag, AudioCue, GameEvent};
use crate::game::input::{FighterCommand, HumanInput, InputFrame};
use crate::game::track::HealthTrack;

// =============================================================================
// IDENTITY
// =============================================================================

/// Fighter identifier.
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FighterId(pub u8);

/// Which side a fighter fights for. Doubles as the collision group: a sweep
/// never hits a fighter on the attacker's own side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// Player 1
    One = 0,
    /// Player 2
    Two = 1,
}

impl Side {
    /// Both sides, in evaluation order.
    pub const ALL: [Side; 2] = [Side::One, Side::Two];

    /// The other side.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// Display name used in announcements.
    pub fn label(self) -> &'static str {
        match self {
            Side::One => "Player 1",
            Side::Two => "Player 2",
        }
    }
}

/// Horizontal facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Facing {
    /// Facing -X
    Left = 0,
    /// Facing +X
    Right = 1,
}

impl Facing {
    /// Unit vector the fighter is facing.
    #[inline]
    pub fn direction(self) -> FixedVec2 {
        match self {
            Facing::Left => FixedVec2::LEFT,
            Facing::Right => FixedVec2::RIGHT,
        }
    }

    /// Facing matching the sign of a horizontal velocity, if any.
    #[inline]
    pub fn from_velocity_x(x: Fixed) -> Option<Facing> {
        match x {
            x if x > 0 => Some(Facing::Right),
            x if x < 0 => Some(Facing::Left),
            _ => None,
        }
    }
}

/// Behavioral state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum FighterState {
    /// Standing still
    #[default]
    Idle = 0,
    /// Following the movement axis
    Moving = 1,
    /// Attack in progress; movement suppressed
    Attacking = 2,
    /// Hit reaction; movement suppressed
    Stunned = 3,
    /// Knocked out until the next reset
    Dead = 4,
}

impl FighterState {
    /// True if movement and attack requests are honored.
    #[inline]
    pub fn accepts_commands(self) -> bool {
        matches!(self, FighterState::Idle | FighterState::Moving)
    }
}

// =============================================================================
// INPUT SOURCE
// =============================================================================

/// Where a fighter's commands come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    /// Driven by the human input bindings
    Human(HumanInput),
    /// Driven by the CPU policy
    Cpu(CpuPolicy),
}

impl InputSource {
    /// Human source with a released stick.
    pub fn human() -> Self {
        InputSource::Human(HumanInput::default())
    }

    /// True for human-driven fighters.
    #[inline]
    pub fn is_human(&self) -> bool {
        matches!(self, InputSource::Human(_))
    }

    /// Fighter tracked by a CPU policy.
    pub fn target(&self) -> Option<FighterId> {
        match self {
            InputSource::Human(_) => None,
            InputSource::Cpu(policy) => Some(policy.target),
        }
    }

    /// Feed a frame from the input bindings. CPU sources ignore frames.
    pub fn receive_frame(&mut self, frame: &InputFrame) {
        if let InputSource::Human(human) = self {
            human.receive(frame);
        }
    }

    /// Produce this tick's command.
    ///
    /// A CPU source without a live target position stands still.
    pub fn next_command(
        &mut self,
        own_position: FixedVec2,
        target_position: Option<FixedVec2>,
        now: u32,
    ) -> FighterCommand {
        match self {
            InputSource::Human(human) => human.take_command(),
            InputSource::Cpu(policy) => match target_position {
                Some(target) => policy.decide(own_position, target, now),
                None => FighterCommand::default(),
            },
        }
    }

    /// Drop an attack press that arrived while the fighter could not act.
    pub fn discard_pending(&mut self) {
        if let InputSource::Human(human) = self {
            human.attack_pending = false;
        }
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        match self {
            InputSource::Human(human) => {
                hasher.update_u8(0);
                hasher.update_vec2(human.axis);
                hasher.update_bool(human.attack_pending);
            }
            InputSource::Cpu(policy) => {
                hasher.update_u8(1);
                hasher.update_u8(policy.target.0);
                hasher.update_u32(policy.last_attack_tick);
            }
        }
    }
}

// =============================================================================
// FIGHTER
// =============================================================================

/// One combatant.
#[derive(Clone, Debug)]
pub struct Fighter {
    /// Fighter ID
    pub id: FighterId,

    /// Collision group
    pub side: Side,

    /// Command source
    pub input: InputSource,

    /// Movement speed (units/second)
    pub speed: Fixed,

    /// Attack sweep length
    pub attack_range: Fixed,

    /// Attack sweep radius
    pub attack_radius: Fixed,

    /// Body radius for hit tests
    pub body_radius: Fixed,

    /// Current position (bounds center)
    pub position: FixedVec2,

    /// Current velocity
    pub velocity: FixedVec2,

    /// Current facing
    pub facing: Facing,

    /// Behavioral state
    pub state: FighterState,

    /// Whether the fighter currently accepts commands and moves
    pub enabled: bool,

    /// Pose restored by `reset_to_origin`
    pub origin_position: FixedVec2,

    /// Facing restored by `reset_to_origin`
    pub origin_facing: Facing,

    /// Last movement axis received
    pub move_axis: FixedVec2,

    /// Current value of the Run animation flag
    pub run_flag: bool,

    /// Remaining hits this round
    pub health: HealthTrack,
}

impl Fighter {
    /// Create a fighter at its origin pose, Idle and disabled.
    pub fn new(
        id: FighterId,
        side: Side,
        input: InputSource,
        config: &FighterConfig,
        origin_position: FixedVec2,
        origin_facing: Facing,
    ) -> Self {
        Self {
            id,
            side,
            input,
            speed: config.speed,
            attack_range: config.attack_range,
            attack_radius: config.attack_radius,
            body_radius: config.body_radius,
            position: origin_position,
            velocity: FixedVec2::ZERO,
            facing: origin_facing,
            state: FighterState::Idle,
            enabled: false,
            origin_position,
            origin_facing,
            move_axis: FixedVec2::ZERO,
            run_flag: false,
            health: HealthTrack::new(config.max_health),
        }
    }

    /// True if the fighter can move and attack this tick.
    #[inline]
    pub fn can_act(&self) -> bool {
        self.enabled && self.state != FighterState::Dead
    }

    /// True unless knocked out.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state != FighterState::Dead
    }

    /// Current (Run, Attacking, Stunned) animation flags.
    pub fn anim_flags(&self) -> (bool, bool, bool) {
        (
            self.run_flag,
            self.state == FighterState::Attacking,
            self.state == FighterState::Stunned,
        )
    }

    /// Apply one tick's command.
    ///
    /// Returns true if an attack activated, in which case the caller must run
    /// the combat resolver for this fighter exactly once.
    pub fn apply_command(&mut self, command: FighterCommand, tick: u32, events: &mut Vec<GameEvent>) -> bool {
        if !self.can_act() {
            return false;
        }

        self.move_axis = command.axis;

        if !self.state.accepts_commands() {
            return false;
        }

        self.state = if command.axis.is_zero() {
            FighterState::Idle
        } else {
            FighterState::Moving
        };

        if command.attack {
            return self.try_begin_attack(tick, events);
        }
        false
    }

    /// Enter Attacking if currently Idle or Moving.
    pub fn try_begin_attack(&mut self, tick: u32, events: &mut Vec<GameEvent>) -> bool {
        if !self.can_act() || !self.state.accepts_commands() {
            return false;
        }

        self.transition(FighterState::Attacking, tick, events);
        self.velocity = FixedVec2::ZERO;
        events.push(GameEvent::audio(tick, Some(self.id), AudioCue::AttackActivated));
        debug!(fighter = self.id.0, tick, "attack activated");
        true
    }

    /// "Attack animation complete" from the animation collaborator.
    pub fn on_attack_complete(&mut self, tick: u32, events: &mut Vec<GameEvent>) {
        if self.state == FighterState::Attacking {
            self.transition(FighterState::Idle, tick, events);
        }
    }

    /// Hit that left health remaining. Cancels an attack in progress.
    pub fn on_hit(&mut self, tick: u32, events: &mut Vec<GameEvent>) {
        if self.state == FighterState::Dead {
            return;
        }

        self.transition(FighterState::Stunned, tick, events);
        self.velocity = FixedVec2::ZERO;
        events.push(GameEvent::audio(tick, Some(self.id), AudioCue::HitReceived));
    }

    /// "Hit animation complete" from the animation collaborator.
    pub fn on_hit_complete(&mut self, tick: u32, events: &mut Vec<GameEvent>) {
        if self.state == FighterState::Stunned {
            self.transition(FighterState::Idle, tick, events);
        }
    }

    /// Hit that emptied health. Idempotent: returns false if already Dead.
    pub fn on_death(&mut self, tick: u32, events: &mut Vec<GameEvent>) -> bool {
        if self.state == FighterState::Dead {
            return false;
        }

        self.transition(FighterState::Dead, tick, events);
        self.velocity = FixedVec2::ZERO;
        self.set_run_flag(false, tick, events);
        events.push(GameEvent::death_triggered(tick, self.id));
        events.push(GameEvent::audio(tick, Some(self.id), AudioCue::Death));
        debug!(fighter = self.id.0, tick, "fighter died");
        true
    }

    /// Fixed-rate movement update: velocity, facing, integration, Run flag.
    pub fn physics_step(
        &mut self,
        half_width: Fixed,
        half_height: Fixed,
        tick: u32,
        events: &mut Vec<GameEvent>,
    ) {
        if !self.can_act() {
            self.velocity = FixedVec2::ZERO;
            self.set_run_flag(false, tick, events);
            return;
        }

        self.velocity = match self.state {
            FighterState::Idle | FighterState::Moving => {
                self.move_axis.normalize().scale(self.speed)
            }
            FighterState::Attacking | FighterState::Stunned | FighterState::Dead => FixedVec2::ZERO,
        };

        if self.state.accepts_commands() {
            if let Some(facing) = Facing::from_velocity_x(self.velocity.x) {
                self.facing = facing;
            }
        }

        let displacement = self.velocity.scale(TICK_DURATION);
        self.position = (self.position + displacement).clamp_within(half_width, half_height);

        self.set_run_flag(!self.velocity.is_zero(), tick, events);
        trace!(fighter = self.id.0, tick, position = %self.position, "physics step");
    }

    /// Return to the origin pose and Idle; clears Dead.
    pub fn reset_to_origin(&mut self, tick: u32, events: &mut Vec<GameEvent>) {
        self.transition(FighterState::Idle, tick, events);
        self.position = self.origin_position;
        self.facing = self.origin_facing;
        self.velocity = FixedVec2::ZERO;
        self.move_axis = FixedVec2::ZERO;
        self.set_run_flag(false, tick, events);
        self.input.discard_pending();
    }

    /// Clear every animation flag. A Dead fighter stays Dead.
    pub fn reset_animation(&mut self, tick: u32, events: &mut Vec<GameEvent>) {
        if matches!(self.state, FighterState::Attacking | FighterState::Stunned) {
            self.transition(FighterState::Idle, tick, events);
        }
        self.set_run_flag(false, tick, events);
    }

    /// Zero velocity.
    #[inline]
    pub fn halt(&mut self) {
        self.velocity = FixedVec2::ZERO;
    }

    /// Enable or disable the fighter.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            trace!(fighter = self.id.0, enabled, "fighter enabled changed");
        }
        self.enabled = enabled;
        if !enabled {
            self.input.discard_pending();
        }
    }

    /// Add this fighter to a state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.id.0);
        hasher.update_u8(self.side as u8);
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_vec2(self.move_axis);
        hasher.update_u8(self.facing as u8);
        hasher.update_u8(self.state as u8);
        hasher.update_bool(self.enabled);
        hasher.update_bool(self.run_flag);
        hasher.update_u32(self.health.remaining());
        self.input.hash_into(hasher);
    }

    /// Change state, emitting Attacking/Stunned flag changes.
    ///
    /// Both flags derive from the single state value, so they can never be
    /// true at the same time.
    fn transition(&mut self, next: FighterState, tick: u32, events: &mut Vec<GameEvent>) {
        let prev = self.state;
        if prev == next {
            return;
        }
        self.state = next;

        for (flag, held) in [
            (AnimFlag::Attacking, FighterState::Attacking),
            (AnimFlag::Stunned, FighterState::Stunned),
        ] {
            let was = prev == held;
            let is = next == held;
            if was != is {
                events.push(GameEvent::anim_flag(tick, self.id, flag, is));
            }
        }
    }

    fn set_run_flag(&mut self, value: bool, tick: u32, events: &mut Vec<GameEvent>) {
        if self.run_flag != value {
            self.run_flag = value;
            events.push(GameEvent::anim_flag(tick, self.id, AnimFlag::Run, value));
        }
    }
}
