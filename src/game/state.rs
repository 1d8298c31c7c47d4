//! Match State
//!
//! The aggregate every tick operates on.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use tracing::debug;

use crate::core::hash::{StateHash, compute_state_hash};
use crate::core::vec2::FixedVec2;
use crate::game::config::MatchConfig;
use crate::game::cpu::CpuPolicy;
use crate::game::events::{GameEvent, UiElement};
use crate::game::fighter::{Facing, Fighter, FighterId, InputSource, Side};
use crate::game::presentation::Presentation;
use crate::game::round::{self, RoundController, RoundPhase};

/// Human-controlled fighter in a standard match.
pub const PLAYER_ONE: FighterId = FighterId(1);

/// CPU-controlled fighter in a standard match.
pub const PLAYER_TWO: FighterId = FighterId(2);

/// Complete simulation state of one match.
#[derive(Clone, Debug)]
pub struct MatchState {
    /// Current tick (simulation clock)
    pub tick: u32,

    /// Tunables the match was created with
    pub config: MatchConfig,

    /// All fighters (BTreeMap for deterministic order)
    pub fighters: BTreeMap<FighterId, Fighter>,

    /// Round/match controller
    pub round: RoundController,

    /// Audio and UI state
    pub presentation: Presentation,

    /// Pause menu open; the clock and fighters are frozen
    pub paused: bool,

    /// Events generated since the last `take_events`
    pub pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create a standard match: a human on side One facing right and a CPU
    /// on side Two facing left, chasing the human.
    pub fn new(config: MatchConfig) -> Self {
        let mut state = Self::empty(config);
        let offset = state.config.spawn_offset;

        let human = Fighter::new(
            PLAYER_ONE,
            Side::One,
            InputSource::human(),
            &state.config.human,
            FixedVec2::new(-offset, 0),
            Facing::Right,
        );
        let cpu = Fighter::new(
            PLAYER_TWO,
            Side::Two,
            InputSource::Cpu(CpuPolicy::new(PLAYER_ONE, &state.config.cpu_policy, 0)),
            &state.config.cpu,
            FixedVec2::new(offset, 0),
            Facing::Left,
        );

        state.add_fighter(human);
        state.add_fighter(cpu);
        state
    }

    /// Create a match with no fighters.
    pub fn empty(config: MatchConfig) -> Self {
        Self {
            tick: 0,
            config,
            fighters: BTreeMap::new(),
            round: RoundController::new(),
            presentation: Presentation::new(),
            paused: false,
            pending_events: Vec::new(),
        }
    }

    /// Add (or replace) a fighter.
    pub fn add_fighter(&mut self, fighter: Fighter) {
        debug!(fighter = fighter.id.0, side = ?fighter.side, human = fighter.input.is_human(), "fighter added");
        self.fighters.insert(fighter.id, fighter);
    }

    /// Get a fighter by ID.
    pub fn get_fighter(&self, id: FighterId) -> Option<&Fighter> {
        self.fighters.get(&id)
    }

    /// Get a fighter mutably by ID.
    pub fn get_fighter_mut(&mut self, id: FighterId) -> Option<&mut Fighter> {
        self.fighters.get_mut(&id)
    }

    /// Current round/match phase.
    pub fn phase(&self) -> RoundPhase {
        self.round.phase
    }

    /// True once the match has a winner.
    pub fn is_match_over(&self) -> bool {
        matches!(self.round.phase, RoundPhase::MatchOver { .. })
    }

    /// Open the pause menu. Ignored once the match is over or if it is
    /// already open. Returns true if the game became paused.
    pub fn request_pause(&mut self) -> bool {
        if self.is_match_over() {
            return false;
        }
        if !self.presentation.open_pause_menu(self.tick, &mut self.pending_events) {
            return false;
        }
        self.paused = true;
        debug!(tick = self.tick, "paused");
        true
    }

    /// Close the pause menu. Returns true if the game was paused.
    pub fn resume(&mut self) -> bool {
        if !self.paused {
            return false;
        }
        self.presentation
            .set_visible(UiElement::PausePanel, false, self.tick, &mut self.pending_events);
        self.paused = false;
        debug!(tick = self.tick, "resumed");
        true
    }

    /// Start a new match with the same fighters and configuration.
    pub fn restart_match(&mut self) {
        round::restart_match(self);
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, |hasher| {
            // BTreeMap guarantees sorted order
            for fighter in self.fighters.values() {
                fighter.hash_into(hasher);
            }
            self.round.hash_into(hasher);
            self.presentation.hash_into(hasher);
            hasher.update_bool(self.paused);
        })
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::FIXED_ONE;

    #[test]
    fn test_standard_match_layout() {
        let state = MatchState::new(MatchConfig::default());
        let ids: Vec<_> = state.fighters.keys().copied().collect();
        assert_eq!(ids, vec![PLAYER_ONE, PLAYER_TWO]);

        let human = &state.fighters[&PLAYER_ONE];
        assert!(human.input.is_human());
        assert_eq!(human.position, FixedVec2::new(-4 * FIXED_ONE, 0));
        assert_eq!(human.facing, Facing::Right);

        let cpu = &state.fighters[&PLAYER_TWO];
        assert_eq!(cpu.input.target(), Some(PLAYER_ONE));
        assert_eq!(cpu.side, Side::Two);
        assert_eq!(cpu.facing, Facing::Left);

        assert_eq!(state.phase(), RoundPhase::RoundStart);
    }

    #[test]
    fn test_match_state_determinism() {
        let a = MatchState::new(MatchConfig::default());
        let b = MatchState::new(MatchConfig::default());
        assert_eq!(a.compute_hash(), b.compute_hash());

        let mut c = MatchState::new(MatchConfig::default());
        if let Some(cpu) = c.get_fighter_mut(PLAYER_TWO) {
            cpu.health.remove_hit();
        }
        assert_ne!(a.compute_hash(), c.compute_hash());
    }

    #[test]
    fn test_pause_and_resume() {
        let mut state = MatchState::new(MatchConfig::default());
        assert!(state.request_pause());
        assert!(state.paused);
        assert!(state.presentation.is_visible(UiElement::PausePanel));
        assert!(!state.request_pause());

        assert!(state.resume());
        assert!(!state.paused);
        assert!(!state.presentation.is_visible(UiElement::PausePanel));
        assert!(!state.resume());
    }

    #[test]
    fn test_btreemap_iteration_order() {
        let mut state = MatchState::empty(MatchConfig::default());
        let config = state.config.human.clone();
        for id in [5u8, 1, 9, 3] {
            state.add_fighter(Fighter::new(
                FighterId(id),
                Side::One,
                InputSource::human(),
                &config,
                FixedVec2::ZERO,
                Facing::Right,
            ));
        }

        let iterated: Vec<_> = state.fighters.keys().map(|id| id.0).collect();
        assert_eq!(iterated, vec![1, 3, 5, 9], "BTreeMap should iterate in sorted order");
    }
}
