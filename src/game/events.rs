//! Game Events
//!
//! Outbound signals produced by the simulation for the presentation
//! collaborators (animation, audio, UI) and for replay verification.

use serde::{Serialize, Deserialize};
use crate::game::fighter::{FighterId, Side};
use crate::game::round::RoundOutcome;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Hits and knockouts
    Combat = 0,
    /// Round and match progression
    Round = 1,
    /// Animation flags, audio cues and UI updates
    Presentation = 2,
}

/// Boolean animation parameters driven by the fighter state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimFlag {
    /// Fighter has non-zero velocity
    Run,
    /// Attack animation is playing
    Attacking,
    /// Hit-reaction animation is playing
    Stunned,
}

/// Audio cues for the sound collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    /// A fighter started an attack
    AttackActivated,
    /// A fighter was hit and survived
    HitReceived,
    /// A fighter was knocked out
    Death,
    /// Stop the in-round background music
    RoundMusicStop,
    /// Start the end-of-match music
    MatchEndMusicStart,
    /// The pause menu opened
    PauseMenuOpen,
}

/// UI panels whose visibility the simulation controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UiElement {
    /// Both fighters' health bars
    HealthBars,
    /// Round timer panel
    RoundTimerPanel,
    /// Pre-round countdown panel
    CountdownPanel,
    /// Pause menu
    PausePanel,
    /// End-of-match menu
    EndOfMatchPanel,
    /// Control instructions overlay
    InstructionText,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// An attack sweep connected
    HitLanded {
        /// Fighter whose attack connected
        attacker_id: FighterId,
        /// Fighter that was hit
        target_id: FighterId,
        /// Target's health after the hit
        remaining_health: u32,
    },

    /// A hit emptied the target's health
    FighterKnockedOut {
        /// Fighter knocked out
        fighter_id: FighterId,
        /// Fighter that landed the final hit
        attacker_id: FighterId,
    },

    /// Animation flag changed value
    AnimationFlagChanged {
        /// Animated fighter
        fighter_id: FighterId,
        /// Which flag
        flag: AnimFlag,
        /// New value
        value: bool,
    },

    /// One-shot death animation trigger
    DeathTriggered {
        /// Dying fighter
        fighter_id: FighterId,
    },

    /// Play an audio cue
    Audio {
        /// Emitting fighter, if positional
        fighter_id: Option<FighterId>,
        /// Cue to play
        cue: AudioCue,
    },

    /// Health bar contents changed
    HealthDisplay {
        /// Fighter whose bar changed
        fighter_id: FighterId,
        /// Hits remaining
        remaining: u32,
        /// Bar capacity
        max: u32,
    },

    /// Rounds-won indicator changed
    RoundIndicator {
        /// Side whose indicator changed
        side: Side,
        /// Rounds won so far
        rounds_won: u32,
    },

    /// Pre-round countdown display value
    CountdownDisplay {
        /// Whole seconds left
        seconds_remaining: u32,
    },

    /// Round timer display value
    RoundTimerDisplay {
        /// Whole seconds since the round began
        elapsed_seconds: u32,
    },

    /// Panel shown or hidden
    UiVisibility {
        /// Affected panel
        element: UiElement,
        /// Now showing
        visible: bool,
    },

    /// Win announcement text content
    WinAnnouncement {
        /// Text to display
        text: String,
    },

    /// Round/match phase changed
    PhaseChanged {
        /// Phase left
        old_phase: String,
        /// Phase entered
        new_phase: String,
    },

    /// Round decided (transition still pending)
    RoundDecided {
        /// Winner or draw
        outcome: RoundOutcome,
    },

    /// Match ended
    MatchEnded {
        /// Winning side
        winner: Side,
        /// Simulation ticks the match lasted
        duration_ticks: u32,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Processing priority
    pub priority: EventPriority,

    /// Fighter involved (for tie-breaking)
    pub fighter_id: Option<FighterId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: GameEventData) -> Self {
        let fighter_id = match &data {
            GameEventData::HitLanded { target_id, .. } => Some(*target_id),
            GameEventData::FighterKnockedOut { fighter_id, .. }
            | GameEventData::AnimationFlagChanged { fighter_id, .. }
            | GameEventData::DeathTriggered { fighter_id }
            | GameEventData::HealthDisplay { fighter_id, .. } => Some(*fighter_id),
            GameEventData::Audio { fighter_id, .. } => *fighter_id,
            _ => None,
        };

        Self {
            tick,
            priority,
            fighter_id,
            data,
        }
    }

    /// Create hit landed event.
    pub fn hit_landed(
        tick: u32,
        attacker_id: FighterId,
        target_id: FighterId,
        remaining_health: u32,
    ) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            GameEventData::HitLanded {
                attacker_id,
                target_id,
                remaining_health,
            },
        )
    }

    /// Create knockout event.
    pub fn knocked_out(tick: u32, fighter_id: FighterId, attacker_id: FighterId) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            GameEventData::FighterKnockedOut { fighter_id, attacker_id },
        )
    }

    /// Create animation flag event.
    pub fn anim_flag(tick: u32, fighter_id: FighterId, flag: AnimFlag, value: bool) -> Self {
        Self::new(
            tick,
            EventPriority::Presentation,
            GameEventData::AnimationFlagChanged { fighter_id, flag, value },
        )
    }

    /// Create death trigger event.
    pub fn death_triggered(tick: u32, fighter_id: FighterId) -> Self {
        Self::new(
            tick,
            EventPriority::Presentation,
            GameEventData::DeathTriggered { fighter_id },
        )
    }

    /// Create audio cue event.
    pub fn audio(tick: u32, fighter_id: Option<FighterId>, cue: AudioCue) -> Self {
        Self::new(
            tick,
            EventPriority::Presentation,
            GameEventData::Audio { fighter_id, cue },
        )
    }

    /// Create health display event.
    pub fn health_display(tick: u32, fighter_id: FighterId, remaining: u32, max: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Presentation,
            GameEventData::HealthDisplay { fighter_id, remaining, max },
        )
    }

    /// Create UI visibility event.
    pub fn ui_visibility(tick: u32, element: UiElement, visible: bool) -> Self {
        Self::new(
            tick,
            EventPriority::Presentation,
            GameEventData::UiVisibility { element, visible },
        )
    }

    /// Create phase changed event.
    pub fn phase_changed(tick: u32, old_phase: &str, new_phase: &str) -> Self {
        Self::new(
            tick,
            EventPriority::Round,
            GameEventData::PhaseChanged {
                old_phase: old_phase.to_string(),
                new_phase: new_phase.to_string(),
            },
        )
    }

    /// Create match ended event for a match that began at `started_at`.
    pub fn match_ended(tick: u32, winner: Side, started_at: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Round,
            GameEventData::MatchEnded {
                winner,
                duration_ticks: tick.saturating_sub(started_at),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_equality_covers_payload() {
        let id1 = FighterId(1);
        let id2 = FighterId(2);

        // Same tick, priority and fighter, different payloads
        let hit = GameEvent::hit_landed(10, id2, id1, 3);
        let harder = GameEvent::hit_landed(10, id2, id1, 2);
        assert_eq!(hit.fighter_id, harder.fighter_id);
        assert_ne!(hit, harder);
        assert_eq!(hit, GameEvent::hit_landed(10, id2, id1, 3));

        let shown = GameEvent::ui_visibility(9, UiElement::PausePanel, true);
        let hidden = GameEvent::ui_visibility(9, UiElement::PausePanel, false);
        assert_ne!(shown, hidden);

        // Combat still sorts ahead of presentation within a tick
        let cue = GameEvent::audio(10, Some(id1), AudioCue::HitReceived);
        assert!(hit.priority < cue.priority);
    }

    #[test]
    fn test_match_duration_counts_from_match_start() {
        let event = GameEvent::match_ended(900, Side::Two, 600);
        assert_eq!(event.data, GameEventData::MatchEnded { winner: Side::Two, duration_ticks: 300 });

        let event = GameEvent::match_ended(5, Side::One, 0);
        assert_eq!(event.data, GameEventData::MatchEnded { winner: Side::One, duration_ticks: 5 });
    }

    #[test]
    fn test_event_fighter_attribution() {
        let event = GameEvent::hit_landed(1, FighterId(1), FighterId(2), 0);
        assert_eq!(event.fighter_id, Some(FighterId(2)));

        let event = GameEvent::audio(1, None, AudioCue::RoundMusicStop);
        assert_eq!(event.fighter_id, None);

        let event = GameEvent::match_ended(1, Side::One, 0);
        assert_eq!(event.fighter_id, None);
    }
}
