//! Game Logic Module
//!
//! All fight simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `config`: Match, fighter and CPU tunables
//! - `input`: Input frames, commands and delta-compressed input buffers
//! - `track`: Health and round counters
//! - `fighter`: Fighter state machine (human and CPU alike)
//! - `combat`: Melee sweep test and hit application
//! - `cpu`: CPU opponent policy
//! - `timer`: Token-keyed one-shot transition timer
//! - `round`: Round/match controller
//! - `presentation`: Audio and UI state
//! - `events`: Outbound signals for the presentation layer
//! - `animation`: Headless stand-in for animation playback
//! - `state`: Match state aggregate
//! - `tick`: Simulation loop, frame stepper and replay
//! - `replay`: Match recordings

pub mod config;
pub mod input;
pub mod track;
pub mod fighter;
pub mod combat;
pub mod cpu;
pub mod timer;
pub mod round;
pub mod presentation;
pub mod events;
pub mod animation;
pub mod state;
pub mod tick;
pub mod replay;

// Re-export key types
pub use config::{ConfigError, MatchConfig, FighterConfig, CpuConfig, AnimationTimings};
pub use input::{InputFrame, InputBuffer, FighterCommand, AnimationEvent, TickInputs, MOVE_LUT};
pub use fighter::{Fighter, FighterId, FighterState, Facing, Side, InputSource};
pub use round::{RoundPhase, RoundOutcome};
pub use state::{MatchState, PLAYER_ONE, PLAYER_TWO};
pub use tick::{tick, TickResult, FrameStepper, replay_match, verify_replay};
pub use replay::{MatchRecording, ReplayError};
pub use animation::HeadlessAnimator;
pub use events::{GameEvent, GameEventData};
