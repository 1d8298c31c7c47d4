//! # Duel Arena Simulation
//!
//! Deterministic simulation core for a two-fighter arena brawler: fighter
//! state machines, melee hit resolution, a reactive CPU opponent and the
//! round/match controller.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DUEL ARENA SIM                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── fighter.rs  - Fighter state machine                     │
//! │  ├── combat.rs   - Sweep test and hit application            │
//! │  ├── cpu.rs      - CPU opponent policy                       │
//! │  ├── round.rs    - Round/match controller                    │
//! │  ├── tick.rs     - Simulation loop and replay                │
//! │  └── ...         - Config, input, events, presentation       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering, animation playback, audio output and input devices live
//! outside the crate. The simulation talks to them only through
//! [`game::TickInputs`] (in) and [`game::GameEvent`] (out).
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//!
//! Given identical inputs, the simulation produces **identical results**
//! on any platform, which is what makes replays verifiable.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use crate::core::vec2::FixedVec2;
pub use crate::game::input::{InputFrame, InputBuffer, TickInputs};
pub use crate::game::state::MatchState;
pub use crate::game::config::MatchConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
