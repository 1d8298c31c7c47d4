//! Core deterministic primitives.
//!
//! Everything the simulation computes with lives here: fixed-point
//! scalars, 2D vectors and the state hasher.

pub mod fixed;
pub mod vec2;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec2::FixedVec2;
pub use hash::{compute_state_hash, StateHash, StateHasher};
