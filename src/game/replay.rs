//! Match Recordings
//!
//! Everything needed to re-run a match step for step: the configuration,
//! delta-compressed human input per fighter, the animation completion log
//! and pause-menu resumes. Encoded with bincode.
//!
//! Recordings are indexed by step (one call to `tick`), not by simulation
//! tick, because the simulation clock stands still while paused.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::hash::{StateHash, StateHasher};
use crate::game::config::MatchConfig;
use crate::game::fighter::FighterId;
use crate::game::input::{AnimationEvent, InputBuffer, TickInputs};
use crate::game::state::MatchState;

/// Errors raised by recording encode/decode and replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Recording could not be serialized
    #[error("failed to encode recording: {0}")]
    Encode(#[source] bincode::Error),

    /// Bytes are not a valid recording
    #[error("failed to decode recording: {0}")]
    Decode(#[source] bincode::Error),

    /// Input was recorded for a fighter that is not human-controlled in a
    /// standard match
    #[error("recording has input for unknown or non-human fighter {0:?}")]
    UnknownFighter(FighterId),

    /// Replay finished in a different state than the recording
    #[error("replay diverged: expected state hash {expected}, got {actual}")]
    HashMismatch {
        /// Hash stored in the recording (hex)
        expected: String,
        /// Hash produced by the replay (hex)
        actual: String,
    },
}

/// An animation completion delivered at a given step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedAnimation {
    /// Step it was delivered on
    pub step: u32,
    /// Addressed fighter
    pub fighter_id: FighterId,
    /// Which clip finished
    pub event: AnimationEvent,
}

/// Complete recording of one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecording {
    /// Configuration the match ran with
    pub config: MatchConfig,
    /// Human input per fighter
    pub inputs: BTreeMap<FighterId, InputBuffer>,
    /// Animation completions in delivery order
    pub animation: Vec<RecordedAnimation>,
    /// Steps on which the pause menu was closed
    pub resume_steps: Vec<u32>,
    /// Number of steps recorded
    pub total_steps: u32,
    /// State hash after the last step
    pub final_hash: StateHash,
}

impl MatchRecording {
    /// Start an empty recording.
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            inputs: BTreeMap::new(),
            animation: Vec::new(),
            resume_steps: Vec::new(),
            total_steps: 0,
            final_hash: [0; 32],
        }
    }

    /// Record the inputs about to be fed to the next step. Returns the step
    /// index they were recorded under.
    pub fn record_step(&mut self, inputs: &TickInputs) -> u32 {
        let step = self.total_steps;

        for (fighter_id, frame) in &inputs.frames {
            self.inputs.entry(*fighter_id).or_default().record(step, *frame);
        }
        self.animation.extend(inputs.animation.iter().map(|(fighter_id, event)| {
            RecordedAnimation {
                step,
                fighter_id: *fighter_id,
                event: *event,
            }
        }));
        if inputs.resume {
            self.resume_steps.push(step);
        }

        self.total_steps += 1;
        step
    }

    /// Seal the recording with the final state hash.
    pub fn finish(&mut self, state: &MatchState) {
        self.final_hash = state.compute_hash();
    }

    /// Rebuild the inputs delivered at `step`.
    pub fn inputs_at(&self, step: u32) -> TickInputs {
        let mut inputs = TickInputs::default();

        for (fighter_id, buffer) in &self.inputs {
            if let Some(frame) = buffer.frame_at(step) {
                inputs.frames.insert(*fighter_id, frame);
            }
        }

        let start = self.animation.partition_point(|a| a.step < step);
        inputs.animation = self.animation[start..]
            .iter()
            .take_while(|a| a.step == step)
            .map(|a| (a.fighter_id, a.event))
            .collect();

        inputs.resume = self.resume_steps.binary_search(&step).is_ok();
        inputs
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ReplayError> {
        bincode::serialize(self).map_err(ReplayError::Encode)
    }

    /// Decode from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReplayError> {
        bincode::deserialize(bytes).map_err(ReplayError::Decode)
    }

    /// Fingerprint of the encoded recording.
    pub fn digest(&self) -> Result<StateHash, ReplayError> {
        let bytes = self.to_bytes()?;
        let mut hasher = StateHasher::for_recording();
        hasher.update_bytes(&bytes);
        Ok(hasher.finalize())
    }

    /// Total stored input deltas across all fighters.
    pub fn delta_count(&self) -> usize {
        self.inputs.values().map(InputBuffer::delta_count).sum()
    }
}
