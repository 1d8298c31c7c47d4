//! Input Capture and Normalization
//!
//! Inbound signals from the excluded collaborators: stick/button frames
//! from the input bindings and completion events from animation playback.
//! Uses a lookup table (MOVE_LUT) for exact i8 to Fixed conversion.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::fixed::Fixed;
use crate::core::vec2::FixedVec2;
use crate::game::fighter::FighterId;

// =============================================================================
// MOVE LOOKUP TABLE
// =============================================================================

/// Lookup table for converting i8 stick input to Fixed.
///
/// Scales [-127..+127] to [-1.0..+1.0] with floor division,
/// `(value * 65536) / 127`, precomputed for all 256 byte values.
/// Index 128 (-128 as i8) maps to 0: the stick is released.
pub static MOVE_LUT: [Fixed; 256] = {
    let mut lut = [0i32; 256];
    let mut i = 0i32;
    while i < 256 {
        let signed = if i < 128 { i } else { i - 256 };
        if signed != -128 {
            lut[i as usize] = (signed * 65536) / 127;
        }
        i += 1;
    }
    lut
};

/// Convert i8 stick input to Fixed using the lookup table.
#[inline]
pub fn move_to_fixed(input: i8) -> Fixed {
    MOVE_LUT[(input as u8) as usize]
}

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Raw input delivered by the human input bindings.
///
/// The stick value is held until the next frame arrives; the action
/// flags are edge-triggered and apply only to the tick they arrive on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Movement X direction: -127 (left) to +127 (right), -128 = released
    pub move_x: i8,

    /// Movement Y direction: -127 (down) to +127 (up), -128 = released
    pub move_y: i8,

    /// Action flags (packed bits):
    /// - Bit 0: Attack pressed this frame
    /// - Bit 1: Pause pressed this frame
    pub flags: u8,
}

impl InputFrame {
    /// Special value indicating the stick is released
    pub const NO_INPUT: i8 = -128;

    /// Attack flag bit
    pub const FLAG_ATTACK: u8 = 0x01;

    /// Pause flag bit
    pub const FLAG_PAUSE: u8 = 0x02;

    /// Create a released-stick frame with no actions.
    pub const fn new() -> Self {
        Self {
            move_x: Self::NO_INPUT,
            move_y: Self::NO_INPUT,
            flags: 0,
        }
    }

    /// Create input with movement direction.
    pub const fn with_movement(move_x: i8, move_y: i8) -> Self {
        Self {
            move_x,
            move_y,
            flags: 0,
        }
    }

    /// Released stick with the attack button pressed.
    pub const fn attack() -> Self {
        Self {
            move_x: Self::NO_INPUT,
            move_y: Self::NO_INPUT,
            flags: Self::FLAG_ATTACK,
        }
    }

    /// Movement axis as a FixedVec2 in [-1, 1].
    #[inline]
    pub fn move_direction(&self) -> FixedVec2 {
        FixedVec2 {
            x: move_to_fixed(self.move_x),
            y: move_to_fixed(self.move_y),
        }
    }

    /// Check if attack was pressed this frame.
    #[inline]
    pub fn attack_pressed(&self) -> bool {
        self.flags & Self::FLAG_ATTACK != 0
    }

    /// Check if pause was pressed this frame.
    #[inline]
    pub fn pause_pressed(&self) -> bool {
        self.flags & Self::FLAG_PAUSE != 0
    }

    /// True if the frame carries an edge-triggered action.
    #[inline]
    pub fn has_action(&self) -> bool {
        self.flags != 0
    }

    /// Set attack flag.
    #[inline]
    pub fn set_attack(&mut self, pressed: bool) {
        if pressed {
            self.flags |= Self::FLAG_ATTACK;
        } else {
            self.flags &= !Self::FLAG_ATTACK;
        }
    }

    /// Set pause flag.
    #[inline]
    pub fn set_pause(&mut self, pressed: bool) {
        if pressed {
            self.flags |= Self::FLAG_PAUSE;
        } else {
            self.flags &= !Self::FLAG_PAUSE;
        }
    }
}

// =============================================================================
// COMMANDS AND ANIMATION SIGNALS
// =============================================================================

/// What a fighter is asked to do on one physics tick, whoever is driving it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FighterCommand {
    /// Desired movement direction (any length; normalized by the fighter)
    pub axis: FixedVec2,
    /// Request an attack activation
    pub attack: bool,
}

/// Completion events from the animation playback collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnimationEvent {
    /// The attack clip finished
    AttackComplete,
    /// The hit-reaction clip finished
    HitComplete,
}

/// The human input binding's view of one fighter: the held stick and any
/// attack press not yet consumed by a physics tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HumanInput {
    /// Held movement axis
    pub axis: FixedVec2,
    /// Attack pressed since the last physics tick
    pub attack_pending: bool,
}

impl HumanInput {
    /// Take in a frame from the bindings.
    pub fn receive(&mut self, frame: &InputFrame) {
        self.axis = frame.move_direction();
        if frame.attack_pressed() {
            self.attack_pending = true;
        }
    }

    /// Produce this tick's command, consuming the pending attack.
    pub fn take_command(&mut self) -> FighterCommand {
        FighterCommand {
            axis: self.axis,
            attack: std::mem::take(&mut self.attack_pending),
        }
    }
}

/// Everything delivered to the simulation on one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInputs {
    /// Human input frames (BTreeMap for deterministic order)
    pub frames: BTreeMap<FighterId, InputFrame>,
    /// Animation completion events, applied in order
    pub animation: Vec<(FighterId, AnimationEvent)>,
    /// The pause menu asked to close
    pub resume: bool,
}

impl TickInputs {
    /// Inputs carrying a single human frame.
    pub fn with_frame(fighter_id: FighterId, frame: InputFrame) -> Self {
        let mut inputs = Self::default();
        inputs.frames.insert(fighter_id, frame);
        inputs
    }

    /// True if nothing was delivered.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty() && self.animation.is_empty() && !self.resume
    }
}

// =============================================================================
// INPUT BUFFER
// =============================================================================

/// A frame delivered at a given step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Step when this frame was delivered
    pub step: u32,
    /// The frame
    pub frame: InputFrame,
}

/// Complete input recording for one human fighter.
///
/// Held-stick frames are only stored when they change; frames that carry
/// an action are always stored, since actions are edge-triggered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBuffer {
    deltas: Vec<InputDelta>,
}

impl InputBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a delivered frame.
    pub fn record(&mut self, step: u32, frame: InputFrame) {
        let last = self.deltas.last().map(|d| d.frame);
        if frame.has_action() || last != Some(frame) {
            self.deltas.push(InputDelta { step, frame });
        }
    }

    /// Frame that must be delivered at `step`, if any.
    ///
    /// Steps are recorded in increasing order, so a binary search finds it.
    pub fn frame_at(&self, step: u32) -> Option<InputFrame> {
        self.deltas
            .binary_search_by_key(&step, |d| d.step)
            .ok()
            .map(|idx| self.deltas[idx].frame)
    }

    /// Number of stored deltas.
    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }
}
