//! Fixed-Point 2D Vector
//!
//! Deterministic 2D vector operations for fighter movement and hit tests.
//! All operations use fixed-point arithmetic. Squared lengths and dot
//! products come back as Q32.32 [`FixedWide`] so far-apart points compare
//! correctly.

use std::fmt;
use std::ops::{Add, Sub, Neg};
use serde::{Serialize, Deserialize};

use super::fixed::{
    Fixed, FixedWide, FIXED_ONE, FIXED_SCALE,
    fixed_mul, fixed_div, fixed_sqrt_wide, fixed_clamp, isqrt_u64,
};

/// 2D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// X component (Q16.16 fixed-point)
    pub x: Fixed,
    /// Y component (Q16.16 fixed-point)
    pub y: Fixed,
}

impl FixedVec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Unit vector pointing right (+X)
    pub const RIGHT: Self = Self { x: FIXED_ONE, y: 0 };

    /// Unit vector pointing left (-X)
    pub const LEFT: Self = Self { x: -FIXED_ONE, y: 0 };

    /// Create a new vector from fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from integer components.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
        }
    }

    /// True if both components are zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Add another vector.
    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_add(other.x),
            y: self.y.wrapping_add(other.y),
        }
    }

    /// Subtract another vector.
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self {
            x: self.x.wrapping_sub(other.x),
            y: self.y.wrapping_sub(other.y),
        }
    }

    /// Scale by a fixed-point scalar.
    #[inline]
    pub fn scale(self, scalar: Fixed) -> Self {
        Self {
            x: fixed_mul(self.x, scalar),
            y: fixed_mul(self.y, scalar),
        }
    }

    /// Divide by a fixed-point scalar.
    #[inline]
    pub fn div_scalar(self, scalar: Fixed) -> Self {
        Self {
            x: fixed_div(self.x, scalar),
            y: fixed_div(self.y, scalar),
        }
    }

    /// Squared length as Q32.32 (avoids sqrt - prefer this for comparisons).
    #[inline]
    pub fn length_squared(self) -> FixedWide {
        let (x, y) = (self.x as i64, self.y as i64);
        (x * x).saturating_add(y * y)
    }

    /// Length (magnitude). Prefer `length_squared` when possible.
    #[inline]
    pub fn length(self) -> Fixed {
        fixed_sqrt_wide(self.length_squared())
    }

    /// Squared distance to another point as Q32.32.
    ///
    /// The difference is taken in i64, so points on opposite edges of any
    /// stage never wrap.
    #[inline]
    pub fn distance_squared(self, other: Self) -> FixedWide {
        let dx = other.x as i64 - self.x as i64;
        let dy = other.y as i64 - self.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Distance to another point. Prefer `distance_squared` when possible.
    #[inline]
    pub fn distance(self, other: Self) -> Fixed {
        fixed_sqrt_wide(self.distance_squared(other))
    }

    /// Normalize to unit length.
    /// Returns ZERO if length is zero.
    ///
    /// Components are pre-shifted to 30 significant bits before the root,
    /// and the root is rounded up, so the result never exceeds unit length
    /// however short the input.
    pub fn normalize(self) -> Self {
        let (x, y) = (self.x as i64, self.y as i64);
        let largest = x.unsigned_abs().max(y.unsigned_abs());
        if largest == 0 {
            return Self::ZERO;
        }

        let shift = largest.leading_zeros().saturating_sub(34);
        let (sx, sy) = (x << shift, y << shift);
        let (ax, ay) = (sx.unsigned_abs(), sy.unsigned_abs());
        let len_sq = ax * ax + ay * ay;

        let mut len = isqrt_u64(len_sq);
        if len * len < len_sq {
            len += 1;
        }
        let len = len as i64;

        Self {
            x: ((sx << FIXED_SCALE) / len) as Fixed,
            y: ((sy << FIXED_SCALE) / len) as Fixed,
        }
    }

    /// Dot product with another vector as Q32.32.
    #[inline]
    pub fn dot(self, other: Self) -> FixedWide {
        (self.x as i64 * other.x as i64).saturating_add(self.y as i64 * other.y as i64)
    }

    /// Squared distance (Q32.32) from this point to the segment `start..end`.
    ///
    /// Points that project before `start` or past `end` measure to that
    /// endpoint. Otherwise the perpendicular distance is
    /// `|p|^2 - (p.s)^2 / |s|^2`, evaluated in i128.
    pub fn distance_squared_to_segment(self, start: Self, end: Self) -> FixedWide {
        let sx = end.x as i128 - start.x as i128;
        let sy = end.y as i128 - start.y as i128;
        let px = self.x as i128 - start.x as i128;
        let py = self.y as i128 - start.y as i128;

        let seg_len_sq = sx * sx + sy * sy;
        let along = px * sx + py * sy;
        if seg_len_sq == 0 || along <= 0 {
            return self.distance_squared(start);
        }
        if along >= seg_len_sq {
            return self.distance_squared(end);
        }

        // 0 < along < seg_len_sq; drop low bits of huge projections so the square fits
        let shift = (128 - along.leading_zeros()).saturating_sub(63);
        let along = along >> shift;
        let projected = along * along / (seg_len_sq >> (2 * shift));

        let perpendicular = (px * px + py * py - projected).max(0);
        FixedWide::try_from(perpendicular).unwrap_or(FixedWide::MAX)
    }

    /// Clamp to a rectangle centred on the origin.
    #[inline]
    pub fn clamp_within(self, half_width: Fixed, half_height: Fixed) -> Self {
        Self {
            x: fixed_clamp(self.x, -half_width, half_width),
            y: fixed_clamp(self.y, -half_height, half_height),
        }
    }

    /// Negate both components.
    #[inline]
    pub fn negate(self) -> Self {
        Self {
            x: self.x.wrapping_neg(),
            y: self.y.wrapping_neg(),
        }
    }

    /// Convert to float tuple for rendering.
    #[inline]
    pub fn to_floats(self) -> (f32, f32) {
        (
            self.x as f32 / FIXED_ONE as f32,
            self.y as f32 / FIXED_ONE as f32,
        )
    }
}

impl Add for FixedVec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        FixedVec2::add(self, rhs)
    }
}

impl Sub for FixedVec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        FixedVec2::sub(self, rhs)
    }
}

impl Neg for FixedVec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        self.negate()
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "Vec2({:.3}, {:.3})", fx, fy)
    }
}

impl fmt::Display for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (fx, fy) = self.to_floats();
        write!(f, "({:.3}, {:.3})", fx, fy)
    }
}
