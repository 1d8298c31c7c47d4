//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the fight simulation.
//! All gameplay operations use integer arithmetic only - floats appear
//! solely at configuration load and in display formatting.
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 (approx)                   │
//! │  Precision: 1/65536 ≈ 0.000015 units                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Squared lengths, dot products and other products of two `Fixed` values
//! are kept exact as [`FixedWide`] (Q32.32 in an i64). A Q16.16 square
//! would wrap once a distance passes ~181 units. Configured stages are capped
//! at [`MAX_STAGE_HALF_EXTENT`] so differences of in-stage points always fit
//! in a `Fixed`.

/// Q16.16 fixed-point number stored as i32.
/// 16 bits integer, 16 bits fractional.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE; // 65536

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1; // 32768

/// Q32.32 product of two `Fixed` values, stored as i64.
pub type FixedWide = i64;

// =============================================================================
// SIMULATION CONSTANTS (All as integer literals - NO float conversion!)
// =============================================================================

/// Tick duration: 1/60 second = round(65536/60) = 1092
pub const TICK_DURATION: Fixed = 1092;

/// Default fighter movement speed: 5.0 units/sec = 5 * 65536
pub const DEFAULT_MOVE_SPEED: Fixed = 327680;

/// Default attack sweep length: 4.0 = 4 * 65536
pub const DEFAULT_ATTACK_RANGE: Fixed = 262144;

/// Default attack sweep radius: 1.0
pub const DEFAULT_ATTACK_RADIUS: Fixed = FIXED_ONE;

/// Default fighter body radius: 0.5
pub const DEFAULT_BODY_RADIUS: Fixed = FIXED_HALF;

/// Default CPU engagement threshold: 2.0 = 2 * 65536
pub const DEFAULT_ENGAGEMENT_THRESHOLD: Fixed = 131072;

/// Stage half-width: 12.0 = 12 * 65536
pub const STAGE_HALF_WIDTH: Fixed = 786432;

/// Stage half-height: 4.0 = 4 * 65536
pub const STAGE_HALF_HEIGHT: Fixed = 262144;

/// Largest accepted stage half-extent and attack reach: 1024.0
pub const MAX_STAGE_HALF_EXTENT: Fixed = 1024 * FIXED_ONE;

// =============================================================================
// CORE OPERATIONS (All deterministic, wrapping semantics)
// =============================================================================

/// Convert a float to fixed-point.
///
/// # Warning
/// Only use at compile-time or initialization. NEVER in tick loop.
///
/// # Example
/// ```
/// use duel_arena::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert fixed-point to float for display.
///
/// # Warning
/// Only use for visual output. NEVER use result in game logic.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Convert a tick count into fixed-point seconds.
#[inline]
pub fn ticks_to_seconds(ticks: u32) -> Fixed {
    let wide = (ticks as i64) * (FIXED_ONE as i64) / (crate::TICK_RATE as i64);
    wide.min(i32::MAX as i64) as Fixed
}

/// Multiply two fixed-point numbers.
///
/// Uses i64 intermediate to prevent overflow, then truncates.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Divide two fixed-point numbers.
///
/// Pre-shifts numerator to maintain precision.
/// Divide-by-zero returns 0 (not panic).
#[inline]
pub fn fixed_div(a: Fixed, b: Fixed) -> Fixed {
    if b == 0 {
        return 0;
    }
    let wide = (a as i64) << FIXED_SCALE;
    (wide / b as i64) as Fixed
}

/// Exact product of two fixed-point numbers as Q32.32.
#[inline]
pub fn fixed_mul_wide(a: Fixed, b: Fixed) -> FixedWide {
    (a as i64) * (b as i64)
}

/// `floor(sqrt(n))`.
///
/// Integer Newton iteration that starts above the root and descends
/// monotonically, so the result is exact for every input and identical on
/// every platform.
pub fn isqrt_u64(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }

    // 2^ceil(bits/2) is always >= sqrt(n)
    let bits = 64 - n.leading_zeros();
    let mut guess = 1u64 << bits.div_ceil(2);

    loop {
        let next = (guess + n / guess) >> 1;
        if next >= guess {
            break;
        }
        guess = next;
    }

    guess
}

/// Square root of a Q32.32 value, as Q16.16.
///
/// Returns 0 for non-positive inputs and saturates at `Fixed::MAX`.
#[inline]
pub fn fixed_sqrt_wide(x: FixedWide) -> Fixed {
    if x <= 0 {
        return 0;
    }
    isqrt_u64(x as u64).min(Fixed::MAX as u64) as Fixed
}

/// Square root.
///
/// Computes `floor(sqrt(x << 16))` exactly.
/// Returns 0 for non-positive inputs.
#[inline]
pub fn fixed_sqrt(x: Fixed) -> Fixed {
    fixed_sqrt_wide((x as i64) << FIXED_SCALE)
}

/// Clamp a fixed-point number to a range.
#[inline]
pub fn fixed_clamp(value: Fixed, min: Fixed, max: Fixed) -> Fixed {
    value.max(min).min(max)
}

// =============================================================================
// SERDE ADAPTER
// =============================================================================

/// Serde adapter that stores a `Fixed` as a decimal number.
///
/// Configuration files say `"speed": 5.0` rather than `"speed": 327680`.
///
/// ```
/// use serde::Deserialize;
/// use duel_arena::core::fixed::{self, Fixed, FIXED_ONE};
///
/// #[derive(Deserialize)]
/// struct Reach {
///     #[serde(with = "fixed::as_decimal")]
///     reach: Fixed,
/// }
///
/// let reach: Reach = serde_json::from_str(r#"{ "reach": 1.5 }"#).unwrap();
/// assert_eq!(reach.reach, FIXED_ONE + FIXED_ONE / 2);
/// ```
pub mod as_decimal {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{to_fixed, Fixed, FIXED_ONE};

    /// Serialize a `Fixed` as an `f64`.
    pub fn serialize<S: Serializer>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*value as f64 / FIXED_ONE as f64)
    }

    /// Deserialize an `f64` into a `Fixed`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fixed, D::Error> {
        let value = f64::deserialize(deserializer)?;
        if !value.is_finite() || value.abs() >= 32768.0 {
            return Err(serde::de::Error::custom(format!(
                "{value} is outside the Q16.16 range"
            )));
        }
        Ok(to_fixed(value))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_ONE, 65536);
        assert_eq!(FIXED_HALF, 32768);
        assert_eq!(FIXED_SCALE, 16);
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.0), FIXED_ONE);
        assert_eq!(to_fixed(0.5), FIXED_HALF);
        assert_eq!(to_fixed(-1.0), -FIXED_ONE);
    }

    #[test]
    fn test_fixed_mul_div() {
        assert_eq!(fixed_mul(to_fixed(2.0), to_fixed(3.0)), to_fixed(6.0));
        assert_eq!(fixed_mul(FIXED_HALF, FIXED_HALF), to_fixed(0.25));
        assert_eq!(fixed_mul(to_fixed(-2.0), to_fixed(3.0)), to_fixed(-6.0));

        assert_eq!(fixed_div(to_fixed(6.0), to_fixed(2.0)), to_fixed(3.0));
        assert_eq!(fixed_div(FIXED_ONE, to_fixed(4.0)), to_fixed(0.25));
        assert_eq!(fixed_div(FIXED_ONE, 0), 0);
    }

    #[test]
    fn test_fixed_sqrt_exact_squares() {
        assert_eq!(fixed_sqrt(to_fixed(4.0)), to_fixed(2.0));
        assert_eq!(fixed_sqrt(FIXED_ONE), FIXED_ONE);
        assert_eq!(fixed_sqrt(to_fixed(625.0)), to_fixed(25.0));
        assert_eq!(fixed_sqrt(to_fixed(0.25)), FIXED_HALF);
        assert_eq!(fixed_sqrt(0), 0);
        assert_eq!(fixed_sqrt(-FIXED_ONE), 0);
    }

    #[test]
    fn test_fixed_sqrt_large_inputs_converge() {
        // Far from the initial guess; a fixed iteration count would undershoot here
        let root = fixed_sqrt(to_fixed(10000.0));
        assert_eq!(root, to_fixed(100.0));

        let root = fixed_sqrt(to_fixed(2.0));
        assert!((root - to_fixed(1.41421)).abs() < 4);
    }

    #[test]
    fn test_wide_products_do_not_wrap() {
        // 200 units squared is far beyond the Q16.16 range
        let far = to_fixed(200.0);
        let sq = fixed_mul_wide(far, far);
        assert!(sq > 0);
        assert_eq!(sq, 40_000i64 << 32);
        assert_eq!(fixed_sqrt_wide(sq), far);

        assert_eq!(isqrt_u64(u64::MAX), u32::MAX as u64);
        assert_eq!(fixed_sqrt_wide(-1), 0);
    }

    #[test]
    fn test_ticks_to_seconds() {
        assert_eq!(ticks_to_seconds(60), FIXED_ONE);
        assert_eq!(ticks_to_seconds(120), 2 * FIXED_ONE);
        assert_eq!(ticks_to_seconds(30), FIXED_HALF);
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(TICK_DURATION, 1092);
        assert_eq!(DEFAULT_MOVE_SPEED, 5 * FIXED_ONE);
        assert_eq!(DEFAULT_ATTACK_RANGE, 4 * FIXED_ONE);
        assert_eq!(DEFAULT_ENGAGEMENT_THRESHOLD, 2 * FIXED_ONE);
        assert_eq!(STAGE_HALF_WIDTH, 12 * FIXED_ONE);
    }

    #[test]
    fn test_decimal_adapter_rejects_out_of_range() {
        #[derive(serde::Deserialize, Debug)]
        struct Reach {
            #[serde(with = "as_decimal")]
            value: Fixed,
        }

        assert!(serde_json::from_str::<Reach>(r#"{ "value": 40000.0 }"#).is_err());
        let ok: Reach = serde_json::from_str(r#"{ "value": -2.5 }"#).unwrap();
        assert_eq!(ok.value, to_fixed(-2.5));
    }
}
