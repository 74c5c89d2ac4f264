// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trigonometric and reciprocal lookup tables.
//!
//! Both tables are generated by `const fn`s at compile time and are
//! immutable afterwards, so evaluating them never touches floating point.
//!
//! - [`SIN_LUT`] covers one full turn in 2048 steps with 12 fractional bits.
//!   Degree angles map onto it through [`degrees_lut_sin_and_cos`].
//! - [`RECIPROCAL_16_LUT`] holds `1 / i` with 16 fractional bits for every
//!   index below [`RECIPROCAL_LUT_SIZE`]. [`reciprocal_lut_value`] is the
//!   closed form the table is generated from, and is used directly for
//!   indices past the end of the table.

use crate::fixed::{Fixed, FixedT};

/// Number of [`SIN_LUT`] entries in a full turn.
pub const SIN_LUT_SIZE: usize = 2048;

/// Number of [`RECIPROCAL_16_LUT`] entries.
pub const RECIPROCAL_LUT_SIZE: usize = 1024;

/// Sine of `i * 2π / 2048` with 12 fractional bits.
pub static SIN_LUT: [i16; SIN_LUT_SIZE] = sin_lut();

/// `1 / i` with 16 fractional bits, for `i` in `0..RECIPROCAL_LUT_SIZE`.
///
/// Entry `0` is zero.
pub static RECIPROCAL_16_LUT: [FixedT<16>; RECIPROCAL_LUT_SIZE] = reciprocal_lut::<16>();

/// π with 40 fractional bits.
const PI_Q40: i128 = 3_454_217_652_358;

/// Raw value of 360 degrees in [`Fixed`].
const FULL_TURN_DATA: i32 = 360 << 12;

/// `2^32 / 720`, rounded up.
///
/// `360 << 12` raw degrees span 2048 table steps, so a table index is the raw
/// angle divided by 720. Multiplying by this constant and shifting by 32
/// gives the same quotient for every raw angle in `[0, 360]`.
const DEGREES_TO_LUT_MULTIPLIER: u64 = 5_965_233;

/// Sine of `q * (π / 2) / 512` for `q` in `0..=512`, with 12 fractional bits.
///
/// Evaluated with a twelve-term Taylor series in 40-bit fixed point, which is
/// accurate well below half an output LSB over the whole quarter wave.
#[expect(
    clippy::cast_possible_truncation,
    reason = "quarter-wave sine is within [0, 4096]"
)]
const fn quarter_sin(q: i128) -> i16 {
    let x = q * PI_Q40 / 1024;
    let x2 = (x * x) >> 40;
    let mut term = x;
    let mut sum = x;
    let mut k = 1;
    while k <= 12 {
        term = -((term * x2) >> 40) / ((2 * k) * (2 * k + 1));
        sum += term;
        k += 1;
    }
    ((sum + (1 << 27)) >> 28) as i16
}

const fn sin_lut() -> [i16; SIN_LUT_SIZE] {
    let mut quarter = [0_i16; 513];
    let mut q = 0;
    while q <= 512 {
        quarter[q] = quarter_sin(q as i128);
        q += 1;
    }

    let mut lut = [0_i16; SIN_LUT_SIZE];
    let mut i = 0;
    while i < SIN_LUT_SIZE {
        lut[i] = if i < 512 {
            quarter[i]
        } else if i < 1024 {
            quarter[1024 - i]
        } else if i < 1536 {
            -quarter[i - 1024]
        } else {
            -quarter[2048 - i]
        };
        i += 1;
    }
    lut
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "table indices are below RECIPROCAL_LUT_SIZE"
)]
const fn reciprocal_lut<const PRECISION: u32>() -> [FixedT<PRECISION>; RECIPROCAL_LUT_SIZE] {
    let mut lut = [FixedT::<PRECISION>::ZERO; RECIPROCAL_LUT_SIZE];
    let mut i = 0;
    while i < RECIPROCAL_LUT_SIZE {
        lut[i] = reciprocal_lut_value::<PRECISION>(i as i32);
        i += 1;
    }
    lut
}

/// Computes `1 / value` with `PRECISION` fractional bits, truncated.
///
/// This is the formula [`RECIPROCAL_16_LUT`] is generated from, so it agrees
/// bit-for-bit with the table wherever both are defined. Returns zero for a
/// zero `value`.
#[inline]
#[must_use]
pub const fn reciprocal_lut_value<const PRECISION: u32>(value: i32) -> FixedT<PRECISION> {
    if value == 0 {
        FixedT::<PRECISION>::ZERO
    } else {
        FixedT::<PRECISION>::from_data((1 << PRECISION) / value)
    }
}

/// Returns `1 / value` with 16 fractional bits from [`RECIPROCAL_16_LUT`].
///
/// # Panics
///
/// Panics if `value` is outside `0..RECIPROCAL_LUT_SIZE`.
#[inline]
#[must_use]
#[track_caller]
pub fn lut_reciprocal(value: i32) -> FixedT<16> {
    assert!(
        value >= 0 && (value as usize) < RECIPROCAL_LUT_SIZE,
        "reciprocal LUT index out of range: {value}"
    );
    RECIPROCAL_16_LUT[value as usize]
}

/// Returns the sine of a table angle (`2048` steps per turn).
///
/// # Panics
///
/// Panics if `lut_angle` is outside `0..=2048`.
#[inline]
#[must_use]
#[track_caller]
pub fn lut_sin(lut_angle: i32) -> Fixed {
    lut_sin_and_cos(lut_angle).0
}

/// Returns the cosine of a table angle (`2048` steps per turn).
///
/// # Panics
///
/// Panics if `lut_angle` is outside `0..=2048`.
#[inline]
#[must_use]
#[track_caller]
pub fn lut_cos(lut_angle: i32) -> Fixed {
    lut_sin_and_cos(lut_angle).1
}

/// Returns `(sin, cos)` of a table angle (`2048` steps per turn).
///
/// # Panics
///
/// Panics if `lut_angle` is outside `0..=2048`.
#[inline]
#[must_use]
#[track_caller]
pub fn lut_sin_and_cos(lut_angle: i32) -> (Fixed, Fixed) {
    assert!(
        (0..=2048).contains(&lut_angle),
        "LUT angle must be in the range [0, 2048]: {lut_angle}"
    );
    let index = lut_angle as usize & (SIN_LUT_SIZE - 1);
    let cos_index = (index + SIN_LUT_SIZE / 4) & (SIN_LUT_SIZE - 1);
    (
        Fixed::from_data(i32::from(SIN_LUT[index])),
        Fixed::from_data(i32::from(SIN_LUT[cos_index])),
    )
}

/// Wraps an angle in degrees into `[0, 360)`.
#[inline]
#[must_use]
pub const fn safe_degrees_angle(degrees_angle: Fixed) -> Fixed {
    Fixed::from_data(degrees_angle.data().rem_euclid(FULL_TURN_DATA))
}

/// Returns `(sin, cos)` of an angle in degrees in `[0, 360]`.
///
/// # Panics
///
/// Panics if the angle is outside `[0, 360]`.
#[inline]
#[must_use]
#[track_caller]
pub fn degrees_lut_sin_and_cos(degrees_angle: Fixed) -> (Fixed, Fixed) {
    assert!(
        degrees_angle >= Fixed::ZERO && degrees_angle.data() <= FULL_TURN_DATA,
        "Angle must be in the range [0, 360]: {degrees_angle}"
    );
    lut_sin_and_cos(degrees_to_lut_angle(degrees_angle))
}

/// Returns the sine of an angle in degrees in `[0, 360]`.
///
/// # Panics
///
/// Panics if the angle is outside `[0, 360]`.
#[inline]
#[must_use]
#[track_caller]
pub fn degrees_lut_sin(degrees_angle: Fixed) -> Fixed {
    degrees_lut_sin_and_cos(degrees_angle).0
}

/// Returns the cosine of an angle in degrees in `[0, 360]`.
///
/// # Panics
///
/// Panics if the angle is outside `[0, 360]`.
#[inline]
#[must_use]
#[track_caller]
pub fn degrees_lut_cos(degrees_angle: Fixed) -> Fixed {
    degrees_lut_sin_and_cos(degrees_angle).1
}

/// Like [`degrees_lut_sin_and_cos`], but accepts any angle.
#[inline]
#[must_use]
pub fn degrees_lut_sin_and_cos_safe(degrees_angle: Fixed) -> (Fixed, Fixed) {
    degrees_lut_sin_and_cos(safe_degrees_angle(degrees_angle))
}

/// Like [`degrees_lut_sin`], but accepts any angle.
#[inline]
#[must_use]
pub fn degrees_lut_sin_safe(degrees_angle: Fixed) -> Fixed {
    degrees_lut_sin_and_cos_safe(degrees_angle).0
}

/// Like [`degrees_lut_cos`], but accepts any angle.
#[inline]
#[must_use]
pub fn degrees_lut_cos_safe(degrees_angle: Fixed) -> Fixed {
    degrees_lut_sin_and_cos_safe(degrees_angle).1
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the index is at most 2048"
)]
fn degrees_to_lut_angle(degrees_angle: Fixed) -> i32 {
    ((degrees_angle.data() as u64 * DEGREES_TO_LUT_MULTIPLIER) >> 32) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_points_are_exact() {
        assert_eq!(SIN_LUT[0], 0);
        assert_eq!(SIN_LUT[512], 4096);
        assert_eq!(SIN_LUT[1024], 0);
        assert_eq!(SIN_LUT[1536], -4096);
    }

    #[test]
    fn table_is_odd_symmetric() {
        for i in 1..SIN_LUT_SIZE {
            assert_eq!(
                SIN_LUT[i],
                -SIN_LUT[SIN_LUT_SIZE - i],
                "sin(-x) != -sin(x) at {i}"
            );
        }
    }

    #[test]
    fn known_table_values() {
        // sin(45°) and sin(30°) at 12 bits.
        assert_eq!(SIN_LUT[256], 2896);
        assert_eq!(SIN_LUT[170], 2041);
        assert_eq!(SIN_LUT[5], 63);
    }

    #[test]
    fn degrees_map_onto_table() {
        let (s, c) = degrees_lut_sin_and_cos(Fixed::from_int(90));
        assert_eq!((s.data(), c.data()), (4096, 0));
        let (s, c) = degrees_lut_sin_and_cos(Fixed::from_int(45));
        assert_eq!((s.data(), c.data()), (2896, 2896));
        let (s, c) = degrees_lut_sin_and_cos(Fixed::from_int(180));
        assert_eq!((s.data(), c.data()), (0, -4096));
        let (s, c) = degrees_lut_sin_and_cos(Fixed::from_int(360));
        assert_eq!((s.data(), c.data()), (0, 4096));
    }

    #[test]
    fn degrees_index_matches_division() {
        let mut data = 0;
        while data <= FULL_TURN_DATA {
            assert_eq!(
                degrees_to_lut_angle(Fixed::from_data(data)),
                data / 720,
                "index mismatch at raw angle {data}"
            );
            data += 7;
        }
        assert_eq!(degrees_to_lut_angle(Fixed::from_data(719)), 0);
        assert_eq!(degrees_to_lut_angle(Fixed::from_data(720)), 1);
    }

    #[test]
    fn sin_and_cos_wrappers_agree() {
        let angle = Fixed::from_int(30);
        assert_eq!(degrees_lut_sin(angle).data(), 2041);
        assert_eq!(degrees_lut_cos(angle).data(), 3551);
        assert_eq!(lut_sin(256), lut_cos(256));
        assert_eq!(lut_sin(2048), lut_sin(0));
    }

    #[test]
    fn safe_angle_wraps() {
        assert_eq!(safe_degrees_angle(Fixed::from_int(360)), Fixed::ZERO);
        assert_eq!(
            safe_degrees_angle(Fixed::from_int(-90)),
            Fixed::from_int(270)
        );
        assert_eq!(
            safe_degrees_angle(Fixed::from_int(725)),
            Fixed::from_int(5)
        );
        assert_eq!(
            safe_degrees_angle(Fixed::from_ratio(-1, 2)),
            Fixed::from_ratio(719, 2)
        );
        assert_eq!(
            degrees_lut_sin_and_cos_safe(Fixed::from_int(-315)),
            degrees_lut_sin_and_cos(Fixed::from_int(45))
        );
        assert_eq!(degrees_lut_sin_safe(Fixed::from_int(450)).data(), 4096);
        assert_eq!(degrees_lut_cos_safe(Fixed::from_int(-180)).data(), -4096);
    }

    #[test]
    #[should_panic(expected = "Angle must be in the range [0, 360]")]
    fn out_of_range_angle_panics() {
        let _ = degrees_lut_sin_and_cos(Fixed::from_int(361));
    }

    #[test]
    fn reciprocal_table_matches_closed_form() {
        for i in 0..RECIPROCAL_LUT_SIZE {
            assert_eq!(
                RECIPROCAL_16_LUT[i],
                reciprocal_lut_value::<16>(i as i32),
                "table entry {i} differs from the closed form"
            );
        }
    }

    #[test]
    fn reciprocal_values() {
        assert_eq!(lut_reciprocal(0).data(), 0);
        assert_eq!(lut_reciprocal(2).data(), 32_768);
        assert_eq!(lut_reciprocal(256).data(), 256);
        assert_eq!(lut_reciprocal(3).data(), 21_845);
        assert_eq!(reciprocal_lut_value::<8>(2).data(), 128);
    }

    #[test]
    fn reciprocal_has_no_seam_at_table_end() {
        let last = RECIPROCAL_LUT_SIZE as i32 - 1;
        assert_eq!(lut_reciprocal(last), reciprocal_lut_value::<16>(last));
        assert_eq!(lut_reciprocal(last).data(), 64);
        // The first value past the table continues the same curve.
        assert_eq!(reciprocal_lut_value::<16>(last + 1).data(), 64);
    }

    #[test]
    fn reciprocal_is_usable_in_const_context() {
        const HALF: FixedT<16> = reciprocal_lut_value::<16>(512);
        assert_eq!(HALF.data(), 128);
    }

    #[test]
    #[should_panic(expected = "reciprocal LUT index out of range")]
    fn reciprocal_out_of_range_panics() {
        let _ = lut_reciprocal(RECIPROCAL_LUT_SIZE as i32);
    }
}
