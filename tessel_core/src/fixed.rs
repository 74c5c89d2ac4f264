// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer-backed fixed-point numbers.
//!
//! [`FixedT<P>`] stores a value as `data / 2^P` in an `i32`. Arithmetic
//! between two values of the same precision keeps that precision; moving
//! between precisions always goes through [`FixedT::rescale`].
//!
//! [`Fixed`] (12 fractional bits) is the precision used for user-facing
//! transform parameters such as angles, scales and shears.

use core::fmt;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A signed fixed-point number with `PRECISION` fractional bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedT<const PRECISION: u32> {
    data: i32,
}

/// Fixed-point number with 12 fractional bits.
pub type Fixed = FixedT<12>;

impl<const PRECISION: u32> FixedT<PRECISION> {
    /// Raw value of `1` at this precision.
    pub const SCALE: i32 = 1 << PRECISION;

    /// Zero.
    pub const ZERO: Self = Self { data: 0 };

    /// One.
    pub const ONE: Self = Self { data: Self::SCALE };

    /// Creates a value from its raw scaled representation.
    #[inline]
    #[must_use]
    pub const fn from_data(data: i32) -> Self {
        Self { data }
    }

    /// Creates a value from an integer.
    #[inline]
    #[must_use]
    pub const fn from_int(value: i32) -> Self {
        Self {
            data: value << PRECISION,
        }
    }

    /// Creates the value `num / den`, truncated toward zero.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    #[inline]
    #[must_use]
    #[track_caller]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ratios are expected to fit the 32-bit representation"
    )]
    pub const fn from_ratio(num: i32, den: i32) -> Self {
        assert!(den != 0, "fixed-point ratio with zero denominator");
        Self {
            data: (((num as i64) << PRECISION) / den as i64) as i32,
        }
    }

    /// Returns the raw scaled representation.
    #[inline]
    #[must_use]
    pub const fn data(self) -> i32 {
        self.data
    }

    /// Returns the integer part, truncated toward zero.
    #[inline]
    #[must_use]
    pub const fn integer(self) -> i32 {
        self.data / Self::SCALE
    }

    /// Returns the largest integer not greater than this value.
    #[inline]
    #[must_use]
    pub const fn floor_integer(self) -> i32 {
        self.data >> PRECISION
    }

    /// Returns the raw fractional bits (always non-negative).
    #[inline]
    #[must_use]
    pub const fn fraction(self) -> i32 {
        self.data & (Self::SCALE - 1)
    }

    /// Returns the absolute value.
    #[inline]
    #[must_use]
    pub const fn abs(self) -> Self {
        Self {
            data: self.data.abs(),
        }
    }

    /// Converts to another precision.
    ///
    /// Widening shifts left; narrowing is an arithmetic shift right, so
    /// negative values round toward negative infinity.
    #[inline]
    #[must_use]
    pub const fn rescale<const OTHER: u32>(self) -> FixedT<OTHER> {
        let data = if OTHER >= PRECISION {
            self.data << (OTHER - PRECISION)
        } else {
            self.data >> (PRECISION - OTHER)
        };
        FixedT::<OTHER>::from_data(data)
    }

    /// Multiplies two values with a 64-bit intermediate.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "products outside the 32-bit range wrap like the hardware"
    )]
    pub const fn mul_fixed(self, rhs: Self) -> Self {
        Self {
            data: ((self.data as i64 * rhs.data as i64) >> PRECISION) as i32,
        }
    }

    /// Divides two values with a 64-bit intermediate.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is zero.
    #[inline]
    #[must_use]
    #[track_caller]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "quotients outside the 32-bit range wrap like the hardware"
    )]
    pub const fn div_fixed(self, rhs: Self) -> Self {
        assert!(rhs.data != 0, "fixed-point division by zero");
        Self {
            data: (((self.data as i64) << PRECISION) / rhs.data as i64) as i32,
        }
    }
}

impl<const PRECISION: u32> From<i32> for FixedT<PRECISION> {
    #[inline]
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

impl<const PRECISION: u32> fmt::Debug for FixedT<PRECISION> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed<{PRECISION}>({self})")
    }
}

impl<const PRECISION: u32> fmt::Display for FixedT<PRECISION> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = i64::from(self.data);
        let abs = data.abs();
        let sign = if data < 0 { "-" } else { "" };
        let int = abs >> PRECISION;
        let frac = ((abs & ((1_i64 << PRECISION) - 1)) * 10_000) >> PRECISION;
        write!(f, "{sign}{int}.{frac:04}")
    }
}

impl<const PRECISION: u32> Add for FixedT<PRECISION> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::from_data(self.data + rhs.data)
    }
}

impl<const PRECISION: u32> Sub for FixedT<PRECISION> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::from_data(self.data - rhs.data)
    }
}

impl<const PRECISION: u32> Neg for FixedT<PRECISION> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::from_data(-self.data)
    }
}

impl<const PRECISION: u32> Mul for FixedT<PRECISION> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.mul_fixed(rhs)
    }
}

impl<const PRECISION: u32> Div for FixedT<PRECISION> {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        self.div_fixed(rhs)
    }
}

impl<const PRECISION: u32> Mul<i32> for FixedT<PRECISION> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self::from_data(self.data * rhs)
    }
}

impl<const PRECISION: u32> Div<i32> for FixedT<PRECISION> {
    type Output = Self;

    #[inline]
    fn div(self, rhs: i32) -> Self {
        Self::from_data(self.data / rhs)
    }
}

impl<const PRECISION: u32> AddAssign for FixedT<PRECISION> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const PRECISION: u32> SubAssign for FixedT<PRECISION> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const PRECISION: u32> MulAssign for FixedT<PRECISION> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<const PRECISION: u32> DivAssign for FixedT<PRECISION> {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl<const PRECISION: u32> MulAssign<i32> for FixedT<PRECISION> {
    #[inline]
    fn mul_assign(&mut self, rhs: i32) {
        *self = *self * rhs;
    }
}

impl<const PRECISION: u32> DivAssign<i32> for FixedT<PRECISION> {
    #[inline]
    fn div_assign(&mut self, rhs: i32) {
        *self = *self / rhs;
    }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    #[test]
    fn one_has_precision_bits() {
        assert_eq!(Fixed::ONE.data(), 4096);
        assert_eq!(FixedT::<8>::ONE.data(), 256);
        assert_eq!(FixedT::<16>::ONE.data(), 65536);
    }

    #[test]
    fn from_ratio_truncates() {
        assert_eq!(Fixed::from_ratio(1, 128).data(), 32);
        assert_eq!(Fixed::from_ratio(1, 3).data(), 1365);
        assert_eq!(Fixed::from_ratio(-1, 3).data(), -1365);
    }

    #[test]
    fn integer_parts() {
        let v = Fixed::from_ratio(-3, 2);
        assert_eq!(v.integer(), -1);
        assert_eq!(v.floor_integer(), -2);
        assert_eq!(v.fraction(), 2048);
        assert_eq!(Fixed::from_ratio(7, 2).integer(), 3);
    }

    #[test]
    fn same_precision_arithmetic() {
        let a = Fixed::from_ratio(3, 2);
        let b = Fixed::from_int(2);
        assert_eq!(a + b, Fixed::from_ratio(7, 2));
        assert_eq!(a - b, Fixed::from_ratio(-1, 2));
        assert_eq!(a * b, Fixed::from_int(3));
        assert_eq!(a / b, Fixed::from_ratio(3, 4));
        assert_eq!(-a, Fixed::from_ratio(-3, 2));
        assert_eq!(a * 4, Fixed::from_int(6));
        assert_eq!(b / 4, Fixed::from_ratio(1, 2));
    }

    #[test]
    fn compound_assignment() {
        let mut v = Fixed::ONE;
        v += Fixed::ONE;
        v *= Fixed::from_int(3);
        v -= Fixed::from_int(2);
        v /= 2;
        assert_eq!(v, Fixed::from_int(2));
    }

    #[test]
    fn rescale_widens_and_narrows() {
        let v = Fixed::from_ratio(3, 2);
        assert_eq!(v.rescale::<8>().data(), 384);
        assert_eq!(v.rescale::<16>().data(), 98_304);
        assert_eq!(v.rescale::<12>(), v);
        // Narrowing drops fractional bits toward negative infinity.
        assert_eq!(Fixed::from_data(-1).rescale::<8>().data(), -1);
        assert_eq!(Fixed::from_data(15).rescale::<8>().data(), 0);
    }

    #[test]
    fn ordering_follows_data() {
        assert!(Fixed::from_ratio(1, 2) < Fixed::ONE);
        assert!(Fixed::from_int(-1) < Fixed::ZERO);
        assert_eq!(Fixed::from(5), Fixed::from_int(5));
    }

    #[test]
    fn display_truncates_to_four_places() {
        assert_eq!(format!("{}", Fixed::from_ratio(3, 2)), "1.5000");
        assert_eq!(format!("{}", Fixed::from_ratio(-1, 4)), "-0.2500");
        assert_eq!(format!("{:?}", Fixed::ONE), "Fixed<12>(1.0000)");
    }

    #[test]
    #[should_panic(expected = "fixed-point division by zero")]
    fn division_by_zero_panics() {
        let _ = Fixed::ONE / Fixed::ZERO;
    }
}
