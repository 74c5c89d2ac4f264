// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine matrix attributes and their hardware register values.
//!
//! [`AffineMatAttributes`] describes a 2×2 affine transform in caller units
//! (rotation in degrees, per-axis scale, per-axis shear, per-axis flip) and
//! keeps the four signed 16-bit register values the rendering hardware
//! consumes in sync with them.
//!
//! # Register pipeline
//!
//! With `s`/`c` the 12-bit sine and cosine of the rotation angle, `sx`/`sy`
//! the 8-bit reciprocals of the scales, `hf`/`vf` the flip signs (`±1`) and
//! `hsh`/`vsh` the raw 12-bit shears:
//!
//! ```text
//! pa = (c * sx * hf) >> 12
//! pb = ((-s * sx * hf) >> 12) + (hsh >> 4)
//! pc = ((s * sy * vf) >> 12) + (vsh >> 4)
//! pd = (c * sy * vf) >> 12
//! ```
//!
//! Each result is truncated to 16 bits, wrapping on overflow exactly as the
//! register would.
//!
//! Every mutator recomputes only the registers that depend on the field it
//! changed. [`AffineMatAttributes::override_register_values`] bypasses the
//! pipeline entirely.

use crate::fixed::{Fixed, FixedT};
use crate::lut::{
    RECIPROCAL_16_LUT, RECIPROCAL_LUT_SIZE, degrees_lut_sin_and_cos, reciprocal_lut_value,
    safe_degrees_angle,
};

/// Scales at or below `1 / MIN_INV_SCALE` clamp their reciprocal.
const MIN_INV_SCALE: i32 = 128;

const MIN_SCALE: Fixed = Fixed::from_ratio(1, MIN_INV_SCALE);

/// The four register values of an affine matrix.
///
/// `pa`/`pd` are the diagonal, `pb`/`pc` the off-diagonal terms, all with 8
/// fractional bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AffineMatRegisters {
    /// First register (row 0, column 0).
    pub pa: i16,
    /// Second register (row 0, column 1).
    pub pb: i16,
    /// Third register (row 1, column 0).
    pub pc: i16,
    /// Fourth register (row 1, column 1).
    pub pd: i16,
}

impl AffineMatRegisters {
    /// Register values of the identity matrix.
    pub const IDENTITY: Self = Self {
        pa: 256,
        pb: 0,
        pc: 0,
        pd: 256,
    };
}

impl Default for AffineMatRegisters {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// The attributes defining an affine transformation matrix.
///
/// The rotation angle is expected in `[0, 360]`; use
/// [`set_rotation_angle_safe`](Self::set_rotation_angle_safe) for angles that
/// may have drifted out of range. Scales must be positive.
///
/// Equality compares every stored field, including the register values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AffineMatAttributes {
    rotation_angle: Fixed,
    horizontal_scale: Fixed,
    vertical_scale: Fixed,
    horizontal_shear: Fixed,
    vertical_shear: Fixed,
    hflip: i8,
    vflip: i8,
    sin: i16,
    cos: i16,
    sx: u16,
    sy: u16,
    pa: i16,
    pb: i16,
    pc: i16,
    pd: i16,
}

impl Default for AffineMatAttributes {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineMatAttributes {
    /// No rotation, unit scale, no shear, no flip.
    pub const IDENTITY: Self = Self {
        rotation_angle: Fixed::ZERO,
        horizontal_scale: Fixed::ONE,
        vertical_scale: Fixed::ONE,
        horizontal_shear: Fixed::ZERO,
        vertical_shear: Fixed::ZERO,
        hflip: 1,
        vflip: 1,
        sin: 0,
        cos: 4096,
        sx: 256,
        sy: 256,
        pa: 256,
        pb: 0,
        pc: 0,
        pd: 256,
    };

    /// Creates attributes without shear.
    ///
    /// # Panics
    ///
    /// Panics if either scale is not positive, or if the angle is outside
    /// `[0, 360]`.
    #[must_use]
    #[track_caller]
    pub fn new(
        rotation_angle: Fixed,
        horizontal_scale: Fixed,
        vertical_scale: Fixed,
        horizontal_flip: bool,
        vertical_flip: bool,
    ) -> Self {
        Self::with_shear(
            rotation_angle,
            horizontal_scale,
            vertical_scale,
            Fixed::ZERO,
            Fixed::ZERO,
            horizontal_flip,
            vertical_flip,
        )
    }

    /// Creates attributes from every parameter.
    ///
    /// # Panics
    ///
    /// Panics if either scale is not positive, or if the angle is outside
    /// `[0, 360]`.
    #[must_use]
    #[track_caller]
    pub fn with_shear(
        rotation_angle: Fixed,
        horizontal_scale: Fixed,
        vertical_scale: Fixed,
        horizontal_shear: Fixed,
        vertical_shear: Fixed,
        horizontal_flip: bool,
        vertical_flip: bool,
    ) -> Self {
        assert!(
            horizontal_scale > Fixed::ZERO,
            "invalid horizontal scale: {horizontal_scale}"
        );
        assert!(
            vertical_scale > Fixed::ZERO,
            "invalid vertical scale: {vertical_scale}"
        );

        let mut result = Self {
            rotation_angle,
            horizontal_scale,
            vertical_scale,
            horizontal_shear,
            vertical_shear,
            hflip: flip_sign(horizontal_flip),
            vflip: flip_sign(vertical_flip),
            ..Self::IDENTITY
        };
        result.update_rotation_angle();
        result.update_horizontal_scale();
        result.update_vertical_scale();
        result.update_pa();
        result.update_pb();
        result.update_pc();
        result.update_pd();
        result
    }

    // -- Rotation --

    /// Returns the rotation angle in degrees.
    #[inline]
    #[must_use]
    pub const fn rotation_angle(&self) -> Fixed {
        self.rotation_angle
    }

    /// Sets the rotation angle in degrees, in `[0, 360]`.
    ///
    /// Recomputes all four registers.
    ///
    /// # Panics
    ///
    /// Panics if the angle is outside `[0, 360]`.
    #[track_caller]
    pub fn set_rotation_angle(&mut self, rotation_angle: Fixed) {
        self.rotation_angle = rotation_angle;
        self.update_rotation_angle();
        self.update_pa();
        self.update_pb();
        self.update_pc();
        self.update_pd();
    }

    /// Sets the rotation angle in degrees, wrapping any value into `[0, 360)`.
    pub fn set_rotation_angle_safe(&mut self, rotation_angle: Fixed) {
        self.set_rotation_angle(safe_degrees_angle(rotation_angle));
    }

    // -- Scale --

    /// Returns the horizontal scale.
    #[inline]
    #[must_use]
    pub const fn horizontal_scale(&self) -> Fixed {
        self.horizontal_scale
    }

    /// Sets the horizontal scale.
    ///
    /// Recomputes `pa` and `pb`.
    ///
    /// # Panics
    ///
    /// Panics if the scale is not positive.
    #[track_caller]
    pub fn set_horizontal_scale(&mut self, horizontal_scale: Fixed) {
        assert!(
            horizontal_scale > Fixed::ZERO,
            "invalid horizontal scale: {horizontal_scale}"
        );
        self.horizontal_scale = horizontal_scale;
        self.update_horizontal_scale();
        self.update_pa();
        self.update_pb();
    }

    /// Returns the vertical scale.
    #[inline]
    #[must_use]
    pub const fn vertical_scale(&self) -> Fixed {
        self.vertical_scale
    }

    /// Sets the vertical scale.
    ///
    /// Recomputes `pc` and `pd`.
    ///
    /// # Panics
    ///
    /// Panics if the scale is not positive.
    #[track_caller]
    pub fn set_vertical_scale(&mut self, vertical_scale: Fixed) {
        assert!(
            vertical_scale > Fixed::ZERO,
            "invalid vertical scale: {vertical_scale}"
        );
        self.vertical_scale = vertical_scale;
        self.update_vertical_scale();
        self.update_pc();
        self.update_pd();
    }

    /// Sets both scales to the same value.
    ///
    /// # Panics
    ///
    /// Panics if the scale is not positive.
    #[track_caller]
    pub fn set_scale(&mut self, scale: Fixed) {
        assert!(scale > Fixed::ZERO, "invalid scale: {scale}");
        self.horizontal_scale = scale;
        self.vertical_scale = scale;
        self.update_horizontal_scale();
        self.sy = self.sx;
        self.update_pa();
        self.update_pb();
        self.update_pc();
        self.update_pd();
    }

    /// Sets both scales.
    ///
    /// # Panics
    ///
    /// Panics if either scale is not positive.
    #[track_caller]
    pub fn set_scale_xy(&mut self, horizontal_scale: Fixed, vertical_scale: Fixed) {
        assert!(
            horizontal_scale > Fixed::ZERO,
            "invalid horizontal scale: {horizontal_scale}"
        );
        assert!(
            vertical_scale > Fixed::ZERO,
            "invalid vertical scale: {vertical_scale}"
        );
        self.horizontal_scale = horizontal_scale;
        self.vertical_scale = vertical_scale;
        self.update_horizontal_scale();
        self.update_vertical_scale();
        self.update_pa();
        self.update_pb();
        self.update_pc();
        self.update_pd();
    }

    // -- Shear --

    /// Returns the horizontal shear.
    #[inline]
    #[must_use]
    pub const fn horizontal_shear(&self) -> Fixed {
        self.horizontal_shear
    }

    /// Sets the horizontal shear. Recomputes `pb` only.
    pub fn set_horizontal_shear(&mut self, horizontal_shear: Fixed) {
        self.horizontal_shear = horizontal_shear;
        self.update_pb();
    }

    /// Returns the vertical shear.
    #[inline]
    #[must_use]
    pub const fn vertical_shear(&self) -> Fixed {
        self.vertical_shear
    }

    /// Sets the vertical shear. Recomputes `pc` only.
    pub fn set_vertical_shear(&mut self, vertical_shear: Fixed) {
        self.vertical_shear = vertical_shear;
        self.update_pc();
    }

    /// Sets both shears to the same value.
    pub fn set_shear(&mut self, shear: Fixed) {
        self.set_horizontal_shear(shear);
        self.set_vertical_shear(shear);
    }

    /// Sets both shears.
    pub fn set_shear_xy(&mut self, horizontal_shear: Fixed, vertical_shear: Fixed) {
        self.set_horizontal_shear(horizontal_shear);
        self.set_vertical_shear(vertical_shear);
    }

    // -- Flip --

    /// Returns whether the matrix is flipped horizontally.
    #[inline]
    #[must_use]
    pub const fn horizontal_flip(&self) -> bool {
        self.hflip < 0
    }

    /// Sets whether the matrix is flipped horizontally.
    ///
    /// Recomputes `pa` and `pb`.
    pub fn set_horizontal_flip(&mut self, horizontal_flip: bool) {
        self.hflip = flip_sign(horizontal_flip);
        self.update_pa();
        self.update_pb();
    }

    /// Returns whether the matrix is flipped vertically.
    #[inline]
    #[must_use]
    pub const fn vertical_flip(&self) -> bool {
        self.vflip < 0
    }

    /// Sets whether the matrix is flipped vertically.
    ///
    /// Recomputes `pc` and `pd`.
    pub fn set_vertical_flip(&mut self, vertical_flip: bool) {
        self.vflip = flip_sign(vertical_flip);
        self.update_pc();
        self.update_pd();
    }

    // -- Queries --

    /// Returns whether this is exactly the identity matrix, registers
    /// included.
    #[must_use]
    pub fn identity(&self) -> bool {
        self.rotation_angle == Fixed::ZERO
            && self.horizontal_scale == Fixed::ONE
            && self.vertical_scale == Fixed::ONE
            && self.horizontal_shear == Fixed::ZERO
            && self.vertical_shear == Fixed::ZERO
            && self.hflip >= 0
            && self.vflip >= 0
            && self.register_values() == AffineMatRegisters::IDENTITY
    }

    /// Returns whether this is the identity matrix, ignoring flips.
    ///
    /// A pure flip costs no more to render than no transform at all, so
    /// this is the check to use when deciding whether a matrix is needed.
    #[must_use]
    pub fn flipped_identity(&self) -> bool {
        self.rotation_angle == Fixed::ZERO
            && self.horizontal_scale == Fixed::ONE
            && self.vertical_scale == Fixed::ONE
            && self.horizontal_shear == Fixed::ZERO
            && self.vertical_shear == Fixed::ZERO
            && self.pa.unsigned_abs() == 256
            && self.pb == 0
            && self.pc == 0
            && self.pd.unsigned_abs() == 256
    }

    /// Returns the value of the first register.
    #[inline]
    #[must_use]
    pub const fn pa_register_value(&self) -> i16 {
        self.pa
    }

    /// Returns the value of the second register.
    #[inline]
    #[must_use]
    pub const fn pb_register_value(&self) -> i16 {
        self.pb
    }

    /// Returns the value of the third register.
    #[inline]
    #[must_use]
    pub const fn pc_register_value(&self) -> i16 {
        self.pc
    }

    /// Returns the value of the fourth register.
    #[inline]
    #[must_use]
    pub const fn pd_register_value(&self) -> i16 {
        self.pd
    }

    /// Returns all four register values.
    #[inline]
    #[must_use]
    pub const fn register_values(&self) -> AffineMatRegisters {
        AffineMatRegisters {
            pa: self.pa,
            pb: self.pb,
            pc: self.pc,
            pd: self.pd,
        }
    }

    /// Returns the register matrix as a float transform.
    ///
    /// The result maps screen coordinates to texture coordinates, the
    /// direction in which the hardware applies the matrix. Intended for
    /// previews and tooling; nothing in the register pipeline uses it.
    #[must_use]
    pub fn to_affine(&self) -> kurbo::Affine {
        const ONE: f64 = 256.0;
        kurbo::Affine::new([
            f64::from(self.pa) / ONE,
            f64::from(self.pc) / ONE,
            f64::from(self.pb) / ONE,
            f64::from(self.pd) / ONE,
            0.0,
            0.0,
        ])
    }

    // -- Derived state --

    #[track_caller]
    fn update_rotation_angle(&mut self) {
        if self.rotation_angle == Fixed::ZERO {
            self.sin = 0;
            self.cos = 4096;
        } else {
            let (sin, cos) = degrees_lut_sin_and_cos(self.rotation_angle);
            self.sin = register(sin.data());
            self.cos = register(cos.data());
        }
    }

    fn update_horizontal_scale(&mut self) {
        self.sx = output_scale(self.horizontal_scale);
    }

    fn update_vertical_scale(&mut self) {
        self.sy = output_scale(self.vertical_scale);
    }

    fn update_pa(&mut self) {
        let sx = i32::from(self.sx) * i32::from(self.hflip);
        self.pa = register((i32::from(self.cos) * sx) >> 12);
    }

    fn update_pb(&mut self) {
        let sx = i32::from(self.sx) * i32::from(self.hflip);
        let rot_scale = (-i32::from(self.sin) * sx) >> 12;
        let shear = self.horizontal_shear.data() >> 4;
        self.pb = register(rot_scale.wrapping_add(shear));
    }

    fn update_pc(&mut self) {
        let sy = i32::from(self.sy) * i32::from(self.vflip);
        let rot_scale = (i32::from(self.sin) * sy) >> 12;
        let shear = self.vertical_shear.data() >> 4;
        self.pc = register(rot_scale.wrapping_add(shear));
    }

    fn update_pd(&mut self) {
        let sy = i32::from(self.sy) * i32::from(self.vflip);
        self.pd = register((i32::from(self.cos) * sy) >> 12);
    }
}

/// Escape hatch for writing registers directly.
impl AffineMatAttributes {
    /// Overwrites the four register values without touching any other field.
    ///
    /// # Consistency
    ///
    /// After this call the registers no longer follow the angle, scale, shear
    /// and flip fields, and [`identity`](Self::identity) and
    /// [`flipped_identity`](Self::flipped_identity) may disagree with the
    /// field accessors. Any later mutator recomputes the registers that
    /// depend on the field it changes, and only those.
    pub fn override_register_values(&mut self, pa: i32, pb: i32, pc: i32, pd: i32) {
        self.pa = register(pa);
        self.pb = register(pb);
        self.pc = register(pc);
        self.pd = register(pd);
    }
}

const fn flip_sign(flip: bool) -> i8 {
    if flip { -1 } else { 1 }
}

/// Truncates to a 16-bit register, wrapping on overflow.
#[expect(
    clippy::cast_possible_truncation,
    reason = "registers are 16 bits wide and wrap on overflow"
)]
const fn register(value: i32) -> i16 {
    value as i16
}

/// Returns the 8-bit reciprocal of `scale`.
///
/// Scales at or below the minimum clamp to the reciprocal of the minimum.
/// Otherwise the 8-bit scale indexes [`RECIPROCAL_16_LUT`], falling back to
/// the closed form past the end of the table.
#[expect(
    clippy::cast_possible_truncation,
    reason = "reciprocals of scales above the minimum fit in 16 bits"
)]
fn output_scale(scale: Fixed) -> u16 {
    if scale <= MIN_SCALE {
        return FixedT::<8>::from_int(MIN_INV_SCALE).data() as u16;
    }

    let index = scale.rescale::<8>().data();
    let reciprocal = if (index as usize) < RECIPROCAL_LUT_SIZE {
        RECIPROCAL_16_LUT[index as usize]
    } else {
        reciprocal_lut_value::<16>(index)
    };
    reciprocal.data() as u16
}
