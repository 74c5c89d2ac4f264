// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine matrix slots.

use crate::affine::{AffineMatAttributes, AffineMatRegisters};
use crate::fixed::Fixed;
use crate::pool::{Handle, Pool, ResourceClass, ResourceKind};

/// Marker for the affine matrix register slots.
#[derive(Debug)]
pub struct AffineMats;

impl ResourceKind for AffineMats {
    type Content = AffineMatAttributes;
    const CLASS: ResourceClass = ResourceClass::AffineMat;
    const DEFAULT_CAPACITY: u16 = 32;

    fn span(_content: &AffineMatAttributes) -> u16 {
        1
    }

    fn same_hardware_content(a: &AffineMatAttributes, b: &AffineMatAttributes) -> bool {
        a.register_values() == b.register_values()
    }
}

/// Pool of affine matrix slots.
pub type AffineMatPool = Pool<AffineMats>;

/// Shared handle to an affine matrix slot.
pub type AffineMatHandle = Handle<AffineMats>;

impl Handle<AffineMats> {
    /// Returns a copy of the matrix attributes.
    #[must_use]
    pub fn attributes(&self) -> AffineMatAttributes {
        self.content()
    }

    /// Replaces all attributes.
    pub fn set_attributes(&self, attributes: AffineMatAttributes) {
        self.set_content(attributes);
    }

    /// Returns the rotation angle in degrees.
    #[must_use]
    pub fn rotation_angle(&self) -> Fixed {
        self.with_content(AffineMatAttributes::rotation_angle)
    }

    /// Sets the rotation angle in degrees, in `[0, 360]`.
    ///
    /// # Panics
    ///
    /// Panics if the angle is outside `[0, 360]`.
    #[track_caller]
    pub fn set_rotation_angle(&self, rotation_angle: Fixed) {
        self.update(|attributes| attributes.set_rotation_angle(rotation_angle));
    }

    /// Sets the rotation angle in degrees, wrapping any value into `[0, 360)`.
    pub fn set_rotation_angle_safe(&self, rotation_angle: Fixed) {
        self.update(|attributes| attributes.set_rotation_angle_safe(rotation_angle));
    }

    /// Returns the horizontal scale.
    #[must_use]
    pub fn horizontal_scale(&self) -> Fixed {
        self.with_content(AffineMatAttributes::horizontal_scale)
    }

    /// Sets the horizontal scale.
    ///
    /// # Panics
    ///
    /// Panics if the scale is not positive.
    #[track_caller]
    pub fn set_horizontal_scale(&self, horizontal_scale: Fixed) {
        self.update(|attributes| attributes.set_horizontal_scale(horizontal_scale));
    }

    /// Returns the vertical scale.
    #[must_use]
    pub fn vertical_scale(&self) -> Fixed {
        self.with_content(AffineMatAttributes::vertical_scale)
    }

    /// Sets the vertical scale.
    ///
    /// # Panics
    ///
    /// Panics if the scale is not positive.
    #[track_caller]
    pub fn set_vertical_scale(&self, vertical_scale: Fixed) {
        self.update(|attributes| attributes.set_vertical_scale(vertical_scale));
    }

    /// Sets both scales to the same value.
    ///
    /// # Panics
    ///
    /// Panics if the scale is not positive.
    #[track_caller]
    pub fn set_scale(&self, scale: Fixed) {
        self.update(|attributes| attributes.set_scale(scale));
    }

    /// Sets both scales.
    ///
    /// # Panics
    ///
    /// Panics if either scale is not positive.
    #[track_caller]
    pub fn set_scale_xy(&self, horizontal_scale: Fixed, vertical_scale: Fixed) {
        self.update(|attributes| attributes.set_scale_xy(horizontal_scale, vertical_scale));
    }

    /// Returns the horizontal shear.
    #[must_use]
    pub fn horizontal_shear(&self) -> Fixed {
        self.with_content(AffineMatAttributes::horizontal_shear)
    }

    /// Sets the horizontal shear.
    pub fn set_horizontal_shear(&self, horizontal_shear: Fixed) {
        self.update(|attributes| attributes.set_horizontal_shear(horizontal_shear));
    }

    /// Returns the vertical shear.
    #[must_use]
    pub fn vertical_shear(&self) -> Fixed {
        self.with_content(AffineMatAttributes::vertical_shear)
    }

    /// Sets the vertical shear.
    pub fn set_vertical_shear(&self, vertical_shear: Fixed) {
        self.update(|attributes| attributes.set_vertical_shear(vertical_shear));
    }

    /// Sets both shears to the same value.
    pub fn set_shear(&self, shear: Fixed) {
        self.update(|attributes| attributes.set_shear(shear));
    }

    /// Sets both shears.
    pub fn set_shear_xy(&self, horizontal_shear: Fixed, vertical_shear: Fixed) {
        self.update(|attributes| attributes.set_shear_xy(horizontal_shear, vertical_shear));
    }

    /// Returns whether the matrix is flipped horizontally.
    #[must_use]
    pub fn horizontal_flip(&self) -> bool {
        self.with_content(AffineMatAttributes::horizontal_flip)
    }

    /// Sets whether the matrix is flipped horizontally.
    pub fn set_horizontal_flip(&self, horizontal_flip: bool) {
        self.update(|attributes| attributes.set_horizontal_flip(horizontal_flip));
    }

    /// Returns whether the matrix is flipped vertically.
    #[must_use]
    pub fn vertical_flip(&self) -> bool {
        self.with_content(AffineMatAttributes::vertical_flip)
    }

    /// Sets whether the matrix is flipped vertically.
    pub fn set_vertical_flip(&self, vertical_flip: bool) {
        self.update(|attributes| attributes.set_vertical_flip(vertical_flip));
    }

    /// See [`AffineMatAttributes::identity`].
    #[must_use]
    pub fn identity(&self) -> bool {
        self.with_content(AffineMatAttributes::identity)
    }

    /// See [`AffineMatAttributes::flipped_identity`].
    #[must_use]
    pub fn flipped_identity(&self) -> bool {
        self.with_content(AffineMatAttributes::flipped_identity)
    }

    /// Returns the four register values the slot uploads.
    #[must_use]
    pub fn register_values(&self) -> AffineMatRegisters {
        self.with_content(AffineMatAttributes::register_values)
    }
}

/// Escape hatch for writing registers directly.
impl Handle<AffineMats> {
    /// Overwrites the slot's four register values without touching any other
    /// field. Every handle sharing the slot sees the new registers, and the
    /// change is committed like any other.
    ///
    /// # Consistency
    ///
    /// After this call the registers no longer follow the angle, scale, shear
    /// and flip fields, and [`identity`](Self::identity) may disagree with
    /// them. See [`AffineMatAttributes::override_register_values`].
    pub fn override_register_values(&self, pa: i32, pb: i32, pc: i32, pd: i32) {
        self.update(|attributes| attributes.override_register_values(pa, pb, pc, pd));
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn rotated(degrees: i32) -> AffineMatAttributes {
        let mut attributes = AffineMatAttributes::IDENTITY;
        attributes.set_rotation_angle(Fixed::from_int(degrees));
        attributes
    }

    #[test]
    fn identical_attributes_share_a_slot() {
        let pool = AffineMatPool::default();
        let a = pool.create(rotated(30));
        let b = pool.create(rotated(30));
        let c = pool.create(rotated(31));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(pool.live_entries(), 2);
        assert_eq!(pool.capacity(), 32);
    }

    #[test]
    fn create_new_gives_an_independent_matrix() {
        let pool = AffineMatPool::new(4);
        let first = pool.create_new(AffineMatAttributes::IDENTITY);
        let second = pool.create_new(AffineMatAttributes::IDENTITY);
        assert_ne!(first, second);

        first.set_rotation_angle(Fixed::from_int(90));
        assert_eq!(first.register_values(), rotated(90).register_values());
        assert!(second.identity());
        assert_eq!(pool.live_entries(), 2);
    }

    #[test]
    fn setters_are_shared_by_aliases() {
        let pool = AffineMatPool::new(4);
        let a = pool.create(AffineMatAttributes::IDENTITY);
        let b = a.clone();
        a.set_rotation_angle(Fixed::from_int(90));
        assert_eq!(b.rotation_angle(), Fixed::from_int(90));
        assert_eq!(b.register_values(), rotated(90).register_values());
        assert!(!b.identity());
    }

    #[test]
    fn commit_only_on_register_change() {
        let pool = AffineMatPool::new(4);
        let a = pool.create(AffineMatAttributes::IDENTITY);
        assert_eq!(pool.drain_commits(), vec![a.index()]);

        // Shear below the register's resolution leaves the registers alone.
        a.set_horizontal_shear(Fixed::from_data(15));
        assert!(pool.drain_commits().is_empty());
        assert_eq!(a.horizontal_shear(), Fixed::from_data(15));

        a.set_horizontal_shear(Fixed::ONE);
        assert_eq!(pool.drain_commits(), vec![a.index()]);

        a.set_scale(Fixed::ONE);
        assert!(pool.drain_commits().is_empty());
    }

    #[test]
    fn flip_setters() {
        let pool = AffineMatPool::new(4);
        let a = pool.create(AffineMatAttributes::IDENTITY);
        a.set_horizontal_flip(true);
        assert!(a.horizontal_flip());
        assert!(!a.vertical_flip());
        assert!(a.flipped_identity());
        assert!(!a.identity());
        a.set_vertical_flip(true);
        assert_eq!(a.register_values(), AffineMatRegisters {
            pa: -256,
            pb: 0,
            pc: 0,
            pd: -256,
        });
    }

    #[test]
    fn scale_and_shear_setters() {
        let pool = AffineMatPool::new(4);
        let a = pool.create(AffineMatAttributes::IDENTITY);
        a.set_scale_xy(Fixed::from_int(2), Fixed::from_ratio(1, 2));
        assert_eq!(a.horizontal_scale(), Fixed::from_int(2));
        assert_eq!(a.vertical_scale(), Fixed::from_ratio(1, 2));
        a.set_shear_xy(Fixed::ONE, Fixed::from_ratio(1, 2));
        assert_eq!(a.vertical_shear(), Fixed::from_ratio(1, 2));
        let registers = a.register_values();
        assert_eq!((registers.pa, registers.pb, registers.pc, registers.pd), (
            128, 256, 128, 512
        ));
    }

    #[test]
    fn override_is_committed() {
        let pool = AffineMatPool::new(4);
        let a = pool.create(AffineMatAttributes::IDENTITY);
        let _ = pool.drain_commits();
        a.override_register_values(1, 2, 3, 4);
        assert_eq!(pool.drain_commits(), vec![a.index()]);
        assert_eq!(a.attributes().pb_register_value(), 2);
        // Fields are untouched, so the matrix only looks like an identity.
        assert_eq!(a.rotation_angle(), Fixed::ZERO);
        assert!(!a.flipped_identity());
    }

    #[test]
    fn set_rotation_angle_safe_wraps() {
        let pool = AffineMatPool::new(4);
        let a = pool.create(AffineMatAttributes::IDENTITY);
        a.set_rotation_angle_safe(Fixed::from_int(450));
        assert_eq!(a.attributes(), rotated(90));
    }

    #[test]
    fn failed_setter_leaves_slot_untouched() {
        extern crate std;

        let pool = AffineMatPool::new(4);
        let a = pool.create(rotated(10));
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            a.set_horizontal_scale(Fixed::ZERO);
        }));
        assert!(result.is_err());
        assert_eq!(a.attributes(), rotated(10));
        assert_eq!(a.usage_count(), 1);
    }

    #[test]
    #[should_panic(expected = "invalid vertical scale")]
    fn invalid_scale_through_handle_panics() {
        let pool = AffineMatPool::new(4);
        let a = pool.create(AffineMatAttributes::IDENTITY);
        a.set_vertical_scale(Fixed::from_int(-2));
    }
}
