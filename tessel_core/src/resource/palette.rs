// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Palette memory.

use alloc::vec::Vec;
use core::fmt;

use crate::pool::{Handle, Pool, ResourceClass, ResourceKind};

/// A 15-bit color: 5 bits each of red, green and blue, red in the low bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    data: u16,
}

impl Color {
    /// Largest value of one channel.
    pub const MAX_CHANNEL: u8 = 31;

    /// Black.
    pub const BLACK: Self = Self { data: 0 };

    /// White.
    pub const WHITE: Self = Self { data: 0x7fff };

    /// Creates a color from its raw 15-bit value.
    ///
    /// # Panics
    ///
    /// Panics if bit 15 is set.
    #[must_use]
    #[track_caller]
    pub const fn new(data: u16) -> Self {
        assert!(data <= 0x7fff, "invalid color value");
        Self { data }
    }

    /// Creates a color from channels in `0..=31`.
    ///
    /// # Panics
    ///
    /// Panics if a channel is out of range.
    #[must_use]
    #[track_caller]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        assert!(
            red <= Self::MAX_CHANNEL && green <= Self::MAX_CHANNEL && blue <= Self::MAX_CHANNEL,
            "color channel out of range"
        );
        Self {
            data: red as u16 | (green as u16) << 5 | (blue as u16) << 10,
        }
    }

    /// Raw 15-bit value.
    #[inline]
    #[must_use]
    pub const fn data(self) -> u16 {
        self.data
    }

    /// Red channel.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "masked to 5 bits"
    )]
    pub const fn red(self) -> u8 {
        (self.data & 0x1f) as u8
    }

    /// Green channel.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "masked to 5 bits"
    )]
    pub const fn green(self) -> u8 {
        ((self.data >> 5) & 0x1f) as u8
    }

    /// Blue channel.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "masked to 5 bits"
    )]
    pub const fn blue(self) -> u8 {
        ((self.data >> 10) & 0x1f) as u8
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({}, {}, {})", self.red(), self.green(), self.blue())
    }
}

/// The colors of one palette: 16 colors per 4bpp bank, up to 16 banks for an
/// 8bpp palette.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PaletteColors {
    colors: Vec<Color>,
}

impl PaletteColors {
    /// Colors per bank.
    pub const BANK_COLORS: usize = 16;

    /// Largest palette.
    pub const MAX_COLORS: usize = 256;

    /// Wraps palette colors.
    ///
    /// # Panics
    ///
    /// Panics unless the count is a multiple of 16 in `16..=256`.
    #[must_use]
    #[track_caller]
    pub fn new(colors: Vec<Color>) -> Self {
        let count = colors.len();
        assert!(
            (Self::BANK_COLORS..=Self::MAX_COLORS).contains(&count)
                && count % Self::BANK_COLORS == 0,
            "invalid colors count: {count}"
        );
        Self { colors }
    }

    /// Copies palette colors.
    ///
    /// # Panics
    ///
    /// See [`new`](Self::new).
    #[must_use]
    #[track_caller]
    pub fn from_slice(colors: &[Color]) -> Self {
        Self::new(colors.to_vec())
    }

    /// The colors.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Number of colors.
    #[must_use]
    pub fn colors_count(&self) -> u16 {
        // Bounded by `new`.
        u16::try_from(self.colors.len()).unwrap_or(u16::MAX)
    }

    /// Number of 16-color banks.
    #[must_use]
    pub fn banks(&self) -> u16 {
        self.colors_count() / 16
    }

    /// Bits per pixel of images using this palette: 4 for a single bank,
    /// 8 otherwise.
    #[must_use]
    pub fn bpp(&self) -> u8 {
        if self.colors.len() == Self::BANK_COLORS {
            4
        } else {
            8
        }
    }

    /// Replaces color `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn set_color(&mut self, index: usize, color: Color) {
        let count = self.colors.len();
        assert!(index < count, "color index {index} out of range ({count} colors)");
        self.colors[index] = color;
    }
}

impl fmt::Debug for PaletteColors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaletteColors")
            .field("count", &self.colors.len())
            .field("first", &self.colors.first())
            .finish_non_exhaustive()
    }
}

/// Marker for palette memory, allocated in 16-color banks.
#[derive(Debug)]
pub struct Palettes;

impl ResourceKind for Palettes {
    type Content = PaletteColors;
    const CLASS: ResourceClass = ResourceClass::Palette;
    const DEFAULT_CAPACITY: u16 = 16;

    fn span(content: &PaletteColors) -> u16 {
        content.banks()
    }
}

/// Pool of palette banks.
pub type PalettePool = Pool<Palettes>;

/// Shared handle to a palette.
pub type PaletteHandle = Handle<Palettes>;

impl Handle<Palettes> {
    /// Returns a copy of the palette colors.
    #[must_use]
    pub fn colors(&self) -> PaletteColors {
        self.content()
    }

    /// Number of colors.
    #[must_use]
    pub fn colors_count(&self) -> u16 {
        self.with_content(PaletteColors::colors_count)
    }

    /// Bits per pixel of images using this palette.
    #[must_use]
    pub fn bpp(&self) -> u8 {
        self.with_content(PaletteColors::bpp)
    }

    /// Replaces all colors.
    ///
    /// # Panics
    ///
    /// Panics if `colors` has a different count.
    #[track_caller]
    pub fn set_colors(&self, colors: PaletteColors) {
        self.set_content(colors);
    }

    /// Replaces one color.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[track_caller]
    pub fn set_color(&self, index: usize, color: Color) {
        self.update(|colors| colors.set_color(index, color));
    }
}
