// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The resource classes backed by hardware slots.
//!
//! Each class is a marker type implementing
//! [`ResourceKind`](crate::pool::ResourceKind), with aliases for its pool and
//! handle and class-specific methods on the handle:
//!
//! | Class | Content | Slot unit | Default capacity |
//! |-------|---------|-----------|------------------|
//! | [`AffineMats`] | [`AffineMatAttributes`](crate::affine::AffineMatAttributes) | one matrix | 32 |
//! | [`TileSets`] | [`TileSet`] | 32 bytes | 1024 |
//! | [`Palettes`] | [`PaletteColors`] | 16 colors | 16 |

mod affine_mat;
mod palette;
mod tiles;

pub use affine_mat::{AffineMatHandle, AffineMatPool, AffineMats};
pub use palette::{Color, PaletteColors, PaletteHandle, PalettePool, Palettes};
pub use tiles::{TileSet, TileSetHandle, TileSetPool, TileSets};
