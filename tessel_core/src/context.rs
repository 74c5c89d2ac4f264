// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The set of pools an engine owns.
//!
//! A [`ResourceContext`] is created once at engine start and holds one
//! [`Pool`](crate::pool::Pool) per [`ResourceClass`]. Dropping the context
//! releases its references to the pools; handles that are still alive keep
//! their pool alive until they drop.

use alloc::vec::Vec;

use crate::pool::{ResourceClass, ResourceKind};
use crate::resource::{AffineMatPool, AffineMats, PalettePool, Palettes, TileSetPool, TileSets};
use crate::trace::Tracer;

/// Pool capacities and tracing for a [`ResourceContext`].
#[derive(Clone, Debug)]
pub struct ContextConfig {
    /// Number of affine matrix slots.
    pub affine_mat_capacity: u16,
    /// Number of 32-byte tile units.
    pub tile_capacity: u16,
    /// Number of 16-color palette banks.
    pub palette_capacity: u16,
    /// Sink shared by all three pools.
    pub tracer: Tracer,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            affine_mat_capacity: AffineMats::DEFAULT_CAPACITY,
            tile_capacity: TileSets::DEFAULT_CAPACITY,
            palette_capacity: Palettes::DEFAULT_CAPACITY,
            tracer: Tracer::none(),
        }
    }
}

/// Slots whose content must be uploaded, per class, each list sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitBatch {
    /// Affine matrix slots.
    pub affine_mats: Vec<u16>,
    /// First tile unit of each changed tile set.
    pub tiles: Vec<u16>,
    /// First bank of each changed palette.
    pub palettes: Vec<u16>,
}

impl CommitBatch {
    /// Whether nothing needs uploading.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.affine_mats.is_empty() && self.tiles.is_empty() && self.palettes.is_empty()
    }

    /// The list for `class`.
    #[must_use]
    pub fn for_class(&self, class: ResourceClass) -> &[u16] {
        match class {
            ResourceClass::AffineMat => &self.affine_mats,
            ResourceClass::Tiles => &self.tiles,
            ResourceClass::Palette => &self.palettes,
        }
    }
}

/// Owns one pool per resource class.
#[derive(Debug)]
pub struct ResourceContext {
    affine_mats: AffineMatPool,
    tiles: TileSetPool,
    palettes: PalettePool,
}

impl Default for ResourceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceContext {
    /// Creates pools with the hardware capacities and no tracing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
    }

    /// Creates pools as described by `config`.
    ///
    /// # Panics
    ///
    /// Panics if any capacity is zero.
    #[must_use]
    #[track_caller]
    pub fn with_config(config: ContextConfig) -> Self {
        Self {
            affine_mats: AffineMatPool::with_tracer(
                config.affine_mat_capacity,
                config.tracer.clone(),
            ),
            tiles: TileSetPool::with_tracer(config.tile_capacity, config.tracer.clone()),
            palettes: PalettePool::with_tracer(config.palette_capacity, config.tracer),
        }
    }

    /// The affine matrix pool.
    #[must_use]
    pub fn affine_mats(&self) -> &AffineMatPool {
        &self.affine_mats
    }

    /// The tile pool.
    #[must_use]
    pub fn tiles(&self) -> &TileSetPool {
        &self.tiles
    }

    /// The palette pool.
    #[must_use]
    pub fn palettes(&self) -> &PalettePool {
        &self.palettes
    }

    /// Slots in use across all classes.
    #[must_use]
    pub fn used_count(&self) -> u32 {
        u32::from(self.affine_mats.used_count())
            + u32::from(self.tiles.used_count())
            + u32::from(self.palettes.used_count())
    }

    /// Drains the commit record of every pool.
    pub fn drain_commits(&self) -> CommitBatch {
        CommitBatch {
            affine_mats: self.affine_mats.drain_commits(),
            tiles: self.tiles.drain_commits(),
            palettes: self.palettes.drain_commits(),
        }
    }
}
