// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile memory.

use alloc::vec;
use alloc::vec::Vec;

use crate::pool::{Handle, Pool, ResourceClass, ResourceKind};

/// Tile data as uploaded: 4bpp 8×8 tiles, 32 bytes each.
///
/// Always holds at least one tile.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TileSet {
    data: Vec<u8>,
}

impl TileSet {
    /// Bytes per tile.
    pub const TILE_BYTES: usize = 32;

    /// Wraps raw tile data.
    ///
    /// # Panics
    ///
    /// Panics if `data` is empty, its length is not a multiple of
    /// [`TILE_BYTES`](Self::TILE_BYTES), or it holds more tiles than a slot
    /// index can address.
    #[must_use]
    #[track_caller]
    pub fn new(data: Vec<u8>) -> Self {
        let len = data.len();
        assert!(
            len > 0 && len % Self::TILE_BYTES == 0,
            "invalid tile data length: {len}"
        );
        assert!(
            len / Self::TILE_BYTES <= usize::from(u16::MAX),
            "too many tiles: {}",
            len / Self::TILE_BYTES
        );
        Self { data }
    }

    /// Creates `tiles_count` tiles with every pixel set to color 0.
    ///
    /// # Panics
    ///
    /// Panics if `tiles_count` is zero.
    #[must_use]
    #[track_caller]
    pub fn zeroed(tiles_count: u16) -> Self {
        Self::new(vec![0; usize::from(tiles_count) * Self::TILE_BYTES])
    }

    /// Copies raw tile data.
    ///
    /// # Panics
    ///
    /// See [`new`](Self::new).
    #[must_use]
    #[track_caller]
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }

    /// Number of tiles.
    #[must_use]
    pub fn tiles_count(&self) -> u16 {
        // Bounded by `new`.
        u16::try_from(self.data.len() / Self::TILE_BYTES).unwrap_or(u16::MAX)
    }

    /// Raw tile data.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes of tile `index`, if it exists.
    #[must_use]
    pub fn tile(&self, index: u16) -> Option<&[u8]> {
        let start = usize::from(index) * Self::TILE_BYTES;
        self.data.get(start..start + Self::TILE_BYTES)
    }
}

impl core::fmt::Debug for TileSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TileSet")
            .field("tiles", &self.tiles_count())
            .finish_non_exhaustive()
    }
}

/// Marker for tile memory, allocated in 32-byte units.
#[derive(Debug)]
pub struct TileSets;

impl ResourceKind for TileSets {
    type Content = TileSet;
    const CLASS: ResourceClass = ResourceClass::Tiles;
    const DEFAULT_CAPACITY: u16 = 1024;

    fn span(content: &TileSet) -> u16 {
        content.tiles_count()
    }
}

/// Pool of tile memory.
pub type TileSetPool = Pool<TileSets>;

/// Shared handle to a run of tile memory.
pub type TileSetHandle = Handle<TileSets>;

impl Pool<TileSets> {
    /// Reserves `tiles_count` tiles in a new entry of its own, cleared to
    /// zero, for content that is written after allocation.
    ///
    /// The entry is never shared with an earlier one; see
    /// [`create_new`](Pool::create_new).
    ///
    /// # Panics
    ///
    /// Panics if `tiles_count` is zero or no free run is long enough.
    #[track_caller]
    pub fn allocate(&self, tiles_count: u16) -> TileSetHandle {
        self.create_new(TileSet::zeroed(tiles_count))
    }

    /// Like [`allocate`](Self::allocate), but returns `None` instead of
    /// panicking when the pool is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if `tiles_count` is zero.
    #[must_use]
    #[track_caller]
    pub fn allocate_optional(&self, tiles_count: u16) -> Option<TileSetHandle> {
        self.create_new_optional(TileSet::zeroed(tiles_count))
    }
}

impl Handle<TileSets> {
    /// Returns a copy of the tile data.
    #[must_use]
    pub fn tiles(&self) -> TileSet {
        self.content()
    }

    /// Number of tiles.
    #[must_use]
    pub fn tiles_count(&self) -> u16 {
        self.with_content(TileSet::tiles_count)
    }

    /// Replaces the tile data.
    ///
    /// # Panics
    ///
    /// Panics if `tiles` holds a different number of tiles.
    #[track_caller]
    pub fn set_tiles(&self, tiles: TileSet) {
        self.set_content(tiles);
    }
}
