// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared, deduplicating ownership of scarce hardware slots.
//!
//! A [`Pool`] manages a fixed-size table of hardware slots for one resource
//! class. Content is requested with [`Pool::create`]; the pool hands back a
//! [`Handle`] to an existing entry with identical content when there is one,
//! and only otherwise claims free slots. Every handle to the same entry
//! shares one usage count:
//!
//! - cloning a handle increments the count,
//! - dropping a handle decrements it,
//! - the entry is freed, and its slots returned to the table, when the count
//!   reaches zero.
//!
//! Moving or swapping handles never touches the pool.
//!
//! [`Pool::create_new`] skips the search and always claims fresh slots, for
//! callers that want an entry of their own to mutate.
//!
//! # Slot layout
//!
//! Entries may span several consecutive slots (a tile set covers one slot per
//! 32-byte tile, a palette one slot per 16-color bank). Free slots are kept as
//! coalesced runs and each request takes the shortest run that fits, lowest
//! index first among equals.
//!
//! # Failure
//!
//! Running out of slots is recoverable through the `_optional` entry points,
//! which return `None` and leave the pool untouched. The plain entry points
//! treat it as a programming error and panic.
//!
//! # Sharing model
//!
//! Pools and handles are single-threaded (`!Send`): a pool is an
//! `Rc<RefCell<..>>` shared by every handle it issued, so a handle outliving
//! the [`ResourceContext`](crate::context::ResourceContext) that created its
//! pool stays valid.

mod handle;
mod ranges;
mod state;

use core::fmt;

pub use handle::Handle;
pub use state::Pool;

/// The hardware resource classes managed by pools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    /// Affine matrix register slots.
    AffineMat,
    /// Tile memory, in 32-byte units.
    Tiles,
    /// Palette memory, in 16-color banks.
    Palette,
}

impl ResourceClass {
    /// Short lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AffineMat => "affine_mat",
            Self::Tiles => "tiles",
            Self::Palette => "palette",
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Describes one resource class to a [`Pool`].
///
/// Implemented by zero-sized marker types; see
/// [`resource`](crate::resource) for the provided classes.
pub trait ResourceKind: 'static {
    /// Content stored in each entry.
    ///
    /// [`Pool::create`] never makes a second entry with equal content;
    /// [`Pool::create_new`] and later mutation can.
    type Content: Clone + PartialEq + fmt::Debug;

    /// Class reported in trace events and panics.
    const CLASS: ResourceClass;

    /// Slot count of the hardware table.
    const DEFAULT_CAPACITY: u16;

    /// Number of consecutive slots `content` occupies. Must be at least 1.
    fn span(content: &Self::Content) -> u16;

    /// Whether the hardware would see any difference between the two.
    ///
    /// Replacing content with an equivalent value does not schedule a commit.
    fn same_hardware_content(a: &Self::Content, b: &Self::Content) -> bool {
        a == b
    }
}
