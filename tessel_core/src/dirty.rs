// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commit-tracking channel constants.
//!
//! Every [`Pool`](crate::pool::Pool) keeps a [`DirtyTracker`] (via
//! [`understory_dirty`]) recording which slots hold content the hardware has
//! not seen yet. Each resource class marks its own channel, so one drain pass
//! per class hands the commit step exactly the slots it has to upload.
//!
//! # Marking
//!
//! A slot is marked when it is allocated and whenever a mutation through a
//! handle changes its hardware-visible content. For affine matrices that is
//! the register values: a setter that leaves all four registers unchanged
//! does not mark. Freed slots are removed from tracking, so a drain never
//! reports a slot that is no longer allocated.
//!
//! None of the channels propagate; slots are independent of one another.
//!
//! # Consumption
//!
//! [`Pool::drain_commits`](crate::pool::Pool::drain_commits) and
//! [`ResourceContext::drain_commits`](crate::context::ResourceContext::drain_commits)
//! drain in deterministic order and return sorted slot indices.
//!
//! [`DirtyTracker`]: understory_dirty::DirtyTracker

use understory_dirty::Channel;

use crate::pool::ResourceClass;

/// Affine matrix registers changed.
pub const AFFINE_MATS: Channel = Channel::new(0);

/// Tile data changed.
pub const TILES: Channel = Channel::new(1);

/// Palette colors changed.
pub const PALETTES: Channel = Channel::new(2);

/// Returns the commit channel used by `class`.
#[inline]
#[must_use]
pub const fn commit_channel(class: ResourceClass) -> Channel {
    match class {
        ResourceClass::AffineMat => AFFINE_MATS,
        ResourceClass::Tiles => TILES,
        ResourceClass::Palette => PALETTES,
    }
}
