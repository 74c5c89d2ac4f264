// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for resource pools.
//!
//! This module provides a [`TraceSink`] trait with one method per pool event.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional shared sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing and the sink is dropped
//! at construction. When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! Sinks are shared as `Rc<RefCell<dyn TraceSink>>` so several pools can feed
//! one sink and the caller can keep a reference to read it back. Sinks must
//! not call back into the pool that is reporting to them.
//!
//! Every event carries a sequence number that increases by one per event
//! within a pool, giving a total order without a clock.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`UsageEvent`] and
//!   [`TraceSink::on_usage_changed`], emitted on every share-count change.

#[cfg(feature = "trace")]
use alloc::rc::Rc;
#[cfg(feature = "trace")]
use core::cell::RefCell;

use crate::pool::ResourceClass;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a request allocates a new slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocateEvent {
    /// Per-pool event counter.
    pub sequence: u64,
    /// Resource class of the pool.
    pub class: ResourceClass,
    /// First slot of the allocation.
    pub index: u16,
    /// Number of slots the allocation covers.
    pub span: u16,
}

/// Emitted when a request is satisfied by an existing equivalent entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReuseEvent {
    /// Per-pool event counter.
    pub sequence: u64,
    /// Resource class of the pool.
    pub class: ResourceClass,
    /// First slot of the shared entry.
    pub index: u16,
    /// Number of slots the entry covers.
    pub span: u16,
    /// Share count after the reuse.
    pub usage_count: u32,
}

/// Emitted when the last handle to an entry is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeEvent {
    /// Per-pool event counter.
    pub sequence: u64,
    /// Resource class of the pool.
    pub class: ResourceClass,
    /// First slot of the released entry.
    pub index: u16,
    /// Number of slots returned to the pool.
    pub span: u16,
}

/// Emitted when a request finds no free run of slots large enough.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExhaustedEvent {
    /// Per-pool event counter.
    pub sequence: u64,
    /// Resource class of the pool.
    pub class: ResourceClass,
    /// Number of slots requested.
    pub requested_span: u16,
    /// Total free slots at the time of the request.
    pub available: u16,
    /// Longest contiguous run of free slots.
    pub largest_free_block: u16,
}

/// Emitted when a handle mutation changes hardware-visible content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitEvent {
    /// Per-pool event counter.
    pub sequence: u64,
    /// Resource class of the pool.
    pub class: ResourceClass,
    /// First slot of the changed entry.
    pub index: u16,
    /// Number of slots to upload.
    pub span: u16,
}

/// Emitted on every share-count change of a live entry.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UsageEvent {
    /// Per-pool event counter.
    pub sequence: u64,
    /// Resource class of the pool.
    pub class: ResourceClass,
    /// First slot of the entry.
    pub index: u16,
    /// Share count after the change.
    pub usage_count: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from resource pools.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a new slot is allocated.
    fn on_allocate(&mut self, e: &AllocateEvent) {
        _ = e;
    }

    /// Called when a request shares an existing entry.
    fn on_reuse(&mut self, e: &ReuseEvent) {
        _ = e;
    }

    /// Called when an entry is released.
    fn on_free(&mut self, e: &FreeEvent) {
        _ = e;
    }

    /// Called when a request cannot be satisfied.
    fn on_exhausted(&mut self, e: &ExhaustedEvent) {
        _ = e;
    }

    /// Called when an entry's hardware-visible content changes.
    fn on_commit(&mut self, e: &CommitEvent) {
        _ = e;
    }

    /// Called on every share-count change (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_usage_changed(&mut self, e: &UsageEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional shared [`TraceSink`].
///
/// Cloning a tracer shares the sink.
#[derive(Clone, Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Rc<RefCell<dyn TraceSink>>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: alloc::rc::Rc<core::cell::RefCell<dyn TraceSink>>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns whether events reach a sink.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits an [`AllocateEvent`].
    #[inline]
    pub fn allocate(&self, e: &AllocateEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &self.sink {
            s.borrow_mut().on_allocate(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ReuseEvent`].
    #[inline]
    pub fn reuse(&self, e: &ReuseEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &self.sink {
            s.borrow_mut().on_reuse(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FreeEvent`].
    #[inline]
    pub fn free(&self, e: &FreeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &self.sink {
            s.borrow_mut().on_free(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`ExhaustedEvent`].
    #[inline]
    pub fn exhausted(&self, e: &ExhaustedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &self.sink {
            s.borrow_mut().on_exhausted(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CommitEvent`].
    #[inline]
    pub fn commit(&self, e: &CommitEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &self.sink {
            s.borrow_mut().on_commit(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`UsageEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn usage_changed(&self, e: &UsageEvent) {
        if let Some(s) = &self.sink {
            s.borrow_mut().on_usage_changed(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
