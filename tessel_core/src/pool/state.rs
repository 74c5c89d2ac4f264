// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pool storage: slot table, usage counts and commit tracking.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use understory_dirty::{CycleHandling, DirtyTracker};

use super::handle::Handle;
use super::ranges::FreeRanges;
use super::ResourceKind;
use crate::dirty;
use crate::trace::{AllocateEvent, CommitEvent, ExhaustedEvent, FreeEvent, ReuseEvent, Tracer};

/// A live entry, stored at its first slot.
#[derive(Debug)]
pub(crate) struct Entry<C> {
    pub(crate) content: C,
    pub(crate) span: u16,
    pub(crate) usage: u32,
}

/// Shared state behind a [`Pool`] and all of its handles.
pub(crate) struct PoolState<K: ResourceKind> {
    // -- Slot table --
    capacity: u16,
    entries: Vec<Option<Entry<K::Content>>>,
    free: FreeRanges,
    live: u16,

    // -- Commit tracking --
    dirty: DirtyTracker<u32>,

    // -- Diagnostics --
    tracer: Tracer,
    sequence: u64,
}

impl<K: ResourceKind> PoolState<K> {
    fn new(capacity: u16, tracer: Tracer) -> Self {
        let mut entries = Vec::with_capacity(usize::from(capacity));
        entries.resize_with(usize::from(capacity), || None);
        Self {
            capacity,
            entries,
            free: FreeRanges::new(capacity),
            live: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            tracer,
            sequence: 0,
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }

    pub(crate) fn entry(&self, index: u16) -> Option<&Entry<K::Content>> {
        self.entries.get(usize::from(index))?.as_ref()
    }

    /// Lowest slot holding content equal to `content`.
    fn find(&self, content: &K::Content) -> Option<u16> {
        (0..self.capacity).find(|&index| {
            self.entry(index)
                .is_some_and(|entry| entry.content == *content)
        })
    }

    /// Shares an equal entry or claims slots for a new one.
    fn acquire(&mut self, content: K::Content) -> Option<u16> {
        if let Some(index) = self.find(&content) {
            let usage_count = self.retain(index);
            let span = self.entry(index).map_or(0, |entry| entry.span);
            let sequence = self.next_sequence();
            self.tracer.reuse(&ReuseEvent {
                sequence,
                class: K::CLASS,
                index,
                span,
                usage_count,
            });
            return Some(index);
        }
        self.allocate(content)
    }

    /// Claims slots for `content` without looking for an equal entry.
    ///
    /// Returns `None`, with no other effect than an exhaustion trace event,
    /// when no free run is long enough.
    fn allocate(&mut self, content: K::Content) -> Option<u16> {
        let span = K::span(&content);
        assert!(span > 0, "{} content with zero span", K::CLASS);

        let Some(index) = self.free.allocate(span) else {
            let sequence = self.next_sequence();
            self.tracer.exhausted(&ExhaustedEvent {
                sequence,
                class: K::CLASS,
                requested_span: span,
                available: self.free.available(),
                largest_free_block: self.free.largest(),
            });
            return None;
        };

        self.entries[usize::from(index)] = Some(Entry {
            content,
            span,
            usage: 1,
        });
        self.live += 1;
        self.dirty
            .mark(u32::from(index), dirty::commit_channel(K::CLASS));

        let sequence = self.next_sequence();
        self.tracer.allocate(&AllocateEvent {
            sequence,
            class: K::CLASS,
            index,
            span,
        });
        Some(index)
    }

    /// Adds one owner to the entry at `index` and returns the new count.
    pub(crate) fn retain(&mut self, index: u16) -> u32 {
        let Some(entry) = self.entries[usize::from(index)].as_mut() else {
            unreachable!("retain of unallocated {} slot {index}", K::CLASS);
        };
        entry.usage += 1;
        let usage_count = entry.usage;
        self.trace_usage(index, usage_count);
        usage_count
    }

    /// Removes one owner from the entry at `index`, freeing it at zero.
    pub(crate) fn release(&mut self, index: u16) {
        let Some(entry) = self.entries[usize::from(index)].as_mut() else {
            unreachable!("release of unallocated {} slot {index}", K::CLASS);
        };
        entry.usage -= 1;
        let usage_count = entry.usage;
        let span = entry.span;
        if usage_count > 0 {
            self.trace_usage(index, usage_count);
            return;
        }

        self.entries[usize::from(index)] = None;
        self.free.release(index, span);
        self.live -= 1;
        self.dirty.remove_key(u32::from(index));

        let sequence = self.next_sequence();
        self.tracer.free(&FreeEvent {
            sequence,
            class: K::CLASS,
            index,
            span,
        });
    }

    /// Replaces the content of the entry at `index`.
    ///
    /// Schedules a commit only if the hardware would see the change.
    #[track_caller]
    pub(crate) fn replace(&mut self, index: u16, content: K::Content) {
        let Some(entry) = self.entries[usize::from(index)].as_mut() else {
            unreachable!("replace on unallocated {} slot {index}", K::CLASS);
        };
        let span = K::span(&content);
        assert!(
            span == entry.span,
            "{} content span changed from {} to {span}",
            K::CLASS,
            entry.span
        );

        let changed = !K::same_hardware_content(&entry.content, &content);
        entry.content = content;
        if changed {
            self.dirty
                .mark(u32::from(index), dirty::commit_channel(K::CLASS));
            let sequence = self.next_sequence();
            self.tracer.commit(&CommitEvent {
                sequence,
                class: K::CLASS,
                index,
                span,
            });
        }
    }

    /// Drains the commit channel into sorted live slot indices.
    fn drain_commits(&mut self) -> Vec<u16> {
        let drained: Vec<u32> = self
            .dirty
            .drain(dirty::commit_channel(K::CLASS))
            .deterministic()
            .run()
            .collect();
        let mut indices: Vec<u16> = drained
            .into_iter()
            .filter_map(|index| u16::try_from(index).ok())
            .filter(|&index| self.entry(index).is_some())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    #[cfg(feature = "trace-rich")]
    fn trace_usage(&mut self, index: u16, usage_count: u32) {
        let sequence = self.next_sequence();
        self.tracer.usage_changed(&crate::trace::UsageEvent {
            sequence,
            class: K::CLASS,
            index,
            usage_count,
        });
    }

    #[cfg(not(feature = "trace-rich"))]
    fn trace_usage(&mut self, index: u16, usage_count: u32) {
        _ = (index, usage_count);
    }
}

/// A fixed-size table of hardware slots for one resource class.
///
/// Cloning a `Pool` shares the same table.
pub struct Pool<K: ResourceKind> {
    pub(super) state: Rc<RefCell<PoolState<K>>>,
}

impl<K: ResourceKind> Clone for Pool<K> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<K: ResourceKind> Default for Pool<K> {
    fn default() -> Self {
        Self::new(K::DEFAULT_CAPACITY)
    }
}

impl<K: ResourceKind> fmt::Debug for Pool<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Pool")
            .field("class", &K::CLASS)
            .field("capacity", &state.capacity)
            .field("live_entries", &state.live)
            .field("available", &state.free.available())
            .finish_non_exhaustive()
    }
}

impl<K: ResourceKind> Pool<K> {
    /// Creates a pool with `capacity` slots and no tracing.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    #[track_caller]
    pub fn new(capacity: u16) -> Self {
        Self::with_tracer(capacity, Tracer::none())
    }

    /// Creates a pool with `capacity` slots reporting to `tracer`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    #[track_caller]
    pub fn with_tracer(capacity: u16, tracer: Tracer) -> Self {
        assert!(capacity > 0, "{} pool with zero capacity", K::CLASS);
        Self {
            state: Rc::new(RefCell::new(PoolState::new(capacity, tracer))),
        }
    }

    // -- Allocation API --

    /// Returns a handle to content equal to `content`, allocating slots for
    /// it if no live entry matches.
    ///
    /// # Panics
    ///
    /// Panics if no free run of slots is long enough.
    #[track_caller]
    pub fn create(&self, content: K::Content) -> Handle<K> {
        let span = K::span(&content);
        match self.create_optional(content) {
            Some(handle) => handle,
            None => {
                let state = self.state.borrow();
                panic!(
                    "{} pool exhausted: requested {span} slots, {} free, largest free block {}",
                    K::CLASS,
                    state.free.available(),
                    state.free.largest(),
                );
            }
        }
    }

    /// Like [`create`](Self::create), but returns `None` instead of panicking
    /// when the pool is exhausted.
    ///
    /// A `None` result leaves every entry and usage count unchanged.
    #[must_use]
    pub fn create_optional(&self, content: K::Content) -> Option<Handle<K>> {
        let index = self.state.borrow_mut().acquire(content)?;
        Some(Handle::from_retained(Rc::clone(&self.state), index))
    }

    /// Always allocates a new entry for `content`, even if an equal one is
    /// live.
    ///
    /// The new entry is private to the returned handle and its clones, so it
    /// can be mutated without affecting other users of equal content. Later
    /// [`create`](Self::create) calls share the lowest-index equal entry.
    ///
    /// # Panics
    ///
    /// Panics if no free run of slots is long enough.
    #[track_caller]
    pub fn create_new(&self, content: K::Content) -> Handle<K> {
        let span = K::span(&content);
        match self.create_new_optional(content) {
            Some(handle) => handle,
            None => {
                let state = self.state.borrow();
                panic!(
                    "{} pool exhausted: requested {span} slots, {} free, largest free block {}",
                    K::CLASS,
                    state.free.available(),
                    state.free.largest(),
                );
            }
        }
    }

    /// Like [`create_new`](Self::create_new), but returns `None` instead of
    /// panicking when the pool is exhausted.
    ///
    /// A `None` result leaves every entry and usage count unchanged.
    #[must_use]
    pub fn create_new_optional(&self, content: K::Content) -> Option<Handle<K>> {
        let index = self.state.borrow_mut().allocate(content)?;
        Some(Handle::from_retained(Rc::clone(&self.state), index))
    }

    /// Returns a handle to a live entry equal to `content`, without
    /// allocating.
    #[must_use]
    pub fn find(&self, content: &K::Content) -> Option<Handle<K>> {
        let mut state = self.state.borrow_mut();
        let index = state.find(content)?;
        state.retain(index);
        Some(Handle::from_retained(Rc::clone(&self.state), index))
    }

    /// Returns a new handle to the entry whose first slot is `index`.
    ///
    /// # Panics
    ///
    /// Panics if no entry starts at `index`.
    #[track_caller]
    pub fn handle_at(&self, index: u16) -> Handle<K> {
        match self.handle_at_optional(index) {
            Some(handle) => handle,
            None => panic!("no {} entry starts at slot {index}", K::CLASS),
        }
    }

    /// Like [`handle_at`](Self::handle_at), but returns `None` when no entry
    /// starts at `index`.
    #[must_use]
    pub fn handle_at_optional(&self, index: u16) -> Option<Handle<K>> {
        let mut state = self.state.borrow_mut();
        state.entry(index)?;
        state.retain(index);
        Some(Handle::from_retained(Rc::clone(&self.state), index))
    }

    // -- Queries --

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> u16 {
        self.state.borrow().capacity
    }

    /// Number of slots held by live entries.
    #[must_use]
    pub fn used_count(&self) -> u16 {
        let state = self.state.borrow();
        state.capacity - state.free.available()
    }

    /// Number of free slots.
    #[must_use]
    pub fn available_count(&self) -> u16 {
        self.state.borrow().free.available()
    }

    /// Length of the longest run of free slots.
    #[must_use]
    pub fn largest_free_block(&self) -> u16 {
        self.state.borrow().free.largest()
    }

    /// Number of live entries.
    #[must_use]
    pub fn live_entries(&self) -> u16 {
        self.state.borrow().live
    }

    /// Number of handles sharing the entry that starts at `index`, or 0.
    #[must_use]
    pub fn usage_count(&self, index: u16) -> u32 {
        self.state.borrow().entry(index).map_or(0, |entry| entry.usage)
    }

    /// Whether a live entry starts at `index`.
    #[must_use]
    pub fn contains(&self, index: u16) -> bool {
        self.state.borrow().entry(index).is_some()
    }

    /// Whether both pools share the same table.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    // -- Commit API --

    /// Returns the first slot of every entry whose content changed since the
    /// last drain, sorted, and clears the record.
    ///
    /// Newly allocated entries count as changed.
    pub fn drain_commits(&self) -> Vec<u16> {
        self.state.borrow_mut().drain_commits()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::pool::test_kind::Blocks;

    fn pool(capacity: u16) -> Pool<Blocks> {
        Pool::new(capacity)
    }

    #[test]
    fn equal_content_shares_one_entry() {
        let pool = pool(4);
        let a = pool.create((1, 7));
        let b = pool.create((1, 7));
        assert!(a.same_slot(&b));
        assert_eq!(pool.live_entries(), 1);
        assert_eq!(pool.used_count(), 1);
        assert_eq!(pool.usage_count(a.index()), 2);
    }

    #[test]
    fn distinct_content_allocates_separately() {
        let pool = pool(4);
        let a = pool.create((1, 7));
        let b = pool.create((1, 8));
        assert_ne!(a, b);
        assert_eq!(pool.live_entries(), 2);
    }

    #[test]
    fn last_drop_frees_the_slot() {
        let pool = pool(4);
        let a = pool.create((1, 1));
        let b = a.clone();
        let index = a.index();
        drop(a);
        assert!(pool.contains(index));
        assert_eq!(pool.usage_count(index), 1);
        drop(b);
        assert!(!pool.contains(index));
        assert_eq!(pool.usage_count(index), 0);
        assert_eq!(pool.available_count(), 4);
    }

    #[test]
    fn freed_slot_is_reused_by_other_content() {
        let pool = pool(2);
        let keep = pool.create((1, 1));
        for tag in 2..50 {
            let churn = pool.create((1, tag));
            assert_eq!(churn.index(), 1);
        }
        assert_eq!(keep.index(), 0);
        assert_eq!(pool.live_entries(), 1);
    }

    #[test]
    fn create_optional_on_exhausted_pool_has_no_effect() {
        let pool = pool(2);
        let a = pool.create((1, 1));
        let b = pool.create((1, 2));
        assert!(pool.create_optional((1, 3)).is_none());
        assert_eq!(pool.live_entries(), 2);
        assert_eq!(pool.usage_count(a.index()), 1);
        assert_eq!(pool.usage_count(b.index()), 1);

        // Deduplication still succeeds on a full pool.
        let c = pool.create_optional((1, 2)).map(|h| h.index());
        assert_eq!(c, Some(b.index()));
        assert_eq!(pool.usage_count(b.index()), 1);
    }

    #[test]
    fn create_new_never_shares() {
        let pool = pool(4);
        let shared = pool.create((1, 7));
        let private = pool.create_new((1, 7));
        assert_ne!(shared, private);
        assert_eq!(pool.live_entries(), 2);
        assert_eq!(pool.usage_count(shared.index()), 1);
        assert_eq!(pool.usage_count(private.index()), 1);

        // Mutating the private entry leaves the shared one alone.
        private.set_content((1, 8));
        assert_eq!(shared.content(), (1, 7));

        // Plain creation shares the lowest equal entry.
        let again = pool.create((1, 7));
        assert_eq!(again, shared);
        assert_eq!(pool.drain_commits(), vec![shared.index(), private.index()]);
    }

    #[test]
    fn create_new_optional_on_exhausted_pool_has_no_effect() {
        let pool = pool(2);
        let a = pool.create((1, 1));
        let b = pool.create_new((1, 1));
        assert!(pool.create_new_optional((1, 1)).is_none());
        assert_eq!(pool.live_entries(), 2);
        assert_eq!(pool.usage_count(a.index()), 1);
        assert_eq!(pool.usage_count(b.index()), 1);
        assert_eq!(pool.available_count(), 0);

        drop(a);
        let c = pool.create_new_optional((1, 1)).map(|h| h.index());
        assert_eq!(c, Some(0));
    }

    #[test]
    #[should_panic(expected = "tiles pool exhausted: requested 3 slots, 2 free")]
    fn create_new_on_exhausted_pool_panics() {
        let pool = pool(2);
        let _ = pool.create_new((3, 0));
    }

    #[test]
    fn multi_slot_entries_are_contiguous() {
        let pool = pool(8);
        let a = pool.create((3, 0));
        let b = pool.create((2, 0));
        assert_eq!((a.index(), a.span()), (0, 3));
        assert_eq!((b.index(), b.span()), (3, 2));
        assert_eq!(pool.used_count(), 5);
        assert_eq!(pool.largest_free_block(), 3);

        // Slot 1 is inside `a`, not the start of an entry.
        assert!(!pool.contains(1));
        assert!(pool.handle_at_optional(1).is_none());

        drop(a);
        assert!(pool.create_optional((4, 0)).is_none());
        // Both free runs are three slots long; the lower one wins.
        let c = pool.create((3, 1));
        assert_eq!(c.index(), 0);
        assert_eq!(b.index(), 3);
    }

    #[test]
    fn fragmentation_exhausts_long_requests() {
        let pool = pool(4);
        let a = pool.create((1, 0));
        let b = pool.create((1, 1));
        let c = pool.create((1, 2));
        let d = pool.create((1, 3));
        drop(a);
        drop(c);
        assert_eq!(pool.available_count(), 2);
        assert!(pool.create_optional((2, 9)).is_none());
        drop(b);
        let long = pool.create((3, 9));
        assert_eq!(long.index(), 0);
        assert_eq!(d.index(), 3);
    }

    #[test]
    fn find_does_not_allocate() {
        let pool = pool(4);
        assert!(pool.find(&(1, 5)).is_none());
        assert_eq!(pool.live_entries(), 0);

        let a = pool.create((1, 5));
        let found = pool.find(&(1, 5));
        assert_eq!(found.as_ref(), Some(&a));
        assert_eq!(pool.usage_count(a.index()), 2);
    }

    #[test]
    fn handle_at_retains() {
        let pool = pool(4);
        let a = pool.create((1, 5));
        let raw = pool.handle_at(a.index());
        assert_eq!(raw, a);
        drop(a);
        assert!(pool.contains(raw.index()));
        assert_eq!(raw.usage_count(), 1);
    }

    #[test]
    fn allocation_marks_commit_and_free_clears_it() {
        let pool = pool(4);
        let a = pool.create((1, 1));
        let b = pool.create((2, 2));
        let c = pool.create((1, 3));
        drop(b);
        assert_eq!(pool.drain_commits(), vec![a.index(), c.index()]);
        assert!(pool.drain_commits().is_empty());
    }

    #[test]
    fn replace_marks_only_hardware_changes() {
        let pool = pool(4);
        let a = pool.create((1, 0x101));
        let _ = pool.drain_commits();

        // Differs only in bits the hardware never sees.
        a.set_content((1, 0x201));
        assert!(pool.drain_commits().is_empty());
        assert_eq!(a.content(), (1, 0x201));

        a.set_content((1, 0x202));
        assert_eq!(pool.drain_commits(), vec![a.index()]);
    }

    #[test]
    fn dedupe_uses_current_content() {
        let pool = pool(4);
        let a = pool.create((1, 1));
        a.set_content((1, 2));
        let b = pool.create((1, 2));
        assert_eq!(a, b);
        let c = pool.create((1, 1));
        assert_ne!(a, c);
    }

    #[test]
    fn clones_share_the_table() {
        let pool = pool(4);
        let other = pool.clone();
        assert!(pool.ptr_eq(&other));
        let a = other.create((1, 1));
        assert!(pool.contains(a.index()));
        assert!(!pool.ptr_eq(&Pool::new(4)));
    }

    #[test]
    fn default_pool_uses_kind_capacity() {
        let pool = Pool::<Blocks>::default();
        assert_eq!(pool.capacity(), 8);
        assert_eq!(pool.available_count(), 8);
    }

    #[test]
    #[should_panic(expected = "tiles pool exhausted: requested 2 slots, 1 free")]
    fn create_on_exhausted_pool_panics() {
        let pool = pool(1);
        let _ = pool.create((2, 0));
    }

    #[test]
    #[should_panic(expected = "no tiles entry starts at slot 3")]
    fn handle_at_free_slot_panics() {
        let pool = pool(4);
        let _ = pool.handle_at(3);
    }

    #[test]
    #[should_panic(expected = "tiles content span changed from 1 to 2")]
    fn replace_with_different_span_panics() {
        let pool = pool(4);
        let a = pool.create((1, 0));
        a.set_content((2, 0));
    }

    #[test]
    #[should_panic(expected = "pool with zero capacity")]
    fn zero_capacity_panics() {
        let _ = pool(0);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn events_reach_the_tracer_in_sequence() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Log(Vec<(u64, &'static str, u16)>);

        impl TraceSink for Log {
            fn on_allocate(&mut self, e: &AllocateEvent) {
                self.0.push((e.sequence, "allocate", e.index));
            }
            fn on_reuse(&mut self, e: &ReuseEvent) {
                self.0.push((e.sequence, "reuse", e.index));
            }
            fn on_free(&mut self, e: &FreeEvent) {
                self.0.push((e.sequence, "free", e.index));
            }
            fn on_exhausted(&mut self, e: &ExhaustedEvent) {
                self.0.push((e.sequence, "exhausted", e.requested_span));
            }
            fn on_commit(&mut self, e: &CommitEvent) {
                self.0.push((e.sequence, "commit", e.index));
            }
        }

        let log = Rc::new(RefCell::new(Log::default()));
        let pool = Pool::<Blocks>::with_tracer(2, Tracer::new(log.clone()));
        let a = pool.create((1, 1));
        let b = pool.create((1, 1));
        assert!(pool.create_optional((3, 0)).is_none());
        a.set_content((1, 2));
        drop(a);
        drop(b);

        let kinds: Vec<&str> = log.borrow().0.iter().map(|&(_, kind, _)| kind).collect();
        assert_eq!(kinds, ["allocate", "reuse", "exhausted", "commit", "free"]);
        let log = log.borrow();
        // Usage events, when enabled, take sequence numbers in between.
        assert!(log.0.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(log.0[2].2, 3);
    }
}
