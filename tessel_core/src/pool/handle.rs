// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared ownership of one pool entry.

use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;
use core::hash::{Hash, Hasher};

use super::ResourceKind;
use super::state::{Pool, PoolState};

/// A shared, counted reference to one pool entry.
///
/// All handles to an entry observe the same content: a mutation through any
/// of them is visible through the others. The entry's slots return to the
/// pool when the last handle is dropped.
///
/// Equality and hashing compare slot identity, not content.
pub struct Handle<K: ResourceKind> {
    pool: Rc<RefCell<PoolState<K>>>,
    index: u16,
}

impl<K: ResourceKind> Handle<K> {
    /// Wraps a slot whose usage count already includes this handle.
    pub(super) fn from_retained(pool: Rc<RefCell<PoolState<K>>>, index: u16) -> Self {
        Self { pool, index }
    }

    /// First slot of the entry.
    #[inline]
    #[must_use]
    pub fn index(&self) -> u16 {
        self.index
    }

    /// Number of consecutive slots the entry covers.
    #[must_use]
    pub fn span(&self) -> u16 {
        self.with_content(K::span)
    }

    /// Number of handles sharing the entry, this one included.
    #[must_use]
    pub fn usage_count(&self) -> u32 {
        self.pool
            .borrow()
            .entry(self.index)
            .map_or(0, |entry| entry.usage)
    }

    /// The pool that owns the entry.
    #[must_use]
    pub fn pool(&self) -> Pool<K> {
        Pool {
            state: Rc::clone(&self.pool),
        }
    }

    /// Whether both handles reference the same entry of the same pool.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        self.index == other.index && Rc::ptr_eq(&self.pool, &other.pool)
    }

    /// Returns a copy of the entry's content.
    #[must_use]
    pub fn content(&self) -> K::Content {
        self.with_content(Clone::clone)
    }

    /// Calls `f` with a reference to the entry's content.
    ///
    /// `f` must not use handles of the same pool.
    pub fn with_content<R>(&self, f: impl FnOnce(&K::Content) -> R) -> R {
        let state = self.pool.borrow();
        let Some(entry) = state.entry(self.index) else {
            unreachable!("handle to unallocated {} slot {}", K::CLASS, self.index);
        };
        f(&entry.content)
    }

    /// Replaces the entry's content for every handle that shares it.
    ///
    /// Other entries are not consulted, so afterwards two entries may hold
    /// equal content. Later requests share the lowest of them.
    ///
    /// # Panics
    ///
    /// Panics if `content` spans a different number of slots.
    #[track_caller]
    pub fn set_content(&self, content: K::Content) {
        self.pool.borrow_mut().replace(self.index, content);
    }

    /// Applies `f` to a copy of the content and stores the result.
    ///
    /// `f` runs without the pool borrowed, so it may panic freely.
    #[track_caller]
    pub(crate) fn update(&self, f: impl FnOnce(&mut K::Content)) {
        let mut content = self.content();
        f(&mut content);
        self.set_content(content);
    }
}

impl<K: ResourceKind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        self.pool.borrow_mut().retain(self.index);
        Self {
            pool: Rc::clone(&self.pool),
            index: self.index,
        }
    }
}

impl<K: ResourceKind> Drop for Handle<K> {
    fn drop(&mut self) {
        self.pool.borrow_mut().release(self.index);
    }
}

impl<K: ResourceKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.same_slot(other)
    }
}

impl<K: ResourceKind> Eq for Handle<K> {}

impl<K: ResourceKind> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::ptr::hash(Rc::as_ptr(&self.pool), state);
        self.index.hash(state);
    }
}

impl<K: ResourceKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.pool.borrow();
        let entry = state.entry(self.index);
        f.debug_struct("Handle")
            .field("class", &K::CLASS)
            .field("index", &self.index)
            .field("usage", &entry.map_or(0, |entry| entry.usage))
            .field("content", &entry.map(|entry| &entry.content))
            .finish()
    }
}
