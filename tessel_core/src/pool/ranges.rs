// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Best-fit allocation over coalesced runs of free slots.

use alloc::vec;
use alloc::vec::Vec;

/// A run of consecutive free slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FreeRun {
    start: u16,
    len: u16,
}

/// Free runs of a fixed-size slot table, sorted by start and never adjacent.
#[derive(Clone, Debug)]
pub(crate) struct FreeRanges {
    runs: Vec<FreeRun>,
    available: u16,
}

impl FreeRanges {
    /// Creates a table with `capacity` free slots.
    pub(crate) fn new(capacity: u16) -> Self {
        Self {
            runs: vec![FreeRun {
                start: 0,
                len: capacity,
            }],
            available: capacity,
        }
    }

    /// Total number of free slots.
    pub(crate) fn available(&self) -> u16 {
        self.available
    }

    /// Length of the longest free run.
    pub(crate) fn largest(&self) -> u16 {
        self.runs.iter().map(|run| run.len).max().unwrap_or(0)
    }

    /// Reserves `span` consecutive slots and returns the first one.
    ///
    /// Picks the shortest run that fits; among equally short runs, the one
    /// with the lowest start.
    pub(crate) fn allocate(&mut self, span: u16) -> Option<u16> {
        debug_assert!(span > 0, "zero-length allocation");
        let mut best: Option<usize> = None;
        for (i, run) in self.runs.iter().enumerate() {
            if run.len < span {
                continue;
            }
            if best.is_none_or(|b| run.len < self.runs[b].len) {
                best = Some(i);
                if run.len == span {
                    break;
                }
            }
        }

        let i = best?;
        let run = &mut self.runs[i];
        let start = run.start;
        if run.len == span {
            self.runs.remove(i);
        } else {
            run.start += span;
            run.len -= span;
        }
        self.available -= span;
        Some(start)
    }

    /// Returns `span` slots starting at `start` to the free set.
    pub(crate) fn release(&mut self, start: u16, span: u16) {
        let end = start + span;
        let at = self.runs.partition_point(|run| run.start < start);
        debug_assert!(
            at == 0 || self.runs[at - 1].start + self.runs[at - 1].len <= start,
            "double release of slot {start}"
        );
        debug_assert!(
            at == self.runs.len() || end <= self.runs[at].start,
            "double release of slot {start}"
        );

        let joins_prev = at > 0 && self.runs[at - 1].start + self.runs[at - 1].len == start;
        let joins_next = at < self.runs.len() && self.runs[at].start == end;
        match (joins_prev, joins_next) {
            (true, true) => {
                let next = self.runs.remove(at);
                self.runs[at - 1].len += span + next.len;
            }
            (true, false) => self.runs[at - 1].len += span,
            (false, true) => {
                self.runs[at].start = start;
                self.runs[at].len += span;
            }
            (false, false) => self.runs.insert(at, FreeRun { start, len: span }),
        }
        self.available += span;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_table_is_one_run() {
        let ranges = FreeRanges::new(8);
        assert_eq!(ranges.available(), 8);
        assert_eq!(ranges.largest(), 8);
    }

    #[test]
    fn allocates_from_the_front() {
        let mut ranges = FreeRanges::new(8);
        assert_eq!(ranges.allocate(1), Some(0));
        assert_eq!(ranges.allocate(3), Some(1));
        assert_eq!(ranges.allocate(1), Some(4));
        assert_eq!(ranges.available(), 3);
        assert_eq!(ranges.largest(), 3);
    }

    #[test]
    fn single_slots_reuse_lowest_index() {
        let mut ranges = FreeRanges::new(4);
        for expected in 0..4 {
            assert_eq!(ranges.allocate(1), Some(expected));
        }
        ranges.release(2, 1);
        ranges.release(0, 1);
        assert_eq!(ranges.allocate(1), Some(0));
        assert_eq!(ranges.allocate(1), Some(2));
        assert_eq!(ranges.allocate(1), None);
    }

    #[test]
    fn best_fit_prefers_the_tightest_run() {
        let mut ranges = FreeRanges::new(10);
        assert_eq!(ranges.allocate(3), Some(0));
        assert_eq!(ranges.allocate(1), Some(3));
        assert_eq!(ranges.allocate(2), Some(4));
        assert_eq!(ranges.allocate(1), Some(6));
        // Free runs: [0, 3), [4, 6), [7, 10).
        ranges.release(0, 3);
        ranges.release(4, 2);
        assert_eq!(ranges.allocate(2), Some(4));
        assert_eq!(ranges.allocate(3), Some(0));
        assert_eq!(ranges.allocate(3), Some(7));
        assert_eq!(ranges.available(), 0);
    }

    #[test]
    fn release_coalesces_neighbors() {
        let mut ranges = FreeRanges::new(6);
        assert_eq!(ranges.allocate(2), Some(0));
        assert_eq!(ranges.allocate(2), Some(2));
        assert_eq!(ranges.allocate(2), Some(4));

        ranges.release(0, 2);
        ranges.release(4, 2);
        assert_eq!(ranges.largest(), 2);

        ranges.release(2, 2);
        assert_eq!(ranges.largest(), 6);
        assert_eq!(ranges.allocate(6), Some(0));
    }

    #[test]
    fn fragmented_table_rejects_long_runs() {
        let mut ranges = FreeRanges::new(4);
        for _ in 0..4 {
            let _ = ranges.allocate(1);
        }
        ranges.release(0, 1);
        ranges.release(2, 1);
        assert_eq!(ranges.available(), 2);
        assert_eq!(ranges.allocate(2), None);
        // A failed request leaves the table untouched.
        assert_eq!(ranges.available(), 2);
        assert_eq!(ranges.largest(), 1);
    }
}
