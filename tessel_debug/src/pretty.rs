// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use tessel_core::trace::{
    AllocateEvent, CommitEvent, ExhaustedEvent, FreeEvent, ReuseEvent, TraceSink, UsageEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink, returning its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_allocate(&mut self, e: &AllocateEvent) {
        let _ = writeln!(
            self.writer,
            "[allocate] {} #{} span={} seq={}",
            e.class, e.index, e.span, e.sequence,
        );
    }

    fn on_reuse(&mut self, e: &ReuseEvent) {
        let _ = writeln!(
            self.writer,
            "[reuse] {} #{} span={} usage={} seq={}",
            e.class, e.index, e.span, e.usage_count, e.sequence,
        );
    }

    fn on_free(&mut self, e: &FreeEvent) {
        let _ = writeln!(
            self.writer,
            "[free] {} #{} span={} seq={}",
            e.class, e.index, e.span, e.sequence,
        );
    }

    fn on_exhausted(&mut self, e: &ExhaustedEvent) {
        let _ = writeln!(
            self.writer,
            "[exhausted] {} requested={} available={} largest={} seq={}",
            e.class, e.requested_span, e.available, e.largest_free_block, e.sequence,
        );
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        let _ = writeln!(
            self.writer,
            "[commit] {} #{} span={} seq={}",
            e.class, e.index, e.span, e.sequence,
        );
    }

    fn on_usage_changed(&mut self, e: &UsageEvent) {
        let _ = writeln!(
            self.writer,
            "[usage] {} #{} usage={} seq={}",
            e.class, e.index, e.usage_count, e.sequence,
        );
    }
}
