// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Pools have no clock, so each event's sequence number stands in for its
//! timestamp, one microsecond per event. Each resource class gets its own
//! process row. A slot's lifetime, from allocation to free, is rendered as
//! an async span keyed by class and first slot; share-count changes become
//! counter tracks.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use tessel_core::pool::ResourceClass;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Allocate(e) => {
                events.push(json!({
                    "ph": "b",
                    "name": slot_name(e.class, e.index),
                    "cat": e.class.name(),
                    "id": slot_id(e.class, e.index),
                    "ts": e.sequence,
                    "pid": class_pid(e.class),
                    "tid": 0,
                    "args": {
                        "index": e.index,
                        "span": e.span,
                    }
                }));
            }
            RecordedEvent::Free(e) => {
                events.push(json!({
                    "ph": "e",
                    "name": slot_name(e.class, e.index),
                    "cat": e.class.name(),
                    "id": slot_id(e.class, e.index),
                    "ts": e.sequence,
                    "pid": class_pid(e.class),
                    "tid": 0,
                }));
            }
            RecordedEvent::Reuse(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Reuse",
                    "cat": e.class.name(),
                    "ts": e.sequence,
                    "pid": class_pid(e.class),
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "index": e.index,
                        "span": e.span,
                        "usage_count": e.usage_count,
                    }
                }));
            }
            RecordedEvent::Exhausted(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Exhausted",
                    "cat": e.class.name(),
                    "ts": e.sequence,
                    "pid": class_pid(e.class),
                    "tid": 0,
                    "s": "p",
                    "args": {
                        "requested_span": e.requested_span,
                        "available": e.available,
                        "largest_free_block": e.largest_free_block,
                    }
                }));
            }
            RecordedEvent::Commit(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Commit",
                    "cat": e.class.name(),
                    "ts": e.sequence,
                    "pid": class_pid(e.class),
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "index": e.index,
                        "span": e.span,
                    }
                }));
            }
            RecordedEvent::Usage(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": slot_name(e.class, e.index),
                    "cat": e.class.name(),
                    "ts": e.sequence,
                    "pid": class_pid(e.class),
                    "tid": 0,
                    "args": {
                        "usage_count": e.usage_count,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn class_pid(class: ResourceClass) -> u32 {
    match class {
        ResourceClass::AffineMat => 0,
        ResourceClass::Tiles => 1,
        ResourceClass::Palette => 2,
    }
}

fn slot_name(class: ResourceClass, index: u16) -> String {
    format!("{class}[{index}]")
}

fn slot_id(class: ResourceClass, index: u16) -> String {
    format!("{class}:{index}")
}
