// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records: a tag byte, the sequence
//! number, the class byte, then the event's slot fields. [`decode`] reads
//! them back as an iterator of [`RecordedEvent`].

use tessel_core::pool::ResourceClass;
use tessel_core::trace::{
    AllocateEvent, CommitEvent, ExhaustedEvent, FreeEvent, ReuseEvent, TraceSink, UsageEvent,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_ALLOCATE: u8 = 1;
const TAG_REUSE: u8 = 2;
const TAG_FREE: u8 = 3;
const TAG_EXHAUSTED: u8 = 4;
const TAG_COMMIT: u8 = 5;
const TAG_USAGE: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_header(&mut self, tag: u8, sequence: u64, class: ResourceClass) {
        self.write_u8(tag);
        self.write_u64(sequence);
        self.write_u8(match class {
            ResourceClass::AffineMat => 0,
            ResourceClass::Tiles => 1,
            ResourceClass::Palette => 2,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_allocate(&mut self, e: &AllocateEvent) {
        self.write_header(TAG_ALLOCATE, e.sequence, e.class);
        self.write_u16(e.index);
        self.write_u16(e.span);
    }

    fn on_reuse(&mut self, e: &ReuseEvent) {
        self.write_header(TAG_REUSE, e.sequence, e.class);
        self.write_u16(e.index);
        self.write_u16(e.span);
        self.write_u32(e.usage_count);
    }

    fn on_free(&mut self, e: &FreeEvent) {
        self.write_header(TAG_FREE, e.sequence, e.class);
        self.write_u16(e.index);
        self.write_u16(e.span);
    }

    fn on_exhausted(&mut self, e: &ExhaustedEvent) {
        self.write_header(TAG_EXHAUSTED, e.sequence, e.class);
        self.write_u16(e.requested_span);
        self.write_u16(e.available);
        self.write_u16(e.largest_free_block);
    }

    fn on_commit(&mut self, e: &CommitEvent) {
        self.write_header(TAG_COMMIT, e.sequence, e.class);
        self.write_u16(e.index);
        self.write_u16(e.span);
    }

    fn on_usage_changed(&mut self, e: &UsageEvent) {
        self.write_header(TAG_USAGE, e.sequence, e.class);
        self.write_u16(e.index);
        self.write_u32(e.usage_count);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// An [`AllocateEvent`].
    Allocate(AllocateEvent),
    /// A [`ReuseEvent`].
    Reuse(ReuseEvent),
    /// A [`FreeEvent`].
    Free(FreeEvent),
    /// An [`ExhaustedEvent`].
    Exhausted(ExhaustedEvent),
    /// A [`CommitEvent`].
    Commit(CommitEvent),
    /// A [`UsageEvent`].
    Usage(UsageEvent),
}

impl RecordedEvent {
    /// Sequence number of the event within its pool.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        match self {
            Self::Allocate(e) => e.sequence,
            Self::Reuse(e) => e.sequence,
            Self::Free(e) => e.sequence,
            Self::Exhausted(e) => e.sequence,
            Self::Commit(e) => e.sequence,
            Self::Usage(e) => e.sequence,
        }
    }

    /// Resource class of the reporting pool.
    #[must_use]
    pub fn class(&self) -> ResourceClass {
        match self {
            Self::Allocate(e) => e.class,
            Self::Reuse(e) => e.class,
            Self::Free(e) => e.class,
            Self::Exhausted(e) => e.class,
            Self::Commit(e) => e.class,
            Self::Usage(e) => e.class,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first unknown tag or truncated record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.take().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_class(&mut self) -> Option<ResourceClass> {
        match self.read_u8()? {
            0 => Some(ResourceClass::AffineMat),
            1 => Some(ResourceClass::Tiles),
            2 => Some(ResourceClass::Palette),
            _ => None,
        }
    }

    fn decode(&mut self, tag: u8) -> Option<RecordedEvent> {
        let sequence = self.read_u64()?;
        let class = self.read_class()?;
        Some(match tag {
            TAG_ALLOCATE => RecordedEvent::Allocate(AllocateEvent {
                sequence,
                class,
                index: self.read_u16()?,
                span: self.read_u16()?,
            }),
            TAG_REUSE => RecordedEvent::Reuse(ReuseEvent {
                sequence,
                class,
                index: self.read_u16()?,
                span: self.read_u16()?,
                usage_count: self.read_u32()?,
            }),
            TAG_FREE => RecordedEvent::Free(FreeEvent {
                sequence,
                class,
                index: self.read_u16()?,
                span: self.read_u16()?,
            }),
            TAG_EXHAUSTED => RecordedEvent::Exhausted(ExhaustedEvent {
                sequence,
                class,
                requested_span: self.read_u16()?,
                available: self.read_u16()?,
                largest_free_block: self.read_u16()?,
            }),
            TAG_COMMIT => RecordedEvent::Commit(CommitEvent {
                sequence,
                class,
                index: self.read_u16()?,
                span: self.read_u16()?,
            }),
            TAG_USAGE => RecordedEvent::Usage(UsageEvent {
                sequence,
                class,
                index: self.read_u16()?,
                usage_count: self.read_u32()?,
            }),
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_ALLOCATE..=TAG_USAGE => self.decode(tag),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tessel_core::affine::AffineMatAttributes;
    use tessel_core::context::{ContextConfig, ResourceContext};
    use tessel_core::fixed::Fixed;
    use tessel_core::resource::{Color, PaletteColors};
    use tessel_core::trace::Tracer;

    use super::*;

    fn recorded_context() -> (Rc<RefCell<RecorderSink>>, ResourceContext) {
        let recorder = Rc::new(RefCell::new(RecorderSink::new()));
        let context = ResourceContext::with_config(ContextConfig {
            affine_mat_capacity: 1,
            tracer: Tracer::new(recorder.clone()),
            ..ContextConfig::default()
        });
        (recorder, context)
    }

    #[test]
    fn pool_lifecycle_is_recorded() {
        let (recorder, context) = recorded_context();
        let pool = context.affine_mats();

        let a = pool.create(AffineMatAttributes::IDENTITY);
        let b = pool.create(AffineMatAttributes::IDENTITY);
        let mut rotated = AffineMatAttributes::IDENTITY;
        rotated.set_rotation_angle(Fixed::from_int(90));
        assert!(pool.create_optional(rotated).is_none());
        a.set_rotation_angle(Fixed::from_int(90));
        drop(a);
        drop(b);

        let events: Vec<_> = decode(recorder.borrow().as_bytes()).collect();
        let allocate = AllocateEvent {
            sequence: 0,
            class: ResourceClass::AffineMat,
            index: 0,
            span: 1,
        };
        assert_eq!(events[0], RecordedEvent::Allocate(allocate));
        assert!(matches!(
            events[1],
            RecordedEvent::Usage(UsageEvent { usage_count: 2, .. })
        ));
        assert!(matches!(
            events[2],
            RecordedEvent::Reuse(ReuseEvent { usage_count: 2, .. })
        ));
        assert!(matches!(
            events[3],
            RecordedEvent::Exhausted(ExhaustedEvent {
                requested_span: 1,
                available: 0,
                ..
            })
        ));
        assert!(matches!(events[4], RecordedEvent::Commit(CommitEvent { index: 0, .. })));
        assert!(matches!(
            events[5],
            RecordedEvent::Usage(UsageEvent { usage_count: 1, .. })
        ));
        assert!(matches!(events[6], RecordedEvent::Free(FreeEvent { index: 0, .. })));
        assert_eq!(events.len(), 7);

        let sequences: Vec<u64> = events.iter().map(RecordedEvent::sequence).collect();
        assert_eq!(sequences, [0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn classes_share_one_recorder() {
        let (recorder, context) = recorded_context();
        let _m = context.affine_mats().create(AffineMatAttributes::IDENTITY);
        let _p = context
            .palettes()
            .create(PaletteColors::new(vec![Color::WHITE; 32]));

        let events: Vec<_> = decode(recorder.borrow().as_bytes()).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].class(), ResourceClass::AffineMat);
        assert_eq!(events[1].class(), ResourceClass::Palette);
        // Sequence numbers are per pool.
        assert_eq!(events[1].sequence(), 0);
        assert!(matches!(events[1], RecordedEvent::Allocate(AllocateEvent { span: 2, .. })));
    }

    #[test]
    fn unknown_tag_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_free(&FreeEvent {
            sequence: 9,
            class: ResourceClass::Tiles,
            index: 4,
            span: 3,
        });
        let mut bytes = rec.into_bytes();
        bytes.push(0xff);
        bytes.extend_from_slice(&[0; 16]);

        let events: Vec<_> = decode(&bytes).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn truncated_record_stops_iteration() {
        let mut rec = RecorderSink::new();
        rec.on_commit(&CommitEvent {
            sequence: 1,
            class: ResourceClass::Palette,
            index: 2,
            span: 1,
        });
        let bytes = rec.as_bytes();
        assert_eq!(decode(&bytes[..bytes.len() - 1]).count(), 0);
        assert_eq!(decode(bytes).count(), 1);
    }

    #[test]
    fn clear_discards_recording() {
        let mut rec = RecorderSink::new();
        rec.on_exhausted(&ExhaustedEvent {
            sequence: 0,
            class: ResourceClass::Tiles,
            requested_span: 8,
            available: 4,
            largest_free_block: 2,
        });
        assert!(!rec.as_bytes().is_empty());
        rec.clear();
        assert_eq!(decode(rec.as_bytes()).count(), 0);
    }
}
