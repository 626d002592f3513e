// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`UiEvent`].

use scrim_core::time::HostTime;
use scrim_core::trace::{
    AssetEvent, DisplayEvent, LifecycleEvent, LifecycleStage, Orientation, OwnerEvent,
    ReleaseEvent, RequestEvent, RequestOp, TraceSink, UiEvent, VisibilityEvent,
};
use scrim_core::view::{Disposition, ViewId};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_REQUEST: u8 = 1;
const TAG_LIFECYCLE: u8 = 2;
const TAG_VISIBILITY: u8 = 3;
const TAG_OWNER_INVALIDATED: u8 = 4;
const TAG_OWNER_RELEASED: u8 = 5;
const TAG_ASSET_DISPOSED: u8 = 6;
const TAG_DISPLAY: u8 = 7;

const STAGES: [LifecycleStage; 11] = [
    LifecycleStage::LoadStarted,
    LifecycleStage::LoadFailed,
    LifecycleStage::CacheHit,
    LifecycleStage::Instantiated,
    LifecycleStage::Opened,
    LifecycleStage::OpenFinished,
    LifecycleStage::CloseStarted,
    LifecycleStage::Closed,
    LifecycleStage::Cached,
    LifecycleStage::Destroyed,
    LifecycleStage::Discarded,
];

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

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_header(&mut self, tag: u8, at: HostTime) {
        self.write_u8(tag);
        self.write_u64(at.nanos());
    }

    fn write_stage(&mut self, stage: LifecycleStage) {
        let index = STAGES.iter().position(|s| *s == stage).unwrap_or(0);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "STAGES has fewer than 256 entries"
        )]
        self.write_u8(index as u8);
    }
}

impl TraceSink for RecorderSink {
    fn on_request(&mut self, e: &RequestEvent) {
        self.write_header(TAG_REQUEST, e.at);
        self.write_u32(e.view.0);
        self.write_u8(match e.op {
            RequestOp::Open => 0,
            RequestOp::Close => 1,
        });
        self.write_u8(match e.disposition {
            Disposition::Started => 0,
            Disposition::Queued => 1,
            Disposition::Rejected => 2,
        });
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.write_header(TAG_LIFECYCLE, e.at);
        self.write_u32(e.view.0);
        self.write_stage(e.stage);
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        self.write_header(TAG_VISIBILITY, e.at);
        self.write_u32(e.view.0);
        self.write_u8(u8::from(e.visible));
    }

    fn on_owner_invalidated(&mut self, e: &OwnerEvent) {
        self.write_header(TAG_OWNER_INVALIDATED, e.at);
        self.write_u64(e.owner);
    }

    fn on_owner_released(&mut self, e: &ReleaseEvent) {
        self.write_header(TAG_OWNER_RELEASED, e.at);
        self.write_u64(e.owner);
        self.write_u32(e.released);
        self.write_u8(u8::from(e.forced));
    }

    fn on_asset_disposed(&mut self, e: &AssetEvent) {
        self.write_header(TAG_ASSET_DISPOSED, e.at);
        self.write_u32(e.asset);
    }

    fn on_display_change(&mut self, e: &DisplayEvent) {
        self.write_header(TAG_DISPLAY, e.at);
        self.write_f64(e.width);
        self.write_f64(e.height);
        self.write_u8(match e.orientation {
            Orientation::Landscape => 0,
            Orientation::Portrait => 1,
        });
        self.write_u8(u8::from(e.orientation_changed));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`UiEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Iteration stops at the first unknown tag or truncated record.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_view(&mut self) -> Option<ViewId> {
        self.read_u32().map(ViewId)
    }

    fn decode_request(&mut self) -> Option<UiEvent> {
        let at = self.read_time()?;
        let view = self.read_view()?;
        let op = match self.read_u8()? {
            0 => RequestOp::Open,
            _ => RequestOp::Close,
        };
        let disposition = match self.read_u8()? {
            0 => Disposition::Started,
            1 => Disposition::Queued,
            _ => Disposition::Rejected,
        };
        Some(UiEvent::Request(RequestEvent {
            at,
            view,
            op,
            disposition,
        }))
    }

    fn decode_lifecycle(&mut self) -> Option<UiEvent> {
        let at = self.read_time()?;
        let view = self.read_view()?;
        let stage = *STAGES.get(usize::from(self.read_u8()?))?;
        Some(UiEvent::Lifecycle(LifecycleEvent { at, view, stage }))
    }

    fn decode_visibility(&mut self) -> Option<UiEvent> {
        Some(UiEvent::Visibility(VisibilityEvent {
            at: self.read_time()?,
            view: self.read_view()?,
            visible: self.read_bool()?,
        }))
    }

    fn decode_owner_invalidated(&mut self) -> Option<UiEvent> {
        Some(UiEvent::OwnerInvalidated(OwnerEvent {
            at: self.read_time()?,
            owner: self.read_u64()?,
        }))
    }

    fn decode_owner_released(&mut self) -> Option<UiEvent> {
        Some(UiEvent::OwnerReleased(ReleaseEvent {
            at: self.read_time()?,
            owner: self.read_u64()?,
            released: self.read_u32()?,
            forced: self.read_bool()?,
        }))
    }

    fn decode_asset_disposed(&mut self) -> Option<UiEvent> {
        Some(UiEvent::AssetDisposed(AssetEvent {
            at: self.read_time()?,
            asset: self.read_u32()?,
        }))
    }

    fn decode_display(&mut self) -> Option<UiEvent> {
        Some(UiEvent::Display(DisplayEvent {
            at: self.read_time()?,
            width: self.read_f64()?,
            height: self.read_f64()?,
            orientation: match self.read_u8()? {
                0 => Orientation::Landscape,
                _ => Orientation::Portrait,
            },
            orientation_changed: self.read_bool()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = UiEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_REQUEST => self.decode_request(),
            TAG_LIFECYCLE => self.decode_lifecycle(),
            TAG_VISIBILITY => self.decode_visibility(),
            TAG_OWNER_INVALIDATED => self.decode_owner_invalidated(),
            TAG_OWNER_RELEASED => self.decode_owner_released(),
            TAG_ASSET_DISPOSED => self.decode_asset_disposed(),
            TAG_DISPLAY => self.decode_display(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
