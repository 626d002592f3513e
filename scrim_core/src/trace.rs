// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the view runtime.
//!
//! This module provides a [`TraceSink`] trait with per-event methods. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! Services record [`UiEvent`]s as they work and the
//! [`Runtime`](crate::runtime::Runtime) forwards them to its sink through a
//! [`Tracer`] after every operation. When the `trace` feature is **off**,
//! nothing is recorded and every `Tracer` method compiles to nothing.
//!
//! Free-form diagnostics (missing configuration, load failures) go through
//! the [`log`] facade instead.
//!
//! # Crate features
//!
//! - `trace`: enables event recording and the `Tracer` method bodies.

use crate::time::HostTime;
use crate::view::{Disposition, ViewId};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which controller operation a request event describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOp {
    /// An open request.
    Open,
    /// A close request.
    Close,
}

/// A step in a view's life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleStage {
    /// The view's template started loading.
    LoadStarted,
    /// The template failed to load or instantiate; the open was aborted.
    LoadFailed,
    /// An instance was taken from the view cache.
    CacheHit,
    /// A fresh instance was created and initialised.
    Instantiated,
    /// The instance was attached and its open transition started.
    Opened,
    /// The open transition finished.
    OpenFinished,
    /// The instance was removed from the stack and its close transition started.
    CloseStarted,
    /// The close transition finished and close callbacks ran.
    Closed,
    /// The instance was detached and kept for reuse.
    Cached,
    /// The instance and its container were destroyed.
    Destroyed,
    /// An instance finished loading after its entry was closed and was
    /// destroyed without being shown.
    Discarded,
}

/// Screen orientation derived from the viewport aspect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Width at least height.
    Landscape,
    /// Height greater than width.
    Portrait,
}

impl Orientation {
    /// Derives the orientation of a viewport.
    #[must_use]
    pub fn of(size: kurbo::Size) -> Self {
        if size.width >= size.height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every open or close request, with how it was handled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RequestEvent {
    /// Runtime time of the request.
    pub at: HostTime,
    /// Target view.
    pub view: ViewId,
    /// Open or close.
    pub op: RequestOp,
    /// Started, queued, or rejected.
    pub disposition: Disposition,
}

/// Emitted at each lifecycle step of a view instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LifecycleEvent {
    /// Runtime time of the step.
    pub at: HostTime,
    /// The view.
    pub view: ViewId,
    /// Which step.
    pub stage: LifecycleStage,
}

/// Emitted when visibility recomputation shows or hides a view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityEvent {
    /// Runtime time of the change.
    pub at: HostTime,
    /// The view.
    pub view: ViewId,
    /// New visibility.
    pub visible: bool,
}

/// Emitted when a resource owner is invalidated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OwnerEvent {
    /// Runtime time of the invalidation.
    pub at: HostTime,
    /// Raw owner id.
    pub owner: u64,
}

/// Emitted when an owner's retained set is released.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReleaseEvent {
    /// Runtime time of the release.
    pub at: HostTime,
    /// Raw owner id.
    pub owner: u64,
    /// Number of assets released.
    pub released: u32,
    /// Whether the release was forced.
    pub forced: bool,
}

/// Emitted when an asset's count reaches zero and it is disposed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssetEvent {
    /// Runtime time of disposal.
    pub at: HostTime,
    /// Raw slot index of the disposed asset.
    pub asset: u32,
}

/// Emitted when the viewport changes size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayEvent {
    /// Runtime time of the change.
    pub at: HostTime,
    /// New viewport width.
    pub width: f64,
    /// New viewport height.
    pub height: f64,
    /// Orientation after the change.
    pub orientation: Orientation,
    /// Whether the orientation flipped.
    pub orientation_changed: bool,
}

/// Any recorded event, as buffered by services between flushes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiEvent {
    /// See [`RequestEvent`].
    Request(RequestEvent),
    /// See [`LifecycleEvent`].
    Lifecycle(LifecycleEvent),
    /// See [`VisibilityEvent`].
    Visibility(VisibilityEvent),
    /// See [`OwnerEvent`].
    OwnerInvalidated(OwnerEvent),
    /// See [`ReleaseEvent`].
    OwnerReleased(ReleaseEvent),
    /// See [`AssetEvent`].
    AssetDisposed(AssetEvent),
    /// See [`DisplayEvent`].
    Display(DisplayEvent),
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the runtime.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for every open or close request.
    fn on_request(&mut self, e: &RequestEvent) {
        _ = e;
    }

    /// Called at each view lifecycle step.
    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        _ = e;
    }

    /// Called when a view is shown or hidden by visibility recomputation.
    fn on_visibility(&mut self, e: &VisibilityEvent) {
        _ = e;
    }

    /// Called when a resource owner is invalidated.
    fn on_owner_invalidated(&mut self, e: &OwnerEvent) {
        _ = e;
    }

    /// Called when an owner's retained set is released.
    fn on_owner_released(&mut self, e: &ReleaseEvent) {
        _ = e;
    }

    /// Called when an asset is disposed.
    fn on_asset_disposed(&mut self, e: &AssetEvent) {
        _ = e;
    }

    /// Called when the viewport changes size or orientation.
    fn on_display_change(&mut self, e: &DisplayEvent) {
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

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Dispatches a buffered event to the matching sink method.
    #[inline]
    pub fn emit(&mut self, e: &UiEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            match e {
                UiEvent::Request(e) => s.on_request(e),
                UiEvent::Lifecycle(e) => s.on_lifecycle(e),
                UiEvent::Visibility(e) => s.on_visibility(e),
                UiEvent::OwnerInvalidated(e) => s.on_owner_invalidated(e),
                UiEvent::OwnerReleased(e) => s.on_owner_released(e),
                UiEvent::AssetDisposed(e) => s.on_asset_disposed(e),
                UiEvent::Display(e) => s.on_display_change(e),
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Dispatches every event in order.
    #[inline]
    pub fn emit_all(&mut self, events: &[UiEvent]) {
        for e in events {
            self.emit(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use kurbo::Size;

    use super::*;

    fn sample_request() -> UiEvent {
        UiEvent::Request(RequestEvent {
            at: HostTime(1_000),
            view: ViewId(3),
            op: RequestOp::Open,
            disposition: Disposition::Queued,
        })
    }

    #[test]
    fn orientation_from_aspect() {
        assert_eq!(Orientation::of(Size::new(1920.0, 1080.0)), Orientation::Landscape);
        assert_eq!(Orientation::of(Size::new(1080.0, 1920.0)), Orientation::Portrait);
        assert_eq!(Orientation::of(Size::new(500.0, 500.0)), Orientation::Landscape);
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_lifecycle(&LifecycleEvent {
            at: HostTime(0),
            view: ViewId(1),
            stage: LifecycleStage::Opened,
        });
        sink.on_asset_disposed(&AssetEvent {
            at: HostTime(0),
            asset: 0,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.emit(&sample_request());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            requests: Vec<ViewId>,
            releases: Vec<u32>,
        }
        impl TraceSink for RecordingSink {
            fn on_request(&mut self, e: &RequestEvent) {
                self.requests.push(e.view);
            }
            fn on_owner_released(&mut self, e: &ReleaseEvent) {
                self.releases.push(e.released);
            }
        }

        let mut sink = RecordingSink {
            requests: Vec::new(),
            releases: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.emit_all(&[
            sample_request(),
            UiEvent::OwnerReleased(ReleaseEvent {
                at: HostTime(5),
                owner: 1,
                released: 4,
                forced: false,
            }),
        ]);
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.requests, &[ViewId(3)]);
        assert_eq!(sink.releases, &[4]);
    }
}
