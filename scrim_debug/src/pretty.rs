// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable event output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per
//! event to a [`Write`] destination (default: stderr). Timestamps are in
//! milliseconds of runtime time:
//!
//! ```text
//! [    16.667ms] request   view=4 Open -> Started
//! [    16.667ms] lifecycle view=4 LoadStarted
//! [    33.333ms] visible   view=2 hidden
//! ```

use std::io::Write;

use scrim_core::time::HostTime;
use scrim_core::trace::{
    AssetEvent, DisplayEvent, LifecycleEvent, OwnerEvent, ReleaseEvent, RequestEvent, TraceSink,
    VisibilityEvent,
};

/// Writes human-readable trace lines to a [`Write`] destination.
///
/// Write errors are ignored.
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
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
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

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn line(&mut self, at: HostTime, kind: &str, body: std::fmt::Arguments<'_>) {
        let _ = writeln!(
            self.writer,
            "[{:>10.3}ms] {kind:<9} {body}",
            at.nanos() as f64 / 1e6
        );
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_request(&mut self, e: &RequestEvent) {
        self.line(
            e.at,
            "request",
            format_args!("view={} {:?} -> {:?}", e.view.0, e.op, e.disposition),
        );
    }

    fn on_lifecycle(&mut self, e: &LifecycleEvent) {
        self.line(e.at, "lifecycle", format_args!("view={} {:?}", e.view.0, e.stage));
    }

    fn on_visibility(&mut self, e: &VisibilityEvent) {
        let state = if e.visible { "shown" } else { "hidden" };
        self.line(e.at, "visible", format_args!("view={} {state}", e.view.0));
    }

    fn on_owner_invalidated(&mut self, e: &OwnerEvent) {
        self.line(e.at, "owner", format_args!("{:#x} invalidated", e.owner));
    }

    fn on_owner_released(&mut self, e: &ReleaseEvent) {
        let forced = if e.forced { " (forced)" } else { "" };
        self.line(
            e.at,
            "owner",
            format_args!("{:#x} released {}{forced}", e.owner, e.released),
        );
    }

    fn on_asset_disposed(&mut self, e: &AssetEvent) {
        self.line(e.at, "asset", format_args!("#{} disposed", e.asset));
    }

    fn on_display_change(&mut self, e: &DisplayEvent) {
        let flipped = if e.orientation_changed { " (rotated)" } else { "" };
        self.line(
            e.at,
            "display",
            format_args!("{}x{} {:?}{flipped}", e.width, e.height, e.orientation),
        );
    }
}
