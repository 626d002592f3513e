// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for scrim
//! diagnostics, plus JSON view configuration loading.
//!
//! This crate provides [`TraceSink`](scrim_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from
//!   recorded bytes.
//!
//! [`config`] reads a [`ViewConfigTable`](scrim_core::view::ViewConfigTable)
//! from JSON.

pub mod chrome;
pub mod config;
pub mod pretty;
pub mod recorder;
