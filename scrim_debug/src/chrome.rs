// Copyright 2026 the Scrim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//! View events land on a track per view id; resource and display events on
//! track zero.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use scrim_core::time::HostTime;
use scrim_core::trace::UiEvent;

use crate::recorder::decode;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(|e| to_trace_event(&e)).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn to_trace_event(event: &UiEvent) -> Value {
    match event {
        UiEvent::Request(e) => json!({
            "ph": "i",
            "name": format!("{:?}", e.op),
            "cat": "Request",
            "ts": to_us(e.at),
            "pid": 0,
            "tid": e.view.0,
            "s": "t",
            "args": {
                "disposition": format!("{:?}", e.disposition),
            }
        }),
        UiEvent::Lifecycle(e) => json!({
            "ph": "i",
            "name": format!("{:?}", e.stage),
            "cat": "Lifecycle",
            "ts": to_us(e.at),
            "pid": 0,
            "tid": e.view.0,
            "s": "t",
        }),
        UiEvent::Visibility(e) => {
            let name = if e.visible { "Shown" } else { "Hidden" };
            json!({
                "ph": "i",
                "name": name,
                "cat": "Visibility",
                "ts": to_us(e.at),
                "pid": 0,
                "tid": e.view.0,
                "s": "t",
            })
        }
        UiEvent::OwnerInvalidated(e) => json!({
            "ph": "i",
            "name": "OwnerInvalidated",
            "cat": "Resources",
            "ts": to_us(e.at),
            "pid": 0,
            "tid": 0,
            "s": "p",
            "args": {
                "owner": e.owner,
            }
        }),
        UiEvent::OwnerReleased(e) => json!({
            "ph": "i",
            "name": "OwnerReleased",
            "cat": "Resources",
            "ts": to_us(e.at),
            "pid": 0,
            "tid": 0,
            "s": "p",
            "args": {
                "owner": e.owner,
                "released": e.released,
                "forced": e.forced,
            }
        }),
        UiEvent::AssetDisposed(e) => json!({
            "ph": "i",
            "name": "AssetDisposed",
            "cat": "Resources",
            "ts": to_us(e.at),
            "pid": 0,
            "tid": 0,
            "s": "p",
            "args": {
                "asset": e.asset,
            }
        }),
        UiEvent::Display(e) => json!({
            "ph": "C",
            "name": "Viewport",
            "cat": "Display",
            "ts": to_us(e.at),
            "pid": 0,
            "tid": 0,
            "args": {
                "width": e.width,
                "height": e.height,
            }
        }),
    }
}

fn to_us(t: HostTime) -> f64 {
    t.nanos() as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use scrim_core::trace::{
        DisplayEvent, LifecycleEvent, LifecycleStage, Orientation, RequestEvent, RequestOp,
        TraceSink,
    };
    use scrim_core::view::{Disposition, ViewId};

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_request(&RequestEvent {
            at: HostTime(1_000_000),
            view: ViewId(4),
            op: RequestOp::Open,
            disposition: Disposition::Started,
        });
        rec.on_lifecycle(&LifecycleEvent {
            at: HostTime(2_000_000),
            view: ViewId(4),
            stage: LifecycleStage::Opened,
        });
        rec.on_display_change(&DisplayEvent {
            at: HostTime(3_000_000),
            width: 800.0,
            height: 600.0,
            orientation: Orientation::Landscape,
            orientation_changed: false,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3, "one trace event per record");

        assert_eq!(parsed[0]["name"], "Open", "request named by op");
        assert_eq!(parsed[0]["tid"], 4, "view events use the view track");
        assert_eq!(parsed[0]["ts"], 1000.0, "nanoseconds become microseconds");

        assert_eq!(parsed[1]["name"], "Opened", "lifecycle named by stage");

        assert_eq!(parsed[2]["ph"], "C", "display changes are counters");
        assert_eq!(parsed[2]["args"]["width"], 800.0, "width is carried");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty(), "no records, no events");
    }
}
