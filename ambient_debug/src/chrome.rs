// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads events from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::RecordedEvent;

const TID_LIFECYCLE: u32 = 0;
const TID_CUES: u32 = 1;
const TID_MIRROR: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Host times in milliseconds become microsecond timestamps. Each mount is a
/// `B`/`E` span and each running live mirror a second span on its own track;
/// everything else is an instant event.
pub fn export(recorded: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for event in recorded {
        let ts = ms_to_us(event.at());
        match event {
            RecordedEvent::Mount(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": "Mounted",
                    "cat": "Lifecycle",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_LIFECYCLE,
                    "args": {
                        "mode": format!("{:?}", e.mode),
                        "epoch": e.epoch,
                        "listeners": e.listeners,
                    }
                }));
            }
            RecordedEvent::Unmount(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": "Mounted",
                    "cat": "Lifecycle",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_LIFECYCLE,
                    "args": {
                        "epoch": e.epoch,
                        "listeners_removed": e.listeners_removed,
                        "surfaces_removed": e.surfaces_removed,
                    }
                }));
            }
            RecordedEvent::Warning(e) => {
                events.push(instant(
                    "Warning",
                    "Lifecycle",
                    ts,
                    TID_LIFECYCLE,
                    json!({ "warning": format!("{:?}", e.warning) }),
                ));
            }
            RecordedEvent::Error { stage, error, .. } => {
                events.push(instant(
                    "Error",
                    "Lifecycle",
                    ts,
                    TID_LIFECYCLE,
                    json!({
                        "stage": format!("{stage:?}"),
                        "message": error.to_string(),
                    }),
                ));
            }
            RecordedEvent::CuesLoaded { url, count, .. } => {
                events.push(instant(
                    "CuesLoaded",
                    "Cues",
                    ts,
                    TID_CUES,
                    json!({ "url": url, "count": count }),
                ));
            }
            RecordedEvent::CueChange {
                position,
                ticket,
                start,
                end,
                src,
                deferred,
                ..
            } => {
                events.push(instant(
                    "CueChange",
                    "Cues",
                    ts,
                    TID_CUES,
                    json!({
                        "position": position,
                        "ticket": ticket,
                        "start": start,
                        "end": end,
                        "src": src,
                        "deferred": deferred,
                    }),
                ));
            }
            RecordedEvent::AtlasLoad { url, ready, .. } => {
                events.push(instant(
                    "AtlasLoad",
                    "Cues",
                    ts,
                    TID_CUES,
                    json!({ "url": url, "ready": ready }),
                ));
            }
            RecordedEvent::SpriteDraw(e) => {
                events.push(instant(
                    "SpriteDraw",
                    "Cues",
                    ts,
                    TID_CUES,
                    json!({
                        "ticket": e.ticket,
                        "start": e.start,
                        "end": e.end,
                        "evicted": e.evicted,
                        "pooled": e.pooled,
                    }),
                ));
            }
            RecordedEvent::StaleDraw(e) => {
                events.push(instant(
                    "StaleDraw",
                    "Cues",
                    ts,
                    TID_CUES,
                    json!({ "ticket": e.ticket, "start": e.start, "end": e.end }),
                ));
            }
            RecordedEvent::MirrorState(e) => {
                let ph = if e.running { "B" } else { "E" };
                events.push(json!({
                    "ph": ph,
                    "name": "Mirroring",
                    "cat": "Mirror",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_MIRROR,
                }));
            }
            RecordedEvent::MirrorFrame(e) => {
                events.push(instant(
                    "MirrorFrame",
                    "Mirror",
                    ts,
                    TID_MIRROR,
                    json!({
                        "width": e.width,
                        "height": e.height,
                        "drawn": e.drawn,
                        "immediate": e.immediate,
                    }),
                ));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn instant(name: &str, cat: &str, ts: f64, tid: u32, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": tid,
        "s": "t",
        "args": args,
    })
}

fn ms_to_us(ms: f64) -> f64 {
    ms * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use ambient_core::backend::RenderMode;
    use ambient_core::trace::{
        CueChangeEvent, MirrorStateEvent, MountEvent, TraceSink, UnmountEvent,
    };

    fn export_to_values(rec: &RecorderSink) -> Vec<Value> {
        let mut out = Vec::new();
        export(rec.events(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        serde_json::from_str(&json_str).unwrap()
    }

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_mount(&MountEvent {
            at: 1.5,
            mode: RenderMode::CueDriven,
            epoch: 1,
            listeners: 3,
        });
        rec.on_cue_change(&CueChangeEvent {
            at: 2.0,
            position: 6.0,
            ticket: 1,
            start: 5.0,
            end: 10.0,
            src: "https://cdn.example/v/sprite_0.jpg",
            deferred: false,
        });
        rec.on_unmount(&UnmountEvent {
            at: 4.0,
            mode: RenderMode::CueDriven,
            epoch: 1,
            listeners_removed: 3,
            surfaces_removed: 1,
        });

        let parsed = export_to_values(&rec);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["ts"], 1500.0);
        assert_eq!(parsed[0]["args"]["mode"], "CueDriven");
        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["name"], "CueChange");
        assert_eq!(parsed[1]["args"]["src"], "https://cdn.example/v/sprite_0.jpg");
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["name"], parsed[0]["name"]);
    }

    #[test]
    fn mirror_runs_are_spans_on_their_own_track() {
        let mut rec = RecorderSink::new();
        rec.on_mirror_state(&MirrorStateEvent {
            at: 10.0,
            running: true,
        });
        rec.on_mirror_state(&MirrorStateEvent {
            at: 20.0,
            running: false,
        });

        let parsed = export_to_values(&rec);
        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[1]["ph"], "E");
        assert_eq!(parsed[0]["tid"], TID_MIRROR);
        assert_eq!(parsed[1]["ts"], 20000.0);
    }

    #[test]
    fn empty_log_exports_empty_array() {
        let parsed = export_to_values(&RecorderSink::new());
        assert!(parsed.is_empty(), "no events");
    }
}
