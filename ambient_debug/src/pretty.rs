// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Host times
//! are printed in milliseconds; media positions as WebVTT timestamps.

use std::io::Write;

use ambient_core::backend::RenderMode;
use ambient_core::timecode::format_timestamp;
use ambient_core::trace::{
    AtlasLoadEvent, CueChangeEvent, CuesLoadedEvent, ErrorEvent, MirrorFrameEvent,
    MirrorStateEvent, MountEvent, SpriteDrawEvent, StaleDrawEvent, TraceSink, UnmountEvent,
    WarningEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    frames: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            frames: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            frames: false,
        }
    }

    /// Also prints one line per mirrored frame. Off by default: the live
    /// mirror emits an event every display refresh.
    #[must_use]
    pub fn with_frames(mut self, frames: bool) -> Self {
        self.frames = frames;
        self
    }

    /// Consumes the sink and returns the destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn mode_name(mode: RenderMode) -> &'static str {
    match mode {
        RenderMode::LiveMirror => "mirror",
        RenderMode::CueDriven => "cues",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_mount(&mut self, e: &MountEvent) {
        let _ = writeln!(
            self.writer,
            "[mount] {} epoch={} listeners={} at {:.1}ms",
            mode_name(e.mode),
            e.epoch,
            e.listeners,
            e.at,
        );
    }

    fn on_unmount(&mut self, e: &UnmountEvent) {
        let _ = writeln!(
            self.writer,
            "[unmount] {} epoch={} listeners={} surfaces={} at {:.1}ms",
            mode_name(e.mode),
            e.epoch,
            e.listeners_removed,
            e.surfaces_removed,
            e.at,
        );
    }

    fn on_warning(&mut self, e: &WarningEvent) {
        let _ = writeln!(self.writer, "[warn] {:?} at {:.1}ms", e.warning, e.at);
    }

    fn on_error(&mut self, e: &ErrorEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[error] {:?}: {} at {:.1}ms",
            e.stage, e.error, e.at,
        );
    }

    fn on_cues_loaded(&mut self, e: &CuesLoadedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[cues] {} count={} at {:.1}ms",
            e.url, e.count, e.at,
        );
    }

    fn on_cue_change(&mut self, e: &CueChangeEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[cue] #{} {} --> {} pos={} src={}{}",
            e.ticket,
            format_timestamp(e.start),
            format_timestamp(e.end),
            format_timestamp(e.position),
            e.src,
            if e.deferred { " (deferred)" } else { "" },
        );
    }

    fn on_atlas_load(&mut self, e: &AtlasLoadEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[atlas] {} {} at {:.1}ms",
            e.url,
            if e.ready { "ready" } else { "failed" },
            e.at,
        );
    }

    fn on_sprite_draw(&mut self, e: &SpriteDrawEvent) {
        let _ = writeln!(
            self.writer,
            "[draw] #{} {} --> {} pooled={} evicted={}",
            e.ticket,
            format_timestamp(e.start),
            format_timestamp(e.end),
            e.pooled,
            e.evicted,
        );
    }

    fn on_stale_draw(&mut self, e: &StaleDrawEvent) {
        let _ = writeln!(
            self.writer,
            "[stale] #{} {} --> {}",
            e.ticket,
            format_timestamp(e.start),
            format_timestamp(e.end),
        );
    }

    fn on_mirror_state(&mut self, e: &MirrorStateEvent) {
        let _ = writeln!(
            self.writer,
            "[mirror] {} at {:.1}ms",
            if e.running { "start" } else { "stop" },
            e.at,
        );
    }

    fn on_mirror_frame(&mut self, e: &MirrorFrameEvent) {
        if !self.frames {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[frame] {}x{}{}{} at {:.1}ms",
            e.width,
            e.height,
            if e.drawn { "" } else { " dropped" },
            if e.immediate { " immediate" } else { "" },
            e.at,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambient_core::AmbientError;
    use ambient_core::trace::ErrorStage;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_cue_change() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_cue_change(&CueChangeEvent {
            at: 12.0,
            position: 7.25,
            ticket: 3,
            start: 5.0,
            end: 10.0,
            src: "https://cdn.example/v/sprite_0.jpg",
            deferred: true,
        });
        let output = output(sink);
        assert!(
            output.contains("[cue] #3 00:00:05.000 --> 00:00:10.000"),
            "got: {output}"
        );
        assert!(output.contains("(deferred)"), "got: {output}");
    }

    #[test]
    fn pretty_print_error_carries_stage() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        let error = AmbientError::ImageLoad("sprite_1.jpg".into());
        sink.on_error(&ErrorEvent {
            at: 40.5,
            stage: ErrorStage::AtlasLoad,
            error: &error,
        });
        let output = output(sink);
        assert!(output.starts_with("[error] AtlasLoad:"), "got: {output}");
        assert!(output.contains("sprite_1.jpg"), "got: {output}");
    }

    #[test]
    fn mirror_frames_are_opt_in() {
        let frame = MirrorFrameEvent {
            at: 16.0,
            width: 640.0,
            height: 360.0,
            drawn: true,
            immediate: false,
        };
        let mut quiet = PrettyPrintSink::with_writer(Vec::<u8>::new());
        quiet.on_mirror_frame(&frame);
        assert!(output(quiet).is_empty(), "frames are off by default");

        let mut loud = PrettyPrintSink::with_writer(Vec::<u8>::new()).with_frames(true);
        loud.on_mirror_frame(&frame);
        let output = output(loud);
        assert!(output.contains("[frame] 640x360"), "got: {output}");
    }
}
