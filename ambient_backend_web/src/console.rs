// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`TraceSink`] that reports to the browser console.

use alloc::format;
use alloc::string::String;

use wasm_bindgen::JsValue;
use web_sys::console;

use ambient_core::backend::RenderMode;
use ambient_core::timecode::format_timestamp;
use ambient_core::trace::{
    AtlasLoadEvent, CueChangeEvent, CuesLoadedEvent, ErrorEvent, ErrorStage, MountEvent,
    StaleDrawEvent, TraceSink, UnmountEvent, Warning, WarningEvent,
};

/// Console reporter.
///
/// Errors go to `console.error` and warnings to `console.warn`. With
/// [`verbose`](Self::verbose), lifecycle and cue events are also logged with
/// `console.debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    /// Creates a sink that reports warnings and errors only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also logs lifecycle and cue events.
    #[must_use]
    pub fn verbose() -> Self {
        Self { verbose: true }
    }

    fn debug(&self, message: &str) {
        if self.verbose {
            console::debug_1(&JsValue::from_str(message));
        }
    }
}

impl TraceSink for ConsoleSink {
    fn on_mount(&mut self, e: &MountEvent) {
        self.debug(&format!(
            "ambient: mounted ({}, {} listeners)",
            mode_name(e.mode),
            e.listeners
        ));
    }

    fn on_unmount(&mut self, e: &UnmountEvent) {
        self.debug(&format!(
            "ambient: unmounted ({} listeners, {} surfaces removed)",
            e.listeners_removed, e.surfaces_removed
        ));
    }

    fn on_warning(&mut self, e: &WarningEvent) {
        console::warn_1(&JsValue::from_str(&warning_message(e.warning)));
    }

    fn on_error(&mut self, e: &ErrorEvent<'_>) {
        console::error_1(&JsValue::from_str(&error_message(e.stage, e.error)));
    }

    fn on_cues_loaded(&mut self, e: &CuesLoadedEvent<'_>) {
        self.debug(&format!("ambient: {} cues from {}", e.count, e.url));
    }

    fn on_cue_change(&mut self, e: &CueChangeEvent<'_>) {
        self.debug(&format!(
            "ambient: cue {} --> {} at {}{}",
            format_timestamp(e.start),
            format_timestamp(e.end),
            format_timestamp(e.position),
            if e.deferred { " (waiting for sheet)" } else { "" }
        ));
    }

    fn on_atlas_load(&mut self, e: &AtlasLoadEvent<'_>) {
        if e.ready {
            self.debug(&format!("ambient: sprite sheet ready {}", e.url));
        }
    }

    fn on_stale_draw(&mut self, e: &StaleDrawEvent) {
        self.debug(&format!(
            "ambient: dropped stale draw for {} --> {}",
            format_timestamp(e.start),
            format_timestamp(e.end)
        ));
    }
}

fn mode_name(mode: RenderMode) -> &'static str {
    match mode {
        RenderMode::LiveMirror => "live mirror",
        RenderMode::CueDriven => "cue-driven",
    }
}

fn warning_message(warning: Warning) -> String {
    match warning {
        Warning::AlreadyMounted => String::from("ambient: already mounted"),
        Warning::CuesUnavailable => String::from("ambient: cue track not loaded"),
    }
}

fn error_message(stage: ErrorStage, error: &ambient_core::AmbientError) -> String {
    let context = match stage {
        ErrorStage::Mount => "Failed to mount",
        ErrorStage::CueFetch => "Failed to load VTT file",
        ErrorStage::AtlasLoad => "Failed to load sprite sheet",
        ErrorStage::SpriteDraw => "Error drawing sprite",
        ErrorStage::MirrorDraw => "Error drawing video frame",
    };
    format!("{context}: {error}")
}
