// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] keeps an owned copy of every event it receives, in
//! emission order. Borrowed fields (URLs, errors) are cloned so the log
//! outlives the controller that produced it.

use ambient_core::AmbientError;
use ambient_core::trace::{
    AtlasLoadEvent, CueChangeEvent, CuesLoadedEvent, ErrorEvent, ErrorStage, MirrorFrameEvent,
    MirrorStateEvent, MountEvent, SpriteDrawEvent, StaleDrawEvent, TraceSink, UnmountEvent,
    Warning, WarningEvent,
};

/// A recorded event. Borrowing events are stored with owned fields.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`MountEvent`].
    Mount(MountEvent),
    /// An [`UnmountEvent`].
    Unmount(UnmountEvent),
    /// A [`WarningEvent`].
    Warning(WarningEvent),
    /// An [`ErrorEvent`].
    Error {
        /// Host time in milliseconds.
        at: f64,
        /// Where the error originated.
        stage: ErrorStage,
        /// The error itself.
        error: AmbientError,
    },
    /// A [`CuesLoadedEvent`].
    CuesLoaded {
        /// Host time in milliseconds.
        at: f64,
        /// Cue file URL.
        url: String,
        /// Number of cues parsed.
        count: usize,
    },
    /// A [`CueChangeEvent`].
    CueChange {
        /// Host time in milliseconds.
        at: f64,
        /// Media position that selected the cue, in seconds.
        position: f64,
        /// Draw ticket issued for the change.
        ticket: u64,
        /// Cue start, in seconds.
        start: f64,
        /// Cue end, in seconds.
        end: f64,
        /// Resolved atlas URL.
        src: String,
        /// Whether the draw waits for the atlas.
        deferred: bool,
    },
    /// An [`AtlasLoadEvent`].
    AtlasLoad {
        /// Host time in milliseconds.
        at: f64,
        /// Atlas URL.
        url: String,
        /// `true` when the image is usable.
        ready: bool,
    },
    /// A [`SpriteDrawEvent`].
    SpriteDraw(SpriteDrawEvent),
    /// A [`StaleDrawEvent`].
    StaleDraw(StaleDrawEvent),
    /// A [`MirrorStateEvent`].
    MirrorState(MirrorStateEvent),
    /// A [`MirrorFrameEvent`].
    MirrorFrame(MirrorFrameEvent),
}

impl RecordedEvent {
    /// Host time in milliseconds at which the event was emitted.
    #[must_use]
    pub fn at(&self) -> f64 {
        match self {
            Self::Mount(e) => e.at,
            Self::Unmount(e) => e.at,
            Self::Warning(e) => e.at,
            Self::SpriteDraw(e) => e.at,
            Self::StaleDraw(e) => e.at,
            Self::MirrorState(e) => e.at,
            Self::MirrorFrame(e) => e.at,
            Self::Error { at, .. }
            | Self::CuesLoaded { at, .. }
            | Self::CueChange { at, .. }
            | Self::AtlasLoad { at, .. } => *at,
        }
    }

    /// Short lowercase name, stable across releases.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mount(_) => "mount",
            Self::Unmount(_) => "unmount",
            Self::Warning(_) => "warning",
            Self::Error { .. } => "error",
            Self::CuesLoaded { .. } => "cues_loaded",
            Self::CueChange { .. } => "cue_change",
            Self::AtlasLoad { .. } => "atlas_load",
            Self::SpriteDraw(_) => "sprite_draw",
            Self::StaleDraw(_) => "stale_draw",
            Self::MirrorState(_) => "mirror_state",
            Self::MirrorFrame(_) => "mirror_frame",
        }
    }
}

/// A [`TraceSink`] that records every event in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> impl Iterator<Item = Warning> + '_ {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::Warning(w) => Some(w.warning),
            _ => None,
        })
    }

    /// Drops every recorded event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Consumes the recorder and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }
}

impl TraceSink for RecorderSink {
    fn on_mount(&mut self, e: &MountEvent) {
        self.events.push(RecordedEvent::Mount(*e));
    }

    fn on_unmount(&mut self, e: &UnmountEvent) {
        self.events.push(RecordedEvent::Unmount(*e));
    }

    fn on_warning(&mut self, e: &WarningEvent) {
        self.events.push(RecordedEvent::Warning(*e));
    }

    fn on_error(&mut self, e: &ErrorEvent<'_>) {
        self.events.push(RecordedEvent::Error {
            at: e.at,
            stage: e.stage,
            error: e.error.clone(),
        });
    }

    fn on_cues_loaded(&mut self, e: &CuesLoadedEvent<'_>) {
        self.events.push(RecordedEvent::CuesLoaded {
            at: e.at,
            url: e.url.to_owned(),
            count: e.count,
        });
    }

    fn on_cue_change(&mut self, e: &CueChangeEvent<'_>) {
        self.events.push(RecordedEvent::CueChange {
            at: e.at,
            position: e.position,
            ticket: e.ticket,
            start: e.start,
            end: e.end,
            src: e.src.to_owned(),
            deferred: e.deferred,
        });
    }

    fn on_atlas_load(&mut self, e: &AtlasLoadEvent<'_>) {
        self.events.push(RecordedEvent::AtlasLoad {
            at: e.at,
            url: e.url.to_owned(),
            ready: e.ready,
        });
    }

    fn on_sprite_draw(&mut self, e: &SpriteDrawEvent) {
        self.events.push(RecordedEvent::SpriteDraw(*e));
    }

    fn on_stale_draw(&mut self, e: &StaleDrawEvent) {
        self.events.push(RecordedEvent::StaleDraw(*e));
    }

    fn on_mirror_state(&mut self, e: &MirrorStateEvent) {
        self.events.push(RecordedEvent::MirrorState(*e));
    }

    fn on_mirror_frame(&mut self, e: &MirrorFrameEvent) {
        self.events.push(RecordedEvent::MirrorFrame(*e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ambient_core::backend::RenderMode;

    #[test]
    fn records_in_emission_order() {
        let mut rec = RecorderSink::new();
        rec.on_mount(&MountEvent {
            at: 1.0,
            mode: RenderMode::CueDriven,
            epoch: 1,
            listeners: 3,
        });
        rec.on_warning(&WarningEvent {
            at: 2.0,
            warning: Warning::CuesUnavailable,
        });
        rec.on_sprite_draw(&SpriteDrawEvent {
            at: 3.0,
            ticket: 1,
            start: 0.0,
            end: 5.0,
            evicted: 0,
            pooled: 2,
        });

        let names: Vec<_> = rec.events().iter().map(RecordedEvent::name).collect();
        assert_eq!(names, ["mount", "warning", "sprite_draw"]);
        let times: Vec<_> = rec.events().iter().map(RecordedEvent::at).collect();
        assert_eq!(times, [1.0, 2.0, 3.0]);
        assert_eq!(
            rec.warnings().collect::<Vec<_>>(),
            [Warning::CuesUnavailable]
        );
    }

    #[test]
    fn borrowed_fields_are_owned() {
        let mut rec = RecorderSink::new();
        {
            let url = String::from("https://cdn.example/v/sprite_1.jpg");
            let error = AmbientError::ImageLoad(url.clone());
            rec.on_atlas_load(&AtlasLoadEvent {
                at: 9.0,
                url: &url,
                ready: false,
            });
            rec.on_error(&ErrorEvent {
                at: 9.0,
                stage: ErrorStage::AtlasLoad,
                error: &error,
            });
        }

        let events = rec.into_events();
        match &events[0] {
            RecordedEvent::AtlasLoad { url, ready, .. } => {
                assert_eq!(url, "https://cdn.example/v/sprite_1.jpg");
                assert!(!ready, "load failed");
            }
            other => panic!("expected AtlasLoad, got {other:?}"),
        }
        match &events[1] {
            RecordedEvent::Error { stage, error, .. } => {
                assert_eq!(*stage, ErrorStage::AtlasLoad);
                assert!(matches!(error, AmbientError::ImageLoad(_)));
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn clear_drops_history() {
        let mut rec = RecorderSink::new();
        rec.on_mirror_state(&MirrorStateEvent {
            at: 0.0,
            running: true,
        });
        rec.clear();
        assert!(rec.events().is_empty(), "cleared");
    }
}
