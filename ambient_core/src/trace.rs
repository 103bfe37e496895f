// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the ambient controller.
//!
//! This module provides a [`TraceSink`] trait with one method per event the
//! controller emits: lifecycle transitions, warnings, swallowed errors, cue
//! changes, atlas loads and draws. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! Every event carries `at`, the platform's [`now`](crate::backend::Platform::now)
//! in milliseconds when the event was emitted.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::backend::RenderMode;
use crate::error::AmbientError;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Recoverable conditions worth surfacing to a developer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Warning {
    /// `mount` was called on an instance that is already mounted.
    AlreadyMounted,
    /// A cue-driven lookup ran before the cue track was available.
    CuesUnavailable,
}

/// Where a swallowed or surfaced error originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorStage {
    /// Mount setup; the instance was torn down and the error returned.
    Mount,
    /// Fetching the cue file; the instance continues without cues.
    CueFetch,
    /// Loading an atlas image; its cues draw nothing.
    AtlasLoad,
    /// Painting a sprite onto a pooled surface.
    SpriteDraw,
    /// Copying the live video frame.
    MirrorDraw,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted after a successful mount.
#[derive(Clone, Copy, Debug)]
pub struct MountEvent {
    /// Host time in milliseconds.
    pub at: f64,
    /// Active rendering mode.
    pub mode: RenderMode,
    /// Mount epoch.
    pub epoch: u64,
    /// Number of media listeners registered.
    pub listeners: usize,
}

/// Emitted after an unmount that tore something down.
#[derive(Clone, Copy, Debug)]
pub struct UnmountEvent {
    /// Host time in milliseconds.
    pub at: f64,
    /// Mode that was active.
    pub mode: RenderMode,
    /// Epoch after the unmount.
    pub epoch: u64,
    /// Media listeners removed.
    pub listeners_removed: usize,
    /// Attached surfaces removed from the visual parent.
    pub surfaces_removed: usize,
}

/// Emitted for a [`Warning`].
#[derive(Clone, Copy, Debug)]
pub struct WarningEvent {
    /// Host time in milliseconds.
    pub at: f64,
    /// What happened.
    pub warning: Warning,
}

/// Emitted for every error the controller handles.
#[derive(Clone, Copy, Debug)]
pub struct ErrorEvent<'a> {
    /// Host time in milliseconds.
    pub at: f64,
    /// Where the error came from.
    pub stage: ErrorStage,
    /// The error itself.
    pub error: &'a AmbientError,
}

/// Emitted when the cue file has been fetched and parsed.
#[derive(Clone, Copy, Debug)]
pub struct CuesLoadedEvent<'a> {
    /// Host time in milliseconds.
    pub at: f64,
    /// Cue file location.
    pub url: &'a str,
    /// Number of cues parsed.
    pub count: usize,
}

/// Emitted when the scheduler accepts a new active cue.
#[derive(Clone, Copy, Debug)]
pub struct CueChangeEvent<'a> {
    /// Host time in milliseconds.
    pub at: f64,
    /// Playback position that selected the cue, in seconds.
    pub position: f64,
    /// Draw ticket issued for the cue.
    pub ticket: u64,
    /// Cue start in seconds.
    pub start: f64,
    /// Cue end in seconds.
    pub end: f64,
    /// Atlas image location.
    pub src: &'a str,
    /// `true` if the draw waits for the atlas image to load.
    pub deferred: bool,
}

/// Emitted when an atlas load completes.
#[derive(Clone, Copy, Debug)]
pub struct AtlasLoadEvent<'a> {
    /// Host time in milliseconds.
    pub at: f64,
    /// Atlas image location.
    pub url: &'a str,
    /// `false` if the load failed.
    pub ready: bool,
}

/// Emitted after a sprite has been painted and pooled.
#[derive(Clone, Copy, Debug)]
pub struct SpriteDrawEvent {
    /// Host time in milliseconds.
    pub at: f64,
    /// Draw ticket of the painted cue.
    pub ticket: u64,
    /// Cue start in seconds.
    pub start: f64,
    /// Cue end in seconds.
    pub end: f64,
    /// Surfaces evicted by the insert.
    pub evicted: usize,
    /// Surfaces in the pool afterwards.
    pub pooled: usize,
}

/// Emitted when a deferred draw is discarded because a newer cue won.
#[derive(Clone, Copy, Debug)]
pub struct StaleDrawEvent {
    /// Host time in milliseconds.
    pub at: f64,
    /// Ticket of the discarded draw.
    pub ticket: u64,
    /// Cue start in seconds.
    pub start: f64,
    /// Cue end in seconds.
    pub end: f64,
}

/// Emitted when the mirror loop starts or stops.
#[derive(Clone, Copy, Debug)]
pub struct MirrorStateEvent {
    /// Host time in milliseconds.
    pub at: f64,
    /// New state.
    pub running: bool,
}

/// Emitted for each live-mirror paint attempt.
#[derive(Clone, Copy, Debug)]
pub struct MirrorFrameEvent {
    /// Host time in milliseconds.
    pub at: f64,
    /// Surface width after resize.
    pub width: f64,
    /// Surface height after resize.
    pub height: f64,
    /// `false` if the frame could not be drawn and the tick was skipped.
    pub drawn: bool,
    /// `true` for out-of-loop draws triggered by load or seek.
    pub immediate: bool,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the controller.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called after a successful mount.
    fn on_mount(&mut self, e: &MountEvent) {
        _ = e;
    }

    /// Called after a teardown.
    fn on_unmount(&mut self, e: &UnmountEvent) {
        _ = e;
    }

    /// Called for recoverable conditions.
    fn on_warning(&mut self, e: &WarningEvent) {
        _ = e;
    }

    /// Called for every handled error.
    fn on_error(&mut self, e: &ErrorEvent<'_>) {
        _ = e;
    }

    /// Called when the cue track becomes available.
    fn on_cues_loaded(&mut self, e: &CuesLoadedEvent<'_>) {
        _ = e;
    }

    /// Called when a new cue becomes active.
    fn on_cue_change(&mut self, e: &CueChangeEvent<'_>) {
        _ = e;
    }

    /// Called when an atlas load completes.
    fn on_atlas_load(&mut self, e: &AtlasLoadEvent<'_>) {
        _ = e;
    }

    /// Called after a sprite draw.
    fn on_sprite_draw(&mut self, e: &SpriteDrawEvent) {
        _ = e;
    }

    /// Called when a deferred draw is discarded.
    fn on_stale_draw(&mut self, e: &StaleDrawEvent) {
        _ = e;
    }

    /// Called when the mirror loop changes state.
    fn on_mirror_state(&mut self, e: &MirrorStateEvent) {
        _ = e;
    }

    /// Called for each mirror paint attempt.
    fn on_mirror_frame(&mut self, e: &MirrorFrameEvent) {
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

macro_rules! tracer_methods {
    ($($(#[$doc:meta])* $name:ident => $hook:ident($ty:ty);)*) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $name(&mut self, e: &$ty) {
                #[cfg(feature = "trace")]
                if let Some(s) = &mut self.sink {
                    s.$hook(e);
                }
                #[cfg(not(feature = "trace"))]
                {
                    _ = e;
                }
            }
        )*
    };
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

    tracer_methods! {
        /// Emits a [`MountEvent`].
        mount => on_mount(MountEvent);
        /// Emits an [`UnmountEvent`].
        unmount => on_unmount(UnmountEvent);
        /// Emits a [`WarningEvent`].
        warning => on_warning(WarningEvent);
        /// Emits an [`ErrorEvent`].
        error => on_error(ErrorEvent<'_>);
        /// Emits a [`CuesLoadedEvent`].
        cues_loaded => on_cues_loaded(CuesLoadedEvent<'_>);
        /// Emits a [`CueChangeEvent`].
        cue_change => on_cue_change(CueChangeEvent<'_>);
        /// Emits an [`AtlasLoadEvent`].
        atlas_load => on_atlas_load(AtlasLoadEvent<'_>);
        /// Emits a [`SpriteDrawEvent`].
        sprite_draw => on_sprite_draw(SpriteDrawEvent);
        /// Emits a [`StaleDrawEvent`].
        stale_draw => on_stale_draw(StaleDrawEvent);
        /// Emits a [`MirrorStateEvent`].
        mirror_state => on_mirror_state(MirrorStateEvent);
        /// Emits a [`MirrorFrameEvent`].
        mirror_frame => on_mirror_frame(MirrorFrameEvent);
    }
}
