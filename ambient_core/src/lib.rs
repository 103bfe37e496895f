// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cue-driven sprite scheduling and live-mirror lifecycle for ambient video
//! companions.
//!
//! `ambient_core` renders a soft "ambient" surface behind a video element. It
//! has two modes: a live mirror that copies the current video frame every
//! display refresh, and a cue-driven mode that paints thumbnails cut from
//! sprite atlases according to a WebVTT thumbnail track. The crate is
//! `no_std` compatible (with `alloc`) and talks to the host exclusively through
//! the [`Platform`](backend::Platform) trait.
//!
//! # Architecture
//!
//! ```text
//!   Platform signals (time-update, play, seek, ...)
//!       │
//!       ▼
//!   AmbientController ──► frame request ──► CueScheduler::select()
//!       │                                        │
//!       │                          AtlasCache::get() ── (load) ──┐
//!       │                                        │               │
//!       │                                        ▼               ▼
//!       │                           paint_sprite() ◄── ready waiter (ticket check)
//!       │                                        │
//!       │                                        ▼
//!       │                              SurfacePool::insert() (evict oldest)
//!       ▼
//!   MirrorLoop ──► frame tick ──► Platform::mirror_frame()
//! ```
//!
//! **[`timecode`]**: `HH:MM:SS.mmm` timestamp decoding.
//!
//! **[`cue`]**: Thumbnail-track parsing into an ordered [`CueTrack`](cue::CueTrack).
//!
//! **[`atlas`]**: URL-keyed cache of tri-state atlas image handles.
//!
//! **[`pool`]**: Bounded cross-fade pool of overlay surfaces.
//!
//! **[`schedule`]**: Active-cue selection, draw tickets and the sprite paint
//! operation.
//!
//! **[`mirror`]**: Run-state for the cancellable live-mirror loop.
//!
//! **[`registry`]**: Per-instance record of registered media listeners.
//!
//! **[`controller`]**: [`AmbientController`](controller::AmbientController),
//! the mount/unmount orchestrator.
//!
//! **[`backend`]**: The [`Platform`](backend::Platform) and
//! [`Surface`](backend::Surface) collaborator contracts.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod atlas;
pub mod backend;
pub mod controller;
pub mod cue;
pub mod error;
pub mod mirror;
pub mod options;
pub mod pool;
pub mod registry;
pub mod schedule;
pub mod timecode;
pub mod trace;

#[cfg(test)]
mod testing;

pub use controller::AmbientController;
pub use error::AmbientError;
pub use options::AmbientOptions;
