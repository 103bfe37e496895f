// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mount/unmount orchestration.
//!
//! [`AmbientController`] owns everything one ambient instance creates: the
//! base surface, the surface pool, the media listeners, pending frame
//! requests and the mirror loop. State lives in an `Rc<Core>` with a
//! `RefCell`; every callback handed to the [`Platform`] captures a `Weak`
//! reference plus the mount epoch it was scheduled under, so callbacks that
//! outlive a mount (or the controller) do nothing.
//!
//! # Lifecycle
//!
//! ```text
//!   new() ── fetch cue file (cue-driven only, once per instance)
//!     │
//!     ▼
//!   Unmounted ──mount()──► Mounted(LiveMirror | CueDriven) ──unmount()──► Unmounted
//! ```
//!
//! Cue tracks and the atlas cache belong to the instance and survive unmount;
//! surfaces, listeners and frame requests belong to the mount.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use crate::atlas::{AtlasCache, has_area};
use crate::backend::{FrameRequest, LoadCallback, MediaSignal, Platform, RenderMode, Surface};
use crate::cue::{Cue, CueTrack, parse_cues};
use crate::error::AmbientError;
use crate::mirror::{MirrorLoop, MirrorRun};
use crate::options::AmbientOptions;
use crate::pool::SurfacePool;
use crate::registry::ListenerRegistry;
use crate::schedule::{CueScheduler, DrawTicket, paint_sprite};
use crate::trace::{
    AtlasLoadEvent, CueChangeEvent, CuesLoadedEvent, ErrorEvent, ErrorStage, MirrorFrameEvent,
    MirrorStateEvent, MountEvent, SpriteDrawEvent, StaleDrawEvent, TraceSink, Tracer,
    UnmountEvent, Warning, WarningEvent,
};

/// Availability of the cue track.
#[derive(Debug)]
enum CueState {
    /// Live-mirror instance; no cue file.
    Absent,
    /// Fetch in flight.
    Pending,
    Ready(CueTrack),
    /// Fetch failed; the instance renders nothing.
    Failed,
}

struct State<P: Platform> {
    mounted: bool,
    epoch: u64,
    cues: CueState,
    atlases: AtlasCache<P::Image>,
    scheduler: CueScheduler,
    pool: SurfacePool<P::Surface>,
    listeners: ListenerRegistry<P::Listener>,
    lookup: Option<FrameRequest>,
    mirror: MirrorLoop,
    mirror_surface: Option<P::Surface>,
    sink: Option<Box<dyn TraceSink>>,
}

struct Core<P: Platform> {
    platform: P,
    options: AmbientOptions,
    mode: RenderMode,
    state: RefCell<State<P>>,
}

fn tracer(sink: &mut Option<Box<dyn TraceSink>>) -> Tracer<'_> {
    match sink {
        Some(sink) => Tracer::new(&mut **sink),
        None => Tracer::none(),
    }
}

/// One ambient instance bound to one video element.
///
/// Dropping the controller unmounts it.
pub struct AmbientController<P: Platform> {
    core: Rc<Core<P>>,
}

impl<P: Platform> fmt::Debug for AmbientController<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.core.state.borrow();
        f.debug_struct("AmbientController")
            .field("mode", &self.core.mode)
            .field("mounted", &state.mounted)
            .field("epoch", &state.epoch)
            .field("cues", &state.cues)
            .field("pool", &state.pool)
            .field("listeners", &state.listeners)
            .finish_non_exhaustive()
    }
}

impl<P: Platform> AmbientController<P> {
    /// Creates an unmounted instance.
    ///
    /// When `options` names a cue file the fetch starts here, once for the
    /// lifetime of the instance.
    #[must_use]
    pub fn new(platform: P, options: AmbientOptions) -> Self {
        Self::build(platform, options, None)
    }

    /// Like [`new`](Self::new), reporting trace events to `sink`.
    #[must_use]
    pub fn with_trace_sink(platform: P, options: AmbientOptions, sink: Box<dyn TraceSink>) -> Self {
        Self::build(platform, options, Some(sink))
    }

    fn build(platform: P, options: AmbientOptions, sink: Option<Box<dyn TraceSink>>) -> Self {
        let mode = if options.is_cue_driven() {
            RenderMode::CueDriven
        } else {
            RenderMode::LiveMirror
        };
        let state = State {
            mounted: false,
            epoch: 0,
            cues: match mode {
                RenderMode::CueDriven => CueState::Pending,
                RenderMode::LiveMirror => CueState::Absent,
            },
            atlases: AtlasCache::new(),
            scheduler: CueScheduler::new(),
            pool: SurfacePool::new(options.pool_capacity),
            listeners: ListenerRegistry::new(),
            lookup: None,
            mirror: MirrorLoop::new(),
            mirror_surface: None,
            sink,
        };
        let core = Rc::new(Core {
            platform,
            options,
            mode,
            state: RefCell::new(state),
        });
        if let Some(url) = core.options.cue_url.clone() {
            let weak = Rc::downgrade(&core);
            let source = url.clone();
            core.platform.fetch_text(
                &url,
                Box::new(move |result: Result<String, AmbientError>| {
                    if let Some(core) = weak.upgrade() {
                        core.cues_fetched(&source, result);
                    }
                }),
            );
        }
        Self { core }
    }

    /// Creates the surfaces and wires media signals for the configured mode.
    ///
    /// Mounting an already-mounted instance emits [`Warning::AlreadyMounted`]
    /// and changes nothing. If any step fails the partial mount is torn down
    /// before the error is returned.
    pub fn mount(&self) -> Result<(), AmbientError> {
        let core = &self.core;
        let at = core.platform.now();
        {
            let mut guard = core.state.borrow_mut();
            let state = &mut *guard;
            if state.mounted {
                tracer(&mut state.sink).warning(&WarningEvent {
                    at,
                    warning: Warning::AlreadyMounted,
                });
                return Ok(());
            }
            state.mounted = true;
            state.epoch += 1;
        }

        if let Err(error) = core.setup() {
            {
                let mut guard = core.state.borrow_mut();
                tracer(&mut guard.sink).error(&ErrorEvent {
                    at,
                    stage: ErrorStage::Mount,
                    error: &error,
                });
            }
            core.teardown();
            return Err(error);
        }

        let mut guard = core.state.borrow_mut();
        let state = &mut *guard;
        let event = MountEvent {
            at,
            mode: core.mode,
            epoch: state.epoch,
            listeners: state.listeners.len(),
        };
        tracer(&mut state.sink).mount(&event);
        Ok(())
    }

    /// Releases everything the current mount created.
    ///
    /// Calling this on an unmounted instance does nothing.
    pub fn unmount(&self) {
        self.core.teardown();
    }

    /// Returns `true` between a successful [`mount`](Self::mount) and the
    /// next [`unmount`](Self::unmount).
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.core.state.borrow().mounted
    }

    /// Rendering mode selected at construction.
    #[must_use]
    pub fn mode(&self) -> RenderMode {
        self.core.mode
    }

    /// Options the instance was created with.
    #[must_use]
    pub fn options(&self) -> &AmbientOptions {
        &self.core.options
    }

    /// Number of parsed cues; zero until the cue file has loaded.
    #[must_use]
    pub fn cue_count(&self) -> usize {
        match &self.core.state.borrow().cues {
            CueState::Ready(track) => track.len(),
            _ => 0,
        }
    }

    /// Number of surfaces currently attached to the visual parent.
    #[must_use]
    pub fn attached_surfaces(&self) -> usize {
        let state = self.core.state.borrow();
        let mirror = state
            .mirror_surface
            .as_ref()
            .is_some_and(Surface::is_attached);
        state.pool.attached() + usize::from(mirror)
    }

    /// Number of media listeners registered by the current mount.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.core.state.borrow().listeners.len()
    }

    /// Returns `true` while the live-mirror loop is running.
    #[must_use]
    pub fn is_mirroring(&self) -> bool {
        self.core.state.borrow().mirror.is_running()
    }
}

impl<P: Platform> Drop for AmbientController<P> {
    fn drop(&mut self) {
        self.core.teardown();
    }
}

impl<P: Platform> Core<P> {
    // --- mount / unmount -------------------------------------------------

    fn setup(self: &Rc<Self>) -> Result<(), AmbientError> {
        self.platform.enter_mode(self.mode)?;
        let mut surface = self.platform.create_surface(self.platform.display_size())?;
        match self.mode {
            RenderMode::CueDriven => {
                self.state.borrow_mut().pool.insert(surface)?;
                self.listen(MediaSignal::TimeUpdate, Self::request_lookup)?;
                self.listen(MediaSignal::Loaded, Self::request_lookup)?;
                self.listen(MediaSignal::DisplayResize, Self::reset_sprites)?;
                let ready = matches!(self.state.borrow().cues, CueState::Ready(_));
                if ready {
                    self.request_lookup();
                }
            }
            RenderMode::LiveMirror => {
                surface.attach()?;
                self.state.borrow_mut().mirror_surface = Some(surface);
                self.listen(MediaSignal::Loaded, Self::mirror_once)?;
                self.listen(MediaSignal::Seeked, Self::mirror_once)?;
                self.listen(MediaSignal::Play, Self::start_mirror)?;
                self.listen(MediaSignal::Pause, Self::stop_mirror)?;
                self.listen(MediaSignal::Ended, Self::stop_mirror)?;
                if !self.platform.is_paused() {
                    self.start_mirror();
                }
            }
        }
        Ok(())
    }

    fn listen(
        self: &Rc<Self>,
        signal: MediaSignal,
        on_signal: fn(&Rc<Self>),
    ) -> Result<(), AmbientError> {
        let weak = Rc::downgrade(self);
        let epoch = self.state.borrow().epoch;
        let listener = self.platform.listen(
            signal,
            Box::new(move || {
                let Some(core) = weak.upgrade() else {
                    return;
                };
                let current = core.state.borrow().epoch == epoch;
                if current {
                    on_signal(&core);
                }
            }),
        )?;
        self.state.borrow_mut().listeners.record(signal, listener);
        Ok(())
    }

    fn teardown(&self) {
        let at = self.platform.now();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.mounted {
            return;
        }
        state.mounted = false;

        if let Some(request) = state.lookup.take() {
            self.platform.cancel_frame(request);
        }
        let was_mirroring = state.mirror.is_running();
        if let Some(request) = state.mirror.stop() {
            self.platform.cancel_frame(request);
        }
        if was_mirroring {
            tracer(&mut state.sink).mirror_state(&MirrorStateEvent { at, running: false });
        }

        let platform = &self.platform;
        let listeners_removed = state
            .listeners
            .drain(|_, listener| platform.unlisten(listener));
        let mut surfaces_removed = state.pool.clear();
        if let Some(mut surface) = state.mirror_surface.take() {
            if surface.is_attached() {
                surfaces_removed += 1;
            }
            surface.detach();
        }
        platform.leave_mode();
        state.scheduler.reset();
        state.epoch += 1;

        let event = UnmountEvent {
            at,
            mode: self.mode,
            epoch: state.epoch,
            listeners_removed,
            surfaces_removed,
        };
        tracer(&mut state.sink).unmount(&event);
    }

    // --- cue-driven ------------------------------------------------------

    fn cues_fetched(self: &Rc<Self>, url: &str, result: Result<String, AmbientError>) {
        let at = self.platform.now();
        let lookup = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            match result {
                Ok(text) => {
                    let track = parse_cues(&text, url);
                    tracer(&mut state.sink).cues_loaded(&CuesLoadedEvent {
                        at,
                        url,
                        count: track.len(),
                    });
                    state.cues = CueState::Ready(track);
                    state.mounted
                }
                Err(error) => {
                    tracer(&mut state.sink).error(&ErrorEvent {
                        at,
                        stage: ErrorStage::CueFetch,
                        error: &error,
                    });
                    state.cues = CueState::Failed;
                    false
                }
            }
        };
        if lookup {
            self.request_lookup();
        }
    }

    /// Schedules a lookup for the next frame unless one is already pending.
    fn request_lookup(self: &Rc<Self>) {
        let mut state = self.state.borrow_mut();
        if !state.mounted || state.lookup.is_some() {
            return;
        }
        let weak = Rc::downgrade(self);
        let epoch = state.epoch;
        let request = self.platform.request_frame(Box::new(move |_| {
            if let Some(core) = weak.upgrade() {
                core.run_lookup(epoch);
            }
        }));
        state.lookup = Some(request);
    }

    fn reset_sprites(self: &Rc<Self>) {
        {
            let mut state = self.state.borrow_mut();
            state.pool.clear();
            state.scheduler.reset();
        }
        self.request_lookup();
    }

    fn run_lookup(self: &Rc<Self>, epoch: u64) {
        let at = self.platform.now();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.mounted || state.epoch != epoch {
            return;
        }
        state.lookup = None;

        let position = self.platform.current_time();
        let CueState::Ready(track) = &state.cues else {
            tracer(&mut state.sink).warning(&WarningEvent {
                at,
                warning: Warning::CuesUnavailable,
            });
            return;
        };
        let Some((ticket, cue)) = state.scheduler.select(track, position) else {
            return;
        };
        let cue = cue.clone();

        let fresh = state.atlases.peek(&cue.src).is_none();
        let handle = state
            .atlases
            .get(&cue.src, |url, done| self.load_atlas(url, done));
        if fresh && (handle.is_ready() || handle.is_failed()) {
            // The platform completed the load before `get` returned.
            tracer(&mut state.sink).atlas_load(&AtlasLoadEvent {
                at,
                url: &cue.src,
                ready: handle.is_ready(),
            });
        }

        let image = handle.image();
        let deferred = image.is_none() && !handle.is_failed();
        tracer(&mut state.sink).cue_change(&CueChangeEvent {
            at,
            position,
            ticket: ticket.get(),
            start: cue.start,
            end: cue.end,
            src: &cue.src,
            deferred,
        });

        if let Some(image) = image {
            self.paint(state, at, ticket, &cue, &image);
        } else if deferred {
            let weak = Rc::downgrade(self);
            handle.when_ready(Box::new(move |image| {
                if let Some(core) = weak.upgrade() {
                    core.deferred_paint(epoch, ticket, &cue, &image);
                }
            }));
        }
    }

    fn load_atlas(self: &Rc<Self>, url: &str, done: LoadCallback<P::Image>) {
        let weak = Rc::downgrade(self);
        let owned = String::from(url);
        self.platform.load_image(
            url,
            Box::new(move |result: Result<P::Image, AmbientError>| {
                if let Some(core) = weak.upgrade() {
                    core.atlas_settled(&owned, &result);
                }
                done(result);
            }),
        );
    }

    fn atlas_settled(&self, url: &str, result: &Result<P::Image, AmbientError>) {
        // Busy means the load completed inside `run_lookup`, which reports it.
        let Ok(mut guard) = self.state.try_borrow_mut() else {
            return;
        };
        let at = self.platform.now();
        let state = &mut *guard;
        let mut tracer = tracer(&mut state.sink);
        match result {
            Ok(image) => tracer.atlas_load(&AtlasLoadEvent {
                at,
                url,
                ready: has_area(image),
            }),
            Err(error) => {
                tracer.error(&ErrorEvent {
                    at,
                    stage: ErrorStage::AtlasLoad,
                    error,
                });
                tracer.atlas_load(&AtlasLoadEvent {
                    at,
                    url,
                    ready: false,
                });
            }
        }
    }

    fn deferred_paint(&self, epoch: u64, ticket: DrawTicket, cue: &Cue, image: &P::Image) {
        let at = self.platform.now();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.mounted || state.epoch != epoch || !state.scheduler.is_current(ticket) {
            tracer(&mut state.sink).stale_draw(&StaleDrawEvent {
                at,
                ticket: ticket.get(),
                start: cue.start,
                end: cue.end,
            });
            return;
        }
        self.paint(state, at, ticket, cue, image);
    }

    fn paint(&self, state: &mut State<P>, at: f64, ticket: DrawTicket, cue: &Cue, image: &P::Image) {
        let size = self.platform.display_size();
        let platform = &self.platform;
        let result = paint_sprite(&mut state.pool, size, image, cue, |size| {
            platform.create_surface(size)
        });
        match result {
            Ok(evicted) => {
                let event = SpriteDrawEvent {
                    at,
                    ticket: ticket.get(),
                    start: cue.start,
                    end: cue.end,
                    evicted,
                    pooled: state.pool.len(),
                };
                tracer(&mut state.sink).sprite_draw(&event);
            }
            Err(error) => tracer(&mut state.sink).error(&ErrorEvent {
                at,
                stage: ErrorStage::SpriteDraw,
                error: &error,
            }),
        }
    }

    // --- live mirror -----------------------------------------------------

    fn start_mirror(self: &Rc<Self>) {
        let at = self.platform.now();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.mounted {
            return;
        }
        let Some(run) = state.mirror.start() else {
            return;
        };
        tracer(&mut state.sink).mirror_state(&MirrorStateEvent { at, running: true });
        let request = self.schedule_tick(run);
        state.mirror.arm(request);
    }

    fn stop_mirror(self: &Rc<Self>) {
        let at = self.platform.now();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.mirror.is_running() {
            return;
        }
        if let Some(request) = state.mirror.stop() {
            self.platform.cancel_frame(request);
        }
        tracer(&mut state.sink).mirror_state(&MirrorStateEvent { at, running: false });
    }

    fn schedule_tick(self: &Rc<Self>, run: MirrorRun) -> FrameRequest {
        let weak = Rc::downgrade(self);
        self.platform.request_frame(Box::new(move |_| {
            if let Some(core) = weak.upgrade() {
                core.mirror_tick(run);
            }
        }))
    }

    fn mirror_tick(self: &Rc<Self>, run: MirrorRun) {
        let at = self.platform.now();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.mirror.accept(run) {
            return;
        }
        self.draw_mirror(state, at, false);
        let request = self.schedule_tick(run);
        state.mirror.arm(request);
    }

    fn mirror_once(self: &Rc<Self>) {
        let at = self.platform.now();
        let mut guard = self.state.borrow_mut();
        if guard.mounted {
            self.draw_mirror(&mut guard, at, true);
        }
    }

    fn draw_mirror(&self, state: &mut State<P>, at: f64, immediate: bool) {
        let size = self.platform.display_size();
        let Some(surface) = state.mirror_surface.as_mut() else {
            return;
        };
        if surface.size() != size {
            surface.resize(size);
        }
        let result = self.platform.mirror_frame(surface);
        let mut tracer = tracer(&mut state.sink);
        if let Err(error) = &result {
            tracer.error(&ErrorEvent {
                at,
                stage: ErrorStage::MirrorDraw,
                error,
            });
        }
        tracer.mirror_frame(&MirrorFrameEvent {
            at,
            width: size.width,
            height: size.height,
            drawn: result.is_ok(),
            immediate,
        });
    }
}
