// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic in-memory platform for unit tests.
//!
//! Nothing here completes on its own: frames fire on [`FakePlatform::fire_frames`],
//! fetches and image loads on explicit `complete_*` calls, and media signals on
//! [`FakePlatform::emit`].

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use kurbo::Size;

use crate::backend::{
    AtlasImage, FrameCallback, FrameRequest, LoadCallback, MediaSignal, Platform, RenderMode,
    SignalHandler, Surface,
};
use crate::cue::SpriteRect;
use crate::error::AmbientError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FakeImage {
    pub(crate) id: u32,
    size: Size,
}

impl FakeImage {
    pub(crate) fn new(id: u32, width: u32, height: u32) -> Self {
        Self {
            id,
            size: Size::new(f64::from(width), f64::from(height)),
        }
    }
}

impl AtlasImage for FakeImage {
    fn natural_size(&self) -> Size {
        self.size
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SurfaceOp {
    Resize(Size),
    Clear,
    Region { image: u32, region: SpriteRect },
    Mirror,
    Attach,
    Detach,
}

#[derive(Debug)]
struct SurfaceState {
    id: u32,
    size: Size,
    attached: bool,
    fail_attach: bool,
    ops: Vec<SurfaceOp>,
}

/// Surface whose state is shared with its [`SurfaceHandle`]s.
#[derive(Debug)]
pub(crate) struct FakeSurface {
    state: Rc<RefCell<SurfaceState>>,
}

/// Read-only view of a surface that outlives it being moved or dropped.
#[derive(Clone, Debug)]
pub(crate) struct SurfaceHandle {
    state: Rc<RefCell<SurfaceState>>,
}

impl FakeSurface {
    fn with(id: u32, size: Size, fail_attach: bool) -> Self {
        Self {
            state: Rc::new(RefCell::new(SurfaceState {
                id,
                size,
                attached: false,
                fail_attach,
                ops: Vec::new(),
            })),
        }
    }

    pub(crate) fn standalone(id: u32) -> Self {
        Self::with(id, Size::new(16.0, 9.0), false)
    }

    pub(crate) fn standalone_sized(id: u32, size: Size) -> Self {
        Self::with(id, size, false)
    }

    pub(crate) fn failing(id: u32) -> Self {
        Self::with(id, Size::new(16.0, 9.0), true)
    }

    pub(crate) fn handle(&self) -> SurfaceHandle {
        SurfaceHandle {
            state: Rc::clone(&self.state),
        }
    }

    pub(crate) fn id(&self) -> u32 {
        self.state.borrow().id
    }

    pub(crate) fn ops(&self) -> Vec<SurfaceOp> {
        self.state.borrow().ops.clone()
    }

    fn log(&self, op: SurfaceOp) {
        self.state.borrow_mut().ops.push(op);
    }
}

impl SurfaceHandle {
    pub(crate) fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    pub(crate) fn ops(&self) -> Vec<SurfaceOp> {
        self.state.borrow().ops.clone()
    }
}

impl Surface for FakeSurface {
    type Image = FakeImage;

    fn size(&self) -> Size {
        self.state.borrow().size
    }

    fn resize(&mut self, size: Size) {
        self.state.borrow_mut().size = size;
        self.log(SurfaceOp::Resize(size));
    }

    fn clear(&mut self) {
        self.log(SurfaceOp::Clear);
    }

    fn draw_region(&mut self, image: &FakeImage, region: SpriteRect) -> Result<(), AmbientError> {
        self.log(SurfaceOp::Region {
            image: image.id,
            region,
        });
        Ok(())
    }

    fn attach(&mut self) -> Result<(), AmbientError> {
        let mut state = self.state.borrow_mut();
        if state.fail_attach {
            return Err(AmbientError::Surface(String::from("parent rejected surface")));
        }
        state.attached = true;
        state.ops.push(SurfaceOp::Attach);
        Ok(())
    }

    fn detach(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.attached {
            state.attached = false;
            state.ops.push(SurfaceOp::Detach);
        }
    }

    fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }
}

type SharedHandler = Rc<RefCell<SignalHandler>>;

#[derive(Default)]
struct Inner {
    time: Cell<f64>,
    display: Cell<Size>,
    paused: Cell<bool>,
    clock: Cell<f64>,

    listeners: RefCell<Vec<(u64, MediaSignal, SharedHandler)>>,
    next_listener: Cell<u64>,
    fail_listen: Cell<Option<MediaSignal>>,

    mode: Cell<Option<RenderMode>>,
    fail_enter: Cell<bool>,

    surfaces: RefCell<Vec<SurfaceHandle>>,
    fail_create: Cell<bool>,
    fail_mirror: Cell<bool>,
    mirror_draws: Cell<usize>,

    frames: RefCell<Vec<(FrameRequest, FrameCallback)>>,
    next_frame: Cell<u64>,
    frames_requested: Cell<usize>,

    fetches: RefCell<Vec<(String, LoadCallback<String>)>>,
    images: RefCell<Vec<(String, LoadCallback<FakeImage>)>>,
    image_log: RefCell<Vec<String>>,
    next_image: Cell<u32>,
}

/// Cloneable handle to a scripted host; clones share all state.
#[derive(Clone)]
pub(crate) struct FakePlatform {
    inner: Rc<Inner>,
}

impl core::fmt::Debug for FakePlatform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FakePlatform").finish_non_exhaustive()
    }
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        let inner = Inner::default();
        inner.display.set(Size::new(640.0, 360.0));
        inner.paused.set(true);
        Self {
            inner: Rc::new(inner),
        }
    }

    // --- scripting -------------------------------------------------------

    pub(crate) fn set_time(&self, seconds: f64) {
        self.inner.time.set(seconds);
    }

    pub(crate) fn set_display_size(&self, size: Size) {
        self.inner.display.set(size);
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.inner.paused.set(paused);
    }

    pub(crate) fn fail_listen_on(&self, signal: MediaSignal) {
        self.inner.fail_listen.set(Some(signal));
    }

    pub(crate) fn fail_enter_mode(&self) {
        self.inner.fail_enter.set(true);
    }

    pub(crate) fn fail_create_surface(&self) {
        self.inner.fail_create.set(true);
    }

    pub(crate) fn fail_mirror(&self, fail: bool) {
        self.inner.fail_mirror.set(fail);
    }

    /// Delivers `signal` to every subscribed handler.
    pub(crate) fn emit(&self, signal: MediaSignal) {
        let handlers: Vec<SharedHandler> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|(_, s, _)| *s == signal)
            .map(|(_, _, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            (&mut *handler.borrow_mut())();
        }
    }

    /// Runs every queued frame callback. Callbacks queued while running wait
    /// for the next call. Returns how many ran.
    pub(crate) fn fire_frames(&self) -> usize {
        let clock = self.inner.clock.get() + 16.0;
        self.inner.clock.set(clock);
        let cutoff = FrameRequest(self.inner.next_frame.get());
        let mut count = 0;
        loop {
            // One at a time, so a callback may cancel a later one in this batch.
            let next = {
                let mut frames = self.inner.frames.borrow_mut();
                match frames.iter().position(|(r, _)| *r <= cutoff) {
                    Some(index) => frames.remove(index).1,
                    None => break,
                }
            };
            next(clock);
            count += 1;
        }
        count
    }

    pub(crate) fn complete_fetch(&self, result: Result<String, AmbientError>) {
        let pending = self.inner.fetches.borrow_mut().pop();
        if let Some((_, done)) = pending {
            done(result);
        }
    }

    /// Completes the pending load for `url` with a `width`×`height` image.
    /// Returns the image id.
    pub(crate) fn complete_image(&self, url: &str, width: u32, height: u32) -> u32 {
        let id = self.inner.next_image.get() + 1;
        self.inner.next_image.set(id);
        if let Some(done) = self.take_image(url) {
            done(Ok(FakeImage::new(id, width, height)));
        }
        id
    }

    pub(crate) fn fail_image(&self, url: &str) {
        if let Some(done) = self.take_image(url) {
            done(Err(AmbientError::ImageLoad(String::from(url))));
        }
    }

    fn take_image(&self, url: &str) -> Option<LoadCallback<FakeImage>> {
        let mut images = self.inner.images.borrow_mut();
        let index = images.iter().position(|(u, _)| u == url)?;
        Some(images.remove(index).1)
    }

    // --- inspection ------------------------------------------------------

    pub(crate) fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    pub(crate) fn pending_frames(&self) -> usize {
        self.inner.frames.borrow().len()
    }

    pub(crate) fn frames_requested(&self) -> usize {
        self.inner.frames_requested.get()
    }

    pub(crate) fn pending_fetches(&self) -> Vec<String> {
        self.inner
            .fetches
            .borrow()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub(crate) fn image_requests(&self) -> Vec<String> {
        self.inner.image_log.borrow().clone()
    }

    pub(crate) fn mode(&self) -> Option<RenderMode> {
        self.inner.mode.get()
    }

    pub(crate) fn surfaces(&self) -> Vec<SurfaceHandle> {
        self.inner.surfaces.borrow().clone()
    }

    pub(crate) fn attached_surfaces(&self) -> usize {
        self.inner
            .surfaces
            .borrow()
            .iter()
            .filter(|p| p.is_attached())
            .count()
    }

    pub(crate) fn mirror_draws(&self) -> usize {
        self.inner.mirror_draws.get()
    }

    /// Every region painted onto any surface, in creation order.
    pub(crate) fn region_draws(&self) -> Vec<(u32, SpriteRect)> {
        let mut draws = Vec::new();
        for surface in self.inner.surfaces.borrow().iter() {
            for op in surface.ops() {
                if let SurfaceOp::Region { image, region } = op {
                    draws.push((image, region));
                }
            }
        }
        draws
    }
}

impl Platform for FakePlatform {
    type Image = FakeImage;
    type Surface = FakeSurface;
    type Listener = u64;

    fn current_time(&self) -> f64 {
        self.inner.time.get()
    }

    fn display_size(&self) -> Size {
        self.inner.display.get()
    }

    fn is_paused(&self) -> bool {
        self.inner.paused.get()
    }

    fn listen(&self, signal: MediaSignal, handler: SignalHandler) -> Result<u64, AmbientError> {
        if self.inner.fail_listen.get() == Some(signal) {
            return Err(AmbientError::Listener(String::from(signal.event_name())));
        }
        let id = self.inner.next_listener.get() + 1;
        self.inner.next_listener.set(id);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, signal, Rc::new(RefCell::new(handler))));
        Ok(id)
    }

    fn unlisten(&self, listener: u64) {
        self.inner
            .listeners
            .borrow_mut()
            .retain(|(id, _, _)| *id != listener);
    }

    fn enter_mode(&self, mode: RenderMode) -> Result<(), AmbientError> {
        self.inner.mode.set(Some(mode));
        if self.inner.fail_enter.get() {
            return Err(AmbientError::Surface(String::from("wrapper")));
        }
        Ok(())
    }

    fn leave_mode(&self) {
        self.inner.mode.set(None);
    }

    fn create_surface(&self, size: Size) -> Result<FakeSurface, AmbientError> {
        if self.inner.fail_create.get() {
            return Err(AmbientError::Surface(String::from("no 2d context")));
        }
        let mut surfaces = self.inner.surfaces.borrow_mut();
        let id = u32::try_from(surfaces.len()).unwrap_or(u32::MAX);
        let surface = FakeSurface::standalone_sized(id, size);
        surfaces.push(surface.handle());
        Ok(surface)
    }

    fn mirror_frame(&self, surface: &mut FakeSurface) -> Result<(), AmbientError> {
        if self.inner.fail_mirror.get() {
            return Err(AmbientError::Draw(String::from("frame not decodable")));
        }
        self.inner.mirror_draws.set(self.inner.mirror_draws.get() + 1);
        surface.log(SurfaceOp::Mirror);
        Ok(())
    }

    fn fetch_text(&self, url: &str, done: LoadCallback<String>) {
        self.inner
            .fetches
            .borrow_mut()
            .push((String::from(url), done));
    }

    fn load_image(&self, url: &str, done: LoadCallback<FakeImage>) {
        self.inner.image_log.borrow_mut().push(String::from(url));
        self.inner
            .images
            .borrow_mut()
            .push((String::from(url), done));
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameRequest {
        let id = self.inner.next_frame.get() + 1;
        self.inner.next_frame.set(id);
        self.inner
            .frames_requested
            .set(self.inner.frames_requested.get() + 1);
        let request = FrameRequest(id);
        self.inner.frames.borrow_mut().push((request, callback));
        request
    }

    fn cancel_frame(&self, request: FrameRequest) {
        self.inner
            .frames
            .borrow_mut()
            .retain(|(r, _)| *r != request);
    }

    fn now(&self) -> f64 {
        self.inner.clock.get()
    }
}
