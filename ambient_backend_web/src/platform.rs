// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`Platform`] implementation over a container element and its `<video>`.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::{Cell, RefCell};

use kurbo::Size;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Document, Event, HtmlElement, HtmlImageElement, HtmlVideoElement, Response};

use ambient_core::backend::{
    FrameCallback, FrameRequest, LoadCallback, MediaSignal, Platform, RenderMode, SignalHandler,
};
use ambient_core::error::AmbientError;

use crate::describe;
use crate::raf::{FrameQueue, performance_now};
use crate::surface::{CanvasSurface, SpriteImage, Stage};

/// Class added to the container while mounted.
pub const CONTAINER_CLASS: &str = "cinematics-container";
/// Class added to the video while mounted.
pub const VIDEO_CLASS: &str = "cinematics-visible";
/// Class added to the container in cue-driven mode.
pub const SPRITE_CLASS: &str = "cinematics-sprite";
/// Class of the element sprite canvases stack inside.
pub const SPRITE_STACK_CLASS: &str = "cinematics-sprites";

/// A media event subscription. Returned by [`Platform::listen`].
pub struct VideoListener {
    signal: MediaSignal,
    closure: Closure<dyn FnMut(Event)>,
}

impl core::fmt::Debug for VideoListener {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VideoListener")
            .field("signal", &self.signal)
            .finish_non_exhaustive()
    }
}

/// Browser host for one ambient instance.
pub struct WebPlatform {
    document: Document,
    container: HtmlElement,
    video: HtmlVideoElement,
    blur_px: f64,
    frames: FrameQueue,
    stage: Stage,
    wrapper: RefCell<Option<HtmlElement>>,
    mode: Cell<Option<RenderMode>>,
}

impl core::fmt::Debug for WebPlatform {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebPlatform")
            .field("container", &self.container.id())
            .field("blur_px", &self.blur_px)
            .field("frames", &self.frames)
            .field("mode", &self.mode.get())
            .finish_non_exhaustive()
    }
}

impl WebPlatform {
    /// Binds to `container` and the first `<video>` inside it.
    pub fn new(container: HtmlElement, blur_px: f64) -> Result<Self, AmbientError> {
        let document = container
            .owner_document()
            .ok_or_else(|| AmbientError::Surface(String::from("container has no document")))?;
        let video: HtmlVideoElement = container
            .query_selector("video")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into().ok())
            .ok_or(AmbientError::MissingVideo)?;
        Ok(Self {
            document,
            container,
            video,
            blur_px,
            frames: FrameQueue::new(),
            stage: Rc::new(RefCell::new(None)),
            wrapper: RefCell::new(None),
            mode: Cell::new(None),
        })
    }

    /// The container element.
    #[must_use]
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// The bound video element.
    #[must_use]
    pub fn video(&self) -> &HtmlVideoElement {
        &self.video
    }

    fn apply_markers(&self, mode: RenderMode) -> Result<(), JsValue> {
        self.container.class_list().add_1(CONTAINER_CLASS)?;
        self.video.class_list().add_1(VIDEO_CLASS)?;
        let parent: HtmlElement = match mode {
            RenderMode::LiveMirror => self.container.clone(),
            RenderMode::CueDriven => {
                self.container.class_list().add_1(SPRITE_CLASS)?;
                let wrapper: HtmlElement = self.document.create_element("div")?.unchecked_into();
                wrapper.set_class_name(SPRITE_STACK_CLASS);
                self.container.append_child(&wrapper)?;
                *self.wrapper.borrow_mut() = Some(wrapper.clone());
                wrapper
            }
        };
        *self.stage.borrow_mut() = Some(parent.into());
        Ok(())
    }
}

/// Resolves the JS `container` argument: an element or an element id.
pub fn resolve_container(target: &JsValue) -> Result<HtmlElement, AmbientError> {
    if target.is_null() || target.is_undefined() || !target.is_truthy() {
        return Err(AmbientError::MissingContainer);
    }
    if let Some(id) = target.as_string() {
        return web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&id))
            .and_then(|el| el.dyn_into().ok())
            .ok_or(AmbientError::ContainerNotFound(id));
    }
    target
        .clone()
        .dyn_into()
        .map_err(|value| AmbientError::ContainerNotFound(describe(&value)))
}

impl Platform for WebPlatform {
    type Image = SpriteImage;
    type Surface = CanvasSurface;
    type Listener = VideoListener;

    fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    fn display_size(&self) -> Size {
        Size::new(
            f64::from(self.video.client_width()),
            f64::from(self.video.client_height()),
        )
    }

    fn is_paused(&self) -> bool {
        self.video.paused()
    }

    fn listen(
        &self,
        signal: MediaSignal,
        mut handler: SignalHandler,
    ) -> Result<VideoListener, AmbientError> {
        let closure = Closure::wrap(Box::new(move |_event: Event| handler()) as Box<dyn FnMut(_)>);
        self.video
            .add_event_listener_with_callback(signal.event_name(), closure.as_ref().unchecked_ref())
            .map_err(|e| AmbientError::Listener(describe(&e)))?;
        Ok(VideoListener { signal, closure })
    }

    fn unlisten(&self, listener: VideoListener) {
        let _ = self.video.remove_event_listener_with_callback(
            listener.signal.event_name(),
            listener.closure.as_ref().unchecked_ref(),
        );
    }

    fn enter_mode(&self, mode: RenderMode) -> Result<(), AmbientError> {
        self.mode.set(Some(mode));
        self.apply_markers(mode)
            .map_err(|e| AmbientError::Surface(describe(&e)))
    }

    fn leave_mode(&self) {
        let _ = self.container.class_list().remove_1(CONTAINER_CLASS);
        let _ = self.container.class_list().remove_1(SPRITE_CLASS);
        let _ = self.video.class_list().remove_1(VIDEO_CLASS);
        if let Some(wrapper) = self.wrapper.borrow_mut().take() {
            wrapper.remove();
        }
        *self.stage.borrow_mut() = None;
        self.mode.set(None);
    }

    fn create_surface(&self, size: Size) -> Result<CanvasSurface, AmbientError> {
        let read_back = self.mode.get() == Some(RenderMode::LiveMirror);
        CanvasSurface::create(&self.document, &self.stage, size, self.blur_px, read_back)
    }

    fn mirror_frame(&self, surface: &mut CanvasSurface) -> Result<(), AmbientError> {
        let canvas = surface.canvas();
        let (width, height) = (f64::from(canvas.width()), f64::from(canvas.height()));
        surface
            .context()
            .draw_image_with_html_video_element_and_dw_and_dh(&self.video, 0.0, 0.0, width, height)
            .map_err(|e| AmbientError::Draw(describe(&e)))
    }

    fn fetch_text(&self, url: &str, done: LoadCallback<String>) {
        let url = String::from(url);
        spawn_local(async move { done(fetch_text(&url).await) });
    }

    fn load_image(&self, url: &str, done: LoadCallback<SpriteImage>) {
        let url = String::from(url);
        spawn_local(async move { done(load_image(&url).await) });
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameRequest {
        self.frames.request(callback)
    }

    fn cancel_frame(&self, request: FrameRequest) {
        self.frames.cancel(request);
    }

    fn now(&self) -> f64 {
        performance_now()
    }
}

async fn fetch_text(url: &str) -> Result<String, AmbientError> {
    let network = |value: JsValue| AmbientError::Network(describe(&value));
    let window =
        web_sys::window().ok_or_else(|| AmbientError::Network(String::from("no window")))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(network)?
        .dyn_into()
        .map_err(network)?;
    if !response.ok() {
        return Err(AmbientError::Fetch {
            url: String::from(url),
            status: response.status(),
        });
    }
    let body = JsFuture::from(response.text().map_err(network)?)
        .await
        .map_err(network)?;
    body.as_string()
        .ok_or_else(|| AmbientError::Network(String::from("response body is not text")))
}

async fn load_image(url: &str) -> Result<SpriteImage, AmbientError> {
    let failed = |_| AmbientError::ImageLoad(String::from(url));
    let image = HtmlImageElement::new().map_err(failed)?;
    image.set_src(url);
    JsFuture::from(image.decode()).await.map_err(failed)?;
    Ok(SpriteImage::new(image))
}
