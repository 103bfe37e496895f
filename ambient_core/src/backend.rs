// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator contract for host integrations.
//!
//! The core never touches a DOM, a network stack or an image decoder. A
//! backend crate implements [`Platform`] and provides:
//!
//! - **Media**: playback position, display size, paused state and
//!   subscription to [`MediaSignal`]s.
//! - **Layout**: visual markers and the sprite wrapper, toggled by
//!   [`enter_mode`](Platform::enter_mode) / [`leave_mode`](Platform::leave_mode).
//! - **Surfaces**: creation of [`Surface`]s and copying the current video
//!   frame onto one.
//! - **Async work**: text fetch, image decode and display-refresh frame
//!   requests, each reporting back through a boxed callback.
//!
//! # Callback contract
//!
//! [`listen`](Platform::listen), [`fetch_text`](Platform::fetch_text) and
//! [`request_frame`](Platform::request_frame) must never invoke their callback
//! before returning. The controller holds its state borrowed while it calls
//! into the platform, and every callback re-borrows that state.
//!
//! [`load_image`](Platform::load_image) is the one exception: it may complete
//! synchronously (for example from a decoder cache), because the atlas cache
//! registers no waiters until the call has returned.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use kurbo::Size;

use crate::cue::SpriteRect;
use crate::error::AmbientError;

/// Media playback signals the controller subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MediaSignal {
    /// The first frame is decodable (`loadeddata`).
    Loaded,
    /// A seek finished.
    Seeked,
    /// Playback started or resumed.
    Play,
    /// Playback paused.
    Pause,
    /// Playback reached the end.
    Ended,
    /// Periodic playback-position update.
    TimeUpdate,
    /// The element's intrinsic or display size changed.
    DisplayResize,
}

impl MediaSignal {
    /// Every signal, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Loaded,
        Self::Seeked,
        Self::Play,
        Self::Pause,
        Self::Ended,
        Self::TimeUpdate,
        Self::DisplayResize,
    ];

    /// Returns the DOM event name for this signal.
    #[must_use]
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Loaded => "loadeddata",
            Self::Seeked => "seeked",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Ended => "ended",
            Self::TimeUpdate => "timeupdate",
            Self::DisplayResize => "resize",
        }
    }
}

/// Which rendering mode a mounted instance runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Every display refresh copies the live video frame.
    LiveMirror,
    /// Sprite thumbnails selected by cue timings.
    CueDriven,
}

/// Handle for a pending display-refresh callback.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FrameRequest(pub u64);

impl fmt::Debug for FrameRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameRequest({})", self.0)
    }
}

/// Handler invoked each time a subscribed [`MediaSignal`] fires.
pub type SignalHandler = Box<dyn FnMut()>;

/// One-shot display-refresh callback. Receives the refresh timestamp in
/// milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// One-shot completion callback for asynchronous loads.
pub type LoadCallback<T> = Box<dyn FnOnce(Result<T, AmbientError>)>;

/// A decoded atlas image.
pub trait AtlasImage: Clone + 'static {
    /// Intrinsic pixel size of the decoded image.
    fn natural_size(&self) -> Size;
}

/// An overlay drawing surface (a `<canvas>` on the web).
///
/// Surfaces are created detached. [`attach`](Self::attach) places the surface
/// in the platform's current visual parent.
pub trait Surface {
    /// Image type this surface can copy regions from.
    type Image: AtlasImage;

    /// Current backing-store size.
    fn size(&self) -> Size;

    /// Sets the backing-store size. Resizing also clears the surface.
    fn resize(&mut self, size: Size);

    /// Clears the whole surface to transparent.
    fn clear(&mut self);

    /// Copies `region` of `image` scaled to fill the whole surface.
    fn draw_region(&mut self, image: &Self::Image, region: SpriteRect) -> Result<(), AmbientError>;

    /// Inserts the surface into the visual parent, on top of its siblings.
    fn attach(&mut self) -> Result<(), AmbientError>;

    /// Removes the surface from its visual parent. No-op when detached.
    fn detach(&mut self);

    /// Returns `true` while the surface is in the visual parent.
    fn is_attached(&self) -> bool;
}

/// Host services consumed by [`AmbientController`](crate::AmbientController).
///
/// See the [module docs](self) for the callback contract.
pub trait Platform: 'static {
    /// Decoded atlas image.
    type Image: AtlasImage;
    /// Overlay surface.
    type Surface: Surface<Image = Self::Image>;
    /// Token returned by [`listen`](Self::listen), consumed by
    /// [`unlisten`](Self::unlisten).
    type Listener;

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Current on-screen size of the video element.
    fn display_size(&self) -> Size;

    /// Returns `true` while playback is paused.
    fn is_paused(&self) -> bool;

    /// Subscribes `handler` to `signal`.
    fn listen(
        &self,
        signal: MediaSignal,
        handler: SignalHandler,
    ) -> Result<Self::Listener, AmbientError>;

    /// Removes a subscription created by [`listen`](Self::listen).
    fn unlisten(&self, listener: Self::Listener);

    /// Applies visual markers for `mode` and, for cue-driven mode, builds the
    /// wrapper that new surfaces attach to.
    fn enter_mode(&self, mode: RenderMode) -> Result<(), AmbientError>;

    /// Reverses [`enter_mode`](Self::enter_mode). Must be safe to call after a
    /// partial or failed `enter_mode`, and more than once.
    fn leave_mode(&self);

    /// Creates a detached surface with the given backing-store size.
    fn create_surface(&self, size: Size) -> Result<Self::Surface, AmbientError>;

    /// Copies the current video frame onto the whole of `surface`.
    fn mirror_frame(&self, surface: &mut Self::Surface) -> Result<(), AmbientError>;

    /// Fetches `url` as text.
    fn fetch_text(&self, url: &str, done: LoadCallback<String>);

    /// Loads and decodes the image at `url`.
    fn load_image(&self, url: &str, done: LoadCallback<Self::Image>);

    /// Schedules `callback` for the next display refresh.
    fn request_frame(&self, callback: FrameCallback) -> FrameRequest;

    /// Cancels a pending frame request. After this returns the callback will
    /// not run. Unknown or already-fired requests are ignored.
    fn cancel_frame(&self, request: FrameRequest);

    /// Monotonic host time in milliseconds, used to stamp trace events.
    fn now(&self) -> f64;
}
