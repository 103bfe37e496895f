// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for ambient.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`WebPlatform`]: the [`Platform`] implementation over a container element
//!   and its `<video>`
//! - [`FrameQueue`]: `requestAnimationFrame` callback multiplexing
//! - [`CanvasSurface`] / [`SpriteImage`]: blurred `<canvas>` overlays and
//!   decoded sprite sheets
//! - [`ConsoleSink`]: trace reporting to the browser console
//! - [`Ambient`]: the class exported to JavaScript
//!
//! # CSS hooks
//!
//! | Element | Class |
//! |---|---|
//! | every canvas | `cinematics-glow` |
//! | container (mounted) | `cinematics-container` |
//! | video (mounted) | `cinematics-visible` |
//! | container (cue-driven) | `cinematics-sprite` |
//! | sprite stack (cue-driven) | `cinematics-sprites` |

#![no_std]

extern crate alloc;

mod ambient;
mod console;
mod platform;
mod raf;
mod surface;

pub use ambient::Ambient;
pub use console::ConsoleSink;
pub use platform::{
    CONTAINER_CLASS, SPRITE_CLASS, SPRITE_STACK_CLASS, VIDEO_CLASS, VideoListener, WebPlatform,
    resolve_container,
};
pub use raf::FrameQueue;
pub use surface::{CanvasSurface, GLOW_CLASS, SpriteImage};

pub use ambient_core::backend::Platform;

use alloc::format;
use alloc::string::String;

use wasm_bindgen::{JsCast as _, JsValue};

/// Returns the current host time in milliseconds from `performance.now()`.
#[must_use]
pub fn now() -> f64 {
    raf::performance_now()
}

/// Renders a thrown JS value as a message.
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{value:?}")
}
