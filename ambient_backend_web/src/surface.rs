// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<canvas>` surfaces and decoded sprite sheets.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;

use kurbo::Size;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlImageElement};

use ambient_core::backend::{AtlasImage, Surface};
use ambient_core::cue::SpriteRect;
use ambient_core::error::AmbientError;

use crate::describe;

/// CSS class carried by every ambient canvas.
pub const GLOW_CLASS: &str = "cinematics-glow";

/// The element new surfaces attach to, shared between the platform and every
/// surface it created. `None` outside a mount.
pub(crate) type Stage = Rc<RefCell<Option<Element>>>;

/// A decoded sprite sheet.
#[derive(Clone, Debug)]
pub struct SpriteImage(HtmlImageElement);

impl SpriteImage {
    /// Wraps a decoded image element.
    #[must_use]
    pub fn new(image: HtmlImageElement) -> Self {
        Self(image)
    }

    /// The underlying element.
    #[must_use]
    pub fn element(&self) -> &HtmlImageElement {
        &self.0
    }
}

impl AtlasImage for SpriteImage {
    fn natural_size(&self) -> Size {
        Size::new(
            f64::from(self.0.natural_width()),
            f64::from(self.0.natural_height()),
        )
    }
}

/// A blurred overlay canvas.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    stage: Stage,
}

impl core::fmt::Debug for CanvasSurface {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CanvasSurface")
            .field("width", &self.canvas.width())
            .field("height", &self.canvas.height())
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}

impl CanvasSurface {
    /// Creates a detached canvas of the given size.
    ///
    /// `read_back` hints that the context is used for per-frame video copies
    /// (`willReadFrequently`).
    pub(crate) fn create(
        document: &Document,
        stage: &Stage,
        size: Size,
        blur_px: f64,
        read_back: bool,
    ) -> Result<Self, AmbientError> {
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(surface_error)?
            .unchecked_into();
        canvas.set_class_name(GLOW_CLASS);
        canvas
            .style()
            .set_property("filter", &blur_filter(blur_px))
            .map_err(surface_error)?;

        let context = if read_back {
            let options = js_sys::Object::new();
            js_sys::Reflect::set(&options, &"willReadFrequently".into(), &JsValue::TRUE)
                .map_err(surface_error)?;
            canvas.get_context_with_context_options("2d", &options)
        } else {
            canvas.get_context("2d")
        };
        let ctx: CanvasRenderingContext2d = context
            .map_err(surface_error)?
            .ok_or_else(|| AmbientError::Surface(String::from("2d context unavailable")))?
            .dyn_into()
            .map_err(|obj: js_sys::Object| surface_error(obj.into()))?;

        let mut surface = Self {
            canvas,
            ctx,
            stage: Rc::clone(stage),
        };
        surface.resize(size);
        Ok(surface)
    }

    /// The underlying canvas element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub(crate) fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }
}

impl Surface for CanvasSurface {
    type Image = SpriteImage;

    fn size(&self) -> Size {
        Size::new(
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        )
    }

    fn resize(&mut self, size: Size) {
        self.canvas.set_width(canvas_dimension(size.width));
        self.canvas.set_height(canvas_dimension(size.height));
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
    }

    fn draw_region(&mut self, image: &SpriteImage, region: SpriteRect) -> Result<(), AmbientError> {
        let size = self.size();
        self.ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &image.0,
                f64::from(region.x),
                f64::from(region.y),
                f64::from(region.w),
                f64::from(region.h),
                0.0,
                0.0,
                size.width,
                size.height,
            )
            .map_err(|e| AmbientError::Draw(describe(&e)))
    }

    fn attach(&mut self) -> Result<(), AmbientError> {
        let stage = self.stage.borrow();
        let parent = stage
            .as_ref()
            .ok_or_else(|| AmbientError::Surface(String::from("no visual parent")))?;
        parent.append_child(&self.canvas).map_err(surface_error)?;
        Ok(())
    }

    fn detach(&mut self) {
        self.canvas.remove();
    }

    fn is_attached(&self) -> bool {
        self.canvas.parent_node().is_some()
    }
}

fn surface_error(value: JsValue) -> AmbientError {
    AmbientError::Surface(describe(&value))
}

/// CSS `filter` value for a blur radius in pixels.
pub(crate) fn blur_filter(blur_px: f64) -> String {
    format!("blur({blur_px}px)")
}

/// Converts a CSS pixel length to a canvas backing-store dimension.
pub(crate) fn canvas_dimension(length: f64) -> u32 {
    if !length.is_finite() || length <= 0.0 {
        return 0;
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "clamped to the u32 range above"
    )]
    let pixels = length.round().min(f64::from(u32::MAX)) as u32;
    pixels
}
