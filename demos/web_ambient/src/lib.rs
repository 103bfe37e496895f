// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ambient glow demo.
//!
//! Renders the same video twice: once with a live mirror glow and once with a
//! glow driven by a WebVTT thumbnail track. Each panel has its own
//! mount/unmount toggle so teardown can be checked in the inspector.
//!
//! Build with: `wasm-pack build --target web demos/web_ambient`
//! Then serve `demos/web_ambient/` (with `thumbs.vtt` and its sprite sheets
//! next to `index.html`) and open `index.html`.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::ToString as _;

use ambient_backend_web::{ConsoleSink, WebPlatform};
use ambient_core::{AmbientController, AmbientOptions};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, HtmlButtonElement, HtmlElement, HtmlVideoElement};

const VIDEO_W: u32 = 640;
const VIDEO_H: u32 = 360;
const VIDEO_URL: &str = "https://github.com/vidanov/video/raw/master/test_files/1080p50.mp4";
const THUMBS_URL: &str = "thumbs.vtt";
const BLUR_PX: f64 = 45.0;

const STYLESHEET: &str = "
.cinematics-container { position: relative; }
.cinematics-visible { position: relative; z-index: 1; display: block; }
.cinematics-sprites { position: absolute; inset: 0; }
.cinematics-glow {
  position: absolute; inset: 0; width: 100%; height: 100%;
  transform: scale(1.08); pointer-events: none; z-index: 0;
}
";

struct Panel {
    controller: AmbientController<WebPlatform>,
    video: HtmlVideoElement,
    toggle: HtmlButtonElement,
    status: HtmlElement,
}

impl Panel {
    fn refresh(&self) {
        let mounted = self.controller.is_mounted();
        self.toggle
            .set_text_content(Some(if mounted { "Unmount" } else { "Mount" }));
        let detail = if self.controller.options().is_cue_driven() {
            format!("{} cues", self.controller.cue_count())
        } else if self.controller.is_mirroring() {
            "mirroring".into()
        } else {
            "idle".into()
        };
        let state = if mounted { "mounted" } else { "unmounted" };
        self.status
            .set_text_content(Some(&format!("{state} · {detail}")));
    }
}

/// Entry point for the ambient demo.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no body"))?;

    let sheet = element(&document, "style")?;
    sheet.set_text_content(Some(STYLESHEET));
    body.append_child(&sheet)?;

    let shell = element(&document, "section")?;
    style(
        &shell,
        "display: grid; grid-template-columns: repeat(2, 640px); gap: 48px; padding: 48px; background: #0b0d12; color: #e8ecf4; font: 14px system-ui, sans-serif;",
    )?;
    body.append_child(&shell)?;

    let live = build_panel(&document, &shell, "Live mirror", AmbientOptions::live())?;
    let cues = build_panel(
        &document,
        &shell,
        "Cue-driven sprites",
        AmbientOptions::cue_driven(THUMBS_URL),
    )?;

    for panel in [live, cues] {
        panel.controller.mount().map_err(to_js)?;
        panel.refresh();
        bind_controls(&panel)?;
    }
    Ok(())
}

fn build_panel(
    doc: &Document,
    host: &HtmlElement,
    title: &str,
    options: AmbientOptions,
) -> Result<Rc<Panel>, JsValue> {
    let column = element(doc, "div")?;
    style(&column, "display: grid; gap: 12px;")?;
    host.append_child(&column)?;

    let heading = element(doc, "h2")?;
    heading.set_text_content(Some(title));
    style(&heading, "margin: 0; font-size: 16px; font-weight: 600;")?;
    column.append_child(&heading)?;

    let container = element(doc, "div")?;
    style(
        &container,
        &format!("width: {VIDEO_W}px; height: {VIDEO_H}px;"),
    )?;
    column.append_child(&container)?;

    let video: HtmlVideoElement = doc.create_element("video")?.unchecked_into();
    video.set_src(VIDEO_URL);
    video.set_controls(true);
    video.set_loop(true);
    video.set_muted(true);
    video.set_preload("auto");
    video.set_attribute("playsinline", "")?;
    video.set_attribute("crossorigin", "anonymous")?;
    video.set_width(VIDEO_W);
    video.set_height(VIDEO_H);
    container.append_child(&video)?;

    let row = element(doc, "div")?;
    style(&row, "display: flex; gap: 12px; align-items: center;")?;
    column.append_child(&row)?;

    let toggle: HtmlButtonElement = doc.create_element("button")?.unchecked_into();
    row.append_child(&toggle)?;
    let status = element(doc, "span")?;
    style(&status, "opacity: 0.7;")?;
    row.append_child(&status)?;

    let platform =
        WebPlatform::new(container, BLUR_PX).map_err(to_js)?;
    let controller = AmbientController::with_trace_sink(
        platform,
        options.with_blur(BLUR_PX),
        Box::new(ConsoleSink::verbose()),
    );
    Ok(Rc::new(Panel {
        controller,
        video,
        toggle,
        status,
    }))
}

fn bind_controls(panel: &Rc<Panel>) -> Result<(), JsValue> {
    let toggle_panel = Rc::clone(panel);
    let toggle_cb = Closure::wrap(Box::new(move |_event: Event| {
        let p = &toggle_panel;
        if p.controller.is_mounted() {
            p.controller.unmount();
        } else if let Err(err) = p.controller.mount() {
            web_sys::console::error_1(&to_js(err));
        }
        p.refresh();
    }) as Box<dyn FnMut(_)>);
    panel
        .toggle
        .add_event_listener_with_callback("click", toggle_cb.as_ref().unchecked_ref())?;
    toggle_cb.forget();

    // Keep the status line current as cues arrive and playback changes.
    for event in ["loadedmetadata", "play", "pause", "seeked"] {
        let status_panel = Rc::clone(panel);
        let status_cb = Closure::wrap(Box::new(move |_event: Event| {
            status_panel.refresh();
        }) as Box<dyn FnMut(_)>);
        panel
            .video
            .add_event_listener_with_callback(event, status_cb.as_ref().unchecked_ref())?;
        status_cb.forget();
    }
    Ok(())
}

fn to_js(error: ambient_core::AmbientError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn element(doc: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    Ok(doc.create_element(tag)?.unchecked_into())
}

fn style(el: &web_sys::Element, css: &str) -> Result<(), JsValue> {
    el.set_attribute("style", css)
}
