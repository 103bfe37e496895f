// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `Ambient` class exported to JavaScript.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::string::ToString as _;

use wasm_bindgen::prelude::*;

use ambient_core::{AmbientController, AmbientError, AmbientOptions};

use crate::console::ConsoleSink;
use crate::platform::{WebPlatform, resolve_container};

/// Ambient glow for one video element.
///
/// ```js
/// const ambient = new Ambient("player", { blur: 45, vtt: "/thumbs.vtt" });
/// ambient.mount();
/// // ...
/// ambient.unmount();
/// ambient.free();
/// ```
#[wasm_bindgen]
pub struct Ambient {
    controller: AmbientController<WebPlatform>,
}

impl core::fmt::Debug for Ambient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ambient")
            .field("controller", &self.controller)
            .finish()
    }
}

#[wasm_bindgen]
impl Ambient {
    /// Binds to `container` (an element or an element id) and the `<video>`
    /// inside it.
    ///
    /// `options.blur` is the blur radius in pixels (default 45). `options.vtt`
    /// selects cue-driven mode and starts fetching the thumbnail track.
    #[wasm_bindgen(constructor)]
    pub fn new(container: JsValue, options: JsValue) -> Result<Self, JsValue> {
        let container = resolve_container(&container).map_err(to_js)?;
        let options = read_options(&options)?;
        let platform = WebPlatform::new(container, options.blur_px).map_err(to_js)?;
        let controller =
            AmbientController::with_trace_sink(platform, options, Box::new(ConsoleSink::new()));
        Ok(Self { controller })
    }

    /// Creates the ambient canvas and starts rendering.
    pub fn mount(&self) -> Result<(), JsValue> {
        self.controller.mount().map_err(to_js)
    }

    /// Removes every canvas and listener created by [`mount`](Self::mount).
    pub fn unmount(&self) {
        self.controller.unmount();
    }

    /// `true` while mounted.
    #[wasm_bindgen(getter)]
    pub fn mounted(&self) -> bool {
        self.controller.is_mounted()
    }

    /// Number of thumbnail cues loaded so far.
    #[wasm_bindgen(getter, js_name = cueCount)]
    pub fn cue_count(&self) -> usize {
        self.controller.cue_count()
    }
}

/// Reads `{ blur, vtt }` from a JS options object. Anything that is not an
/// object, and any missing or mistyped field, keeps the defaults.
fn read_options(value: &JsValue) -> Result<AmbientOptions, JsValue> {
    if !value.is_object() {
        return Ok(options_from(None, None));
    }
    let vtt = js_sys::Reflect::get(value, &JsValue::from_str("vtt"))?;
    let blur = js_sys::Reflect::get(value, &JsValue::from_str("blur"))?;
    Ok(options_from(vtt.as_string(), blur.as_f64()))
}

fn options_from(vtt: Option<String>, blur: Option<f64>) -> AmbientOptions {
    let mut options = match vtt {
        Some(url) if !url.is_empty() => AmbientOptions::cue_driven(url),
        _ => AmbientOptions::default(),
    };
    if let Some(blur_px) = blur.filter(|b| b.is_finite()) {
        options = options.with_blur(blur_px);
    }
    options
}

fn to_js(error: AmbientError) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_object_options_fall_back_to_defaults() {
        let options = options_from(None, None);
        assert_eq!(options, AmbientOptions::default());
        assert!(!options.is_cue_driven(), "no track without an object");
    }

    #[test]
    fn fields_are_applied_when_well_typed() {
        let options = options_from(Some(String::from("/thumbs.vtt")), Some(20.0));
        assert_eq!(options.cue_url.as_deref(), Some("/thumbs.vtt"));
        assert_eq!(options.blur_px, 20.0);
    }

    #[test]
    fn empty_track_and_non_finite_blur_are_ignored() {
        let options = options_from(Some(String::new()), Some(f64::NAN));
        assert_eq!(options, AmbientOptions::default());
    }
}
