// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instance configuration.

use alloc::string::String;

/// Configuration for an [`AmbientController`](crate::AmbientController).
///
/// The presence of [`cue_url`](Self::cue_url) selects the rendering mode:
/// with a URL the instance runs cue-driven, without one it mirrors the live
/// video frame.
#[derive(Clone, Debug, PartialEq)]
pub struct AmbientOptions {
    /// Blur radius in CSS pixels applied to every ambient surface.
    pub blur_px: f64,
    /// Location of a WebVTT thumbnail track.
    pub cue_url: Option<String>,
    /// Maximum number of surfaces alive at once in cue-driven mode.
    ///
    /// Two gives one incoming and one outgoing surface for a cross-fade.
    pub pool_capacity: usize,
}

impl AmbientOptions {
    /// Default blur radius in pixels.
    pub const DEFAULT_BLUR_PX: f64 = 45.0;
    /// Default surface pool bound (the cross-fade pair).
    pub const DEFAULT_POOL_CAPACITY: usize = 2;

    /// Options for live-mirror mode with default blur.
    #[must_use]
    pub const fn live() -> Self {
        Self {
            blur_px: Self::DEFAULT_BLUR_PX,
            cue_url: None,
            pool_capacity: Self::DEFAULT_POOL_CAPACITY,
        }
    }

    /// Options for cue-driven mode reading the track at `url`.
    #[must_use]
    pub fn cue_driven(url: impl Into<String>) -> Self {
        Self {
            cue_url: Some(url.into()),
            ..Self::live()
        }
    }

    /// Sets the blur radius.
    #[must_use]
    pub fn with_blur(mut self, blur_px: f64) -> Self {
        self.blur_px = blur_px;
        self
    }

    /// Sets the surface pool bound. Values below one are raised to one.
    #[must_use]
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity.max(1);
        self
    }

    /// Returns `true` when a cue track is configured.
    #[must_use]
    pub fn is_cue_driven(&self) -> bool {
        self.cue_url.is_some()
    }
}

impl Default for AmbientOptions {
    fn default() -> Self {
        Self::live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_live_mirror() {
        let opts = AmbientOptions::default();
        assert_eq!(opts.blur_px, 45.0);
        assert_eq!(opts.cue_url, None);
        assert_eq!(opts.pool_capacity, 2);
        assert!(!opts.is_cue_driven());
    }

    #[test]
    fn pool_capacity_never_drops_to_zero() {
        let opts = AmbientOptions::cue_driven("list.vtt").with_pool_capacity(0);
        assert_eq!(opts.pool_capacity, 1);
        assert!(opts.is_cue_driven());
    }
}
