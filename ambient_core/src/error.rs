// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by the core and its platform backends.

use alloc::string::String;

/// Errors raised while configuring, mounting or feeding an ambient instance.
///
/// Configuration errors are returned from construction and make the instance
/// unusable. Mount errors are returned from
/// [`mount`](crate::AmbientController::mount) after a full teardown. The
/// remaining variants are reported through the trace sink and never reach the
/// caller: the instance degrades to drawing nothing.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AmbientError {
    /// No container argument was supplied.
    #[error("container argument is required")]
    MissingContainer,
    /// The container id did not resolve to an element.
    #[error("container element `{0}` not found")]
    ContainerNotFound(String),
    /// The container does not hold a video element.
    #[error("no video element found inside the container")]
    MissingVideo,
    /// A drawing surface could not be created or attached.
    #[error("surface error: {0}")]
    Surface(String),
    /// A media listener could not be registered.
    #[error("listener error: {0}")]
    Listener(String),
    /// The cue file request completed with a non-success HTTP status.
    #[error("cue file `{url}` returned HTTP status {status}")]
    Fetch {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The cue file request failed before a response arrived.
    #[error("network error: {0}")]
    Network(String),
    /// An atlas image failed to load or decoded to an empty image.
    #[error("failed to load atlas image `{0}`")]
    ImageLoad(String),
    /// A draw call was rejected by the surface.
    #[error("draw error: {0}")]
    Draw(String),
}

impl AmbientError {
    /// Returns `true` for errors that make an instance unusable.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingContainer | Self::ContainerNotFound(_) | Self::MissingVideo
        )
    }
}
