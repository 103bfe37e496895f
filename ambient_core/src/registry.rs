// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Record of media listeners registered by one mount.
//!
//! Every subscription made during mount goes through a [`ListenerRegistry`]
//! owned by the controller, and unmount drains it. Nothing about the
//! subscription is stored on the media element itself.

use alloc::vec::Vec;
use core::fmt;

use crate::backend::MediaSignal;

/// Owned list of `(signal, listener)` pairs.
pub struct ListenerRegistry<L> {
    entries: Vec<(MediaSignal, L)>,
}

impl<L> fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(signal, _)| signal))
            .finish()
    }
}

impl<L> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<L> ListenerRegistry<L> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a listener registered for `signal`.
    pub fn record(&mut self, signal: MediaSignal, listener: L) {
        self.entries.push((signal, listener));
    }

    /// Removes every entry, newest first, handing each to `unlisten`.
    /// Returns how many were removed.
    pub fn drain(&mut self, mut unlisten: impl FnMut(MediaSignal, L)) -> usize {
        let count = self.entries.len();
        while let Some((signal, listener)) = self.entries.pop() {
            unlisten(signal, listener);
        }
        count
    }

    /// Number of live listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if a listener for `signal` is registered.
    #[must_use]
    pub fn contains(&self, signal: MediaSignal) -> bool {
        self.entries.iter().any(|(s, _)| *s == signal)
    }
}
