// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Run-state for the live-mirror loop.
//!
//! The loop itself is a chain of one-shot frame requests: each accepted tick
//! draws and asks for the next one. [`MirrorLoop`] owns the bookkeeping that
//! makes stopping airtight. Every start hands out a fresh [`MirrorRun`]; a stop
//! retires it and returns the pending request for cancellation. A callback
//! that still fires for a retired run is rejected by
//! [`accept`](MirrorLoop::accept), so no draw can slip in after a logical stop.

use crate::backend::FrameRequest;

/// Token identifying one `start` → `stop` span of the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MirrorRun(u64);

/// Idle/running state machine for the live mirror.
#[derive(Clone, Debug, Default)]
pub struct MirrorLoop {
    running: bool,
    run: u64,
    pending: Option<FrameRequest>,
    frames: u64,
}

impl MirrorLoop {
    /// Creates an idle loop.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transitions to running.
    ///
    /// Returns the new run token, or `None` if the loop was already running.
    /// The caller schedules the first tick and records it with
    /// [`arm`](Self::arm).
    pub fn start(&mut self) -> Option<MirrorRun> {
        if self.running {
            return None;
        }
        self.running = true;
        self.run += 1;
        Some(MirrorRun(self.run))
    }

    /// Transitions to idle and retires the current run.
    ///
    /// Returns the pending frame request, which the caller must cancel.
    pub fn stop(&mut self) -> Option<FrameRequest> {
        if !self.running {
            return None;
        }
        self.running = false;
        self.run += 1;
        self.pending.take()
    }

    /// Records the frame request scheduled for the next tick.
    pub fn arm(&mut self, request: FrameRequest) {
        self.pending = Some(request);
    }

    /// Returns `true` if a tick scheduled under `run` should draw.
    ///
    /// Accepting clears the pending request and counts the frame.
    pub fn accept(&mut self, run: MirrorRun) -> bool {
        if !self.running || run.0 != self.run {
            return false;
        }
        self.pending = None;
        self.frames += 1;
        true
    }

    /// Returns `true` while running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of ticks accepted since creation.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_idempotent_while_running() {
        let mut mirror = MirrorLoop::new();
        assert!(mirror.start().is_some());
        assert!(mirror.start().is_none());
        assert!(mirror.is_running());
    }

    #[test]
    fn stop_returns_pending_request_for_cancellation() {
        let mut mirror = MirrorLoop::new();
        let run = mirror.start().unwrap();
        mirror.arm(FrameRequest(4));
        assert_eq!(mirror.stop(), Some(FrameRequest(4)));
        assert!(!mirror.accept(run));
        assert_eq!(mirror.stop(), None);
    }

    #[test]
    fn ticks_from_a_retired_run_are_rejected_after_restart() {
        let mut mirror = MirrorLoop::new();
        let old = mirror.start().unwrap();
        mirror.stop();
        let new = mirror.start().unwrap();

        assert!(!mirror.accept(old));
        assert!(mirror.accept(new));
        assert_eq!(mirror.frames(), 1);
    }

    #[test]
    fn accept_clears_pending() {
        let mut mirror = MirrorLoop::new();
        let run = mirror.start().unwrap();
        mirror.arm(FrameRequest(1));
        assert!(mirror.accept(run));
        assert_eq!(mirror.stop(), None);
    }
}
