// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Active-cue selection and sprite painting.
//!
//! [`CueScheduler`] turns a playback position into "draw this cue now" at most
//! once per cue: repeated lookups inside the same `[start, end)` range are
//! suppressed. Each accepted cue gets a fresh [`DrawTicket`]; a draw that had
//! to wait for its atlas image checks [`is_current`](CueScheduler::is_current)
//! before painting, so a slow load for a superseded cue is discarded instead
//! of overwriting a newer thumbnail.

use kurbo::Size;

use crate::backend::Surface;
use crate::cue::{Cue, CueTrack};
use crate::error::AmbientError;
use crate::pool::SurfacePool;

/// Identifies one accepted cue change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawTicket(u64);

impl DrawTicket {
    /// Raw ticket number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Tracks the last rendered cue range and the latest draw ticket.
#[derive(Clone, Debug, Default)]
pub struct CueScheduler {
    last: Option<(f64, f64)>,
    issued: u64,
}

impl CueScheduler {
    /// Creates a scheduler that has rendered nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the cue to draw for `position`.
    ///
    /// Returns `None` when no cue covers the position (state unchanged) or
    /// when the covering cue has the same range as the last one selected.
    /// Otherwise records the cue as last rendered and issues a new ticket.
    pub fn select<'t>(
        &mut self,
        track: &'t CueTrack,
        position: f64,
    ) -> Option<(DrawTicket, &'t Cue)> {
        let cue = track.find(position)?;
        if self.last == Some((cue.start, cue.end)) {
            return None;
        }
        self.last = Some((cue.start, cue.end));
        self.issued += 1;
        Some((DrawTicket(self.issued), cue))
    }

    /// Returns `true` if `ticket` belongs to the most recent selection.
    #[must_use]
    pub fn is_current(&self, ticket: DrawTicket) -> bool {
        self.last.is_some() && ticket.0 == self.issued
    }

    /// Range of the last selected cue.
    #[must_use]
    pub fn last_range(&self) -> Option<(f64, f64)> {
        self.last
    }

    /// Forgets the last cue and invalidates every outstanding ticket.
    pub fn reset(&mut self) {
        self.last = None;
        self.issued += 1;
    }
}

/// Paints `cue` onto a surface from `pool` and inserts it.
///
/// The surface is acquired at `size`, cleared, and receives the cue's atlas
/// region scaled to fill it. An empty region leaves the surface cleared.
/// Returns how many surfaces the insert evicted.
pub fn paint_sprite<S: Surface>(
    pool: &mut SurfacePool<S>,
    size: Size,
    image: &S::Image,
    cue: &Cue,
    create: impl FnOnce(Size) -> Result<S, AmbientError>,
) -> Result<usize, AmbientError> {
    let mut surface = pool.acquire(size, create)?;
    surface.clear();
    if !cue.region.is_empty() {
        surface.draw_region(image, cue.region)?;
    }
    pool.insert(surface)
}
