// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded pool of overlay surfaces.
//!
//! Cue-driven mode paints every thumbnail onto a fresh surface stacked above
//! the previous one, so CSS can fade the newcomer in while the old one is
//! still visible. [`SurfacePool`] keeps that stack bounded: insertion order is
//! display order (oldest first), and inserting at capacity attaches the new
//! surface first and then detaches the oldest, so a failed attach never
//! leaves the stack emptier than it was.
//!
//! The last evicted surface is kept detached as a spare and handed back by
//! [`acquire`](SurfacePool::acquire), so a steady cross-fade recycles two or
//! three surfaces instead of allocating one per cue.

use alloc::collections::VecDeque;
use core::fmt;

use kurbo::Size;

use crate::backend::Surface;
use crate::error::AmbientError;

/// Ordered, bounded set of attached surfaces.
pub struct SurfacePool<S> {
    active: VecDeque<S>,
    spare: Option<S>,
    capacity: usize,
}

impl<S> fmt::Debug for SurfacePool<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfacePool")
            .field("active", &self.active.len())
            .field("spare", &self.spare.is_some())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl<S: Surface> SurfacePool<S> {
    /// Creates an empty pool holding at most `capacity` surfaces.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            active: VecDeque::with_capacity(capacity),
            spare: None,
            capacity,
        }
    }

    /// Returns a detached surface of the given size.
    ///
    /// Reuses the spare from the last eviction when there is one, otherwise
    /// calls `create`.
    pub fn acquire(
        &mut self,
        size: Size,
        create: impl FnOnce(Size) -> Result<S, AmbientError>,
    ) -> Result<S, AmbientError> {
        match self.spare.take() {
            Some(mut surface) => {
                if surface.size() != size {
                    surface.resize(size);
                }
                Ok(surface)
            }
            None => create(size),
        }
    }

    /// Attaches `surface` as the newest entry.
    ///
    /// `surface` is attached before anything is evicted. When the pool is
    /// then over capacity the oldest surfaces are detached and removed.
    /// Returns how many were evicted. On attach failure the pool is left
    /// untouched and `surface` is dropped.
    pub fn insert(&mut self, mut surface: S) -> Result<usize, AmbientError> {
        surface.attach()?;
        self.active.push_back(surface);
        let mut evicted = 0;
        while self.active.len() > self.capacity {
            let Some(mut oldest) = self.active.pop_front() else {
                break;
            };
            oldest.detach();
            self.spare = Some(oldest);
            evicted += 1;
        }
        Ok(evicted)
    }

    /// Detaches and drops every surface, spare included. Returns how many
    /// were attached.
    pub fn clear(&mut self) -> usize {
        let mut removed = 0;
        for mut surface in self.active.drain(..) {
            if surface.is_attached() {
                removed += 1;
            }
            surface.detach();
        }
        self.spare = None;
        removed
    }

    /// Number of surfaces in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if the pool holds no surfaces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Maximum number of surfaces.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The most recently inserted surface.
    #[must_use]
    pub fn newest(&self) -> Option<&S> {
        self.active.back()
    }

    /// Iterates surfaces oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.active.iter()
    }

    /// Number of pooled surfaces currently attached to the visual parent.
    #[must_use]
    pub fn attached(&self) -> usize {
        self.active.iter().filter(|s| s.is_attached()).count()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;
    use crate::testing::FakeSurface;

    fn ids(pool: &SurfacePool<FakeSurface>) -> Vec<u32> {
        pool.iter().map(FakeSurface::id).collect()
    }

    #[test]
    fn insert_beyond_bound_evicts_oldest_first() {
        let mut pool = SurfacePool::new(2);
        let surfaces: Vec<_> = (0..4).map(FakeSurface::standalone).collect();
        let handles: Vec<_> = surfaces.iter().map(FakeSurface::handle).collect();

        let mut evictions = Vec::new();
        for surface in surfaces {
            evictions.push(pool.insert(surface).unwrap());
            assert!(pool.len() <= 2, "pool exceeded its bound");
        }
        assert_eq!(evictions, [0, 0, 1, 1]);
        assert_eq!(ids(&pool), [2, 3]);
        assert!(!handles[0].is_attached());
        assert!(!handles[1].is_attached());
        assert!(handles[2].is_attached());
        assert!(handles[3].is_attached());
    }

    #[test]
    fn acquire_recycles_the_evicted_surface() {
        let mut pool = SurfacePool::new(1);
        pool.insert(FakeSurface::standalone(0)).unwrap();
        pool.insert(FakeSurface::standalone(1)).unwrap();

        let size = Size::new(640.0, 360.0);
        let recycled = pool
            .acquire(size, |_| panic!("spare should be reused"))
            .unwrap();
        assert_eq!(recycled.id(), 0);
        assert_eq!(recycled.size(), size);
        assert!(!recycled.is_attached());

        let fresh = pool
            .acquire(size, |s| Ok(FakeSurface::standalone_sized(5, s)))
            .unwrap();
        assert_eq!(fresh.id(), 5);
    }

    #[test]
    fn clear_detaches_everything() {
        let mut pool = SurfacePool::new(3);
        let a = FakeSurface::standalone(0);
        let first = a.handle();
        pool.insert(a).unwrap();
        pool.insert(FakeSurface::standalone(1)).unwrap();

        assert_eq!(pool.clear(), 2);
        assert!(pool.is_empty());
        assert!(!first.is_attached());
        assert_eq!(pool.clear(), 0);
    }

    #[test]
    fn failed_attach_keeps_existing_surfaces() {
        let mut pool = SurfacePool::new(2);
        pool.insert(FakeSurface::standalone(0)).unwrap();
        let err = pool.insert(FakeSurface::failing(1)).unwrap_err();
        assert!(matches!(err, AmbientError::Surface(_)));
        assert_eq!(ids(&pool), [0]);
        assert_eq!(pool.attached(), 1);
    }

    #[test]
    fn failed_attach_on_a_full_pool_evicts_nothing() {
        let mut pool = SurfacePool::new(2);
        let oldest = FakeSurface::standalone(0);
        let oldest_handle = oldest.handle();
        pool.insert(oldest).unwrap();
        pool.insert(FakeSurface::standalone(1)).unwrap();

        assert!(pool.insert(FakeSurface::failing(2)).is_err());
        assert_eq!(pool.len(), pool.capacity());
        assert_eq!(ids(&pool), [0, 1]);
        assert!(oldest_handle.is_attached(), "oldest surface must stay visible");
        assert_eq!(pool.attached(), 2);
        let fresh = pool
            .acquire(Size::new(16.0, 9.0), |s| Ok(FakeSurface::standalone_sized(7, s)))
            .unwrap();
        assert_eq!(fresh.id(), 7, "no spare was recycled");
    }

    #[test]
    fn zero_capacity_behaves_as_one() {
        let mut pool = SurfacePool::new(0);
        assert_eq!(pool.capacity(), 1);
        pool.insert(FakeSurface::standalone(0)).unwrap();
        assert_eq!(pool.insert(FakeSurface::standalone(1)).unwrap(), 1);
        assert_eq!(pool.newest().map(FakeSurface::id), Some(1));
    }
}
