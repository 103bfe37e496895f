// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sprite atlas image cache.
//!
//! [`AtlasCache`] maps a resolved image URL to an [`AtlasHandle`]. The first
//! request for a URL stores the handle *before* starting the load, so every
//! later request (including ones made while the load is still in flight)
//! shares the same handle and no URL is ever loaded twice.
//!
//! A handle is tri-state: loading, ready or failed. Failure is permanent.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::backend::{AtlasImage, LoadCallback};
use crate::error::AmbientError;

/// One-shot notification receiving the decoded image.
pub type ReadyCallback<I> = Box<dyn FnOnce(I)>;

/// Load state of an atlas image.
#[derive(Clone, Debug)]
pub enum AtlasState<I> {
    /// The load is in flight.
    Loading,
    /// The image decoded with a non-empty size.
    Ready(I),
    /// The load failed or produced an empty image.
    Failed,
}

struct Slot<I> {
    state: AtlasState<I>,
    waiters: Vec<ReadyCallback<I>>,
}

/// Shared handle to one cached atlas image.
///
/// Cloning is cheap; all clones observe the same state.
pub struct AtlasHandle<I> {
    url: Rc<str>,
    slot: Rc<RefCell<Slot<I>>>,
}

impl<I> Clone for AtlasHandle<I> {
    fn clone(&self) -> Self {
        Self {
            url: Rc::clone(&self.url),
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<I> fmt::Debug for AtlasHandle<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.borrow();
        let state = match slot.state {
            AtlasState::Loading => "loading",
            AtlasState::Ready(_) => "ready",
            AtlasState::Failed => "failed",
        };
        f.debug_struct("AtlasHandle")
            .field("url", &self.url)
            .field("state", &state)
            .field("waiters", &slot.waiters.len())
            .finish()
    }
}

impl<I: AtlasImage> AtlasHandle<I> {
    fn loading(url: &str) -> Self {
        Self {
            url: Rc::from(url),
            slot: Rc::new(RefCell::new(Slot {
                state: AtlasState::Loading,
                waiters: Vec::new(),
            })),
        }
    }

    /// The resolved image URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns `true` once the image has decoded with a positive size.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.slot.borrow().state, AtlasState::Ready(_))
    }

    /// Returns `true` if the load failed. Failed handles never become ready.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.slot.borrow().state, AtlasState::Failed)
    }

    /// Returns the decoded image, if ready.
    #[must_use]
    pub fn image(&self) -> Option<I> {
        match &self.slot.borrow().state {
            AtlasState::Ready(image) => Some(image.clone()),
            _ => None,
        }
    }

    /// Registers a one-shot notification for when the image becomes ready.
    ///
    /// Runs immediately if the image is already ready; dropped without running
    /// if the load has failed or fails later.
    pub fn when_ready(&self, callback: ReadyCallback<I>) {
        let ready = {
            let mut guard = self.slot.borrow_mut();
            let slot = &mut *guard;
            match &slot.state {
                AtlasState::Ready(image) => Some(image.clone()),
                AtlasState::Loading => {
                    slot.waiters.push(callback);
                    return;
                }
                AtlasState::Failed => None,
            }
        };
        if let Some(image) = ready {
            callback(image);
        }
    }

    /// Resolves a loading handle. Later completions are ignored.
    fn complete(&self, result: Result<I, AmbientError>) {
        let (image, waiters) = {
            let mut slot = self.slot.borrow_mut();
            if !matches!(slot.state, AtlasState::Loading) {
                return;
            }
            match result {
                Ok(image) if has_area(&image) => {
                    slot.state = AtlasState::Ready(image.clone());
                    (image, core::mem::take(&mut slot.waiters))
                }
                _ => {
                    slot.state = AtlasState::Failed;
                    slot.waiters.clear();
                    return;
                }
            }
        };
        // Waiters run with the slot unborrowed so they may query this handle.
        for waiter in waiters {
            waiter(image.clone());
        }
    }
}

pub(crate) fn has_area(image: &impl AtlasImage) -> bool {
    let size = image.natural_size();
    size.width > 0.0 && size.height > 0.0
}

/// URL-keyed cache of atlas handles.
pub struct AtlasCache<I> {
    entries: BTreeMap<String, AtlasHandle<I>>,
}

impl<I> fmt::Debug for AtlasCache<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtlasCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<I> Default for AtlasCache<I> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<I: AtlasImage> AtlasCache<I> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `url`, starting a load on first request.
    ///
    /// `start_load` is called at most once per URL, after the handle has been
    /// stored. It receives the URL and the callback that resolves the handle.
    pub fn get(
        &mut self,
        url: &str,
        start_load: impl FnOnce(&str, LoadCallback<I>),
    ) -> AtlasHandle<I> {
        if let Some(handle) = self.entries.get(url) {
            return handle.clone();
        }
        let handle = AtlasHandle::loading(url);
        self.entries.insert(String::from(url), handle.clone());
        let pending = handle.clone();
        start_load(url, Box::new(move |result| pending.complete(result)));
        handle
    }

    /// Returns the handle for `url` without starting a load.
    #[must_use]
    pub fn peek(&self, url: &str) -> Option<&AtlasHandle<I>> {
        self.entries.get(url)
    }

    /// Number of distinct URLs requested so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::testing::FakeImage;

    type Pending = Rc<RefCell<Vec<(String, LoadCallback<FakeImage>)>>>;

    fn deferred(pending: &Pending) -> impl FnOnce(&str, LoadCallback<FakeImage>) + '_ {
        move |url, done| pending.borrow_mut().push((String::from(url), done))
    }

    #[test]
    fn concurrent_requests_share_one_load() {
        let mut cache: AtlasCache<FakeImage> = AtlasCache::new();
        let pending: Pending = Rc::default();

        let a = cache.get("a.jpg", deferred(&pending));
        let b = cache.get("a.jpg", deferred(&pending));
        assert_eq!(pending.borrow().len(), 1);
        assert_eq!(cache.len(), 1);
        assert!(!a.is_ready());

        let (_, done) = pending.borrow_mut().pop().unwrap();
        done(Ok(FakeImage::new(1, 320, 180)));
        assert!(a.is_ready());
        assert!(b.is_ready());
        assert_eq!(b.image(), Some(FakeImage::new(1, 320, 180)));
    }

    #[test]
    fn waiters_fire_once_on_ready() {
        let mut cache: AtlasCache<FakeImage> = AtlasCache::new();
        let pending: Pending = Rc::default();
        let seen = Rc::new(RefCell::new(vec![]));

        let handle = cache.get("a.jpg", deferred(&pending));
        for tag in 0..2 {
            let seen = Rc::clone(&seen);
            handle.when_ready(Box::new(move |img: FakeImage| seen.borrow_mut().push((tag, img.id))));
        }
        let (_, done) = pending.borrow_mut().pop().unwrap();
        done(Ok(FakeImage::new(7, 10, 10)));
        assert_eq!(*seen.borrow(), [(0, 7), (1, 7)]);

        // Already ready: runs synchronously.
        let seen_late = Rc::clone(&seen);
        handle.when_ready(Box::new(move |img: FakeImage| seen_late.borrow_mut().push((9, img.id))));
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn failure_is_permanent_and_drops_waiters() {
        let mut cache: AtlasCache<FakeImage> = AtlasCache::new();
        let pending: Pending = Rc::default();
        let fired = Rc::new(RefCell::new(false));

        let handle = cache.get("broken.jpg", deferred(&pending));
        let flag = Rc::clone(&fired);
        handle.when_ready(Box::new(move |_| *flag.borrow_mut() = true));
        let (url, done) = pending.borrow_mut().pop().unwrap();
        done(Err(AmbientError::ImageLoad(url)));

        assert!(handle.is_failed());
        assert!(!*fired.borrow());

        // No retry on later requests.
        let again = cache.get("broken.jpg", deferred(&pending));
        assert!(again.is_failed());
        assert!(pending.borrow().is_empty());
    }

    #[test]
    fn zero_sized_image_counts_as_failed() {
        let mut cache: AtlasCache<FakeImage> = AtlasCache::new();
        let handle = cache.get("empty.png", |_, done| done(Ok(FakeImage::new(1, 0, 90))));
        assert!(handle.is_failed());
        assert_eq!(handle.image(), None);
    }

    #[test]
    fn synchronous_loader_is_ready_on_return() {
        let mut cache: AtlasCache<FakeImage> = AtlasCache::new();
        let handle = cache.get("hot.jpg", |_, done| done(Ok(FakeImage::new(3, 4, 4))));
        assert!(handle.is_ready());
        assert_eq!(cache.peek("hot.jpg").map(AtlasHandle::url), Some("hot.jpg"));
    }
}
