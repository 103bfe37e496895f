// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` callback queue.
//!
//! [`FrameQueue`] multiplexes any number of one-shot frame callbacks onto a
//! single persistent JS closure. At most one `requestAnimationFrame` is
//! outstanding at a time; it is registered when the first callback is queued
//! and cancelled when the last pending callback is cancelled.
//!
//! Callbacks queued while a tick is running wait for the next frame, so a
//! callback that re-queues itself runs once per display refresh.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use ambient_core::backend::{FrameCallback, FrameRequest};

// Direct global bindings instead of `web_sys::Window` methods; avoids
// fetching (and unwrapping) the Window/Performance objects on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type RafClosure = Closure<dyn FnMut(f64)>;

/// Queue of one-shot callbacks run on the next animation frame.
pub struct FrameQueue {
    inner: Rc<QueueInner>,
}

struct QueueInner {
    /// The JS closure registered with `requestAnimationFrame`.
    ///
    /// Holds only a `Weak` back-reference, so dropping the queue frees it.
    closure: RefCell<Option<RafClosure>>,

    /// Pending callbacks keyed by request id (issue order).
    pending: RefCell<BTreeMap<u64, FrameCallback>>,

    /// Last issued request id.
    last_id: Cell<u64>,

    /// The ID returned by the outstanding `requestAnimationFrame` call.
    raf_id: Cell<Option<i32>>,
}

impl FrameQueue {
    /// Creates an idle queue.
    #[must_use]
    pub fn new() -> Self {
        let inner = Rc::new(QueueInner {
            closure: RefCell::new(None),
            pending: RefCell::new(BTreeMap::new()),
            last_id: Cell::new(0),
            raf_id: Cell::new(None),
        });

        let weak: Weak<QueueInner> = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            if let Some(inner) = weak.upgrade() {
                inner.tick(timestamp_ms);
            }
        }) as Box<dyn FnMut(f64)>);
        *inner.closure.borrow_mut() = Some(closure);

        Self { inner }
    }

    /// Queues `callback` for the next animation frame.
    pub fn request(&self, callback: FrameCallback) -> FrameRequest {
        let id = self.inner.last_id.get() + 1;
        self.inner.last_id.set(id);
        self.inner.pending.borrow_mut().insert(id, callback);
        self.inner.schedule();
        FrameRequest(id)
    }

    /// Removes a pending callback. Unknown or already-run requests are
    /// ignored.
    pub fn cancel(&self, request: FrameRequest) {
        let empty = {
            let mut pending = self.inner.pending.borrow_mut();
            pending.remove(&request.0);
            pending.is_empty()
        };
        if empty && let Some(id) = self.inner.raf_id.take() {
            cancel_animation_frame(id);
        }
    }

    /// Number of callbacks waiting for a frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.pending.borrow().len()
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueInner {
    fn schedule(&self) {
        if self.raf_id.get().is_some() {
            return;
        }
        if let Some(ref closure) = *self.closure.borrow() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.raf_id.set(Some(id));
        }
    }

    fn tick(&self, timestamp_ms: f64) {
        self.raf_id.set(None);
        let cutoff = self.last_id.get();
        loop {
            // The borrow is scoped so callbacks may queue or cancel.
            let next = {
                let mut pending = self.pending.borrow_mut();
                match pending.first_key_value() {
                    Some((&id, _)) if id <= cutoff => pending.remove(&id),
                    _ => None,
                }
            };
            let Some(callback) = next else {
                break;
            };
            callback(timestamp_ms);
        }
        if !self.pending.borrow().is_empty() {
            self.schedule();
        }
    }
}

impl Drop for FrameQueue {
    fn drop(&mut self) {
        if let Some(id) = self.inner.raf_id.take() {
            cancel_animation_frame(id);
        }
        self.inner.pending.borrow_mut().clear();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.inner.pending.borrow().len())
            .field("last_id", &self.inner.last_id.get())
            .field("raf_id", &self.inner.raf_id.get())
            .finish()
    }
}
