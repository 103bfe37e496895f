// Copyright 2026 the Ambient Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for ambient
//! diagnostics.
//!
//! This crate provides [`TraceSink`](ambient_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: an owned in-memory event log.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from a
//!   recorded log.

pub mod chrome;
pub mod pretty;
pub mod recorder;
