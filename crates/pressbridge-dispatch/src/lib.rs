// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pressbridge Dispatch — the host-runtime side of the bridge.  Native controls
// hand events to an emitter; the emitter pushes them onto the host queue
// without blocking; the host runtime drains the queue on its own thread and
// routes each event to the handler mounted for its control.

pub mod emitter;
pub mod host;
pub mod queue;

pub use emitter::{BridgeEmitter, HostEmitter};
pub use host::{HostHandle, HostRuntime, HostStats};
pub use queue::HostMessage;
