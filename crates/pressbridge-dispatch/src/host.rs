// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host runtime loop.
//
// The host side is single-threaded: one `HostRuntime` owns the receive end of
// the queue and every mounted handler.  Everything else talks to it through a
// cloneable `HostHandle`, and mount/unmount travel through the same queue as
// events so they are ordered with respect to them.
//
// Events can arrive for a control whose counterpart was already unmounted
// (the native side fired just before teardown).  Those are stale: counted and
// ignored, never an error.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, instrument, trace, warn};

use pressbridge_core::BridgeConfig;
use pressbridge_core::error::Result;
use pressbridge_core::types::{ControlId, InteractionEvent};

use crate::emitter::HostEmitter;
use crate::queue::{HostHandler, HostMessage, QueueReceiver, QueueSender, host_queue};

/// Snapshot of delivery counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostStats {
    /// Events handed to a mounted handler.
    pub delivered: u64,
    /// Events for controls with no mounted handler.
    pub stale: u64,
    /// Sequence jumps observed (events that never reached the queue).
    pub gaps: u64,
    /// Events whose sequence did not increase.
    pub out_of_order: u64,
    /// Emits that never entered the queue (closed or full).
    pub dropped: u64,
}

/// Counters shared between the runtime and every emitter.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    delivered: AtomicU64,
    stale: AtomicU64,
    gaps: AtomicU64,
    out_of_order: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> HostStats {
        HostStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
            gaps: self.gaps.load(Ordering::Relaxed),
            out_of_order: self.out_of_order.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Cloneable, `Send` entry point to a host runtime.
#[derive(Clone)]
pub struct HostHandle {
    sender: QueueSender,
    counters: Arc<Counters>,
}

impl HostHandle {
    /// A new emitter feeding this host.  Attach it to a native control.
    pub fn emitter(&self) -> HostEmitter {
        HostEmitter::new(self.sender.clone(), Arc::clone(&self.counters))
    }

    /// Mount the host-side counterpart of `control_id`.
    ///
    /// Replaces any handler already mounted for the same control.
    pub fn mount<F>(&self, control_id: ControlId, handler: F) -> Result<()>
    where
        F: FnMut(&InteractionEvent) + Send + 'static,
    {
        self.sender.push_control(HostMessage::Mount {
            control_id,
            handler: Box::new(handler),
        })
    }

    /// Unmount the counterpart of `control_id`.  Later events for it are stale.
    pub fn unmount(&self, control_id: ControlId) -> Result<()> {
        self.sender.push_control(HostMessage::Unmount(control_id))
    }

    /// Ask the runtime to stop.  Messages queued after this are discarded.
    ///
    /// Lifecycle messages bypass the event capacity, so this succeeds even
    /// when a burst of presses has filled a bounded queue.
    pub fn shutdown(&self) -> Result<()> {
        self.sender.push_control(HostMessage::Shutdown)
    }

    /// Whether the runtime has stopped accepting messages.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn stats(&self) -> HostStats {
        self.counters.snapshot()
    }
}

impl std::fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("closed", &self.is_closed())
            .field("stats", &self.stats())
            .finish()
    }
}

/// The host runtime's event loop.
pub struct HostRuntime {
    receiver: QueueReceiver,
    handlers: HashMap<ControlId, HostHandler>,
    /// Highest sequence seen per control, mounted or not.
    last_sequence: HashMap<ControlId, u64>,
    counters: Arc<Counters>,
    warn_on_stale: bool,
    stopped: bool,
}

impl HostRuntime {
    /// Create a runtime and its first handle.
    pub fn new(config: &BridgeConfig) -> (Self, HostHandle) {
        let (sender, receiver) = host_queue(config.queue_capacity);
        let counters = Arc::new(Counters::default());

        let runtime = Self {
            receiver,
            handlers: HashMap::new(),
            last_sequence: HashMap::new(),
            counters: Arc::clone(&counters),
            warn_on_stale: config.warn_on_stale,
            stopped: false,
        };
        let handle = HostHandle { sender, counters };

        debug!(capacity = ?config.queue_capacity, "host runtime created");
        (runtime, handle)
    }

    /// Process everything currently queued on the calling thread.
    ///
    /// Returns the number of messages handled.  Never waits.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while !self.stopped {
            match self.receiver.try_recv() {
                Ok(message) => {
                    handled += 1;
                    if self.handle_message(message).is_break() {
                        break;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        handled
    }

    /// Run until shutdown is requested or every handle and emitter is gone.
    #[instrument(skip_all)]
    pub async fn run(mut self) -> HostStats {
        info!("host runtime started");
        while !self.stopped {
            let Some(message) = self.receiver.recv().await else {
                break;
            };
            if self.handle_message(message).is_break() {
                break;
            }
        }
        let stats = self.stats();
        info!(
            delivered = stats.delivered,
            stale = stats.stale,
            gaps = stats.gaps,
            dropped = stats.dropped,
            "host runtime stopped"
        );
        stats
    }

    pub fn stats(&self) -> HostStats {
        self.counters.snapshot()
    }

    /// Whether a handler is mounted for `control_id`.
    pub fn is_mounted(&self, control_id: &ControlId) -> bool {
        self.handlers.contains_key(control_id)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn handle_message(&mut self, message: HostMessage) -> ControlFlow<()> {
        match message {
            HostMessage::Event(event) => self.deliver(event),
            HostMessage::Mount {
                control_id,
                handler,
            } => {
                if self.handlers.insert(control_id, handler).is_some() {
                    debug!(control_id = %control_id, "replaced mounted handler");
                } else {
                    debug!(control_id = %control_id, "handler mounted");
                }
            }
            HostMessage::Unmount(control_id) => {
                if self.handlers.remove(&control_id).is_some() {
                    debug!(control_id = %control_id, "handler unmounted");
                }
            }
            HostMessage::Shutdown => {
                self.stop();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn deliver(&mut self, event: InteractionEvent) {
        let control_id = event.control_id();
        let sequence = event.sequence();
        let last = self.last_sequence.get(&control_id).copied().unwrap_or(0);

        if sequence <= last {
            self.counters.out_of_order.fetch_add(1, Ordering::Relaxed);
            warn!(control_id = %control_id, sequence, last, "event sequence did not increase");
        } else {
            if sequence > last + 1 {
                self.counters.gaps.fetch_add(1, Ordering::Relaxed);
                debug!(
                    control_id = %control_id,
                    missing = sequence - last - 1,
                    "sequence gap, earlier presses never reached the host"
                );
            }
            self.last_sequence.insert(control_id, sequence);
        }

        match self.handlers.get_mut(&control_id) {
            Some(handler) => {
                handler(&event);
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                trace!(control_id = %control_id, sequence, kind = ?event.kind(), "event delivered");
            }
            None => {
                self.counters.stale.fetch_add(1, Ordering::Relaxed);
                if self.warn_on_stale {
                    warn!(control_id = %control_id, sequence, "event for unmounted control ignored");
                } else {
                    debug!(control_id = %control_id, sequence, "event for unmounted control ignored");
                }
            }
        }
    }

    /// Close the queue and discard whatever is still in it.
    fn stop(&mut self) {
        self.stopped = true;
        let discarded = self.discard_pending();
        self.handlers.clear();
        info!(discarded, "host runtime shut down");
    }

    /// Close the receiver and count every event left behind as dropped.
    fn discard_pending(&mut self) -> u64 {
        self.receiver.close();

        let mut discarded = 0_u64;
        while let Ok(message) = self.receiver.try_recv() {
            if matches!(message, HostMessage::Event(_)) {
                self.counters.record_dropped();
                discarded += 1;
            }
        }
        discarded
    }
}

impl Drop for HostRuntime {
    fn drop(&mut self) {
        if !self.stopped {
            let discarded = self.discard_pending();
            debug!(discarded, "host runtime dropped without shutdown");
        }
    }
}
