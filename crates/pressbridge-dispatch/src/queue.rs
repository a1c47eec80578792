// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host task queue.
//
// One unbounded tokio mpsc channel carries both events and lifecycle
// messages.  Pushing never blocks.  An optional capacity limits only the
// number of events in flight: a push past it is rejected with `QueueFull`,
// while mount, unmount and shutdown always enqueue while the host is open.
// A single channel is FIFO per sender, which gives per-control ordering.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use pressbridge_core::error::{BridgeError, Result};
use pressbridge_core::types::{ControlId, InteractionEvent};

/// Handler invoked on the host thread for each event of a mounted control.
pub type HostHandler = Box<dyn FnMut(&InteractionEvent) + Send>;

/// Work item processed by the host runtime loop.
pub enum HostMessage {
    /// A press crossing from the native side.
    Event(InteractionEvent),
    /// Register (or replace) the host-side counterpart of a control.
    Mount {
        control_id: ControlId,
        handler: HostHandler,
    },
    /// Remove the host-side counterpart; later events for it are stale.
    Unmount(ControlId),
    /// Stop the loop and close the queue.
    Shutdown,
}

impl std::fmt::Debug for HostMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event(event) => f.debug_tuple("Event").field(event).finish(),
            Self::Mount { control_id, .. } => {
                f.debug_struct("Mount").field("control_id", control_id).finish_non_exhaustive()
            }
            Self::Unmount(id) => f.debug_tuple("Unmount").field(id).finish(),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Sending half, cloned into every emitter and handle.
#[derive(Clone)]
pub(crate) struct QueueSender {
    tx: mpsc::UnboundedSender<HostMessage>,
    /// Events sent but not yet received.
    in_flight: Arc<AtomicUsize>,
    capacity: Option<usize>,
}

impl QueueSender {
    /// Enqueue an event without waiting, honouring the event capacity.
    pub(crate) fn push_event(&self, event: InteractionEvent) -> Result<()> {
        if let Some(cap) = self.capacity {
            let reserved = self
                .in_flight
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < cap).then_some(n + 1));
            if reserved.is_err() {
                return Err(BridgeError::QueueFull);
            }
        } else {
            self.in_flight.fetch_add(1, Ordering::AcqRel);
        }

        self.tx.send(HostMessage::Event(event)).map_err(|_| {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            BridgeError::HostUnavailable
        })
    }

    /// Enqueue a lifecycle message.  Only fails once the host is gone.
    pub(crate) fn push_control(&self, message: HostMessage) -> Result<()> {
        debug_assert!(!matches!(message, HostMessage::Event(_)), "events go through push_event");
        self.tx.send(message).map_err(|_| BridgeError::HostUnavailable)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half, owned by the host runtime.
pub(crate) struct QueueReceiver {
    rx: mpsc::UnboundedReceiver<HostMessage>,
    in_flight: Arc<AtomicUsize>,
}

impl QueueReceiver {
    pub(crate) async fn recv(&mut self) -> Option<HostMessage> {
        let message = self.rx.recv().await;
        self.release(message.as_ref());
        message
    }

    pub(crate) fn try_recv(&mut self) -> std::result::Result<HostMessage, TryRecvError> {
        let message = self.rx.try_recv()?;
        self.release(Some(&message));
        Ok(message)
    }

    /// Refuse further sends.  Already-queued messages stay receivable.
    pub(crate) fn close(&mut self) {
        self.rx.close();
    }

    /// Events currently queued.
    #[cfg(test)]
    pub(crate) fn pending_events(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    fn release(&self, message: Option<&HostMessage>) {
        if matches!(message, Some(HostMessage::Event(_))) {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// Create a host queue.  `None` capacity means unbounded.
pub(crate) fn host_queue(capacity: Option<usize>) -> (QueueSender, QueueReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let sender = QueueSender {
        tx,
        in_flight: Arc::clone(&in_flight),
        capacity: capacity.map(|cap| cap.max(1)),
    };
    (sender, QueueReceiver { rx, in_flight })
}
