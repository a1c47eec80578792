// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Emitter abstraction: the callback slot a native control fires into.
//
// Emitting is fire-and-forget.  There is no return value because the native
// side has nothing useful to do with a failure: a press the host never sees
// is simply lost, and the user presses again.

use std::sync::Arc;

use tracing::{debug, trace};

use pressbridge_core::types::InteractionEvent;

use crate::host::Counters;
use crate::queue::QueueSender;

/// Delivers interaction events from the native side towards the host.
///
/// Implementations must return promptly and must not wait on the host loop.
/// Plain closures are emitters too, which keeps tests and ad-hoc wiring cheap.
pub trait BridgeEmitter {
    fn emit(&self, event: InteractionEvent);
}

impl<F> BridgeEmitter for F
where
    F: Fn(InteractionEvent),
{
    fn emit(&self, event: InteractionEvent) {
        self(event)
    }
}

/// Emitter that enqueues onto a [`HostRuntime`](crate::HostRuntime) queue.
///
/// Obtained from [`HostHandle::emitter`](crate::HostHandle::emitter).  Safe to
/// use after the host has shut down: the event is counted as dropped.
#[derive(Clone)]
pub struct HostEmitter {
    sender: QueueSender,
    counters: Arc<Counters>,
}

impl HostEmitter {
    pub(crate) fn new(sender: QueueSender, counters: Arc<Counters>) -> Self {
        Self { sender, counters }
    }

    /// Whether the host queue has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl BridgeEmitter for HostEmitter {
    fn emit(&self, event: InteractionEvent) {
        let control_id = event.control_id();
        let sequence = event.sequence();

        match self.sender.push_event(event) {
            Ok(()) => trace!(control_id = %control_id, sequence, "event enqueued"),
            Err(e) => {
                self.counters.record_dropped();
                debug!(control_id = %control_id, sequence, error = %e, "dropping interaction event");
            }
        }
    }
}

impl std::fmt::Debug for HostEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostEmitter")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use pressbridge_core::types::{ControlId, PressKind};

    #[test]
    fn closures_are_emitters() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let emitter = move |event: InteractionEvent| sink.borrow_mut().push(event.sequence());

        let boxed: Box<dyn BridgeEmitter> = Box::new(emitter);
        let id = ControlId::new();
        boxed.emit(InteractionEvent::new(id, 1, PressKind::Press));
        boxed.emit(InteractionEvent::new(id, 2, PressKind::Press));

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
