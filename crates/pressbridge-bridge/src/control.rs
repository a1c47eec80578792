// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native pressable control.
//
// Owns a platform widget, listens to its touch phases, and turns each
// completed press into an `InteractionEvent` fired into the emitter slot.
//
// State sits behind `Rc<RefCell<_>>` because the widget's touch handler needs
// to reach it; the handler only holds a `Weak`, so a dropped control can never
// be resurrected by late input.  Everything runs on the UI thread: no locks.
//
// Sequence numbers belong to the control, not to the emitter.  They start at
// 1, advance on every completed press that passes the interaction gate (even
// when no emitter is attached and the event is dropped), and are never reused.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, error, info, instrument, trace};

use pressbridge_core::BridgeConfig;
use pressbridge_core::error::Result;
use pressbridge_core::types::{
    ControlId, EventData, InteractionEvent, LifecycleState, PointerEvents, PressKind, TouchPoint,
};
use pressbridge_dispatch::BridgeEmitter;

use crate::gesture::{GestureCompletion, PressRecognizer};
use crate::widget::{PressableWidget, TouchPhase};

struct ControlState {
    id: ControlId,
    lifecycle: LifecycleState,
    /// Last sequence number handed out.
    last_sequence: u64,
    emitter: Option<Box<dyn BridgeEmitter>>,
    recognizer: PressRecognizer,
    enabled: bool,
    pointer_events: PointerEvents,
    /// Attached to every event this control emits.
    data: EventData,
}

impl ControlState {
    fn accepts_presses(&self) -> bool {
        self.enabled && self.pointer_events.allows_target()
    }
}

/// A pressable widget bridged to a host runtime.
pub struct NativeControl<W: PressableWidget> {
    widget: W,
    state: Rc<RefCell<ControlState>>,
}

impl<W: PressableWidget> NativeControl<W> {
    /// Wrap `widget` under a fresh identifier and start listening for input.
    pub fn new(widget: W, config: &BridgeConfig) -> Self {
        Self::with_id(ControlId::new(), widget, config)
    }

    /// Wrap `widget` under a caller-chosen identifier.
    pub fn with_id(id: ControlId, mut widget: W, config: &BridgeConfig) -> Self {
        let state = Rc::new(RefCell::new(ControlState {
            id,
            lifecycle: LifecycleState::Alive,
            last_sequence: 0,
            emitter: None,
            recognizer: PressRecognizer::from_config(config),
            enabled: true,
            pointer_events: PointerEvents::Auto,
            data: EventData::new(),
        }));

        let weak = Rc::downgrade(&state);
        widget.set_touch_handler(Box::new(move |phase| on_touch(&weak, phase)));

        debug!(control_id = %id, platform = widget.platform_name(), "native control created");
        Self { widget, state }
    }

    pub fn id(&self) -> ControlId {
        self.state.borrow().id
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.state.borrow().lifecycle
    }

    /// Sequence number of the most recent completed press (0 if none yet).
    pub fn last_sequence(&self) -> u64 {
        self.state.borrow().last_sequence
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Install `emitter` as the single subscriber, replacing any previous one.
    pub fn attach_emitter<E>(&mut self, emitter: E)
    where
        E: BridgeEmitter + 'static,
    {
        self.set_emitter(Some(Box::new(emitter)));
    }

    /// Clear the subscriber.  Later presses are dropped silently.
    pub fn detach_emitter(&mut self) {
        self.set_emitter(None);
    }

    /// Replace the emitter slot wholesale.  `None` disables delivery.
    pub fn set_emitter(&mut self, emitter: Option<Box<dyn BridgeEmitter>>) {
        let mut state = self.state.borrow_mut();
        if !state.lifecycle.is_alive() {
            debug!(control_id = %state.id, "emitter change on torn-down control ignored");
            return;
        }
        let attached = emitter.is_some();
        let replaced = std::mem::replace(&mut state.emitter, emitter).is_some();
        debug!(control_id = %state.id, attached, replaced, "emitter slot updated");
    }

    pub fn has_emitter(&self) -> bool {
        self.state.borrow().emitter.is_some()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.state.borrow_mut().enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    pub fn set_pointer_events(&mut self, pointer_events: PointerEvents) {
        self.state.borrow_mut().pointer_events = pointer_events;
    }

    pub fn pointer_events(&self) -> PointerEvents {
        self.state.borrow().pointer_events
    }

    /// Set the data map attached to every subsequent event.
    pub fn set_event_data(&mut self, data: EventData) {
        self.state.borrow_mut().data = data;
    }

    /// Translate one completed press into an event, as the platform input
    /// path does.  Returns the sequence number consumed, if any.
    pub fn on_gesture_complete(&self) -> Option<u64> {
        self.complete_gesture(PressKind::Press, None)
    }

    /// Like [`NativeControl::on_gesture_complete`] with an explicit kind and
    /// touch record.
    pub fn complete_gesture(&self, kind: PressKind, touch: Option<TouchPoint>) -> Option<u64> {
        complete(&self.state, GestureCompletion { kind, touch })
    }

    /// Stop translating input and release the widget.
    ///
    /// The touch handler is detached before anything is freed, so once this
    /// returns no gesture can reach the emitter.  Calling it again is a no-op.
    #[instrument(skip(self), fields(control_id = %self.id()))]
    pub fn teardown(&mut self) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.lifecycle != LifecycleState::Alive {
                trace!("teardown already done");
                return Ok(());
            }
            state.lifecycle = LifecycleState::TearingDown;
        }

        self.widget.clear_touch_handler();

        {
            let mut state = self.state.borrow_mut();
            state.emitter = None;
            state.recognizer.reset();
        }

        let released = self.widget.release();
        self.state.borrow_mut().lifecycle = LifecycleState::Dead;

        info!(last_sequence = self.last_sequence(), "native control torn down");
        released
    }
}

impl<W: PressableWidget> Drop for NativeControl<W> {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            error!(error = %e, "teardown during drop failed");
        }
    }
}

impl<W: PressableWidget> std::fmt::Debug for NativeControl<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("NativeControl")
            .field("id", &state.id)
            .field("platform", &self.widget.platform_name())
            .field("lifecycle", &state.lifecycle)
            .field("last_sequence", &state.last_sequence)
            .field("has_emitter", &state.emitter.is_some())
            .finish()
    }
}

/// Touch handler body installed on the widget.
fn on_touch(state: &Weak<RefCell<ControlState>>, phase: TouchPhase) {
    let Some(state) = state.upgrade() else {
        trace!(?phase, "touch for dropped control");
        return;
    };
    let completion = state.borrow_mut().recognizer.handle(phase);
    if let Some(completion) = completion {
        complete(&state, completion);
    }
}

fn complete(state: &RefCell<ControlState>, completion: GestureCompletion) -> Option<u64> {
    let (event, emitter) = {
        let mut s = state.borrow_mut();

        if !s.lifecycle.is_alive() {
            error!(control_id = %s.id, lifecycle = ?s.lifecycle, "gesture completed after teardown");
            debug_assert!(
                s.lifecycle.is_alive(),
                "gesture completed on control {} after teardown",
                s.id
            );
            return None;
        }

        if !s.accepts_presses() {
            debug!(
                control_id = %s.id,
                enabled = s.enabled,
                pointer_events = ?s.pointer_events,
                "press on non-interactive control ignored"
            );
            return None;
        }

        s.last_sequence += 1;
        let mut event = InteractionEvent::new(s.id, s.last_sequence, completion.kind)
            .with_data(s.data.clone());
        if let Some(touch) = completion.touch {
            event = event.with_touch(touch);
        }
        // Take the emitter out so it runs without the state borrowed.
        (event, s.emitter.take())
    };

    let sequence = event.sequence();
    let Some(emitter) = emitter else {
        trace!(control_id = %event.control_id(), sequence, "no emitter attached, event dropped");
        return Some(sequence);
    };

    emitter.emit(event);

    let mut s = state.borrow_mut();
    if s.lifecycle.is_alive() && s.emitter.is_none() {
        s.emitter = Some(emitter);
    }
    Some(sequence)
}
