// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless widget for desktop/CI builds where no platform toolkit is present.
//
// The widget half is handed to a `NativeControl`; the `HeadlessInput` half
// plays the role of the platform input system and injects touch phases.  Time
// is a virtual millisecond clock so simulated presses are deterministic.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace, warn};

use pressbridge_core::BridgeConfig;
use pressbridge_core::error::{BridgeError, Result};
use pressbridge_core::types::TouchPoint;

use crate::widget::{PressableWidget, TouchHandler, TouchPhase};

struct HeadlessState {
    handler: Option<TouchHandler>,
    /// Bumped on every set/clear so a dispatch in progress can tell whether
    /// its handler was replaced underneath it.
    generation: u64,
    released: bool,
    clock_ms: u64,
    press_duration_ms: u64,
    next_touch_id: u32,
    /// Touch position reported for simulated presses.
    position: (f64, f64),
    /// Widget origin within the root view.
    origin: (f64, f64),
}

/// Widget with no on-screen presence.
pub struct HeadlessWidget {
    shared: Rc<RefCell<HeadlessState>>,
}

/// Input side of a [`HeadlessWidget`].  Cheap to clone.
#[derive(Clone)]
pub struct HeadlessInput {
    shared: Rc<RefCell<HeadlessState>>,
}

impl HeadlessWidget {
    /// Create a widget and the input handle that drives it.
    pub fn new(config: &BridgeConfig) -> (Self, HeadlessInput) {
        let shared = Rc::new(RefCell::new(HeadlessState {
            handler: None,
            generation: 0,
            released: false,
            clock_ms: 0,
            press_duration_ms: config.min_press_duration_ms,
            next_touch_id: 0,
            position: (0.0, 0.0),
            origin: (0.0, 0.0),
        }));
        let input = HeadlessInput {
            shared: Rc::clone(&shared),
        };
        (Self { shared }, input)
    }

    /// Place the widget within the root view; affects reported page coordinates.
    pub fn set_origin(&mut self, x: f64, y: f64) {
        self.shared.borrow_mut().origin = (x, y);
    }
}

impl PressableWidget for HeadlessWidget {
    fn platform_name(&self) -> &str {
        "Headless"
    }

    fn set_touch_handler(&mut self, handler: TouchHandler) {
        let mut state = self.shared.borrow_mut();
        if state.released {
            warn!("touch handler installed on a released headless widget; ignoring");
            return;
        }
        state.handler = Some(handler);
        state.generation += 1;
    }

    fn clear_touch_handler(&mut self) {
        let mut state = self.shared.borrow_mut();
        state.handler = None;
        state.generation += 1;
    }

    fn release(&mut self) -> Result<()> {
        let mut state = self.shared.borrow_mut();
        if state.released {
            return Err(BridgeError::Widget("headless widget already released".into()));
        }
        if state.handler.is_some() {
            debug!("releasing headless widget with a live touch handler");
            state.handler = None;
            state.generation += 1;
        }
        state.released = true;
        Ok(())
    }
}

impl HeadlessInput {
    /// Simulate a regular press: touch down, hold for the configured minimum
    /// press duration, lift.  Returns whether a handler saw it.
    pub fn press(&self) -> bool {
        let duration = self.shared.borrow().press_duration_ms;
        self.hold(duration)
    }

    /// Simulate a touch held for `hold_ms` before lifting.
    pub fn hold(&self, hold_ms: u64) -> bool {
        let down = self.touch_down();
        self.advance(hold_ms);
        let up = self.touch_up();
        down && up
    }

    pub fn touch_down(&self) -> bool {
        let touch = self.next_touch(true);
        self.dispatch(TouchPhase::Began(touch))
    }

    pub fn touch_up(&self) -> bool {
        let touch = self.next_touch(false);
        self.dispatch(TouchPhase::Ended(touch))
    }

    pub fn cancel(&self) -> bool {
        self.dispatch(TouchPhase::Cancelled)
    }

    /// Simulate a platform activation (e.g. keyboard or assistive press).
    pub fn activate(&self) -> bool {
        self.dispatch(TouchPhase::Activated(None))
    }

    /// Move the simulated finger, in widget-local coordinates.
    pub fn move_to(&self, x: f64, y: f64) {
        self.shared.borrow_mut().position = (x, y);
    }

    /// Advance the virtual clock.
    pub fn advance(&self, ms: u64) {
        let mut state = self.shared.borrow_mut();
        state.clock_ms = state.clock_ms.saturating_add(ms);
    }

    pub fn has_handler(&self) -> bool {
        self.shared.borrow().handler.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.shared.borrow().released
    }

    fn next_touch(&self, new_touch: bool) -> TouchPoint {
        let mut state = self.shared.borrow_mut();
        if new_touch {
            state.next_touch_id = state.next_touch_id.wrapping_add(1);
        }
        let (x, y) = state.position;
        let (ox, oy) = state.origin;
        TouchPoint {
            identifier: state.next_touch_id,
            location_x: x,
            location_y: y,
            page_x: ox + x,
            page_y: oy + y,
            timestamp_ms: state.clock_ms,
        }
    }

    /// Deliver a phase to the installed handler, if any.
    ///
    /// The handler is taken out of the shared state while it runs so it may
    /// touch the widget (or clear itself) without a re-entrant borrow.
    fn dispatch(&self, phase: TouchPhase) -> bool {
        let (handler, generation) = {
            let mut state = self.shared.borrow_mut();
            if state.released {
                trace!(?phase, "input on released headless widget dropped");
                return false;
            }
            (state.handler.take(), state.generation)
        };

        let Some(mut handler) = handler else {
            trace!(?phase, "no touch handler installed");
            return false;
        };
        handler(phase);

        let mut state = self.shared.borrow_mut();
        if state.generation == generation && !state.released {
            state.handler = Some(handler);
        }
        true
    }
}
