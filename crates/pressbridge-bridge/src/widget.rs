// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic contract for the pressable widget a control wraps.
//
// The GUI toolkit owns rendering and hit-testing.  All the bridge needs from
// it is a way to hear about touch phases and a way to stop hearing about them
// before the widget goes away.

use pressbridge_core::error::Result;
use pressbridge_core::types::TouchPoint;

/// A touch phase reported by the platform's input system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchPhase {
    /// Finger down inside the widget.
    Began(TouchPoint),
    /// Finger lifted inside the widget.
    Ended(TouchPoint),
    /// Touch interrupted or dragged out.  Completes nothing.
    Cancelled,
    /// The platform recognised a completed press on its own (keyboard or
    /// assistive activation, `touchUpInside`-style callbacks).
    Activated(Option<TouchPoint>),
}

/// Callback installed on a widget.  Runs on the UI thread.
pub type TouchHandler = Box<dyn FnMut(TouchPhase)>;

/// Pressable widget primitive consumed from the GUI toolkit.
pub trait PressableWidget {
    /// Human-readable platform name (e.g. "UIKit", "Headless").
    fn platform_name(&self) -> &str;

    /// Install the touch handler, replacing any previous one.
    fn set_touch_handler(&mut self, handler: TouchHandler);

    /// Remove the touch handler.  Must take effect before returning: once this
    /// returns, no further phases may be delivered.
    fn clear_touch_handler(&mut self);

    /// Release the underlying platform resources.
    fn release(&mut self) -> Result<()>;
}

impl<W: PressableWidget + ?Sized> PressableWidget for Box<W> {
    fn platform_name(&self) -> &str {
        (**self).platform_name()
    }

    fn set_touch_handler(&mut self, handler: TouchHandler) {
        (**self).set_touch_handler(handler)
    }

    fn clear_touch_handler(&mut self) {
        (**self).clear_touch_handler()
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }
}
