// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Press recognition.
//
// Turns raw touch phases into at most one completed press per touch.  The only
// classification is by hold duration: at or past the long-press delay the
// press completes as `LongPress`, otherwise as `Press`.

use tracing::trace;

use pressbridge_core::BridgeConfig;
use pressbridge_core::types::{PressKind, TouchPoint};

use crate::widget::TouchPhase;

/// A press the recognizer considers complete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureCompletion {
    pub kind: PressKind,
    /// Where the touch was lifted, when the platform reported it.
    pub touch: Option<TouchPoint>,
}

/// Tracks one in-flight touch.
#[derive(Debug, Clone)]
pub struct PressRecognizer {
    long_press_delay_ms: u64,
    began: Option<TouchPoint>,
}

impl PressRecognizer {
    pub fn new(long_press_delay_ms: u64) -> Self {
        Self {
            long_press_delay_ms,
            began: None,
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(config.long_press_delay_ms)
    }

    /// Whether a touch is currently down.
    pub fn is_tracking(&self) -> bool {
        self.began.is_some()
    }

    /// Feed one phase.  Returns the completed press, if this phase ended one.
    pub fn handle(&mut self, phase: TouchPhase) -> Option<GestureCompletion> {
        match phase {
            TouchPhase::Began(touch) => {
                // A second touch-down restarts tracking; the first never completed.
                self.began = Some(touch);
                None
            }
            TouchPhase::Ended(touch) => {
                let Some(began) = self.began.take() else {
                    trace!("touch ended without a matching touch-down");
                    return None;
                };
                let held_ms = touch.timestamp_ms.saturating_sub(began.timestamp_ms);
                let kind = if held_ms >= self.long_press_delay_ms {
                    PressKind::LongPress
                } else {
                    PressKind::Press
                };
                trace!(held_ms, ?kind, "press recognised");
                Some(GestureCompletion {
                    kind,
                    touch: Some(touch),
                })
            }
            TouchPhase::Cancelled => {
                self.began = None;
                None
            }
            TouchPhase::Activated(touch) => {
                self.began = None;
                Some(GestureCompletion {
                    kind: PressKind::Press,
                    touch,
                })
            }
        }
    }

    /// Forget any in-flight touch.
    pub fn reset(&mut self) {
        self.began = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(timestamp_ms: u64) -> TouchPoint {
        TouchPoint {
            timestamp_ms,
            ..TouchPoint::default()
        }
    }

    #[test]
    fn short_hold_is_a_press() {
        let mut recognizer = PressRecognizer::new(500);
        assert!(recognizer.handle(TouchPhase::Began(at(1_000))).is_none());
        assert!(recognizer.is_tracking());

        let done = recognizer.handle(TouchPhase::Ended(at(1_130))).expect("completed");
        assert_eq!(done.kind, PressKind::Press);
        assert_eq!(done.touch.map(|t| t.timestamp_ms), Some(1_130));
        assert!(!recognizer.is_tracking());
    }

    #[test]
    fn hold_at_delay_is_a_long_press() {
        let mut recognizer = PressRecognizer::from_config(&BridgeConfig::default());
        recognizer.handle(TouchPhase::Began(at(0)));
        let done = recognizer.handle(TouchPhase::Ended(at(500))).expect("completed");
        assert_eq!(done.kind, PressKind::LongPress);
    }

    #[test]
    fn cancelled_touch_completes_nothing() {
        let mut recognizer = PressRecognizer::new(500);
        recognizer.handle(TouchPhase::Began(at(0)));
        assert!(recognizer.handle(TouchPhase::Cancelled).is_none());
        assert!(recognizer.handle(TouchPhase::Ended(at(100))).is_none());
    }

    #[test]
    fn end_without_begin_is_ignored() {
        let mut recognizer = PressRecognizer::new(500);
        assert!(recognizer.handle(TouchPhase::Ended(at(10))).is_none());
    }

    #[test]
    fn second_touch_down_restarts_the_clock() {
        let mut recognizer = PressRecognizer::new(500);
        recognizer.handle(TouchPhase::Began(at(0)));
        recognizer.handle(TouchPhase::Began(at(450)));
        let done = recognizer.handle(TouchPhase::Ended(at(600))).expect("completed");
        assert_eq!(done.kind, PressKind::Press);
    }

    #[test]
    fn platform_activation_is_a_press() {
        let mut recognizer = PressRecognizer::new(500);
        recognizer.handle(TouchPhase::Began(at(0)));
        let done = recognizer.handle(TouchPhase::Activated(None)).expect("completed");
        assert_eq!(done.kind, PressKind::Press);
        assert!(done.touch.is_none());
        assert!(!recognizer.is_tracking());
    }

    #[test]
    fn clock_skew_never_underflows() {
        let mut recognizer = PressRecognizer::new(500);
        recognizer.handle(TouchPhase::Began(at(900)));
        let done = recognizer.handle(TouchPhase::Ended(at(100))).expect("completed");
        assert_eq!(done.kind, PressKind::Press);
    }
}
