// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Pressbridge — native pressable controls.
//!
//! A [`NativeControl`] wraps a platform widget (anything implementing
//! [`PressableWidget`]), turns completed presses into `InteractionEvent`s and
//! fires them into a single-subscriber [`BridgeEmitter`] slot.  Platform
//! toolkits supply their own widgets; [`HeadlessWidget`] stands in for them on
//! desktop and CI builds, where input is simulated.
//!
//! Controls live on the UI thread and are deliberately `!Send`.

pub mod control;
pub mod gesture;
pub mod headless;
pub mod widget;

pub use control::NativeControl;
pub use gesture::{GestureCompletion, PressRecognizer};
pub use headless::{HeadlessInput, HeadlessWidget};
pub use pressbridge_dispatch::BridgeEmitter;
pub use widget::{PressableWidget, TouchHandler, TouchPhase};
