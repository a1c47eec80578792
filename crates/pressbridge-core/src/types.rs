// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pressbridge event bridge.
//
// `InteractionEvent` doubles as the wire contract: its serde representation is
// the JSON object the host runtime parses, so field renames here are schema
// changes and must bump `SCHEMA_VERSION`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{BridgeError, Result};

/// Version of the `InteractionEvent` wire schema.
pub const SCHEMA_VERSION: u16 = 1;

/// Unique identifier for a native control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlId(pub Uuid);

impl ControlId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ControlId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which kind of completed press produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PressKind {
    /// Touch released before the long-press delay.
    Press,
    /// Touch held for at least the long-press delay.
    LongPress,
}

impl PressKind {
    /// Name of the host-side handler prop for this kind (`onPress`, ...).
    pub fn handler_name(&self) -> &'static str {
        match self {
            Self::Press => "onPress",
            Self::LongPress => "onLongPress",
        }
    }
}

/// Whether a control can be the target of touches.
///
/// Mirrors the host toolkit's `pointerEvents` prop.  Only the control's own
/// targetability matters here; child hit-testing belongs to the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerEvents {
    /// The control and its children can be touch targets.
    #[default]
    Auto,
    /// The control is never a touch target.
    None,
    /// The control is never a target, but its subviews can be.
    BoxNone,
    /// The control can be a target, but its subviews cannot.
    BoxOnly,
}

impl PointerEvents {
    /// Whether the control itself may receive a press.
    pub fn allows_target(&self) -> bool {
        matches!(self, Self::Auto | Self::BoxOnly)
    }
}

/// Lifecycle of a native control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Attached and translating gestures into events.
    Alive,
    /// `teardown()` is in progress; input callbacks are being detached.
    TearingDown,
    /// Widget released.  No further events, ever.
    Dead,
}

impl LifecycleState {
    pub fn is_alive(&self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// A primitive value in the free-form event data map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for Primitive {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Primitive {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Primitive {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Primitive {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Primitive {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Flat string-keyed map of primitives carried alongside an event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventData(BTreeMap<String, Primitive>);

impl EventData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one under the same key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Primitive>,
    ) -> Option<Primitive> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Primitive> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Primitive)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Touch coordinates reported by the platform widget.
///
/// Serialised as the host's `nativeEvent` object.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchPoint {
    /// Platform touch identifier.
    pub identifier: u32,
    /// X relative to the control's bounds.
    pub location_x: f64,
    /// Y relative to the control's bounds.
    pub location_y: f64,
    /// X relative to the root view.
    pub page_x: f64,
    /// Y relative to the root view.
    pub page_y: f64,
    /// Platform timestamp of the touch, in milliseconds.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
}

/// Immutable payload produced for each completed press.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    schema_version: u16,
    #[serde(rename = "target")]
    control_id: ControlId,
    sequence: u64,
    #[serde(rename = "type")]
    kind: PressKind,
    #[serde(rename = "nativeEvent")]
    touch: Option<TouchPoint>,
    #[serde(default)]
    data: EventData,
    created_at: DateTime<Utc>,
}

impl InteractionEvent {
    /// Build an event for `control_id` at position `sequence`.
    pub fn new(control_id: ControlId, sequence: u64, kind: PressKind) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            control_id,
            sequence,
            kind,
            touch: None,
            data: EventData::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_touch(mut self, touch: TouchPoint) -> Self {
        self.touch = Some(touch);
        self
    }

    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }

    pub fn schema_version(&self) -> u16 {
        self.schema_version
    }

    pub fn control_id(&self) -> ControlId {
        self.control_id
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn kind(&self) -> PressKind {
        self.kind
    }

    pub fn touch(&self) -> Option<&TouchPoint> {
        self.touch.as_ref()
    }

    pub fn data(&self) -> &EventData {
        &self.data
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Encode as the JSON object handed to the host runtime.
    pub fn to_wire(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode a host-side JSON object, rejecting unknown schema versions.
    pub fn from_wire(value: &Value) -> Result<Self> {
        let found = value
            .get("schemaVersion")
            .and_then(Value::as_u64)
            .ok_or_else(|| BridgeError::InvalidPayload("missing schemaVersion".into()))?;

        if found != u64::from(SCHEMA_VERSION) {
            return Err(BridgeError::UnsupportedSchema {
                expected: SCHEMA_VERSION,
                found: u16::try_from(found).unwrap_or(u16::MAX),
            });
        }

        let event: Self = serde_json::from_value(value.clone())?;
        if event.sequence == 0 {
            return Err(BridgeError::InvalidPayload("sequence numbers start at 1".into()));
        }
        Ok(event)
    }

    /// Convenience wrapper over [`InteractionEvent::from_wire`] for raw JSON text.
    pub fn from_wire_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_wire(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_event() -> InteractionEvent {
        let mut data = EventData::new();
        data.insert("label", "Submit");
        data.insert("count", 3_i64);
        InteractionEvent::new(ControlId::new(), 7, PressKind::LongPress)
            .with_touch(TouchPoint {
                identifier: 1,
                location_x: 12.5,
                location_y: 4.0,
                page_x: 112.5,
                page_y: 204.0,
                timestamp_ms: 875_928_682,
            })
            .with_data(data)
    }

    #[test]
    fn wire_shape_uses_host_field_names() {
        let event = sample_event();
        let wire = event.to_wire().expect("encode");

        assert_eq!(wire["schemaVersion"], json!(1));
        assert_eq!(wire["target"], json!(event.control_id().to_string()));
        assert_eq!(wire["sequence"], json!(7));
        assert_eq!(wire["type"], json!("longPress"));
        assert_eq!(wire["nativeEvent"]["locationX"], json!(12.5));
        assert_eq!(wire["nativeEvent"]["timestamp"], json!(875_928_682));
        assert_eq!(wire["data"]["label"], json!("Submit"));
        assert!(wire["createdAt"].is_string());
    }

    #[test]
    fn wire_decode_restores_event() {
        let event = sample_event();
        let wire = event.to_wire().expect("encode");
        let decoded = InteractionEvent::from_wire(&wire).expect("decode");
        assert_eq!(decoded, event);
        assert_eq!(decoded.schema_version(), SCHEMA_VERSION);
        assert_eq!(decoded.created_at(), event.created_at());
        assert_eq!(decoded.data().iter().count(), 2);
    }

    #[test]
    fn press_without_touch_encodes_null_native_event() {
        let event = InteractionEvent::new(ControlId::new(), 1, PressKind::Press);
        let wire = event.to_wire().expect("encode");
        assert!(wire["nativeEvent"].is_null());
        assert_eq!(wire["data"], json!({}));
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let mut wire = sample_event().to_wire().expect("encode");
        wire["schemaVersion"] = json!(2);

        match InteractionEvent::from_wire(&wire) {
            Err(BridgeError::UnsupportedSchema { expected, found }) => {
                assert_eq!(expected, SCHEMA_VERSION);
                assert_eq!(found, 2);
            }
            other => panic!("expected UnsupportedSchema, got {other:?}"),
        }
    }

    #[test]
    fn missing_schema_version_is_invalid() {
        let result = InteractionEvent::from_wire(&json!({ "sequence": 1 }));
        assert!(matches!(result, Err(BridgeError::InvalidPayload(_))));
    }

    #[test]
    fn zero_sequence_is_invalid() {
        let mut wire = sample_event().to_wire().expect("encode");
        wire["sequence"] = json!(0);
        let result = InteractionEvent::from_wire(&wire);
        assert!(matches!(result, Err(BridgeError::InvalidPayload(_))));
    }

    #[test]
    fn malformed_json_text_is_a_serialization_error() {
        let result = InteractionEvent::from_wire_str("{ not json");
        assert!(matches!(result, Err(BridgeError::Serialization(_))));
    }

    #[test]
    fn data_map_parses_untyped_primitives() {
        let data: EventData =
            serde_json::from_value(json!({ "on": true, "n": 4, "x": 1.5, "s": "hi" }))
                .expect("parse");
        assert_eq!(data.get("on"), Some(&Primitive::Bool(true)));
        assert_eq!(data.get("n"), Some(&Primitive::Int(4)));
        assert_eq!(data.get("x"), Some(&Primitive::Float(1.5)));
        assert_eq!(data.get("s"), Some(&Primitive::Text("hi".into())));
        assert_eq!(data.len(), 4);
    }

    #[test]
    fn pointer_events_targetability() {
        assert!(PointerEvents::Auto.allows_target());
        assert!(PointerEvents::BoxOnly.allows_target());
        assert!(!PointerEvents::None.allows_target());
        assert!(!PointerEvents::BoxNone.allows_target());
    }

    #[test]
    fn pointer_events_use_host_spelling() {
        let parsed: PointerEvents = serde_json::from_value(json!("box-none")).expect("parse");
        assert_eq!(parsed, PointerEvents::BoxNone);
        assert_eq!(PointerEvents::default(), PointerEvents::Auto);
    }

    #[test]
    fn handler_names_follow_on_prefix() {
        assert_eq!(PressKind::Press.handler_name(), "onPress");
        assert_eq!(PressKind::LongPress.handler_name(), "onLongPress");
    }
}
