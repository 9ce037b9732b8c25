// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry event records published on the event topic.

use std::fmt;

use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;
use uuid::Uuid;

use crate::types::{PowerStatus, Temperature};

/// Sensor identifier reported in every event.
pub const SENSOR_ID: &str = "sensor-id";

/// Sensor display name reported in every event.
pub const SENSOR_NAME: &str = "nice sensor";

/// Severity of a telemetry event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// A user-driven change was applied.
    Info,
    /// Temperature is slightly outside the comfort band.
    Warning,
    /// Temperature is far outside the comfort band.
    Error,
    /// A payload could not be processed.
    Diagnostic,
}

impl EventType {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Diagnostic => "diagnostic",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value carried by an event: a reading or a power status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventValue {
    /// A temperature reading or setpoint.
    Number(f64),
    /// A textual value such as a power status.
    Text(String),
}

impl From<Temperature> for EventValue {
    fn from(t: Temperature) -> Self {
        Self::Number(t.value())
    }
}

impl From<PowerStatus> for EventValue {
    fn from(status: PowerStatus) -> Self {
        Self::Text(status.as_str().to_string())
    }
}

/// Sensor details nested in an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    /// `event_<epoch millis>`.
    pub event_id: String,
    /// Sensor identifier.
    pub sensor_id: &'static str,
    /// Sensor display name.
    pub sensor: &'static str,
    /// Triggering value, absent for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<EventValue>,
}

/// An immutable event emitted by the simulator.
///
/// Events are created synchronously when a threshold band is entered or a
/// user change is applied, published once and then dropped.
///
/// # Examples
///
/// ```
/// use smartproduct_sim::event::{EventType, TelemetryEvent};
/// use smartproduct_sim::types::Temperature;
///
/// let event = TelemetryEvent::new(
///     "device-1",
///     EventType::Error,
///     "Temperature is exceeding upper threshold",
///     Some(Temperature::new(95.0).unwrap().into()),
/// );
/// assert_eq!(event.event_type, EventType::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
    /// Device that produced the event.
    pub device_id: String,
    /// Unique identifier of this event.
    pub message_id: Uuid,
    /// Human readable description.
    pub message: String,
    /// Sensor details and value.
    pub details: EventDetails,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    /// Severity.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Creation time as RFC 3339 local time.
    pub sent_at: String,
}

impl TelemetryEvent {
    /// Creates an event stamped with the current local time.
    #[must_use]
    pub fn new(
        device_id: impl Into<String>,
        event_type: EventType,
        message: impl Into<String>,
        value: Option<EventValue>,
    ) -> Self {
        Self::at(device_id, event_type, message, value, Local::now())
    }

    /// Creates an event stamped with the given time.
    #[must_use]
    pub fn at(
        device_id: impl Into<String>,
        event_type: EventType,
        message: impl Into<String>,
        value: Option<EventValue>,
        time: DateTime<Local>,
    ) -> Self {
        let millis = time.timestamp_millis();
        Self {
            device_id: device_id.into(),
            message_id: Uuid::new_v4(),
            message: message.into(),
            details: EventDetails {
                event_id: format!("event_{millis}"),
                sensor_id: SENSOR_ID,
                sensor: SENSOR_NAME,
                value,
            },
            timestamp: millis,
            event_type,
            sent_at: time.to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }

    /// Creates a diagnostic event describing a processing failure.
    #[must_use]
    pub fn diagnostic(device_id: impl Into<String>, error: &dyn std::error::Error) -> Self {
        Self::new(
            device_id,
            EventType::Diagnostic,
            format!("An error occurred {error}"),
            None,
        )
    }

    /// Returns the triggering value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&EventValue> {
        self.details.value.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn serializes_wire_layout() {
        let time = Local.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let event = TelemetryEvent::at(
            "dev-1",
            EventType::Warning,
            "Temperature is slightly exceeding upper threshold",
            Some(EventValue::Number(88.5)),
            time,
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["deviceId"], "dev-1");
        assert_eq!(json["type"], "warning");
        assert_eq!(json["timestamp"], 1_700_000_000_123_i64);
        assert_eq!(json["details"]["eventId"], "event_1700000000123");
        assert_eq!(json["details"]["sensorId"], "sensor-id");
        assert_eq!(json["details"]["sensor"], "nice sensor");
        assert_eq!(json["details"]["value"], 88.5);
        assert_eq!(json["sentAt"], time.to_rfc3339_opts(SecondsFormat::Secs, false));
        assert!(json["messageId"].is_string());
    }

    #[test]
    fn message_ids_are_unique() {
        let a = TelemetryEvent::new("d", EventType::Info, "m", None);
        let b = TelemetryEvent::new("d", EventType::Info, "m", None);
        assert_ne!(a.message_id, b.message_id);
    }

    #[test]
    fn diagnostic_omits_value() {
        let err = crate::error::ParseError::MissingField("state".to_string());
        let event = TelemetryEvent::diagnostic("d", &err);

        assert_eq!(event.event_type, EventType::Diagnostic);
        assert_eq!(
            event.message,
            "An error occurred missing field in payload: state"
        );
        let json = serde_json::to_value(&event).unwrap();
        assert!(json["details"].get("value").is_none());
    }

    #[test]
    fn power_status_value_is_text() {
        let value: EventValue = PowerStatus::Heat.into();
        assert_eq!(serde_json::to_value(&value).unwrap(), "HEAT");
    }
}
