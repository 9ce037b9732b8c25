// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsing and reconciliation of shadow delta documents.

use serde_json::Value;

use crate::error::ParseError;
use crate::state::{DeviceState, StateChange};
use crate::types::{PowerStatus, Temperature};

const POWER_STATUS: &str = "powerStatus";
const TARGET_TEMPERATURE: &str = "targetTemperature";

/// Fields of a delta document the simulator understands.
///
/// Absent fields mean "no change requested". Unknown fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DesiredState {
    /// Requested operating mode.
    pub power_status: Option<PowerStatus>,
    /// Requested setpoint.
    pub target_temperature: Option<Temperature>,
}

impl DesiredState {
    /// Parses a raw delta payload (`{"state": {...}, "version": ..}`).
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the payload is not JSON, lacks a `state`
    /// object, or carries a field with an unusable value.
    pub fn parse(payload: &[u8]) -> Result<Self, ParseError> {
        let document: Value = serde_json::from_slice(payload)?;
        Self::from_document(&document)
    }

    /// Extracts the desired fields from an already decoded delta document.
    ///
    /// Every field is validated before anything is returned, so a document
    /// with one bad field yields no changes at all.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` on a missing `state` object or an invalid field.
    ///
    /// # Examples
    ///
    /// ```
    /// use smartproduct_sim::shadow::DesiredState;
    /// use smartproduct_sim::types::PowerStatus;
    ///
    /// let doc = serde_json::json!({"state": {"powerStatus": "AC", "targetTemperature": "68"}});
    /// let desired = DesiredState::from_document(&doc).unwrap();
    /// assert_eq!(desired.power_status, Some(PowerStatus::Ac));
    /// assert_eq!(desired.target_temperature.unwrap().value(), 68.0);
    /// ```
    pub fn from_document(document: &Value) -> Result<Self, ParseError> {
        let state = document
            .get("state")
            .and_then(Value::as_object)
            .ok_or_else(|| ParseError::MissingField("state".to_string()))?;

        let power_status = match state.get(POWER_STATUS) {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_power_status(value)?),
        };

        let target_temperature = match state.get(TARGET_TEMPERATURE) {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_temperature(value)?),
        };

        Ok(Self {
            power_status,
            target_temperature,
        })
    }

    /// Returns `true` if no understood field is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.power_status.is_none() && self.target_temperature.is_none()
    }

    /// Returns the changes needed to bring `state` to this desired state.
    ///
    /// Fields equal to the local value produce no change. Power status is
    /// listed before the target temperature.
    #[must_use]
    pub fn reconcile(&self, state: &DeviceState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if let Some(status) = self.power_status
            && status != state.power_status()
        {
            changes.push(StateChange::PowerStatus(status));
        }

        if let Some(target) = self.target_temperature
            && target != state.target_temperature()
        {
            changes.push(StateChange::TargetTemperature(target));
        }

        changes
    }
}

fn parse_power_status(value: &Value) -> Result<PowerStatus, ParseError> {
    let text = value.as_str().ok_or_else(|| invalid(POWER_STATUS, value, "expected a string"))?;
    text.parse::<PowerStatus>()
        .map_err(|e| invalid(POWER_STATUS, value, &e.to_string()))
}

fn parse_temperature(value: &Value) -> Result<Temperature, ParseError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid(TARGET_TEMPERATURE, value, "expected a number"))?;

    Temperature::new(number).map_err(|e| invalid(TARGET_TEMPERATURE, value, &e.to_string()))
}

fn invalid(field: &str, value: &Value, reason: &str) -> ParseError {
    ParseError::InvalidValue {
        field: field.to_string(),
        message: format!("{reason}, got {value}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn t(v: f64) -> Temperature {
        Temperature::new(v).unwrap()
    }

    #[test]
    fn parses_partial_documents() {
        let only_power = DesiredState::parse(br#"{"state":{"powerStatus":"HEAT"},"version":7}"#)
            .unwrap();
        assert_eq!(only_power.power_status, Some(PowerStatus::Heat));
        assert_eq!(only_power.target_temperature, None);

        let only_target = DesiredState::parse(br#"{"state":{"targetTemperature":72.25}}"#).unwrap();
        assert_eq!(only_target.power_status, None);
        assert_eq!(only_target.target_temperature, Some(t(72.25)));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let desired = DesiredState::parse(br#"{"state":{"fanSpeed":3}}"#).unwrap();
        assert!(desired.is_empty());
    }

    #[test]
    fn accepts_numeric_strings() {
        let desired = DesiredState::parse(br#"{"state":{"targetTemperature":"85"}}"#).unwrap();
        assert_eq!(desired.target_temperature, Some(t(85.0)));
    }

    #[test]
    fn rejects_non_numeric_target() {
        let err = DesiredState::parse(br#"{"state":{"targetTemperature":"warm"}}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { ref field, .. } if field == "targetTemperature"));

        assert!(DesiredState::parse(br#"{"state":{"targetTemperature":"NaN"}}"#).is_err());
        assert!(DesiredState::parse(br#"{"state":{"targetTemperature":true}}"#).is_err());
    }

    #[test]
    fn huge_target_is_kept_finite() {
        let desired = DesiredState::parse(br#"{"state":{"targetTemperature":1e307}}"#).unwrap();
        let target = desired.target_temperature.unwrap();
        assert!(target.value().is_finite());
        assert_eq!(target.value(), 1e307);

        let json = serde_json::to_value(target).unwrap();
        assert!(json.is_number());

        assert!(DesiredState::parse(br#"{"state":{"targetTemperature":"1e400"}}"#).is_err());
    }

    #[test]
    fn rejects_unknown_power_status() {
        let err = DesiredState::parse(br#"{"state":{"powerStatus":"FAN"}}"#).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { ref field, .. } if field == "powerStatus"));

        assert!(DesiredState::parse(br#"{"state":{"powerStatus":1}}"#).is_err());
    }

    #[test]
    fn one_bad_field_rejects_whole_document() {
        let doc = json!({"state": {"powerStatus": "AC", "targetTemperature": "hot"}});
        assert!(DesiredState::from_document(&doc).is_err());
    }

    #[test]
    fn rejects_missing_state() {
        let err = DesiredState::parse(br#"{"version":1}"#).unwrap_err();
        assert!(matches!(err, ParseError::MissingField(_)));

        assert!(matches!(
            DesiredState::parse(b"not json").unwrap_err(),
            ParseError::Json(_)
        ));
    }

    #[test]
    fn reconcile_skips_unchanged_fields() {
        let state = DeviceState::default();
        let desired = DesiredState {
            power_status: Some(PowerStatus::Off),
            target_temperature: Some(t(71.5)),
        };
        assert!(desired.reconcile(&state).is_empty());
    }

    #[test]
    fn reconcile_orders_power_first() {
        let state = DeviceState::default();
        let desired = DesiredState {
            power_status: Some(PowerStatus::Ac),
            target_temperature: Some(t(65.0)),
        };
        assert_eq!(
            desired.reconcile(&state),
            vec![
                StateChange::PowerStatus(PowerStatus::Ac),
                StateChange::TargetTemperature(t(65.0)),
            ]
        );
    }
}
