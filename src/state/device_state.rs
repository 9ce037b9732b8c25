// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use serde::Serialize;

use crate::types::{PowerStatus, Temperature};

use super::StateChange;

/// Default starting temperature for both the reading and the setpoint.
pub const DEFAULT_TEMPERATURE: f64 = 71.5;

/// In-memory state of the simulated thermostat.
///
/// There is exactly one authoritative copy per simulated device. It is owned
/// by the [`Simulator`](crate::simulator::Simulator) and only mutated through
/// [`DeviceState::apply`] and the acknowledgment flag accessors.
///
/// # Examples
///
/// ```
/// use smartproduct_sim::state::{DeviceState, StateChange};
/// use smartproduct_sim::types::{PowerStatus, Temperature};
///
/// let mut state = DeviceState::default();
/// assert_eq!(state.power_status(), PowerStatus::Off);
/// assert_eq!(state.actual_temperature().value(), 71.5);
///
/// state.apply(&StateChange::TargetTemperature(Temperature::new(85.0).unwrap()));
/// assert_eq!(state.target_temperature().value(), 85.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    power_status: PowerStatus,
    actual_temperature: Temperature,
    target_temperature: Temperature,
    /// A user change was applied and the next command must be acknowledged.
    pending_ack: bool,
}

impl DeviceState {
    /// Creates a state with the given mode and a reading equal to the setpoint.
    #[must_use]
    pub fn new(power_status: PowerStatus, temperature: Temperature) -> Self {
        Self {
            power_status,
            actual_temperature: temperature,
            target_temperature: temperature,
            pending_ack: false,
        }
    }

    /// Returns the current operating mode.
    #[must_use]
    pub fn power_status(&self) -> PowerStatus {
        self.power_status
    }

    /// Returns the simulated sensor reading.
    #[must_use]
    pub fn actual_temperature(&self) -> Temperature {
        self.actual_temperature
    }

    /// Returns the setpoint.
    #[must_use]
    pub fn target_temperature(&self) -> Temperature {
        self.target_temperature
    }

    /// Returns `true` if a command acknowledgment is owed.
    #[must_use]
    pub fn pending_ack(&self) -> bool {
        self.pending_ack
    }

    /// Marks that the next received command must be acknowledged.
    pub fn request_ack(&mut self) {
        self.pending_ack = true;
    }

    /// Clears the acknowledgment flag, returning its previous value.
    pub fn take_ack(&mut self) -> bool {
        std::mem::take(&mut self.pending_ack)
    }

    /// Returns the reportable fields as an immutable snapshot.
    #[must_use]
    pub fn report(&self) -> ShadowReport {
        ShadowReport {
            power_status: self.power_status,
            actual_temperature: self.actual_temperature,
            target_temperature: self.target_temperature,
        }
    }

    /// Applies a state change.
    ///
    /// Returns `true` if the state actually changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::PowerStatus(status) => {
                let changed = self.power_status != *status;
                self.power_status = *status;
                changed
            }
            StateChange::TargetTemperature(t) => {
                let changed = self.target_temperature != *t;
                self.target_temperature = *t;
                changed
            }
            StateChange::ActualTemperature(t) => {
                let changed = self.actual_temperature != *t;
                self.actual_temperature = *t;
                changed
            }
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new(PowerStatus::Off, Temperature::new(DEFAULT_TEMPERATURE).unwrap_or_default())
    }
}

/// Snapshot of the reported fields of a [`DeviceState`].
///
/// Serializes to the body of a shadow `reported` or `desired` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowReport {
    /// Operating mode.
    pub power_status: PowerStatus,
    /// Simulated sensor reading.
    pub actual_temperature: Temperature,
    /// Setpoint.
    pub target_temperature: Temperature,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp(v: f64) -> Temperature {
        Temperature::new(v).unwrap()
    }

    #[test]
    fn default_state() {
        let state = DeviceState::default();
        assert_eq!(state.power_status(), PowerStatus::Off);
        assert_eq!(state.actual_temperature(), temp(71.5));
        assert_eq!(state.target_temperature(), temp(71.5));
        assert!(!state.pending_ack());
    }

    #[test]
    fn apply_power_change() {
        let mut state = DeviceState::default();
        let change = StateChange::PowerStatus(PowerStatus::Ac);

        assert!(state.apply(&change));
        assert_eq!(state.power_status(), PowerStatus::Ac);

        // Applying same status returns false
        assert!(!state.apply(&change));
    }

    #[test]
    fn apply_temperatures() {
        let mut state = DeviceState::default();

        assert!(state.apply(&StateChange::TargetTemperature(temp(80.0))));
        assert!(state.apply(&StateChange::ActualTemperature(temp(72.0))));
        assert_eq!(state.target_temperature(), temp(80.0));
        assert_eq!(state.actual_temperature(), temp(72.0));
        assert!(!state.apply(&StateChange::TargetTemperature(temp(80.0))));
    }

    #[test]
    fn apply_reports_only_real_changes() {
        let mut state = DeviceState::default();
        let changes = [
            StateChange::PowerStatus(PowerStatus::Heat),
            StateChange::TargetTemperature(temp(71.5)),
        ];

        let changed: Vec<bool> = changes.iter().map(|c| state.apply(c)).collect();
        assert_eq!(changed, vec![true, false]);
        assert_eq!(state.power_status(), PowerStatus::Heat);
        assert!(changes.iter().all(|c| !state.apply(c)));
    }

    #[test]
    fn apply_does_not_touch_ack_flag() {
        let mut state = DeviceState::default();
        state.apply(&StateChange::PowerStatus(PowerStatus::Heat));
        assert!(!state.pending_ack());
    }

    #[test]
    fn ack_flag_round_trip() {
        let mut state = DeviceState::default();
        state.request_ack();
        assert!(state.pending_ack());
        assert!(state.take_ack());
        assert!(!state.pending_ack());
        assert!(!state.take_ack());
    }

    #[test]
    fn report_serializes_camel_case() {
        let state = DeviceState::new(PowerStatus::Heat, temp(70.25));
        let json = serde_json::to_value(state.report()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "powerStatus": "HEAT",
                "actualTemperature": 70.25,
                "targetTemperature": 70.25,
            })
        );
    }
}
