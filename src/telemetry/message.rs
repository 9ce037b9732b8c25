// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic telemetry payload.

use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;

use crate::state::DeviceState;
use crate::types::Temperature;

/// Telemetry message published on `smartproduct/telemetry/<device id>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryMessage {
    /// Creation time as RFC 3339 local time.
    pub created_at: String,
    /// Reporting device.
    pub device_id: String,
    /// Simulated sensor reading.
    pub actual_temperature: Temperature,
    /// Current setpoint.
    pub target_temperature: Temperature,
    /// Send time as RFC 3339 local time.
    pub sent_at: String,
    /// Send time in epoch milliseconds.
    pub timestamp: i64,
}

impl TelemetryMessage {
    /// Builds a telemetry message from the current state at the given time.
    #[must_use]
    pub fn from_state(device_id: &str, state: &DeviceState, time: DateTime<Local>) -> Self {
        let formatted = time.to_rfc3339_opts(SecondsFormat::Secs, false);
        Self {
            created_at: formatted.clone(),
            device_id: device_id.to_string(),
            actual_temperature: state.actual_temperature(),
            target_temperature: state.target_temperature(),
            sent_at: formatted,
            timestamp: time.timestamp_millis(),
        }
    }
}
