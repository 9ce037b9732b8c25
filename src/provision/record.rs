// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device reference record.

use serde::{Deserialize, Serialize};

/// Model number assigned to newly provisioned devices.
pub const DEFAULT_MODEL_NUMBER: &str = "test-model";

/// Product details of a device model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDetails {
    /// Marketing model name.
    pub model: String,
    /// Cooling capacity range.
    pub capacity: String,
    /// Electrical requirement.
    pub requirement: String,
    /// Cooling efficiency rating.
    pub cooling_efficiency: String,
    /// Heating efficiency rating.
    pub heating_efficiency: String,
}

impl Default for ModelDetails {
    fn default() -> Self {
        Self {
            model: "INFINITY 19 HEAT PUMP".to_string(),
            capacity: "2-5 ton".to_string(),
            requirement: "208-230 V".to_string(),
            cooling_efficiency: "Up to 19 SEER".to_string(),
            heating_efficiency: "Up to 10 HSPF".to_string(),
        }
    }
}

/// What the reference table stores about one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    /// Serial number, also the thing name.
    pub device_id: String,
    /// Model number.
    pub model_number: String,
    /// Model details.
    pub details: ModelDetails,
}

impl DeviceRecord {
    /// Creates a record with the default model.
    #[must_use]
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            model_number: DEFAULT_MODEL_NUMBER.to_string(),
            details: ModelDetails::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(DeviceRecord::new("abc")).unwrap();
        assert_eq!(json["deviceId"], "abc");
        assert_eq!(json["modelNumber"], "test-model");
        assert_eq!(json["details"]["coolingEfficiency"], "Up to 19 SEER");
        assert_eq!(json["details"]["heatingEfficiency"], "Up to 10 HSPF");
    }
}
