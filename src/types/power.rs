// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power status of the simulated thermostat.
//!
//! The power status selects how the simulated temperature drifts between
//! telemetry ticks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Operating mode of the simulated heat pump.
///
/// # Examples
///
/// ```
/// use smartproduct_sim::types::PowerStatus;
///
/// let status: PowerStatus = "HEAT".parse().unwrap();
/// assert_eq!(status, PowerStatus::Heat);
/// assert_eq!(status.as_str(), "HEAT");
/// assert!("FAN".parse::<PowerStatus>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum PowerStatus {
    /// Device is off, temperature drifts passively.
    #[default]
    Off,
    /// Air conditioning is running, temperature falls.
    Ac,
    /// Heating is running, temperature rises.
    Heat,
}

impl PowerStatus {
    /// Returns the wire representation used in shadow documents.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Ac => "AC",
            Self::Heat => "HEAT",
        }
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerStatus {
    type Err = ValueError;

    // Shadow values are case-sensitive, "off" is not a valid status.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OFF" => Ok(Self::Off),
            "AC" => Ok(Self::Ac),
            "HEAT" => Ok(Self::Heat),
            _ => Err(ValueError::InvalidPowerStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for PowerStatus {
    type Error = ValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PowerStatus> for &'static str {
    fn from(status: PowerStatus) -> Self {
        status.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_statuses() {
        assert_eq!("OFF".parse::<PowerStatus>().unwrap(), PowerStatus::Off);
        assert_eq!("AC".parse::<PowerStatus>().unwrap(), PowerStatus::Ac);
        assert_eq!("HEAT".parse::<PowerStatus>().unwrap(), PowerStatus::Heat);
    }

    #[test]
    fn rejects_unknown_status() {
        let err = "COOL".parse::<PowerStatus>().unwrap_err();
        assert_eq!(err, ValueError::InvalidPowerStatus("COOL".to_string()));
        assert!("heat".parse::<PowerStatus>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&PowerStatus::Ac).unwrap();
        assert_eq!(json, "\"AC\"");

        let parsed: PowerStatus = serde_json::from_str("\"HEAT\"").unwrap();
        assert_eq!(parsed, PowerStatus::Heat);

        assert!(serde_json::from_str::<PowerStatus>("\"FAN\"").is_err());
    }

    #[test]
    fn default_is_off() {
        assert_eq!(PowerStatus::default(), PowerStatus::Off);
        assert_eq!(PowerStatus::default().to_string(), "OFF");
    }
}
