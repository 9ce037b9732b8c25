// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A finite temperature reading rounded to two decimal places.
///
/// Every constructor rounds, so two temperatures that print the same also
/// compare equal.
///
/// # Examples
///
/// ```
/// use smartproduct_sim::types::Temperature;
///
/// let t = Temperature::new(71.456).unwrap();
/// assert_eq!(t.value(), 71.46);
/// assert!(Temperature::new(f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Temperature(f64);

impl Temperature {
    /// Creates a temperature, rounding to two decimals.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NonFiniteTemperature` for NaN or infinite input.
    pub fn new(value: f64) -> Result<Self, ValueError> {
        let rounded = round2(value);
        if rounded.is_finite() {
            Ok(Self(rounded))
        } else {
            Err(ValueError::NonFiniteTemperature(value))
        }
    }

    /// Returns the temperature as a float.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Returns this temperature shifted by `delta`, rounded to two decimals.
    ///
    /// A shift that would leave the finite range keeps the current value.
    #[must_use]
    pub fn offset(self, delta: f64) -> Self {
        Self::new(self.0 + delta).unwrap_or(self)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Temperature {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Temperature> for f64 {
    fn from(t: Temperature) -> Self {
        t.0
    }
}

/// Rounds to two decimals. Magnitudes too large to scale have no
/// fractional part and are returned as is.
fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}
