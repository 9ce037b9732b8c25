// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Threshold bands around the target temperature.
//!
//! ```text
//!   COLD  |  CHILLY  |      NICE      |  WARM  |  HOT
//! --------+----------+-------+--------+--------+--------
//!     t-10 (incl)  t-5 (incl)  t   t+5 (incl)  t+10 (incl)
//! ```

use std::fmt;

use crate::event::{EventType, TelemetryEvent};
use crate::types::Temperature;

/// Distance from the target that starts the warning bands.
pub const WARNING_OFFSET: f64 = 5.0;

/// Distance from the target that starts the error bands.
pub const ERROR_OFFSET: f64 = 10.0;

/// Classification of a reading relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// More than 10 degrees above target.
    Hot,
    /// More than 5 and at most 10 degrees above target.
    Warm,
    /// Within 5 degrees of target.
    Nice,
    /// At least 5 (exclusive) and at most 10 degrees below target.
    Chilly,
    /// More than 10 degrees below target.
    Cold,
}

impl Band {
    /// Classifies `actual` against `target`. First match wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use smartproduct_sim::telemetry::Band;
    /// use smartproduct_sim::types::Temperature;
    ///
    /// let t = |v| Temperature::new(v).unwrap();
    /// assert_eq!(Band::classify(t(95.0), t(80.0)), Band::Hot);
    /// assert_eq!(Band::classify(t(90.0), t(80.0)), Band::Warm);
    /// assert_eq!(Band::classify(t(80.0), t(80.0)), Band::Nice);
    /// ```
    #[must_use]
    pub fn classify(actual: Temperature, target: Temperature) -> Self {
        let (actual, target) = (actual.value(), target.value());

        if actual > target + ERROR_OFFSET {
            Self::Hot
        } else if actual > target + WARNING_OFFSET {
            Self::Warm
        } else if actual >= target - ERROR_OFFSET && actual < target - WARNING_OFFSET {
            Self::Chilly
        } else if actual < target - ERROR_OFFSET {
            Self::Cold
        } else {
            Self::Nice
        }
    }

    /// Returns the display label used in console output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Hot => "Danger: HOT",
            Self::Warm => "Warning: WARM",
            Self::Nice => "NICE",
            Self::Chilly => "Warning: CHILLY",
            Self::Cold => "Danger: COLD",
        }
    }

    /// Returns the event severity for this band, `None` inside the comfort band.
    #[must_use]
    pub const fn severity(&self) -> Option<EventType> {
        match self {
            Self::Hot | Self::Cold => Some(EventType::Error),
            Self::Warm | Self::Chilly => Some(EventType::Warning),
            Self::Nice => None,
        }
    }

    /// Returns the event message for this band, `None` inside the comfort band.
    #[must_use]
    pub const fn event_message(&self) -> Option<&'static str> {
        match self {
            Self::Hot => Some("Temperature is exceeding upper threshold"),
            Self::Warm => Some("Temperature is slightly exceeding upper threshold"),
            Self::Chilly => Some("Temperature is slightly dropping under the threshold"),
            Self::Cold => Some("Temperature is dropping under the threshold"),
            Self::Nice => None,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of classifying a reading: the band and, outside the comfort band,
/// the event that must be published.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Band the reading falls in.
    pub band: Band,
    /// Warning or error event carrying the reading.
    pub event: Option<TelemetryEvent>,
}

/// Classifies a reading and builds the matching event in one step.
///
/// Both the label and the event decision come from the same [`Band`], so
/// they can never disagree.
#[must_use]
pub fn classify(device_id: &str, actual: Temperature, target: Temperature) -> Classification {
    let band = Band::classify(actual, target);
    let event = band
        .severity()
        .zip(band.event_message())
        .map(|(severity, message)| {
            TelemetryEvent::new(device_id, severity, message, Some(actual.into()))
        });

    if let Some(event) = &event {
        tracing::debug!(
            band = %band,
            actual = actual.value(),
            target = target.value(),
            severity = %event.event_type,
            "Temperature outside comfort band"
        );
    }

    Classification { band, event }
}
