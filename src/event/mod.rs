// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry events published on `smartproduct/event/<device id>`.
//!
//! # Examples
//!
//! ```
//! use smartproduct_sim::event::{EventType, TelemetryEvent};
//! use smartproduct_sim::types::PowerStatus;
//!
//! let event = TelemetryEvent::new(
//!     "device-1",
//!     EventType::Info,
//!     "Power status is changed by user",
//!     Some(PowerStatus::Ac.into()),
//! );
//! assert_eq!(event.details.sensor_id, "sensor-id");
//! ```

mod telemetry_event;

pub use telemetry_event::{
    EventDetails, EventType, EventValue, SENSOR_ID, SENSOR_NAME, TelemetryEvent,
};
