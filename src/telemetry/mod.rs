// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Telemetry generation.
//!
//! - [`drift`] evolves the simulated reading once per publish interval
//! - [`Band`] and [`classify`] place a reading relative to the target and
//!   produce warning/error events
//! - [`TelemetryMessage`] is the payload published every interval

mod drift;
mod message;
mod threshold;

pub use drift::{Coin, RandomCoin, drift};
pub use message::TelemetryMessage;
pub use threshold::{Band, Classification, ERROR_OFFSET, WARNING_OFFSET, classify};
