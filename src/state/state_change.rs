// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the unit of mutation for a
//! [`DeviceState`](super::DeviceState). Drift ticks produce
//! [`StateChange::ActualTemperature`]; shadow deltas produce
//! [`StateChange::PowerStatus`] and [`StateChange::TargetTemperature`].
//!
//! # Examples
//!
//! ```
//! use smartproduct_sim::state::{DeviceState, StateChange};
//! use smartproduct_sim::types::PowerStatus;
//!
//! let mut state = DeviceState::default();
//!
//! // Apply returns true if state actually changed
//! assert!(state.apply(&StateChange::PowerStatus(PowerStatus::Heat)));
//!
//! // Applying the same change again returns false
//! assert!(!state.apply(&StateChange::PowerStatus(PowerStatus::Heat)));
//! ```

use crate::types::{PowerStatus, Temperature};

/// A discrete change to the device state.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// Operating mode changed.
    PowerStatus(PowerStatus),

    /// Setpoint changed.
    TargetTemperature(Temperature),

    /// Simulated sensor reading changed.
    ActualTemperature(Temperature),
}
