// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! The [`DeviceState`] struct holds the thermostat's power status, actual
//! and target temperature and the pending-acknowledgment flag, while
//! [`StateChange`] represents individual changes that can be applied.
//!
//! # Examples
//!
//! ```
//! use smartproduct_sim::state::{DeviceState, StateChange};
//! use smartproduct_sim::types::PowerStatus;
//!
//! let mut state = DeviceState::default();
//!
//! let change = StateChange::PowerStatus(PowerStatus::Ac);
//! state.apply(&change);
//!
//! assert_eq!(state.power_status(), PowerStatus::Ac);
//! ```

mod device_state;
mod state_change;

pub use device_state::{DEFAULT_TEMPERATURE, DeviceState, ShadowReport};
pub use state_change::StateChange;
