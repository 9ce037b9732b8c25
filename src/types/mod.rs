// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the simulator.
//!
//! These types enforce the device-state invariants at construction time:
//! a [`PowerStatus`] is always one of the three supported modes and a
//! [`Temperature`] is always finite and rounded to two decimals.

mod power;
mod temperature;

pub use power::PowerStatus;
pub use temperature::Temperature;
