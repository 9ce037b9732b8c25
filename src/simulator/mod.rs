// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The simulated thermostat and its event loop.
//!
//! [`Simulator`] holds the device state and exposes one handler per
//! stimulus. Handlers return [`Effect`]s instead of calling the transport,
//! so they can be tested without a broker. [`SimulatorRunner`] owns the
//! transport and the timers and feeds every stimulus through a single task.

mod connection;
mod device;
mod runner;

pub use connection::{Connection, ConnectionState};
pub use device::{Effect, POWER_CHANGED_MESSAGE, Simulator, TARGET_CHANGED_MESSAGE};
pub use runner::SimulatorRunner;
