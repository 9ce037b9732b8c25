// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Connection lifecycle tracking.

use std::fmt;

/// Connection state as seen by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Not connected to the broker.
    #[default]
    Disconnected,
    /// Connection attempt in progress.
    Connecting,
    /// Connected to the broker.
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        })
    }
}

/// Connection lifecycle with one-shot timer start.
///
/// The transport owns reconnection and may report `connected` many times;
/// only the first report starts the interval timers.
#[derive(Debug, Default)]
pub struct Connection {
    state: ConnectionState,
    timers_started: bool,
}

impl Connection {
    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Returns `true` once the interval timers have been started.
    #[must_use]
    pub fn timers_started(&self) -> bool {
        self.timers_started
    }

    /// Records that a connection attempt started.
    pub fn connecting(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// Records a successful connection.
    ///
    /// Returns `true` if the timers must be started now.
    pub fn connected(&mut self) -> bool {
        self.state = ConnectionState::Connected;
        !std::mem::replace(&mut self.timers_started, true)
    }

    /// Records a lost connection. Timers keep running.
    pub fn disconnected(&mut self) {
        self.state = ConnectionState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected() {
        let conn = Connection::default();
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert!(!conn.timers_started());
    }

    #[test]
    fn timers_start_once() {
        let mut conn = Connection::default();
        conn.connecting();
        assert_eq!(conn.state(), ConnectionState::Connecting);

        assert!(conn.connected());
        assert_eq!(conn.state(), ConnectionState::Connected);

        conn.disconnected();
        assert_eq!(conn.state(), ConnectionState::Disconnected);

        assert!(!conn.connected());
        assert!(!conn.connected());
        assert!(conn.timers_started());
    }
}
