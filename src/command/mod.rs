// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote commands and their acknowledgments.
//!
//! Commands arrive on `smartproduct/commands/<device id>`. A command is
//! acknowledged only while the device owes an acknowledgment for a change
//! applied from a shadow delta; the acknowledgment is published back on the
//! same topic.
//!
//! # Examples
//!
//! ```
//! use smartproduct_sim::command::{CommandAck, CommandMessage};
//!
//! let command = CommandMessage::parse(br#"{"commandId":"cmd-1"}"#).unwrap();
//! let ack = CommandAck::success(&command, "device-1");
//! assert_eq!(ack.command_id, serde_json::json!("cmd-1"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseError;

/// Outcome string used for both `reason` and `status` of a successful ack.
pub const SUCCESS: &str = "success";

/// An incoming command.
///
/// Only the identifier is read; any other fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandMessage {
    /// Command identifier, echoed unchanged in the acknowledgment.
    #[serde(default)]
    pub command_id: Value,
}

impl CommandMessage {
    /// Parses a command payload.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if the payload is not a JSON object.
    pub fn parse(payload: &[u8]) -> Result<Self, ParseError> {
        serde_json::from_slice(payload).map_err(Into::into)
    }
}

/// Acknowledgment published for a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAck {
    /// Identifier of the acknowledged command.
    pub command_id: Value,
    /// Acknowledging device.
    pub device_id: String,
    /// Human readable reason.
    pub reason: String,
    /// Outcome.
    pub status: String,
}

impl CommandAck {
    /// Creates a successful acknowledgment for `command`.
    #[must_use]
    pub fn success(command: &CommandMessage, device_id: &str) -> Self {
        Self {
            command_id: command.command_id.clone(),
            device_id: device_id.to_string(),
            reason: SUCCESS.to_string(),
            status: SUCCESS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_command_id() {
        let cmd = CommandMessage::parse(br#"{"commandId":"abc","action":"reboot"}"#).unwrap();
        assert_eq!(cmd.command_id, json!("abc"));
    }

    #[test]
    fn numeric_command_id_is_preserved() {
        let cmd = CommandMessage::parse(br#"{"commandId":42}"#).unwrap();
        let ack = CommandAck::success(&cmd, "dev");
        assert_eq!(serde_json::to_value(&ack).unwrap()["commandId"], 42);
    }

    #[test]
    fn missing_command_id_is_null() {
        let cmd = CommandMessage::parse(b"{}").unwrap();
        assert_eq!(cmd.command_id, Value::Null);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            CommandMessage::parse(b"reboot now"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn ack_layout() {
        let cmd = CommandMessage::parse(br#"{"commandId":"c-1"}"#).unwrap();
        let json = serde_json::to_value(CommandAck::success(&cmd, "dev-9")).unwrap();
        assert_eq!(
            json,
            json!({
                "commandId": "c-1",
                "deviceId": "dev-9",
                "reason": "success",
                "status": "success",
            })
        );
    }
}
