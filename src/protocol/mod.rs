// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport seam between the simulator and the broker.
//!
//! The simulator never talks to MQTT directly. It drives a
//! [`ShadowTransport`] and consumes [`TransportEvent`]s from a channel.
//!
//! # Transports
//!
//! - [`MqttShadowClient`]: AWS IoT style shadow client over `rumqttc`
//! - [`MemoryTransport`]: in-process transport that records every call

mod memory;
#[cfg(feature = "mqtt")]
mod mqtt;

pub use memory::{MemoryTransport, TransportCall};
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttShadowClient, MqttShadowClientBuilder, ShadowTopics};

use std::fmt;

use crate::error::ProtocolError;

/// Prefix shared by all application topics.
pub const TOPIC_ROOT: &str = "smartproduct";

/// Application topics of one device.
///
/// # Examples
///
/// ```
/// use smartproduct_sim::protocol::Topics;
///
/// let topics = Topics::new("abc");
/// assert_eq!(topics.telemetry(), "smartproduct/telemetry/abc");
/// assert_eq!(topics.commands(), "smartproduct/commands/abc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    telemetry: String,
    event: String,
    commands: String,
}

impl Topics {
    /// Builds the topics for `device_id`.
    #[must_use]
    pub fn new(device_id: &str) -> Self {
        Self {
            telemetry: format!("{TOPIC_ROOT}/telemetry/{device_id}"),
            event: format!("{TOPIC_ROOT}/event/{device_id}"),
            commands: format!("{TOPIC_ROOT}/commands/{device_id}"),
        }
    }

    /// Topic telemetry messages are published on.
    #[must_use]
    pub fn telemetry(&self) -> &str {
        &self.telemetry
    }

    /// Topic events are published on.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Topic commands arrive on and acknowledgments are published to.
    #[must_use]
    pub fn commands(&self) -> &str {
        &self.commands
    }
}

/// Correlation token of a shadow update request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientToken(String);

impl ClientToken {
    /// Creates a token from a string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Creates a random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a shadow update reported by the shadow service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Update was applied.
    Accepted,
    /// Update was refused.
    Rejected,
    /// No response arrived within the operation timeout.
    Timeout,
}

impl UpdateStatus {
    /// Returns the status name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notification delivered by a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Connection to the broker established (or re-established).
    Connected,
    /// Connection to the broker lost.
    Disconnected,
    /// Response to a shadow update.
    Status {
        /// Thing the update was for.
        thing: String,
        /// Outcome.
        status: UpdateStatus,
        /// Token of the request, if the response carried one.
        token: Option<ClientToken>,
        /// Response document.
        document: serde_json::Value,
    },
    /// Desired state differs from reported state.
    Delta {
        /// Thing the delta is for.
        thing: String,
        /// Raw delta document.
        payload: Vec<u8>,
    },
    /// Message on a subscribed application topic.
    Message {
        /// Topic the message arrived on.
        topic: String,
        /// Raw payload.
        payload: Vec<u8>,
    },
}

/// Publish/subscribe transport with device-shadow semantics.
///
/// All operations are fire-and-forget: they queue the request and return
/// without waiting for the broker.
pub trait ShadowTransport {
    /// Starts listening for shadow deltas and update responses of `thing`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the subscriptions cannot be queued.
    fn register(&mut self, thing: &str) -> Result<(), ProtocolError>;

    /// Sends a shadow update document for `thing`.
    ///
    /// Returns `None` when the update was not sent because a previous one is
    /// still in flight.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the document cannot be encoded or queued.
    fn update(
        &mut self,
        thing: &str,
        document: &serde_json::Value,
    ) -> Result<Option<ClientToken>, ProtocolError>;

    /// Subscribes to an application topic.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the subscription cannot be queued.
    fn subscribe(&mut self, topic: &str) -> Result<(), ProtocolError>;

    /// Publishes `payload` on `topic`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the message cannot be queued.
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), ProtocolError>;
}
