// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device shadow client over MQTT.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, Transport};
use tokio::sync::mpsc;

use super::{ClientToken, ShadowTransport, TransportEvent, UpdateStatus};
use crate::error::ProtocolError;
use crate::settings::{CredentialPaths, Settings};

/// Time after which an unanswered shadow update no longer blocks new ones.
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Pause between polls after a connection error.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Capacity of the transport event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Shadow topics of one thing.
///
/// Uses the AWS IoT shadow topic structure:
/// - Updates: `$aws/things/<thing>/shadow/update`
/// - Deltas: `$aws/things/<thing>/shadow/update/delta`
/// - Responses: `$aws/things/<thing>/shadow/update/accepted|rejected`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowTopics {
    /// Topic update documents are published on.
    pub update: String,
    /// Topic deltas arrive on.
    pub delta: String,
    /// Topic accepted responses arrive on.
    pub accepted: String,
    /// Topic rejected responses arrive on.
    pub rejected: String,
}

/// Kind of an incoming shadow message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShadowMessage {
    Delta,
    Response(UpdateStatus),
}

impl ShadowTopics {
    /// Builds the shadow topics for `thing`.
    #[must_use]
    pub fn new(thing: &str) -> Self {
        let update = format!("$aws/things/{thing}/shadow/update");
        Self {
            delta: format!("{update}/delta"),
            accepted: format!("{update}/accepted"),
            rejected: format!("{update}/rejected"),
            update,
        }
    }

    /// Splits an incoming shadow topic into thing name and message kind.
    fn parse(topic: &str) -> Option<(&str, ShadowMessage)> {
        let rest = topic.strip_prefix("$aws/things/")?;
        let (thing, suffix) = rest.split_once("/shadow/update/")?;
        let kind = match suffix {
            "delta" => ShadowMessage::Delta,
            "accepted" => ShadowMessage::Response(UpdateStatus::Accepted),
            "rejected" => ShadowMessage::Response(UpdateStatus::Rejected),
            _ => return None,
        };
        Some((thing, kind))
    }
}

#[derive(Debug)]
struct PendingUpdate {
    token: ClientToken,
    sent_at: Instant,
}

type PendingUpdates = Arc<Mutex<HashMap<String, PendingUpdate>>>;

/// Shadow client for one device connection.
///
/// Requests are queued on the `rumqttc` client without waiting; broker
/// notifications are forwarded as [`TransportEvent`]s by a background task.
///
/// # Examples
///
/// ```ignore
/// use smartproduct_sim::protocol::MqttShadowClientBuilder;
///
/// let (client, events) = MqttShadowClientBuilder::new()
///     .host("abc123-ats.iot.eu-west-1.amazonaws.com")
///     .client_id("device-1")
///     .build()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct MqttShadowClient {
    client: AsyncClient,
    pending: PendingUpdates,
    operation_timeout: Duration,
    events_tx: mpsc::Sender<TransportEvent>,
}

impl MqttShadowClient {
    /// Creates a client from simulator settings.
    ///
    /// # Errors
    ///
    /// Returns error if a credential file cannot be read.
    pub async fn connect(
        settings: &Settings,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>), ProtocolError> {
        let mut builder = MqttShadowClientBuilder::new()
            .host(&settings.host)
            .port(settings.port)
            .client_id(&settings.device_id);
        if settings.tls {
            builder = builder.credentials(settings.credentials.clone());
        }
        builder.build().await
    }
}

impl ShadowTransport for MqttShadowClient {
    fn register(&mut self, thing: &str) -> Result<(), ProtocolError> {
        let topics = ShadowTopics::new(thing);
        for topic in [&topics.delta, &topics.accepted, &topics.rejected] {
            tracing::debug!(topic = %topic, "Subscribing to shadow topic");
            self.client.try_subscribe(topic.as_str(), QoS::AtLeastOnce)?;
        }
        Ok(())
    }

    fn update(
        &mut self,
        thing: &str,
        document: &serde_json::Value,
    ) -> Result<Option<ClientToken>, ProtocolError> {
        let mut pending = self.pending.lock();

        if let Some(previous) = pending.get(thing) {
            if previous.sent_at.elapsed() < self.operation_timeout {
                tracing::debug!(thing = %thing, token = %previous.token, "Shadow update still in flight");
                return Ok(None);
            }
            tracing::warn!(thing = %thing, token = %previous.token, "Shadow update timed out");
            let timeout = TransportEvent::Status {
                thing: thing.to_string(),
                status: UpdateStatus::Timeout,
                token: Some(previous.token.clone()),
                document: serde_json::Value::Null,
            };
            if let Err(e) = self.events_tx.try_send(timeout) {
                tracing::debug!(error = %e, "Could not deliver shadow update timeout");
            }
        }

        let token = ClientToken::generate();
        let mut body = document.clone();
        if let Some(object) = body.as_object_mut() {
            object.insert(
                "clientToken".to_string(),
                serde_json::Value::String(token.to_string()),
            );
        }
        let payload = serde_json::to_vec(&body)?;

        let topic = ShadowTopics::new(thing).update;
        self.client
            .try_publish(topic.as_str(), QoS::AtLeastOnce, false, payload)?;

        pending.insert(
            thing.to_string(),
            PendingUpdate {
                token: token.clone(),
                sent_at: Instant::now(),
            },
        );
        Ok(Some(token))
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), ProtocolError> {
        tracing::debug!(topic = %topic, "Subscribing");
        self.client
            .try_subscribe(topic, QoS::AtLeastOnce)
            .map_err(ProtocolError::Mqtt)
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
        tracing::trace!(topic = %topic, payload = %payload, "Publishing MQTT message");
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload.as_bytes().to_vec())
            .map_err(ProtocolError::Mqtt)
    }
}

/// Builder for creating an [`MqttShadowClient`] with custom configuration.
#[derive(Debug, Default)]
pub struct MqttShadowClientBuilder {
    host: Option<String>,
    port: Option<u16>,
    client_id: Option<String>,
    credentials: Option<CredentialPaths>,
    keep_alive: Option<Duration>,
    operation_timeout: Option<Duration>,
}

impl MqttShadowClientBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the broker host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the broker port (default 8883 with TLS, 1883 without).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the MQTT client id.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Enables mutual TLS with the given credential files.
    #[must_use]
    pub fn credentials(mut self, credentials: CredentialPaths) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = Some(duration);
        self
    }

    /// Sets how long an unanswered shadow update blocks new ones.
    #[must_use]
    pub fn operation_timeout(mut self, duration: Duration) -> Self {
        self.operation_timeout = Some(duration);
        self
    }

    /// Builds the client and spawns its event loop.
    ///
    /// Returns the client and the receiver of its transport events. The
    /// connection is established in the background; a
    /// [`TransportEvent::Connected`] is delivered once it is up.
    ///
    /// # Errors
    ///
    /// Returns error if required fields are missing or a credential file
    /// cannot be read.
    pub async fn build(
        self,
    ) -> Result<(MqttShadowClient, mpsc::Receiver<TransportEvent>), ProtocolError> {
        let host = self
            .host
            .ok_or_else(|| ProtocolError::InvalidAddress("host is required".to_string()))?;
        let client_id = self
            .client_id
            .ok_or_else(|| ProtocolError::InvalidAddress("client_id is required".to_string()))?;

        let default_port = if self.credentials.is_some() { 8883 } else { 1883 };
        let port = self.port.unwrap_or(default_port);

        let mut mqtt_options = MqttOptions::new(&client_id, host.as_str(), port);
        mqtt_options.set_keep_alive(self.keep_alive.unwrap_or(Duration::from_secs(30)));
        mqtt_options.set_clean_session(true);

        if let Some(credentials) = &self.credentials {
            let ca = read_credential(&credentials.ca_path).await?;
            let cert = read_credential(&credentials.cert_path).await?;
            let key = read_credential(&credentials.key_path).await?;
            mqtt_options.set_transport(Transport::tls(ca, Some((cert, key)), None));
        }

        tracing::info!(host = %host, port, client_id = %client_id, tls = self.credentials.is_some(), "Connecting to broker");

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let pending = PendingUpdates::default();

        let pending_clone = Arc::clone(&pending);
        let loop_tx = events_tx.clone();
        tokio::spawn(async move {
            handle_mqtt_events(event_loop, loop_tx, pending_clone).await;
        });

        Ok((
            MqttShadowClient {
                client,
                pending,
                operation_timeout: self.operation_timeout.unwrap_or(DEFAULT_OPERATION_TIMEOUT),
                events_tx,
            },
            events_rx,
        ))
    }
}

async fn read_credential(path: &Path) -> Result<Vec<u8>, ProtocolError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ProtocolError::Credential {
            path: path.to_path_buf(),
            source,
        })
}

/// Polls the MQTT event loop and forwards notifications.
///
/// Runs until the event receiver is dropped. Connection errors are logged
/// and polling resumes after a short pause, which lets `rumqttc` reconnect.
async fn handle_mqtt_events(
    mut event_loop: EventLoop,
    events_tx: mpsc::Sender<TransportEvent>,
    pending: PendingUpdates,
) {
    let mut connected = false;

    loop {
        let event = match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::info!(?connack, "MQTT connected");
                connected = true;
                Some(TransportEvent::Connected)
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
                None
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::trace!(topic = %publish.topic, "Received MQTT message");
                Some(classify_publish(&publish.topic, publish.payload.to_vec(), &pending))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::error!(error = %e, "MQTT event loop error");
                let lost = std::mem::take(&mut connected);
                if lost && events_tx.send(TransportEvent::Disconnected).await.is_err() {
                    break;
                }
                tokio::time::sleep(RECONNECT_BACKOFF).await;
                continue;
            }
        };

        if let Some(event) = event
            && events_tx.send(event).await.is_err()
        {
            tracing::debug!("Transport event receiver dropped, stopping MQTT event loop");
            break;
        }
    }
}

/// Turns an incoming publish into a transport event.
fn classify_publish(topic: &str, payload: Vec<u8>, pending: &PendingUpdates) -> TransportEvent {
    match ShadowTopics::parse(topic) {
        Some((thing, ShadowMessage::Delta)) => TransportEvent::Delta {
            thing: thing.to_string(),
            payload,
        },
        Some((thing, ShadowMessage::Response(status))) => {
            let document: serde_json::Value =
                serde_json::from_slice(&payload).unwrap_or(serde_json::Value::Null);
            let token = document
                .get("clientToken")
                .and_then(serde_json::Value::as_str)
                .map(ClientToken::new);

            let mut pending = pending.lock();
            if pending
                .get(thing)
                .is_some_and(|p| Some(&p.token) == token.as_ref())
            {
                pending.remove(thing);
            }

            TransportEvent::Status {
                thing: thing.to_string(),
                status,
                token,
                document,
            }
        }
        None => TransportEvent::Message {
            topic: topic.to_string(),
            payload,
        },
    }
}
