// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device-side state machine.

use chrono::Local;

use super::connection::{Connection, ConnectionState};
use crate::command::{CommandAck, CommandMessage};
use crate::error::ValueError;
use crate::event::{EventType, TelemetryEvent};
use crate::protocol::{Topics, UpdateStatus};
use crate::settings::Settings;
use crate::shadow::{DesiredState, ShadowDocument, reported_section};
use crate::state::{DeviceState, StateChange};
use crate::telemetry::{self, Classification, Coin, RandomCoin, TelemetryMessage};
use crate::types::{PowerStatus, Temperature};

/// Message of the event emitted when a delta changes the power status.
pub const POWER_CHANGED_MESSAGE: &str = "Power status is changed by user";

/// Message of the event emitted when a delta changes the target temperature.
pub const TARGET_CHANGED_MESSAGE: &str = "Target temperature is changed by user";

/// Something a handler asks the runner to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Register the thing with the shadow service.
    Register,
    /// Subscribe to an application topic.
    Subscribe(String),
    /// Send a shadow update document.
    UpdateShadow(ShadowDocument),
    /// Publish a telemetry message.
    Telemetry(TelemetryMessage),
    /// Publish an event.
    Event(TelemetryEvent),
    /// Publish a command acknowledgment.
    Acknowledge(CommandAck),
    /// Start the telemetry and status interval timers.
    StartTimers,
}

impl Effect {
    /// Returns the event carried by this effect, if any.
    #[must_use]
    pub fn as_event(&self) -> Option<&TelemetryEvent> {
        match self {
            Self::Event(event) => Some(event),
            _ => None,
        }
    }
}

/// The simulated thermostat.
///
/// Owns the single authoritative [`DeviceState`]. Each handler mutates the
/// state as needed and returns the [`Effect`]s to perform; it never touches
/// the transport itself.
///
/// # Examples
///
/// ```
/// use smartproduct_sim::simulator::Simulator;
///
/// let mut sim = Simulator::new("device-1", Default::default(), 0.5);
/// let effects = sim.on_delta(br#"{"state":{"targetTemperature":"85"}}"#);
///
/// assert_eq!(sim.state().target_temperature().value(), 85.0);
/// assert!(sim.state().pending_ack());
/// assert_eq!(effects.len(), 1);
/// ```
#[derive(Debug)]
pub struct Simulator<C: Coin = RandomCoin> {
    device_id: String,
    topics: Topics,
    state: DeviceState,
    temperature_change: f64,
    coin: C,
    connection: Connection,
}

impl Simulator<RandomCoin> {
    /// Creates a simulator with an OS-seeded random coin.
    #[must_use]
    pub fn new(device_id: impl Into<String>, state: DeviceState, temperature_change: f64) -> Self {
        Self::with_coin(device_id, state, temperature_change, RandomCoin::new())
    }

    /// Creates a simulator from settings, starting `OFF` at the initial
    /// temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError` if the initial temperature is not finite.
    pub fn from_settings(settings: &Settings) -> Result<Self, ValueError> {
        let state = DeviceState::new(
            PowerStatus::Off,
            Temperature::new(settings.initial_temperature)?,
        );
        Ok(Self::new(
            settings.device_id.clone(),
            state,
            settings.temperature_change,
        ))
    }
}

impl<C: Coin> Simulator<C> {
    /// Creates a simulator with the given drift direction source.
    #[must_use]
    pub fn with_coin(
        device_id: impl Into<String>,
        state: DeviceState,
        temperature_change: f64,
        coin: C,
    ) -> Self {
        let device_id = device_id.into();
        Self {
            topics: Topics::new(&device_id),
            device_id,
            state,
            temperature_change,
            coin,
            connection: Connection::default(),
        }
    }

    /// Returns the device id.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the application topics of this device.
    #[must_use]
    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Returns the current device state.
    #[must_use]
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Returns the connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    // ========== Connection Lifecycle ==========

    /// Records that the transport started connecting.
    pub fn on_connecting(&mut self) {
        tracing::info!(device = %self.device_id, "Connecting to broker");
        self.connection.connecting();
    }

    /// Handles a (re)connection.
    ///
    /// Registers the thing, pushes the current state as the desired
    /// snapshot and subscribes to the command topic. Timers are started on
    /// the first connection only.
    pub fn on_connect(&mut self) -> Vec<Effect> {
        let first = self.connection.connected();
        tracing::info!(device = %self.device_id, first, "Connected to broker");

        let mut effects = vec![
            Effect::Register,
            Effect::UpdateShadow(ShadowDocument::desired(self.state.report())),
            Effect::Subscribe(self.topics.commands().to_string()),
        ];
        if first {
            effects.push(Effect::StartTimers);
        }
        effects
    }

    /// Records a lost connection.
    pub fn on_disconnect(&mut self) {
        tracing::warn!(device = %self.device_id, "Disconnected from broker");
        self.connection.disconnected();
    }

    // ========== Telemetry ==========

    /// Advances the simulated reading and publishes telemetry.
    ///
    /// Returns the telemetry message followed by a warning/error event when
    /// the new reading is outside the comfort band.
    pub fn on_publish_tick(&mut self) -> Vec<Effect> {
        let next = telemetry::drift(
            self.state.power_status(),
            self.state.actual_temperature(),
            self.temperature_change,
            &mut self.coin,
        );
        self.state.apply(&StateChange::ActualTemperature(next));

        let message = TelemetryMessage::from_state(&self.device_id, &self.state, Local::now());
        let Classification { band, event } = self.classify();

        tracing::info!(
            device = %self.device_id,
            power = %self.state.power_status(),
            actual = self.state.actual_temperature().value(),
            target = self.state.target_temperature().value(),
            band = %band,
            "Telemetry generated"
        );

        let mut effects = vec![Effect::Telemetry(message)];
        effects.extend(event.map(Effect::Event));
        effects
    }

    /// Classifies the current reading against the target, building the
    /// warning/error event in the same step.
    #[must_use]
    pub fn classify(&self) -> Classification {
        telemetry::classify(
            &self.device_id,
            self.state.actual_temperature(),
            self.state.target_temperature(),
        )
    }

    /// Reports the current state to the shadow `reported` section.
    #[must_use]
    pub fn on_status_tick(&self) -> Vec<Effect> {
        vec![Effect::UpdateShadow(ShadowDocument::reported(
            self.state.report(),
        ))]
    }

    // ========== Shadow ==========

    /// Handles a raw shadow delta payload.
    ///
    /// A payload that cannot be parsed leaves the state untouched and
    /// yields a single diagnostic event.
    pub fn on_delta(&mut self, payload: &[u8]) -> Vec<Effect> {
        match DesiredState::parse(payload) {
            Ok(desired) => self.apply_delta(&desired),
            Err(e) => {
                tracing::warn!(device = %self.device_id, error = %e, "Failed to apply shadow delta");
                vec![Effect::Event(TelemetryEvent::diagnostic(&self.device_id, &e))]
            }
        }
    }

    /// Merges a desired state into the local state.
    ///
    /// Each field that differs from the local value is applied and yields an
    /// `info` event. If anything changed, the next command is acknowledged.
    pub fn apply_delta(&mut self, desired: &DesiredState) -> Vec<Effect> {
        let changes = desired.reconcile(&self.state);
        let mut effects = Vec::with_capacity(changes.len());

        for change in &changes {
            let previous = self.state.report();
            self.state.apply(change);

            let event = match change {
                StateChange::PowerStatus(status) => {
                    tracing::info!(
                        device = %self.device_id,
                        current = %previous.power_status,
                        desired = %status,
                        "Power status differs from remote state"
                    );
                    match status {
                        PowerStatus::Off => tracing::info!("The device is OFF"),
                        PowerStatus::Ac => tracing::info!("AC is ON"),
                        PowerStatus::Heat => tracing::info!("HEAT is ON"),
                    }
                    TelemetryEvent::new(
                        &self.device_id,
                        EventType::Info,
                        POWER_CHANGED_MESSAGE,
                        Some((*status).into()),
                    )
                }
                StateChange::TargetTemperature(target) => {
                    tracing::info!(
                        device = %self.device_id,
                        current = previous.target_temperature.value(),
                        desired = target.value(),
                        "Target temperature differs from remote state"
                    );
                    TelemetryEvent::new(
                        &self.device_id,
                        EventType::Info,
                        TARGET_CHANGED_MESSAGE,
                        Some((*target).into()),
                    )
                }
                StateChange::ActualTemperature(_) => continue,
            };
            effects.push(Effect::Event(event));
        }

        if !changes.is_empty() {
            self.state.request_ack();
        }
        effects
    }

    /// Logs the outcome of a shadow update.
    pub fn on_status(&self, thing: &str, status: UpdateStatus, document: &serde_json::Value) {
        if status == UpdateStatus::Timeout {
            tracing::warn!(thing = %thing, "Shadow update got no response");
            return;
        }
        match reported_section(document) {
            Some(reported) => {
                tracing::info!(thing = %thing, status = %status, reported = %reported, "Reported current state");
            }
            None => {
                tracing::warn!(thing = %thing, status = %status, "Cannot find reported state");
            }
        }
    }

    // ========== Commands ==========

    /// Handles a message on the command topic.
    ///
    /// Only acknowledged while an acknowledgment is owed; otherwise the
    /// command is ignored without being parsed.
    pub fn on_command(&mut self, payload: &[u8]) -> Vec<Effect> {
        if !self.state.pending_ack() {
            tracing::debug!(device = %self.device_id, "No pending change, command not acknowledged");
            return Vec::new();
        }

        match CommandMessage::parse(payload) {
            Ok(command) => {
                self.state.take_ack();
                let ack = CommandAck::success(&command, &self.device_id);
                tracing::info!(device = %self.device_id, command_id = %ack.command_id, "Acknowledging command");
                vec![Effect::Acknowledge(ack)]
            }
            Err(e) => {
                tracing::warn!(device = %self.device_id, error = %e, "Failed to parse command");
                vec![Effect::Event(TelemetryEvent::diagnostic(&self.device_id, &e))]
            }
        }
    }
}
