// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event loop driving a [`Simulator`] over a [`ShadowTransport`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::device::{Effect, Simulator};
use crate::error::ProtocolError;
use crate::protocol::{ShadowTransport, TransportEvent};
use crate::shadow::ShadowDocument;
use crate::telemetry::Coin;

/// The two periodic timers. `None` until the first connection.
#[derive(Debug, Default)]
struct Timers {
    telemetry: Option<Interval>,
    status: Option<Interval>,
}

impl Timers {
    fn start(&mut self, publish_interval: Duration, status_interval: Duration) {
        if self.telemetry.is_none() {
            self.telemetry = Some(periodic(publish_interval));
        }
        if self.status.is_none() {
            self.status = Some(periodic(status_interval));
        }
    }
}

/// Creates an interval whose first tick is one period from now.
fn periodic(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Waits for the next tick, or forever if the timer is not started.
async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Serializes every handler invocation onto a single task.
///
/// Transport notifications and timer ticks are handled one at a time, so
/// the simulator state never sees concurrent mutation.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use smartproduct_sim::protocol::MemoryTransport;
/// use smartproduct_sim::simulator::{Simulator, SimulatorRunner};
///
/// # async fn example() {
/// let (tx, rx) = tokio::sync::mpsc::channel(16);
/// let simulator = Simulator::new("device-1", Default::default(), 0.5);
/// let runner = SimulatorRunner::new(simulator, MemoryTransport::new())
///     .with_intervals(Duration::from_secs(10), Duration::from_secs(30));
///
/// let handle = tokio::spawn(runner.run(rx));
/// drop(tx);
/// handle.await.unwrap();
/// # }
/// ```
#[derive(Debug)]
pub struct SimulatorRunner<T, C: Coin> {
    simulator: Simulator<C>,
    transport: T,
    publish_interval: Duration,
    status_interval: Duration,
}

impl<T: ShadowTransport, C: Coin> SimulatorRunner<T, C> {
    /// Default telemetry period.
    pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_secs(10);

    /// Default status report period.
    pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(30);

    /// Creates a runner with the default periods.
    #[must_use]
    pub fn new(simulator: Simulator<C>, transport: T) -> Self {
        Self {
            simulator,
            transport,
            publish_interval: Self::DEFAULT_PUBLISH_INTERVAL,
            status_interval: Self::DEFAULT_STATUS_INTERVAL,
        }
    }

    /// Sets the telemetry and status periods.
    #[must_use]
    pub fn with_intervals(mut self, publish_interval: Duration, status_interval: Duration) -> Self {
        self.publish_interval = publish_interval;
        self.status_interval = status_interval;
        self
    }

    /// Returns the simulator.
    #[must_use]
    pub fn simulator(&self) -> &Simulator<C> {
        &self.simulator
    }

    /// Runs until the event channel closes, then returns the simulator.
    pub async fn run(mut self, mut events: mpsc::Receiver<TransportEvent>) -> Simulator<C> {
        let mut timers = Timers::default();
        self.simulator.on_connecting();

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        tracing::info!(device = %self.simulator.device_id(), "Transport closed, stopping simulator");
                        break;
                    };
                    let effects = self.handle_event(event);
                    self.execute(effects, &mut timers);
                }
                () = tick(&mut timers.telemetry) => {
                    let effects = self.simulator.on_publish_tick();
                    self.execute(effects, &mut timers);
                }
                () = tick(&mut timers.status) => {
                    let effects = self.simulator.on_status_tick();
                    self.execute(effects, &mut timers);
                }
            }
        }

        self.simulator
    }

    fn handle_event(&mut self, event: TransportEvent) -> Vec<Effect> {
        match event {
            TransportEvent::Connected => self.simulator.on_connect(),
            TransportEvent::Disconnected => {
                self.simulator.on_disconnect();
                Vec::new()
            }
            TransportEvent::Delta { thing, payload } => {
                tracing::debug!(thing = %thing, "Received shadow delta");
                self.simulator.on_delta(&payload)
            }
            TransportEvent::Status {
                thing,
                status,
                document,
                ..
            } => {
                self.simulator.on_status(&thing, status, &document);
                Vec::new()
            }
            TransportEvent::Message { topic, payload } => {
                if topic == self.simulator.topics().commands() {
                    self.simulator.on_command(&payload)
                } else {
                    tracing::debug!(topic = %topic, "Ignoring message on unexpected topic");
                    Vec::new()
                }
            }
        }
    }

    fn execute(&mut self, effects: Vec<Effect>, timers: &mut Timers) {
        let device_id = self.simulator.device_id().to_string();

        for effect in effects {
            let result = match effect {
                Effect::Register => self.transport.register(&device_id),
                Effect::Subscribe(topic) => self.transport.subscribe(&topic),
                Effect::UpdateShadow(document) => self.update_shadow(&device_id, &document),
                Effect::Telemetry(message) => {
                    let topic = self.simulator.topics().telemetry().to_string();
                    self.publish_json(&topic, &message)
                }
                Effect::Event(event) => {
                    tracing::info!(
                        device = %device_id,
                        event_type = %event.event_type,
                        text = %event.message,
                        "Publishing event"
                    );
                    let topic = self.simulator.topics().event().to_string();
                    self.publish_json(&topic, &event)
                }
                Effect::Acknowledge(ack) => {
                    let topic = self.simulator.topics().commands().to_string();
                    self.publish_json(&topic, &ack)
                }
                Effect::StartTimers => {
                    tracing::debug!(
                        publish_interval = ?self.publish_interval,
                        status_interval = ?self.status_interval,
                        "Starting timers"
                    );
                    timers.start(self.publish_interval, self.status_interval);
                    Ok(())
                }
            };

            if let Err(e) = result {
                tracing::error!(device = %device_id, error = %e, "Transport operation failed");
            }
        }
    }

    fn update_shadow(
        &mut self,
        thing: &str,
        document: &ShadowDocument,
    ) -> Result<(), ProtocolError> {
        let value = serde_json::to_value(document)?;
        match self.transport.update(thing, &value)? {
            Some(token) => tracing::debug!(thing = %thing, token = %token, "Shadow update sent"),
            None => tracing::error!(
                thing = %thing,
                "Reporting state failed, operation still in progress"
            ),
        }
        Ok(())
    }

    fn publish_json<S: serde::Serialize>(
        &mut self,
        topic: &str,
        payload: &S,
    ) -> Result<(), ProtocolError> {
        let payload = serde_json::to_string(payload)?;
        self.transport.publish(topic, &payload)
    }
}
