// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios of the simulator runner over an in-memory transport.
//!
//! Time is paused, so interval timers fire as soon as the test sleeps past
//! them.

use std::time::Duration;

use serde_json::{Value, json};
use smartproduct_sim::protocol::{MemoryTransport, Topics, TransportCall, TransportEvent};
use smartproduct_sim::simulator::{ConnectionState, Simulator, SimulatorRunner};
use smartproduct_sim::state::{DeviceState, StateChange};
use smartproduct_sim::telemetry::Coin;
use smartproduct_sim::{PowerStatus, Temperature};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

const DEVICE: &str = "0f9c1b2e-sim";

/// Alternates up and down, starting up.
#[derive(Debug, Default)]
struct Alternating(bool);

impl Coin for Alternating {
    fn flip(&mut self) -> bool {
        self.0 = !self.0;
        self.0
    }
}

struct Harness {
    transport: MemoryTransport,
    topics: Topics,
    tx: mpsc::Sender<TransportEvent>,
    handle: JoinHandle<Simulator<Alternating>>,
}

impl Harness {
    fn start(state: DeviceState) -> Self {
        let transport = MemoryTransport::new();
        let simulator = Simulator::with_coin(DEVICE, state, 0.5, Alternating::default());
        let runner = SimulatorRunner::new(simulator, transport.clone())
            .with_intervals(Duration::from_secs(10), Duration::from_secs(30));

        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(runner.run(rx));

        Self {
            transport,
            topics: Topics::new(DEVICE),
            tx,
            handle,
        }
    }

    async fn send(&self, event: TransportEvent) {
        self.tx.send(event).await.unwrap();
        settle().await;
    }

    async fn connect(&self) {
        self.send(TransportEvent::Connected).await;
    }

    async fn delta(&self, document: Value) {
        self.send(TransportEvent::Delta {
            thing: DEVICE.to_string(),
            payload: document.to_string().into_bytes(),
        })
        .await;
    }

    async fn command(&self, document: Value) {
        self.send(TransportEvent::Message {
            topic: self.topics.commands().to_string(),
            payload: document.to_string().into_bytes(),
        })
        .await;
    }

    fn json_on(&self, topic: &str) -> Vec<Value> {
        self.transport
            .publishes_to(topic)
            .iter()
            .map(|payload| serde_json::from_str(payload).unwrap())
            .collect()
    }

    fn events(&self) -> Vec<Value> {
        self.json_on(self.topics.event())
    }

    fn telemetry(&self) -> Vec<Value> {
        self.json_on(self.topics.telemetry())
    }

    fn acks(&self) -> Vec<Value> {
        self.json_on(self.topics.commands())
    }

    async fn stop(self) -> Simulator<Alternating> {
        drop(self.tx);
        self.handle.await.unwrap()
    }
}

/// Lets the runner drain its queue without advancing past any timer.
async fn settle() {
    sleep(Duration::from_millis(1)).await;
}

fn t(v: f64) -> Temperature {
    Temperature::new(v).unwrap()
}

// ============================================================================
// Connection lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn connect_registers_pushes_desired_and_subscribes() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;

        let calls = harness.transport.calls();
        assert_eq!(calls[0], TransportCall::Register(DEVICE.to_string()));
        assert_eq!(
            calls[1],
            TransportCall::Update {
                thing: DEVICE.to_string(),
                document: json!({"state": {"desired": {
                    "powerStatus": "OFF",
                    "actualTemperature": 71.5,
                    "targetTemperature": 71.5
                }}}),
            }
        );
        assert_eq!(
            calls[2],
            TransportCall::Subscribe(format!("smartproduct/commands/{DEVICE}"))
        );
        assert_eq!(calls.len(), 3);

        let simulator = harness.stop().await;
        assert_eq!(simulator.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_published_before_connecting() {
        let harness = Harness::start(DeviceState::default());
        sleep(Duration::from_secs(120)).await;

        assert!(harness.transport.calls().is_empty());
        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn timers_fire_on_their_periods() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;
        harness.transport.clear();

        sleep(Duration::from_millis(30_500)).await;

        assert_eq!(harness.telemetry().len(), 3);
        let updates = harness.transport.updates();
        assert_eq!(updates.len(), 1);
        assert!(updates[0]["state"]["reported"].is_object());

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn reconnect_does_not_duplicate_timers() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;

        harness.send(TransportEvent::Disconnected).await;
        harness.connect().await;
        harness.connect().await;

        let registers = harness
            .transport
            .calls()
            .into_iter()
            .filter(|c| matches!(c, TransportCall::Register(_)))
            .count();
        assert_eq!(registers, 3);

        harness.transport.clear();
        sleep(Duration::from_millis(20_500)).await;
        assert_eq!(harness.telemetry().len(), 2);

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn timers_keep_running_while_disconnected() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;
        harness.send(TransportEvent::Disconnected).await;
        harness.transport.clear();

        sleep(Duration::from_millis(10_500)).await;
        assert_eq!(harness.telemetry().len(), 1);

        let simulator = harness.stop().await;
        assert_eq!(simulator.connection_state(), ConnectionState::Disconnected);
    }
}

// ============================================================================
// Telemetry
// ============================================================================

mod telemetry {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn heat_raises_reading_each_tick() {
        let harness = Harness::start(DeviceState::new(PowerStatus::Heat, t(71.5)));
        harness.connect().await;

        sleep(Duration::from_millis(20_500)).await;

        let readings: Vec<f64> = harness
            .telemetry()
            .iter()
            .map(|m| m["actualTemperature"].as_f64().unwrap())
            .collect();
        assert_eq!(readings, vec![72.0, 72.5]);

        let message = &harness.telemetry()[0];
        assert_eq!(message["deviceId"], DEVICE);
        assert_eq!(message["targetTemperature"], 71.5);

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn hot_reading_publishes_error_event() {
        let mut state = DeviceState::new(PowerStatus::Off, t(80.0));
        state.apply(&StateChange::ActualTemperature(t(95.0)));
        let harness = Harness::start(state);
        harness.connect().await;

        sleep(Duration::from_millis(10_500)).await;

        let events = harness.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "error");
        assert_eq!(events[0]["details"]["value"], 95.5);
        assert_eq!(events[0]["deviceId"], DEVICE);

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn comfortable_reading_publishes_no_event() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;

        sleep(Duration::from_millis(50_500)).await;

        assert_eq!(harness.telemetry().len(), 5);
        assert!(harness.events().is_empty());

        harness.stop().await;
    }
}

// ============================================================================
// Shadow deltas and commands
// ============================================================================

mod reconciliation {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn delta_changes_target_and_acknowledges_once() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;

        harness
            .delta(json!({"state": {"targetTemperature": "85"}, "version": 7}))
            .await;

        let events = harness.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "info");
        assert_eq!(events[0]["details"]["value"], 85.0);

        harness.command(json!({"commandId": "cmd-1"})).await;
        harness.command(json!({"commandId": "cmd-2"})).await;

        let acks: Vec<Value> = harness
            .acks()
            .into_iter()
            .filter(|m| m.get("status").is_some())
            .collect();
        assert_eq!(
            acks,
            vec![json!({
                "commandId": "cmd-1",
                "deviceId": DEVICE,
                "reason": "success",
                "status": "success"
            })]
        );

        let simulator = harness.stop().await;
        assert_eq!(simulator.state().target_temperature(), t(85.0));
        assert!(!simulator.state().pending_ack());
    }

    #[tokio::test(start_paused = true)]
    async fn reported_state_follows_delta() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;
        harness
            .delta(json!({"state": {"powerStatus": "AC", "targetTemperature": 68}}))
            .await;
        harness.transport.clear();

        sleep(Duration::from_millis(30_500)).await;

        let updates = harness.transport.updates();
        let reported = &updates[0]["state"]["reported"];
        assert_eq!(reported["powerStatus"], "AC");
        assert_eq!(reported["targetTemperature"], 68.0);

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_delta_publishes_diagnostic() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;

        harness
            .delta(json!({"state": {"powerStatus": "TURBO"}}))
            .await;

        let events = harness.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["type"], "diagnostic");

        harness.command(json!({"commandId": "cmd-1"})).await;
        assert!(harness.acks().is_empty());

        let simulator = harness.stop().await;
        assert_eq!(simulator.state(), &DeviceState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn own_acknowledgment_is_ignored() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;
        harness.delta(json!({"state": {"powerStatus": "HEAT"}})).await;
        harness.command(json!({"commandId": 42})).await;

        let ack = harness.acks().pop().unwrap();
        assert_eq!(ack["commandId"], 42);

        // The broker echoes the acknowledgment back on the command topic.
        harness.command(ack).await;
        assert_eq!(harness.acks().len(), 1);

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn status_responses_do_not_change_state() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;

        harness
            .send(TransportEvent::Status {
                thing: DEVICE.to_string(),
                status: smartproduct_sim::protocol::UpdateStatus::Accepted,
                token: None,
                document: json!({"state": {"reported": {"powerStatus": "OFF"}}}),
            })
            .await;
        harness
            .send(TransportEvent::Status {
                thing: DEVICE.to_string(),
                status: smartproduct_sim::protocol::UpdateStatus::Rejected,
                token: None,
                document: json!({"code": 400, "message": "bad request"}),
            })
            .await;
        harness
            .send(TransportEvent::Status {
                thing: DEVICE.to_string(),
                status: smartproduct_sim::protocol::UpdateStatus::Timeout,
                token: None,
                document: Value::Null,
            })
            .await;

        let simulator = harness.stop().await;
        assert_eq!(simulator.state(), &DeviceState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn update_in_flight_is_skipped() {
        let harness = Harness::start(DeviceState::default());
        harness.connect().await;
        harness.transport.clear();
        harness.transport.set_reject_updates(true);

        sleep(Duration::from_millis(30_500)).await;
        assert!(harness.transport.updates().is_empty());
        assert_eq!(harness.telemetry().len(), 3);

        harness.stop().await;
    }
}
