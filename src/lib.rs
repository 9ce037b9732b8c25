// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smart-product thermostat simulator.
//!
//! Simulates a connected thermostat talking to a cloud IoT broker through a
//! device shadow: it drifts a temperature reading, publishes telemetry and
//! threshold events, reconciles desired state from shadow deltas and
//! acknowledges commands. A provisioner prepares the files a simulated
//! device runs from.
//!
//! # Features
//!
//! - **Telemetry**: periodic temperature drift driven by the power mode
//! - **Events**: warning/error events when the reading leaves the comfort band
//! - **Shadow sync**: periodic reported state, delta reconciliation
//! - **Commands**: one acknowledgment per user-initiated change
//! - **Provisioning**: serial, certificate request, device record
//!
//! # Quick Start
//!
//! ## Handlers without a broker
//!
//! ```
//! use smartproduct_sim::simulator::{Effect, Simulator};
//!
//! let mut sim = Simulator::new("device-1", Default::default(), 0.5);
//! sim.on_delta(br#"{"state":{"powerStatus":"HEAT"}}"#);
//!
//! let effects = sim.on_command(br#"{"commandId":"c-1"}"#);
//! assert!(matches!(effects[0], Effect::Acknowledge(_)));
//! ```
//!
//! ## Against an MQTT broker
//!
//! ```no_run
//! use smartproduct_sim::protocol::MqttShadowClient;
//! use smartproduct_sim::settings::Settings;
//! use smartproduct_sim::simulator::{Simulator, SimulatorRunner};
//!
//! #[tokio::main]
//! async fn main() -> smartproduct_sim::Result<()> {
//!     let settings = Settings::load(None, None)?;
//!     let (client, events) = MqttShadowClient::connect(&settings).await?;
//!
//!     let simulator = Simulator::from_settings(&settings)?;
//!     SimulatorRunner::new(simulator, client)
//!         .with_intervals(settings.publish_interval(), settings.status_interval())
//!         .run(events)
//!         .await;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod error;
pub mod event;
pub mod protocol;
pub mod provision;
pub mod settings;
pub mod shadow;
pub mod simulator;
pub mod state;
pub mod telemetry;
pub mod types;

pub use error::{
    ConfigError, Error, ParseError, ProtocolError, ProvisionError, Result, ValueError,
};
pub use protocol::{ShadowTransport, TransportEvent};
pub use settings::Settings;
pub use simulator::{Effect, Simulator, SimulatorRunner};
pub use state::DeviceState;
pub use types::{PowerStatus, Temperature};
