// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runs one simulated thermostat against the configured broker.
//!
//! ```bash
//! smartproduct-simulator --config simulator.toml --env-file devices/<serial>/.env
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use smartproduct_sim::protocol::MqttShadowClient;
use smartproduct_sim::{Settings, Simulator, SimulatorRunner};

#[derive(Parser, Debug)]
#[command(version, about = "Simulated smart thermostat")]
struct Cli {
    /// Settings file; missing file is allowed
    #[arg(long, short, env = "SIM_CONFIG", default_value = "simulator.toml")]
    config: PathBuf,

    /// Environment file written by the provisioner; defaults to `./.env` if present
    #[arg(long, env = "SIM_ENV_FILE")]
    env_file: Option<PathBuf>,
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(fmt::format().compact().with_target(false)),
        )
        .init();
}

async fn run(cli: Cli) -> smartproduct_sim::Result<()> {
    let settings = Settings::load(Some(&cli.config), cli.env_file.as_deref())?;
    tracing::info!(
        device = %settings.device_id,
        host = %settings.host,
        port = settings.port,
        "Starting simulator"
    );

    let simulator = Simulator::from_settings(&settings)?;
    let (client, events) = MqttShadowClient::connect(&settings).await?;

    SimulatorRunner::new(simulator, client)
        .with_intervals(settings.publish_interval(), settings.status_interval())
        .run(events)
        .await;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    initialize_tracing();
    let cli = Cli::parse();

    tokio::select! {
        result = run(cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "Simulator failed");
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            ExitCode::SUCCESS
        }
    }
}
