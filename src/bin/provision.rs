// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Provisions one simulated device.
//!
//! ```bash
//! IOT_HOST=<endpoint> smartproduct-provision --cert-script ./createCert.sh
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use smartproduct_sim::provision::{
    DEFAULT_ORGANIZATION, FileRegistry, Provisioner, ShellCertificateIssuer,
};

#[derive(Parser, Debug)]
#[command(version, about = "Provision a simulated smart thermostat")]
struct Cli {
    /// Broker endpoint written into the device `.env`
    #[arg(long, env = "IOT_HOST")]
    endpoint: String,

    /// Directory device directories are created under
    #[arg(long, default_value = "devices")]
    devices_dir: PathBuf,

    /// Script invoked as `<script> <serial>` to create the certificate
    #[arg(long, default_value = "./createCert.sh")]
    cert_script: PathBuf,

    /// JSON file holding the device reference table
    #[arg(long, env = "REFERENCE_TABLE", default_value = "devices/registry.json")]
    registry: PathBuf,

    /// Organization written into the certificate request
    #[arg(long, default_value = DEFAULT_ORGANIZATION)]
    organization: String,
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .event_format(fmt::format().compact().with_target(false).without_time()),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    initialize_tracing();
    let cli = Cli::parse();

    let provisioner = Provisioner::new(
        cli.endpoint,
        cli.devices_dir,
        ShellCertificateIssuer::new(cli.cert_script, "."),
        FileRegistry::new(cli.registry),
    )
    .with_organization(cli.organization);

    match provisioner.run().await {
        Ok(report) => {
            let rule = "=".repeat(105);
            println!();
            println!("Device Information");
            println!("{rule}");
            println!("Serial Number: {}", report.serial);
            println!("Model Number: {}", report.model_number);
            println!("{rule}");
            println!("Cert package for the device");
            let bundle = std::path::absolute(&report.cert_bundle).unwrap_or(report.cert_bundle);
            println!("{}", bundle.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Provisioning failed");
            ExitCode::FAILURE
        }
    }
}
