// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-shot device provisioning.
//!
//! Creates a serial number, prepares the device directory the simulator
//! runs from, issues the device certificate and records the device in the
//! reference table. Steps run in order and stop at the first failure.
//!
//! # Examples
//!
//! ```no_run
//! use smartproduct_sim::provision::{FileRegistry, Provisioner, ShellCertificateIssuer};
//!
//! # async fn example() -> smartproduct_sim::Result<()> {
//! let provisioner = Provisioner::new(
//!     "example-ats.iot.us-east-1.amazonaws.com",
//!     "devices",
//!     ShellCertificateIssuer::new("./createCert.sh", "."),
//!     FileRegistry::new("devices/registry.json"),
//! );
//!
//! let report = provisioner.run().await?;
//! println!("{}", report.cert_bundle.display());
//! # Ok(())
//! # }
//! ```

mod artifacts;
mod issuer;
mod record;
mod registry;

pub use artifacts::{
    CERT_BUNDLE_FILE, CSR_CONFIG_FILE, DEVICE_FILE, ENV_FILE, render_csr_config, render_env,
};
pub use issuer::{CertificateIssuer, ShellCertificateIssuer};
pub use record::{DEFAULT_MODEL_NUMBER, DeviceRecord, ModelDetails};
pub use registry::{DeviceRegistry, FileRegistry};

use std::path::PathBuf;

use crate::error::ProvisionError;

/// Organization written into certificate requests.
pub const DEFAULT_ORGANIZATION: &str = "Big Ass Fans";

/// Outcome of a successful provisioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Generated serial number.
    pub serial: String,
    /// Model number recorded for the device.
    pub model_number: String,
    /// Directory holding the device files.
    pub device_dir: PathBuf,
    /// Certificate bundle to ship to the device.
    pub cert_bundle: PathBuf,
}

/// Runs the provisioning steps.
#[derive(Debug)]
pub struct Provisioner<I, R> {
    endpoint: String,
    devices_dir: PathBuf,
    organization: String,
    issuer: I,
    registry: R,
}

impl<I: CertificateIssuer, R: DeviceRegistry> Provisioner<I, R> {
    /// Creates a provisioner writing device directories under `devices_dir`.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        devices_dir: impl Into<PathBuf>,
        issuer: I,
        registry: R,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            devices_dir: devices_dir.into(),
            organization: DEFAULT_ORGANIZATION.to_string(),
            issuer,
            registry,
        }
    }

    /// Sets the organization written into certificate requests.
    #[must_use]
    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    /// Provisions a device with a fresh serial number.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError` from the first step that fails.
    pub async fn run(&self) -> Result<ProvisionReport, ProvisionError> {
        self.provision(uuid::Uuid::new_v4().to_string()).await
    }

    /// Provisions a device with the given serial number.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError` from the first step that fails.
    pub async fn provision(&self, serial: String) -> Result<ProvisionReport, ProvisionError> {
        let record = DeviceRecord::new(&serial);
        tracing::info!(serial = %serial, "Generated serial number");

        let device_dir = self.devices_dir.join(&serial);
        tokio::fs::create_dir_all(&device_dir)
            .await
            .map_err(|source| ProvisionError::Io {
                path: device_dir.clone(),
                source,
            })?;
        tracing::info!(path = %device_dir.display(), "Created device directory");

        let csr = render_csr_config(&serial, &self.organization);
        artifacts::write_file(&device_dir, CSR_CONFIG_FILE, csr.as_bytes()).await?;

        let env = render_env(&serial, &self.endpoint);
        artifacts::write_file(&device_dir, ENV_FILE, env.as_bytes()).await?;
        tracing::info!("Created simulator environment file");

        self.issuer.issue(&serial, &device_dir).await?;
        tracing::info!("Created device certificate");

        let json = serde_json::to_vec(&record)?;
        artifacts::write_file(&device_dir, DEVICE_FILE, &json).await?;
        tracing::info!("Saved device information");

        self.registry.put(&record).await?;
        tracing::info!(model = %record.model_number, "Registered device");

        Ok(ProvisionReport {
            cert_bundle: device_dir.join(CERT_BUNDLE_FILE),
            serial,
            model_number: record.model_number,
            device_dir,
        })
    }
}
