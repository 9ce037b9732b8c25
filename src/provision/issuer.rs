// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device certificate issuance.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::ProvisionError;

/// Creates the device certificate for a serial number.
#[allow(async_fn_in_trait)]
pub trait CertificateIssuer {
    /// Issues a certificate for `serial`, whose directory already contains
    /// the request config.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError` if the certificate cannot be created.
    async fn issue(&self, serial: &str, device_dir: &Path) -> Result<(), ProvisionError>;
}

/// Runs an external script as `<script> <serial>`.
///
/// The script runs in `working_dir` and is expected to leave the certificate
/// bundle in the device directory.
#[derive(Debug, Clone)]
pub struct ShellCertificateIssuer {
    script: PathBuf,
    working_dir: PathBuf,
}

impl ShellCertificateIssuer {
    /// Creates an issuer running `script` from `working_dir`.
    #[must_use]
    pub fn new(script: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            working_dir: working_dir.into(),
        }
    }
}

impl CertificateIssuer for ShellCertificateIssuer {
    async fn issue(&self, serial: &str, _device_dir: &Path) -> Result<(), ProvisionError> {
        tracing::debug!(script = %self.script.display(), serial = %serial, "Running certificate script");

        let output = Command::new(&self.script)
            .arg(serial)
            .current_dir(&self.working_dir)
            .output()
            .await
            .map_err(|source| ProvisionError::Io {
                path: self.script.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProvisionError::Certificate {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::debug!(
            stdout = %String::from_utf8_lossy(&output.stdout).trim(),
            "Certificate script finished"
        );
        Ok(())
    }
}
