// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Files written into a device directory.

use std::path::{Path, PathBuf};

use crate::error::ProvisionError;
use crate::settings::{IOT_HOST_VAR, SERIAL_NUMBER_VAR};

/// Simulator environment file name.
pub const ENV_FILE: &str = ".env";

/// Certificate signing request config file name.
pub const CSR_CONFIG_FILE: &str = "csr.cnf";

/// Device record copy file name.
pub const DEVICE_FILE: &str = "device.json";

/// Certificate bundle produced by the certificate script.
pub const CERT_BUNDLE_FILE: &str = "certs.tar.gz";

/// Renders the `.env` consumed by the simulator.
#[must_use]
pub fn render_env(serial: &str, endpoint: &str) -> String {
    format!("{SERIAL_NUMBER_VAR}={serial}\n{IOT_HOST_VAR}={endpoint}\n")
}

/// Renders an OpenSSL request config with the serial as common name.
#[must_use]
pub fn render_csr_config(serial: &str, organization: &str) -> String {
    format!(
        "[req]\n\
         prompt = no\n\
         distinguished_name = dn\n\
         \n\
         [dn]\n\
         CN = {serial}\n\
         O = {organization}\n"
    )
}

/// Writes `contents` to `dir/name`.
///
/// # Errors
///
/// Returns `ProvisionError::Io` if the file cannot be written.
pub async fn write_file(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf, ProvisionError> {
    let path = dir.join(name);
    tokio::fs::write(&path, contents)
        .await
        .map_err(|source| ProvisionError::Io {
            path: path.clone(),
            source,
        })?;
    tracing::debug!(path = %path.display(), "Wrote file");
    Ok(path)
}
