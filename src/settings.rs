// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulator configuration.
//!
//! Settings are layered, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `SIM_`-prefixed environment variables (`SIM_PUBLISH_INTERVAL_MS`,
//!    `SIM_CREDENTIALS__CA_PATH`, ...)
//! 4. `SERIALNUMBER` and `IOT_HOST`, the variables written by the
//!    provisioner's `.env` file
//!
//! [`Settings::load`] reads variables from a `.env` file first, then lets
//! the process environment override them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, FileFormat, Map};
use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable holding the device serial number.
pub const SERIAL_NUMBER_VAR: &str = "SERIALNUMBER";

/// Environment variable holding the broker endpoint.
pub const IOT_HOST_VAR: &str = "IOT_HOST";

/// Environment file looked up in the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Paths to the device credentials used for mutual TLS.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CredentialPaths {
    /// Device private key.
    pub key_path: PathBuf,
    /// Device certificate chained with the CA certificate.
    pub cert_path: PathBuf,
    /// Root CA certificate of the broker.
    pub ca_path: PathBuf,
}

/// Runtime settings of the simulator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Device serial number, also used as thing name and MQTT client id.
    pub device_id: String,
    /// Broker host name.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Whether to connect with mutual TLS.
    pub tls: bool,
    /// Telemetry publish interval in milliseconds.
    pub publish_interval_ms: u64,
    /// Shadow report interval in milliseconds.
    pub status_interval_ms: u64,
    /// Temperature step per telemetry tick.
    pub temperature_change: f64,
    /// Initial reading and setpoint.
    pub initial_temperature: f64,
    /// Credential file locations.
    pub credentials: CredentialPaths,
}

impl Settings {
    /// Loads settings from `file` (if it exists), an environment file and
    /// the process environment.
    ///
    /// `env_file` must exist when given. Without it, `.env` in the working
    /// directory is read if present. Process variables win over the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or the resulting
    /// settings are invalid.
    pub fn load(file: Option<&Path>, env_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut vars = match env_file {
            Some(path) => read_env_file(path)?,
            None => {
                let path = Path::new(DEFAULT_ENV_FILE);
                if path.is_file() {
                    read_env_file(path)?
                } else {
                    Map::new()
                }
            }
        };
        vars.extend(std::env::vars());
        Self::load_from(file, vars)
    }

    /// Loads settings from `file` (if it exists) and the given variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or the resulting
    /// settings are invalid.
    pub fn load_from(file: Option<&Path>, vars: Map<String, String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("device_id", "")?
            .set_default("host", "")?
            .set_default("port", 8883)?
            .set_default("tls", true)?
            .set_default("publish_interval_ms", 10_000)?
            .set_default("status_interval_ms", 30_000)?
            .set_default("temperature_change", 0.5)?
            .set_default("initial_temperature", crate::state::DEFAULT_TEMPERATURE)?
            .set_default("credentials.key_path", "certs/deviceCert.key")?
            .set_default("credentials.cert_path", "certs/deviceCertAndCACert.crt")?
            .set_default("credentials.ca_path", "certs/root.cert")?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let device_id = vars.get(SERIAL_NUMBER_VAR).cloned();
        let host = vars.get(IOT_HOST_VAR).cloned();

        let settings: Self = builder
            .add_source(
                Environment::with_prefix("SIM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(vars)),
            )
            .set_override_option("device_id", device_id)?
            .set_override_option("host", host)?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Checks the invariants the simulator relies on.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_id.trim().is_empty() {
            return Err(ConfigError::Missing(SERIAL_NUMBER_VAR));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Missing(IOT_HOST_VAR));
        }
        if self.publish_interval_ms == 0 {
            return Err(invalid("publish_interval_ms", "must be greater than zero"));
        }
        if self.status_interval_ms == 0 {
            return Err(invalid("status_interval_ms", "must be greater than zero"));
        }
        if !self.temperature_change.is_finite() || self.temperature_change <= 0.0 {
            return Err(invalid("temperature_change", "must be a positive number"));
        }
        if !self.initial_temperature.is_finite() {
            return Err(invalid("initial_temperature", "must be a finite number"));
        }
        Ok(())
    }

    /// Returns the telemetry publish interval.
    #[must_use]
    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }

    /// Returns the shadow report interval.
    #[must_use]
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }
}

/// Reads the variables of a dotenv file without touching the process
/// environment.
///
/// # Errors
///
/// Returns `ConfigError::EnvFile` if the file is missing or malformed.
pub fn read_env_file(path: &Path) -> Result<Map<String, String>, ConfigError> {
    let env_file_error = |source: dotenvy::Error| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    let vars = dotenvy::from_path_iter(path)
        .map_err(env_file_error)?
        .collect::<Result<Map<String, String>, _>>()
        .map_err(env_file_error)?;
    tracing::debug!(path = %path.display(), count = vars.len(), "Read environment file");
    Ok(vars)
}

fn invalid(name: &'static str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        message: message.to_string(),
    }
}
