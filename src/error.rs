// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the simulator.
//!
//! This module provides the error hierarchy used across the crate: value
//! validation, transport communication, payload parsing, configuration
//! loading and device provisioning.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the broker.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error occurred while parsing an incoming payload.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred while loading the configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error occurred while provisioning a device.
    #[error("provision error: {0}")]
    Provision(#[from] ProvisionError),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A power status string outside `OFF`, `AC` and `HEAT`.
    #[error("invalid power status: {0}")]
    InvalidPowerStatus(String),

    /// A temperature that is NaN or infinite.
    #[error("temperature {0} is not a finite number")]
    NonFiniteTemperature(f64),
}

/// Errors related to broker communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT client request could not be queued.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// A credential file could not be read.
    #[error("failed to read credential {path}: {source}")]
    Credential {
        /// Path of the credential file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Invalid broker address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Document could not be encoded for publication.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors related to parsing incoming shadow and command payloads.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the payload.
    #[error("missing field in payload: {0}")]
    MissingField(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to simulator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A required setting is missing or empty.
    #[error("missing setting: {0}")]
    Missing(&'static str),

    /// A setting has an unusable value.
    #[error("invalid setting {name}: {message}")]
    Invalid {
        /// Name of the setting.
        name: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// An environment file could not be read or parsed.
    #[error("failed to read environment file {path}: {source}")]
    EnvFile {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: dotenvy::Error,
    },
}

/// Errors that abort a provisioning run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The certificate script exited unsuccessfully.
    #[error("certificate script failed with {status}: {stderr}")]
    Certificate {
        /// Exit status description.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The device registry rejected the record.
    #[error("registry write failed: {0}")]
    Registry(String),

    /// Device record could not be serialized.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
