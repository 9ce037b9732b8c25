// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device reference table.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::record::DeviceRecord;
use crate::error::ProvisionError;

/// Stores device records.
#[allow(async_fn_in_trait)]
pub trait DeviceRegistry {
    /// Stores `record`, replacing any record with the same device id.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError` if the record cannot be stored.
    async fn put(&self, record: &DeviceRecord) -> Result<(), ProvisionError>;
}

/// Registry kept as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    /// Creates a registry backed by `path`. The file is created on first
    /// write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records. A missing file is an empty registry.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError` if the file exists but cannot be read or
    /// does not hold a record array.
    pub async fn records(&self) -> Result<Vec<DeviceRecord>, ProvisionError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ProvisionError::Registry(format!("{} is corrupt: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(ProvisionError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

impl DeviceRegistry for FileRegistry {
    async fn put(&self, record: &DeviceRecord) -> Result<(), ProvisionError> {
        let mut records = self.records().await?;
        records.retain(|r| r.device_id != record.device_id);
        records.push(record.clone());

        let json = serde_json::to_vec_pretty(&records)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| ProvisionError::Io {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), device = %record.device_id, "Stored device record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileRegistry::new(dir.path().join("devices.json"));
        assert!(registry.records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_appends_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileRegistry::new(dir.path().join("devices.json"));

        registry.put(&DeviceRecord::new("a")).await.unwrap();
        registry.put(&DeviceRecord::new("b")).await.unwrap();

        let mut updated = DeviceRecord::new("a");
        updated.model_number = "other".to_string();
        registry.put(&updated).await.unwrap();

        let records = registry.records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].device_id, "b");
        assert_eq!(records[1].model_number, "other");
    }

    #[tokio::test]
    async fn corrupt_file_is_registry_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.json");
        std::fs::write(&path, "{").unwrap();

        let err = FileRegistry::new(path).records().await.unwrap_err();
        assert!(matches!(err, ProvisionError::Registry(_)));
    }
}
