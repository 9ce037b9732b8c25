// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Provisioning into a temporary directory with a fake certificate issuer.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use smartproduct_sim::ProvisionError;
use smartproduct_sim::provision::{
    CERT_BUNDLE_FILE, CertificateIssuer, DeviceRecord, DeviceRegistry, FileRegistry,
    Provisioner,
};
use smartproduct_sim::settings::{Settings, read_env_file};

/// Writes an empty bundle and remembers which serials it saw.
#[derive(Debug, Clone, Default)]
struct FakeIssuer {
    issued: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl CertificateIssuer for FakeIssuer {
    async fn issue(&self, serial: &str, device_dir: &Path) -> Result<(), ProvisionError> {
        assert!(device_dir.join("csr.cnf").exists(), "request config written first");
        if self.fail {
            return Err(ProvisionError::Certificate {
                status: "exit status: 1".to_string(),
                stderr: "openssl: unable to load config".to_string(),
            });
        }
        std::fs::write(device_dir.join(CERT_BUNDLE_FILE), b"").unwrap();
        self.issued.lock().push(serial.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn provisions_device_directory_and_registry() {
    let dir = tempfile::tempdir().unwrap();
    let issuer = FakeIssuer::default();
    let registry = FileRegistry::new(dir.path().join("registry.json"));

    let provisioner = Provisioner::new(
        "example-ats.iot.us-east-1.amazonaws.com",
        dir.path().join("devices"),
        issuer.clone(),
        registry.clone(),
    );
    let report = provisioner.run().await.unwrap();

    assert!(uuid::Uuid::parse_str(&report.serial).is_ok());
    assert_eq!(report.model_number, "test-model");
    assert_eq!(report.device_dir, dir.path().join("devices").join(&report.serial));
    assert_eq!(report.cert_bundle, report.device_dir.join("certs.tar.gz"));
    assert!(report.cert_bundle.exists());
    assert_eq!(*issuer.issued.lock(), vec![report.serial.clone()]);

    let cnf = std::fs::read_to_string(report.device_dir.join("csr.cnf")).unwrap();
    assert!(cnf.contains(&format!("CN = {}", report.serial)));
    assert!(cnf.contains("O = Big Ass Fans"));

    let stored: DeviceRecord = serde_json::from_slice(
        &std::fs::read(report.device_dir.join("device.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(stored, DeviceRecord::new(&report.serial));

    assert_eq!(registry.records().await.unwrap(), vec![stored]);
}

#[tokio::test]
async fn env_file_configures_simulator() {
    let dir = tempfile::tempdir().unwrap();
    let provisioner = Provisioner::new(
        "example-ats.iot.us-east-1.amazonaws.com",
        dir.path(),
        FakeIssuer::default(),
        FileRegistry::new(dir.path().join("registry.json")),
    );
    let report = provisioner.provision("serial-1".to_string()).await.unwrap();

    let vars = read_env_file(&report.device_dir.join(".env")).unwrap();

    let settings = Settings::load_from(None, vars).unwrap();
    assert_eq!(settings.device_id, "serial-1");
    assert_eq!(settings.host, "example-ats.iot.us-east-1.amazonaws.com");
}

#[tokio::test]
async fn custom_organization_in_request_config() {
    let dir = tempfile::tempdir().unwrap();
    let provisioner = Provisioner::new(
        "host",
        dir.path(),
        FakeIssuer::default(),
        FileRegistry::new(dir.path().join("registry.json")),
    )
    .with_organization("Acme Climate");

    let report = provisioner.provision("serial-2".to_string()).await.unwrap();
    let cnf = std::fs::read_to_string(report.device_dir.join("csr.cnf")).unwrap();
    assert!(cnf.contains("O = Acme Climate"));
}

#[tokio::test]
async fn certificate_failure_stops_before_registry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileRegistry::new(dir.path().join("registry.json"));
    let issuer = FakeIssuer {
        fail: true,
        ..FakeIssuer::default()
    };

    let provisioner = Provisioner::new("host", dir.path(), issuer, registry.clone());
    let err = provisioner.provision("serial-3".to_string()).await.unwrap_err();

    assert!(matches!(err, ProvisionError::Certificate { .. }));
    assert!(!dir.path().join("serial-3").join("device.json").exists());
    assert!(registry.records().await.unwrap().is_empty());
}

#[tokio::test]
async fn registry_keeps_every_provisioned_device() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileRegistry::new(dir.path().join("registry.json"));
    let provisioner = Provisioner::new("host", dir.path(), FakeIssuer::default(), registry.clone());

    provisioner.provision("a".to_string()).await.unwrap();
    provisioner.provision("b".to_string()).await.unwrap();

    let ids: Vec<String> = registry
        .records()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.device_id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn registry_put_is_callable_through_trait() {
    let dir = tempfile::tempdir().unwrap();
    let registry = FileRegistry::new(dir.path().join("nested-missing").join("registry.json"));

    let err = registry.put(&DeviceRecord::new("x")).await.unwrap_err();
    assert!(matches!(err, ProvisionError::Io { .. }));
}
