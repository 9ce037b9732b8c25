// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shadow update documents.

use serde::Serialize;

use crate::state::ShadowReport;

/// Section of the shadow a document writes to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowState {
    /// What the device currently observes.
    Reported(ShadowReport),
    /// What the device should converge to.
    Desired(ShadowReport),
}

/// A shadow update document: `{"state": {"reported": {...}}}` or
/// `{"state": {"desired": {...}}}`.
///
/// # Examples
///
/// ```
/// use smartproduct_sim::shadow::ShadowDocument;
/// use smartproduct_sim::state::DeviceState;
///
/// let doc = ShadowDocument::reported(DeviceState::default().report());
/// let json = serde_json::to_value(&doc).unwrap();
/// assert_eq!(json["state"]["reported"]["powerStatus"], "OFF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShadowDocument {
    /// The section being written.
    pub state: ShadowState,
}

impl ShadowDocument {
    /// Creates a `reported` document.
    #[must_use]
    pub fn reported(report: ShadowReport) -> Self {
        Self {
            state: ShadowState::Reported(report),
        }
    }

    /// Creates a `desired` document.
    #[must_use]
    pub fn desired(report: ShadowReport) -> Self {
        Self {
            state: ShadowState::Desired(report),
        }
    }

    /// Returns the snapshot carried by this document.
    #[must_use]
    pub fn report(&self) -> &ShadowReport {
        match &self.state {
            ShadowState::Reported(r) | ShadowState::Desired(r) => r,
        }
    }
}

/// Returns the `state.reported` section of a shadow response, if present.
#[must_use]
pub fn reported_section(document: &serde_json::Value) -> Option<&serde_json::Value> {
    document.get("state")?.get("reported")
}
