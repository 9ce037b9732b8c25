// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device shadow documents.
//!
//! Outbound [`ShadowDocument`]s write the `reported` or `desired` section of
//! the thing's shadow. Inbound delta documents are decoded into a
//! [`DesiredState`] and reconciled against the local
//! [`DeviceState`](crate::state::DeviceState).

mod delta;
mod document;

pub use delta::DesiredState;
pub use document::{ShadowDocument, ShadowState, reported_section};
