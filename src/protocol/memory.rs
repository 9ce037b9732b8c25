// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process transport recording every call.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{ClientToken, ShadowTransport};
use crate::error::ProtocolError;

/// A call made on a [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    /// `register(thing)`.
    Register(String),
    /// `update(thing, document)` that returned a token.
    Update {
        /// Thing name.
        thing: String,
        /// Update document.
        document: serde_json::Value,
    },
    /// `subscribe(topic)`.
    Subscribe(String),
    /// `publish(topic, payload)`.
    Publish {
        /// Topic name.
        topic: String,
        /// Message payload.
        payload: String,
    },
}

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<TransportCall>,
    reject_updates: bool,
}

/// Transport that keeps every call in memory.
///
/// Clones share the same call log, so a test can hand one clone to the
/// runner and inspect the other.
///
/// # Examples
///
/// ```
/// use smartproduct_sim::protocol::{MemoryTransport, ShadowTransport, TransportCall};
///
/// let transport = MemoryTransport::new();
/// let mut handle = transport.clone();
/// handle.publish("a/b", "{}").unwrap();
///
/// assert_eq!(transport.publishes_to("a/b"), vec!["{}".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryTransport {
    /// Creates an empty transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent `update` calls return no token, as if an update
    /// were still in flight.
    pub fn set_reject_updates(&self, reject: bool) {
        self.inner.lock().reject_updates = reject;
    }

    /// Returns every recorded call in order.
    #[must_use]
    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner.lock().calls.clone()
    }

    /// Returns the payloads published on `topic` in order.
    #[must_use]
    pub fn publishes_to(&self, topic: &str) -> Vec<String> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::Publish { topic: t, payload } if t == topic => {
                    Some(payload.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Returns the shadow documents sent in order.
    #[must_use]
    pub fn updates(&self) -> Vec<serde_json::Value> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::Update { document, .. } => Some(document.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forgets all recorded calls.
    pub fn clear(&self) {
        self.inner.lock().calls.clear();
    }
}

impl ShadowTransport for MemoryTransport {
    fn register(&mut self, thing: &str) -> Result<(), ProtocolError> {
        self.inner
            .lock()
            .calls
            .push(TransportCall::Register(thing.to_string()));
        Ok(())
    }

    fn update(
        &mut self,
        thing: &str,
        document: &serde_json::Value,
    ) -> Result<Option<ClientToken>, ProtocolError> {
        let mut inner = self.inner.lock();
        if inner.reject_updates {
            return Ok(None);
        }
        inner.calls.push(TransportCall::Update {
            thing: thing.to_string(),
            document: document.clone(),
        });
        Ok(Some(ClientToken::generate()))
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), ProtocolError> {
        self.inner
            .lock()
            .calls
            .push(TransportCall::Subscribe(topic.to_string()));
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
        self.inner.lock().calls.push(TransportCall::Publish {
            topic: topic.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }
}
