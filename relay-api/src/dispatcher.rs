// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use relay_model::Message;
use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use thiserror::Error;
use tracing::instrument;

use crate::provider::Provider;

#[derive(Debug, Error)]
pub enum DispatcherConfigError {
    #[error("At least one email provider must be configured")]
    NoProviders,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("All email providers failed to send the message")]
pub struct ServiceUnavailable;

/// Routes messages through a fixed ring of providers. Every send starts at the provider under the
/// shared cursor and fails over around the ring until a provider accepts the message.
pub struct Dispatcher {
    providers: Vec<Arc<dyn Provider>>,
    cursor: AtomicUsize,
}

impl Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("providers", &self.providers.len())
            .field("cursor", &self.cursor())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Result<Self, DispatcherConfigError> {
        if providers.is_empty() {
            Err(DispatcherConfigError::NoProviders)
        } else {
            Ok(Self {
                providers,
                cursor: AtomicUsize::new(0),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    // Move the cursor one step around the ring, returning the position it held beforehand
    fn advance(&self) -> usize {
        let len = self.providers.len();

        match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some((current + 1) % len)
            }) {
            Ok(previous) | Err(previous) => previous,
        }
    }

    #[instrument(skip(self, message), err(Debug))]
    pub async fn send(&self, message: &Message) -> Result<(), ServiceUnavailable> {
        let len = self.providers.len();
        let start = self.advance();

        for attempt in 0..len {
            // The first attempt consumed the reservation above. Later attempts stay on this call's
            // ring but still account for themselves on the shared cursor
            if attempt > 0 {
                self.advance();
            }

            let index = (start + attempt) % len;

            match self.providers[index].send(message).await {
                Ok(()) => {
                    tracing::info!(provider = index, attempt, "Message delivered");
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(
                        provider = index,
                        attempt,
                        ?err,
                        "Provider failed to send message"
                    );
                }
            }
        }

        tracing::error!(attempts = len, "Exhausted all email providers");

        Err(ServiceUnavailable)
    }
}
