// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use dropshot::{HttpError, RequestContext, ServerContext};
use relay_model::{Message, ValidationError};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

use crate::{
    config::AppConfig,
    dispatcher::{Dispatcher, DispatcherConfigError, ServiceUnavailable},
    provider::{providers_from_config, Provider, ProviderConfigError},
    util::response::{bad_request, unavailable},
};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Dispatcher(#[from] DispatcherConfigError),
    #[error(transparent)]
    Provider(#[from] ProviderConfigError),
}

#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error(transparent)]
    Unavailable(#[from] ServiceUnavailable),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<SendMessageError> for HttpError {
    fn from(value: SendMessageError) -> Self {
        match value {
            SendMessageError::Validation(err) => bad_request(err),
            SendMessageError::Unavailable(err) => unavailable(err),
        }
    }
}

#[derive(Debug)]
pub struct RelayContext {
    dispatcher: Dispatcher,
}

pub trait ApiContext: ServerContext {
    fn relay_ctx(&self) -> &RelayContext;
}

impl ApiContext for RelayContext {
    fn relay_ctx(&self) -> &RelayContext {
        self
    }
}

impl<T> ApiContext for RequestContext<T>
where
    T: ApiContext,
{
    fn relay_ctx(&self) -> &RelayContext {
        self.context().relay_ctx()
    }
}

impl RelayContext {
    pub fn new(providers: Vec<Arc<dyn Provider>>) -> Result<Self, DispatcherConfigError> {
        Ok(Self {
            dispatcher: Dispatcher::new(providers)?,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ContextError> {
        let providers = providers_from_config(config)?;
        Ok(Self::new(providers)?)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    // Validation failures never reach the dispatcher
    #[instrument(skip(self, message), err(Debug))]
    pub async fn send_message(&self, message: &Message) -> Result<(), SendMessageError> {
        message.validate()?;
        self.dispatcher.send(message).await?;
        Ok(())
    }
}
