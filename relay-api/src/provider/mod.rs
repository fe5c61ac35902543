// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use http::StatusCode;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use relay_model::Message;
use secrecy::{ExposeSecret, SecretString};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

use crate::config::AppConfig;

mod external;
pub mod mailgun;
pub mod sendgrid;

pub use external::{ExternalApi, ExternalProvider};
pub use mailgun::Mailgun;
pub use sendgrid::SendGrid;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("{provider} returned a response that could not be understood ({status})")]
    BadResponse {
        provider: &'static str,
        status: StatusCode,
    },
    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    #[error("{provider} rejected the message ({status}): {message}")]
    Rejected {
        provider: &'static str,
        status: StatusCode,
        message: String,
    },
    #[error("Request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ProviderConfigError {
    #[error("Failed to construct HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Invalid provider url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// A single external delivery service. Implementations hold only static configuration and may be
/// shared freely between concurrent requests
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    async fn send(&self, message: &Message) -> Result<(), SendError>;
}

// Construct every provider that has credentials in the configuration. Order matters as it is the
// order of the dispatch ring
pub fn providers_from_config(
    config: &AppConfig,
) -> Result<Vec<Arc<dyn Provider>>, ProviderConfigError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_secs))
        .build()
        .map_err(ProviderConfigError::Client)?;

    let mut providers: Vec<Arc<dyn Provider>> = vec![];

    if let Some(mailgun) = &config.mailgun {
        tracing::info!(domain = %mailgun.domain, "Configuring Mailgun provider");
        let key = SecretString::from(mailgun.key.expose_secret().to_string());
        providers.push(Arc::new(ExternalProvider::new(
            client.clone(),
            Mailgun::new(&mailgun.base_url, &mailgun.domain, key)?,
        )));
    }

    if let Some(sendgrid) = &config.sendgrid {
        tracing::info!("Configuring SendGrid provider");
        let key = SecretString::from(sendgrid.key.expose_secret().to_string());
        providers.push(Arc::new(ExternalProvider::new(
            client,
            SendGrid::new(&sendgrid.base_url, key)?,
        )));
    }

    Ok(providers)
}

pub(crate) fn parse_url(url: &str) -> Result<url::Url, ProviderConfigError> {
    url::Url::parse(url).map_err(|source| ProviderConfigError::InvalidUrl {
        url: url.to_string(),
        source,
    })
}
