// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use http::{header, StatusCode};
use relay_model::Message;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tap::TapFallible;
use tracing::instrument;
use url::Url;

use super::{Provider, SendError};

/// The parts of a delivery service that differ between vendors. Everything else about sending a
/// message is shared by [`ExternalProvider`].
pub trait ExternalApi: Send + Sync + 'static {
    const NAME: &'static str;

    /// Shape of the JSON body returned alongside a failure status
    type ErrorBody: DeserializeOwned;

    fn endpoint(&self) -> &Url;
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder;

    // Extract a human readable reason from a decoded error body. Returning None marks the body as
    // unusable
    fn error_message(body: Self::ErrorBody) -> Option<String>;

    fn normalize_error(&self, status: StatusCode, body: &[u8]) -> SendError {
        match serde_json::from_slice::<Self::ErrorBody>(body)
            .ok()
            .and_then(Self::error_message)
        {
            Some(message) => SendError::Rejected {
                provider: Self::NAME,
                status,
                message,
            },
            None => SendError::BadResponse {
                provider: Self::NAME,
                status,
            },
        }
    }
}

pub struct ExternalProvider<A> {
    client: Client,
    api: A,
}

impl<A> ExternalProvider<A>
where
    A: ExternalApi,
{
    pub fn new(client: Client, api: A) -> Self {
        Self { client, api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}

#[async_trait]
impl<A> Provider for ExternalProvider<A>
where
    A: ExternalApi,
{
    #[instrument(skip(self, message), fields(provider = A::NAME), err(Debug))]
    async fn send(&self, message: &Message) -> Result<(), SendError> {
        let body = serde_urlencoded::to_string(message.to_field_map())?;

        let request = self
            .client
            .post(self.api.endpoint().clone())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);

        let response = self
            .api
            .authorize(request)
            .send()
            .await
            .tap_err(|err| tracing::debug!(?err, "Request to provider did not complete"))?;

        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::ACCEPTED => {
                tracing::debug!(?status, "Provider accepted message");
                Ok(())
            }
            _ => {
                let bytes = response.bytes().await?;
                Err(self.api.normalize_error(status, &bytes))
            }
        }
    }
}
