// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use super::{external::ExternalApi, parse_url, ProviderConfigError};

pub struct SendGrid {
    endpoint: Url,
    key: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct SendGridErrors {
    pub errors: Vec<String>,
}

impl SendGrid {
    pub fn new(base_url: &str, key: SecretString) -> Result<Self, ProviderConfigError> {
        Ok(Self {
            endpoint: parse_url(base_url)?,
            key,
        })
    }
}

impl ExternalApi for SendGrid {
    const NAME: &'static str = "sendgrid";
    type ErrorBody = SendGridErrors;

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.key.expose_secret())
    }

    fn error_message(body: Self::ErrorBody) -> Option<String> {
        if body.errors.is_empty() {
            None
        } else {
            Some(body.errors.join(". "))
        }
    }
}
