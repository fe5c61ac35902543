// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use super::{external::ExternalApi, parse_url, ProviderConfigError};

pub struct Mailgun {
    endpoint: Url,
    key: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct MailgunError {
    pub message: String,
}

impl Mailgun {
    pub fn new(
        base_url: &str,
        domain: &str,
        key: SecretString,
    ) -> Result<Self, ProviderConfigError> {
        let endpoint = parse_url(&format!(
            "{}/{}/messages",
            base_url.trim_end_matches('/'),
            domain
        ))?;

        Ok(Self { endpoint, key })
    }
}

impl ExternalApi for Mailgun {
    const NAME: &'static str = "mailgun";
    type ErrorBody = MailgunError;

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth("api", Some(self.key.expose_secret()))
    }

    fn error_message(body: Self::ErrorBody) -> Option<String> {
        Some(body.message)
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use relay_model::Message;
    use secrecy::SecretString;
    use wiremock::{
        matchers::{basic_auth, body_string_contains, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::Mailgun;
    use crate::provider::{ExternalApi, ExternalProvider, Provider, SendError};

    fn message() -> Message {
        Message::new(
            "sender@example.com",
            "recipient@example.com",
            "Greetings",
            "Hello there",
        )
    }

    fn provider(server: &MockServer) -> ExternalProvider<Mailgun> {
        ExternalProvider::new(
            reqwest::Client::new(),
            Mailgun::new(
                &server.uri(),
                "mg.example.com",
                SecretString::from("mailgun-key".to_string()),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_endpoint_includes_domain() {
        let mailgun = Mailgun::new(
            "https://api.mailgun.net/v3/",
            "mg.example.com",
            SecretString::from("key".to_string()),
        )
        .unwrap();

        assert_eq!(
            "https://api.mailgun.net/v3/mg.example.com/messages",
            mailgun.endpoint().as_str()
        );
    }

    #[tokio::test]
    async fn test_sends_authorized_form_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/mg.example.com/messages"))
            .and(basic_auth("api", "mailgun-key"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("from=sender%40example.com"))
            .and(body_string_contains("subject=Greetings"))
            .and(body_string_contains("text=Hello+there"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        provider(&server).send(&message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_accepted_is_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        assert!(provider(&server).send(&message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_error_message_is_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"message":"'to' parameter is not a valid address"}"#),
            )
            .mount(&server)
            .await;

        match provider(&server).send(&message()).await {
            Err(SendError::Rejected {
                provider,
                status,
                message,
            }) => {
                assert_eq!("mailgun", provider);
                assert_eq!(StatusCode::BAD_REQUEST, status);
                assert_eq!("'to' parameter is not a valid address", message);
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unexpected_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        assert!(matches!(
            provider(&server).send(&message()).await,
            Err(SendError::BadResponse {
                provider: "mailgun",
                status: StatusCode::INTERNAL_SERVER_ERROR,
            })
        ));
    }
}
