// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use dropshot::{Body, HttpError, RequestContext, UntypedBody};
use http::{header, Response, StatusCode};
use relay_model::Message;
use tap::TapFallible;
use thiserror::Error;
use tracing::instrument;

use crate::{
    context::{ApiContext, RelayContext},
    util::response::{bad_request, to_internal_error, unsupported_media_type},
};

pub const SEND_SUCCESS_MESSAGE: &str = "Message sent successfully.";

#[derive(Debug, Error)]
pub enum IngressError {
    #[error("Failed to parse form body: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
    #[error("Failed to parse JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),
}

impl From<IngressError> for HttpError {
    fn from(value: IngressError) -> Self {
        match value {
            IngressError::UnsupportedMediaType(_) => unsupported_media_type(value),
            IngressError::Form(_) | IngressError::Json(_) => bad_request(value),
        }
    }
}

/// Decode an inbound payload according to its media type. Parameters on the content type, such
/// as a charset, are ignored.
pub fn parse_message(content_type: Option<&str>, body: &[u8]) -> Result<Message, IngressError> {
    let media_type = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match media_type.as_str() {
        "application/json" => Ok(serde_json::from_slice(body)?),
        "application/x-www-form-urlencoded" => Ok(serde_urlencoded::from_bytes(body)?),
        _ => Err(IngressError::UnsupportedMediaType(
            content_type.unwrap_or("none").to_string(),
        )),
    }
}

#[instrument(skip(rqctx, body), err(Debug))]
pub async fn send_email_op(
    rqctx: &RequestContext<impl ApiContext>,
    body: UntypedBody,
) -> Result<Response<Body>, HttpError> {
    let content_type = rqctx
        .request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    send_email_inner(rqctx.relay_ctx(), content_type, body.as_bytes()).await
}

pub async fn send_email_inner(
    ctx: &RelayContext,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Response<Body>, HttpError> {
    let message = parse_message(content_type, body)
        .tap_err(|err| tracing::info!(?err, "Rejected inbound payload"))?;

    ctx.send_message(&message).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(SEND_SUCCESS_MESSAGE.to_string().into())
        .map_err(to_internal_error)
}
