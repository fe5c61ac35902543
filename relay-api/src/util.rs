// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod response {
    use dropshot::{ClientErrorStatusCode, HttpError};
    use std::{error::Error, fmt::Debug};
    use tracing::instrument;

    pub fn client_error<S>(status_code: ClientErrorStatusCode, message: S) -> HttpError
    where
        S: ToString,
    {
        HttpError::for_client_error(None, status_code, message.to_string())
    }

    pub fn bad_request<S>(message: S) -> HttpError
    where
        S: ToString,
    {
        HttpError::for_bad_request(None, message.to_string())
    }

    pub fn unsupported_media_type<S>(message: S) -> HttpError
    where
        S: ToString,
    {
        client_error(ClientErrorStatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }

    pub fn unavailable<S>(message: S) -> HttpError
    where
        S: ToString,
    {
        HttpError::for_unavail(None, message.to_string())
    }

    #[instrument(skip(error))]
    pub fn to_internal_error<E>(error: E) -> HttpError
    where
        E: Error,
    {
        tracing::error!(?error, "Encountered internal error");
        internal_error(error.to_string())
    }

    #[instrument(skip(internal_message))]
    pub fn internal_error<S>(internal_message: S) -> HttpError
    where
        S: ToString + Debug,
    {
        let internal_message_fmt = internal_message.to_string();
        tracing::error!(error = ?internal_message, message = internal_message_fmt, "Request failed");
        HttpError::for_internal_error(internal_message_fmt)
    }
}
