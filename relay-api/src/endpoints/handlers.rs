// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[rustfmt::skip]
mod macros {
    #[macro_export]
    macro_rules! relay_endpoints {
        ($context_type:ident) => {
            use dropshot::{endpoint, Body, HttpError, RequestContext, UntypedBody};
            use http::Response;

            use relay_api::endpoints::email::send_email_op;

            /// Send an email through the first available provider. Accepts either a JSON object
            /// or a form encoded body with the fields from, to, subject and text
            #[endpoint {
                method = POST,
                path = "/emails"
            }]
            pub async fn send_email(
                rqctx: RequestContext<$context_type>,
                body: UntypedBody,
            ) -> Result<Response<Body>, HttpError> {
                send_email_op(&rqctx, body).await
            }
        };
    }

    #[macro_export]
    macro_rules! inject_endpoints {
        ($api:ident) => {
            $api.register(send_email)
                .expect("Failed to register endpoint");
        };
    }
}
