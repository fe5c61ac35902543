// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use relay_api::config::AppConfig;
use relay_server::{init_tracing, run, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = AppConfig::load()?;
    init_tracing(&config.log_format);

    run(config)
        .await
        .inspect_err(|err| tracing::error!(?err, "Relay server failed"))
}
