// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use dropshot::{ConfigDropshot, ConfigLogging, ConfigLoggingLevel, HttpServer, ServerBuilder};
use relay_api::{
    config::{AppConfig, AppConfigError, ServerLogFormat},
    ContextError, RelayContext,
};
use std::net::SocketAddr;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const REQUEST_BODY_MAX_BYTES: usize = 1024 * 1024;

pub mod endpoints {
    use dropshot::ApiDescription;
    use relay_api::{inject_endpoints, relay_endpoints, RelayContext};

    relay_endpoints!(RelayContext);

    pub fn api() -> ApiDescription<RelayContext> {
        let mut api = ApiDescription::new();
        inject_endpoints!(api);
        api
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] AppConfigError),
    #[error("Failed to construct server context: {0}")]
    Context(#[from] ContextError),
    #[error("Failed to construct request logger: {0}")]
    Logger(#[source] std::io::Error),
    #[error("Failed to start server: {0}")]
    Start(String),
    #[error("Server exited with an error: {0}")]
    Stopped(String),
}

pub fn init_tracing(format: &ServerLogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false);

    match format {
        ServerLogFormat::Json => subscriber.json().init(),
        ServerLogFormat::Pretty => subscriber.pretty().init(),
    }
}

pub fn server(
    context: RelayContext,
    bind_address: SocketAddr,
) -> Result<HttpServer<RelayContext>, ServerError> {
    let config = ConfigDropshot {
        bind_address,
        default_request_body_max_bytes: REQUEST_BODY_MAX_BYTES,
        ..Default::default()
    };

    // Dropshot writes its own per request log to stderr
    let log = ConfigLogging::StderrTerminal {
        level: ConfigLoggingLevel::Info,
    }
    .to_logger("relay-server")
    .map_err(ServerError::Logger)?;

    ServerBuilder::new(endpoints::api(), context, log)
        .config(config)
        .start()
        .map_err(|err| ServerError::Start(err.to_string()))
}

pub async fn run(config: AppConfig) -> Result<(), ServerError> {
    let context = RelayContext::from_config(&config)?;
    let server = server(context, SocketAddr::from(([0, 0, 0, 0], config.server_port)))?;

    tracing::info!(address = %server.local_addr(), "Relay server started");

    server.await.map_err(ServerError::Stopped)
}
