// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{path::Path, str::FromStr};

use secrecy::SecretString;
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer,
};
use thiserror::Error;

pub const DEFAULT_MAILGUN_BASE_URL: &str = "https://api.mailgun.net/v3";
pub const DEFAULT_SENDGRID_BASE_URL: &str = "https://api.sendgrid.com/api/mail.send.json";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Encountered invalid log format.")]
    InvalidLogFormatVariant,
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("Failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to read configuration file: {0}")]
    Read(#[from] std::io::Error),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum ServerLogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for ServerLogFormat {
    type Err = AppConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            _ => Err(AppConfigError::InvalidLogFormatVariant),
        }
    }
}

impl<'de> Deserialize<'de> for ServerLogFormat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LogFormat;

        impl<'de> Visitor<'de> for LogFormat {
            type Value = ServerLogFormat;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(LogFormat)
    }
}

#[derive(Debug, Deserialize)]
pub struct HttpClientConfig {
    pub timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

#[derive(Debug, Deserialize)]
pub struct MailgunConfig {
    #[serde(default = "default_mailgun_base_url")]
    pub base_url: String,
    pub domain: String,
    pub key: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct SendGridConfig {
    #[serde(default = "default_sendgrid_base_url")]
    pub base_url: String,
    pub key: SecretString,
}

fn default_mailgun_base_url() -> String {
    DEFAULT_MAILGUN_BASE_URL.to_string()
}

fn default_sendgrid_base_url() -> String {
    DEFAULT_SENDGRID_BASE_URL.to_string()
}

fn default_server_port() -> u16 {
    8080
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log_format: ServerLogFormat,
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    #[serde(default)]
    pub http: HttpClientConfig,
    pub mailgun: Option<MailgunConfig>,
    pub sendgrid: Option<SendGridConfig>,
}

impl AppConfig {
    /// Reads configuration from the TOML file named by `RELAY_CONFIG` if it is set, and from the
    /// process environment otherwise
    pub fn load() -> Result<Self, AppConfigError> {
        match std::env::var("RELAY_CONFIG") {
            Ok(path) => Self::from_file(path),
            Err(_) => Self::from_lookup(|name| std::env::var(name).ok()),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    // Build a configuration from individual variables. Empty values are treated as unset, and a
    // provider is only configured when all of its credentials are available
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let log_format = var("LOG_FORMAT")
            .map(|value| value.parse::<ServerLogFormat>())
            .transpose()?
            .unwrap_or_default();

        let server_port = var("PORT")
            .map(|value| {
                value.parse::<u16>().map_err(|_| AppConfigError::InvalidValue {
                    name: "PORT",
                    value,
                })
            })
            .transpose()?
            .unwrap_or_else(default_server_port);

        let http = var("HTTP_TIMEOUT_SECS")
            .map(|value| {
                value
                    .parse::<u64>()
                    .map(|timeout_secs| HttpClientConfig { timeout_secs })
                    .map_err(|_| AppConfigError::InvalidValue {
                        name: "HTTP_TIMEOUT_SECS",
                        value,
                    })
            })
            .transpose()?
            .unwrap_or_default();

        let mailgun = match (var("MAILGUN_DOMAIN"), var("MAILGUN_KEY")) {
            (Some(domain), Some(key)) => Some(MailgunConfig {
                base_url: var("MAILGUN_BASE_URL").unwrap_or_else(default_mailgun_base_url),
                domain,
                key: SecretString::from(key),
            }),
            _ => None,
        };

        let sendgrid = var("SENDGRID_KEY").map(|key| SendGridConfig {
            base_url: var("SENDGRID_BASE_URL").unwrap_or_else(default_sendgrid_base_url),
            key: SecretString::from(key),
        });

        Ok(Self {
            log_format,
            server_port,
            http,
            mailgun,
            sendgrid,
        })
    }
}
