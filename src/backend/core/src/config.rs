//! Configuration management.
//!
//! Values come from an optional file overlaid by `PORTCULLIS__*` environment
//! variables, e.g. `PORTCULLIS__SERVER__PORT=9000`.

use axum::http::HeaderName;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use crate::error::{PortcullisError, Result};
use crate::telemetry::LoggingConfig;

const ENV_PREFIX: &str = "PORTCULLIS";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Header carrying the requesting user's id
    #[serde(default = "default_user_header")]
    pub user_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user_header: default_user_header(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured user header, parsed and lowercased.
    pub fn user_header_name(&self) -> Result<HeaderName> {
        HeaderName::from_str(&self.user_header).map_err(|e| {
            PortcullisError::configuration(format!(
                "server.user_header is not a valid header name: {:?}",
                self.user_header
            ))
            .with_source(e)
        })
    }
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_user_header() -> String { "x-user-id".to_string() }

impl Config {
    /// Load configuration from the environment alone.
    pub fn load() -> anyhow::Result<Self> {
        Self::build(None)
    }

    /// Load from a specific file path, environment variables taking precedence.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        Self::build(Some(path.as_ref()))
    }

    fn build(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        cfg.server.user_header_name()?;
        Ok(cfg)
    }
}
