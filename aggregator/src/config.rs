//! Process configuration.
//!
//! Loaded once at startup and immutable afterwards. Values come from the
//! environment, optionally seeded from a `.env` file.
//!
//! | Env var                 | Default                  |
//! |-------------------------|--------------------------|
//! | `CONNECTION_LOG_URL`    | `http://localhost:8080`  |
//! | `PERMISSION_SEARCH_URL` | `http://localhost:8081`  |
//! | `HTTP_TIMEOUT_SECS`     | none (transport default) |

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;

pub const DEFAULT_CONNECTION_LOG_URL: &str = "http://localhost:8080";
pub const DEFAULT_PERMISSION_SEARCH_URL: &str = "http://localhost:8081";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Base URL of the connection-log service.
    pub connection_log_url: String,
    /// Base URL of the permission-search service.
    pub permission_search_url: String,
    /// Per-request deadline applied by the HTTP client.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
}

impl Config {
    /// Read configuration from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load(config::Environment::default())
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .set_default("connection_log_url", DEFAULT_CONNECTION_LOG_URL)?
            .set_default("permission_search_url", DEFAULT_PERMISSION_SEARCH_URL)?
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        let config: Config = cfg
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("CONNECTION_LOG_URL", &self.connection_log_url),
            ("PERMISSION_SEARCH_URL", &self.permission_search_url),
        ] {
            let url = Url::parse(value).with_context(|| format!("{key} is not a valid url: {value}"))?;
            if url.cannot_be_a_base() {
                bail!("{key} cannot be used as a base url: {value}");
            }
        }
        if self.http_timeout_secs == Some(0) {
            bail!("HTTP_TIMEOUT_SECS must be positive");
        }
        Ok(())
    }

    /// HTTP client shared by both upstream clients.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder.build().context("Failed to build HTTP client")
    }
}
