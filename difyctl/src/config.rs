//! Client configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `DIFYCTL_CONFIG`
//! environment variable. A missing file is not an error: every field has a default.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `DIFYCTL_` override YAML values
//! 3. **DIFY_API_KEY** - Special case: overrides `api_key` if set
//!
//! ## Example
//!
//! ```yaml
//! base_url: https://dify.internal.example.com/api
//! api_key: app-xxxxxxxx
//! request_timeout: 2m
//! user: ingest-bot
//! ```
//!
//! ```bash
//! DIFYCTL_REQUEST_TIMEOUT=30s
//! DIFY_API_KEY=app-xxxxxxxx
//! ```

use clap::{Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::errors::Error;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "DIFYCTL_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without calling the API.
    #[arg(long)]
    pub validate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a local file and print the stored file's metadata as JSON
    Upload {
        /// File to upload
        file: PathBuf,

        /// End-user identifier forwarded to the service (defaults to `user` from the config)
        #[arg(short, long)]
        user: Option<String>,
    },
}

/// Client configuration.
///
/// All fields have defaults, so an empty file (or no file) yields a usable configuration
/// pointing at the hosted service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root URL of the API. Endpoint paths such as `/v1/files/upload` are joined onto it,
    /// keeping any path prefix (e.g. `https://example.com/dify`).
    pub base_url: Url,
    /// API key sent as `Authorization: Bearer <key>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Timeout applied to every request made by the client
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Default end-user identifier for commands that need one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            api_key: None,
            request_timeout: Duration::from_secs(60),
            user: None,
        }
    }
}

impl Config {
    fn default_base_url() -> Url {
        Url::parse("https://api.dify.ai").expect("default base URL is valid")
    }

    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("base_url must use http or https, got '{}'", self.base_url.scheme()),
            });
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config {
                message: "request_timeout must be greater than zero".to_string(),
            });
        }

        if self.api_key.as_deref().is_some_and(str::is_empty) {
            return Err(Error::Config {
                message: "api_key is set but empty. Unset it or provide a key.".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("DIFYCTL_").ignore(&["CONFIG"]).split("__"))
            .merge(Env::raw().only(&["DIFY_API_KEY"]).map(|_| "api_key".into()))
    }
}
