//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `kwtraffic.yaml` but can be specified via `-f` flag or `KWTRAFFIC_CONFIG`
//! environment variable. A missing file is not an error; every setting has a default except the
//! credentials.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `kwtraffic.yaml`)
//! 2. **Environment variables** - Variables prefixed with `KWTRAFFIC_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `KWTRAFFIC_API__ACCESS_TOKEN=ya29...` sets the `api.access_token` field.
//!
//! ## Example
//!
//! ```yaml
//! api:
//!   endpoint: https://adwords.google.com
//!   version: v201806
//!   developer_token: abc123
//!   client_customer_id: 123-456-7890
//!   request_timeout: 30s
//! estimate:
//!   max_cpc_micros: 1000000
//!   max_keywords_per_request: 2000
//!   platform_estimate_requested: true
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::errors::Error;

/// CLI arguments: the input table plus where to find configuration.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// CSV file with keyword, match_type and campaign_id columns
    pub input: PathBuf,

    /// Path to configuration file
    #[arg(short = 'f', long, env = "KWTRAFFIC_CONFIG", default_value = "kwtraffic.yaml")]
    pub config: String,

    /// Validate configuration and exit without calling the estimation service.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Estimation service connection and credentials
    pub api: ApiConfig,
    /// Parameters sent with every estimate request
    pub estimate: EstimateConfig,
}

/// Connection settings for the traffic estimator service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL of the service
    pub endpoint: Url,
    /// API version path segment, e.g. `v201806`
    pub version: String,
    /// Developer token sent in the `developerToken` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer_token: Option<String>,
    /// Account the estimates are computed for (`clientCustomerId` header)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_customer_id: Option<String>,
    /// OAuth2 access token sent as a bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Timeout for one estimate call
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse("https://adwords.google.com").expect("default endpoint is a valid URL"),
            version: "v201806".to_string(),
            developer_token: None,
            client_customer_id: None,
            access_token: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Per-request estimation parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimateConfig {
    /// Max CPC bid sent with each ad group request, in micro-units (1,000,000 = one currency unit)
    pub max_cpc_micros: i64,
    /// Upper bound on keywords in one call, as enforced by the service
    pub max_keywords_per_request: usize,
    /// Ask the service for per-device breakdowns
    pub platform_estimate_requested: bool,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            max_cpc_micros: 1_000_000,
            max_keywords_per_request: 2000,
            platform_estimate_requested: true,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if !matches!(self.api.endpoint.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!(
                    "api.endpoint must be an http(s) URL, got '{}'",
                    self.api.endpoint
                ),
            });
        }

        if self.api.version.trim().is_empty() {
            return Err(Error::Config {
                message: "api.version cannot be empty (e.g. v201806)".to_string(),
            });
        }

        if self.api.request_timeout.is_zero() {
            return Err(Error::Config {
                message: "api.request_timeout must be greater than zero".to_string(),
            });
        }

        if self.estimate.max_cpc_micros <= 0 {
            return Err(Error::Config {
                message: format!(
                    "estimate.max_cpc_micros must be positive, got {}",
                    self.estimate.max_cpc_micros
                ),
            });
        }

        if self.estimate.max_keywords_per_request == 0 {
            return Err(Error::Config {
                message: "estimate.max_keywords_per_request cannot be 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values
            .merge(Env::prefixed("KWTRAFFIC_").split("__").ignore(&["config"]))
    }
}
