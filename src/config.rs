//! Runtime configuration, read from the environment (a `.env` file is honoured).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_PORT: u16 = 8080;
pub const MFAPI_BASE_URL: &str = "https://api.mfapi.in";
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub mfapi_base_url: String,
    pub alpha_vantage_base_url: String,
    pub alpha_vantage_api_key: String,
    pub gemini_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mfapi_base_url: MFAPI_BASE_URL.to_string(),
            alpha_vantage_base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
            alpha_vantage_api_key: "demo".to_string(),
            gemini_base_url: GEMINI_BASE_URL.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys take defaults;
    /// blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            port: parse_or(get("ADVISOR_PORT"), "ADVISOR_PORT", defaults.port)?,
            mfapi_base_url: get("MFAPI_BASE_URL").unwrap_or(defaults.mfapi_base_url),
            alpha_vantage_base_url: get("ALPHA_VANTAGE_BASE_URL")
                .unwrap_or(defaults.alpha_vantage_base_url),
            alpha_vantage_api_key: get("ALPHA_VANTAGE_API_KEY")
                .unwrap_or(defaults.alpha_vantage_api_key),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            http_timeout_secs: parse_or(
                get("ADVISOR_HTTP_TIMEOUT_SECS"),
                "ADVISOR_HTTP_TIMEOUT_SECS",
                defaults.http_timeout_secs,
            )?,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T> {
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("Invalid {key}: {v}"))),
        None => Ok(default),
    }
}
