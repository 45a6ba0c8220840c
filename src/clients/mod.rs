//! External data collaborators: the mutual-fund directory, NAV and stock quote
//! lookups the advisor enriches its output with, and the LLM used for commentary.
//!
//! Every collaborator is a trait so the advisor can be driven by stubs in tests.
//! Responses are typed records; a value the upstream could not supply is `None`
//! rather than a sentinel string.

mod alpha_vantage;
mod gemini;
mod mfapi;

pub use alpha_vantage::AlphaVantageClient;
pub use gemini::GeminiClient;
pub use mfapi::MfApiClient;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("wealth-advisor/", env!("CARGO_PKG_VERSION"));

/// One entry of the mutual-fund directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemeRecord {
    pub scheme_code: u64,
    pub scheme_name: String,
    #[serde(default)]
    pub isin_growth: Option<String>,
    #[serde(default)]
    pub isin_div_reinvestment: Option<String>,
}

/// Latest NAV of a scheme. `nav` is `None` when the service had no price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundQuote {
    pub name: String,
    pub code: u64,
    pub nav: Option<Decimal>,
    pub nav_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub ticker: String,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub sector: Option<String>,
}

impl StockQuote {
    pub fn unavailable(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            name: None,
            price: None,
            sector: None,
        }
    }
}

#[async_trait]
pub trait FundDirectory: Send + Sync {
    async fn list_schemes(&self) -> Result<Vec<SchemeRecord>>;
}

#[async_trait]
pub trait NavSource: Send + Sync {
    async fn latest_nav(&self, scheme_code: u64) -> Result<FundQuote>;
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, ticker: &str) -> Result<StockQuote>;
}

/// Free-form text generation, used for summaries and questions.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Shared HTTP client for every collaborator. No retries are layered on top.
pub fn http_client(config: &AppConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.http_timeout())
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::Http(format!("Failed to create HTTP client: {e}")))
}

/// Join a configured base URL and a path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Leading slice of a response body for log and error messages.
pub(crate) fn snippet(text: &str) -> &str {
    let mut end = text.len().min(200);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
