use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{QuoteSource, StockQuote, endpoint, snippet};
use crate::error::{Error, Result};

/// Stock quotes from Alpha Vantage: price from `GLOBAL_QUOTE`, name and
/// sector from `OVERVIEW`.
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    quote: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct CompanyOverview {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Sector")]
    sector: Option<String>,
}

impl AlphaVantageClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        let url = endpoint(&self.base_url, "/query");
        debug!("GET {url} function={function} symbol={symbol}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", function),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Http(format!("{status} from {function}: {}", snippet(&text))));
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            Error::Parse(format!("Failed to parse {function}: {e}. Response: {}", snippet(&text)))
        })?;
        check_api_error(&value)?;
        Ok(value)
    }

    async fn price(&self, ticker: &str) -> Result<Option<Decimal>> {
        let raw = self.query("GLOBAL_QUOTE", ticker).await?;
        let body: GlobalQuoteResponse = serde_json::from_value(raw)?;
        Ok(body
            .quote
            .get("05. price")
            .and_then(|price| Decimal::from_str(price.trim()).ok()))
    }

    async fn overview(&self, ticker: &str) -> Result<CompanyOverview> {
        Ok(serde_json::from_value(self.query("OVERVIEW", ticker).await?)?)
    }
}

/// Alpha Vantage reports problems with a 200 status and a message field.
fn check_api_error(value: &Value) -> Result<()> {
    for key in ["Error Message", "Note", "Information"] {
        if let Some(msg) = value.get(key).and_then(Value::as_str) {
            return Err(Error::Api(msg.to_string()));
        }
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty() && v != "None")
}

#[async_trait]
impl QuoteSource for AlphaVantageClient {
    #[instrument(skip(self))]
    async fn quote(&self, ticker: &str) -> Result<StockQuote> {
        let price = self.price(ticker).await?;

        // Overview coverage is patchy outside US listings; a miss only blanks
        // the descriptive fields.
        let overview = match self.overview(ticker).await {
            Ok(overview) => overview,
            Err(e) => {
                warn!("Overview unavailable for {ticker}: {e}");
                CompanyOverview::default()
            }
        };

        Ok(StockQuote {
            ticker: ticker.to_string(),
            name: non_empty(overview.name),
            price,
            sector: non_empty(overview.sector),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AlphaVantageClient {
        AlphaVantageClient::new(Client::new(), server.uri(), "test_key")
    }

    async fn mount_function(server: &MockServer, function: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param("function", function))
            .and(query_param("apikey", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn quote_combines_price_and_overview() {
        let server = MockServer::start().await;
        mount_function(
            &server,
            "GLOBAL_QUOTE",
            json!({"Global Quote": {"01. symbol": "IBM", "05. price": "231.4400"}}),
        )
        .await;
        mount_function(
            &server,
            "OVERVIEW",
            json!({"Symbol": "IBM", "Name": "International Business Machines", "Sector": "TECHNOLOGY"}),
        )
        .await;

        let quote = client_for(&server).quote("IBM").await.expect("quote");
        assert_eq!(quote.price, Some(Decimal::new(2_314_400, 4)));
        assert_eq!(quote.name.as_deref(), Some("International Business Machines"));
        assert_eq!(quote.sector.as_deref(), Some("TECHNOLOGY"));
    }

    #[tokio::test]
    async fn empty_overview_leaves_descriptive_fields_blank() {
        let server = MockServer::start().await;
        mount_function(
            &server,
            "GLOBAL_QUOTE",
            json!({"Global Quote": {"05. price": "2950.10"}}),
        )
        .await;
        mount_function(&server, "OVERVIEW", json!({})).await;

        let quote = client_for(&server).quote("RELIANCE.BSE").await.expect("quote");
        assert!(quote.price.is_some());
        assert_eq!(quote.name, None);
        assert_eq!(quote.sector, None);
    }

    #[tokio::test]
    async fn rate_limit_note_is_an_api_error() {
        let server = MockServer::start().await;
        mount_function(
            &server,
            "GLOBAL_QUOTE",
            json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}),
        )
        .await;

        let err = client_for(&server).quote("IBM").await.expect_err("rate limited");
        assert!(matches!(err, Error::Api(msg) if msg.contains("call frequency")));
    }

    #[tokio::test]
    async fn unknown_symbol_has_no_price() {
        let server = MockServer::start().await;
        mount_function(&server, "GLOBAL_QUOTE", json!({"Global Quote": {}})).await;
        mount_function(&server, "OVERVIEW", json!({})).await;

        let quote = client_for(&server).quote("NOPE").await.expect("quote");
        assert_eq!(quote, StockQuote::unavailable("NOPE"));
    }
}
