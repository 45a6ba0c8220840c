use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::{FundDirectory, FundQuote, NavSource, SchemeRecord, endpoint, snippet};
use crate::error::{Error, Result};

/// Client for the public mfapi.in mutual-fund service.
#[derive(Debug, Clone)]
pub struct MfApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SchemeHistory {
    #[serde(default)]
    meta: SchemeMeta,
    #[serde(default)]
    data: Vec<NavPoint>,
}

#[derive(Debug, Default, Deserialize)]
struct SchemeMeta {
    scheme_name: Option<String>,
    scheme_code: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct NavPoint {
    date: String,
    nav: String,
}

impl MfApiClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = endpoint(&self.base_url, path);
        debug!("GET {url}");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(Error::Http(format!("{status} from {url}: {}", snippet(&text))));
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::Parse(format!("Failed to parse {url}: {e}. Response: {}", snippet(&text)))
        })
    }
}

#[async_trait]
impl FundDirectory for MfApiClient {
    #[instrument(skip(self))]
    async fn list_schemes(&self) -> Result<Vec<SchemeRecord>> {
        self.get_json("/mf").await
    }
}

#[async_trait]
impl NavSource for MfApiClient {
    #[instrument(skip(self))]
    async fn latest_nav(&self, scheme_code: u64) -> Result<FundQuote> {
        let history: SchemeHistory = self.get_json(&format!("/mf/{scheme_code}")).await?;
        let name = history
            .meta
            .scheme_name
            .ok_or_else(|| Error::NotFound(format!("scheme {scheme_code}")))?;

        // The service lists newest first.
        let latest = history.data.first();
        let nav = latest.and_then(|point| match Decimal::from_str(point.nav.trim()) {
            Ok(nav) => Some(nav),
            Err(e) => {
                warn!("Unparseable NAV {:?} for scheme {scheme_code}: {e}", point.nav);
                None
            }
        });

        Ok(FundQuote {
            name,
            code: history.meta.scheme_code.unwrap_or(scheme_code),
            nav,
            nav_date: latest.map(|point| point.date.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> MfApiClient {
        MfApiClient::new(Client::new(), server.uri())
    }

    #[tokio::test]
    async fn list_schemes_parses_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"schemeCode": 100027, "schemeName": "Grindlays Super Saver Income Fund-GSSIF-Half Yearly Dividend", "isinGrowth": null, "isinDivReinvestment": null},
                {"schemeCode": 122639, "schemeName": "Parag Parikh Flexi Cap Fund - Direct Plan - Growth", "isinGrowth": "INF879O01027", "isinDivReinvestment": null}
            ])))
            .mount(&server)
            .await;

        let schemes = client_for(&server).list_schemes().await.expect("schemes");
        assert_eq!(schemes.len(), 2);
        assert_eq!(schemes[1].scheme_code, 122639);
    }

    #[tokio::test]
    async fn list_schemes_reports_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mf"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_schemes().await.expect_err("503");
        assert!(matches!(err, Error::Http(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn latest_nav_takes_newest_point() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mf/122639"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": {
                    "fund_house": "PPFAS Mutual Fund",
                    "scheme_name": "Parag Parikh Flexi Cap Fund - Direct Plan - Growth",
                    "scheme_code": 122639
                },
                "data": [
                    {"date": "17-10-2025", "nav": "91.20610"},
                    {"date": "16-10-2025", "nav": "90.95200"}
                ],
                "status": "SUCCESS"
            })))
            .mount(&server)
            .await;

        let quote = client_for(&server).latest_nav(122639).await.expect("quote");
        assert_eq!(quote.code, 122639);
        assert_eq!(quote.nav, Some(Decimal::new(9_120_610, 5)));
        assert_eq!(quote.nav_date.as_deref(), Some("17-10-2025"));
    }

    #[tokio::test]
    async fn latest_nav_without_data_has_no_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mf/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": {"scheme_name": "Closed Scheme", "scheme_code": 1},
                "data": []
            })))
            .mount(&server)
            .await;

        let quote = client_for(&server).latest_nav(1).await.expect("quote");
        assert_eq!(quote.name, "Closed Scheme");
        assert_eq!(quote.nav, None);
    }

    #[tokio::test]
    async fn latest_nav_for_unknown_scheme_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mf/999999"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": {},
                "data": [],
                "status": "SUCCESS"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).latest_nav(999999).await.expect_err("unknown");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_payload_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mf"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_schemes().await.expect_err("html");
        assert!(matches!(err, Error::Parse(_)));
    }
}
