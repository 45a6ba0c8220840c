use std::fmt::Write;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::advice::CURRENCY_SYMBOL;
use super::engine::recommend_by_age;
use super::types::AllocationResult;
use crate::clients::{
    AlphaVantageClient, FundDirectory, FundQuote, MfApiClient, NavSource, QuoteSource,
    SchemeRecord, StockQuote, http_client,
};
use crate::config::AppConfig;
use crate::error::Result;

pub const SEARCH_UNAVAILABLE_MESSAGE: &str = "Unable to fetch results. Check your internet or API.";

/// Schemes quoted alongside an age-bracket recommendation.
pub const RECOMMENDED_FUNDS: [(u64, &str); 3] = [
    (122639, "Parag Parikh Flexi Cap Fund - Direct Plan - Growth"),
    (120503, "Axis ELSS Tax Saver Fund - Direct Plan - Growth"),
    (118989, "HDFC Mid-Cap Opportunities Fund - Direct Plan - Growth"),
];

/// Tickers quoted alongside an age-bracket recommendation.
pub const WATCHLIST_TICKERS: [&str; 3] = ["RELIANCE.BSE", "TCS.BSE", "INFY.BSE"];

const UNAVAILABLE: &str = "Unavailable";
const NOT_AVAILABLE: &str = "N/A";

/// A fund search hit. A failed directory read yields a single listing with no
/// scheme code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundListing {
    pub scheme_name: String,
    pub scheme_code: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isin_growth: Option<String>,
}

impl FundListing {
    pub fn unavailable() -> Self {
        Self {
            scheme_name: SEARCH_UNAVAILABLE_MESSAGE.to_string(),
            scheme_code: None,
            isin_growth: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.scheme_code.is_none()
    }
}

impl From<SchemeRecord> for FundListing {
    fn from(record: SchemeRecord) -> Self {
        Self {
            scheme_name: record.scheme_name,
            scheme_code: Some(record.scheme_code),
            isin_growth: record.isin_growth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub funds: Vec<FundQuote>,
    pub stocks: Vec<StockQuote>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRecommendation {
    #[serde(flatten)]
    pub allocation: AllocationResult,
    pub enrichment: Enrichment,
}

/// Couples the pure allocation engine with the market-data collaborators.
#[derive(Clone)]
pub struct Advisor {
    directory: Arc<dyn FundDirectory>,
    navs: Arc<dyn NavSource>,
    quotes: Arc<dyn QuoteSource>,
}

impl Advisor {
    pub fn new(
        directory: Arc<dyn FundDirectory>,
        navs: Arc<dyn NavSource>,
        quotes: Arc<dyn QuoteSource>,
    ) -> Self {
        Self {
            directory,
            navs,
            quotes,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = http_client(config)?;
        let mfapi = Arc::new(MfApiClient::new(client.clone(), &config.mfapi_base_url));
        let quotes = Arc::new(AlphaVantageClient::new(
            client,
            &config.alpha_vantage_base_url,
            &config.alpha_vantage_api_key,
        ));
        Ok(Self::new(mfapi.clone(), mfapi, quotes))
    }

    /// Case-insensitive substring match on scheme names. Never fails: a
    /// directory error yields one placeholder listing.
    pub async fn search_funds(&self, query: &str) -> Vec<FundListing> {
        let schemes = match self.directory.list_schemes().await {
            Ok(schemes) => schemes,
            Err(e) => {
                warn!("Fund directory unavailable: {e}");
                return vec![FundListing::unavailable()];
            }
        };

        let needle = query.to_lowercase();
        let hits: Vec<FundListing> = schemes
            .into_iter()
            .filter(|scheme| scheme.scheme_name.to_lowercase().contains(&needle))
            .map(FundListing::from)
            .collect();
        info!(query, hits = hits.len(), "fund search");
        hits
    }

    /// Quotes the fixed fund list and watchlist one after another. Each
    /// failure blanks only its own entry.
    pub async fn enrichment(&self) -> Enrichment {
        let mut funds = Vec::with_capacity(RECOMMENDED_FUNDS.len());
        for (code, name) in RECOMMENDED_FUNDS {
            let quote = match self.navs.latest_nav(code).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!("NAV unavailable for scheme {code}: {e}");
                    FundQuote {
                        name: name.to_string(),
                        code,
                        nav: None,
                        nav_date: None,
                    }
                }
            };
            funds.push(quote);
        }

        let mut stocks = Vec::with_capacity(WATCHLIST_TICKERS.len());
        for ticker in WATCHLIST_TICKERS {
            let quote = match self.quotes.quote(ticker).await {
                Ok(quote) => quote,
                Err(e) => {
                    warn!("Quote unavailable for {ticker}: {e}");
                    StockQuote::unavailable(ticker)
                }
            };
            stocks.push(quote);
        }

        Enrichment { funds, stocks }
    }

    /// Appends market data to an existing recommendation. The allocation
    /// figures are never touched.
    pub async fn enrich(&self, mut allocation: AllocationResult) -> EnrichedRecommendation {
        let enrichment = self.enrichment().await;
        allocation.advice_text.push_str(&render_enrichment(&enrichment));
        EnrichedRecommendation {
            allocation,
            enrichment,
        }
    }

    pub async fn recommend_by_age_enriched(
        &self,
        age: u32,
        monthly_income: f64,
        profession: &str,
        region: &str,
    ) -> EnrichedRecommendation {
        self.enrich(recommend_by_age(age, monthly_income, profession, region))
            .await
    }
}

fn price_text(value: Option<Decimal>, missing: &str) -> String {
    match value {
        Some(v) => format!("{CURRENCY_SYMBOL}{}", v.normalize()),
        None => missing.to_string(),
    }
}

pub fn render_enrichment(enrichment: &Enrichment) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "**Mutual funds to consider:**");
    for fund in &enrichment.funds {
        let _ = writeln!(out, "- {}: NAV {}", fund.name, price_text(fund.nav, UNAVAILABLE));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "**Stocks to watch:**");
    for stock in &enrichment.stocks {
        let _ = writeln!(
            out,
            "- {} ({}): {}, Sector: {}",
            stock.name.as_deref().unwrap_or(NOT_AVAILABLE),
            stock.ticker,
            price_text(stock.price, NOT_AVAILABLE),
            stock.sector.as_deref().unwrap_or(NOT_AVAILABLE)
        );
    }
    out
}
