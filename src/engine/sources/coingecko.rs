use crate::engine::sources::{PriceSource, check_status, malformed, network_error};
use crate::error::{Error, Result};
use crate::types::price::Price;
use crate::types::symbol::Symbol;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

pub const SOURCE_NAME: &str = "coingecko";
const BASE_URL: &str = "https://api.coingecko.com";

/// CoinGecko REST adapter. CoinGecko keys assets by coin id rather than
/// exchange ticker, so symbols go through [`coin_id`] first.
pub struct CoinGeckoSource {
    client: reqwest::Client,
    base_url: String,
}

/// Static symbol-to-coin-id lookup with a lower-cased fallback for
/// unmapped symbols.
fn coin_id(symbol: &Symbol) -> String {
    match symbol.as_str() {
        "BTCUSDT" => "bitcoin".to_string(),
        "ETHUSDT" => "ethereum".to_string(),
        other => other.to_lowercase(),
    }
}

impl CoinGeckoSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        CoinGeckoSource {
            client,
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct HistoryResponse {
    market_data: Option<MarketData>,
}

#[derive(Deserialize)]
struct MarketData {
    current_price: HashMap<String, f64>,
}

#[async_trait]
impl PriceSource for CoinGeckoSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_current(&self, symbol: &Symbol) -> Result<Price> {
        let id = coin_id(symbol);
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("ids", id.as_str()), ("vs_currencies", "usd")])
            .send()
            .await
            .map_err(|e| network_error(SOURCE_NAME, e))?;
        check_status(SOURCE_NAME, symbol, response.status())?;

        // shape: {"bitcoin": {"usd": 63250.1}}; unknown ids come back as {}
        let body: HashMap<String, HashMap<String, f64>> = response
            .json()
            .await
            .map_err(|e| malformed(SOURCE_NAME, e.to_string()))?;
        let usd = body
            .get(&id)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .ok_or_else(|| Error::SymbolNotFound {
                source_name: SOURCE_NAME.to_string(),
                symbol: symbol.to_string(),
            })?;
        Ok(Price::from_f64(usd))
    }

    async fn fetch_historical(&self, symbol: &Symbol, date: NaiveDate) -> Result<Price> {
        let id = coin_id(symbol);
        let url = format!("{}/api/v3/coins/{}/history", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .query(&[("date", date.format("%d-%m-%Y").to_string())])
            .send()
            .await
            .map_err(|e| network_error(SOURCE_NAME, e))?;
        check_status(SOURCE_NAME, symbol, response.status())?;

        let body: HistoryResponse = response
            .json()
            .await
            .map_err(|e| malformed(SOURCE_NAME, e.to_string()))?;
        // market_data is omitted for days CoinGecko has no record of
        let usd = body
            .market_data
            .and_then(|m| m.current_price.get("usd").copied())
            .ok_or_else(|| malformed(SOURCE_NAME, format!("no market data for {date}")))?;
        Ok(Price::from_f64(usd))
    }
}
