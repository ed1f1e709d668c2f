use crate::engine::sources::{PriceSource, check_status, malformed, network_error};
use crate::error::Result;
use crate::types::price::Price;
use crate::types::symbol::Symbol;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

pub const SOURCE_NAME: &str = "coinbase";
const BASE_URL: &str = "https://api.coinbase.com";

/// Coinbase REST adapter. Coinbase quotes by currency-pair product id
/// (BTC-USD), so symbols go through [`product_id`] first.
pub struct CoinbaseSource {
    client: reqwest::Client,
    base_url: String,
}

/// Static symbol-to-product-id lookup with a lower-cased fallback for
/// unmapped symbols.
fn product_id(symbol: &Symbol) -> String {
    match symbol.as_str() {
        "BTCUSDT" => "BTC-USD".to_string(),
        "ETHUSDT" => "ETH-USD".to_string(),
        other => other.to_lowercase(),
    }
}

impl CoinbaseSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        CoinbaseSource {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_spot(&self, symbol: &Symbol, date: Option<NaiveDate>) -> Result<Price> {
        let url = format!("{}/v2/prices/{}/spot", self.base_url, product_id(symbol));
        let mut request = self.client.get(&url);
        if let Some(date) = date {
            request = request.query(&[("date", date.format("%Y-%m-%d").to_string())]);
        }
        let response = request
            .send()
            .await
            .map_err(|e| network_error(SOURCE_NAME, e))?;
        check_status(SOURCE_NAME, symbol, response.status())?;

        let body: SpotResponse = response
            .json()
            .await
            .map_err(|e| malformed(SOURCE_NAME, e.to_string()))?;
        body.data.amount.parse().map_err(|_| {
            malformed(
                SOURCE_NAME,
                format!("unparseable amount {:?}", body.data.amount),
            )
        })
    }
}

#[derive(Deserialize)]
struct SpotResponse {
    data: SpotPrice,
}

#[derive(Deserialize)]
struct SpotPrice {
    amount: String,
}

#[async_trait]
impl PriceSource for CoinbaseSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_current(&self, symbol: &Symbol) -> Result<Price> {
        self.fetch_spot(symbol, None).await
    }

    async fn fetch_historical(&self, symbol: &Symbol, date: NaiveDate) -> Result<Price> {
        self.fetch_spot(symbol, Some(date)).await
    }
}
