use crate::engine::sources::{PriceSource, check_status, malformed, network_error};
use crate::error::Result;
use crate::types::price::Price;
use crate::types::symbol::Symbol;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

pub const SOURCE_NAME: &str = "binance";
const BASE_URL: &str = "https://api.binance.com";

/// Binance REST adapter. Symbols are already in Binance notation
/// (e.g. BTCUSDT), so no identifier mapping is needed here.
pub struct BinanceSource {
    client: reqwest::Client,
    base_url: String,
}

impl BinanceSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        BinanceSource {
            client,
            base_url: base_url.into(),
        }
    }
}

#[derive(Deserialize)]
struct TickerPrice {
    price: String,
}

#[async_trait]
impl PriceSource for BinanceSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_current(&self, symbol: &Symbol) -> Result<Price> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await
            .map_err(|e| network_error(SOURCE_NAME, e))?;
        check_status(SOURCE_NAME, symbol, response.status())?;

        let ticker: TickerPrice = response
            .json()
            .await
            .map_err(|e| malformed(SOURCE_NAME, e.to_string()))?;
        ticker
            .price
            .parse()
            .map_err(|_| malformed(SOURCE_NAME, format!("unparseable price {:?}", ticker.price)))
    }

    async fn fetch_historical(&self, symbol: &Symbol, date: NaiveDate) -> Result<Price> {
        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        let start_ms = midnight.timestamp_millis().to_string();
        let url = format!("{}/api/v3/klines", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", "1d"),
                ("startTime", start_ms.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| network_error(SOURCE_NAME, e))?;
        check_status(SOURCE_NAME, symbol, response.status())?;

        // kline rows are heterogeneous arrays; index 4 is the close price
        let klines: Vec<Vec<serde_json::Value>> = response
            .json()
            .await
            .map_err(|e| malformed(SOURCE_NAME, e.to_string()))?;
        let close = klines
            .first()
            .and_then(|row| row.get(4))
            .and_then(|v| v.as_str())
            .ok_or_else(|| malformed(SOURCE_NAME, format!("no kline close for {date}")))?;
        close
            .parse()
            .map_err(|_| malformed(SOURCE_NAME, format!("unparseable close {close:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source(server: &MockServer) -> BinanceSource {
        BinanceSource::with_base_url(reqwest::Client::new(), server.uri())
    }

    #[tokio::test]
    async fn parses_ticker_price_string_exactly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .and(query_param("symbol", "BTCUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbol": "BTCUSDT",
                "price": "63250.10000000"
            })))
            .mount(&server)
            .await;

        let price = source(&server)
            .await
            .fetch_current(&Symbol::from("BTCUSDT"))
            .await
            .unwrap();
        assert_eq!(price, "63250.1".parse().unwrap());
    }

    #[tokio::test]
    async fn maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = source(&server)
            .await
            .fetch_current(&Symbol::from("BTCUSDT"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RateLimited { .. }));
    }

    #[tokio::test]
    async fn maps_unknown_symbol_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": -1121,
                "msg": "Invalid symbol."
            })))
            .mount(&server)
            .await;

        let err = source(&server)
            .await
            .fetch_current(&Symbol::from("NOPEUSDT"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SymbolNotFound { .. }));
    }

    #[tokio::test]
    async fn undecodable_body_is_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = source(&server)
            .await
            .fetch_current(&Symbol::from("BTCUSDT"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn historical_reads_daily_close_from_klines() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .and(query_param("interval", "1d"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([[
                1700006400000i64,
                "37000.00000000",
                "37500.00000000",
                "36800.00000000",
                "37255.50000000",
                "1000.0",
                1700092799999i64
            ]])))
            .mount(&server)
            .await;

        let date = NaiveDate::from_ymd_opt(2023, 11, 15).unwrap();
        let price = source(&server)
            .await
            .fetch_historical(&Symbol::from("BTCUSDT"), date)
            .await
            .unwrap();
        assert_eq!(price, "37255.5".parse().unwrap());
    }

    #[tokio::test]
    async fn empty_klines_is_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/klines"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let date = NaiveDate::from_ymd_opt(2023, 11, 15).unwrap();
        let err = source(&server)
            .await
            .fetch_historical(&Symbol::from("BTCUSDT"), date)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }
}
