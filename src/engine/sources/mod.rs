pub mod binance;
pub mod coinbase;
pub mod coingecko;

use crate::config::PriceSourceConfig;
use crate::error::{Error, Result};
use crate::types::price::Price;
use crate::types::symbol::Symbol;
use async_trait::async_trait;
use chrono::NaiveDate;
#[cfg(test)]
use mockall::automock;
use reqwest::StatusCode;

/// One external price provider. Each call may fail independently; the
/// aggregator and range builder convert failures to absence.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_current(&self, symbol: &Symbol) -> Result<Price>;

    async fn fetch_historical(&self, symbol: &Symbol, date: NaiveDate) -> Result<Price>;
}

/// Instantiate the adapter for a configured source name.
pub fn build_source(
    config: &PriceSourceConfig,
    client: &reqwest::Client,
) -> Result<Box<dyn PriceSource>> {
    match config.name.as_str() {
        binance::SOURCE_NAME => Ok(Box::new(binance::BinanceSource::new(client.clone()))),
        coingecko::SOURCE_NAME => Ok(Box::new(coingecko::CoinGeckoSource::new(client.clone()))),
        coinbase::SOURCE_NAME => Ok(Box::new(coinbase::CoinbaseSource::new(client.clone()))),
        other => Err(Error::UnknownSource(other.to_string())),
    }
}

/// Map a non-success HTTP status to the fetch error taxonomy.
pub(crate) fn check_status(source_name: &str, symbol: &Symbol, status: StatusCode) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited {
            source_name: source_name.to_string(),
        }),
        StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => Err(Error::SymbolNotFound {
            source_name: source_name.to_string(),
            symbol: symbol.to_string(),
        }),
        other => Err(Error::UpstreamStatus {
            source_name: source_name.to_string(),
            status: other.as_u16(),
        }),
    }
}

pub(crate) fn network_error(source_name: &str, err: reqwest::Error) -> Error {
    Error::Network {
        source_name: source_name.to_string(),
        reason: err.to_string(),
    }
}

pub(crate) fn malformed(source_name: &str, reason: impl Into<String>) -> Error {
    Error::MalformedResponse {
        source_name: source_name.to_string(),
        reason: reason.into(),
    }
}
