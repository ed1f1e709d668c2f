use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Fetch Errors (per-adapter, per-call)
    #[error("network error from {source_name}: {reason}")]
    Network {
        source_name: String,
        reason: String,
    },

    #[error("malformed response from {source_name}: {reason}")]
    MalformedResponse {
        source_name: String,
        reason: String,
    },

    #[error("symbol not found on {source_name}: {symbol}")]
    SymbolNotFound {
        source_name: String,
        symbol: String,
    },

    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    #[error("unexpected status {status} from {source_name}")]
    UpstreamStatus { source_name: String, status: u16 },

    // Calculator Errors
    #[error("no price data available")]
    NoData,

    // Configuration Errors
    #[error("invalid date range: {to} is before {from}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("invalid weight {weight} for source {source_name}: must be in (0, 1]")]
    InvalidWeight { source_name: String, weight: f64 },

    #[error("unknown price source: {0}")]
    UnknownSource(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
