use crate::types::symbol::Symbol;
use chrono::NaiveDate;
use tracing::Span;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Filter defaults to `info`, overridable
/// through `RUST_LOG`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

pub fn aggregation_span(symbol: &Symbol) -> Span {
    tracing::info_span!("price_aggregation", symbol = %symbol)
}

pub fn historical_span(symbol: &Symbol, from: NaiveDate, to: NaiveDate) -> Span {
    tracing::info_span!("historical_range", symbol = %symbol, from = %from, to = %to)
}
