use crate::engine::history::PriceHistory;
use crate::engine::sources::PriceSource;
use crate::engine::{SourceWeights, Weight};
use crate::observability::tracing::aggregation_span;
use crate::types::reading::{PriceReading, PriceSet};
use crate::types::symbol::Symbol;
use chrono::Utc;
use std::sync::Arc;
use tracing::Instrument;

/// One configured adapter plus its trust weight.
pub struct WeightedSource {
    pub adapter: Box<dyn PriceSource>,
    pub weight: Weight,
}

/// Fans one aggregation cycle out to every configured source and folds
/// the outcomes into a [`PriceSet`]. Successful readings are archived
/// into the shared history as a side effect of the cycle itself.
pub struct PriceAggregator {
    sources: Vec<WeightedSource>,
    history: Arc<PriceHistory>,
}

impl PriceAggregator {
    pub fn new(sources: Vec<WeightedSource>, history: Arc<PriceHistory>) -> Self {
        PriceAggregator { sources, history }
    }

    pub fn weights(&self) -> SourceWeights {
        let mut weights = SourceWeights::new();
        for source in &self.sources {
            weights.insert(source.adapter.name(), source.weight);
        }
        weights
    }

    /// Query every configured source concurrently, exactly once each.
    /// Failures are logged and recorded as absence; this never errors,
    /// and an all-absent set is a valid outcome the caller must handle.
    pub async fn get_all_prices(&self, symbol: &Symbol) -> PriceSet {
        let span = aggregation_span(symbol);
        async {
            let fetches = self.sources.iter().map(|source| async move {
                let name = source.adapter.name().to_string();
                let result = source.adapter.fetch_current(symbol).await;
                (name, result)
            });
            let outcomes = futures::future::join_all(fetches).await;

            let mut set = PriceSet::new();
            for (name, result) in outcomes {
                match result {
                    Ok(price) => {
                        let reading = PriceReading {
                            symbol: symbol.clone(),
                            source: name.clone(),
                            price,
                            timestamp: Utc::now(),
                        };
                        self.history.append(reading.clone());
                        tracing::debug!(source = %name, price = %price, "fetched price");
                        set.record(name, Some(reading));
                    }
                    Err(e) => {
                        tracing::warn!(source = %name, error = %e, "price fetch failed; marking source absent");
                        set.record(name, None);
                    }
                }
            }
            set
        }
        .instrument(span)
        .await
    }
}
