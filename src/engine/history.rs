use crate::types::reading::PriceReading;
use crate::types::symbol::Symbol;
use std::sync::RwLock;

/// Append-only, insertion-ordered record of every successful reading.
/// Shared across the aggregator and range builder via `Arc`; append is
/// atomic per reading, and querying never mutates.
#[derive(Debug, Default)]
pub struct PriceHistory {
    entries: RwLock<Vec<PriceReading>>,
}

impl PriceHistory {
    pub fn new() -> Self {
        PriceHistory::default()
    }

    pub fn append(&self, reading: PriceReading) {
        if let Ok(mut entries) = self.entries.write() {
            entries.push(reading);
        }
    }

    /// All readings for a symbol, oldest first. Each call materializes the
    /// full sequence again.
    pub fn by_symbol(&self, symbol: &Symbol) -> Vec<PriceReading> {
        self.entries
            .read()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|r| &r.symbol == symbol)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::Price;
    use chrono::Utc;

    fn reading(symbol: &str, source: &str, raw: i64) -> PriceReading {
        PriceReading {
            symbol: Symbol::from(symbol),
            source: source.to_string(),
            price: Price::from_raw(raw),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn by_symbol_preserves_append_order() {
        let history = PriceHistory::new();
        for i in 0..5 {
            history.append(reading("BTCUSDT", "binance", i));
        }
        history.append(reading("ETHUSDT", "binance", 99));

        let btc = history.by_symbol(&Symbol::from("BTCUSDT"));
        assert_eq!(btc.len(), 5);
        let raws: Vec<i64> = btc.iter().map(|r| r.price.raw()).collect();
        assert_eq!(raws, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn querying_is_repeatable_and_side_effect_free() {
        let history = PriceHistory::new();
        history.append(reading("BTCUSDT", "binance", 1));
        history.append(reading("BTCUSDT", "coinbase", 2));

        let first = history.by_symbol(&Symbol::from("BTCUSDT"));
        let second = history.by_symbol(&Symbol::from("BTCUSDT"));
        assert_eq!(first, second);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn unknown_symbol_yields_empty_sequence() {
        let history = PriceHistory::new();
        history.append(reading("BTCUSDT", "binance", 1));
        assert!(history.by_symbol(&Symbol::from("DOGEUSDT")).is_empty());
    }
}
