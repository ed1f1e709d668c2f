use crate::types::price::Price;
use crate::types::symbol::Symbol;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One price observation from one source at one time. Immutable once
/// created; the history store keeps the durable copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceReading {
    pub symbol: Symbol,
    pub source: String,
    pub price: Price,
    pub timestamp: DateTime<Utc>,
}

/// Per-cycle collection of reading-or-absent results, one entry per
/// configured source. Insertion order matches configuration order, so a
/// completed aggregation cycle reflects exactly one attempt per source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceSet {
    entries: Vec<(String, Option<PriceReading>)>,
}

impl PriceSet {
    pub fn new() -> Self {
        PriceSet::default()
    }

    /// Record the outcome for a source. A repeated source name replaces
    /// the earlier entry rather than duplicating it.
    pub fn record(&mut self, source: impl Into<String>, reading: Option<PriceReading>) {
        let source = source.into();
        match self.entries.iter_mut().find(|(name, _)| *name == source) {
            Some(entry) => entry.1 = reading,
            None => self.entries.push((source, reading)),
        }
    }

    pub fn get(&self, source: &str) -> Option<&PriceReading> {
        self.entries
            .iter()
            .find(|(name, _)| name == source)
            .and_then(|(_, reading)| reading.as_ref())
    }

    /// All entries in insertion order, absent sources included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&PriceReading>)> {
        self.entries
            .iter()
            .map(|(name, reading)| (name.as_str(), reading.as_ref()))
    }

    /// Only the readings that are present.
    pub fn present(&self) -> impl Iterator<Item = &PriceReading> {
        self.entries.iter().filter_map(|(_, reading)| reading.as_ref())
    }

    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    /// Number of configured sources this cycle attempted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_all_absent(&self) -> bool {
        self.present_count() == 0
    }

    /// Mark absent every present reading that fails the predicate.
    pub fn retain_present<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&PriceReading) -> bool,
    {
        for (_, slot) in &mut self.entries {
            if let Some(reading) = slot {
                if !keep(reading) {
                    *slot = None;
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(source: &str, price: &str) -> PriceReading {
        PriceReading {
            symbol: Symbol::from("BTCUSDT"),
            source: source.to_string(),
            price: price.parse().unwrap(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn records_one_entry_per_source() {
        let mut set = PriceSet::new();
        set.record("binance", Some(reading("binance", "100")));
        set.record("coinbase", None);
        set.record("binance", Some(reading("binance", "101")));

        assert_eq!(set.len(), 2);
        assert_eq!(set.present_count(), 1);
        assert_eq!(set.get("binance").unwrap().price, "101".parse().unwrap());
        assert!(set.get("coinbase").is_none());
    }

    #[test]
    fn retain_present_marks_absent_without_dropping_sources() {
        let mut set = PriceSet::new();
        set.record("binance", Some(reading("binance", "100")));
        set.record("coingecko", Some(reading("coingecko", "1000")));
        let filtered = set.retain_present(|r| r.price < "500".parse().unwrap());

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.present_count(), 1);
        assert!(filtered.get("coingecko").is_none());
    }
}
