pub mod aggregator;
pub mod calculator;
pub mod history;
pub mod range;
pub mod sources;

use crate::error::{Error, Result};

/// Trust coefficient for one source, stored as integer parts-per-million
/// so weighted averaging stays in exact integer arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Weight(u32);

impl Weight {
    pub const SCALE: u32 = 1_000_000;

    /// Parse a configured weight. Valid range is (0, 1].
    pub fn from_f64(source_name: &str, value: f64) -> Result<Self> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(Error::InvalidWeight {
                source_name: source_name.to_string(),
                weight: value,
            });
        }
        let ppm = (value * f64::from(Self::SCALE)).round() as u32;
        if ppm == 0 {
            return Err(Error::InvalidWeight {
                source_name: source_name.to_string(),
                weight: value,
            });
        }
        Ok(Weight(ppm))
    }

    pub fn ppm(&self) -> u32 {
        self.0
    }
}

/// Configured weights keyed by source name.
#[derive(Clone, Debug, Default)]
pub struct SourceWeights {
    entries: Vec<(String, Weight)>,
}

impl SourceWeights {
    pub fn new() -> Self {
        SourceWeights::default()
    }

    pub fn insert(&mut self, source: impl Into<String>, weight: Weight) {
        self.entries.push((source.into(), weight));
    }

    pub fn get(&self, source: &str) -> Option<Weight> {
        self.entries
            .iter()
            .find(|(name, _)| name == source)
            .map(|(_, w)| *w)
    }
}
