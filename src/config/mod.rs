use serde::{Deserialize, Serialize};

pub mod loader;

pub use loader::AppConfig;

/// One configured price provider and its trust weight.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PriceSourceConfig {
    pub name: String,
    /// Trust coefficient in (0, 1], validated at load time.
    pub weight: f64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Consensus policy constants. The outlier tolerance is the maximum
/// deviation from the group mean, expressed as a fraction of that mean.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CalculatorConfig {
    pub outlier_tolerance: f64,
    /// Decimal places of the quote currency, 2..=8.
    pub quote_precision: u32,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        CalculatorConfig {
            outlier_tolerance: 0.5, // 50% of the mean
            quote_precision: 2,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Per-call timeout; an adapter-internal concern, a timed-out call
    /// simply counts as a failed fetch.
    pub timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig { timeout_ms: 10_000 }
    }
}
