use crate::config::{CalculatorConfig, HttpConfig, PriceSourceConfig};
use crate::error::{Error, Result};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AppConfig {
    pub symbol: String,
    #[serde(default)]
    pub calculator: CalculatorConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub sources: Vec<PriceSourceConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            symbol: "BTCUSDT".to_string(),
            calculator: CalculatorConfig::default(),
            http: HttpConfig::default(),
            sources: vec![
                PriceSourceConfig {
                    name: "binance".to_string(),
                    weight: 0.4,
                    enabled: true,
                },
                PriceSourceConfig {
                    name: "coingecko".to_string(),
                    weight: 0.3,
                    enabled: true,
                },
                PriceSourceConfig {
                    name: "coinbase".to_string(),
                    weight: 0.3,
                    enabled: true,
                },
            ],
        }
    }
}

impl AppConfig {
    /// Layered load: in-code defaults, then `config/default`, then an
    /// explicit file if given, then `PRICE_ENGINE_*` environment
    /// variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let defaults = Config::try_from(&AppConfig::default())
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let mut builder = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/default").required(false));
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("PRICE_ENGINE").separator("__"))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config
            .try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.iter().all(|s| !s.enabled) {
            return Err(Error::ConfigError(
                "at least one price source must be enabled".to_string(),
            ));
        }
        for source in &self.sources {
            if !(source.weight > 0.0 && source.weight <= 1.0) {
                return Err(Error::InvalidWeight {
                    source_name: source.name.clone(),
                    weight: source.weight,
                });
            }
        }
        if !(self.calculator.outlier_tolerance > 0.0) {
            return Err(Error::ConfigError(format!(
                "outlier_tolerance must be positive, got {}",
                self.calculator.outlier_tolerance
            )));
        }
        if !(2..=8).contains(&self.calculator.quote_precision) {
            return Err(Error::ConfigError(format!(
                "quote_precision must be in 2..=8, got {}",
                self.calculator.quote_precision
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_source_weights() {
        let config = AppConfig::default();
        assert_eq!(config.symbol, "BTCUSDT");
        let weights: Vec<(&str, f64)> = config
            .sources
            .iter()
            .map(|s| (s.name.as_str(), s.weight))
            .collect();
        assert_eq!(
            weights,
            vec![("binance", 0.4), ("coingecko", 0.3), ("coinbase", 0.3)]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_weight() {
        let mut config = AppConfig::default();
        config.sources[0].weight = 1.5;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidWeight { .. })
        ));
    }

    #[test]
    fn rejects_unusable_precision() {
        let mut config = AppConfig::default();
        config.calculator.quote_precision = 12;
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn rejects_all_sources_disabled() {
        let mut config = AppConfig::default();
        for source in &mut config.sources {
            source.enabled = false;
        }
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }
}
