use crate::config::CalculatorConfig;
use crate::engine::{SourceWeights, Weight};
use crate::error::{Error, Result};
use crate::types::price::Price;
use crate::types::reading::PriceSet;

/// Pure consensus math over a [`PriceSet`]: outlier exclusion and
/// renormalized weighted averaging, all in exact integer arithmetic.
pub struct PriceCalculator {
    outlier_tolerance_ppm: u64,
    quote_precision: u32,
}

impl PriceCalculator {
    pub fn new(config: CalculatorConfig) -> Result<Self> {
        if !(config.outlier_tolerance > 0.0) {
            return Err(Error::ConfigError(format!(
                "outlier_tolerance must be positive, got {}",
                config.outlier_tolerance
            )));
        }
        if !(2..=8).contains(&config.quote_precision) {
            return Err(Error::ConfigError(format!(
                "quote_precision must be in 2..=8, got {}",
                config.quote_precision
            )));
        }
        let outlier_tolerance_ppm =
            (config.outlier_tolerance * f64::from(Weight::SCALE)).round() as u64;
        Ok(PriceCalculator {
            outlier_tolerance_ppm,
            quote_precision: config.quote_precision,
        })
    }

    /// Remove readings deviating from the group mean by more than the
    /// configured tolerance fraction of that mean. Discarding an outlier
    /// shifts the mean of the survivors, so the mean-and-discard pass
    /// repeats until no reading is removed; the result is a fixed point
    /// and a second application never changes it. Sets with zero or one
    /// present reading pass through unchanged.
    ///
    /// The comparison `|p - mean| > tol * mean` is evaluated as
    /// `|p*n - sum| * SCALE > tol_ppm * sum`, avoiding any division.
    pub fn filter_outliers(&self, mut set: PriceSet) -> PriceSet {
        let tolerance = i128::from(self.outlier_tolerance_ppm);
        let scale = i128::from(Weight::SCALE);
        loop {
            let present: Vec<i64> = set.present().map(|r| r.price.raw()).collect();
            if present.len() <= 1 {
                return set;
            }
            let n = present.len() as i128;
            let sum: i128 = present.iter().map(|&p| i128::from(p)).sum();

            let mut removed = false;
            set = set.retain_present(|reading| {
                let deviation = (i128::from(reading.price.raw()) * n - sum).abs();
                let keep = deviation * scale <= tolerance * sum;
                removed |= !keep;
                keep
            });
            if !removed {
                return set;
            }
        }
    }

    /// Weighted mean over present readings only: absent sources' weights
    /// are excluded from the denominator, so the surviving weights
    /// renormalize to 1. Empty present set is an explicit error, never a
    /// silent zero.
    ///
    /// The exact mean always lies within [min, max] of the present
    /// prices; snapping it to the quote-precision grid can then move it
    /// past a bound by at most half an ulp of that precision.
    pub fn weighted_average(&self, set: &PriceSet, weights: &SourceWeights) -> Result<Price> {
        let mut numerator: i128 = 0;
        let mut denominator: i128 = 0;
        for reading in set.present() {
            let Some(weight) = weights.get(&reading.source) else {
                continue;
            };
            numerator += i128::from(reading.price.raw()) * i128::from(weight.ppm());
            denominator += i128::from(weight.ppm());
        }
        if denominator == 0 {
            return Err(Error::NoData);
        }
        // round half up; prices are non-negative
        let raw = ((numerator + denominator / 2) / denominator) as i64;
        Ok(Price::from_raw(raw).round_dp(self.quote_precision))
    }
}
