use crate::engine::history::PriceHistory;
use crate::engine::sources::PriceSource;
use crate::error::{Error, Result};
use crate::observability::tracing::historical_span;
use crate::types::reading::PriceReading;
use crate::types::symbol::Symbol;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::Instrument;

/// Builds a daily time series by walking an inclusive date range against
/// a single source's historical endpoint. Successful days land both in
/// the returned series and in the shared history.
pub struct HistoricalRange {
    source: Box<dyn PriceSource>,
    history: Arc<PriceHistory>,
}

impl HistoricalRange {
    pub fn new(source: Box<dyn PriceSource>, history: Arc<PriceHistory>) -> Self {
        HistoricalRange { source, history }
    }

    /// Fetch one reading per calendar day in `[from, to]`, ascending.
    /// A failed day is logged and skipped; partial results are valid
    /// output, and a whole-range failure is an empty series, not an
    /// error. An inverted range is rejected before any fetch.
    pub async fn fetch(
        &self,
        symbol: &Symbol,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceReading>> {
        if to < from {
            return Err(Error::InvalidDateRange { from, to });
        }

        let span = historical_span(symbol, from, to);
        async {
            let mut series = Vec::new();
            for day in from.iter_days().take_while(|d| *d <= to) {
                match self.source.fetch_historical(symbol, day).await {
                    Ok(price) => {
                        let reading = PriceReading {
                            symbol: symbol.clone(),
                            source: self.source.name().to_string(),
                            price,
                            timestamp: day.and_time(NaiveTime::MIN).and_utc(),
                        };
                        self.history.append(reading.clone());
                        series.push(reading);
                    }
                    Err(e) => {
                        tracing::warn!(
                            source = %self.source.name(),
                            date = %day,
                            error = %e,
                            "historical fetch failed; skipping day"
                        );
                    }
                }
            }
            Ok(series)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::sources::MockPriceSource;
    use crate::types::price::Price;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn failed_day_is_skipped_and_order_stays_ascending() {
        let mut mock = MockPriceSource::new();
        mock.expect_name().return_const("coingecko".to_string());
        mock.expect_fetch_historical()
            .times(3)
            .returning(|_, day| {
                if day.day() == 2 {
                    Err(Error::RateLimited {
                        source_name: "coingecko".to_string(),
                    })
                } else {
                    Ok(Price::from_f64(37000.0 + f64::from(day.day())))
                }
            });

        let history = Arc::new(PriceHistory::new());
        let range = HistoricalRange::new(Box::new(mock), Arc::clone(&history));
        let symbol = Symbol::from("BTCUSDT");
        let series = range
            .fetch(&symbol, date(2023, 11, 1), date(2023, 11, 3))
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].timestamp.date_naive(), date(2023, 11, 1));
        assert_eq!(series[1].timestamp.date_naive(), date(2023, 11, 3));
        assert!(series[0].timestamp < series[1].timestamp);
        assert_eq!(history.by_symbol(&symbol).len(), 2);
    }

    #[tokio::test]
    async fn whole_range_failure_is_an_empty_series() {
        let mut mock = MockPriceSource::new();
        mock.expect_name().return_const("coingecko".to_string());
        mock.expect_fetch_historical().returning(|_, _| {
            Err(Error::Network {
                source_name: "coingecko".to_string(),
                reason: "timeout".to_string(),
            })
        });

        let history = Arc::new(PriceHistory::new());
        let range = HistoricalRange::new(Box::new(mock), Arc::clone(&history));
        let series = range
            .fetch(&Symbol::from("BTCUSDT"), date(2023, 11, 1), date(2023, 11, 3))
            .await
            .unwrap();

        assert!(series.is_empty());
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn inverted_range_is_rejected_before_any_fetch() {
        let mut mock = MockPriceSource::new();
        mock.expect_name().return_const("coingecko".to_string());
        mock.expect_fetch_historical().never();

        let history = Arc::new(PriceHistory::new());
        let range = HistoricalRange::new(Box::new(mock), history);
        let err = range
            .fetch(&Symbol::from("BTCUSDT"), date(2023, 11, 3), date(2023, 11, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidDateRange { .. }));
    }

    #[tokio::test]
    async fn single_day_range_is_inclusive() {
        let mut mock = MockPriceSource::new();
        mock.expect_name().return_const("coingecko".to_string());
        mock.expect_fetch_historical()
            .times(1)
            .returning(|_, _| Ok(Price::from_f64(37000.0)));

        let history = Arc::new(PriceHistory::new());
        let range = HistoricalRange::new(Box::new(mock), history);
        let series = range
            .fetch(&Symbol::from("BTCUSDT"), date(2023, 11, 1), date(2023, 11, 1))
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
    }
}
