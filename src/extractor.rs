// src/extractor.rs

use chrono::Utc;

use crate::config::{METRIC_TYPES, PERIOD_START, RECOMMENDATIONS_URL, TIMESERIES_URL};
use crate::decoder::PayloadDecoder;
use crate::error::Result;
use crate::normalizer::MetricNormalizer;
use crate::table::TidyTable;

/// Pulls one ticker's fundamentals and peer suggestions from Yahoo Finance.
#[derive(Debug, Clone)]
pub struct YahooExtractor {
    pub ticker: String,
}

impl YahooExtractor {
    pub fn new(ticker: impl Into<String>) -> Self {
        YahooExtractor { ticker: ticker.into() }
    }

    /// Fetches the timeseries payload and normalizes it into an untagged table.
    pub async fn get_stats<D: PayloadDecoder + ?Sized>(&self, decoder: &D) -> Result<TidyTable> {
        let url = QueryBuilder::timeseries(&self.ticker, PERIOD_START, Utc::now().timestamp());
        let payload = decoder.fetch_json(&url).await?;
        let table = MetricNormalizer::normalize(&payload, &self.ticker)?;
        log::info!("{}: {} rows extracted", self.ticker, table.height());
        Ok(table)
    }

    /// Unique metric names available for this ticker.
    pub async fn get_potential_metrics<D: PayloadDecoder + ?Sized>(&self, decoder: &D) -> Result<Vec<String>> {
        Ok(self.get_stats(decoder).await?.metrics()?)
    }

    /// Symbols Yahoo recommends as peers, or `None` when there are none to offer.
    pub async fn get_recommended_symbols<D: PayloadDecoder + ?Sized>(&self, decoder: &D) -> Option<Vec<String>> {
        let url = QueryBuilder::recommendations(&self.ticker);
        let symbols = match decoder.fetch_json(&url).await {
            Ok(json) => json["finance"]["result"][0]["recommendedSymbols"]
                .as_array()
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|entry| entry["symbol"].as_str().map(str::to_string))
                        .collect::<Vec<_>>()
                })
                .filter(|symbols| !symbols.is_empty()),
            Err(error) => {
                log::debug!("recommendations for {} unavailable: {error}", self.ticker);
                None
            }
        };

        if symbols.is_none() {
            log::info!("Didn't find any recommended symbols for {}", self.ticker);
        }
        symbols
    }
}

/// Fills the endpoint templates from `config`.
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn timeseries(ticker: &str, period1: i64, period2: i64) -> String {
        TIMESERIES_URL
            .replace("{ticker}", ticker)
            .replace("{types}", &METRIC_TYPES.join("%2C"))
            .replace("{period1}", &period1.to_string())
            .replace("{period2}", &period2.to_string())
    }

    pub fn recommendations(ticker: &str) -> String {
        RECOMMENDATIONS_URL.replace("{ticker}", ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeseries_query_has_no_placeholders_left() {
        let url = QueryBuilder::timeseries("AAPL", 1, 2);
        assert!(!url.contains('{'));
        assert!(url.contains("/timeseries/AAPL?"));
        assert!(url.contains("symbol=AAPL"));
        assert!(url.contains("quarterlyMarketCap%2CtrailingMarketCap"));
        assert!(url.contains("period1=1&period2=2"));
    }

    #[test]
    fn recommendations_query() {
        assert_eq!(
            QueryBuilder::recommendations("VWS.CO"),
            "https://query1.finance.yahoo.com/v6/finance/recommendationsbysymbol/VWS.CO?"
        );
    }
}
