// src/aggregator.rs

use polars::prelude::*;

use crate::config::COVERAGE_RATIO;
use crate::error::{Error, Result};
use crate::table::{TidyTable, METRIC, TICKER};

/// Combines per-ticker tables and decides which metrics are worth comparing.
pub struct PeerAggregator;

impl PeerAggregator {
    /// Stacks the primary table over the peer tables, each tagged with its ticker.
    ///
    /// Rows keep their order: primary first, then peers in input order. Nothing
    /// is deduplicated.
    pub fn aggregate(
        primary_ticker: &str,
        primary_table: &TidyTable,
        peer_tickers: &[String],
        peer_tables: &[TidyTable],
    ) -> Result<TidyTable> {
        if peer_tickers.len() != peer_tables.len() {
            return Err(Error::PeerMismatch {
                tickers: peer_tickers.len(),
                tables: peer_tables.len(),
            });
        }

        let mut combined = primary_table.clone().with_ticker(primary_ticker)?;
        for (ticker, table) in peer_tickers.iter().zip(peer_tables) {
            let tagged = table.clone().with_ticker(ticker)?;
            combined.append(&tagged)?;
        }
        Ok(combined)
    }

    /// Metrics reported by at least `COVERAGE_RATIO` of the `peer_count + 1`
    /// tickers, sorted by name.
    pub fn eligible_metrics(table: &TidyTable, peer_count: usize) -> Result<Vec<String>> {
        let total_tickers = peer_count + 1;
        let ticker_limit = total_tickers as f64 * COVERAGE_RATIO;

        let coverage = table
            .dataframe()
            .clone()
            .lazy()
            .group_by([col(METRIC)])
            .agg([col(TICKER).n_unique().alias("tickers")])
            .filter(col("tickers").cast(DataType::Float64).gt_eq(lit(ticker_limit)))
            .collect()?;

        let mut metrics: Vec<String> = coverage
            .column(METRIC)?
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        metrics.sort();
        Ok(metrics)
    }
}
