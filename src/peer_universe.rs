// src/peer_universe.rs

use futures::StreamExt;

use crate::aggregator::PeerAggregator;
use crate::config::{MAX_CONCURRENT_FETCHES, SNAPSHOT_DATE};
use crate::decoder::PayloadDecoder;
use crate::error::{Error, Result};
use crate::extractor::YahooExtractor;
use crate::table::TidyTable;
use crate::valuation::MarketSnapshot;

/// Outcome of one [`AnalysisSession::load`] pass.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(String, Error)>,
    pub total: usize,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Fraction of tickers handled so far, succeeded or not.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.loaded.len() + self.failed.len()) as f64 / self.total as f64
    }
}

/// The primary ticker, its peers and the combined table built from them.
///
/// Changing the primary ticker or the peer list discards the loaded table.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    primary: String,
    peers: Vec<String>,
    table: Option<TidyTable>,
}

impl AnalysisSession {
    pub fn new(primary: impl Into<String>) -> Self {
        AnalysisSession {
            primary: primary.into().trim().to_string(),
            peers: Vec::new(),
            table: None,
        }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    pub fn table(&self) -> Option<&TidyTable> {
        self.table.as_ref()
    }

    pub fn set_primary(&mut self, primary: impl Into<String>) {
        self.primary = primary.into().trim().to_string();
        self.peers.clear();
        self.table = None;
    }

    /// Replaces the peer list, ignoring blank entries.
    pub fn set_peers<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.peers = peers
            .into_iter()
            .map(|peer| peer.as_ref().trim().to_string())
            .filter(|peer| !peer.is_empty())
            .collect();
        self.table = None;
    }

    pub fn is_ready(&self) -> bool {
        !self.primary.is_empty() && !self.peers.is_empty()
    }

    pub async fn load<D: PayloadDecoder + ?Sized>(&mut self, decoder: &D) -> Result<LoadReport> {
        self.load_with_progress(decoder, |_, _| {}).await
    }

    /// Fetches the primary ticker and every peer, then rebuilds the combined table.
    ///
    /// A ticker whose fetch fails contributes no rows and is listed in the
    /// report; the others are kept. `progress` is called with
    /// `(handled, total)` after each ticker.
    pub async fn load_with_progress<D, F>(&mut self, decoder: &D, mut progress: F) -> Result<LoadReport>
    where
        D: PayloadDecoder + ?Sized,
        F: FnMut(usize, usize),
    {
        let tickers: Vec<String> = std::iter::once(self.primary.clone())
            .chain(self.peers.iter().cloned())
            .collect();
        let total = tickers.len();

        let mut report = LoadReport {
            total,
            ..Default::default()
        };
        let mut tables = Vec::with_capacity(total);

        let mut response_stream = futures::stream::iter(tickers)
            .map(|ticker| async move {
                let result = YahooExtractor::new(ticker.clone()).get_stats(decoder).await;
                (ticker, result)
            })
            .buffered(MAX_CONCURRENT_FETCHES);

        while let Some((ticker, result)) = response_stream.next().await {
            match result {
                Ok(table) => {
                    tables.push(table);
                    report.loaded.push(ticker);
                }
                Err(error) => {
                    log::error!("failed to load {ticker}: {error}");
                    tables.push(TidyTable::empty()?);
                    report.failed.push((ticker, error));
                }
            }
            progress(report.loaded.len() + report.failed.len(), total);
        }

        let (primary_table, peer_tables) = tables.split_first().ok_or(Error::PeerMismatch {
            tickers: total,
            tables: 0,
        })?;
        let combined = PeerAggregator::aggregate(&self.primary, primary_table, &self.peers, peer_tables)?;

        log::info!(
            "loaded {} rows for {} of {} tickers",
            combined.height(),
            report.loaded.len(),
            total
        );
        self.table = Some(combined);
        Ok(report)
    }

    /// Metrics covered by enough of the configured tickers; empty before a load.
    pub fn eligible_metrics(&self) -> Result<Vec<String>> {
        match &self.table {
            Some(table) => PeerAggregator::eligible_metrics(table, self.peers.len()),
            None => Ok(Vec::new()),
        }
    }

    /// The primary ticker's market cap and multiples on the snapshot date.
    pub fn market_snapshot(&self) -> Result<Option<MarketSnapshot>> {
        match &self.table {
            Some(table) => MarketSnapshot::from_table(table, &self.primary, SNAPSHOT_DATE),
            None => Ok(None),
        }
    }
}
