// src/table.rs

use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const METRIC: &str = "metric";
pub const DATE: &str = "date";
pub const VALUE: &str = "value";
pub const TICKER: &str = "ticker";

/// One observation of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub metric: String,
    pub date: String,
    pub value: f64,
}

/// Long-format table of `metric, date, value` rows, plus `ticker` once tagged.
#[derive(Debug, Clone)]
pub struct TidyTable {
    df: DataFrame,
}

impl TidyTable {
    pub fn empty() -> PolarsResult<Self> {
        Self::from_records(Vec::new())
    }

    pub fn from_records(records: Vec<MetricRecord>) -> PolarsResult<Self> {
        let mut metrics = Vec::with_capacity(records.len());
        let mut dates = Vec::with_capacity(records.len());
        let mut values = Vec::with_capacity(records.len());
        for record in records {
            metrics.push(record.metric);
            dates.push(record.date);
            values.push(record.value);
        }

        let df = DataFrame::new(vec![
            Series::new(METRIC, metrics),
            Series::new(DATE, dates),
            Series::new(VALUE, values),
        ])?;
        Ok(TidyTable { df })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn has_ticker(&self) -> bool {
        self.df.get_column_names().contains(&TICKER)
    }

    /// Tags every row with `ticker`, replacing any existing tag.
    pub fn with_ticker(mut self, ticker: &str) -> PolarsResult<Self> {
        let ticker_column = Series::new(TICKER, vec![ticker.to_string(); self.df.height()]);
        self.df.with_column(ticker_column)?;
        Ok(self)
    }

    /// Appends `other` below this table. Both sides must share the same columns.
    pub(crate) fn append(&mut self, other: &TidyTable) -> PolarsResult<()> {
        self.df.vstack_mut(&other.df)?;
        Ok(())
    }

    pub fn records(&self) -> PolarsResult<Vec<MetricRecord>> {
        let metrics = self.df.column(METRIC)?.str()?;
        let dates = self.df.column(DATE)?.str()?;
        let values = self.df.column(VALUE)?.f64()?;

        let records = metrics
            .into_iter()
            .zip(dates.into_iter())
            .zip(values.into_iter())
            .filter_map(|((metric, date), value)| {
                Some(MetricRecord {
                    metric: metric?.to_string(),
                    date: date?.to_string(),
                    value: value?,
                })
            })
            .collect();
        Ok(records)
    }

    pub fn tickers(&self) -> PolarsResult<Vec<String>> {
        first_seen(self.df.column(TICKER)?.str()?)
    }

    /// Metric names in the order they first appear.
    pub fn metrics(&self) -> PolarsResult<Vec<String>> {
        first_seen(self.df.column(METRIC)?.str()?)
    }

    pub fn filter_metric(&self, metric: &str) -> PolarsResult<TidyTable> {
        let df = self
            .df
            .clone()
            .lazy()
            .filter(col(METRIC).eq(lit(metric)))
            .collect()?;
        Ok(TidyTable { df })
    }

    /// Rows of `metric` reported on exactly `date`, largest value first.
    pub fn snapshot(&self, metric: &str, date: &str) -> PolarsResult<TidyTable> {
        let mut df = self
            .df
            .clone()
            .lazy()
            .filter(col(METRIC).eq(lit(metric)).and(col(DATE).eq(lit(date))))
            .collect()?;
        df.sort_in_place(
            &[VALUE],
            SortMultipleOptions {
                descending: vec![true],
                maintain_order: true,
                ..Default::default()
            },
        )?;
        Ok(TidyTable { df })
    }

    /// Most recent date on which any ticker reported `metric`.
    pub fn latest_date(&self, metric: &str) -> PolarsResult<Option<String>> {
        let filtered = self.filter_metric(metric)?;
        let dates = filtered.df.column(DATE)?.str()?;
        Ok(dates.into_iter().flatten().max().map(str::to_string))
    }

    /// Value of the first row matching `ticker`, `metric` and `date`.
    pub fn value_at(&self, ticker: &str, metric: &str, date: &str) -> PolarsResult<Option<f64>> {
        let df = self
            .df
            .clone()
            .lazy()
            .filter(
                col(TICKER)
                    .eq(lit(ticker))
                    .and(col(METRIC).eq(lit(metric)))
                    .and(col(DATE).eq(lit(date))),
            )
            .collect()?;
        let x = Ok(df.column(VALUE)?.f64()?.into_iter().next().flatten());
        x
    }

    /// Per-ticker `(date, value)` series for `metric`, tickers in first-seen order.
    pub fn series_by_ticker(&self, metric: &str) -> PolarsResult<Vec<(String, Vec<(String, f64)>)>> {
        let filtered = self.filter_metric(metric)?;
        let tickers = filtered.df.column(TICKER)?.str()?;
        let dates = filtered.df.column(DATE)?.str()?;
        let values = filtered.df.column(VALUE)?.f64()?;

        let mut series: Vec<(String, Vec<(String, f64)>)> = Vec::new();
        for ((ticker, date), value) in tickers.into_iter().zip(dates.into_iter()).zip(values.into_iter()) {
            let (Some(ticker), Some(date), Some(value)) = (ticker, date, value) else {
                continue;
            };
            match series.iter_mut().find(|(name, _)| name == ticker) {
                Some((_, points)) => points.push((date.to_string(), value)),
                None => series.push((ticker.to_string(), vec![(date.to_string(), value)])),
            }
        }
        Ok(series)
    }
}

impl PartialEq for TidyTable {
    fn eq(&self, other: &Self) -> bool {
        self.df.equals_missing(&other.df)
    }
}

fn first_seen(column: &StringChunked) -> PolarsResult<Vec<String>> {
    let mut seen: Vec<String> = Vec::new();
    for value in column.into_iter().flatten() {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    Ok(seen)
}
