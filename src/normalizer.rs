// src/normalizer.rs

use serde_json::Value;

use crate::error::{DecodeError, MetricUnavailable, Result};
use crate::table::{MetricRecord, TidyTable};

/// Turns a `timeseries` payload into a tidy `metric, date, value` table.
pub struct MetricNormalizer;

impl MetricNormalizer {
    /// Normalizes every metric entry of `ticker`'s `payload`.
    ///
    /// A metric is kept only when all of its observations parse; anything else
    /// drops that metric alone. A payload without `timeseries.result` fails.
    /// Rows are not tagged with `ticker` here.
    pub fn normalize(payload: &Value, ticker: &str) -> Result<TidyTable> {
        let entries = payload["timeseries"]["result"]
            .as_array()
            .ok_or(DecodeError::Shape("timeseries.result"))?;

        let mut records = Vec::new();
        for entry in entries {
            match Self::parse_entry(entry) {
                Ok(mut metric_records) => records.append(&mut metric_records),
                Err(reason) => log::debug!("{ticker}: skipping metric, {reason}"),
            }
        }

        Ok(TidyTable::from_records(records)?)
    }

    /// Parses one result entry into its records, all or nothing.
    pub fn parse_entry(entry: &Value) -> std::result::Result<Vec<MetricRecord>, MetricUnavailable> {
        let metric = entry["meta"]["type"][0]
            .as_str()
            .ok_or(MetricUnavailable::MissingName)?;

        let observations = entry[metric]
            .as_array()
            .ok_or_else(|| MetricUnavailable::MissingObservations(metric.to_string()))?;

        observations
            .iter()
            .enumerate()
            .map(|(index, observation)| -> std::result::Result<MetricRecord, MetricUnavailable> {
                let missing = |field: &'static str| MetricUnavailable::MissingField {
                    metric: metric.to_string(),
                    index,
                    field,
                };
                let date = observation["asOfDate"].as_str().ok_or_else(|| missing("asOfDate"))?;
                let value = observation["reportedValue"]["raw"]
                    .as_f64()
                    .ok_or_else(|| missing("reportedValue.raw"))?;
                Ok(MetricRecord {
                    metric: metric.to_string(),
                    date: date.to_string(),
                    value,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn padded_null_observation_drops_the_metric() {
        let entry = json!({
            "meta": {"type": ["quarterlyPegRatio"]},
            "quarterlyPegRatio": [
                {"asOfDate": "2022-12-31", "reportedValue": {"raw": 2.1}},
                null
            ]
        });
        assert_eq!(
            MetricNormalizer::parse_entry(&entry),
            Err(MetricUnavailable::MissingField {
                metric: "quarterlyPegRatio".to_string(),
                index: 1,
                field: "asOfDate",
            })
        );
    }

    #[test]
    fn entry_without_list_is_unavailable() {
        let entry = json!({"meta": {"type": ["trailingPegRatio"]}, "timestamp": [1]});
        assert_eq!(
            MetricNormalizer::parse_entry(&entry),
            Err(MetricUnavailable::MissingObservations("trailingPegRatio".to_string()))
        );
    }

    #[test]
    fn integer_raw_values_are_accepted() {
        let entry = json!({
            "meta": {"type": ["quarterlyMarketCap"]},
            "quarterlyMarketCap": [{"asOfDate": "2023-03-31", "reportedValue": {"raw": 2609039000000i64}}]
        });
        let records = MetricNormalizer::parse_entry(&entry).unwrap();
        assert_eq!(records[0].value, 2_609_039_000_000.0);
    }
}
