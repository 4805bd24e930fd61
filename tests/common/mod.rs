// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use peerextract::{DecodeError, PayloadDecoder};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One metric entry; `None` observations leave the list out entirely.
pub fn metric_entry(metric: &str, observations: Option<&[(&str, f64)]>) -> Value {
    let mut entry = json!({
        "meta": {"symbol": ["X"], "type": [metric]},
        "timestamp": [1680220800]
    });
    if let Some(observations) = observations {
        entry[metric] = observations
            .iter()
            .map(|(date, value)| {
                json!({
                    "asOfDate": date,
                    "periodType": "3M",
                    "currencyCode": "USD",
                    "reportedValue": {"raw": value, "fmt": value.to_string()}
                })
            })
            .collect();
    }
    entry
}

pub fn timeseries_payload(entries: Vec<Value>) -> Value {
    json!({"timeseries": {"result": entries, "error": null}})
}

pub fn recommendations_payload(symbols: &[&str]) -> Value {
    let recommended: Vec<Value> = symbols
        .iter()
        .map(|symbol| json!({"symbol": symbol, "score": 0.25}))
        .collect();
    json!({"finance": {"result": [{"symbol": "X", "recommendedSymbols": recommended}], "error": null}})
}

/// Serves canned payloads keyed by ticker; unknown tickers fail like a 404.
#[derive(Default)]
pub struct FakeDecoder {
    timeseries: HashMap<String, Value>,
    recommendations: HashMap<String, Value>,
    pub calls: AtomicUsize,
}

impl FakeDecoder {
    pub fn with_timeseries(mut self, ticker: &str, payload: Value) -> Self {
        self.timeseries.insert(ticker.to_string(), payload);
        self
    }

    pub fn with_recommendations(mut self, ticker: &str, payload: Value) -> Self {
        self.recommendations.insert(ticker.to_string(), payload);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PayloadDecoder for FakeDecoder {
    async fn fetch_json(&self, url: &str) -> Result<Value, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let payloads = if url.contains("/timeseries/") {
            &self.timeseries
        } else {
            &self.recommendations
        };
        payloads
            .iter()
            .find(|(ticker, _)| url.contains(&format!("/{ticker}?")))
            .map(|(_, payload)| payload.clone())
            .ok_or_else(|| DecodeError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}
