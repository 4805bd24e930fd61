// tests/extractor_tests.rs
mod common;

use common::{init_logging, metric_entry, recommendations_payload, timeseries_payload, FakeDecoder};
use peerextract::{Error, YahooExtractor, YahooSession};
use serde_json::json;

#[tokio::test]
async fn test_recommended_symbols() {
    init_logging();
    let decoder = FakeDecoder::default()
        .with_recommendations("ORSTED.CO", recommendations_payload(&["VWS.CO", "DANSKE.CO"]));

    let symbols = YahooExtractor::new("ORSTED.CO").get_recommended_symbols(&decoder).await;

    assert_eq!(symbols, Some(vec!["VWS.CO".to_string(), "DANSKE.CO".to_string()]));
}

#[tokio::test]
async fn test_no_recommendations_is_not_an_error() {
    init_logging();
    let decoder = FakeDecoder::default()
        .with_recommendations("EMPTY", recommendations_payload(&[]))
        .with_recommendations("ODD", json!({"finance": {"result": []}}));

    for ticker in ["EMPTY", "ODD", "UNKNOWN"] {
        let symbols = YahooExtractor::new(ticker).get_recommended_symbols(&decoder).await;
        assert_eq!(symbols, None, "{ticker}");
    }
}

#[tokio::test]
async fn test_potential_metrics() {
    let decoder = FakeDecoder::default().with_timeseries(
        "AAPL",
        timeseries_payload(vec![
            metric_entry("quarterlyPsRatio", Some(&[("2022-12-31", 6.5), ("2023-03-31", 7.0)])),
            metric_entry("trailingPsRatio", None),
            metric_entry("quarterlyPbRatio", Some(&[("2023-03-31", 44.0)])),
        ]),
    );

    let metrics = YahooExtractor::new("AAPL").get_potential_metrics(&decoder).await.unwrap();

    assert_eq!(metrics, vec!["quarterlyPsRatio", "quarterlyPbRatio"]);
    assert_eq!(decoder.call_count(), 1);
}

#[tokio::test]
async fn test_malformed_payload_is_surfaced() {
    let decoder = FakeDecoder::default().with_timeseries("AAPL", json!({"finance": {}}));

    let result = YahooExtractor::new("AAPL").get_stats(&decoder).await;

    assert!(matches!(result, Err(Error::Decode(_))));
}

#[tokio::test]
#[ignore = "hits the live Yahoo Finance endpoint"]
async fn test_live_timeseries_request() {
    init_logging();
    let table = YahooExtractor::new("AAPL").get_stats(&YahooSession::new()).await.unwrap();
    assert!(table.metrics().unwrap().contains(&"quarterlyMarketCap".to_string()));
}
