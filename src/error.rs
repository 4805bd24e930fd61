// src/error.rs

use polars::prelude::PolarsError;
use thiserror::Error;

/// A payload could not be fetched or turned into the expected document shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("response from {url} is not valid JSON: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("payload has no `{0}`")]
    Shape(&'static str),
}

/// Why a single metric entry was left out of a ticker's table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricUnavailable {
    #[error("entry has no metric name")]
    MissingName,
    #[error("metric {0} has no observation list")]
    MissingObservations(String),
    #[error("metric {metric} observation {index} has no {field}")]
    MissingField {
        metric: String,
        index: usize,
        field: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("standard deviation for {name} must be finite and non-negative, got {value}")]
    InvalidStdDev { name: &'static str, value: f64 },
    #[error("mean for {name} must be finite, got {value}")]
    InvalidMean { name: &'static str, value: f64 },
    #[error("periods must be finite and greater than zero, got {0}")]
    InvalidPeriods(f64),
    #[error("simulation needs at least one sample")]
    NoSamples,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Table(#[from] PolarsError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("{tickers} peer tickers but {tables} peer tables")]
    PeerMismatch { tickers: usize, tables: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
