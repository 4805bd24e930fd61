// src/lib.rs

pub mod config;
pub mod error;
pub mod decoder;
pub mod session;
pub mod extractor;
pub mod normalizer;
pub mod table;

pub mod aggregator;
pub mod peer_universe;
pub mod simulation;
pub mod valuation;
pub mod formatter;

pub use session::YahooSession;

pub use aggregator::PeerAggregator;
pub use decoder::PayloadDecoder;
pub use error::{DecodeError, Error, MetricUnavailable, Result, SimulationError};
pub use extractor::YahooExtractor;
pub use formatter::{NumberFormatter, ScalePolicy};
pub use normalizer::MetricNormalizer;
pub use peer_universe::{AnalysisSession, LoadReport};
pub use simulation::{DistributionSummary, MonteCarloSimulation, SimulationConfig, SimulationOutputs, ValuationInputs};
pub use table::{MetricRecord, TidyTable};
pub use valuation::{probability_above, MarketSnapshot, ValuationCase, ValuationKpi};
