// src/config.rs

pub const TIMESERIES_URL: &str = "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries/{ticker}?lang=en-US&region=US&symbol={ticker}&padTimeSeries=true&type={types}&merge=false&period1={period1}&period2={period2}&corsDomain=finance.yahoo.com";

pub const RECOMMENDATIONS_URL: &str = "https://query1.finance.yahoo.com/v6/finance/recommendationsbysymbol/{ticker}?";

pub const METRIC_TYPES: &[&str] = &[
    "quarterlyMarketCap",
    "trailingMarketCap",
    "quarterlyEnterpriseValue",
    "trailingEnterpriseValue",
    "quarterlyPeRatio",
    "trailingPeRatio",
    "quarterlyForwardPeRatio",
    "trailingForwardPeRatio",
    "quarterlyPegRatio",
    "trailingPegRatio",
    "quarterlyPsRatio",
    "trailingPsRatio",
    "quarterlyPbRatio",
    "trailingPbRatio",
    "quarterlyEnterprisesValueRevenueRatio",
    "trailingEnterprisesValueRevenueRatio",
    "quarterlyEnterprisesValueEBITDARatio",
    "trailingEnterprisesValueEBITDARatio",
];

/// First second of the requested history window (epoch seconds).
pub const PERIOD_START: i64 = 493_590_046;

pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const REQUESTS_PER_SECOND: u32 = 4;
pub const MAX_BURST_REQUESTS: u32 = 8;
pub const MAX_RETRIES: u32 = 3;
pub const MAX_CONCURRENT_FETCHES: usize = 4;

/// Share of tickers that must report a metric before it is offered for comparison.
pub const COVERAGE_RATIO: f64 = 0.75;

pub const N_SIMULATIONS: usize = 100_000;

/// Reporting date used for the peer snapshot and the valuation inputs.
pub const SNAPSHOT_DATE: &str = "2023-03-31";

/// Default standard deviation is the current value divided by this.
pub const STD_DIVISOR: f64 = 25.0;
