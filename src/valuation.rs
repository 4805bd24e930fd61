// src/valuation.rs

use serde::{Deserialize, Serialize};

use crate::config::STD_DIVISOR;
use crate::error::Result;
use crate::formatter::NumberFormatter;
use crate::simulation::ValuationInputs;
use crate::table::TidyTable;

pub const MARKET_CAP_METRIC: &str = "quarterlyMarketCap";

/// Multiples a valuation case can be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValuationKpi {
    ForwardPe,
    PriceSales,
    PriceBook,
}

impl ValuationKpi {
    pub const ALL: [ValuationKpi; 3] = [ValuationKpi::ForwardPe, ValuationKpi::PriceSales, ValuationKpi::PriceBook];

    pub fn metric(self) -> &'static str {
        match self {
            ValuationKpi::ForwardPe => "quarterlyForwardPeRatio",
            ValuationKpi::PriceSales => "quarterlyPsRatio",
            ValuationKpi::PriceBook => "quarterlyPbRatio",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValuationKpi::ForwardPe => "price earnings",
            ValuationKpi::PriceSales => "price sales",
            ValuationKpi::PriceBook => "price book",
        }
    }

    /// The financial quantity the multiple is priced on.
    pub fn financial(self) -> &'static str {
        match self {
            ValuationKpi::ForwardPe => "earnings",
            ValuationKpi::PriceSales => "sales",
            ValuationKpi::PriceBook => "book value",
        }
    }
}

/// Market cap and multiples of one ticker on one reporting date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub ticker: String,
    pub date: String,
    pub market_cap: f64,
    pub forward_pe: Option<f64>,
    pub price_sales: Option<f64>,
    pub price_book: Option<f64>,
}

impl MarketSnapshot {
    /// Reads the snapshot from a tagged table; `None` when no market cap was reported.
    pub fn from_table(table: &TidyTable, ticker: &str, date: &str) -> Result<Option<Self>> {
        let Some(market_cap) = table.value_at(ticker, MARKET_CAP_METRIC, date)? else {
            return Ok(None);
        };
        Ok(Some(MarketSnapshot {
            ticker: ticker.to_string(),
            date: date.to_string(),
            market_cap,
            forward_pe: table.value_at(ticker, ValuationKpi::ForwardPe.metric(), date)?,
            price_sales: table.value_at(ticker, ValuationKpi::PriceSales.metric(), date)?,
            price_book: table.value_at(ticker, ValuationKpi::PriceBook.metric(), date)?,
        }))
    }

    pub fn kpi(&self, kpi: ValuationKpi) -> Option<f64> {
        match kpi {
            ValuationKpi::ForwardPe => self.forward_pe,
            ValuationKpi::PriceSales => self.price_sales,
            ValuationKpi::PriceBook => self.price_book,
        }
    }

    /// A case for `kpi`, treating a missing multiple as 0.
    pub fn case(&self, kpi: ValuationKpi) -> ValuationCase {
        ValuationCase::new(self.market_cap, self.kpi(kpi).unwrap_or(0.0))
    }
}

/// Current market cap and multiple, from which forecasts are seeded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationCase {
    pub market_cap: f64,
    pub kpi_current: f64,
}

impl ValuationCase {
    pub fn new(market_cap: f64, kpi_current: f64) -> Self {
        ValuationCase { market_cap, kpi_current }
    }

    /// Market cap divided by the multiple, or 0 when there is no multiple.
    pub fn financial_current(&self) -> f64 {
        if self.kpi_current != 0.0 {
            self.market_cap / self.kpi_current
        } else {
            0.0
        }
    }

    /// Starting forecast: today's values with a spread of 1/25th, rounded the
    /// way they would be entered by hand.
    pub fn default_inputs(&self) -> ValuationInputs {
        let financial_current = self.financial_current();
        let (denominator, _) = NumberFormatter::SUMMARY.label(financial_current);
        let scaled = financial_current / denominator;

        ValuationInputs {
            kpi_current: self.kpi_current,
            kpi_estimated: round_to(self.kpi_current, 0),
            kpi_std: round_to(self.kpi_current / STD_DIVISOR, 1),
            financial_current,
            financial_estimated: round_to(scaled, 1) * denominator,
            financial_std: round_to(scaled / STD_DIVISOR, 1) * denominator,
        }
    }

    pub fn summary_lines(&self, kpi: ValuationKpi) -> Vec<String> {
        let formatter = NumberFormatter::SUMMARY;
        vec![
            format!("The current market valuation is {}", formatter.format(self.market_cap)),
            format!("The current {} is {}", kpi.name(), formatter.format(self.kpi_current)),
            format!(
                "The current {} are {}",
                kpi.financial(),
                formatter.format(self.financial_current())
            ),
        ]
    }
}

/// Share of simulated growth rates strictly above `wanted`.
pub fn probability_above(cagr: &[f64], wanted: f64) -> f64 {
    if cagr.is_empty() {
        return 0.0;
    }
    cagr.iter().filter(|rate| **rate > wanted).count() as f64 / cagr.len() as f64
}

/// Rounds through the decimal rendering so ties go to even on the exact binary value.
fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{value:.decimals$}").parse().unwrap_or(value)
}
