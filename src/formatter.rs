// src/formatter.rs

/// Denominator, short suffix and long label for each magnitude, largest first.
const TIERS: &[(f64, &str, &str)] = &[
    (1e12, "T", " (Trillions)"),
    (1e9, "B", " (Billions)"),
    (1e6, "M", " (Millions)"),
    (1e3, "K", " (Thousands)"),
];

/// How far a value must exceed a tier before it is shown in that unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalePolicy {
    /// Summary text: the scaled value must exceed 5.
    Summary,
    /// Chart axes and bar labels: the scaled value must exceed 1.
    Axis,
}

impl ScalePolicy {
    pub fn threshold(self) -> f64 {
        match self {
            ScalePolicy::Summary => 5.0,
            ScalePolicy::Axis => 1.0,
        }
    }
}

/// Renders large magnitudes as e.g. `5.6M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormatter {
    policy: ScalePolicy,
}

impl NumberFormatter {
    pub const SUMMARY: NumberFormatter = NumberFormatter {
        policy: ScalePolicy::Summary,
    };
    pub const AXIS: NumberFormatter = NumberFormatter {
        policy: ScalePolicy::Axis,
    };

    pub fn new(policy: ScalePolicy) -> Self {
        NumberFormatter { policy }
    }

    pub fn policy(&self) -> ScalePolicy {
        self.policy
    }

    pub fn scale(&self, value: f64) -> (f64, &'static str) {
        let (denominator, suffix, _) = self.tier(value);
        (denominator, suffix)
    }

    /// Denominator and long caption, e.g. `(1e6, " (Millions)")`.
    pub fn label(&self, value: f64) -> (f64, &'static str) {
        let (denominator, _, label) = self.tier(value);
        (denominator, label)
    }

    pub fn format(&self, value: f64) -> String {
        let (denominator, suffix) = self.scale(value);
        format!("{}{}", round_one(value / denominator), suffix)
    }

    /// Formats every value with the unit picked for the largest one.
    pub fn format_axis(&self, values: &[f64]) -> Vec<String> {
        let max_value = values.iter().copied().fold(f64::NAN, f64::max);
        let (denominator, suffix) = if max_value.is_nan() {
            (1.0, "")
        } else {
            self.scale(max_value)
        };
        values
            .iter()
            .map(|value| format!("{}{}", round_one(value / denominator), suffix))
            .collect()
    }

    fn tier(&self, value: f64) -> (f64, &'static str, &'static str) {
        let threshold = self.policy.threshold();
        TIERS
            .iter()
            .copied()
            .find(|(denominator, _, _)| value / denominator > threshold)
            .unwrap_or((1.0, "", ""))
    }
}

impl Default for NumberFormatter {
    fn default() -> Self {
        Self::SUMMARY
    }
}

/// One decimal, ties to even on the exact binary value (0.25 -> "0.2", 0.15 -> "0.1").
fn round_one(value: f64) -> String {
    format!("{value:.1}")
}
