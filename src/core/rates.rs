//! Pairwise conversion rates derived from currency records

use crate::core::record::CurrencyRecord;
use std::collections::HashMap;
use tracing::debug;

/// Immutable lookup of `rate[from][to] = price(from) / price(to)`.
#[derive(Debug, Clone, Default)]
pub struct RateMatrix {
    rates: HashMap<String, HashMap<String, f64>>,
}

impl RateMatrix {
    /// Builds the full matrix over every ordered pair of codes in `records`.
    ///
    /// When a code appears more than once, its last record wins. Non-positive
    /// or missing prices are not rejected; they surface as `NaN` or infinite
    /// rates.
    pub fn from_records(records: &[CurrencyRecord]) -> Self {
        let mut rates: HashMap<String, HashMap<String, f64>> = HashMap::new();

        for from in records {
            let row = rates.entry(from.currency.clone()).or_default();
            row.clear();
            for to in records {
                let rate = if from.currency == to.currency {
                    1.0
                } else {
                    from.price / to.price
                };
                row.insert(to.currency.clone(), rate);
            }
        }

        debug!(currencies = rates.len(), "Built rate matrix");
        Self { rates }
    }

    pub fn rate(&self, from: &str, to: &str) -> Option<f64> {
        self.rates.get(from).and_then(|row| row.get(to)).copied()
    }

    /// The rate used for conversion. Missing, zero and `NaN` rates all fall
    /// back to 1.
    pub fn effective_rate(&self, from: &str, to: &str) -> f64 {
        match self.rate(from, to) {
            Some(rate) if rate != 0.0 && !rate.is_nan() => rate,
            other => {
                debug!(from, to, rate = ?other, "No usable rate, falling back to 1");
                1.0
            }
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// All rates out of `from`, sorted by target code.
    pub fn row(&self, from: &str) -> Vec<(&str, f64)> {
        let mut row: Vec<(&str, f64)> = self
            .rates
            .get(from)
            .map(|row| row.iter().map(|(code, rate)| (code.as_str(), *rate)).collect())
            .unwrap_or_default();
        row.sort_by(|a, b| a.0.cmp(b.0));
        row
    }

    /// Converts a raw amount string for display.
    ///
    /// Empty input and the literal `"0"` yield an empty string, as does input
    /// without a leading number. Same-currency conversion echoes the input
    /// untouched; everything else is rendered with five decimals.
    pub fn convert(&self, amount: &str, from: &str, to: &str) -> String {
        if amount.is_empty() || amount == "0" {
            return String::new();
        }
        let Some(value) = parse_leading_float(amount) else {
            return String::new();
        };
        if from == to {
            return amount.to_string();
        }
        format_fixed(value * self.effective_rate(from, to), 5)
    }
}

/// Parses the longest numeric prefix of `input`, ignoring leading whitespace
/// and any trailing garbage. Returns `None` when no digits lead the string.
pub fn parse_leading_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Fixed-point rendering with `Infinity`/`NaN` spelled out.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{value:.decimals$}")
    }
}
