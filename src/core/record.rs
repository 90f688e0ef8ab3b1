//! Static currency price records

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use tracing::debug;

const BUNDLED_PRICES: &str = include_str!("../../data/prices.json");

/// A reference price for one currency, quoted in a common unit (USD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    pub currency: String,
    #[serde(deserialize_with = "lenient_price")]
    pub price: f64,
    pub date: String,
}

impl CurrencyRecord {
    pub fn new(currency: &str, price: f64, date: &str) -> Self {
        Self {
            currency: currency.to_string(),
            price,
            date: date.to_string(),
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_quote_date(&self.date)
    }
}

/// The quote date, if it is a valid RFC 3339 timestamp.
pub fn parse_quote_date(date: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(date)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

// Prices that are not numbers become NaN and flow into the rate matrix as-is.
fn lenient_price<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(n) => n,
        RawPrice::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
    })
}

pub fn parse_records(json: &str) -> Result<Vec<CurrencyRecord>> {
    let records: Vec<CurrencyRecord> =
        serde_json::from_str(json).context("Failed to parse currency records")?;
    debug!(count = records.len(), "Parsed currency records");
    Ok(records)
}

/// Loads records from `path`, or the bundled dataset when no path is given.
pub fn load_records(path: Option<&Path>) -> Result<Vec<CurrencyRecord>> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read prices file: {}", path.display()))?;
            parse_records(&json).with_context(|| format!("Invalid prices file: {}", path.display()))
        }
        None => parse_records(BUNDLED_PRICES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_dataset_loads() {
        let records = load_records(None).unwrap();
        assert!(records.iter().any(|r| r.currency == "USD" && r.price == 1.0));
        assert!(records.iter().any(|r| r.currency == "ETH"));
        assert!(records.iter().all(|r| r.timestamp().is_some()));
    }

    #[test]
    fn test_string_prices_are_lenient() {
        let json = r#"[
            {"currency": "AAA", "price": "2.5", "date": "2023-08-29T07:10:40.000Z"},
            {"currency": "BBB", "price": "n/a", "date": "yesterday"}
        ]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records[0].price, 2.5);
        assert!(records[1].price.is_nan());
        assert!(records[1].timestamp().is_none());
    }

    #[test]
    fn test_load_records_from_missing_file() {
        let err = load_records(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read prices file"));
    }

    #[test]
    fn test_load_records_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"[{"currency": "USD", "price": 100, "date": "2023-08-29T07:10:30.000Z"}]"#,
        )
        .unwrap();

        let records = load_records(Some(file.path())).unwrap();
        assert_eq!(records, vec![CurrencyRecord::new("USD", 100.0, "2023-08-29T07:10:30.000Z")]);
    }
}
