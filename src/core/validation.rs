//! Amount input validation

use crate::core::rates::parse_leading_float;
use std::fmt::Display;

pub const MAX_AMOUNT_LEN: usize = 15;

/// Why an amount was rejected. `Display` gives the inline message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    Required,
    TooLong,
    NotNumeric,
    InvalidNumber,
    NotPositive,
}

impl Display for AmountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AmountError::Required => "Please enter an amount",
                AmountError::TooLong => "Maximum length is 15 numbers",
                AmountError::NotNumeric =>
                    "Only numeric values and an optional decimal point are allowed",
                AmountError::InvalidNumber => "Invalid number",
                AmountError::NotPositive => "Amount must be greater than 0",
            }
        )
    }
}

impl std::error::Error for AmountError {}

/// Digits with at most one decimal point, nothing else. Empty passes.
pub fn is_decimal_pattern(value: &str) -> bool {
    let mut seen_point = false;
    value.chars().all(|c| match c {
        '0'..='9' => true,
        '.' if !seen_point => {
            seen_point = true;
            true
        }
        _ => false,
    })
}

/// Checks run in order: required, length, pattern, numeric value.
pub fn validate_amount(value: &str) -> Result<f64, AmountError> {
    if value.is_empty() {
        return Err(AmountError::Required);
    }
    if value.chars().count() > MAX_AMOUNT_LEN {
        return Err(AmountError::TooLong);
    }
    if !is_decimal_pattern(value) {
        return Err(AmountError::NotNumeric);
    }
    let amount = parse_leading_float(value).ok_or(AmountError::InvalidNumber)?;
    if amount <= 0.0 {
        return Err(AmountError::NotPositive);
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_amounts() {
        assert_eq!(validate_amount("1"), Ok(1.0));
        assert_eq!(validate_amount("0.5"), Ok(0.5));
        assert_eq!(validate_amount(".25"), Ok(0.25));
        assert_eq!(validate_amount("10."), Ok(10.0));
        assert_eq!(validate_amount("123456789012345"), Ok(123456789012345.0));
    }

    #[test]
    fn test_rejections_and_messages() {
        assert_eq!(validate_amount(""), Err(AmountError::Required));
        assert_eq!(validate_amount("1234567890123456"), Err(AmountError::TooLong));
        assert_eq!(validate_amount("1,5"), Err(AmountError::NotNumeric));
        assert_eq!(validate_amount("1.2.3"), Err(AmountError::NotNumeric));
        assert_eq!(validate_amount("-1"), Err(AmountError::NotNumeric));
        assert_eq!(validate_amount("."), Err(AmountError::InvalidNumber));
        assert_eq!(validate_amount("0"), Err(AmountError::NotPositive));
        assert_eq!(validate_amount("0.000"), Err(AmountError::NotPositive));

        assert_eq!(AmountError::NotPositive.to_string(), "Amount must be greater than 0");
        assert_eq!(AmountError::Required.to_string(), "Please enter an amount");
    }

    #[test]
    fn test_length_is_checked_before_pattern() {
        assert_eq!(validate_amount("abcdefghijklmnop"), Err(AmountError::TooLong));
    }
}
