use super::ui;
use crate::core::RateMatrix;
use anyhow::{Result, bail};
use comfy_table::Cell;

/// Converts immediately, without the simulated exchange delay.
pub fn run(rates: &RateMatrix, amount: &str, from: &str, to: &str) -> Result<()> {
    println!("{}", render_conversion(rates, amount, from, to)?);
    Ok(())
}

pub fn run_rates(rates: &RateMatrix, base: &str) -> Result<()> {
    println!("{}", render_rates(rates, base)?);
    Ok(())
}

pub fn render_conversion(rates: &RateMatrix, amount: &str, from: &str, to: &str) -> Result<String> {
    let converted = rates.convert(amount, from, to);
    if converted.is_empty() {
        bail!("Nothing to convert: '{amount}' is not a non-zero amount");
    }

    let mut output = format!(
        "{} {} = {} {}",
        amount,
        ui::style_text(from, ui::StyleType::Label),
        ui::style_text(&converted, ui::StyleType::Value),
        ui::style_text(to, ui::StyleType::Label),
    );

    let missing: Vec<&str> = [from, to]
        .into_iter()
        .filter(|code| !rates.contains(code))
        .collect();
    if from != to && !missing.is_empty() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!("No price for {}, rate 1 was used", missing.join(", ")),
                ui::StyleType::Subtle
            )
        ));
    }

    Ok(output)
}

/// Lists every rate out of and into `base`.
pub fn render_rates(rates: &RateMatrix, base: &str) -> Result<String> {
    if !rates.contains(base) {
        bail!("Unknown currency: {base}");
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("1 {base} =")),
        ui::header_cell(&format!("= 1 {base}")),
    ]);

    for (code, rate) in rates.row(base) {
        if code == base {
            continue;
        }
        let inverse = rates.rate(code, base).unwrap_or(f64::NAN);
        table.add_row(vec![Cell::new(code), ui::rate_cell(rate), ui::rate_cell(inverse)]);
    }

    Ok(format!(
        "Rates for {}\n\n{}",
        ui::style_text(base, ui::StyleType::Title),
        table
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CurrencyRecord;

    fn rates() -> RateMatrix {
        let records: Vec<CurrencyRecord> = [("USD", 100.0), ("ETH", 2000.0), ("ATOM", 10.0)]
            .iter()
            .map(|(code, price)| CurrencyRecord::new(code, *price, "2023-08-29T07:10:30.000Z"))
            .collect();
        RateMatrix::from_records(&records)
    }

    #[test]
    fn test_render_conversion() {
        let output = render_conversion(&rates(), "1", "ETH", "USD").unwrap();
        assert!(output.contains("20.00000"));
        assert!(!output.contains("rate 1 was used"));
    }

    #[test]
    fn test_render_conversion_notes_missing_price() {
        let output = render_conversion(&rates(), "2", "USD", "DOGE").unwrap();
        assert!(output.contains("2.00000"));
        assert!(output.contains("No price for DOGE"));
    }

    #[test]
    fn test_render_conversion_rejects_empty_result() {
        assert!(render_conversion(&rates(), "abc", "USD", "ETH").is_err());
        assert!(render_conversion(&rates(), "0", "USD", "ETH").is_err());
    }

    #[test]
    fn test_render_rates() {
        let output = render_rates(&rates(), "USD").unwrap();
        assert!(output.contains("ATOM"));
        assert!(output.contains("ETH"));
        assert!(output.contains("10.00000000"));
        assert!(output.contains("0.05000000"));

        assert!(render_rates(&rates(), "DOGE").is_err());
    }
}
