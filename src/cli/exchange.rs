use super::ui;
use crate::core::{FormController, FormState, Phase};
use anyhow::{Result, anyhow};
use comfy_table::Cell;

/// Runs one exchange through the form, with the simulated latency, and prints
/// the final form.
pub async fn run(form: &FormController, amount: &str, swap: bool) -> Result<()> {
    let state = exchange(form, amount, swap).await?;
    println!("{}", render_form(&state));
    Ok(())
}

pub async fn exchange(form: &FormController, amount: &str, swap: bool) -> Result<FormState> {
    // Validation errors surface again on submit.
    let _ = form.set_amount(amount).await;

    if swap {
        form.swap().await;
        settle(form, "Swapping currencies").await;
    }

    form.submit()
        .await
        .map_err(|e| anyhow!("Exchange rejected: {e}"))?;
    settle(form, "Exchanging").await;

    Ok(form.snapshot().await)
}

async fn settle(form: &FormController, message: &str) {
    let pb = ui::new_spinner(message);
    form.wait_idle().await;
    pb.finish_and_clear();
}

/// Renders both sides of the form, the inline message and any busy state.
pub fn render_form(state: &FormState) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Currency"),
        ui::header_cell("Amount"),
    ]);
    table.add_row(vec![
        Cell::new("From"),
        Cell::new(&state.from_currency),
        ui::amount_cell(&state.from_amount),
    ]);
    table.add_row(vec![
        Cell::new("To"),
        Cell::new(&state.to_currency),
        ui::amount_cell(&state.to_amount),
    ]);

    let mut output = table.to_string();
    if let Some(e) = &state.error {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(&e.to_string(), ui::StyleType::Error)
        ));
    }
    match state.phase() {
        Phase::Idle => {}
        Phase::Exchanging => output.push_str(&format!(
            "\n{}",
            ui::style_text("Exchanging...", ui::StyleType::Subtle)
        )),
        Phase::Swapping => output.push_str(&format!(
            "\n{}",
            ui::style_text("Swapping...", ui::StyleType::Subtle)
        )),
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LatencyConfig;
    use crate::core::{AmountError, CurrencyRecord, RateMatrix};
    use std::sync::Arc;

    fn form() -> FormController {
        let records: Vec<CurrencyRecord> = [("USD", 100.0), ("ETH", 2000.0)]
            .iter()
            .map(|(code, price)| CurrencyRecord::new(code, *price, "2023-08-29T07:10:30.000Z"))
            .collect();
        FormController::new(
            Arc::new(RateMatrix::from_records(&records)),
            "USD",
            "ETH",
            LatencyConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_exchange() {
        let state = exchange(&form(), "4", false).await.unwrap();
        assert_eq!(state.to_amount, "0.20000");
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exchange_after_swap() {
        let state = exchange(&form(), "1", true).await.unwrap();
        assert_eq!(state.from_currency, "ETH");
        assert_eq!(state.to_currency, "USD");
        assert_eq!(state.to_amount, "20.00000");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exchange_rejects_invalid_amount() {
        let err = exchange(&form(), "0", false).await.unwrap_err();
        assert!(err.to_string().contains("Amount must be greater than 0"));
    }

    #[test]
    fn test_render_form() {
        let state = FormState {
            from_currency: "USD".to_string(),
            to_currency: "ETH".to_string(),
            from_amount: "abc".to_string(),
            error: Some(AmountError::NotNumeric),
            is_exchanging: true,
            ..FormState::default()
        };
        let output = render_form(&state);
        assert!(output.contains("USD"));
        assert!(output.contains("ETH"));
        assert!(output.contains("Only numeric values"));
        assert!(output.contains("Exchanging..."));
    }
}
