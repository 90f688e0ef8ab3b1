//! Line-driven interactive widget
//!
//! Each input line is one user gesture on the form. Gestures on any control
//! are published on the boundary bus first, so an open currency list closes
//! when something else is pressed.

use super::exchange::render_form;
use super::list::render_options;
use super::ui;
use crate::core::{
    BoundaryBus, ControlId, CurrencyOption, CurrencySelector, FormController, Side,
};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const FROM_SELECTOR: ControlId = ControlId(1);
const TO_SELECTOR: ControlId = ControlId(2);
const AMOUNT_INPUT: ControlId = ControlId(3);
const SWAP_BUTTON: ControlId = ControlId(4);
const SUBMIT_BUTTON: ControlId = ControlId(5);

const HELP: &str = "\
Commands:
  open from|to        toggle a currency list
  search <text>       filter the open list
  pick <CODE>         choose a currency from the open list
  from <CODE>         shortcut for: open from, pick <CODE>
  to <CODE>           shortcut for: open to, pick <CODE>
  click               press outside every control
  amount <value>      type into the amount field
  clear               clear the amount
  swap                swap the two currencies
  submit              complete the exchange
  wait                wait for pending results
  show                show the form
  quit                leave";

pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    form: FormController,
    bus: BoundaryBus,
    from: CurrencySelector,
    to: CurrencySelector,
}

impl Session {
    pub fn new(form: FormController, options: Vec<CurrencyOption>, from: &str, to: &str) -> Self {
        let bus = BoundaryBus::new();
        let mut from = CurrencySelector::new(FROM_SELECTOR, "From", options.clone(), from);
        let mut to = CurrencySelector::new(TO_SELECTOR, "To", options, to);
        from.attach(&bus);
        to.attach(&bus);
        Self { form, bus, from, to }
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    fn press(&mut self, target: Option<ControlId>) {
        self.bus.pointer_down(target);
        self.from.process_boundary_events();
        self.to.process_boundary_events();
    }

    fn open_selector(&mut self) -> Option<&mut CurrencySelector> {
        if self.from.is_open() {
            Some(&mut self.from)
        } else if self.to.is_open() {
            Some(&mut self.to)
        } else {
            None
        }
    }

    fn selector(&mut self, side: Side) -> &mut CurrencySelector {
        match side {
            Side::From => &mut self.from,
            Side::To => &mut self.to,
        }
    }

    async fn sync_selection(&mut self) {
        let state = self.form.snapshot().await;
        self.from.set_value(&state.from_currency);
        self.to.set_value(&state.to_currency);
    }

    fn toggle(&mut self, side: Side) -> String {
        let id = self.selector(side).id();
        self.press(Some(id));
        let selector = self.selector(side);
        selector.toggle();
        if selector.is_open() {
            render_options(&selector.filtered())
        } else {
            format!("{} list closed", selector.label())
        }
    }

    async fn pick(&mut self, code: &str) -> Result<String> {
        let Some(selector) = self.open_selector() else {
            return Ok(ui::style_text("No currency list is open", ui::StyleType::Error));
        };
        let side = if selector.id() == FROM_SELECTOR {
            Side::From
        } else {
            Side::To
        };
        let id = selector.id();
        self.press(Some(id));

        let Some(code) = self.selector(side).select(code) else {
            return Ok(ui::style_text(
                &format!("Unknown currency: {code}"),
                ui::StyleType::Error,
            ));
        };
        self.form.change_currency(side, &code).await;
        self.sync_selection().await;
        Ok(render_form(&self.form.snapshot().await))
    }

    /// Applies one input line and returns what to print.
    pub async fn handle(&mut self, line: &str) -> Result<(Flow, String)> {
        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        let output = match (command, arg) {
            ("", _) => String::new(),
            ("quit" | "exit", _) => return Ok((Flow::Quit, String::new())),
            ("help", _) => HELP.to_string(),
            ("open", "from") => self.toggle(Side::From),
            ("open", "to") => self.toggle(Side::To),
            ("search", text) => match self.open_selector() {
                Some(selector) => {
                    selector.set_search(text);
                    render_options(&selector.filtered())
                }
                None => ui::style_text("No currency list is open", ui::StyleType::Error),
            },
            ("pick", code) if !code.is_empty() => self.pick(code).await?,
            ("from", code) if !code.is_empty() => {
                self.press(Some(FROM_SELECTOR));
                self.from.open();
                self.pick(code).await?
            }
            ("to", code) if !code.is_empty() => {
                self.press(Some(TO_SELECTOR));
                self.to.open();
                self.pick(code).await?
            }
            ("click", _) => {
                self.press(None);
                String::new()
            }
            ("amount", value) => {
                self.press(Some(AMOUNT_INPUT));
                let _ = self.form.set_amount(value).await;
                render_form(&self.form.snapshot().await)
            }
            ("clear", _) => {
                self.press(Some(AMOUNT_INPUT));
                self.form.clear_amount().await;
                render_form(&self.form.snapshot().await)
            }
            ("swap", _) => {
                self.press(Some(SWAP_BUTTON));
                self.form.swap().await;
                render_form(&self.form.snapshot().await)
            }
            ("submit", _) => {
                self.press(Some(SUBMIT_BUTTON));
                // A rejected submit is reported through the form's inline message.
                let _ = self.form.submit().await;
                render_form(&self.form.snapshot().await)
            }
            ("wait", _) => {
                self.form.wait_idle().await;
                self.sync_selection().await;
                render_form(&self.form.snapshot().await)
            }
            ("show", _) => {
                self.sync_selection().await;
                render_form(&self.form.snapshot().await)
            }
            _ => ui::style_text(
                &format!("Unknown command: {}. Type 'help'.", line.trim()),
                ui::StyleType::Error,
            ),
        };
        Ok((Flow::Continue, output))
    }
}

/// Reads gestures from `input` until it ends or a quit command arrives, then
/// waits for pending results and prints the final form.
pub async fn run<R, W>(session: &mut Session, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{}", ui::style_text("Currency Swap", ui::StyleType::Title))?;
    writeln!(out, "{}", render_form(&session.form.snapshot().await))?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let (flow, output) = session.handle(&line).await?;
        if !output.is_empty() {
            writeln!(out, "{output}")?;
        }
        if let Flow::Quit = flow {
            break;
        }
    }

    session.form.wait_idle().await;
    session.sync_selection().await;
    writeln!(out, "{}", render_form(&session.form.snapshot().await))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LatencyConfig;
    use crate::core::selector::{IconResolver, unique_options};
    use crate::core::{CurrencyRecord, RateMatrix};
    use std::sync::Arc;

    fn session() -> Session {
        let records: Vec<CurrencyRecord> = [("USD", 100.0), ("ETH", 2000.0), ("ATOM", 10.0)]
            .iter()
            .map(|(code, price)| CurrencyRecord::new(code, *price, "2023-08-29T07:10:30.000Z"))
            .collect();
        let rates = Arc::new(RateMatrix::from_records(&records));
        let options = unique_options(&records, &IconResolver::new("/no/icons"));
        let form = FormController::new(rates, "USD", "ETH", LatencyConfig::default());
        Session::new(form, options, "USD", "ETH")
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_script() {
        let mut session = session();
        let script = b"amount 1\nto ATOM\nwait\nswap\nsubmit\nquit\nshow\n";
        let mut out = Vec::new();

        run(&mut session, &script[..], &mut out).await.unwrap();

        let state = session.form().snapshot().await;
        assert_eq!(state.from_currency, "ATOM");
        assert_eq!(state.to_currency, "USD");
        // Submit ran before the swap landed, so it converted USD -> ATOM and
        // its later timer overwrote the swap result.
        assert_eq!(state.to_amount, "10.00000");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Currency Swap"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_and_outside_click() {
        let mut session = session();

        let (_, output) = session.handle("open to").await.unwrap();
        assert!(output.contains("ATOM"));
        let (_, output) = session.handle("search et").await.unwrap();
        assert!(output.contains("ETH"));
        assert!(!output.contains("ATOM"));

        session.handle("click").await.unwrap();
        assert!(!session.to.is_open());
        assert_eq!(session.to.search(), "");
        assert_eq!(session.form().snapshot().await.to_currency, "ETH");
    }

    #[tokio::test(start_paused = true)]
    async fn test_opening_one_list_closes_the_other() {
        let mut session = session();
        session.handle("open from").await.unwrap();
        assert!(session.from.is_open());

        session.handle("open to").await.unwrap();
        assert!(!session.from.is_open());
        assert!(session.to.is_open());

        session.handle("amount 5").await.unwrap();
        assert!(!session.to.is_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_zero_reports_message() {
        let mut session = session();
        session.handle("amount 0").await.unwrap();
        let (_, output) = session.handle("submit").await.unwrap();
        assert!(output.contains("Amount must be greater than 0"));
        assert!(!session.form().snapshot().await.is_exchanging);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pick_unknown_currency() {
        let mut session = session();
        let (_, output) = session.handle("pick ETH").await.unwrap();
        assert!(output.contains("No currency list is open"));

        let (_, output) = session.handle("from DOGE").await.unwrap();
        assert!(output.contains("Unknown currency: DOGE"));
        assert_eq!(session.form().snapshot().await.from_currency, "USD");
    }
}
