use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Value,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Value => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned amount. An empty display value is shown as a dim "0",
/// the way an empty output field shows its placeholder.
pub fn amount_cell(amount: &str) -> Cell {
    if amount.is_empty() {
        Cell::new("0")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right)
    } else {
        Cell::new(amount)
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Right)
    }
}

pub fn rate_cell(rate: f64) -> Cell {
    let color = if rate.is_finite() {
        Color::Reset
    } else {
        Color::Red
    };
    Cell::new(crate::core::rates::format_fixed(rate, 8))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

pub fn icon_cell(icon: Option<&Path>) -> Cell {
    match icon {
        Some(path) => Cell::new(path.display()).fg(Color::Green),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}

/// A spinner shown while a simulated exchange is pending.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
