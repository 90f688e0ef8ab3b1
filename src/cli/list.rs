use super::ui;
use crate::core::record::parse_quote_date;
use crate::core::{ControlId, CurrencyOption, CurrencySelector};
use comfy_table::{Cell, CellAlignment};

/// Prints the selectable currencies, narrowed by `search` when given.
pub fn run(options: Vec<CurrencyOption>, search: Option<&str>) {
    let mut selector = CurrencySelector::new(ControlId(0), "Currencies", options, "");
    if let Some(text) = search {
        selector.set_search(text);
    }
    println!("{}", render_options(&selector.filtered()));
}

pub fn render_options(options: &[&CurrencyOption]) -> String {
    if options.is_empty() {
        return ui::style_text("No currencies found", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Price (USD)"),
        ui::header_cell("Quoted"),
        ui::header_cell("Icon"),
    ]);

    for option in options {
        let quoted = parse_quote_date(&option.date)
            .map_or_else(|| option.date.clone(), |dt| dt.format("%Y-%m-%d %H:%M UTC").to_string());
        table.add_row(vec![
            Cell::new(&option.code),
            Cell::new(crate::core::rates::format_fixed(option.price, 6))
                .set_alignment(CellAlignment::Right),
            Cell::new(quoted),
            ui::icon_cell(option.icon.as_deref()),
        ]);
    }

    table.to_string()
}
