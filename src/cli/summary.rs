use super::ui;
use crate::core::state::AppState;
use crate::core::totals::{
    ByCurrency, CurrencyTotals, NativeTotals, RangeTotals, savings_rate, totals_by_category,
    totals_for_range_by_currency, totals_in_currency,
};
use chrono::{DateTime, Utc};
use comfy_table::Cell;
use std::collections::BTreeMap;

fn window_label(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> String {
    let fmt = |d: Option<DateTime<Utc>>, open: &str| {
        d.map_or(open.to_string(), |d| d.format("%Y-%m-%d").to_string())
    };
    format!("{} .. {}", fmt(start, "beginning"), fmt(end, "now"))
}

fn base_table(totals: &RangeTotals, code: &str) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(&format!("Income ({code})")),
        ui::header_cell("Expense"),
        ui::header_cell("Saved"),
        ui::header_cell("Net"),
        ui::header_cell("Savings rate"),
    ]);
    table.add_row(vec![
        ui::amount_cell(totals.income),
        ui::amount_cell(totals.expense),
        ui::amount_cell(totals.saved),
        ui::signed_amount_cell(totals.savings),
        ui::pct_cell(totals.savings_pct, None),
    ]);
    table.to_string()
}

fn native_table(per_currency: &BTreeMap<String, NativeTotals>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Income"),
        ui::header_cell("Expense"),
        ui::header_cell("Net"),
        ui::header_cell("Savings rate"),
    ]);
    for (code, totals) in per_currency {
        table.add_row(vec![
            Cell::new(code),
            ui::amount_cell(totals.income),
            ui::amount_cell(totals.expense),
            ui::signed_amount_cell(totals.savings),
            ui::pct_cell(totals.savings_pct, None),
        ]);
    }
    table.to_string()
}

/// All-time native figures per currency, with money moved to savings.
fn all_time_table(per_currency: &BTreeMap<String, CurrencyTotals>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Income"),
        ui::header_cell("Expense"),
        ui::header_cell("Saved"),
        ui::header_cell("Net"),
        ui::header_cell("Savings rate"),
    ]);
    for (code, totals) in per_currency {
        table.add_row(vec![
            Cell::new(code),
            ui::amount_cell(totals.income),
            ui::amount_cell(totals.expense),
            ui::amount_cell(totals.saved),
            ui::signed_amount_cell(totals.savings),
            ui::pct_cell(savings_rate(totals.savings, totals.income), None),
        ]);
    }
    table.to_string()
}

fn category_table(categories: &BTreeMap<String, f64>, total_expense: f64) -> String {
    let mut rows: Vec<(&String, &f64)> = categories.iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(a.1));

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Spent"),
        ui::header_cell("Share"),
    ]);
    for (category, spent) in rows {
        let share = if total_expense > 0.0 {
            ui::pct_cell(spent / total_expense * 100.0, None)
        } else {
            ui::na_cell()
        };
        table.add_row(vec![Cell::new(category), ui::amount_cell(*spent), share]);
    }
    table.to_string()
}

/// Renders totals for the window: one block in the base currency, one block
/// of native per-currency figures and a breakdown of spending by category.
/// With `currency` only that currency's native figures are shown. Without a
/// window the per-currency block comes from the memoized all-time totals.
pub fn render(
    state: &AppState,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    currency: Option<&str>,
) -> String {
    let base = state.base_currency();
    let txs = state.transactions();
    let mut output = format!(
        "Summary: {}\n\n",
        ui::style_text(&window_label(start, end), ui::StyleType::Title)
    );

    let unbounded = start.is_none() && end.is_none();

    if let (Some(code), true) = (currency, unbounded) {
        output.push_str(&base_table(&totals_in_currency(txs, code), code));
        return output;
    }

    match totals_for_range_by_currency(txs, start, end, currency) {
        ByCurrency::Single(totals) => {
            let code = currency.unwrap_or(base);
            let single = BTreeMap::from([(code.to_string(), totals)]);
            output.push_str(&native_table(&single));
        }
        ByCurrency::PerCurrency(per_currency) => {
            let totals = state.range_totals(start, end);
            output.push_str(&base_table(&totals, base));

            if per_currency.len() > 1 {
                output.push_str(&format!(
                    "\n\n{}\n",
                    ui::style_text("By currency (native amounts)", ui::StyleType::TotalLabel)
                ));
                if unbounded {
                    output.push_str(&all_time_table(&state.per_currency_totals()));
                } else {
                    output.push_str(&native_table(&per_currency));
                }
            }

            let categories = totals_by_category(txs, start, end);
            if !categories.is_empty() {
                output.push_str(&format!(
                    "\n\n{}\n",
                    ui::style_text("Spending by category", ui::StyleType::TotalLabel)
                ));
                output.push_str(&category_table(&categories, totals.expense));
            }

            output.push_str(&format!(
                "\n\nNet ({}): {}",
                ui::style_text(base, ui::StyleType::TotalLabel),
                ui::style_text(&ui::format_amount(totals.savings), ui::StyleType::TotalValue)
            ));
        }
    }

    output
}
