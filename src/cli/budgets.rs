use super::ui;
use crate::core::state::AppState;
use anyhow::Result;
use chrono::NaiveDate;
use comfy_table::Cell;

pub fn list(state: &AppState, month: NaiveDate) -> Result<String> {
    let report = state.budget_report(month)?;
    if report.is_empty() {
        return Ok("No budgets defined.".to_string());
    }

    let base = state.base_currency();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell(&format!("Limit ({base})")),
        ui::header_cell("Spent"),
        ui::header_cell("Remaining"),
        ui::header_cell("Used"),
    ]);
    for (budget, usage) in report {
        table.add_row(vec![
            Cell::new(&budget.category),
            ui::amount_cell(budget.limit),
            ui::amount_cell(usage.spent),
            ui::amount_cell(usage.remaining),
            ui::pct_cell(usage.pct, Some(100.0)),
        ]);
    }

    Ok(format!(
        "Budgets for {}\n\n{}",
        ui::style_text(&month.format("%B %Y").to_string(), ui::StyleType::Title),
        table
    ))
}
