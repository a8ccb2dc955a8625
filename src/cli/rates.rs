use super::ui;
use crate::core::currency::{CurrencyRateProvider, REFERENCE_CURRENCY, convert, normalize_code};
use crate::core::state::AppState;
use crate::providers::{RateSync, sync_rates};
use anyhow::Result;
use comfy_table::Cell;

/// Table of every known rate, with the value of one unit in the base currency.
pub fn list(state: &AppState) -> Result<String> {
    let base = state.base_currency();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate ({REFERENCE_CURRENCY})")),
        ui::header_cell(&format!("1 unit in {base}")),
    ]);
    for (code, rate) in state.rates().iter() {
        let in_base = convert(1.0, code, base, state.rates())?;
        let name = if code == base {
            ui::style_text(code, ui::StyleType::TotalLabel)
        } else {
            code.to_string()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{rate:.4}")),
            Cell::new(format!("{in_base:.4}")),
        ]);
    }
    Ok(table.to_string())
}

pub fn convert_amount(state: &AppState, amount: f64, from: &str, to: &str) -> Result<String> {
    let from = normalize_code(from);
    let to = normalize_code(to);
    let converted = convert(amount, &from, &to, state.rates())?;
    Ok(format!(
        "{} {from} = {} {to}",
        ui::format_amount(amount),
        ui::format_amount(converted)
    ))
}

/// Refreshes every known rate from `provider`, showing a progress bar.
pub async fn sync(
    state: &mut AppState,
    provider: &(dyn CurrencyRateProvider + Send + Sync),
) -> String {
    let codes = state.rates().codes();
    let pb = ui::new_progress_bar(codes.len().saturating_sub(1) as u64, "Fetching rates...");
    let pb_clone = pb.clone();
    let outcome = sync_rates(provider, state, &codes, &move || pb_clone.inc(1)).await;
    pb.finish_and_clear();
    describe_sync(&outcome)
}

fn describe_sync(outcome: &RateSync) -> String {
    let mut lines = Vec::new();
    for (code, rate) in &outcome.updated {
        lines.push(format!("Updated {code} = {rate:.4} {REFERENCE_CURRENCY}"));
    }
    for (code, error) in &outcome.failed {
        lines.push(ui::style_text(
            &format!("Failed {code}: {error}"),
            ui::StyleType::Error,
        ));
    }
    if lines.is_empty() {
        lines.push("No rates to update.".to_string());
    }
    lines.join("\n")
}
