use super::{AddArgs, ui};
use crate::core::state::AppState;
use crate::core::transaction::{NewTransaction, Transaction, TransactionKind, parse_timestamp};
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::Cell;

pub fn add(state: &mut AppState, args: AddArgs, user: &str, now: DateTime<Utc>) -> Result<String> {
    let kind: TransactionKind = args.kind.parse()?;
    let timestamp = match args.date.as_deref() {
        Some(date) => parse_timestamp(date)?,
        None => now,
    };
    let currency = args
        .currency
        .unwrap_or_else(|| state.base_currency().to_string());

    let input = NewTransaction {
        user_id: user.to_string(),
        timestamp,
        kind,
        amount: args.amount,
        currency,
        account: args.account,
        category: args.category,
        subcategory: args.subcategory,
        tags: args.tags.into_iter().collect(),
        description: args.description,
    };
    let base = state.base_currency().to_string();
    let tx = state.add_transaction(input)?;

    Ok(format!(
        "Added {} {} {} ({} {}) [{}]",
        tx.kind,
        ui::format_amount(tx.amount),
        tx.currency,
        ui::format_amount(tx.base_amount),
        base,
        tx.id
    ))
}

/// Table of transactions in the window, oldest first.
pub fn list(
    state: &AppState,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> String {
    let mut rows: Vec<&Transaction> = state
        .transactions()
        .iter()
        .filter(|tx| tx.within(start, end))
        .collect();
    if rows.is_empty() {
        return "No transactions found.".to_string();
    }
    rows.sort_by_key(|tx| tx.timestamp);

    let base = state.base_currency();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Type"),
        ui::header_cell("Amount"),
        ui::header_cell(&format!("Base ({base})")),
        ui::header_cell("Account"),
        ui::header_cell("Category"),
        ui::header_cell("Tags"),
        ui::header_cell("Id"),
    ]);

    for tx in rows {
        let category = match &tx.subcategory {
            Some(sub) => format!("{} / {sub}", tx.category),
            None => tx.category.clone(),
        };
        let tags = tx.tags.iter().cloned().collect::<Vec<_>>().join(", ");
        table.add_row(vec![
            Cell::new(tx.timestamp.format("%Y-%m-%d")),
            Cell::new(tx.kind),
            Cell::new(format!("{} {}", ui::format_amount(tx.amount), tx.currency)),
            ui::amount_cell(tx.base_amount),
            Cell::new(&tx.account),
            Cell::new(category),
            Cell::new(tags),
            Cell::new(ui::style_text(&tx.id, ui::StyleType::Subtle)),
        ]);
    }
    table.to_string()
}
