//! Monthly category budgets.
use crate::core::transaction::{Transaction, TransactionKind};
use anyhow::{Result, anyhow};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A spending limit for one category, in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub limit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BudgetUsage {
    pub spent: f64,
    pub remaining: f64,
    pub pct: f64,
    pub over: bool,
}

/// First and last instant of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let first = date
        .with_day(1)
        .ok_or_else(|| anyhow!("Invalid date: {date}"))?;
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
    .ok_or_else(|| anyhow!("Date out of range: {date}"))?;

    let start = first.and_time(NaiveTime::MIN).and_utc();
    let end = next.and_time(NaiveTime::MIN).and_utc() - Duration::milliseconds(1);
    Ok((start, end))
}

/// Expense spent against `budget` within the inclusive window.
pub fn budget_usage(
    budget: &Budget,
    transactions: &[Transaction],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> BudgetUsage {
    if !budget.enabled.unwrap_or(true) {
        return BudgetUsage::default();
    }

    let spent: f64 = transactions
        .iter()
        .filter(|tx| {
            tx.kind == TransactionKind::Expense
                && tx.category == budget.category
                && tx.within(Some(start), Some(end))
        })
        .map(|tx| tx.base_amount)
        .sum();

    let pct = if budget.limit > 0.0 {
        spent / budget.limit * 100.0
    } else {
        0.0
    };

    BudgetUsage {
        spent,
        remaining: (budget.limit - spent).max(0.0),
        pct,
        over: spent > budget.limit,
    }
}
