//! Aggregations over transaction lists.
//!
//! Two families live here and answer different questions. Base totals sum the
//! stored `base_amount` of every record into one figure in the base currency.
//! Native totals sum `amount` per original currency and are never converted,
//! so figures from different currencies are not comparable with each other.
use crate::core::transaction::{Transaction, TransactionKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Native sums for one currency bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CurrencyTotals {
    pub income: f64,
    pub expense: f64,
    pub saved: f64,
    pub savings: f64,
}

/// Totals with a savings rate, either in the base currency or natively in one
/// currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RangeTotals {
    pub income: f64,
    pub expense: f64,
    pub saved: f64,
    pub savings: f64,
    pub savings_pct: f64,
}

/// Native totals for one currency. `savings` is `income - expense`; money
/// moved to savings is not subtracted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NativeTotals {
    pub income: f64,
    pub expense: f64,
    pub savings: f64,
    pub savings_pct: f64,
}

/// Result of [`totals_for_range_by_currency`].
#[derive(Debug, Clone, PartialEq)]
pub enum ByCurrency {
    Single(NativeTotals),
    PerCurrency(BTreeMap<String, NativeTotals>),
}

/// `savings / income * 100`, or 0 without income.
pub fn savings_rate(savings: f64, income: f64) -> f64 {
    if income > 0.0 {
        savings / income * 100.0
    } else {
        0.0
    }
}

#[derive(Default)]
struct Sums {
    income: f64,
    expense: f64,
    saved: f64,
}

impl Sums {
    fn add(&mut self, kind: TransactionKind, value: f64) {
        match kind {
            TransactionKind::Income => self.income += value,
            TransactionKind::Expense => self.expense += value,
            TransactionKind::Savings => self.saved += value,
        }
    }

    fn range_totals(&self) -> RangeTotals {
        let savings = self.income - self.expense - self.saved;
        RangeTotals {
            income: self.income,
            expense: self.expense,
            saved: self.saved,
            savings,
            savings_pct: savings_rate(savings, self.income),
        }
    }

    fn native_totals(&self) -> NativeTotals {
        let savings = self.income - self.expense;
        NativeTotals {
            income: self.income,
            expense: self.expense,
            savings,
            savings_pct: savings_rate(savings, self.income),
        }
    }
}

/// Sums native amounts per currency and kind.
pub fn group_by_currency(transactions: &[Transaction]) -> BTreeMap<String, CurrencyTotals> {
    let mut sums: BTreeMap<String, Sums> = BTreeMap::new();
    for tx in transactions {
        sums.entry(tx.currency.clone())
            .or_default()
            .add(tx.kind, tx.amount);
    }
    debug!("Grouped {} transactions into {} currencies", transactions.len(), sums.len());

    sums.into_iter()
        .map(|(currency, s)| {
            let totals = CurrencyTotals {
                income: s.income,
                expense: s.expense,
                saved: s.saved,
                savings: s.income - s.expense - s.saved,
            };
            (currency, totals)
        })
        .collect()
}

/// Sums `base_amount` within the inclusive `[start, end]` window.
pub fn totals_for_range(
    transactions: &[Transaction],
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> RangeTotals {
    let mut sums = Sums::default();
    for tx in transactions.iter().filter(|tx| tx.within(start, end)) {
        sums.add(tx.kind, tx.base_amount);
    }
    sums.range_totals()
}

/// Native totals within the window, for one currency or for every currency
/// present.
pub fn totals_for_range_by_currency(
    transactions: &[Transaction],
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    currency: Option<&str>,
) -> ByCurrency {
    let in_range = transactions.iter().filter(|tx| tx.within(start, end));

    match currency {
        Some(code) => {
            let mut sums = Sums::default();
            for tx in in_range.filter(|tx| tx.currency == code) {
                sums.add(tx.kind, tx.amount);
            }
            ByCurrency::Single(sums.native_totals())
        }
        None => {
            let mut per_currency: BTreeMap<String, Sums> = BTreeMap::new();
            for tx in in_range {
                per_currency
                    .entry(tx.currency.clone())
                    .or_default()
                    .add(tx.kind, tx.amount);
            }
            ByCurrency::PerCurrency(
                per_currency
                    .into_iter()
                    .map(|(code, sums)| (code, sums.native_totals()))
                    .collect(),
            )
        }
    }
}

/// Native totals of every transaction in `currency`, including savings moves.
pub fn totals_in_currency(transactions: &[Transaction], currency: &str) -> RangeTotals {
    let mut sums = Sums::default();
    for tx in transactions.iter().filter(|tx| tx.currency == currency) {
        sums.add(tx.kind, tx.amount);
    }
    sums.range_totals()
}

/// Expense `base_amount` per category within the window.
pub fn totals_by_category(
    transactions: &[Transaction],
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense && tx.within(start, end))
    {
        *totals.entry(tx.category.clone()).or_insert(0.0) += tx.base_amount;
    }
    totals
}
