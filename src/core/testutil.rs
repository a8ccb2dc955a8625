//! Shared fixtures for unit tests.

use crate::core::transaction::{Transaction, TransactionKind, parse_timestamp};
use std::collections::BTreeSet;

/// Builds a stored transaction with an explicit `base_amount`.
pub fn record(
    kind: TransactionKind,
    amount: f64,
    currency: &str,
    base_amount: f64,
    timestamp: &str,
) -> Transaction {
    Transaction {
        id: format!("{kind}-{amount}-{currency}-{timestamp}"),
        user_id: "user-1".to_string(),
        timestamp: parse_timestamp(timestamp).unwrap(),
        kind,
        amount,
        currency: currency.to_string(),
        account: "wallet".to_string(),
        category: "general".to_string(),
        subcategory: None,
        tags: BTreeSet::new(),
        description: None,
        fx_rate: if amount > 0.0 { base_amount / amount } else { 1.0 },
        base_amount,
    }
}

pub fn in_category(mut tx: Transaction, category: &str) -> Transaction {
    tx.category = category.to_string();
    tx
}
