//! Transaction records and their construction.

use crate::core::currency::{RateTable, normalize_code, to_base};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Savings,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Savings => "savings",
        };
        f.write_str(name)
    }
}

impl FromStr for TransactionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "savings" | "saving" | "saved" => Ok(TransactionKind::Savings),
            other => bail!("Unknown transaction type: {other}"),
        }
    }
}

/// A stored transaction. `base_amount` is the amount converted into the base
/// currency with `fx_rate` at the time the record was created or restated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub amount: f64,
    pub currency: String,
    pub account: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fx_rate: f64,
    pub base_amount: f64,
}

/// Caller supplied fields for a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
    pub amount: f64,
    pub currency: String,
    pub account: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub tags: BTreeSet<String>,
    pub description: Option<String>,
}

impl Transaction {
    /// Validates `input` and stamps it with a fresh id and the conversion
    /// into `base` under the current `rates`.
    pub fn create(input: NewTransaction, base: &str, rates: &RateTable) -> Result<Self> {
        if !input.amount.is_finite() || input.amount < 0.0 {
            bail!("Amount must be a non-negative number, got {}", input.amount);
        }
        let currency = normalize_code(&input.currency);
        let fx_rate = to_base(1.0, &currency, base, rates)?;

        Ok(Transaction {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id,
            timestamp: input.timestamp,
            kind: input.kind,
            amount: input.amount,
            currency,
            account: input.account,
            category: input.category,
            subcategory: input.subcategory,
            tags: input.tags,
            description: input.description,
            fx_rate,
            base_amount: input.amount * fx_rate,
        })
    }

    /// Recomputes `fx_rate` and `base_amount` against `base` and `rates`.
    pub fn restate(&mut self, base: &str, rates: &RateTable) -> Result<()> {
        self.fx_rate = to_base(1.0, &self.currency, base, rates)?;
        self.base_amount = self.amount * self.fx_rate;
        Ok(())
    }

    /// True when the timestamp lies in the inclusive window. Missing bounds
    /// are unbounded.
    pub fn within(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> bool {
        start.is_none_or(|s| self.timestamp >= s) && end.is_none_or(|e| self.timestamp <= e)
    }
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Some(date) = parse_date(input) {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    let parsed = DateTime::parse_from_rfc3339(input)
        .with_context(|| format!("Invalid timestamp: {input}"))?;
    Ok(parsed.with_timezone(&Utc))
}

/// Like [`parse_timestamp`], but a bare date means the last millisecond of
/// that day so that date ranges include the whole end day.
pub fn parse_range_end(input: &str) -> Result<DateTime<Utc>> {
    let start = parse_timestamp(input)?;
    if parse_date(input.trim()).is_some() {
        return Ok(start + Duration::days(1) - Duration::milliseconds(1));
    }
    Ok(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_tx(kind: TransactionKind, amount: f64, currency: &str) -> NewTransaction {
        NewTransaction {
            user_id: "user-1".to_string(),
            timestamp: parse_timestamp("2024-03-10T12:00:00Z").unwrap(),
            kind,
            amount,
            currency: currency.to_string(),
            account: "wallet".to_string(),
            category: "general".to_string(),
            subcategory: None,
            tags: BTreeSet::new(),
            description: None,
        }
    }

    #[test]
    fn test_create_computes_base_amount() {
        let rates = RateTable::default();
        let tx = Transaction::create(new_tx(TransactionKind::Income, 1000.0, "usd"), "THB", &rates)
            .unwrap();
        assert_eq!(tx.currency, "USD");
        assert_eq!(tx.fx_rate, 36.0);
        assert_eq!(tx.base_amount, 36000.0);
        assert!(!tx.id.is_empty());
    }

    #[test]
    fn test_create_rejects_bad_amounts() {
        let rates = RateTable::default();
        for amount in [-1.0, f64::NAN, f64::INFINITY] {
            let input = new_tx(TransactionKind::Expense, amount, "THB");
            assert!(Transaction::create(input, "THB", &rates).is_err());
        }
    }

    #[test]
    fn test_create_rejects_unknown_currency() {
        let rates = RateTable::default();
        let input = new_tx(TransactionKind::Expense, 10.0, "XYZ");
        assert!(Transaction::create(input, "THB", &rates).is_err());
    }

    #[test]
    fn test_restate() {
        let mut rates = RateTable::default();
        let mut tx =
            Transaction::create(new_tx(TransactionKind::Expense, 10.0, "USD"), "THB", &rates)
                .unwrap();
        rates.set_rate("USD", 30.0).unwrap();
        assert_eq!(tx.base_amount, 360.0);

        tx.restate("THB", &rates).unwrap();
        assert_eq!(tx.base_amount, 300.0);

        tx.restate("USD", &rates).unwrap();
        assert_eq!(tx.fx_rate, 1.0);
        assert_eq!(tx.base_amount, 10.0);
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2024-01-31").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-31T00:00:00+00:00");

        let ts = parse_timestamp("2024-01-31T10:00:00+07:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-31T03:00:00+00:00");

        assert!(parse_timestamp("31/01/2024").is_err());
        assert!(parse_timestamp("").is_err());
    }

    #[test]
    fn test_parse_range_end_covers_whole_day() {
        let end = parse_range_end("2024-01-31").unwrap();
        assert_eq!(end.to_rfc3339(), "2024-01-31T23:59:59.999+00:00");

        let end = parse_range_end("2024-01-31T10:00:00Z").unwrap();
        assert_eq!(end.to_rfc3339(), "2024-01-31T10:00:00+00:00");
    }

    #[test]
    fn test_malformed_timestamp_fails_on_load() {
        let yaml = r#"
id: "1"
user_id: "u"
timestamp: "not a date"
kind: income
amount: 1.0
currency: THB
account: a
category: c
fx_rate: 1.0
base_amount: 1.0
"#;
        assert!(serde_yaml::from_str::<Transaction>(yaml).is_err());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert_eq!("saved".parse::<TransactionKind>().unwrap(), TransactionKind::Savings);
        assert!("transfer".parse::<TransactionKind>().is_err());
    }
}
