//! Core business logic

pub mod budget;
pub mod cache;
pub mod config;
pub mod currency;
pub mod goal;
pub mod log;
pub mod state;
pub mod totals;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export main types for cleaner imports
pub use currency::{CurrencyRateProvider, RateTable, convert};
pub use state::{AppState, Ledger};
pub use transaction::{NewTransaction, Transaction, TransactionKind};
