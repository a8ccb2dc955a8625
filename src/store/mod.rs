//! Persistence boundary for the ledger.

pub mod disk;
pub mod memory;

use crate::core::state::Ledger;
use anyhow::Result;

/// Loads and saves a whole [`Ledger`] snapshot.
pub trait LedgerStore: Send + Sync {
    /// Returns `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Ledger>>;

    fn save(&self, ledger: &Ledger) -> Result<()>;
}

pub use disk::YamlLedgerStore;
pub use memory::MemoryLedgerStore;
