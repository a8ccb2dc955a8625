use super::LedgerStore;
use crate::core::state::Ledger;
use anyhow::Result;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Keeps the ledger in process memory.
#[derive(Default)]
pub struct MemoryLedgerStore {
    inner: Mutex<Option<Ledger>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<Option<Ledger>> {
        let slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(found = slot.is_some(), "Memory ledger LOAD");
        Ok(slot.clone())
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(revision = ledger.revision, "Memory ledger SAVE");
        *slot = Some(ledger.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_load_save() {
        let store = MemoryLedgerStore::new();
        assert!(store.load().unwrap().is_none());

        let ledger = Ledger {
            revision: 3,
            ..Ledger::default()
        };
        store.save(&ledger).unwrap();
        assert_eq!(store.load().unwrap(), Some(ledger));
    }
}
