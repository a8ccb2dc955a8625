use super::LedgerStore;
use crate::core::state::Ledger;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores the ledger as a YAML file.
pub struct YamlLedgerStore {
    path: PathBuf,
}

impl YamlLedgerStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for YamlLedgerStore {
    fn load(&self) -> Result<Option<Ledger>> {
        if !self.path.exists() {
            debug!("No ledger at {}", self.path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read ledger file: {}", self.path.display()))?;
        let ledger: Ledger = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse ledger file: {}", self.path.display()))?;
        debug!(revision = ledger.revision, "Loaded ledger from {}", self.path.display());
        Ok(Some(ledger))
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(ledger).context("Failed to serialize ledger")?;

        // Write next to the target and rename so a crash never leaves half a file.
        let tmp_path = self.path.with_extension("yaml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write ledger file: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace ledger file: {}", self.path.display()))?;
        debug!(revision = ledger.revision, "Saved ledger to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::AppState;
    use crate::core::transaction::{NewTransaction, TransactionKind, parse_timestamp};
    use std::collections::BTreeSet;
    use tempfile::tempdir;

    #[test]
    fn test_yaml_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = YamlLedgerStore::new(dir.path().join("nested").join("ledger.yaml"));
        assert!(store.load().unwrap().is_none());

        let mut state = AppState::new("USD").unwrap();
        state
            .add_transaction(NewTransaction {
                user_id: "u1".to_string(),
                timestamp: parse_timestamp("2024-06-01").unwrap(),
                kind: TransactionKind::Expense,
                amount: 12.5,
                currency: "EUR".to_string(),
                account: "card".to_string(),
                category: "books".to_string(),
                subcategory: Some("fiction".to_string()),
                tags: BTreeSet::from(["gift".to_string()]),
                description: None,
            })
            .unwrap();

        store.save(state.ledger()).unwrap();
        assert!(store.path().exists());
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(&loaded, state.ledger());
    }

    #[test]
    fn test_yaml_store_rejects_bad_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.yaml");
        fs::write(
            &path,
            r#"
base_currency: THB
transactions:
  - id: "1"
    user_id: u
    timestamp: "yesterday"
    kind: expense
    amount: 1.0
    currency: THB
    account: a
    category: c
    fx_rate: 1.0
    base_amount: 1.0
"#,
        )
        .unwrap();

        let err = YamlLedgerStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse ledger file"));
    }

    #[test]
    fn test_yaml_store_rejects_zero_rate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.yaml");
        fs::write(&path, "base_currency: THB\nrates:\n  THB: 1.0\n  USD: 0.0\n").unwrap();

        let err = YamlLedgerStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse ledger file"));
    }
}
