//! Application state and the ledger snapshot it is persisted as.
use crate::core::budget::{Budget, BudgetUsage, budget_usage, month_bounds};
use crate::core::cache::RevisionCache;
use crate::core::currency::{REFERENCE_CURRENCY, RateTable, normalize_code};
use crate::core::goal::{Goal, GoalProgress, goal_progress};
use crate::core::totals::{self, CurrencyTotals, RangeTotals};
use crate::core::transaction::{NewTransaction, Transaction};
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

fn default_base_currency() -> String {
    REFERENCE_CURRENCY.to_string()
}

/// Everything that is persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub rates: RateTable,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    /// Bumped on every mutation.
    #[serde(default)]
    pub revision: u64,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            rates: RateTable::default(),
            transactions: Vec::new(),
            goals: Vec::new(),
            budgets: Vec::new(),
            revision: 0,
        }
    }
}

/// New goal as entered by the user.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: f64,
    pub target_date: NaiveDate,
    pub monthly_contribution: f64,
}

/// In-memory state for one user's ledger.
#[derive(Debug)]
pub struct AppState {
    ledger: Ledger,
    per_currency: RevisionCache<BTreeMap<String, CurrencyTotals>>,
}

impl AppState {
    pub fn new(base_currency: &str) -> Result<Self> {
        let ledger = Ledger {
            base_currency: normalize_code(base_currency),
            ..Ledger::default()
        };
        Self::from_ledger(ledger)
    }

    pub fn from_ledger(ledger: Ledger) -> Result<Self> {
        ledger.rates.rate(&ledger.base_currency)?;
        debug!(
            transactions = ledger.transactions.len(),
            revision = ledger.revision,
            "Loaded ledger"
        );
        Ok(Self {
            ledger,
            per_currency: RevisionCache::new(),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn base_currency(&self) -> &str {
        &self.ledger.base_currency
    }

    pub fn rates(&self) -> &RateTable {
        &self.ledger.rates
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.ledger.transactions
    }

    pub fn goals(&self) -> &[Goal] {
        &self.ledger.goals
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.ledger.budgets
    }

    pub fn revision(&self) -> u64 {
        self.ledger.revision
    }

    fn touch(&mut self) {
        self.ledger.revision += 1;
    }

    pub fn add_transaction(&mut self, input: NewTransaction) -> Result<&Transaction> {
        let tx = Transaction::create(input, &self.ledger.base_currency, &self.ledger.rates)?;
        info!(id = %tx.id, kind = %tx.kind, amount = tx.amount, currency = %tx.currency, "Adding transaction");
        self.ledger.transactions.push(tx);
        self.touch();
        self.ledger
            .transactions
            .last()
            .ok_or_else(|| anyhow!("Transaction list unexpectedly empty"))
    }

    pub fn remove_transaction(&mut self, id: &str) -> Result<Transaction> {
        let index = self
            .ledger
            .transactions
            .iter()
            .position(|tx| tx.id == id)
            .ok_or_else(|| anyhow!("No transaction with id {id}"))?;
        let removed = self.ledger.transactions.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Edits a rate. Stored base amounts keep the rate they were created with.
    pub fn set_rate(&mut self, code: &str, rate: f64) -> Result<()> {
        self.ledger.rates.set_rate(code, rate)?;
        self.touch();
        Ok(())
    }

    pub fn add_custom_currency(&mut self, code: &str, rate: f64) -> Result<()> {
        self.ledger.rates.add_custom(code, rate)?;
        self.touch();
        Ok(())
    }

    /// Switches the base currency and restates every stored transaction
    /// against it with the current rates.
    pub fn set_base_currency(&mut self, code: &str) -> Result<()> {
        let code = normalize_code(code);
        self.ledger.rates.rate(&code)?;
        if code == self.ledger.base_currency {
            return Ok(());
        }

        // Restate a copy first so a failure leaves the ledger untouched.
        let mut restated = self.ledger.transactions.clone();
        for tx in &mut restated {
            tx.restate(&code, &self.ledger.rates)?;
        }
        info!(
            from = %self.ledger.base_currency,
            to = %code,
            count = restated.len(),
            "Restated transactions into new base currency"
        );
        self.ledger.transactions = restated;
        self.ledger.base_currency = code;
        self.touch();
        Ok(())
    }

    pub fn add_goal(&mut self, input: NewGoal) -> Result<&Goal> {
        if !input.target_amount.is_finite() || input.target_amount <= 0.0 {
            bail!("Goal target must be a positive number, got {}", input.target_amount);
        }
        if !input.monthly_contribution.is_finite() || input.monthly_contribution < 0.0 {
            bail!(
                "Monthly contribution must be a non-negative number, got {}",
                input.monthly_contribution
            );
        }
        self.ledger.goals.push(Goal {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            target_amount: input.target_amount,
            target_date: input.target_date,
            monthly_contribution: input.monthly_contribution,
            progress_cached: None,
            enabled: None,
        });
        self.touch();
        self.ledger
            .goals
            .last()
            .ok_or_else(|| anyhow!("Goal list unexpectedly empty"))
    }

    fn goal_mut(&mut self, id: &str) -> Result<&mut Goal> {
        self.ledger
            .goals
            .iter_mut()
            .find(|g| g.id == id || g.name == id)
            .ok_or_else(|| anyhow!("No goal with id or name {id}"))
    }

    pub fn set_goal_enabled(&mut self, id: &str, enabled: bool) -> Result<()> {
        self.goal_mut(id)?.enabled = Some(enabled);
        self.touch();
        Ok(())
    }

    pub fn update_goal_progress(&mut self, id: &str, progress: f64) -> Result<()> {
        if !progress.is_finite() || progress < 0.0 {
            bail!("Goal progress must be a non-negative number, got {progress}");
        }
        self.goal_mut(id)?.progress_cached = Some(progress);
        self.touch();
        Ok(())
    }

    /// Adds a budget, replacing any existing budget for the same category.
    pub fn add_budget(&mut self, category: &str, limit: f64) -> Result<()> {
        if !limit.is_finite() || limit < 0.0 {
            bail!("Budget limit must be a non-negative number, got {limit}");
        }
        let budget = Budget {
            category: category.to_string(),
            limit,
            enabled: None,
        };
        match self
            .ledger
            .budgets
            .iter_mut()
            .find(|b| b.category == category)
        {
            Some(existing) => *existing = budget,
            None => self.ledger.budgets.push(budget),
        }
        self.touch();
        Ok(())
    }

    /// Native totals per currency, memoized on the ledger revision.
    pub fn per_currency_totals(&self) -> Arc<BTreeMap<String, CurrencyTotals>> {
        self.per_currency.get_or_compute(self.ledger.revision, || {
            totals::group_by_currency(&self.ledger.transactions)
        })
    }

    pub fn range_totals(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> RangeTotals {
        totals::totals_for_range(&self.ledger.transactions, start, end)
    }

    pub fn goal_report(&self, today: NaiveDate) -> Vec<(&Goal, GoalProgress)> {
        self.ledger
            .goals
            .iter()
            .map(|goal| (goal, goal_progress(goal, today)))
            .collect()
    }

    pub fn budget_report(&self, month: NaiveDate) -> Result<Vec<(&Budget, BudgetUsage)>> {
        let (start, end) = month_bounds(month)?;
        Ok(self
            .ledger
            .budgets
            .iter()
            .map(|budget| (budget, budget_usage(budget, &self.ledger.transactions, start, end)))
            .collect())
    }
}
