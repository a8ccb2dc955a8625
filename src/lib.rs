pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::{AddArgs, BudgetsCommand, GoalsCommand, RangeArgs, RatesCommand};
use crate::core::config::AppConfig;
use crate::core::currency::{RateTable, normalize_code};
use crate::core::state::{AppState, Ledger, NewGoal};
use crate::core::transaction::parse_timestamp;
use crate::store::{LedgerStore, YamlLedgerStore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

pub enum AppCommand {
    Add(AddArgs),
    List(RangeArgs),
    Remove { id: String },
    Summary { range: RangeArgs, currency: Option<String> },
    Convert { amount: f64, from: String, to: String },
    Rates(RatesCommand),
    Base { code: String },
    Goals(GoalsCommand),
    Budgets(BudgetsCommand),
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = YamlLedgerStore::new(config.ledger_path()?);
    let output = execute(command, &config, &store, Utc::now()).await?;
    println!("{output}");
    Ok(())
}

/// Loads the ledger from `store`, or starts a new one from `config`.
pub fn load_state(config: &AppConfig, store: &dyn LedgerStore) -> Result<AppState> {
    if let Some(ledger) = store.load()? {
        return AppState::from_ledger(ledger);
    }

    info!("Starting a new ledger in {}", config.base_currency);
    let defaults = RateTable::default();
    let rates = RateTable::from_rates(
        defaults
            .iter()
            .map(|(code, rate)| (code.to_string(), rate))
            .chain(config.rates.clone()),
    )
    .context("Invalid rate in configuration")?;
    AppState::from_ledger(Ledger {
        base_currency: normalize_code(&config.base_currency),
        rates,
        ..Ledger::default()
    })
}

/// Runs one command against the ledger in `store` and returns what should be
/// shown to the user. The ledger is saved only when the command changed it.
pub async fn execute(
    command: AppCommand,
    config: &AppConfig,
    store: &dyn LedgerStore,
    now: DateTime<Utc>,
) -> Result<String> {
    let mut state = load_state(config, store)?;
    let revision = state.revision();
    let today = now.date_naive();

    let output = match command {
        AppCommand::Add(args) => cli::transactions::add(&mut state, args, &config.user, now)?,
        AppCommand::List(range) => {
            let (start, end) = range.bounds()?;
            cli::transactions::list(&state, start, end)
        }
        AppCommand::Remove { id } => {
            let removed = state.remove_transaction(&id)?;
            format!("Removed {} {} {}", removed.kind, removed.amount, removed.currency)
        }
        AppCommand::Summary { range, currency } => {
            let (start, end) = range.bounds()?;
            let currency = currency.as_deref().map(normalize_code);
            cli::summary::render(&state, start, end, currency.as_deref())
        }
        AppCommand::Convert { amount, from, to } => {
            cli::rates::convert_amount(&state, amount, &from, &to)?
        }
        AppCommand::Rates(RatesCommand::List) => cli::rates::list(&state)?,
        AppCommand::Rates(RatesCommand::Set { code, rate }) => {
            state.set_rate(&code, rate)?;
            format!("Set {} = {rate}", normalize_code(&code))
        }
        AppCommand::Rates(RatesCommand::Add { code, rate }) => {
            state.add_custom_currency(&code, rate)?;
            format!("Added currency {} = {rate}", normalize_code(&code))
        }
        AppCommand::Rates(RatesCommand::Sync) => {
            let provider =
                providers::yahoo_finance::YahooCurrencyProvider::new(config.yahoo_base_url())?;
            cli::rates::sync(&mut state, &provider).await
        }
        AppCommand::Base { code } => {
            state.set_base_currency(&code)?;
            format!("Base currency is now {}", state.base_currency())
        }
        AppCommand::Goals(GoalsCommand::List) => cli::goals::list(&state, today),
        AppCommand::Goals(GoalsCommand::Add {
            name,
            target,
            date,
            monthly,
        }) => {
            let target_date = parse_timestamp(&date)?.date_naive();
            let goal = state.add_goal(NewGoal {
                name,
                target_amount: target,
                target_date,
                monthly_contribution: monthly,
            })?;
            format!("Added goal {} [{}]", goal.name, goal.id)
        }
        AppCommand::Goals(GoalsCommand::Progress { goal, amount }) => {
            state.update_goal_progress(&goal, amount)?;
            format!("Recorded {amount} towards {goal}")
        }
        AppCommand::Goals(GoalsCommand::Toggle { goal, off }) => {
            state.set_goal_enabled(&goal, !off)?;
            format!("Goal {goal} {}", if off { "disabled" } else { "enabled" })
        }
        AppCommand::Budgets(BudgetsCommand::List { month }) => {
            let month = match month {
                Some(m) => parse_timestamp(&m)?.date_naive(),
                None => today,
            };
            cli::budgets::list(&state, month)?
        }
        AppCommand::Budgets(BudgetsCommand::Add { category, limit }) => {
            state.add_budget(&category, limit)?;
            format!("Budget for {category} set to {limit}")
        }
    };

    if state.revision() != revision {
        store.save(state.ledger())?;
    }
    Ok(output)
}
