//! Command line presentation layer.

pub mod budgets;
pub mod goals;
pub mod rates;
pub mod setup;
pub mod summary;
pub mod transactions;
pub mod ui;

use crate::core::transaction::{parse_range_end, parse_timestamp};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

/// Optional inclusive date window.
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// Start of the window (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub from: Option<String>,

    /// End of the window, inclusive (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub to: Option<String>,
}

impl RangeArgs {
    pub fn bounds(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let start = self.from.as_deref().map(parse_timestamp).transpose()?;
        let end = self.to.as_deref().map(parse_range_end).transpose()?;
        Ok((start, end))
    }
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// income, expense or savings
    pub kind: String,

    pub amount: f64,

    /// Currency code, defaults to the base currency
    #[arg(long)]
    pub currency: Option<String>,

    #[arg(short, long, default_value = "cash")]
    pub account: String,

    #[arg(short = 'g', long, default_value = "uncategorized")]
    pub category: String,

    #[arg(long)]
    pub subcategory: Option<String>,

    /// Free text tag, may be repeated
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// When it happened, defaults to now
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RatesCommand {
    /// Show the rate table
    List,
    /// Change the rate of a currency
    Set { code: String, rate: f64 },
    /// Add a custom currency
    Add { code: String, rate: f64 },
    /// Refresh rates from Yahoo Finance
    Sync,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GoalsCommand {
    /// Show goals and the pace needed to reach them
    List,
    /// Create a goal
    Add {
        name: String,
        target: f64,
        /// Target date (YYYY-MM-DD)
        date: String,
        #[arg(short, long, default_value_t = 0.0)]
        monthly: f64,
    },
    /// Record the amount saved so far
    Progress { goal: String, amount: f64 },
    /// Enable or disable a goal
    Toggle {
        goal: String,
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum BudgetsCommand {
    /// Show budget usage for a month
    List {
        /// Any date within the month, defaults to today
        #[arg(long)]
        month: Option<String>,
    },
    /// Set the monthly limit of a category
    Add { category: String, limit: f64 },
}
