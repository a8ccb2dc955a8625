//! Savings goals and their progress.
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub target_date: NaiveDate,
    pub monthly_contribution: f64,
    /// Progress snapshot maintained outside of the calculator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_cached: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Goal {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn progress(&self) -> f64 {
        self.progress_cached.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GoalProgress {
    pub months: i64,
    pub needed_monthly: f64,
    pub pct: f64,
}

/// Number of whole calendar months from `from` to `to`. A trailing partial
/// month is not counted, and the result is negative when `to` is earlier.
pub fn whole_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if to < from {
        return -whole_months_between(to, from);
    }
    let mut months = i64::from(to.year() - from.year()) * 12
        + i64::from(to.month()) - i64::from(from.month());
    if to.day() < from.day() {
        months -= 1;
    }
    months
}

/// Months left, required monthly pace and percentage done for `goal` as of
/// `today`.
///
/// A disabled goal reports all zeros. Otherwise `months` is at least 1, the
/// monthly pace never goes negative and the percentage is capped at 100.
pub fn goal_progress(goal: &Goal, today: NaiveDate) -> GoalProgress {
    if !goal.is_enabled() {
        return GoalProgress::default();
    }

    let progress = goal.progress();
    let months = whole_months_between(today, goal.target_date).max(1);
    let needed_monthly = ((goal.target_amount - progress) / months as f64).max(0.0);
    let pct = if goal.target_amount > 0.0 {
        (progress / goal.target_amount * 100.0).min(100.0)
    } else {
        0.0
    };

    GoalProgress {
        months,
        needed_monthly,
        pct,
    }
}
