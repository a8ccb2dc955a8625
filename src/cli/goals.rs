use super::ui;
use crate::core::state::AppState;
use chrono::NaiveDate;
use comfy_table::Cell;

pub fn list(state: &AppState, today: NaiveDate) -> String {
    let report = state.goal_report(today);
    if report.is_empty() {
        return "No goals defined.".to_string();
    }

    let base = state.base_currency();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Goal"),
        ui::header_cell(&format!("Target ({base})")),
        ui::header_cell("Saved"),
        ui::header_cell("Done"),
        ui::header_cell("Due"),
        ui::header_cell("Months left"),
        ui::header_cell("Needed / month"),
        ui::header_cell("Planned / month"),
    ]);

    for (goal, progress) in report {
        let name = if goal.is_enabled() {
            goal.name.clone()
        } else {
            ui::style_text(&format!("{} (off)", goal.name), ui::StyleType::Subtle)
        };
        // Falling behind when the plan is smaller than the needed pace.
        let needed = if goal.is_enabled() && progress.needed_monthly > goal.monthly_contribution {
            ui::amount_cell(progress.needed_monthly).fg(comfy_table::Color::Red)
        } else {
            ui::amount_cell(progress.needed_monthly)
        };
        table.add_row(vec![
            Cell::new(name),
            ui::amount_cell(goal.target_amount),
            goal.progress_cached.map_or_else(ui::na_cell, ui::amount_cell),
            ui::pct_cell(progress.pct, None),
            Cell::new(goal.target_date.format("%Y-%m-%d")),
            Cell::new(progress.months),
            needed,
            ui::amount_cell(goal.monthly_contribution),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::NewGoal;

    #[test]
    fn test_list_goals() {
        let mut state = AppState::new("THB").unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(list(&state, today), "No goals defined.");

        state
            .add_goal(NewGoal {
                name: "Bike".to_string(),
                target_amount: 6000.0,
                target_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                monthly_contribution: 500.0,
            })
            .unwrap();
        let output = list(&state, today);
        assert!(output.contains("Bike"));
        assert!(output.contains("1,000.00"));
    }
}
