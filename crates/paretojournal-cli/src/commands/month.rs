use clap::Subcommand;
use paretojournal_core::page::month_focus_from;
use paretojournal_core::CalendarDate;
use serde_json::json;

use super::{finish, open_engine, print_json, CmdResult};

#[derive(Subcommand)]
pub enum MonthAction {
    /// Set the three focus projects for a date's month
    Set {
        /// Any date in the month (YYYY-MM-DD)
        date: CalendarDate,
        /// Exactly three project names
        #[arg(num_args = 3, required = true)]
        focus: Vec<String>,
    },
    /// Suggest focus projects from the active 90-day plan
    Suggest,
}

pub fn run(action: MonthAction) -> CmdResult {
    let mut engine = open_engine()?;

    match action {
        MonthAction::Set { date, focus } => {
            let focus = month_focus_from(focus)?;
            let updated = engine.set_main_for_month(date, focus);
            print_json(&json!({
                "month": date.month_key(),
                "pagesUpdated": updated,
                "locked": date.day_of_month() != 1,
            }))?;
        }
        MonthAction::Suggest => {
            print_json(&engine.stored_plan_suggestions())?;
        }
    }

    finish(&mut engine);
    Ok(())
}
