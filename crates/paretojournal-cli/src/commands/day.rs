use clap::Subcommand;
use paretojournal_core::CalendarDate;
use serde_json::json;

use super::{date_or_today, finish, open_engine, print_json, CmdResult};

/// Exit code for a navigation block.
const BLOCKED_EXIT_CODE: i32 = 2;

#[derive(Subcommand)]
pub enum DayAction {
    /// Open a day, creating its page if the date is accessible
    Open {
        /// Date as YYYY-MM-DD (defaults to today)
        date: Option<CalendarDate>,
    },
    /// Print a page without creating it
    Show {
        /// Date as YYYY-MM-DD (defaults to today)
        date: Option<CalendarDate>,
    },
    /// Print the access decision for a date
    Access {
        /// Date as YYYY-MM-DD (defaults to today)
        date: Option<CalendarDate>,
    },
}

pub fn run(action: DayAction) -> CmdResult {
    let mut engine = open_engine()?;

    match action {
        DayAction::Open { date } => {
            let date = date_or_today(&engine, date);
            let decision = engine.can_access_date(date);
            if !decision.allowed {
                print_json(&json!({ "date": date, "access": decision }))?;
                finish(&mut engine);
                std::process::exit(BLOCKED_EXIT_CODE);
            }
            let page = engine.create_or_get_daily_page(date);
            print_json(&json!({ "access": decision, "page": page }))?;
        }
        DayAction::Show { date } => {
            let date = date_or_today(&engine, date);
            match engine.get_daily_page(date) {
                Some(page) => print_json(page)?,
                None => return Err(format!("no page for {date}").into()),
            }
        }
        DayAction::Access { date } => {
            let date = date_or_today(&engine, date);
            print_json(&engine.can_access_date(date))?;
        }
    }

    finish(&mut engine);
    Ok(())
}
