use clap::Subcommand;
use serde_json::json;

use super::{finish, open_engine, print_json, CmdResult};

#[derive(Subcommand)]
pub enum SkippedAction {
    /// List unresolved days blocking today
    List,
    /// Mark every unresolved day as skipped
    MarkAll,
    /// Open the earliest unresolved day for filling in
    Fill,
}

pub fn run(action: SkippedAction) -> CmdResult {
    let mut engine = open_engine()?;

    match action {
        SkippedAction::List => {
            let dates = engine.get_skipped_dates();
            print_json(&json!({ "skippedDates": dates, "earliest": dates.first() }))?;
        }
        SkippedAction::MarkAll => {
            let marked = engine.mark_all_skipped();
            print_json(&json!({ "marked": marked }))?;
        }
        SkippedAction::Fill => match engine.earliest_skipped_date() {
            Some(date) => {
                let page = engine.create_or_get_daily_page(date);
                print_json(page)?;
            }
            None => print_json(&json!({ "skippedDates": [] }))?,
        },
    }

    finish(&mut engine);
    Ok(())
}
