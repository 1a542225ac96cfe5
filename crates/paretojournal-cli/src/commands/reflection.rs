use clap::Subcommand;
use paretojournal_core::CalendarDate;
use serde_json::json;

use super::{finish, open_engine, print_json, CmdResult};

#[derive(Subcommand)]
pub enum GratitudeAction {
    /// Replace one gratitude line
    Set {
        /// Page date (YYYY-MM-DD)
        date: CalendarDate,
        /// Line index, 0 to 2
        index: usize,
        /// Line text
        text: String,
    },
}

#[derive(Subcommand)]
pub enum AffirmationAction {
    /// Replace the affirmation text
    Set {
        /// Page date (YYYY-MM-DD)
        date: CalendarDate,
        /// Affirmation text
        text: String,
    },
    /// Toggle the affirmation signature
    Confirm {
        /// Page date (YYYY-MM-DD)
        date: CalendarDate,
    },
}

pub fn run_gratitude(action: GratitudeAction) -> CmdResult {
    let mut engine = open_engine()?;

    match action {
        GratitudeAction::Set { date, index, text } => {
            if !engine.update_gratitude(date, index, &text)? {
                return Err(format!("no page for {date}").into());
            }
            print_json(&json!({ "date": date, "index": index, "content": text }))?;
        }
    }

    finish(&mut engine);
    Ok(())
}

pub fn run_affirmation(action: AffirmationAction) -> CmdResult {
    let mut engine = open_engine()?;

    match action {
        AffirmationAction::Set { date, text } => {
            if !engine.update_financial_affirmation(date, &text) {
                return Err(format!("no page for {date}").into());
            }
            print_json(&json!({ "date": date, "financialAffirmation": text }))?;
        }
        AffirmationAction::Confirm { date } => {
            let Some(confirmed) = engine.confirm_financial_affirmation(date) else {
                return Err(format!("no page for {date}").into());
            };
            print_json(&json!({ "date": date, "financialAffirmationConfirmed": confirmed }))?;
        }
    }

    finish(&mut engine);
    Ok(())
}
