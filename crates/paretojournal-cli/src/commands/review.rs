use clap::Subcommand;
use serde_json::json;

use super::{open_engine, print_json, CmdResult};

#[derive(Subcommand)]
pub enum ReviewAction {
    /// Whether a weekly review can be created, and the window it covers
    Status,
}

pub fn run(action: ReviewAction) -> CmdResult {
    let engine = open_engine()?;

    match action {
        ReviewAction::Status => {
            print_json(&json!({
                "eligibility": engine.can_create_review(),
                "window": engine.review_window(),
            }))?;
        }
    }
    Ok(())
}
