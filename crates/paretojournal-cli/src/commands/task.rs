use clap::Subcommand;
use paretojournal_core::{CalendarDate, JournalEngine, SlotKind};
use serde_json::json;

use super::{finish, open_engine, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Check or uncheck a task
    Toggle {
        /// Page date (YYYY-MM-DD)
        date: CalendarDate,
        /// Task ID
        id: String,
        /// The task is one of the secondary nine
        #[arg(long)]
        secondary: bool,
    },
    /// Replace a task's text
    Edit {
        /// Page date (YYYY-MM-DD)
        date: CalendarDate,
        /// Task ID
        id: String,
        /// New task text
        text: String,
        /// The task is one of the secondary nine
        #[arg(long)]
        secondary: bool,
    },
    /// Copy tasks into empty slots of another day
    Transfer {
        /// Source date
        from: CalendarDate,
        /// Destination date
        to: CalendarDate,
        /// Task IDs to copy
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List unfinished tasks that can be transferred
    Incomplete {
        /// Page date (YYYY-MM-DD)
        date: CalendarDate,
    },
}

fn kind(secondary: bool) -> SlotKind {
    if secondary {
        SlotKind::Secondary
    } else {
        SlotKind::Main
    }
}

fn not_found(engine: &mut JournalEngine, date: CalendarDate, id: &str) -> CmdResult {
    finish(engine);
    Err(format!("no task {id} on {date}").into())
}

pub fn run(action: TaskAction) -> CmdResult {
    let mut engine = open_engine()?;

    match action {
        TaskAction::Toggle { date, id, secondary } => {
            let Some(completed) = engine.toggle_task(date, &id, kind(secondary)) else {
                return not_found(&mut engine, date, &id);
            };
            let status = engine.get_daily_page(date).map(|page| page.status);
            print_json(&json!({ "id": id, "completed": completed, "status": status }))?;
        }
        TaskAction::Edit { date, id, text, secondary } => {
            if !engine.update_task_content(date, &id, &text, kind(secondary)) {
                return not_found(&mut engine, date, &id);
            }
            print_json(&json!({ "id": id, "content": text }))?;
        }
        TaskAction::Transfer { from, to, ids } => {
            let outcome = engine.transfer_tasks(from, to, &ids);
            print_json(&outcome)?;
        }
        TaskAction::Incomplete { date } => {
            print_json(&engine.incomplete_tasks(date))?;
        }
    }

    finish(&mut engine);
    Ok(())
}
