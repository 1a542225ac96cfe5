pub mod config;
pub mod data;
pub mod day;
pub mod month;
pub mod reflection;
pub mod review;
pub mod skipped;
pub mod task;

use paretojournal_core::{CalendarDate, Config, JournalEngine, JournalEvent, SqliteStore, SystemClock};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the journal database named by the config.
pub fn open_engine() -> Result<JournalEngine, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let path = config.database_path()?;
    tracing::debug!(path = %path.display(), "opening journal");
    let store = SqliteStore::open(&path)?;
    Ok(JournalEngine::with_config(
        Box::new(store),
        Box::new(SystemClock),
        &config,
    ))
}

/// Flush pending writes and report storage warnings on stderr.
pub fn finish(engine: &mut JournalEngine) {
    engine.flush();
    for event in engine.drain_events() {
        if let JournalEvent::StorageWarning(warning) = event {
            eprintln!("warning: {} ({})", warning.message, warning.key);
        }
    }
}

/// The given date, or today's.
pub fn date_or_today(engine: &JournalEngine, date: Option<CalendarDate>) -> CalendarDate {
    date.unwrap_or_else(|| engine.today())
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
