use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date::CalendarDate;
use crate::storage::StorageWarning;

/// Every lifecycle transition in the engine produces an Event.
/// The UI polls for events to drive celebrations, banners and redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JournalEvent {
    PageCreated {
        date: CalendarDate,
        inherited_month_focus: bool,
        at: DateTime<Utc>,
    },
    /// All three main tasks are done.
    DayCompleted {
        date: CalendarDate,
        at: DateTime<Utc>,
    },
    /// A main task was unchecked after the day was completed.
    DayReopened {
        date: CalendarDate,
        at: DateTime<Utc>,
    },
    DaySkipped {
        date: CalendarDate,
        at: DateTime<Utc>,
    },
    MonthFocusChanged {
        month: String,
        pages_updated: usize,
        locked: bool,
        at: DateTime<Utc>,
    },
    TasksTransferred {
        from: CalendarDate,
        to: CalendarDate,
        transferred: usize,
        dropped: usize,
        at: DateTime<Utc>,
    },
    /// A write did not reach storage. In-memory state is still correct;
    /// the UI should suggest exporting data.
    StorageWarning(StorageWarning),
}
