//! Versioned codec for the `daily_pages` blob.
//!
//! The blob is a JSON envelope `{"version": 1, "pages": {"YYYY-MM-DD": page}}`.
//! A bare legacy map of pages is also accepted. Records are decoded through a
//! lenient shape with growable slot lists and then normalized to the fixed
//! slot counts, so a truncated import cannot break the arity invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::date::CalendarDate;
use crate::error::ValidationError;
use crate::page::{DailyPage, PageStatus, Task};

/// Current envelope version.
pub const PAGES_BLOB_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    pages: &'a BTreeMap<CalendarDate, DailyPage>,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    pages: BTreeMap<CalendarDate, StoredPage>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyBlob {
    Versioned(Envelope),
    Legacy(BTreeMap<CalendarDate, StoredPage>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredPage {
    date: CalendarDate,
    #[serde(default)]
    status: PageStatus,
    #[serde(default)]
    main_for_month: Vec<String>,
    #[serde(default)]
    main_for_month_locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    main_three: Vec<Task>,
    #[serde(default)]
    secondary_nine: Vec<Task>,
    #[serde(default)]
    gratitude: Vec<String>,
    #[serde(default)]
    financial_affirmation: String,
    #[serde(default)]
    financial_affirmation_confirmed: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

fn fill<T, const N: usize>(mut items: Vec<T>, mut blank: impl FnMut() -> T) -> [T; N] {
    items.truncate(N);
    while items.len() < N {
        items.push(blank());
    }
    match items.try_into() {
        Ok(array) => array,
        Err(_) => std::array::from_fn(|_| blank()),
    }
}

impl StoredPage {
    fn into_page(self) -> DailyPage {
        let mut page = DailyPage {
            date: self.date,
            status: self.status,
            main_for_month: fill(self.main_for_month, String::new),
            main_for_month_locked_at: self.main_for_month_locked_at,
            main_three: fill(self.main_three, Task::empty),
            secondary_nine: fill(self.secondary_nine, Task::empty),
            gratitude: fill(self.gratitude, String::new),
            financial_affirmation: self.financial_affirmation,
            financial_affirmation_confirmed: self.financial_affirmation_confirmed,
            created_at: self.created_at,
            completed_at: self.completed_at,
        };
        // padded main slots are unchecked, so a stored "completed" may no longer hold
        if page.status == PageStatus::Completed && !page.all_main_completed() {
            page.status = PageStatus::Pending;
            page.completed_at = None;
        }
        page
    }
}

/// Serialize the page collection into a versioned blob.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn encode_pages(pages: &BTreeMap<CalendarDate, DailyPage>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&EnvelopeRef {
        version: PAGES_BLOB_VERSION,
        pages,
    })
}

/// Parse a stored blob.
///
/// The map key is authoritative for a page's date.
///
/// # Errors
/// Returns an error if the blob is not valid JSON of either accepted shape,
/// or if its version is newer than this build understands.
pub fn decode_pages(raw: &str) -> crate::error::Result<BTreeMap<CalendarDate, DailyPage>> {
    let stored = match serde_json::from_str::<AnyBlob>(raw)? {
        AnyBlob::Versioned(envelope) => {
            if envelope.version > PAGES_BLOB_VERSION {
                return Err(ValidationError::UnsupportedVersion {
                    found: envelope.version.to_string(),
                    supported: PAGES_BLOB_VERSION.to_string(),
                }
                .into());
            }
            envelope.pages
        }
        AnyBlob::Legacy(pages) => pages,
    };

    Ok(stored
        .into_iter()
        .map(|(date, page)| {
            let mut page = page.into_page();
            page.date = date;
            (date, page)
        })
        .collect())
}
