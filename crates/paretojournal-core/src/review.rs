//! Weekly review eligibility gate.
//!
//! A review needs a run of completed days. The most recent N completed dates
//! (N = 7 by default) define the review window; they need not be consecutive,
//! so the window can span more than N calendar days when days were skipped.
//! Skipped days inside the window widen it but are not included.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::date::CalendarDate;
use crate::page::{DailyPage, PageStatus};

/// Completed days needed for a weekly review.
pub const REQUIRED_COMPLETED_DAYS: usize = 7;

/// Outcome of [`can_create_review`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEligibility {
    pub allowed: bool,
    /// Total completed pages anywhere in the journal.
    pub completed_count: usize,
    /// The most recent completed dates, newest first, at most N of them.
    pub last_completed_dates: Vec<CalendarDate>,
}

/// Date range and included pages for a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWindow {
    pub start: CalendarDate,
    pub end: CalendarDate,
    /// Completed dates inside `[start, end]`, ascending.
    pub daily_pages_included: Vec<CalendarDate>,
}

/// Check eligibility with the default threshold.
pub fn can_create_review(pages: &BTreeMap<CalendarDate, DailyPage>) -> ReviewEligibility {
    can_create_review_with(pages, REQUIRED_COMPLETED_DAYS)
}

/// Check eligibility against a custom threshold. A review always needs at
/// least one completed day.
pub fn can_create_review_with(
    pages: &BTreeMap<CalendarDate, DailyPage>,
    required: usize,
) -> ReviewEligibility {
    let required = required.max(1);
    let completed: Vec<CalendarDate> = pages
        .iter()
        .rev()
        .filter(|(_, page)| page.status == PageStatus::Completed)
        .map(|(date, _)| *date)
        .collect();

    ReviewEligibility {
        allowed: completed.len() >= required,
        completed_count: completed.len(),
        last_completed_dates: completed.into_iter().take(required).collect(),
    }
}

/// The review window, or `None` when not yet eligible.
pub fn review_window(
    pages: &BTreeMap<CalendarDate, DailyPage>,
    required: usize,
) -> Option<ReviewWindow> {
    let eligibility = can_create_review_with(pages, required);
    if !eligibility.allowed {
        return None;
    }

    let end = *eligibility.last_completed_dates.first()?;
    let start = *eligibility.last_completed_dates.last()?;
    let daily_pages_included = pages
        .range(start..=end)
        .filter(|(_, page)| page.status == PageStatus::Completed)
        .map(|(date, _)| *date)
        .collect();

    Some(ReviewWindow {
        start,
        end,
        daily_pages_included,
    })
}
