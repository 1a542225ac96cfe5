//! Date access policy.
//!
//! Decides whether a calendar date may be opened given "today" and the
//! existing pages. Rules, first match wins:
//!
//! 1. A future date is blocked, with no override.
//! 2. A past date is allowed and labelled `past_readonly`. The label is
//!    advisory: nothing here forbids editing a past page.
//! 3. Today is blocked while there are unresolved skipped dates between the
//!    last completed-or-skipped page and today.
//! 4. Otherwise today is allowed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::date::CalendarDate;
use crate::page::{DailyPage, PageStatus};

/// Why a date was blocked, or how an allowed date should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    Future,
    PastReadonly,
    SkippedDays,
}

/// Outcome of [`can_access_date`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<AccessReason>,
    /// Unresolved dates, ascending. Only set with [`AccessReason::SkippedDays`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_dates: Vec<CalendarDate>,
}

impl AccessDecision {
    fn allow(reason: Option<AccessReason>) -> Self {
        Self {
            allowed: true,
            reason,
            skipped_dates: Vec::new(),
        }
    }

    fn block(reason: AccessReason, skipped_dates: Vec<CalendarDate>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            skipped_dates,
        }
    }

    /// True if the caller should show the skipped-day resolution flow.
    pub fn needs_resolution(&self) -> bool {
        self.reason == Some(AccessReason::SkippedDays)
    }
}

/// Most recent date whose page is completed or skipped.
pub fn last_resolved_date(pages: &BTreeMap<CalendarDate, DailyPage>) -> Option<CalendarDate> {
    pages
        .iter()
        .rev()
        .find(|(_, page)| page.status.is_resolved())
        .map(|(date, _)| *date)
}

/// Dates strictly between the last resolved page and `today` that have no
/// page or a pending page, ascending.
///
/// Empty when no page has ever been completed or skipped.
pub fn skipped_dates(today: CalendarDate, pages: &BTreeMap<CalendarDate, DailyPage>) -> Vec<CalendarDate> {
    let Some(last) = last_resolved_date(pages) else {
        return Vec::new();
    };

    last.days_between_exclusive(today)
        .filter(|date| {
            pages
                .get(date)
                .map_or(true, |page| page.status == PageStatus::Pending)
        })
        .collect()
}

/// Decide whether `target` may be opened.
pub fn can_access_date(
    target: CalendarDate,
    today: CalendarDate,
    pages: &BTreeMap<CalendarDate, DailyPage>,
) -> AccessDecision {
    if target.is_after(today) {
        return AccessDecision::block(AccessReason::Future, Vec::new());
    }

    if target.is_before(today) {
        return AccessDecision::allow(Some(AccessReason::PastReadonly));
    }

    let skipped = skipped_dates(today, pages);
    if !skipped.is_empty() {
        return AccessDecision::block(AccessReason::SkippedDays, skipped);
    }

    AccessDecision::allow(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn pages(entries: &[(&str, PageStatus)]) -> BTreeMap<CalendarDate, DailyPage> {
        entries
            .iter()
            .map(|(date, status)| {
                let mut page = DailyPage::new(d(date), Default::default(), Utc::now());
                page.status = *status;
                (d(date), page)
            })
            .collect()
    }

    #[test]
    fn gap_after_completed_day_blocks_today() {
        let history = pages(&[("2024-01-01", PageStatus::Completed)]);
        let decision = can_access_date(d("2024-01-04"), d("2024-01-04"), &history);
        assert!(!decision.allowed);
        assert_eq!(decision.reason, Some(AccessReason::SkippedDays));
        assert_eq!(decision.skipped_dates, vec![d("2024-01-02"), d("2024-01-03")]);
        assert!(decision.needs_resolution());
    }

    #[test]
    fn pending_page_in_gap_still_counts_as_skipped() {
        let history = pages(&[
            ("2024-01-01", PageStatus::Completed),
            ("2024-01-02", PageStatus::Pending),
            ("2024-01-03", PageStatus::Skipped),
        ]);
        // last resolved is 01-03, so nothing lies between it and 01-04
        assert!(skipped_dates(d("2024-01-04"), &history).is_empty());

        let history = pages(&[
            ("2024-01-01", PageStatus::Completed),
            ("2024-01-02", PageStatus::Pending),
        ]);
        assert_eq!(skipped_dates(d("2024-01-03"), &history), vec![d("2024-01-02")]);
    }

    #[test]
    fn new_user_is_never_blocked() {
        let history = pages(&[("2024-01-01", PageStatus::Pending)]);
        assert!(skipped_dates(d("2024-03-01"), &history).is_empty());
        let decision = can_access_date(d("2024-03-01"), d("2024-03-01"), &history);
        assert_eq!(decision, AccessDecision::allow(None));
    }

    #[test]
    fn yesterday_completed_means_no_gap() {
        let history = pages(&[("2024-01-03", PageStatus::Completed)]);
        assert!(can_access_date(d("2024-01-04"), d("2024-01-04"), &history).allowed);
    }

    #[test]
    fn today_already_completed_is_allowed() {
        let history = pages(&[("2024-01-04", PageStatus::Completed)]);
        assert!(can_access_date(d("2024-01-04"), d("2024-01-04"), &history).allowed);
    }

    #[test]
    fn decision_serializes_reason_in_snake_case() {
        let decision = can_access_date(d("2024-01-02"), d("2024-01-03"), &BTreeMap::new());
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["reason"], "past_readonly");
        assert!(json.get("skippedDates").is_none());
    }

    proptest! {
        #[test]
        fn future_dates_are_always_blocked(offset in 1i64..5_000, completed in 0i64..60) {
            let today = d("2024-06-15");
            let mut history = BTreeMap::new();
            let done = today.subtract_days(completed);
            let mut page = DailyPage::new(done, Default::default(), Utc::now());
            page.status = PageStatus::Completed;
            history.insert(done, page);

            let decision = can_access_date(today.add_days(offset), today, &history);
            prop_assert!(!decision.allowed);
            prop_assert_eq!(decision.reason, Some(AccessReason::Future));
        }

        #[test]
        fn past_dates_are_always_allowed(offset in 1i64..5_000, gap in 2i64..60) {
            let today = d("2024-06-15");
            let mut history = BTreeMap::new();
            let done = today.subtract_days(gap);
            let mut page = DailyPage::new(done, Default::default(), Utc::now());
            page.status = PageStatus::Completed;
            history.insert(done, page);

            let decision = can_access_date(today.subtract_days(offset), today, &history);
            prop_assert!(decision.allowed);
            prop_assert_eq!(decision.reason, Some(AccessReason::PastReadonly));
        }
    }
}
