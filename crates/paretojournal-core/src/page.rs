//! Daily page and task records.
//!
//! A [`DailyPage`] exists once per calendar date. Its slot arrays are fixed
//! size: three main tasks (the 20%) and nine secondary tasks (the 80%).
//! Only the lifecycle engine creates and mutates these records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date::CalendarDate;
use crate::error::ValidationError;

/// Number of main ("20%") task slots.
pub const MAIN_SLOTS: usize = 3;
/// Number of secondary ("80%") task slots.
pub const SECONDARY_SLOTS: usize = 9;
/// Number of gratitude lines.
pub const GRATITUDE_LINES: usize = 3;
/// Number of month focus projects.
pub const MONTH_FOCUS_SLOTS: usize = 3;

/// Convert user input into a month focus triple.
///
/// # Errors
/// Returns an error unless exactly three entries are given.
pub fn month_focus_from(values: Vec<String>) -> Result<[String; MONTH_FOCUS_SLOTS], ValidationError> {
    let actual = values.len();
    values
        .try_into()
        .map_err(|_| ValidationError::WrongArity {
            field: "mainForMonth".to_string(),
            expected: MONTH_FOCUS_SLOTS,
            actual,
        })
}

/// Day-level completion status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Pending,
    Completed,
    Skipped,
}

impl PageStatus {
    /// Completed or skipped pages close a gap in the daily streak.
    pub fn is_resolved(self) -> bool {
        matches!(self, PageStatus::Completed | PageStatus::Skipped)
    }
}

/// Which slot array a task lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Main,
    Secondary,
}

/// A single task slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// A fresh empty slot with a new identifier.
    pub fn empty() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: String::new(),
            completed: false,
            completed_at: None,
        }
    }

    /// A slot with empty content accepts a transferred task, whatever its
    /// `completed` flag says.
    pub fn is_available(&self) -> bool {
        self.content.is_empty()
    }
}

/// One calendar day of focus, tasks and reflection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPage {
    pub date: CalendarDate,
    #[serde(default)]
    pub status: PageStatus,
    pub main_for_month: [String; MONTH_FOCUS_SLOTS],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_for_month_locked_at: Option<DateTime<Utc>>,
    pub main_three: [Task; MAIN_SLOTS],
    pub secondary_nine: [Task; SECONDARY_SLOTS],
    pub gratitude: [String; GRATITUDE_LINES],
    #[serde(default)]
    pub financial_affirmation: String,
    #[serde(default)]
    pub financial_affirmation_confirmed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl DailyPage {
    /// A blank pending page carrying the given month focus.
    pub fn new(
        date: CalendarDate,
        main_for_month: [String; MONTH_FOCUS_SLOTS],
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            status: PageStatus::Pending,
            main_for_month,
            main_for_month_locked_at: None,
            main_three: std::array::from_fn(|_| Task::empty()),
            secondary_nine: std::array::from_fn(|_| Task::empty()),
            gratitude: Default::default(),
            financial_affirmation: String::new(),
            financial_affirmation_confirmed: false,
            created_at,
            completed_at: None,
        }
    }

    /// The slot array for `kind`.
    pub fn slots(&self, kind: SlotKind) -> &[Task] {
        match kind {
            SlotKind::Main => &self.main_three,
            SlotKind::Secondary => &self.secondary_nine,
        }
    }

    /// Mutable slot array for `kind`.
    pub fn slots_mut(&mut self, kind: SlotKind) -> &mut [Task] {
        match kind {
            SlotKind::Main => &mut self.main_three,
            SlotKind::Secondary => &mut self.secondary_nine,
        }
    }

    /// Find a task by id in the given slot array.
    pub fn task(&self, kind: SlotKind, task_id: &str) -> Option<&Task> {
        self.slots(kind).iter().find(|t| t.id == task_id)
    }

    /// Find a task by id in the given slot array.
    pub fn task_mut(&mut self, kind: SlotKind, task_id: &str) -> Option<&mut Task> {
        self.slots_mut(kind).iter_mut().find(|t| t.id == task_id)
    }

    /// Which slot array holds `task_id`, if any. Main slots are searched first.
    pub fn locate(&self, task_id: &str) -> Option<SlotKind> {
        [SlotKind::Main, SlotKind::Secondary]
            .into_iter()
            .find(|kind| self.task(*kind, task_id).is_some())
    }

    /// True when every main task is checked off.
    pub fn all_main_completed(&self) -> bool {
        self.main_three.iter().all(|t| t.completed)
    }

    /// Number of empty-content slots of `kind`.
    pub fn empty_slot_count(&self, kind: SlotKind) -> usize {
        self.slots(kind).iter().filter(|t| t.is_available()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> DailyPage {
        DailyPage::new(
            "2024-05-02".parse().unwrap(),
            Default::default(),
            Utc::now(),
        )
    }

    #[test]
    fn new_page_has_fixed_slot_counts_and_unique_ids() {
        let p = page();
        assert_eq!(p.main_three.len(), MAIN_SLOTS);
        assert_eq!(p.secondary_nine.len(), SECONDARY_SLOTS);
        let mut ids: Vec<&str> = p
            .main_three
            .iter()
            .chain(p.secondary_nine.iter())
            .map(|t| t.id.as_str())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), MAIN_SLOTS + SECONDARY_SLOTS);
        assert_eq!(p.status, PageStatus::Pending);
    }

    #[test]
    fn empty_content_counts_as_available_even_when_checked() {
        let mut p = page();
        p.secondary_nine[0].completed = true;
        p.secondary_nine[1].content = "call bank".into();
        assert_eq!(p.empty_slot_count(SlotKind::Secondary), SECONDARY_SLOTS - 1);
    }

    #[test]
    fn locate_finds_slot_kind() {
        let p = page();
        let main_id = p.main_three[2].id.clone();
        let sec_id = p.secondary_nine[8].id.clone();
        assert_eq!(p.locate(&main_id), Some(SlotKind::Main));
        assert_eq!(p.locate(&sec_id), Some(SlotKind::Secondary));
        assert_eq!(p.locate("missing"), None);
    }

    #[test]
    fn month_focus_requires_three_entries() {
        let focus = month_focus_from(vec!["A".into(), "B".into(), "C".into()]).unwrap();
        assert_eq!(focus[2], "C");
        assert_eq!(
            month_focus_from(vec!["A".into()]),
            Err(ValidationError::WrongArity {
                field: "mainForMonth".into(),
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(page()).unwrap();
        assert_eq!(json["date"], "2024-05-02");
        assert_eq!(json["status"], "pending");
        assert!(json["mainThree"].is_array());
        assert!(json["secondaryNine"].is_array());
        assert!(json.get("mainForMonthLockedAt").is_none());
    }
}
