//! Daily page lifecycle engine.
//!
//! The engine is the single writer of daily pages. It owns the in-memory
//! page collection (the source of truth during a session) and persists the
//! whole collection as one blob under `daily_pages` through a [`WriteQueue`]:
//!
//! - immediate writes for transitions that gate navigation: page creation,
//!   skip marking, completion flips, month focus changes, transfers
//! - debounced writes for keystroke-driven text edits
//!
//! Storage failures never abort an operation. They are logged and queued as
//! [`JournalEvent::StorageWarning`]s for the UI.
//!
//! Like the rest of the core, the engine is driven by its caller: invoke
//! [`JournalEngine::tick`] periodically to flush due debounced writes, and
//! [`JournalEngine::flush`] on teardown.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::access::{self, AccessDecision};
use crate::date::{CalendarDate, Clock};
use crate::error::{Result, StorageError, ValidationError};
use crate::events::JournalEvent;
use crate::export::{self, ExportDocument};
use crate::page::{
    DailyPage, PageStatus, SlotKind, Task, GRATITUDE_LINES, MAIN_SLOTS, MONTH_FOCUS_SLOTS,
    SECONDARY_SLOTS,
};
use crate::plans::{PlanSource, StoredPlans};
use crate::review::{self, ReviewEligibility, ReviewWindow, REQUIRED_COMPLETED_DAYS};
use crate::storage::{
    decode_pages, encode_pages, Config, KeyValueStore, StorageWarning, WriteQueue,
    DAILY_PAGES_KEY,
};

/// How a mutation reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Immediate,
    Debounced,
}

/// Why a selected task was not transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The id is not on the source page.
    NotFound,
    /// The source task has no content to copy.
    EmptyContent,
    /// No empty slot of the matching kind was left on the destination.
    NoCapacity,
}

/// A task copied into another day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferredTask {
    pub kind: SlotKind,
    pub source_id: String,
    pub new_id: String,
    pub content: String,
}

/// A selected task that was left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedTask {
    pub task_id: String,
    pub reason: DropReason,
}

/// Result of [`JournalEngine::transfer_tasks`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub transferred: Vec<TransferredTask>,
    pub dropped: Vec<DroppedTask>,
}

/// An unfinished task a transfer dialog can offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCandidate {
    pub kind: SlotKind,
    pub task: Task,
}

/// Owns and mutates every daily page.
pub struct JournalEngine {
    pages: BTreeMap<CalendarDate, DailyPage>,
    queue: WriteQueue,
    clock: Box<dyn Clock>,
    events: Vec<JournalEvent>,
    required_review_days: usize,
}

impl JournalEngine {
    /// Load the engine from `store` with default settings.
    ///
    /// A missing, unreadable or corrupt blob starts an empty journal.
    pub fn open(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        Self::from_queue(WriteQueue::new(store), clock, REQUIRED_COMPLETED_DAYS)
    }

    /// Load the engine with the debounce window and review threshold from
    /// `config`.
    pub fn with_config(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>, config: &Config) -> Self {
        Self::from_queue(
            WriteQueue::with_debounce(store, config.debounce()),
            clock,
            config.review.required_days,
        )
    }

    fn from_queue(queue: WriteQueue, clock: Box<dyn Clock>, required_review_days: usize) -> Self {
        let mut engine = Self {
            pages: BTreeMap::new(),
            queue,
            clock,
            events: Vec::new(),
            required_review_days,
        };
        engine.pages = engine.load_pages();
        engine
    }

    fn load_pages(&self) -> BTreeMap<CalendarDate, DailyPage> {
        let raw = match self.queue.store().get(DAILY_PAGES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read daily pages, starting empty");
                return BTreeMap::new();
            }
        };
        match decode_pages(&raw) {
            Ok(pages) => {
                tracing::debug!(count = pages.len(), "loaded daily pages");
                pages
            }
            Err(e) => {
                tracing::warn!(error = %e, "daily pages blob unreadable, starting empty");
                BTreeMap::new()
            }
        }
    }

    fn persist(&mut self, mode: WriteMode) {
        let blob = match encode_pages(&self.pages) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode daily pages");
                return;
            }
        };
        match mode {
            WriteMode::Immediate => {
                if let Err(e) = self.queue.write_immediate(DAILY_PAGES_KEY, &blob) {
                    self.storage_failed(DAILY_PAGES_KEY, &e);
                }
            }
            WriteMode::Debounced => {
                let now = self.clock.now();
                self.queue.write_debounced(DAILY_PAGES_KEY, blob, now);
            }
        }
    }

    fn storage_failed(&mut self, key: &str, err: &StorageError) {
        tracing::warn!(key, error = %err, "write failed; keeping in-memory state");
        let warning = StorageWarning::from_error(key, err, self.clock.now());
        self.events.push(JournalEvent::StorageWarning(warning));
    }

    fn record_warnings(&mut self, warnings: Vec<StorageWarning>) {
        self.events
            .extend(warnings.into_iter().map(JournalEvent::StorageWarning));
    }

    /// Flush debounced writes whose window has elapsed.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        let warnings = self.queue.flush_due(now);
        self.record_warnings(warnings);
    }

    /// Flush every pending write now.
    pub fn flush(&mut self) {
        let warnings = self.queue.flush_all();
        self.record_warnings(warnings);
    }

    /// Whether a debounced write is still waiting.
    pub fn has_pending_writes(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Take every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<JournalEvent> {
        std::mem::take(&mut self.events)
    }

    /// The backing store.
    pub fn store(&self) -> &dyn KeyValueStore {
        self.queue.store()
    }

    /// Today according to the engine's clock.
    pub fn today(&self) -> CalendarDate {
        self.clock.today()
    }

    /// Every page, by date.
    pub fn pages(&self) -> &BTreeMap<CalendarDate, DailyPage> {
        &self.pages
    }

    /// Pure lookup.
    pub fn get_daily_page(&self, date: CalendarDate) -> Option<&DailyPage> {
        self.pages.get(&date)
    }

    /// The month focus held by any existing page in `date`'s month.
    fn month_focus_for(&self, date: CalendarDate) -> Option<[String; MONTH_FOCUS_SLOTS]> {
        self.pages
            .iter()
            .find(|(other, _)| other.same_month(date))
            .map(|(_, page)| page.main_for_month.clone())
    }

    fn insert_page_if_missing(&mut self, date: CalendarDate) -> bool {
        if self.pages.contains_key(&date) {
            return false;
        }
        let inherited = self.month_focus_for(date);
        let inherited_month_focus = inherited.is_some();
        let now = self.clock.now();
        self.pages.insert(
            date,
            DailyPage::new(date, inherited.unwrap_or_default(), now),
        );
        tracing::info!(%date, inherited_month_focus, "created daily page");
        self.events.push(JournalEvent::PageCreated {
            date,
            inherited_month_focus,
            at: now,
        });
        true
    }

    /// Return the page for `date`, creating it first if needed.
    ///
    /// A new page inherits the month focus of any sibling page in the same
    /// month and is written immediately. Existing pages are returned as-is.
    pub fn create_or_get_daily_page(&mut self, date: CalendarDate) -> &DailyPage {
        if self.insert_page_if_missing(date) {
            self.persist(WriteMode::Immediate);
        }
        &self.pages[&date]
    }

    /// Apply a month focus to every page in `date`'s month.
    ///
    /// On day 1 the lock stamp is cleared; on any other day every updated
    /// page is stamped with the current time. Returns the number of pages
    /// updated.
    pub fn set_main_for_month(
        &mut self,
        date: CalendarDate,
        focus: [String; MONTH_FOCUS_SLOTS],
    ) -> usize {
        let now = self.clock.now();
        let locked_at = (date.day_of_month() != 1).then_some(now);

        let mut updated = 0;
        for page in self
            .pages
            .values_mut()
            .filter(|page| page.date.same_month(date))
        {
            page.main_for_month = focus.clone();
            page.main_for_month_locked_at = locked_at;
            updated += 1;
        }

        let month = date.month_key();
        tracing::info!(%month, pages = updated, locked = locked_at.is_some(), "month focus changed");
        self.events.push(JournalEvent::MonthFocusChanged {
            month,
            pages_updated: updated,
            locked: locked_at.is_some(),
            at: now,
        });
        self.persist(WriteMode::Immediate);
        updated
    }

    /// Flip a task's completion. Main tasks re-derive the day status.
    ///
    /// Returns the new completion flag, or `None` if the page or task does
    /// not exist.
    pub fn toggle_task(&mut self, date: CalendarDate, task_id: &str, kind: SlotKind) -> Option<bool> {
        let now = self.clock.now();
        let task = self.pages.get_mut(&date)?.task_mut(kind, task_id)?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        let completed = task.completed;

        if kind == SlotKind::Main {
            self.check_and_update_completion(date);
        }
        self.persist(WriteMode::Immediate);
        Some(completed)
    }

    /// Re-derive the day status from the main tasks.
    ///
    /// Completion is not a ratchet: unchecking a main task on a completed day
    /// reopens it. Skipped pages are terminal and left alone.
    pub fn check_and_update_completion(&mut self, date: CalendarDate) -> Option<PageStatus> {
        let now = self.clock.now();
        let page = self.pages.get_mut(&date)?;
        let all_done = page.all_main_completed();

        let event = match page.status {
            PageStatus::Pending if all_done => {
                page.status = PageStatus::Completed;
                page.completed_at = Some(now);
                tracing::info!(%date, "day completed");
                Some(JournalEvent::DayCompleted { date, at: now })
            }
            PageStatus::Completed if !all_done => {
                page.status = PageStatus::Pending;
                page.completed_at = None;
                tracing::info!(%date, "day reopened");
                Some(JournalEvent::DayReopened { date, at: now })
            }
            _ => None,
        };
        let status = page.status;
        self.events.extend(event);
        Some(status)
    }

    /// Replace a task's text. Written with debounce; status is untouched.
    pub fn update_task_content(
        &mut self,
        date: CalendarDate,
        task_id: &str,
        content: &str,
        kind: SlotKind,
    ) -> bool {
        let Some(task) = self
            .pages
            .get_mut(&date)
            .and_then(|page| page.task_mut(kind, task_id))
        else {
            return false;
        };
        task.content = content.to_string();
        self.persist(WriteMode::Debounced);
        true
    }

    /// Replace one gratitude line. Written with debounce.
    ///
    /// # Errors
    /// Returns an error if `index` is not below 3.
    pub fn update_gratitude(
        &mut self,
        date: CalendarDate,
        index: usize,
        content: &str,
    ) -> Result<bool, ValidationError> {
        if index >= GRATITUDE_LINES {
            return Err(ValidationError::OutOfBounds {
                collection: "gratitude".to_string(),
                index,
                len: GRATITUDE_LINES,
            });
        }
        let Some(page) = self.pages.get_mut(&date) else {
            return Ok(false);
        };
        page.gratitude[index] = content.to_string();
        self.persist(WriteMode::Debounced);
        Ok(true)
    }

    /// Replace the financial affirmation text. Written with debounce.
    pub fn update_financial_affirmation(&mut self, date: CalendarDate, content: &str) -> bool {
        let Some(page) = self.pages.get_mut(&date) else {
            return false;
        };
        page.financial_affirmation = content.to_string();
        self.persist(WriteMode::Debounced);
        true
    }

    /// Toggle the affirmation signature. Written immediately.
    pub fn confirm_financial_affirmation(&mut self, date: CalendarDate) -> Option<bool> {
        let page = self.pages.get_mut(&date)?;
        page.financial_affirmation_confirmed = !page.financial_affirmation_confirmed;
        let confirmed = page.financial_affirmation_confirmed;
        self.persist(WriteMode::Immediate);
        Some(confirmed)
    }

    fn force_skipped(&mut self, date: CalendarDate) {
        self.insert_page_if_missing(date);
        let now = self.clock.now();
        if let Some(page) = self.pages.get_mut(&date) {
            page.status = PageStatus::Skipped;
        }
        tracing::info!(%date, "day marked skipped");
        self.events.push(JournalEvent::DaySkipped { date, at: now });
    }

    /// Create the page if needed and force it to `skipped`.
    pub fn mark_date_as_skipped(&mut self, date: CalendarDate) -> &DailyPage {
        self.force_skipped(date);
        self.persist(WriteMode::Immediate);
        &self.pages[&date]
    }

    /// Resolve the skipped-day block by marking every skipped date.
    ///
    /// Returns the dates marked, ascending.
    pub fn mark_all_skipped(&mut self) -> Vec<CalendarDate> {
        let dates = self.get_skipped_dates();
        if dates.is_empty() {
            return dates;
        }
        for date in &dates {
            self.force_skipped(*date);
        }
        self.persist(WriteMode::Immediate);
        dates
    }

    /// Unresolved dates blocking today, ascending.
    pub fn get_skipped_dates(&self) -> Vec<CalendarDate> {
        access::skipped_dates(self.clock.today(), &self.pages)
    }

    /// Where the "fill retrospectively" path sends the user.
    pub fn earliest_skipped_date(&self) -> Option<CalendarDate> {
        self.get_skipped_dates().into_iter().next()
    }

    /// Access decision for `target` relative to the engine's today.
    pub fn can_access_date(&self, target: CalendarDate) -> AccessDecision {
        access::can_access_date(target, self.clock.today(), &self.pages)
    }

    /// Unfinished tasks with content on `date`, main first.
    pub fn incomplete_tasks(&self, date: CalendarDate) -> Vec<TransferCandidate> {
        let Some(page) = self.pages.get(&date) else {
            return Vec::new();
        };
        [SlotKind::Main, SlotKind::Secondary]
            .into_iter()
            .flat_map(|kind| {
                page.slots(kind)
                    .iter()
                    .filter(|t| !t.completed && !t.content.is_empty())
                    .map(move |t| TransferCandidate {
                        kind,
                        task: t.clone(),
                    })
            })
            .collect()
    }

    /// Empty slots of `kind` on `date`. A date without a page has every slot
    /// free.
    pub fn empty_slot_count(&self, date: CalendarDate, kind: SlotKind) -> usize {
        match self.pages.get(&date) {
            Some(page) => page.empty_slot_count(kind),
            None => match kind {
                SlotKind::Main => MAIN_SLOTS,
                SlotKind::Secondary => SECONDARY_SLOTS,
            },
        }
    }

    /// Copy selected tasks from `from` into empty slots on `to`.
    ///
    /// Main tasks only fill main slots and secondary tasks only fill
    /// secondary slots. Each copy gets a new id and starts incomplete; the
    /// source page is not modified. Selections that do not fit, are unknown,
    /// or have no content are reported in [`TransferOutcome::dropped`].
    pub fn transfer_tasks(
        &mut self,
        from: CalendarDate,
        to: CalendarDate,
        task_ids: &[String],
    ) -> TransferOutcome {
        let mut outcome = TransferOutcome::default();

        let mut selected: Vec<(SlotKind, Task)> = Vec::new();
        for id in task_ids {
            let found = self.pages.get(&from).and_then(|page| {
                page.locate(id)
                    .and_then(|kind| page.task(kind, id).map(|t| (kind, t.clone())))
            });
            match found {
                Some((_, task)) if task.content.is_empty() => outcome.dropped.push(DroppedTask {
                    task_id: id.clone(),
                    reason: DropReason::EmptyContent,
                }),
                Some(entry) => selected.push(entry),
                None => outcome.dropped.push(DroppedTask {
                    task_id: id.clone(),
                    reason: DropReason::NotFound,
                }),
            }
        }

        if !selected.is_empty() {
            self.insert_page_if_missing(to);
            if let Some(dest) = self.pages.get_mut(&to) {
                for kind in [SlotKind::Main, SlotKind::Secondary] {
                    let mut free = dest
                        .slots(kind)
                        .iter()
                        .enumerate()
                        .filter(|(_, t)| t.is_available())
                        .map(|(i, _)| i)
                        .collect::<Vec<_>>()
                        .into_iter();

                    for (_, source) in selected.iter().filter(|(k, _)| *k == kind) {
                        let Some(slot) = free.next() else {
                            outcome.dropped.push(DroppedTask {
                                task_id: source.id.clone(),
                                reason: DropReason::NoCapacity,
                            });
                            continue;
                        };
                        let copy = Task {
                            content: source.content.clone(),
                            ..Task::empty()
                        };
                        outcome.transferred.push(TransferredTask {
                            kind,
                            source_id: source.id.clone(),
                            new_id: copy.id.clone(),
                            content: copy.content.clone(),
                        });
                        dest.slots_mut(kind)[slot] = copy;
                    }
                }
            }
        }

        let now = self.clock.now();
        tracing::info!(
            %from,
            %to,
            transferred = outcome.transferred.len(),
            dropped = outcome.dropped.len(),
            "tasks transferred"
        );
        self.events.push(JournalEvent::TasksTransferred {
            from,
            to,
            transferred: outcome.transferred.len(),
            dropped: outcome.dropped.len(),
            at: now,
        });
        if !outcome.transferred.is_empty() {
            self.persist(WriteMode::Immediate);
        }
        outcome
    }

    /// Suggested month focus titles from a plan source.
    pub fn month_focus_suggestions(&self, source: &dyn PlanSource) -> Vec<String> {
        source.active_project_titles()
    }

    /// Suggestions from the plans stored alongside the journal.
    pub fn stored_plan_suggestions(&self) -> Vec<String> {
        self.month_focus_suggestions(&StoredPlans::new(self.queue.store()))
    }

    /// Weekly review eligibility with the configured threshold.
    pub fn can_create_review(&self) -> ReviewEligibility {
        review::can_create_review_with(&self.pages, self.required_review_days)
    }

    /// The date window a review created now would cover.
    pub fn review_window(&self) -> Option<ReviewWindow> {
        review::review_window(&self.pages, self.required_review_days)
    }

    /// Snapshot every stored blob, after flushing pending writes.
    ///
    /// # Errors
    /// Returns an error if a key cannot be read.
    pub fn export(&mut self) -> Result<ExportDocument> {
        self.flush();
        export::export_all(self.queue.store(), self.clock.now())
    }

    /// Import a document and reload from storage.
    ///
    /// Pending edits are discarded so they cannot overwrite the imported
    /// blobs. Returns the number of keys written.
    ///
    /// # Errors
    /// Returns an error for an incompatible document or a failed write.
    pub fn import(&mut self, doc: &ExportDocument) -> Result<usize> {
        self.queue.discard_pending();
        let written = export::import_all(self.queue.store(), doc)?;
        self.reload();
        Ok(written)
    }

    /// Discard in-memory state and re-read it from storage.
    pub fn reload(&mut self) {
        self.queue.discard_pending();
        self.pages = self.load_pages();
    }

    /// Wipe every stored key and all in-memory pages.
    ///
    /// # Errors
    /// Returns an error if the store cannot be cleared.
    pub fn reset_all(&mut self) -> Result<()> {
        self.queue.discard_pending();
        self.queue.store().clear()?;
        self.pages.clear();
        tracing::info!("all journal data cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::FixedClock;
    use crate::storage::MemoryStore;

    fn d(s: &str) -> CalendarDate {
        s.parse().unwrap()
    }

    fn engine_on(today: &str) -> (JournalEngine, MemoryStore) {
        let store = MemoryStore::new();
        let engine = JournalEngine::open(Box::new(store.clone()), Box::new(FixedClock::on(d(today))));
        (engine, store)
    }

    fn focus(a: &str, b: &str, c: &str) -> [String; 3] {
        [a.to_string(), b.to_string(), c.to_string()]
    }

    #[test]
    fn create_is_idempotent_and_keeps_edits() {
        let (mut engine, _) = engine_on("2024-03-10");
        let date = d("2024-03-10");
        let first_id = engine.create_or_get_daily_page(date).main_three[0].id.clone();
        engine.update_task_content(date, &first_id, "draft chapter", SlotKind::Main);

        let again = engine.create_or_get_daily_page(date);
        assert_eq!(again.main_three[0].id, first_id);
        assert_eq!(again.main_three[0].content, "draft chapter");
        assert_eq!(engine.pages().len(), 1);
    }

    #[test]
    fn creation_is_written_immediately() {
        let (mut engine, store) = engine_on("2024-03-10");
        engine.create_or_get_daily_page(d("2024-03-10"));
        let raw = store.get(DAILY_PAGES_KEY).unwrap().unwrap();
        assert!(raw.contains("2024-03-10"));
        assert!(!engine.has_pending_writes());
    }

    #[test]
    fn new_page_inherits_month_focus() {
        let (mut engine, _) = engine_on("2024-03-20");
        engine.create_or_get_daily_page(d("2024-03-02"));
        engine.set_main_for_month(d("2024-03-02"), focus("A", "B", "C"));

        let page = engine.create_or_get_daily_page(d("2024-03-20"));
        assert_eq!(page.main_for_month, focus("A", "B", "C"));

        let other_month = engine.create_or_get_daily_page(d("2024-04-01"));
        assert_eq!(other_month.main_for_month, focus("", "", ""));
    }

    #[test]
    fn mid_month_focus_change_locks_every_sibling() {
        let (mut engine, _) = engine_on("2024-03-20");
        for day in ["2024-03-01", "2024-03-10", "2024-03-15", "2024-04-01"] {
            engine.create_or_get_daily_page(d(day));
        }

        assert_eq!(engine.set_main_for_month(d("2024-03-15"), focus("X", "Y", "Z")), 3);
        for day in ["2024-03-01", "2024-03-10", "2024-03-15"] {
            let page = engine.get_daily_page(d(day)).unwrap();
            assert_eq!(page.main_for_month, focus("X", "Y", "Z"));
            assert!(page.main_for_month_locked_at.is_some());
        }
        let april = engine.get_daily_page(d("2024-04-01")).unwrap();
        assert_eq!(april.main_for_month, focus("", "", ""));
        assert!(april.main_for_month_locked_at.is_none());

        engine.set_main_for_month(d("2024-03-01"), focus("P", "Q", "R"));
        for day in ["2024-03-01", "2024-03-10", "2024-03-15"] {
            assert!(engine.get_daily_page(d(day)).unwrap().main_for_month_locked_at.is_none());
        }
    }

    #[test]
    fn completion_follows_main_tasks_both_ways() {
        let (mut engine, _) = engine_on("2024-03-10");
        let date = d("2024-03-10");
        let ids: Vec<String> = engine
            .create_or_get_daily_page(date)
            .main_three
            .iter()
            .map(|t| t.id.clone())
            .collect();

        for id in &ids {
            assert_eq!(engine.toggle_task(date, id, SlotKind::Main), Some(true));
        }
        let page = engine.get_daily_page(date).unwrap();
        assert_eq!(page.status, PageStatus::Completed);
        assert!(page.completed_at.is_some());

        assert_eq!(engine.toggle_task(date, &ids[1], SlotKind::Main), Some(false));
        let page = engine.get_daily_page(date).unwrap();
        assert_eq!(page.status, PageStatus::Pending);
        assert!(page.completed_at.is_none());
        assert!(page.main_three[1].completed_at.is_none());

        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(e, JournalEvent::DayCompleted { .. })));
        assert!(events.iter().any(|e| matches!(e, JournalEvent::DayReopened { .. })));
    }

    #[test]
    fn secondary_toggles_never_change_status() {
        let (mut engine, _) = engine_on("2024-03-10");
        let date = d("2024-03-10");
        let ids: Vec<String> = engine
            .create_or_get_daily_page(date)
            .secondary_nine
            .iter()
            .map(|t| t.id.clone())
            .collect();
        for id in &ids {
            engine.toggle_task(date, id, SlotKind::Secondary);
        }
        assert_eq!(engine.get_daily_page(date).unwrap().status, PageStatus::Pending);
    }

    #[test]
    fn toggle_with_wrong_kind_or_unknown_page_is_noop() {
        let (mut engine, _) = engine_on("2024-03-10");
        let date = d("2024-03-10");
        let main_id = engine.create_or_get_daily_page(date).main_three[0].id.clone();
        assert_eq!(engine.toggle_task(date, &main_id, SlotKind::Secondary), None);
        assert_eq!(engine.toggle_task(d("2024-03-09"), &main_id, SlotKind::Main), None);
    }

    #[test]
    fn text_edits_are_debounced() {
        let (mut engine, store) = engine_on("2024-03-10");
        let date = d("2024-03-10");
        engine.create_or_get_daily_page(date);
        assert!(engine.update_financial_affirmation(date, "I save first"));
        assert!(engine.update_gratitude(date, 2, "coffee").unwrap());
        assert!(engine.has_pending_writes());
        assert!(!store.get(DAILY_PAGES_KEY).unwrap().unwrap().contains("coffee"));

        engine.flush();
        assert!(store.get(DAILY_PAGES_KEY).unwrap().unwrap().contains("coffee"));
    }

    #[test]
    fn gratitude_index_is_validated() {
        let (mut engine, _) = engine_on("2024-03-10");
        let date = d("2024-03-10");
        engine.create_or_get_daily_page(date);
        assert!(engine.update_gratitude(date, 3, "x").is_err());
        assert_eq!(engine.update_gratitude(d("2024-03-01"), 0, "x"), Ok(false));
    }

    #[test]
    fn affirmation_confirmation_toggles() {
        let (mut engine, _) = engine_on("2024-03-10");
        let date = d("2024-03-10");
        engine.create_or_get_daily_page(date);
        assert_eq!(engine.confirm_financial_affirmation(date), Some(true));
        assert_eq!(engine.confirm_financial_affirmation(date), Some(false));
    }

    #[test]
    fn skipped_pages_stay_skipped_when_tasks_are_checked() {
        let (mut engine, _) = engine_on("2024-03-10");
        let date = d("2024-03-08");
        let ids: Vec<String> = engine
            .mark_date_as_skipped(date)
            .main_three
            .iter()
            .map(|t| t.id.clone())
            .collect();
        for id in &ids {
            engine.toggle_task(date, id, SlotKind::Main);
        }
        assert_eq!(engine.get_daily_page(date).unwrap().status, PageStatus::Skipped);
    }

    #[test]
    fn transfer_copies_into_matching_empty_slots() {
        let (mut engine, _) = engine_on("2024-03-11");
        let from = d("2024-03-10");
        let to = d("2024-03-11");
        let (main_id, sec_id) = {
            let page = engine.create_or_get_daily_page(from);
            (page.main_three[0].id.clone(), page.secondary_nine[0].id.clone())
        };
        engine.update_task_content(from, &main_id, "ship release", SlotKind::Main);
        engine.update_task_content(from, &sec_id, "inbox zero", SlotKind::Secondary);

        let outcome = engine.transfer_tasks(from, to, &[main_id.clone(), sec_id.clone()]);
        assert_eq!(outcome.transferred.len(), 2);
        assert!(outcome.dropped.is_empty());

        let dest = engine.get_daily_page(to).unwrap();
        assert_eq!(dest.main_three[0].content, "ship release");
        assert_ne!(dest.main_three[0].id, main_id);
        assert!(!dest.main_three[0].completed);
        assert_eq!(dest.secondary_nine[0].content, "inbox zero");

        let source = engine.get_daily_page(from).unwrap();
        assert_eq!(source.main_three[0].content, "ship release");
        assert_eq!(source.main_three[0].id, main_id);
    }

    #[test]
    fn transfer_overflow_is_dropped_not_cross_filled() {
        let (mut engine, _) = engine_on("2024-03-11");
        let from = d("2024-03-10");
        let to = d("2024-03-11");
        let source_ids: Vec<String> = engine
            .create_or_get_daily_page(from)
            .main_three
            .iter()
            .map(|t| t.id.clone())
            .collect();
        for (i, id) in source_ids.iter().enumerate() {
            engine.update_task_content(from, id, &format!("task {i}"), SlotKind::Main);
        }
        let dest_ids: Vec<String> = engine
            .create_or_get_daily_page(to)
            .main_three
            .iter()
            .map(|t| t.id.clone())
            .collect();
        engine.update_task_content(to, &dest_ids[0], "already planned", SlotKind::Main);
        assert_eq!(engine.empty_slot_count(to, SlotKind::Main), 2);

        let mut selection = source_ids.clone();
        selection.push("ghost".into());
        let outcome = engine.transfer_tasks(from, to, &selection);
        assert_eq!(outcome.transferred.len(), 2);
        assert_eq!(
            outcome
                .dropped
                .iter()
                .map(|t| t.reason)
                .collect::<Vec<_>>(),
            vec![DropReason::NotFound, DropReason::NoCapacity]
        );
        let dest = engine.get_daily_page(to).unwrap();
        assert_eq!(dest.empty_slot_count(SlotKind::Main), 0);
        assert_eq!(dest.empty_slot_count(SlotKind::Secondary), SECONDARY_SLOTS);
    }

    #[test]
    fn incomplete_tasks_skip_done_and_empty() {
        let (mut engine, _) = engine_on("2024-03-10");
        let date = d("2024-03-10");
        let ids: Vec<String> = engine
            .create_or_get_daily_page(date)
            .main_three
            .iter()
            .map(|t| t.id.clone())
            .collect();
        engine.update_task_content(date, &ids[0], "done one", SlotKind::Main);
        engine.update_task_content(date, &ids[1], "open one", SlotKind::Main);
        engine.toggle_task(date, &ids[0], SlotKind::Main);

        let candidates = engine.incomplete_tasks(date);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].task.content, "open one");
        assert_eq!(candidates[0].kind, SlotKind::Main);
    }

    #[test]
    fn corrupt_blob_starts_empty() {
        let store = MemoryStore::new();
        store.set(DAILY_PAGES_KEY, "{{ not json").unwrap();
        let engine = JournalEngine::open(Box::new(store), Box::new(FixedClock::on(d("2024-03-10"))));
        assert!(engine.pages().is_empty());
    }

    #[test]
    fn quota_failure_becomes_warning_and_state_survives() {
        let store = MemoryStore::with_quota(10);
        let mut engine =
            JournalEngine::open(Box::new(store.clone()), Box::new(FixedClock::on(d("2024-03-10"))));
        engine.create_or_get_daily_page(d("2024-03-10"));

        assert!(engine.get_daily_page(d("2024-03-10")).is_some());
        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            JournalEvent::StorageWarning(w) if w.quota_exceeded
        )));
        assert!(store.get(DAILY_PAGES_KEY).unwrap().is_none());
    }
}
