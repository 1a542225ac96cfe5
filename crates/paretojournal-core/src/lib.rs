//! # Pareto Journal Core Library
//!
//! This library provides the daily-page lifecycle behind the Pareto journal:
//! one page per calendar date, three main tasks that decide whether the day
//! is complete, nine secondary tasks that never do, and a gate that keeps
//! the user from jumping ahead while earlier days are unresolved.
//! The CLI binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Engine**: [`JournalEngine`] owns every page in memory and is the only
//!   writer. Like a timer state machine it is caller-driven: invoke
//!   [`JournalEngine::tick`] periodically so debounced writes are flushed
//! - **Access policy**: pure functions deciding which dates may be opened
//! - **Review gate**: weekly reviews unlock after seven completed days
//! - **Storage**: a key/value store (SQLite or in-memory) holding one JSON
//!   blob per key, plus TOML configuration
//!
//! ## Key Components
//!
//! - [`JournalEngine`]: Page lifecycle and task transfer
//! - [`CalendarDate`]: Canonical `YYYY-MM-DD` date key
//! - [`KeyValueStore`]: Persistence seam
//! - [`Config`]: Application configuration management

pub mod access;
pub mod date;
pub mod engine;
pub mod error;
pub mod events;
pub mod export;
pub mod page;
pub mod plans;
pub mod review;
pub mod storage;

pub use access::{can_access_date, AccessDecision, AccessReason};
pub use date::{CalendarDate, Clock, FixedClock, SystemClock};
pub use engine::{
    DropReason, DroppedTask, JournalEngine, TransferCandidate, TransferOutcome, TransferredTask,
};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::JournalEvent;
pub use export::{ExportData, ExportDocument, EXPORT_VERSION};
pub use page::{DailyPage, PageStatus, SlotKind, Task};
pub use plans::{PlanSource, StoredPlans};
pub use review::{can_create_review, ReviewEligibility, ReviewWindow};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore, StorageWarning};
