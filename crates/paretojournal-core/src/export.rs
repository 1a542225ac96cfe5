//! Full data export and import.
//!
//! An export is a JSON document
//! `{"version", "exportedAt", "data": {"dailyPages": <raw blob>, ...}}`.
//! Each data field carries the stored string verbatim. Import writes each
//! present field back to its key unchanged; the engine must be reloaded
//! afterwards since it does not hot-swap its in-memory state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::storage::{
    KeyValueStore, DAILY_PAGES_KEY, GOALS_KEY, HABITS_KEY, PLANS_KEY, SETTINGS_KEY,
    USER_PROFILE_KEY, WEEKLY_REVIEWS_KEY,
};

/// Current export format version.
pub const EXPORT_VERSION: &str = "1.0";

/// Raw blobs by storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_pages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    #[serde(default, rename = "plans90Day", skip_serializing_if = "Option::is_none")]
    pub plans_90day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_reviews: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habits: Option<String>,
}

impl ExportData {
    fn fields(&self) -> [(&'static str, &Option<String>); 7] {
        [
            (DAILY_PAGES_KEY, &self.daily_pages),
            (GOALS_KEY, &self.goals),
            (PLANS_KEY, &self.plans_90day),
            (WEEKLY_REVIEWS_KEY, &self.weekly_reviews),
            (USER_PROFILE_KEY, &self.user_profile),
            (SETTINGS_KEY, &self.settings),
            (HABITS_KEY, &self.habits),
        ]
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            DAILY_PAGES_KEY => Some(&mut self.daily_pages),
            GOALS_KEY => Some(&mut self.goals),
            PLANS_KEY => Some(&mut self.plans_90day),
            WEEKLY_REVIEWS_KEY => Some(&mut self.weekly_reviews),
            USER_PROFILE_KEY => Some(&mut self.user_profile),
            SETTINGS_KEY => Some(&mut self.settings),
            HABITS_KEY => Some(&mut self.habits),
            _ => None,
        }
    }
}

/// A complete export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub data: ExportData,
}

impl ExportDocument {
    /// Serialize to pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse an export document.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}

/// Snapshot every known key from `store`.
///
/// # Errors
/// Returns an error if any key cannot be read.
pub fn export_all(store: &dyn KeyValueStore, exported_at: DateTime<Utc>) -> Result<ExportDocument> {
    let mut data = ExportData::default();
    for key in crate::storage::ALL_KEYS {
        let value = store.get(key)?;
        if let Some(slot) = data.slot_mut(key) {
            *slot = value;
        }
    }
    Ok(ExportDocument {
        version: EXPORT_VERSION.to_string(),
        exported_at,
        data,
    })
}

/// Write every present blob of `doc` back to `store` verbatim.
///
/// Keys absent from the document are left untouched. Returns the number of
/// keys written.
///
/// # Errors
/// Returns an error if the document's major version differs from
/// [`EXPORT_VERSION`] or a write fails.
pub fn import_all(store: &dyn KeyValueStore, doc: &ExportDocument) -> Result<usize> {
    if major(&doc.version) != major(EXPORT_VERSION) {
        return Err(ValidationError::UnsupportedVersion {
            found: doc.version.clone(),
            supported: EXPORT_VERSION.to_string(),
        }
        .into());
    }

    let mut written = 0;
    for (key, value) in doc.data.fields() {
        if let Some(raw) = value {
            store.set(key, raw)?;
            written += 1;
        }
    }
    tracing::info!(keys = written, "imported export document");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::MemoryStore;

    #[test]
    fn export_copies_blobs_verbatim() {
        let store = MemoryStore::new();
        store.set(DAILY_PAGES_KEY, r#"{"version":1,"pages":{}}"#).unwrap();
        store.set(PLANS_KEY, "[]").unwrap();

        let doc = export_all(&store, Utc::now()).unwrap();
        assert_eq!(doc.version, EXPORT_VERSION);
        assert_eq!(doc.data.daily_pages.as_deref(), Some(r#"{"version":1,"pages":{}}"#));
        assert_eq!(doc.data.plans_90day.as_deref(), Some("[]"));
        assert!(doc.data.goals.is_none());

        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["exportedAt"].is_string());
        assert_eq!(json["data"]["plans90Day"], "[]");
        assert!(json["data"].get("goals").is_none());
    }

    #[test]
    fn import_writes_present_keys_only() {
        let source = MemoryStore::new();
        source.set(DAILY_PAGES_KEY, "{}").unwrap();
        source.set(HABITS_KEY, "[1]").unwrap();
        let doc = ExportDocument::from_json(&export_all(&source, Utc::now()).unwrap().to_json().unwrap())
            .unwrap();

        let target = MemoryStore::new();
        target.set(GOALS_KEY, "keep me").unwrap();
        assert_eq!(import_all(&target, &doc).unwrap(), 2);
        assert_eq!(target.get(DAILY_PAGES_KEY).unwrap().as_deref(), Some("{}"));
        assert_eq!(target.get(HABITS_KEY).unwrap().as_deref(), Some("[1]"));
        assert_eq!(target.get(GOALS_KEY).unwrap().as_deref(), Some("keep me"));
    }

    #[test]
    fn import_rejects_other_major_version() {
        let doc = ExportDocument {
            version: "2.0".into(),
            exported_at: Utc::now(),
            data: ExportData::default(),
        };
        assert!(matches!(
            import_all(&MemoryStore::new(), &doc),
            Err(CoreError::Validation(ValidationError::UnsupportedVersion { .. }))
        ));
    }
}
