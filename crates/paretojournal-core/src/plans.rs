//! Month focus suggestions from the active 90-day plan.
//!
//! Plans are owned elsewhere; this module only reads project titles to offer
//! as quick picks when setting the month focus. Suggestions never constrain
//! what the user may enter.

use serde_json::Value;

use crate::storage::{KeyValueStore, PLANS_KEY};

/// Read-only view of the 90-day plans.
pub trait PlanSource {
    /// Project titles of the active plan, in plan order.
    fn active_project_titles(&self) -> Vec<String>;
}

/// A fixed list of titles.
impl PlanSource for Vec<String> {
    fn active_project_titles(&self) -> Vec<String> {
        self.clone()
    }
}

/// Plans read from the `plans_90day` blob.
///
/// Accepts either a list of plans or `{"plans": [...]}`. A plan is active
/// when `isActive` is true or `status` is `"active"`; when none is marked,
/// the last plan in the list is used. Projects may be strings or objects
/// with a `title` (or `name`). Unreadable blobs yield no suggestions.
pub struct StoredPlans<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> StoredPlans<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }
}

fn is_active(plan: &Value) -> bool {
    plan.get("isActive").and_then(Value::as_bool).unwrap_or(false)
        || plan.get("status").and_then(Value::as_str) == Some("active")
}

fn project_title(project: &Value) -> Option<String> {
    let title = match project {
        Value::String(s) => s.as_str(),
        Value::Object(_) => project
            .get("title")
            .or_else(|| project.get("name"))
            .and_then(Value::as_str)?,
        _ => return None,
    };
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// Extract suggestions from a raw plans blob.
pub fn titles_from_blob(raw: &str) -> Vec<String> {
    let Ok(root) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };
    let plans = match &root {
        Value::Array(list) => list.as_slice(),
        Value::Object(_) => match root.get("plans") {
            Some(Value::Array(list)) => list.as_slice(),
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    let Some(active) = plans.iter().find(|p| is_active(p)).or_else(|| plans.last()) else {
        return Vec::new();
    };

    active
        .get("projects")
        .and_then(Value::as_array)
        .map(|projects| projects.iter().filter_map(project_title).collect())
        .unwrap_or_default()
}

impl PlanSource for StoredPlans<'_> {
    fn active_project_titles(&self) -> Vec<String> {
        match self.store.get(PLANS_KEY) {
            Ok(Some(raw)) => titles_from_blob(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read plans for suggestions");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn active_plan_titles_are_used() {
        let raw = r#"[
            {"id":"p1","isActive":false,"projects":[{"title":"Old"}]},
            {"id":"p2","isActive":true,"projects":[{"title":"Launch"},{"title":"  "},{"name":"Hire"}]}
        ]"#;
        assert_eq!(titles_from_blob(raw), vec!["Launch", "Hire"]);
    }

    #[test]
    fn falls_back_to_last_plan_and_string_projects() {
        let raw = r#"{"plans":[{"projects":["A"]},{"projects":["B","C"]}]}"#;
        assert_eq!(titles_from_blob(raw), vec!["B", "C"]);
    }

    #[test]
    fn unreadable_blob_yields_nothing() {
        assert!(titles_from_blob("{oops").is_empty());
        assert!(titles_from_blob("42").is_empty());
        assert!(titles_from_blob("[]").is_empty());
    }

    #[test]
    fn stored_plans_reads_from_store() {
        let store = MemoryStore::new();
        let plans = StoredPlans::new(&store);
        assert!(plans.active_project_titles().is_empty());
        store
            .set(PLANS_KEY, r#"[{"status":"active","projects":["Book"]}]"#)
            .unwrap();
        assert_eq!(plans.active_project_titles(), vec!["Book"]);
    }
}
