// models/src/medical/history.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of change recorded in an appointment's modification history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Creation,
    Confirmation,
    /// A new date or time was set.
    Report,
    /// The assigned doctor changed.
    Attribution,
    Cancellation,
    Completion,
    StatusChange,
    Migration,
    Cleanup,
}

/// One immutable audit record. Entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub action: HistoryAction,
    /// Id of the patient, staff member or process that made the change.
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl HistoryEntry {
    pub fn new(action: HistoryAction, actor: impl Into<String>) -> Self {
        HistoryEntry {
            timestamp: Utc::now(),
            action,
            actor: actor.into(),
            old_value: None,
            new_value: None,
            reason: None,
        }
    }

    pub fn with_values(mut self, old_value: Option<Value>, new_value: Option<Value>) -> Self {
        self.old_value = old_value;
        self.new_value = new_value;
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_serialize_action_in_snake_case() {
        let entry = HistoryEntry::new(HistoryAction::StatusChange, "S1")
            .with_values(Some(json!("pending")), Some(json!("cancelled")))
            .with_reason(Some("patient called".to_string()));
        let encoded = serde_json::to_value(&entry).unwrap();
        assert_eq!(encoded["action"], "status_change");
        assert_eq!(encoded["old_value"], "pending");
        assert_eq!(encoded["reason"], "patient called");
    }

    #[test]
    fn should_omit_absent_values() {
        let entry = HistoryEntry::new(HistoryAction::Creation, "P1");
        let encoded = serde_json::to_value(&entry).unwrap();
        assert!(encoded.get("old_value").is_none());
        assert!(encoded.get("reason").is_none());
    }
}
