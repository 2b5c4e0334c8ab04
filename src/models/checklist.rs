// scoutshare-service/src/models/checklist.rs
use crate::models::ChecklistScope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CHECKLISTS_COLLECTION: &str = "checklists";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub id: String,
    pub event_id: String,
    pub role: ChecklistScope,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
    // Bumped on every successful save
    #[serde(default)]
    pub revision: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_at: Option<DateTime<Utc>>,
}

impl Checklist {
    pub fn id_for(event_id: &str, scope: ChecklistScope) -> String {
        format!("{}_{}", event_id, scope.as_str())
    }

    pub fn empty(event_id: &str, scope: ChecklistScope) -> Self {
        Self {
            id: Checklist::id_for(event_id, scope),
            event_id: event_id.to_string(),
            role: scope,
            items: Vec::new(),
            revision: 0,
            last_edited_by: None,
            last_edited_by_name: None,
            last_edited_at: None,
        }
    }
}

// Full-list save from a remote client
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SaveChecklistRequest {
    pub items: Vec<ChecklistItem>,
    pub base_revision: u64,
}
