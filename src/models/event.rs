// scoutshare-service/src/models/event.rs
use crate::models::{Role, ServiceError};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const EVENTS_COLLECTION: &str = "events";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub name: String,
    pub role: Role,
}

// A scouting competition owned by one user. Ownership is implicit and never
// appears in `collaborators`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub owner_id: String,
    pub owner_name: String,
    pub is_active: bool,
    // Insertion ordered, keyed by user id
    pub collaborators: IndexMap<String, Collaborator>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User ids are compared with surrounding whitespace removed.
pub fn user_key(user_id: &str) -> &str {
    user_id.trim()
}

impl Event {
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_id == user_key(user_id)
    }

    pub fn collaborator(&self, user_id: &str) -> Option<&Collaborator> {
        self.collaborators.get(user_key(user_id))
    }

    pub fn shared_with(&self) -> Vec<&str> {
        self.collaborators.keys().map(String::as_str).collect()
    }

    /// Converts the stored field shape into an event, rejecting documents
    /// that break the collaborator invariants.
    pub fn from_document(id: &str, doc: EventDocument) -> Result<Event, ServiceError> {
        let malformed = |reason: String| {
            ServiceError::Store(format!("Malformed event document {}: {}", id, reason))
        };

        if doc.shared_with.len() != doc.shared_with_names.len() {
            return Err(malformed(format!(
                "sharedWith has {} entries but sharedWithNames has {}",
                doc.shared_with.len(),
                doc.shared_with_names.len()
            )));
        }

        let shared: HashSet<&String> = doc.shared_with.iter().collect();
        if let Some(stray) = doc.roles.keys().find(|key| !shared.contains(key)) {
            return Err(malformed(format!("role assigned to non-collaborator {}", stray)));
        }

        let mut collaborators = IndexMap::with_capacity(doc.shared_with.len());
        for (user_id, name) in doc.shared_with.iter().zip(doc.shared_with_names.iter()) {
            if *user_id == doc.owner_id {
                return Err(malformed("owner listed as collaborator".to_string()));
            }
            let role = doc.roles.get(user_id).copied().unwrap_or_default();
            let entry = Collaborator {
                name: name.clone(),
                role,
            };
            if collaborators.insert(user_id.clone(), entry).is_some() {
                return Err(malformed(format!("duplicate collaborator {}", user_id)));
            }
        }

        Ok(Event {
            id: id.to_string(),
            name: doc.name,
            location: doc.location,
            start_date: doc.start_date,
            end_date: doc.end_date,
            owner_id: doc.owner_id,
            owner_name: doc.owner_name,
            is_active: doc.is_active,
            collaborators,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }

    pub fn to_document(&self) -> EventDocument {
        EventDocument {
            name: self.name.clone(),
            location: self.location.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            owner_id: self.owner_id.clone(),
            owner_name: self.owner_name.clone(),
            is_active: self.is_active,
            shared_with: self.collaborators.keys().cloned().collect(),
            shared_with_names: self.collaborators.values().map(|c| c.name.clone()).collect(),
            roles: self
                .collaborators
                .iter()
                .map(|(user_id, c)| (user_id.clone(), c.role))
                .collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// Field shape of an event in the document store
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDocument {
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub owner_id: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub shared_with: Vec<String>,
    #[serde(default)]
    pub shared_with_names: Vec<String>,
    #[serde(default)]
    pub roles: BTreeMap<String, Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}
