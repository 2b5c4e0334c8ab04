// scoutshare-service/src/services/permissions.rs
//! Capability checks derived from the caller's role on an event. Everything
//! here is a pure function of the event snapshot and the user id.

use crate::models::{ChecklistScope, Event, Role};
use crate::services::access_service::get_user_role;
use serde::{Deserialize, Serialize};

pub fn can_view(event: &Event, user_id: &str) -> bool {
    get_user_role(event, user_id).is_some()
}

/// Any role except viewer may write scouting data.
pub fn can_edit_data(event: &Event, user_id: &str) -> bool {
    get_user_role(event, user_id).map_or(false, |role| role.level() >= 1)
}

pub fn can_manage_sharing(event: &Event, user_id: &str) -> bool {
    get_user_role(event, user_id) == Some(Role::Admin)
}

pub fn can_edit_details(event: &Event, user_id: &str) -> bool {
    event.is_owner(user_id)
}

pub fn can_delete_event(event: &Event, user_id: &str) -> bool {
    event.is_owner(user_id)
}

pub fn visible_checklist_scopes(event: &Event, user_id: &str) -> Vec<ChecklistScope> {
    match get_user_role(event, user_id) {
        Some(Role::Admin) => ChecklistScope::all().to_vec(),
        Some(role) => role.checklist_scope().into_iter().collect(),
        None => Vec::new(),
    }
}

pub fn can_edit_checklist(event: &Event, user_id: &str, scope: ChecklistScope) -> bool {
    visible_checklist_scopes(event, user_id).contains(&scope)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub role: Option<Role>,
    pub is_owner: bool,
    pub can_view: bool,
    pub can_edit_data: bool,
    pub can_manage_sharing: bool,
    pub can_edit_details: bool,
    pub checklists: Vec<ChecklistScope>,
}

pub fn capabilities(event: &Event, user_id: &str) -> Capabilities {
    Capabilities {
        role: get_user_role(event, user_id),
        is_owner: event.is_owner(user_id),
        can_view: can_view(event, user_id),
        can_edit_data: can_edit_data(event, user_id),
        can_manage_sharing: can_manage_sharing(event, user_id),
        can_edit_details: can_edit_details(event, user_id),
        checklists: visible_checklist_scopes(event, user_id),
    }
}
