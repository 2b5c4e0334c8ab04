// Shared fixtures for the test modules below
use crate::models::{Event, EventData, Identity};
use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;

mod checklist_tests;
mod route_tests;
mod store_tests;

pub(crate) fn identity(user_id: &str) -> Identity {
    Identity::new(user_id, format!("{} name", user_id))
}

pub(crate) fn event_data(name: &str) -> EventData {
    EventData {
        name: name.to_string(),
        location: "Houston".to_string(),
        start_date: date(2025, 4, 16),
        end_date: date(2025, 4, 19),
    }
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(crate) fn sample_event(owner_id: &str) -> Event {
    let now = Utc::now();
    Event {
        id: "E1".to_string(),
        name: "World Championship".to_string(),
        location: "Houston".to_string(),
        start_date: date(2025, 4, 16),
        end_date: date(2025, 4, 19),
        owner_id: owner_id.to_string(),
        owner_name: format!("{} name", owner_id),
        is_active: true,
        collaborators: IndexMap::new(),
        created_at: now,
        updated_at: now,
    }
}
