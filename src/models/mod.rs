// scoutshare-service/src/models/mod.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub mod role;
pub use role::*;

pub mod event;
pub use event::*;

pub mod checklist;
pub use checklist::*;

pub mod scouting;
pub use scouting::*;

// Identity resolved by the upstream auth collaborator
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    pub user_name: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }
}

// Event request bodies
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ShareEventRequest {
    pub user_id: String,
    pub user_name: String,
    pub role: Option<Role>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

// Custom error types
#[derive(Debug, Display, Clone, PartialEq)]
pub enum ServiceError {
    #[display(fmt = "Validation error: {}", _0)]
    Validation(String),
    #[display(fmt = "Not found: {}", _0)]
    NotFound(String),
    #[display(fmt = "Store error: {}", _0)]
    Store(String),
    #[display(fmt = "Conflict: {}", _0)]
    Conflict(String),
    #[display(fmt = "Unauthorized")]
    Unauthorized,
    #[display(fmt = "Forbidden")]
    Forbidden,
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Store(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ServiceError::Forbidden => {
                "Forbidden: You don't have permission to access this resource".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
