// scoutshare-service/src/utils/mod.rs
use crate::models::{Identity, ServiceError};
use actix_web::HttpRequest;

pub mod blob_store;
pub mod document_store;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_NAME_HEADER: &str = "X-User-Name";

// Identity is resolved upstream; we only read what the auth layer forwarded
pub fn get_identity_from_request(req: &HttpRequest) -> Result<Identity, ServiceError> {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    let user_id = header(USER_ID_HEADER).ok_or(ServiceError::Unauthorized)?;
    let user_name = header(USER_NAME_HEADER).unwrap_or_else(|| user_id.clone());

    Ok(Identity { user_id, user_name })
}

// Typed conversion at the edge of the document store
pub mod documents {
    use super::document_store::{Document, StoredDocument};
    use crate::models::ServiceError;
    use log::error;
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use serde_json::Value;

    pub fn to_document<T: Serialize>(value: &T) -> Result<Document, ServiceError> {
        match serde_json::to_value(value) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(other) => Err(ServiceError::Store(format!(
                "Expected an object document, got {}",
                other
            ))),
            Err(e) => {
                error!("Failed to serialize document: {:?}", e);
                Err(ServiceError::Store(format!("Failed to serialize document: {}", e)))
            }
        }
    }

    /// Deserializes a stored document, filling `id` from the store key.
    pub fn from_document<T: DeserializeOwned>(doc: StoredDocument) -> Result<T, ServiceError> {
        let StoredDocument { id, mut fields } = doc;
        fields
            .entry("id")
            .or_insert_with(|| Value::String(id.clone()));
        serde_json::from_value(Value::Object(fields)).map_err(|e| {
            error!("Malformed document {}: {:?}", id, e);
            ServiceError::Store(format!("Malformed document {}: {}", id, e))
        })
    }
}
