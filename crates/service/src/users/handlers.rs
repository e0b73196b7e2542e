use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::errors::ServiceError;
use crate::ids::IdGenerator;
use crate::storage::{id_from_key, object_key, BlobError, BlobStore};

use super::codec::UserRecord;

/// Path parameter carrying the record identifier.
pub const ID_PARAM: &str = "id";

/// Normalized request handed over by the HTTP layer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerRequest {
    pub path_parameters: Option<HashMap<String, String>>,
    pub body: Option<String>,
}

impl HandlerRequest {
    pub fn new() -> Self { Self::default() }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.path_parameters
            .get_or_insert_with(HashMap::new)
            .insert(ID_PARAM.to_string(), id.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn ok(body: String) -> Self { Self { status_code: 200, body } }

    pub fn created(body: String) -> Self { Self { status_code: 201, body } }

    /// `{"error": <message>}` with the given status.
    pub fn error(status_code: u16, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self { status_code, body }
    }
}

impl From<ServiceError> for HandlerResponse {
    fn from(err: ServiceError) -> Self {
        let status = err.status_code();
        let message = err.public_message();
        if status >= 500 {
            error!(status, error = %message, "user handler failed");
        } else {
            warn!(status, error = %message, "user request rejected");
        }
        HandlerResponse::error(status, &message)
    }
}

/// Return the `id` path parameter, rejecting absent or empty values.
pub fn extract_id(req: &HandlerRequest) -> Result<&str, ServiceError> {
    req.path_parameters
        .as_ref()
        .and_then(|params| params.get(ID_PARAM))
        .map(String::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(ServiceError::missing_id)
}

/// Confirm a record exists and return its object key.
pub async fn ensure_exists(store: &dyn BlobStore, id: &str) -> Result<String, ServiceError> {
    let key = object_key(id);
    if store.exists(&key).await? {
        Ok(key)
    } else {
        Err(ServiceError::user_not_found())
    }
}

/// A record's `id` must name the object it is written to.
fn ensure_key_matches(record: &UserRecord, key: &str) -> Result<(), ServiceError> {
    match (record.id(), id_from_key(key)) {
        (Some(id), Some(key_id)) if id == key_id => Ok(()),
        (id, _) => Err(ServiceError::Unexpected(format!("record id {id:?} does not match object key {key}"))),
    }
}

/// The create/fetch/update entry points over an injected blob store.
#[derive(Clone)]
pub struct UserHandlers {
    store: Arc<dyn BlobStore>,
    ids: Arc<dyn IdGenerator>,
}

impl UserHandlers {
    pub fn new(store: Arc<dyn BlobStore>, ids: Arc<dyn IdGenerator>) -> Self { Self { store, ids } }

    pub async fn create(&self, req: HandlerRequest) -> HandlerResponse {
        self.try_create(&req).await.unwrap_or_else(HandlerResponse::from)
    }

    pub async fn fetch(&self, req: HandlerRequest) -> HandlerResponse {
        self.try_fetch(&req).await.unwrap_or_else(HandlerResponse::from)
    }

    pub async fn update(&self, req: HandlerRequest) -> HandlerResponse {
        self.try_update(&req).await.unwrap_or_else(HandlerResponse::from)
    }

    async fn try_create(&self, req: &HandlerRequest) -> Result<HandlerResponse, ServiceError> {
        let id = self.ids.next_id();
        let record = UserRecord::from_body(req.body.as_deref())?.with_id(&id);
        let key = object_key(&id);
        ensure_key_matches(&record, &key)?;
        self.store.put(&key, record.to_bytes()?).await?;
        info!(user_id = %id, "user created");
        Ok(HandlerResponse::created(record.to_json_string()?))
    }

    async fn try_fetch(&self, req: &HandlerRequest) -> Result<HandlerResponse, ServiceError> {
        let id = extract_id(req)?;
        let key = ensure_exists(self.store.as_ref(), id).await?;
        // a NotFound here means the object vanished after the existence check
        let bytes = self.store.get(&key).await.map_err(|e| match e {
            BlobError::NotFound(k) => ServiceError::Unexpected(format!("object {k} disappeared during read")),
            other => other.into(),
        })?;
        let body = String::from_utf8(bytes)
            .map_err(|_| ServiceError::Unexpected(format!("object {key} is not valid UTF-8")))?;
        debug!(user_id = %id, "user fetched");
        Ok(HandlerResponse::ok(body))
    }

    async fn try_update(&self, req: &HandlerRequest) -> Result<HandlerResponse, ServiceError> {
        let id = extract_id(req)?;
        let key = ensure_exists(self.store.as_ref(), id).await?;
        let record = UserRecord::from_body(req.body.as_deref())?.with_id(id);
        ensure_key_matches(&record, &key)?;
        self.store.put(&key, record.to_bytes()?).await?;
        info!(user_id = %id, "user replaced");
        Ok(HandlerResponse::ok(record.to_json_string()?))
    }
}
