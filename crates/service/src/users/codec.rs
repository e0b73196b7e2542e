use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// Reserved key holding the record identifier.
pub const ID_FIELD: &str = "id";

/// A user record: any JSON object, plus the reserved `id` key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(Map<String, Value>);

impl UserRecord {
    /// Parse a request body. A missing or blank body is an empty record.
    pub fn from_body(body: Option<&str>) -> Result<Self, ServiceError> {
        let text = match body {
            Some(b) if !b.trim().is_empty() => b,
            _ => return Ok(Self::default()),
        };
        let value: Value = serde_json::from_str(text)
            .map_err(|_| ServiceError::BadRequest("Invalid JSON body".into()))?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ServiceError::BadRequest("Request body must be a JSON object".into())),
        }
    }

    /// Set `id`, replacing whatever the caller supplied.
    pub fn with_id(mut self, id: &str) -> Self {
        self.0.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        self
    }

    pub fn id(&self) -> Option<&str> { self.0.get(ID_FIELD).and_then(Value::as_str) }

    pub fn to_json_string(&self) -> Result<String, ServiceError> { Ok(serde_json::to_string(&self.0)?) }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ServiceError> { Ok(serde_json::to_vec(&self.0)?) }
}
