//! Decoder traits

use crate::error::Result;
use crate::types::JsonObject;
use serde_json::Value;

/// Trait for decoding response bodies into records
pub trait RecordDecoder: Send + Sync {
    /// Parse the response body into a single JSON value (full envelope)
    fn decode_raw(&self, body: &str) -> Result<Value>;

    /// Pull the records out of an already parsed envelope
    fn extract(&self, envelope: &Value) -> Result<Vec<JsonObject>>;

    /// Parse the body and extract its records
    fn decode(&self, body: &str) -> Result<Vec<JsonObject>> {
        let envelope = self.decode_raw(body)?;
        self.extract(&envelope)
    }
}
