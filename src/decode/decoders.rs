//! JSON envelope decoder

use super::types::RecordDecoder;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use jsonpath_rust::JsonPath;
use serde_json::Value;

/// Where list endpoints keep their records
pub const DEFAULT_RECORDS_PATH: &str = "$.data[*]";

/// JSON decoder extracting records with a JSONPath expression
#[derive(Debug, Clone)]
pub struct JsonDecoder {
    /// JSONPath to extract records
    record_path: String,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::with_path(DEFAULT_RECORDS_PATH)
    }
}

impl JsonDecoder {
    /// Create a decoder reading `$.data[*]`
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON decoder with a record path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            record_path: path.into(),
        }
    }

    /// The configured record path
    pub fn record_path(&self) -> &str {
        &self.record_path
    }
}

impl RecordDecoder for JsonDecoder {
    fn decode_raw(&self, body: &str) -> Result<Value> {
        serde_json::from_str(body).map_err(|e| Error::Decode {
            message: format!("Failed to parse JSON: {e}"),
        })
    }

    fn extract(&self, envelope: &Value) -> Result<Vec<JsonObject>> {
        extract_with_jsonpath(envelope, &self.record_path)?
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(Error::RecordExtraction {
                    path: self.record_path.clone(),
                    message: format!("item {index} is not an object: {other}"),
                }),
            })
            .collect()
    }
}

/// Evaluate a JSONPath; no match means no records
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
