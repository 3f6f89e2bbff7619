//! OpenAPI document source
//!
//! Loads the API description once and resolves schema keys against it.

use super::types::SchemaKey;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::streams::BACKUPS_SPEC_PATH;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Replaces the declared type of one property after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct TypeOverride {
    /// Spec path whose schema is patched
    pub path: String,
    /// Top-level property to patch
    pub property: String,
    /// Replacement `type` value
    pub json_type: Value,
}

impl TypeOverride {
    /// Create an override
    pub fn new(path: impl Into<String>, property: impl Into<String>, json_type: Value) -> Self {
        Self {
            path: path.into(),
            property: property.into(),
            json_type,
        }
    }

    /// Corrections for properties the document declares wrongly
    pub fn known() -> Vec<Self> {
        vec![Self::new(
            BACKUPS_SPEC_PATH,
            "deleted_at",
            json!(["string", "null"]),
        )]
    }
}

/// The parsed OpenAPI document plus a per-key memo of resolved schemas
#[derive(Debug)]
pub struct OpenApiSource {
    document: Value,
    overrides: Vec<TypeOverride>,
    memo: RwLock<HashMap<SchemaKey, Value>>,
}

impl OpenApiSource {
    /// Wrap an already parsed document
    pub fn from_document(document: Value) -> Self {
        Self {
            document,
            overrides: TypeOverride::known(),
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// Read the document from disk; `.yaml`/`.yml` files are read as YAML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let document: Value = if is_yaml {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        info!(path = %path.display(), "Loaded OpenAPI document");
        Ok(Self::from_document(document))
    }

    /// Download the document with one GET request
    pub async fn fetch(url: &str, client: &HttpClient) -> Result<Self> {
        let document: Value = client.get_json(url).await?;
        info!(url, "Fetched OpenAPI document");
        Ok(Self::from_document(document))
    }

    /// Replace the property type overrides
    #[must_use]
    pub fn with_overrides(mut self, overrides: Vec<TypeOverride>) -> Self {
        self.overrides = overrides;
        self
    }

    /// The raw document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Number of keys resolved so far
    pub fn cached_len(&self) -> usize {
        self.memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The response schema for a key exactly as written, references intact
    pub fn unresolved(&self, key: &SchemaKey) -> Result<&Value> {
        let status = key.expected_status.to_string();
        navigate(
            &self.document,
            &[
                "paths",
                key.path.as_str(),
                key.method.as_str(),
                "responses",
                status.as_str(),
                "schema",
            ],
        )
    }

    /// Resolve a key to the schema of one list item
    ///
    /// The response envelope's `properties.data.items` is returned with every
    /// local reference inlined. Results are memoized per key.
    pub fn resolve(&self, key: &SchemaKey) -> Result<Value> {
        if let Some(schema) = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Ok(schema.clone());
        }

        let schema = self.resolve_uncached(key)?;
        debug!(key = %key, "Resolved schema");

        let mut memo = self.memo.write().unwrap_or_else(PoisonError::into_inner);
        Ok(memo.entry(key.clone()).or_insert(schema).clone())
    }

    fn resolve_uncached(&self, key: &SchemaKey) -> Result<Value> {
        let envelope = self.inline_refs(self.unresolved(key)?, &mut Vec::new())?;
        let mut schema = navigate(&envelope, &["properties", "data", "items"])?.clone();

        if !schema.is_object() {
            return Err(Error::schema_resolution(
                key.to_string(),
                "list item schema is not an object",
            ));
        }

        for patch in self.overrides.iter().filter(|o| o.path == key.path) {
            let property = schema
                .get_mut("properties")
                .and_then(|p| p.get_mut(&patch.property))
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    Error::schema_not_found(format!("{key} properties"), &patch.property)
                })?;
            property.insert("type".to_string(), patch.json_type.clone());
        }

        Ok(schema)
    }

    /// Expand `{"$ref": "#/..."}` nodes recursively
    fn inline_refs(&self, value: &Value, stack: &mut Vec<String>) -> Result<Value> {
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    let pointer = reference.strip_prefix('#').ok_or_else(|| {
                        Error::schema_resolution(reference, "only local references are supported")
                    })?;
                    if stack.iter().any(|r| r == reference) {
                        return Err(Error::schema_resolution(
                            reference,
                            format!("cyclic reference via {}", stack.join(" -> ")),
                        ));
                    }
                    let target = self
                        .document
                        .pointer(pointer)
                        .ok_or_else(|| Error::schema_resolution(reference, "target not found"))?;

                    stack.push(reference.to_string());
                    let resolved = self.inline_refs(target, stack);
                    stack.pop();
                    return resolved;
                }

                map.iter()
                    .map(|(k, v)| Ok((k.clone(), self.inline_refs(v, stack)?)))
                    .collect::<Result<serde_json::Map<_, _>>>()
                    .map(Value::Object)
            }
            Value::Array(items) => items
                .iter()
                .map(|v| self.inline_refs(v, stack))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }
}

/// Walk object keys from `root`, naming the first segment that is missing
pub(crate) fn navigate<'a>(root: &'a Value, segments: &[&str]) -> Result<&'a Value> {
    let mut current = root;
    let mut location = String::from("$");

    for segment in segments {
        current = current
            .as_object()
            .and_then(|map| map.get(*segment))
            .ok_or_else(|| Error::schema_not_found(location.as_str(), *segment))?;
        location.push('.');
        location.push_str(segment);
    }

    Ok(current)
}
