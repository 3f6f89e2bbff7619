//! Record validation against a resolved schema
//!
//! Validation never rejects a record. Every mismatch becomes a
//! [`Discrepancy`] that the caller logs and counts.

use super::types::{Discrepancy, DiscrepancyKind, SchemaWaivers};
use crate::error::{Error, Result};
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::collections::BTreeSet;

/// Compiled schema plus the stream facts needed to judge a record
pub struct RecordValidator {
    stream: String,
    compiled: JSONSchema,
    declared: BTreeSet<String>,
    key_properties: Vec<String>,
    waivers: SchemaWaivers,
}

impl RecordValidator {
    /// Compile a stream's schema
    ///
    /// Swagger 2.0 schemas are draft 4 JSON Schema.
    pub fn new(
        stream: impl Into<String>,
        schema: &Value,
        key_properties: &[&str],
        waivers: SchemaWaivers,
    ) -> Result<Self> {
        let stream = stream.into();
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft4)
            .compile(schema)
            .map_err(|e| Error::schema_resolution(&stream, format!("invalid record schema: {e}")))?;

        let declared = schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default();

        Ok(Self {
            stream,
            compiled,
            declared,
            key_properties: key_properties.iter().map(|k| (*k).to_string()).collect(),
            waivers,
        })
    }

    /// Stream this validator checks
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Check one record, returning every discrepancy found
    pub fn validate(&self, record: &Value) -> Vec<Discrepancy> {
        let mut found = Vec::new();

        for key in &self.key_properties {
            if record.get(key).map_or(true, Value::is_null) {
                // Key presence is never waived
                found.push(Discrepancy {
                    stream: self.stream.clone(),
                    kind: DiscrepancyKind::MissingKey,
                    field: format!("/{key}"),
                    message: format!("primary key '{key}' is missing"),
                    waived: false,
                });
            }
        }

        if let Err(errors) = self.compiled.validate(record) {
            for error in errors {
                let field = error.instance_path.to_string();
                let waived = self.waivers.is_stream_waived(&self.stream)
                    || (error.instance.is_null()
                        && self.waivers.is_nullable(&self.stream, top_level(&field)));
                found.push(Discrepancy {
                    stream: self.stream.clone(),
                    kind: DiscrepancyKind::SchemaViolation,
                    field,
                    message: error.to_string(),
                    waived,
                });
            }
        }

        if let Some(fields) = record.as_object() {
            if !self.declared.is_empty() {
                for name in fields.keys().filter(|k| !self.declared.contains(*k)) {
                    found.push(Discrepancy {
                        stream: self.stream.clone(),
                        kind: DiscrepancyKind::UndeclaredField,
                        field: format!("/{name}"),
                        message: format!("field '{name}' is not declared in the schema"),
                        waived: self.waivers.is_stream_waived(&self.stream),
                    });
                }
            }
        }

        found
    }
}

impl std::fmt::Debug for RecordValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordValidator")
            .field("stream", &self.stream)
            .field("declared", &self.declared.len())
            .field("key_properties", &self.key_properties)
            .finish_non_exhaustive()
    }
}

/// First segment of a JSON pointer (`/cidrs/0` -> `cidrs`)
fn top_level(pointer: &str) -> &str {
    pointer
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
}
