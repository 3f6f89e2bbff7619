//! Per-stream schema lookup

use super::source::OpenApiSource;
use super::types::SchemaKey;
use crate::error::Result;
use crate::streams::StreamDefinition;
use serde_json::Value;

/// Derives a stream's schema key and resolves it against the document
#[derive(Debug, Clone, Copy)]
pub struct SchemaProvider<'a> {
    source: &'a OpenApiSource,
}

impl<'a> SchemaProvider<'a> {
    /// Create a provider over a loaded document
    pub fn new(source: &'a OpenApiSource) -> Self {
        Self { source }
    }

    /// The key a stream's schema lives under
    pub fn key_for(stream: &StreamDefinition) -> SchemaKey {
        SchemaKey::new(stream.schema_path(), stream.method.as_str())
    }

    /// The record schema of a stream
    pub fn schema_for(&self, stream: &StreamDefinition) -> Result<Value> {
        self.source.resolve(&Self::key_for(stream))
    }
}
