//! Engine types
//!
//! Singer messages, sync configuration and run statistics.

use crate::types::{JsonObject, JsonValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A Singer message written to the output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message {
    /// Describes the records of one stream; precedes its records
    Schema {
        /// Stream name
        stream: String,
        /// JSON schema of one record
        schema: JsonValue,
        /// Primary key fields
        key_properties: Vec<String>,
    },
    /// One extracted record
    Record {
        /// Stream name
        stream: String,
        /// The record
        record: JsonObject,
        /// When the record was read
        time_extracted: DateTime<Utc>,
    },
}

impl Message {
    /// Create a schema message
    pub fn schema(stream: impl Into<String>, schema: JsonValue, key_properties: &[&str]) -> Self {
        Self::Schema {
            stream: stream.into(),
            schema,
            key_properties: key_properties.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    /// Create a record message stamped with the current time
    pub fn record(stream: impl Into<String>, record: JsonObject) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted: Utc::now(),
        }
    }

    /// Stream the message belongs to
    pub fn stream(&self) -> &str {
        match self {
            Self::Schema { stream, .. } | Self::Record { stream, .. } => stream,
        }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a schema message
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }
}

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Streams to emit; `None` emits every enabled stream
    pub selected: Option<BTreeSet<String>>,
    /// Whether to check records against their schema
    pub validate_records: bool,
    /// Top-level properties dropped from each stream's schema and records
    pub excluded_properties: BTreeMap<String, BTreeSet<String>>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            selected: None,
            validate_records: true,
            excluded_properties: BTreeMap::new(),
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit only the named streams
    #[must_use]
    pub fn with_selected<I, S>(mut self, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = Some(streams.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable record validation
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_records = validate;
        self
    }

    /// Leave the named properties out of one stream's output
    #[must_use]
    pub fn with_excluded_properties<I, S>(mut self, stream: impl Into<String>, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let properties: BTreeSet<String> = properties.into_iter().map(Into::into).collect();
        if !properties.is_empty() {
            self.excluded_properties.insert(stream.into(), properties);
        }
        self
    }

    /// Whether the named stream's messages are written
    pub fn is_selected(&self, stream: &str) -> bool {
        self.selected.as_ref().map_or(true, |s| s.contains(stream))
    }

    /// Drop excluded properties from a stream's schema
    pub fn prune_schema(&self, stream: &str, schema: &mut JsonValue) {
        let Some(excluded) = self.excluded_properties.get(stream) else {
            return;
        };
        if let Some(properties) = schema.get_mut("properties").and_then(JsonValue::as_object_mut) {
            properties.retain(|name, _| !excluded.contains(name));
        }
        if let Some(required) = schema.get_mut("required").and_then(JsonValue::as_array_mut) {
            required.retain(|name| name.as_str().map_or(true, |n| !excluded.contains(n)));
        }
    }

    /// Drop excluded properties from a record
    pub fn prune_record(&self, stream: &str, record: &mut JsonObject) {
        if let Some(excluded) = self.excluded_properties.get(stream) {
            record.retain(|name, _| !excluded.contains(name));
        }
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStats {
    /// Records emitted
    pub records_synced: usize,
    /// Responses fetched, including those of ancestor-only streams
    pub pages_fetched: usize,
    /// Stream invocations completed
    pub streams_synced: usize,
    /// Records emitted per stream
    pub records_per_stream: BTreeMap<String, usize>,
    /// Discrepancies not covered by a waiver
    pub discrepancies: usize,
    /// Discrepancies covered by a waiver
    pub waived_discrepancies: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one emitted record
    pub fn add_record(&mut self, stream: &str) {
        self.records_synced += 1;
        *self.records_per_stream.entry(stream.to_string()).or_default() += 1;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a stream invocation
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Count a discrepancy
    pub fn add_discrepancy(&mut self, waived: bool) {
        if waived {
            self.waived_discrepancies += 1;
        } else {
            self.discrepancies += 1;
        }
    }

    /// Records emitted for one stream
    pub fn records_for(&self, stream: &str) -> usize {
        self.records_per_stream.get(stream).copied().unwrap_or(0)
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
