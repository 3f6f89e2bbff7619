//! Schema types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Identifies one response schema in the OpenAPI document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaKey {
    /// Path template as written in the document
    pub path: String,
    /// Lower-case HTTP method
    pub method: String,
    /// Response status the schema is taken from
    pub expected_status: u16,
}

impl SchemaKey {
    /// Create a key expecting a 200 response
    pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into().to_lowercase(),
            expected_status: 200,
        }
    }

    /// Expect a different response status
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }
}

impl std::fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.method.to_uppercase(),
            self.path,
            self.expected_status
        )
    }
}

// ============================================================================
// Discrepancies
// ============================================================================

/// What kind of mismatch a record showed against its schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// A value violates its declared schema (wrong type, undeclared null, ...)
    SchemaViolation,
    /// A top-level field is absent from the schema's properties
    UndeclaredField,
    /// A primary-key field is missing or null
    MissingKey,
}

impl std::fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscrepancyKind::SchemaViolation => write!(f, "schema_violation"),
            DiscrepancyKind::UndeclaredField => write!(f, "undeclared_field"),
            DiscrepancyKind::MissingKey => write!(f, "missing_key"),
        }
    }
}

/// One mismatch between a record and its schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    /// Stream the record belongs to
    pub stream: String,
    /// Kind of mismatch
    pub kind: DiscrepancyKind,
    /// JSON pointer to the offending value (`""` for the record itself)
    pub field: String,
    /// Human-readable detail
    pub message: String,
    /// Whether the mismatch is a known, accepted one
    pub waived: bool,
}

// ============================================================================
// Waivers
// ============================================================================

/// Discrepancies that are known to occur and are accepted
///
/// The published document lags the live API: some fields come back null
/// without being declared nullable, and some streams diverge more broadly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaWaivers {
    /// Streams whose records are known not to match their schema
    #[serde(default)]
    pub mismatched_streams: BTreeSet<String>,

    /// Per stream, top-level fields that may be null despite the schema
    #[serde(default)]
    pub nullable_fields: BTreeMap<String, BTreeSet<String>>,
}

impl SchemaWaivers {
    /// Waive nothing
    pub fn none() -> Self {
        Self::default()
    }

    /// The discrepancies observed against the live API
    pub fn known() -> Self {
        let mut waivers = Self::none()
            .with_mismatched_stream("databases")
            .with_mismatched_stream("organizations");

        for (stream, field) in [
            ("backups", "actor"),
            ("branches", "cluster_iops"),
            ("branches", "deleted_at"),
            ("branches", "parent_branch"),
            ("branches", "restore_checklist_completed_at"),
            ("databases", "automatic_migrations"),
            ("databases", "issues_count"),
            ("databases", "data_import"),
            ("databases", "migration_framework"),
            ("databases", "migration_table_name"),
            ("organizations", "has_past_due_invoices"),
            ("organizations", "sso_portal_url"),
            ("passwords", "cidrs"),
            ("passwords", "deleted_at"),
            ("passwords", "expires_at"),
            ("passwords", "plain_text"),
            ("passwords", "ttl_seconds"),
        ] {
            waivers = waivers.with_nullable_field(stream, field);
        }

        waivers
    }

    /// Accept any mismatch in a stream
    #[must_use]
    pub fn with_mismatched_stream(mut self, stream: impl Into<String>) -> Self {
        self.mismatched_streams.insert(stream.into());
        self
    }

    /// Accept nulls in one top-level field
    #[must_use]
    pub fn with_nullable_field(mut self, stream: impl Into<String>, field: impl Into<String>) -> Self {
        self.nullable_fields
            .entry(stream.into())
            .or_default()
            .insert(field.into());
        self
    }

    /// Whether every mismatch in the stream is accepted
    pub fn is_stream_waived(&self, stream: &str) -> bool {
        self.mismatched_streams.contains(stream)
    }

    /// Whether a null in the given top-level field is accepted
    pub fn is_nullable(&self, stream: &str, field: &str) -> bool {
        self.nullable_fields
            .get(stream)
            .is_some_and(|fields| fields.contains(field))
    }
}
