//! Stream definition types

use crate::error::Result;
use crate::types::{Context, JsonObject, Method};

/// Derives the context handed to child streams from one parent record
pub type ChildContextFn = fn(&JsonObject, &Context) -> Result<Context>;

/// Reshapes a record before it is emitted; `None` drops the record
pub type PostProcessFn = fn(JsonObject, &Context) -> Result<Option<JsonObject>>;

/// A REST resource exposed as a stream
#[derive(Debug, Clone)]
pub struct StreamDefinition {
    /// Stream name
    pub name: &'static str,
    /// Request path template with `{placeholder}` tokens
    pub path: &'static str,
    /// Path template in the OpenAPI document, when it differs from `path`
    pub spec_path: Option<&'static str>,
    /// HTTP method
    pub method: Method,
    /// Primary key fields
    pub primary_keys: &'static [&'static str],
    /// Name of the parent stream
    pub parent: Option<&'static str>,
    /// Child context hook
    pub child_context: Option<ChildContextFn>,
    /// Per-record transform hook
    pub post_process: Option<PostProcessFn>,
    /// Disabled streams stay registered but are not discovered
    pub enabled: bool,
}

impl StreamDefinition {
    /// Create an enabled root stream keyed on `id`
    pub fn new(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            spec_path: None,
            method: Method::GET,
            primary_keys: &["id"],
            parent: None,
            child_context: None,
            post_process: None,
            enabled: true,
        }
    }

    /// Look the schema up under a different path template
    #[must_use]
    pub fn with_spec_path(mut self, spec_path: &'static str) -> Self {
        self.spec_path = Some(spec_path);
        self
    }

    /// Run once per record of the named stream
    #[must_use]
    pub fn with_parent(mut self, parent: &'static str) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the primary key fields
    #[must_use]
    pub fn with_primary_keys(mut self, keys: &'static [&'static str]) -> Self {
        self.primary_keys = keys;
        self
    }

    /// Set the child context hook
    #[must_use]
    pub fn with_child_context(mut self, hook: ChildContextFn) -> Self {
        self.child_context = Some(hook);
        self
    }

    /// Set the per-record transform hook
    #[must_use]
    pub fn with_post_process(mut self, hook: PostProcessFn) -> Self {
        self.post_process = Some(hook);
        self
    }

    /// Keep the definition registered but out of discovery
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Path template the schema is looked up under
    pub fn schema_path(&self) -> &'static str {
        self.spec_path.unwrap_or(self.path)
    }

    /// Whether the stream runs once per sync rather than per parent record
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Derive the context for child streams of one record
    ///
    /// Without a hook the incoming context is passed through unchanged.
    pub fn child_context_for(&self, record: &JsonObject, context: &Context) -> Result<Context> {
        match self.child_context {
            Some(hook) => hook(record, context),
            None => Ok(context.clone()),
        }
    }

    /// Apply the transform hook, if any
    pub fn apply_post_process(
        &self,
        record: JsonObject,
        context: &Context,
    ) -> Result<Option<JsonObject>> {
        match self.post_process {
            Some(hook) => hook(record, context),
            None => Ok(Some(record)),
        }
    }
}
