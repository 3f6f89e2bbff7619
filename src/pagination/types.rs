//! Pagination types and traits

use serde_json::Value;
use std::collections::HashMap;

/// Result of the next page computation
#[derive(Debug, Clone)]
pub enum NextPage {
    /// More pages available with these parameters
    Continue {
        /// Query parameters to send with the next request
        query_params: HashMap<String, String>,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with query parameters
    pub fn with_params(params: HashMap<String, String>) -> Self {
        Self::Continue {
            query_params: params,
        }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Stop conditions for pagination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopCondition {
    /// Stop when the page holds no records
    EmptyPage,

    /// Stop when a response field is present and null
    NullField {
        /// Dotted path to the field
        path: String,
    },
}

impl StopCondition {
    /// Create a null-field stop condition
    pub fn null_field(path: impl Into<String>) -> Self {
        Self::NullField { path: path.into() }
    }

    /// Evaluate this condition against a response
    pub fn check(&self, body: &Value, records_count: usize) -> StopResult {
        let stop = match self {
            StopCondition::EmptyPage => records_count == 0,
            StopCondition::NullField { path } => {
                matches!(lookup_field(body, path), Some(Value::Null))
            }
        };
        if stop {
            StopResult::Stop
        } else {
            StopResult::Continue
        }
    }
}

/// Result of checking a stop condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    /// Continue pagination
    Continue,
    /// Stop pagination
    Stop,
}

impl StopResult {
    /// Check if we should continue
    pub fn should_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    /// Check if we should stop
    pub fn should_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// Tracks pagination state during one stream invocation
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Page token; `None` until the first page has been read
    pub page: Option<u32>,
    /// Responses processed so far
    pub pages_fetched: u32,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete and drop the token
    pub fn mark_done(&mut self) {
        self.done = true;
        self.page = None;
    }

    /// Record one processed page
    pub fn add_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.total_fetched += records as u64;
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Query parameters for the first request
    fn initial_params(&self, state: &PaginationState) -> HashMap<String, String>;

    /// Process a response and determine if there's a next page
    fn process_response(
        &self,
        body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage;
}

/// Follow a dotted path (`$.` prefix optional) through nested objects.
/// Distinguishes a missing field (`None`) from an explicit null.
pub(crate) fn lookup_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    path.split('.')
        .try_fold(value, |current, part| current.as_object()?.get(part))
}
