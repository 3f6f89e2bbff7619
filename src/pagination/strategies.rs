//! Pagination strategy implementations

use super::types::{lookup_field, NextPage, PaginationState, Paginator, StopCondition};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination
///
/// The first request carries only the page size; the page number is added
/// once a token exists, so the sequence is `(none), page=2, page=3, ...`.
/// A numeric field named by `next_page_path` overrides the plain increment.
#[derive(Debug, Clone)]
pub struct PageNumberPaginator {
    /// Query parameter name for page number
    pub page_param: String,
    /// Page the server returns when no page number is sent
    pub start_page: u32,
    /// Optional page size parameter name
    pub page_size_param: Option<String>,
    /// Page size value
    pub page_size: Option<u32>,
    /// Response field announcing the next page number
    pub next_page_path: Option<String>,
    /// Stop conditions, any of which ends pagination
    pub stop_conditions: Vec<StopCondition>,
}

impl Default for PageNumberPaginator {
    fn default() -> Self {
        Self::new("page", 1)
            .with_page_size("per_page", DEFAULT_PAGE_SIZE)
            .with_next_page_path("next_page")
    }
}

impl PageNumberPaginator {
    /// Create a new page number paginator that stops on an empty page
    pub fn new(page_param: impl Into<String>, start_page: u32) -> Self {
        Self {
            page_param: page_param.into(),
            start_page,
            page_size_param: None,
            page_size: None,
            next_page_path: None,
            stop_conditions: vec![StopCondition::EmptyPage],
        }
    }

    /// Set page size parameter
    #[must_use]
    pub fn with_page_size(mut self, param: impl Into<String>, size: u32) -> Self {
        self.page_size_param = Some(param.into());
        self.page_size = Some(size);
        self
    }

    /// Follow a next-page field; a null value there ends pagination
    #[must_use]
    pub fn with_next_page_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.stop_conditions.push(StopCondition::null_field(&path));
        self.next_page_path = Some(path);
        self
    }

    /// Add a stop condition
    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_conditions.push(condition);
        self
    }

    fn params_for(&self, page: Option<u32>) -> HashMap<String, String> {
        let mut params = HashMap::new();
        if let Some(page) = page {
            params.insert(self.page_param.clone(), page.to_string());
        }
        if let (Some(param), Some(size)) = (&self.page_size_param, self.page_size) {
            params.insert(param.clone(), size.to_string());
        }
        params
    }

    fn announced_page(&self, body: &Value) -> Option<u64> {
        let path = self.next_page_path.as_deref()?;
        lookup_field(body, path)?.as_u64()
    }
}

impl Paginator for PageNumberPaginator {
    fn initial_params(&self, state: &PaginationState) -> HashMap<String, String> {
        self.params_for(state.page)
    }

    fn process_response(
        &self,
        body: &Value,
        records_count: usize,
        state: &mut PaginationState,
    ) -> NextPage {
        state.add_page(records_count);

        if self
            .stop_conditions
            .iter()
            .any(|c| c.check(body, records_count).should_stop())
        {
            debug!(
                pages = state.pages_fetched,
                records = state.total_fetched,
                "Pagination complete"
            );
            state.mark_done();
            return NextPage::Done;
        }

        let current = state.page.unwrap_or(self.start_page);
        let next = match self.announced_page(body) {
            Some(announced) if announced <= u64::from(current) => {
                warn!(
                    current,
                    announced, "Next page does not advance past the current page, stopping"
                );
                state.mark_done();
                return NextPage::Done;
            }
            Some(announced) => u32::try_from(announced).unwrap_or(u32::MAX),
            None => current.saturating_add(1),
        };

        state.page = Some(next);
        NextPage::with_params(self.params_for(Some(next)))
    }
}
