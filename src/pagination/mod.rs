//! Pagination module
//!
//! List endpoints are paged by number: `per_page` on every request, `page`
//! once a page token exists. The paginator decides after each response
//! whether another page should be requested.

mod strategies;
mod types;

pub use strategies::{PageNumberPaginator, DEFAULT_PAGE_SIZE};
pub use types::{NextPage, PaginationState, Paginator, StopCondition, StopResult};

#[cfg(test)]
mod tests;
