//! Tests for pagination module

use super::*;
use serde_json::json;
use std::collections::HashMap;

// ============================================================================
// NextPage Tests
// ============================================================================

#[test]
fn test_next_page_with_params() {
    let next = NextPage::with_params(HashMap::from([("page".to_string(), "2".to_string())]));
    assert!(next.is_continue());
    assert!(!next.is_done());

    if let NextPage::Continue { query_params } = next {
        assert_eq!(query_params.get("page"), Some(&"2".to_string()));
    } else {
        panic!("Expected Continue");
    }
}

#[test]
fn test_next_page_done() {
    assert!(NextPage::Done.is_done());
    assert!(!NextPage::Done.is_continue());
}

// ============================================================================
// Stop Condition Tests
// ============================================================================

#[test]
fn test_stop_on_empty_page() {
    let body = json!({"data": []});
    assert!(StopCondition::EmptyPage.check(&body, 0).should_stop());
    assert!(StopCondition::EmptyPage.check(&body, 3).should_continue());
}

#[test]
fn test_stop_on_null_field() {
    let condition = StopCondition::null_field("next_page");
    assert!(condition.check(&json!({"next_page": null}), 5).should_stop());
    assert!(condition.check(&json!({"next_page": 2}), 5).should_continue());
    // A missing field is not the same as an explicit null
    assert!(condition.check(&json!({"data": []}), 5).should_continue());
}

#[test]
fn test_stop_on_nested_null_field() {
    let condition = StopCondition::null_field("$.meta.next");
    assert!(condition
        .check(&json!({"meta": {"next": null}}), 1)
        .should_stop());
}

// ============================================================================
// PaginationState Tests
// ============================================================================

#[test]
fn test_pagination_state() {
    let mut state = PaginationState::new();
    assert!(state.page.is_none());
    assert!(!state.done);

    state.page = Some(4);
    state.add_page(100);
    state.add_page(7);
    assert_eq!(state.pages_fetched, 2);
    assert_eq!(state.total_fetched, 107);

    state.mark_done();
    assert!(state.done);
    assert!(state.page.is_none());
}

// ============================================================================
// Page Number Paginator Tests
// ============================================================================

#[test]
fn test_default_paginator() {
    let paginator = PageNumberPaginator::default();
    assert_eq!(paginator.page_param, "page");
    assert_eq!(paginator.start_page, 1);
    assert_eq!(paginator.page_size, Some(100));
    assert_eq!(paginator.page_size_param.as_deref(), Some("per_page"));
    assert_eq!(paginator.next_page_path.as_deref(), Some("next_page"));
    assert_eq!(
        paginator.stop_conditions,
        vec![
            StopCondition::EmptyPage,
            StopCondition::null_field("next_page")
        ]
    );
}

#[test]
fn test_first_request_has_no_page() {
    let paginator = PageNumberPaginator::default();
    let params = paginator.initial_params(&PaginationState::new());

    assert_eq!(params.get("per_page"), Some(&"100".to_string()));
    assert!(params.get("page").is_none());
}

#[test]
fn test_full_full_empty_sequence() {
    let paginator = PageNumberPaginator::default();
    let mut state = PaginationState::new();
    let full = json!({"data": []});

    let next = paginator.process_response(&full, 100, &mut state);
    match next {
        NextPage::Continue { query_params } => {
            assert_eq!(query_params.get("page"), Some(&"2".to_string()));
            assert_eq!(query_params.get("per_page"), Some(&"100".to_string()));
        }
        NextPage::Done => panic!("Expected Continue"),
    }

    let next = paginator.process_response(&full, 100, &mut state);
    match next {
        NextPage::Continue { query_params } => {
            assert_eq!(query_params.get("page"), Some(&"3".to_string()));
        }
        NextPage::Done => panic!("Expected Continue"),
    }

    let next = paginator.process_response(&full, 0, &mut state);
    assert!(next.is_done());
    assert_eq!(state.pages_fetched, 3);
    assert_eq!(state.total_fetched, 200);
    assert!(state.page.is_none());
}

#[test]
fn test_short_page_continues() {
    // A short page is not treated as the last one
    let paginator = PageNumberPaginator::default();
    let mut state = PaginationState::new();

    let next = paginator.process_response(&json!({}), 40, &mut state);
    assert!(next.is_continue());
}

#[test]
fn test_null_next_page_stops() {
    let paginator = PageNumberPaginator::default();
    let mut state = PaginationState::new();

    let body = json!({"current_page": 1, "next_page": null, "data": [{"id": 1}]});
    let next = paginator.process_response(&body, 1, &mut state);
    assert!(next.is_done());
    assert!(state.done);
}

#[test]
fn test_announced_next_page_is_followed() {
    let paginator = PageNumberPaginator::default();
    let mut state = PaginationState::new();

    let body = json!({"current_page": 1, "next_page": 5});
    let next = paginator.process_response(&body, 100, &mut state);

    assert_eq!(state.page, Some(5));
    if let NextPage::Continue { query_params } = next {
        assert_eq!(query_params.get("page"), Some(&"5".to_string()));
    } else {
        panic!("Expected Continue");
    }
}

#[test]
fn test_non_advancing_next_page_stops() {
    let paginator = PageNumberPaginator::default();
    let mut state = PaginationState::new();
    state.page = Some(3);

    let body = json!({"next_page": 3});
    let next = paginator.process_response(&body, 100, &mut state);
    assert!(next.is_done());
}

#[test]
fn test_paginator_without_next_page_path() {
    let paginator = PageNumberPaginator::new("p", 0).with_page_size("size", 10);
    let mut state = PaginationState::new();

    let params = paginator.initial_params(&state);
    assert_eq!(params.get("size"), Some(&"10".to_string()));
    assert!(params.get("p").is_none());

    // Null next_page is ignored when the field is not configured
    let next = paginator.process_response(&json!({"next_page": null}), 10, &mut state);
    if let NextPage::Continue { query_params } = next {
        assert_eq!(query_params.get("p"), Some(&"1".to_string()));
    } else {
        panic!("Expected Continue");
    }
}
