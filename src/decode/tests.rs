//! Tests for decoder module

use super::*;
use crate::error::Error;
use serde_json::json;

// ============================================================================
// JSON Decoder Tests
// ============================================================================

#[test]
fn test_json_decoder_default_path() {
    let decoder = JsonDecoder::new();
    assert_eq!(decoder.record_path(), "$.data[*]");
}

#[test]
fn test_json_decoder_extracts_data_items() {
    let decoder = JsonDecoder::new();
    let body = r#"{
        "type": "list",
        "current_page": 1,
        "next_page": null,
        "data": [{"id": "a1", "name": "acme"}, {"id": "b2", "name": "beta"}]
    }"#;

    let records = decoder.decode(body).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], "a1");
    assert_eq!(records[1]["name"], "beta");
}

#[test]
fn test_json_decoder_empty_data() {
    let decoder = JsonDecoder::new();
    let records = decoder.decode(r#"{"data": []}"#).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_json_decoder_missing_data() {
    let decoder = JsonDecoder::new();
    let records = decoder.decode(r#"{"type": "list"}"#).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_json_decoder_rejects_scalar_items() {
    let decoder = JsonDecoder::new();
    let err = decoder.decode(r#"{"data": [{"id": 1}, 7]}"#).unwrap_err();
    assert!(matches!(err, Error::RecordExtraction { .. }));
}

#[test]
fn test_json_decoder_invalid_json() {
    let decoder = JsonDecoder::new();
    let err = decoder.decode("not json").unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[test]
fn test_json_decoder_custom_path() {
    let decoder = JsonDecoder::with_path("$.results[*]");
    let envelope = json!({"results": [{"id": 1}], "data": [{"id": 2}]});
    let records = decoder.extract(&envelope).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], 1);
}

#[test]
fn test_json_decoder_raw_keeps_envelope() {
    let decoder = JsonDecoder::new();
    let raw = decoder.decode_raw(r#"{"next_page": 3, "data": []}"#).unwrap();
    assert_eq!(raw["next_page"], 3);
}
