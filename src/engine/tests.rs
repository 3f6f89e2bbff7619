//! Tests for engine module

use super::*;
use crate::http::HttpClientConfig;
use crate::output::MemorySink;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig {
        base_url: Some(server.uri()),
        max_retries: 0,
        ..Default::default()
    };
    HttpClient::with_config(config).unwrap()
}

fn list_schema(properties: Value) -> Value {
    json!({
        "200": {
            "description": "OK",
            "schema": {
                "type": "object",
                "properties": {
                    "next_page": {"type": "integer"},
                    "data": {
                        "type": "array",
                        "items": {"type": "object", "properties": properties}
                    }
                }
            }
        }
    })
}

/// A document describing `/things` and `/things/{thing_id}/parts`
fn document() -> OpenApiSource {
    OpenApiSource::from_document(json!({
        "swagger": "2.0",
        "paths": {
            "/things": {"get": {"responses": list_schema(json!({
                "id": {"type": "string"},
                "name": {"type": "string"},
                "hidden": {"type": "boolean"}
            }))}},
            "/things/{thing}/parts": {"get": {"responses": list_schema(json!({
                "id": {"type": "string"},
                "size": {"type": "integer"}
            }))}}
        }
    }))
}

fn thing_context(record: &JsonObject, context: &Context) -> Result<Context> {
    let mut child = context.clone();
    let id = record
        .get("id")
        .cloned()
        .ok_or_else(|| Error::missing_record_field("things", "id"))?;
    child.insert("thing_id".into(), id);
    Ok(child)
}

fn drop_hidden(record: JsonObject, _context: &Context) -> Result<Option<JsonObject>> {
    if record.get("hidden") == Some(&Value::Bool(true)) {
        return Ok(None);
    }
    Ok(Some(record))
}

fn things() -> Vec<StreamDefinition> {
    vec![
        StreamDefinition::new("things", "/things")
            .with_child_context(thing_context)
            .with_post_process(drop_hidden),
        StreamDefinition::new("parts", "/things/{thing_id}/parts")
            .with_spec_path("/things/{thing}/parts")
            .with_parent("things"),
    ]
}

fn page(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"data": data}))
}

// ============================================================================
// Message Tests
// ============================================================================

#[test]
fn test_message_schema() {
    let msg = Message::schema("regions", json!({"type": "object"}), &["id"]);
    assert!(msg.is_schema());
    assert!(!msg.is_record());
    assert_eq!(msg.stream(), "regions");
}

#[test]
fn test_message_record_serializes_singer_shape() {
    let record = json!({"id": "r1"}).as_object().cloned().unwrap();
    let msg = Message::record("regions", record);
    assert!(msg.is_record());

    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value["type"], "RECORD");
    assert_eq!(value["stream"], "regions");
    assert_eq!(value["record"], json!({"id": "r1"}));
    assert!(value["time_extracted"].as_str().unwrap().ends_with('Z'));
}

// ============================================================================
// SyncConfig Tests
// ============================================================================

#[test]
fn test_sync_config_default() {
    let config = SyncConfig::default();
    assert!(config.selected.is_none());
    assert!(config.validate_records);
    assert!(config.is_selected("anything"));
}

#[test]
fn test_sync_config_builder() {
    let config = SyncConfig::new()
        .with_selected(["regions", "branches"])
        .with_validation(false);

    assert!(config.is_selected("regions"));
    assert!(!config.is_selected("databases"));
    assert!(!config.validate_records);
}

#[test]
fn test_sync_config_prunes_excluded_properties() {
    let config = SyncConfig::new().with_excluded_properties("regions", ["slug", "enabled"]);

    let mut schema = json!({
        "type": "object",
        "required": ["id", "slug"],
        "properties": {"id": {"type": "string"}, "slug": {"type": "string"}}
    });
    config.prune_schema("regions", &mut schema);
    assert_eq!(schema["required"], json!(["id"]));
    assert!(schema["properties"].get("slug").is_none());

    let mut record = json!({"id": "r1", "slug": "x", "enabled": true})
        .as_object()
        .cloned()
        .unwrap();
    config.prune_record("regions", &mut record);
    assert_eq!(Value::Object(record), json!({"id": "r1"}));

    // Other streams are untouched
    let mut record = json!({"slug": "x"}).as_object().cloned().unwrap();
    config.prune_record("branches", &mut record);
    assert!(record.contains_key("slug"));
    assert!(SyncConfig::new()
        .with_excluded_properties("regions", Vec::<String>::new())
        .excluded_properties
        .is_empty());
}

// ============================================================================
// SyncStats Tests
// ============================================================================

#[test]
fn test_sync_stats_counters() {
    let mut stats = SyncStats::new();
    stats.add_record("regions");
    stats.add_record("regions");
    stats.add_record("branches");
    stats.add_page();
    stats.add_stream();
    stats.add_discrepancy(true);
    stats.add_discrepancy(false);
    stats.add_discrepancy(false);
    stats.set_duration(12);

    assert_eq!(stats.records_synced, 3);
    assert_eq!(stats.records_for("regions"), 2);
    assert_eq!(stats.records_for("passwords"), 0);
    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(stats.streams_synced, 1);
    assert_eq!(stats.waived_discrepancies, 1);
    assert_eq!(stats.discrepancies, 2);
    assert_eq!(stats.duration_ms, 12);
}

// ============================================================================
// Planning Tests
// ============================================================================

#[tokio::test]
async fn test_plan_adds_ancestors() {
    let server = MockServer::start().await;
    let client = client(&server);
    let source = document();
    let registry = crate::streams::registry()
        .into_iter()
        .filter(|d| d.enabled)
        .collect();

    let engine = SyncEngine::new(&client, &source, registry)
        .with_config(SyncConfig::new().with_selected(["deploy_operations", "regions"]));
    let plan: Vec<_> = engine.plan().unwrap().into_iter().map(|d| d.name).collect();

    assert_eq!(
        plan,
        vec![
            "organizations",
            "databases",
            "branches",
            "deploy_requests",
            "deploy_operations",
            "regions"
        ]
    );
}

#[tokio::test]
async fn test_plan_rejects_unknown_stream() {
    let server = MockServer::start().await;
    let client = client(&server);
    let source = document();

    let engine = SyncEngine::new(&client, &source, things())
        .with_config(SyncConfig::new().with_selected(["invoices"]));
    assert!(matches!(
        engine.plan(),
        Err(Error::StreamNotFound { ref stream }) if stream == "invoices"
    ));
}

// ============================================================================
// Sync Tests
// ============================================================================

#[tokio::test]
async fn test_sync_pages_until_empty() {
    let server = MockServer::start().await;

    let full: Vec<Value> = (0..100).map(|i| json!({"id": format!("t{i}")})).collect();
    Mock::given(method("GET"))
        .and(path("/things"))
        .and(query_param("page", "2"))
        .respond_with(page(json!(full)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .and(query_param("page", "3"))
        .respond_with(page(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .and(query_param("per_page", "100"))
        .respond_with(page(json!(full)))
        .with_priority(10)
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let source = document();
    let streams = vec![StreamDefinition::new("things", "/things")];
    let mut sink = MemorySink::new();

    let stats = SyncEngine::new(&client, &source, streams)
        .run(&mut sink)
        .await
        .unwrap();

    assert_eq!(stats.records_synced, 200);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(sink.records_for("things").len(), 200);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(!requests[0].url.query_pairs().any(|(k, _)| k == "page"));
}

#[tokio::test]
async fn test_sync_stops_on_null_next_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "t1"}],
            "next_page": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let source = document();
    let mut sink = MemorySink::new();

    let stats = SyncEngine::new(&client, &source, vec![StreamDefinition::new("things", "/things")])
        .run(&mut sink)
        .await
        .unwrap();
    assert_eq!(stats.records_synced, 1);
    assert_eq!(stats.pages_fetched, 1);
}

#[tokio::test]
async fn test_sync_expands_children_per_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .and(query_param("page", "2"))
        .respond_with(page(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .respond_with(page(json!([
            {"id": "a", "name": "first"},
            {"id": "h", "name": "secret", "hidden": true},
            {"id": "b", "name": "second"}
        ])))
        .with_priority(10)
        .mount(&server)
        .await;
    for id in ["a", "b"] {
        Mock::given(method("GET"))
            .and(path(format!("/things/{id}/parts")))
            .and(query_param("page", "2"))
            .respond_with(page(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/things/{id}/parts")))
            .respond_with(page(json!([{"id": format!("{id}-1"), "size": 1}])))
            .with_priority(10)
            .mount(&server)
            .await;
    }

    let client = client(&server);
    let source = document();
    let mut sink = MemorySink::new();

    let stats = SyncEngine::new(&client, &source, things())
        .run(&mut sink)
        .await
        .unwrap();

    assert_eq!(sink.streams(), vec!["things", "parts"]);
    let ids: Vec<_> = sink
        .messages
        .iter()
        .filter_map(|m| match m {
            Message::Record { record, .. } => record["id"].as_str(),
            Message::Schema { .. } => None,
        })
        .collect();
    // Parents are written before their children; the hidden record never is
    assert_eq!(ids, vec!["a", "a-1", "b", "b-1"]);
    assert_eq!(stats.records_for("things"), 2);
    assert_eq!(stats.records_for("parts"), 2);
    assert_eq!(stats.discrepancies, 0);

    let requests = server.received_requests().await.unwrap();
    assert!(!requests
        .iter()
        .any(|r| r.url.path().starts_with("/things/h/")));
}

#[tokio::test]
async fn test_child_path_encodes_parent_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a?b"}],
            "next_page": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "next_page": null
        })))
        .with_priority(10)
        .mount(&server)
        .await;

    let client = client(&server);
    let source = document();
    let mut sink = MemorySink::new();

    SyncEngine::new(&client, &source, things())
        .with_config(SyncConfig::new().with_selected(["parts"]))
        .run(&mut sink)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].url.path(), "/things/a%3Fb/parts");
    assert!(requests[1].url.query_pairs().all(|(k, _)| k == "per_page"));
}

#[tokio::test]
async fn test_selected_child_hides_ancestor_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a"}],
            "next_page": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/things/a/parts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "a-1", "size": 3}],
            "next_page": null
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let source = document();
    let mut sink = MemorySink::new();

    SyncEngine::new(&client, &source, things())
        .with_config(SyncConfig::new().with_selected(["parts"]))
        .run(&mut sink)
        .await
        .unwrap();

    assert_eq!(sink.streams(), vec!["parts"]);
    assert_eq!(sink.records_for("things").len(), 0);
    assert_eq!(sink.records_for("parts").len(), 1);
}

#[tokio::test]
async fn test_discrepancies_are_counted_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "a", "hidden": "no"},
                {"name": "keyless"},
                {"id": "c", "color": "red"}
            ],
            "next_page": null
        })))
        .mount(&server)
        .await;

    let client = client(&server);
    let source = document();
    let mut sink = MemorySink::new();
    let streams = vec![StreamDefinition::new("things", "/things")];

    let stats = SyncEngine::new(&client, &source, streams.clone())
        .with_waivers(SchemaWaivers::none())
        .run(&mut sink)
        .await
        .unwrap();
    assert_eq!(stats.records_synced, 3);
    assert_eq!(stats.discrepancies, 3);
    assert_eq!(stats.waived_discrepancies, 0);

    let mut sink = MemorySink::new();
    let stats = SyncEngine::new(&client, &source, streams)
        .with_waivers(SchemaWaivers::none().with_mismatched_stream("things"))
        .run(&mut sink)
        .await
        .unwrap();
    // A missing key is never waived
    assert_eq!(stats.discrepancies, 1);
    assert_eq!(stats.waived_discrepancies, 2);
}

#[tokio::test]
async fn test_unresolvable_schema_fails_before_requests() {
    let server = MockServer::start().await;
    let client = client(&server);
    let source = document();
    let mut sink = MemorySink::new();

    let err = SyncEngine::new(
        &client,
        &source,
        vec![StreamDefinition::new("gadgets", "/gadgets")],
    )
    .run(&mut sink)
    .await
    .unwrap_err();

    assert!(matches!(err, Error::SchemaNotFound { .. }));
    assert!(sink.messages.is_empty());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_http_error_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = client(&server);
    let source = document();
    let mut sink = MemorySink::new();

    let err = SyncEngine::new(&client, &source, vec![StreamDefinition::new("things", "/things")])
        .run(&mut sink)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 403, .. }));
}
