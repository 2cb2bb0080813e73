//! Integration tests for the console core.
//!
//! All cluster traffic is served by an in-process wiremock server, so the
//! suite runs without Docker or a real Elasticsearch.
//!
//! # Test Organization
//! - `happy_*` - Normal operation: connect, browse, infer, search, save
//! - `failure_*` - Failure scenarios: backend errors, validation, staleness

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use es_console::{
    ConnectionInfo, ConnectionManager, ConsoleError, EsConnectionConfig, FieldType,
    InMemoryStore, Operator, SearchCondition, SqliteStore,
};

// =============================================================================
// Mock Cluster Helpers
// =============================================================================

fn connection_info(id: &str, server: &MockServer) -> ConnectionInfo {
    ConnectionInfo {
        id: id.to_string(),
        name: format!("test {id}"),
        hosts: vec![server.uri()],
        is_active: true,
    }
}

fn config_for(server: &MockServer) -> EsConnectionConfig {
    EsConnectionConfig {
        hosts: vec![server.uri()],
        ..Default::default()
    }
}

fn search_response(hits: Vec<Value>) -> Value {
    json!({
        "took": 7,
        "timed_out": false,
        "hits": {
            "total": {"value": hits.len(), "relation": "eq"},
            "max_score": 1.0,
            "hits": hits
        }
    })
}

fn hit(index: &str, id: &str, source: Value) -> Value {
    json!({"_index": index, "_id": id, "_score": 1.0, "_source": source})
}

async fn mount_ping(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "node-1",
            "cluster_name": "test-cluster",
            "version": {"number": "8.12.0"}
        })))
        .mount(server)
        .await;
}

async fn mount_indices(server: &MockServer, names: &[&str]) {
    let rows: Vec<Value> = names
        .iter()
        .map(|name| {
            json!({
                "index": name,
                "docs.count": "100",
                "store.size": "2048",
                "health": "green",
                "status": "open",
                "uuid": "u1",
                "creation.date": "1700000000000"
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path("/_cat/indices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

/// Sample fetches carry `size: 1`, condition searches carry `size: 100`.
async fn mount_sample(server: &MockServer, index: &str, source: Value, delay_ms: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/{index}/_search")))
        .and(body_partial_json(json!({"size": 1})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(delay_ms))
                .set_body_json(search_response(vec![hit(index, "1", source)])),
        )
        .mount(server)
        .await;
}

/// Answers only the initial match-all search; condition searches get their
/// own body-specific mocks so the two can't shadow each other.
async fn mount_search(server: &MockServer, index: &str, hits: Vec<Value>) {
    Mock::given(method("POST"))
        .and(path(format!("/{index}/_search")))
        .and(body_partial_json(json!({"size": 100, "query": {"match_all": {}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(hits)))
        .mount(server)
        .await;
}

/// A connected manager plus an open session for the given index set.
async fn session_for(
    server: &MockServer,
    manager: &ConnectionManager,
) -> es_console::SearchSession {
    manager
        .connect(config_for(server), connection_info("c1", server))
        .await
        .expect("connect");
    manager.open_session("c1").await.expect("open session")
}

// =============================================================================
// Happy Path Tests
// =============================================================================

#[tokio::test]
async fn happy_connect_and_browse_indices() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    mount_indices(&server, &["logs", "orders"]).await;
    mount_sample(&server, "logs", json!({"note": "hi"}), 0).await;
    mount_search(&server, "logs", vec![hit("logs", "1", json!({"note": "hi"}))]).await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    let session = session_for(&server, &manager).await;

    let indices = session.refresh_indices().await.expect("refresh");
    assert_eq!(indices.len(), 2);
    assert_eq!(indices[0].docs_count, 100);

    // First index auto-selected, initial search executed
    assert_eq!(session.index(), "logs");
    assert_eq!(session.stats().expect("stats").total, 1);

    // Client-side filtering over the cached list
    let filtered = session.filter_indices("ORD");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "orders");
}

#[tokio::test]
async fn happy_field_inference_from_sample() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    mount_sample(
        &server,
        "logs",
        json!({
            "timestamp": "2024-01-01T00:00:00Z",
            "count": 5,
            "active": true,
            "note": "hi"
        }),
        0,
    )
    .await;
    mount_search(&server, "logs", vec![]).await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    let session = session_for(&server, &manager).await;
    session.select_index("logs").await.expect("select");

    let fields = session.fields();
    let types: Vec<_> = fields
        .iter()
        .map(|f| (f.name.as_str(), f.field_type))
        .collect();
    assert_eq!(
        types,
        vec![
            ("timestamp", FieldType::Date),
            ("count", FieldType::Number),
            ("active", FieldType::Boolean),
            ("note", FieldType::Text),
        ]
    );

    // "timestamp" resolves through the well-known catalog, giving it a
    // real group; inferred fields land in the catch-all.
    assert_eq!(fields[0].group.as_deref(), Some("System"));
    assert_eq!(fields[1].group.as_deref(), Some("Other"));
    assert_eq!(
        session.field_groups(),
        vec!["all".to_string(), "System".to_string(), "Other".to_string()]
    );
}

#[tokio::test]
async fn happy_conditions_compile_into_search_body() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    mount_sample(&server, "products", json!({"price": 10.0, "status": "open"}), 0).await;
    mount_search(&server, "products", vec![]).await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    let session = session_for(&server, &manager).await;
    session.select_index("products").await.expect("select");

    // The compiled body must reach the cluster exactly as specified.
    Mock::given(method("POST"))
        .and(path("/products/_search"))
        .and(body_partial_json(json!({
            "query": {"bool": {"must": [
                {"range": {"price": {"gte": 9.5}}},
                {"bool": {"must_not": {"term": {"status": "closed"}}}}
            ]}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(vec![hit(
            "products",
            "9",
            json!({"price": 12.5, "status": "open"}),
        )])))
        .expect(1)
        .mount(&server)
        .await;

    session.set_conditions(vec![
        SearchCondition::new("price", Operator::Gte, "9.5"),
        SearchCondition::new("status", Operator::Ne, "closed"),
        SearchCondition::blank(),
    ]);
    let stats = session.search().await.expect("search");
    assert_eq!(stats.total, 1);

    let results = session.results();
    assert_eq!(results[0].id, "9");
}

#[tokio::test]
async fn happy_columns_derive_from_first_hit() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    mount_sample(&server, "logs", json!({"level": "warn", "note": "x"}), 0).await;
    mount_search(
        &server,
        "logs",
        vec![hit("logs", "1", json!({"level": "warn", "note": "x"}))],
    )
    .await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    let session = session_for(&server, &manager).await;
    session.select_index("logs").await.expect("select");

    let columns = session.columns();
    assert_eq!(columns.order(), &["_id", "level", "note"]);
    assert_eq!(columns.visible_columns(), vec!["_id", "level", "note"]);

    assert!(session.move_column("note", "_id"));
    assert!(session.set_column_width("level", 320));
    assert_eq!(session.columns().order(), &["note", "_id", "level"]);
}

#[tokio::test]
async fn happy_saved_search_round_trip_memory() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    mount_sample(&server, "logs", json!({"status": "open"}), 0).await;
    mount_search(&server, "logs", vec![]).await;

    let store = Arc::new(InMemoryStore::new());
    let manager = ConnectionManager::new(store);
    let session = session_for(&server, &manager).await;
    session.select_index("logs").await.expect("select");

    let conditions = vec![SearchCondition::new("status", Operator::Eq, "open")];
    session.set_conditions(conditions.clone());
    let entry = session.save_search("open things").await.expect("save");
    assert_eq!(entry.conditions, conditions);

    // A fresh session on the same connection sees the same conditions.
    let reopened = manager.open_session("c1").await.expect("reopen");
    let saved = reopened.saved_searches();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "open things");
    assert_eq!(saved[0].conditions, conditions);

    // Applying re-executes the search with the stored conditions.
    Mock::given(method("POST"))
        .and(path("/logs/_search"))
        .and(body_partial_json(json!({
            "query": {"bool": {"must": [{"term": {"status": "open"}}]}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    reopened.select_index("logs").await.expect("select");
    reopened.apply_saved(&saved[0].id).await.expect("apply");
    assert_eq!(reopened.conditions(), conditions);

    session.delete_saved(&entry.id).await.expect("delete");
    assert!(session.saved_searches().is_empty());
}

#[tokio::test]
async fn happy_saved_search_round_trip_sqlite() {
    let server = MockServer::start().await;
    mount_ping(&server).await;

    let dir = TempDir::new().expect("tempdir");
    let url = format!("sqlite:{}", dir.path().join("console.db").display());
    let store = Arc::new(SqliteStore::connect(&url).await.expect("sqlite"));
    let manager = ConnectionManager::new(store);
    let session = session_for(&server, &manager).await;

    let conditions = vec![
        SearchCondition::new("price", Operator::Lte, "100"),
        SearchCondition::blank(),
    ];
    session.set_conditions(conditions.clone());
    session.save_search("cheap").await.expect("save");

    // Raw, uncoerced conditions survive persistence, blanks included.
    let reopened = manager.open_session("c1").await.expect("reopen");
    assert_eq!(reopened.saved_searches()[0].conditions, conditions);
}

#[tokio::test]
async fn happy_snapshot_management() {
    let server = MockServer::start().await;
    mount_ping(&server).await;

    Mock::given(method("GET"))
        .and(path("/_snapshot"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "backups": {"type": "fs", "settings": {"location": "/mnt/backups"}}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_snapshot/backups/_all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "snapshots": [{
                "snapshot": "nightly-1",
                "uuid": "u1",
                "state": "SUCCESS",
                "indices": ["logs"],
                "start_time": "2024-01-01T00:00:00Z",
                "end_time": "2024-01-01T00:05:00Z"
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/_snapshot/backups/nightly-2"))
        .and(body_partial_json(json!({"indices": "logs,orders"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accepted": true})))
        .expect(1)
        .mount(&server)
        .await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    manager
        .connect(config_for(&server), connection_info("c1", &server))
        .await
        .expect("connect");
    let client = manager.client("c1").expect("client");

    let repositories = client.list_snapshot_repositories().await.expect("repos");
    assert_eq!(repositories[0].name, "backups");
    assert_eq!(repositories[0].repository_type, "fs");

    let snapshots = client.list_snapshots("backups").await.expect("snapshots");
    assert_eq!(snapshots[0].snapshot, "nightly-1");
    assert_eq!(snapshots[0].indices, vec!["logs"]);

    client
        .create_snapshot(
            "backups",
            "nightly-2",
            Some(vec!["logs".into(), "orders".into()]),
        )
        .await
        .expect("create snapshot");
}

#[tokio::test]
async fn happy_cluster_info_merges_health_and_nodes() {
    let server = MockServer::start().await;
    mount_ping(&server).await;

    Mock::given(method("GET"))
        .and(path("/_cluster/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cluster_name": "test-cluster",
            "status": "green",
            "number_of_nodes": 1,
            "number_of_data_nodes": 1,
            "active_primary_shards": 3,
            "active_shards": 3,
            "relocating_shards": 0,
            "initializing_shards": 0,
            "unassigned_shards": 0,
            "active_shards_percent_as_number": 100.0
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/_nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cluster_name": "test-cluster",
            "nodes": {
                "n1": {
                    "name": "node-1",
                    "version": "8.12.0",
                    "roles": ["master", "data"],
                    "os": {"name": "Linux", "version": "6.1", "arch": "x86_64"},
                    "jvm": {"version": "21", "vm_name": "OpenJDK"}
                }
            }
        })))
        .mount(&server)
        .await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    manager
        .connect(config_for(&server), connection_info("c1", &server))
        .await
        .expect("connect");
    let client = manager.client("c1").expect("client");

    let info = client.cluster_info().await.expect("cluster info");
    assert_eq!(info.name, "test-cluster");
    assert_eq!(info.status, "green");
    assert_eq!(info.version, "8.12.0");
    assert_eq!(info.nodes.len(), 1);

    let health = client.cluster_health().await.expect("health");
    assert_eq!(health.status, "green");
    assert_eq!(health.active_shards, 3);

    assert!(manager.test_connection("c1").await.expect("test"));
    assert!(manager.current_config("c1").is_some());
}

// =============================================================================
// Failure Scenarios
// =============================================================================

#[tokio::test]
async fn failure_search_without_index_is_rejected_locally() {
    let server = MockServer::start().await;
    mount_ping(&server).await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    let session = session_for(&server, &manager).await;

    // No remote call is issued: the mock server has no _search route, so
    // anything but the local validation error would fail loudly.
    let err = session.search().await.expect_err("must fail");
    assert!(matches!(err, ConsoleError::NoIndexSelected));
}

#[tokio::test]
async fn failure_invalid_date_aborts_before_remote_call() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    mount_sample(&server, "logs", json!({"timestamp": "2024-01-01T00:00:00Z"}), 0).await;
    mount_search(&server, "logs", vec![]).await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    let session = session_for(&server, &manager).await;
    session.select_index("logs").await.expect("select");

    session.set_conditions(vec![SearchCondition::new(
        "timestamp",
        Operator::Eq,
        "not-a-date",
    )]);
    let err = session.search().await.expect_err("must fail");
    assert!(matches!(err, ConsoleError::Query(_)));
    assert_eq!(
        err.to_string(),
        "invalid date format for field 'timestamp': 'not-a-date'"
    );

    // The previous result view is untouched by the failed compile.
    assert_eq!(session.stats().expect("stats").total, 0);
}

#[tokio::test]
async fn failure_backend_error_passes_through() {
    let server = MockServer::start().await;
    mount_ping(&server).await;
    Mock::given(method("POST"))
        .and(path("/broken/_search"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"{"error":"shard failure"}"#),
        )
        .mount(&server)
        .await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    let session = session_for(&server, &manager).await;

    let err = session.select_index("broken").await.expect_err("must fail");
    match err {
        ConsoleError::Elasticsearch(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("shard failure"));
        }
        other => panic!("expected elasticsearch error, got {other:?}"),
    }
}

#[tokio::test]
async fn failure_connect_to_dead_host_fails() {
    let server = MockServer::start().await;
    // No ping route mounted: wiremock answers 404
    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    let err = manager
        .connect(config_for(&server), connection_info("c1", &server))
        .await
        .expect_err("must fail");
    assert!(matches!(err, ConsoleError::Elasticsearch(_)));
    assert!(manager.list_connections().is_empty());
}

/// A rapid double index-switch must never let the first index's sample
/// overwrite the second index's schema, no matter which response lands
/// first.
#[tokio::test]
async fn failure_stale_sample_is_discarded_on_rapid_switch() {
    let server = MockServer::start().await;
    mount_ping(&server).await;

    // The first index's sample is slow; by the time it arrives the
    // session has moved on.
    mount_sample(&server, "slow-index", json!({"from_slow": "yes"}), 250).await;
    mount_sample(&server, "fast-index", json!({"from_fast": 1}), 0).await;
    mount_search(&server, "fast-index", vec![hit("fast-index", "1", json!({"from_fast": 1}))])
        .await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    let session = session_for(&server, &manager).await;

    let (slow, fast) = tokio::join!(
        session.select_index("slow-index"),
        session.select_index("fast-index"),
    );
    slow.expect("slow select completes cleanly");
    fast.expect("fast select completes cleanly");

    // The superseded response was dropped, not applied.
    assert_eq!(session.index(), "fast-index");
    let fields = session.fields();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "from_fast");
    assert_eq!(fields[0].field_type, FieldType::Number);
}

#[tokio::test]
async fn failure_empty_search_name_is_rejected() {
    let server = MockServer::start().await;
    mount_ping(&server).await;

    let manager = ConnectionManager::new(Arc::new(InMemoryStore::new()));
    let session = session_for(&server, &manager).await;

    let err = session.save_search("   ").await.expect_err("must fail");
    assert!(matches!(err, ConsoleError::Validation(_)));
}
