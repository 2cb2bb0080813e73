// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! HTTP client for the cluster REST API.
//!
//! Thin request/response plumbing over `reqwest`: every method maps to one
//! REST endpoint and surfaces backend failures verbatim. No retries and no
//! caching live here; a search body is an opaque payload whose schema the
//! cluster owns.

mod types;

pub use types::{
    ClusterHealth, ClusterInfo, ConnectionInfo, Hits, HitsTotal, IndexInfo, NodeInfo,
    SearchHit, SearchResponse, ShardInfo, Snapshot, SnapshotRepository,
};

use std::time::{Duration, Instant};

use reqwest::{Method, RequestBuilder};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::config::EsConnectionConfig;
use crate::error::{ConsoleError, ConsoleResult};
use crate::metrics;

/// A live connection to one cluster.
#[derive(Clone)]
pub struct EsClient {
    http: reqwest::Client,
    base_url: String,
    config: EsConnectionConfig,
    info: ConnectionInfo,
}

impl EsClient {
    /// Build a client and verify the cluster answers a ping.
    pub async fn connect(
        config: EsConnectionConfig,
        info: ConnectionInfo,
    ) -> ConsoleResult<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(path) = &config.ca_cert_path {
            let pem = std::fs::read(path).map_err(|e| {
                ConsoleError::Validation(format!("cannot read CA certificate {path}: {e}"))
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| ConsoleError::Validation(format!("invalid CA certificate: {e}")))?;
            builder = builder.add_root_certificate(certificate);
        }
        let http = builder
            .build()
            .map_err(|e| ConsoleError::Connection(format!("failed to build HTTP client: {e}")))?;

        // First host wins; validation already guaranteed at least one.
        let base_url = config.hosts[0].trim_end_matches('/').to_string();

        let client = Self {
            http,
            base_url,
            config,
            info,
        };
        client.ping().await?;
        debug!(host = %client.base_url, id = %client.info.id, "connected");
        Ok(client)
    }

    #[must_use]
    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    #[must_use]
    pub fn config(&self) -> &EsConnectionConfig {
        &self.config
    }

    /// Check the cluster still answers.
    pub async fn ping(&self) -> ConsoleResult<()> {
        self.send("ping", self.request(Method::GET, "")).await?;
        Ok(())
    }

    pub async fn test_connection(&self) -> ConsoleResult<bool> {
        self.ping().await?;
        Ok(true)
    }

    /// All indices with document and size counters, from `_cat/indices`.
    pub async fn list_indices(&self) -> ConsoleResult<Vec<IndexInfo>> {
        let value = self
            .send(
                "list_indices",
                self.request(Method::GET, "_cat/indices?format=json&bytes=b"),
            )
            .await?;
        let rows = value.as_array().cloned().unwrap_or_default();
        Ok(parse_index_infos(&rows))
    }

    /// Cluster health merged with per-node details.
    pub async fn cluster_info(&self) -> ConsoleResult<ClusterInfo> {
        let health = self
            .send("cluster_health", self.request(Method::GET, "_cluster/health"))
            .await?;
        let nodes = self
            .send("nodes_info", self.request(Method::GET, "_nodes"))
            .await?;
        Ok(merge_cluster_info(&health, &nodes))
    }

    pub async fn cluster_health(&self) -> ConsoleResult<ClusterHealth> {
        let value = self
            .send("cluster_health", self.request(Method::GET, "_cluster/health"))
            .await?;
        serde_json::from_value(value)
            .map_err(|e| ConsoleError::Elasticsearch(format!("unexpected health response: {e}")))
    }

    /// Raw `_cluster/stats` document.
    pub async fn cluster_stats(&self) -> ConsoleResult<Value> {
        self.send("cluster_stats", self.request(Method::GET, "_cluster/stats"))
            .await
    }

    /// Per-shard placement from `_cat/shards`.
    pub async fn shards(&self) -> ConsoleResult<Vec<ShardInfo>> {
        let value = self
            .send("shards", self.request(Method::GET, "_cat/shards?format=json"))
            .await?;
        let rows = value.as_array().cloned().unwrap_or_default();
        Ok(parse_shard_infos(&rows))
    }

    /// Execute a search body against one index.
    ///
    /// A missing `size` defaults to 100 and `track_scores` is always set,
    /// so score columns stay populated under custom sort orders.
    pub async fn search(&self, index: &str, mut body: Value) -> ConsoleResult<SearchResponse> {
        if let Some(object) = body.as_object_mut() {
            if !object.contains_key("size") {
                object.insert("size".to_string(), json!(100));
            }
            object.insert("track_scores".to_string(), json!(true));
        }

        let path = format!("{index}/_search");
        let value = self
            .send("search", self.request(Method::POST, &path).json(&body))
            .await?;
        let response: SearchResponse = serde_json::from_value(value)
            .map_err(|e| ConsoleError::Elasticsearch(format!("unexpected search response: {e}")))?;
        metrics::record_search_results(response.hits.hits.len());
        Ok(response)
    }

    /// Execute a search body given as a JSON string.
    pub async fn search_raw(&self, index: &str, query: &str) -> ConsoleResult<SearchResponse> {
        let body: Value = serde_json::from_str(query)
            .map_err(|e| ConsoleError::Validation(format!("invalid query JSON: {e}")))?;
        self.search(index, body).await
    }

    /// Fetch one document's source to sample an index's field shape.
    ///
    /// `None` for empty indices.
    pub async fn sample_document(&self, index: &str) -> ConsoleResult<Option<Map<String, Value>>> {
        let body = json!({"query": {"match_all": {}}, "size": 1});
        let response = self.search(index, body).await?;
        Ok(response.hits.hits.into_iter().next().map(|hit| hit.source))
    }

    pub async fn list_snapshot_repositories(&self) -> ConsoleResult<Vec<SnapshotRepository>> {
        let value = self
            .send("list_repositories", self.request(Method::GET, "_snapshot"))
            .await?;
        let mut repositories = Vec::new();
        if let Some(object) = value.as_object() {
            for (name, repo) in object {
                repositories.push(SnapshotRepository {
                    name: name.clone(),
                    repository_type: repo["type"].as_str().unwrap_or("unknown").to_string(),
                    settings: repo.get("settings").cloned().unwrap_or(Value::Null),
                });
            }
        }
        Ok(repositories)
    }

    pub async fn create_snapshot_repository(
        &self,
        name: &str,
        repository_type: &str,
        settings: Value,
    ) -> ConsoleResult<()> {
        let path = format!("_snapshot/{name}");
        let body = json!({"type": repository_type, "settings": settings});
        self.send(
            "create_repository",
            self.request(Method::PUT, &path).json(&body),
        )
        .await?;
        Ok(())
    }

    pub async fn list_snapshots(&self, repository: &str) -> ConsoleResult<Vec<Snapshot>> {
        let path = format!("_snapshot/{repository}/_all");
        let value = self
            .send("list_snapshots", self.request(Method::GET, &path))
            .await?;
        let snapshots = value.get("snapshots").cloned().unwrap_or(json!([]));
        serde_json::from_value(snapshots)
            .map_err(|e| ConsoleError::Elasticsearch(format!("unexpected snapshot list: {e}")))
    }

    pub async fn create_snapshot(
        &self,
        repository: &str,
        snapshot: &str,
        indices: Option<Vec<String>>,
    ) -> ConsoleResult<()> {
        let path = format!("_snapshot/{repository}/{snapshot}");
        let body = match indices {
            Some(indices) => json!({"indices": indices.join(",")}),
            None => json!({}),
        };
        self.send(
            "create_snapshot",
            self.request(Method::PUT, &path).json(&body),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_snapshot(&self, repository: &str, snapshot: &str) -> ConsoleResult<()> {
        let path = format!("_snapshot/{repository}/{snapshot}");
        self.send("delete_snapshot", self.request(Method::DELETE, &path))
            .await?;
        Ok(())
    }

    pub async fn restore_snapshot(
        &self,
        repository: &str,
        snapshot: &str,
        indices: Option<Vec<String>>,
    ) -> ConsoleResult<()> {
        let path = format!("_snapshot/{repository}/{snapshot}/_restore");
        let body = match indices {
            Some(indices) => json!({"indices": indices.join(",")}),
            None => json!({}),
        };
        self.send(
            "restore_snapshot",
            self.request(Method::POST, &path).json(&body),
        )
        .await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        };
        let mut builder = self.http.request(method, url);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("Authorization", format!("ApiKey {key}"));
        } else if let Some(username) = &self.config.username {
            builder = builder.basic_auth(username, self.config.password.as_deref());
        }
        builder
    }

    /// Issue a request and decode the JSON body, mapping transport and
    /// status failures into the console error taxonomy.
    async fn send(&self, operation: &str, builder: RequestBuilder) -> ConsoleResult<Value> {
        let started = Instant::now();
        let response = builder.send().await.map_err(|e| {
            metrics::record_remote_call(operation, "error");
            warn!(operation, error = %e, "request failed");
            ConsoleError::Connection(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ConsoleError::Connection(e.to_string()))?;

        if !status.is_success() {
            metrics::record_remote_call(operation, "error");
            return Err(ConsoleError::Elasticsearch(format!("{status}: {text}")));
        }

        let value = serde_json::from_str(&text)
            .map_err(|e| ConsoleError::Elasticsearch(format!("invalid JSON response: {e}")))?;
        metrics::record_remote_call(operation, "success");
        metrics::record_latency(operation, started.elapsed());
        Ok(value)
    }
}

fn parse_index_infos(rows: &[Value]) -> Vec<IndexInfo> {
    rows.iter()
        .map(|row| IndexInfo {
            name: row["index"].as_str().unwrap_or_default().to_string(),
            docs_count: row["docs.count"]
                .as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or(0),
            size_in_bytes: row["store.size"]
                .as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or(0),
            health: row["health"].as_str().unwrap_or("unknown").to_string(),
            status: row["status"].as_str().unwrap_or("unknown").to_string(),
            uuid: row["uuid"].as_str().unwrap_or("unknown").to_string(),
            creation_date: row["creation.date"].as_str().unwrap_or("0").to_string(),
        })
        .collect()
}

fn parse_shard_infos(rows: &[Value]) -> Vec<ShardInfo> {
    rows.iter()
        .map(|row| ShardInfo {
            index: row["index"].as_str().unwrap_or_default().to_string(),
            shard: row["shard"]
                .as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .unwrap_or_default(),
            prirep: row["prirep"].as_str().unwrap_or_default().to_string(),
            state: row["state"].as_str().unwrap_or_default().to_string(),
            docs: row["docs"].as_str().and_then(|s| s.parse::<i64>().ok()),
            store: row["store"].as_str().map(String::from),
            node: row["node"].as_str().map(String::from),
        })
        .collect()
}

fn merge_cluster_info(health: &Value, nodes: &Value) -> ClusterInfo {
    let mut node_infos = Vec::new();
    if let Some(node_map) = nodes["nodes"].as_object() {
        for node in node_map.values() {
            node_infos.push(NodeInfo {
                name: node["name"].as_str().unwrap_or("unknown").to_string(),
                version: node["version"].as_str().unwrap_or("unknown").to_string(),
                roles: node["roles"]
                    .as_array()
                    .map(|roles| {
                        roles
                            .iter()
                            .filter_map(|role| role.as_str().map(String::from))
                            .collect()
                    })
                    .unwrap_or_default(),
                os: format!(
                    "{} {} ({})",
                    node["os"]["name"].as_str().unwrap_or("unknown"),
                    node["os"]["version"].as_str().unwrap_or(""),
                    node["os"]["arch"].as_str().unwrap_or("")
                ),
                jvm: format!(
                    "{} ({})",
                    node["jvm"]["version"].as_str().unwrap_or("unknown"),
                    node["jvm"]["vm_name"].as_str().unwrap_or("")
                ),
            });
        }
    }

    ClusterInfo {
        name: nodes["cluster_name"].as_str().unwrap_or("unknown").to_string(),
        status: health["status"].as_str().unwrap_or("unknown").to_string(),
        number_of_nodes: health["number_of_nodes"].as_i64().unwrap_or(0),
        active_primary_shards: health["active_primary_shards"].as_i64().unwrap_or(0),
        active_shards: health["active_shards"].as_i64().unwrap_or(0),
        relocating_shards: health["relocating_shards"].as_i64().unwrap_or(0),
        initializing_shards: health["initializing_shards"].as_i64().unwrap_or(0),
        unassigned_shards: health["unassigned_shards"].as_i64().unwrap_or(0),
        version: nodes["nodes"]
            .as_object()
            .and_then(|node_map| node_map.values().next())
            .and_then(|node| node["version"].as_str())
            .unwrap_or("unknown")
            .to_string(),
        nodes: node_infos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_index_infos_from_cat_rows() {
        let rows = vec![json!({
            "index": "logs-2024",
            "docs.count": "1200",
            "store.size": "4096",
            "health": "green",
            "status": "open",
            "uuid": "abc123",
            "creation.date": "1700000000000"
        })];
        let parsed = parse_index_infos(&rows);
        assert_eq!(parsed[0].name, "logs-2024");
        assert_eq!(parsed[0].docs_count, 1200);
        assert_eq!(parsed[0].size_in_bytes, 4096);
        assert_eq!(parsed[0].health, "green");
    }

    #[test]
    fn test_parse_index_infos_tolerates_missing_fields() {
        let rows = vec![json!({"index": "sparse"})];
        let parsed = parse_index_infos(&rows);
        assert_eq!(parsed[0].docs_count, 0);
        assert_eq!(parsed[0].health, "unknown");
    }

    #[test]
    fn test_parse_shard_infos() {
        let rows = vec![json!({
            "index": "logs",
            "shard": "0",
            "prirep": "p",
            "state": "STARTED",
            "docs": "42",
            "store": "10kb",
            "node": "node-1"
        })];
        let parsed = parse_shard_infos(&rows);
        assert_eq!(parsed[0].shard, 0);
        assert_eq!(parsed[0].docs, Some(42));
        assert_eq!(parsed[0].node.as_deref(), Some("node-1"));
    }

    #[test]
    fn test_merge_cluster_info() {
        let health = json!({
            "status": "yellow",
            "number_of_nodes": 2,
            "active_primary_shards": 5,
            "active_shards": 8,
            "relocating_shards": 0,
            "initializing_shards": 1,
            "unassigned_shards": 2
        });
        let nodes = json!({
            "cluster_name": "prod",
            "nodes": {
                "n1": {
                    "name": "node-1",
                    "version": "8.12.0",
                    "roles": ["master", "data"],
                    "os": {"name": "Linux", "version": "6.1", "arch": "x86_64"},
                    "jvm": {"version": "21", "vm_name": "OpenJDK"}
                }
            }
        });

        let info = merge_cluster_info(&health, &nodes);
        assert_eq!(info.name, "prod");
        assert_eq!(info.status, "yellow");
        assert_eq!(info.version, "8.12.0");
        assert_eq!(info.nodes[0].roles, vec!["master", "data"]);
        assert_eq!(info.nodes[0].os, "Linux 6.1 (x86_64)");
    }
}
