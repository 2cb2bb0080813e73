//! Value types mirrored from the cluster REST API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity of one configured connection, as shown in the connection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub id: String,
    pub name: String,
    pub hosts: Vec<String>,
    pub is_active: bool,
}

/// One row of `_cat/indices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub docs_count: i64,
    pub size_in_bytes: i64,
    pub health: String,
    pub status: String,
    pub uuid: String,
    pub creation_date: String,
}

/// Cluster health plus per-node summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterInfo {
    pub name: String,
    pub status: String,
    pub number_of_nodes: i64,
    pub active_primary_shards: i64,
    pub active_shards: i64,
    pub relocating_shards: i64,
    pub initializing_shards: i64,
    pub unassigned_shards: i64,
    pub version: String,
    pub nodes: Vec<NodeInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub version: String,
    pub roles: Vec<String>,
    pub os: String,
    pub jvm: String,
}

/// The raw `_cluster/health` document, typed selectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: String,
    pub number_of_nodes: i64,
    pub number_of_data_nodes: i64,
    pub active_primary_shards: i64,
    pub active_shards: i64,
    pub relocating_shards: i64,
    pub initializing_shards: i64,
    pub unassigned_shards: i64,
    #[serde(default)]
    pub active_shards_percent_as_number: f64,
}

/// One row of `_cat/shards`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardInfo {
    pub index: String,
    pub shard: i64,
    pub prirep: String,
    pub state: String,
    pub docs: Option<i64>,
    pub store: Option<String>,
    pub node: Option<String>,
}

/// A registered snapshot repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRepository {
    pub name: String,
    #[serde(rename = "type")]
    pub repository_type: String,
    pub settings: Value,
}

/// One snapshot inside a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot: String,
    #[serde(default)]
    pub uuid: String,
    pub state: String,
    #[serde(default)]
    pub indices: Vec<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// A `_search` response, typed down to the hit level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub took: i64,
    #[serde(default)]
    pub timed_out: bool,
    pub hits: Hits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hits {
    pub total: HitsTotal,
    #[serde(default)]
    pub max_score: Option<f64>,
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitsTotal {
    pub value: i64,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_response_deserializes() {
        let body = json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": {"value": 2, "relation": "eq"},
                "max_score": 1.0,
                "hits": [
                    {"_index": "logs", "_id": "1", "_score": 1.0, "_source": {"level": "warn"}},
                    {"_index": "logs", "_id": "2", "_score": null, "_source": {"level": "info"}}
                ]
            }
        });

        let response: SearchResponse = serde_json::from_value(body).expect("parse");
        assert_eq!(response.took, 3);
        assert_eq!(response.hits.total.value, 2);
        assert_eq!(response.hits.hits[0].id, "1");
        assert_eq!(response.hits.hits[1].score, None);
        assert_eq!(response.hits.hits[0].source["level"], "warn");
    }

    #[test]
    fn test_hit_source_defaults_to_empty() {
        let hit: SearchHit =
            serde_json::from_value(json!({"_index": "logs", "_id": "1"})).expect("parse");
        assert!(hit.source.is_empty());
    }
}
