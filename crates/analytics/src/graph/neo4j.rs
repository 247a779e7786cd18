//! Neo4j store over the HTTP transactional endpoint
//!
//! Statements go to `/db/{database}/tx/commit`, which needs Neo4j 4.0 or
//! later. 3.x servers only serve `/db/data/transaction` and are rejected
//! with a 404.

use super::{GraphStore, Row};
use crate::queries::{PreparedQuery, QueryId};
use async_trait::async_trait;
use scholargraph_common::config::GraphConfig;
use scholargraph_common::errors::{AppError, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<StatementError>,
}

#[derive(Deserialize)]
struct StatementResult {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<DataRow>,
}

#[derive(Deserialize)]
struct DataRow {
    #[serde(default)]
    row: Vec<Value>,
}

#[derive(Deserialize)]
struct StatementError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Neo4j graph store
pub struct Neo4jStore {
    client: reqwest::Client,
    endpoint: String,
    user: String,
    password: Option<String>,
}

impl Neo4jStore {
    pub fn new(config: &GraphConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        let endpoint = format!(
            "{}/db/{}/tx/commit",
            config.uri.trim_end_matches('/'),
            config.database
        );

        Ok(Self {
            client,
            endpoint,
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn execute(&self, query: &PreparedQuery) -> Result<Vec<Row>> {
        let payload = json!({
            "statements": [{
                "statement": query.id.cypher(),
                "parameters": query.parameters(),
            }]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.user, self.password.as_deref())
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::GraphConnection {
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AppError::GraphConnection {
            message: e.to_string(),
        })?;
        debug!(status = status.as_u16(), query = query.id.name(), "Graph store response");

        if !status.is_success() {
            return Err(AppError::GraphQuery {
                query: query.id.name().to_string(),
                message: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        parse_response(query.id, &body)
    }

    fn name(&self) -> &str {
        "neo4j"
    }
}

/// Flatten a transactional commit response into column-keyed rows
pub fn parse_response(query: QueryId, body: &str) -> Result<Vec<Row>> {
    let response: CommitResponse = serde_json::from_str(body).map_err(|e| AppError::GraphQuery {
        query: query.name().to_string(),
        message: format!("Malformed response: {}", e),
    })?;

    if let Some(error) = response.errors.first() {
        return Err(AppError::GraphQuery {
            query: query.name().to_string(),
            message: format!("{}: {}", error.code, error.message),
        });
    }

    let Some(result) = response.results.into_iter().next() else {
        return Ok(Vec::new());
    };

    let columns = result.columns;
    Ok(result
        .data
        .into_iter()
        .map(|data| columns.iter().cloned().zip(data.row).collect::<Row>())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows() {
        let body = r#"{
            "results": [{
                "columns": ["dataset", "usage_count"],
                "data": [
                    {"row": ["MNIST", 12], "meta": [null, null]},
                    {"row": ["COCO", 7], "meta": [null, null]}
                ]
            }],
            "errors": []
        }"#;

        let rows = parse_response(QueryId::TopDatasets, body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["dataset"], "MNIST");
        assert_eq!(rows[1]["usage_count"], 7);
    }

    #[test]
    fn test_parse_statement_error() {
        let body = r#"{
            "results": [],
            "errors": [{"code": "Neo.ClientError.Statement.SyntaxError", "message": "bad"}]
        }"#;

        let err = parse_response(QueryId::UsageByVenue, body).unwrap_err();
        match err {
            AppError::GraphQuery { query, message } => {
                assert_eq!(query, "usage_by_venue");
                assert!(message.contains("SyntaxError"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_results() {
        let rows = parse_response(QueryId::TopAuthors, r#"{"results": [], "errors": []}"#).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_malformed_body() {
        assert!(parse_response(QueryId::TopDatasets, "<html>").is_err());
    }

    #[test]
    fn test_endpoint() {
        let config = GraphConfig {
            uri: "http://graph:7474/".into(),
            user: "neo4j".into(),
            password: Some("secret".into()),
            database: "scholar".into(),
            timeout_secs: 5,
        };
        let store = Neo4jStore::new(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(store.endpoint(), "http://graph:7474/db/scholar/tx/commit");
    }
}
