//! GraphRAG index endpoints
//!
//! Index builds run as a server-side background task; `build_index` only
//! kicks them off. Callers watch `index_status` until `index_exists` flips,
//! there is no completion callback.

use tracing::debug;

use crate::client::Client;
use crate::error::Result;
use crate::types::{
    BuildAccepted, BuildRequest, GraphSearchRequest, GraphSearchResult, IndexStatus,
    MessageResponse,
};

impl Client {
    /// Availability and freshness of the knowledge graph index
    pub async fn index_status(&self) -> Result<IndexStatus> {
        self.require_token()?;
        self.send_json(self.get("/api/graphrag/status")).await
    }

    /// Start an index build over the selected knowledge entries
    ///
    /// An empty selection means every entry the user can see. The accepted
    /// response reports how many documents the build covers, not that the
    /// build finished.
    pub async fn build_index(&self, request: &BuildRequest) -> Result<BuildAccepted> {
        self.require_token()?;
        debug!(rebuild = request.rebuild, "requesting index build");
        self.send_json(self.post("/api/graphrag/build-index").json(request))
            .await
    }

    /// Query the knowledge graph
    pub async fn graph_search(&self, request: &GraphSearchRequest) -> Result<GraphSearchResult> {
        self.require_token()?;
        self.send_json(self.post("/api/graphrag/search").json(request))
            .await
    }

    /// Drop the index artifacts so the next build starts clean
    pub async fn delete_index(&self) -> Result<MessageResponse> {
        self.require_token()?;
        self.send_json(self.delete("/api/graphrag/index")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphSearchKind;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_status_without_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/graphrag/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "graphrag_available": true,
                "api_key_configured": true,
                "index_exists": false,
                "workspace_path": "/srv/graphrag_workspace"
            })))
            .mount(&server)
            .await;

        let client = Client::new(server.uri()).with_token("t");
        let status = client.index_status().await.unwrap();
        assert!(!status.index_exists);
        assert_eq!(status.artifact_count, None);
    }

    #[tokio::test]
    async fn test_build_index_scoped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/graphrag/build-index"))
            .and(body_json(serde_json::json!({
                "knowledge_ids": [3, 9],
                "rebuild": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "GraphRAG索引构建已启动",
                "documents_count": 2,
                "status": "building"
            })))
            .mount(&server)
            .await;

        let client = Client::new(server.uri()).with_token("t");
        let request = BuildRequest {
            knowledge_ids: Some(vec![3, 9]),
            rebuild: true,
        };
        let accepted = client.build_index(&request).await.unwrap();
        assert_eq!(accepted.documents_count, 2);
        assert_eq!(accepted.status, "building");
    }

    #[tokio::test]
    async fn test_hybrid_search_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/graphrag/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "query": "who approves invoices?",
                "search_type": "hybrid",
                "global_search": {
                    "success": true,
                    "response": "Finance leads approve invoices."
                },
                "local_search": {
                    "success": false,
                    "error": "no entities matched"
                }
            })))
            .mount(&server)
            .await;

        let client = Client::new(server.uri()).with_token("t");
        let request = GraphSearchRequest::new("who approves invoices?", GraphSearchKind::Hybrid);
        let result = client.graph_search(&request).await.unwrap();
        assert!(result.success);
        assert_eq!(result.answer_text(), Some("Finance leads approve invoices."));
    }
}
