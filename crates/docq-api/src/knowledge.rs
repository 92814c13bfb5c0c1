//! Knowledge base endpoints: search, QA, presets, stats, export
//!
//! The streaming ask is the interesting one: the other calls are plain
//! request/response, but `ask_stream` returns a live [`AnswerEventStream`]
//! decoded from the chunked response body.

use async_stream::stream;
use futures::StreamExt;

use crate::client::Client;
use crate::error::Result;
use crate::stream::{AnswerEvent, AnswerEventStream, LineDecoder, parse_event_line};
use crate::types::{
    AskRequest, ExportRequest, ExportResponse, FeedbackRequest, KnowledgeDetail, KnowledgeStats,
    MessageResponse, PresetQuestion, QaHistory, QaRecord, SearchRequest, SearchResponse,
};

impl Client {
    /// Search the knowledge base
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.require_token()?;
        self.send_json(self.post("/api/knowledge/search").json(request))
            .await
    }

    /// Fetch one knowledge entry in full; the server counts this as a view
    pub async fn knowledge_item(&self, id: i64) -> Result<KnowledgeDetail> {
        self.require_token()?;
        self.send_json(self.get(&format!("/api/knowledge/items/{id}")))
            .await
    }

    /// Delete a knowledge entry
    pub async fn delete_knowledge_item(&self, id: i64) -> Result<MessageResponse> {
        self.require_token()?;
        self.send_json(self.delete(&format!("/api/knowledge/items/{id}")))
            .await
    }

    /// Ask a question and wait for the complete answer
    pub async fn ask(&self, request: &AskRequest) -> Result<QaRecord> {
        self.require_token()?;
        self.send_json(self.post("/api/knowledge/ask").json(request))
            .await
    }

    /// Ask a question and stream the answer as it is generated
    ///
    /// The returned stream yields zero or more `Content` events followed by
    /// at most one terminal event. Connection failures mid-stream surface as
    /// an `Error` event; a body that ends without any terminal event simply
    /// ends the stream, which consumers treat as abnormal termination.
    pub async fn ask_stream(&self, request: &AskRequest) -> Result<AnswerEventStream> {
        self.require_token()?;
        let response = self
            .post("/api/knowledge/ask-stream")
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let mut bytes = Box::pin(response.bytes_stream());
        Ok(Box::pin(stream! {
            let mut decoder = LineDecoder::new();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        for line in decoder.push(&chunk) {
                            if let Some(event) = parse_event_line(&line) {
                                let terminal = event.is_terminal();
                                yield event;
                                if terminal {
                                    return;
                                }
                            }
                        }
                    }
                    Err(err) => {
                        yield AnswerEvent::Error {
                            data: format!("connection error: {err}"),
                        };
                        return;
                    }
                }
            }
            if let Some(fragment) = decoder.finish() {
                tracing::debug!("discarding unterminated stream fragment: {fragment:?}");
            }
        }))
    }

    /// The caller's recent question/answer records, newest first
    pub async fn qa_history(&self, limit: u32) -> Result<QaHistory> {
        self.require_token()?;
        self.send_json(
            self.get("/api/knowledge/qa-history")
                .query(&[("limit", limit)]),
        )
        .await
    }

    /// Curated starter questions, optionally filtered by category
    pub async fn preset_questions(&self, category: Option<&str>) -> Result<Vec<PresetQuestion>> {
        self.require_token()?;
        let mut builder = self.get("/api/knowledge/preset-questions");
        if let Some(category) = category {
            builder = builder.query(&[("category", category)]);
        }
        self.send_json(builder).await
    }

    /// Record that a preset question was used
    pub async fn click_preset_question(&self, id: i64) -> Result<MessageResponse> {
        self.require_token()?;
        self.send_json(self.post(&format!("/api/knowledge/preset-questions/{id}/click")))
            .await
    }

    /// Knowledge base aggregate counters
    pub async fn knowledge_stats(&self) -> Result<KnowledgeStats> {
        self.require_token()?;
        self.send_json(self.get("/api/knowledge/stats")).await
    }

    /// Export knowledge entries (and optionally QA records) server-side
    pub async fn export_knowledge(&self, request: &ExportRequest) -> Result<ExportResponse> {
        self.require_token()?;
        self.send_json(self.post("/api/knowledge/export").json(request))
            .await
    }

    /// Rate a stored answer
    pub async fn submit_feedback(&self, request: &FeedbackRequest) -> Result<MessageResponse> {
        self.require_token()?;
        self.send_json(self.post("/api/knowledge/feedback").json(request))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn authed_client(server: &MockServer) -> Client {
        Client::new(server.uri()).with_token("tok")
    }

    // --- ask_stream wire contract ---

    #[tokio::test]
    async fn test_ask_stream_yields_content_then_done() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"type\":\"content\",\"data\":\"X is \"}\n",
            "data: {\"type\":\"content\",\"data\":\"a thing.\"}\n",
            "data: {\"type\":\"done\"}\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/knowledge/ask-stream"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(serde_json::json!({
                "question": "What is X?",
                "knowledge_ids": [1]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let request = AskRequest::scoped("What is X?", vec![1]);
        let events: Vec<AnswerEvent> = client.ask_stream(&request).await.unwrap().collect().await;

        assert_eq!(
            events,
            vec![
                AnswerEvent::Content {
                    data: "X is ".into()
                },
                AnswerEvent::Content {
                    data: "a thing.".into()
                },
                AnswerEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_ask_stream_skips_noise_lines() {
        let server = MockServer::start().await;
        let body = concat!(
            "\n",
            ": keepalive\n",
            "data: {malformed\n",
            "data: {\"type\":\"content\",\"data\":\"ok\"}\n",
            "data: {\"type\":\"done\"}\n",
        );
        Mock::given(method("POST"))
            .and(path("/api/knowledge/ask-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let events: Vec<AnswerEvent> = client
            .ask_stream(&AskRequest::new("q"))
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(
            events,
            vec![AnswerEvent::Content { data: "ok".into() }, AnswerEvent::Done]
        );
    }

    #[tokio::test]
    async fn test_ask_stream_ends_without_terminal_event() {
        let server = MockServer::start().await;
        // Body cuts off mid-answer: no done, trailing fragment unterminated
        let body = "data: {\"type\":\"content\",\"data\":\"partial\"}\ndata: {\"type\":\"con";
        Mock::given(method("POST"))
            .and(path("/api/knowledge/ask-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let events: Vec<AnswerEvent> = client
            .ask_stream(&AskRequest::new("q"))
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(
            events,
            vec![AnswerEvent::Content {
                data: "partial".into()
            }]
        );
        assert!(!events.iter().any(|e| e.is_terminal()));
    }

    #[tokio::test]
    async fn test_ask_stream_non_2xx_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/knowledge/ask-stream"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "detail": "问答失败: model unavailable"
            })))
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let err = client.ask_stream(&AskRequest::new("q")).await.err().unwrap();
        match err {
            Error::Api { status, detail } => {
                assert_eq!(status, 500);
                assert!(detail.contains("model unavailable"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ask_stream_without_token() {
        let client = Client::new("http://localhost:1");
        let err = client.ask_stream(&AskRequest::new("q")).await.err().unwrap();
        assert!(matches!(err, Error::MissingToken));
    }

    // --- plain endpoints ---

    #[tokio::test]
    async fn test_search_posts_filters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/knowledge/search"))
            .and(body_json(serde_json::json!({
                "source_type": "document_analysis",
                "limit": 50
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "knowledge_items": [{
                    "id": 2,
                    "title": "文档分析：report.pdf",
                    "summary": "quarterly numbers",
                    "source_file": "report.pdf",
                    "tags": "finance,q3",
                    "view_count": 4,
                    "created_at": "2025-06-01T08:00:00"
                }],
                "total": 1,
                "query": ""
            })))
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let response = client
            .search(&SearchRequest::document_listing(50))
            .await
            .unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.knowledge_items[0].tag_list(), vec!["finance", "q3"]);
    }

    #[tokio::test]
    async fn test_qa_history_passes_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/knowledge/qa-history"))
            .and(wiremock::matchers::query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "history": [],
                "total": 0
            })))
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let history = client.qa_history(5).await.unwrap();
        assert_eq!(history.total, 0);
    }

    #[tokio::test]
    async fn test_feedback_posts_rating() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/knowledge/feedback"))
            .and(body_json(serde_json::json!({
                "qa_id": 17,
                "is_helpful": false,
                "feedback": "answer cited the wrong report"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "反馈已提交"
            })))
            .mount(&server)
            .await;

        let client = authed_client(&server);
        let request = FeedbackRequest {
            qa_id: 17,
            is_helpful: false,
            feedback: Some("answer cited the wrong report".to_string()),
        };
        let response = client.submit_feedback(&request).await.unwrap();
        assert_eq!(response.message, "反馈已提交");
    }
}
