//! Request and response types for the document intelligence API
//!
//! These mirror the server's JSON contracts field for field. Responses are
//! deserialized leniently: unknown fields are ignored and optional fields
//! tolerate absence, so minor server-side additions do not break the client.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Credentials for username/password login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Store the token in the persistent scope instead of the session scope
    pub remember_me: bool,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    pub fn remembered(mut self) -> Self {
        self.remember_me = true;
        self
    }
}

/// Successful login payload, shared by password and guest login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Role attached to a user profile
#[derive(Debug, Clone, Deserialize)]
pub struct UserRole {
    pub name: String,
    pub display_name: String,
}

/// Public profile of the authenticated user
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<UserRole>,
    pub last_login: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub is_guest: bool,
}

impl UserProfile {
    /// Preferred display name: full name when set, otherwise the username
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

/// New-account registration form
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenRefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LogoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Result of asking the server whether a stored token is still usable
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
    /// Unix timestamp of token expiry, present when valid
    pub expires_at: Option<i64>,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

/// Summary row returned by listing and search endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeItem {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub source_file: Option<String>,
    /// Comma-separated tag list as stored server-side
    pub tags: Option<String>,
    pub view_count: i64,
    pub created_at: NaiveDateTime,
}

impl KnowledgeItem {
    /// Split the comma-separated tag field into trimmed, non-empty tags
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Full knowledge entry, including the analyzed content body
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub source_file: Option<String>,
    pub source_type: String,
    pub tags: Option<String>,
    pub created_by: i64,
    pub is_active: bool,
    pub view_count: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

/// Knowledge search filter; all criteria are optional
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    /// Server accepts 1..=50
    pub limit: u32,
}

impl SearchRequest {
    /// Free-text search with the server's default page size
    pub fn query(text: impl Into<String>) -> Self {
        Self {
            query: Some(text.into()),
            tags: None,
            source_type: None,
            limit: 10,
        }
    }

    /// Listing of analyzed documents, used to populate the ask-context selector
    pub fn document_listing(limit: u32) -> Self {
        Self {
            query: None,
            tags: None,
            source_type: Some("document_analysis".to_string()),
            limit,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub knowledge_items: Vec<KnowledgeItem>,
    pub total: i64,
    pub query: String,
}

/// Question submitted to the ask endpoints
#[derive(Debug, Clone, Serialize)]
pub struct AskRequest {
    pub question: String,
    /// Restrict answering context to these knowledge entries; empty means all
    pub knowledge_ids: Vec<i64>,
}

impl AskRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            knowledge_ids: Vec::new(),
        }
    }

    pub fn scoped(question: impl Into<String>, knowledge_ids: Vec<i64>) -> Self {
        Self {
            question: question.into(),
            knowledge_ids,
        }
    }
}

/// A stored question/answer pair, as returned by the non-streaming ask
/// endpoint and the history listing
#[derive(Debug, Clone, Deserialize)]
pub struct QaRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub knowledge_id: Option<i64>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
    /// Server-measured answer latency in milliseconds
    pub response_time: Option<i64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QaHistory {
    pub history: Vec<QaRecord>,
    pub total: i64,
}

/// Thumbs-up/down feedback on a stored answer
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRequest {
    pub qa_id: i64,
    pub is_helpful: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Curated question shown before the user has asked anything
#[derive(Debug, Clone, Deserialize)]
pub struct PresetQuestion {
    pub id: i64,
    pub question: String,
    pub category: Option<String>,
    pub order_index: i64,
    pub is_active: bool,
    pub click_count: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeStats {
    pub total_knowledge: i64,
    pub total_qa: i64,
    pub active_knowledge: i64,
    pub popular_tags: Vec<String>,
    pub recent_questions: Vec<String>,
}

/// Export container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Xml,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Xml => "xml",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub format: ExportFormat,
    pub include_qa: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportResponse {
    pub download_url: String,
    pub filename: String,
    pub total_items: i64,
    pub export_format: String,
}

/// Generic `{ "message": … }` acknowledgment used by several endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Which analysis the server should run on an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    /// Plain-text summary
    #[default]
    Text,
    /// XML-structured summary
    Xml,
}

/// Result of uploading a document for analysis
///
/// The text endpoint fills `analysis`, the XML endpoint fills `xml_analysis`;
/// `analysis_text` returns whichever is present.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub size: Option<u64>,
    pub analysis: Option<String>,
    pub xml_analysis: Option<String>,
    pub xml_file: Option<String>,
    pub download_url: Option<String>,
    /// Set when the analysis was also stored as a knowledge entry
    pub knowledge_id: Option<i64>,
    pub status: String,
}

impl UploadResponse {
    pub fn analysis_text(&self) -> Option<&str> {
        self.analysis.as_deref().or(self.xml_analysis.as_deref())
    }
}

/// Result of a batch upload; the server merges all files into one analysis
#[derive(Debug, Clone, Deserialize)]
pub struct BatchUploadResponse {
    pub message: String,
    pub processed_files: Vec<String>,
    pub total_files: u32,
    pub analysis: Option<String>,
    pub xml_analysis: Option<String>,
    pub xml_file: Option<String>,
    pub download_url: Option<String>,
    pub knowledge_id: Option<i64>,
    pub status: String,
}

impl BatchUploadResponse {
    pub fn analysis_text(&self) -> Option<&str> {
        self.analysis.as_deref().or(self.xml_analysis.as_deref())
    }
}

/// One generated analysis file on the server
#[derive(Debug, Clone, Deserialize)]
pub struct ResultEntry {
    pub filename: String,
    pub size: u64,
    /// Formatted server-local time, already human readable
    pub created_time: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsResponse {
    pub message: String,
    pub total: i64,
    pub results: Vec<ResultEntry>,
}

/// Document service health probe
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    pub timestamp: String,
    pub upload_folder_exists: bool,
    pub results_folder_exists: bool,
    pub openai_key_configured: bool,
}

// ---------------------------------------------------------------------------
// GraphRAG
// ---------------------------------------------------------------------------

/// State of the graph retrieval index
#[derive(Debug, Clone, Deserialize)]
pub struct IndexStatus {
    pub graphrag_available: bool,
    pub api_key_configured: bool,
    pub index_exists: bool,
    pub workspace_path: String,
    pub artifact_count: Option<i64>,
    /// Unix mtime (fractional seconds) of the newest index artifact
    pub last_modified: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_ids: Option<Vec<i64>>,
    pub rebuild: bool,
}

/// Acknowledgment that an index build was started in the background
#[derive(Debug, Clone, Deserialize)]
pub struct BuildAccepted {
    pub message: String,
    pub documents_count: i64,
    pub status: String,
}

/// Graph search strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphSearchKind {
    /// Community-level reasoning over the whole graph
    Global,
    /// Entity-neighborhood search
    Local,
    /// Global and local combined
    #[default]
    Hybrid,
}

impl GraphSearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphSearchKind::Global => "global",
            GraphSearchKind::Local => "local",
            GraphSearchKind::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphSearchRequest {
    pub query: String,
    pub search_type: GraphSearchKind,
    pub max_tokens: u32,
}

impl GraphSearchRequest {
    pub fn new(query: impl Into<String>, search_type: GraphSearchKind) -> Self {
        Self {
            query: query.into(),
            search_type,
            max_tokens: 2000,
        }
    }
}

/// Graph search outcome
///
/// Hybrid searches nest a global and a local result instead of carrying a
/// single `response`; failed searches carry `error`/`message` with
/// `success == false`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphSearchResult {
    pub success: bool,
    pub query: Option<String>,
    pub response: Option<String>,
    pub search_type: Option<String>,
    pub global_search: Option<Box<GraphSearchResult>>,
    pub local_search: Option<Box<GraphSearchResult>>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl GraphSearchResult {
    /// The primary answer text, digging into the global then local half of a
    /// hybrid result when no top-level response exists
    pub fn answer_text(&self) -> Option<&str> {
        if let Some(response) = self.response.as_deref() {
            return Some(response);
        }
        self.global_search
            .as_deref()
            .and_then(|g| g.answer_text())
            .or_else(|| self.local_search.as_deref().and_then(|l| l.answer_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- tag splitting ---

    #[test]
    fn test_tag_list_splits_and_trims() {
        let item = KnowledgeItem {
            id: 1,
            title: "t".into(),
            summary: None,
            source_file: None,
            tags: Some("ai, search , ,graph".into()),
            view_count: 0,
            created_at: NaiveDateTime::default(),
        };
        assert_eq!(item.tag_list(), vec!["ai", "search", "graph"]);
    }

    #[test]
    fn test_tag_list_empty_when_unset() {
        let item = KnowledgeItem {
            id: 1,
            title: "t".into(),
            summary: None,
            source_file: None,
            tags: None,
            view_count: 0,
            created_at: NaiveDateTime::default(),
        };
        assert!(item.tag_list().is_empty());
    }

    // --- serde shapes ---

    #[test]
    fn test_ask_request_serializes_ids() {
        let req = AskRequest::scoped("What is X?", vec![3, 7]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["question"], "What is X?");
        assert_eq!(json["knowledge_ids"], serde_json::json!([3, 7]));
    }

    #[test]
    fn test_search_request_omits_unset_filters() {
        let req = SearchRequest::query("contracts");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["query"], "contracts");
        assert_eq!(json["limit"], 10);
        assert!(json.get("tags").is_none());
        assert!(json.get("source_type").is_none());
    }

    #[test]
    fn test_graph_search_kind_wire_names() {
        let req = GraphSearchRequest::new("q", GraphSearchKind::Hybrid);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["search_type"], "hybrid");
        assert_eq!(json["max_tokens"], 2000);
    }

    #[test]
    fn test_upload_response_text_or_xml_analysis() {
        let text: UploadResponse = serde_json::from_value(serde_json::json!({
            "message": "done",
            "filename": "a.txt",
            "size": 10,
            "analysis": "summary here",
            "xml_file": "analysis_a.xml",
            "download_url": "/api/document/download/analysis_a.xml",
            "knowledge_id": null,
            "status": "success"
        }))
        .unwrap();
        assert_eq!(text.analysis_text(), Some("summary here"));

        let xml: UploadResponse = serde_json::from_value(serde_json::json!({
            "message": "done",
            "filename": "a.txt",
            "size": 10,
            "xml_analysis": "<summary/>",
            "xml_file": "xml_analysis_a.xml",
            "download_url": "/api/document/download/xml_analysis_a.xml",
            "status": "success"
        }))
        .unwrap();
        assert_eq!(xml.analysis_text(), Some("<summary/>"));
    }

    #[test]
    fn test_naive_datetime_parses_isoformat() {
        let rec: QaRecord = serde_json::from_value(serde_json::json!({
            "id": 5,
            "question": "q",
            "answer": "a",
            "knowledge_id": null,
            "session_id": null,
            "is_guest": false,
            "response_time": 1200,
            "created_at": "2025-03-14T09:26:53.589793"
        }))
        .unwrap();
        assert_eq!(rec.response_time, Some(1200));
    }

    #[test]
    fn test_hybrid_result_answer_prefers_global() {
        let result: GraphSearchResult = serde_json::from_value(serde_json::json!({
            "success": true,
            "query": "q",
            "global_search": {
                "success": true,
                "query": "q",
                "response": "global answer",
                "search_type": "global"
            },
            "local_search": {
                "success": true,
                "query": "q",
                "response": "local answer",
                "search_type": "local"
            },
            "search_type": "hybrid"
        }))
        .unwrap();
        assert_eq!(result.answer_text(), Some("global answer"));
    }
}
