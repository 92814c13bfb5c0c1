//! Document upload and analysis endpoints
//!
//! Uploads are multipart; the server extracts text, runs the AI analysis and
//! stores the result as a knowledge entry. Size and extension limits are
//! enforced here before any bytes leave the machine, mirroring the server's
//! own rejection rules so the failure is immediate and costs no bandwidth.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::{
    AnalysisMode, BatchUploadResponse, ResultsResponse, ServiceHealth, UploadResponse,
};

/// Server rejects request bodies above this size.
pub const MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

/// Extensions the server knows how to extract text from.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["txt", "pdf", "docx", "doc"];

/// Batch uploads beyond this count are refused server-side.
pub const MAX_BATCH_FILES: usize = 10;

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidRequest(format!("not a file path: {}", path.display())))
}

fn check_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    match ext {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(Error::InvalidRequest(format!(
            "unsupported file type '{}' (supported: {})",
            path.display(),
            ALLOWED_EXTENSIONS.join(", ")
        ))),
    }
}

async fn read_for_upload(path: &Path) -> Result<(String, Vec<u8>)> {
    check_extension(path)?;
    let name = file_name_of(path)?;
    let meta = tokio::fs::metadata(path).await?;
    if meta.len() > MAX_UPLOAD_BYTES {
        return Err(Error::InvalidRequest(format!(
            "{name} is {} bytes, above the {MAX_UPLOAD_BYTES} byte upload limit",
            meta.len()
        )));
    }
    let bytes = tokio::fs::read(path).await?;
    Ok((name, bytes))
}

impl Client {
    /// Upload one document for analysis
    ///
    /// The server replies with a formatted summary in text mode and a
    /// structured report plus a downloadable artifact in XML mode; both
    /// arrive through the same response shape.
    pub async fn upload_document(
        &self,
        path: impl AsRef<Path>,
        mode: AnalysisMode,
    ) -> Result<UploadResponse> {
        self.require_token()?;
        let (name, bytes) = read_for_upload(path.as_ref()).await?;
        debug!(file = %name, size = bytes.len(), ?mode, "uploading document");

        let endpoint = match mode {
            AnalysisMode::Text => "/api/document/upload",
            AnalysisMode::Xml => "/api/document/upload-xml",
        };
        let form = Form::new().part("file", Part::bytes(bytes).file_name(name));
        self.send_json(self.post(endpoint).multipart(form)).await
    }

    /// Upload several documents for one combined analysis
    pub async fn upload_batch(
        &self,
        paths: &[impl AsRef<Path>],
        mode: AnalysisMode,
    ) -> Result<BatchUploadResponse> {
        self.require_token()?;
        if paths.is_empty() {
            return Err(Error::InvalidRequest("no files to upload".to_string()));
        }
        if paths.len() > MAX_BATCH_FILES {
            return Err(Error::InvalidRequest(format!(
                "batch of {} files exceeds the {MAX_BATCH_FILES} file limit",
                paths.len()
            )));
        }

        let mut form = Form::new();
        for path in paths {
            let (name, bytes) = read_for_upload(path.as_ref()).await?;
            form = form.part("files", Part::bytes(bytes).file_name(name));
        }

        let endpoint = match mode {
            AnalysisMode::Text => "/api/document/batch-upload",
            AnalysisMode::Xml => "/api/document/batch-upload-xml",
        };
        self.send_json(self.post(endpoint).multipart(form)).await
    }

    /// List analysis artifacts available for download
    pub async fn analysis_results(&self) -> Result<ResultsResponse> {
        self.require_token()?;
        self.send_json(self.get("/api/document/results")).await
    }

    /// Fetch a generated analysis artifact by name
    pub async fn download_result(&self, filename: &str) -> Result<Vec<u8>> {
        self.require_token()?;
        let response = self
            .get(&format!("/api/document/download/{filename}"))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Liveness of the document analysis service
    pub async fn document_health(&self) -> Result<ServiceHealth> {
        self.send_json(self.get("/api/document/health")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_doc(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    // --- client-side validation ---

    #[tokio::test]
    async fn test_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_doc(&dir, "notes.md", b"hello");
        let client = Client::new("http://localhost:1").with_token("t");

        let err = client
            .upload_document(&path, AnalysisMode::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        assert!(err.to_string().contains("unsupported file type"));
    }

    #[tokio::test]
    async fn test_rejects_oversized_batch() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (0..11)
            .map(|i| temp_doc(&dir, &format!("doc{i}.txt"), b"x"))
            .collect();
        let client = Client::new("http://localhost:1").with_token("t");

        let err = client
            .upload_batch(&paths, AnalysisMode::Text)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("file limit"));
    }

    #[tokio::test]
    async fn test_upload_requires_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_doc(&dir, "doc.txt", b"hello");
        let client = Client::new("http://localhost:1");

        let err = client
            .upload_document(&path, AnalysisMode::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingToken));
    }

    // --- wire round trips ---

    #[tokio::test]
    async fn test_upload_text_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/document/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "文档分析完成",
                "filename": "doc.txt",
                "size": 5,
                "analysis": "A short note.",
                "knowledge_id": 42,
                "status": "success"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = temp_doc(&dir, "doc.txt", b"hello");
        let client = Client::new(server.uri()).with_token("t");

        let response = client.upload_document(&path, AnalysisMode::Text).await.unwrap();
        assert_eq!(response.filename, "doc.txt");
        assert_eq!(response.analysis_text(), Some("A short note."));
        assert_eq!(response.knowledge_id, Some(42));
    }

    #[tokio::test]
    async fn test_upload_xml_mode_uses_xml_report() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/document/upload-xml"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "XML分析完成",
                "filename": "doc.pdf",
                "xml_analysis": "<summary>ok</summary>",
                "xml_file": "analysis_20250601.xml",
                "download_url": "/api/document/download/analysis_20250601.xml",
                "status": "success"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let path = temp_doc(&dir, "doc.pdf", b"%PDF-");
        let client = Client::new(server.uri()).with_token("t");

        let response = client.upload_document(&path, AnalysisMode::Xml).await.unwrap();
        assert_eq!(response.analysis_text(), Some("<summary>ok</summary>"));
        assert!(response.download_url.is_some());
    }

    #[tokio::test]
    async fn test_download_result_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/document/download/report.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<xml/>", "application/xml"))
            .mount(&server)
            .await;

        let client = Client::new(server.uri()).with_token("t");
        let bytes = client.download_result("report.xml").await.unwrap();
        assert_eq!(bytes, b"<xml/>");
    }
}
