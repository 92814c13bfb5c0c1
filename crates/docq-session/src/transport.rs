//! Transport abstraction for opening answer streams

use async_trait::async_trait;
use docq_api::{AnswerEventStream, AskRequest, Client};

/// Opens the event stream for one question
///
/// The session owns the read loop and all state transitions; a transport only
/// turns a question into a stream of [`docq_api::AnswerEvent`]s. Failing the
/// call (rather than the stream) means the request never produced events,
/// which the session treats as a transport failure.
#[async_trait]
pub trait AskTransport: Send + Sync {
    /// Open a streaming answer for a question scoped to the given knowledge ids
    async fn ask(&self, question: &str, knowledge_ids: &[i64]) -> docq_api::Result<AnswerEventStream>;
}

/// Transport backed by the HTTP API client
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AskTransport for HttpTransport {
    async fn ask(&self, question: &str, knowledge_ids: &[i64]) -> docq_api::Result<AnswerEventStream> {
        let request = AskRequest::scoped(question, knowledge_ids.to_vec());
        self.client.ask_stream(&request).await
    }
}
