use async_trait::async_trait;
use bytes::Bytes;
use mime::Mime;
use reqwest::{multipart, StatusCode};
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct FilePart {
    pub name: String,
    pub file_name: String,
    pub mime_type: Mime,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub enum SubmissionBody {
    Json(Value),
    Multipart(Vec<FilePart>),
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether the remote side may simply not be ready yet.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Other(e.to_string())
        }
    }
}

/// Network seam between the Gradio client and the remote Space.
#[async_trait]
pub trait GradioTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: SubmissionBody,
    ) -> Result<TransportResponse, TransportError>;

    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

/// Sends requests with a shared `reqwest::Client`; per-attempt timeouts are
/// whatever the client was built with.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GradioTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        body: SubmissionBody,
    ) -> Result<TransportResponse, TransportError> {
        let request = match body {
            SubmissionBody::Json(value) => self.client.post(url).json(&value),
            SubmissionBody::Multipart(parts) => {
                let mut form = multipart::Form::new();

                for part in parts {
                    let file = multipart::Part::bytes(part.data.to_vec())
                        .file_name(part.file_name)
                        .mime_str(part.mime_type.essence_str())?;
                    form = form.part(part.name, file);
                }

                self.client.post(url).multipart(form)
            }
        };

        let res = request.send().await?;
        let status = res.status();
        let body = res.text().await?;

        Ok(TransportResponse { status, body })
    }

    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let res = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;

        Ok(TransportResponse { status, body })
    }
}
