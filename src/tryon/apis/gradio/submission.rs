use std::sync::Arc;

use crate::tryon::{
    errors::TryOnError,
    models::{image_payload::ImagePayload, job_handle::JobHandle},
};

use super::{
    enums::image_encoding::ImageEncoding,
    structs::gradio_call_response::GradioCallResponse,
    transport::{GradioTransport, SubmissionBody},
};

const MAX_LOGGED_BODY_CHARS: usize = 512;

/// Creates remote jobs. Never retries a call: a repeated submission would
/// start a second job on the Space.
pub struct JobSubmissionClient {
    transport: Arc<dyn GradioTransport>,
    endpoints: Vec<String>,
    encoding: ImageEncoding,
}

impl JobSubmissionClient {
    pub fn new(
        transport: Arc<dyn GradioTransport>,
        endpoints: Vec<String>,
        encoding: ImageEncoding,
    ) -> Self {
        Self {
            transport,
            endpoints,
            encoding,
        }
    }

    /// Tries each endpoint in order until one accepts the job. Only
    /// submission failures move on to the next endpoint; the last one is
    /// returned if none accepts.
    pub async fn submit(
        &self,
        human: &ImagePayload,
        garment: &ImagePayload,
    ) -> Result<JobHandle, TryOnError> {
        human.validate("human image")?;
        garment.validate("garment image")?;

        tracing::debug!(
            "submitting job (human: {} bytes, garment: {} bytes, encoding: {})",
            human.len(),
            garment.len(),
            self.encoding.value()
        );

        let body = self.encoding.encode(human, garment);
        let mut last_error = None;

        for endpoint in &self.endpoints {
            match self.submit_to(endpoint, body.clone()).await {
                Ok(handle) => return Ok(handle),
                Err(e @ TryOnError::Submission { .. }) => {
                    tracing::warn!("submit to {} failed: {}", endpoint, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            TryOnError::Protocol("no submission endpoints configured".to_string())
        }))
    }

    async fn submit_to(
        &self,
        endpoint: &str,
        body: SubmissionBody,
    ) -> Result<JobHandle, TryOnError> {
        let res = match self.transport.post(endpoint, body).await {
            Ok(res) => res,
            Err(e) => {
                return Err(TryOnError::Submission {
                    status_code: None,
                    body: Some(e.to_string()),
                })
            }
        };

        if !res.status.is_success() {
            return Err(TryOnError::Submission {
                status_code: Some(res.status),
                body: Some(truncate(&res.body)),
            });
        }

        match serde_json::from_str::<GradioCallResponse>(&res.body) {
            Ok(call) if is_valid_event_id(&call.event_id) => {
                tracing::debug!("job {} accepted by {}", call.event_id, endpoint);
                Ok(JobHandle::new(call.event_id, endpoint))
            }
            _ => {
                tracing::error!("submit_to (1): {:?}", truncate(&res.body));
                Err(TryOnError::Protocol(
                    "try-on service response did not contain an event id".to_string(),
                ))
            }
        }
    }
}

/// Event ids become a path segment of the status url.
fn is_valid_event_id(event_id: &str) -> bool {
    !event_id.is_empty()
        && event_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_LOGGED_BODY_CHARS).collect()
}
