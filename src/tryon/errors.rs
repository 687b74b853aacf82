use axum::http::StatusCode;

use crate::app::models::api_error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum TryOnError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("job submission failed (status: {status_code:?}, body: {body:?})")]
    Submission {
        status_code: Option<StatusCode>,
        body: Option<String>,
    },
    #[error("unexpected response from remote service: {0}")]
    Protocol(String),
    #[error("remote job failed: {0}")]
    RemoteFailure(String),
    #[error("no result after {attempts} poll attempts")]
    TimedOut { attempts: u32 },
    #[error("request was cancelled")]
    Cancelled,
}

impl TryOnError {
    pub fn value(&self) -> ApiError {
        match self {
            Self::Validation(reason) => ApiError {
                code: StatusCode::BAD_REQUEST,
                message: reason.to_string(),
                error: Some("validation_error".to_string()),
            },
            Self::Submission { status_code, .. } => ApiError {
                code: StatusCode::BAD_GATEWAY,
                message: match status_code {
                    Some(code) => format!("Try-on service rejected the job ({}).", code),
                    None => "Could not reach the try-on service.".to_string(),
                },
                error: Some("submission_error".to_string()),
            },
            Self::Protocol(reason) => ApiError {
                code: StatusCode::BAD_GATEWAY,
                message: reason.to_string(),
                error: Some("protocol_error".to_string()),
            },
            Self::RemoteFailure(reason) => ApiError {
                code: StatusCode::BAD_GATEWAY,
                message: "Try-on service failed to process the images.".to_string(),
                error: Some(reason.to_string()),
            },
            Self::TimedOut { attempts } => ApiError {
                code: StatusCode::GATEWAY_TIMEOUT,
                message: format!(
                    "No result after {} attempts. The try-on model may be starting up, try again in a minute.",
                    attempts
                ),
                error: Some("timed_out".to_string()),
            },
            Self::Cancelled => ApiError {
                code: StatusCode::SERVICE_UNAVAILABLE,
                message: "Request was cancelled.".to_string(),
                error: Some("cancelled".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failure_carries_reason_in_error_field() {
        let api_error = TryOnError::RemoteFailure("CUDA out of memory".to_string()).value();

        assert_eq!(api_error.code, StatusCode::BAD_GATEWAY);
        assert_eq!(api_error.error.as_deref(), Some("CUDA out of memory"));
    }

    #[test]
    fn timed_out_hints_at_cold_start() {
        let api_error = TryOnError::TimedOut { attempts: 60 }.value();

        assert_eq!(api_error.code, StatusCode::GATEWAY_TIMEOUT);
        assert!(api_error.message.contains("starting up"));
    }
}
