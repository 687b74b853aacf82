use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::tryon::{
    enums::status_event::StatusEvent,
    models::{job_handle::JobHandle, poll_outcome::PollOutcome},
};

use super::{
    config::PollPolicy,
    events::parse_events,
    transport::{GradioTransport, TransportError},
};

/// Why one status request was inconclusive. Only costs an attempt and never
/// leaves the poll loop.
#[derive(Debug, thiserror::Error)]
enum TransientPollError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("status request returned {0}")]
    Status(StatusCode),
}

/// Polls a job's status stream until it reaches a terminal event or the
/// attempt budget is spent.
pub struct StatusPoller {
    transport: Arc<dyn GradioTransport>,
    policy: PollPolicy,
}

impl StatusPoller {
    pub fn new(transport: Arc<dyn GradioTransport>, policy: PollPolicy) -> Self {
        Self { transport, policy }
    }

    /// Cancelling `cancel` abandons the job; the remote computation keeps
    /// running.
    pub async fn poll(&self, handle: &JobHandle, cancel: &CancellationToken) -> PollOutcome {
        let url = handle.status_url();
        let max_attempts = self.policy.max_attempts;
        let mut progress: Option<Value> = None;

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                tracing::debug!("stopped polling job {} (cancelled)", handle.event_id);
                return PollOutcome::Cancelled;
            }

            tracing::debug!(
                "checking job {} (attempt {}/{})",
                handle.event_id,
                attempt,
                max_attempts
            );

            if let Ok(events) = self.poll_once(&url).await {
                for event in events {
                    match event {
                        StatusEvent::Completed(payload) => {
                            tracing::debug!("job {} completed", handle.event_id);
                            return PollOutcome::Success(payload);
                        }
                        StatusEvent::Failed(reason) => {
                            tracing::error!("job {} failed: {}", handle.event_id, reason);
                            return PollOutcome::Failed(reason);
                        }
                        StatusEvent::InProgress(Some(hint)) => progress = Some(hint),
                        StatusEvent::InProgress(None) => {}
                    }
                }

                if let Some(progress) = &progress {
                    tracing::debug!("job {} in progress: {}", handle.event_id, progress);
                }
            }

            if attempt == max_attempts {
                break;
            }

            if cancel.is_cancelled() {
                return PollOutcome::Cancelled;
            }

            tokio::select! {
                _ = cancel.cancelled() => return PollOutcome::Cancelled,
                _ = sleep(self.policy.interval) => {}
            }
        }

        tracing::error!(
            "job {} timed out after {} attempts",
            handle.event_id,
            max_attempts
        );

        PollOutcome::TimedOut {
            attempts: max_attempts,
        }
    }

    /// One status request. Every failure here is inconclusive.
    async fn poll_once(&self, url: &str) -> Result<Vec<StatusEvent>, TransientPollError> {
        let res = match self.transport.get(url).await {
            Ok(res) => res,
            Err(e) if e.is_transient() => {
                tracing::debug!("poll_once (1): not ready yet: {}", e);
                return Err(e.into());
            }
            Err(e) => {
                tracing::warn!("poll_once (2): {}", e);
                return Err(e.into());
            }
        };

        if !res.status.is_success() {
            tracing::warn!("poll_once (3): status {}", res.status);
            return Err(TransientPollError::Status(res.status));
        }

        Ok(parse_events(&res.body))
    }
}
