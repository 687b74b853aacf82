use crate::tryon::errors::TryOnError;

use super::result_payload::ResultPayload;

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Success(ResultPayload),
    Failed(String),
    TimedOut { attempts: u32 },
    Cancelled,
}

impl PollOutcome {
    pub fn into_result(self) -> Result<ResultPayload, TryOnError> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failed(reason) => Err(TryOnError::RemoteFailure(reason)),
            Self::TimedOut { attempts } => Err(TryOnError::TimedOut { attempts }),
            Self::Cancelled => Err(TryOnError::Cancelled),
        }
    }
}
