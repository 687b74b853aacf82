use serde_json::Value;

use crate::tryon::models::result_payload::ResultPayload;

#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    InProgress(Option<Value>),
    Completed(ResultPayload),
    Failed(String),
}

