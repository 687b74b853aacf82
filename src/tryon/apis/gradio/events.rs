use serde_json::Value;

use crate::tryon::{enums::status_event::StatusEvent, models::result_payload::ResultPayload};

const DATA_PREFIX: &str = "data:";
const EVENT_PREFIX: &str = "event:";

/// Parses a status response into events, in the order they appear.
///
/// Two record shapes are understood:
///
/// * queue messages, `data: {"msg": "process_completed", "output": {...}}`
/// * named events, `event: complete` followed by `data: [...]`
///
/// Records whose payload is not JSON, or whose kind is not recognized, are
/// dropped.
pub fn parse_events(body: &str) -> Vec<StatusEvent> {
    let mut events = Vec::new();
    let mut event_name: Option<&str> = None;

    for line in body.lines() {
        if line.trim().is_empty() {
            event_name = None;
            continue;
        }

        if let Some(name) = line.strip_prefix(EVENT_PREFIX) {
            event_name = Some(name.trim());
            continue;
        }

        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            continue;
        };

        let Ok(value) = serde_json::from_str::<Value>(data.trim()) else {
            continue;
        };

        let event = match value.get("msg").and_then(|msg| msg.as_str()) {
            Some(msg) => from_queue_message(msg, &value),
            None => from_named_event(event_name, &value),
        };

        if let Some(event) = event {
            events.push(event);
        }
    }

    events
}

fn from_queue_message(msg: &str, value: &Value) -> Option<StatusEvent> {
    match msg {
        "process_completed" => {
            let output = value.get("output");

            if value.get("success").and_then(|s| s.as_bool()) == Some(false) {
                let reason = output
                    .and_then(|output| output.get("error"))
                    .and_then(error_message)
                    .unwrap_or_else(|| "process did not complete successfully".to_string());

                return Some(StatusEvent::Failed(reason));
            }

            Some(StatusEvent::Completed(ResultPayload::from_output(output)))
        }
        "error" => Some(StatusEvent::Failed(
            value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(error_message)
                .unwrap_or_else(|| "remote service reported an error".to_string()),
        )),
        "queue_full" => Some(StatusEvent::Failed("remote queue is full".to_string())),
        "progress" => Some(StatusEvent::InProgress(
            value
                .get("progress")
                .or_else(|| value.get("progress_data"))
                .cloned(),
        )),
        "estimation" => Some(StatusEvent::InProgress(value.get("rank_eta").cloned())),
        "process_starts" | "process_generating" | "heartbeat" | "send_hash" | "send_data" => {
            Some(StatusEvent::InProgress(None))
        }
        _ => None,
    }
}

fn from_named_event(event_name: Option<&str>, value: &Value) -> Option<StatusEvent> {
    match event_name? {
        "complete" => Some(StatusEvent::Completed(ResultPayload::from_output(Some(value)))),
        "error" => Some(StatusEvent::Failed(
            error_message(value).unwrap_or_else(|| "remote service reported an error".to_string()),
        )),
        "generating" => Some(StatusEvent::InProgress(Some(value.clone()))),
        "heartbeat" => Some(StatusEvent::InProgress(None)),
        _ => None,
    }
}

fn error_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(message) => Some(message.to_string()),
        other => Some(other.to_string()),
    }
}
