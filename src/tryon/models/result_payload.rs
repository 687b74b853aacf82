use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output artifacts of a completed job, serialized as `{ "data": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub data: Vec<Value>,
}

impl ResultPayload {
    /// Accepts either `{ "data": [...] }` or a bare array.
    pub fn from_output(output: Option<&Value>) -> Self {
        let data = match output {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Object(map)) => match map.get("data") {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        Self { data }
    }

    /// First artifact as something a browser can display: an encoded image
    /// string, or the `url` of a file object.
    pub fn first_image(&self) -> Option<String> {
        match self.data.first()? {
            Value::String(image) => Some(image.to_string()),
            Value::Object(file) => file
                .get("url")
                .and_then(|url| url.as_str())
                .map(|url| url.to_string()),
            _ => None,
        }
    }
}
