/// Identifies one remote job. Only meaningful until the job reaches a
/// terminal state or the poll budget runs out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub event_id: String,
    pub endpoint: String,
}

impl JobHandle {
    pub fn new(event_id: String, endpoint: &str) -> Self {
        Self {
            event_id,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    pub fn status_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.event_id)
    }
}
