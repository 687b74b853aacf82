use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Envy {
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub port: Option<u16>,

    pub gradio_base_url: String,
    #[serde(default = "default_gradio_api_name")]
    pub gradio_api_name: String,
    #[serde(default = "default_gradio_endpoint_templates")]
    pub gradio_endpoint_templates: Vec<String>,
    #[serde(default = "default_gradio_image_encoding")]
    pub gradio_image_encoding: String,
    #[serde(default = "default_gradio_request_timeout_ms")]
    pub gradio_request_timeout_ms: u64,
    #[serde(default = "default_gradio_max_attempts")]
    pub gradio_max_attempts: u32,
    #[serde(default = "default_gradio_poll_interval_ms")]
    pub gradio_poll_interval_ms: u64,

    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_gradio_api_name() -> String {
    "virtual_tryon".to_string()
}

fn default_gradio_endpoint_templates() -> Vec<String> {
    vec![
        "{base}/call/{api_name}".to_string(),
        "{base}/gradio_api/call/{api_name}".to_string(),
    ]
}

fn default_gradio_image_encoding() -> String {
    "data_uri".to_string()
}

fn default_gradio_request_timeout_ms() -> u64 {
    10_000
}

fn default_gradio_max_attempts() -> u32 {
    60
}

fn default_gradio_poll_interval_ms() -> u64 {
    2_000
}

fn default_body_limit_bytes() -> usize {
    20 * 1024 * 1024
}
