use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use tokio_retry::{strategy::FixedInterval, Retry};

use crate::app::models::api_error::ApiError;

#[derive(Debug)]
pub struct FetchedBytes {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

pub async fn get_bytes_with_retry(
    client: &reqwest::Client,
    url: &str,
) -> Result<FetchedBytes, ApiError> {
    let retry_strategy = FixedInterval::from_millis(1000).take(3);

    Retry::spawn(retry_strategy, || async { get_bytes(client, url).await }).await
}

pub async fn get_bytes(client: &reqwest::Client, url: &str) -> Result<FetchedBytes, ApiError> {
    let result = client.get(url).send().await;

    match result {
        Ok(res) => {
            let res = match res.error_for_status() {
                Ok(res) => res,
                Err(e) => {
                    tracing::warn!("get_bytes (1): {}", e);
                    return Err(fetch_error());
                }
            };

            let content_type = res
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.to_string());

            match res.bytes().await {
                Ok(bytes) => Ok(FetchedBytes {
                    bytes,
                    content_type,
                }),
                Err(e) => {
                    tracing::warn!("get_bytes (2): {}", e);
                    Err(fetch_error())
                }
            }
        }
        Err(e) => {
            tracing::warn!("get_bytes (3): {}", e);
            Err(fetch_error())
        }
    }
}

fn fetch_error() -> ApiError {
    ApiError {
        code: StatusCode::BAD_GATEWAY,
        message: "Failed to fetch image from url.".to_string(),
        error: Some("image_fetch_failed".to_string()),
    }
}
