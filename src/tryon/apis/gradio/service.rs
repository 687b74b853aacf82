use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::tryon::{
    errors::TryOnError,
    models::{image_payload::ImagePayload, result_payload::ResultPayload},
};

use super::{
    config::GradioConfig, poller::StatusPoller, submission::JobSubmissionClient,
    transport::GradioTransport,
};

pub struct GradioClient {
    submission: JobSubmissionClient,
    poller: StatusPoller,
}

impl GradioClient {
    pub fn new(transport: Arc<dyn GradioTransport>, config: &GradioConfig) -> Self {
        Self {
            submission: JobSubmissionClient::new(
                transport.clone(),
                config.endpoints.clone(),
                config.encoding,
            ),
            poller: StatusPoller::new(transport, config.poll_policy),
        }
    }

    /// Submits one job and waits for its terminal outcome.
    pub async fn try_on(
        &self,
        human: &ImagePayload,
        garment: &ImagePayload,
        cancel: &CancellationToken,
    ) -> Result<ResultPayload, TryOnError> {
        let handle = self.submission.submit(human, garment).await?;
        let result = self.poller.poll(&handle, cancel).await.into_result()?;

        if result.data.is_empty() {
            tracing::error!("job {} completed without output", handle.event_id);
            return Err(TryOnError::Protocol(
                "Try-on service completed the job without output.".to_string(),
            ));
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use httpmock::{
        Method::{GET, POST},
        MockServer,
    };
    use serde_json::json;

    use super::*;
    use crate::tryon::apis::gradio::{
        config::{render_endpoints, PollPolicy},
        enums::image_encoding::ImageEncoding,
        transport::{
            scripted::{respond, ScriptedTransport},
            ReqwestTransport,
        },
    };

    fn config(base_url: &str, encoding: ImageEncoding) -> GradioConfig {
        let templates = vec![
            "{base}/call/{api_name}".to_string(),
            "{base}/gradio_api/call/{api_name}".to_string(),
        ];

        GradioConfig {
            endpoints: render_endpoints(&templates, base_url, "virtual_tryon").unwrap(),
            encoding,
            request_timeout: Duration::from_secs(5),
            poll_policy: PollPolicy {
                max_attempts: 3,
                interval: Duration::from_millis(10),
            },
        }
    }

    fn client(server: &MockServer, encoding: ImageEncoding) -> GradioClient {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        GradioClient::new(
            Arc::new(ReqwestTransport::new(http)),
            &config(&server.base_url(), encoding),
        )
    }

    fn images() -> (ImagePayload, ImagePayload) {
        (
            ImagePayload::new(Bytes::from_static(b"human"), mime::IMAGE_PNG),
            ImagePayload::new(Bytes::from_static(b"cloth"), mime::IMAGE_JPEG),
        )
    }

    #[tokio::test]
    async fn submits_and_polls_over_http() {
        let server = MockServer::start_async().await;
        let submit_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/call/virtual_tryon")
                    .body_includes("data:image/png;base64,aHVtYW4=")
                    .body_includes("data:image/jpeg;base64,Y2xvdGg=");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({ "event_id": "evt-42" }));
            })
            .await;
        let status_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/call/virtual_tryon/evt-42");
                then.status(200)
                    .header("content-type", "text/event-stream")
                    .body(concat!(
                        "data: {\"msg\": \"progress\", \"progress\": 0.9}\n\n",
                        "data: {\"msg\": \"process_completed\", \"success\": true, \"output\": {\"data\": [\"data:image/png;base64,cmVzdWx0\"]}}\n\n",
                    ));
            })
            .await;

        let (human, garment) = images();
        let result = client(&server, ImageEncoding::DataUri)
            .try_on(&human, &garment, &CancellationToken::new())
            .await
            .unwrap();

        submit_mock.assert_async().await;
        status_mock.assert_async().await;
        assert_eq!(
            result.first_image().as_deref(),
            Some("data:image/png;base64,cmVzdWx0")
        );
    }

    #[tokio::test]
    async fn falls_back_to_gradio_api_prefix() {
        let server = MockServer::start_async().await;
        let legacy_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/call/virtual_tryon");
                then.status(404).body("Not Found");
            })
            .await;
        let submit_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/gradio_api/call/virtual_tryon");
                then.status(200)
                    .json_body(json!({ "event_id": "evt-7" }));
            })
            .await;
        let status_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/gradio_api/call/virtual_tryon/evt-7");
                then.status(200).body(concat!(
                    "event: complete\n",
                    "data: [{\"url\": \"https://space.hf.space/file=out.png\"}]\n\n",
                ));
            })
            .await;

        let (human, garment) = images();
        let result = client(&server, ImageEncoding::Multipart)
            .try_on(&human, &garment, &CancellationToken::new())
            .await
            .unwrap();

        legacy_mock.assert_async().await;
        submit_mock.assert_async().await;
        status_mock.assert_async().await;
        assert_eq!(
            result.first_image().as_deref(),
            Some("https://space.hf.space/file=out.png")
        );
    }

    #[tokio::test]
    async fn reports_remote_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/call/virtual_tryon");
                then.status(200).json_body(json!({ "event_id": "evt-9" }));
            })
            .await;
        let status_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/call/virtual_tryon/evt-9");
                then.status(200)
                    .body("event: error\ndata: \"No person detected\"\n\n");
            })
            .await;

        let (human, garment) = images();
        let result = client(&server, ImageEncoding::Base64)
            .try_on(&human, &garment, &CancellationToken::new())
            .await;

        status_mock.assert_async().await;
        assert!(matches!(
            result,
            Err(TryOnError::RemoteFailure(reason)) if reason == "No person detected"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn completion_without_output_is_a_protocol_error() {
        let transport = Arc::new(ScriptedTransport::new().with_poll(respond(
            200,
            "data: {\"msg\": \"process_completed\", \"success\": true}\n",
        )));
        let client = GradioClient::new(
            transport.clone(),
            &config("https://space.hf.space", ImageEncoding::DataUri),
        );

        let (human, garment) = images();
        let result = client
            .try_on(&human, &garment, &CancellationToken::new())
            .await;

        assert_eq!(transport.get_count(), 1);
        match result {
            Err(e @ TryOnError::Protocol(_)) => {
                let api_error = e.value();
                assert_eq!(api_error.code, axum::http::StatusCode::BAD_GATEWAY);
                assert_eq!(api_error.error.as_deref(), Some("protocol_error"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
