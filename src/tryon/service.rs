use std::sync::Arc;

use crate::{
    app::{models::api_error::ApiError, util::reqwest::get_bytes_with_retry},
    AppState,
};

use super::{
    dtos::{
        generate_dto::{GenerateDto, GenerateResponse},
        try_on_dto::TryOnDto,
    },
    errors::TryOnError,
    models::{image_payload::ImagePayload, result_payload::ResultPayload},
};

pub async fn try_on(dto: &TryOnDto, state: &Arc<AppState>) -> Result<ResultPayload, ApiError> {
    let (human, garment) = futures::try_join!(
        resolve_image(dto.human_image.as_deref(), "humanImage", state),
        resolve_image(dto.garment_image.as_deref(), "garmentImage", state),
    )?;

    run_job(&human, &garment, state).await
}

pub async fn generate(
    dto: &GenerateDto,
    state: &Arc<AppState>,
) -> Result<GenerateResponse, ApiError> {
    let human = ImagePayload::from_data_uri(&dto.human_img_b64).map_err(|e| e.value())?;
    let garment = ImagePayload::from_data_uri(&dto.garm_img_b64).map_err(|e| e.value())?;

    let result = run_job(&human, &garment, state).await?;

    match result.first_image() {
        Some(image) => Ok(GenerateResponse { image }),
        None => {
            tracing::error!("generate failed (job completed without an image)");
            Err(TryOnError::Protocol("Try-on service generated no images.".to_string()).value())
        }
    }
}

async fn run_job(
    human: &ImagePayload,
    garment: &ImagePayload,
    state: &Arc<AppState>,
) -> Result<ResultPayload, ApiError> {
    let cancel = state.shutdown.child_token();

    match state.gradio.try_on(human, garment, &cancel).await {
        Ok(result) => Ok(result),
        Err(e) => {
            tracing::error!("try-on job failed: {}", e);
            Err(e.value())
        }
    }
}

/// Turns a request field into an image: `http(s)` urls are downloaded,
/// anything else is read as a data uri.
async fn resolve_image(
    value: Option<&str>,
    field: &str,
    state: &Arc<AppState>,
) -> Result<ImagePayload, ApiError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Err(TryOnError::Validation(format!("{} is required.", field)).value());
    };

    if value.starts_with("http://") || value.starts_with("https://") {
        let fetched = get_bytes_with_retry(&state.http, value).await?;
        tracing::debug!("fetched {} ({} bytes)", field, fetched.bytes.len());

        return Ok(ImagePayload::from_download(
            fetched.bytes,
            fetched.content_type.as_deref(),
            value,
        ));
    }

    ImagePayload::from_data_uri(value).map_err(|e| e.value())
}
