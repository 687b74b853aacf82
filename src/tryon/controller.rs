use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app::{models::api_error::ApiError, structs::json_from_request::JsonFromRequest},
    AppState,
};

use super::{
    dtos::{
        generate_dto::{GenerateDto, GenerateResponse},
        try_on_dto::TryOnDto,
    },
    models::result_payload::ResultPayload,
    service,
};

pub async fn try_on(
    State(state): State<Arc<AppState>>,
    JsonFromRequest(dto): JsonFromRequest<TryOnDto>,
) -> Result<Json<ResultPayload>, ApiError> {
    let span = tracing::info_span!("try_on", request_id = %Uuid::new_v4());

    match dto.validate() {
        Ok(_) => match service::try_on(&dto, &state).instrument(span).await {
            Ok(result) => Ok(Json(result)),
            Err(e) => Err(e),
        },
        Err(e) => Err(ApiError {
            code: StatusCode::BAD_REQUEST,
            message: e.to_string(),
            error: Some("validation_error".to_string()),
        }),
    }
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    JsonFromRequest(dto): JsonFromRequest<GenerateDto>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let span = tracing::info_span!("generate", request_id = %Uuid::new_v4());

    match dto.validate() {
        Ok(_) => match service::generate(&dto, &state).instrument(span).await {
            Ok(response) => Ok(Json(response)),
            Err(e) => Err(e),
        },
        Err(e) => Err(ApiError {
            code: StatusCode::BAD_REQUEST,
            message: e.to_string(),
            error: Some("validation_error".to_string()),
        }),
    }
}
