use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

use super::models::api_error::ApiError;

pub async fn get_root(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    Ok(Json(json!({
        "status": "ok",
        "app_env": state.envy.app_env,
    })))
}
