use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GenerateDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "human_img_b64 must not be empty."))]
    pub human_img_b64: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "garm_img_b64 must not be empty."))]
    pub garm_img_b64: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub image: String,
}
