use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TryOnDto {
    #[validate(length(min = 1, message = "humanImage must not be empty."))]
    pub human_image: Option<String>,
    #[validate(length(min = 1, message = "garmentImage must not be empty."))]
    pub garment_image: Option<String>,
}
