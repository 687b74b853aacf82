use std::str::FromStr;

use serde_json::json;

use crate::tryon::{
    apis::gradio::transport::{FilePart, SubmissionBody},
    models::image_payload::ImagePayload,
};

/// How the two input images are placed in the submission body. The Space
/// does not advertise which shape it accepts, so this is configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    DataUri,
    Base64,
    Multipart,
}

impl ImageEncoding {
    pub fn value(&self) -> &str {
        match *self {
            Self::DataUri => "data_uri",
            Self::Base64 => "base64",
            Self::Multipart => "multipart",
        }
    }

    pub fn encode(&self, human: &ImagePayload, garment: &ImagePayload) -> SubmissionBody {
        match *self {
            Self::DataUri => SubmissionBody::Json(json!({
                "data": [human.to_data_uri(), garment.to_data_uri()],
            })),
            Self::Base64 => SubmissionBody::Json(json!({
                "data": [human.to_base64(), garment.to_base64()],
            })),
            Self::Multipart => SubmissionBody::Multipart(vec![
                file_part("human", human),
                file_part("garment", garment),
            ]),
        }
    }
}

impl FromStr for ImageEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "data_uri" | "datauri" => Ok(Self::DataUri),
            "base64" => Ok(Self::Base64),
            "multipart" => Ok(Self::Multipart),
            other => Err(format!("unknown image encoding \"{}\"", other)),
        }
    }
}

fn file_part(stem: &str, image: &ImagePayload) -> FilePart {
    FilePart {
        name: "data".to_string(),
        file_name: format!("{}.{}", stem, image.extension()),
        mime_type: image.mime_type().clone(),
        data: image.data().clone(),
    }
}
