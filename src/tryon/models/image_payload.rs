use bytes::Bytes;
use mime::Mime;
use regex::Regex;

use crate::tryon::errors::TryOnError;

lazy_static! {
    static ref DATA_URI_REGEX: Regex =
        Regex::new(r"(?s)^data:(?P<mime>[^;,]+)(?:;[^;,]+)*;base64,(?P<data>.*)$").unwrap();
}

/// Binary image content plus its declared media type.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    data: Bytes,
    mime_type: Mime,
}

impl ImagePayload {
    pub fn new(data: Bytes, mime_type: Mime) -> Self {
        Self { data, mime_type }
    }

    /// Parses `data:<mime>;base64,<data>`. A bare base64 string is taken as PNG.
    pub fn from_data_uri(value: &str) -> Result<Self, TryOnError> {
        let value = value.trim();

        let (mime_type, encoded) = match DATA_URI_REGEX.captures(value) {
            Some(captures) => {
                let mime = captures.name("mime").map_or("", |m| m.as_str());
                let Ok(mime_type) = mime.parse::<Mime>() else {
                    return Err(TryOnError::Validation(format!(
                        "unrecognized media type \"{}\"",
                        mime
                    )));
                };
                let encoded = captures.name("data").map_or("", |m| m.as_str());

                (mime_type, encoded)
            }
            None if value.starts_with("data:") => {
                return Err(TryOnError::Validation("data uri must be base64 encoded".to_string()));
            }
            None => (mime::IMAGE_PNG, value),
        };

        let Ok(data) = base64::decode(encoded) else {
            return Err(TryOnError::Validation("image is not valid base64".to_string()));
        };

        Ok(Self::new(Bytes::from(data), mime_type))
    }

    /// Builds a payload from downloaded bytes, preferring the response's
    /// `Content-Type` and falling back to the url's extension.
    pub fn from_download(data: Bytes, content_type: Option<&str>, url: &str) -> Self {
        let mime_type = content_type
            .and_then(|value| value.parse::<Mime>().ok())
            .filter(|mime| mime.type_() == mime::IMAGE)
            .unwrap_or_else(|| mime_from_extension(url));

        Self::new(data, mime_type)
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn mime_type(&self) -> &Mime {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn validate(&self, label: &str) -> Result<(), TryOnError> {
        if self.is_empty() {
            return Err(TryOnError::Validation(format!("{} is empty", label)));
        }

        if !is_recognized_image(&self.mime_type) {
            return Err(TryOnError::Validation(format!(
                "{} has unsupported media type \"{}\"",
                label,
                self.mime_type.essence_str()
            )));
        }

        Ok(())
    }

    pub fn to_base64(&self) -> String {
        base64::encode(&self.data)
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type.essence_str(),
            self.to_base64()
        )
    }

    pub fn extension(&self) -> &str {
        match self.mime_type.subtype().as_str() {
            "jpeg" => "jpg",
            other => other,
        }
    }
}

pub fn is_recognized_image(mime_type: &Mime) -> bool {
    if mime_type.type_() != mime::IMAGE {
        return false;
    }

    matches!(
        mime_type.subtype().as_str(),
        "png" | "jpeg" | "webp" | "gif" | "bmp"
    )
}

pub fn mime_from_extension(url: &str) -> Mime {
    let path = url.split(|c: char| c == '?' || c == '#').next().unwrap_or(url);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let extension = match file_name.rsplit_once('.') {
        Some((_, extension)) => extension.to_ascii_lowercase(),
        None => return mime::IMAGE_PNG,
    };

    match extension.as_str() {
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "gif" => mime::IMAGE_GIF,
        "bmp" => mime::IMAGE_BMP,
        "webp" => "image/webp".parse().unwrap_or(mime::IMAGE_PNG),
        _ => mime::IMAGE_PNG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_uri_with_media_type() {
        let payload = ImagePayload::from_data_uri("data:image/jpeg;base64,aGVsbG8=").unwrap();

        assert_eq!(payload.mime_type(), &mime::IMAGE_JPEG);
        assert_eq!(payload.data(), &Bytes::from_static(b"hello"));
        assert!(payload.validate("human image").is_ok());
    }

    #[test]
    fn parses_data_uri_with_extra_parameters() {
        let payload =
            ImagePayload::from_data_uri("data:image/png;name=cam.png;base64,aGVsbG8=").unwrap();

        assert_eq!(payload.mime_type(), &mime::IMAGE_PNG);
        assert_eq!(payload.len(), 5);
    }

    #[test]
    fn bare_base64_defaults_to_png() {
        let payload = ImagePayload::from_data_uri("aGVsbG8=").unwrap();

        assert_eq!(payload.mime_type(), &mime::IMAGE_PNG);
        assert_eq!(payload.len(), 5);
    }

    #[test]
    fn rejects_data_uri_without_base64_marker() {
        let result = ImagePayload::from_data_uri("data:image/png,hello");

        assert!(matches!(result, Err(TryOnError::Validation(_))));
    }

    #[test]
    fn rejects_invalid_base64() {
        let result = ImagePayload::from_data_uri("data:image/png;base64,@@@");

        assert!(matches!(result, Err(TryOnError::Validation(_))));
    }

    #[test]
    fn empty_payload_fails_validation() {
        let payload = ImagePayload::new(Bytes::new(), mime::IMAGE_PNG);

        assert!(matches!(
            payload.validate("garment image"),
            Err(TryOnError::Validation(reason)) if reason.contains("garment image")
        ));
    }

    #[test]
    fn non_image_media_type_fails_validation() {
        let payload = ImagePayload::new(Bytes::from_static(b"%PDF"), mime::APPLICATION_PDF);

        assert!(payload.validate("garment image").is_err());
    }

    #[test]
    fn download_prefers_image_content_type() {
        let payload = ImagePayload::from_download(
            Bytes::from_static(b"x"),
            Some("image/webp"),
            "https://cdn.example.com/cloth02.jpg",
        );

        assert_eq!(payload.mime_type().essence_str(), "image/webp");
    }

    #[test]
    fn download_falls_back_to_extension() {
        let payload = ImagePayload::from_download(
            Bytes::from_static(b"x"),
            Some("application/octet-stream"),
            "https://huggingface.co/example/cloth/cloth02.JPG?download=true",
        );

        assert_eq!(payload.mime_type(), &mime::IMAGE_JPEG);
        assert_eq!(payload.extension(), "jpg");
    }

    #[test]
    fn unknown_extension_defaults_to_png() {
        assert_eq!(mime_from_extension("https://cdn.example.com/garment"), mime::IMAGE_PNG);
        assert_eq!(mime_from_extension("https://cdn.example.com/garment.tiff"), mime::IMAGE_PNG);
    }

    #[test]
    fn data_uri_round_trips_media_type() {
        let payload = ImagePayload::new(Bytes::from_static(b"hello"), mime::IMAGE_GIF);

        assert_eq!(payload.to_data_uri(), "data:image/gif;base64,aGVsbG8=");
    }
}
