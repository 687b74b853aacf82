pub mod image_encoding;
