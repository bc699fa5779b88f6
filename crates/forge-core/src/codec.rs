// crates/forge-core/src/codec.rs

use std::io::Cursor;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use crate::error::DecodeError;

/// Decode a base64 image payload, with or without a `data:...;base64,` prefix.
pub fn decode_image(text: &str) -> Result<DynamicImage, DecodeError> {
    let payload = match text.split_once(',') {
        Some((_, data)) => data,
        None => text,
    };

    let bytes = BASE64_STANDARD.decode(payload.trim())?;
    let image = image::load_from_memory(&bytes)?;
    Ok(image)
}

pub fn encode_bytes(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

/// PNG-encode an image and return it as base64 text.
pub fn encode_image_png(image: &DynamicImage) -> Result<String, DecodeError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(encode_bytes(buffer.get_ref()))
}
