use super::mime::detect_image_format;
use crate::input::ImageSource;
use crate::models::{EncodedImage, ImageFormat, ImageInput};
use crate::{Error, Result};
use base64::Engine as _;
use std::io::Cursor;
use std::path::Path;

/// Produce a validated image buffer from either acquisition mode.
pub fn materialize(source: &ImageSource) -> Result<ImageInput> {
    match source {
        ImageSource::UploadedFile { name, bytes } => materialize_upload(name, bytes),
        ImageSource::DrawnCanvas {
            width,
            height,
            rgba,
            ..
        } => materialize_canvas(*width, *height, rgba),
    }
}

fn materialize_upload(name: &str, bytes: &[u8]) -> Result<ImageInput> {
    if bytes.is_empty() {
        return Err(Error::Encoding(format!("Uploaded image {} is empty", name)));
    }

    let format = detect_image_format(bytes)
        .or_else(|| {
            Path::new(name)
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .ok_or_else(|| Error::Encoding(format!("{} is not a JPEG or PNG image", name)))?;

    let decoded = ::image::load_from_memory(bytes)?;
    tracing::debug!(
        "Validated upload {} ({}x{}, {})",
        name,
        decoded.width(),
        decoded.height(),
        format.mime_type()
    );

    Ok(ImageInput {
        bytes: bytes.to_vec(),
        format,
        filename: Some(name.to_string()),
    })
}

fn materialize_canvas(width: u32, height: u32, rgba: &[u8]) -> Result<ImageInput> {
    if width == 0 || height == 0 {
        return Err(Error::Encoding("Canvas is empty".to_string()));
    }

    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| Error::Encoding("Canvas dimensions too large".to_string()))?;
    if rgba.len() != expected {
        return Err(Error::Encoding(format!(
            "Canvas pixel buffer has {} bytes, expected {} for {}x{} RGBA",
            rgba.len(),
            expected,
            width,
            height
        )));
    }

    let canvas = ::image::RgbaImage::from_raw(width, height, rgba.to_vec())
        .ok_or_else(|| Error::Encoding("Canvas pixel buffer is malformed".to_string()))?;

    let mut bytes = Vec::new();
    canvas.write_to(&mut Cursor::new(&mut bytes), ::image::ImageFormat::Png)?;
    tracing::debug!(
        "Materialized {}x{} canvas as PNG ({} bytes)",
        width,
        height,
        bytes.len()
    );

    Ok(ImageInput {
        bytes,
        format: ImageFormat::Png,
        filename: None,
    })
}

/// Base64-encode an image with its MIME type.
pub fn encode(input: &ImageInput) -> EncodedImage {
    EncodedImage {
        mime_type: input.format().mime_type().to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(input.bytes()),
    }
}

/// Inverse of [`encode`]: recover the original image bytes.
pub fn decode(encoded: &EncodedImage) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(&encoded.data)
        .map_err(|e| Error::Encoding(format!("Failed to decode base64 image: {}", e)))
}
