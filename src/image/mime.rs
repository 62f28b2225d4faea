use crate::models::ImageFormat;

/// Sniff the raster format from magic bytes.
///
/// Returns `None` for anything other than JPEG or PNG.
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(ImageFormat::Png),
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?})",
                &bytes[..bytes.len().min(4)]
            );
            None
        }
    }
}
