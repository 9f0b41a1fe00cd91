use std::io::Cursor;

use image::{DynamicImage, ImageFormat, ImageReader};

pub const ALLOWED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// 10 MiB per image.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Longest edge of a stored recipe thumbnail.
pub const THUMBNAIL_SIZE: u32 = 400;

/// Detect the format from magic bytes and check that it is allowed.
/// Returns the MIME type.
pub fn sniff_image(data: &[u8]) -> Result<&'static str, String> {
    if data.is_empty() {
        return Err("The submitted file is empty.".to_string());
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(format!(
            "File too large. Maximum size is {} bytes",
            MAX_FILE_SIZE
        ));
    }

    let format = image::guess_format(data)
        .map_err(|_| "Upload a valid image. The file you uploaded was either not an image or a corrupted image.".to_string())?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        ));
    }

    Ok(format.to_mime_type())
}

/// Decode an uploaded image and re-encode it as a JPEG fitting within
/// `THUMBNAIL_SIZE` on its longest edge.
pub fn thumbnail_jpeg(data: &[u8]) -> Result<Vec<u8>, String> {
    sniff_image(data)?;

    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Failed to read image: {}", e))?
        .decode()
        .map_err(|e| format!("Failed to decode image: {}", e))?;

    // JPEG has no alpha channel
    let thumbnail = DynamicImage::ImageRgb8(img.thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE).to_rgb8());

    let mut buf = Cursor::new(Vec::new());
    thumbnail
        .write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(|e| format!("Failed to encode thumbnail: {}", e))?;

    Ok(buf.into_inner())
}
