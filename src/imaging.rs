//! Image preprocessing ahead of the vision call
//!
//! The storage layer enforces a small per-document size ceiling and the vision
//! model bills by input size; this module is the single governor for both. It
//! is pure over its input and safe to call concurrently.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;

use crate::error::Error;

/// Longest side of the preprocessed image, in pixels
pub const DEFAULT_MAX_DIMENSION: u32 = 1000;

/// Default JPEG re-encode quality
pub const DEFAULT_JPEG_QUALITY: f32 = 0.7;

/// Upload size ceiling checked before any decoding happens
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Reject uploads that are not images or exceed the size ceiling.
///
/// The check is a magic-byte sniff, not a full decode; `compress` still fails
/// with a read error on a truncated file that passes it.
pub fn validate_upload(bytes: &[u8]) -> Result<(), Error> {
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(Error::validation(
            "File size too large. Please upload an image under 10MB.",
        ));
    }
    if !looks_like_image(bytes) {
        return Err(Error::validation(
            "Please upload a valid image file (JPEG, PNG, WEBP).",
        ));
    }
    Ok(())
}

fn looks_like_image(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || bytes.starts_with(&[0x89, b'P', b'N', b'G'])
        || (bytes.starts_with(b"RIFF") && bytes.len() >= 12 && &bytes[8..12] == b"WEBP")
        || bytes.starts_with(b"GIF8")
}

/// Downscale and recompress an uploaded image into a self-contained
/// `data:image/jpeg;base64,` string.
///
/// The longer side is scaled down to `max_dimension` (aspect ratio preserved
/// via integer rounding of the shorter side); images already within bounds are
/// re-encoded without resizing. No upscaling.
pub fn compress(bytes: &[u8], max_dimension: u32, quality: f32) -> Result<String, Error> {
    let decoded = image::load_from_memory(bytes).map_err(|e| {
        log::error!("image decode failed: {e}");
        Error::read(e)
    })?;

    let (width, height) = decoded.dimensions();
    let (new_width, new_height) = scaled_dimensions(width, height, max_dimension);
    let resized = if (new_width, new_height) == (width, height) {
        decoded
    } else {
        decoded.resize_exact(new_width, new_height, FilterType::Triangle)
    };

    // JPEG has no alpha channel
    let rgb = resized.to_rgb8();
    let mut jpeg: Vec<u8> = Vec::new();
    let encoder_quality = (quality.clamp(0.01, 1.0) * 100.0).round() as u8;
    JpegEncoder::new_with_quality(&mut jpeg, encoder_quality)
        .encode_image(&rgb)
        .map_err(|e| {
            log::error!("jpeg encode failed: {e}");
            Error::encode(e)
        })?;

    Ok(format!("data:image/jpeg;base64,{}", BASE64.encode(&jpeg)))
}

/// Scale the longer side down to `max_dimension`, rounding the shorter side
fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width >= height {
        if width > max_dimension {
            let scaled = (height as f64 * max_dimension as f64 / width as f64).round() as u32;
            (max_dimension, scaled.max(1))
        } else {
            (width, height)
        }
    } else if height > max_dimension {
        let scaled = (width as f64 * max_dimension as f64 / height as f64).round() as u32;
        (scaled.max(1), max_dimension)
    } else {
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([120, 30, 200]),
        ));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    fn decoded_dimensions(data_url: &str) -> (u32, u32) {
        let payload = data_url.split_once(',').unwrap().1;
        let jpeg = BASE64.decode(payload).unwrap();
        image::load_from_memory(&jpeg).unwrap().dimensions()
    }

    #[test]
    fn scaled_dimensions_preserves_aspect_with_integer_rounding() {
        assert_eq!(scaled_dimensions(2000, 1500, 1000), (1000, 750));
        assert_eq!(scaled_dimensions(1500, 2000, 1000), (750, 1000));
        assert_eq!(scaled_dimensions(1333, 1000, 1000), (1000, 750));
        assert_eq!(scaled_dimensions(800, 600, 1000), (800, 600));
    }

    #[test]
    fn compress_bounds_the_longer_dimension() {
        let out = compress(&png_bytes(1600, 1200), 1000, 0.7).unwrap();
        assert!(out.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decoded_dimensions(&out), (1000, 750));
    }

    #[test]
    fn compress_never_upscales() {
        let out = compress(&png_bytes(320, 240), 1000, 0.7).unwrap();
        assert_eq!(decoded_dimensions(&out), (320, 240));
    }

    #[test]
    fn compress_is_dimensionally_deterministic() {
        let input = png_bytes(1600, 900);
        let a = compress(&input, 1000, 0.7).unwrap();
        let b = compress(&input, 1000, 0.7).unwrap();
        assert_eq!(decoded_dimensions(&a), decoded_dimensions(&b));
    }

    #[test]
    fn compress_rejects_undecodable_input() {
        let err = compress(b"definitely not an image", 1000, 0.7).unwrap_err();
        assert!(matches!(err, Error::Read(_)));
    }

    #[test]
    fn validate_upload_sniffs_magic_bytes() {
        assert!(validate_upload(&png_bytes(10, 10)).is_ok());
        assert!(validate_upload(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]).is_ok());

        let err = validate_upload(b"<html>not an image</html>").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn validate_upload_enforces_the_size_ceiling() {
        let oversized = vec![0xFFu8; MAX_UPLOAD_BYTES + 1];
        let err = validate_upload(&oversized).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
