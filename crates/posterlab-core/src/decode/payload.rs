//! Decoding of generated image payloads.
//!
//! The generation collaborator hands back base64 text, optionally wrapped in a
//! `data:image/...;base64,` URL. The decoded bytes may be any format the
//! `image` crate was built with (PNG and JPEG here).

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageReader;

use super::{DecodeError, Raster};

/// Decode a base64 (or base64 data-URL) image payload to RGBA pixels.
///
/// # Errors
///
/// Returns `DecodeError::Empty` for blank payloads,
/// `DecodeError::InvalidBase64` if the text is not base64, and the
/// [`decode_image`] errors for undecodable bytes.
pub fn decode_base64_image(payload: &str) -> Result<Raster, DecodeError> {
    let body = strip_data_url(payload);
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(DecodeError::Empty);
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;

    decode_image(&bytes)
}

/// Decode encoded image bytes to RGBA pixels.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format cannot be guessed and
/// `DecodeError::CorruptedFile` if decoding fails.
pub fn decode_image(bytes: &[u8]) -> Result<Raster, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let raster = Raster::from_rgba_image(img.into_rgba8());
    if raster.is_empty() {
        return Err(DecodeError::CorruptedFile("image has no pixels".to_string()));
    }
    Ok(raster)
}

/// Drop a `data:<mime>;base64,` prefix if present.
fn strip_data_url(payload: &str) -> &str {
    let trimmed = payload.trim();
    match trimmed.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, body)| body),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_png;

    fn png_payload(width: u32, height: u32) -> String {
        let pixels: Vec<u8> = (0..width * height)
            .flat_map(|i| [(i % 256) as u8, 10, 20, 255])
            .collect();
        let png = encode_png(&pixels, width, height).unwrap();
        STANDARD.encode(png)
    }

    #[test]
    fn test_decode_plain_base64() {
        let img = decode_base64_image(&png_payload(6, 4)).unwrap();
        assert_eq!(img.width, 6);
        assert_eq!(img.height, 4);
        assert_eq!(img.pixels.len(), 6 * 4 * 4);
        assert_eq!(img.pixel(5, 0), [5, 10, 20, 255]);
    }

    #[test]
    fn test_decode_data_url() {
        let payload = format!("data:image/png;base64,{}", png_payload(3, 3));
        let img = decode_base64_image(&payload).unwrap();
        assert_eq!((img.width, img.height), (3, 3));
    }

    #[test]
    fn test_decode_tolerates_line_breaks() {
        let encoded = png_payload(5, 5);
        let (head, tail) = encoded.split_at(encoded.len() / 2);
        let wrapped = format!("{}\n{}\n", head, tail);
        assert!(decode_base64_image(&wrapped).is_ok());
    }

    #[test]
    fn test_decode_empty_payload() {
        assert!(matches!(decode_base64_image("   "), Err(DecodeError::Empty)));
        assert!(matches!(
            decode_base64_image("data:image/png;base64,"),
            Err(DecodeError::Empty)
        ));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let result = decode_base64_image("not*base64!");
        assert!(matches!(result, Err(DecodeError::InvalidBase64(_))));
    }

    #[test]
    fn test_decode_unrecognized_bytes() {
        let payload = STANDARD.encode([0x00u8, 0x01, 0x02, 0x03]);
        let result = decode_base64_image(&payload);
        assert!(matches!(result, Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated_png() {
        let pixels = vec![200u8; 8 * 8 * 4];
        let png = encode_png(&pixels, 8, 8).unwrap();
        let truncated = &png[..png.len() / 2];
        assert!(matches!(
            decode_image(truncated),
            Err(DecodeError::CorruptedFile(_))
        ));
    }

    #[test]
    fn test_strip_data_url() {
        assert_eq!(strip_data_url("data:image/png;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url("  QUJD  "), "QUJD");
    }
}
