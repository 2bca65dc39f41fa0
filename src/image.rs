//! # Image Metrics Port
//!
//! The engine never decodes image pixels. It needs exactly one thing from
//! an image: its intrinsic dimensions, and only when both axes of an image
//! element are Fit (unusual). Everything else — decoding, embedding,
//! placement of bytes — belongs to the render-command consumer, which
//! receives the opaque source string untouched.
//!
//! [`SourceImageMetrics`] is the default adapter: it resolves file paths,
//! data URIs, and raw base64 strings to bytes and probes the dimension
//! headers without a full decode.

use std::io::Cursor;

/// Intrinsic pixel dimensions of an image source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Provider of intrinsic image dimensions, supplied by the host.
pub trait ImageMetrics {
    /// Describe an opaque source string. An `Err` is non-fatal: the
    /// element falls back to zero intrinsic size and a warning is
    /// recorded.
    fn describe(&self, source: &str) -> Result<ImageDimensions, String>;
}

/// Default adapter: dimension probing for paths, data URIs, and base64.
#[derive(Debug, Default)]
pub struct SourceImageMetrics;

impl ImageMetrics for SourceImageMetrics {
    fn describe(&self, source: &str) -> Result<ImageDimensions, String> {
        let bytes = read_source_bytes(source)?;
        let reader = image::io::Reader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| format!("could not sniff image format: {e}"))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| format!("could not read image dimensions: {e}"))?;
        Ok(ImageDimensions { width, height })
    }
}

/// Turn a source string into raw image bytes.
///
/// Three shapes are accepted: a `data:image/...` URI, a filesystem path,
/// or a bare base64 payload. A path is recognized only by a leading `/`,
/// `./`, or `../` — base64 text can legally contain slashes, so anything
/// without one of those prefixes is decoded rather than opened.
fn read_source_bytes(source: &str) -> Result<Vec<u8>, String> {
    if let Some(rest) = source.strip_prefix("data:image/") {
        let (_, payload) = rest
            .split_once(',')
            .ok_or_else(|| "data URI has no base64 payload".to_string())?;
        return decode_base64(payload);
    }

    let looks_like_path =
        source.starts_with('/') || source.starts_with("./") || source.starts_with("../");
    if looks_like_path {
        return std::fs::read(source)
            .map_err(|e| format!("cannot read image file {source:?}: {e}"));
    }

    decode_base64(source)
}

fn decode_base64(payload: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| format!("source is not valid base64: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            width,
            height,
            image::ColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn test_describe_data_uri() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(3, 2));
        let uri = format!("data:image/png;base64,{}", b64);
        let dims = SourceImageMetrics.describe(&uri).unwrap();
        assert_eq!(dims, ImageDimensions { width: 3, height: 2 });
    }

    #[test]
    fn test_describe_raw_base64() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(5, 7));
        let dims = SourceImageMetrics.describe(&b64).unwrap();
        assert_eq!(dims, ImageDimensions { width: 5, height: 7 });
    }

    #[test]
    fn test_invalid_data_uri() {
        assert!(SourceImageMetrics.describe("data:image/png;base64").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(SourceImageMetrics
            .describe("/nonexistent/galley-test.png")
            .is_err());
    }

    #[test]
    fn test_garbage_base64() {
        assert!(SourceImageMetrics.describe("!!not-base64!!").is_err());
    }
}
