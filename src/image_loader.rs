//! # Image Loading and Decoding
//!
//! Loads images from file paths, data URIs, or raw base64 strings and prepares
//! them for PDF embedding. JPEG images pass through without re-encoding
//! (PDF supports DCTDecode natively). PNG images are decoded to RGB pixels
//! with a separate alpha channel for SMask transparency.
//!
//! Layout loads every image through an [`ImageCache`], so an image used on
//! many pages is read and decoded once and embedded once.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ImageLoadError {
    #[error("Invalid data URI: missing comma")]
    InvalidDataUri,
    #[error("Failed to read image file '{path}': {reason}")]
    File { path: String, reason: String },
    #[error("Base64 decode error: {0}")]
    Base64(String),
    #[error("Image data too short")]
    TooShort,
    #[error("Unsupported image format (expected JPEG or PNG)")]
    UnsupportedFormat,
    #[error("Failed to decode image: {0}")]
    Decode(String),
}

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Natural size in points, one pixel per point (72 dpi).
    pub fn intrinsic_size(&self) -> (f64, f64) {
        (self.width_px as f64, self.height_px as f64)
    }
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded directly with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl JpegColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            JpegColorSpace::DeviceRGB => "DeviceRGB",
            JpegColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// Load an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...` data URIs
/// - File paths starting with `/`, `./` or `../`
/// - Raw base64-encoded image data
pub fn load_image(src: &str) -> Result<LoadedImage, ImageLoadError> {
    let raw_bytes = read_source_bytes(src)?;
    decode_image_bytes(&raw_bytes)
}

/// Memoises [`load_image`] by source string, failures included.
#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, Result<Arc<LoadedImage>, ImageLoadError>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&mut self, src: &str) -> Result<Arc<LoadedImage>, ImageLoadError> {
        if let Some(hit) = self.entries.get(src) {
            return hit.clone();
        }
        let loaded = load_image(src).map(Arc::new);
        if let Err(e) = &loaded {
            log::debug!("image '{}' failed to load: {}", abbreviate(src), e);
        }
        self.entries.insert(src.to_string(), loaded.clone());
        loaded
    }
}

/// Data URIs can be megabytes long; keep log lines readable.
pub fn abbreviate(src: &str) -> String {
    const MAX: usize = 48;
    if src.chars().count() <= MAX {
        src.to_string()
    } else {
        let head: String = src.chars().take(MAX).collect();
        format!("{}...", head)
    }
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str) -> Result<Vec<u8>, ImageLoadError> {
    // data:image/png;base64,iVBOR...
    if src.starts_with("data:image/") {
        let comma_pos = src.find(',').ok_or(ImageLoadError::InvalidDataUri)?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    // Only explicit path prefixes, so base64 strings (which contain '/')
    // are never mistaken for paths.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src).map_err(|e| ImageLoadError::File {
            path: src.to_string(),
            reason: e.to_string(),
        });
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, ImageLoadError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| ImageLoadError::Base64(e.to_string()))
}

/// Detect image format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, ImageLoadError> {
    if data.len() < 4 {
        return Err(ImageLoadError::TooShort);
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err(ImageLoadError::UnsupportedFormat)
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47]
}

/// JPEG: read dimensions and color space without decoding pixels.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage, ImageLoadError> {
    let (width, height) = image::io::Reader::with_format(Cursor::new(data), image::ImageFormat::Jpeg)
        .into_dimensions()
        .map_err(|e| ImageLoadError::Decode(e.to_string()))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Walk the JPEG markers to the SOF segment and read its component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // past SOI
    while i + 1 < data.len() && data[i] == 0xFF {
        let marker = data[i + 1];
        // SOF markers: C0-C3, C5-C7, C9-CB, CD-CF
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && i + 9 < data.len() {
            // length(2) + precision(1) + height(2) + width(2) + components(1)
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        if i + 3 >= data.len() {
            break;
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    JpegColorSpace::DeviceRGB
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<LoadedImage, ImageLoadError> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .map_err(|e| ImageLoadError::Decode(e.to_string()))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        },
        width_px: width,
        height_px: height,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), w, h, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    pub(crate) fn png_data_uri(w: u32, h: u32) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                png_bytes(w, h, [0, 128, 255, 255])
            )
        )
    }

    #[test]
    fn test_magic_bytes() {
        assert!(is_jpeg(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(!is_jpeg(&[0xFF]));
        assert!(is_png(&[0x89, 0x50, 0x4E, 0x47]));
        assert!(!is_png(&[0x89, 0x50]));
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            load_image("data:image/png;base64").unwrap_err(),
            ImageLoadError::InvalidDataUri
        );
        assert_eq!(
            decode_image_bytes(&[0x00, 0x01]).unwrap_err(),
            ImageLoadError::TooShort
        );
        assert_eq!(
            decode_image_bytes(&[0, 1, 2, 3, 4]).unwrap_err(),
            ImageLoadError::UnsupportedFormat
        );
        assert!(matches!(
            load_image("./definitely/not/here.png"),
            Err(ImageLoadError::File { .. })
        ));
    }

    #[test]
    fn test_decode_png_opaque_and_alpha() {
        let loaded = decode_image_bytes(&png_bytes(1, 1, [255, 0, 0, 255])).unwrap();
        assert_eq!(loaded.intrinsic_size(), (1.0, 1.0));
        match &loaded.pixel_data {
            ImagePixelData::Decoded { rgb, alpha } => {
                assert_eq!(rgb, &[255, 0, 0]);
                assert!(alpha.is_none(), "Fully opaque should have no alpha");
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }

        let loaded = decode_image_bytes(&png_bytes(1, 1, [255, 0, 0, 128])).unwrap();
        match &loaded.pixel_data {
            ImagePixelData::Decoded { alpha, .. } => {
                assert_eq!(alpha.as_deref(), Some(&[128u8][..]));
            }
            _ => panic!("PNG should decode to Decoded variant"),
        }
    }

    #[test]
    fn test_decode_minimal_jpeg() {
        let img = image::RgbImage::from_fn(2, 2, |_, _| image::Rgb([0, 128, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 2, 2, image::ColorType::Rgb8)
            .unwrap();

        let loaded = decode_image_bytes(&buf).unwrap();
        assert_eq!((loaded.width_px, loaded.height_px), (2, 2));
        match &loaded.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                assert!(data.starts_with(&[0xFF, 0xD8]));
                assert_eq!(*color_space, JpegColorSpace::DeviceRGB);
            }
            _ => panic!("JPEG should stay as Jpeg variant"),
        }
    }

    #[test]
    fn test_cache_shares_loaded_image() {
        use base64::Engine;
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(3, 2, [0, 255, 0, 255]));
        let uri = format!("data:image/png;base64,{}", b64);

        let mut cache = ImageCache::new();
        let a = cache.get_or_load(&uri).unwrap();
        let b = cache.get_or_load(&uri).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.width_px, 3);
        assert!(cache.get_or_load("not base64 at all!").is_err());
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("logo.png"), "logo.png");
        let long = "x".repeat(100);
        assert_eq!(abbreviate(&long).len(), 51);
    }
}
