//! # Image Normalization
//!
//! Turns any decodable raster into the canonical avatar: transparency
//! flattened onto white, resized to an exact square, encoded as JPEG.
//!
//! ```ignore
//! use core_metadata::ImageNormalizer;
//!
//! let normalizer = ImageNormalizer::new(200, 90);
//! let artifact = normalizer.normalize(&downloaded_bytes)?;
//! assert_eq!(artifact.content_type(), "image/jpeg");
//! ```

use crate::error::{MetadataError, Result};
use core_library::models::NormalizedArtifact;
use core_runtime::config::AvatarConfig;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use tracing::trace;

/// Decodes, flattens, resizes and re-encodes avatar images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageNormalizer {
    size: u32,
    quality: u8,
}

impl ImageNormalizer {
    /// `size` is the edge of the output square, `quality` the JPEG factor
    pub fn new(size: u32, quality: u8) -> Self {
        Self { size, quality }
    }

    pub fn from_config(config: &AvatarConfig) -> Self {
        Self::new(config.canonical_size, config.jpeg_quality)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Normalize raw image bytes into the canonical artifact.
    ///
    /// # Errors
    ///
    /// - `Decode` when the bytes are not a supported raster image
    /// - `Encode` when JPEG encoding fails
    pub fn normalize(&self, raw: &[u8]) -> Result<NormalizedArtifact> {
        let decoded =
            image::load_from_memory(raw).map_err(|e| MetadataError::Decode(e.to_string()))?;

        trace!(
            width = decoded.width(),
            height = decoded.height(),
            color = ?decoded.color(),
            "Decoded avatar"
        );

        let flattened = flatten_onto_white(decoded);
        let resized = imageops::resize(&flattened, self.size, self.size, FilterType::Lanczos3);

        let mut encoded = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut encoded, self.quality);
        DynamicImage::ImageRgb8(resized)
            .write_with_encoder(encoder)
            .map_err(|e| MetadataError::Encode(e.to_string()))?;

        Ok(NormalizedArtifact::jpeg(encoded)?)
    }
}

/// Composite onto an opaque white canvas, using alpha as the blend mask.
///
/// Palette images arrive here already expanded to RGB or RGBA by the decoder.
fn flatten_onto_white(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}
