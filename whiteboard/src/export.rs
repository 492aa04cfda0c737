//! Flattening: render every layer at 1:1 canvas resolution into one raster and
//! encode it as a compact data URL for the profile record.
//!
//! The viewport plays no part here. Output is always
//! `EXPORT_WIDTH_PX × EXPORT_HEIGHT_PX`, composited onto an opaque white
//! background because the encoded format carries no alpha.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbImage, RgbaImage};

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, EXPORT_HEIGHT_PX, EXPORT_MEDIA_TYPE, EXPORT_QUALITY, EXPORT_WIDTH_PX};
use crate::layers::Layer;

/// Errors produced while encoding a flattened composition.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The image encoder rejected the raster.
    #[error("encode failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Composite `layers` in order (bottom first) onto a white canvas-sized raster.
#[must_use]
pub fn flatten(layers: &[Layer]) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(EXPORT_WIDTH_PX, EXPORT_HEIGHT_PX, Rgba([255, 255, 255, 255]));
    for layer in layers {
        composite_layer(&mut canvas, layer);
    }
    canvas
}

// Only the part of the layer that lands on the canvas is resampled, so a layer
// scaled far beyond the canvas never allocates more than one canvas of pixels.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn composite_layer(canvas: &mut RgbaImage, layer: &Layer) {
    let (img_w, img_h) = layer.image.dimensions();
    if img_w == 0 || img_h == 0 {
        return;
    }

    let vx0 = layer.x.max(0.0);
    let vy0 = layer.y.max(0.0);
    let vx1 = (layer.x + layer.width).min(CANVAS_WIDTH);
    let vy1 = (layer.y + layer.height).min(CANVAS_HEIGHT);
    if vx1 - vx0 < 1.0 || vy1 - vy0 < 1.0 {
        return;
    }

    let scale_x = f64::from(img_w) / layer.width;
    let scale_y = f64::from(img_h) / layer.height;
    let sx0 = ((vx0 - layer.x) * scale_x).floor().clamp(0.0, f64::from(img_w - 1)) as u32;
    let sy0 = ((vy0 - layer.y) * scale_y).floor().clamp(0.0, f64::from(img_h - 1)) as u32;
    let sx1 = ((vx1 - layer.x) * scale_x).ceil().clamp(f64::from(sx0 + 1), f64::from(img_w)) as u32;
    let sy1 = ((vy1 - layer.y) * scale_y).ceil().clamp(f64::from(sy0 + 1), f64::from(img_h)) as u32;

    let source = imageops::crop_imm(&*layer.image, sx0, sy0, sx1 - sx0, sy1 - sy0).to_image();
    let dest_w = ((vx1 - vx0).round() as u32).max(1);
    let dest_h = ((vy1 - vy0).round() as u32).max(1);
    let scaled = imageops::resize(&source, dest_w, dest_h, FilterType::Triangle);
    imageops::overlay(canvas, &scaled, vx0.round() as i64, vy0.round() as i64);
}

/// Encode a raster with the lossy export codec.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder fails.
pub fn encode(raster: &RgbaImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    let rgb: RgbImage = raster.convert();
    let mut out = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
        encoder.encode_image(&rgb)?;
    }
    Ok(out)
}

/// Wrap encoded bytes in a `data:` URL.
#[must_use]
pub fn to_data_url(bytes: &[u8]) -> String {
    format!("data:{EXPORT_MEDIA_TYPE};base64,{}", STANDARD.encode(bytes))
}

/// Flatten and encode in one step, at the default export quality.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder fails.
pub fn flatten_to_data_url(layers: &[Layer]) -> Result<String, ExportError> {
    let raster = flatten(layers);
    let bytes = encode(&raster, EXPORT_QUALITY)?;
    Ok(to_data_url(&bytes))
}
