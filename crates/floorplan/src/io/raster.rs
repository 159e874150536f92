use base64::{Engine, engine::general_purpose::STANDARD};
use image::GrayImage;

use crate::error::{PlanError, Result};

/// Load a plan raster from file as 8-bit grayscale
pub fn load_plan_image(path: impl AsRef<std::path::Path>) -> Result<GrayImage> {
    let path = path.as_ref();
    let image = image::open(path)?;
    tracing::debug!(path = %path.display(), width = image.width(), height = image.height(), "loaded plan raster");
    Ok(image.to_luma8())
}

/// Load a plan raster from encoded bytes (PNG, JPEG, TIFF)
pub fn load_plan_image_from_bytes(bytes: &[u8]) -> Result<GrayImage> {
    if bytes.is_empty() {
        return Err(PlanError::NoImageLoaded);
    }
    Ok(image::load_from_memory(bytes)?.to_luma8())
}

/// Load a plan raster from base64, with or without a `data:image/...;base64,` prefix
pub fn load_plan_image_from_base64(data: &str) -> Result<GrayImage> {
    let payload = match data.split_once(";base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => data,
    };
    let bytes = STANDARD.decode(payload.trim())?;
    load_plan_image_from_bytes(&bytes)
}
