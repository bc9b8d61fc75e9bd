/// Background image loader
///
/// Downloads the full-resolution variant of the selected result, decodes it
/// to RGBA and fits it to the surface. Decoding and resampling are CPU-bound,
/// so both run on the blocking pool and the UI thread only receives pixels
/// that are ready to draw.
use std::sync::Arc;

use image::RgbaImage;
use tokio::task;
use tracing::info;

use crate::error::EditorError;
use crate::surface::fit_background;
use crate::unsplash::UnsplashClient;

pub async fn load_background(
    client: UnsplashClient,
    url: String,
    width: u32,
    height: u32,
) -> Result<Arc<RgbaImage>, EditorError> {
    let bytes = client.fetch_bytes(url).await?;
    prepare_background(bytes, width, height).await
}

/// Decode and fit downloaded bytes off the UI thread
pub async fn prepare_background(
    bytes: Vec<u8>,
    width: u32,
    height: u32,
) -> Result<Arc<RgbaImage>, EditorError> {
    task::spawn_blocking(move || {
        let decoded = decode_image(&bytes)?;
        fit_background(&decoded, width, height)
            .map(Arc::new)
            .ok_or_else(|| EditorError::Decode("image has no pixels".to_string()))
    })
    .await
    .map_err(|e| EditorError::Task(e.to_string()))?
}

/// Decode any supported format into RGBA
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, EditorError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| EditorError::Decode(e.to_string()))?
        .to_rgba8();

    info!("📷 Decoded background image: {}x{}", decoded.width(), decoded.height());
    Ok(decoded)
}
