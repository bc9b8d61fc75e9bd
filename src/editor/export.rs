/// PNG export
///
/// Encodes the rendered surface off the UI thread and writes it wherever
/// the user points the native save dialog.
use std::path::{Path, PathBuf};

use image::RgbaImage;
use rfd::AsyncFileDialog;
use tokio::task;
use tracing::info;

use crate::error::EditorError;
use crate::surface::raster::encode_png;

/// Encode the pixels and ask the user where to save them.
///
/// Returns `Ok(None)` when the dialog is cancelled.
pub async fn export_png(pixels: RgbaImage, file_name: String) -> Result<Option<PathBuf>, EditorError> {
    let bytes = task::spawn_blocking(move || encode_png(&pixels))
        .await
        .map_err(|e| EditorError::Task(e.to_string()))??;

    let Some(handle) = AsyncFileDialog::new()
        .set_title("Save Edited Image")
        .set_file_name(&file_name)
        .add_filter("PNG image", &["png"])
        .save_file()
        .await
    else {
        info!("Export cancelled");
        return Ok(None);
    };

    let path = handle.path().to_path_buf();
    write_png(&path, &bytes).await?;
    Ok(Some(path))
}

/// Write encoded bytes to disk
pub async fn write_png(path: &Path, bytes: &[u8]) -> Result<(), EditorError> {
    tokio::fs::write(path, bytes).await?;
    info!("💾 Exported {}KB to {}", bytes.len() / 1024, path.display());
    Ok(())
}
