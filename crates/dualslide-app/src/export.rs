//! PNG export of rendered surfaces.

use dualslide_render::Raster;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("Failed to write {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Encode a raster as an 8-bit RGBA PNG.
pub fn encode_png(raster: &Raster) -> ExportResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, raster.width(), raster.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(format!("header: {}", e)))?;
        writer
            .write_image_data(raster.as_bytes())
            .map_err(|e| ExportError::Encode(format!("data: {}", e)))?;
    }
    Ok(png_data)
}

/// Encode `raster` and write it to `path`.
#[cfg(not(target_arch = "wasm32"))]
pub fn write_png(raster: &Raster, path: &Path) -> ExportResult<()> {
    let data = encode_png(raster)?;
    std::fs::write(path, data).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    log::info!(
        "Wrote {}x{} PNG to {}",
        raster.width(),
        raster.height(),
        path.display()
    );
    Ok(())
}
