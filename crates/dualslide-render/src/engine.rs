//! Seam to the PDF decode/rasterize engine.

use std::future::Future;
use std::pin::Pin;

use kurbo::Size;
use thiserror::Error;

use crate::raster::Raster;

/// Errors reported by the engine. Passed through unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Failed to open document: {0}")]
    Open(String),
    #[error("Page {page} unavailable: {reason}")]
    Page { page: u32, reason: String },
    #[error("Rasterization failed: {0}")]
    Rasterize(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Opens documents.
pub trait PdfEngine {
    /// Decode `bytes`. Fails on corrupt, encrypted or unsupported input.
    fn open(&self, bytes: Vec<u8>) -> BoxFuture<'_, EngineResult<Box<dyn PdfDocument>>>;
}

/// An opened document.
pub trait PdfDocument {
    fn page_count(&self) -> u32;

    /// Size of 1-indexed `page` in PDF points, `None` when out of range.
    fn page_size(&self, page: u32) -> Option<Size>;

    /// Rasterize 1-indexed `page` at `scale` (1.0 = one pixel per PDF point).
    fn rasterize(&self, page: u32, scale: f64) -> BoxFuture<'_, EngineResult<Raster>>;
}
