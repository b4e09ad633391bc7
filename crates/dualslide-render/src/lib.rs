//! Dualslide Render Library
//!
//! Turns PDF pages into rasters through a pluggable engine, caches them, and
//! cuts the audience and notes regions into display-ready surfaces.

mod cache;
mod engine;
mod gate;
mod pipeline;
mod raster;

#[cfg(feature = "pdfium")]
mod pdfium;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use cache::{CacheKey, DEFAULT_CACHE_SIZE, PageCache};
pub use engine::{BoxFuture, EngineError, EngineResult, PdfDocument, PdfEngine};
pub use gate::{RenderGate, RenderTicket};
pub use pipeline::{
    NOTES_RESOLUTION_MULTIPLIER, NOTES_SCALE_FACTOR, RenderError, RenderResult, RenderSettings,
    SlideRenderer,
};
pub use raster::{Placement, Raster, Surface};

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumEngine;
