//! In-memory engine for tests.
//!
//! Pages are painted in two halves so region cuts can be checked by color:
//! the left half gets [`FakeEngine::audience_color`], the right half
//! [`FakeEngine::notes_color`]. The page number is in the green channel.

use std::cell::Cell;
use std::rc::Rc;

use crate::engine::{BoxFuture, EngineError, EngineResult, PdfDocument, PdfEngine};
use crate::raster::Raster;
use image::{Rgba, RgbaImage};
use kurbo::Size;

/// Minimal bytes the fake engine accepts as a document.
pub fn fake_pdf() -> Vec<u8> {
    b"%PDF-1.7\n%fake\n".to_vec()
}

#[derive(Debug, Clone)]
pub struct FakeEngine {
    pages: u32,
    page_width: u32,
    page_height: u32,
    failing_page: Option<u32>,
    calls: Rc<Cell<usize>>,
}

impl FakeEngine {
    /// `pages` pages of 200x100 points.
    pub fn new(pages: u32) -> Self {
        Self {
            pages,
            page_width: 200,
            page_height: 100,
            failing_page: None,
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn with_page_size(mut self, width: u32, height: u32) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Make rasterizing `page` fail.
    pub fn failing_on(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    /// Shared counter of rasterize calls across all opened documents.
    pub fn rasterize_calls(&self) -> Rc<Cell<usize>> {
        self.calls.clone()
    }

    pub fn audience_color(page: u32) -> [u8; 4] {
        [200, page as u8, 0, 255]
    }

    pub fn notes_color(page: u32) -> [u8; 4] {
        [0, page as u8, 200, 255]
    }
}

impl PdfEngine for FakeEngine {
    fn open(&self, bytes: Vec<u8>) -> BoxFuture<'_, EngineResult<Box<dyn PdfDocument>>> {
        Box::pin(async move {
            if !bytes.starts_with(b"%PDF") {
                return Err(EngineError::Open("missing %PDF header".to_string()));
            }
            let document: Box<dyn PdfDocument> = Box::new(FakeDocument {
                engine: self.clone(),
            });
            Ok(document)
        })
    }
}

struct FakeDocument {
    engine: FakeEngine,
}

impl PdfDocument for FakeDocument {
    fn page_count(&self) -> u32 {
        self.engine.pages
    }

    fn page_size(&self, page: u32) -> Option<Size> {
        (page >= 1 && page <= self.engine.pages).then(|| {
            Size::new(self.engine.page_width as f64, self.engine.page_height as f64)
        })
    }

    fn rasterize(&self, page: u32, scale: f64) -> BoxFuture<'_, EngineResult<Raster>> {
        Box::pin(async move {
            let engine = &self.engine;
            if page == 0 || page > engine.pages {
                return Err(EngineError::Page {
                    page,
                    reason: "out of range".to_string(),
                });
            }
            if engine.failing_page == Some(page) {
                return Err(EngineError::Rasterize(format!("page {page} is broken")));
            }
            engine.calls.set(engine.calls.get() + 1);

            let width = ((engine.page_width as f64 * scale).round() as u32).max(1);
            let height = ((engine.page_height as f64 * scale).round() as u32).max(1);
            let half = width / 2;
            let image = RgbaImage::from_fn(width, height, |x, _| {
                if x < half {
                    Rgba(FakeEngine::audience_color(page))
                } else {
                    Rgba(FakeEngine::notes_color(page))
                }
            });
            Ok(Raster::from_image(image))
        })
    }
}
