//! Native engine backed by the PDFium library.

use std::rc::Rc;

use kurbo::Size;
use pdfium_render::prelude::*;

use crate::engine::{BoxFuture, EngineError, EngineResult, PdfDocument, PdfEngine};
use crate::raster::Raster;

#[derive(Clone)]
pub struct PdfiumEngine {
    pdfium: Rc<Pdfium>,
}

impl PdfiumEngine {
    /// Bind to the system PDFium library.
    pub fn load() -> EngineResult<Self> {
        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| EngineError::Open(format!("Failed to load pdfium: {:?}", e)))?;
        Ok(Self {
            pdfium: Rc::new(Pdfium::new(bindings)),
        })
    }
}

impl PdfEngine for PdfiumEngine {
    fn open(&self, bytes: Vec<u8>) -> BoxFuture<'_, EngineResult<Box<dyn PdfDocument>>> {
        Box::pin(async move {
            let page_sizes = {
                let document = self
                    .pdfium
                    .load_pdf_from_byte_slice(&bytes, None)
                    .map_err(|e| EngineError::Open(e.to_string()))?;
                document
                    .pages()
                    .iter()
                    .map(|page| Size::new(page.width().value as f64, page.height().value as f64))
                    .collect::<Vec<_>>()
            };
            log::debug!("PDFium opened {} pages", page_sizes.len());
            let document: Box<dyn PdfDocument> = Box::new(PdfiumDocument {
                pdfium: self.pdfium.clone(),
                bytes,
                page_sizes,
            });
            Ok(document)
        })
    }
}

// PDFium documents borrow the library handle, so the bytes are kept and
// reopened per render.
struct PdfiumDocument {
    pdfium: Rc<Pdfium>,
    bytes: Vec<u8>,
    page_sizes: Vec<Size>,
}

impl PdfiumDocument {
    fn rasterize_sync(&self, page: u32, scale: f64) -> EngineResult<Raster> {
        let Some(size) = self.page_size(page) else {
            return Err(EngineError::Page {
                page,
                reason: format!("document has {} pages", self.page_count()),
            });
        };
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(&self.bytes, None)
            .map_err(|e| EngineError::Open(e.to_string()))?;
        let pdf_page = document
            .pages()
            .get((page - 1) as u16)
            .map_err(|e| EngineError::Page {
                page,
                reason: e.to_string(),
            })?;

        let width = ((size.width * scale).round() as i32).max(1);
        let height = ((size.height * scale).round() as i32).max(1);
        let config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);
        let bitmap = pdf_page
            .render_with_config(&config)
            .map_err(|e| EngineError::Rasterize(e.to_string()))?;

        let (w, h) = (bitmap.width() as u32, bitmap.height() as u32);
        Raster::from_rgba(w, h, bitmap.as_rgba_bytes())
            .ok_or_else(|| EngineError::Rasterize(format!("bitmap size mismatch for {w}x{h}")))
    }
}

impl PdfDocument for PdfiumDocument {
    fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    fn page_size(&self, page: u32) -> Option<Size> {
        page.checked_sub(1)
            .and_then(|index| self.page_sizes.get(index as usize))
            .copied()
    }

    fn rasterize(&self, page: u32, scale: f64) -> BoxFuture<'_, EngineResult<Raster>> {
        Box::pin(async move { self.rasterize_sync(page, scale) })
    }
}
