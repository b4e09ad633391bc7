//! Rasterization pipeline: page → cached full raster → region surface.

use std::sync::Arc;

use dualslide_core::LayoutConfig;
use kurbo::Size;
use thiserror::Error;

use crate::cache::{DEFAULT_CACHE_SIZE, PageCache};
use crate::engine::{EngineError, PdfDocument, PdfEngine};
use crate::raster::{Placement, Raster, Surface};

/// Notes are rasterized at this multiple of the slide scale for legibility.
pub const NOTES_SCALE_FACTOR: f64 = 1.5;

/// Extra backing-store density applied to the notes surface.
pub const NOTES_RESOLUTION_MULTIPLIER: f64 = 1.5;

/// Render errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// A render was requested before any document was opened.
    #[error("No document loaded")]
    DocumentNotLoaded,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    /// Device pixels per CSS pixel.
    pub device_pixel_ratio: f64,
    pub notes_scale_factor: f64,
    pub notes_resolution: f64,
    pub cache_capacity: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            device_pixel_ratio: 1.0,
            notes_scale_factor: NOTES_SCALE_FACTOR,
            notes_resolution: NOTES_RESOLUTION_MULTIPLIER,
            cache_capacity: DEFAULT_CACHE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum RegionKind {
    /// Audience region, fit to width.
    Slide,
    /// Notes region, fit within and letterboxed, extra density.
    Notes,
    /// Audience region, fit within.
    Preview,
}

/// Renders slides and notes for one window. Each window owns its own
/// renderer, engine document and cache.
pub struct SlideRenderer {
    engine: Box<dyn PdfEngine>,
    document: Option<Box<dyn PdfDocument>>,
    cache: PageCache,
    settings: RenderSettings,
}

impl SlideRenderer {
    pub fn new(engine: Box<dyn PdfEngine>, settings: RenderSettings) -> Self {
        Self {
            engine,
            document: None,
            cache: PageCache::new(settings.cache_capacity),
            settings,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Change the pixel density. Cached rasters are dropped.
    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        if ratio > 0.0 && (ratio - self.settings.device_pixel_ratio).abs() > f64::EPSILON {
            self.settings.device_pixel_ratio = ratio;
            self.cache.clear();
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// Pages of the open document, 0 without one.
    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, |d| d.page_count())
    }

    /// Size of `page` in PDF points.
    pub fn page_size(&self, page: u32) -> Option<Size> {
        self.document.as_ref().and_then(|d| d.page_size(page))
    }

    pub fn is_valid_page(&self, page: u32) -> bool {
        page >= 1 && page <= self.page_count()
    }

    /// Open a document. On failure the previous document stays active.
    pub async fn load_document(&mut self, bytes: Vec<u8>) -> RenderResult<u32> {
        let document = self.engine.open(bytes).await?;
        let pages = document.page_count();
        if pages == 0 {
            return Err(EngineError::Open("document has no pages".to_string()).into());
        }
        self.cache.clear();
        self.document = Some(document);
        log::info!("Opened document with {} pages", pages);
        Ok(pages)
    }

    /// Close the document and drop every cached raster.
    pub fn unload(&mut self) {
        self.document = None;
        self.cache.clear();
    }

    /// Full-page raster at `scale`, from the cache when possible.
    pub async fn render_full_page(&mut self, page: u32, scale: f64) -> RenderResult<Arc<Raster>> {
        let Some(document) = self.document.as_deref() else {
            return Err(RenderError::DocumentNotLoaded);
        };
        if let Some(raster) = self.cache.get(page, scale) {
            return Ok(raster);
        }

        let viewport_scale = scale * self.settings.device_pixel_ratio;
        let raster = Arc::new(document.rasterize(page, viewport_scale).await?);
        log::debug!(
            "Rasterized page {} at {:.2} ({}x{})",
            page,
            viewport_scale,
            raster.width(),
            raster.height()
        );
        self.cache.put(page, scale, raster.clone());
        Ok(raster)
    }

    /// Audience region of `page`, fit to the width of `area`.
    ///
    /// `Ok(None)` when no document is open or `page` is out of range.
    pub async fn render_audience_slide(
        &mut self,
        page: u32,
        layout: &LayoutConfig,
        area: Size,
    ) -> RenderResult<Option<Surface>> {
        self.render_region(page, layout.scale(), layout, area, RegionKind::Slide)
            .await
    }

    /// Notes region of `page`, fit within `area`.
    ///
    /// `Ok(None)` when no document is open or `page` is out of range.
    pub async fn render_notes_area(
        &mut self,
        page: u32,
        layout: &LayoutConfig,
        area: Size,
    ) -> RenderResult<Option<Surface>> {
        let scale = layout.scale() * self.settings.notes_scale_factor;
        self.render_region(page, scale, layout, area, RegionKind::Notes)
            .await
    }

    /// Audience region of the page after `page`, if previews are enabled.
    pub async fn render_next_preview(
        &mut self,
        page: u32,
        layout: &LayoutConfig,
        area: Size,
    ) -> RenderResult<Option<Surface>> {
        let Some(next) = page.checked_add(1).filter(|_| layout.show_next_preview()) else {
            return Ok(None);
        };
        self.render_region(next, layout.scale(), layout, area, RegionKind::Preview)
            .await
    }

    async fn render_region(
        &mut self,
        page: u32,
        scale: f64,
        layout: &LayoutConfig,
        area: Size,
        kind: RegionKind,
    ) -> RenderResult<Option<Surface>> {
        if !self.is_valid_page(page) {
            log::debug!("Skipping render of page {} ({} pages)", page, self.page_count());
            return Ok(None);
        }

        let full = self.render_full_page(page, scale).await?;
        let regions = layout.regions(full.width(), full.height());
        let dpr = self.settings.device_pixel_ratio;
        let (region, placement, density) = match kind {
            RegionKind::Slide => (
                regions.audience,
                Placement::fit_to_width(regions.audience, area),
                dpr,
            ),
            RegionKind::Notes => (
                regions.notes,
                Placement::fit_within(regions.notes, area),
                dpr * self.settings.notes_resolution,
            ),
            RegionKind::Preview => (
                regions.audience,
                Placement::fit_within(regions.audience, area),
                dpr,
            ),
        };
        if region.is_empty() {
            log::debug!("Empty {:?} region on page {}", kind, page);
            return Ok(None);
        }

        let (width, height) = placement.pixel_size(density);
        Ok(Some(Surface {
            page,
            raster: full.crop_resized(region, width, height),
            placement,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEngine, fake_pdf};
    use dualslide_core::NotesLocation;
    use pollster::block_on;

    fn renderer(engine: FakeEngine) -> SlideRenderer {
        SlideRenderer::new(Box::new(engine), RenderSettings::default())
    }

    #[test]
    fn test_full_page_requires_document() {
        let mut r = renderer(FakeEngine::new(3));
        assert_eq!(
            block_on(r.render_full_page(1, 1.0)),
            Err(RenderError::DocumentNotLoaded)
        );
    }

    #[test]
    fn test_full_page_is_cached() {
        let engine = FakeEngine::new(3);
        let calls = engine.rasterize_calls();
        let mut r = renderer(engine);
        block_on(r.load_document(fake_pdf())).unwrap();

        let a = block_on(r.render_full_page(2, 1.0)).unwrap();
        let b = block_on(r.render_full_page(2, 1.0)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);

        block_on(r.render_full_page(2, 1.5)).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_device_pixel_ratio_scales_viewport() {
        let engine = FakeEngine::new(1).with_page_size(200, 100);
        let mut r = SlideRenderer::new(
            Box::new(engine),
            RenderSettings {
                device_pixel_ratio: 2.0,
                ..RenderSettings::default()
            },
        );
        block_on(r.load_document(fake_pdf())).unwrap();
        let full = block_on(r.render_full_page(1, 1.0)).unwrap();
        assert_eq!((full.width(), full.height()), (400, 200));
    }

    #[test]
    fn test_engine_errors_propagate() {
        let mut r = renderer(FakeEngine::new(3).failing_on(2));
        block_on(r.load_document(fake_pdf())).unwrap();
        assert!(matches!(
            block_on(r.render_full_page(2, 1.0)),
            Err(RenderError::Engine(EngineError::Rasterize(_)))
        ));
        assert!(matches!(
            block_on(r.load_document(b"not a pdf".to_vec())),
            Err(RenderError::Engine(EngineError::Open(_)))
        ));
        // failed load keeps the old document
        assert_eq!(r.page_count(), 3);
    }

    #[test]
    fn test_out_of_range_regions_are_skipped() {
        let mut r = renderer(FakeEngine::new(3));
        let layout = LayoutConfig::default();
        let area = Size::new(400.0, 300.0);

        assert_eq!(block_on(r.render_audience_slide(1, &layout, area)), Ok(None));

        block_on(r.load_document(fake_pdf())).unwrap();
        assert_eq!(block_on(r.render_audience_slide(0, &layout, area)), Ok(None));
        assert_eq!(block_on(r.render_notes_area(4, &layout, area)), Ok(None));
        assert!(block_on(r.render_audience_slide(3, &layout, area)).unwrap().is_some());
    }

    #[test]
    fn test_audience_slide_fits_width() {
        let mut r = renderer(FakeEngine::new(2).with_page_size(400, 150));
        block_on(r.load_document(fake_pdf())).unwrap();
        let layout = LayoutConfig::default();

        let slide = block_on(r.render_audience_slide(2, &layout, Size::new(100.0, 500.0)))
            .unwrap()
            .unwrap();
        // audience region is 200x150
        assert_eq!(slide.placement.width, 100.0);
        assert_eq!(slide.placement.height, 75.0);
        assert_eq!((slide.raster.width(), slide.raster.height()), (100, 75));
        assert_eq!(slide.raster.pixel(50, 37), Some(FakeEngine::audience_color(2)));
    }

    #[test]
    fn test_notes_use_higher_scale_and_letterbox() {
        let engine = FakeEngine::new(1).with_page_size(400, 150);
        let calls = engine.rasterize_calls();
        let mut r = renderer(engine);
        block_on(r.load_document(fake_pdf())).unwrap();
        let layout = LayoutConfig::default();

        let notes = block_on(r.render_notes_area(1, &layout, Size::new(400.0, 600.0)))
            .unwrap()
            .unwrap();
        // notes region at 1.5x is 300x225, aspect 4:3 inside a 400x600 area
        assert_eq!((notes.placement.width, notes.placement.height), (400.0, 300.0));
        assert_eq!(notes.placement.y, 150.0);
        assert_eq!((notes.raster.width(), notes.raster.height()), (600, 450));
        assert_eq!(notes.raster.pixel(10, 10), Some(FakeEngine::notes_color(1)));
        assert!(r.cache().contains(1, 1.5));

        block_on(r.render_audience_slide(1, &layout, Size::new(100.0, 100.0))).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_location_changes_the_cut() {
        let mut r = renderer(FakeEngine::new(1).with_page_size(400, 150));
        block_on(r.load_document(fake_pdf())).unwrap();
        let layout = LayoutConfig::new(NotesLocation::Left, 0.5, 1.0).unwrap();

        // With notes on the left the audience half is the right half
        let slide = block_on(r.render_audience_slide(1, &layout, Size::new(200.0, 150.0)))
            .unwrap()
            .unwrap();
        assert_eq!(slide.raster.pixel(10, 10), Some(FakeEngine::notes_color(1)));
    }

    #[test]
    fn test_next_preview() {
        let mut r = renderer(FakeEngine::new(2));
        block_on(r.load_document(fake_pdf())).unwrap();
        let mut layout = LayoutConfig::default();
        let area = Size::new(160.0, 90.0);

        let next = block_on(r.render_next_preview(1, &layout, area)).unwrap().unwrap();
        assert_eq!(next.page, 2);
        assert_eq!(block_on(r.render_next_preview(2, &layout, area)), Ok(None));

        assert_eq!(block_on(r.render_next_preview(u32::MAX, &layout, area)), Ok(None));

        layout.set_show_next_preview(false);
        assert_eq!(block_on(r.render_next_preview(1, &layout, area)), Ok(None));
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let mut r = renderer(FakeEngine::new(0));
        assert!(matches!(
            block_on(r.load_document(fake_pdf())),
            Err(RenderError::Engine(EngineError::Open(_)))
        ));
        assert!(!r.has_document());
    }

    #[test]
    fn test_unload_clears_cache() {
        let mut r = renderer(FakeEngine::new(2));
        block_on(r.load_document(fake_pdf())).unwrap();
        block_on(r.render_full_page(1, 1.0)).unwrap();
        r.unload();
        assert!(r.cache().is_empty());
        assert!(!r.has_document());
        assert_eq!(r.page_count(), 0);
    }

    #[test]
    fn test_reload_clears_cache() {
        let engine = FakeEngine::new(2);
        let calls = engine.rasterize_calls();
        let mut r = renderer(engine);
        block_on(r.load_document(fake_pdf())).unwrap();
        block_on(r.render_full_page(1, 1.0)).unwrap();
        assert!(!r.cache().is_empty());

        block_on(r.load_document(fake_pdf())).unwrap();
        assert!(r.cache().is_empty());
        block_on(r.render_full_page(1, 1.0)).unwrap();
        assert_eq!(calls.get(), 2);

        // a rejected document leaves the cache alone
        assert!(block_on(r.load_document(b"nope".to_vec())).is_err());
        assert!(!r.cache().is_empty());
    }
}
