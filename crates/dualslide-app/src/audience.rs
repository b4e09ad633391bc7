//! Audience window controller.
//!
//! Mirrors the presenter session from received messages and renders the
//! audience region with its own engine, document copy and cache.

use dualslide_core::{
    AudienceEndpoint, AudienceSync, AudienceUpdate, DisplayMode, Envelope, LayoutConfig,
    MessageSource, SessionMirror, WindowLink,
};
use dualslide_render::{PdfEngine, Raster, SlideRenderer, Surface};
use kurbo::{Point, Size};

use crate::config::AudienceConfig;

/// Session id from an audience page query string such as `?session=abc`.
pub fn session_from_query(query: &str) -> Option<String> {
    query
        .trim_start_matches(['?', '#'])
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, value)| *key == "session" && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub struct Audience {
    config: AudienceConfig,
    sync: AudienceSync,
    inbox: Box<dyn MessageSource>,
    renderer: SlideRenderer,
    slide: Option<Surface>,
}

impl Audience {
    pub fn new(
        config: AudienceConfig,
        engine: Box<dyn PdfEngine>,
        session_id: impl Into<String>,
        presenter: Box<dyn WindowLink>,
        inbox: Box<dyn MessageSource>,
    ) -> Self {
        let renderer = SlideRenderer::new(engine, config.render);
        Self {
            config,
            sync: AudienceSync::new(session_id, presenter),
            inbox,
            renderer,
            slide: None,
        }
    }

    /// Audience side of an in-process window.
    pub fn from_endpoint(
        config: AudienceConfig,
        engine: Box<dyn PdfEngine>,
        endpoint: AudienceEndpoint,
    ) -> Self {
        Self::new(
            config,
            engine,
            endpoint.session_id,
            Box::new(endpoint.link),
            Box::new(endpoint.inbox),
        )
    }

    /// Say HELLO to the presenter. Once per window lifetime.
    pub fn start(&mut self) -> bool {
        log::info!("Audience window starting for session {}", self.sync.session_id());
        self.sync.announce()
    }

    pub fn mirror(&self) -> &SessionMirror {
        self.sync.mirror()
    }

    /// Last rendered slide. Kept when a render is skipped.
    pub fn slide(&self) -> Option<&Surface> {
        self.slide.as_ref()
    }

    pub fn has_document(&self) -> bool {
        self.renderer.has_document()
    }

    /// Apply everything the presenter sent since the last poll.
    pub async fn poll(&mut self) -> Vec<AudienceUpdate> {
        let mut updates = Vec::new();
        for envelope in self.inbox.drain() {
            if let Some(update) = self.apply(envelope).await {
                updates.push(update);
            }
        }
        updates
    }

    pub async fn apply(&mut self, envelope: Envelope) -> Option<AudienceUpdate> {
        let update = self.sync.handle(envelope)?;
        match &update {
            AudienceUpdate::Document(bytes) => {
                match self.renderer.load_document(bytes.clone()).await {
                    Ok(_) => self.render().await,
                    Err(e) => self.report_error(format!("Failed to load document: {}", e)),
                }
            }
            AudienceUpdate::State if self.sync.mirror().total_pages == 0 => {
                // presenter went back to document selection
                if self.renderer.has_document() {
                    log::info!("Presenter closed the document");
                }
                self.renderer.unload();
                self.slide = None;
            }
            AudienceUpdate::State | AudienceUpdate::Navigated(_) => self.render().await,
            AudienceUpdate::Mode(_) | AudienceUpdate::Pointer(_) => {}
        }
        Some(update)
    }

    /// Render the mirrored page. Failures go back to the presenter.
    pub async fn render(&mut self) {
        if !self.renderer.has_document() {
            return;
        }
        let (page, location, split) = {
            let mirror = self.sync.mirror();
            (mirror.page, mirror.location, mirror.split)
        };
        let layout = match LayoutConfig::new(location, split, self.config.scale) {
            Ok(layout) => layout,
            Err(e) => {
                self.report_error(format!("Bad layout from presenter: {}", e));
                return;
            }
        };

        match self
            .renderer
            .render_audience_slide(page, &layout, self.config.display_area)
            .await
        {
            Ok(Some(surface)) => self.slide = Some(surface),
            Ok(None) => {}
            Err(e) => self.report_error(format!("Failed to render page {}: {}", page, e)),
        }
    }

    pub async fn resize(&mut self, area: Size) {
        self.config.display_area = area;
        self.render().await;
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.sync.toggle_fullscreen()
    }

    pub fn report_error(&self, message: String) {
        log::warn!("{}", message);
        self.sync.report_error(message);
    }

    /// Pointer position in display coordinates, if the presenter shows one.
    pub fn pointer_position(&self) -> Option<Point> {
        let position = self.mirror().pointer.position.filter(|_| self.mirror().pointer.active)?;
        let placement = self.slide.as_ref()?.placement;
        Some(Point::new(
            placement.x + position.x * placement.width,
            placement.y + position.y * placement.height,
        ))
    }

    /// What the audience currently sees, honoring black and white modes.
    pub fn frame(&self) -> Option<Raster> {
        let slide = self.slide.as_ref()?;
        let (width, height) = (slide.raster.width(), slide.raster.height());
        match self.mirror().mode {
            DisplayMode::Normal => Some(slide.raster.clone()),
            DisplayMode::Black => Some(Raster::filled(width, height, [0, 0, 0, 255])),
            DisplayMode::White => Some(Raster::new(width, height)),
        }
    }
}
