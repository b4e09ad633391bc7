//! Presenter console controller.
//!
//! Owns the session, the presenter's renderer and the link to the audience
//! window. The host calls the action methods from UI events and [`Presenter::poll`]
//! from its event loop.

use std::rc::Rc;

use dualslide_core::{
    Clock, DisplayMode, Duration, Interval, MessageSource, Navigation, NotesLocation,
    PointerState, PresentationTimer, PresenterEvent, PresenterSync, Session, TimerState,
    WindowOpener, WindowRequest, format_elapsed,
};
use dualslide_render::{PdfEngine, RenderGate, RenderTicket, SlideRenderer, Surface};
use kurbo::Point;

use crate::config::PresenterConfig;
use crate::error::{AppError, AppResult};
use crate::loader::{DocumentFetcher, HttpFetcher, LoadError, parse_document_url};

/// Rendered presenter views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Previews {
    /// Audience region of the current page.
    pub slide: Option<Surface>,
    pub notes: Option<Surface>,
    /// Audience region of the next page.
    pub next: Option<Surface>,
}

/// Things the presenter UI should update on.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Audience(PresenterEvent),
    /// Result of the periodic connection check, only sent on change.
    ConnectionChanged(bool),
    /// Periodic tick while the timer runs.
    TimerTick(Duration),
}

pub struct Presenter {
    config: PresenterConfig,
    session: Session,
    sync: PresenterSync,
    renderer: SlideRenderer,
    opener: Box<dyn WindowOpener>,
    inbox: Box<dyn MessageSource>,
    fetcher: Box<dyn DocumentFetcher>,
    clock: Rc<dyn Clock>,
    timer: PresentationTimer,
    connection_poll: Interval,
    timer_tick: Interval,
    /// The presenter's own copy of the loaded document.
    document: Option<Vec<u8>>,
    gate: RenderGate,
    previews: Previews,
    pointer_pressed: bool,
    last_connected: bool,
}

impl Presenter {
    pub fn new(
        config: PresenterConfig,
        engine: Box<dyn PdfEngine>,
        opener: Box<dyn WindowOpener>,
        inbox: Box<dyn MessageSource>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let session = Session::new(config.layout);
        let sync = PresenterSync::with_pointer_interval(session.id(), config.pointer_interval);
        let renderer = SlideRenderer::new(engine, config.render);
        let mut connection_poll = Interval::new(config.connection_poll_interval);
        connection_poll.start(clock.now());
        let timer_tick = Interval::new(config.timer_tick_interval);

        Self {
            config,
            session,
            sync,
            renderer,
            opener,
            inbox,
            fetcher: Box::new(HttpFetcher),
            clock,
            timer: PresentationTimer::new(),
            connection_poll,
            timer_tick,
            document: None,
            gate: RenderGate::new(),
            previews: Previews::default(),
            pointer_pressed: false,
            last_connected: false,
        }
    }

    /// Replace the URL fetcher.
    pub fn with_fetcher(mut self, fetcher: Box<dyn DocumentFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn config(&self) -> &PresenterConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn previews(&self) -> &Previews {
        &self.previews
    }

    pub fn document_bytes(&self) -> Option<&[u8]> {
        self.document.as_deref()
    }

    // ========================================================================
    // Audience window
    // ========================================================================

    /// Open (or reopen) the audience window. The connection starts over and
    /// completes when the new window says HELLO. False if the window was
    /// blocked.
    pub fn open_audience_window(&mut self) -> bool {
        let request = WindowRequest {
            name: self.config.audience_window_name.clone(),
            session_id: self.session.id().to_string(),
            size: self.config.audience_window_size,
        };
        match self.opener.open(&request) {
            Some(link) => {
                self.sync.attach_window(link);
                true
            }
            None => {
                log::warn!("Could not open the audience window");
                false
            }
        }
    }

    pub fn close_audience_window(&mut self) {
        self.sync.detach_window();
    }

    /// The audience window is alive and has completed the handshake.
    pub fn is_connected(&self) -> bool {
        self.sync.is_connected()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Open `bytes` as the new document. On failure the previous document
    /// and page stay as they were. Once the document is open, a failed
    /// preview render is logged and the load still succeeds.
    pub async fn load_from_bytes(&mut self, bytes: Vec<u8>) -> AppResult<u32> {
        let pages = self
            .renderer
            .load_document(bytes.clone())
            .await
            .map_err(|e| LoadError::Rejected(e.to_string()))?;

        self.session.document_loaded(pages);
        self.pointer_pressed = false;
        self.sync.send_state(&self.session);
        self.sync.send_pdf_data(&bytes, self.session.layout());
        self.document = Some(bytes);
        if !self.connection_poll.is_active() {
            self.connection_poll.start(self.clock.now());
        }
        log::info!("Loaded document with {} pages", pages);

        let _ = self.refresh_previews().await;
        Ok(pages)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub async fn load_from_file(&mut self, path: &std::path::Path) -> AppResult<u32> {
        let bytes = crate::loader::read_pdf_file(path)?;
        self.load_from_bytes(bytes).await
    }

    pub async fn load_from_url(&mut self, url: &str) -> AppResult<u32> {
        let url = parse_document_url(url)?;
        let bytes = self.fetcher.fetch(url).await?;
        self.load_from_bytes(bytes).await
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Go to `page`. Out-of-range pages are dropped without any effect.
    /// Staying on the current page re-renders without messaging the audience.
    pub async fn navigate_to(&mut self, page: u32) -> AppResult<Navigation> {
        let navigation = self.session.go_to(page);
        match navigation {
            Navigation::Rejected => {
                log::debug!(
                    "Ignoring navigation to page {} of {}",
                    page,
                    self.session.total_pages()
                );
            }
            Navigation::Unchanged => self.refresh_previews().await?,
            Navigation::Moved { to, .. } => {
                self.pointer_pressed = false;
                self.sync.send_pointer_hidden();
                let rendered = self.refresh_previews().await;
                self.sync.send_navigate(to);
                rendered?;
            }
        }
        Ok(navigation)
    }

    pub async fn go_to(&mut self, page: u32) -> AppResult<Navigation> {
        self.navigate_to(page).await
    }

    pub async fn next(&mut self) -> AppResult<Navigation> {
        self.navigate_to(self.session.page().saturating_add(1)).await
    }

    pub async fn prev(&mut self) -> AppResult<Navigation> {
        self.navigate_to(self.session.page().saturating_sub(1)).await
    }

    // ========================================================================
    // Layout
    // ========================================================================

    pub async fn set_location(&mut self, location: NotesLocation) -> AppResult<()> {
        if self.session.layout().location() == location {
            return Ok(());
        }
        self.session.set_location(location);
        self.sync.send_state(&self.session);
        self.refresh_previews().await
    }

    pub async fn set_split(&mut self, split: f64) -> AppResult<()> {
        self.session.set_split(split)?;
        self.sync.send_state(&self.session);
        self.refresh_previews().await
    }

    /// Presenter-side render scale. The audience picks its own.
    pub async fn set_scale(&mut self, scale: f64) -> AppResult<()> {
        self.session.set_scale(scale)?;
        self.refresh_previews().await
    }

    pub async fn set_show_next_preview(&mut self, show: bool) -> AppResult<()> {
        self.session.set_show_next_preview(show);
        self.refresh_previews().await
    }

    // ========================================================================
    // Display mode
    // ========================================================================

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if self.session.set_mode(mode) {
            log::info!("Display mode {}", mode);
            self.sync.send_mode(mode);
        }
    }

    pub fn toggle_black(&mut self) {
        self.set_mode(self.session.mode().toggled(DisplayMode::Black));
    }

    pub fn toggle_white(&mut self) {
        self.set_mode(self.session.mode().toggled(DisplayMode::White));
    }

    // ========================================================================
    // Pointer
    // ========================================================================
    //
    // Coordinates are CSS pixels relative to the slide preview area.

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.pointer_pressed = true;
        self.forward_pointer(x, y);
    }

    /// Only forwarded while the pointer is held down.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if self.pointer_pressed {
            self.forward_pointer(x, y);
        }
    }

    pub fn pointer_up(&mut self) {
        self.pointer_pressed = false;
        self.hide_pointer();
    }

    pub fn pointer_leave(&mut self) {
        self.pointer_pressed = false;
        self.hide_pointer();
    }

    fn forward_pointer(&mut self, x: f64, y: f64) {
        let Some(placement) = self.previews.slide.as_ref().map(|s| s.placement) else {
            return;
        };
        let Some(normalized) = placement.normalize(Point::new(x, y)) else {
            return;
        };
        let pointer = PointerState::at(normalized.x, normalized.y);
        self.session.set_pointer(pointer);
        self.sync.send_pointer_moved(pointer, self.clock.now());
    }

    fn hide_pointer(&mut self) {
        self.session.clear_pointer();
        self.sync.send_pointer_hidden();
    }

    // ========================================================================
    // Timer
    // ========================================================================

    pub fn start_timer(&mut self) {
        let now = self.clock.now();
        self.timer.start(now);
        if !self.timer_tick.is_active() {
            self.timer_tick.start(now);
        }
    }

    pub fn pause_timer(&mut self) {
        self.timer.pause(self.clock.now());
        self.timer_tick.stop();
    }

    pub fn reset_timer(&mut self) {
        self.timer.reset();
        self.timer_tick.stop();
    }

    pub fn toggle_timer(&mut self) {
        if self.timer.is_running() {
            self.pause_timer();
        } else {
            self.start_timer();
        }
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed(self.clock.now())
    }

    pub fn timer_text(&self) -> String {
        format_elapsed(self.elapsed())
    }

    // ========================================================================
    // Host loop
    // ========================================================================

    /// Handle audience messages and run due periodic work.
    pub fn poll(&mut self) -> Vec<UiEvent> {
        let mut events = Vec::new();

        for envelope in self.inbox.drain() {
            let document = self.document.as_deref();
            if let Some(event) = self.sync.handle(envelope, &self.session, document) {
                events.push(UiEvent::Audience(event));
            }
        }

        let now = self.clock.now();
        if self.connection_poll.poll(now) {
            let connected = self.sync.is_connected();
            if connected != self.last_connected {
                log::info!(
                    "Audience {}",
                    if connected { "connected" } else { "disconnected" }
                );
                self.last_connected = connected;
                events.push(UiEvent::ConnectionChanged(connected));
            }
        }
        if self.timer_tick.poll(now) {
            events.push(UiEvent::TimerTick(self.timer.elapsed(now)));
        }

        events
    }

    /// Back to document selection: drop the document, previews, cache and
    /// timer, and stop periodic work. The audience window stays attached and
    /// is told there is no document anymore.
    pub fn reset(&mut self) {
        self.gate.invalidate();
        self.pointer_pressed = false;
        self.hide_pointer();
        self.session.reset();
        self.sync.send_state(&self.session);
        self.renderer.unload();
        self.document = None;
        self.previews = Previews::default();
        self.timer.reset();
        self.timer_tick.stop();
        self.connection_poll.stop();
        self.last_connected = false;
        log::info!("Session reset");
    }

    pub fn is_polling(&self) -> bool {
        self.connection_poll.is_active() || self.timer_tick.is_active()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Start a render generation. Earlier tickets become stale.
    pub fn begin_render(&mut self) -> RenderTicket {
        self.gate.begin()
    }

    /// Render the views for the current page without publishing them.
    ///
    /// Each view is rendered on its own: a failed view is left empty and the
    /// first failure of the current page is returned next to what did render.
    /// The next-page preview never fails the pass.
    pub async fn render_previews(&mut self) -> (Previews, Option<AppError>) {
        if !self.renderer.has_document() {
            return (Previews::default(), None);
        }
        let page = self.session.page();
        let layout = *self.session.layout();
        let mut error = None;

        let slide = match self
            .renderer
            .render_audience_slide(page, &layout, self.config.slide_area)
            .await
        {
            Ok(slide) => slide,
            Err(e) => {
                error = Some(e);
                None
            }
        };
        let notes = match self
            .renderer
            .render_notes_area(page, &layout, self.config.notes_area)
            .await
        {
            Ok(notes) => notes,
            Err(e) => {
                if error.is_none() {
                    error = Some(e);
                }
                None
            }
        };
        let next = match self
            .renderer
            .render_next_preview(page, &layout, self.config.next_preview_area)
            .await
        {
            Ok(next) => next,
            Err(e) => {
                log::warn!("Next-page preview after page {} failed: {}", page, e);
                None
            }
        };

        (Previews { slide, notes, next }, error.map(AppError::from))
    }

    /// Publish `previews` if `ticket` is still the latest generation.
    pub fn commit_previews(&mut self, ticket: RenderTicket, previews: Previews) -> bool {
        if !self.gate.is_current(ticket) {
            log::debug!("Dropping stale render");
            return false;
        }
        self.previews = previews;
        true
    }

    async fn refresh_previews(&mut self) -> AppResult<()> {
        let ticket = self.begin_render();
        let (previews, error) = self.render_previews().await;
        self.commit_previews(ticket, previews);
        match error {
            Some(e) => {
                log::error!("Render failed on page {}: {}", self.session.page(), e);
                Err(e)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualslide_core::{
        AudienceEndpoint, Envelope, LocalWindowOpener, ManualClock, Message, WindowLink,
        regions_for,
    };
    use dualslide_render::BoxFuture;
    use dualslide_render::testing::{FakeEngine, fake_pdf};
    use pollster::block_on;
    use url::Url;

    struct Harness {
        presenter: Presenter,
        opener: LocalWindowOpener,
        clock: ManualClock,
    }

    fn harness(pages: u32) -> Harness {
        let (opener, inbox) = LocalWindowOpener::new();
        let clock = ManualClock::new();
        let presenter = Presenter::new(
            PresenterConfig::default(),
            Box::new(FakeEngine::new(pages)),
            Box::new(opener.clone()),
            Box::new(inbox),
            Rc::new(clock.clone()),
        );
        Harness {
            presenter,
            opener,
            clock,
        }
    }

    fn loaded(pages: u32) -> Harness {
        let mut h = harness(pages);
        block_on(h.presenter.load_from_bytes(fake_pdf())).unwrap();
        h
    }

    fn connect(h: &mut Harness) -> AudienceEndpoint {
        assert!(h.presenter.open_audience_window());
        let endpoint = h.opener.take_opened().unwrap();
        endpoint
            .link
            .post(&Envelope::new(endpoint.session_id.clone(), Message::Hello))
            .unwrap();
        h.presenter.poll();
        endpoint
    }

    fn kinds(endpoint: &mut AudienceEndpoint) -> Vec<&'static str> {
        endpoint
            .inbox
            .drain()
            .iter()
            .map(|e| e.message.type_name())
            .collect()
    }

    #[test]
    fn test_ten_page_session() {
        let mut h = loaded(10);
        let p = &mut h.presenter;
        assert_eq!(p.session().total_pages(), 10);
        assert_eq!(p.session().page(), 1);

        // FakeEngine pages are 200x100
        let regions = regions_for(200, 100, NotesLocation::Right, 0.5);
        assert_eq!((regions.audience.x, regions.audience.width), (0, 100));
        assert_eq!((regions.notes.x, regions.notes.width), (100, 100));
        assert_eq!(regions.audience.height, 100);

        assert_eq!(block_on(p.navigate_to(11)).unwrap(), Navigation::Rejected);
        assert_eq!(p.session().page(), 1);
        block_on(p.navigate_to(10)).unwrap();
        assert_eq!(block_on(p.navigate_to(0)).unwrap(), Navigation::Rejected);
        assert_eq!(p.session().page(), 10);
        assert_eq!(p.previews().slide.as_ref().unwrap().page, 10);
        assert!(p.previews().next.is_none());
    }

    #[test]
    fn test_handshake_resyncs_state_then_document() {
        let mut h = loaded(3);
        assert!(h.presenter.open_audience_window());
        assert!(!h.presenter.is_connected());

        let mut endpoint = h.opener.take_opened().unwrap();
        assert_eq!(endpoint.session_id, h.presenter.session().id());
        endpoint
            .link
            .post(&Envelope::new(endpoint.session_id.clone(), Message::Hello))
            .unwrap();

        let events = h.presenter.poll();
        assert_eq!(events, vec![UiEvent::Audience(PresenterEvent::AudienceConnected)]);
        assert!(h.presenter.is_connected());

        let received = endpoint.inbox.drain();
        assert_eq!(received.len(), 2);
        assert!(matches!(received[0].message, Message::State(ref s) if s.total_pages == 3));
        match &received[1].message {
            Message::PdfData(pdf) => assert_eq!(pdf.data, fake_pdf()),
            other => panic!("expected PDF_DATA, got {}", other.type_name()),
        }
        // the presenter keeps its own copy
        assert_eq!(h.presenter.document_bytes(), Some(fake_pdf().as_slice()));
    }

    #[test]
    fn test_reopened_window_gets_a_fresh_resync() {
        let mut h = loaded(3);
        let first = connect(&mut h);
        drop(first);
        assert!(!h.presenter.is_connected());

        let mut second = connect(&mut h);
        assert!(h.presenter.is_connected());
        assert_eq!(kinds(&mut second), vec!["STATE", "PDF_DATA"]);
    }

    #[test]
    fn test_handshake_without_document_sends_state_only() {
        let mut h = harness(3);
        let mut endpoint = connect(&mut h);
        assert_eq!(kinds(&mut endpoint), vec!["STATE"]);
    }

    #[test]
    fn test_navigation_hides_pointer_before_navigate() {
        let mut h = loaded(5);
        let mut endpoint = connect(&mut h);
        kinds(&mut endpoint);

        block_on(h.presenter.next()).unwrap();
        assert_eq!(kinds(&mut endpoint), vec!["POINTER", "NAVIGATE"]);

        // same page: re-render only
        assert_eq!(block_on(h.presenter.go_to(2)).unwrap(), Navigation::Unchanged);
        assert!(kinds(&mut endpoint).is_empty());

        // out of range: nothing at all
        block_on(h.presenter.go_to(9)).unwrap();
        assert!(kinds(&mut endpoint).is_empty());

        block_on(h.presenter.prev()).unwrap();
        assert_eq!(h.presenter.session().page(), 1);
        assert_eq!(block_on(h.presenter.prev()).unwrap(), Navigation::Rejected);
    }

    #[test]
    fn test_blocked_window_keeps_presenting() {
        let mut h = loaded(3);
        h.opener.set_blocked(true);
        assert!(!h.presenter.open_audience_window());
        block_on(h.presenter.next()).unwrap();
        assert_eq!(h.presenter.session().page(), 2);
        assert!(!h.presenter.is_connected());
    }

    #[test]
    fn test_failed_load_keeps_previous_document() {
        let mut h = loaded(10);
        block_on(h.presenter.navigate_to(5)).unwrap();

        let result = block_on(h.presenter.load_from_bytes(b"garbage".to_vec()));
        assert!(matches!(result, Err(AppError::Load(LoadError::Rejected(_)))));
        assert_eq!(h.presenter.session().page(), 5);
        assert_eq!(h.presenter.session().total_pages(), 10);
        assert_eq!(h.presenter.document_bytes(), Some(fake_pdf().as_slice()));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.pdf");
        std::fs::write(&path, fake_pdf()).unwrap();

        let mut h = harness(4);
        assert_eq!(block_on(h.presenter.load_from_file(&path)).unwrap(), 4);

        let wrong = dir.path().join("talk.txt");
        std::fs::write(&wrong, fake_pdf()).unwrap();
        assert!(matches!(
            block_on(h.presenter.load_from_file(&wrong)),
            Err(AppError::Load(LoadError::NotPdf(_)))
        ));
    }

    struct StaticFetcher(Vec<u8>);

    impl DocumentFetcher for StaticFetcher {
        fn fetch(&self, _url: Url) -> BoxFuture<'_, crate::loader::LoadResult<Vec<u8>>> {
            let bytes = self.0.clone();
            Box::pin(async move { Ok(bytes) })
        }
    }

    #[test]
    fn test_load_from_url() {
        let (opener, inbox) = LocalWindowOpener::new();
        let mut presenter = Presenter::new(
            PresenterConfig::default(),
            Box::new(FakeEngine::new(7)),
            Box::new(opener),
            Box::new(inbox),
            Rc::new(ManualClock::new()),
        )
        .with_fetcher(Box::new(StaticFetcher(fake_pdf())));

        assert_eq!(
            block_on(presenter.load_from_url("https://example.com/deck.pdf")).unwrap(),
            7
        );
        assert!(matches!(
            block_on(presenter.load_from_url("file:///tmp/deck.pdf")),
            Err(AppError::Load(LoadError::InvalidUrl { .. }))
        ));
    }

    #[test]
    fn test_pointer_is_normalized_and_rate_limited() {
        let mut h = loaded(3);
        let mut endpoint = connect(&mut h);
        endpoint.inbox.drain();

        // default slide area is 640 wide; audience half of a 200x100 page
        // is square, so the preview is 640x640
        h.presenter.pointer_down(320.0, 160.0);
        let pointer = h.presenter.session().pointer();
        assert_eq!(pointer, PointerState::at(0.5, 0.25));

        // just under 1ms apart; at exactly 1ms the 33ms limit sends at
        // t=0, 33, 66 and 99
        for _ in 0..100 {
            h.clock.advance(Duration::from_micros(990));
            h.presenter.pointer_move(100.0, 100.0);
        }
        h.presenter.pointer_up();

        let received = endpoint.inbox.drain();
        let active = received
            .iter()
            .filter(|e| matches!(e.message, Message::Pointer(ref p) if p.active))
            .count();
        assert!(active < 4, "{} pointer messages", active);
        assert!(matches!(
            received.last().map(|e| &e.message),
            Some(Message::Pointer(p)) if !p.active
        ));
        assert!(!h.presenter.session().pointer().is_visible());
    }

    #[test]
    fn test_pointer_move_without_press_is_ignored() {
        let mut h = loaded(3);
        let mut endpoint = connect(&mut h);
        endpoint.inbox.drain();

        h.presenter.pointer_move(10.0, 10.0);
        assert!(endpoint.inbox.drain().is_empty());
        h.presenter.pointer_leave();
        assert_eq!(kinds(&mut endpoint), vec!["POINTER"]);
    }

    #[test]
    fn test_mode_changes_are_broadcast_once() {
        let mut h = loaded(3);
        let mut endpoint = connect(&mut h);
        endpoint.inbox.drain();

        h.presenter.toggle_black();
        assert_eq!(h.presenter.session().mode(), DisplayMode::Black);
        h.presenter.set_mode(DisplayMode::Black);
        h.presenter.toggle_white();
        h.presenter.toggle_white();
        assert_eq!(h.presenter.session().mode(), DisplayMode::Normal);
        assert_eq!(kinds(&mut endpoint), vec!["MODE", "MODE", "MODE"]);
    }

    #[test]
    fn test_layout_setters() {
        let mut h = loaded(3);
        let mut endpoint = connect(&mut h);
        endpoint.inbox.drain();

        block_on(h.presenter.set_location(NotesLocation::Bottom)).unwrap();
        block_on(h.presenter.set_location(NotesLocation::Bottom)).unwrap();
        block_on(h.presenter.set_split(0.6)).unwrap();
        assert!(matches!(
            block_on(h.presenter.set_split(1.5)),
            Err(AppError::Layout(_))
        ));
        block_on(h.presenter.set_scale(2.0)).unwrap();
        assert_eq!(kinds(&mut endpoint), vec!["STATE", "STATE"]);

        block_on(h.presenter.set_show_next_preview(false)).unwrap();
        assert!(h.presenter.previews().next.is_none());
        assert_eq!(h.presenter.session().layout().split(), 0.6);
    }

    #[test]
    fn test_timer_and_ticks() {
        let mut h = harness(1);
        h.presenter.start_timer();
        h.clock.advance(Duration::from_millis(2000));
        let ticks = h
            .presenter
            .poll()
            .into_iter()
            .filter(|e| matches!(e, UiEvent::TimerTick(_)))
            .count();
        assert_eq!(ticks, 1);

        h.presenter.toggle_timer();
        assert_eq!(h.presenter.timer_state(), TimerState::Paused);
        assert_eq!(h.presenter.timer_text(), "00:02");

        h.clock.advance(Duration::from_secs(5));
        assert!(h.presenter.poll().is_empty());
        assert_eq!(h.presenter.elapsed(), Duration::from_millis(2000));

        h.presenter.reset_timer();
        assert_eq!(h.presenter.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_connection_status_is_polled() {
        let mut h = loaded(2);
        let endpoint = connect(&mut h);
        h.clock.advance(Duration::from_secs(2));
        assert_eq!(h.presenter.poll(), vec![UiEvent::ConnectionChanged(true)]);

        drop(endpoint);
        h.clock.advance(Duration::from_secs(2));
        assert_eq!(h.presenter.poll(), vec![UiEvent::ConnectionChanged(false)]);
    }

    #[test]
    fn test_audience_error_is_reported() {
        let mut h = loaded(2);
        let endpoint = connect(&mut h);
        endpoint
            .link
            .post(&Envelope::new(
                endpoint.session_id.clone(),
                Message::Error(dualslide_core::protocol::ErrorPayload {
                    message: "render failed".to_string(),
                }),
            ))
            .unwrap();
        assert_eq!(
            h.presenter.poll(),
            vec![UiEvent::Audience(PresenterEvent::AudienceError(
                "render failed".to_string()
            ))]
        );
    }

    #[test]
    fn test_reset_clears_everything_and_stops_polling() {
        let mut h = loaded(4);
        block_on(h.presenter.navigate_to(3)).unwrap();
        h.presenter.start_timer();
        assert!(h.presenter.is_polling());

        h.presenter.reset();
        assert!(!h.presenter.is_polling());
        assert!(!h.presenter.session().has_document());
        assert_eq!(h.presenter.session().page(), 1);
        assert!(h.presenter.document_bytes().is_none());
        assert_eq!(h.presenter.previews(), &Previews::default());

        h.clock.advance(Duration::from_secs(10));
        assert!(h.presenter.poll().is_empty());
        assert_eq!(block_on(h.presenter.next()).unwrap(), Navigation::Rejected);
    }

    #[test]
    fn test_stale_render_is_dropped() {
        let mut h = loaded(4);
        let ticket = h.presenter.begin_render();
        let (stale, error) = block_on(h.presenter.render_previews());
        assert!(error.is_none());
        assert_eq!(stale.slide.as_ref().unwrap().page, 1);

        block_on(h.presenter.navigate_to(3)).unwrap();
        assert!(!h.presenter.commit_previews(ticket, stale));
        assert_eq!(h.presenter.previews().slide.as_ref().unwrap().page, 3);
    }

    fn broken_page_two() -> Presenter {
        let (opener, inbox) = LocalWindowOpener::new();
        Presenter::new(
            PresenterConfig::default(),
            Box::new(FakeEngine::new(3).failing_on(2)),
            Box::new(opener),
            Box::new(inbox),
            Rc::new(ManualClock::new()),
        )
    }

    #[test]
    fn test_broken_next_page_only_drops_the_preview() {
        let mut presenter = broken_page_two();
        assert_eq!(block_on(presenter.load_from_bytes(fake_pdf())).unwrap(), 3);
        assert_eq!(presenter.session().total_pages(), 3);

        let previews = presenter.previews();
        assert_eq!(previews.slide.as_ref().unwrap().page, 1);
        assert_eq!(previews.notes.as_ref().unwrap().page, 1);
        assert!(previews.next.is_none());

        presenter.pointer_down(320.0, 320.0);
        assert!(presenter.session().pointer().is_visible());
    }

    #[test]
    fn test_render_failure_keeps_session() {
        let mut presenter = broken_page_two();
        block_on(presenter.load_from_bytes(fake_pdf())).unwrap();

        assert!(matches!(
            block_on(presenter.navigate_to(2)),
            Err(AppError::Render(_))
        ));
        assert_eq!(presenter.session().page(), 2);
        // no stale page 1 views linger, and the page 3 preview still shows
        assert!(presenter.previews().slide.is_none());
        assert!(presenter.previews().notes.is_none());
        assert_eq!(presenter.previews().next.as_ref().unwrap().page, 3);

        assert_eq!(
            block_on(presenter.navigate_to(3)).unwrap(),
            Navigation::Moved { from: 2, to: 3 }
        );
        assert_eq!(presenter.previews().slide.as_ref().unwrap().page, 3);
    }
}
