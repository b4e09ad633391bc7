//! Audience side of the sync protocol.
//!
//! The audience keeps a read-only mirror of the presenter session, updated
//! only by received messages. The one local piece of state is fullscreen.

use crate::layout::{DEFAULT_SPLIT, NotesLocation};
use crate::protocol::{Envelope, ErrorPayload, Message};
use crate::session::{DisplayMode, PointerState};
use crate::window::WindowLink;

/// Audience copy of the presenter session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMirror {
    pub page: u32,
    pub total_pages: u32,
    pub location: NotesLocation,
    pub split: f64,
    pub mode: DisplayMode,
    pub pointer: PointerState,
    pub fullscreen: bool,
}

impl Default for SessionMirror {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 0,
            location: NotesLocation::Right,
            split: DEFAULT_SPLIT,
            mode: DisplayMode::Normal,
            pointer: PointerState::hidden(),
            fullscreen: false,
        }
    }
}

/// What changed after applying a message.
#[derive(Debug, Clone, PartialEq)]
pub enum AudienceUpdate {
    /// Page, layout or mode replaced by a snapshot.
    State,
    Navigated(u32),
    Mode(DisplayMode),
    /// A new document arrived; the bytes are this window's own copy.
    Document(Vec<u8>),
    Pointer(PointerState),
}

pub struct AudienceSync {
    session_id: String,
    presenter: Box<dyn WindowLink>,
    mirror: SessionMirror,
    hello_sent: bool,
}

impl AudienceSync {
    pub fn new(session_id: impl Into<String>, presenter: Box<dyn WindowLink>) -> Self {
        Self {
            session_id: session_id.into(),
            presenter,
            mirror: SessionMirror::default(),
            hello_sent: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn mirror(&self) -> &SessionMirror {
        &self.mirror
    }

    /// Send HELLO. Only the first call per window lifetime does anything.
    pub fn announce(&mut self) -> bool {
        if self.hello_sent {
            return false;
        }
        self.hello_sent = self.send(Message::Hello);
        self.hello_sent
    }

    /// Report a problem to the presenter (logged there, never acted on).
    pub fn report_error(&self, message: impl Into<String>) -> bool {
        self.send(Message::Error(ErrorPayload {
            message: message.into(),
        }))
    }

    /// Flip the local fullscreen flag and return the new value.
    pub fn toggle_fullscreen(&mut self) -> bool {
        self.mirror.fullscreen = !self.mirror.fullscreen;
        self.mirror.fullscreen
    }

    /// Apply a presenter message to the mirror.
    pub fn handle(&mut self, envelope: Envelope) -> Option<AudienceUpdate> {
        if envelope.session_id != self.session_id {
            log::debug!(
                "Message from session {} while mirroring {}",
                envelope.session_id,
                self.session_id
            );
        }

        match envelope.message {
            Message::State(state) => {
                self.mirror.page = state.page;
                self.mirror.total_pages = state.total_pages;
                self.mirror.location = state.location;
                self.mirror.split = state.split;
                self.mirror.mode = state.mode;
                Some(AudienceUpdate::State)
            }
            Message::Navigate(nav) => {
                self.mirror.page = nav.page;
                self.mirror.pointer = PointerState::hidden();
                Some(AudienceUpdate::Navigated(nav.page))
            }
            Message::Mode(mode) => {
                self.mirror.mode = mode.mode;
                Some(AudienceUpdate::Mode(mode.mode))
            }
            Message::PdfData(pdf) => {
                log::info!("Received document ({} bytes)", pdf.data.len());
                self.mirror.location = pdf.location;
                self.mirror.split = pdf.split;
                Some(AudienceUpdate::Document(pdf.data))
            }
            Message::Pointer(pointer) => {
                self.mirror.pointer = pointer.into();
                Some(AudienceUpdate::Pointer(self.mirror.pointer))
            }
            other @ (Message::Hello | Message::Error(_)) => {
                log::debug!("Ignoring {} sent to the audience", other.type_name());
                None
            }
        }
    }

    fn send(&self, message: Message) -> bool {
        if !self.presenter.is_open() {
            log::debug!("Presenter window gone, dropping {}", message.type_name());
            return false;
        }
        let kind = message.type_name();
        match self.presenter.post(&Envelope::new(self.session_id.clone(), message)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to send {}: {}", kind, e);
                false
            }
        }
    }
}
