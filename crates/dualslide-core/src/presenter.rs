//! Presenter side of the sync protocol.
//!
//! Owns the link to the audience window, answers the handshake and pushes
//! state, navigation, mode and pointer updates. All sends are fire-and-forget
//! and silently skip when no live audience window exists.

use crate::clock::{Duration, Instant};
use crate::layout::LayoutConfig;
use crate::protocol::{
    Envelope, Message, ModePayload, NavigatePayload, PdfDataPayload, PointerPayload, StatePayload,
};
use crate::session::{DisplayMode, PointerState, Session};
use crate::window::WindowLink;

/// Minimum spacing between forwarded pointer moves (about 30 per second).
pub const POINTER_MIN_INTERVAL: Duration = Duration::from_millis(33);

/// Client-side rate limit for pointer updates.
#[derive(Debug, Clone)]
pub struct PointerThrottle {
    min_interval: Duration,
    last_sent: Option<Instant>,
}

impl PointerThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_sent: None,
        }
    }

    /// True if at least `min_interval` passed since the last accepted call.
    pub fn should_send(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_sent {
            if now.saturating_duration_since(last) < self.min_interval {
                return false;
            }
        }
        self.last_sent = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_sent = None;
    }
}

impl Default for PointerThrottle {
    fn default() -> Self {
        Self::new(POINTER_MIN_INTERVAL)
    }
}

/// Something the presenter UI should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterEvent {
    /// An audience window completed the handshake and was resynced.
    AudienceConnected,
    /// The audience reported a problem.
    AudienceError(String),
}

pub struct PresenterSync {
    session_id: String,
    window: Option<Box<dyn WindowLink>>,
    /// HELLO received since `window` was attached.
    handshake_done: bool,
    throttle: PointerThrottle,
}

impl PresenterSync {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self::with_pointer_interval(session_id, POINTER_MIN_INTERVAL)
    }

    pub fn with_pointer_interval(session_id: impl Into<String>, interval: Duration) -> Self {
        Self {
            session_id: session_id.into(),
            window: None,
            handshake_done: false,
            throttle: PointerThrottle::new(interval),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Adopt a freshly opened audience window. Resets the connection until
    /// that window says HELLO.
    ///
    /// The previous link is dropped, not closed: reopening a named browser
    /// window hands back the same window.
    pub fn attach_window(&mut self, window: Box<dyn WindowLink>) {
        if self.window.replace(window).is_some() {
            log::debug!("Replacing audience window link");
        }
        self.handshake_done = false;
        self.throttle.reset();
    }

    /// Close and forget the audience window.
    pub fn detach_window(&mut self) {
        if let Some(window) = self.window.take() {
            window.close();
        }
        self.handshake_done = false;
    }

    pub fn has_window(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.is_open())
    }

    /// Live window that has completed the handshake.
    pub fn is_connected(&self) -> bool {
        self.handshake_done && self.has_window()
    }

    /// React to a message from the audience window.
    ///
    /// Every HELLO triggers a full resync (STATE, then PDF_DATA when a
    /// document is loaded), independent of any earlier handshake.
    pub fn handle(
        &mut self,
        envelope: Envelope,
        session: &Session,
        document: Option<&[u8]>,
    ) -> Option<PresenterEvent> {
        if envelope.session_id != self.session_id {
            log::debug!(
                "Message from session {} while presenting {}",
                envelope.session_id,
                self.session_id
            );
        }

        match envelope.message {
            Message::Hello => {
                log::info!("Audience said hello, resyncing");
                self.handshake_done = true;
                self.send_state(session);
                if let Some(bytes) = document {
                    self.send_pdf_data(bytes, session.layout());
                }
                Some(PresenterEvent::AudienceConnected)
            }
            Message::Error(payload) => {
                log::warn!("Audience error: {}", payload.message);
                Some(PresenterEvent::AudienceError(payload.message))
            }
            other @ (Message::State(_)
            | Message::Navigate(_)
            | Message::Mode(_)
            | Message::PdfData(_)
            | Message::Pointer(_)) => {
                log::debug!("Ignoring {} sent to the presenter", other.type_name());
                None
            }
        }
    }

    pub fn send_state(&self, session: &Session) -> bool {
        let layout = session.layout();
        self.send(Message::State(StatePayload {
            page: session.page(),
            total_pages: session.total_pages(),
            location: layout.location(),
            split: layout.split(),
            mode: session.mode(),
        }))
    }

    pub fn send_navigate(&self, page: u32) -> bool {
        self.send(Message::Navigate(NavigatePayload { page }))
    }

    pub fn send_mode(&self, mode: DisplayMode) -> bool {
        self.send(Message::Mode(ModePayload { mode }))
    }

    /// Send an independent copy of the document bytes.
    pub fn send_pdf_data(&self, bytes: &[u8], layout: &LayoutConfig) -> bool {
        self.send(Message::PdfData(PdfDataPayload {
            data: bytes.to_vec(),
            location: layout.location(),
            split: layout.split(),
        }))
    }

    /// Forward a pointer position, subject to the rate limit.
    pub fn send_pointer_moved(&mut self, pointer: PointerState, now: Instant) -> bool {
        if !self.throttle.should_send(now) {
            return false;
        }
        self.send(Message::Pointer(pointer.into()))
    }

    /// Hide the remote pointer immediately, bypassing the rate limit.
    pub fn send_pointer_hidden(&mut self) -> bool {
        self.throttle.reset();
        self.send(Message::Pointer(PointerPayload::from(PointerState::hidden())))
    }

    fn send(&self, message: Message) -> bool {
        let Some(window) = self.window.as_ref() else {
            log::debug!("No audience window, dropping {}", message.type_name());
            return false;
        };
        if !window.is_open() {
            log::debug!("Audience window closed, dropping {}", message.type_name());
            return false;
        }
        let kind = message.type_name();
        match window.post(&Envelope::new(self.session_id.clone(), message)) {
            Ok(()) => {
                log::debug!("Sent {}", kind);
                true
            }
            Err(e) => {
                log::warn!("Failed to send {}: {}", kind, e);
                false
            }
        }
    }
}
