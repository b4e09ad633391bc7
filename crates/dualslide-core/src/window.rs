//! Cross-window transport.
//!
//! Windows never share memory: a [`WindowLink`] posts a serialized copy of an
//! envelope to the other side and a [`MessageSource`] collects what arrived.
//! Sends are one-way and at most once.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};

use thiserror::Error;

use crate::protocol::{Envelope, ProtocolError};

/// Transport errors.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Target window is closed")]
    Closed,
    #[error("Post failed: {0}")]
    Post(String),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Result type for transport operations.
pub type LinkResult<T> = Result<T, LinkError>;

/// Size hint for a secondary window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Everything needed to open the audience window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest {
    pub name: String,
    pub session_id: String,
    pub size: WindowSize,
}

/// One-way handle to another window.
pub trait WindowLink {
    /// False once the target window is gone.
    fn is_open(&self) -> bool;

    /// Post a copy of `envelope` to the target window.
    fn post(&self, envelope: &Envelope) -> LinkResult<()>;

    /// Ask the target window to close.
    fn close(&self) {}
}

/// Incoming messages of a window.
pub trait MessageSource {
    /// Take everything received since the last call.
    fn drain(&mut self) -> Vec<Envelope>;
}

/// Opens the audience window.
pub trait WindowOpener {
    /// `None` when the window could not be opened (e.g. a popup blocker).
    fn open(&mut self, request: &WindowRequest) -> Option<Box<dyn WindowLink>>;
}

// ============================================================================
// In-process transport
// ============================================================================

/// Link backed by an in-process channel. Envelopes are serialized to JSON
/// on post, so the receiver always gets an independent copy.
pub struct LocalLink {
    tx: Sender<String>,
    open: Arc<AtomicBool>,
}

impl WindowLink for LocalLink {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    fn post(&self, envelope: &Envelope) -> LinkResult<()> {
        if !self.is_open() {
            return Err(LinkError::Closed);
        }
        let json = envelope.to_json()?;
        self.tx.send(json).map_err(|_| {
            self.open.store(false, Ordering::Release);
            LinkError::Closed
        })
    }

    fn close(&self) {
        self.open.store(false, Ordering::Release);
    }
}

/// Receiving end of a local channel. Dropping the inbox of a window marks
/// that window closed for everyone holding a link to it.
pub struct LocalInbox {
    rx: Receiver<String>,
    window: Option<Arc<AtomicBool>>,
}

impl LocalInbox {
    /// Whether the window owning this inbox has been closed by the other side.
    pub fn is_window_open(&self) -> bool {
        self.window
            .as_ref()
            .is_none_or(|open| open.load(Ordering::Acquire))
    }
}

impl MessageSource for LocalInbox {
    fn drain(&mut self) -> Vec<Envelope> {
        let mut out = Vec::new();
        while let Ok(json) = self.rx.try_recv() {
            match Envelope::from_json(&json) {
                Ok(Some(envelope)) => out.push(envelope),
                Ok(None) => {}
                Err(e) => log::warn!("Dropping malformed message: {}", e),
            }
        }
        out
    }
}

impl Drop for LocalInbox {
    fn drop(&mut self) {
        if let Some(open) = &self.window {
            open.store(false, Ordering::Release);
        }
    }
}

/// The audience side of a locally opened window.
pub struct AudienceEndpoint {
    pub session_id: String,
    pub name: String,
    /// Link back to the presenter.
    pub link: LocalLink,
    /// Messages from the presenter.
    pub inbox: LocalInbox,
}

/// Opens audience "windows" as in-process channel pairs.
///
/// Clones share the list of opened endpoints, so the host can keep a clone
/// and collect each new audience side with [`LocalWindowOpener::take_opened`].
#[derive(Clone)]
pub struct LocalWindowOpener {
    to_presenter: Sender<String>,
    opened: Rc<RefCell<VecDeque<AudienceEndpoint>>>,
    blocked: Rc<RefCell<bool>>,
}

impl LocalWindowOpener {
    /// Create an opener and the presenter's inbox.
    pub fn new() -> (Self, LocalInbox) {
        let (tx, rx) = channel();
        let opener = Self {
            to_presenter: tx,
            opened: Rc::new(RefCell::new(VecDeque::new())),
            blocked: Rc::new(RefCell::new(false)),
        };
        (opener, LocalInbox { rx, window: None })
    }

    /// Simulate a popup blocker.
    pub fn set_blocked(&self, blocked: bool) {
        *self.blocked.borrow_mut() = blocked;
    }

    /// Oldest audience endpoint not yet collected.
    pub fn take_opened(&self) -> Option<AudienceEndpoint> {
        self.opened.borrow_mut().pop_front()
    }
}

impl WindowOpener for LocalWindowOpener {
    fn open(&mut self, request: &WindowRequest) -> Option<Box<dyn WindowLink>> {
        if *self.blocked.borrow() {
            log::warn!("Window '{}' blocked", request.name);
            return None;
        }

        let open = Arc::new(AtomicBool::new(true));
        let (tx, rx) = channel();
        let endpoint = AudienceEndpoint {
            session_id: request.session_id.clone(),
            name: request.name.clone(),
            link: LocalLink {
                tx: self.to_presenter.clone(),
                open: Arc::new(AtomicBool::new(true)),
            },
            inbox: LocalInbox {
                rx,
                window: Some(open.clone()),
            },
        };
        self.opened.borrow_mut().push_back(endpoint);
        log::info!(
            "Opened local window '{}' ({}x{})",
            request.name,
            request.size.width,
            request.size.height
        );
        Some(Box::new(LocalLink { tx, open }))
    }
}

// ============================================================================
// Browser transport
// ============================================================================

#[cfg(target_arch = "wasm32")]
mod web {
    use super::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{MessageEvent, Window};

    /// Link to another browser window via `postMessage`.
    pub struct WebWindowLink {
        target: Window,
        origin: String,
    }

    impl WebWindowLink {
        pub fn new(target: Window, origin: impl Into<String>) -> Self {
            Self {
                target,
                origin: origin.into(),
            }
        }

        /// Link to the window that opened this one.
        pub fn opener() -> Option<Self> {
            let window = web_sys::window()?;
            let opener = window.opener().ok()?;
            if opener.is_null() || opener.is_undefined() {
                return None;
            }
            let origin = window.location().origin().ok()?;
            Some(Self::new(opener.unchecked_into::<Window>(), origin))
        }
    }

    impl WindowLink for WebWindowLink {
        fn is_open(&self) -> bool {
            !self.target.closed().unwrap_or(true)
        }

        fn post(&self, envelope: &Envelope) -> LinkResult<()> {
            if !self.is_open() {
                return Err(LinkError::Closed);
            }
            let json = envelope.to_json()?;
            let value = js_sys::JSON::parse(&json)
                .map_err(|e| LinkError::Post(format!("{:?}", e)))?;
            self.target
                .post_message(&value, &self.origin)
                .map_err(|e| LinkError::Post(format!("{:?}", e)))
        }

        fn close(&self) {
            let _ = self.target.close();
        }
    }

    /// Opens the audience page with `window.open`.
    pub struct WebWindowOpener {
        /// Audience page URL; the session id is appended as `?session=`.
        pub url: String,
    }

    impl WindowOpener for WebWindowOpener {
        fn open(&mut self, request: &WindowRequest) -> Option<Box<dyn WindowLink>> {
            let window = web_sys::window()?;
            let origin = window.location().origin().ok()?;
            let url = format!("{}?session={}", self.url, request.session_id);
            let features = format!("width={},height={}", request.size.width, request.size.height);
            match window.open_with_url_and_target_and_features(&url, &request.name, &features) {
                Ok(Some(target)) => Some(Box::new(WebWindowLink::new(target, origin))),
                Ok(None) => {
                    log::warn!("Audience window blocked");
                    None
                }
                Err(e) => {
                    log::warn!("Failed to open audience window: {:?}", e);
                    None
                }
            }
        }
    }

    /// Collects `message` events posted to this window.
    pub struct WebInbox {
        events: Rc<RefCell<Vec<Envelope>>>,
        // Store the closure to prevent it from being dropped
        _on_message: Closure<dyn Fn(MessageEvent)>,
    }

    impl WebInbox {
        pub fn listen() -> Option<Self> {
            let window = web_sys::window()?;
            let events: Rc<RefCell<Vec<Envelope>>> = Rc::new(RefCell::new(Vec::new()));
            let sink = events.clone();
            let on_message = Closure::wrap(Box::new(move |e: MessageEvent| {
                let Some(json) = js_sys::JSON::stringify(&e.data())
                    .ok()
                    .and_then(|s| s.as_string())
                else {
                    return;
                };
                match Envelope::from_json(&json) {
                    Ok(Some(envelope)) => sink.borrow_mut().push(envelope),
                    Ok(None) => {}
                    Err(err) => log::debug!("Ignoring foreign message: {}", err),
                }
            }) as Box<dyn Fn(MessageEvent)>);
            window
                .add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())
                .ok()?;
            Some(Self {
                events,
                _on_message: on_message,
            })
        }
    }

    impl MessageSource for WebInbox {
        fn drain(&mut self) -> Vec<Envelope> {
            std::mem::take(&mut *self.events.borrow_mut())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{WebInbox, WebWindowLink, WebWindowOpener};
