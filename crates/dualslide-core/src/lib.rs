//! Dualslide Core Library
//!
//! Platform-agnostic session state, layout math and the presenter/audience
//! synchronization protocol.

pub mod audience;
pub mod clock;
pub mod layout;
pub mod presenter;
pub mod protocol;
pub mod schedule;
pub mod session;
pub mod timer;
pub mod window;

pub use audience::{AudienceSync, AudienceUpdate, SessionMirror};
pub use clock::{Clock, Duration, Instant, ManualClock, SystemClock};
pub use layout::{
    DEFAULT_SCALE, DEFAULT_SPLIT, LayoutConfig, LayoutError, LayoutResult, NotesLocation, Region,
    Regions, regions_for,
};
pub use presenter::{PointerThrottle, PresenterEvent, PresenterSync, POINTER_MIN_INTERVAL};
pub use protocol::{Envelope, Message, ProtocolError};
pub use schedule::{CONNECTION_POLL_INTERVAL, Interval, TIMER_TICK_INTERVAL};
pub use session::{DisplayMode, Navigation, PointerState, Session};
pub use timer::{PresentationTimer, TimerState, format_elapsed};
pub use window::{
    AudienceEndpoint, LinkError, LocalInbox, LocalLink, LocalWindowOpener, MessageSource,
    WindowLink, WindowOpener, WindowRequest, WindowSize,
};

#[cfg(target_arch = "wasm32")]
pub use window::{WebInbox, WebWindowLink, WebWindowOpener};
