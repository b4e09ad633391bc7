//! Presenter session: the authoritative page pointer, layout, display mode
//! and pointer overlay state.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::layout::{LayoutConfig, LayoutResult, NotesLocation};

/// What the audience sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Normal,
    /// Audience screen blanked to black.
    Black,
    /// Audience screen blanked to white.
    White,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Normal => "normal",
            DisplayMode::Black => "black",
            DisplayMode::White => "white",
        }
    }

    /// Whether the slide is hidden behind a solid fill.
    pub fn is_blank(self) -> bool {
        !matches!(self, DisplayMode::Normal)
    }

    /// Switch to `target`, or back to normal if already there.
    pub fn toggled(self, target: DisplayMode) -> DisplayMode {
        if self == target {
            DisplayMode::Normal
        } else {
            target
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(DisplayMode::Normal),
            "black" => Ok(DisplayMode::Black),
            "white" => Ok(DisplayMode::White),
            other => Err(format!("Unknown display mode: {}", other)),
        }
    }
}

/// Laser pointer overlay. Coordinates are normalized to the audience region
/// (0..=1 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub active: bool,
    pub position: Option<Point>,
}

impl PointerState {
    /// Hidden pointer with no position.
    pub fn hidden() -> Self {
        Self::default()
    }

    /// Visible pointer at a normalized position, clamped into range.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            active: true,
            position: Some(Point::new(clamp_unit(x), clamp_unit(y))),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.active && self.position.is_some()
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Page outside `1..=total_pages`; nothing changed.
    Rejected,
    /// Already on the requested page.
    Unchanged,
    /// Moved between pages.
    Moved { from: u32, to: u32 },
}

/// One presenter session.
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    current_page: u32,
    total_pages: u32,
    layout: LayoutConfig,
    mode: DisplayMode,
    pointer: PointerState,
}

impl Session {
    /// Create a session with a fresh identifier and no document.
    pub fn new(layout: LayoutConfig) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        log::info!("Created session {}", id);
        Self {
            id,
            current_page: 1,
            total_pages: 0,
            layout,
            mode: DisplayMode::Normal,
            pointer: PointerState::hidden(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current page, 1-indexed.
    pub fn page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn has_document(&self) -> bool {
        self.total_pages > 0
    }

    pub fn is_valid_page(&self, page: u32) -> bool {
        page >= 1 && page <= self.total_pages
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    /// A new document was opened: rewind to the first page.
    pub fn document_loaded(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
        self.current_page = 1;
        self.pointer = PointerState::hidden();
    }

    /// Move to `page` if it exists. Moving clears the pointer.
    pub fn go_to(&mut self, page: u32) -> Navigation {
        if !self.is_valid_page(page) {
            return Navigation::Rejected;
        }
        if page == self.current_page {
            return Navigation::Unchanged;
        }
        let from = self.current_page;
        self.pointer = PointerState::hidden();
        self.current_page = page;
        Navigation::Moved { from, to: page }
    }

    /// Returns true if the mode changed.
    pub fn set_mode(&mut self, mode: DisplayMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    pub fn set_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }

    /// Hide the pointer. Returns true if it was visible.
    pub fn clear_pointer(&mut self) -> bool {
        let was_active = self.pointer.active;
        self.pointer = PointerState::hidden();
        was_active
    }

    pub fn set_location(&mut self, location: NotesLocation) {
        self.layout.set_location(location);
    }

    pub fn set_split(&mut self, split: f64) -> LayoutResult<()> {
        self.layout.set_split(split)
    }

    pub fn set_scale(&mut self, scale: f64) -> LayoutResult<()> {
        self.layout.set_scale(scale)
    }

    pub fn set_show_next_preview(&mut self, show: bool) {
        self.layout.set_show_next_preview(show);
    }

    /// Back to the document-selection state. Keeps the identifier and layout.
    pub fn reset(&mut self) {
        self.current_page = 1;
        self.total_pages = 0;
        self.mode = DisplayMode::Normal;
        self.pointer = PointerState::hidden();
    }
}
