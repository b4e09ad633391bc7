//! Page layout: where the speaker notes sit and how a page splits into
//! the audience region and the notes region.
//!
//! Presenter and audience run [`regions_for`] independently against their own
//! raster of the same page, so it must stay a pure function of its inputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default fraction of the page given to the audience region.
pub const DEFAULT_SPLIT: f64 = 0.5;

/// Default render scale multiplier.
pub const DEFAULT_SCALE: f64 = 1.0;

/// Layout errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Unknown notes location: {0}")]
    UnknownLocation(String),
    #[error("Split ratio must be strictly between 0 and 1, got {0}")]
    InvalidSplit(f64),
    #[error("Scale must be a positive number, got {0}")]
    InvalidScale(f64),
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Side of the page that holds the speaker notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotesLocation {
    #[default]
    Right,
    Left,
    Top,
    Bottom,
}

impl NotesLocation {
    pub const ALL: [NotesLocation; 4] = [
        NotesLocation::Right,
        NotesLocation::Left,
        NotesLocation::Top,
        NotesLocation::Bottom,
    ];

    /// Wire name of this location.
    pub fn as_str(self) -> &'static str {
        match self {
            NotesLocation::Right => "right",
            NotesLocation::Left => "left",
            NotesLocation::Top => "top",
            NotesLocation::Bottom => "bottom",
        }
    }

    /// True when the page is cut by a vertical line (notes left or right).
    pub fn splits_width(self) -> bool {
        matches!(self, NotesLocation::Right | NotesLocation::Left)
    }
}

impl fmt::Display for NotesLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotesLocation {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" => Ok(NotesLocation::Right),
            "left" => Ok(NotesLocation::Left),
            "top" => Ok(NotesLocation::Top),
            "bottom" => Ok(NotesLocation::Bottom),
            _ => Err(LayoutError::UnknownLocation(s.to_string())),
        }
    }
}

/// Axis-aligned rectangle in raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height. Zero for an empty region.
    pub fn aspect_ratio(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width as f64 / self.height as f64
        }
    }

    /// Whether the two regions share any pixel.
    pub fn intersects(&self, other: &Region) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// The two sub-regions of a page raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub audience: Region,
    pub notes: Region,
}

/// Split a `width` x `height` raster into audience and notes regions.
///
/// The audience region gets `floor(extent * split)` pixels along the split
/// axis and the notes region gets the remainder, so the two always tile the
/// raster exactly.
pub fn regions_for(width: u32, height: u32, location: NotesLocation, split: f64) -> Regions {
    match location {
        NotesLocation::Right => {
            let audience = split_extent(width, split);
            Regions {
                audience: Region::new(0, 0, audience, height),
                notes: Region::new(audience, 0, width - audience, height),
            }
        }
        NotesLocation::Left => {
            let audience = split_extent(width, split);
            let notes = width - audience;
            Regions {
                audience: Region::new(notes, 0, audience, height),
                notes: Region::new(0, 0, notes, height),
            }
        }
        NotesLocation::Bottom => {
            let audience = split_extent(height, split);
            Regions {
                audience: Region::new(0, 0, width, audience),
                notes: Region::new(0, audience, width, height - audience),
            }
        }
        NotesLocation::Top => {
            let audience = split_extent(height, split);
            let notes = height - audience;
            Regions {
                audience: Region::new(0, notes, width, audience),
                notes: Region::new(0, 0, width, notes),
            }
        }
    }
}

fn split_extent(extent: u32, split: f64) -> u32 {
    let cut = (extent as f64 * split).floor();
    if cut.is_nan() {
        return 0;
    }
    cut.clamp(0.0, extent as f64) as u32
}

/// Check a split ratio.
pub fn validate_split(split: f64) -> LayoutResult<f64> {
    if split.is_finite() && split > 0.0 && split < 1.0 {
        Ok(split)
    } else {
        Err(LayoutError::InvalidSplit(split))
    }
}

/// Check a scale multiplier.
pub fn validate_scale(scale: f64) -> LayoutResult<f64> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(LayoutError::InvalidScale(scale))
    }
}

/// Layout configuration of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    location: NotesLocation,
    split: f64,
    scale: f64,
    show_next_preview: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            location: NotesLocation::Right,
            split: DEFAULT_SPLIT,
            scale: DEFAULT_SCALE,
            show_next_preview: true,
        }
    }
}

impl LayoutConfig {
    /// Create a validated layout.
    pub fn new(location: NotesLocation, split: f64, scale: f64) -> LayoutResult<Self> {
        Ok(Self {
            location,
            split: validate_split(split)?,
            scale: validate_scale(scale)?,
            show_next_preview: true,
        })
    }

    pub fn location(&self) -> NotesLocation {
        self.location
    }

    pub fn split(&self) -> f64 {
        self.split
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn show_next_preview(&self) -> bool {
        self.show_next_preview
    }

    pub fn set_location(&mut self, location: NotesLocation) {
        self.location = location;
    }

    pub fn set_split(&mut self, split: f64) -> LayoutResult<()> {
        self.split = validate_split(split)?;
        Ok(())
    }

    pub fn set_scale(&mut self, scale: f64) -> LayoutResult<()> {
        self.scale = validate_scale(scale)?;
        Ok(())
    }

    pub fn set_show_next_preview(&mut self, show: bool) {
        self.show_next_preview = show;
    }

    /// Regions of a raster under this layout.
    pub fn regions(&self, width: u32, height: u32) -> Regions {
        regions_for(width, height, self.location, self.split)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZES: [(u32, u32); 5] = [(1, 1), (2, 3), (1000, 750), (1601, 899), (4096, 17)];
    const SPLITS: [f64; 6] = [0.01, 0.25, 0.333, 0.5, 0.618, 0.99];

    #[test]
    fn test_regions_tile_the_raster() {
        for (width, height) in SIZES {
            for split in SPLITS {
                for location in NotesLocation::ALL {
                    let r = regions_for(width, height, location, split);
                    let total = width as u64 * height as u64;
                    assert_eq!(
                        r.audience.area() + r.notes.area(),
                        total,
                        "{location} {split} {width}x{height}"
                    );
                    assert!(!r.audience.intersects(&r.notes));
                    assert!(r.audience.right() <= width && r.audience.bottom() <= height);
                    assert!(r.notes.right() <= width && r.notes.bottom() <= height);

                    if location.splits_width() {
                        assert_eq!(r.audience.width + r.notes.width, width);
                        assert_eq!(r.audience.height, height);
                        assert_eq!(r.notes.height, height);
                    } else {
                        assert_eq!(r.audience.height + r.notes.height, height);
                        assert_eq!(r.audience.width, width);
                        assert_eq!(r.notes.width, width);
                    }
                }
            }
        }
    }

    #[test]
    fn test_right_half_split() {
        let r = regions_for(1200, 900, NotesLocation::Right, 0.5);
        assert_eq!(r.audience, Region::new(0, 0, 600, 900));
        assert_eq!(r.notes, Region::new(600, 0, 600, 900));
    }

    #[test]
    fn test_left_mirrors_right() {
        let r = regions_for(1000, 500, NotesLocation::Left, 0.7);
        assert_eq!(r.notes, Region::new(0, 0, 300, 500));
        assert_eq!(r.audience, Region::new(300, 0, 700, 500));
    }

    #[test]
    fn test_bottom_and_top() {
        let bottom = regions_for(800, 1000, NotesLocation::Bottom, 0.6);
        assert_eq!(bottom.audience, Region::new(0, 0, 800, 600));
        assert_eq!(bottom.notes, Region::new(0, 600, 800, 400));

        let top = regions_for(800, 1000, NotesLocation::Top, 0.6);
        assert_eq!(top.notes, Region::new(0, 0, 800, 400));
        assert_eq!(top.audience, Region::new(0, 400, 800, 600));
    }

    #[test]
    fn test_identical_inputs_give_identical_regions() {
        let a = regions_for(1601, 899, NotesLocation::Left, 0.618);
        let b = regions_for(1601, 899, NotesLocation::Left, 0.618);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_location_fails() {
        assert_eq!("Right".parse::<NotesLocation>(), Ok(NotesLocation::Right));
        assert_eq!(" bottom ".parse::<NotesLocation>(), Ok(NotesLocation::Bottom));
        assert!(matches!(
            "center".parse::<NotesLocation>(),
            Err(LayoutError::UnknownLocation(_))
        ));
        assert!(serde_json::from_str::<NotesLocation>("\"center\"").is_err());
    }

    #[test]
    fn test_layout_validation() {
        assert!(LayoutConfig::new(NotesLocation::Top, 0.5, 1.0).is_ok());
        assert_eq!(
            LayoutConfig::new(NotesLocation::Top, 1.0, 1.0),
            Err(LayoutError::InvalidSplit(1.0))
        );
        assert!(LayoutConfig::new(NotesLocation::Top, f64::NAN, 1.0).is_err());
        assert_eq!(
            LayoutConfig::new(NotesLocation::Top, 0.5, 0.0),
            Err(LayoutError::InvalidScale(0.0))
        );

        let mut layout = LayoutConfig::default();
        assert!(layout.set_split(0.0).is_err());
        assert!((layout.split() - DEFAULT_SPLIT).abs() < f64::EPSILON);
        layout.set_split(0.4).unwrap();
        assert!((layout.split() - 0.4).abs() < f64::EPSILON);
    }
}
