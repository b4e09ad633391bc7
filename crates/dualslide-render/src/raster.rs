//! Pixel buffers and their placement on screen.

use dualslide_core::Region;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use kurbo::{Point, Size};

/// RGBA pixels of a page or a region of one.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    /// Blank white raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [255, 255, 255, 255])
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(rgba)),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Wrap tightly packed RGBA bytes. `None` if the length doesn't match.
    pub fn from_rgba(width: u32, height: u32, bytes: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, bytes).map(Self::from_image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width() && y < self.height()).then(|| self.image.get_pixel(x, y).0)
    }

    /// Copy `region` (clipped to the raster) and resample it to
    /// `width` x `height`.
    pub fn crop_resized(&self, region: Region, width: u32, height: u32) -> Raster {
        let x = region.x.min(self.width());
        let y = region.y.min(self.height());
        let w = region.width.min(self.width() - x);
        let h = region.height.min(self.height() - y);
        if w == 0 || h == 0 {
            return Raster::new(width.max(1), height.max(1));
        }
        let cropped = imageops::crop_imm(&self.image, x, y, w, h).to_image();
        if cropped.width() == width && cropped.height() == height {
            return Raster::from_image(cropped);
        }
        Raster::from_image(imageops::resize(&cropped, width.max(1), height.max(1), FilterType::Triangle))
    }
}

/// Where a surface sits inside its display area, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// Full width of `area`, height following the region's aspect ratio.
    pub fn fit_to_width(region: Region, area: Size) -> Self {
        let aspect = region.aspect_ratio();
        let height = if aspect > 0.0 { area.width / aspect } else { 0.0 };
        Self {
            x: 0.0,
            y: 0.0,
            width: area.width,
            height,
        }
    }

    /// Largest size inside `area` keeping the aspect ratio, centered on the
    /// constrained axis.
    pub fn fit_within(region: Region, area: Size) -> Self {
        if region.is_empty() {
            return Self {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
            };
        }
        let scale = (area.width / region.width as f64).min(area.height / region.height as f64);
        let width = region.width as f64 * scale;
        let height = region.height as f64 * scale;
        Self {
            x: (area.width - width) / 2.0,
            y: (area.height - height) / 2.0,
            width,
            height,
        }
    }

    /// Map a point in display coordinates to 0..=1 within this placement.
    /// `None` for a degenerate placement.
    pub fn normalize(&self, point: Point) -> Option<Point> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Point::new(
            ((point.x - self.x) / self.width).clamp(0.0, 1.0),
            ((point.y - self.y) / self.height).clamp(0.0, 1.0),
        ))
    }

    /// Backing-store size for a pixel density.
    pub fn pixel_size(&self, density: f64) -> (u32, u32) {
        let w = (self.width * density).round().max(1.0) as u32;
        let h = (self.height * density).round().max(1.0) as u32;
        (w, h)
    }
}

/// A region of a page, resampled and ready to display.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub page: u32,
    pub raster: Raster,
    pub placement: Placement,
}
