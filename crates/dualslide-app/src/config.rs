//! Window configuration.

use dualslide_core::{
    CONNECTION_POLL_INTERVAL, Duration, LayoutConfig, POINTER_MIN_INTERVAL, TIMER_TICK_INTERVAL,
    WindowSize,
};
use dualslide_render::RenderSettings;
use kurbo::Size;

/// Presenter console configuration.
#[derive(Debug, Clone)]
pub struct PresenterConfig {
    /// Target name of the audience window.
    pub audience_window_name: String,
    pub audience_window_size: WindowSize,
    /// Initial layout; also what a reset returns to.
    pub layout: LayoutConfig,
    pub render: RenderSettings,
    /// Display area of the current-slide preview, CSS pixels.
    pub slide_area: Size,
    pub notes_area: Size,
    pub next_preview_area: Size,
    pub pointer_interval: Duration,
    pub connection_poll_interval: Duration,
    pub timer_tick_interval: Duration,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            audience_window_name: "dualslide-audience".to_string(),
            audience_window_size: WindowSize::default(),
            layout: LayoutConfig::default(),
            render: RenderSettings::default(),
            slide_area: Size::new(640.0, 360.0),
            notes_area: Size::new(640.0, 720.0),
            next_preview_area: Size::new(320.0, 180.0),
            pointer_interval: POINTER_MIN_INTERVAL,
            connection_poll_interval: CONNECTION_POLL_INTERVAL,
            timer_tick_interval: TIMER_TICK_INTERVAL,
        }
    }
}

/// Audience window configuration.
#[derive(Debug, Clone)]
pub struct AudienceConfig {
    pub render: RenderSettings,
    pub display_area: Size,
    /// Local render scale. Location and split come from the presenter.
    pub scale: f64,
}

impl Default for AudienceConfig {
    fn default() -> Self {
        Self {
            render: RenderSettings::default(),
            display_area: Size::new(1280.0, 720.0),
            scale: dualslide_core::DEFAULT_SCALE,
        }
    }
}
