//! Application-level errors.

use dualslide_core::LayoutError;
use dualslide_render::RenderError;
use thiserror::Error;

use crate::export::ExportError;
use crate::loader::LoadError;

/// Anything a presenter or audience operation can report to the UI.
/// None of these end the session.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
