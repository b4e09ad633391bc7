//! Dualslide Application
//!
//! Presenter and audience controllers that tie the session, the sync
//! protocol and the render pipeline to a host window.

mod audience;
mod config;
mod error;
mod export;
mod loader;
mod presenter;

pub use audience::{Audience, session_from_query};
pub use config::{AudienceConfig, PresenterConfig};
pub use error::{AppError, AppResult};
pub use export::{ExportError, ExportResult, encode_png};
pub use loader::{
    DocumentFetcher, HttpFetcher, LoadError, LoadResult, has_pdf_extension, parse_document_url,
};
pub use presenter::{Presenter, Previews, UiEvent};

#[cfg(not(target_arch = "wasm32"))]
pub use export::write_png;
#[cfg(not(target_arch = "wasm32"))]
pub use loader::read_pdf_file;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{
    connect_audience, create_presenter, fetch_document_async, run_wasm, take_pending_document,
};
