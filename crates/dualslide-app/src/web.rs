//! WebAssembly entry point and browser wiring.
//!
//! The page hosting the presenter opens the audience page in a second
//! window; the two talk over `postMessage`. The embedding page supplies the
//! PDF engine.

use std::cell::RefCell;
use std::rc::Rc;

use dualslide_core::{SystemClock, WebInbox, WebWindowLink, WebWindowOpener};
use dualslide_render::PdfEngine;
use wasm_bindgen::prelude::*;

use crate::{
    Audience, AudienceConfig, DocumentFetcher, HttpFetcher, LoadResult, Presenter,
    PresenterConfig, parse_document_url, session_from_query,
};

thread_local! {
    static PENDING_DOCUMENT: RefCell<Option<LoadResult<Vec<u8>>>> = const { RefCell::new(None) };
}

/// Fetch a PDF in the background. Pick up the result with
/// [`take_pending_document`] and hand the bytes to
/// [`Presenter::load_from_bytes`].
pub fn fetch_document_async(url: &str) {
    let url = match parse_document_url(url) {
        Ok(url) => url,
        Err(e) => {
            PENDING_DOCUMENT.with(|pending| *pending.borrow_mut() = Some(Err(e)));
            return;
        }
    };
    wasm_bindgen_futures::spawn_local(async move {
        let result = HttpFetcher.fetch(url).await;
        match &result {
            Ok(bytes) => log::info!("Fetched document ({} bytes)", bytes.len()),
            Err(e) => log::warn!("Failed to fetch document: {}", e),
        }
        PENDING_DOCUMENT.with(|pending| *pending.borrow_mut() = Some(result));
    });
}

/// Result of the last [`fetch_document_async`], once it finished.
pub fn take_pending_document() -> Option<LoadResult<Vec<u8>>> {
    PENDING_DOCUMENT.with(|pending| pending.borrow_mut().take())
}

/// Session id in the page URL. Only the audience page carries one.
pub fn session_from_url() -> Option<String> {
    let location = web_sys::window()?.location();
    location
        .search()
        .ok()
        .and_then(|search| session_from_query(&search))
        .or_else(|| location.hash().ok().and_then(|hash| session_from_query(&hash)))
}

/// Presenter for this page. `audience_url` is the page opened as the
/// audience window.
pub fn create_presenter(
    config: PresenterConfig,
    engine: Box<dyn PdfEngine>,
    audience_url: impl Into<String>,
) -> Option<Presenter> {
    let inbox = WebInbox::listen()?;
    let opener = WebWindowOpener {
        url: audience_url.into(),
    };
    Some(Presenter::new(
        config,
        engine,
        Box::new(opener),
        Box::new(inbox),
        Rc::new(SystemClock),
    ))
}

/// Audience for this page, linked back to the window that opened it.
/// Sends HELLO right away.
pub fn connect_audience(config: AudienceConfig, engine: Box<dyn PdfEngine>) -> Option<Audience> {
    let session_id = session_from_url()?;
    let Some(link) = WebWindowLink::opener() else {
        log::warn!("Audience page was not opened by a presenter");
        return None;
    };
    let inbox = WebInbox::listen()?;
    let mut audience = Audience::new(config, engine, session_id, Box::new(link), Box::new(inbox));
    audience.start();
    Some(audience)
}

/// Initialize panic reporting and logging.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    match session_from_url() {
        Some(session) => log::info!("Starting Dualslide audience for session {}", session),
        None => log::info!("Starting Dualslide presenter (WASM)"),
    }
}
