//! Document sources: local files and URLs.

use dualslide_render::BoxFuture;
use thiserror::Error;
use url::Url;

#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

/// Reasons a document could not be loaded. The previous document, if any,
/// stays active.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("Not a PDF file: {0}")]
    NotPdf(String),
    #[error("Failed to read {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("Invalid document URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("Document rejected: {0}")]
    Rejected(String),
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Whether `name` ends in `.pdf`, ignoring case.
pub fn has_pdf_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case("pdf"))
}

/// Read a PDF from disk, refusing files without a `.pdf` extension.
#[cfg(not(target_arch = "wasm32"))]
pub fn read_pdf_file(path: &Path) -> LoadResult<Vec<u8>> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !has_pdf_extension(&name) {
        return Err(LoadError::NotPdf(path.display().to_string()));
    }
    std::fs::read(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Parse a document URL. Only http and https are fetched.
pub fn parse_document_url(input: &str) -> LoadResult<Url> {
    let url = Url::parse(input.trim()).map_err(|e| LoadError::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoadError::InvalidUrl {
            url: input.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Fetches document bytes from a URL.
pub trait DocumentFetcher {
    fn fetch(&self, url: Url) -> BoxFuture<'_, LoadResult<Vec<u8>>>;
}

/// Fetcher over HTTP(S).
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

fn fetch_error(url: &Url, e: reqwest::Error) -> LoadError {
    LoadError::Fetch {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, url: Url) -> BoxFuture<'_, LoadResult<Vec<u8>>> {
        Box::pin(async move {
            log::info!("Fetching {}", url);
            let response = reqwest::blocking::get(url.as_str())
                .and_then(|r| r.error_for_status())
                .map_err(|e| fetch_error(&url, e))?;
            let bytes = response.bytes().map_err(|e| fetch_error(&url, e))?;
            Ok(bytes.to_vec())
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, url: Url) -> BoxFuture<'_, LoadResult<Vec<u8>>> {
        Box::pin(async move {
            log::info!("Fetching {}", url);
            let response = reqwest::get(url.as_str())
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| fetch_error(&url, e))?;
            let bytes = response.bytes().await.map_err(|e| fetch_error(&url, e))?;
            Ok(bytes.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_pdf_extension() {
        assert!(has_pdf_extension("deck.pdf"));
        assert!(has_pdf_extension("Deck.PDF"));
        assert!(has_pdf_extension("talk.v2.Pdf"));
        assert!(!has_pdf_extension("deck.pdf.txt"));
        assert!(!has_pdf_extension("deck"));
        assert!(!has_pdf_extension(".pdf"));
    }

    #[test]
    fn test_read_pdf_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("slides.PDF");
        std::fs::write(&path, b"%PDF-1.7").unwrap();
        assert_eq!(read_pdf_file(&path).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn test_read_rejects_other_extensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("slides.key");
        std::fs::write(&path, b"%PDF-1.7").unwrap();
        assert!(matches!(read_pdf_file(&path), Err(LoadError::NotPdf(_))));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let result = read_pdf_file(&dir.path().join("missing.pdf"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_parse_document_url() {
        assert!(parse_document_url("https://example.com/talk.pdf").is_ok());
        assert!(parse_document_url(" http://localhost:8080/x ").is_ok());
        assert!(matches!(
            parse_document_url("ftp://example.com/talk.pdf"),
            Err(LoadError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_document_url("not a url"),
            Err(LoadError::InvalidUrl { .. })
        ));
    }
}
