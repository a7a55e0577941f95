//! PDF side of the translator: positioned span and image extraction, and
//! rebuilding a document from translated pages.
//!
//! Parsing goes through the [`parser::backend::PdfBackend`] trait so the
//! content-stream walker never touches lopdf types directly.

use std::path::Path;

use thiserror::Error;

use parser::backend::{LopdfBackend, PdfBackend};

pub mod builder;
pub mod encoding;
pub mod fonts;
mod glyphs;
pub mod images;
pub mod parser;
pub mod text;
pub mod types;

pub use builder::{build, save};
pub use images::export_image;
pub use types::*;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("cannot read PDF: {0}")]
    Read(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("cannot insert element: {0}")]
    Insertion(String),
    #[error("cannot write PDF: {0}")]
    Write(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract every page's spans and every painted image from PDF bytes.
pub fn extract(bytes: &[u8]) -> Result<ExtractedDocument, PdfError> {
    let backend = LopdfBackend::load_bytes(bytes)?;
    let doc = parser::layout::extract_all_pages(&backend)?;
    log::debug!(
        "extracted {} pages, {} spans, {} images",
        doc.pages.len(),
        doc.span_count(),
        doc.images.len()
    );
    Ok(doc)
}

pub fn extract_file(path: &Path) -> Result<ExtractedDocument, PdfError> {
    let bytes =
        std::fs::read(path).map_err(|e| PdfError::Read(format!("{}: {}", path.display(), e)))?;
    extract(&bytes)
}

/// Page count and Info-dictionary metadata, without walking content.
pub fn info(bytes: &[u8]) -> Result<DocumentInfo, PdfError> {
    let backend = LopdfBackend::load_bytes(bytes)?;
    let metadata = backend.metadata();
    Ok(DocumentInfo {
        page_count: backend.page_count(),
        title: metadata.get("Title").cloned(),
        author: metadata.get("Author").cloned(),
        creator: metadata.get("Creator").cloned(),
        producer: metadata.get("Producer").cloned(),
        metadata,
    })
}

/// Number of pages, or a read error for unreadable documents.
pub fn page_count(bytes: &[u8]) -> Result<usize, PdfError> {
    Ok(LopdfBackend::load_bytes(bytes)?.pages().len())
}
