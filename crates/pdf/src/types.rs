use std::collections::BTreeMap;

use doctrans_core::layout::{ImageAsset, Page};
use serde::Serialize;

/// Output of span and image extraction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractedDocument {
    pub pages: Vec<Page>,
    /// Images in page order, then paint order within a page.
    pub images: Vec<ImageAsset>,
    /// Pages whose content could not be read; they are present but empty.
    pub failed_pages: usize,
    /// Images that were painted but could not be decoded.
    pub skipped_images: usize,
}

impl ExtractedDocument {
    pub fn span_count(&self) -> usize {
        self.pages.iter().map(|p| p.spans.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Every string entry of the Info dictionary.
    pub metadata: BTreeMap<String, String>,
}

/// What the builder wrote and what it had to skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub pages: usize,
    pub spans_written: usize,
    pub skipped_spans: usize,
    pub images_written: usize,
    pub skipped_images: usize,
}

#[derive(Debug, Clone)]
pub struct BuiltDocument {
    pub bytes: Vec<u8>,
    pub report: BuildReport,
}
