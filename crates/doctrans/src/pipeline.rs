//! Extract → chunk → translate → reconstruct → build.
//!
//! Only a failure to read the input or to write the output aborts a run.
//! Everything else degrades and is counted in the returned [`RunReport`].

use std::path::{Path, PathBuf};

use doctrans_core::chunk::{chunk_words, full_text, DEFAULT_CHUNK_WORDS};
use doctrans_core::paths::{translated_output_path, DEFAULT_OUTPUT_DIR};
use doctrans_core::reconstruct::{assigned_span_count, reconstruct};
use doctrans_core::report::RunReport;
use doctrans_core::retry::TranslatedChunk;

use crate::error::Error;
use crate::translate::{translate_chunks, RetryPolicy, Translator};

/// Called once before the first chunk with the chunk count, then once per
/// translated chunk.
pub trait Progress {
    fn start(&self, chunks: usize);
    fn chunk_done(&self, chunk: &TranslatedChunk);
}

impl Progress for () {
    fn start(&self, _chunks: usize) {}
    fn chunk_done(&self, _chunk: &TranslatedChunk) {}
}

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub output_dir: PathBuf,
    pub chunk_words: usize,
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            chunk_words: DEFAULT_CHUNK_WORDS,
            concurrency: 1,
            retry: RetryPolicy::default(),
        }
    }
}

async fn blocking<T, F>(task: F) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::Generic(format!("Worker thread failed: {e}")))?
}

/// Translate the PDF at `input` into `target` and write
/// `<output_dir>/<stem>_translated.pdf`.
pub async fn translate_document(
    input: &Path,
    target: &str,
    options: &TranslateOptions,
    translator: &dyn Translator,
    progress: &dyn Progress,
) -> Result<RunReport, Error> {
    let source = {
        let input = input.to_path_buf();
        blocking(move || pdf::extract_file(&input).map_err(Error::from)).await?
    };

    let mut report = RunReport {
        target_language: target.to_string(),
        pages: source.pages.len(),
        spans: source.span_count(),
        images: source.images.len(),
        failed_pages: source.failed_pages,
        skipped_source_images: source.skipped_images,
        ..RunReport::default()
    };

    let chunks = chunk_words(&full_text(&source.pages), options.chunk_words);
    log::info!(
        "{} pages, {} spans, {} images, {} chunks",
        report.pages,
        report.spans,
        report.images,
        chunks.len()
    );

    progress.start(chunks.len());
    let translated = translate_chunks(
        translator,
        &chunks,
        target,
        &options.retry,
        options.concurrency,
        |chunk| progress.chunk_done(chunk),
    )
    .await;
    report.record_chunks(&translated);

    let pages = reconstruct(&source.pages, &translated);
    report.assigned_spans = assigned_span_count(&source.pages, &translated);

    let output_path = translated_output_path(input, &options.output_dir);
    let built = {
        let output_path = output_path.clone();
        let images = source.images;
        blocking(move || pdf::save(&pages, &images, &output_path).map_err(Error::from)).await?
    };

    report.output_path = output_path;
    report.skipped_spans = built.skipped_spans;
    report.skipped_images = built.skipped_images;

    if report.degraded() > 0 {
        log::warn!("{} element(s) were degraded", report.degraded());
    }

    Ok(report)
}
