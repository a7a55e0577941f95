use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use doctrans_core::chunk::DEFAULT_CHUNK_WORDS;
use doctrans_core::paths::DEFAULT_OUTPUT_DIR;
use doctrans_core::report::RunReport;
use doctrans_core::retry::{TranslatedChunk, DEFAULT_MAX_ATTEMPTS};
use indicatif::{ProgressBar, ProgressStyle};

use super::{GoogleTranslator, RetryPolicy};
use crate::pipeline::{translate_document, Progress, TranslateOptions};
use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "translate")]
#[command(about = "Translate a PDF into another language, keeping its layout")]
pub struct App {
    /// Path to the PDF to translate
    path: PathBuf,

    /// Target language code (e.g. "es", "fr", "de")
    #[clap(short, long, env = "DOCTRANS_TARGET")]
    target: String,

    /// Source language code, or "auto" to let the service detect it
    #[clap(long, env = "DOCTRANS_SOURCE", default_value = "auto")]
    source: String,

    /// Directory for the translated document
    #[clap(long, env = "DOCTRANS_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Maximum number of words sent in one translation call
    #[clap(long, env = "DOCTRANS_CHUNK_WORDS", default_value_t = DEFAULT_CHUNK_WORDS)]
    chunk_words: usize,

    /// Calls per chunk before keeping its original text
    #[clap(long, env = "DOCTRANS_ATTEMPTS", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    attempts: u8,

    /// Lower bound of the random delay between retries, in milliseconds
    #[clap(long, env = "DOCTRANS_BACKOFF_MIN_MS", default_value = "1000")]
    backoff_min_ms: u64,

    /// Upper bound of the random delay between retries, in milliseconds
    #[clap(long, env = "DOCTRANS_BACKOFF_MAX_MS", default_value = "3000")]
    backoff_max_ms: u64,

    /// Delay after each successful call, in milliseconds
    #[clap(long, env = "DOCTRANS_PACING_MS", default_value = "100")]
    pacing_ms: u64,

    /// Timeout for a single translation call, in seconds
    #[clap(long, env = "DOCTRANS_TIMEOUT", default_value = "30")]
    timeout: u64,

    /// Number of chunks translated at the same time
    #[clap(long, env = "DOCTRANS_CONCURRENCY", default_value = "1")]
    concurrency: usize,

    /// Translation endpoint
    #[clap(long, env = "DOCTRANS_ENDPOINT", default_value = GoogleTranslator::DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Print the run report as JSON
    #[clap(long)]
    json: bool,
}

impl App {
    fn options(&self) -> TranslateOptions {
        TranslateOptions {
            output_dir: self.output_dir.clone(),
            chunk_words: self.chunk_words,
            concurrency: self.concurrency,
            retry: RetryPolicy {
                max_attempts: self.attempts,
                backoff_min: Duration::from_millis(self.backoff_min_ms),
                backoff_max: Duration::from_millis(self.backoff_max_ms),
                pacing: Duration::from_millis(self.pacing_ms),
                call_timeout: Duration::from_secs(self.timeout),
            },
        }
    }
}

struct Bar(ProgressBar);

impl Progress for Bar {
    fn start(&self, chunks: usize) {
        self.0.set_length(chunks as u64);
        self.0.set_message("translating");
    }

    fn chunk_done(&self, chunk: &TranslatedChunk) {
        if chunk.is_fallback() {
            self.0.set_message("translating (some chunks kept their original text)");
        }
        self.0.inc(1);
    }
}

fn progress_bar() -> Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} chunks {msg}")
            .map_err(|e| eyre!("Invalid progress template: {e}"))?,
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let options = app.options();

    if global.verbose {
        eprintln!("Translating {} into {}", app.path.display(), app.target);
        eprintln!("{options:#?}");
    }

    let translator = GoogleTranslator::new(app.endpoint.clone(), app.source.clone(), options.retry.call_timeout)?;

    let bar = Bar(progress_bar()?);
    let result = translate_document(&app.path, &app.target, &options, &translator, &bar).await;
    bar.0.finish_and_clear();
    let report = result?;

    if app.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn print_summary(report: &RunReport) {
    println!("{}", report.output_path.display().to_string().bold().green());

    let mut table = new_table();
    table.add_row(prettytable::row!["Target".bold().cyan(), report.target_language]);
    table.add_row(prettytable::row![
        "Pages".bold().cyan(),
        f!("{} ({} unreadable)", report.pages, report.failed_pages)
    ]);
    table.add_row(prettytable::row![
        "Spans".bold().cyan(),
        f!("{} ({} translated, {} skipped)", report.spans, report.assigned_spans, report.skipped_spans)
    ]);
    table.add_row(prettytable::row![
        "Images".bold().cyan(),
        f!(
            "{} ({} undecodable, {} skipped)",
            report.images,
            report.skipped_source_images,
            report.skipped_images
        )
    ]);
    table.add_row(prettytable::row![
        "Chunks".bold().cyan(),
        f!(
            "{} ({} translated, {} empty, {} failed)",
            report.chunks,
            report.translated_chunks,
            report.fallback_empty,
            report.fallback_exhausted
        )
    ]);
    table.add_row(prettytable::row!["Remote calls".bold().cyan(), report.remote_calls]);
    table.printstd();

    if report.degraded() > 0 {
        eprintln!(
            "{}",
            f!("{} element(s) kept their original form", report.degraded()).yellow()
        );
    }
}
