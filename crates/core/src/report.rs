//! Counters describing one translation run.
//!
//! Partial degradations (failed pages, fallback chunks, skipped spans or
//! images) are not errors; they are tallied here so callers can surface
//! them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::retry::{Outcome, TranslatedChunk};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub target_language: String,
    pub pages: usize,
    pub spans: usize,
    pub images: usize,
    pub failed_pages: usize,
    pub skipped_source_images: usize,
    pub chunks: usize,
    pub translated_chunks: usize,
    pub fallback_empty: usize,
    pub fallback_exhausted: usize,
    pub remote_calls: usize,
    pub assigned_spans: usize,
    pub skipped_spans: usize,
    pub skipped_images: usize,
}

impl RunReport {
    /// Tally chunk outcomes and remote call counts.
    pub fn record_chunks(&mut self, chunks: &[TranslatedChunk]) {
        self.chunks = chunks.len();
        self.translated_chunks = 0;
        self.fallback_empty = 0;
        self.fallback_exhausted = 0;
        self.remote_calls = 0;

        for chunk in chunks {
            self.remote_calls += chunk.attempts as usize;
            match chunk.outcome {
                Outcome::Translated => self.translated_chunks += 1,
                Outcome::FallbackEmpty => self.fallback_empty += 1,
                Outcome::FallbackExhausted => self.fallback_exhausted += 1,
            }
        }
    }

    /// Total number of elements that were degraded rather than processed.
    pub fn degraded(&self) -> usize {
        self.failed_pages
            + self.skipped_source_images
            + self.fallback_empty
            + self.fallback_exhausted
            + self.skipped_spans
            + self.skipped_images
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(outcome: Outcome, attempts: u8) -> TranslatedChunk {
        TranslatedChunk {
            text: "x".to_string(),
            outcome,
            attempts,
        }
    }

    #[test]
    fn test_record_chunks() {
        let mut report = RunReport::default();
        report.record_chunks(&[
            chunk(Outcome::Translated, 1),
            chunk(Outcome::Translated, 2),
            chunk(Outcome::FallbackEmpty, 1),
            chunk(Outcome::FallbackExhausted, 3),
        ]);
        assert_eq!(report.chunks, 4);
        assert_eq!(report.translated_chunks, 2);
        assert_eq!(report.fallback_empty, 1);
        assert_eq!(report.fallback_exhausted, 1);
        assert_eq!(report.remote_calls, 7);
        assert_eq!(report.degraded(), 2);
    }

    #[test]
    fn test_record_chunks_resets_counts() {
        let mut report = RunReport::default();
        report.record_chunks(&[chunk(Outcome::FallbackExhausted, 3)]);
        report.record_chunks(&[chunk(Outcome::Translated, 1)]);
        assert_eq!(report.fallback_exhausted, 0);
        assert_eq!(report.translated_chunks, 1);
        assert_eq!(report.remote_calls, 1);
    }

    #[test]
    fn test_degraded_counts_everything() {
        let report = RunReport {
            failed_pages: 1,
            skipped_source_images: 1,
            skipped_spans: 2,
            skipped_images: 3,
            ..RunReport::default()
        };
        assert_eq!(report.degraded(), 7);
    }
}
