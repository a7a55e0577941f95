//! Remote translation of chunks with bounded retries.
//!
//! Each chunk runs through [`ChunkState`]: a failed or timed out call is
//! retried after a random backoff until the attempt budget is spent, an
//! empty answer ends the chunk at once, and either way the chunk falls back
//! to its original text rather than failing the run.

use std::time::Duration;

use async_trait::async_trait;
use doctrans_core::chunk::Chunk;
use doctrans_core::retry::{ChunkState, Event, Outcome, TranslatedChunk, DEFAULT_MAX_ATTEMPTS};
use futures::stream::{self, StreamExt};
use rand::Rng;

pub mod cli;
mod google;

pub use google::{parse_google_response, GoogleTranslator};

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Call timed out after {0:?}")]
    Timeout(Duration),
}

/// A remote translation service.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslateError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total calls per chunk, first one included.
    pub max_attempts: u8,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
    /// Delay after every successful call.
    pub pacing: Duration,
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_min: Duration::from_secs(1),
            backoff_max: Duration::from_secs(3),
            pacing: Duration::from_millis(100),
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A uniformly random delay in `[backoff_min, backoff_max]`.
    fn backoff(&self) -> Duration {
        let low = self.backoff_min.min(self.backoff_max).as_millis() as u64;
        let high = self.backoff_min.max(self.backoff_max).as_millis() as u64;
        if low == high {
            return Duration::from_millis(low);
        }
        Duration::from_millis(rand::thread_rng().gen_range(low..=high))
    }
}

/// Translate one chunk, never failing: exhausted or empty attempts yield the
/// original text tagged with the matching [`Outcome`].
pub async fn translate_chunk(
    translator: &dyn Translator,
    chunk: &str,
    target: &str,
    policy: &RetryPolicy,
) -> TranslatedChunk {
    if chunk.trim().is_empty() {
        return TranslatedChunk::fallback(chunk, Outcome::FallbackEmpty, 0);
    }

    let mut state = ChunkState::Pending.advance(Event::Start, policy.max_attempts);

    while let ChunkState::Attempting(attempt) = state {
        let call = tokio::time::timeout(policy.call_timeout, translator.translate(chunk, target));
        let event = match call.await {
            Ok(Ok(text)) => Event::Responded(text),
            Ok(Err(err)) => {
                log::warn!("Translation attempt {attempt} failed: {err}");
                Event::Failed
            }
            Err(_) => {
                log::warn!(
                    "Translation attempt {attempt} failed: {}",
                    TranslateError::Timeout(policy.call_timeout)
                );
                Event::Failed
            }
        };

        state = state.advance(event, policy.max_attempts);

        match &state {
            ChunkState::Attempting(_) => tokio::time::sleep(policy.backoff()).await,
            ChunkState::Succeeded { .. } => tokio::time::sleep(policy.pacing).await,
            ChunkState::FallenBack { outcome, attempts } => {
                log::warn!("Keeping original text after {attempts} attempt(s): {outcome:?}");
            }
            ChunkState::Pending => {}
        }
    }

    state.resolve(chunk).unwrap_or_else(|| {
        TranslatedChunk::fallback(chunk, Outcome::FallbackExhausted, policy.max_attempts)
    })
}

/// Translate `chunks` in order. Up to `concurrency` chunks are in flight at
/// once; results always come back in chunk order. `on_done` sees each
/// result as it is yielded.
pub async fn translate_chunks<F>(
    translator: &dyn Translator,
    chunks: &[Chunk],
    target: &str,
    policy: &RetryPolicy,
    concurrency: usize,
    on_done: F,
) -> Vec<TranslatedChunk>
where
    F: Fn(&TranslatedChunk),
{
    stream::iter(
        chunks
            .iter()
            .map(|chunk| translate_chunk(translator, &chunk.text, target, policy)),
    )
    .buffered(concurrency.max(1))
    .inspect(|translated| on_done(translated))
    .collect()
    .await
}
