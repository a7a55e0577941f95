//! Per-chunk translation state machine.
//!
//! ```text
//! Pending --Start--> Attempting(1) --Responded(text)--> Succeeded
//!                         |      \--Responded("")----> FallenBack(Empty)
//!                         |--Failed, n < max--> Attempting(n + 1)
//!                         \--Failed, n = max--> FallenBack(Exhausted)
//! ```
//!
//! The machine only decides what happens next; the shell performs the
//! remote calls and sleeps.  An empty-but-successful response ends the
//! chunk immediately and does not use up a retry.

use serde::{Deserialize, Serialize};

/// Total remote calls allowed per chunk.
pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

/// How a chunk's final text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Translated,
    /// The service answered with no usable text.
    FallbackEmpty,
    /// Every attempt failed.
    FallbackExhausted,
}

/// Result of translating one chunk.  `text` is never empty unless the
/// source chunk was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedChunk {
    pub text: String,
    pub outcome: Outcome,
    pub attempts: u8,
}

impl TranslatedChunk {
    /// A chunk that keeps its original text.
    pub fn fallback(original: &str, outcome: Outcome, attempts: u8) -> Self {
        TranslatedChunk {
            text: original.to_string(),
            outcome,
            attempts,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.outcome != Outcome::Translated
    }
}

/// Inputs that drive the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    Responded(String),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkState {
    Pending,
    Attempting(u8),
    Succeeded { text: String, attempts: u8 },
    FallenBack { outcome: Outcome, attempts: u8 },
}

impl ChunkState {
    /// Apply `event` and return the next state.  Events that make no sense
    /// for the current state leave it unchanged.
    pub fn advance(self, event: Event, max_attempts: u8) -> ChunkState {
        let max_attempts = max_attempts.max(1);
        match (self, event) {
            (ChunkState::Pending, Event::Start) => ChunkState::Attempting(1),
            (ChunkState::Attempting(n), Event::Responded(text)) => {
                if text.trim().is_empty() {
                    ChunkState::FallenBack {
                        outcome: Outcome::FallbackEmpty,
                        attempts: n,
                    }
                } else {
                    ChunkState::Succeeded { text, attempts: n }
                }
            }
            (ChunkState::Attempting(n), Event::Failed) => {
                if n < max_attempts {
                    ChunkState::Attempting(n + 1)
                } else {
                    ChunkState::FallenBack {
                        outcome: Outcome::FallbackExhausted,
                        attempts: n,
                    }
                }
            }
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ChunkState::Succeeded { .. } | ChunkState::FallenBack { .. }
        )
    }

    /// Turn a terminal state into its [`TranslatedChunk`].  Returns `None`
    /// while the chunk is still in flight.
    pub fn resolve(self, original: &str) -> Option<TranslatedChunk> {
        match self {
            ChunkState::Succeeded { text, attempts } => Some(TranslatedChunk {
                text,
                outcome: Outcome::Translated,
                attempts,
            }),
            ChunkState::FallenBack { outcome, attempts } => {
                Some(TranslatedChunk::fallback(original, outcome, attempts))
            }
            _ => None,
        }
    }
}
