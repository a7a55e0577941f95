//! Core library for doctrans
//!
//! This crate implements the **Functional Core** of the doctrans application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`doctrans_core`** (this crate): the layout data model and pure
//!   transformations, with zero I/O
//! - **`pdf`**: reading spans and images out of PDF files and writing new ones
//! - **`doctrans`**: configuration, the remote translation client and
//!   orchestration (the Imperative Shell)
//!
//! # Pipeline
//!
//! ```text
//! pages ──full_text──> text ──chunk_words──> chunks
//!                                              │ (shell: remote calls driven
//!                                              │  by retry::ChunkState)
//!                                              v
//! pages + translated chunks ──reconstruct──> pages with substituted text
//! ```
//!
//! # Module Organization
//!
//! - [`layout`]: spans, pages, boxes and image assets
//! - [`chunk`]: word-budget partitioning of the document text
//! - [`retry`]: the per-chunk translation state machine
//! - [`reconstruct`]: positional mapping of translated chunks onto spans
//! - [`paths`]: output file naming
//! - [`report`]: run counters
//!
//! # Example Usage
//!
//! ```rust
//! use doctrans_core::chunk::chunk_words;
//!
//! let chunks = chunk_words("Hello World Goodbye", 2);
//! assert_eq!(chunks[0].text, "Hello World");
//! assert_eq!(chunks[1].text, "Goodbye");
//! ```

pub mod chunk;
pub mod layout;
pub mod paths;
pub mod reconstruct;
pub mod report;
pub mod retry;
