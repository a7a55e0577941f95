//! Word-budget chunking of the extracted document text.
//!
//! The chunk sequence is a lossless partition of the whitespace-normalised
//! text: joining every chunk with single spaces gives the input back with
//! runs of whitespace collapsed.

use serde::{Deserialize, Serialize};

use crate::layout::Page;

/// Words per chunk when the caller does not choose a budget.
pub const DEFAULT_CHUNK_WORDS: usize = 1000;

/// A contiguous run of words, the unit of one translation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub word_count: usize,
}

/// Concatenate every span's text, across all pages in document order,
/// separated by single spaces.
pub fn full_text(pages: &[Page]) -> String {
    pages
        .iter()
        .flat_map(|page| page.spans.iter())
        .map(|span| span.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split `text` on whitespace and group the words into chunks of at most
/// `budget_words` words.  A budget of zero is treated as one.
pub fn chunk_words(text: &str, budget_words: usize) -> Vec<Chunk> {
    let budget = budget_words.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(budget)
        .map(|run| Chunk {
            text: run.join(" "),
            word_count: run.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BBox, TextSpan};
    use proptest::prelude::*;

    fn page(index: usize, texts: &[&str]) -> Page {
        Page {
            index,
            width: 100.0,
            height: 100.0,
            origin: (0.0, 0.0),
            rotation: 0,
            spans: texts
                .iter()
                .map(|t| TextSpan::new(*t, "Helvetica", 10.0, BBox::new(0.0, 0.0, 1.0, 1.0), index))
                .collect(),
        }
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(chunk_words("", 10).is_empty());
        assert!(chunk_words(" \t\n  ", 10).is_empty());
    }

    #[test]
    fn test_exact_budget() {
        let chunks = chunk_words("a b c d", 2);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "a b");
        assert_eq!(chunks[1].text, "c d");
    }

    #[test]
    fn test_last_chunk_shorter() {
        let chunks = chunk_words("one two three four five", 2);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one two", "three four", "five"]);
        assert_eq!(chunks[2].word_count, 1);
    }

    #[test]
    fn test_whitespace_is_normalised() {
        let chunks = chunk_words("  Hello\t\tbrave\n new   world ", 3);
        assert_eq!(chunks[0].text, "Hello brave new");
        assert_eq!(chunks[1].text, "world");
    }

    #[test]
    fn test_zero_budget_behaves_as_one() {
        let chunks = chunk_words("x y", 0);
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_full_text_spans_pages() {
        let pages = vec![page(0, &["Hello", "World"]), page(1, &["Goodbye"])];
        assert_eq!(full_text(&pages), "Hello World Goodbye");
        let chunks = chunk_words(&full_text(&pages), 2);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello World", "Goodbye"]);
    }

    #[test]
    fn test_full_text_no_pages() {
        assert_eq!(full_text(&[]), "");
    }

    proptest! {
        #[test]
        fn chunks_are_lossless(text in "[a-z \\t\\n]{0,200}", budget in 1usize..12) {
            let chunks = chunk_words(&text, budget);
            let joined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
            let normalised = text.split_whitespace().collect::<Vec<_>>().join(" ");
            prop_assert_eq!(joined, normalised);
        }

        #[test]
        fn chunks_respect_budget(text in "[a-z ]{0,200}", budget in 1usize..12) {
            let chunks = chunk_words(&text, budget);
            prop_assert_eq!(chunks.is_empty(), text.trim().is_empty());
            if let Some((last, rest)) = chunks.split_last() {
                for chunk in rest {
                    prop_assert_eq!(chunk.word_count, budget);
                }
                prop_assert!(last.word_count >= 1 && last.word_count <= budget);
            }
        }
    }
}
