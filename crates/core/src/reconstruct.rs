//! Positional mapping of translated chunks back onto spans.
//!
//! Spans are walked in document order (page, then span) and chunks are
//! handed out one per span, regardless of how many words either holds.
//! Chunk and span boundaries come from different sources (word budget vs.
//! typographic runs), so a span's new text generally does not correspond to
//! its old content.  Spans left over once the chunks run out keep their
//! original text.

use crate::layout::Page;
use crate::retry::TranslatedChunk;

/// Produce new pages whose span texts are replaced by translated chunks.
/// Page count, span count, fonts, sizes and boxes are unchanged.
pub fn reconstruct(pages: &[Page], translated: &[TranslatedChunk]) -> Vec<Page> {
    let mut supply = translated.iter();

    pages
        .iter()
        .map(|page| {
            let mut page = page.clone();
            for span in &mut page.spans {
                if let Some(chunk) = supply.next() {
                    span.text = chunk.text.clone();
                }
            }
            page
        })
        .collect()
}

/// Number of spans that received a chunk.
pub fn assigned_span_count(pages: &[Page], translated: &[TranslatedChunk]) -> usize {
    let total: usize = pages.iter().map(|p| p.spans.len()).sum();
    total.min(translated.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BBox, TextSpan};
    use crate::retry::Outcome;

    fn span(text: &str, page: usize, x: f32) -> TextSpan {
        TextSpan::new(text, "Times-Roman", 11.0, BBox::new(x, 700.0, x + 30.0, 711.0), page)
    }

    fn chunk(text: &str) -> TranslatedChunk {
        TranslatedChunk {
            text: text.to_string(),
            outcome: Outcome::Translated,
            attempts: 1,
        }
    }

    fn pages() -> Vec<Page> {
        vec![
            Page {
                index: 0,
                width: 612.0,
                height: 792.0,
                origin: (0.0, 0.0),
                rotation: 0,
                spans: vec![span("Hello", 0, 72.0), span("World", 0, 120.0)],
            },
            Page {
                index: 1,
                width: 612.0,
                height: 792.0,
                origin: (0.0, 0.0),
                rotation: 0,
                spans: vec![span("Goodbye", 1, 72.0)],
            },
        ]
    }

    #[test]
    fn test_positional_assignment() {
        let out = reconstruct(&pages(), &[chunk("Hola Mundo"), chunk("Adiós")]);
        assert_eq!(out[0].spans[0].text, "Hola Mundo");
        assert_eq!(out[0].spans[1].text, "Adiós");
        assert_eq!(out[1].spans[0].text, "Goodbye");
    }

    #[test]
    fn test_metadata_is_preserved() {
        let input = pages();
        let out = reconstruct(&input, &[chunk("a"), chunk("b"), chunk("c")]);
        assert_eq!(out.len(), input.len());
        for (before, after) in input.iter().zip(&out) {
            assert_eq!(before.index, after.index);
            assert_eq!(before.width, after.width);
            assert_eq!(before.spans.len(), after.spans.len());
            for (a, b) in before.spans.iter().zip(&after.spans) {
                assert_eq!(a.font_name, b.font_name);
                assert_eq!(a.font_size.to_bits(), b.font_size.to_bits());
                assert_eq!(a.bbox.x0.to_bits(), b.bbox.x0.to_bits());
                assert_eq!(a.bbox.y1.to_bits(), b.bbox.y1.to_bits());
                assert_eq!(a.page_index, b.page_index);
            }
        }
    }

    #[test]
    fn test_short_supply_keeps_remaining_originals() {
        let input = vec![Page {
            index: 0,
            width: 612.0,
            height: 792.0,
            origin: (0.0, 0.0),
            rotation: 0,
            spans: (1..=5).map(|i| span(&format!("s{i}"), 0, i as f32)).collect(),
        }];
        let out = reconstruct(&input, &[chunk("t1"), chunk("t2")]);
        let texts: Vec<&str> = out[0].spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["t1", "t2", "s3", "s4", "s5"]);
        assert_eq!(assigned_span_count(&input, &[chunk("t1"), chunk("t2")]), 2);
    }

    #[test]
    fn test_surplus_chunks_are_ignored() {
        let out = reconstruct(
            &pages(),
            &[chunk("1"), chunk("2"), chunk("3"), chunk("4"), chunk("5")],
        );
        let total: usize = out.iter().map(|p| p.spans.len()).sum();
        assert_eq!(total, 3);
        assert_eq!(out[1].spans[0].text, "3");
    }

    #[test]
    fn test_empty_inputs() {
        assert!(reconstruct(&[], &[chunk("x")]).is_empty());
        let out = reconstruct(&pages(), &[]);
        assert_eq!(out, pages());
    }
}
