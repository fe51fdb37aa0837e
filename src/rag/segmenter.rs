//! Splits a document into fixed-size overlapping passages.

use crate::core::errors::ApiError;

use super::types::Passage;

/// Split `document` into passages of `chunk_size` characters, each
/// overlapping the previous one by `overlap` characters.
///
/// Offsets are character offsets into the document. A document shorter than
/// `chunk_size` yields exactly one passage covering the whole document. The
/// loop stops as soon as a passage's end reaches the document end, so no
/// trailing passage fully contained in the previous one is emitted.
pub fn segment(
    document: &str,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Passage>, ApiError> {
    if overlap >= chunk_size {
        return Err(ApiError::InvalidConfiguration(format!(
            "chunk_overlap ({}) must be less than chunk_size ({})",
            overlap, chunk_size
        )));
    }

    let chars: Vec<char> = document.chars().collect();
    let total = chars.len();
    let step = chunk_size - overlap;

    let mut passages = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(total);
        passages.push(Passage {
            text: chars[start..end].iter().collect(),
            start,
            end,
        });
        if end >= total {
            break;
        }
        start += step;
    }

    Ok(passages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_document_yields_single_passage() {
        let passages = segment("hello", 1000, 200).unwrap();
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, "hello");
        assert_eq!((passages[0].start, passages[0].end), (0, 5));
    }

    #[test]
    fn consecutive_passages_overlap_exactly() {
        let document: String = ('a'..='z').cycle().take(250).collect();
        let passages = segment(&document, 100, 30).unwrap();

        for pair in passages.windows(2) {
            let overlap_len = pair[0].end - pair[1].start;
            assert_eq!(overlap_len, 30);
            let tail: String = pair[0].text.chars().skip(pair[0].text.chars().count() - 30).collect();
            let head: String = pair[1].text.chars().take(30).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn passages_are_in_increasing_start_order() {
        let document = "x".repeat(500);
        let passages = segment(&document, 120, 40).unwrap();
        for pair in passages.windows(2) {
            assert!(pair[1].start > pair[0].start);
        }
    }

    #[test]
    fn boundary_scenario_emits_exactly_two_passages() {
        // 50 'A's + 50 'B's, size 60, overlap 20 -> [0,60) and [40,100).
        let document = format!("{}{}", "A".repeat(50), "B".repeat(50));
        let passages = segment(&document, 60, 20).unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!((passages[0].start, passages[0].end), (0, 60));
        assert_eq!((passages[1].start, passages[1].end), (40, 100));
    }

    #[test]
    fn final_passage_may_be_shorter() {
        let document = "y".repeat(110);
        let passages = segment(&document, 60, 20).unwrap();
        assert_eq!(passages.len(), 3);
        assert_eq!((passages[2].start, passages[2].end), (80, 110));
        assert_eq!(passages[2].text.chars().count(), 30);
    }

    #[test]
    fn offsets_are_character_offsets_for_multibyte_text() {
        let document = "é".repeat(10);
        let passages = segment(&document, 6, 2).unwrap();
        assert_eq!((passages[0].start, passages[0].end), (0, 6));
        assert_eq!((passages[1].start, passages[1].end), (4, 10));
        assert_eq!(passages[0].text.chars().count(), 6);
    }

    #[test]
    fn rejects_overlap_at_or_above_chunk_size() {
        assert!(segment("abc", 10, 10).is_err());
        assert!(segment("abc", 10, 15).is_err());
    }
}
