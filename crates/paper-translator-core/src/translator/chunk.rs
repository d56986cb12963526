//! Optional input chunking for very large documents.
//!
//! Splits on blank-line paragraph boundaries, translates the chunks one after
//! another and joins the results with a blank line. A document that fits in
//! one chunk is passed through unchanged.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::traits::{Translator, TranslatorInfo};
use crate::error::Result;

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Wraps a translator and feeds it bounded chunks.
pub struct ChunkedTranslator {
    inner: Arc<dyn Translator>,
    max_chars: usize,
}

impl ChunkedTranslator {
    /// `max_chars` is clamped to at least 1.
    pub fn new(inner: Arc<dyn Translator>, max_chars: usize) -> Self {
        Self {
            inner,
            max_chars: max_chars.max(1),
        }
    }
}

#[async_trait]
impl Translator for ChunkedTranslator {
    fn info(&self) -> TranslatorInfo {
        self.inner.info()
    }

    async fn translate(&self, text: &str) -> Result<String> {
        let chunks = split_into_chunks(text, self.max_chars);
        if chunks.len() <= 1 {
            return self.inner.translate(text).await;
        }

        info!("Translating {} chunks of up to {} chars", chunks.len(), self.max_chars);
        let mut translated = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Chunk {}/{} ({} chars)", i + 1, chunks.len(), chunk.chars().count());
            translated.push(self.inner.translate(chunk).await?);
        }

        Ok(translated.join(PARAGRAPH_SEPARATOR))
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Paragraphs are kept whole where possible. A paragraph longer than the
/// limit is split on line boundaries, and a single overlong line on
/// character boundaries.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();

    for paragraph in text.split(PARAGRAPH_SEPARATOR) {
        if paragraph.trim().is_empty() {
            continue;
        }
        if char_len(paragraph) <= max_chars {
            pieces.push(paragraph.to_string());
            continue;
        }

        let mut lines = Vec::new();
        for line in paragraph.lines() {
            if char_len(line) <= max_chars {
                lines.push(line.to_string());
            } else {
                lines.extend(split_chars(line, max_chars));
            }
        }
        pieces.extend(pack(lines, "\n", max_chars));
    }

    pack(pieces, PARAGRAPH_SEPARATOR, max_chars)
}

/// Greedily join pieces (each within the limit) with `separator`.
fn pack(pieces: Vec<String>, separator: &str, max_chars: usize) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let piece_len = char_len(&piece);
        if current.is_empty() {
            current = piece;
            current_len = piece_len;
        } else if current_len + separator_len + piece_len <= max_chars {
            current.push_str(separator);
            current.push_str(&piece);
            current_len += separator_len + piece_len;
        } else {
            chunks.push(std::mem::replace(&mut current, piece));
            current_len = piece_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_chars(line: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(max_chars)
        .map(|window| window.iter().collect())
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_small_text_is_one_chunk() {
        let chunks = split_into_chunks("Intro.\n\nMethods.", 100);
        assert_eq!(chunks, vec!["Intro.\n\nMethods."]);
    }

    #[test]
    fn test_paragraphs_are_packed() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        let chunks = split_into_chunks(text, 10);
        assert_eq!(chunks, vec!["aaaa\n\nbbbb", "cccc"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_long_paragraph_splits_on_lines() {
        let text = "line one\nline two\nline three";
        let chunks = split_into_chunks(text, 18);
        assert_eq!(chunks, vec!["line one\nline two", "line three"]);
    }

    #[test]
    fn test_overlong_line_splits_on_chars() {
        let chunks = split_into_chunks("가나다라마바사", 3);
        assert_eq!(chunks, vec!["가나다", "라마바", "사"]);
    }

    #[test]
    fn test_blank_paragraphs_are_skipped() {
        let chunks = split_into_chunks("\n\n\n\nonly\n\n  \n\n", 100);
        assert_eq!(chunks, vec!["only"]);
    }

    struct RecordingTranslator {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Translator for RecordingTranslator {
        fn info(&self) -> TranslatorInfo {
            TranslatorInfo {
                name: "recording",
                requires_api_key: false,
            }
        }

        async fn translate(&self, text: &str) -> Result<String> {
            self.calls.lock().unwrap().push(text.to_string());
            Ok(format!("[{text}]"))
        }
    }

    #[tokio::test]
    async fn test_chunked_translation_joins_results() {
        let inner = Arc::new(RecordingTranslator {
            calls: Mutex::new(Vec::new()),
        });
        let translator = ChunkedTranslator::new(inner.clone(), 10);

        let out = translator.translate("aaaa\n\nbbbb\n\ncccc").await.unwrap();
        assert_eq!(out, "[aaaa\n\nbbbb]\n\n[cccc]");
        assert_eq!(inner.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_single_chunk_passes_text_through() {
        let inner = Arc::new(RecordingTranslator {
            calls: Mutex::new(Vec::new()),
        });
        let translator = ChunkedTranslator::new(inner.clone(), 1000);

        let out = translator.translate("  whole body \n").await.unwrap();
        assert_eq!(out, "[  whole body \n]");
        assert_eq!(inner.calls.lock().unwrap().as_slice(), ["  whole body \n"]);
    }
}
