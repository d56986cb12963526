use mupdf::{Document as MuDocument, TextPageOptions};
use tracing::{debug, info};

use super::TextExtractor;
use crate::error::{Error, Result};

/// Text of a single page, 0-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_num: usize,
    pub text: String,
}

/// Text extraction backed by MuPDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfExtractor;

impl MupdfExtractor {
    pub const fn new() -> Self {
        Self
    }

    /// Extract the text of every page, in page order.
    pub fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<PageText>> {
        let doc = MuDocument::from_bytes(bytes, "")
            .map_err(|e| Error::Extraction(format!("failed to parse PDF: {e}")))?;

        if doc
            .needs_password()
            .map_err(|e| Error::Extraction(format!("failed to inspect PDF: {e}")))?
        {
            return Err(Error::Extraction("PDF is password protected".to_string()));
        }

        let page_count = doc
            .page_count()
            .map_err(|e| Error::Extraction(format!("failed to get page count: {e}")))?;

        let mut pages = Vec::with_capacity(usize::try_from(page_count).unwrap_or(0));
        for index in 0..page_count {
            let page_num = usize::try_from(index).unwrap_or_default();
            let page = doc.load_page(index).map_err(|e| {
                Error::Extraction(format!("failed to load page {}: {e}", page_num + 1))
            })?;

            let text_page = page.to_text_page(TextPageOptions::empty()).map_err(|e| {
                Error::Extraction(format!("failed to read text of page {}: {e}", page_num + 1))
            })?;

            let mut lines = Vec::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    let line_text: String =
                        line.chars().filter_map(|text_char| text_char.char()).collect();
                    lines.push(line_text);
                }
            }

            let text = lines.join("\n");
            debug!("Page {} yielded {} chars", page_num + 1, text.len());
            pages.push(PageText { page_num, text });
        }

        Ok(pages)
    }
}

/// Join pages with `\n`. Only the ends of the whole document are trimmed.
fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

impl TextExtractor for MupdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let pages = self.extract_pages(bytes)?;
        let text = join_pages(&pages);

        info!("Extracted {} chars from {} pages", text.len(), pages.len());
        Ok(text)
    }
}
