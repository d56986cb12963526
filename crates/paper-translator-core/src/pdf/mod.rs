mod buffer;
mod extract;

pub use buffer::PdfBuffer;
pub use extract::{MupdfExtractor, PageText};

use crate::error::Result;

/// Turns complete PDF file contents into plain text.
///
/// Implementations read `bytes` from the start, keep page order and join
/// pages with a newline. The result is trimmed.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}
