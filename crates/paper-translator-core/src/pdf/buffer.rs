use std::io::{Cursor, Read, Seek, SeekFrom};

/// In-memory PDF file with a read cursor.
///
/// Every read goes through [`PdfBuffer::read_all`], which starts at offset 0
/// and leaves the cursor back at offset 0 so the next consumer sees the full
/// file.
#[derive(Debug, Clone, Default)]
pub struct PdfBuffer {
    cursor: Cursor<Vec<u8>>,
}

impl PdfBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }

    /// Read the whole file from the start, then rewind.
    pub fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        self.cursor.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::with_capacity(self.len());
        let read = self.cursor.read_to_end(&mut bytes);
        self.cursor.seek(SeekFrom::Start(0))?;
        read?;
        Ok(bytes)
    }

    /// Current read position.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }

    /// Borrow the underlying bytes without moving the cursor.
    pub fn as_bytes(&self) -> &[u8] {
        self.cursor.get_ref()
    }
}

impl From<Vec<u8>> for PdfBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl Read for PdfBuffer {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for PdfBuffer {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.cursor.seek(pos)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_all_rewinds() {
        let mut buffer = PdfBuffer::new(b"%PDF-1.5 body".to_vec());

        assert_eq!(buffer.read_all().unwrap(), b"%PDF-1.5 body");
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.read_all().unwrap(), b"%PDF-1.5 body");
    }

    #[test]
    fn test_read_all_after_partial_read() {
        let mut buffer = PdfBuffer::new(b"0123456789".to_vec());
        let mut head = [0u8; 4];
        buffer.read_exact(&mut head).unwrap();
        assert_eq!(buffer.position(), 4);

        // A consumer that left the cursor mid-file does not truncate the next read
        assert_eq!(buffer.read_all().unwrap(), b"0123456789");
        assert_eq!(buffer.position(), 0);
    }

    #[test]
    fn test_empty_buffer() {
        let mut buffer = PdfBuffer::default();
        assert!(buffer.is_empty());
        assert!(buffer.read_all().unwrap().is_empty());
    }
}
