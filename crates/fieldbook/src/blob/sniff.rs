use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes inspected when detecting a MIME type.
const SNIFF_LEN: u64 = 8192;

/// Detects a stored file's MIME type from its content.
pub trait MimeSniffer {
    fn sniff(&self, path: &Path) -> io::Result<String>;
}

/// Magic-number detection via `infer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicSniffer;

impl MagicSniffer {
    pub fn sniff_bytes(&self, head: &[u8]) -> String {
        if head.is_empty() {
            return "inode/x-empty".to_string();
        }
        if let Some(kind) = infer::get(head) {
            return kind.mime_type().to_string();
        }
        match std::str::from_utf8(head) {
            Ok(_) => "text/plain".to_string(),
            // Sequence cut short by the read limit
            Err(e) if e.error_len().is_none() => "text/plain".to_string(),
            Err(_) => "application/octet-stream".to_string(),
        }
    }
}

impl MimeSniffer for MagicSniffer {
    fn sniff(&self, path: &Path) -> io::Result<String> {
        let mut head = Vec::new();
        File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;
        Ok(self.sniff_bytes(&head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_png_magic() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(MagicSniffer.sniff_bytes(&png), "image/png");
    }

    #[test]
    fn detects_pdf_magic() {
        assert_eq!(MagicSniffer.sniff_bytes(b"%PDF-1.4\n..."), "application/pdf");
    }

    #[test]
    fn falls_back_for_text_and_binary() {
        assert_eq!(MagicSniffer.sniff_bytes(b"hello, world"), "text/plain");
        assert_eq!(MagicSniffer.sniff_bytes(&[0x00, 0x9f, 0x92, 0x96]), "application/octet-stream");
        assert_eq!(MagicSniffer.sniff_bytes(b""), "inode/x-empty");
    }

    fn text_with_split_char() -> Vec<u8> {
        let mut text = "a".repeat(SNIFF_LEN as usize - 1).into_bytes();
        text.extend_from_slice("é and more plain text".as_bytes());
        text
    }

    #[test]
    fn text_cut_inside_a_multibyte_char_is_text() {
        let text = text_with_split_char();
        let head = &text[..SNIFF_LEN as usize];
        assert!(std::str::from_utf8(head).is_err());
        assert_eq!(MagicSniffer.sniff_bytes(head), "text/plain");
    }

    #[test]
    fn invalid_byte_before_the_end_is_binary() {
        let mut bytes = b"plain".to_vec();
        bytes.push(0xff);
        bytes.extend_from_slice(b"more");
        assert_eq!(MagicSniffer.sniff_bytes(&bytes), "application/octet-stream");
    }

    #[test]
    fn sniffs_long_text_file_as_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, text_with_split_char()).unwrap();
        assert_eq!(MagicSniffer.sniff(&path).unwrap(), "text/plain");
    }
}
