//! Plain KML documents

use crate::error::Result;
use crate::formats::ContainerReader;

/// KML format reader; the file already is the document
pub struct KmlReader;

impl ContainerReader for KmlReader {
    fn extract_document(&self, bytes: &[u8]) -> Result<String> {
        Ok(decode_text(bytes))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["kml"]
    }

    fn format_name(&self) -> &str {
        "KML"
    }
}

/// Decode document bytes as UTF-8, falling back to Latin-1
///
/// A leading UTF-8 byte-order mark is dropped.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::warn!(
                valid_up_to = e.valid_up_to(),
                "Document is not valid UTF-8, decoding as Latin-1"
            );
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}
