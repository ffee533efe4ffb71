//! KMZ archives: a ZIP container holding a KML document plus optional assets

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::{Result, TerrasiteError};
use crate::formats::kml::decode_text;
use crate::formats::ContainerReader;

/// KMZ format reader
pub struct KmzReader;

impl ContainerReader for KmzReader {
    fn extract_document(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| TerrasiteError::Archive {
            reason: e.to_string(),
        })?;

        // Entries are scanned in archive order; the first .kml wins
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| TerrasiteError::Archive {
                reason: e.to_string(),
            })?;

            if entry.is_dir() || !entry.name().to_ascii_lowercase().ends_with(".kml") {
                continue;
            }

            tracing::debug!(entry = entry.name(), "Found KML document in archive");

            let mut content = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut content)?;
            return Ok(decode_text(&content));
        }

        Err(TerrasiteError::NoKmlInArchive)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["kmz"]
    }

    fn format_name(&self) -> &str {
        "KMZ"
    }
}
