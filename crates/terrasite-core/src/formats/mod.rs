//! Container formats for geographic archives
//!
//! Each supported upload type implements [`ContainerReader`], which turns the raw
//! file bytes into KML text. The [`FormatRegistry`] picks a reader from the file
//! extension and rejects anything it does not know up front.

use std::path::Path;

use crate::error::{Result, TerrasiteError};

pub mod geojson;
pub mod kml;
pub mod kmz;
pub mod validation;

pub use kml::KmlReader;
pub use kmz::KmzReader;

/// Reader that extracts the KML document from an uploaded file
pub trait ContainerReader: Send + Sync {
    /// Extract KML text from the file bytes
    fn extract_document(&self, bytes: &[u8]) -> Result<String>;

    /// Get supported file extensions (e.g., ["kml"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name (e.g., "KML", "KMZ")
    fn format_name(&self) -> &str;
}

/// Central registry for container readers
pub struct FormatRegistry {
    readers: Vec<Box<dyn ContainerReader>>,
}

impl FormatRegistry {
    /// Create a new empty format registry
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Registry with the KML and KMZ readers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(KmlReader));
        registry.register(Box::new(KmzReader));
        registry
    }

    /// Register a container reader
    pub fn register(&mut self, reader: Box<dyn ContainerReader>) {
        self.readers.push(reader);
    }

    /// Detect format from a file name, case-insensitively
    pub fn detect_format(&self, file_name: &str) -> Result<&dyn ContainerReader> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| TerrasiteError::UnsupportedFormat {
                extension: "none".to_string(),
                supported: self.supported_formats(),
            })?;

        self.readers
            .iter()
            .find(|r| r.supported_extensions().contains(&extension.as_str()))
            .map(|r| r.as_ref())
            .ok_or_else(|| TerrasiteError::UnsupportedFormat {
                extension,
                supported: self.supported_formats(),
            })
    }

    /// Get list of all supported format extensions
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions())
            .map(|s| s.to_string())
            .collect()
    }

    /// Get all registered readers
    pub fn readers(&self) -> &[Box<dyn ContainerReader>] {
        &self.readers
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
