//! Error types for Terrasite

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::models::{PersonId, ProjectId, TerrainId};

/// Broad classification of failures, used by callers to decide how to surface them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local, user-correctable input problems
    Validation,
    /// An uploaded archive could not be turned into geographic data
    Format,
    /// The persistence collaborator rejected or failed a request
    Transport,
    /// Configuration could not be loaded
    Config,
    /// Local IO failure
    Io,
}

#[derive(Debug, Error)]
pub enum TerrasiteError {
    // Geometry errors
    #[error("A polygon needs at least {required} points, got {actual}")]
    InvalidPolygon { required: usize, actual: usize },

    // Validation errors
    #[error("Invalid terrain: {0}")]
    Validation(FieldErrors),

    #[error("Person {person_id} is not a member of project {project_id}")]
    NotEligible {
        person_id: PersonId,
        project_id: ProjectId,
    },

    #[error("Person {person_id} is responsible for project {project_id} and cannot be toggled")]
    NotToggleable {
        person_id: PersonId,
        project_id: ProjectId,
    },

    #[error("Terrain {terrain_id} belongs to project {expected}, not {actual}")]
    ProjectMismatch {
        terrain_id: TerrainId,
        expected: ProjectId,
        actual: ProjectId,
    },

    #[error("An assignment change for person {person_id} on terrain {terrain_id} is already in flight")]
    AssignmentInFlight {
        person_id: PersonId,
        terrain_id: TerrainId,
    },

    // Import errors
    #[error("Unsupported file format: .{extension}. Supported: {}", supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },

    #[error("Could not open archive: {reason}")]
    Archive { reason: String },

    #[error("No KML found in archive")]
    NoKmlInArchive,

    #[error("Failed to parse XML: {reason}")]
    XmlParse { reason: String },

    #[error("No geographic data found")]
    NoGeographicData,

    // Persistence errors
    #[error("Terrain not found: {id}")]
    TerrainNotFound { id: TerrainId },

    #[error("Project not found: {id}")]
    ProjectNotFound { id: ProjectId },

    #[error("Request '{operation}' failed: {reason}")]
    Transport { operation: String, reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TerrasiteError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TerrasiteError::InvalidPolygon { .. }
            | TerrasiteError::Validation(_)
            | TerrasiteError::NotEligible { .. }
            | TerrasiteError::NotToggleable { .. }
            | TerrasiteError::ProjectMismatch { .. }
            | TerrasiteError::AssignmentInFlight { .. } => ErrorKind::Validation,

            TerrasiteError::UnsupportedFormat { .. }
            | TerrasiteError::Archive { .. }
            | TerrasiteError::NoKmlInArchive
            | TerrasiteError::XmlParse { .. }
            | TerrasiteError::NoGeographicData => ErrorKind::Format,

            TerrasiteError::TerrainNotFound { .. }
            | TerrasiteError::ProjectNotFound { .. }
            | TerrasiteError::Transport { .. }
            | TerrasiteError::Serialization(_) => ErrorKind::Transport,

            TerrasiteError::ConfigMissing { .. } | TerrasiteError::ConfigInvalid { .. } => {
                ErrorKind::Config
            }

            TerrasiteError::Io(_) => ErrorKind::Io,
        }
    }

    /// Shorthand for a failed request against the persistence collaborator
    pub fn transport(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        TerrasiteError::Transport {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Per-field validation messages, keyed by payload field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// First message recorded for a field
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Turn the collected messages into a result
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(TerrasiteError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

pub type Result<T> = std::result::Result<T, TerrasiteError>;
