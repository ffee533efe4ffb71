use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::geometry::{Point, Polygon};
use super::reference::{PersonId, ProjectId};

/// Unique identifier for a terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainId(pub u64);

impl fmt::Display for TerrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status, tracked separately for the technical and final reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerrainStatus {
    Validated,
    Completed,
    InProgress,
    #[default]
    UnderReview,
}

impl TerrainStatus {
    /// Whether the terrain still needs work
    pub fn is_active(&self) -> bool {
        matches!(self, TerrainStatus::InProgress | TerrainStatus::UnderReview)
    }
}

/// Persisted site boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terrain {
    pub id: TerrainId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub polygon: Polygon,
    #[serde(default)]
    pub buffer_radius_meters: f64,
    #[serde(default)]
    pub surface_area_square_meters: f64,
    pub project_id: ProjectId,
    #[serde(default)]
    pub status_technical: TerrainStatus,
    #[serde(default)]
    pub status_final: TerrainStatus,
    #[serde(default)]
    pub assigned_person_ids: BTreeSet<PersonId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Terrain {
    pub fn is_assigned(&self, person_id: PersonId) -> bool {
        self.assigned_person_ids.contains(&person_id)
    }
}

/// Where a draft polygon came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DraftSource {
    /// Drawn interactively on the map
    Drawn,
    /// Promoted from an imported archive candidate
    Imported {
        file_name: String,
        source_properties: BTreeMap<String, String>,
    },
    /// Loaded from an existing terrain for editing
    Existing { id: TerrainId },
}

/// Payload for creating a terrain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTerrainRequest {
    pub name: String,
    pub description: String,
    pub radius: i64,
    pub project_id: ProjectId,
    pub assigned_person_ids: Vec<PersonId>,
    pub polygon: Vec<Point>,
    pub surface_area_square_meters: i64,
}

/// Payload for updating a terrain; the project is fixed at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTerrainRequest {
    pub name: String,
    pub description: String,
    pub radius: i64,
    pub assigned_person_ids: Vec<PersonId>,
    pub polygon: Vec<Point>,
    pub surface_area_square_meters: i64,
}

/// Payload for flipping one person's assignment on a terrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAssignmentRequest {
    pub person_id: PersonId,
    pub terrain_id: TerrainId,
}

/// Assignment list returned after a toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentState {
    pub terrain_id: TerrainId,
    pub assigned_person_ids: BTreeSet<PersonId>,
}

/// Batch entry for changing review statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub id: TerrainId,
    pub status_technical: TerrainStatus,
    pub status_final: TerrainStatus,
}
