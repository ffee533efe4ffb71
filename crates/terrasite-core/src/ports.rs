//! Port trait definitions
//!
//! These traits define the interfaces that persistence adapters must implement.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AssignmentState, CreateTerrainRequest, ReferenceSnapshot, StatusUpdate, Terrain, TerrainId,
    ToggleAssignmentRequest, UpdateTerrainRequest,
};

/// Port for the remote persistence collaborator
///
/// Every call is one independent request. Implementations must leave their
/// state untouched when they return an error.
#[async_trait]
pub trait TerrainStore: Send + Sync {
    /// Fetch projects, personnel and terrains wholesale
    async fn snapshot(&self) -> Result<ReferenceSnapshot>;

    /// Persist a new terrain
    async fn create_terrain(&self, request: &CreateTerrainRequest) -> Result<Terrain>;

    /// Replace the editable fields of a terrain
    async fn update_terrain(&self, id: TerrainId, request: &UpdateTerrainRequest)
        -> Result<Terrain>;

    /// Delete a terrain by id
    async fn delete_terrain(&self, id: TerrainId) -> Result<()>;

    /// Flip one person's assignment, returning the updated list
    async fn toggle_assignment(&self, request: &ToggleAssignmentRequest)
        -> Result<AssignmentState>;

    /// Apply a batch of review status changes
    async fn update_statuses(&self, updates: &[StatusUpdate]) -> Result<Vec<Terrain>>;
}
