//! Terrain form submission against the persistence port

use std::sync::Arc;

use crate::area::AreaCalculator;
use crate::draft::TerrainDraft;
use crate::error::Result;
use crate::models::{StatusUpdate, Terrain, TerrainId};
use crate::ports::TerrainStore;

/// Validates drafts locally and forwards them to the store
pub struct TerrainService {
    store: Arc<dyn TerrainStore>,
    area: AreaCalculator,
}

impl TerrainService {
    pub fn new(store: Arc<dyn TerrainStore>, area: AreaCalculator) -> Self {
        Self { store, area }
    }

    pub fn area_calculator(&self) -> &AreaCalculator {
        &self.area
    }

    /// Create or update depending on where the draft came from
    pub async fn submit(&self, draft: &TerrainDraft) -> Result<Terrain> {
        match draft.terrain_id() {
            Some(_) => self.submit_update(draft).await,
            None => self.submit_create(draft).await,
        }
    }

    pub async fn submit_create(&self, draft: &TerrainDraft) -> Result<Terrain> {
        let snapshot = self.store.snapshot().await?;
        let request = draft.validate_create(&snapshot, &self.area)?;

        let terrain = self.store.create_terrain(&request).await?;
        tracing::info!(
            terrain = %terrain.id,
            project = %terrain.project_id,
            area = request.surface_area_square_meters,
            "Terrain created"
        );
        Ok(terrain)
    }

    pub async fn submit_update(&self, draft: &TerrainDraft) -> Result<Terrain> {
        let snapshot = self.store.snapshot().await?;
        let (id, request) = draft.validate_update(&snapshot, &self.area)?;

        let terrain = self.store.update_terrain(id, &request).await?;
        tracing::info!(terrain = %id, area = request.surface_area_square_meters, "Terrain updated");
        Ok(terrain)
    }

    pub async fn delete(&self, id: TerrainId) -> Result<()> {
        self.store.delete_terrain(id).await?;
        tracing::info!(terrain = %id, "Terrain deleted");
        Ok(())
    }

    /// Apply review status changes as one batch
    pub async fn update_statuses(&self, updates: &[StatusUpdate]) -> Result<Vec<Terrain>> {
        if updates.is_empty() {
            return Ok(Vec::new());
        }
        let terrains = self.store.update_statuses(updates).await?;
        tracing::info!(count = terrains.len(), "Terrain statuses updated");
        Ok(terrains)
    }
}
