//! In-memory persistence adapter for development and testing.
//!
//! `RwLock::unwrap()` is used on purpose: lock poisoning only happens when
//! another thread panicked while holding the lock, which is unrecoverable here.
//! No lock is held across an await point.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use terrasite_core::error::{Result, TerrasiteError};
use terrasite_core::models::{
    AssignmentState, CreateTerrainRequest, Person, Point, Polygon, Project, ReferenceSnapshot,
    StatusUpdate, Terrain, TerrainId, TerrainStatus, ToggleAssignmentRequest,
    UpdateTerrainRequest,
};
use terrasite_core::ports::TerrainStore;

/// In-memory implementation of TerrainStore
#[derive(Debug, Clone, Default)]
pub struct MemoryTerrainStore {
    projects: Arc<RwLock<Vec<Project>>>,
    personnel: Arc<RwLock<Vec<Person>>>,
    terrains: Arc<RwLock<BTreeMap<TerrainId, Terrain>>>,
    next_id: Arc<RwLock<u64>>,
}

impl MemoryTerrainStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with read-only reference data
    pub fn with_reference(projects: Vec<Project>, personnel: Vec<Person>) -> Self {
        let store = Self::new();
        *store.projects.write().unwrap() = projects;
        *store.personnel.write().unwrap() = personnel;
        store
    }

    /// Seed an existing terrain, keeping its id
    pub fn insert_terrain(&self, terrain: Terrain) {
        let mut next_id = self.next_id.write().unwrap();
        *next_id = (*next_id).max(terrain.id.0);
        self.terrains.write().unwrap().insert(terrain.id, terrain);
    }

    /// Current state of one terrain
    pub fn terrain(&self, id: TerrainId) -> Option<Terrain> {
        self.terrains.read().unwrap().get(&id).cloned()
    }

    pub fn terrain_count(&self) -> usize {
        self.terrains.read().unwrap().len()
    }

    fn allocate_id(&self) -> TerrainId {
        let mut next_id = self.next_id.write().unwrap();
        *next_id += 1;
        TerrainId(*next_id)
    }
}

fn polygon_from(points: &[Point]) -> Result<Polygon> {
    Polygon::new(points.to_vec())
}

#[async_trait]
impl TerrainStore for MemoryTerrainStore {
    async fn snapshot(&self) -> Result<ReferenceSnapshot> {
        Ok(ReferenceSnapshot {
            projects: self.projects.read().unwrap().clone(),
            personnel: self.personnel.read().unwrap().clone(),
            terrains: self.terrains.read().unwrap().values().cloned().collect(),
        })
    }

    async fn create_terrain(&self, request: &CreateTerrainRequest) -> Result<Terrain> {
        if !self.projects.read().unwrap().iter().any(|p| p.id == request.project_id) {
            return Err(TerrasiteError::ProjectNotFound {
                id: request.project_id,
            });
        }
        let polygon = polygon_from(&request.polygon)?;

        let now = Utc::now();
        let terrain = Terrain {
            id: self.allocate_id(),
            name: request.name.clone(),
            description: request.description.clone(),
            polygon,
            buffer_radius_meters: request.radius as f64,
            surface_area_square_meters: request.surface_area_square_meters as f64,
            project_id: request.project_id,
            status_technical: TerrainStatus::default(),
            status_final: TerrainStatus::default(),
            assigned_person_ids: request.assigned_person_ids.iter().copied().collect(),
            created_at: Some(now),
            updated_at: Some(now),
        };

        self.terrains.write().unwrap().insert(terrain.id, terrain.clone());
        tracing::debug!(terrain = %terrain.id, "Stored terrain");
        Ok(terrain)
    }

    async fn update_terrain(
        &self,
        id: TerrainId,
        request: &UpdateTerrainRequest,
    ) -> Result<Terrain> {
        let polygon = polygon_from(&request.polygon)?;

        let mut terrains = self.terrains.write().unwrap();
        let terrain = terrains
            .get_mut(&id)
            .ok_or(TerrasiteError::TerrainNotFound { id })?;

        terrain.name = request.name.clone();
        terrain.description = request.description.clone();
        terrain.polygon = polygon;
        terrain.buffer_radius_meters = request.radius as f64;
        terrain.surface_area_square_meters = request.surface_area_square_meters as f64;
        terrain.assigned_person_ids = request.assigned_person_ids.iter().copied().collect();
        terrain.updated_at = Some(Utc::now());

        Ok(terrain.clone())
    }

    async fn delete_terrain(&self, id: TerrainId) -> Result<()> {
        match self.terrains.write().unwrap().remove(&id) {
            Some(_) => {
                tracing::debug!(terrain = %id, "Removed terrain");
                Ok(())
            }
            None => Err(TerrasiteError::TerrainNotFound { id }),
        }
    }

    async fn toggle_assignment(
        &self,
        request: &ToggleAssignmentRequest,
    ) -> Result<AssignmentState> {
        let mut terrains = self.terrains.write().unwrap();
        let terrain = terrains
            .get_mut(&request.terrain_id)
            .ok_or(TerrasiteError::TerrainNotFound {
                id: request.terrain_id,
            })?;

        // Remove if present, append otherwise
        if !terrain.assigned_person_ids.remove(&request.person_id) {
            terrain.assigned_person_ids.insert(request.person_id);
        }
        terrain.updated_at = Some(Utc::now());

        Ok(AssignmentState {
            terrain_id: terrain.id,
            assigned_person_ids: terrain.assigned_person_ids.clone(),
        })
    }

    async fn update_statuses(&self, updates: &[StatusUpdate]) -> Result<Vec<Terrain>> {
        let mut terrains = self.terrains.write().unwrap();

        // All or nothing
        if let Some(missing) = updates.iter().find(|u| !terrains.contains_key(&u.id)) {
            return Err(TerrasiteError::TerrainNotFound { id: missing.id });
        }

        let now = Utc::now();
        let mut updated = Vec::with_capacity(updates.len());
        for update in updates {
            if let Some(terrain) = terrains.get_mut(&update.id) {
                terrain.status_technical = update.status_technical;
                terrain.status_final = update.status_final;
                terrain.updated_at = Some(now);
                updated.push(terrain.clone());
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrasite_core::models::{PersonId, ProjectId};

    fn project() -> Project {
        Project {
            id: ProjectId(1),
            name: "Extension Nord".to_string(),
            responsible_person_id: Some(PersonId(10)),
            assigned_person_ids: [PersonId(11)].into_iter().collect(),
        }
    }

    fn create_request() -> CreateTerrainRequest {
        CreateTerrainRequest {
            name: "Lot A".to_string(),
            description: String::new(),
            radius: 20,
            project_id: ProjectId(1),
            assigned_person_ids: vec![PersonId(11)],
            polygon: vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 0.001),
                Point::new(0.001, 0.001),
                Point::new(0.001, 0.0),
            ],
            surface_area_square_meters: 12392,
        }
    }

    fn update_request(name: &str) -> UpdateTerrainRequest {
        let create = create_request();
        UpdateTerrainRequest {
            name: name.to_string(),
            description: "moved".to_string(),
            radius: 5,
            assigned_person_ids: vec![],
            polygon: create.polygon,
            surface_area_square_meters: 12392,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_defaults() {
        let store = MemoryTerrainStore::with_reference(vec![project()], vec![]);

        let first = store.create_terrain(&create_request()).await.unwrap();
        let second = store.create_terrain(&create_request()).await.unwrap();

        assert_eq!(first.id, TerrainId(1));
        assert_eq!(second.id, TerrainId(2));
        assert_eq!(first.status_technical, TerrainStatus::UnderReview);
        assert_eq!(first.buffer_radius_meters, 20.0);
        assert!(first.created_at.is_some());
        assert!(first.is_assigned(PersonId(11)));
        assert_eq!(store.terrain_count(), 2);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_project_and_bad_polygon() {
        let store = MemoryTerrainStore::with_reference(vec![project()], vec![]);

        let mut request = create_request();
        request.project_id = ProjectId(9);
        assert!(matches!(
            store.create_terrain(&request).await,
            Err(TerrasiteError::ProjectNotFound { .. })
        ));

        let mut request = create_request();
        request.polygon.truncate(2);
        assert!(matches!(
            store.create_terrain(&request).await,
            Err(TerrasiteError::InvalidPolygon { .. })
        ));
        assert_eq!(store.terrain_count(), 0);
    }

    #[tokio::test]
    async fn test_update_keeps_project_and_creation_time() {
        let store = MemoryTerrainStore::with_reference(vec![project()], vec![]);
        let created = store.create_terrain(&create_request()).await.unwrap();

        let updated = store
            .update_terrain(created.id, &update_request("Lot A2"))
            .await
            .unwrap();

        assert_eq!(updated.name, "Lot A2");
        assert_eq!(updated.project_id, created.project_id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.assigned_person_ids.is_empty());

        assert!(matches!(
            store.update_terrain(TerrainId(99), &update_request("x")).await,
            Err(TerrasiteError::TerrainNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_toggle_removes_or_appends() {
        let store = MemoryTerrainStore::with_reference(vec![project()], vec![]);
        let terrain = store.create_terrain(&create_request()).await.unwrap();
        let request = ToggleAssignmentRequest {
            person_id: PersonId(11),
            terrain_id: terrain.id,
        };

        let state = store.toggle_assignment(&request).await.unwrap();
        assert!(state.assigned_person_ids.is_empty());

        let state = store.toggle_assignment(&request).await.unwrap();
        assert!(state.assigned_person_ids.contains(&PersonId(11)));
    }

    #[tokio::test]
    async fn test_status_batch_is_all_or_nothing() {
        let store = MemoryTerrainStore::with_reference(vec![project()], vec![]);
        let terrain = store.create_terrain(&create_request()).await.unwrap();

        let batch = [
            StatusUpdate {
                id: terrain.id,
                status_technical: TerrainStatus::Completed,
                status_final: TerrainStatus::Validated,
            },
            StatusUpdate {
                id: TerrainId(42),
                status_technical: TerrainStatus::Completed,
                status_final: TerrainStatus::Completed,
            },
        ];
        assert!(store.update_statuses(&batch).await.is_err());
        assert_eq!(
            store.terrain(terrain.id).unwrap().status_technical,
            TerrainStatus::UnderReview
        );

        let updated = store.update_statuses(&batch[..1]).await.unwrap();
        assert_eq!(updated[0].status_final, TerrainStatus::Validated);
    }

    #[tokio::test]
    async fn test_delete_and_snapshot() {
        let store = MemoryTerrainStore::with_reference(vec![project()], vec![]);
        let terrain = store.create_terrain(&create_request()).await.unwrap();

        assert_eq!(store.snapshot().await.unwrap().terrains.len(), 1);
        store.delete_terrain(terrain.id).await.unwrap();
        assert!(store.snapshot().await.unwrap().terrains.is_empty());
        assert!(store.delete_terrain(terrain.id).await.is_err());
    }

    #[test]
    fn test_seeded_terrain_ids_are_not_reused() {
        let store = MemoryTerrainStore::with_reference(vec![project()], vec![]);
        let mut seeded = Terrain {
            id: TerrainId(7),
            name: "Seed".to_string(),
            description: String::new(),
            polygon: polygon_from(&create_request().polygon).unwrap(),
            buffer_radius_meters: 0.0,
            surface_area_square_meters: 0.0,
            project_id: ProjectId(1),
            status_technical: TerrainStatus::InProgress,
            status_final: TerrainStatus::UnderReview,
            assigned_person_ids: Default::default(),
            created_at: None,
            updated_at: None,
        };
        store.insert_terrain(seeded.clone());
        seeded.id = TerrainId(3);
        store.insert_terrain(seeded);

        assert_eq!(store.allocate_id(), TerrainId(8));
    }
}
