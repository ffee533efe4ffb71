//! Shared fixtures and store wrappers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use terrasite_core::error::{Result, TerrasiteError};
use terrasite_core::models::{
    AssignmentState, CreateTerrainRequest, Person, PersonId, Point, Polygon, Project, ProjectId,
    ReferenceSnapshot, StatusUpdate, Terrain, TerrainId, TerrainStatus, ToggleAssignmentRequest,
    UpdateTerrainRequest,
};
use terrasite_core::ports::TerrainStore;
use terrasite_store::MemoryTerrainStore;
use tokio::sync::Notify;

pub const RESPONSIBLE: PersonId = PersonId(10);
pub const MEMBER: PersonId = PersonId(11);
pub const OTHER_MEMBER: PersonId = PersonId(12);
pub const OUTSIDER: PersonId = PersonId(13);
pub const PROJECT: ProjectId = ProjectId(1);
pub const TERRAIN: TerrainId = TerrainId(5);

pub fn square() -> Polygon {
    Polygon::new(vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 0.001),
        Point::new(0.001, 0.001),
        Point::new(0.001, 0.0),
    ])
    .unwrap()
}

pub fn seeded_store() -> MemoryTerrainStore {
    let project = Project {
        id: PROJECT,
        name: "Extension Nord".to_string(),
        responsible_person_id: Some(RESPONSIBLE),
        assigned_person_ids: [MEMBER, OTHER_MEMBER].into_iter().collect(),
    };
    let personnel = [
        (RESPONSIBLE, "Youssef"),
        (MEMBER, "Amina"),
        (OTHER_MEMBER, "Karim"),
        (OUTSIDER, "Nadia"),
    ]
    .into_iter()
    .map(|(id, name)| Person {
        id,
        name: name.to_string(),
        role: "surveyor".to_string(),
    })
    .collect();

    let store = MemoryTerrainStore::with_reference(vec![project], personnel);
    store.insert_terrain(Terrain {
        id: TERRAIN,
        name: "Lot A".to_string(),
        description: String::new(),
        polygon: square(),
        buffer_radius_meters: 10.0,
        surface_area_square_meters: 12392.0,
        project_id: PROJECT,
        status_technical: TerrainStatus::InProgress,
        status_final: TerrainStatus::UnderReview,
        assigned_person_ids: [MEMBER].into_iter().collect(),
        created_at: None,
        updated_at: None,
    });
    store
}

/// Counts every request that reaches the inner store
pub struct CountingStore {
    pub inner: MemoryTerrainStore,
    pub requests: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: MemoryTerrainStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            requests: AtomicUsize::new(0),
        })
    }

    pub fn count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TerrainStore for CountingStore {
    async fn snapshot(&self) -> Result<ReferenceSnapshot> {
        self.inner.snapshot().await
    }

    async fn create_terrain(&self, request: &CreateTerrainRequest) -> Result<Terrain> {
        self.hit();
        self.inner.create_terrain(request).await
    }

    async fn update_terrain(&self, id: TerrainId, request: &UpdateTerrainRequest) -> Result<Terrain> {
        self.hit();
        self.inner.update_terrain(id, request).await
    }

    async fn delete_terrain(&self, id: TerrainId) -> Result<()> {
        self.hit();
        self.inner.delete_terrain(id).await
    }

    async fn toggle_assignment(&self, request: &ToggleAssignmentRequest) -> Result<AssignmentState> {
        self.hit();
        self.inner.toggle_assignment(request).await
    }

    async fn update_statuses(&self, updates: &[StatusUpdate]) -> Result<Vec<Terrain>> {
        self.hit();
        self.inner.update_statuses(updates).await
    }
}

/// Fails every write with a transport error, leaving the inner store untouched
pub struct FailingStore {
    pub inner: MemoryTerrainStore,
}

#[async_trait]
impl TerrainStore for FailingStore {
    async fn snapshot(&self) -> Result<ReferenceSnapshot> {
        self.inner.snapshot().await
    }

    async fn create_terrain(&self, _request: &CreateTerrainRequest) -> Result<Terrain> {
        Err(TerrasiteError::transport("create", "connection reset"))
    }

    async fn update_terrain(&self, _id: TerrainId, _request: &UpdateTerrainRequest) -> Result<Terrain> {
        Err(TerrasiteError::transport("update", "connection reset"))
    }

    async fn delete_terrain(&self, _id: TerrainId) -> Result<()> {
        Err(TerrasiteError::transport("delete", "connection reset"))
    }

    async fn toggle_assignment(&self, _request: &ToggleAssignmentRequest) -> Result<AssignmentState> {
        Err(TerrasiteError::transport("toggle", "connection reset"))
    }

    async fn update_statuses(&self, _updates: &[StatusUpdate]) -> Result<Vec<Terrain>> {
        Err(TerrasiteError::transport("statuses", "connection reset"))
    }
}

/// Holds every toggle until released
pub struct GatedStore {
    pub inner: MemoryTerrainStore,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedStore {
    pub fn new(inner: MemoryTerrainStore) -> Arc<Self> {
        Arc::new(Self {
            inner,
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl TerrainStore for GatedStore {
    async fn snapshot(&self) -> Result<ReferenceSnapshot> {
        self.inner.snapshot().await
    }

    async fn create_terrain(&self, request: &CreateTerrainRequest) -> Result<Terrain> {
        self.inner.create_terrain(request).await
    }

    async fn update_terrain(&self, id: TerrainId, request: &UpdateTerrainRequest) -> Result<Terrain> {
        self.inner.update_terrain(id, request).await
    }

    async fn delete_terrain(&self, id: TerrainId) -> Result<()> {
        self.inner.delete_terrain(id).await
    }

    async fn toggle_assignment(&self, request: &ToggleAssignmentRequest) -> Result<AssignmentState> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.toggle_assignment(request).await
    }

    async fn update_statuses(&self, updates: &[StatusUpdate]) -> Result<Vec<Terrain>> {
        self.inner.update_statuses(updates).await
    }
}
