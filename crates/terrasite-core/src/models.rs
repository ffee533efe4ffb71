pub mod geometry;
pub mod reference;
pub mod terrain;

pub use geometry::{Bounds, Point, Polygon, MIN_RING_POINTS};
pub use reference::{Person, PersonId, Project, ProjectId, ReferenceSnapshot};
pub use terrain::{
    AssignmentState, CreateTerrainRequest, DraftSource, StatusUpdate, Terrain, TerrainId,
    TerrainStatus, ToggleAssignmentRequest, UpdateTerrainRequest,
};
