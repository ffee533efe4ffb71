//! Person-to-terrain assignment rules and toggling
//!
//! Eligibility is checked locally before any request goes out. Toggles on
//! distinct (person, terrain) pairs run concurrently; a second toggle on a pair
//! that is still in flight is rejected.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::error::{Result, TerrasiteError};
use crate::models::{
    AssignmentState, Person, PersonId, Project, ReferenceSnapshot, Terrain, TerrainId,
    ToggleAssignmentRequest,
};
use crate::ports::TerrainStore;

/// One line of the assignment picker
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRow {
    pub person: Person,
    /// Shown as "on"
    pub assigned: bool,
    /// Whether the user may flip it
    pub assignable: bool,
}

/// Rows for everyone on the project, in personnel order
///
/// The responsible person always shows as assigned and is never assignable.
pub fn assignment_rows(project: &Project, terrain: &Terrain, personnel: &[Person]) -> Vec<AssignmentRow> {
    personnel
        .iter()
        .filter(|person| project.includes(person.id))
        .map(|person| {
            let responsible = project.is_responsible(person.id);
            AssignmentRow {
                person: person.clone(),
                assigned: responsible || terrain.is_assigned(person.id),
                assignable: !responsible,
            }
        })
        .collect()
}

/// Project members not yet on the terrain, responsible person excluded
pub fn available_people<'a>(
    project: &Project,
    terrain: &Terrain,
    personnel: &'a [Person],
) -> Vec<&'a Person> {
    personnel
        .iter()
        .filter(|p| project.assigned_person_ids.contains(&p.id))
        .filter(|p| !project.is_responsible(p.id))
        .filter(|p| !terrain.is_assigned(p.id))
        .collect()
}

/// Check that a toggle is allowed before issuing it
///
/// Membership only gates adding a person. Someone already on the terrain can be
/// removed even after leaving the project.
pub fn check_eligibility(project: &Project, terrain: &Terrain, person_id: PersonId) -> Result<()> {
    if terrain.project_id != project.id {
        return Err(TerrasiteError::ProjectMismatch {
            terrain_id: terrain.id,
            expected: terrain.project_id,
            actual: project.id,
        });
    }
    if project.is_responsible(person_id) {
        return Err(TerrasiteError::NotToggleable {
            person_id,
            project_id: project.id,
        });
    }
    if !terrain.is_assigned(person_id) && !project.assigned_person_ids.contains(&person_id) {
        return Err(TerrasiteError::NotEligible {
            person_id,
            project_id: project.id,
        });
    }
    Ok(())
}

/// Copy a confirmed assignment list onto the local terrain
pub fn apply_state(terrain: &mut Terrain, state: &AssignmentState) {
    if terrain.id == state.terrain_id {
        terrain.assigned_person_ids = state.assigned_person_ids.clone();
    }
}

type PairSet = Arc<Mutex<HashSet<(PersonId, TerrainId)>>>;

/// Issues toggle requests with a per-pair in-flight guard
pub struct AssignmentEngine {
    store: Arc<dyn TerrainStore>,
    in_flight: PairSet,
}

impl AssignmentEngine {
    pub fn new(store: Arc<dyn TerrainStore>) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Whether a toggle for this pair is outstanding
    pub fn is_in_flight(&self, person_id: PersonId, terrain_id: TerrainId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(person_id, terrain_id))
    }

    /// Toggle a person on a terrain after checking eligibility
    pub async fn toggle(
        &self,
        project: &Project,
        terrain: &Terrain,
        person_id: PersonId,
    ) -> Result<AssignmentState> {
        check_eligibility(project, terrain, person_id)?;

        let _guard = InFlightGuard::acquire(&self.in_flight, person_id, terrain.id)?;
        let request = ToggleAssignmentRequest {
            person_id,
            terrain_id: terrain.id,
        };

        match self.store.toggle_assignment(&request).await {
            Ok(state) => {
                tracing::info!(
                    person = %person_id,
                    terrain = %terrain.id,
                    assigned = state.assigned_person_ids.contains(&person_id),
                    "Assignment toggled"
                );
                Ok(state)
            }
            Err(e) => {
                tracing::warn!(person = %person_id, terrain = %terrain.id, error = %e, "Assignment toggle failed");
                Err(e)
            }
        }
    }

    /// Resolve the terrain and its project from a snapshot, then toggle
    pub async fn toggle_in(
        &self,
        snapshot: &ReferenceSnapshot,
        terrain_id: TerrainId,
        person_id: PersonId,
    ) -> Result<AssignmentState> {
        let terrain = snapshot
            .terrain(terrain_id)
            .ok_or(TerrasiteError::TerrainNotFound { id: terrain_id })?;
        let project = snapshot
            .project(terrain.project_id)
            .ok_or(TerrasiteError::ProjectNotFound {
                id: terrain.project_id,
            })?;

        self.toggle(project, terrain, person_id).await
    }
}

/// Marks a pair as in flight until dropped, including on error paths
struct InFlightGuard {
    pairs: PairSet,
    key: (PersonId, TerrainId),
}

impl InFlightGuard {
    fn acquire(pairs: &PairSet, person_id: PersonId, terrain_id: TerrainId) -> Result<Self> {
        let key = (person_id, terrain_id);
        let inserted = pairs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key);

        if !inserted {
            return Err(TerrasiteError::AssignmentInFlight {
                person_id,
                terrain_id,
            });
        }

        Ok(Self {
            pairs: Arc::clone(pairs),
            key,
        })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.pairs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
