//! Terrain form drafts and their validation

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::area::AreaCalculator;
use crate::drawing::ClosedDrawing;
use crate::error::{FieldErrors, Result, TerrasiteError};
use crate::import::ImportedCandidate;
use crate::models::{
    CreateTerrainRequest, DraftSource, PersonId, Polygon, Project, ProjectId, ReferenceSnapshot, Terrain,
    TerrainId, UpdateTerrainRequest,
};

/// Editable terrain form, seeded from a drawing, an import or an existing terrain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainDraft {
    pub name: String,
    pub description: String,
    /// Buffer radius in whole meters
    pub radius: Option<i64>,
    pub project_id: Option<ProjectId>,
    pub assigned_person_ids: BTreeSet<PersonId>,
    pub polygon: Option<Polygon>,
    pub source: DraftSource,
}

impl TerrainDraft {
    /// Empty form for the given origin
    pub fn new(source: DraftSource) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            radius: None,
            project_id: None,
            assigned_person_ids: BTreeSet::new(),
            polygon: None,
            source,
        }
    }

    pub fn from_closed_drawing(drawing: ClosedDrawing) -> Self {
        Self {
            polygon: Some(drawing.polygon),
            ..Self::new(DraftSource::Drawn)
        }
    }

    pub fn from_candidate(candidate: ImportedCandidate, file_name: &str) -> Self {
        Self {
            name: candidate.name,
            description: candidate.description,
            polygon: Some(candidate.polygon),
            ..Self::new(DraftSource::Imported {
                file_name: file_name.to_string(),
                source_properties: candidate.source_properties,
            })
        }
    }

    /// Load a persisted terrain for editing
    pub fn from_terrain(terrain: &Terrain) -> Self {
        Self {
            name: terrain.name.clone(),
            description: terrain.description.clone(),
            radius: Some(terrain.buffer_radius_meters.round() as i64),
            project_id: Some(terrain.project_id),
            assigned_person_ids: terrain.assigned_person_ids.clone(),
            polygon: Some(terrain.polygon.clone()),
            source: DraftSource::Existing { id: terrain.id },
        }
    }

    /// Id of the terrain being edited, if any
    pub fn terrain_id(&self) -> Option<TerrainId> {
        match self.source {
            DraftSource::Existing { id } => Some(id),
            _ => None,
        }
    }

    /// Metadata carried over from an imported placemark
    pub fn source_properties(&self) -> Option<&BTreeMap<String, String>> {
        match &self.source {
            DraftSource::Imported {
                source_properties, ..
            } => Some(source_properties),
            _ => None,
        }
    }

    /// Swap in a re-drawn boundary
    pub fn replace_polygon(&mut self, polygon: Polygon) {
        self.polygon = Some(polygon);
    }

    /// Area of the current boundary, if there is one
    pub fn surface_area(&self, calculator: &AreaCalculator) -> Option<f64> {
        self.polygon.as_ref().map(|p| calculator.polygon_area(p))
    }

    /// Validate for creation and build the request payload
    pub fn validate_create(
        &self,
        snapshot: &ReferenceSnapshot,
        calculator: &AreaCalculator,
    ) -> Result<CreateTerrainRequest> {
        let mut errors = self.common_errors();

        match self.project_id {
            None => errors.add("projectId", "Project is required"),
            Some(id) => match snapshot.project(id) {
                None => errors.add("projectId", format!("Project {} does not exist", id)),
                Some(project) => self.check_members(project, &mut errors),
            },
        }

        errors.into_result()?;

        // Guaranteed by the checks above
        let (Some(polygon), Some(project_id), Some(radius)) =
            (&self.polygon, self.project_id, self.radius)
        else {
            return Err(TerrasiteError::Validation(FieldErrors::new()));
        };

        Ok(CreateTerrainRequest {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            radius,
            project_id,
            assigned_person_ids: self.assigned_person_ids.iter().copied().collect(),
            polygon: polygon.points().to_vec(),
            surface_area_square_meters: calculator.polygon_area(polygon) as i64,
        })
    }

    /// Validate an edit and build the update payload; the project is never sent
    ///
    /// Membership is checked against the project the saved terrain belongs to.
    pub fn validate_update(
        &self,
        snapshot: &ReferenceSnapshot,
        calculator: &AreaCalculator,
    ) -> Result<(TerrainId, UpdateTerrainRequest)> {
        let mut errors = self.common_errors();
        match self.terrain_id() {
            None => errors.add("id", "Only saved terrains can be updated"),
            Some(id) => match snapshot.terrain(id) {
                None => errors.add("id", format!("Terrain {} does not exist", id)),
                Some(saved) => match snapshot.project(saved.project_id) {
                    None => errors.add(
                        "projectId",
                        format!("Project {} does not exist", saved.project_id),
                    ),
                    Some(project) => self.check_members(project, &mut errors),
                },
            },
        }
        errors.into_result()?;

        let (Some(id), Some(polygon), Some(radius)) = (self.terrain_id(), &self.polygon, self.radius)
        else {
            return Err(TerrasiteError::Validation(FieldErrors::new()));
        };

        let request = UpdateTerrainRequest {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            radius,
            assigned_person_ids: self.assigned_person_ids.iter().copied().collect(),
            polygon: polygon.points().to_vec(),
            surface_area_square_meters: calculator.polygon_area(polygon) as i64,
        };
        Ok((id, request))
    }

    fn check_members(&self, project: &Project, errors: &mut FieldErrors) {
        for person_id in &self.assigned_person_ids {
            if !project.includes(*person_id) {
                errors.add(
                    "assignedPersonIds",
                    format!("Person {} is not a member of project {}", person_id, project.id),
                );
            }
        }
    }

    fn common_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        match self.radius {
            None => errors.add("radius", "Radius is required"),
            Some(r) if r < 0 => errors.add("radius", "Radius must be zero or greater"),
            Some(_) => {}
        }
        if self.polygon.is_none() {
            errors.add("polygon", "Draw or import a polygon first");
        }

        errors
    }
}
