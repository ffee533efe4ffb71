//! Read-only reference data owned by the surrounding application.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::terrain::Terrain;

/// Unique identifier for a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

/// Unique identifier for a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A project that terrains hang off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub responsible_person_id: Option<PersonId>,
    #[serde(default)]
    pub assigned_person_ids: BTreeSet<PersonId>,
}

impl Project {
    /// Whether the person is the project's responsible
    pub fn is_responsible(&self, person_id: PersonId) -> bool {
        self.responsible_person_id == Some(person_id)
    }

    /// Whether the person counts as "on" the project
    pub fn includes(&self, person_id: PersonId) -> bool {
        self.assigned_person_ids.contains(&person_id) || self.is_responsible(person_id)
    }
}

/// Candidate for terrain assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub role: String,
}

/// Wholesale snapshot of projects, personnel and terrains
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceSnapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub personnel: Vec<Person>,
    #[serde(default)]
    pub terrains: Vec<Terrain>,
}

impl ReferenceSnapshot {
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.personnel.iter().find(|p| p.id == id)
    }

    pub fn terrain(&self, id: super::TerrainId) -> Option<&Terrain> {
        self.terrains.iter().find(|t| t.id == id)
    }

    /// Terrains that belong to a project
    pub fn terrains_for_project(&self, id: ProjectId) -> impl Iterator<Item = &Terrain> {
        self.terrains.iter().filter(move |t| t.project_id == id)
    }

    /// Terrains whose technical status still needs work
    pub fn active_terrains(&self) -> impl Iterator<Item = &Terrain> {
        self.terrains.iter().filter(|t| t.status_technical.is_active())
    }
}
