use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;
use terrasite_core::draft::TerrainDraft;
use terrasite_core::drawing::DrawingState;
use terrasite_core::models::{Bounds, Point};

/// Output for import command
#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub file_name: String,
    pub candidates: Vec<CandidateInfo>,
    pub selected: Option<TerrainDraft>,
}

#[derive(Debug, Serialize)]
pub struct CandidateInfo {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub vertices: usize,
    pub surface_area_square_meters: f64,
    pub bounds: Bounds,
    pub source_properties: BTreeMap<String, String>,
}

#[derive(Tabled)]
pub struct CandidateRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Vertices")]
    pub vertices: usize,
    #[tabled(rename = "Area (m²)")]
    pub area: f64,
}

impl From<&CandidateInfo> for CandidateRow {
    fn from(info: &CandidateInfo) -> Self {
        Self {
            index: info.index,
            name: info.name.clone(),
            vertices: info.vertices,
            area: info.surface_area_square_meters,
        }
    }
}

/// Output for area command
#[derive(Debug, Serialize)]
pub struct AreaOutput {
    pub vertices: usize,
    pub surface_area_square_meters: f64,
    pub bounds: Option<Bounds>,
}

/// Output for draw command
#[derive(Debug, Serialize)]
pub struct DrawOutput {
    pub steps: Vec<DrawStep>,
    pub final_state: DrawingState,
    pub pending_points: Vec<Point>,
    pub polygon: Option<Vec<Point>>,
    pub surface_area_square_meters: Option<f64>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct DrawStep {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Event")]
    pub event: String,
    #[tabled(rename = "Outcome")]
    pub outcome: String,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub entries: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
