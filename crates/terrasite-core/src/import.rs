//! Geographic archive import pipeline.
//!
//! Stages run strictly in order and the first failure aborts the whole import:
//!
//! 1. container: pick a reader by extension and pull out the KML text
//! 2. XML parse: structural check, then the KML object model
//! 3. geographic conversion: KML to a GeoJSON feature collection
//! 4. extraction: polygon features become [`ImportedCandidate`]s
//!
//! Within a file that makes it to stage 4, rings that are too short are skipped
//! rather than failing the import.

use std::collections::BTreeMap;
use std::path::Path;

use geojson::{Feature, FeatureCollection, Value};
use serde::{Deserialize, Serialize};

use crate::area::AreaCalculator;
use crate::draft::TerrainDraft;
use crate::error::{Result, TerrasiteError};
use crate::formats::geojson::{kml_to_geojson, parse_kml};
use crate::formats::FormatRegistry;
use crate::models::{Point, Polygon};

/// Tunables for the extraction stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Rings with fewer points (after dropping the closing duplicate) are skipped
    pub min_vertices: usize,
    /// Name prefix for placemarks without a name ("Terrain 3")
    pub placeholder_prefix: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            min_vertices: 4,
            placeholder_prefix: "Terrain".to_string(),
        }
    }
}

/// Polygon extracted from an archive, waiting for the user to pick it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedCandidate {
    pub name: String,
    pub description: String,
    pub polygon: Polygon,
    pub source_properties: BTreeMap<String, String>,
}

impl ImportedCandidate {
    pub fn surface_area(&self, calculator: &AreaCalculator) -> f64 {
        calculator.polygon_area(&self.polygon)
    }
}

/// Runs uploaded files through the four import stages
pub struct ImportPipeline {
    registry: FormatRegistry,
    options: ImportOptions,
}

impl Default for ImportPipeline {
    fn default() -> Self {
        Self::new(ImportOptions::default())
    }
}

impl ImportPipeline {
    pub fn new(options: ImportOptions) -> Self {
        Self {
            registry: FormatRegistry::with_defaults(),
            options,
        }
    }

    pub fn with_registry(registry: FormatRegistry, options: ImportOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Reject unsupported files before reading them
    pub fn check_supported(&self, file_name: &str) -> Result<()> {
        self.registry.detect_format(file_name).map(|_| ())
    }

    /// Import an uploaded file held in memory
    pub fn import_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<Vec<ImportedCandidate>> {
        // Stage 1: container
        let reader = self.registry.detect_format(file_name)?;
        tracing::debug!(file_name, format = reader.format_name(), "Extracting KML document");
        let text = reader.extract_document(bytes)?;

        // Stage 2: XML parse
        let kml = parse_kml(&text)?;

        // Stage 3: geographic conversion
        let collection = kml_to_geojson(&kml);
        if collection.features.is_empty() {
            return Err(TerrasiteError::NoGeographicData);
        }
        tracing::debug!(features = collection.features.len(), "Converted KML to GeoJSON");

        // Stage 4: extraction
        let candidates = self.extract_candidates(&collection, file_name);
        tracing::info!(
            file_name,
            features = collection.features.len(),
            candidates = candidates.len(),
            "Imported terrain candidates"
        );
        Ok(candidates)
    }

    /// Import a file from disk
    pub async fn import_path(&self, path: &Path) -> Result<ImportPreview> {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        self.check_supported(&file_name)?;
        let bytes = tokio::fs::read(path).await?;
        let candidates = self.import_bytes(&file_name, &bytes)?;

        Ok(ImportPreview::new(file_name, candidates))
    }

    /// Keep polygon features whose outer ring is long enough
    pub fn extract_candidates(
        &self,
        collection: &FeatureCollection,
        file_name: &str,
    ) -> Vec<ImportedCandidate> {
        collection
            .features
            .iter()
            .enumerate()
            .filter_map(|(index, feature)| self.extract_candidate(index, feature, file_name))
            .collect()
    }

    fn extract_candidate(
        &self,
        index: usize,
        feature: &Feature,
        file_name: &str,
    ) -> Option<ImportedCandidate> {
        let rings = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Polygon(rings)) => rings,
            _ => return None,
        };

        let points = outer_ring_points(rings.first()?);
        if points.len() < self.options.min_vertices {
            tracing::warn!(
                feature = index,
                points = points.len(),
                required = self.options.min_vertices,
                "Skipping ring with too few points"
            );
            return None;
        }
        let polygon = Polygon::new(points).ok()?;

        let source_properties = stringify_properties(feature);
        let name = source_properties
            .get("name")
            .filter(|n| !n.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| format!("{} {}", self.options.placeholder_prefix, index + 1));
        let description = source_properties
            .get("description")
            .filter(|d| !d.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| format!("Imported from {}", file_name));

        Some(ImportedCandidate {
            name,
            description,
            polygon,
            source_properties,
        })
    }
}

/// Map `[lng, lat]` positions to points, dropping the closing duplicate
fn outer_ring_points(ring: &[Vec<f64>]) -> Vec<Point> {
    let mut points: Vec<Point> = ring.iter().filter_map(|p| Point::from_position(p)).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn stringify_properties(feature: &Feature) -> BTreeMap<String, String> {
    feature
        .properties
        .iter()
        .flatten()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}

/// Candidates from one file, shown to the user until one is picked
#[derive(Debug, Clone, Default)]
pub struct ImportPreview {
    file_name: String,
    candidates: Vec<ImportedCandidate>,
}

impl ImportPreview {
    pub fn new(file_name: impl Into<String>, candidates: Vec<ImportedCandidate>) -> Self {
        Self {
            file_name: file_name.into(),
            candidates,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn candidates(&self) -> &[ImportedCandidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Promote one candidate into a draft and clear the preview
    pub fn select(&mut self, index: usize) -> Option<TerrainDraft> {
        if index >= self.candidates.len() {
            return None;
        }
        let candidate = self.candidates.swap_remove(index);
        self.candidates.clear();
        Some(TerrainDraft::from_candidate(candidate, &self.file_name))
    }

    pub fn clear(&mut self) {
        self.candidates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DraftSource;

    fn polygon_placemark(name: Option<&str>, coords: &str) -> String {
        let name = name.map(|n| format!("<name>{}</name>", n)).unwrap_or_default();
        format!(
            "<Placemark>{}<Polygon><outerBoundaryIs><LinearRing><coordinates>{}</coordinates></LinearRing></outerBoundaryIs></Polygon></Placemark>",
            name, coords
        )
    }

    fn kml(placemarks: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><kml xmlns="http://www.opengis.net/kml/2.2"><Document>{}</Document></kml>"#,
            placemarks.join("")
        )
    }

    const SQUARE: &str = "0,0 0.001,0 0.001,0.001 0,0.001 0,0";
    const TRIANGLE: &str = "0,0 1,0 1,1 0,0";
    const PENTAGON: &str = "0,0 2,0 3,1 1,2 -1,1 0,0";

    #[test]
    fn test_axis_swap_and_closing_point() {
        let pipeline = ImportPipeline::default();
        let text = kml(&[polygon_placemark(Some("Lot"), "10,20 11,20 11,21 10,21 10,20")]);

        let candidates = pipeline.import_bytes("site.kml", text.as_bytes()).unwrap();
        assert_eq!(candidates.len(), 1);

        let points = candidates[0].polygon.points();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], Point::new(20.0, 10.0));
        assert_eq!(points[1], Point::new(20.0, 11.0));
    }

    #[test]
    fn test_open_ring_keeps_all_points() {
        let pipeline = ImportPipeline::default();
        let text = kml(&[polygon_placemark(None, "0,0 1,0 1,1 0,1")]);

        let candidates = pipeline.import_bytes("site.kml", text.as_bytes()).unwrap();
        assert_eq!(candidates[0].polygon.len(), 4);
    }

    #[test]
    fn test_short_ring_skipped_but_others_kept() {
        let pipeline = ImportPipeline::default();
        let text = kml(&[
            polygon_placemark(Some("Sliver"), TRIANGLE),
            polygon_placemark(Some("Five"), PENTAGON),
        ]);

        let candidates = pipeline.import_bytes("site.kml", text.as_bytes()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Five");
        assert_eq!(candidates[0].polygon.len(), 5);
    }

    #[test]
    fn test_lone_triangle_yields_nothing() {
        let pipeline = ImportPipeline::default();
        let text = kml(&[polygon_placemark(Some("Sliver"), TRIANGLE)]);

        let candidates = pipeline.import_bytes("site.kml", text.as_bytes()).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_lower_floor_admits_triangles() {
        let pipeline = ImportPipeline::new(ImportOptions {
            min_vertices: 3,
            ..Default::default()
        });
        let text = kml(&[polygon_placemark(Some("Sliver"), TRIANGLE)]);

        let candidates = pipeline.import_bytes("site.kml", text.as_bytes()).unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_placeholder_name_and_description() {
        let pipeline = ImportPipeline::default();
        let text = kml(&[
            "<Placemark><Point><coordinates>1,1</coordinates></Point></Placemark>".to_string(),
            polygon_placemark(None, SQUARE),
        ]);

        let candidates = pipeline.import_bytes("chantier.kml", text.as_bytes()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Terrain 2");
        assert_eq!(candidates[0].description, "Imported from chantier.kml");
        assert!(candidates[0].source_properties.is_empty());
    }

    #[test]
    fn test_properties_flow_through() {
        let pipeline = ImportPipeline::default();
        let text = kml(&[format!(
            "<Placemark><name>Lot B</name><description>South</description><ExtendedData><Data name=\"zone\"><value>B2</value></Data></ExtendedData><Polygon><outerBoundaryIs><LinearRing><coordinates>{}</coordinates></LinearRing></outerBoundaryIs></Polygon></Placemark>",
            SQUARE
        )]);

        let candidates = pipeline.import_bytes("site.kml", text.as_bytes()).unwrap();
        let candidate = &candidates[0];
        assert_eq!(candidate.name, "Lot B");
        assert_eq!(candidate.description, "South");
        assert_eq!(candidate.source_properties.get("zone").map(String::as_str), Some("B2"));
        assert_eq!(candidate.surface_area(&AreaCalculator::default()), 12392.0);
    }

    #[test]
    fn test_stage_failures() {
        let pipeline = ImportPipeline::default();

        let err = pipeline.import_bytes("site.gpx", b"<gpx/>").unwrap_err();
        assert!(matches!(err, TerrasiteError::UnsupportedFormat { .. }));

        let err = pipeline.import_bytes("site.kml", b"<kml><Document>").unwrap_err();
        assert!(matches!(err, TerrasiteError::XmlParse { .. }));

        let err = pipeline
            .import_bytes("site.kml", b"<kml><Document><name>x</name></Document></kml>")
            .unwrap_err();
        assert!(matches!(err, TerrasiteError::NoGeographicData));
    }

    #[test]
    fn test_preview_selection_clears_list() {
        let pipeline = ImportPipeline::default();
        let text = kml(&[
            polygon_placemark(Some("A"), SQUARE),
            polygon_placemark(Some("B"), PENTAGON),
        ]);
        let candidates = pipeline.import_bytes("site.kml", text.as_bytes()).unwrap();
        let mut preview = ImportPreview::new("site.kml", candidates);

        assert!(preview.select(5).is_none());
        assert_eq!(preview.candidates().len(), 2);

        let draft = preview.select(1).unwrap();
        assert_eq!(draft.name, "B");
        assert!(preview.is_empty());
        assert!(matches!(draft.source, DraftSource::Imported { ref file_name, .. } if file_name == "site.kml"));
    }

    #[tokio::test]
    async fn test_import_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parcel.kml");
        std::fs::write(&path, kml(&[polygon_placemark(Some("A"), SQUARE)])).unwrap();

        let preview = ImportPipeline::default().import_path(&path).await.unwrap();
        assert_eq!(preview.file_name(), "parcel.kml");
        assert_eq!(preview.candidates().len(), 1);
    }

    #[tokio::test]
    async fn test_import_path_rejects_before_reading() {
        // The file does not exist; the extension check must fail first
        let err = ImportPipeline::default()
            .import_path(Path::new("/nonexistent/parcel.shp"))
            .await
            .unwrap_err();
        assert!(matches!(err, TerrasiteError::UnsupportedFormat { .. }));
    }
}
