//! KML to GeoJSON conversion.
//!
//! Parsing is delegated to the `kml` crate. Every `Placemark` becomes a feature,
//! coordinates become `[lng, lat(, alt)]` positions, `Polygon` keeps its outer ring
//! first followed by inner rings, and `MultiGeometry` becomes a
//! `GeometryCollection` (or its single member when it holds just one).

use std::collections::HashMap;

use ::kml::types::{Coord, Element, Geometry as KmlGeometry, Placemark};
use ::kml::Kml;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use super::validation::check_well_formed;
use crate::error::{Result, TerrasiteError};

/// Parse KML text, reporting structural problems with the XML parser's diagnostic
pub fn parse_kml(text: &str) -> Result<Kml> {
    check_well_formed(text)?;
    text.parse::<Kml>().map_err(|e| TerrasiteError::XmlParse {
        reason: format!("Failed to parse KML: {}", e),
    })
}

/// Convert a parsed KML document into a feature collection
pub fn kml_to_geojson(kml: &Kml) -> FeatureCollection {
    let mut features = Vec::new();
    collect_placemarks(kml, &mut Vec::new(), &mut features);

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Recursive Document/Folder walk, tracking the enclosing folder names
fn collect_placemarks(kml: &Kml, folders: &mut Vec<String>, features: &mut Vec<Feature>) {
    match kml {
        Kml::KmlDocument(doc) => {
            for element in &doc.elements {
                collect_placemarks(element, folders, features);
            }
        }
        Kml::Document { elements, .. } => {
            for element in elements {
                collect_placemarks(element, folders, features);
            }
        }
        Kml::Folder { attrs, elements } => {
            let named = folder_name(attrs, elements);
            if let Some(name) = &named {
                folders.push(name.clone());
            }
            for element in elements {
                collect_placemarks(element, folders, features);
            }
            if named.is_some() {
                folders.pop();
            }
        }
        Kml::Placemark(placemark) => features.push(convert_placemark(placemark, folders)),
        // Styles, overlays, network links
        _ => {}
    }
}

fn folder_name(attrs: &HashMap<String, String>, elements: &[Kml]) -> Option<String> {
    attrs
        .get("name")
        .cloned()
        .or_else(|| {
            elements.iter().find_map(|element| match element {
                Kml::Element(e) if e.name == "name" => e.content.clone(),
                _ => None,
            })
        })
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

fn convert_placemark(placemark: &Placemark, folders: &[String]) -> Feature {
    let mut properties = JsonObject::new();

    if let Some(name) = non_blank(placemark.name.as_deref()) {
        properties.insert("name".to_string(), json!(name));
    }
    if let Some(description) = non_blank(placemark.description.as_deref()) {
        properties.insert("description".to_string(), json!(description));
    }
    if !folders.is_empty() {
        properties.insert("folder".to_string(), json!(folders.join("/")));
    }
    for child in &placemark.children {
        match child.name.as_str() {
            "ExtendedData" => collect_extended_data(child, &mut properties),
            "styleUrl" => {
                if let Some(style) = non_blank(child.content.as_deref()) {
                    properties.insert("styleUrl".to_string(), json!(style));
                }
            }
            _ => {}
        }
    }

    Feature {
        bbox: None,
        geometry: placemark.geometry.as_ref().and_then(convert_geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// `<Data name><value>` and `<SchemaData><SimpleData name>` entries
fn collect_extended_data(extended: &Element, properties: &mut JsonObject) {
    for entry in &extended.children {
        match entry.name.as_str() {
            "Data" => {
                if let Some(name) = entry.attrs.get("name") {
                    let value = entry
                        .children
                        .iter()
                        .find(|c| c.name == "value")
                        .and_then(|c| non_blank(c.content.as_deref()))
                        .unwrap_or_default();
                    properties.insert(name.clone(), json!(value));
                }
            }
            "SchemaData" => {
                for simple in entry.children.iter().filter(|c| c.name == "SimpleData") {
                    if let Some(name) = simple.attrs.get("name") {
                        let value = non_blank(simple.content.as_deref()).unwrap_or_default();
                        properties.insert(name.clone(), json!(value));
                    }
                }
            }
            _ => {}
        }
    }
}

fn convert_geometry(geometry: &KmlGeometry) -> Option<Geometry> {
    let value = match geometry {
        KmlGeometry::Point(point) => Value::Point(position(&point.coord)),
        KmlGeometry::LineString(line) => Value::LineString(positions(&line.coords)),
        KmlGeometry::LinearRing(ring) => Value::LineString(positions(&ring.coords)),
        KmlGeometry::Polygon(polygon) => {
            let mut rings = vec![positions(&polygon.outer.coords)];
            rings.extend(polygon.inner.iter().map(|inner| positions(&inner.coords)));
            Value::Polygon(rings)
        }
        KmlGeometry::MultiGeometry(multi) => {
            let mut members: Vec<Geometry> =
                multi.geometries.iter().filter_map(convert_geometry).collect();
            match members.len() {
                0 => return None,
                1 => return members.pop(),
                _ => Value::GeometryCollection(members),
            }
        }
        _ => {
            tracing::debug!("Skipping unsupported KML geometry");
            return None;
        }
    };

    Some(Geometry::new(value))
}

fn position(coord: &Coord) -> Vec<f64> {
    match coord.z {
        Some(z) => vec![coord.x, coord.y, z],
        None => vec![coord.x, coord.y],
    }
}

fn positions(coords: &[Coord]) -> Vec<Vec<f64>> {
    coords.iter().map(position).collect()
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}
