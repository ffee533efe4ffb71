//! Coordinate and polygon types shared by the drawing, import and persistence paths.
//!
//! A [`Polygon`] is an implicitly closed ring: the first point connects back to the
//! last and no closing duplicate is stored.

use geo::BoundingRect;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrasiteError};

/// Minimum number of points that form a ring
pub const MIN_RING_POINTS: usize = 3;

/// WGS-84 coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build from a GeoJSON position (`[lng, lat, ...]`)
    pub fn from_position(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] => Some(Self::new(*lat, *lng)),
            _ => None,
        }
    }

    /// GeoJSON position order (`[lng, lat]`)
    pub fn to_position(&self) -> Vec<f64> {
        vec![self.longitude, self.latitude]
    }
}

/// Ordered ring of at least three points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    /// Create a polygon, rejecting rings with fewer than three points
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < MIN_RING_POINTS {
            return Err(TerrasiteError::InvalidPolygon {
                required: MIN_RING_POINTS,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Bounding box of the ring, for fitting a map viewport
    pub fn bounds(&self) -> Bounds {
        let line: geo::LineString<f64> = self
            .points
            .iter()
            .map(|p| geo::coord! { x: p.longitude, y: p.latitude })
            .collect();

        // A ring of three or more points always has a bounding rect
        match line.bounding_rect() {
            Some(rect) => Bounds {
                south: rect.min().y,
                west: rect.min().x,
                north: rect.max().y,
                east: rect.max().x,
            },
            None => Bounds::default(),
        }
    }
}

impl TryFrom<Vec<Point>> for Polygon {
    type Error = TerrasiteError;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        Polygon::new(points)
    }
}

impl From<Polygon> for Vec<Point> {
    fn from(polygon: Polygon) -> Self {
        polygon.points
    }
}

/// Latitude/longitude extent of a polygon
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}
