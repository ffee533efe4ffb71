//! Planar surface-area computation.
//!
//! Points are treated as Cartesian `(latitude, longitude)` pairs, the shoelace sum is
//! taken over the implicitly closed ring, and the result in square degrees is scaled
//! by the square of a meters-per-degree constant. The constant is applied uniformly
//! regardless of latitude, so results drift from geodesic area away from the equator
//! and for very large footprints.

use geo::{Area, LineString};

use crate::models::{Point, Polygon};

/// Length of one degree of arc at the equator, in meters
pub const METERS_PER_DEGREE_AT_EQUATOR: f64 = 111_320.0;

/// Area calculator parameterised by the degree-to-meter conversion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaCalculator {
    meters_per_degree: f64,
}

impl Default for AreaCalculator {
    fn default() -> Self {
        Self::new(METERS_PER_DEGREE_AT_EQUATOR)
    }
}

impl AreaCalculator {
    pub fn new(meters_per_degree: f64) -> Self {
        Self { meters_per_degree }
    }

    pub fn meters_per_degree(&self) -> f64 {
        self.meters_per_degree
    }

    /// Unsigned shoelace area in square degrees; `0` for fewer than three points
    pub fn square_degrees(&self, points: &[Point]) -> f64 {
        if points.len() < 3 {
            return 0.0;
        }

        let ring: LineString<f64> = points
            .iter()
            .map(|p| geo::coord! { x: p.latitude, y: p.longitude })
            .collect();

        // Polygon::new closes the ring
        geo::Polygon::new(ring, vec![]).unsigned_area()
    }

    /// Area in square meters, rounded to the nearest whole unit
    pub fn square_meters(&self, points: &[Point]) -> f64 {
        let raw = self.square_degrees(points) * self.meters_per_degree * self.meters_per_degree;
        raw.round()
    }

    pub fn polygon_area(&self, polygon: &Polygon) -> f64 {
        self.square_meters(polygon.points())
    }
}

/// Surface area in square meters using the equatorial constant
pub fn area(points: &[Point]) -> f64 {
    AreaCalculator::default().square_meters(points)
}
