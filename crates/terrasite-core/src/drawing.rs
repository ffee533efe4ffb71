//! Interactive polygon drawing.
//!
//! A [`DrawingSession`] turns a stream of pointer events into an ordered vertex list:
//!
//! ```text
//! Idle --start--> Drawing --complete (>= floor)--> Closed --finish--> Idle
//!                    |  \--complete (< floor)--> Drawing (rejected)
//!                    \--cancel--> Cancelled --finish--> Idle
//! ```
//!
//! Points are appended in arrival order with no deduplication or snapping.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::area::AreaCalculator;
use crate::models::{Point, Polygon};

/// Minimum vertices for closing a drawn polygon.
///
/// This is an operational floor against sliver terrains, not a geometric rule:
/// a triangle is a valid ring but is refused by the default policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawingPolicy {
    min_vertices: usize,
}

impl Default for DrawingPolicy {
    fn default() -> Self {
        Self { min_vertices: 4 }
    }
}

impl DrawingPolicy {
    /// Floors below a triangle are raised to three
    pub fn new(min_vertices: usize) -> Self {
        Self {
            min_vertices: min_vertices.max(crate::models::MIN_RING_POINTS),
        }
    }

    pub fn min_vertices(&self) -> usize {
        self.min_vertices
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingState {
    Idle,
    Drawing,
    Closed,
    Cancelled,
}

/// Pointer input fed to a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Enter drawing mode
    Start,
    /// Primary click at a map position
    Primary(Point),
    /// Secondary click, the "complete" gesture
    Secondary,
    /// Explicit abort
    Cancel,
}

/// Closing rejected because too few points were placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientPoints {
    pub required: usize,
    pub actual: usize,
}

impl fmt::Display for InsufficientPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Place at least {} points before completing the terrain ({} placed)",
            self.required, self.actual
        )
    }
}

/// Polygon produced by a successful close, with the area used to pre-fill the form
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedDrawing {
    pub polygon: Polygon,
    pub surface_area_square_meters: f64,
}

/// Result of the "complete" gesture
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Closed(ClosedDrawing),
    /// The session stays in `Drawing`
    Rejected(InsufficientPoints),
    /// The gesture arrived outside of `Drawing` and was ignored
    NotDrawing,
}

/// What a single pointer event did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingOutcome {
    Started,
    PointAdded { count: usize },
    Completed(Completion),
    Cancelled { discarded: usize },
    Ignored,
}

/// Transient vertex accumulation state
#[derive(Debug, Clone)]
pub struct DrawingSession {
    state: DrawingState,
    points: Vec<Point>,
    closed: Option<ClosedDrawing>,
    policy: DrawingPolicy,
    area: AreaCalculator,
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new(DrawingPolicy::default(), AreaCalculator::default())
    }
}

impl DrawingSession {
    pub fn new(policy: DrawingPolicy, area: AreaCalculator) -> Self {
        Self {
            state: DrawingState::Idle,
            points: Vec::new(),
            closed: None,
            policy,
            area,
        }
    }

    pub fn state(&self) -> DrawingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == DrawingState::Drawing
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn policy(&self) -> DrawingPolicy {
        self.policy
    }

    /// Live area preview of the points placed so far
    pub fn preview_area(&self) -> f64 {
        self.area.square_meters(&self.points)
    }

    /// Whether the complete gesture would currently be accepted
    pub fn can_complete(&self) -> bool {
        self.is_active() && self.points.len() >= self.policy.min_vertices()
    }

    /// Enter `Drawing`, dropping any previous points or unclaimed result
    pub fn start(&mut self) {
        self.points.clear();
        self.closed = None;
        self.state = DrawingState::Drawing;
        tracing::debug!("Drawing session started");
    }

    /// Append a vertex; ignored outside of `Drawing`
    pub fn append(&mut self, point: Point) -> bool {
        if !self.is_active() {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Attempt to close the ring
    pub fn complete(&mut self) -> Completion {
        if !self.is_active() {
            return Completion::NotDrawing;
        }

        let required = self.policy.min_vertices();
        if self.points.len() < required {
            let rejection = InsufficientPoints {
                required,
                actual: self.points.len(),
            };
            tracing::debug!(%rejection, "Drawing completion rejected");
            return Completion::Rejected(rejection);
        }

        let points = std::mem::take(&mut self.points);
        let surface_area_square_meters = self.area.square_meters(&points);
        let polygon = match Polygon::new(points) {
            Ok(polygon) => polygon,
            // The policy floor is never below a triangle
            Err(_) => return Completion::NotDrawing,
        };

        let closed = ClosedDrawing {
            polygon,
            surface_area_square_meters,
        };
        self.closed = Some(closed.clone());
        self.state = DrawingState::Closed;
        tracing::debug!(
            vertices = closed.polygon.len(),
            area = surface_area_square_meters,
            "Drawing closed"
        );
        Completion::Closed(closed)
    }

    /// Abort the session, discarding every placed point
    pub fn cancel(&mut self) -> Option<usize> {
        if !self.is_active() {
            return None;
        }
        let discarded = self.points.len();
        self.points.clear();
        self.closed = None;
        self.state = DrawingState::Cancelled;
        tracing::debug!(discarded, "Drawing cancelled");
        Some(discarded)
    }

    /// Return to `Idle`, handing over the closed polygon if there is one
    pub fn finish(&mut self) -> Option<ClosedDrawing> {
        match self.state {
            DrawingState::Closed | DrawingState::Cancelled => {
                self.state = DrawingState::Idle;
                self.points.clear();
                self.closed.take()
            }
            DrawingState::Idle | DrawingState::Drawing => None,
        }
    }

    /// Feed one pointer event through the state machine
    pub fn handle(&mut self, event: PointerEvent) -> DrawingOutcome {
        match event {
            PointerEvent::Start => {
                self.start();
                DrawingOutcome::Started
            }
            PointerEvent::Primary(point) => {
                if self.append(point) {
                    DrawingOutcome::PointAdded {
                        count: self.points.len(),
                    }
                } else {
                    DrawingOutcome::Ignored
                }
            }
            PointerEvent::Secondary => match self.complete() {
                Completion::NotDrawing => DrawingOutcome::Ignored,
                completion => DrawingOutcome::Completed(completion),
            },
            PointerEvent::Cancel => match self.cancel() {
                Some(discarded) => {
                    self.finish();
                    DrawingOutcome::Cancelled { discarded }
                }
                None => DrawingOutcome::Ignored,
            },
        }
    }
}
