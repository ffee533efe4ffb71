//! Draw command implementation
//!
//! Replays a recorded list of pointer events through a drawing session.

use crate::cli::DrawArgs;
use crate::output::OutputWriter;
use crate::output_types::{DrawOutput, DrawStep};
use anyhow::{Context, Result};
use std::fs;
use terrasite_core::config::LayeredConfig;
use terrasite_core::drawing::{Completion, DrawingOutcome, DrawingSession, DrawingState, PointerEvent};

pub fn execute(args: DrawArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let content = fs::read_to_string(&args.events)
        .with_context(|| format!("Failed to read {}", args.events.display()))?;
    let events: Vec<PointerEvent> =
        serde_json::from_str(&content).context("Failed to parse pointer events")?;

    let mut session = DrawingSession::new(config.drawing_policy(), config.area_calculator());
    let steps: Vec<DrawStep> = events
        .into_iter()
        .enumerate()
        .map(|(i, event)| DrawStep {
            index: i + 1,
            event: describe_event(&event),
            outcome: describe_outcome(&session.handle(event)),
        })
        .collect();

    let final_state = session.state();
    let pending_points = session.points().to_vec();
    let closed = if final_state == DrawingState::Closed {
        session.finish()
    } else {
        None
    };

    if output.is_json() {
        return output.result(DrawOutput {
            steps,
            final_state,
            pending_points,
            polygon: closed.as_ref().map(|c| c.polygon.points().to_vec()),
            surface_area_square_meters: closed.as_ref().map(|c| c.surface_area_square_meters),
        });
    }

    output.table(steps);
    match closed {
        Some(closed) => output.success(format!(
            "Closed a {}-vertex terrain of {} m²",
            closed.polygon.len(),
            closed.surface_area_square_meters
        )),
        None => output.info(format!(
            "Session ended in {:?} with {} pending point(s)",
            final_state,
            pending_points.len()
        )),
    }

    Ok(())
}

fn describe_event(event: &PointerEvent) -> String {
    match event {
        PointerEvent::Start => "start".to_string(),
        PointerEvent::Primary(p) => format!("point ({}, {})", p.latitude, p.longitude),
        PointerEvent::Secondary => "complete".to_string(),
        PointerEvent::Cancel => "cancel".to_string(),
    }
}

fn describe_outcome(outcome: &DrawingOutcome) -> String {
    match outcome {
        DrawingOutcome::Started => "drawing".to_string(),
        DrawingOutcome::PointAdded { count } => format!("{} point(s) placed", count),
        DrawingOutcome::Completed(Completion::Closed(c)) => {
            format!("closed, {} m²", c.surface_area_square_meters)
        }
        DrawingOutcome::Completed(Completion::Rejected(r)) => r.to_string(),
        DrawingOutcome::Completed(Completion::NotDrawing) | DrawingOutcome::Ignored => {
            "ignored".to_string()
        }
        DrawingOutcome::Cancelled { discarded } => format!("cancelled, {} point(s) discarded", discarded),
    }
}
