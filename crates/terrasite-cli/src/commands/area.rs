//! Area command implementation

use crate::cli::AreaArgs;
use crate::output::OutputWriter;
use crate::output_types::AreaOutput;
use anyhow::{bail, Context, Result};
use std::fs;
use terrasite_core::config::LayeredConfig;
use terrasite_core::models::{Point, Polygon};

pub fn execute(args: AreaArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let points = match &args.file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str::<Vec<Point>>(&content)
                .with_context(|| format!("Expected a JSON array of {{\"lat\", \"lng\"}} points in {}", path.display()))?
        }
        None if args.point.is_empty() => bail!("Provide --file or at least one --point"),
        None => args
            .point
            .iter()
            .map(|raw| parse_point(raw))
            .collect::<Result<Vec<_>>>()?,
    };

    let area = config.area_calculator().square_meters(&points);
    let bounds = Polygon::new(points.clone()).ok().map(|p| p.bounds());

    if output.is_json() {
        return output.result(AreaOutput {
            vertices: points.len(),
            surface_area_square_meters: area,
            bounds,
        });
    }

    if points.len() < 3 {
        output.warning(format!("{} point(s) do not enclose an area", points.len()));
    }
    output.kv("Vertices", points.len());
    output.kv("Surface area", format!("{} m²", area));
    if let Some(b) = bounds {
        output.kv("Bounds", format!("S {} W {} N {} E {}", b.south, b.west, b.north, b.east));
    }

    Ok(())
}

/// Parse "LAT,LNG"
fn parse_point(raw: &str) -> Result<Point> {
    let Some((lat, lng)) = raw.split_once(',') else {
        bail!("Invalid point '{}': expected LAT,LNG", raw);
    };
    let latitude: f64 = lat.trim().parse().with_context(|| format!("Invalid latitude in '{}'", raw))?;
    let longitude: f64 = lng.trim().parse().with_context(|| format!("Invalid longitude in '{}'", raw))?;
    Ok(Point::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("33.5, -7.6").unwrap(), Point::new(33.5, -7.6));
        assert!(parse_point("33.5").is_err());
        assert!(parse_point("north,-7.6").is_err());
    }
}
