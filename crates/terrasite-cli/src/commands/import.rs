//! Import command implementation

use crate::cli::ImportArgs;
use crate::output::OutputWriter;
use crate::output_types::{CandidateInfo, CandidateRow, ImportOutput};
use anyhow::{bail, Context, Result};
use terrasite_core::config::LayeredConfig;
use terrasite_core::import::ImportPipeline;

pub async fn execute(args: ImportArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let pipeline = ImportPipeline::new(config.import_options());
    let area = config.area_calculator();

    let mut preview = pipeline
        .import_path(&args.path)
        .await
        .with_context(|| format!("Failed to import {}", args.path.display()))?;

    let candidates: Vec<CandidateInfo> = preview
        .candidates()
        .iter()
        .enumerate()
        .map(|(i, c)| CandidateInfo {
            index: i + 1,
            name: c.name.clone(),
            description: c.description.clone(),
            vertices: c.polygon.len(),
            surface_area_square_meters: c.surface_area(&area),
            bounds: c.polygon.bounds(),
            source_properties: c.source_properties.clone(),
        })
        .collect();

    let selected = match args.select {
        None => None,
        Some(n) => {
            if n == 0 || n > candidates.len() {
                bail!(
                    "Cannot select candidate {}: the file has {} candidate(s)",
                    n,
                    candidates.len()
                );
            }
            preview.select(n - 1)
        }
    };

    if output.is_json() {
        return output.result(ImportOutput {
            file_name: preview.file_name().to_string(),
            candidates,
            selected,
        });
    }

    output.section(format!("Terrain candidates in {}", preview.file_name()));
    if candidates.is_empty() {
        output.warning(format!(
            "No polygon with at least {} vertices was found",
            pipeline.options().min_vertices
        ));
        return Ok(());
    }
    output.table(candidates.iter().map(CandidateRow::from).collect());

    match selected {
        Some(draft) => {
            output.success(format!("Selected '{}' as a terrain draft", draft.name));
            output.kv("Description", &draft.description);
            if let Some(area) = draft.surface_area(&area) {
                output.kv("Surface area", format!("{} m²", area));
            }
            if let Some(properties) = draft.source_properties() {
                for (key, value) in properties {
                    output.kv(key, value);
                }
            }
        }
        None => output.info("Use --select N to promote a candidate to a terrain draft"),
    }

    Ok(())
}
