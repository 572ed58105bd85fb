//! Snapshot command: capture one frame and print it as JSON.

use anyhow::{Context, Result};
use sightline_core::{Display, FramePipeline, MemoryReader, OffsetSchema, OverlayConfig, ProcessHandle};
use tracing::debug;

pub fn run(
    process_name: &str,
    module_name: &str,
    schema: &OffsetSchema,
    config: &OverlayConfig,
    display: Display,
    renderable_only: bool,
) -> Result<()> {
    let process = ProcessHandle::find_and_open_named(process_name, module_name)
        .with_context(|| format!("Failed to attach to {}", process_name))?;
    debug!("Attached: {:?}", process.info());

    let reader = MemoryReader::new(&process);
    let mut frame = FramePipeline::new(&reader, schema, process.base_address)
        .capture(config, display)
        .context("Frame capture failed")?;

    if renderable_only {
        frame
            .entities
            .retain(|e| e.distance >= config.min_render_distance);
    }

    println!("{}", serde_json::to_string_pretty(&frame)?);
    Ok(())
}
