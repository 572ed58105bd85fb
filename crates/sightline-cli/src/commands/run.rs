//! Overlay mode: attach, then capture and render frames until quit.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use sightline_core::{
    FramePipeline, MemoryReader, OffsetSchema, OverlayConfig, ProcessHandle, ReadMemory,
};
use tracing::{debug, info, warn};

use crate::display::resolve_display;
use crate::input;
use crate::menu::print_menu;
use crate::pacing::{LoopEvent, Pacer, Pause};
use crate::render::{ConsoleRenderer, Renderer};
use crate::retry::wait_for_process;

pub struct RunOptions {
    pub process_name: String,
    pub module_name: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub offsets: PathBuf,
}

/// Why a capture loop ended
#[derive(Debug, PartialEq, Eq)]
enum LoopExit {
    Quit,
    ProcessLost,
}

pub fn run(options: &RunOptions, schema: &OffsetSchema, mut config: OverlayConfig) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let ctrlc_tx = tx.clone();
    ctrlc::set_handler(move || {
        info!("Received Ctrl+C, stopping...");
        let _ = ctrlc_tx.send(LoopEvent::Quit);
    })?;
    let _keyboard_handle = input::spawn_keyboard_monitor(tx);
    let mut pacer = Pacer::new(rx);

    info!("Sightline {}", env!("CARGO_PKG_VERSION"));
    debug!("Offset schema from {}", options.offsets.display());
    print_menu(&config);

    let mut renderer = ConsoleRenderer::new();
    while let Some(process) =
        wait_for_process(&options.process_name, &options.module_name, &mut pacer, &mut config)?
    {
        info!(
            "Attached to {} (PID: {}, base: {:#x})",
            options.process_name, process.pid, process.base_address
        );

        match capture_loop(&process, schema, &mut config, &mut pacer, &mut renderer, options) {
            LoopExit::Quit => break,
            LoopExit::ProcessLost => info!("Process exited, waiting for it to restart..."),
        }
    }

    info!("Stopped");
    Ok(())
}

fn capture_loop(
    process: &ProcessHandle,
    schema: &OffsetSchema,
    config: &mut OverlayConfig,
    pacer: &mut Pacer,
    renderer: &mut dyn Renderer,
    options: &RunOptions,
) -> LoopExit {
    let reader = MemoryReader::new(process);
    let pipeline = FramePipeline::new(&reader, schema, process.base_address);

    loop {
        let display = resolve_display(options.width, options.height);
        match pipeline.capture(config, display) {
            Ok(frame) => renderer.render(&frame, config),
            Err(e) => {
                if reader.read_bytes(process.base_address, 4).is_err() {
                    return LoopExit::ProcessLost;
                }
                warn!("Frame dropped: {}", e);
            }
        }

        let delay = Duration::from_millis(u64::from(config.frame_delay_ms));
        match pacer.pause(delay, config) {
            Pause::Quit => return LoopExit::Quit,
            Pause::Elapsed { config_changed: true } => print_menu(config),
            Pause::Elapsed { .. } => {}
        }
    }
}
