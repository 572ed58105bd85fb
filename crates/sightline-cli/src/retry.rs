//! Waiting for the target process.

use std::time::Duration;

use anyhow::Result;
use sightline_core::{Error, OverlayConfig, ProcessHandle};
use tracing::{debug, info};

use crate::menu::print_menu;
use crate::pacing::{Pacer, Pause};

/// Delay between process lookups
pub const PROCESS_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Wait until `process_name` is running with `module_name` loaded.
///
/// Control keys keep working while waiting. Returns `Ok(None)` on quit.
/// Lookup failures other than "not there yet" are returned as errors.
pub fn wait_for_process(
    process_name: &str,
    module_name: &str,
    pacer: &mut Pacer,
    config: &mut OverlayConfig,
) -> Result<Option<ProcessHandle>> {
    let mut announced = false;
    while !pacer.is_stopped() {
        match ProcessHandle::find_and_open_named(process_name, module_name) {
            Ok(process) => return Ok(Some(process)),
            Err(e) if is_retryable(&e) => {
                if !announced {
                    info!("Waiting for {}...", process_name);
                    announced = true;
                }
                debug!("{}", e);
            }
            Err(e) => return Err(e.into()),
        }

        match pacer.pause(PROCESS_RETRY_DELAY, config) {
            Pause::Quit => break,
            Pause::Elapsed { config_changed: true } => print_menu(config),
            Pause::Elapsed { .. } => {}
        }
    }
    Ok(None)
}

/// Process not started yet, or started but the module is not loaded yet
fn is_retryable(error: &Error) -> bool {
    matches!(error, Error::ProcessNotFound(_) | Error::ModuleNotFound(_))
}
