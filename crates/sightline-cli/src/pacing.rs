//! Pacing for overlay mode.
//!
//! The keyboard monitor and the Ctrl+C handler feed one channel of
//! [`LoopEvent`]s. Both the frame delay and the attach retry delay are timed
//! receives on that channel. Control input is applied to the overlay policy
//! as it arrives, always between two captures, and a quit cuts the current
//! delay short.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use sightline_core::{ControlCommand, OverlayConfig};
use tracing::debug;

/// Input delivered to the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    Control(ControlCommand),
    Quit,
}

/// How a [`Pacer::pause`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// The full delay passed
    Elapsed { config_changed: bool },
    Quit,
}

pub struct Pacer {
    events: Receiver<LoopEvent>,
    stopped: bool,
}

impl Pacer {
    pub fn new(events: Receiver<LoopEvent>) -> Self {
        Self {
            events,
            stopped: false,
        }
    }

    /// Whether a quit has been received. Once set, every pause returns
    /// [`Pause::Quit`] immediately.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Wait out `delay`, applying control events to `config` as they arrive.
    pub fn pause(&mut self, delay: Duration, config: &mut OverlayConfig) -> Pause {
        let deadline = Instant::now() + delay;
        let mut config_changed = false;

        while !self.stopped {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(LoopEvent::Control(command)) => {
                    debug!("Control: {:?}", command);
                    config.apply(command);
                    config_changed = true;
                }
                Ok(LoopEvent::Quit) => self.stopped = true,
                Err(RecvTimeoutError::Timeout) => return Pause::Elapsed { config_changed },
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("No input sources left");
                    self.stopped = true;
                }
            }
        }
        Pause::Quit
    }
}
