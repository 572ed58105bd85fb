//! Keyboard control surface.
//!
//! The monitor thread never touches the overlay policy. It turns key presses
//! into [`LoopEvent`]s and sends them to the frame loop, which applies them
//! between frames.

use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use sightline_core::{ControlCommand, Toggle};
use tracing::debug;

use crate::pacing::LoopEvent;

/// Frame delay change per `+`/`-` press, in milliseconds
pub const FRAME_DELAY_STEP: i32 = 5;

/// Spawn a thread that forwards key presses to the frame loop.
///
/// The thread exits after sending a quit, or once the frame loop has dropped
/// its receiver.
pub fn spawn_keyboard_monitor(events: Sender<LoopEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Keyboard monitor started");

        while let Ok(input) = event::read() {
            let Event::Key(key_event) = input else {
                continue;
            };
            let Some(event) = key_action(&key_event) else {
                continue;
            };

            let quit = event == LoopEvent::Quit;
            if quit {
                debug!("Quit key pressed: {:?}", key_event.code);
            }
            if events.send(event).is_err() || quit {
                break;
            }
        }

        debug!("Keyboard monitor stopped");
    })
}

/// Map a key event to its action. Key releases are ignored.
pub fn key_action(event: &KeyEvent) -> Option<LoopEvent> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let toggle = |t| Some(LoopEvent::Control(ControlCommand::Toggle(t)));
    match event.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(LoopEvent::Quit),
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(LoopEvent::Quit)
        }
        KeyCode::Char('1') => toggle(Toggle::TeamCheck),
        KeyCode::Char('2') => toggle(Toggle::HeadCircle),
        KeyCode::Char('3') => toggle(Toggle::Skeleton),
        KeyCode::Char('4') => toggle(Toggle::Boxes),
        KeyCode::Char('5') => toggle(Toggle::HealthBar),
        KeyCode::Char('6') => toggle(Toggle::HealthText),
        KeyCode::Char('7') => toggle(Toggle::Names),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(LoopEvent::Control(
            ControlCommand::AdjustFrameDelay(FRAME_DELAY_STEP),
        )),
        KeyCode::Char('-') => Some(LoopEvent::Control(ControlCommand::AdjustFrameDelay(
            -FRAME_DELAY_STEP,
        ))),
        _ => None,
    }
}
