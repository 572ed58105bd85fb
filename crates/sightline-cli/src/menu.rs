//! Control menu printed to the terminal.

use owo_colors::OwoColorize;
use sightline_core::{OverlayConfig, Toggle};
use strum::IntoEnumIterator;

/// One menu line per toggle, numbered to match its key.
pub fn toggle_lines(config: &OverlayConfig) -> Vec<String> {
    Toggle::iter()
        .enumerate()
        .map(|(i, toggle)| {
            let state = if config.flag(toggle) { "ON" } else { "OFF" };
            format!("[{}] {} [{}]", i + 1, toggle, state)
        })
        .collect()
}

pub fn print_menu(config: &OverlayConfig) {
    let rule = "-".repeat(64);
    println!("{}", rule.green());
    println!("{}", "  Sightline".bold());
    println!("{}", rule.green());
    for (line, toggle) in toggle_lines(config).iter().zip(Toggle::iter()) {
        if config.flag(toggle) {
            println!("{}", line.green());
        } else {
            println!("{}", line.red());
        }
    }
    println!(
        "{} {} {}",
        "[+/-] Frame Delay [".cyan(),
        config.frame_delay_ms,
        "ms]".cyan()
    );
    println!("{}", "[Esc/q] Exit".red());
}
