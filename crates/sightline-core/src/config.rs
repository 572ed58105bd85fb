//! Per-frame overlay policy.
//!
//! The frame loop owns one [`OverlayConfig`] and hands `&OverlayConfig` to each
//! capture. The control surface never touches it directly: it sends
//! [`ControlCommand`]s that the loop applies between frames, so a change takes
//! effect on the next frame.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// What a candidate read fault does to the rest of the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FaultPolicy {
    /// Drop the faulting candidate and keep scanning
    #[default]
    SkipCandidate,
    /// Drop the whole frame on the first candidate fault
    AbortFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Reject entities on the observer's team
    pub team_check: bool,
    pub head_circle: bool,
    /// Read and project all skeleton joints, not just the head
    pub skeleton: bool,
    pub boxes: bool,
    pub names: bool,
    pub health_bar: bool,
    pub health_text: bool,
    /// Delay between frames in milliseconds
    pub frame_delay_ms: u32,
    /// Snapshots closer than this to the observer are not rendered
    pub min_render_distance: f32,
    pub fault_policy: FaultPolicy,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            team_check: true,
            head_circle: true,
            skeleton: true,
            boxes: true,
            names: true,
            health_bar: true,
            health_text: true,
            frame_delay_ms: 15,
            min_render_distance: 35.0,
            fault_policy: FaultPolicy::default(),
        }
    }
}

/// Boolean policy flags the control surface can flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Toggle {
    #[strum(to_string = "Team Check")]
    TeamCheck,
    #[strum(to_string = "Head Circles")]
    HeadCircle,
    #[strum(to_string = "Skeleton Rendering")]
    Skeleton,
    #[strum(to_string = "ESP Boxes")]
    Boxes,
    #[strum(to_string = "HP Bar")]
    HealthBar,
    #[strum(to_string = "HP Text")]
    HealthText,
    #[strum(to_string = "Names")]
    Names,
}

/// A change requested by the control surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Toggle(Toggle),
    SetFrameDelay(u32),
    AdjustFrameDelay(i32),
}

impl OverlayConfig {
    pub fn flag(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::TeamCheck => self.team_check,
            Toggle::HeadCircle => self.head_circle,
            Toggle::Skeleton => self.skeleton,
            Toggle::Boxes => self.boxes,
            Toggle::HealthBar => self.health_bar,
            Toggle::HealthText => self.health_text,
            Toggle::Names => self.names,
        }
    }

    fn flag_mut(&mut self, toggle: Toggle) -> &mut bool {
        match toggle {
            Toggle::TeamCheck => &mut self.team_check,
            Toggle::HeadCircle => &mut self.head_circle,
            Toggle::Skeleton => &mut self.skeleton,
            Toggle::Boxes => &mut self.boxes,
            Toggle::HealthBar => &mut self.health_bar,
            Toggle::HealthText => &mut self.health_text,
            Toggle::Names => &mut self.names,
        }
    }

    pub fn apply(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::Toggle(toggle) => {
                let flag = self.flag_mut(toggle);
                *flag = !*flag;
            }
            ControlCommand::SetFrameDelay(ms) => self.frame_delay_ms = ms,
            ControlCommand::AdjustFrameDelay(delta) => {
                self.frame_delay_ms = self.frame_delay_ms.saturating_add_signed(delta);
            }
        }
    }
}
