//! Frame consumers.

use sightline_core::{EntitySnapshot, Frame, OverlayConfig};
use tracing::{debug, info};

/// Receives every captured frame together with the policy it was captured under.
pub trait Renderer {
    fn render(&mut self, frame: &Frame, config: &OverlayConfig);
}

/// Logs what an overlay would draw.
///
/// Only the renderable entities are described, and only the elements whose
/// toggles are on.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    last_count: Option<usize>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// One line describing `entity` under `config`
    pub fn describe(entity: &EntitySnapshot, config: &OverlayConfig) -> String {
        let mut parts = Vec::new();
        if config.names {
            parts.push(entity.name.clone());
        }
        parts.push(format!("team {}", entity.team));
        if config.health_text || config.health_bar {
            parts.push(format!("{} hp", entity.health));
        }
        parts.push(format!("dist {:.0}", entity.distance));
        if config.boxes {
            let r = &entity.rect;
            parts.push(format!(
                "box ({:.0},{:.0})-({:.0},{:.0})",
                r.left, r.top, r.right, r.bottom
            ));
        }
        if config.head_circle {
            parts.push(format!(
                "head ({:.0},{:.0}) r{:.1}",
                entity.head.x,
                entity.head.top,
                entity.head.radius()
            ));
        }
        if config.skeleton {
            parts.push(format!("{} bones", entity.skeleton.segments().count()));
        }
        parts.join(" | ")
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&mut self, frame: &Frame, config: &OverlayConfig) {
        let visible: Vec<&EntitySnapshot> = frame.renderable(config.min_render_distance).collect();

        if self.last_count != Some(visible.len()) {
            info!("{} visible entities", visible.len());
            self.last_count = Some(visible.len());
        }
        for entity in visible {
            debug!("{}", Self::describe(entity, config));
        }
    }
}
