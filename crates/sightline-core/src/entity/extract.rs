//! Per-candidate filter chain.
//!
//! Each step either reads one more field or rejects the candidate. Reads run
//! in a fixed order so that a rejected candidate never costs more reads than
//! the step that rejected it.

use strum::IntoEnumIterator;
use tracing::trace;

use crate::config::OverlayConfig;
use crate::entity::name::sanitize_name;
use crate::entity::snapshot::{EntitySnapshot, HeadExtent, Joint, Skeleton};
use crate::error::Result;
use crate::math::{Display, Rect, Vec2, Vec3, ViewMatrix};
use crate::memory::ReadMemory;
use crate::memory::layout::{bones, geometry, pawn as pawn_layout};
use crate::offset::OffsetSchema;

/// The local player, read once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub pawn: u64,
    pub team: i32,
    /// World origin of the observer's scene node
    pub origin: Vec3,
}

impl Observer {
    /// Read the observer, or `None` when there is no local pawn or scene node
    /// (menus, loading screens).
    pub fn read<R: ReadMemory>(
        reader: &R,
        schema: &OffsetSchema,
        module_base: u64,
    ) -> Result<Option<Self>> {
        let pawn = reader.read_u64(module_base.wrapping_add(schema.local_player_pawn))?;
        if pawn == 0 {
            return Ok(None);
        }
        let scene_node = reader.read_u64(pawn.wrapping_add(schema.scene_node))?;
        if scene_node == 0 {
            return Ok(None);
        }

        let origin: Vec3 = reader.read(scene_node.wrapping_add(schema.node_to_world))?;
        let team = reader.read_i32(pawn.wrapping_add(schema.team))?;
        Ok(Some(Self { pawn, team, origin }))
    }
}

/// Why a candidate produced no snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Rejection {
    EmptySlot,
    NoPawnHandle,
    NoPawn,
    Observer,
    NotAlive,
    Unassigned,
    Teammate,
    Health,
    NoName,
    EmptyName,
    NoSceneNode,
    NoBoneArray,
    OffScreen,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Accepted(EntitySnapshot),
    Rejected(Rejection),
}

impl From<Rejection> for Extraction {
    fn from(rejection: Rejection) -> Self {
        Extraction::Rejected(rejection)
    }
}

/// Frame-wide inputs shared by every candidate
pub struct SnapshotExtractor<'a, R: ReadMemory> {
    reader: &'a R,
    schema: &'a OffsetSchema,
    config: &'a OverlayConfig,
    observer: Observer,
    view_matrix: ViewMatrix,
    display: Display,
}

impl<'a, R: ReadMemory> SnapshotExtractor<'a, R> {
    pub fn new(
        reader: &'a R,
        schema: &'a OffsetSchema,
        config: &'a OverlayConfig,
        observer: Observer,
        view_matrix: ViewMatrix,
        display: Display,
    ) -> Self {
        Self {
            reader,
            schema,
            config,
            observer,
            view_matrix,
            display,
        }
    }

    /// Run the filter chain for one controller/pawn pair.
    ///
    /// Rejections are `Ok`; only a read fault is an `Err`.
    pub fn extract(&self, controller: u64, pawn: u64) -> Result<Extraction> {
        if pawn == self.observer.pawn {
            return Ok(Rejection::Observer.into());
        }

        let life_state = self.reader.read_i32(pawn.wrapping_add(self.schema.life_state))?;
        if life_state != pawn_layout::LIFE_STATE_ALIVE {
            return Ok(Rejection::NotAlive.into());
        }

        let team = self.reader.read_i32(pawn.wrapping_add(self.schema.team))?;
        if team == pawn_layout::TEAM_UNASSIGNED {
            return Ok(Rejection::Unassigned.into());
        }
        if self.config.team_check && team == self.observer.team {
            return Ok(Rejection::Teammate.into());
        }

        let health = self.reader.read_i32(pawn.wrapping_add(self.schema.health))?;
        if !(pawn_layout::MIN_HEALTH..=pawn_layout::MAX_HEALTH).contains(&health) {
            return Ok(Rejection::Health.into());
        }

        let name_ptr = self.reader.read_u64(controller.wrapping_add(self.schema.player_name))?;
        if name_ptr == 0 {
            return Ok(Rejection::NoName.into());
        }
        let name = sanitize_name(&self.reader.read_string(name_ptr, pawn_layout::MAX_NAME_LEN)?);
        if name.is_empty() {
            return Ok(Rejection::EmptyName.into());
        }

        let scene_node = self.reader.read_u64(pawn.wrapping_add(self.schema.scene_node))?;
        if scene_node == 0 {
            return Ok(Rejection::NoSceneNode.into());
        }
        let bone_array = self.reader.read_u64(
            scene_node
                .wrapping_add(self.schema.model_state)
                .wrapping_add(self.schema.bone_array),
        )?;
        if bone_array == 0 {
            return Ok(Rejection::NoBoneArray.into());
        }

        let origin: Vec3 = self.reader.read(pawn.wrapping_add(self.schema.origin))?;
        let (head, skeleton) = self.sample_skeleton(bone_array)?;

        let head_top = self.project(head.raised(geometry::HEAD_TOP_OFFSET));
        let head_bottom = self.project(head.raised(-geometry::HEAD_BOTTOM_OFFSET));
        let feet = self.project(origin);
        let box_top = self.project(origin.raised(geometry::BOX_HEIGHT));

        if !self.display.contains_x(head_top.x)
            || !self.display.contains_y(feet.y)
            || !self.display.contains_y(head_top.y)
        {
            return Ok(Rejection::OffScreen.into());
        }

        let half_width = (feet.y - box_top.y) * geometry::BOX_HALF_WIDTH_RATIO;
        let snapshot = EntitySnapshot {
            health,
            team,
            name,
            origin,
            distance: origin.l1_distance(self.observer.origin),
            feet,
            rect: Rect {
                top: box_top.y,
                left: feet.x - half_width,
                right: feet.x + half_width,
                bottom: feet.y,
            },
            head: HeadExtent {
                x: head_top.x,
                top: head_top.y,
                bottom: head_bottom.y,
            },
            skeleton,
        };
        trace!("Accepted {} (team {}, {} hp)", snapshot.name, team, health);
        Ok(Extraction::Accepted(snapshot))
    }

    /// Read and project the joints, head first. Returns the head's world
    /// position along with the projected joints.
    fn sample_skeleton(&self, bone_array: u64) -> Result<(Vec3, Skeleton)> {
        let mut skeleton = Skeleton::default();
        let mut head = Vec3::default();
        for joint in Joint::iter() {
            let position: Vec3 = self
                .reader
                .read(bone_array.wrapping_add(joint.index() * bones::BONE_STRIDE))?;
            skeleton.insert(joint, self.project(position));
            if joint == Joint::Head {
                head = position;
                if !self.config.skeleton {
                    break;
                }
            }
        }
        Ok((head, skeleton))
    }

    fn project(&self, point: Vec3) -> Vec2 {
        self.view_matrix.project(point, self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MockMemoryBuilder, MockMemoryReader};

    const CONTROLLER: u64 = 0x1000;
    const PAWN: u64 = 0x2000;
    const NAME: u64 = 0x3000;
    const SCENE: u64 = 0x4000;
    const BONES: u64 = 0x5000;
    const OBSERVER_PAWN: u64 = 0x9000;

    fn schema() -> OffsetSchema {
        OffsetSchema {
            entity_list: 0x100,
            local_player_pawn: 0x200,
            view_matrix: 0x300,
            player_pawn_handle: 0x10,
            health: 0x20,
            life_state: 0x24,
            team: 0x28,
            origin: 0x30,
            scene_node: 0x40,
            model_state: 0x50,
            bone_array: 128,
            node_to_world: 0x10,
            player_name: 0x18,
        }
    }

    fn observer() -> Observer {
        Observer {
            pawn: OBSERVER_PAWN,
            team: 2,
            origin: Vec3::new(100.0, 0.0, 0.0),
        }
    }

    /// An alive enemy standing at the origin, all joints slightly in front
    fn candidate(health: i32, team: i32, name: &str) -> MockMemoryBuilder {
        let s = schema();
        let mut builder = MockMemoryBuilder::new()
            .write_i32(PAWN + s.life_state, 256)
            .write_i32(PAWN + s.team, team)
            .write_i32(PAWN + s.health, health)
            .write_u64(CONTROLLER + s.player_name, NAME)
            .write_text(NAME, name, pawn_layout::MAX_NAME_LEN)
            .write_u64(PAWN + s.scene_node, SCENE)
            .write_u64(SCENE + s.model_state + s.bone_array, BONES)
            .write_vec3(PAWN + s.origin, Vec3::default());
        for joint in Joint::iter() {
            builder = builder.write_vec3(
                BONES + joint.index() * bones::BONE_STRIDE,
                Vec3::new(0.1, 0.2, 0.3),
            );
        }
        builder
    }

    fn extract_through(
        reader: &MockMemoryReader,
        config: &OverlayConfig,
        view_matrix: ViewMatrix,
    ) -> Extraction {
        let schema = schema();
        let extractor = SnapshotExtractor::new(
            reader,
            &schema,
            config,
            observer(),
            view_matrix,
            Display::default(),
        );
        extractor.extract(CONTROLLER, PAWN).unwrap()
    }

    fn extract_with(reader: &MockMemoryReader, config: &OverlayConfig) -> Extraction {
        extract_through(reader, config, ViewMatrix::IDENTITY)
    }

    fn extract(reader: &MockMemoryReader) -> Extraction {
        extract_with(reader, &OverlayConfig::default())
    }

    fn accepted(extraction: Extraction) -> EntitySnapshot {
        match extraction {
            Extraction::Accepted(snapshot) => snapshot,
            Extraction::Rejected(r) => panic!("expected snapshot, rejected as {:?}", r),
        }
    }

    #[test]
    fn test_health_bounds() {
        let cases = [(0, false), (1, true), (100, true), (101, false), (-5, false)];
        for (health, expect_accepted) in cases {
            let reader = candidate(health, 3, "enemy").build();
            match extract(&reader) {
                Extraction::Accepted(s) => {
                    assert!(expect_accepted, "health {} accepted", health);
                    assert_eq!(s.health, health);
                }
                Extraction::Rejected(r) => {
                    assert!(!expect_accepted, "health {} rejected", health);
                    assert_eq!(r, Rejection::Health);
                }
            }
        }
    }

    #[test]
    fn test_team_check() {
        let teammate = candidate(50, 2, "mate").build();
        assert_eq!(extract(&teammate), Extraction::Rejected(Rejection::Teammate));

        let enemy = candidate(50, 3, "enemy").build();
        assert_eq!(accepted(extract(&enemy)).team, 3);

        let config = OverlayConfig {
            team_check: false,
            ..OverlayConfig::default()
        };
        assert_eq!(accepted(extract_with(&teammate, &config)).team, 2);
    }

    #[test]
    fn test_unassigned_team_rejected_even_without_team_check() {
        let reader = candidate(50, 0, "spectator").build();
        let config = OverlayConfig {
            team_check: false,
            ..OverlayConfig::default()
        };
        assert_eq!(extract_with(&reader, &config), Extraction::Rejected(Rejection::Unassigned));
    }

    #[test]
    fn test_dead_and_observer_rejected() {
        let reader = candidate(50, 3, "enemy")
            .write_i32(PAWN + schema().life_state, 0)
            .build();
        assert_eq!(extract(&reader), Extraction::Rejected(Rejection::NotAlive));

        // Observer check runs before any read
        let empty = MockMemoryBuilder::new().build();
        let schema = schema();
        let config = OverlayConfig::default();
        let extractor = SnapshotExtractor::new(
            &empty,
            &schema,
            &config,
            observer(),
            ViewMatrix::IDENTITY,
            Display::default(),
        );
        assert_eq!(
            extractor.extract(CONTROLLER, OBSERVER_PAWN).unwrap(),
            Extraction::Rejected(Rejection::Observer)
        );
    }

    #[test]
    fn test_name_is_sanitized() {
        let reader = candidate(50, 3, "ne\u{7}o").build();
        assert_eq!(accepted(extract(&reader)).name, "neo");

        let reader = candidate(50, 3, "\u{7}\u{7}").build();
        assert_eq!(extract(&reader), Extraction::Rejected(Rejection::EmptyName));

        let reader = candidate(50, 3, "x")
            .write_u64(CONTROLLER + schema().player_name, 0)
            .build();
        assert_eq!(extract(&reader), Extraction::Rejected(Rejection::NoName));
    }

    #[test]
    fn test_null_scene_node_and_bone_array() {
        let s = schema();
        let reader = candidate(50, 3, "x").write_u64(PAWN + s.scene_node, 0).build();
        assert_eq!(extract(&reader), Extraction::Rejected(Rejection::NoSceneNode));

        let reader = candidate(50, 3, "x")
            .write_u64(SCENE + s.model_state + s.bone_array, 0)
            .build();
        assert_eq!(extract(&reader), Extraction::Rejected(Rejection::NoBoneArray));
    }

    #[test]
    fn test_wrapping_scene_node_faults() {
        let reader = candidate(50, 3, "x")
            .write_u64(PAWN + schema().scene_node, u64::MAX - 4)
            .build();
        let schema = schema();
        let config = OverlayConfig::default();
        let extractor = SnapshotExtractor::new(
            &reader,
            &schema,
            &config,
            observer(),
            ViewMatrix::IDENTITY,
            Display::default(),
        );
        assert!(extractor.extract(CONTROLLER, PAWN).unwrap_err().is_read_fault());
    }

    #[test]
    fn test_geometry() {
        // World z drives screen y so the box has height
        let view_matrix = ViewMatrix::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.01, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let reader = candidate(80, 3, "enemy").build();
        let snapshot = accepted(extract_through(&reader, &OverlayConfig::default(), view_matrix));

        assert_eq!(snapshot.feet, Vec2::new(960.5, 539.5));
        assert_eq!(snapshot.rect.bottom, snapshot.feet.y);
        let height = snapshot.rect.height();
        assert!((height - 378.0).abs() < 1e-2);
        assert!((snapshot.rect.width() - height / 4.0).abs() < 1e-3);
        assert_eq!(snapshot.distance, 100.0);
        assert!(snapshot.skeleton.is_complete());
        assert!(snapshot.head.top < snapshot.head.bottom);
    }

    #[test]
    fn test_skeleton_off_reads_head_only() {
        // Only the head joint is mapped
        let mut reader = candidate(50, 3, "x").build();
        for joint in Joint::iter().skip(1) {
            reader.unmap(BONES + joint.index() * bones::BONE_STRIDE, 12);
        }

        let config = OverlayConfig {
            skeleton: false,
            ..OverlayConfig::default()
        };
        let snapshot = accepted(extract_with(&reader, &config));
        assert_eq!(snapshot.skeleton.len(), 1);
        assert!(snapshot.skeleton.get(Joint::Head).is_some());
    }

    #[test]
    fn test_off_screen_rejected() {
        // Head far to the right of the display
        let reader = candidate(50, 3, "x")
            .write_vec3(BONES + Joint::Head.index() * bones::BONE_STRIDE, Vec3::new(5.0, 0.0, 0.0))
            .build();
        assert_eq!(extract(&reader), Extraction::Rejected(Rejection::OffScreen));
    }

    #[test]
    fn test_read_fault_is_error() {
        let mut reader = candidate(50, 3, "x").build();
        reader.unmap(PAWN + schema().health, 4);
        let schema = schema();
        let config = OverlayConfig::default();
        let extractor = SnapshotExtractor::new(
            &reader,
            &schema,
            &config,
            observer(),
            ViewMatrix::IDENTITY,
            Display::default(),
        );
        assert!(extractor.extract(CONTROLLER, PAWN).unwrap_err().is_read_fault());
    }

    #[test]
    fn test_observer_read() {
        let s = schema();
        let base = 0x40_0000;
        let reader = MockMemoryBuilder::new()
            .write_u64(base + s.local_player_pawn, OBSERVER_PAWN)
            .write_u64(OBSERVER_PAWN + s.scene_node, 0x9100)
            .write_vec3(0x9100 + s.node_to_world, Vec3::new(1.0, 2.0, 3.0))
            .write_i32(OBSERVER_PAWN + s.team, 2)
            .build();
        let observer = Observer::read(&reader, &s, base).unwrap().unwrap();
        assert_eq!(observer.pawn, OBSERVER_PAWN);
        assert_eq!(observer.team, 2);
        assert_eq!(observer.origin, Vec3::new(1.0, 2.0, 3.0));

        let no_pawn = MockMemoryBuilder::new().write_u64(base + s.local_player_pawn, 0).build();
        assert_eq!(Observer::read(&no_pawn, &s, base).unwrap(), None);
    }
}
