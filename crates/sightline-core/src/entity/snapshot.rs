use std::collections::BTreeMap;

use serde::Serialize;
use strum::{EnumIter, IntoStaticStr};

use crate::math::{Rect, Vec2, Vec3};

/// Skeleton joints sampled per entity.
///
/// Declaration order is read order: the head comes first so a scan with
/// skeleton rendering off can stop after it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, IntoStaticStr, Serialize,
)]
pub enum Joint {
    #[serde(rename = "head")]
    #[strum(serialize = "head")]
    Head,
    #[serde(rename = "neck_0")]
    #[strum(serialize = "neck_0")]
    Neck,
    #[serde(rename = "spine_1")]
    #[strum(serialize = "spine_1")]
    UpperSpine,
    #[serde(rename = "spine_2")]
    #[strum(serialize = "spine_2")]
    LowerSpine,
    #[serde(rename = "pelvis")]
    #[strum(serialize = "pelvis")]
    Pelvis,
    #[serde(rename = "arm_upper_L")]
    #[strum(serialize = "arm_upper_L")]
    UpperArmLeft,
    #[serde(rename = "arm_lower_L")]
    #[strum(serialize = "arm_lower_L")]
    LowerArmLeft,
    #[serde(rename = "hand_L")]
    #[strum(serialize = "hand_L")]
    HandLeft,
    #[serde(rename = "arm_upper_R")]
    #[strum(serialize = "arm_upper_R")]
    UpperArmRight,
    #[serde(rename = "arm_lower_R")]
    #[strum(serialize = "arm_lower_R")]
    LowerArmRight,
    #[serde(rename = "hand_R")]
    #[strum(serialize = "hand_R")]
    HandRight,
    #[serde(rename = "leg_upper_L")]
    #[strum(serialize = "leg_upper_L")]
    UpperLegLeft,
    #[serde(rename = "leg_lower_L")]
    #[strum(serialize = "leg_lower_L")]
    LowerLegLeft,
    #[serde(rename = "ankle_L")]
    #[strum(serialize = "ankle_L")]
    AnkleLeft,
    #[serde(rename = "leg_upper_R")]
    #[strum(serialize = "leg_upper_R")]
    UpperLegRight,
    #[serde(rename = "leg_lower_R")]
    #[strum(serialize = "leg_lower_R")]
    LowerLegRight,
    #[serde(rename = "ankle_R")]
    #[strum(serialize = "ankle_R")]
    AnkleRight,
}

impl Joint {
    /// Index into the remote bone transform array
    pub const fn index(self) -> u64 {
        match self {
            Joint::Head => 6,
            Joint::Neck => 5,
            Joint::UpperSpine => 4,
            Joint::LowerSpine => 2,
            Joint::Pelvis => 0,
            Joint::UpperArmLeft => 8,
            Joint::LowerArmLeft => 9,
            Joint::HandLeft => 10,
            Joint::UpperArmRight => 13,
            Joint::LowerArmRight => 14,
            Joint::HandRight => 15,
            Joint::UpperLegLeft => 22,
            Joint::LowerLegLeft => 23,
            Joint::AnkleLeft => 24,
            Joint::UpperLegRight => 25,
            Joint::LowerLegRight => 26,
            Joint::AnkleRight => 27,
        }
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Polylines a renderer draws to connect the skeleton
pub const SKELETON_CHAINS: &[&[Joint]] = &[
    &[
        Joint::Head,
        Joint::Neck,
        Joint::UpperSpine,
        Joint::LowerSpine,
        Joint::Pelvis,
        Joint::UpperLegLeft,
        Joint::LowerLegLeft,
        Joint::AnkleLeft,
    ],
    &[Joint::Pelvis, Joint::UpperLegRight, Joint::LowerLegRight, Joint::AnkleRight],
    &[Joint::UpperSpine, Joint::UpperArmLeft, Joint::LowerArmLeft, Joint::HandLeft],
    &[Joint::UpperSpine, Joint::UpperArmRight, Joint::LowerArmRight, Joint::HandRight],
];

/// Projected joints of one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Skeleton {
    joints: BTreeMap<Joint, Vec2>,
}

impl Skeleton {
    pub fn insert(&mut self, joint: Joint, point: Vec2) {
        self.joints.insert(joint, point);
    }

    pub fn get(&self, joint: Joint) -> Option<Vec2> {
        self.joints.get(&joint).copied()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Whether every joint was sampled
    pub fn is_complete(&self) -> bool {
        self.joints.len() == JOINT_COUNT
    }

    /// Line segments between consecutive joints of each chain, skipping
    /// any segment with a missing or off-screen end.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        SKELETON_CHAINS.iter().flat_map(move |chain| {
            chain.windows(2).filter_map(move |pair| {
                let from = self.get(pair[0])?;
                let to = self.get(pair[1])?;
                (!from.is_offscreen() && !to.is_offscreen()).then_some((from, to))
            })
        })
    }
}

/// Number of sampled joints
pub const JOINT_COUNT: usize = 17;

/// Screen-space vertical extent of the head
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HeadExtent {
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
}

impl HeadExtent {
    pub fn radius(&self) -> f32 {
        (self.bottom - self.top).abs() / 2.0
    }
}

/// One accepted entity, valid for the frame it was captured in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub health: i32,
    pub team: i32,
    pub name: String,
    /// World position
    pub origin: Vec3,
    /// L1 distance to the observer
    pub distance: f32,
    /// Projected origin
    pub feet: Vec2,
    pub rect: Rect,
    pub head: HeadExtent,
    pub skeleton: Skeleton,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_joint_table() {
        let joints: Vec<Joint> = Joint::iter().collect();
        assert_eq!(joints.len(), JOINT_COUNT);
        assert_eq!(joints[0], Joint::Head);
        assert_eq!(Joint::Head.index(), 6);
        assert_eq!(Joint::AnkleRight.index(), 27);
        assert_eq!(Joint::UpperArmLeft.name(), "arm_upper_L");

        let mut indices: Vec<u64> = joints.iter().map(|j| j.index()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), JOINT_COUNT);
    }

    #[test]
    fn test_skeleton_serializes_by_joint_name() {
        let mut skeleton = Skeleton::default();
        skeleton.insert(Joint::Neck, Vec2::new(1.0, 2.0));
        let json = serde_json::to_value(&skeleton).unwrap();
        assert_eq!(json["neck_0"]["x"], 1.0);
    }

    #[test]
    fn test_segments_skip_missing_and_offscreen() {
        let mut skeleton = Skeleton::default();
        skeleton.insert(Joint::Head, Vec2::new(10.0, 10.0));
        assert_eq!(skeleton.segments().count(), 0);

        skeleton.insert(Joint::Neck, Vec2::new(10.0, 20.0));
        skeleton.insert(Joint::UpperSpine, Vec2::OFFSCREEN);
        let segments: Vec<_> = skeleton.segments().collect();
        assert_eq!(segments, vec![(Vec2::new(10.0, 10.0), Vec2::new(10.0, 20.0))]);
    }
}
