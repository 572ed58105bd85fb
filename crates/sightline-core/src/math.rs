//! World and screen geometry, and the view-projection transform.

use serde::{Deserialize, Serialize};

use crate::memory::FromLeBytes;

/// Point in the remote process's world space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Manhattan (L1) distance, not Euclidean.
    pub fn l1_distance(self, other: Vec3) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }

    pub fn raised(self, dz: f32) -> Self {
        Self::new(self.x, self.y, self.z + dz)
    }
}

impl FromLeBytes for Vec3 {
    const SIZE: usize = 12;

    fn from_le_bytes(bytes: &[u8]) -> Self {
        Self::new(
            <f32 as FromLeBytes>::from_le_bytes(&bytes[0..4]),
            <f32 as FromLeBytes>::from_le_bytes(&bytes[4..8]),
            <f32 as FromLeBytes>::from_le_bytes(&bytes[8..12]),
        )
    }
}

/// Point in local display pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// Result of projecting a point behind the camera plane
    pub const OFFSCREEN: Vec2 = Vec2 { x: -1.0, y: -1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_offscreen(self) -> bool {
        self == Self::OFFSCREEN
    }
}

/// Display size in pixels, resolved once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Display {
    pub width: u32,
    pub height: u32,
}

impl Display {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether a coordinate lies strictly above -1 and below the display edge.
    pub fn contains_x(&self, x: f32) -> bool {
        x > -1.0 && x < self.width as f32
    }

    pub fn contains_y(&self, y: f32) -> bool {
        y > -1.0 && y < self.height as f32
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Screen-space box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }
}

/// Row-major 4x4 view-projection matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewMatrix([[f32; 4]; 4]);

impl ViewMatrix {
    /// Below this clip-space w a point is treated as behind the camera.
    pub const MIN_W: f32 = 0.01;

    pub const IDENTITY: ViewMatrix = ViewMatrix([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        Self(rows)
    }

    pub fn rows(&self) -> &[[f32; 4]; 4] {
        &self.0
    }

    fn row_dot(&self, row: usize, p: Vec3) -> f32 {
        let m = &self.0[row];
        m[0] * p.x + m[1] * p.y + m[2] * p.z + m[3]
    }

    /// Project a world point to display pixels, or `None` when `w < 0.01`.
    pub fn try_project(&self, point: Vec3, display: Display) -> Option<Vec2> {
        let w = self.row_dot(3, point);
        if w < Self::MIN_W {
            return None;
        }

        let inv_w = 1.0 / w;
        let ndc_x = self.row_dot(0, point) * inv_w;
        let ndc_y = self.row_dot(1, point) * inv_w;

        let width = display.width as f32;
        let height = display.height as f32;
        let x = width / 2.0 + 0.5 * ndc_x * width + 0.5;
        let y = height / 2.0 - (0.5 * ndc_y * height + 0.5);
        Some(Vec2::new(x, y))
    }

    /// Like [`try_project`](Self::try_project) but yields [`Vec2::OFFSCREEN`].
    pub fn project(&self, point: Vec3, display: Display) -> Vec2 {
        self.try_project(point, display).unwrap_or(Vec2::OFFSCREEN)
    }
}

impl Default for ViewMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FromLeBytes for ViewMatrix {
    const SIZE: usize = 64;

    fn from_le_bytes(bytes: &[u8]) -> Self {
        let mut rows = [[0.0f32; 4]; 4];
        for (i, chunk) in bytes[..Self::SIZE].chunks_exact(4).enumerate() {
            rows[i / 4][i % 4] = <f32 as FromLeBytes>::from_le_bytes(chunk);
        }
        Self(rows)
    }
}
