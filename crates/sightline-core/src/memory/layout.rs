//! Memory layout constants for remote entity structures
//!
//! Everything here is fixed by the remote allocator or engine, not by the
//! versioned offset schema. Constants are organized by structure type.

/// Two-level chunked entity index
///
/// ```text
/// listHead + 0x10 ─┬─ chunk[0] ──► [ slot 0 | slot 1 | ... | slot 511 ]   (120 bytes per slot)
///                  ├─ chunk[1] ──► [ ... ]
///                  └─ ...
/// ```
///
/// A selector (raw index or entity handle) picks the chunk with bits 9..15
/// and the slot with bits 0..9.
pub mod entity_list {
    /// Size of one chunk pointer in the top-level table
    pub const POINTER_SIZE: u64 = 8;
    /// Offset of the chunk table from the list head
    pub const TABLE_BASE_OFFSET: u64 = 0x10;
    /// Selector bits that address the chunk table (after masking, before shifting)
    pub const CHUNK_SELECTOR_MASK: u64 = 0x7FFF;
    /// Shift that drops the in-chunk bits
    pub const CHUNK_SHIFT: u32 = 9;
    /// In-chunk slot bits (512 slots per chunk)
    pub const SLOT_MASK: u64 = 0x1FF;
    /// Distance between consecutive slots in a chunk
    pub const SLOT_STRIDE: u64 = 120;
    /// Number of raw indices scanned per frame
    pub const SCAN_BUDGET: u32 = 64;
}

/// Pawn and controller field values
pub mod pawn {
    /// Life state value meaning "alive"
    pub const LIFE_STATE_ALIVE: i32 = 256;
    /// Team id of an unassigned entity
    pub const TEAM_UNASSIGNED: i32 = 0;
    pub const MIN_HEALTH: i32 = 1;
    pub const MAX_HEALTH: i32 = 100;
    /// Bytes read for the display name
    pub const MAX_NAME_LEN: usize = 64;
}

/// Skeleton bone transforms
pub mod bones {
    /// Bone array pointer inside the model state. Not exported by the schema source.
    pub const BONE_ARRAY_OFFSET: u64 = 128;
    /// Stride of one bone transform
    pub const BONE_STRIDE: u64 = 32;
}

/// World-space geometry used to derive screen boxes
pub mod geometry {
    /// Head-top offset above the head joint
    pub const HEAD_TOP_OFFSET: f32 = 7.0;
    /// Head-bottom offset below the head joint
    pub const HEAD_BOTTOM_OFFSET: f32 = 5.0;
    /// Height of the bounding box above the origin
    pub const BOX_HEIGHT: f32 = 70.0;
    /// Box half-width as a fraction of its screen height
    pub const BOX_HALF_WIDTH_RATIO: f32 = 1.0 / 8.0;
}
