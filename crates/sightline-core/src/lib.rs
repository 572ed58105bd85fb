//! # sightline-core
//!
//! Core library for the Sightline overlay.
//!
//! This crate provides:
//! - Windows process memory reading behind the [`ReadMemory`] trait
//! - Offset schema resolution from dumper documents, persisted to `offsets.json`
//! - Entity list walking and per-entity snapshot extraction
//! - World-to-screen projection
//! - Per-frame capture under an [`OverlayConfig`] policy

pub mod config;
pub mod entity;
pub mod error;
pub mod frame;
pub mod math;
pub mod memory;
pub mod offset;

pub use config::{ControlCommand, FaultPolicy, OverlayConfig, Toggle};
pub use entity::{
    EntityListWalker, EntitySnapshot, Extraction, HeadExtent, Joint, Observer, Rejection,
    Skeleton, SnapshotExtractor, sanitize_name,
};
pub use error::{Error, Result, SchemaError, SchemaIssue};
pub use frame::{Frame, FramePipeline, ScanStats};
pub use math::{Display, Rect, Vec2, Vec3, ViewMatrix};
pub use memory::{MemoryReader, ProcessHandle, ProcessInfo, ReadMemory};
pub use offset::{ClassesDocument, GlobalsDocument, OffsetSchema, SCHEMA_FILE};
