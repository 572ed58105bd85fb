//! One pass over the entity list.
//!
//! A capture reads the frame-wide state first (list head, observer, view
//! matrix). A fault there fails the capture. After that every candidate is
//! independent and its faults are handled according to the
//! [`FaultPolicy`](crate::config::FaultPolicy).

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{FaultPolicy, OverlayConfig};
use crate::entity::{
    EntityListWalker, EntitySnapshot, Extraction, Observer, Rejection, SnapshotExtractor, scan_range,
};
use crate::error::Result;
use crate::math::{Display, ViewMatrix};
use crate::memory::ReadMemory;
use crate::offset::OffsetSchema;

/// Per-capture counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Slots that held a controller
    pub candidates: u32,
    pub accepted: u32,
    pub rejected: u32,
    /// Candidates dropped by a read fault
    pub faults: u32,
}

/// Everything captured for one display frame
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    pub display: Display,
    pub entities: Vec<EntitySnapshot>,
    pub stats: ScanStats,
}

impl Frame {
    fn empty(display: Display) -> Self {
        Self {
            display,
            ..Self::default()
        }
    }

    /// Snapshots at least `min_distance` from the observer
    pub fn renderable(&self, min_distance: f32) -> impl Iterator<Item = &EntitySnapshot> {
        self.entities.iter().filter(move |e| e.distance >= min_distance)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Captures frames from one attached process.
pub struct FramePipeline<'a, R: ReadMemory> {
    reader: &'a R,
    schema: &'a OffsetSchema,
    module_base: u64,
}

impl<'a, R: ReadMemory> FramePipeline<'a, R> {
    pub fn new(reader: &'a R, schema: &'a OffsetSchema, module_base: u64) -> Self {
        Self {
            reader,
            schema,
            module_base,
        }
    }

    /// Capture one frame under `config`.
    ///
    /// An empty frame is returned when there is no entity list or no local
    /// player yet.
    pub fn capture(&self, config: &OverlayConfig, display: Display) -> Result<Frame> {
        let list_head = self
            .reader
            .read_u64(self.module_base.wrapping_add(self.schema.entity_list))?;
        if list_head == 0 {
            debug!("Entity list not initialized");
            return Ok(Frame::empty(display));
        }

        let Some(observer) = Observer::read(self.reader, self.schema, self.module_base)? else {
            debug!("No local player");
            return Ok(Frame::empty(display));
        };

        let view_matrix: ViewMatrix = self
            .reader
            .read(self.module_base.wrapping_add(self.schema.view_matrix))?;

        let walker = EntityListWalker::new(self.reader, list_head);
        let extractor =
            SnapshotExtractor::new(self.reader, self.schema, config, observer, view_matrix, display);

        let mut frame = Frame::empty(display);
        for index in scan_range() {
            match self.candidate(&walker, &extractor, index) {
                Ok(Extraction::Accepted(snapshot)) => {
                    frame.stats.candidates += 1;
                    frame.stats.accepted += 1;
                    frame.entities.push(snapshot);
                }
                Ok(Extraction::Rejected(Rejection::EmptySlot)) => {}
                Ok(Extraction::Rejected(rejection)) => {
                    frame.stats.candidates += 1;
                    frame.stats.rejected += 1;
                    let reason: &'static str = rejection.into();
                    trace!("Index {}: rejected ({})", index, reason);
                }
                Err(e) => match config.fault_policy {
                    FaultPolicy::SkipCandidate => {
                        frame.stats.candidates += 1;
                        frame.stats.faults += 1;
                        debug!("Index {}: skipped after read fault: {}", index, e);
                    }
                    FaultPolicy::AbortFrame => {
                        debug!("Index {}: read fault, dropping frame: {}", index, e);
                        return Err(e);
                    }
                },
            }
        }

        trace!(
            "Frame: {} accepted, {} rejected, {} faults",
            frame.stats.accepted, frame.stats.rejected, frame.stats.faults
        );
        Ok(frame)
    }

    fn candidate(
        &self,
        walker: &EntityListWalker<'_, R>,
        extractor: &SnapshotExtractor<'_, R>,
        index: u32,
    ) -> Result<Extraction> {
        let Some(controller) = walker.controller(index)? else {
            return Ok(Rejection::EmptySlot.into());
        };

        let handle = self
            .reader
            .read_u32(controller.wrapping_add(self.schema.player_pawn_handle))?;
        if handle == 0 {
            return Ok(Rejection::NoPawnHandle.into());
        }
        let Some(pawn) = walker.pawn(handle)? else {
            return Ok(Rejection::NoPawn.into());
        };

        extractor.extract(controller, pawn)
    }
}
