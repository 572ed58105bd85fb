//! Walker over the remote two-level chunked entity index.

use tracing::trace;

use crate::error::Result;
use crate::memory::ReadMemory;
use crate::memory::layout::entity_list::*;

/// Addresses touched while resolving one selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAddress {
    /// Where the chunk pointer is stored in the top-level table
    pub chunk_pointer: u64,
    /// Byte offset of the slot inside its chunk
    pub slot_offset: u64,
}

impl SlotAddress {
    pub fn for_selector(list_head: u64, selector: u64) -> Self {
        let chunk_index = (selector & CHUNK_SELECTOR_MASK) >> CHUNK_SHIFT;
        Self {
            chunk_pointer: list_head.wrapping_add(POINTER_SIZE * chunk_index + TABLE_BASE_OFFSET),
            slot_offset: SLOT_STRIDE * (selector & SLOT_MASK),
        }
    }
}

/// Resolves raw indices and entity handles to object addresses.
///
/// Both kinds of selector go through the same mask/shift arithmetic. Null
/// chunk pointers and null slots are expected sparsity and resolve to `None`;
/// only a failed read is an error.
pub struct EntityListWalker<'a, R: ReadMemory> {
    reader: &'a R,
    list_head: u64,
}

impl<'a, R: ReadMemory> EntityListWalker<'a, R> {
    pub fn new(reader: &'a R, list_head: u64) -> Self {
        Self { reader, list_head }
    }

    pub fn address_of(&self, selector: u64) -> SlotAddress {
        SlotAddress::for_selector(self.list_head, selector)
    }

    /// Resolve a selector to the object pointer stored in its slot.
    pub fn lookup(&self, selector: u64) -> Result<Option<u64>> {
        let address = self.address_of(selector);
        let chunk = self.reader.read_u64(address.chunk_pointer)?;
        if chunk == 0 {
            trace!("Selector {:#x}: empty chunk", selector);
            return Ok(None);
        }

        let object = self.reader.read_u64(chunk.wrapping_add(address.slot_offset))?;
        Ok((object != 0).then_some(object))
    }

    /// Controller stored at raw list index `index`.
    pub fn controller(&self, index: u32) -> Result<Option<u64>> {
        self.lookup(u64::from(index))
    }

    /// Pawn referenced by an entity handle read from a controller.
    pub fn pawn(&self, handle: u32) -> Result<Option<u64>> {
        self.lookup(u64::from(handle))
    }
}

/// Raw indices covered by one scan
pub fn scan_range() -> std::ops::Range<u32> {
    0..SCAN_BUDGET
}
