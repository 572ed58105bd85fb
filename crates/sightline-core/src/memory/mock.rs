//! In-memory stand-in for a remote process image.
//!
//! The image is sparse and byte-addressed: any read touching a byte that was
//! never written faults, the same way an unmapped page does on a live process.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::math::{Vec3, ViewMatrix};
use crate::memory::ReadMemory;

#[derive(Debug, Clone, Default)]
pub struct MockMemoryReader {
    bytes: BTreeMap<u64, u8>,
}

impl ReadMemory for MockMemoryReader {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        (0..size as u64)
            .map(|i| {
                let at = address.wrapping_add(i);
                self.bytes
                    .get(&at)
                    .copied()
                    .ok_or_else(|| Error::read_failed(address, format!("unmapped byte at {:#x}", at)))
            })
            .collect()
    }
}

impl MockMemoryReader {
    /// Remove a range, simulating the remote process freeing it between reads.
    pub fn unmap(&mut self, address: u64, size: usize) {
        for i in 0..size as u64 {
            self.bytes.remove(&(address + i));
        }
    }
}

/// Builder for [`MockMemoryReader`].
#[derive(Debug, Default)]
pub struct MockMemoryBuilder {
    bytes: BTreeMap<u64, u8>,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_bytes(mut self, address: u64, data: &[u8]) -> Self {
        for (i, byte) in data.iter().enumerate() {
            self.bytes.insert(address + i as u64, *byte);
        }
        self
    }

    pub fn write_i32(self, address: u64, value: i32) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_u32(self, address: u64, value: u32) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_u64(self, address: u64, value: u64) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_f32(self, address: u64, value: f32) -> Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn write_vec3(self, address: u64, value: Vec3) -> Self {
        self.write_f32(address, value.x)
            .write_f32(address + 4, value.y)
            .write_f32(address + 8, value.z)
    }

    pub fn write_matrix(mut self, address: u64, matrix: &ViewMatrix) -> Self {
        for (row, values) in matrix.rows().iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                self = self.write_f32(address + ((row * 4 + col) * 4) as u64, *value);
            }
        }
        self
    }

    /// Write a NUL-padded text field occupying exactly `capacity` bytes.
    pub fn write_text(self, address: u64, text: &str, capacity: usize) -> Self {
        let mut data = vec![0u8; capacity];
        let len = text.len().min(capacity);
        data[..len].copy_from_slice(&text.as_bytes()[..len]);
        self.write_bytes(address, &data)
    }

    pub fn build(self) -> MockMemoryReader {
        MockMemoryReader { bytes: self.bytes }
    }
}
