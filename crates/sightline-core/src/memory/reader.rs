//! Typed reads over a remote process image.

use crate::error::{Error, Result};
use crate::memory::ProcessHandle;

/// Fixed-size little-endian decode, keyed by the destination type.
///
/// `bytes` is always exactly `SIZE` long when called through [`ReadMemory::read`].
pub trait FromLeBytes: Sized {
    const SIZE: usize;

    fn from_le_bytes(bytes: &[u8]) -> Self;
}

macro_rules! impl_from_le_bytes {
    ($($ty:ty),*) => {
        $(
            impl FromLeBytes for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_le_bytes(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_from_le_bytes!(i32, u32, f32, i64, u64, f64);

/// Overwrite a scratch buffer before it is released.
fn scrub(buffer: &mut [u8]) {
    buffer.fill(0);
    std::hint::black_box(&buffer);
}

/// Read access to a remote address space.
///
/// Implementors only provide [`read_bytes`](ReadMemory::read_bytes); every
/// typed read is layered on top of it. Addresses are never null-checked here:
/// callers must stop a pointer chase at zero before reading.
pub trait ReadMemory {
    /// Read exactly `size` bytes at `address`, or fail without a partial result.
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>>;

    /// Read and decode a single value, zeroing the scratch buffer afterwards.
    fn read<T: FromLeBytes>(&self, address: u64) -> Result<T> {
        let mut buffer = self.read_bytes(address, T::SIZE)?;
        if buffer.len() < T::SIZE {
            scrub(&mut buffer);
            return Err(Error::read_failed(
                address,
                format!("short read: {} of {} bytes", buffer.len(), T::SIZE),
            ));
        }
        let value = T::from_le_bytes(&buffer);
        scrub(&mut buffer);
        Ok(value)
    }

    fn read_i32(&self, address: u64) -> Result<i32> {
        self.read(address)
    }

    fn read_u32(&self, address: u64) -> Result<u32> {
        self.read(address)
    }

    fn read_u64(&self, address: u64) -> Result<u64> {
        self.read(address)
    }

    fn read_f32(&self, address: u64) -> Result<f32> {
        self.read(address)
    }

    /// Read a text field of at most `max_len` bytes.
    ///
    /// The run is cut at the first NUL and decoded lossily. Nothing checks that
    /// `max_len` matches the remote field; an oversized length reads whatever
    /// bytes follow it.
    fn read_string(&self, address: u64, max_len: usize) -> Result<String> {
        let mut buffer = self.read_bytes(address, max_len)?;
        let end = memchr::memchr(0, &buffer).unwrap_or(buffer.len());
        let text = String::from_utf8_lossy(&buffer[..end]).into_owned();
        scrub(&mut buffer);
        Ok(text)
    }
}

/// Reader bound to an open process handle.
pub struct MemoryReader<'a> {
    process: &'a ProcessHandle,
}

impl<'a> MemoryReader<'a> {
    pub fn new(process: &'a ProcessHandle) -> Self {
        Self { process }
    }
}

impl ReadMemory for MemoryReader<'_> {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        self.process.read_bytes(address, size)
    }
}
