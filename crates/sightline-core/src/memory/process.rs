//! Process discovery and the read-only process handle.

use tracing::debug;

use crate::error::{Error, Result};

/// Executable the overlay attaches to by default
pub const DEFAULT_PROCESS_NAME: &str = "cs2.exe";

/// Module whose base address anchors the global offsets
pub const DEFAULT_MODULE_NAME: &str = "client.dll";

/// Process id plus a located module, as handed to the frame pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub base_address: u64,
    pub module_size: u32,
}

/// Read-only handle to a target process.
///
/// Opened with query and VM-read rights only and closed on drop.
pub struct ProcessHandle {
    #[cfg(target_os = "windows")]
    handle: windows::Win32::Foundation::HANDLE,
    pub pid: u32,
    pub base_address: u64,
    pub module_size: u32,
}

impl ProcessHandle {
    /// Find the default process and open it anchored at the default module.
    pub fn find_and_open() -> Result<Self> {
        Self::find_and_open_named(DEFAULT_PROCESS_NAME, DEFAULT_MODULE_NAME)
    }

    pub fn find_and_open_named(process_name: &str, module_name: &str) -> Result<Self> {
        let pid = find_process_id(process_name)?;
        debug!("Found {} (PID: {})", process_name, pid);
        Self::open(pid, module_name)
    }

    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            base_address: self.base_address,
            module_size: self.module_size,
        }
    }
}

#[cfg(target_os = "windows")]
impl ProcessHandle {
    pub fn open(pid: u32, module_name: &str) -> Result<Self> {
        use windows::Win32::System::Threading::{
            OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
        };

        let (base_address, module_size) = find_module(pid, module_name)?;

        // SAFETY: OpenProcess has no memory-safety preconditions; the returned
        // handle is owned by Self and closed in Drop.
        let handle = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, false, pid) }
            .map_err(|e| Error::ProcessOpenFailed(format!("PID {}: {}", pid, e)))?;

        debug!(
            "Opened PID {} ({} base: {:#x}, size: {:#x})",
            pid, module_name, base_address, module_size
        );

        Ok(Self {
            handle,
            pid,
            base_address,
            module_size,
        })
    }

    pub(crate) fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        use std::ffi::c_void;
        use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;

        let mut buffer = vec![0u8; size];
        let mut read = 0usize;
        // SAFETY: buffer is a live allocation of exactly `size` bytes and the
        // handle stays open for the lifetime of self.
        unsafe {
            ReadProcessMemory(
                self.handle,
                address as *const c_void,
                buffer.as_mut_ptr() as *mut c_void,
                size,
                Some(&mut read as *mut usize),
            )
        }
        .map_err(|e| Error::read_failed(address, e.to_string()))?;

        if read != size {
            buffer.fill(0);
            return Err(Error::read_failed(
                address,
                format!("short read: {} of {} bytes", read, size),
            ));
        }
        Ok(buffer)
    }
}

#[cfg(target_os = "windows")]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        use windows::Win32::Foundation::CloseHandle;
        // SAFETY: the handle was returned by OpenProcess and is closed exactly once.
        let _ = unsafe { CloseHandle(self.handle) };
    }
}

#[cfg(target_os = "windows")]
fn find_process_id(name: &str) -> Result<u32> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
        TH32CS_SNAPPROCESS,
    };

    // SAFETY: snapshot creation has no preconditions; it is closed below.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
        .map_err(|e| Error::ProcessNotFound(format!("{}: {}", name, e)))?;

    let mut entry = PROCESSENTRY32W {
        dwSize: std::mem::size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut found = None;
    // SAFETY: entry.dwSize is initialised as the Toolhelp API requires.
    unsafe {
        if Process32FirstW(snapshot, &mut entry).is_ok() {
            loop {
                if utf16_name(&entry.szExeFile).eq_ignore_ascii_case(name) {
                    found = Some(entry.th32ProcessID);
                    break;
                }
                if Process32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }
        let _ = CloseHandle(snapshot);
    }

    found.ok_or_else(|| Error::ProcessNotFound(name.to_string()))
}

#[cfg(target_os = "windows")]
fn find_module(pid: u32, module_name: &str) -> Result<(u64, u32)> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, MODULEENTRY32W, Module32FirstW, Module32NextW,
        TH32CS_SNAPMODULE, TH32CS_SNAPMODULE32,
    };

    // SAFETY: snapshot creation has no preconditions; it is closed below.
    let snapshot =
        unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPMODULE | TH32CS_SNAPMODULE32, pid) }
            .map_err(|e| Error::ProcessOpenFailed(format!("PID {}: {}", pid, e)))?;

    let mut entry = MODULEENTRY32W {
        dwSize: std::mem::size_of::<MODULEENTRY32W>() as u32,
        ..Default::default()
    };

    let mut found = None;
    // SAFETY: entry.dwSize is initialised as the Toolhelp API requires.
    unsafe {
        if Module32FirstW(snapshot, &mut entry).is_ok() {
            loop {
                if utf16_name(&entry.szModule).eq_ignore_ascii_case(module_name) {
                    found = Some((entry.modBaseAddr as u64, entry.modBaseSize));
                    break;
                }
                if Module32NextW(snapshot, &mut entry).is_err() {
                    break;
                }
            }
        }
        let _ = CloseHandle(snapshot);
    }

    found.ok_or_else(|| Error::ModuleNotFound(format!("{} in PID {}", module_name, pid)))
}

#[cfg(target_os = "windows")]
fn utf16_name(raw: &[u16]) -> String {
    let len = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf16_lossy(&raw[..len])
}

#[cfg(not(target_os = "windows"))]
impl ProcessHandle {
    pub fn open(pid: u32, module_name: &str) -> Result<Self> {
        Err(Error::ProcessOpenFailed(format!(
            "PID {} ({}): process access is only supported on Windows",
            pid, module_name
        )))
    }

    pub(crate) fn read_bytes(&self, address: u64, _size: usize) -> Result<Vec<u8>> {
        Err(Error::read_failed(
            address,
            "process access is only supported on Windows",
        ))
    }
}

#[cfg(not(target_os = "windows"))]
fn find_process_id(name: &str) -> Result<u32> {
    Err(Error::ProcessNotFound(format!(
        "{} (process lookup is only supported on Windows)",
        name
    )))
}
