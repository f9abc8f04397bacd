use core::{
    mem::ManuallyDrop,
    ptr::{self, NonNull},
};
use std::io;

use super::{ffi, PinnedMemory};
use crate::error::AllocationError;

/// Pinned memory on Windows systems.
///
/// Backed by `VirtualAlloc` and locked with `VirtualLock`. Windows has no
/// per-region core dump exclusion, so that option is ignored.
pub struct WindowsPinnedMemory {
    virt_alloc: NonNull<u8>,
    len: usize,
    mapped_len: usize,
}

impl WindowsPinnedMemory {
    fn free(&self) -> io::Result<()> {
        let unlocked = ffi::windows::virtual_unlock(self.virt_alloc, self.mapped_len);
        ffi::windows::virtual_free(self.virt_alloc)?;
        unlocked
    }
}

impl PinnedMemory for WindowsPinnedMemory {
    fn pin(len: usize, _exclude_from_dumps: bool) -> Result<Self, AllocationError> {
        if len == 0 {
            return Err(AllocationError::ZeroLength);
        }

        let mapped_len = ffi::page_aligned_len(len).ok_or_else(|| {
            AllocationError::Map(io::Error::new(
                io::ErrorKind::InvalidInput,
                "length out of bounds",
            ))
        })?;

        let virt_alloc = ffi::windows::virtual_alloc(mapped_len)
            .map_err(AllocationError::Map)?
            .cast::<u8>();

        if let Err(err) = ffi::windows::virtual_lock(virt_alloc, mapped_len) {
            let _ = ffi::windows::virtual_free(virt_alloc);
            return Err(AllocationError::Pin(err));
        }

        Ok(Self {
            virt_alloc,
            len,
            mapped_len,
        })
    }

    fn release(self) -> io::Result<()> {
        let this = ManuallyDrop::new(self);
        this.free()
    }

    fn mapped_len(&self) -> usize {
        self.mapped_len
    }
}

impl AsRef<[u8]> for WindowsPinnedMemory {
    fn as_ref(&self) -> &[u8] {
        let slice_ptr = ptr::slice_from_raw_parts(self.virt_alloc.as_ptr(), self.len);
        unsafe { &(*slice_ptr) }
    }
}

impl AsMut<[u8]> for WindowsPinnedMemory {
    fn as_mut(&mut self) -> &mut [u8] {
        let slice_ptr = ptr::slice_from_raw_parts_mut(self.virt_alloc.as_ptr(), self.len);
        unsafe { &mut (*slice_ptr) }
    }
}

impl Drop for WindowsPinnedMemory {
    fn drop(&mut self) {
        let _ = self.free();
    }
}

// Safety: the allocation is exclusively owned and only reachable through `&`/`&mut self`.
unsafe impl Send for WindowsPinnedMemory {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_pinned_memory() {
        let mut pages = WindowsPinnedMemory::pin(1024, false).expect("Failed to pin memory");

        let data: &mut [u8] = pages.as_mut();
        data[0] = 42;

        let data: &[u8] = pages.as_ref();
        assert_eq!(data.len(), 1024);
        assert_eq!(data[0], 42);

        pages.release().expect("Failed to release memory");
    }
}
