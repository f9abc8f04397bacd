use core::{
    mem::ManuallyDrop,
    ptr::{self, NonNull},
};
use std::io;

use super::{ffi, PinnedMemory};
use crate::error::AllocationError;

/// Pinned memory on Unix-based systems.
///
/// Backed by an anonymous `mmap`, locked with `mlock` and, when requested,
/// excluded from core dumps with `madvise`.
pub struct UnixPinnedMemory {
    ptr: NonNull<u8>,
    len: usize,
    mapped_len: usize,
}

impl UnixPinnedMemory {
    fn unmap(&self) -> io::Result<()> {
        let unlocked = ffi::unix::munlock(self.ptr, self.mapped_len);
        ffi::unix::munmap(self.ptr, self.mapped_len)?;
        unlocked
    }
}

impl PinnedMemory for UnixPinnedMemory {
    fn pin(len: usize, exclude_from_dumps: bool) -> Result<Self, AllocationError> {
        if len == 0 {
            return Err(AllocationError::ZeroLength);
        }

        let mapped_len = ffi::page_aligned_len(len).ok_or_else(|| {
            AllocationError::Map(io::Error::new(
                io::ErrorKind::InvalidInput,
                "length out of bounds",
            ))
        })?;

        let ptr = ffi::unix::mmap_private(mapped_len)
            .map_err(AllocationError::Map)?
            .cast::<u8>();

        if let Err(err) = ffi::unix::mlock(ptr, mapped_len) {
            // May fail (unchecked)
            let _ = ffi::unix::munmap(ptr, mapped_len);
            return Err(AllocationError::Pin(err));
        }

        if exclude_from_dumps {
            if let Err(err) = ffi::unix::madvise_dump(ptr, mapped_len, true) {
                let _ = ffi::unix::munlock(ptr, mapped_len);
                let _ = ffi::unix::munmap(ptr, mapped_len);
                return Err(AllocationError::Advise(err));
            }
        }

        Ok(Self {
            ptr,
            len,
            mapped_len,
        })
    }

    fn release(self) -> io::Result<()> {
        let this = ManuallyDrop::new(self);
        this.unmap()
    }

    fn mapped_len(&self) -> usize {
        self.mapped_len
    }
}

impl AsRef<[u8]> for UnixPinnedMemory {
    fn as_ref(&self) -> &[u8] {
        let slice_ptr = ptr::slice_from_raw_parts(self.ptr.as_ptr(), self.len);
        unsafe { &(*slice_ptr) }
    }
}

impl AsMut<[u8]> for UnixPinnedMemory {
    fn as_mut(&mut self) -> &mut [u8] {
        let slice_ptr = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr(), self.len);
        unsafe { &mut (*slice_ptr) }
    }
}

impl Drop for UnixPinnedMemory {
    fn drop(&mut self) {
        // May fail (unchecked)
        let _ = self.unmap();
    }
}

// Safety: the mapping is exclusively owned and only reachable through `&`/`&mut self`.
unsafe impl Send for UnixPinnedMemory {}
