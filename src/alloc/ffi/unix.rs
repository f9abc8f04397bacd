use core::ptr::{self, NonNull};
use std::io;

/// Maps an anonymous, process-private, read/write memory region.
///
/// Wraps the `mmap` system call with `MAP_PRIVATE | MAP_ANON`.
///
/// # Arguments
///
/// * `len` - The length of the memory region.
///
/// # Returns
///
/// * A result containing a non-null pointer to the memory region on success,
///   or an I/O error on failure.
pub fn mmap_private(len: usize) -> io::Result<NonNull<[u8]>> {
    let prot = libc::PROT_READ | libc::PROT_WRITE;
    let flags = libc::MAP_PRIVATE | libc::MAP_ANON;

    match unsafe { libc::mmap(ptr::null_mut(), len, prot, flags, -1, 0) } {
        libc::MAP_FAILED => Err(io::Error::last_os_error()),
        ptr => {
            let ptr = unsafe { NonNull::new_unchecked(ptr as *mut u8) };
            Ok(NonNull::slice_from_raw_parts(ptr, len))
        }
    }
}

/// Locks a memory region, preventing it from being paged out to swap.
///
/// Wraps the `mlock` system call.
pub fn mlock(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
    match unsafe { libc::mlock(ptr.as_ptr() as _, len) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Unlocks a memory region, allowing it to be paged out to swap.
///
/// Wraps the `munlock` system call.
pub fn munlock(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
    match unsafe { libc::munlock(ptr.as_ptr() as _, len) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Excludes (`exclude == true`) or re-includes a memory region in core dumps.
///
/// Wraps the `madvise` system call. Platforms without a dump-exclusion
/// advice succeed without doing anything.
pub fn madvise_dump(ptr: NonNull<u8>, len: usize, exclude: bool) -> io::Result<()> {
    let Some(advice) = dump_advice(exclude) else {
        return Ok(());
    };

    match unsafe { libc::madvise(ptr.as_ptr() as _, len, advice) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

#[inline]
fn dump_advice(exclude: bool) -> Option<libc::c_int> {
    #[cfg(any(target_os = "freebsd", target_os = "dragonfly"))]
    {
        Some(if exclude { libc::MADV_NOCORE } else { libc::MADV_CORE })
    }
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        Some(if exclude { libc::MADV_DONTDUMP } else { libc::MADV_DODUMP })
    }
    #[cfg(not(any(
        target_os = "freebsd",
        target_os = "dragonfly",
        target_os = "linux",
        target_os = "android"
    )))]
    {
        let _ = exclude;
        None
    }
}

/// Unmaps a memory region.
///
/// Wraps the `munmap` system call.
pub fn munmap(ptr: NonNull<u8>, len: usize) -> io::Result<()> {
    match unsafe { libc::munmap(ptr.as_ptr() as _, len) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

/// Retrieves the system's page size.
///
/// Wraps the `sysconf` system call on Unix-like systems
/// and `vm_page_size` on macOS.
#[inline]
pub(super) fn page_size() -> usize {
    #[cfg(target_os = "macos")]
    unsafe {
        libc::vm_page_size as usize
    }
    #[cfg(not(target_os = "macos"))]
    unsafe {
        libc::sysconf(libc::_SC_PAGESIZE) as usize
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        let size = page_size();
        assert!(size >= 4096);
        assert!(size.is_power_of_two());
    }

    #[test]
    #[serial(pinned)]
    fn test_mmap_lock_unmap() {
        let len = page_size();
        let region = mmap_private(len).expect("Failed to mmap");
        let ptr = region.cast::<u8>();

        mlock(ptr, len).expect("Failed to mlock");
        madvise_dump(ptr, len, true).expect("Failed to madvise");

        // Fresh anonymous pages are zero-filled by the kernel.
        let bytes = unsafe { &*region.as_ptr() };
        assert!(bytes.iter().all(|&b| b == 0));

        madvise_dump(ptr, len, false).expect("Failed to madvise");
        munlock(ptr, len).expect("Failed to munlock");
        munmap(ptr, len).expect("Failed to munmap");
    }

    #[test]
    fn test_mmap_fails_on_absurd_length() {
        assert!(mmap_private(usize::MAX - page_size() + 1).is_err());
    }
}
