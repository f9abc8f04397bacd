use std::sync::OnceLock;

#[cfg(target_family = "unix")]
pub mod unix;
#[cfg(target_family = "windows")]
pub mod windows;

/// Retrieves the system's page size, queried once per process.
///
/// # Platform-specific behavior
/// - **Unix-based systems (Linux, macOS, etc.):**
///   - On macOS, this function uses `libc::vm_page_size` to determine the page size.
///   - On other Unix systems, it uses `libc::sysconf` to get the page size.
///
/// - **Windows:** The function retrieves the page size by calling `GetSystemInfo`
///   and extracting the `dwPageSize` field from the `SYSTEM_INFO` structure.
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();

    #[cfg(target_family = "unix")]
    {
        *PAGE_SIZE.get_or_init(self::unix::page_size)
    }
    #[cfg(target_family = "windows")]
    {
        *PAGE_SIZE.get_or_init(self::windows::page_size)
    }
}

/// Rounds `len` up to a whole number of pages.
///
/// Returns `None` on overflow.
pub fn page_aligned_len(len: usize) -> Option<usize> {
    let page = self::page_size();
    len.checked_add(page - 1).map(|n| n & !(page - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_aligned_len() {
        let page = page_size();

        assert_eq!(page_aligned_len(1), Some(page));
        assert_eq!(page_aligned_len(page), Some(page));
        assert_eq!(page_aligned_len(page + 1), Some(2 * page));
        assert_eq!(page_aligned_len(usize::MAX), None);
    }
}
