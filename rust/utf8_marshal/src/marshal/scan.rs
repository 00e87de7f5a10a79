use crate::error::MarshalError;

/// Count the bytes before the first NUL at `ptr`.
///
/// With `limit = Some(n)`, at most `n` content bytes are accepted: if bytes
/// `[0, n]` hold no NUL the scan stops with `Unterminated` and reads nothing
/// past offset `n`.
///
/// # Safety
///
/// `ptr` must be non-null and readable up to and including its NUL terminator
/// (or up to offset `limit` when a limit is given). No alignment is assumed.
pub(crate) unsafe fn terminated_len(ptr: *const u8, limit: Option<usize>) -> Result<usize, MarshalError> {
    debug_assert!(!ptr.is_null());

    let mut len = 0usize;
    loop {
        // SAFETY: offset `len` is at or before the terminator / limit per the contract.
        if unsafe { ptr.add(len).read() } == 0 {
            return Ok(len);
        }
        if limit == Some(len) {
            return Err(MarshalError::Unterminated { limit: len });
        }
        len += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_first_nul() {
        let buf = *b"ab\0cd\0";
        assert_eq!(unsafe { terminated_len(buf.as_ptr(), None) }, Ok(2));
    }

    #[test]
    fn empty_string_has_zero_len() {
        let buf = [0u8];
        assert_eq!(unsafe { terminated_len(buf.as_ptr(), None) }, Ok(0));
    }

    #[test]
    fn limit_allows_exact_fit() {
        let buf = *b"abcd\0";
        assert_eq!(unsafe { terminated_len(buf.as_ptr(), Some(4)) }, Ok(4));
    }

    #[test]
    fn limit_stops_unterminated_scan() {
        // No NUL anywhere: the limit keeps the scan inside the array.
        let buf = *b"abcdef";
        assert_eq!(
            unsafe { terminated_len(buf.as_ptr(), Some(3)) },
            Err(MarshalError::Unterminated { limit: 3 })
        );
    }

    #[test]
    fn unaligned_start() {
        let buf = *b"xyz\0";
        assert_eq!(unsafe { terminated_len(buf.as_ptr().add(1), None) }, Ok(2));
    }
}
