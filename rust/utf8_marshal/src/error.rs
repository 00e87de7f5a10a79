use thiserror::Error;

/// Failures surfaced by the marshaller.
///
/// Absence (a null address or `None` text) is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    #[error("foreign allocation of {size} bytes failed")]
    AllocationFailed { size: usize },

    #[error("invalid UTF-8 in foreign string: {len} bytes, valid up to byte {valid_up_to}")]
    InvalidUtf8 { valid_up_to: usize, len: usize },

    #[error("text contains a NUL byte at position {position}")]
    InteriorNul { position: usize },

    #[error("no NUL terminator within the first {limit} bytes")]
    Unterminated { limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_positions() {
        let err = MarshalError::InvalidUtf8 { valid_up_to: 3, len: 5 };
        assert_eq!(
            err.to_string(),
            "invalid UTF-8 in foreign string: 5 bytes, valid up to byte 3"
        );
        let err = MarshalError::InteriorNul { position: 2 };
        assert_eq!(err.to_string(), "text contains a NUL byte at position 2");
    }
}
