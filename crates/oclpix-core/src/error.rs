//! Error types for host-side pixel operations.

use thiserror::Error;

/// Result type alias using [`CoreError`] as the error type.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Errors from host-side pixel buffer and geometry operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Pixel buffer length does not match the stated dimensions.
    #[error("pixel buffer length mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch {
        /// Expected element count (width × height).
        expected: usize,
        /// Actual element count supplied.
        actual: usize,
    },

    /// Rotation angle outside the supported set {90, 180, 270}.
    #[error("unsupported rotation angle: {0} degrees")]
    UnsupportedAngle(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::BufferSizeMismatch {
            expected: 16,
            actual: 9,
        };
        assert_eq!(
            err.to_string(),
            "pixel buffer length mismatch: expected 16, got 9"
        );

        let err = CoreError::UnsupportedAngle(45);
        assert_eq!(err.to_string(), "unsupported rotation angle: 45 degrees");
    }
}
