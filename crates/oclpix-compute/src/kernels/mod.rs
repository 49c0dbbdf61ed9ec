//! Bundled OpenCL kernel sources for the transform programs.
//!
//! The orchestration core treats kernel source as pluggable text:
//! these are the defaults, and
//! [`ImageTransformer::with_sources`](crate::ImageTransformer::with_sources)
//! accepts any replacement that exposes the same entry points and the
//! RGBA8 image bindings.

/// Entry point exposed by [`RESIZE_SOURCE`].
pub const RESIZE_ENTRY: &str = "resizeImage";

/// Entry point exposed by [`ROTATE_SOURCE`].
pub const ROTATE_ENTRY: &str = "rotateImage";

/// Nearest-sample resize, dispatched over the output coordinate space.
pub const RESIZE_SOURCE: &str = include_str!("resize.cl");

/// Right-angle rotation, dispatched over the *input* coordinate space.
pub const ROTATE_SOURCE: &str = include_str!("rotate.cl");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_expose_their_entry_points() {
        assert!(RESIZE_SOURCE.contains(RESIZE_ENTRY));
        assert!(ROTATE_SOURCE.contains(ROTATE_ENTRY));
    }

    #[test]
    fn test_rotate_source_binds_scalar_angle() {
        assert!(ROTATE_SOURCE.contains("const int angle"));
    }
}
