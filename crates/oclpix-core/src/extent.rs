//! Output extent policies for the resize and rotate transforms.
//!
//! These are the host-side dimension rules; the per-pixel sampling
//! itself lives in the OpenCL kernel sources.
//!
//! # Long-edge scaling
//!
//! [`scaled_extent`] uses *truncating* integer division for the scale
//! factor, so a long-edge target smaller than the input's long edge
//! scales the short edge by zero and collapses that dimension. This is
//! a known boundary of the policy, kept deliberately: callers that need
//! a guarantee should validate the result before allocating device
//! images (the compute layer rejects zero-extent allocations).

use crate::CoreError;

/// Supported right-angle rotations.
///
/// Carries the rotation angle in degrees, measured clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// 90 degrees clockwise.
    Cw90,
    /// Half turn (180 degrees).
    Flip,
    /// 90 degrees counter-clockwise (270 clockwise).
    Ccw90,
}

impl Rotation {
    /// Clockwise angle in degrees: 90, 180 or 270.
    pub fn angle_degrees(&self) -> u32 {
        match self {
            Rotation::Cw90 => 90,
            Rotation::Flip => 180,
            Rotation::Ccw90 => 270,
        }
    }

    /// Whether this rotation swaps the image's width and height.
    pub fn swaps_axes(&self) -> bool {
        !matches!(self, Rotation::Flip)
    }
}

impl TryFrom<u32> for Rotation {
    type Error = CoreError;

    fn try_from(angle: u32) -> Result<Self, Self::Error> {
        match angle {
            90 => Ok(Rotation::Cw90),
            180 => Ok(Rotation::Flip),
            270 => Ok(Rotation::Ccw90),
            other => Err(CoreError::UnsupportedAngle(other)),
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} degrees", self.angle_degrees())
    }
}

/// Output extent when resizing so the long edge becomes `long_edge`.
///
/// The short edge scales by `long_edge / long_input_edge` using
/// truncating integer division. Square inputs take the "otherwise"
/// branch: the height becomes `long_edge`.
///
/// ```
/// use oclpix_core::scaled_extent;
///
/// assert_eq!(scaled_extent(512, 1024, 2048), (1024, 2048));
/// ```
pub fn scaled_extent(width: u32, height: u32, long_edge: u32) -> (u32, u32) {
    if width > height {
        (long_edge, height * (long_edge / width))
    } else {
        (width * (long_edge / height), long_edge)
    }
}

/// Output extent after a right-angle rotation.
///
/// 90 and 270 degree turns swap the axes; a half turn keeps them.
pub fn rotated_extent(width: u32, height: u32, rotation: Rotation) -> (u32, u32) {
    if rotation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_extent_portrait() {
        // 512x1024 scaled to a 2048 long edge doubles both dimensions.
        assert_eq!(scaled_extent(512, 1024, 2048), (1024, 2048));
    }

    #[test]
    fn test_scaled_extent_landscape() {
        assert_eq!(scaled_extent(1024, 512, 2048), (2048, 1024));
    }

    #[test]
    fn test_scaled_extent_square_takes_height_branch() {
        assert_eq!(scaled_extent(256, 256, 512), (512, 512));
    }

    #[test]
    fn test_scaled_extent_truncates() {
        // 1500 / 1000 truncates to 1: the short edge does not scale.
        assert_eq!(scaled_extent(1000, 300, 1500), (1500, 300));
    }

    #[test]
    fn test_scaled_extent_can_collapse_to_zero() {
        // 2048 / 4096 truncates to 0. The policy propagates the zero;
        // rejecting it is the allocation layer's call.
        assert_eq!(scaled_extent(4096, 16, 2048), (2048, 0));
    }

    #[test]
    fn test_rotated_extent() {
        assert_eq!(rotated_extent(1024, 512, Rotation::Cw90), (512, 1024));
        assert_eq!(rotated_extent(1024, 512, Rotation::Ccw90), (512, 1024));
        assert_eq!(rotated_extent(1024, 512, Rotation::Flip), (1024, 512));
    }

    #[test]
    fn test_rotation_angles() {
        assert_eq!(Rotation::Cw90.angle_degrees(), 90);
        assert_eq!(Rotation::Flip.angle_degrees(), 180);
        assert_eq!(Rotation::Ccw90.angle_degrees(), 270);
    }

    #[test]
    fn test_rotation_try_from_round_trips() {
        for rot in [Rotation::Cw90, Rotation::Flip, Rotation::Ccw90] {
            assert_eq!(Rotation::try_from(rot.angle_degrees()).unwrap(), rot);
        }
        assert_eq!(
            Rotation::try_from(45).unwrap_err(),
            CoreError::UnsupportedAngle(45)
        );
        assert_eq!(
            Rotation::try_from(0).unwrap_err(),
            CoreError::UnsupportedAngle(0)
        );
    }
}
