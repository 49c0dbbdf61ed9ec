//! # oclpix-core
//!
//! Host-side types for the oclpix transform pipeline.
//!
//! This crate holds everything that does not need an OpenCL runtime:
//!
//! - [`PixelImage`] - packed 32-bit RGBA pixel buffer, row-major
//! - [`Rotation`] - the supported right-angle rotations
//! - [`scaled_extent`], [`rotated_extent`] - output dimension policies
//!
//! The dimension policies are pure functions so the boundary behaviour
//! (truncating long-edge scaling, axis swaps on 90/270 rotation) can be
//! tested without a compute device. `oclpix-compute` layers the device
//! orchestration on top of these types.
//!
//! ## Crate Structure
//!
//! ```text
//! oclpix-core (this crate)
//!    ^
//!    |
//!    +-- oclpix-compute (OpenCL orchestration)
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod extent;
pub mod image;

pub use error::{CoreError, CoreResult};
pub use extent::{rotated_extent, scaled_extent, Rotation};
pub use image::PixelImage;
