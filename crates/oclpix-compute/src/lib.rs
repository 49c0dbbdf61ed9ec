//! OpenCL orchestration for GPU-accelerated 2D image transforms.
//!
//! The pixel math lives in externally supplied kernel source text; this
//! crate owns the invocation plumbing: picking a device, holding a
//! context and command queue, compiling the transform programs once,
//! and running the per-call upload → dispatch → readback → release
//! sequence.
//!
//! # Architecture
//!
//! ```text
//! ImageTransformer (resize / rotate service)
//!     +-- device    - platform enumeration, device selection
//!     +-- context   - ExecutionContext: context + command queue
//!     +-- program   - kernel source text -> CompiledProgram
//!     +-- image     - DeviceImage: host <-> device pixel surfaces
//!     +-- kernels   - bundled .cl transform sources
//! ```
//!
//! # Lifetimes
//!
//! The OpenCL runtime does not garbage-collect device objects, so
//! ownership is explicit on the Rust side:
//!
//! - `ExecutionContext` and the two `CompiledProgram`s live for the
//!   whole service and are released by [`ImageTransformer::shutdown`].
//! - Device images and kernel instances are created per call and
//!   dropped before the call returns, on success and failure alike.
//! - A kernel *instance* is never shared across threads; each call
//!   creates its own from the long-lived program, per the OpenCL
//!   `clSetKernelArg` contract.
//!
//! # Example
//!
//! ```ignore
//! use oclpix_compute::ImageTransformer;
//! use oclpix_core::{PixelImage, Rotation};
//!
//! let transformer = ImageTransformer::new()?;
//! let small = transformer.resize_long_edge(&photo, 1024)?;
//! let turned = transformer.rotate(&small, Rotation::Cw90)?;
//! transformer.shutdown();
//! ```

pub mod context;
pub mod device;
pub mod image;
pub mod kernels;
pub mod program;
pub mod transform;

pub use context::ExecutionContext;
pub use device::{probe_devices, select_device, select_device_where, ComputeDevice, DeviceSummary};
pub use image::{DeviceImage, ImageAccess};
pub use program::CompiledProgram;
pub use transform::ImageTransformer;

use opencl3::error_codes::ClError;
use thiserror::Error;

/// Errors from device selection, program builds, and kernel invocation.
#[derive(Error, Debug)]
pub enum ComputeError {
    /// No OpenCL platform is installed or visible.
    #[error("no OpenCL platform found")]
    NoPlatform,

    /// The first platform exposes no GPU-class device.
    #[error("no GPU device found on platform {platform:?}")]
    NoDevice {
        /// Name of the platform that was probed.
        platform: String,
    },

    /// The device compiler rejected the kernel source.
    ///
    /// Carries the build log verbatim; not retryable without fixing
    /// the source.
    #[error("kernel build failed:\n{log}")]
    KernelBuild {
        /// Device compiler diagnostics.
        log: String,
    },

    /// The program compiled but does not expose the named entry point.
    #[error("kernel entry point {name:?} unavailable: {status}")]
    EntryPoint {
        /// Requested kernel function name.
        name: String,
        /// Underlying OpenCL status.
        status: ClError,
    },

    /// The device refused an image allocation.
    #[error("device refused {access} image of {width}x{height}{}", fmt_status(.status))]
    DeviceImageCreate {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Requested access mode.
        access: ImageAccess,
        /// Driver status, when the refusal came from the driver rather
        /// than host-side validation.
        status: Option<ClError>,
    },

    /// The device rejected or failed a kernel dispatch.
    #[error("kernel dispatch failed: {0}")]
    KernelDispatch(ClError),

    /// Reading the output image back into host memory failed.
    #[error("device readback failed: {0}")]
    Readback(ClError),

    /// An OpenCL setup call failed (context or queue creation, device
    /// queries).
    #[error("{call} failed: {status}")]
    Api {
        /// The OpenCL call that failed.
        call: &'static str,
        /// Underlying OpenCL status.
        status: ClError,
    },

    /// Host-side pixel buffer or geometry error.
    #[error(transparent)]
    Core(#[from] oclpix_core::CoreError),
}

impl ComputeError {
    /// The underlying OpenCL status code, when one exists.
    pub fn cl_status(&self) -> Option<i32> {
        match self {
            ComputeError::EntryPoint { status, .. } => Some(status.0),
            ComputeError::DeviceImageCreate { status, .. } => status.as_ref().map(|e| e.0),
            ComputeError::KernelDispatch(e) => Some(e.0),
            ComputeError::Readback(e) => Some(e.0),
            ComputeError::Api { status, .. } => Some(status.0),
            _ => None,
        }
    }
}

/// Result type alias using [`ComputeError`].
pub type ComputeResult<T> = std::result::Result<T, ComputeError>;

fn fmt_status(status: &Option<ClError>) -> String {
    match status {
        Some(e) => format!(": {e}"),
        None => String::new(),
    }
}
