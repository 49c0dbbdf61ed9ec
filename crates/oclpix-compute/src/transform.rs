//! The transform service: resize and rotate, one blocking call each.
//!
//! Each call follows the same choreography: upload the input image,
//! allocate the output image, instantiate a fresh kernel from the
//! long-lived program, dispatch over a 2D index space, wait for the
//! kernel's event, read the output back, and let the per-call device
//! objects drop. The context and programs persist until
//! [`ImageTransformer::shutdown`].

use opencl3::event::Event;
use opencl3::kernel::ExecuteKernel;
use opencl3::types::cl_int;
use oclpix_core::{rotated_extent, scaled_extent, PixelImage, Rotation};
use tracing::debug;

use crate::context::ExecutionContext;
use crate::device::select_device;
use crate::image::DeviceImage;
use crate::kernels;
use crate::program::CompiledProgram;
use crate::{ComputeError, ComputeResult};

/// GPU-backed resize/rotate service.
///
/// Construction selects a device, creates the execution context, and
/// compiles both transform programs; every later call reuses them.
/// Safe to share across threads: kernel instances are created per call
/// and never escape it.
pub struct ImageTransformer {
    // Programs before the context: drop (and shutdown) releases them
    // while the context they are bound to still exists.
    resize_program: CompiledProgram,
    rotate_program: CompiledProgram,
    ctx: ExecutionContext,
}

impl ImageTransformer {
    /// Build a transformer with the bundled kernel sources.
    pub fn new() -> ComputeResult<Self> {
        Self::with_sources(kernels::RESIZE_SOURCE, kernels::ROTATE_SOURCE)
    }

    /// Build a transformer from caller-supplied kernel sources.
    ///
    /// The sources must expose the [`kernels::RESIZE_ENTRY`] and
    /// [`kernels::ROTATE_ENTRY`] entry points with the standard RGBA8
    /// image bindings; the per-pixel sampling policy inside is theirs.
    pub fn with_sources(resize_source: &str, rotate_source: &str) -> ComputeResult<Self> {
        let device = select_device()?;
        let ctx = ExecutionContext::create(device)?;
        Self::with_context(ctx, resize_source, rotate_source)
    }

    /// Build a transformer on an existing execution context.
    ///
    /// Takes ownership: the context is torn down by
    /// [`shutdown`](Self::shutdown) along with the programs built here.
    pub fn with_context(
        ctx: ExecutionContext,
        resize_source: &str,
        rotate_source: &str,
    ) -> ComputeResult<Self> {
        let resize_program = CompiledProgram::build(&ctx, resize_source)?;
        let rotate_program = CompiledProgram::build(&ctx, rotate_source)?;
        Ok(Self {
            resize_program,
            rotate_program,
            ctx,
        })
    }

    /// The execution context this service runs on.
    pub fn context(&self) -> &ExecutionContext {
        &self.ctx
    }

    /// Resize so the image's long edge becomes `long_edge` pixels.
    ///
    /// The short edge scales by truncating integer division (see
    /// [`scaled_extent`]); a target much smaller than the input can
    /// truncate the short edge to zero, which surfaces as a
    /// [`ComputeError::DeviceImageCreate`] when the output allocation
    /// is attempted.
    pub fn resize_long_edge(&self, image: &PixelImage, long_edge: u32) -> ComputeResult<PixelImage> {
        let (out_w, out_h) = scaled_extent(image.width, image.height, long_edge);
        self.resize(image, out_w, out_h)
    }

    /// Resize to an explicit extent. No aspect-ratio adjustment: the
    /// caller's values are used verbatim, even if they distort.
    pub fn resize(&self, image: &PixelImage, out_w: u32, out_h: u32) -> ComputeResult<PixelImage> {
        let input = DeviceImage::upload_read_only(&self.ctx, image)?;
        let mut output = DeviceImage::allocate_writable(&self.ctx, out_w, out_h)?;

        // One work-item per output pixel.
        let kernel = self.resize_program.entry_point(kernels::RESIZE_ENTRY)?;
        let kernel_event = unsafe {
            ExecuteKernel::new(&kernel)
                .set_arg(input.mem())
                .set_arg(output.mem())
                .set_global_work_sizes(&[out_w as usize, out_h as usize])
                .enqueue_nd_range(self.ctx.queue())
                .map_err(ComputeError::KernelDispatch)?
        };
        kernel_event.wait().map_err(ComputeError::KernelDispatch)?;
        log_elapsed("resizeImage", &kernel_event);

        let pixels = output.read_back(self.ctx.queue())?;
        Ok(PixelImage::from_raw(pixels, out_w, out_h)?)
        // kernel and both device images drop here, releasing their
        // handles; the same happens on every early return above.
    }

    /// Rotate by a right angle.
    ///
    /// 90/270 degree turns swap the output's axes; the dispatch extent
    /// is always the *input* image's, one work-item per source pixel
    /// writing to its rotated destination.
    pub fn rotate(&self, image: &PixelImage, rotation: Rotation) -> ComputeResult<PixelImage> {
        let (out_w, out_h) = rotated_extent(image.width, image.height, rotation);

        let input = DeviceImage::upload_read_only(&self.ctx, image)?;
        let mut output = DeviceImage::allocate_writable(&self.ctx, out_w, out_h)?;

        let angle: cl_int = rotation.angle_degrees() as cl_int;
        let kernel = self.rotate_program.entry_point(kernels::ROTATE_ENTRY)?;
        let kernel_event = unsafe {
            ExecuteKernel::new(&kernel)
                .set_arg(input.mem())
                .set_arg(output.mem())
                .set_arg(&angle)
                .set_global_work_sizes(&[image.width as usize, image.height as usize])
                .enqueue_nd_range(self.ctx.queue())
                .map_err(ComputeError::KernelDispatch)?
        };
        kernel_event.wait().map_err(ComputeError::KernelDispatch)?;
        log_elapsed("rotateImage", &kernel_event);

        let pixels = output.read_back(self.ctx.queue())?;
        Ok(PixelImage::from_raw(pixels, out_w, out_h)?)
    }

    /// Release the programs, then the queue, then the context.
    ///
    /// Must be called exactly once; consuming `self` makes any later
    /// call a compile error.
    pub fn shutdown(self) {
        let Self {
            resize_program,
            rotate_program,
            ctx,
        } = self;
        drop(resize_program);
        drop(rotate_program);
        ctx.teardown();
    }
}

impl std::fmt::Debug for ImageTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageTransformer")
            .field("device", &self.ctx.device())
            .finish_non_exhaustive()
    }
}

/// Elapsed device time of a completed event in milliseconds.
///
/// Requires the queue to have been created with profiling enabled;
/// returns `None` when the event carries no timing data.
pub fn event_elapsed_ms(event: &Event) -> Option<f64> {
    let start = event.profiling_command_start().ok()?;
    let end = event.profiling_command_end().ok()?;
    Some((end.saturating_sub(start)) as f64 / 1_000_000.0)
}

fn log_elapsed(label: &str, event: &Event) {
    if let Some(ms) = event_elapsed_ms(event) {
        debug!(kernel = label, elapsed_ms = ms, "kernel completed");
    }
}
