//! Device-resident 2D pixel surfaces.
//!
//! Both directions use the same fixed format: RGBA, 8 bits per
//! channel, matching the packed `u32` layout of
//! [`PixelImage`](oclpix_core::PixelImage) so no repacking happens on
//! either side of the transfer.

use std::ffi::c_void;
use std::ptr;

use opencl3::command_queue::CommandQueue;
use opencl3::memory::{
    cl_image_desc, cl_image_format, Image, CL_MEM_COPY_HOST_PTR, CL_MEM_OBJECT_IMAGE2D,
    CL_MEM_READ_ONLY, CL_MEM_WRITE_ONLY, CL_RGBA, CL_UNSIGNED_INT8,
};
use opencl3::types::CL_BLOCKING;
use oclpix_core::PixelImage;
use tracing::trace;

use crate::context::ExecutionContext;
use crate::{ComputeError, ComputeResult};

/// Access mode a [`DeviceImage`] was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAccess {
    /// Host → device input, pre-populated with host pixel data.
    ReadOnly,
    /// Device → host output, populated by a kernel.
    WriteOnly,
}

impl std::fmt::Display for ImageAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageAccess::ReadOnly => write!(f, "read-only"),
            ImageAccess::WriteOnly => write!(f, "write-only"),
        }
    }
}

/// A device-resident 2D RGBA8 image.
///
/// Created per transform call and dropped before the call returns;
/// never shared across calls. The underlying handle is released on
/// drop, on success and failure paths alike.
pub struct DeviceImage {
    mem: Image,
    width: u32,
    height: u32,
    access: ImageAccess,
}

const BYTES_PER_PIXEL: usize = std::mem::size_of::<u32>();

fn rgba8_format() -> cl_image_format {
    cl_image_format {
        image_channel_order: CL_RGBA,
        image_channel_data_type: CL_UNSIGNED_INT8,
    }
}

fn image2d_desc(width: u32, height: u32) -> cl_image_desc {
    cl_image_desc {
        image_type: CL_MEM_OBJECT_IMAGE2D,
        image_width: width as usize,
        image_height: height as usize,
        image_depth: 1,
        image_array_size: 1,
        image_row_pitch: 0,
        image_slice_pitch: 0,
        num_mip_levels: 0,
        num_samples: 0,
        buffer: ptr::null_mut(),
    }
}

impl DeviceImage {
    /// Copy a host pixel buffer into a new read-only device image.
    ///
    /// The device contents are byte-identical to the host buffer at the
    /// time of the call; whether the runtime copies or aliases is its
    /// own business.
    pub fn upload_read_only(ctx: &ExecutionContext, image: &PixelImage) -> ComputeResult<Self> {
        let (width, height) = image.dimensions();
        Self::create(
            ctx,
            width,
            height,
            ImageAccess::ReadOnly,
            CL_MEM_READ_ONLY | CL_MEM_COPY_HOST_PTR,
            image.data().as_ptr() as *mut c_void,
        )
    }

    /// Allocate an uninitialized write-only device image.
    ///
    /// Its content is only well-defined after a kernel writes it and a
    /// readback occurs.
    pub fn allocate_writable(ctx: &ExecutionContext, width: u32, height: u32) -> ComputeResult<Self> {
        Self::create(
            ctx,
            width,
            height,
            ImageAccess::WriteOnly,
            CL_MEM_WRITE_ONLY,
            ptr::null_mut(),
        )
    }

    fn create(
        ctx: &ExecutionContext,
        width: u32,
        height: u32,
        access: ImageAccess,
        flags: opencl3::memory::cl_mem_flags,
        host_ptr: *mut c_void,
    ) -> ComputeResult<Self> {
        let refuse = |status| ComputeError::DeviceImageCreate {
            width,
            height,
            access,
            status,
        };

        // Host-side validation: the driver would reject these anyway,
        // but with an opaque status code instead of the requested extent.
        if width == 0 || height == 0 {
            return Err(refuse(None));
        }
        let device = ctx.device();
        if width as usize > device.max_image2d_width()
            || height as usize > device.max_image2d_height()
        {
            return Err(refuse(None));
        }

        let format = rgba8_format();
        let desc = image2d_desc(width, height);
        let mem = unsafe {
            Image::create(ctx.cl_context(), flags, &format, &desc, host_ptr)
                .map_err(|status| refuse(Some(status)))?
        };

        trace!(width, height, %access, "created device image");
        Ok(Self {
            mem,
            width,
            height,
            access,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Access mode this image was created with.
    pub fn access(&self) -> ImageAccess {
        self.access
    }

    /// The underlying memory object, for kernel argument binding.
    pub(crate) fn mem(&self) -> &Image {
        &self.mem
    }

    /// Blocking read of the whole image into a fresh host buffer.
    ///
    /// Waits for all previously submitted work on `queue` that the
    /// image depends on (the caller has already waited on the kernel's
    /// event), then copies the pixels out.
    pub(crate) fn read_back(&mut self, queue: &CommandQueue) -> ComputeResult<Vec<u32>> {
        let len = (self.width as usize) * (self.height as usize);
        let mut pixels = vec![0u32; len];

        let origin = [0usize, 0, 0];
        let region = [self.width as usize, self.height as usize, 1];
        let row_pitch = self.width as usize * BYTES_PER_PIXEL;

        let event = unsafe {
            queue
                .enqueue_read_image(
                    &mut self.mem,
                    CL_BLOCKING,
                    origin.as_ptr(),
                    region.as_ptr(),
                    row_pitch,
                    0,
                    pixels.as_mut_ptr() as *mut c_void,
                    &[],
                )
                .map_err(ComputeError::Readback)?
        };
        event.wait().map_err(ComputeError::Readback)?;

        Ok(pixels)
    }
}

impl std::fmt::Debug for DeviceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::select_device;

    #[test]
    fn test_access_display() {
        assert_eq!(ImageAccess::ReadOnly.to_string(), "read-only");
        assert_eq!(ImageAccess::WriteOnly.to_string(), "write-only");
    }

    #[test]
    #[ignore = "requires an OpenCL device"]
    fn test_zero_extent_is_refused() {
        let ctx = ExecutionContext::create(select_device().unwrap()).unwrap();
        let err = DeviceImage::allocate_writable(&ctx, 0, 64).unwrap_err();
        assert!(matches!(
            err,
            ComputeError::DeviceImageCreate {
                width: 0,
                height: 64,
                ..
            }
        ));
        ctx.teardown();
    }

    #[test]
    #[ignore = "requires an OpenCL device"]
    fn test_oversize_extent_is_refused() {
        let ctx = ExecutionContext::create(select_device().unwrap()).unwrap();
        let too_wide = ctx.device().max_image2d_width() as u32 + 1;
        let err = DeviceImage::allocate_writable(&ctx, too_wide, 64).unwrap_err();
        assert!(matches!(err, ComputeError::DeviceImageCreate { .. }));
        ctx.teardown();
    }

    #[test]
    #[ignore = "requires an OpenCL device"]
    fn test_upload_and_read_back() {
        use oclpix_core::PixelImage;

        let ctx = ExecutionContext::create(select_device().unwrap()).unwrap();
        let mut host = PixelImage::new(8, 4);
        host.put_pixel(3, 2, 0x11223344);

        // Read-only images can still be read back by the host.
        let mut dev = DeviceImage::upload_read_only(&ctx, &host).unwrap();
        let pixels = dev.read_back(ctx.queue()).unwrap();
        assert_eq!(pixels, host.data());

        drop(dev);
        ctx.teardown();
    }
}
