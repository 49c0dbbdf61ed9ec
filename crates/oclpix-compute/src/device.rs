//! OpenCL platform enumeration and device selection.
//!
//! Selection is deliberately simple: first platform, first GPU-class
//! device on it. No load balancing, no capability scoring. Callers
//! that need guarantees (2D image support, maximum image extent) read
//! them off the returned [`ComputeDevice`] before relying on them;
//! [`select_device_where`] exists for anyone who wants to filter
//! during selection instead.

use opencl3::device::{Device, CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_GPU};
use opencl3::platform::get_platforms;
use opencl3::types::cl_device_type;
use tracing::{debug, info};

use crate::{ComputeError, ComputeResult};

/// A selected compute device with its capability queries cached.
///
/// Created once at service startup and owned by the
/// [`ExecutionContext`](crate::ExecutionContext) for its whole life.
pub struct ComputeDevice {
    device: Device,
    name: String,
    vendor: String,
    image_support: bool,
    max_image2d_width: usize,
    max_image2d_height: usize,
    max_work_group_size: usize,
}

impl ComputeDevice {
    fn from_raw(device: Device) -> Self {
        let name = device.name().unwrap_or_default().trim().to_string();
        let vendor = device.vendor().unwrap_or_default().trim().to_string();
        let image_support = device.image_support().unwrap_or(false);
        let max_image2d_width = device.image2d_max_width().unwrap_or(0);
        let max_image2d_height = device.image2d_max_height().unwrap_or(0);
        let max_work_group_size = device.max_work_group_size().unwrap_or(1);
        Self {
            device,
            name,
            vendor,
            image_support,
            max_image2d_width,
            max_image2d_height,
            max_work_group_size,
        }
    }

    /// Human-readable device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Device vendor string.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Whether the device supports 2D image objects at all.
    pub fn has_image_support(&self) -> bool {
        self.image_support
    }

    /// Maximum supported 2D image width in pixels.
    pub fn max_image2d_width(&self) -> usize {
        self.max_image2d_width
    }

    /// Maximum supported 2D image height in pixels.
    pub fn max_image2d_height(&self) -> usize {
        self.max_image2d_height
    }

    /// Maximum work-group size for kernel dispatches.
    pub fn max_work_group_size(&self) -> usize {
        self.max_work_group_size
    }

    /// The underlying `opencl3` device handle.
    pub fn cl_device(&self) -> &Device {
        &self.device
    }
}

impl std::fmt::Debug for ComputeDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeDevice")
            .field("name", &self.name)
            .field("vendor", &self.vendor)
            .field("image_support", &self.image_support)
            .field(
                "max_image2d",
                &(self.max_image2d_width, self.max_image2d_height),
            )
            .finish_non_exhaustive()
    }
}

/// Select the first GPU device on the first platform.
///
/// # Errors
///
/// [`ComputeError::NoPlatform`] when no OpenCL runtime is visible,
/// [`ComputeError::NoDevice`] when the first platform has no GPU-class
/// device.
pub fn select_device() -> ComputeResult<ComputeDevice> {
    select_device_where(|_| true)
}

/// Select the first GPU device on the first platform that satisfies
/// `accept`.
///
/// The default policy ([`select_device`]) accepts everything; this is
/// the seam for callers that want to require e.g. image support:
///
/// ```no_run
/// use oclpix_compute::select_device_where;
///
/// let device = select_device_where(|d| d.has_image_support())?;
/// # Ok::<(), oclpix_compute::ComputeError>(())
/// ```
pub fn select_device_where(
    accept: impl Fn(&ComputeDevice) -> bool,
) -> ComputeResult<ComputeDevice> {
    let platforms = get_platforms().map_err(|_| ComputeError::NoPlatform)?;
    let platform = platforms.into_iter().next().ok_or(ComputeError::NoPlatform)?;
    let platform_name = platform.name().unwrap_or_default();
    debug!(platform = %platform_name, "probing first OpenCL platform");

    let ids = platform
        .get_devices(CL_DEVICE_TYPE_GPU)
        .unwrap_or_default();
    for id in ids {
        let device = ComputeDevice::from_raw(Device::new(id));
        if accept(&device) {
            info!(
                device = %device.name(),
                vendor = %device.vendor(),
                image_support = device.has_image_support(),
                "selected OpenCL device"
            );
            return Ok(device);
        }
    }

    Err(ComputeError::NoDevice {
        platform: platform_name,
    })
}

/// Diagnostic summary of one discovered platform/device pair.
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    /// Platform the device belongs to.
    pub platform: String,
    /// Device name.
    pub name: String,
    /// Device vendor.
    pub vendor: String,
    /// Whether this is a GPU-class device.
    pub is_gpu: bool,
    /// Maximum 2D image extent as `(width, height)`, zero when images
    /// are unsupported.
    pub max_image2d: (usize, usize),
    /// Global memory size in bytes.
    pub global_mem_size: u64,
}

/// Probe every platform and device without selecting anything.
///
/// Never errors: returns an empty vec when no OpenCL runtime is
/// installed. Intended for diagnostics and logging, not selection.
pub fn probe_devices() -> Vec<DeviceSummary> {
    let platforms = match get_platforms() {
        Ok(platforms) => platforms,
        Err(_) => return Vec::new(),
    };

    let mut summaries = Vec::new();
    for platform in platforms {
        let platform_name = platform.name().unwrap_or_default();
        let ids = platform
            .get_devices(CL_DEVICE_TYPE_ALL)
            .unwrap_or_default();
        for id in ids {
            let device = Device::new(id);
            let dev_type: cl_device_type = device.dev_type().unwrap_or(0);
            summaries.push(DeviceSummary {
                platform: platform_name.clone(),
                name: device.name().unwrap_or_default().trim().to_string(),
                vendor: device.vendor().unwrap_or_default().trim().to_string(),
                is_gpu: (dev_type & CL_DEVICE_TYPE_GPU) != 0,
                max_image2d: (
                    device.image2d_max_width().unwrap_or(0),
                    device.image2d_max_height().unwrap_or(0),
                ),
                global_mem_size: device.global_mem_size().unwrap_or(0),
            });
        }
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    // Probing must degrade gracefully on machines without a driver.
    #[test]
    fn test_probe_devices_never_panics() {
        let summaries = probe_devices();
        for s in &summaries {
            assert!(!s.platform.is_empty() || !s.name.is_empty());
        }
    }

    #[test]
    #[ignore = "requires an OpenCL device"]
    fn test_select_first_device() {
        let device = select_device().expect("an OpenCL GPU should be present");
        assert!(!device.name().is_empty());
        assert!(device.max_work_group_size() >= 1);
    }

    #[test]
    #[ignore = "requires an OpenCL device"]
    fn test_select_with_predicate() {
        let device =
            select_device_where(|d| d.has_image_support()).expect("a device with image support");
        assert!(device.has_image_support());
        assert!(device.max_image2d_width() > 0);
        assert!(device.max_image2d_height() > 0);
    }
}
