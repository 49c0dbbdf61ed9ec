//! Execution context: one device, one context, one command queue.

use opencl3::command_queue::{
    CommandQueue, CL_QUEUE_OUT_OF_ORDER_EXEC_MODE_ENABLE, CL_QUEUE_PROFILING_ENABLE,
};
use opencl3::context::Context;
use tracing::debug;

use crate::device::ComputeDevice;
use crate::{ComputeError, ComputeResult};

/// Owns an OpenCL context and command queue bound to one device.
///
/// The queue is created out-of-order with profiling timestamps, so
/// independent submissions may be reordered by the device scheduler;
/// per-call ordering is enforced by waiting on the kernel's event
/// before the blocking readback, never by queue order.
///
/// Teardown consumes the value, which makes use-after-teardown a
/// compile error instead of a runtime precondition on the caller.
pub struct ExecutionContext {
    // Queue before context: struct fields drop in declaration order, so
    // the queue handle is released while its owning context still exists.
    queue: CommandQueue,
    context: Context,
    device: ComputeDevice,
}

// SAFETY: OpenCL 1.2+ guarantees thread safety for context and command
// queue objects; the wrapped values are opaque handles into the runtime,
// which serializes access internally.
unsafe impl Send for ExecutionContext {}
unsafe impl Sync for ExecutionContext {}

impl ExecutionContext {
    /// Build a context scoped to `device`, then an out-of-order
    /// profiling-enabled command queue on it.
    pub fn create(device: ComputeDevice) -> ComputeResult<Self> {
        let context = Context::from_device(device.cl_device()).map_err(|status| {
            ComputeError::Api {
                call: "clCreateContext",
                status,
            }
        })?;

        // The OpenCL 1.2 queue API: out-of-order execution plus
        // profiling timestamps, matching what the transform service
        // logs per dispatch.
        #[allow(deprecated)]
        let queue = CommandQueue::create_default(
            &context,
            CL_QUEUE_OUT_OF_ORDER_EXEC_MODE_ENABLE | CL_QUEUE_PROFILING_ENABLE,
        )
        .map_err(|status| ComputeError::Api {
            call: "clCreateCommandQueue",
            status,
        })?;

        debug!(device = %device.name(), "created execution context");
        Ok(Self {
            queue,
            context,
            device,
        })
    }

    /// The device this context is bound to.
    pub fn device(&self) -> &ComputeDevice {
        &self.device
    }

    /// The underlying `opencl3` context.
    pub fn cl_context(&self) -> &Context {
        &self.context
    }

    /// The command queue all work for this context is issued through.
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Release the queue, then the context.
    ///
    /// Consuming `self` means no operation can be issued afterwards.
    pub fn teardown(self) {
        debug!(device = %self.device.name(), "tearing down execution context");
        let Self {
            queue,
            context,
            device,
        } = self;
        drop(queue);
        drop(context);
        drop(device);
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::select_device;

    #[test]
    #[ignore = "requires an OpenCL device"]
    fn test_create_and_teardown() {
        let device = select_device().unwrap();
        let ctx = ExecutionContext::create(device).unwrap();
        assert!(!ctx.device().name().is_empty());
        ctx.teardown();
        // `ctx` is consumed: any further use fails to compile.
    }
}
