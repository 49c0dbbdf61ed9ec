//! Kernel source compilation.

use opencl3::kernel::Kernel;
use opencl3::program::Program;
use tracing::debug;

use crate::context::ExecutionContext;
use crate::{ComputeError, ComputeResult};

/// A compiled kernel program bound to an execution context.
///
/// Built once at service construction, never rebuilt. The program is
/// reusable across calls and across threads; only the kernel
/// *instances* created from it per call are thread-local.
pub struct CompiledProgram {
    program: Program,
}

// SAFETY: OpenCL program objects are thread-safe per the OpenCL 1.2
// specification; only cl_kernel instances carry mutable argument state.
unsafe impl Send for CompiledProgram {}
unsafe impl Sync for CompiledProgram {}

impl CompiledProgram {
    /// Compile `source` for the context's device. Synchronous and
    /// blocking.
    ///
    /// On a compilation failure the returned
    /// [`ComputeError::KernelBuild`] carries the device compiler's
    /// build log verbatim.
    pub fn build(ctx: &ExecutionContext, source: &str) -> ComputeResult<Self> {
        let program = Program::create_and_build_from_source(ctx.cl_context(), source, "")
            .map_err(|log| ComputeError::KernelBuild { log })?;
        debug!(bytes = source.len(), "built kernel program");
        Ok(Self { program })
    }

    /// Instantiate the named entry point.
    ///
    /// Kernel instances hold argument state and must not be shared
    /// across threads; each call creates, uses, and drops its own.
    pub fn entry_point(&self, name: &str) -> ComputeResult<Kernel> {
        Kernel::create(&self.program, name).map_err(|status| ComputeError::EntryPoint {
            name: name.to_string(),
            status,
        })
    }
}

impl std::fmt::Debug for CompiledProgram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledProgram").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::select_device;

    const TRIVIAL_KERNEL: &str = r#"
        __kernel void noop(__global uint* data) {
            data[get_global_id(0)] = get_global_id(0);
        }
    "#;

    #[test]
    #[ignore = "requires an OpenCL device"]
    fn test_build_and_entry_point() {
        let ctx = ExecutionContext::create(select_device().unwrap()).unwrap();
        let program = CompiledProgram::build(&ctx, TRIVIAL_KERNEL).unwrap();

        assert!(program.entry_point("noop").is_ok());
        assert!(matches!(
            program.entry_point("missing"),
            Err(ComputeError::EntryPoint { .. })
        ));

        drop(program);
        ctx.teardown();
    }

    #[test]
    #[ignore = "requires an OpenCL device"]
    fn test_build_failure_carries_log() {
        let ctx = ExecutionContext::create(select_device().unwrap()).unwrap();
        let err = CompiledProgram::build(&ctx, "__kernel void broken( {").unwrap_err();
        match err {
            ComputeError::KernelBuild { log } => assert!(!log.is_empty()),
            other => panic!("expected KernelBuild, got {other:?}"),
        }
        ctx.teardown();
    }
}
