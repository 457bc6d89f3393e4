/*!
# Blaze RHI - OpenGL Backend

OpenGL 4.3 core implementation of the `blaze_rhi` device traits.

The application creates the window and the GL context and passes them in as a
`PlatformContext`. The backend can be linked statically and added to a
`DeviceRegistry` with [`register`], or built as `librhi_opengl` and loaded at
runtime through its `create_rhi_device_instance` entry point.
*/

// Device and driver plumbing
mod opengl_context;
mod opengl_debug;
mod opengl_device;
mod opengl_mapping;

// Resources
mod opengl_buffer;
mod opengl_texture;
mod opengl_sampler;
mod opengl_render_target;
mod opengl_root_signature;
mod opengl_shader;
mod opengl_pipeline_state;

// Command execution
mod opengl_dispatcher;

use blaze_rhi::backend::{DeviceInstance, DeviceRegistry};
use blaze_rhi::blaze::rhi::Context;
use blaze_rhi::rhi_error;

pub use opengl_device::{OpenGLDevice, MINIMUM_VERSION};

// Re-export debug utilities
pub use opengl_debug::{get_validation_stats, print_validation_stats_report, reset_validation_stats, ValidationStats};

/// Name the backend registers under
pub const BACKEND_NAME: &str = "opengl";

/// Register the OpenGL backend
///
/// # Example
///
/// ```no_run
/// use blaze_rhi::blaze::DeviceRegistry;
/// use blaze_rhi::blaze::rhi::{Config, Context};
///
/// # fn platform() -> std::sync::Arc<dyn blaze_rhi::blaze::rhi::PlatformContext> { unimplemented!() }
/// let mut registry = DeviceRegistry::new();
/// rhi_opengl::register(&mut registry);
///
/// let context = Context::new(Config::default()).with_platform(platform());
/// let device = registry.create_device("opengl", &context)?;
/// # Ok::<(), blaze_rhi::blaze::Error>(())
/// ```
pub fn register(registry: &mut DeviceRegistry) {
    registry.register_backend(BACKEND_NAME, |context| {
        let device: Box<dyn blaze_rhi::blaze::Device> = Box::new(OpenGLDevice::new(context)?);
        Ok(device)
    });
}

/// Shared library entry point
///
/// Returns null when `context` is null or device creation fails.
///
/// # Safety
///
/// `context` must be null or point to a live `Context` built against the
/// same `blaze_rhi` version as this library.
#[no_mangle]
#[allow(improper_ctypes_definitions)]
pub unsafe extern "C" fn create_rhi_device_instance(context: *const Context) -> *mut DeviceInstance {
    let Some(context) = context.as_ref() else {
        rhi_error!("blaze::opengl", "create_rhi_device_instance called without a context");
        return std::ptr::null_mut();
    };
    match OpenGLDevice::new(context) {
        Ok(device) => DeviceInstance::into_raw(Box::new(device)),
        Err(e) => {
            rhi_error!("blaze::opengl", "Failed to create OpenGL device: {}", e);
            std::ptr::null_mut()
        }
    }
}
