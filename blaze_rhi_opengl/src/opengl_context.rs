/// GlContext - State shared by every OpenGL resource
///
/// Each resource keeps an `Arc<GlContext>` so it can label itself for debug
/// tools and reach the platform context. GL names are only valid on the
/// thread the platform context is current on; resources must be dropped
/// there too.

use std::ffi::CString;
use std::sync::Arc;
use blaze_rhi::blaze::rhi::PlatformContext;
use blaze_rhi::blaze::{Error, Result};
use gl::types::{GLenum, GLint, GLsizei, GLuint};

pub struct GlContext {
    /// Window-system context the GL entry points were loaded from
    pub(crate) platform: Arc<dyn PlatformContext>,

    /// Validation requested at device creation
    pub(crate) debug_enabled: bool,

    /// Largest anisotropy the driver accepts (1.0 when unsupported)
    pub(crate) max_anisotropy: f32,
}

impl GlContext {
    pub fn new(platform: Arc<dyn PlatformContext>, debug_enabled: bool, max_anisotropy: f32) -> Self {
        Self {
            platform,
            debug_enabled,
            max_anisotropy,
        }
    }

    /// Attach a debug name to a GL object (KHR_debug object label)
    ///
    /// Only done with validation on; names show up in RenderDoc and in driver messages.
    pub(crate) fn label(&self, identifier: GLenum, name: GLuint, debug_name: &str) {
        if !self.debug_enabled || debug_name.is_empty() || !gl::ObjectLabel::is_loaded() {
            return;
        }
        if let Ok(label) = CString::new(debug_name) {
            unsafe {
                gl::ObjectLabel(identifier, name, debug_name.len() as GLsizei, label.as_ptr());
            }
        }
    }

    /// Drain the GL error flags and turn the first one into an error
    pub(crate) fn check_error(&self, what: &str) -> Result<()> {
        let mut first = gl::NO_ERROR;
        loop {
            let error = unsafe { gl::GetError() };
            if error == gl::NO_ERROR {
                break;
            }
            if first == gl::NO_ERROR {
                first = error;
            }
        }
        match first {
            gl::NO_ERROR => Ok(()),
            gl::OUT_OF_MEMORY => Err(Error::OutOfMemory),
            error => Err(blaze_rhi::rhi_err!(
                "blaze::opengl",
                "{} failed: {} (0x{:04X})",
                what,
                error_name(error),
                error
            )),
        }
    }
}

/// Readable name of a glGetError code
pub(crate) fn error_name(error: GLenum) -> &'static str {
    match error {
        gl::INVALID_ENUM => "GL_INVALID_ENUM",
        gl::INVALID_VALUE => "GL_INVALID_VALUE",
        gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
        gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        _ => "unknown GL error",
    }
}

/// glGetIntegerv for a single value
pub(crate) fn get_integer(pname: GLenum) -> GLint {
    let mut value: GLint = 0;
    unsafe {
        gl::GetIntegerv(pname, &mut value);
    }
    value
}

/// Name bound to a binding point (glGet of `*_BINDING`)
pub(crate) fn get_binding(binding: GLenum) -> GLuint {
    get_integer(binding) as GLuint
}
