//! OpenGLDevice - OpenGL 4.3 core implementation of `Device`
//!
//! The application owns the window and the GL context and hands them over
//! as a `PlatformContext`. The device makes that context current, loads the
//! entry points through it and must stay on that thread afterwards.

use std::ffi::CStr;
use std::sync::Arc;
use blaze_rhi::blaze::rhi::{
    Buffer as RhiBuffer, BufferManager as RhiBufferManager, Capabilities, CommandDispatcher,
    ComputePipelineState as RhiComputePipelineState, ComputePipelineStateDesc, Context, DebugSeverity,
    DeviceStatistics, Framebuffer as RhiFramebuffer, FramebufferAttachment,
    GraphicsPipelineState as RhiGraphicsPipelineState, GraphicsPipelineStateDesc, MapType,
    RenderPass as RhiRenderPass, RenderPassDesc, RootSignature as RhiRootSignature, RootSignatureDesc,
    SamplerState as RhiSamplerState, SamplerStateDesc, ShaderLanguage, SwapChain as RhiSwapChain, TextureFormat,
    TextureManager as RhiTextureManager, WindowHandle,
};
use blaze_rhi::blaze::{set_assert_mode, Device, Error, Result};
use blaze_rhi::{rhi_error, rhi_info};
use gl::types::{GLenum, GLuint};

use crate::opengl_buffer::{gl_buffer, BufferManager};
use crate::opengl_context::{get_integer, GlContext};
use crate::opengl_debug::{self, DebugConfig};
use crate::opengl_dispatcher::OpenGLDispatcher;
use crate::opengl_mapping;
use crate::opengl_pipeline_state::{ComputePipelineState, GraphicsPipelineState};
use crate::opengl_render_target::{Framebuffer, RenderPass, SwapChain};
use crate::opengl_root_signature::RootSignature;
use crate::opengl_sampler::SamplerState;
use crate::opengl_shader::{ShaderLanguageGlsl, GLSL_NAME};
use crate::opengl_texture::{TextureLimits, TextureManager};

const SOURCE: &str = "blaze::opengl::Device";

/// Oldest context version the backend runs on (compute, storage buffers, KHR_debug)
pub const MINIMUM_VERSION: (u32, u32) = (4, 3);

const SHADER_LANGUAGE_NAMES: &[&str] = &[GLSL_NAME];

// ============================================================================
// Limits
// ============================================================================

/// `major.minor` at the start of a GL_VERSION string ("4.6.0 NVIDIA 550.54")
pub fn parse_version(version: &str) -> Option<(u32, u32)> {
    let number = version.split_whitespace().find(|word| word.starts_with(|c: char| c.is_ascii_digit()))?;
    let mut parts = number.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.chars().take_while(char::is_ascii_digit).collect::<String>().parse().ok()?;
    Some((major, minor))
}

/// Driver limits the capabilities are derived from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlLimits {
    pub renderer: String,
    pub max_texture_size: i32,
    pub max_3d_texture_size: i32,
    pub max_array_texture_layers: i32,
    pub max_viewports: i32,
    pub max_draw_buffers: i32,
    pub max_color_attachments: i32,
    pub max_texture_buffer_size: i32,
    pub max_shader_storage_block_size: i32,
    pub max_uniform_block_size: i32,
    pub max_samples: i32,
    pub max_anisotropy: f32,
    pub max_patch_vertices: i32,
    pub max_geometry_output_vertices: i32,
}

fn positive(value: i32) -> u32 {
    value.max(0) as u32
}

impl GlLimits {
    /// Query every limit from the current context
    fn query(anisotropic_filtering: bool) -> Self {
        let mut max_anisotropy: f32 = 1.0;
        if anisotropic_filtering {
            unsafe {
                gl::GetFloatv(opengl_mapping::MAX_TEXTURE_MAX_ANISOTROPY, &mut max_anisotropy);
            }
        }
        Self {
            renderer: get_string(gl::RENDERER),
            max_texture_size: get_integer(gl::MAX_TEXTURE_SIZE),
            max_3d_texture_size: get_integer(gl::MAX_3D_TEXTURE_SIZE),
            max_array_texture_layers: get_integer(gl::MAX_ARRAY_TEXTURE_LAYERS),
            max_viewports: get_integer(gl::MAX_VIEWPORTS),
            max_draw_buffers: get_integer(gl::MAX_DRAW_BUFFERS),
            max_color_attachments: get_integer(gl::MAX_COLOR_ATTACHMENTS),
            max_texture_buffer_size: get_integer(gl::MAX_TEXTURE_BUFFER_SIZE),
            max_shader_storage_block_size: get_integer(gl::MAX_SHADER_STORAGE_BLOCK_SIZE),
            max_uniform_block_size: get_integer(gl::MAX_UNIFORM_BLOCK_SIZE),
            max_samples: get_integer(gl::MAX_SAMPLES),
            max_anisotropy: max_anisotropy.max(1.0),
            max_patch_vertices: get_integer(gl::MAX_PATCH_VERTICES),
            max_geometry_output_vertices: get_integer(gl::MAX_GEOMETRY_OUTPUT_VERTICES),
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        let max_array_texture_layers = positive(self.max_array_texture_layers);
        Capabilities {
            device_name: self.renderer.clone(),
            preferred_swap_chain_color_texture_format: TextureFormat::R8G8B8A8,
            preferred_swap_chain_depth_stencil_texture_format: TextureFormat::D32_FLOAT,
            maximum_number_of_viewports: positive(self.max_viewports).max(1),
            maximum_number_of_simultaneous_render_targets: positive(self.max_draw_buffers.min(self.max_color_attachments))
                .clamp(1, 8),
            maximum_texture_dimension: positive(self.max_texture_size),
            maximum_number_of_1d_texture_array_slices: max_array_texture_layers,
            maximum_number_of_2d_texture_array_slices: max_array_texture_layers,
            maximum_number_of_cube_texture_array_slices: max_array_texture_layers / 6,
            // Texels, one byte each at the smallest format
            maximum_texture_buffer_size: positive(self.max_texture_buffer_size),
            maximum_structured_buffer_size: positive(self.max_shader_storage_block_size),
            // Indirect buffers have no dedicated limit
            maximum_indirect_buffer_size: u32::MAX,
            maximum_uniform_buffer_size: positive(self.max_uniform_block_size),
            maximum_number_of_multisamples: positive(self.max_samples).clamp(1, 8) as u8,
            maximum_anisotropy: self.max_anisotropy.clamp(1.0, 16.0) as u8,
            upper_left_origin: false,
            zero_to_one_clip_z: false,
            individual_uniforms: true,
            instanced_arrays: true,
            draw_instanced: true,
            base_vertex: true,
            native_multithreading: false,
            shader_bytecode: false,
            vertex_shader: true,
            maximum_number_of_patch_vertices: positive(self.max_patch_vertices),
            maximum_number_of_geometry_shader_output_vertices: positive(self.max_geometry_output_vertices),
            fragment_shader: true,
            mesh_shader: false,
            compute_shader: true,
        }
    }

    pub fn texture_limits(&self) -> TextureLimits {
        TextureLimits {
            maximum_texture_dimension: positive(self.max_texture_size),
            maximum_3d_texture_dimension: positive(self.max_3d_texture_size),
            maximum_array_slices: positive(self.max_array_texture_layers),
            maximum_number_of_multisamples: positive(self.max_samples).clamp(1, 8) as u8,
        }
    }
}

/// Anisotropic filtering is core from 4.6, an extension before
fn anisotropic_filtering_supported(version: (u32, u32)) -> bool {
    if version >= (4, 6) {
        return true;
    }
    let count = get_integer(gl::NUM_EXTENSIONS).max(0) as GLuint;
    (0..count).any(|index| {
        let extension = unsafe { gl::GetStringi(gl::EXTENSIONS, index) };
        if extension.is_null() {
            return false;
        }
        let extension = unsafe { CStr::from_ptr(extension as *const std::ffi::c_char) };
        matches!(
            extension.to_bytes(),
            b"GL_EXT_texture_filter_anisotropic" | b"GL_ARB_texture_filter_anisotropic"
        )
    })
}

fn get_string(name: GLenum) -> String {
    unsafe {
        let pointer = gl::GetString(name);
        if pointer.is_null() {
            return String::new();
        }
        CStr::from_ptr(pointer as *const std::ffi::c_char).to_string_lossy().into_owned()
    }
}

// ============================================================================
// OpenGLDevice
// ============================================================================

/// OpenGL device
pub struct OpenGLDevice {
    ctx: Arc<GlContext>,
    capabilities: Capabilities,
    texture_limits: TextureLimits,
    shader_language: Arc<ShaderLanguageGlsl>,
    dispatcher: OpenGLDispatcher,
}

impl OpenGLDevice {
    /// Create a device on the context's platform context
    ///
    /// # Arguments
    ///
    /// * `context` - Configuration plus the platform context (required)
    ///
    /// # Errors
    ///
    /// `InitializationFailed` without a platform context, when the context
    /// can't be made current, or when it is older than OpenGL 4.3.
    /// The configured assert mode only takes effect once creation succeeds.
    pub fn new(context: &Context) -> Result<Self> {
        let config = &context.config;

        let Some(platform) = context.platform.clone() else {
            rhi_error!(SOURCE, "The OpenGL backend needs a platform context");
            return Err(Error::InitializationFailed("no platform context".to_string()));
        };
        platform.make_current().map_err(|e| {
            rhi_error!(SOURCE, "Failed to make the OpenGL context current: {}", e);
            Error::InitializationFailed(format!("Failed to make the OpenGL context current: {}", e))
        })?;

        gl::load_with(|symbol| platform.get_proc_address(symbol));
        if !gl::GetString::is_loaded() {
            rhi_error!(SOURCE, "glGetString couldn't be loaded from the platform context");
            return Err(Error::InitializationFailed("OpenGL entry points unavailable".to_string()));
        }

        let version_string = get_string(gl::VERSION);
        let version = match parse_version(&version_string) {
            Some(version) if version >= MINIMUM_VERSION => version,
            _ => {
                rhi_error!(
                    SOURCE,
                    "OpenGL {}.{} required, context reports '{}'",
                    MINIMUM_VERSION.0,
                    MINIMUM_VERSION.1,
                    version_string
                );
                return Err(Error::InitializationFailed(format!("Unsupported OpenGL version '{}'", version_string)));
            }
        };

        if config.enable_validation {
            opengl_debug::install(DebugConfig {
                severity: config.debug_severity,
                panic_on_error: config.panic_on_validation_error,
            });
        }

        let limits = GlLimits::query(anisotropic_filtering_supported(version));
        let ctx = Arc::new(GlContext::new(platform, config.enable_validation, limits.max_anisotropy));
        ctx.check_error("querying limits")?;

        let capabilities = limits.capabilities();
        rhi_info!(
            SOURCE,
            "OpenGL device created: {} ({}) for '{}' {}.{}.{}",
            capabilities.device_name,
            version_string,
            config.app_name,
            config.app_version.0,
            config.app_version.1,
            config.app_version.2
        );
        if config.enable_validation && config.debug_severity == DebugSeverity::All {
            rhi_info!(SOURCE, "Capabilities: {:?}", capabilities);
        }

        // A failed creation leaves the process-wide mode alone
        set_assert_mode(config.assert_mode);
        Ok(Self {
            dispatcher: OpenGLDispatcher::new(Arc::clone(&ctx)),
            shader_language: Arc::new(ShaderLanguageGlsl::new(Arc::clone(&ctx))),
            texture_limits: limits.texture_limits(),
            capabilities,
            ctx,
        })
    }
}

impl Device for OpenGLDevice {
    fn name(&self) -> &str {
        "OpenGL"
    }

    fn is_debug_enabled(&self) -> bool {
        self.ctx.debug_enabled
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn statistics(&self) -> DeviceStatistics {
        self.dispatcher.statistics()
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RhiRenderPass>> {
        Ok(Arc::new(RenderPass::create(desc)?))
    }

    fn create_swap_chain(
        &self,
        render_pass: &Arc<dyn RhiRenderPass>,
        window: WindowHandle,
    ) -> Result<Arc<dyn RhiSwapChain>> {
        Ok(Arc::new(SwapChain::create(Arc::clone(&self.ctx), render_pass, window)?))
    }

    fn create_framebuffer(
        &self,
        render_pass: &Arc<dyn RhiRenderPass>,
        color_attachments: Vec<FramebufferAttachment>,
        depth_stencil_attachment: Option<FramebufferAttachment>,
    ) -> Result<Arc<dyn RhiFramebuffer>> {
        let framebuffer = Framebuffer::create(&self.ctx, render_pass, color_attachments, depth_stencil_attachment)?;
        Ok(Arc::new(framebuffer))
    }

    fn create_buffer_manager(&self) -> Arc<dyn RhiBufferManager> {
        Arc::new(BufferManager::new(Arc::clone(&self.ctx), self.capabilities.maximum_uniform_buffer_size))
    }

    fn create_texture_manager(&self) -> Arc<dyn RhiTextureManager> {
        Arc::new(TextureManager::new(Arc::clone(&self.ctx), self.texture_limits))
    }

    fn create_root_signature(&self, desc: RootSignatureDesc) -> Result<Arc<dyn RhiRootSignature>> {
        Ok(Arc::new(RootSignature::create(&self.ctx, desc)?))
    }

    fn create_graphics_pipeline_state(
        &self,
        desc: GraphicsPipelineStateDesc,
    ) -> Result<Arc<dyn RhiGraphicsPipelineState>> {
        Ok(Arc::new(GraphicsPipelineState::create(desc)?))
    }

    fn create_compute_pipeline_state(
        &self,
        desc: ComputePipelineStateDesc,
    ) -> Result<Arc<dyn RhiComputePipelineState>> {
        Ok(Arc::new(ComputePipelineState::create(&self.ctx, desc)?))
    }

    fn create_sampler_state(&self, desc: &SamplerStateDesc) -> Result<Arc<dyn RhiSamplerState>> {
        Ok(Arc::new(SamplerState::create(&self.ctx, desc)?))
    }

    fn shader_language_names(&self) -> &[&'static str] {
        SHADER_LANGUAGE_NAMES
    }

    fn shader_language(&self, name: Option<&str>) -> Result<Arc<dyn ShaderLanguage>> {
        match name {
            None | Some(GLSL_NAME) => Ok(self.shader_language.clone()),
            Some(other) => Err(Error::Unsupported(format!("shader language '{}' (OpenGL only has GLSL)", other))),
        }
    }

    fn map_buffer(&self, buffer: &Arc<dyn RhiBuffer>, map_type: MapType, f: &mut dyn FnMut(&mut [u8])) -> Result<()> {
        gl_buffer(buffer.as_ref())?.map(map_type, f)
    }

    fn flush(&self) -> Result<()> {
        unsafe {
            gl::Flush();
        }
        opengl_debug::check_validation_errors();
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        unsafe {
            gl::Finish();
        }
        opengl_debug::check_validation_errors();
        self.ctx.check_error("finishing")
    }

    fn dispatcher(&mut self) -> &mut dyn CommandDispatcher {
        &mut self.dispatcher
    }
}

#[cfg(test)]
#[path = "opengl_device_tests.rs"]
mod tests;
