/// Device trait - the aggregate root of a backend

use std::ffi::c_void;
use std::sync::Arc;
use crate::assert::AssertMode;
use crate::error::Result;
use crate::rhi::{
    Buffer, BufferManager, Capabilities, CommandDispatcher, ComputePipelineState,
    ComputePipelineStateDesc, Framebuffer, FramebufferAttachment, GraphicsPipelineState,
    GraphicsPipelineStateDesc, RenderPass, RenderPassDesc, RootSignature, RootSignatureDesc,
    SamplerState, SamplerStateDesc, ShaderLanguage, SwapChain, TextureManager, WindowHandle,
};

// ============================================================================
// Configuration
// ============================================================================

/// Which driver validation messages are forwarded to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    /// Errors, warnings, performance and info messages
    All,
}

/// Device configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable driver validation / debug output
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Driver messages forwarded to the log
    pub debug_severity: DebugSeverity,
    /// Panic when the driver reports an error (validation builds only)
    pub panic_on_validation_error: bool,
    /// Contract-violation handling applied on the thread creating the device
    pub assert_mode: AssertMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Blaze Application".to_string(),
            app_version: (1, 0, 0),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            panic_on_validation_error: false,
            assert_mode: AssertMode::default(),
        }
    }
}

/// Window-system collaborator owning the native graphics context
///
/// Supplied by the application (SDL, winit + glutin, ...). The OpenGL backend
/// uses it to load entry points and present.
pub trait PlatformContext: Send + Sync {
    /// Address of a driver entry point, null if unavailable
    fn get_proc_address(&self, name: &str) -> *const c_void;

    /// Make the context current on the calling thread
    fn make_current(&self) -> Result<()>;

    fn swap_buffers(&self) -> Result<()>;

    /// Drawable size in pixels
    fn drawable_size(&self) -> (u32, u32);

    fn set_swap_interval(&self, interval: u32) -> Result<()>;
}

/// Everything a backend needs to initialize a device
#[derive(Clone, Default)]
pub struct Context {
    pub config: Config,
    pub platform: Option<Arc<dyn PlatformContext>>,
}

impl Context {
    pub fn new(config: Config) -> Self {
        Self { config, platform: None }
    }

    pub fn with_platform(mut self, platform: Arc<dyn PlatformContext>) -> Self {
        self.platform = Some(platform);
        self
    }
}

// ============================================================================
// Statistics / mapping
// ============================================================================

/// Counters updated while dispatching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStatistics {
    /// Draw calls issued (indirect multi-draws count once per record)
    pub draw_calls: u64,
    /// Compute dispatches issued
    pub dispatch_calls: u64,
    /// Commands walked, nested command buffers included
    pub commands_dispatched: u64,
}

/// Buffer mapping access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapType {
    Read,
    Write,
    ReadWrite,
    /// Previous content is discarded
    WriteDiscard,
    /// Caller promises not to overwrite data the GPU may still read
    WriteNoOverwrite,
}

// ============================================================================
// Device trait
// ============================================================================

/// Backend device
///
/// Owns capability queries, creates every resource kind and dispatches
/// command buffers. A device is driven from the thread owning its context.
pub trait Device {
    /// Backend name (e.g. "OpenGL")
    fn name(&self) -> &str;

    /// Validation / debug output enabled
    fn is_debug_enabled(&self) -> bool;

    fn capabilities(&self) -> &Capabilities;

    fn statistics(&self) -> DeviceStatistics;

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>>;

    fn create_swap_chain(&self, render_pass: &Arc<dyn RenderPass>, window: WindowHandle) -> Result<Arc<dyn SwapChain>>;

    fn create_framebuffer(
        &self,
        render_pass: &Arc<dyn RenderPass>,
        color_attachments: Vec<FramebufferAttachment>,
        depth_stencil_attachment: Option<FramebufferAttachment>,
    ) -> Result<Arc<dyn Framebuffer>>;

    fn create_buffer_manager(&self) -> Arc<dyn BufferManager>;

    fn create_texture_manager(&self) -> Arc<dyn TextureManager>;

    fn create_root_signature(&self, desc: RootSignatureDesc) -> Result<Arc<dyn RootSignature>>;

    /// May compile and link shader programs; fails instead of returning a dead pipeline state
    fn create_graphics_pipeline_state(&self, desc: GraphicsPipelineStateDesc) -> Result<Arc<dyn GraphicsPipelineState>>;

    fn create_compute_pipeline_state(&self, desc: ComputePipelineStateDesc) -> Result<Arc<dyn ComputePipelineState>>;

    fn create_sampler_state(&self, desc: &SamplerStateDesc) -> Result<Arc<dyn SamplerState>>;

    /// Names of the supported shader languages, default first
    fn shader_language_names(&self) -> &[&'static str];

    /// Shader language by name (None = default language)
    fn shader_language(&self, name: Option<&str>) -> Result<Arc<dyn ShaderLanguage>>;

    /// Map a buffer, run `f` on its bytes, unmap
    ///
    /// Blocks until the GPU releases the buffer.
    fn map_buffer(&self, buffer: &Arc<dyn Buffer>, map_type: MapType, f: &mut dyn FnMut(&mut [u8])) -> Result<()>;

    /// Submit pending native commands
    fn flush(&self) -> Result<()>;

    /// Wait until the GPU finished all submitted work
    fn finish(&self) -> Result<()>;

    /// Dispatcher command buffers are walked against
    fn dispatcher(&mut self) -> &mut dyn CommandDispatcher;
}
