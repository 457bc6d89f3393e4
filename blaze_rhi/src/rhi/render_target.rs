/// Render pass, swap chain and framebuffer: everything draws can be routed to

use std::sync::Arc;
use crate::error::Result;
use crate::rhi::resource::same_object;
use crate::rhi::{Resource, Texture, TextureFlags, TextureFormat};
use crate::{rhi_assert, rhi_violation};

const SOURCE: &str = "blaze::rhi::RenderTarget";

/// Maximum simultaneously bound color attachments
pub const MAX_NUMBER_OF_COLOR_ATTACHMENTS: usize = 8;

// ===== RENDER PASS =====

/// Attachment formats a render target (and compatible pipeline states) use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPassDesc {
    pub color_attachment_formats: Vec<TextureFormat>,
    pub depth_stencil_attachment_format: Option<TextureFormat>,
    pub number_of_multisamples: u8,
}

impl RenderPassDesc {
    pub fn new(color_attachment_formats: Vec<TextureFormat>, depth_stencil_attachment_format: Option<TextureFormat>) -> Self {
        Self {
            color_attachment_formats,
            depth_stencil_attachment_format,
            number_of_multisamples: 1,
        }
    }

    pub fn with_multisamples(mut self, number_of_multisamples: u8) -> Self {
        self.number_of_multisamples = number_of_multisamples;
        self
    }

    pub fn number_of_color_attachments(&self) -> usize {
        self.color_attachment_formats.len()
    }

    pub fn validate(&self) -> Result<()> {
        rhi_assert!(
            self.color_attachment_formats.len() <= MAX_NUMBER_OF_COLOR_ATTACHMENTS,
            SOURCE,
            "render pass has {} color attachments, maximum is {}",
            self.color_attachment_formats.len(),
            MAX_NUMBER_OF_COLOR_ATTACHMENTS
        );
        for (index, format) in self.color_attachment_formats.iter().enumerate() {
            rhi_assert!(
                !format.is_depth() && !format.is_compressed() && *format != TextureFormat::Unknown,
                SOURCE,
                "color attachment {} can't use format {:?}",
                index,
                format
            );
        }
        if let Some(format) = self.depth_stencil_attachment_format {
            rhi_assert!(format.is_depth(), SOURCE, "depth stencil attachment can't use format {:?}", format);
        }
        rhi_assert!(
            matches!(self.number_of_multisamples, 1 | 2 | 4 | 8),
            SOURCE,
            "invalid number of multisamples {}",
            self.number_of_multisamples
        );
        Ok(())
    }
}

/// Render pass resource
pub trait RenderPass: Resource {
    fn desc(&self) -> &RenderPassDesc;
}

// ===== SWAP CHAIN =====

/// Native window the swap chain presents to (HWND, X11 window, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowHandle {
    pub native_window_handle: usize,
}

/// Presentable surface chain of a window
pub trait SwapChain: Resource {
    fn render_pass(&self) -> &Arc<dyn RenderPass>;

    /// Current back buffer size in pixels
    fn width_and_height(&self) -> (u32, u32);

    /// Present the back buffer
    fn present(&self) -> Result<()>;

    /// Re-query the window size after a resize
    fn resize_buffers(&self) -> Result<()>;

    /// 0 = no vertical synchronization, n = wait for n vertical blanks
    fn set_vertical_synchronization_interval(&self, interval: u32) -> Result<()>;
}

// ===== FRAMEBUFFER =====

/// One framebuffer attachment: a texture mip level and layer
#[derive(Clone)]
pub struct FramebufferAttachment {
    pub texture: Arc<dyn Texture>,
    pub mipmap_index: u32,
    /// Array slice, cube face or 3D slice
    pub layer_index: u32,
}

impl FramebufferAttachment {
    pub fn new(texture: Arc<dyn Texture>) -> Self {
        Self { texture, mipmap_index: 0, layer_index: 0 }
    }

    pub fn with_mipmap_index(mut self, mipmap_index: u32) -> Self {
        self.mipmap_index = mipmap_index;
        self
    }

    pub fn with_layer_index(mut self, layer_index: u32) -> Self {
        self.layer_index = layer_index;
        self
    }

    /// Attachment size in pixels
    pub fn width_and_height(&self) -> (u32, u32) {
        let (width, height, _) = self.texture.desc().mip_extent(self.mipmap_index);
        (width, height)
    }
}

impl std::fmt::Debug for FramebufferAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramebufferAttachment")
            .field("texture", &self.texture.debug_name())
            .field("mipmap_index", &self.mipmap_index)
            .field("layer_index", &self.layer_index)
            .finish()
    }
}

/// Offscreen render target
pub trait Framebuffer: Resource {
    fn render_pass(&self) -> &Arc<dyn RenderPass>;

    fn color_attachments(&self) -> &[FramebufferAttachment];

    fn depth_stencil_attachment(&self) -> Option<&FramebufferAttachment>;

    fn width_and_height(&self) -> (u32, u32);
}

fn validate_attachment(attachment: &FramebufferAttachment, expected_format: TextureFormat, what: &str) -> Result<()> {
    let desc = attachment.texture.desc();
    rhi_assert!(
        desc.flags.contains(TextureFlags::RENDER_TARGET),
        SOURCE,
        "{} texture '{}' lacks the RENDER_TARGET flag",
        what,
        desc.debug_name
    );
    rhi_assert!(
        desc.format == expected_format,
        SOURCE,
        "{} texture '{}' is {:?}, render pass expects {:?}",
        what,
        desc.debug_name,
        desc.format,
        expected_format
    );
    rhi_assert!(
        attachment.mipmap_index < desc.number_of_mipmaps(),
        SOURCE,
        "{} mipmap index {} out of range ({} mipmaps)",
        what,
        attachment.mipmap_index,
        desc.number_of_mipmaps()
    );
    let number_of_layers = if desc.dimension == crate::rhi::TextureDimension::Texture3D {
        desc.mip_extent(attachment.mipmap_index).2
    } else {
        desc.number_of_layers()
    };
    rhi_assert!(
        attachment.layer_index < number_of_layers,
        SOURCE,
        "{} layer index {} out of range ({} layers)",
        what,
        attachment.layer_index,
        number_of_layers
    );
    Ok(())
}

/// Check framebuffer attachments against a render pass; returns the common size
pub fn validate_framebuffer(
    render_pass: &RenderPassDesc,
    color_attachments: &[FramebufferAttachment],
    depth_stencil_attachment: Option<&FramebufferAttachment>,
) -> Result<(u32, u32)> {
    rhi_assert!(
        color_attachments.len() == render_pass.color_attachment_formats.len(),
        SOURCE,
        "framebuffer has {} color attachments, render pass declares {}",
        color_attachments.len(),
        render_pass.color_attachment_formats.len()
    );
    rhi_assert!(
        depth_stencil_attachment.is_some() == render_pass.depth_stencil_attachment_format.is_some(),
        SOURCE,
        "framebuffer depth stencil attachment doesn't match the render pass"
    );
    for (attachment, format) in color_attachments.iter().zip(&render_pass.color_attachment_formats) {
        validate_attachment(attachment, *format, "color attachment")?;
    }
    if let (Some(attachment), Some(format)) = (depth_stencil_attachment, render_pass.depth_stencil_attachment_format) {
        validate_attachment(attachment, format, "depth stencil attachment")?;
    }

    let mut sizes = color_attachments.iter().chain(depth_stencil_attachment).map(|a| a.width_and_height());
    let Some(size) = sizes.next() else {
        rhi_violation!(SOURCE, "framebuffer without attachments");
    };
    for other in sizes {
        rhi_assert!(
            other == size,
            SOURCE,
            "framebuffer attachments differ in size: {:?} vs {:?}",
            size,
            other
        );
    }
    Ok(size)
}

// ===== RENDER TARGET HANDLE =====

/// Anything `SetGraphicsRenderTarget` can route draws to
#[derive(Clone)]
pub enum RenderTargetHandle {
    SwapChain(Arc<dyn SwapChain>),
    Framebuffer(Arc<dyn Framebuffer>),
}

impl RenderTargetHandle {
    pub fn render_pass(&self) -> &Arc<dyn RenderPass> {
        match self {
            RenderTargetHandle::SwapChain(swap_chain) => swap_chain.render_pass(),
            RenderTargetHandle::Framebuffer(framebuffer) => framebuffer.render_pass(),
        }
    }

    pub fn width_and_height(&self) -> (u32, u32) {
        match self {
            RenderTargetHandle::SwapChain(swap_chain) => swap_chain.width_and_height(),
            RenderTargetHandle::Framebuffer(framebuffer) => framebuffer.width_and_height(),
        }
    }

    pub fn debug_name(&self) -> &str {
        match self {
            RenderTargetHandle::SwapChain(swap_chain) => swap_chain.debug_name(),
            RenderTargetHandle::Framebuffer(framebuffer) => framebuffer.debug_name(),
        }
    }

    /// Identity comparison (same underlying render target)
    pub fn ptr_eq(&self, other: &RenderTargetHandle) -> bool {
        match (self, other) {
            (RenderTargetHandle::SwapChain(a), RenderTargetHandle::SwapChain(b)) => same_object(a, b),
            (RenderTargetHandle::Framebuffer(a), RenderTargetHandle::Framebuffer(b)) => same_object(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for RenderTargetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderTargetHandle::SwapChain(_) => write!(f, "SwapChain(\"{}\")", self.debug_name()),
            RenderTargetHandle::Framebuffer(_) => write!(f, "Framebuffer(\"{}\")", self.debug_name()),
        }
    }
}

impl From<Arc<dyn SwapChain>> for RenderTargetHandle {
    fn from(swap_chain: Arc<dyn SwapChain>) -> Self {
        RenderTargetHandle::SwapChain(swap_chain)
    }
}

impl From<Arc<dyn Framebuffer>> for RenderTargetHandle {
    fn from(framebuffer: Arc<dyn Framebuffer>) -> Self {
        RenderTargetHandle::Framebuffer(framebuffer)
    }
}
