/// RenderPass / SwapChain / Framebuffer - where OpenGL draws end up
///
/// The swap chain is the default framebuffer of the platform context.
/// Framebuffers are FBOs with mipmap and layer aware attachments.

use std::any::Any;
use std::sync::{Arc, Mutex};
use blaze_rhi::blaze::rhi::{
    validate_framebuffer, Framebuffer as RhiFramebuffer, FramebufferAttachment, RenderPass as RhiRenderPass,
    RenderPassDesc, RenderTargetHandle, Resource, ResourceType, SwapChain as RhiSwapChain, TextureDimension,
    WindowHandle,
};
use blaze_rhi::blaze::Result;
use blaze_rhi::{rhi_assert, rhi_bail, rhi_debug, rhi_violation};
use gl::types::{GLenum, GLint, GLsizei, GLuint};

use crate::opengl_context::{get_binding, GlContext};
use crate::opengl_debug;
use crate::opengl_texture::{gl_texture, Texture};

const SOURCE: &str = "blaze::opengl::RenderTarget";

// ============================================================================
// RenderPass
// ============================================================================

/// OpenGL render pass: only the attachment layout, no native object
pub struct RenderPass {
    desc: RenderPassDesc,
}

impl RenderPass {
    pub(crate) fn create(desc: &RenderPassDesc) -> Result<Self> {
        desc.validate()?;
        Ok(Self { desc: desc.clone() })
    }
}

impl Resource for RenderPass {
    fn resource_type(&self) -> ResourceType {
        ResourceType::RenderPass
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiRenderPass for RenderPass {
    fn desc(&self) -> &RenderPassDesc {
        &self.desc
    }
}

// ============================================================================
// SwapChain
// ============================================================================

/// Default framebuffer of the platform context
pub struct SwapChain {
    ctx: Arc<GlContext>,
    render_pass: Arc<dyn RhiRenderPass>,
    width_and_height: Mutex<(u32, u32)>,
}

impl SwapChain {
    pub(crate) fn create(
        ctx: Arc<GlContext>,
        render_pass: &Arc<dyn RhiRenderPass>,
        window_handle: WindowHandle,
    ) -> Result<Self> {
        rhi_assert!(
            render_pass.desc().number_of_color_attachments() == 1,
            SOURCE,
            "swap chain render pass needs exactly one color attachment, got {}",
            render_pass.desc().number_of_color_attachments()
        );

        let width_and_height = ctx.platform.drawable_size();
        rhi_debug!(
            SOURCE,
            "Swap chain created for window 0x{:X} ({}x{})",
            window_handle.native_window_handle,
            width_and_height.0,
            width_and_height.1
        );

        Ok(Self {
            ctx,
            render_pass: Arc::clone(render_pass),
            width_and_height: Mutex::new(width_and_height),
        })
    }
}

impl Resource for SwapChain {
    fn resource_type(&self) -> ResourceType {
        ResourceType::SwapChain
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiSwapChain for SwapChain {
    fn render_pass(&self) -> &Arc<dyn RhiRenderPass> {
        &self.render_pass
    }

    fn width_and_height(&self) -> (u32, u32) {
        match self.width_and_height.lock() {
            Ok(size) => *size,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn present(&self) -> Result<()> {
        self.ctx.platform.swap_buffers()?;
        opengl_debug::check_validation_errors();
        Ok(())
    }

    fn resize_buffers(&self) -> Result<()> {
        let size = self.ctx.platform.drawable_size();
        match self.width_and_height.lock() {
            Ok(mut current) => *current = size,
            Err(poisoned) => *poisoned.into_inner() = size,
        }
        rhi_debug!(SOURCE, "Swap chain resized to {}x{}", size.0, size.1);
        Ok(())
    }

    fn set_vertical_synchronization_interval(&self, interval: u32) -> Result<()> {
        self.ctx.platform.set_swap_interval(interval)
    }
}

// ============================================================================
// Framebuffer
// ============================================================================

/// How a texture is attached to a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachKind {
    /// Whole texture level (1D, 2D, 2D multisample)
    Texture,
    /// One cube map face, as a 2D target
    Face(GLenum),
    /// One layer of an array or volume
    Layer(GLint),
}

/// Attachment call for a texture dimension and layer
pub fn attach_kind(dimension: TextureDimension, layer_index: u32) -> AttachKind {
    match dimension {
        TextureDimension::Texture1D | TextureDimension::Texture2D => AttachKind::Texture,
        TextureDimension::TextureCube => AttachKind::Face(gl::TEXTURE_CUBE_MAP_POSITIVE_X + layer_index),
        TextureDimension::Texture1DArray
        | TextureDimension::Texture2DArray
        | TextureDimension::Texture3D
        | TextureDimension::TextureCubeArray => AttachKind::Layer(layer_index as GLint),
    }
}

/// Readable name of a glCheckFramebufferStatus result
pub fn framebuffer_status_name(status: GLenum) -> &'static str {
    match status {
        gl::FRAMEBUFFER_COMPLETE => "GL_FRAMEBUFFER_COMPLETE",
        gl::FRAMEBUFFER_UNDEFINED => "GL_FRAMEBUFFER_UNDEFINED",
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => "GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT",
        gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => "GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT",
        gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "GL_FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER",
        gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "GL_FRAMEBUFFER_INCOMPLETE_READ_BUFFER",
        gl::FRAMEBUFFER_UNSUPPORTED => "GL_FRAMEBUFFER_UNSUPPORTED",
        gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "GL_FRAMEBUFFER_INCOMPLETE_MULTISAMPLE",
        gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => "GL_FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS",
        _ => "unknown framebuffer status",
    }
}

unsafe fn attach(point: GLenum, texture: &Texture, attachment: &FramebufferAttachment) {
    let level = attachment.mipmap_index as GLint;
    match attach_kind(attachment.texture.desc().dimension, attachment.layer_index) {
        AttachKind::Texture => gl::FramebufferTexture(gl::DRAW_FRAMEBUFFER, point, texture.name, level),
        AttachKind::Face(target) => gl::FramebufferTexture2D(gl::DRAW_FRAMEBUFFER, point, target, texture.name, level),
        AttachKind::Layer(layer) => {
            gl::FramebufferTextureLayer(gl::DRAW_FRAMEBUFFER, point, texture.name, level, layer)
        }
    }
}

/// OpenGL framebuffer object
pub struct Framebuffer {
    pub(crate) name: GLuint,
    render_pass: Arc<dyn RhiRenderPass>,
    color_attachments: Vec<FramebufferAttachment>,
    depth_stencil_attachment: Option<FramebufferAttachment>,
    width_and_height: (u32, u32),
}

impl Framebuffer {
    pub(crate) fn create(
        ctx: &GlContext,
        render_pass: &Arc<dyn RhiRenderPass>,
        color_attachments: Vec<FramebufferAttachment>,
        depth_stencil_attachment: Option<FramebufferAttachment>,
    ) -> Result<Self> {
        let pass = render_pass.desc();
        let width_and_height = validate_framebuffer(pass, &color_attachments, depth_stencil_attachment.as_ref())?;
        for attachment in color_attachments.iter().chain(&depth_stencil_attachment) {
            rhi_assert!(
                attachment.texture.desc().number_of_multisamples == pass.number_of_multisamples,
                SOURCE,
                "attachment '{}' has {} samples, render pass expects {}",
                attachment.texture.debug_name(),
                attachment.texture.desc().number_of_multisamples,
                pass.number_of_multisamples
            );
        }

        let mut colors = Vec::with_capacity(color_attachments.len());
        for attachment in &color_attachments {
            colors.push(gl_texture(attachment.texture.as_ref())?);
        }
        let depth = match &depth_stencil_attachment {
            Some(attachment) => Some(gl_texture(attachment.texture.as_ref())?),
            None => None,
        };

        let mut name: GLuint = 0;
        let status = unsafe {
            gl::GenFramebuffers(1, &mut name);
            let previous = get_binding(gl::DRAW_FRAMEBUFFER_BINDING);
            gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, name);

            let mut draw_buffers = Vec::with_capacity(colors.len());
            for (index, (texture, attachment)) in colors.iter().zip(&color_attachments).enumerate() {
                let point = gl::COLOR_ATTACHMENT0 + index as GLenum;
                attach(point, texture, attachment);
                draw_buffers.push(point);
            }
            if let (Some(texture), Some(attachment)) = (depth, &depth_stencil_attachment) {
                attach(gl::DEPTH_ATTACHMENT, texture, attachment);
            }
            if draw_buffers.is_empty() {
                gl::DrawBuffer(gl::NONE);
            } else {
                gl::DrawBuffers(draw_buffers.len() as GLsizei, draw_buffers.as_ptr());
            }

            let status = gl::CheckFramebufferStatus(gl::DRAW_FRAMEBUFFER);
            gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, previous);
            status
        };

        let framebuffer = Self {
            name,
            render_pass: Arc::clone(render_pass),
            color_attachments,
            depth_stencil_attachment,
            width_and_height,
        };
        if status != gl::FRAMEBUFFER_COMPLETE {
            rhi_bail!(SOURCE, "Framebuffer incomplete: {} (0x{:04X})", framebuffer_status_name(status), status);
        }
        ctx.check_error("creating framebuffer")?;

        rhi_debug!(
            SOURCE,
            "Framebuffer created ({} color attachments, {}x{})",
            framebuffer.color_attachments.len(),
            width_and_height.0,
            width_and_height.1
        );
        Ok(framebuffer)
    }
}

impl Resource for Framebuffer {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Framebuffer
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiFramebuffer for Framebuffer {
    fn render_pass(&self) -> &Arc<dyn RhiRenderPass> {
        &self.render_pass
    }

    fn color_attachments(&self) -> &[FramebufferAttachment] {
        &self.color_attachments
    }

    fn depth_stencil_attachment(&self) -> Option<&FramebufferAttachment> {
        self.depth_stencil_attachment.as_ref()
    }

    fn width_and_height(&self) -> (u32, u32) {
        self.width_and_height
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteFramebuffers(1, &self.name);
        }
    }
}

/// Framebuffer object name of a render target (0 for the swap chain)
pub(crate) fn framebuffer_name(render_target: &RenderTargetHandle) -> Result<GLuint> {
    match render_target {
        RenderTargetHandle::SwapChain(swap_chain) => match swap_chain.as_any().downcast_ref::<SwapChain>() {
            Some(_) => Ok(0),
            None => rhi_violation!(SOURCE, "swap chain wasn't created by the OpenGL device"),
        },
        RenderTargetHandle::Framebuffer(framebuffer) => match framebuffer.as_any().downcast_ref::<Framebuffer>() {
            Some(framebuffer) => Ok(framebuffer.name),
            None => rhi_violation!(SOURCE, "framebuffer wasn't created by the OpenGL device"),
        },
    }
}

#[cfg(test)]
#[path = "opengl_render_target_tests.rs"]
mod tests;
