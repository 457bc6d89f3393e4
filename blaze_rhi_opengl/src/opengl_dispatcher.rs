//! OpenGLDispatcher - issues GL calls for dispatched commands
//!
//! OpenGL shares one set of binding points between draws and compute
//! dispatches. [`BindingState`] remembers what each side last set (program,
//! root signature, resource groups) and replays the other side's bindings
//! when the dispatcher switches between drawing and dispatching.
//!
//! Side operations (resolves, copies, mipmap generation) touch the
//! framebuffer and texture bindings; the current render target framebuffer
//! is re-bound afterwards.

use std::ffi::c_void;
use std::sync::Arc;
use blaze_rhi::blaze::rhi::{
    Buffer as RhiBuffer, ClearFlags, CommandDispatcher, ComputePipelineState as RhiComputePipelineState,
    DeviceStatistics, DrawArguments, DrawIndexedArguments, DrawMeshTasksArguments, DrawSource,
    Framebuffer as RhiFramebuffer, GraphicsPipelineState as RhiGraphicsPipelineState, IndexBufferFormat,
    RenderTargetHandle, ResourceGroup as RhiResourceGroup, ResourceHandle, RootSignature as RhiRootSignature,
    ScissorRectangle, Texture as RhiTexture, VertexArray as RhiVertexArray, Viewport,
};
use blaze_rhi::blaze::Result;
use blaze_rhi::{rhi_assert, rhi_trace, rhi_violation};
use gl::types::{GLenum, GLfloat, GLint, GLintptr, GLsizei, GLsizeiptr, GLuint};

use crate::opengl_buffer::{gl_buffer, VertexArray};
use crate::opengl_context::GlContext;
use crate::opengl_debug;
use crate::opengl_mapping;
use crate::opengl_pipeline_state::{gl_compute_pipeline_state, gl_graphics_pipeline_state};
use crate::opengl_render_target::framebuffer_name;
use crate::opengl_root_signature::{gl_resource_group, gl_root_signature};
use crate::opengl_texture::{copy_extents, gl_texture};

const SOURCE: &str = "blaze::opengl::Dispatcher";

// ============================================================================
// Binding state
// ============================================================================

/// Which side of the pipeline a binding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Graphics,
    Compute,
}

/// GL work the binding state asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindAction<G> {
    UseProgram(GLuint),
    /// Bind a root signature or resource group
    Bind(G),
}

#[derive(Debug, Clone)]
struct SideState<G> {
    program: Option<GLuint>,
    root_signature: Option<G>,
    groups: Vec<Option<G>>,
    /// Set since the last `prepare` of this side
    pending: Vec<BindAction<G>>,
}

impl<G> Default for SideState<G> {
    fn default() -> Self {
        Self { program: None, root_signature: None, groups: Vec::new(), pending: Vec::new() }
    }
}

impl<G: Clone> SideState<G> {
    /// Everything needed to restore this side from scratch
    fn replay(&self) -> Vec<BindAction<G>> {
        let mut actions = Vec::with_capacity(2 + self.groups.len());
        if let Some(program) = self.program {
            actions.push(BindAction::UseProgram(program));
        }
        if let Some(root_signature) = &self.root_signature {
            actions.push(BindAction::Bind(root_signature.clone()));
        }
        actions.extend(self.groups.iter().flatten().cloned().map(BindAction::Bind));
        actions
    }
}

/// Graphics and compute bindings tracked apart
///
/// Setters only record. `prepare` is called right before a draw or a
/// dispatch and returns the GL work to do: the pending bindings of that
/// side, or its whole state when the other side was active last.
#[derive(Debug, Clone)]
pub struct BindingState<G> {
    graphics: SideState<G>,
    compute: SideState<G>,
    active: Option<PipelineKind>,
}

impl<G> Default for BindingState<G> {
    fn default() -> Self {
        Self { graphics: SideState::default(), compute: SideState::default(), active: None }
    }
}

impl<G: Clone> BindingState<G> {
    pub fn new() -> Self {
        Self::default()
    }

    fn side(&mut self, kind: PipelineKind) -> &mut SideState<G> {
        match kind {
            PipelineKind::Graphics => &mut self.graphics,
            PipelineKind::Compute => &mut self.compute,
        }
    }

    pub fn set_program(&mut self, kind: PipelineKind, program: GLuint) {
        let side = self.side(kind);
        side.program = Some(program);
        side.pending.push(BindAction::UseProgram(program));
    }

    /// A new root signature invalidates every resource group of that side
    pub fn set_root_signature(&mut self, kind: PipelineKind, root_signature: G) {
        let side = self.side(kind);
        side.groups.clear();
        side.root_signature = Some(root_signature.clone());
        side.pending.push(BindAction::Bind(root_signature));
    }

    pub fn set_group(&mut self, kind: PipelineKind, root_parameter_index: u32, group: Option<G>) {
        let side = self.side(kind);
        let index = root_parameter_index as usize;
        if side.groups.len() <= index {
            side.groups.resize(index + 1, None);
        }
        side.groups[index] = group.clone();
        if let Some(group) = group {
            side.pending.push(BindAction::Bind(group));
        }
    }

    /// GL work needed before a draw (`Graphics`) or a dispatch (`Compute`)
    pub fn prepare(&mut self, kind: PipelineKind) -> Vec<BindAction<G>> {
        let switched = self.active != Some(kind);
        self.active = Some(kind);
        let side = self.side(kind);
        if switched {
            side.pending.clear();
            side.replay()
        } else {
            std::mem::take(&mut side.pending)
        }
    }
}

/// What the dispatcher's binding state holds
#[derive(Clone)]
enum Bindable {
    RootSignature(Arc<dyn RhiRootSignature>),
    ResourceGroup(Arc<dyn RhiResourceGroup>),
}

// ============================================================================
// Coordinate conversion
// ============================================================================

/// Top-left viewport to the lower-left origin OpenGL uses
pub fn gl_viewport(viewport: &Viewport, render_target_height: u32) -> (GLfloat, GLfloat, GLfloat, GLfloat) {
    let y = render_target_height as f32 - viewport.top_left_y - viewport.height;
    (viewport.top_left_x, y, viewport.width, viewport.height)
}

/// Top-left scissor rectangle to `(x, y, width, height)` with a lower-left origin
pub fn gl_scissor(rectangle: &ScissorRectangle, render_target_height: u32) -> [GLint; 4] {
    let width = rectangle.bottom_right_x - rectangle.top_left_x;
    let height = rectangle.bottom_right_y - rectangle.top_left_y;
    let y = render_target_height as GLint - rectangle.bottom_right_y;
    [rectangle.top_left_x, y, width.max(0), height.max(0)]
}

/// Height viewports and scissor rectangles are flipped against
///
/// The lower-left origin depends on the render target, so setting them
/// before a render target is bound is a contract violation.
pub fn flip_height(render_target: Option<&RenderTargetHandle>, what: &str) -> Result<u32> {
    match render_target {
        Some(render_target) => Ok(render_target.width_and_height().1),
        None => rhi_violation!(SOURCE, "{} set without a render target", what),
    }
}

/// Draws a source issues (indirect records count one each)
fn number_of_draws<A>(source: &DrawSource<A>) -> u64 {
    match source {
        DrawSource::Direct(_) => 1,
        DrawSource::Indirect { number_of_draws, .. } => *number_of_draws as u64,
    }
}

// ============================================================================
// OpenGLDispatcher
// ============================================================================

/// Command dispatcher of the OpenGL device
pub struct OpenGLDispatcher {
    ctx: Arc<GlContext>,
    bindings: BindingState<Bindable>,
    /// Keeps the bound pipeline states and vertex array alive while in use
    graphics_pipeline_state: Option<Arc<dyn RhiGraphicsPipelineState>>,
    compute_pipeline_state: Option<Arc<dyn RhiComputePipelineState>>,
    vertex_array: Option<Arc<dyn RhiVertexArray>>,
    /// Attribute-less draws still need a vertex array in a core profile
    empty_vertex_array: GLuint,
    primitive_mode: GLenum,
    render_target: Option<RenderTargetHandle>,
    render_target_framebuffer: GLuint,
    debug_event_depth: u32,
    statistics: DeviceStatistics,
}

impl OpenGLDispatcher {
    pub(crate) fn new(ctx: Arc<GlContext>) -> Self {
        let mut empty_vertex_array: GLuint = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut empty_vertex_array);
        }
        Self {
            ctx,
            bindings: BindingState::new(),
            graphics_pipeline_state: None,
            compute_pipeline_state: None,
            vertex_array: None,
            empty_vertex_array,
            primitive_mode: gl::TRIANGLES,
            render_target: None,
            render_target_framebuffer: 0,
            debug_event_depth: 0,
            statistics: DeviceStatistics::default(),
        }
    }

    pub(crate) fn statistics(&self) -> DeviceStatistics {
        self.statistics
    }

    fn count_command(&mut self) {
        self.statistics.commands_dispatched += 1;
    }

    fn issue(actions: Vec<BindAction<Bindable>>) -> Result<()> {
        for action in actions {
            match action {
                BindAction::UseProgram(program) => unsafe { gl::UseProgram(program) },
                BindAction::Bind(Bindable::RootSignature(root_signature)) => {
                    gl_root_signature(&root_signature)?.bind_static_samplers()
                }
                BindAction::Bind(Bindable::ResourceGroup(resource_group)) => {
                    gl_resource_group(&resource_group)?.bind()
                }
            }
        }
        Ok(())
    }

    fn prepare_draw(&mut self) -> Result<()> {
        rhi_assert!(
            self.graphics_pipeline_state.is_some(),
            SOURCE,
            "draw without a graphics pipeline state"
        );
        rhi_assert!(self.render_target.is_some(), SOURCE, "draw without a render target");
        Self::issue(self.bindings.prepare(PipelineKind::Graphics))
    }

    fn prepare_dispatch(&mut self) -> Result<()> {
        rhi_assert!(
            self.compute_pipeline_state.is_some(),
            SOURCE,
            "dispatch without a compute pipeline state"
        );
        Self::issue(self.bindings.prepare(PipelineKind::Compute))
    }

    fn index_format(&self) -> Result<IndexBufferFormat> {
        match self.vertex_array.as_ref().and_then(|vertex_array| vertex_array.index_format()) {
            Some(format) => Ok(format),
            None => rhi_violation!(SOURCE, "indexed draw without an index buffer in the vertex array"),
        }
    }

    fn bind_indirect_buffer(buffer: &Arc<dyn RhiBuffer>) -> Result<()> {
        let buffer = gl_buffer(buffer.as_ref())?;
        unsafe {
            gl::BindBuffer(gl::DRAW_INDIRECT_BUFFER, buffer.name);
        }
        Ok(())
    }

    /// Re-bind the render target framebuffer after a side operation
    fn restore_render_target(&self) {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, self.render_target_framebuffer);
        }
    }

    fn set_root_signature(&mut self, kind: PipelineKind, root_signature: &Arc<dyn RhiRootSignature>) -> Result<()> {
        gl_root_signature(root_signature)?;
        self.bindings.set_root_signature(kind, Bindable::RootSignature(Arc::clone(root_signature)));
        Ok(())
    }

    fn set_resource_group(
        &mut self,
        kind: PipelineKind,
        root_parameter_index: u32,
        resource_group: Option<&Arc<dyn RhiResourceGroup>>,
    ) -> Result<()> {
        let group = match resource_group {
            Some(resource_group) => {
                gl_resource_group(resource_group)?;
                Some(Bindable::ResourceGroup(Arc::clone(resource_group)))
            }
            None => None,
        };
        self.bindings.set_group(kind, root_parameter_index, group);
        Ok(())
    }

    fn copy_texture(destination: &Arc<dyn RhiTexture>, source: &Arc<dyn RhiTexture>) -> Result<()> {
        let destination = gl_texture(destination.as_ref())?;
        let source_texture = gl_texture(source.as_ref())?;
        for (mipmap, width, height, depth) in copy_extents(source.desc()) {
            unsafe {
                gl::CopyImageSubData(
                    source_texture.name,
                    source_texture.target,
                    mipmap as GLint,
                    0,
                    0,
                    0,
                    destination.name,
                    destination.target,
                    mipmap as GLint,
                    0,
                    0,
                    0,
                    width as GLsizei,
                    height as GLsizei,
                    depth as GLsizei,
                );
            }
        }
        Ok(())
    }

    fn copy_buffer(destination: &Arc<dyn RhiBuffer>, source: &Arc<dyn RhiBuffer>) -> Result<()> {
        let size = source.number_of_bytes().min(destination.number_of_bytes());
        let destination = gl_buffer(destination.as_ref())?;
        let source = gl_buffer(source.as_ref())?;
        unsafe {
            gl::BindBuffer(gl::COPY_READ_BUFFER, source.name);
            gl::BindBuffer(gl::COPY_WRITE_BUFFER, destination.name);
            gl::CopyBufferSubData(gl::COPY_READ_BUFFER, gl::COPY_WRITE_BUFFER, 0, 0, size as GLsizeiptr);
            gl::BindBuffer(gl::COPY_READ_BUFFER, 0);
            gl::BindBuffer(gl::COPY_WRITE_BUFFER, 0);
        }
        Ok(())
    }
}

impl Drop for OpenGLDispatcher {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.empty_vertex_array);
        }
    }
}

impl CommandDispatcher for OpenGLDispatcher {
    // ----- Graphics -----

    fn set_graphics_root_signature(&mut self, root_signature: &Arc<dyn RhiRootSignature>) -> Result<()> {
        self.count_command();
        self.set_root_signature(PipelineKind::Graphics, root_signature)
    }

    fn set_graphics_pipeline_state(&mut self, pipeline_state: &Arc<dyn RhiGraphicsPipelineState>) -> Result<()> {
        self.count_command();
        let gl_pipeline_state = gl_graphics_pipeline_state(pipeline_state)?;
        gl_pipeline_state.apply();
        self.primitive_mode = gl_pipeline_state.primitive_mode;
        self.bindings.set_program(PipelineKind::Graphics, gl_pipeline_state.program);
        self.graphics_pipeline_state = Some(Arc::clone(pipeline_state));
        Ok(())
    }

    fn set_graphics_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: Option<&Arc<dyn RhiResourceGroup>>,
    ) -> Result<()> {
        self.count_command();
        self.set_resource_group(PipelineKind::Graphics, root_parameter_index, resource_group)
    }

    fn set_graphics_vertex_array(&mut self, vertex_array: Option<&Arc<dyn RhiVertexArray>>) -> Result<()> {
        self.count_command();
        let name = match vertex_array {
            Some(vertex_array) => match vertex_array.as_any().downcast_ref::<VertexArray>() {
                Some(gl_vertex_array) => gl_vertex_array.name,
                None => rhi_violation!(SOURCE, "vertex array wasn't created by the OpenGL device"),
            },
            None => self.empty_vertex_array,
        };
        unsafe {
            gl::BindVertexArray(name);
        }
        self.vertex_array = vertex_array.cloned();
        Ok(())
    }

    fn set_graphics_viewports(&mut self, viewports: &[Viewport]) -> Result<()> {
        self.count_command();
        let height = flip_height(self.render_target.as_ref(), "viewports")?;
        let mut rectangles = Vec::with_capacity(viewports.len() * 4);
        let mut depth_ranges = Vec::with_capacity(viewports.len() * 2);
        for viewport in viewports {
            let (x, y, width, height) = gl_viewport(viewport, height);
            rectangles.extend_from_slice(&[x, y, width, height]);
            depth_ranges.extend_from_slice(&[viewport.min_depth as f64, viewport.max_depth as f64]);
        }
        unsafe {
            gl::ViewportArrayv(0, viewports.len() as GLsizei, rectangles.as_ptr());
            gl::DepthRangeArrayv(0, viewports.len() as GLsizei, depth_ranges.as_ptr());
        }
        Ok(())
    }

    fn set_graphics_scissor_rectangles(&mut self, scissor_rectangles: &[ScissorRectangle]) -> Result<()> {
        self.count_command();
        let height = flip_height(self.render_target.as_ref(), "scissor rectangles")?;
        let rectangles: Vec<GLint> =
            scissor_rectangles.iter().flat_map(|rectangle| gl_scissor(rectangle, height)).collect();
        unsafe {
            gl::ScissorArrayv(0, scissor_rectangles.len() as GLsizei, rectangles.as_ptr());
        }
        Ok(())
    }

    fn set_graphics_render_target(&mut self, render_target: Option<&RenderTargetHandle>) -> Result<()> {
        self.count_command();
        let framebuffer = match render_target {
            Some(render_target) => framebuffer_name(render_target)?,
            None => 0,
        };
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, framebuffer);
        }
        if let Some(render_target) = render_target {
            let (width, height) = render_target.width_and_height();
            unsafe {
                gl::Viewport(0, 0, width as GLsizei, height as GLsizei);
            }
        }
        self.render_target_framebuffer = framebuffer;
        self.render_target = render_target.cloned();
        Ok(())
    }

    fn clear_graphics(&mut self, flags: ClearFlags, color: [f32; 4], z: f32, stencil: u32) -> Result<()> {
        self.count_command();
        rhi_assert!(self.render_target.is_some(), SOURCE, "clear without a render target");
        unsafe {
            // Clears honor the write masks; open them up and let the next pipeline state restore its own
            if flags.contains(ClearFlags::COLOR) {
                gl::ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);
                gl::ClearColor(color[0], color[1], color[2], color[3]);
            }
            if flags.contains(ClearFlags::DEPTH) {
                gl::DepthMask(gl::TRUE);
                gl::ClearDepth(z as f64);
            }
            if flags.contains(ClearFlags::STENCIL) {
                gl::StencilMask(!0);
                gl::ClearStencil(stencil as GLint);
            }
            gl::Disable(gl::SCISSOR_TEST);
            gl::Clear(opengl_mapping::clear_mask(flags));
        }
        if let Some(pipeline_state) = &self.graphics_pipeline_state {
            gl_graphics_pipeline_state(pipeline_state)?.apply();
        }
        Ok(())
    }

    fn draw_graphics(&mut self, source: &DrawSource<DrawArguments>) -> Result<()> {
        self.count_command();
        self.statistics.draw_calls += number_of_draws(source);
        self.prepare_draw()?;
        match source {
            DrawSource::Direct(arguments) => unsafe {
                gl::DrawArraysInstancedBaseInstance(
                    self.primitive_mode,
                    arguments.start_vertex_location as GLint,
                    arguments.vertex_count_per_instance as GLsizei,
                    arguments.instance_count as GLsizei,
                    arguments.start_instance_location,
                );
            },
            DrawSource::Indirect { buffer, indirect_buffer_offset, number_of_draws } => {
                Self::bind_indirect_buffer(buffer)?;
                unsafe {
                    gl::MultiDrawArraysIndirect(
                        self.primitive_mode,
                        *indirect_buffer_offset as GLintptr as *const c_void,
                        *number_of_draws as GLsizei,
                        0,
                    );
                }
            }
        }
        Ok(())
    }

    fn draw_indexed_graphics(&mut self, source: &DrawSource<DrawIndexedArguments>) -> Result<()> {
        self.count_command();
        self.statistics.draw_calls += number_of_draws(source);
        let format = self.index_format()?;
        self.prepare_draw()?;
        let index_type = opengl_mapping::index_type(format);
        match source {
            DrawSource::Direct(arguments) => unsafe {
                let offset = arguments.start_index_location as usize * format.number_of_bytes() as usize;
                gl::DrawElementsInstancedBaseVertexBaseInstance(
                    self.primitive_mode,
                    arguments.index_count_per_instance as GLsizei,
                    index_type,
                    offset as *const c_void,
                    arguments.instance_count as GLsizei,
                    arguments.base_vertex_location,
                    arguments.start_instance_location,
                );
            },
            DrawSource::Indirect { buffer, indirect_buffer_offset, number_of_draws } => {
                Self::bind_indirect_buffer(buffer)?;
                unsafe {
                    gl::MultiDrawElementsIndirect(
                        self.primitive_mode,
                        index_type,
                        *indirect_buffer_offset as GLintptr as *const c_void,
                        *number_of_draws as GLsizei,
                        0,
                    );
                }
            }
        }
        Ok(())
    }

    fn draw_mesh_tasks(&mut self, source: &DrawSource<DrawMeshTasksArguments>) -> Result<()> {
        self.count_command();
        rhi_violation!(SOURCE, "mesh shaders aren't supported by the OpenGL backend ({:?})", source)
    }

    // ----- Compute -----

    fn set_compute_root_signature(&mut self, root_signature: &Arc<dyn RhiRootSignature>) -> Result<()> {
        self.count_command();
        self.set_root_signature(PipelineKind::Compute, root_signature)
    }

    fn set_compute_pipeline_state(&mut self, pipeline_state: &Arc<dyn RhiComputePipelineState>) -> Result<()> {
        self.count_command();
        let program = gl_compute_pipeline_state(pipeline_state)?.program();
        self.bindings.set_program(PipelineKind::Compute, program);
        self.compute_pipeline_state = Some(Arc::clone(pipeline_state));
        Ok(())
    }

    fn set_compute_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: Option<&Arc<dyn RhiResourceGroup>>,
    ) -> Result<()> {
        self.count_command();
        self.set_resource_group(PipelineKind::Compute, root_parameter_index, resource_group)
    }

    fn dispatch_compute(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Result<()> {
        self.count_command();
        self.statistics.dispatch_calls += 1;
        self.prepare_dispatch()?;
        unsafe {
            gl::DispatchCompute(group_count_x, group_count_y, group_count_z);
            // Compute writes are visible to whatever reads next
            gl::MemoryBarrier(gl::ALL_BARRIER_BITS);
        }
        Ok(())
    }

    // ----- Resource -----

    fn copy_uniform_buffer_data(&mut self, uniform_buffer: &Arc<dyn RhiBuffer>, offset: u32, data: &[u8]) -> Result<()> {
        self.count_command();
        uniform_buffer.update(offset, data)
    }

    fn set_texture_minimum_maximum_mipmap_index(
        &mut self,
        texture: &Arc<dyn RhiTexture>,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    ) -> Result<()> {
        self.count_command();
        gl_texture(texture.as_ref())?.set_minimum_maximum_mipmap_index(minimum_mipmap_index, maximum_mipmap_index);
        Ok(())
    }

    fn resolve_multisample_framebuffer(
        &mut self,
        destination: &RenderTargetHandle,
        source: &Arc<dyn RhiFramebuffer>,
    ) -> Result<()> {
        self.count_command();
        let source_name = framebuffer_name(&RenderTargetHandle::Framebuffer(Arc::clone(source)))?;
        let destination_name = framebuffer_name(destination)?;
        let (width, height) = source.width_and_height();
        let (destination_width, destination_height) = destination.width_and_height();

        let mut mask = gl::COLOR_BUFFER_BIT;
        if source.depth_stencil_attachment().is_some()
            && destination.render_pass().desc().depth_stencil_attachment_format.is_some()
        {
            mask |= gl::DEPTH_BUFFER_BIT;
        }

        unsafe {
            gl::BindFramebuffer(gl::READ_FRAMEBUFFER, source_name);
            gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, destination_name);
            gl::Disable(gl::SCISSOR_TEST);
            gl::BlitFramebuffer(
                0,
                0,
                width as GLint,
                height as GLint,
                0,
                0,
                destination_width as GLint,
                destination_height as GLint,
                mask,
                gl::NEAREST,
            );
        }
        self.restore_render_target();
        if let Some(pipeline_state) = &self.graphics_pipeline_state {
            gl_graphics_pipeline_state(pipeline_state)?.apply();
        }
        self.ctx.check_error("resolving multisample framebuffer")
    }

    fn copy_resource(&mut self, destination: &ResourceHandle, source: &ResourceHandle) -> Result<()> {
        self.count_command();
        match (destination, source) {
            (ResourceHandle::Texture(destination), ResourceHandle::Texture(source)) => {
                Self::copy_texture(destination, source)?
            }
            (ResourceHandle::Buffer(destination), ResourceHandle::Buffer(source)) => {
                Self::copy_buffer(destination, source)?
            }
            _ => rhi_violation!(
                SOURCE,
                "can't copy {:?} '{}' into {:?} '{}'",
                source.resource_type(),
                source.debug_name(),
                destination.resource_type(),
                destination.debug_name()
            ),
        }
        self.restore_render_target();
        self.ctx.check_error("copying resource")
    }

    fn generate_mipmaps(&mut self, texture: &Arc<dyn RhiTexture>) -> Result<()> {
        self.count_command();
        gl_texture(texture.as_ref())?.generate_mipmaps()?;
        self.restore_render_target();
        Ok(())
    }

    // ----- Debug -----

    fn set_debug_marker(&mut self, name: &str) -> Result<()> {
        self.count_command();
        rhi_trace!(SOURCE, "Debug marker '{}'", name);
        opengl_debug::insert_debug_marker(name);
        Ok(())
    }

    fn begin_debug_event(&mut self, name: &str) -> Result<()> {
        self.count_command();
        self.debug_event_depth += 1;
        opengl_debug::push_debug_group(name);
        Ok(())
    }

    fn end_debug_event(&mut self) -> Result<()> {
        self.count_command();
        rhi_assert!(self.debug_event_depth > 0, SOURCE, "end_debug_event without an open debug event");
        self.debug_event_depth -= 1;
        opengl_debug::pop_debug_group();
        Ok(())
    }
}

#[cfg(test)]
#[path = "opengl_dispatcher_tests.rs"]
mod tests;
