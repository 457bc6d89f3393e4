/// CommandDispatcher trait - backend side of command buffer dispatch

use std::sync::Arc;
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};
use crate::error::Result;
use crate::rhi::{
    Buffer, ComputePipelineState, Framebuffer, GraphicsPipelineState, RenderTargetHandle,
    ResourceGroup, ResourceHandle, RootSignature, Texture, VertexArray,
};

bitflags! {
    /// Buffers touched by ClearGraphics
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR       = 1 << 0;
        const DEPTH       = 1 << 1;
        const STENCIL     = 1 << 2;
        const COLOR_DEPTH = Self::COLOR.bits() | Self::DEPTH.bits();
    }
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    pub fn new(top_left_x: f32, top_left_y: f32, width: f32, height: f32) -> Self {
        Self {
            top_left_x,
            top_left_y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Scissor rectangle (right and bottom exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScissorRectangle {
    pub top_left_x: i32,
    pub top_left_y: i32,
    pub bottom_right_x: i32,
    pub bottom_right_y: i32,
}

// ===== DRAW ARGUMENTS =====
//
// The layouts match the records of indirect buffers.

/// Non-indexed draw arguments
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawArguments {
    pub vertex_count_per_instance: u32,
    pub instance_count: u32,
    pub start_vertex_location: u32,
    pub start_instance_location: u32,
}

/// Indexed draw arguments
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedArguments {
    pub index_count_per_instance: u32,
    pub instance_count: u32,
    pub start_index_location: u32,
    pub base_vertex_location: i32,
    pub start_instance_location: u32,
}

/// Mesh shader draw arguments
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawMeshTasksArguments {
    pub number_of_tasks: u32,
    pub first_task: u32,
}

/// Where the arguments of a draw come from
#[derive(Clone)]
pub enum DrawSource<A> {
    /// Arguments recorded in the command
    Direct(A),
    /// `number_of_draws` argument records read from an indirect buffer
    Indirect {
        buffer: Arc<dyn Buffer>,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    },
}

impl<A: std::fmt::Debug> std::fmt::Debug for DrawSource<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawSource::Direct(arguments) => write!(f, "Direct({:?})", arguments),
            DrawSource::Indirect { buffer, indirect_buffer_offset, number_of_draws } => write!(
                f,
                "Indirect(\"{}\", offset {}, {} draws)",
                buffer.debug_name(),
                indirect_buffer_offset,
                number_of_draws
            ),
        }
    }
}

// ============================================================================
// CommandDispatcher trait
// ============================================================================

/// Issues native calls for dispatched commands
///
/// Called by `CommandBuffer::dispatch_to_rhi` once per command, in recording
/// order. Arguments were validated when the commands were recorded; a
/// dispatcher only reports what it can detect from the bound state.
pub trait CommandDispatcher {
    // ----- Graphics -----

    fn set_graphics_root_signature(&mut self, root_signature: &Arc<dyn RootSignature>) -> Result<()>;

    fn set_graphics_pipeline_state(&mut self, pipeline_state: &Arc<dyn GraphicsPipelineState>) -> Result<()>;

    /// Bind (or unbind with None) a resource group to a root parameter
    fn set_graphics_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: Option<&Arc<dyn ResourceGroup>>,
    ) -> Result<()>;

    fn set_graphics_vertex_array(&mut self, vertex_array: Option<&Arc<dyn VertexArray>>) -> Result<()>;

    /// Top-left origin, relative to the bound render target (set it first)
    fn set_graphics_viewports(&mut self, viewports: &[Viewport]) -> Result<()>;

    fn set_graphics_scissor_rectangles(&mut self, scissor_rectangles: &[ScissorRectangle]) -> Result<()>;

    /// Route draws to a swap chain or framebuffer (None = no render target)
    fn set_graphics_render_target(&mut self, render_target: Option<&RenderTargetHandle>) -> Result<()>;

    fn clear_graphics(&mut self, flags: ClearFlags, color: [f32; 4], z: f32, stencil: u32) -> Result<()>;

    fn draw_graphics(&mut self, source: &DrawSource<DrawArguments>) -> Result<()>;

    fn draw_indexed_graphics(&mut self, source: &DrawSource<DrawIndexedArguments>) -> Result<()>;

    fn draw_mesh_tasks(&mut self, source: &DrawSource<DrawMeshTasksArguments>) -> Result<()>;

    // ----- Compute -----

    fn set_compute_root_signature(&mut self, root_signature: &Arc<dyn RootSignature>) -> Result<()>;

    fn set_compute_pipeline_state(&mut self, pipeline_state: &Arc<dyn ComputePipelineState>) -> Result<()>;

    fn set_compute_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: Option<&Arc<dyn ResourceGroup>>,
    ) -> Result<()>;

    fn dispatch_compute(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Result<()>;

    // ----- Resource -----

    fn copy_uniform_buffer_data(&mut self, uniform_buffer: &Arc<dyn Buffer>, offset: u32, data: &[u8]) -> Result<()>;

    fn set_texture_minimum_maximum_mipmap_index(
        &mut self,
        texture: &Arc<dyn Texture>,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    ) -> Result<()>;

    fn resolve_multisample_framebuffer(
        &mut self,
        destination: &RenderTargetHandle,
        source: &Arc<dyn Framebuffer>,
    ) -> Result<()>;

    fn copy_resource(&mut self, destination: &ResourceHandle, source: &ResourceHandle) -> Result<()>;

    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture>) -> Result<()>;

    // ----- Debug -----

    fn set_debug_marker(&mut self, name: &str) -> Result<()>;

    fn begin_debug_event(&mut self, name: &str) -> Result<()>;

    fn end_debug_event(&mut self) -> Result<()>;
}
