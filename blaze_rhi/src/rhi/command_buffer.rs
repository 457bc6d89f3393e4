//! Command buffer: an append-only, replayable log of typed commands
//!
//! Commands are appended through the `command::*::create` functions and
//! dispatched, in order, against a device's `CommandDispatcher`.
//!
//! State machine:
//!
//! - `Empty`: no command recorded.
//! - `Recording`: commands appended, not dispatched yet.
//! - `Filled`: dispatched at least once. The buffer may be dispatched again
//!   (replay) but appending requires `clear()` first.

use std::sync::Arc;
use crate::error::Result;
use crate::rhi::{
    Buffer, ClearFlags, CommandDispatcher, ComputePipelineState, Device, DrawArguments,
    DrawIndexedArguments, DrawMeshTasksArguments, DrawSource, Framebuffer, GraphicsPipelineState,
    RenderTargetHandle, ResourceGroup, ResourceHandle, RootSignature, ScissorRectangle, Texture,
    VertexArray, Viewport,
};
use crate::{rhi_assert, rhi_trace};

const SOURCE: &str = "blaze::rhi::CommandBuffer";

/// One recorded command
///
/// Resources are captured as shared references at record time, so a
/// recorded buffer keeps everything it uses alive until it is cleared.
#[derive(Clone)]
pub enum Command {
    // ----- Graphics -----
    SetGraphicsRootSignature(Arc<dyn RootSignature>),
    SetGraphicsPipelineState(Arc<dyn GraphicsPipelineState>),
    SetGraphicsResourceGroup {
        root_parameter_index: u32,
        resource_group: Option<Arc<dyn ResourceGroup>>,
    },
    SetGraphicsVertexArray(Option<Arc<dyn VertexArray>>),
    SetGraphicsViewports(Vec<Viewport>),
    SetGraphicsScissorRectangles(Vec<ScissorRectangle>),
    SetGraphicsRenderTarget(Option<RenderTargetHandle>),
    ClearGraphics {
        flags: ClearFlags,
        color: [f32; 4],
        z: f32,
        stencil: u32,
    },
    DrawGraphics(DrawSource<DrawArguments>),
    DrawIndexedGraphics(DrawSource<DrawIndexedArguments>),
    DrawMeshTasks(DrawSource<DrawMeshTasksArguments>),

    // ----- Compute -----
    SetComputeRootSignature(Arc<dyn RootSignature>),
    SetComputePipelineState(Arc<dyn ComputePipelineState>),
    SetComputeResourceGroup {
        root_parameter_index: u32,
        resource_group: Option<Arc<dyn ResourceGroup>>,
    },
    DispatchCompute {
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    },

    // ----- Resource -----
    CopyUniformBufferData {
        uniform_buffer: Arc<dyn Buffer>,
        offset: u32,
        data: Vec<u8>,
    },
    SetTextureMinimumMaximumMipmapIndex {
        texture: Arc<dyn Texture>,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    },
    ResolveMultisampleFramebuffer {
        destination: RenderTargetHandle,
        source: Arc<dyn Framebuffer>,
    },
    CopyResource {
        destination: ResourceHandle,
        source: ResourceHandle,
    },
    GenerateMipmaps(Arc<dyn Texture>),

    // ----- Debug -----
    SetDebugMarker(String),
    BeginDebugEvent(String),
    EndDebugEvent,

    // ----- Nesting -----
    /// Commands of another buffer, captured when this command was recorded
    DispatchCommandBuffer(Arc<[Command]>),
}

impl Command {
    /// Command name, as used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::SetGraphicsRootSignature(_) => "SetGraphicsRootSignature",
            Command::SetGraphicsPipelineState(_) => "SetGraphicsPipelineState",
            Command::SetGraphicsResourceGroup { .. } => "SetGraphicsResourceGroup",
            Command::SetGraphicsVertexArray(_) => "SetGraphicsVertexArray",
            Command::SetGraphicsViewports(_) => "SetGraphicsViewports",
            Command::SetGraphicsScissorRectangles(_) => "SetGraphicsScissorRectangles",
            Command::SetGraphicsRenderTarget(_) => "SetGraphicsRenderTarget",
            Command::ClearGraphics { .. } => "ClearGraphics",
            Command::DrawGraphics(_) => "DrawGraphics",
            Command::DrawIndexedGraphics(_) => "DrawIndexedGraphics",
            Command::DrawMeshTasks(_) => "DrawMeshTasks",
            Command::SetComputeRootSignature(_) => "SetComputeRootSignature",
            Command::SetComputePipelineState(_) => "SetComputePipelineState",
            Command::SetComputeResourceGroup { .. } => "SetComputeResourceGroup",
            Command::DispatchCompute { .. } => "DispatchCompute",
            Command::CopyUniformBufferData { .. } => "CopyUniformBufferData",
            Command::SetTextureMinimumMaximumMipmapIndex { .. } => "SetTextureMinimumMaximumMipmapIndex",
            Command::ResolveMultisampleFramebuffer { .. } => "ResolveMultisampleFramebuffer",
            Command::CopyResource { .. } => "CopyResource",
            Command::GenerateMipmaps(_) => "GenerateMipmaps",
            Command::SetDebugMarker(_) => "SetDebugMarker",
            Command::BeginDebugEvent(_) => "BeginDebugEvent",
            Command::EndDebugEvent => "EndDebugEvent",
            Command::DispatchCommandBuffer(_) => "DispatchCommandBuffer",
        }
    }

    /// Issue this command (recursively for nested buffers)
    fn dispatch(&self, dispatcher: &mut dyn CommandDispatcher) -> Result<()> {
        match self {
            Command::SetGraphicsRootSignature(root_signature) => dispatcher.set_graphics_root_signature(root_signature),
            Command::SetGraphicsPipelineState(pipeline_state) => dispatcher.set_graphics_pipeline_state(pipeline_state),
            Command::SetGraphicsResourceGroup { root_parameter_index, resource_group } => {
                dispatcher.set_graphics_resource_group(*root_parameter_index, resource_group.as_ref())
            }
            Command::SetGraphicsVertexArray(vertex_array) => dispatcher.set_graphics_vertex_array(vertex_array.as_ref()),
            Command::SetGraphicsViewports(viewports) => dispatcher.set_graphics_viewports(viewports),
            Command::SetGraphicsScissorRectangles(rectangles) => dispatcher.set_graphics_scissor_rectangles(rectangles),
            Command::SetGraphicsRenderTarget(render_target) => dispatcher.set_graphics_render_target(render_target.as_ref()),
            Command::ClearGraphics { flags, color, z, stencil } => dispatcher.clear_graphics(*flags, *color, *z, *stencil),
            Command::DrawGraphics(source) => dispatcher.draw_graphics(source),
            Command::DrawIndexedGraphics(source) => dispatcher.draw_indexed_graphics(source),
            Command::DrawMeshTasks(source) => dispatcher.draw_mesh_tasks(source),
            Command::SetComputeRootSignature(root_signature) => dispatcher.set_compute_root_signature(root_signature),
            Command::SetComputePipelineState(pipeline_state) => dispatcher.set_compute_pipeline_state(pipeline_state),
            Command::SetComputeResourceGroup { root_parameter_index, resource_group } => {
                dispatcher.set_compute_resource_group(*root_parameter_index, resource_group.as_ref())
            }
            Command::DispatchCompute { group_count_x, group_count_y, group_count_z } => {
                dispatcher.dispatch_compute(*group_count_x, *group_count_y, *group_count_z)
            }
            Command::CopyUniformBufferData { uniform_buffer, offset, data } => {
                dispatcher.copy_uniform_buffer_data(uniform_buffer, *offset, data)
            }
            Command::SetTextureMinimumMaximumMipmapIndex { texture, minimum_mipmap_index, maximum_mipmap_index } => {
                dispatcher.set_texture_minimum_maximum_mipmap_index(texture, *minimum_mipmap_index, *maximum_mipmap_index)
            }
            Command::ResolveMultisampleFramebuffer { destination, source } => {
                dispatcher.resolve_multisample_framebuffer(destination, source)
            }
            Command::CopyResource { destination, source } => dispatcher.copy_resource(destination, source),
            Command::GenerateMipmaps(texture) => dispatcher.generate_mipmaps(texture),
            Command::SetDebugMarker(name) => dispatcher.set_debug_marker(name),
            Command::BeginDebugEvent(name) => dispatcher.begin_debug_event(name),
            Command::EndDebugEvent => dispatcher.end_debug_event(),
            Command::DispatchCommandBuffer(commands) => dispatch_commands(commands, dispatcher),
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::DispatchCommandBuffer(commands) => write!(f, "DispatchCommandBuffer({} commands)", commands.len()),
            Command::DrawGraphics(source) => write!(f, "DrawGraphics({:?})", source),
            Command::DrawIndexedGraphics(source) => write!(f, "DrawIndexedGraphics({:?})", source),
            Command::SetDebugMarker(name) | Command::BeginDebugEvent(name) => write!(f, "{}(\"{}\")", self.name(), name),
            _ => f.write_str(self.name()),
        }
    }
}

fn dispatch_commands(commands: &[Command], dispatcher: &mut dyn CommandDispatcher) -> Result<()> {
    for command in commands {
        command.dispatch(dispatcher)?;
    }
    Ok(())
}

/// Recording state of a command buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandBufferState {
    /// No command recorded
    Empty,
    /// Commands appended, not dispatched yet
    Recording,
    /// Dispatched at least once; replayable, `clear()` before recording again
    Filled,
}

/// Ordered, replayable log of commands
#[derive(Debug)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    state: CommandBufferState,
    debug_event_depth: u32,
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-allocate room for `capacity` commands
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
            state: CommandBufferState::Empty,
            debug_event_depth: 0,
        }
    }

    /// True until a command is recorded (and again after `clear()`)
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of top-level commands (a nested buffer counts once)
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn state(&self) -> CommandBufferState {
        self.state
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Debug events begun but not ended yet
    pub fn debug_event_depth(&self) -> u32 {
        self.debug_event_depth
    }

    /// Discard all recorded commands (and the resources they hold)
    pub fn clear(&mut self) {
        self.commands.clear();
        self.state = CommandBufferState::Empty;
        self.debug_event_depth = 0;
    }

    /// Append a command; recording into a dispatched buffer requires `clear()` first
    pub(crate) fn push(&mut self, command: Command) -> Result<()> {
        rhi_assert!(
            self.state != CommandBufferState::Filled,
            SOURCE,
            "recording {} into a dispatched command buffer, call clear() first",
            command.name()
        );
        match &command {
            Command::BeginDebugEvent(_) => self.debug_event_depth += 1,
            Command::EndDebugEvent => {
                rhi_assert!(self.debug_event_depth > 0, SOURCE, "EndDebugEvent without BeginDebugEvent");
                self.debug_event_depth -= 1;
            }
            _ => {}
        }
        self.commands.push(command);
        self.state = CommandBufferState::Recording;
        Ok(())
    }

    /// Dispatch every command, in order, to a device
    ///
    /// The buffer is left `Filled`: it can be dispatched again without
    /// re-recording.
    pub fn dispatch_to_rhi(&mut self, device: &mut dyn Device) -> Result<()> {
        self.dispatch_to(device.dispatcher())
    }

    /// Dispatch every command, in order, to a dispatcher
    pub fn dispatch_to(&mut self, dispatcher: &mut dyn CommandDispatcher) -> Result<()> {
        rhi_assert!(
            self.debug_event_depth == 0,
            SOURCE,
            "dispatching a command buffer with {} unterminated debug events",
            self.debug_event_depth
        );
        rhi_trace!(SOURCE, "Dispatching {} commands", self.commands.len());
        dispatch_commands(&self.commands, dispatcher)?;
        if !self.commands.is_empty() {
            self.state = CommandBufferState::Filled;
        }
        Ok(())
    }

    /// Snapshot of the commands for nesting into another buffer
    pub(crate) fn snapshot(&self) -> Arc<[Command]> {
        Arc::from(self.commands.as_slice())
    }
}

#[cfg(test)]
#[path = "command_buffer_tests.rs"]
mod tests;
