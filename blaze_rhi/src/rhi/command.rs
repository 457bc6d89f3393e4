//! Command record API
//!
//! One zero-sized type per command kind, each with a `create(buffer, ...)`
//! function appending the command to a `CommandBuffer`. Argument checks run
//! here, at record time, so dispatching never has to re-validate.
//!
//! ```ignore
//! command::ClearGraphics::create(&mut buffer, ClearFlags::COLOR_DEPTH, [0.0, 0.0, 0.0, 1.0])?;
//! command::SetGraphicsPipelineState::create(&mut buffer, &pipeline_state)?;
//! command::SetGraphicsVertexArray::create(&mut buffer, Some(&vertex_array))?;
//! command::DrawGraphics::create(&mut buffer, 3)?;
//! ```

use std::sync::Arc;
use bytemuck::Pod;
use crate::error::Result;
use crate::rhi::{
    Buffer, BufferKind, ClearFlags, Command, CommandBuffer, ComputePipelineState, DrawArguments,
    DrawIndexedArguments, DrawMeshTasksArguments, DrawSource, Framebuffer, GraphicsPipelineState,
    IndirectBufferFlags, RenderTargetHandle, ResourceGroup, ResourceHandle, RootSignature,
    ScissorRectangle, Texture, TextureFlags, VertexArray, Viewport, DRAW_ARGUMENTS_STRIDE,
    DRAW_INDEXED_ARGUMENTS_STRIDE, DRAW_MESH_TASKS_ARGUMENTS_STRIDE,
};
use crate::{rhi_assert, rhi_violation};

const SOURCE: &str = "blaze::rhi::command";

// ============================================================================
// Shared checks
// ============================================================================

fn check_indirect_buffer(
    buffer: &Arc<dyn Buffer>,
    required_flag: IndirectBufferFlags,
    stride: u32,
    indirect_buffer_offset: u32,
    number_of_draws: u32,
) -> Result<()> {
    let BufferKind::Indirect(flags) = buffer.kind() else {
        rhi_violation!(SOURCE, "'{}' is a {:?} buffer, not an indirect buffer", buffer.debug_name(), buffer.kind());
    };
    rhi_assert!(
        flags.contains(required_flag),
        SOURCE,
        "indirect buffer '{}' was not created with {:?}",
        buffer.debug_name(),
        required_flag
    );
    rhi_assert!(number_of_draws > 0, SOURCE, "indirect draw with zero draws");
    let end = indirect_buffer_offset as u64 + number_of_draws as u64 * stride as u64;
    rhi_assert!(
        end <= buffer.number_of_bytes() as u64,
        SOURCE,
        "{} draws at offset {} overflow indirect buffer '{}' ({} bytes)",
        number_of_draws,
        indirect_buffer_offset,
        buffer.debug_name(),
        buffer.number_of_bytes()
    );
    Ok(())
}

fn check_resource_group(
    root_parameter_index: u32,
    resource_group: Option<&Arc<dyn ResourceGroup>>,
) -> Result<()> {
    if let Some(resource_group) = resource_group {
        rhi_assert!(
            resource_group.root_parameter_index() == root_parameter_index,
            SOURCE,
            "resource group '{}' was created for root parameter {}, bound to {}",
            resource_group.debug_name(),
            resource_group.root_parameter_index(),
            root_parameter_index
        );
    }
    Ok(())
}

// ============================================================================
// Graphics state
// ============================================================================

pub struct SetGraphicsRootSignature;

impl SetGraphicsRootSignature {
    pub fn create(buffer: &mut CommandBuffer, root_signature: &Arc<dyn RootSignature>) -> Result<()> {
        buffer.push(Command::SetGraphicsRootSignature(Arc::clone(root_signature)))
    }
}

pub struct SetGraphicsPipelineState;

impl SetGraphicsPipelineState {
    pub fn create(buffer: &mut CommandBuffer, pipeline_state: &Arc<dyn GraphicsPipelineState>) -> Result<()> {
        buffer.push(Command::SetGraphicsPipelineState(Arc::clone(pipeline_state)))
    }
}

pub struct SetGraphicsResourceGroup;

impl SetGraphicsResourceGroup {
    /// Bind a resource group (None unbinds) to a root parameter
    ///
    /// The group must have been created for that root parameter.
    pub fn create(
        buffer: &mut CommandBuffer,
        root_parameter_index: u32,
        resource_group: Option<&Arc<dyn ResourceGroup>>,
    ) -> Result<()> {
        check_resource_group(root_parameter_index, resource_group)?;
        buffer.push(Command::SetGraphicsResourceGroup {
            root_parameter_index,
            resource_group: resource_group.cloned(),
        })
    }
}

pub struct SetGraphicsVertexArray;

impl SetGraphicsVertexArray {
    pub fn create(buffer: &mut CommandBuffer, vertex_array: Option<&Arc<dyn VertexArray>>) -> Result<()> {
        buffer.push(Command::SetGraphicsVertexArray(vertex_array.cloned()))
    }
}

pub struct SetGraphicsViewports;

impl SetGraphicsViewports {
    pub fn create(buffer: &mut CommandBuffer, viewports: &[Viewport]) -> Result<()> {
        rhi_assert!(!viewports.is_empty(), SOURCE, "SetGraphicsViewports without viewport");
        buffer.push(Command::SetGraphicsViewports(viewports.to_vec()))
    }
}

pub struct SetGraphicsScissorRectangles;

impl SetGraphicsScissorRectangles {
    pub fn create(buffer: &mut CommandBuffer, scissor_rectangles: &[ScissorRectangle]) -> Result<()> {
        rhi_assert!(!scissor_rectangles.is_empty(), SOURCE, "SetGraphicsScissorRectangles without rectangle");
        buffer.push(Command::SetGraphicsScissorRectangles(scissor_rectangles.to_vec()))
    }
}

pub struct SetGraphicsViewportAndScissorRectangle;

impl SetGraphicsViewportAndScissorRectangle {
    /// Record a viewport and a matching scissor rectangle (two commands)
    pub fn create(buffer: &mut CommandBuffer, top_left_x: u32, top_left_y: u32, width: u32, height: u32) -> Result<()> {
        SetGraphicsViewports::create(
            buffer,
            &[Viewport::new(top_left_x as f32, top_left_y as f32, width as f32, height as f32)],
        )?;
        SetGraphicsScissorRectangles::create(
            buffer,
            &[ScissorRectangle {
                top_left_x: top_left_x as i32,
                top_left_y: top_left_y as i32,
                bottom_right_x: (top_left_x + width) as i32,
                bottom_right_y: (top_left_y + height) as i32,
            }],
        )
    }
}

pub struct SetGraphicsRenderTarget;

impl SetGraphicsRenderTarget {
    /// Route following draws and clears to a render target (None = unbound)
    pub fn create(buffer: &mut CommandBuffer, render_target: Option<RenderTargetHandle>) -> Result<()> {
        buffer.push(Command::SetGraphicsRenderTarget(render_target))
    }
}

// ============================================================================
// Graphics operations
// ============================================================================

pub struct ClearGraphics;

impl ClearGraphics {
    /// Clear with depth 1.0 and stencil 0
    pub fn create(buffer: &mut CommandBuffer, flags: ClearFlags, color: [f32; 4]) -> Result<()> {
        Self::create_with_depth_stencil(buffer, flags, color, 1.0, 0)
    }

    pub fn create_with_depth_stencil(
        buffer: &mut CommandBuffer,
        flags: ClearFlags,
        color: [f32; 4],
        z: f32,
        stencil: u32,
    ) -> Result<()> {
        rhi_assert!(!flags.is_empty(), SOURCE, "ClearGraphics without clear flags");
        rhi_assert!((0.0..=1.0).contains(&z), SOURCE, "clear depth {} outside [0, 1]", z);
        buffer.push(Command::ClearGraphics { flags, color, z, stencil })
    }
}

pub struct DrawGraphics;

impl DrawGraphics {
    /// Non-indexed draw of one instance
    pub fn create(buffer: &mut CommandBuffer, vertex_count_per_instance: u32) -> Result<()> {
        Self::create_instanced(buffer, vertex_count_per_instance, 1)
    }

    pub fn create_instanced(buffer: &mut CommandBuffer, vertex_count_per_instance: u32, instance_count: u32) -> Result<()> {
        Self::create_with_arguments(
            buffer,
            DrawArguments {
                vertex_count_per_instance,
                instance_count,
                start_vertex_location: 0,
                start_instance_location: 0,
            },
        )
    }

    pub fn create_with_arguments(buffer: &mut CommandBuffer, arguments: DrawArguments) -> Result<()> {
        rhi_assert!(arguments.vertex_count_per_instance > 0, SOURCE, "DrawGraphics with zero vertices");
        rhi_assert!(arguments.instance_count > 0, SOURCE, "DrawGraphics with zero instances");
        buffer.push(Command::DrawGraphics(DrawSource::Direct(arguments)))
    }

    /// Draws whose `DrawArguments` records live in an indirect buffer
    pub fn create_indirect(
        buffer: &mut CommandBuffer,
        indirect_buffer: &Arc<dyn Buffer>,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<()> {
        check_indirect_buffer(
            indirect_buffer,
            IndirectBufferFlags::DRAW_ARGUMENTS,
            DRAW_ARGUMENTS_STRIDE,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        buffer.push(Command::DrawGraphics(DrawSource::Indirect {
            buffer: Arc::clone(indirect_buffer),
            indirect_buffer_offset,
            number_of_draws,
        }))
    }
}

pub struct DrawIndexedGraphics;

impl DrawIndexedGraphics {
    pub fn create(buffer: &mut CommandBuffer, index_count_per_instance: u32) -> Result<()> {
        Self::create_instanced(buffer, index_count_per_instance, 1)
    }

    pub fn create_instanced(buffer: &mut CommandBuffer, index_count_per_instance: u32, instance_count: u32) -> Result<()> {
        Self::create_with_arguments(
            buffer,
            DrawIndexedArguments {
                index_count_per_instance,
                instance_count,
                start_index_location: 0,
                base_vertex_location: 0,
                start_instance_location: 0,
            },
        )
    }

    pub fn create_with_arguments(buffer: &mut CommandBuffer, arguments: DrawIndexedArguments) -> Result<()> {
        rhi_assert!(arguments.index_count_per_instance > 0, SOURCE, "DrawIndexedGraphics with zero indices");
        rhi_assert!(arguments.instance_count > 0, SOURCE, "DrawIndexedGraphics with zero instances");
        buffer.push(Command::DrawIndexedGraphics(DrawSource::Direct(arguments)))
    }

    pub fn create_indirect(
        buffer: &mut CommandBuffer,
        indirect_buffer: &Arc<dyn Buffer>,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<()> {
        check_indirect_buffer(
            indirect_buffer,
            IndirectBufferFlags::DRAW_INDEXED_ARGUMENTS,
            DRAW_INDEXED_ARGUMENTS_STRIDE,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        buffer.push(Command::DrawIndexedGraphics(DrawSource::Indirect {
            buffer: Arc::clone(indirect_buffer),
            indirect_buffer_offset,
            number_of_draws,
        }))
    }
}

pub struct DrawMeshTasks;

impl DrawMeshTasks {
    pub fn create(buffer: &mut CommandBuffer, number_of_tasks: u32) -> Result<()> {
        Self::create_with_first_task(buffer, number_of_tasks, 0)
    }

    pub fn create_with_first_task(buffer: &mut CommandBuffer, number_of_tasks: u32, first_task: u32) -> Result<()> {
        rhi_assert!(number_of_tasks > 0, SOURCE, "DrawMeshTasks with zero tasks");
        buffer.push(Command::DrawMeshTasks(DrawSource::Direct(DrawMeshTasksArguments {
            number_of_tasks,
            first_task,
        })))
    }

    pub fn create_indirect(
        buffer: &mut CommandBuffer,
        indirect_buffer: &Arc<dyn Buffer>,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) -> Result<()> {
        check_indirect_buffer(
            indirect_buffer,
            IndirectBufferFlags::DRAW_MESH_TASKS_ARGUMENTS,
            DRAW_MESH_TASKS_ARGUMENTS_STRIDE,
            indirect_buffer_offset,
            number_of_draws,
        )?;
        buffer.push(Command::DrawMeshTasks(DrawSource::Indirect {
            buffer: Arc::clone(indirect_buffer),
            indirect_buffer_offset,
            number_of_draws,
        }))
    }
}

// ============================================================================
// Compute
// ============================================================================

pub struct SetComputeRootSignature;

impl SetComputeRootSignature {
    pub fn create(buffer: &mut CommandBuffer, root_signature: &Arc<dyn RootSignature>) -> Result<()> {
        buffer.push(Command::SetComputeRootSignature(Arc::clone(root_signature)))
    }
}

pub struct SetComputePipelineState;

impl SetComputePipelineState {
    pub fn create(buffer: &mut CommandBuffer, pipeline_state: &Arc<dyn ComputePipelineState>) -> Result<()> {
        buffer.push(Command::SetComputePipelineState(Arc::clone(pipeline_state)))
    }
}

pub struct SetComputeResourceGroup;

impl SetComputeResourceGroup {
    pub fn create(
        buffer: &mut CommandBuffer,
        root_parameter_index: u32,
        resource_group: Option<&Arc<dyn ResourceGroup>>,
    ) -> Result<()> {
        check_resource_group(root_parameter_index, resource_group)?;
        buffer.push(Command::SetComputeResourceGroup {
            root_parameter_index,
            resource_group: resource_group.cloned(),
        })
    }
}

pub struct DispatchCompute;

impl DispatchCompute {
    pub fn create(buffer: &mut CommandBuffer, group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Result<()> {
        rhi_assert!(
            group_count_x > 0 && group_count_y > 0 && group_count_z > 0,
            SOURCE,
            "DispatchCompute with an empty group count ({}, {}, {})",
            group_count_x,
            group_count_y,
            group_count_z
        );
        buffer.push(Command::DispatchCompute { group_count_x, group_count_y, group_count_z })
    }
}

// ============================================================================
// Resource
// ============================================================================

pub struct CopyUniformBufferData;

impl CopyUniformBufferData {
    /// Copy bytes into a uniform buffer at dispatch time
    ///
    /// The bytes are copied into the command buffer now, so the caller's
    /// data may change before dispatch.
    pub fn create(buffer: &mut CommandBuffer, uniform_buffer: &Arc<dyn Buffer>, offset: u32, data: &[u8]) -> Result<()> {
        rhi_assert!(
            uniform_buffer.kind() == BufferKind::Uniform,
            SOURCE,
            "CopyUniformBufferData into '{}', a {:?} buffer",
            uniform_buffer.debug_name(),
            uniform_buffer.kind()
        );
        rhi_assert!(!data.is_empty(), SOURCE, "CopyUniformBufferData without data");
        crate::rhi::validate_buffer_update(uniform_buffer.info(), offset, data)?;
        buffer.push(Command::CopyUniformBufferData {
            uniform_buffer: Arc::clone(uniform_buffer),
            offset,
            data: data.to_vec(),
        })
    }

    /// Copy a plain-old-data value (e.g. a `glam::Mat4`) into a uniform buffer
    pub fn create_from<T: Pod>(buffer: &mut CommandBuffer, uniform_buffer: &Arc<dyn Buffer>, offset: u32, value: &T) -> Result<()> {
        Self::create(buffer, uniform_buffer, offset, bytemuck::bytes_of(value))
    }
}

pub struct SetTextureMinimumMaximumMipmapIndex;

impl SetTextureMinimumMaximumMipmapIndex {
    pub fn create(
        buffer: &mut CommandBuffer,
        texture: &Arc<dyn Texture>,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    ) -> Result<()> {
        rhi_assert!(
            minimum_mipmap_index <= maximum_mipmap_index,
            SOURCE,
            "minimum mipmap index {} above maximum {}",
            minimum_mipmap_index,
            maximum_mipmap_index
        );
        rhi_assert!(
            maximum_mipmap_index < texture.number_of_mipmaps(),
            SOURCE,
            "maximum mipmap index {} but texture '{}' has {} mipmaps",
            maximum_mipmap_index,
            texture.debug_name(),
            texture.number_of_mipmaps()
        );
        buffer.push(Command::SetTextureMinimumMaximumMipmapIndex {
            texture: Arc::clone(texture),
            minimum_mipmap_index,
            maximum_mipmap_index,
        })
    }
}

pub struct ResolveMultisampleFramebuffer;

impl ResolveMultisampleFramebuffer {
    /// Resolve a multisample framebuffer into a single-sample render target
    pub fn create(buffer: &mut CommandBuffer, destination: RenderTargetHandle, source: &Arc<dyn Framebuffer>) -> Result<()> {
        let samples = source.render_pass().desc().number_of_multisamples;
        rhi_assert!(
            samples > 1,
            SOURCE,
            "resolve source '{}' is not multisampled",
            source.debug_name()
        );
        rhi_assert!(
            destination.render_pass().desc().number_of_multisamples == 1,
            SOURCE,
            "resolve destination '{}' is multisampled",
            destination.debug_name()
        );
        buffer.push(Command::ResolveMultisampleFramebuffer {
            destination,
            source: Arc::clone(source),
        })
    }
}

pub struct CopyResource;

impl CopyResource {
    /// Copy a whole texture or buffer into another of the same shape
    pub fn create(buffer: &mut CommandBuffer, destination: ResourceHandle, source: ResourceHandle) -> Result<()> {
        rhi_assert!(!destination.ptr_eq(&source), SOURCE, "CopyResource from '{}' onto itself", source.debug_name());
        match (&destination, &source) {
            (ResourceHandle::Texture(dst), ResourceHandle::Texture(src)) => {
                let (d, s) = (dst.desc(), src.desc());
                rhi_assert!(
                    d.dimension == s.dimension
                        && d.format == s.format
                        && (d.width, d.height, d.depth) == (s.width, s.height, s.depth)
                        && d.number_of_layers() == s.number_of_layers(),
                    SOURCE,
                    "CopyResource between textures of different shape ('{}' <- '{}')",
                    dst.debug_name(),
                    src.debug_name()
                );
            }
            (ResourceHandle::Buffer(dst), ResourceHandle::Buffer(src)) => {
                rhi_assert!(
                    dst.number_of_bytes() >= src.number_of_bytes(),
                    SOURCE,
                    "CopyResource of {} bytes into '{}' ({} bytes)",
                    src.number_of_bytes(),
                    dst.debug_name(),
                    dst.number_of_bytes()
                );
            }
            _ => rhi_violation!(
                SOURCE,
                "CopyResource between a {:?} and a {:?}",
                destination.resource_type(),
                source.resource_type()
            ),
        }
        buffer.push(Command::CopyResource { destination, source })
    }
}

pub struct GenerateMipmaps;

impl GenerateMipmaps {
    pub fn create(buffer: &mut CommandBuffer, texture: &Arc<dyn Texture>) -> Result<()> {
        rhi_assert!(
            texture.desc().flags.contains(TextureFlags::GENERATE_MIPMAPS),
            SOURCE,
            "GenerateMipmaps on '{}', created without GENERATE_MIPMAPS",
            texture.debug_name()
        );
        buffer.push(Command::GenerateMipmaps(Arc::clone(texture)))
    }
}

// ============================================================================
// Debug
// ============================================================================

pub struct SetDebugMarker;

impl SetDebugMarker {
    pub fn create(buffer: &mut CommandBuffer, name: &str) -> Result<()> {
        buffer.push(Command::SetDebugMarker(name.to_string()))
    }
}

pub struct BeginDebugEvent;

impl BeginDebugEvent {
    pub fn create(buffer: &mut CommandBuffer, name: &str) -> Result<()> {
        buffer.push(Command::BeginDebugEvent(name.to_string()))
    }
}

pub struct EndDebugEvent;

impl EndDebugEvent {
    /// Close the innermost open debug event
    pub fn create(buffer: &mut CommandBuffer) -> Result<()> {
        buffer.push(Command::EndDebugEvent)
    }
}

/// Record `f` inside a named debug event
pub fn scoped_debug_event<F>(buffer: &mut CommandBuffer, name: &str, f: F) -> Result<()>
where
    F: FnOnce(&mut CommandBuffer) -> Result<()>,
{
    BeginDebugEvent::create(buffer, name)?;
    f(buffer)?;
    EndDebugEvent::create(buffer)
}

// ============================================================================
// Nesting
// ============================================================================

pub struct DispatchCommandBuffer;

impl DispatchCommandBuffer {
    /// Inline the commands of `inner` at this point of `buffer`
    ///
    /// `inner` is captured as it is now; recording into it afterwards does
    /// not change `buffer`.
    pub fn create(buffer: &mut CommandBuffer, inner: &CommandBuffer) -> Result<()> {
        rhi_assert!(!inner.is_empty(), SOURCE, "DispatchCommandBuffer with an empty command buffer");
        rhi_assert!(
            inner.debug_event_depth() == 0,
            SOURCE,
            "DispatchCommandBuffer with {} unterminated debug events",
            inner.debug_event_depth()
        );
        buffer.push(Command::DispatchCommandBuffer(inner.snapshot()))
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
