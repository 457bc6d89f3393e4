//! Unit tests for command.rs
//!
//! Record-time argument checks, run in recoverable assert mode.

use std::sync::Arc;
use glam::Mat4;
use crate::assert::{AssertMode, AssertModeGuard};
use crate::rhi::command::*;
use crate::rhi::mock_device::{
    mock_buffer, mock_render_pass, mock_root_signature, mock_texture_2d, MockDispatcher, MockFramebuffer,
    MockTexture,
};
use crate::rhi::{
    BufferKind, ClearFlags, CommandBuffer, DescriptorRange, Framebuffer, FramebufferAttachment,
    IndirectBufferFlags, RenderPassDesc, RenderTargetHandle, ResourceHandle, ResourceType,
    RootParameter, RootSignatureDesc, ShaderVisibility, Texture, TextureDesc, TextureFlags,
    TextureFormat,
};

fn recoverable() -> AssertModeGuard {
    AssertModeGuard::new(AssertMode::Recoverable)
}

fn framebuffer(samples: u8) -> Arc<dyn Framebuffer> {
    let render_pass = mock_render_pass(RenderPassDesc::new(vec![TextureFormat::R8G8B8A8], None).with_multisamples(samples));
    let texture = mock_texture_2d(32, 32);
    Arc::new(MockFramebuffer {
        render_pass,
        color_attachments: vec![FramebufferAttachment::new(texture)],
        depth_stencil_attachment: None,
        size: (32, 32),
    })
}

// ============================================================================
// DRAW TESTS
// ============================================================================

#[test]
fn test_zero_draw_counts_rejected() {
    let _guard = recoverable();
    let mut buffer = CommandBuffer::new();
    assert!(DrawGraphics::create(&mut buffer, 0).is_err());
    assert!(DrawGraphics::create_instanced(&mut buffer, 3, 0).is_err());
    assert!(DrawIndexedGraphics::create(&mut buffer, 0).is_err());
    assert!(DrawMeshTasks::create(&mut buffer, 0).is_err());
    assert!(buffer.is_empty());
}

#[test]
fn test_indirect_draw_checks_buffer() {
    let _guard = recoverable();
    let mut buffer = CommandBuffer::new();
    let indirect = mock_buffer(BufferKind::Indirect(IndirectBufferFlags::DRAW_ARGUMENTS), 32);

    // Two 16-byte records fit, three don't
    assert!(DrawGraphics::create_indirect(&mut buffer, &indirect, 0, 2).is_ok());
    assert!(DrawGraphics::create_indirect(&mut buffer, &indirect, 16, 2).is_err());
    // Created for non-indexed arguments only
    assert!(DrawIndexedGraphics::create_indirect(&mut buffer, &indirect, 0, 1).is_err());
    // Not an indirect buffer
    let uniform = mock_buffer(BufferKind::Uniform, 64);
    assert!(DrawGraphics::create_indirect(&mut buffer, &uniform, 0, 1).is_err());
    assert!(DrawGraphics::create_indirect(&mut buffer, &indirect, 0, 0).is_err());
    assert_eq!(buffer.len(), 1);
}

#[test]
fn test_indirect_draw_dispatches_number_of_draws() {
    let mut buffer = CommandBuffer::new();
    let indirect = mock_buffer(
        BufferKind::Indirect(IndirectBufferFlags::DRAW_INDEXED_ARGUMENTS | IndirectBufferFlags::DRAW_ARGUMENTS),
        100,
    );
    DrawIndexedGraphics::create_indirect(&mut buffer, &indirect, 20, 4).unwrap();

    let mut dispatcher = MockDispatcher::new();
    buffer.dispatch_to(&mut dispatcher).unwrap();
    assert_eq!(dispatcher.calls, ["draw_indexed_graphics_indirect(4)"]);
    assert_eq!(dispatcher.statistics.draw_calls, 4);
}

// ============================================================================
// STATE TESTS
// ============================================================================

#[test]
fn test_clear_checks() {
    let _guard = recoverable();
    let mut buffer = CommandBuffer::new();
    assert!(ClearGraphics::create(&mut buffer, ClearFlags::empty(), [0.0; 4]).is_err());
    assert!(ClearGraphics::create_with_depth_stencil(&mut buffer, ClearFlags::DEPTH, [0.0; 4], 1.5, 0).is_err());
    assert!(ClearGraphics::create_with_depth_stencil(&mut buffer, ClearFlags::STENCIL, [0.0; 4], 0.0, 1).is_ok());
}

#[test]
fn test_viewport_lists_must_not_be_empty() {
    let _guard = recoverable();
    let mut buffer = CommandBuffer::new();
    assert!(SetGraphicsViewports::create(&mut buffer, &[]).is_err());
    assert!(SetGraphicsScissorRectangles::create(&mut buffer, &[]).is_err());
}

#[test]
fn test_viewport_and_scissor_rectangle_records_two_commands() {
    let mut buffer = CommandBuffer::new();
    SetGraphicsViewportAndScissorRectangle::create(&mut buffer, 10, 20, 100, 50).unwrap();
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.commands()[0].name(), "SetGraphicsViewports");
    assert_eq!(buffer.commands()[1].name(), "SetGraphicsScissorRectangles");
}

#[test]
fn test_resource_group_bound_to_its_root_parameter() {
    let _guard = recoverable();
    let root_signature = mock_root_signature(RootSignatureDesc::new(vec![
        RootParameter::descriptor_table(vec![DescriptorRange::ubv(0, "UniformBlock", ShaderVisibility::Vertex)]),
        RootParameter::descriptor_table(vec![DescriptorRange::srv(
            0,
            "AlbedoMap",
            ResourceType::Texture2D,
            ShaderVisibility::Fragment,
        )]),
    ]))
    .unwrap();
    let group = root_signature
        .create_resource_group(1, vec![Some(ResourceHandle::Texture(mock_texture_2d(8, 8)))], None)
        .unwrap();

    let mut buffer = CommandBuffer::new();
    assert!(SetGraphicsResourceGroup::create(&mut buffer, 1, Some(&group)).is_ok());
    assert!(SetGraphicsResourceGroup::create(&mut buffer, 0, Some(&group)).is_err());
    assert!(SetComputeResourceGroup::create(&mut buffer, 0, Some(&group)).is_err());
    assert!(SetGraphicsResourceGroup::create(&mut buffer, 0, None).is_ok());
    assert_eq!(buffer.len(), 2);
}

#[test]
fn test_dispatch_compute_rejects_empty_group_count() {
    let _guard = recoverable();
    let mut buffer = CommandBuffer::new();
    assert!(DispatchCompute::create(&mut buffer, 1, 0, 1).is_err());
    assert!(DispatchCompute::create(&mut buffer, 1, 1, 1).is_ok());
}

// ============================================================================
// RESOURCE TESTS
// ============================================================================

#[test]
fn test_copy_uniform_buffer_data_from_pod_value() {
    let uniform = mock_buffer(BufferKind::Uniform, 64);
    let mut buffer = CommandBuffer::new();
    let matrix = Mat4::from_scale(glam::Vec3::splat(2.0));
    CopyUniformBufferData::create_from(&mut buffer, &uniform, 0, &matrix).unwrap();

    let mut dispatcher = MockDispatcher::new();
    buffer.dispatch_to(&mut dispatcher).unwrap();
    assert_eq!(dispatcher.calls, ["copy_uniform_buffer_data(0, 64)"]);

    let mut first = [0u8; 4];
    let mock = uniform.as_any().downcast_ref::<crate::rhi::mock_device::MockBuffer>().unwrap();
    first.copy_from_slice(&mock.data.lock().unwrap()[0..4]);
    assert_eq!(f32::from_le_bytes(first), 2.0);
}

#[test]
fn test_copy_uniform_buffer_data_checks() {
    let _guard = recoverable();
    let mut buffer = CommandBuffer::new();
    let uniform = mock_buffer(BufferKind::Uniform, 16);
    assert!(CopyUniformBufferData::create(&mut buffer, &uniform, 8, &[0u8; 16]).is_err());
    assert!(CopyUniformBufferData::create(&mut buffer, &uniform, 0, &[]).is_err());
    let vertex = mock_buffer(BufferKind::Vertex, 16);
    assert!(CopyUniformBufferData::create(&mut buffer, &vertex, 0, &[0u8; 4]).is_err());
    assert!(buffer.is_empty());
}

#[test]
fn test_mipmap_index_range_checks() {
    let _guard = recoverable();
    let texture: Arc<dyn Texture> = Arc::new(MockTexture::new(
        TextureDesc::texture_2d(64, 64, TextureFormat::R8G8B8A8).with_flags(TextureFlags::GENERATE_MIPMAPS),
    ));
    let mut buffer = CommandBuffer::new();
    assert!(SetTextureMinimumMaximumMipmapIndex::create(&mut buffer, &texture, 1, 6).is_ok());
    assert!(SetTextureMinimumMaximumMipmapIndex::create(&mut buffer, &texture, 3, 2).is_err());
    assert!(SetTextureMinimumMaximumMipmapIndex::create(&mut buffer, &texture, 0, 7).is_err());
}

#[test]
fn test_generate_mipmaps_needs_flag() {
    let _guard = recoverable();
    let mut buffer = CommandBuffer::new();
    assert!(GenerateMipmaps::create(&mut buffer, &mock_texture_2d(64, 64)).is_err());
    let texture: Arc<dyn Texture> = Arc::new(MockTexture::new(
        TextureDesc::texture_2d(64, 64, TextureFormat::R8G8B8A8)
            .with_flags(TextureFlags::SHADER_RESOURCE | TextureFlags::GENERATE_MIPMAPS),
    ));
    assert!(GenerateMipmaps::create(&mut buffer, &texture).is_ok());
}

#[test]
fn test_resolve_needs_multisampled_source() {
    let _guard = recoverable();
    let mut buffer = CommandBuffer::new();
    let destination = RenderTargetHandle::Framebuffer(framebuffer(1));
    assert!(ResolveMultisampleFramebuffer::create(&mut buffer, destination.clone(), &framebuffer(1)).is_err());
    assert!(ResolveMultisampleFramebuffer::create(&mut buffer, destination, &framebuffer(4)).is_ok());
    let multisampled = RenderTargetHandle::Framebuffer(framebuffer(4));
    assert!(ResolveMultisampleFramebuffer::create(&mut buffer, multisampled, &framebuffer(4)).is_err());
}

#[test]
fn test_copy_resource_compatibility() {
    let _guard = recoverable();
    let mut buffer = CommandBuffer::new();
    let a = ResourceHandle::Texture(mock_texture_2d(16, 16));
    let b = ResourceHandle::Texture(mock_texture_2d(16, 16));
    let c = ResourceHandle::Texture(mock_texture_2d(32, 16));
    assert!(CopyResource::create(&mut buffer, a.clone(), b).is_ok());
    assert!(CopyResource::create(&mut buffer, a.clone(), c).is_err());
    assert!(CopyResource::create(&mut buffer, a.clone(), a.clone()).is_err());

    let small = ResourceHandle::Buffer(mock_buffer(BufferKind::Vertex, 16));
    let large = ResourceHandle::Buffer(mock_buffer(BufferKind::Vertex, 64));
    assert!(CopyResource::create(&mut buffer, large.clone(), small.clone()).is_ok());
    assert!(CopyResource::create(&mut buffer, small, large).is_err());
    let texture_into_buffer = ResourceHandle::Buffer(mock_buffer(BufferKind::Vertex, 1024));
    assert!(CopyResource::create(&mut buffer, texture_into_buffer, a).is_err());
    assert_eq!(buffer.len(), 2);
}

#[test]
fn test_nesting_empty_buffer_rejected() {
    let _guard = recoverable();
    let mut outer = CommandBuffer::new();
    assert!(DispatchCommandBuffer::create(&mut outer, &CommandBuffer::new()).is_err());

    let mut open_event = CommandBuffer::new();
    BeginDebugEvent::create(&mut open_event, "unterminated").unwrap();
    assert!(DispatchCommandBuffer::create(&mut outer, &open_event).is_err());
}
