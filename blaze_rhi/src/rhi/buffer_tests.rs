//! Unit tests for buffer.rs
//!
//! Tests descriptor validation, vertex layouts and buffer updates.

use std::sync::Arc;
use crate::assert::{AssertMode, AssertModeGuard};
use crate::error::Error;
use crate::rhi::buffer::*;
use crate::rhi::mock_device::{mock_buffer, MockBuffer};
use crate::rhi::ResourceType;

fn recoverable() -> AssertModeGuard {
    AssertModeGuard::new(AssertMode::Recoverable)
}

fn position_uv_layout() -> VertexAttributes {
    VertexAttributes::new(vec![
        VertexAttribute::new("Position", VertexAttributeFormat::Float3, 0, 20),
        VertexAttribute::new("TexCoord", VertexAttributeFormat::Float2, 12, 20),
    ])
}

// ============================================================================
// ENUM TESTS
// ============================================================================

#[test]
fn test_buffer_usage_default_is_static_draw() {
    assert_eq!(BufferUsage::default(), BufferUsage::StaticDraw);
    assert!(BufferUsage::StaticCopy.is_static());
    assert!(BufferUsage::StreamDraw.is_dynamic());
    assert!(BufferUsage::DynamicRead.is_dynamic());
}

#[test]
fn test_index_format_sizes() {
    assert_eq!(IndexBufferFormat::UnsignedChar.number_of_bytes(), 1);
    assert_eq!(IndexBufferFormat::UnsignedShort.number_of_bytes(), 2);
    assert_eq!(IndexBufferFormat::UnsignedInt.number_of_bytes(), 4);
}

#[test]
fn test_vertex_attribute_format_sizes() {
    assert_eq!(VertexAttributeFormat::Float1.number_of_bytes(), 4);
    assert_eq!(VertexAttributeFormat::Float4.number_of_bytes(), 16);
    assert_eq!(VertexAttributeFormat::R8G8B8A8Unorm.number_of_bytes(), 4);
    assert_eq!(VertexAttributeFormat::Short2.number_of_components(), 2);
    assert!(VertexAttributeFormat::R8G8B8A8Unorm.is_normalized());
    assert!(VertexAttributeFormat::Uint1.is_integer());
    assert!(!VertexAttributeFormat::Float3.is_integer());
}

#[test]
fn test_buffer_kind_resource_types() {
    assert_eq!(BufferKind::Vertex.resource_type(), ResourceType::VertexBuffer);
    assert_eq!(BufferKind::Index(IndexBufferFormat::UnsignedShort).resource_type(), ResourceType::IndexBuffer);
    assert_eq!(BufferKind::Uniform.resource_type(), ResourceType::UniformBuffer);
    assert_eq!(
        BufferKind::Structured { number_of_structure_bytes: 16 }.resource_type(),
        ResourceType::StructuredBuffer
    );
    assert_eq!(
        BufferKind::Indirect(IndirectBufferFlags::DRAW_ARGUMENTS).resource_type(),
        ResourceType::IndirectBuffer
    );
}

#[test]
fn test_indirect_strides_match_argument_layouts() {
    use crate::rhi::{DrawArguments, DrawIndexedArguments, DrawMeshTasksArguments};
    assert_eq!(DRAW_ARGUMENTS_STRIDE as usize, std::mem::size_of::<DrawArguments>());
    assert_eq!(DRAW_INDEXED_ARGUMENTS_STRIDE as usize, std::mem::size_of::<DrawIndexedArguments>());
    assert_eq!(DRAW_MESH_TASKS_ARGUMENTS_STRIDE as usize, std::mem::size_of::<DrawMeshTasksArguments>());
}

// ============================================================================
// VERTEX ATTRIBUTES TESTS
// ============================================================================

#[test]
fn test_vertex_attributes_valid_layout() {
    let _guard = recoverable();
    let layout = position_uv_layout();
    assert_eq!(layout.len(), 2);
    assert_eq!(layout.number_of_input_slots(), 1);
    assert!(layout.validate().is_ok());
    assert_eq!(layout.attributes[0].semantic_name, "POSITION");
}

#[test]
fn test_vertex_attributes_input_slots() {
    let layout = VertexAttributes::new(vec![
        VertexAttribute::new("Position", VertexAttributeFormat::Float2, 0, 8),
        VertexAttribute::new("InstanceOffset", VertexAttributeFormat::Float4, 0, 16)
            .with_input_slot(1)
            .with_instances_per_element(1),
    ]);
    assert_eq!(layout.number_of_input_slots(), 2);
    assert_eq!(VertexAttributes::default().number_of_input_slots(), 0);
}

#[test]
fn test_vertex_attribute_past_stride_rejected() {
    let _guard = recoverable();
    let layout = VertexAttributes::new(vec![VertexAttribute::new("Position", VertexAttributeFormat::Float3, 4, 12)]);
    assert!(matches!(layout.validate(), Err(Error::ContractViolation(_))));
}

#[test]
fn test_duplicate_vertex_attribute_rejected() {
    let _guard = recoverable();
    let layout = VertexAttributes::new(vec![
        VertexAttribute::new("Position", VertexAttributeFormat::Float3, 0, 24),
        VertexAttribute::new("Position", VertexAttributeFormat::Float3, 12, 24),
    ]);
    assert!(layout.validate().is_err());
}

#[test]
fn test_unnamed_vertex_attribute_rejected() {
    let _guard = recoverable();
    let layout = VertexAttributes::new(vec![VertexAttribute::new("", VertexAttributeFormat::Float1, 0, 4)]);
    assert!(layout.validate().is_err());
}

// ============================================================================
// BUFFER DESC TESTS
// ============================================================================

#[test]
fn test_static_buffer_with_data_is_valid() {
    let _guard = recoverable();
    let desc = BufferDesc::new(12, BufferUsage::StaticDraw);
    assert!(desc.validate(Some(&[0u8; 12])).is_ok());
}

#[test]
fn test_static_buffer_without_data_rejected() {
    let _guard = recoverable();
    let desc = BufferDesc::new(12, BufferUsage::StaticDraw).with_debug_name("vbo");
    match desc.validate(None) {
        Err(Error::ContractViolation(message)) => assert!(message.contains("vbo")),
        other => panic!("expected a contract violation, got {:?}", other),
    }
}

#[test]
fn test_dynamic_or_unordered_access_buffer_without_data_is_valid() {
    let _guard = recoverable();
    assert!(BufferDesc::new(64, BufferUsage::DynamicDraw).validate(None).is_ok());
    let desc = BufferDesc::new(64, BufferUsage::StaticDraw).with_flags(BufferFlags::UNORDERED_ACCESS);
    assert!(desc.validate(None).is_ok());
}

#[test]
fn test_zero_sized_buffer_rejected() {
    let _guard = recoverable();
    assert!(BufferDesc::new(0, BufferUsage::DynamicDraw).validate(None).is_err());
}

#[test]
fn test_data_size_mismatch_rejected() {
    let _guard = recoverable();
    let desc = BufferDesc::new(16, BufferUsage::StaticDraw);
    assert!(desc.validate(Some(&[0u8; 8])).is_err());
}

#[test]
#[should_panic(expected = "contract violation")]
fn test_static_buffer_without_data_fatal_mode_panics() {
    let _guard = AssertModeGuard::new(AssertMode::Fatal);
    let _ = BufferDesc::new(12, BufferUsage::StaticDraw).validate(None);
}

// ============================================================================
// BUFFER UPDATE TESTS
// ============================================================================

#[test]
fn test_buffer_update_writes_bytes() {
    let _guard = recoverable();
    let desc = BufferDesc::new(8, BufferUsage::DynamicDraw);
    let buffer = MockBuffer::new(BufferKind::Uniform, desc, None);
    buffer.update(4, &[1, 2, 3, 4]).unwrap();
    assert_eq!(*buffer.data.lock().unwrap(), vec![0, 0, 0, 0, 1, 2, 3, 4]);
}

#[test]
fn test_buffer_update_overflow_rejected() {
    let _guard = recoverable();
    let buffer = mock_buffer(BufferKind::Uniform, 8);
    assert!(buffer.update(6, &[0u8; 4]).is_err());
    assert!(buffer.update(0, &[0u8; 8]).is_ok());
}

// ============================================================================
// VERTEX ARRAY TESTS
// ============================================================================

#[test]
fn test_vertex_array_validation() {
    let _guard = recoverable();
    let layout = position_uv_layout();
    let vertex_buffer = mock_buffer(BufferKind::Vertex, 60);
    let index_buffer = mock_buffer(BufferKind::Index(IndexBufferFormat::UnsignedShort), 6);

    assert!(validate_vertex_array(&layout, &[Arc::clone(&vertex_buffer)], Some(&index_buffer)).is_ok());
    // Missing vertex buffer for slot 0
    assert!(validate_vertex_array(&layout, &[], None).is_err());
    // Uniform buffer in a vertex slot
    let uniform_buffer = mock_buffer(BufferKind::Uniform, 64);
    assert!(validate_vertex_array(&layout, &[uniform_buffer], None).is_err());
    // Vertex buffer used as index buffer
    assert!(validate_vertex_array(&layout, &[Arc::clone(&vertex_buffer)], Some(&vertex_buffer)).is_err());
}
