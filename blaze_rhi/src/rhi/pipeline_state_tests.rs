//! Unit tests for pipeline_state.rs

use std::sync::Arc;
use crate::assert::{AssertMode, AssertModeGuard};
use crate::rhi::mock_device::{mock_render_pass, mock_root_signature, mock_shader, MockGraphicsProgram};
use crate::rhi::pipeline_state::*;
use crate::rhi::{
    ComparisonFunc, GraphicsProgram, RenderPassDesc, RootSignatureDesc, ShaderType, TextureFormat,
    VertexAttribute, VertexAttributeFormat, VertexAttributes,
};

fn recoverable() -> AssertModeGuard {
    AssertModeGuard::new(AssertMode::Recoverable)
}

fn position_layout() -> VertexAttributes {
    VertexAttributes::new(vec![VertexAttribute::new("Position", VertexAttributeFormat::Float2, 0, 8)])
}

fn pipeline_desc(is_mesh: bool, vertex_attributes: VertexAttributes, samples: u8) -> GraphicsPipelineStateDesc {
    let program: Arc<dyn GraphicsProgram> = Arc::new(MockGraphicsProgram { is_mesh });
    let render_pass = mock_render_pass(
        RenderPassDesc::new(vec![TextureFormat::R8G8B8A8], Some(TextureFormat::D32_FLOAT)).with_multisamples(samples),
    );
    GraphicsPipelineStateDesc::new(
        mock_root_signature(RootSignatureDesc::default()).unwrap(),
        program,
        vertex_attributes,
        render_pass,
    )
}

// ============================================================================
// DEFAULT STATE TESTS
// ============================================================================

#[test]
fn test_default_fixed_function_state() {
    let desc = pipeline_desc(false, position_layout(), 1);
    assert_eq!(desc.primitive_topology, PrimitiveTopology::TriangleList);
    assert_eq!(desc.primitive_topology_type, PrimitiveTopologyType::Triangle);
    assert_eq!(desc.rasterizer_state.fill_mode, FillMode::Solid);
    assert_eq!(desc.rasterizer_state.cull_mode, CullMode::Back);
    assert!(desc.depth_stencil_state.depth_enable);
    assert_eq!(desc.depth_stencil_state.depth_func, ComparisonFunc::Less);
    assert!(!desc.depth_stencil_state.stencil_enable);
    assert!(!desc.blend_state.render_target(0).blend_enable);
    assert_eq!(desc.blend_state.render_target(0).render_target_write_mask, ColorWriteEnable::ALL);
}

#[test]
fn test_blend_state_independent_targets() {
    let mut blend_state = BlendState::default();
    blend_state.render_targets[0].blend_enable = true;
    // Without independent blending every target uses render_targets[0]
    assert!(blend_state.render_target(3).blend_enable);
    blend_state.independent_blend_enable = true;
    assert!(!blend_state.render_target(3).blend_enable);
}

#[test]
fn test_topology_types() {
    assert_eq!(PrimitiveTopology::PointList.topology_type(), PrimitiveTopologyType::Point);
    assert_eq!(PrimitiveTopology::LineStrip.topology_type(), PrimitiveTopologyType::Line);
    assert_eq!(PrimitiveTopology::TriangleStrip.topology_type(), PrimitiveTopologyType::Triangle);
    assert_eq!(PrimitiveTopology::PatchList(3).topology_type(), PrimitiveTopologyType::Patch);
}

// ============================================================================
// GRAPHICS PIPELINE VALIDATION TESTS
// ============================================================================

#[test]
fn test_valid_graphics_pipeline() {
    let _guard = recoverable();
    assert!(pipeline_desc(false, position_layout(), 1).validate().is_ok());
    let desc = pipeline_desc(false, position_layout(), 1).with_primitive_topology(PrimitiveTopology::PatchList(4));
    assert_eq!(desc.primitive_topology_type, PrimitiveTopologyType::Patch);
    assert!(desc.validate().is_ok());
}

#[test]
fn test_topology_type_mismatch_rejected() {
    let _guard = recoverable();
    let mut desc = pipeline_desc(false, position_layout(), 1);
    desc.primitive_topology = PrimitiveTopology::LineList;
    assert!(desc.validate().is_err());
}

#[test]
fn test_patch_control_points_out_of_range_rejected() {
    let _guard = recoverable();
    let desc = pipeline_desc(false, position_layout(), 1).with_primitive_topology(PrimitiveTopology::PatchList(0));
    assert!(desc.validate().is_err());
    let desc = pipeline_desc(false, position_layout(), 1).with_primitive_topology(PrimitiveTopology::PatchList(33));
    assert!(desc.validate().is_err());
}

#[test]
fn test_mesh_program_with_vertex_attributes_rejected() {
    let _guard = recoverable();
    assert!(pipeline_desc(true, position_layout(), 1).validate().is_err());
    assert!(pipeline_desc(true, VertexAttributes::default(), 1).validate().is_ok());
}

#[test]
fn test_multisample_needs_multisampled_render_pass() {
    let _guard = recoverable();
    let rasterizer_state = RasterizerState { multisample_enable: true, ..RasterizerState::default() };
    let desc = pipeline_desc(false, position_layout(), 1).with_rasterizer_state(rasterizer_state);
    assert!(desc.validate().is_err());
    let desc = pipeline_desc(false, position_layout(), 4).with_rasterizer_state(rasterizer_state);
    assert!(desc.validate().is_ok());
}

// ============================================================================
// COMPUTE PIPELINE VALIDATION TESTS
// ============================================================================

#[test]
fn test_compute_pipeline_needs_compute_shader() {
    let _guard = recoverable();
    let root_signature = mock_root_signature(RootSignatureDesc::default()).unwrap();
    let desc = ComputePipelineStateDesc::new(Arc::clone(&root_signature), mock_shader(ShaderType::Compute));
    assert!(desc.validate().is_ok());
    let desc = ComputePipelineStateDesc::new(root_signature, mock_shader(ShaderType::Fragment));
    assert!(desc.validate().is_err());
}
