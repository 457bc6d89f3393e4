//! Unit tests for root_signature.rs
//!
//! Tests layout validation and resource group creation against a root signature.

use std::sync::Arc;
use crate::assert::{AssertMode, AssertModeGuard};
use crate::error::Error;
use crate::rhi::mock_device::{mock_buffer, mock_root_signature, mock_sampler_state, mock_texture_2d};
use crate::rhi::root_signature::*;
use crate::rhi::{BufferKind, ResourceHandle, ResourceType};

fn recoverable() -> AssertModeGuard {
    AssertModeGuard::new(AssertMode::Recoverable)
}

/// One descriptor table with a single 2D texture at register 0, fragment stage
fn single_texture_desc() -> RootSignatureDesc {
    RootSignatureDesc::new(vec![RootParameter::descriptor_table(vec![DescriptorRange::srv(
        0,
        "AlbedoMap",
        ResourceType::Texture2D,
        ShaderVisibility::Fragment,
    )])])
}

/// Table 0: uniform buffer + texture; table 1: sampler
fn material_desc() -> RootSignatureDesc {
    RootSignatureDesc::new(vec![
        RootParameter::descriptor_table(vec![
            DescriptorRange::ubv(0, "UniformBlock", ShaderVisibility::AllGraphics),
            DescriptorRange::srv(0, "AlbedoMap", ResourceType::Texture2D, ShaderVisibility::Fragment),
        ]),
        RootParameter::descriptor_table(vec![DescriptorRange::sampler(0, ShaderVisibility::Fragment)]),
    ])
}

// ============================================================================
// RANGE / VISIBILITY TESTS
// ============================================================================

#[test]
fn test_range_type_accepts() {
    assert!(DescriptorRangeType::Srv.accepts(ResourceType::Texture2D));
    assert!(DescriptorRangeType::Srv.accepts(ResourceType::StructuredBuffer));
    assert!(DescriptorRangeType::Uav.accepts(ResourceType::IndirectBuffer));
    assert!(!DescriptorRangeType::Srv.accepts(ResourceType::UniformBuffer));
    assert!(DescriptorRangeType::Ubv.accepts(ResourceType::UniformBuffer));
    assert!(!DescriptorRangeType::Ubv.accepts(ResourceType::Texture2D));
    assert!(DescriptorRangeType::Sampler.accepts(ResourceType::SamplerState));
    assert!(!DescriptorRangeType::Sampler.accepts(ResourceType::Texture2D));
}

#[test]
fn test_visibility_overlaps() {
    assert!(ShaderVisibility::All.overlaps(ShaderVisibility::Compute));
    assert!(ShaderVisibility::AllGraphics.overlaps(ShaderVisibility::Fragment));
    assert!(!ShaderVisibility::AllGraphics.overlaps(ShaderVisibility::Compute));
    assert!(!ShaderVisibility::Vertex.overlaps(ShaderVisibility::Fragment));
    assert!(ShaderVisibility::Vertex.overlaps(ShaderVisibility::Vertex));
}

#[test]
fn test_range_constructors() {
    let range = DescriptorRange::ubv(2, "PerFrame", ShaderVisibility::Vertex).with_register_space(1);
    assert_eq!(range.range_type, DescriptorRangeType::Ubv);
    assert_eq!(range.resource_type, ResourceType::UniformBuffer);
    assert_eq!(range.number_of_descriptors, 1);
    assert_eq!(range.base_shader_register, 2);
    assert_eq!(range.register_space, 1);
    assert_eq!(range.base_shader_register_name, "PerFrame");
}

// ============================================================================
// ROOT SIGNATURE VALIDATION TESTS
// ============================================================================

#[test]
fn test_valid_layouts() {
    let _guard = recoverable();
    assert!(single_texture_desc().validate().is_ok());
    assert!(material_desc().validate().is_ok());
    assert!(RootSignatureDesc::default().validate().is_ok());
}

#[test]
fn test_empty_descriptor_table_rejected() {
    let _guard = recoverable();
    let desc = RootSignatureDesc::new(vec![RootParameter::descriptor_table(Vec::new())]);
    assert!(matches!(desc.validate(), Err(Error::ContractViolation(_))));
}

#[test]
fn test_descriptor_arrays_rejected() {
    let _guard = recoverable();
    let mut range = DescriptorRange::srv(0, "Maps", ResourceType::Texture2D, ShaderVisibility::Fragment);
    range.number_of_descriptors = 4;
    let desc = RootSignatureDesc::new(vec![RootParameter::descriptor_table(vec![range])]);
    assert!(desc.validate().is_err());
}

#[test]
fn test_range_type_mismatch_rejected() {
    let _guard = recoverable();
    let desc = RootSignatureDesc::new(vec![RootParameter::descriptor_table(vec![DescriptorRange::srv(
        0,
        "Uniforms",
        ResourceType::UniformBuffer,
        ShaderVisibility::Vertex,
    )])]);
    assert!(desc.validate().is_err());
}

#[test]
fn test_register_collision_rejected() {
    let _guard = recoverable();
    let desc = RootSignatureDesc::new(vec![RootParameter::descriptor_table(vec![
        DescriptorRange::srv(0, "A", ResourceType::Texture2D, ShaderVisibility::AllGraphics),
        DescriptorRange::srv(0, "B", ResourceType::Texture2D, ShaderVisibility::Fragment),
    ])]);
    assert!(desc.validate().is_err());
}

#[test]
fn test_same_register_distinct_stage_space_or_type_accepted() {
    let _guard = recoverable();
    let desc = RootSignatureDesc::new(vec![RootParameter::descriptor_table(vec![
        DescriptorRange::srv(0, "A", ResourceType::Texture2D, ShaderVisibility::Vertex),
        DescriptorRange::srv(0, "B", ResourceType::Texture2D, ShaderVisibility::Fragment),
        DescriptorRange::srv(0, "C", ResourceType::Texture2D, ShaderVisibility::Fragment).with_register_space(1),
        DescriptorRange::ubv(0, "D", ShaderVisibility::Fragment),
    ])]);
    assert!(desc.validate().is_ok());
}

// ============================================================================
// RESOURCE GROUP TESTS
// ============================================================================

#[test]
fn test_resource_group_single_texture_succeeds() {
    let _guard = recoverable();
    let root_signature = mock_root_signature(single_texture_desc()).unwrap();
    let texture = mock_texture_2d(64, 64);

    let group = root_signature
        .create_resource_group(0, vec![Some(ResourceHandle::Texture(texture))], None)
        .unwrap();
    assert_eq!(group.root_parameter_index(), 0);
    assert_eq!(group.resources().len(), 1);
    assert_eq!(group.sampler_states().len(), 1);
    assert!(group.sampler_states()[0].is_none());
    assert_eq!(group.data().ranges()[0].base_shader_register_name, "AlbedoMap");
}

#[test]
fn test_resource_group_slot_left_unbound() {
    let _guard = recoverable();
    let root_signature = mock_root_signature(material_desc()).unwrap();
    let uniform_buffer = mock_buffer(BufferKind::Uniform, 64);

    let group = root_signature
        .create_resource_group(0, vec![Some(ResourceHandle::Buffer(uniform_buffer)), None], None)
        .unwrap();
    assert_eq!(group.resources().len(), 2);
    assert!(group.resources()[0].is_some());
    assert!(group.resources()[1].is_none());

    // Unbound slots still count toward the range count
    let result = root_signature.create_resource_group(0, vec![None], None);
    assert!(matches!(result, Err(Error::ContractViolation(_))));

    // Bound slots are still type checked
    let texture = Some(ResourceHandle::Texture(mock_texture_2d(16, 16)));
    let result = root_signature.create_resource_group(0, vec![texture, None], None);
    assert!(result.is_err());
}

#[test]
fn test_resource_group_resource_count_mismatch_rejected() {
    let _guard = recoverable();
    let root_signature = mock_root_signature(single_texture_desc()).unwrap();
    let resources = vec![
        Some(ResourceHandle::Texture(mock_texture_2d(64, 64))),
        Some(ResourceHandle::Texture(mock_texture_2d(64, 64))),
    ];
    let result = root_signature.create_resource_group(0, resources, None);
    assert!(matches!(result, Err(Error::ContractViolation(_))));

    let result = root_signature.create_resource_group(0, Vec::new(), None);
    assert!(result.is_err());
}

#[test]
fn test_resource_group_type_mismatch_rejected() {
    let _guard = recoverable();
    let root_signature = mock_root_signature(single_texture_desc()).unwrap();
    let structured = mock_buffer(BufferKind::Structured { number_of_structure_bytes: 16 }, 64);
    let result = root_signature.create_resource_group(0, vec![Some(ResourceHandle::Buffer(structured))], None);
    assert!(result.is_err());
}

#[test]
fn test_resource_group_parameter_index_out_of_range_rejected() {
    let _guard = recoverable();
    let root_signature = mock_root_signature(single_texture_desc()).unwrap();
    let result =
        root_signature.create_resource_group(1, vec![Some(ResourceHandle::Texture(mock_texture_2d(4, 4)))], None);
    assert!(result.is_err());
}

#[test]
fn test_resource_group_with_samplers() {
    let _guard = recoverable();
    let root_signature = mock_root_signature(material_desc()).unwrap();
    let uniform_buffer = mock_buffer(BufferKind::Uniform, 64);
    let texture = mock_texture_2d(16, 16);
    let sampler = mock_sampler_state();

    let group = root_signature
        .create_resource_group(
            0,
            vec![Some(ResourceHandle::Buffer(uniform_buffer)), Some(ResourceHandle::Texture(texture))],
            Some(vec![None, Some(Arc::clone(&sampler))]),
        )
        .unwrap();
    assert!(group.sampler_states()[1].is_some());

    let sampler_group = root_signature
        .create_resource_group(1, vec![Some(ResourceHandle::SamplerState(sampler))], None)
        .unwrap();
    assert_eq!(sampler_group.root_parameter_index(), 1);
}

#[test]
fn test_resource_group_sampler_on_uniform_slot_rejected() {
    let _guard = recoverable();
    let root_signature = mock_root_signature(material_desc()).unwrap();
    let result = root_signature.create_resource_group(
        0,
        vec![
            Some(ResourceHandle::Buffer(mock_buffer(BufferKind::Uniform, 64))),
            Some(ResourceHandle::Texture(mock_texture_2d(16, 16))),
        ],
        Some(vec![Some(mock_sampler_state()), None]),
    );
    assert!(result.is_err());
}

#[test]
fn test_resource_group_sampler_count_mismatch_rejected() {
    let _guard = recoverable();
    let root_signature = mock_root_signature(single_texture_desc()).unwrap();
    let result = root_signature.create_resource_group(
        0,
        vec![Some(ResourceHandle::Texture(mock_texture_2d(16, 16)))],
        Some(vec![None, None]),
    );
    assert!(result.is_err());
}

#[test]
#[should_panic(expected = "contract violation")]
fn test_resource_group_mismatch_fatal_mode_panics() {
    let _guard = AssertModeGuard::new(AssertMode::Fatal);
    let root_signature = mock_root_signature(single_texture_desc()).unwrap();
    let _ = root_signature.create_resource_group(0, Vec::new(), None);
}
