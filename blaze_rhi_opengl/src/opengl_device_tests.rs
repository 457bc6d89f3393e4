//! Unit tests for opengl_device.rs
//!
//! Version parsing and capability derivation from driver limits.

use super::*;

fn desktop_limits() -> GlLimits {
    GlLimits {
        renderer: "Test Renderer".to_string(),
        max_texture_size: 16384,
        max_3d_texture_size: 2048,
        max_array_texture_layers: 2048,
        max_viewports: 16,
        max_draw_buffers: 8,
        max_color_attachments: 8,
        max_texture_buffer_size: 134_217_728,
        max_shader_storage_block_size: 2_147_483_647,
        max_uniform_block_size: 65536,
        max_samples: 32,
        max_anisotropy: 16.0,
        max_patch_vertices: 32,
        max_geometry_output_vertices: 256,
    }
}

// ============================================================================
// VERSION TESTS
// ============================================================================

#[test]
fn test_parse_version_with_vendor_suffix() {
    assert_eq!(parse_version("4.6.0 NVIDIA 550.54.14"), Some((4, 6)));
    assert_eq!(parse_version("4.3 (Core Profile) Mesa 23.2.1"), Some((4, 3)));
}

#[test]
fn test_parse_version_with_prefix() {
    assert_eq!(parse_version("OpenGL ES 3.2 Mesa"), Some((3, 2)));
}

#[test]
fn test_parse_version_rejects_garbage() {
    assert_eq!(parse_version(""), None);
    assert_eq!(parse_version("unknown"), None);
    assert_eq!(parse_version("4"), None);
}

#[test]
fn test_minimum_version_ordering() {
    assert!((4, 3) >= MINIMUM_VERSION);
    assert!((4, 6) >= MINIMUM_VERSION);
    assert!((3, 3) < MINIMUM_VERSION);
    assert!((4, 1) < MINIMUM_VERSION);
}

// ============================================================================
// CAPABILITY TESTS
// ============================================================================

#[test]
fn test_capabilities_from_desktop_limits() {
    let capabilities = desktop_limits().capabilities();

    assert_eq!(capabilities.device_name, "Test Renderer");
    assert_eq!(capabilities.maximum_texture_dimension, 16384);
    assert_eq!(capabilities.maximum_number_of_2d_texture_array_slices, 2048);
    assert_eq!(capabilities.maximum_number_of_cube_texture_array_slices, 341);
    assert_eq!(capabilities.maximum_uniform_buffer_size, 65536);
    assert_eq!(capabilities.maximum_number_of_viewports, 16);
    assert_eq!(capabilities.maximum_indirect_buffer_size, u32::MAX);
    assert_eq!(capabilities.maximum_anisotropy, 16);
    assert_eq!(capabilities.maximum_number_of_patch_vertices, 32);
}

#[test]
fn test_capabilities_describe_opengl_conventions() {
    let capabilities = desktop_limits().capabilities();

    assert!(!capabilities.upper_left_origin);
    assert!(!capabilities.zero_to_one_clip_z);
    assert!(!capabilities.shader_bytecode);
    assert!(!capabilities.mesh_shader);
    assert!(!capabilities.native_multithreading);
    assert!(capabilities.compute_shader);
    assert!(capabilities.base_vertex);
    assert!(capabilities.draw_instanced);
    assert!(capabilities.tessellation_shaders());
    assert!(capabilities.geometry_shader());
}

#[test]
fn test_capabilities_clamp_to_rhi_ranges() {
    let capabilities = desktop_limits().capabilities();

    // Driver reports 32 samples and 8 render targets; the RHI caps both at 8
    assert_eq!(capabilities.maximum_number_of_multisamples, 8);
    assert_eq!(capabilities.maximum_number_of_simultaneous_render_targets, 8);

    let limits = GlLimits { max_draw_buffers: 4, max_anisotropy: 1.0, ..desktop_limits() };
    let capabilities = limits.capabilities();
    assert_eq!(capabilities.maximum_number_of_simultaneous_render_targets, 4);
    assert_eq!(capabilities.maximum_anisotropy, 1);
}

#[test]
fn test_capabilities_survive_zeroed_limits() {
    let capabilities = GlLimits::default().capabilities();

    assert_eq!(capabilities.maximum_number_of_viewports, 1);
    assert_eq!(capabilities.maximum_number_of_simultaneous_render_targets, 1);
    assert_eq!(capabilities.maximum_number_of_multisamples, 1);
    assert_eq!(capabilities.maximum_anisotropy, 1);
    assert_eq!(capabilities.maximum_texture_dimension, 0);
}

#[test]
fn test_texture_limits_from_driver_limits() {
    let limits = desktop_limits().texture_limits();

    assert_eq!(
        limits,
        TextureLimits {
            maximum_texture_dimension: 16384,
            maximum_3d_texture_dimension: 2048,
            maximum_array_slices: 2048,
            maximum_number_of_multisamples: 8,
        }
    );
}
