/// Device capabilities

use crate::rhi::TextureFormat;

/// Read-only description of what a device supports
///
/// Queried once after device creation; consumers use it to pick code paths
/// (instancing, mesh shaders, compute).
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    /// Name of the device (renderer string for OpenGL)
    pub device_name: String,
    /// Preferred swap chain color format
    pub preferred_swap_chain_color_texture_format: TextureFormat,
    /// Preferred swap chain depth format
    pub preferred_swap_chain_depth_stencil_texture_format: TextureFormat,
    pub maximum_number_of_viewports: u32,
    pub maximum_number_of_simultaneous_render_targets: u32,
    /// Maximum width/height of 1D and 2D textures
    pub maximum_texture_dimension: u32,
    pub maximum_number_of_1d_texture_array_slices: u32,
    pub maximum_number_of_2d_texture_array_slices: u32,
    pub maximum_number_of_cube_texture_array_slices: u32,
    /// Bytes; 0 = texture buffers unsupported
    pub maximum_texture_buffer_size: u32,
    /// Bytes; 0 = structured buffers unsupported
    pub maximum_structured_buffer_size: u32,
    /// Bytes; 0 = indirect buffers unsupported
    pub maximum_indirect_buffer_size: u32,
    /// Bytes; 0 = uniform buffers unsupported
    pub maximum_uniform_buffer_size: u32,
    pub maximum_number_of_multisamples: u8,
    pub maximum_anisotropy: u8,
    /// Texture coordinate origin is the upper left corner
    pub upper_left_origin: bool,
    /// Clip space depth is [0, 1] instead of [-1, 1]
    pub zero_to_one_clip_z: bool,
    /// Loose uniforms outside of uniform buffers
    pub individual_uniforms: bool,
    /// Per-instance vertex attributes
    pub instanced_arrays: bool,
    /// Instanced draw calls
    pub draw_instanced: bool,
    /// Base vertex on indexed draws
    pub base_vertex: bool,
    /// Resources can be created from another thread
    pub native_multithreading: bool,
    /// Shaders can be loaded from bytecode
    pub shader_bytecode: bool,
    pub vertex_shader: bool,
    /// 0 = no tessellation
    pub maximum_number_of_patch_vertices: u32,
    /// 0 = no geometry shader
    pub maximum_number_of_geometry_shader_output_vertices: u32,
    pub fragment_shader: bool,
    pub mesh_shader: bool,
    pub compute_shader: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            device_name: String::new(),
            preferred_swap_chain_color_texture_format: TextureFormat::R8G8B8A8,
            preferred_swap_chain_depth_stencil_texture_format: TextureFormat::D32_FLOAT,
            maximum_number_of_viewports: 1,
            maximum_number_of_simultaneous_render_targets: 1,
            maximum_texture_dimension: 0,
            maximum_number_of_1d_texture_array_slices: 0,
            maximum_number_of_2d_texture_array_slices: 0,
            maximum_number_of_cube_texture_array_slices: 0,
            maximum_texture_buffer_size: 0,
            maximum_structured_buffer_size: 0,
            maximum_indirect_buffer_size: 0,
            maximum_uniform_buffer_size: 0,
            maximum_number_of_multisamples: 1,
            maximum_anisotropy: 1,
            upper_left_origin: false,
            zero_to_one_clip_z: false,
            individual_uniforms: false,
            instanced_arrays: false,
            draw_instanced: false,
            base_vertex: false,
            native_multithreading: false,
            shader_bytecode: false,
            vertex_shader: false,
            maximum_number_of_patch_vertices: 0,
            maximum_number_of_geometry_shader_output_vertices: 0,
            fragment_shader: false,
            mesh_shader: false,
            compute_shader: false,
        }
    }
}

impl Capabilities {
    pub fn tessellation_shaders(&self) -> bool {
        self.maximum_number_of_patch_vertices > 0
    }

    pub fn geometry_shader(&self) -> bool {
        self.maximum_number_of_geometry_shader_output_vertices > 0
    }
}
