/// Buffer and texture managers: descriptor -> resource factories

use std::sync::Arc;
use crate::error::Result;
use crate::rhi::{
    Buffer, BufferDesc, IndexBufferFormat, IndirectBufferFlags, OptimizedTextureClearValue,
    Texture, TextureDesc, TextureDimension, TextureFormat, VertexArray, VertexAttributes,
};
use crate::rhi_assert;

const SOURCE: &str = "blaze::rhi::TextureManager";

/// Creates buffers and vertex arrays
///
/// Every method validates its descriptor (see `BufferDesc::validate`) before
/// creating the native buffer.
pub trait BufferManager {
    fn create_vertex_buffer(&self, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>>;

    fn create_index_buffer(
        &self,
        desc: &BufferDesc,
        format: IndexBufferFormat,
        data: Option<&[u8]>,
    ) -> Result<Arc<dyn Buffer>>;

    /// Bundle vertex buffers (one per input slot) and an optional index buffer
    fn create_vertex_array(
        &self,
        vertex_attributes: &VertexAttributes,
        vertex_buffers: Vec<Arc<dyn Buffer>>,
        index_buffer: Option<Arc<dyn Buffer>>,
    ) -> Result<Arc<dyn VertexArray>>;

    fn create_uniform_buffer(&self, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>>;

    fn create_texture_buffer(
        &self,
        desc: &BufferDesc,
        format: TextureFormat,
        data: Option<&[u8]>,
    ) -> Result<Arc<dyn Buffer>>;

    fn create_structured_buffer(
        &self,
        desc: &BufferDesc,
        number_of_structure_bytes: u32,
        data: Option<&[u8]>,
    ) -> Result<Arc<dyn Buffer>>;

    fn create_indirect_buffer(
        &self,
        desc: &BufferDesc,
        flags: IndirectBufferFlags,
        data: Option<&[u8]>,
    ) -> Result<Arc<dyn Buffer>>;
}

/// Creates textures
pub trait TextureManager {
    /// Create a texture of any dimension
    ///
    /// Implementations must call `desc.validate(data)` first: render targets
    /// can't be initialized with data, among other rules.
    fn create_texture(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>>;

    fn create_texture_1d(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>> {
        create_with_dimension(self, TextureDimension::Texture1D, desc, data, None)
    }

    fn create_texture_1d_array(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>> {
        create_with_dimension(self, TextureDimension::Texture1DArray, desc, data, None)
    }

    /// # Arguments
    ///
    /// * `desc` - 2D texture descriptor
    /// * `data` - Initial pixels (must be None for render targets)
    /// * `optimized_clear_value` - Clear value render target clears are optimized for
    fn create_texture_2d(
        &self,
        desc: &TextureDesc,
        data: Option<&[u8]>,
        optimized_clear_value: Option<OptimizedTextureClearValue>,
    ) -> Result<Arc<dyn Texture>> {
        create_with_dimension(self, TextureDimension::Texture2D, desc, data, optimized_clear_value)
    }

    fn create_texture_2d_array(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>> {
        create_with_dimension(self, TextureDimension::Texture2DArray, desc, data, None)
    }

    fn create_texture_3d(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>> {
        create_with_dimension(self, TextureDimension::Texture3D, desc, data, None)
    }

    fn create_texture_cube(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>> {
        create_with_dimension(self, TextureDimension::TextureCube, desc, data, None)
    }

    fn create_texture_cube_array(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>> {
        create_with_dimension(self, TextureDimension::TextureCubeArray, desc, data, None)
    }
}

fn create_with_dimension<M: TextureManager + ?Sized>(
    manager: &M,
    dimension: TextureDimension,
    desc: &TextureDesc,
    data: Option<&[u8]>,
    optimized_clear_value: Option<OptimizedTextureClearValue>,
) -> Result<Arc<dyn Texture>> {
    rhi_assert!(
        desc.dimension == dimension,
        SOURCE,
        "{:?} descriptor passed to the {:?} factory",
        desc.dimension,
        dimension
    );
    match optimized_clear_value {
        Some(value) => {
            let mut desc = desc.clone();
            desc.optimized_clear_value = Some(value);
            manager.create_texture(&desc, data)
        }
        None => manager.create_texture(desc, data),
    }
}
