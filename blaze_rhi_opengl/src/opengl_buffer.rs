/// Buffer, VertexArray and BufferManager - OpenGL implementations
///
/// Buffers are created and updated through the COPY_WRITE_BUFFER binding
/// point so the bindings seen by draw calls are never disturbed.

use std::any::Any;
use std::ffi::c_void;
use std::sync::Arc;
use blaze_rhi::blaze::rhi::{
    validate_buffer_update, validate_vertex_array, Buffer as RhiBuffer, BufferDesc, BufferInfo,
    BufferKind, BufferManager as RhiBufferManager, IndexBufferFormat, IndirectBufferFlags, MapType,
    Resource, ResourceType, TextureFormat, VertexArray as RhiVertexArray, VertexAttributes,
    DRAW_ARGUMENTS_STRIDE, DRAW_INDEXED_ARGUMENTS_STRIDE, DRAW_MESH_TASKS_ARGUMENTS_STRIDE,
};
use blaze_rhi::blaze::{Error, Result};
use blaze_rhi::{rhi_assert, rhi_bail, rhi_violation};
use gl::types::{GLintptr, GLsizei, GLsizeiptr, GLuint};

use crate::opengl_context::{get_binding, GlContext};
use crate::opengl_mapping;

const SOURCE: &str = "blaze::opengl::Buffer";

// ============================================================================
// Buffer
// ============================================================================

/// OpenGL buffer object
pub struct Buffer {
    /// Shared GL context (labels, error checks)
    ctx: Arc<GlContext>,
    /// Buffer object name
    pub(crate) name: GLuint,
    /// Buffer texture viewing `name` (texture buffers only)
    pub(crate) texture: GLuint,
    info: BufferInfo,
}

impl Buffer {
    /// Create a buffer object of `kind` and upload the initial data
    pub(crate) fn create(ctx: Arc<GlContext>, kind: BufferKind, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Self> {
        desc.validate(data)?;

        let mut name: GLuint = 0;
        unsafe {
            gl::GenBuffers(1, &mut name);
            let previous = get_binding(gl::COPY_WRITE_BUFFER_BINDING);
            gl::BindBuffer(gl::COPY_WRITE_BUFFER, name);
            gl::BufferData(
                gl::COPY_WRITE_BUFFER,
                desc.number_of_bytes as GLsizeiptr,
                data.map_or(std::ptr::null(), |data| data.as_ptr() as *const c_void),
                opengl_mapping::buffer_usage(desc.usage),
            );
            gl::BindBuffer(gl::COPY_WRITE_BUFFER, previous);
        }

        let mut buffer = Self {
            ctx: Arc::clone(&ctx),
            name,
            texture: 0,
            info: BufferInfo { kind, desc: desc.clone() },
        };
        // From here on Drop releases the names if anything fails
        ctx.check_error(&format!("creating buffer '{}'", desc.debug_name))?;

        if let BufferKind::Texture(format) = kind {
            let mapping = opengl_mapping::texture_format(format)?;
            unsafe {
                gl::GenTextures(1, &mut buffer.texture);
                let previous = get_binding(gl::TEXTURE_BINDING_BUFFER);
                gl::BindTexture(gl::TEXTURE_BUFFER, buffer.texture);
                gl::TexBuffer(gl::TEXTURE_BUFFER, mapping.internal_format, name);
                gl::BindTexture(gl::TEXTURE_BUFFER, previous);
            }
            ctx.check_error(&format!("creating buffer texture '{}'", desc.debug_name))?;
            ctx.label(gl::TEXTURE, buffer.texture, &desc.debug_name);
        }

        ctx.label(gl::BUFFER, name, &desc.debug_name);
        Ok(buffer)
    }

    /// Map the whole buffer, run `f` on its bytes, unmap
    pub(crate) fn map(&self, map_type: MapType, f: &mut dyn FnMut(&mut [u8])) -> Result<()> {
        let size = self.info.desc.number_of_bytes as usize;
        unsafe {
            let previous = get_binding(gl::COPY_WRITE_BUFFER_BINDING);
            gl::BindBuffer(gl::COPY_WRITE_BUFFER, self.name);
            let pointer = gl::MapBufferRange(
                gl::COPY_WRITE_BUFFER,
                0,
                size as GLsizeiptr,
                opengl_mapping::map_access(map_type),
            );
            if pointer.is_null() {
                gl::BindBuffer(gl::COPY_WRITE_BUFFER, previous);
                self.ctx.check_error("glMapBufferRange")?;
                rhi_bail!(SOURCE, "failed to map buffer '{}'", self.info.desc.debug_name);
            }
            f(std::slice::from_raw_parts_mut(pointer as *mut u8, size));
            let intact = gl::UnmapBuffer(gl::COPY_WRITE_BUFFER);
            gl::BindBuffer(gl::COPY_WRITE_BUFFER, previous);
            if intact == gl::FALSE {
                rhi_bail!(SOURCE, "buffer '{}' content was lost while mapped", self.info.desc.debug_name);
            }
        }
        Ok(())
    }
}

impl Resource for Buffer {
    fn resource_type(&self) -> ResourceType {
        self.info.kind.resource_type()
    }

    fn debug_name(&self) -> &str {
        &self.info.desc.debug_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiBuffer for Buffer {
    fn info(&self) -> &BufferInfo {
        &self.info
    }

    fn update(&self, offset: u32, data: &[u8]) -> Result<()> {
        validate_buffer_update(&self.info, offset, data)?;
        if data.is_empty() {
            return Ok(());
        }
        unsafe {
            let previous = get_binding(gl::COPY_WRITE_BUFFER_BINDING);
            gl::BindBuffer(gl::COPY_WRITE_BUFFER, self.name);
            gl::BufferSubData(
                gl::COPY_WRITE_BUFFER,
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            );
            gl::BindBuffer(gl::COPY_WRITE_BUFFER, previous);
        }
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            if self.texture != 0 {
                gl::DeleteTextures(1, &self.texture);
            }
            gl::DeleteBuffers(1, &self.name);
        }
    }
}

/// The OpenGL buffer behind an RHI buffer
pub(crate) fn gl_buffer(buffer: &dyn RhiBuffer) -> Result<&Buffer> {
    match buffer.as_any().downcast_ref::<Buffer>() {
        Some(buffer) => Ok(buffer),
        None => rhi_violation!(SOURCE, "buffer '{}' wasn't created by the OpenGL device", buffer.debug_name()),
    }
}

// ============================================================================
// VertexArray
// ============================================================================

/// Vertex array object
///
/// Attribute `i` of the vertex attributes reads location `i`; graphics
/// programs bind their inputs to the same locations before linking.
pub struct VertexArray {
    pub(crate) name: GLuint,
    vertex_attributes: VertexAttributes,
    vertex_buffers: Vec<Arc<dyn RhiBuffer>>,
    index_buffer: Option<Arc<dyn RhiBuffer>>,
}

impl VertexArray {
    pub(crate) fn create(
        ctx: Arc<GlContext>,
        vertex_attributes: &VertexAttributes,
        vertex_buffers: Vec<Arc<dyn RhiBuffer>>,
        index_buffer: Option<Arc<dyn RhiBuffer>>,
    ) -> Result<Self> {
        validate_vertex_array(vertex_attributes, &vertex_buffers, index_buffer.as_ref())?;

        let buffer_names = vertex_buffers
            .iter()
            .map(|buffer| gl_buffer(buffer.as_ref()).map(|buffer| buffer.name))
            .collect::<Result<Vec<GLuint>>>()?;
        let index_buffer_name = match &index_buffer {
            Some(index_buffer) => Some(gl_buffer(index_buffer.as_ref())?.name),
            None => None,
        };

        let mut name: GLuint = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut name);
        }
        let vertex_array = Self {
            name,
            vertex_attributes: vertex_attributes.clone(),
            vertex_buffers,
            index_buffer,
        };

        unsafe {
            let previous_vertex_array = get_binding(gl::VERTEX_ARRAY_BINDING);
            let previous_array_buffer = get_binding(gl::ARRAY_BUFFER_BINDING);
            gl::BindVertexArray(name);

            for (location, attribute) in vertex_array.vertex_attributes.attributes.iter().enumerate() {
                let format = opengl_mapping::vertex_attribute_format(attribute.format);
                let location = location as GLuint;
                let offset = attribute.aligned_byte_offset as usize as *const c_void;

                gl::BindBuffer(gl::ARRAY_BUFFER, buffer_names[attribute.input_slot as usize]);
                gl::EnableVertexAttribArray(location);
                if format.integer {
                    gl::VertexAttribIPointer(
                        location,
                        format.number_of_components,
                        format.data_type,
                        attribute.stride_in_bytes as GLsizei,
                        offset,
                    );
                } else {
                    gl::VertexAttribPointer(
                        location,
                        format.number_of_components,
                        format.data_type,
                        format.normalized,
                        attribute.stride_in_bytes as GLsizei,
                        offset,
                    );
                }
                gl::VertexAttribDivisor(location, attribute.instances_per_element);
            }

            // Element array binding is VAO state
            if let Some(index_buffer_name) = index_buffer_name {
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, index_buffer_name);
            }

            gl::BindVertexArray(previous_vertex_array);
            gl::BindBuffer(gl::ARRAY_BUFFER, previous_array_buffer);
        }

        ctx.check_error("creating vertex array")?;
        Ok(vertex_array)
    }
}

impl Resource for VertexArray {
    fn resource_type(&self) -> ResourceType {
        ResourceType::VertexArray
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiVertexArray for VertexArray {
    fn vertex_attributes(&self) -> &VertexAttributes {
        &self.vertex_attributes
    }

    fn vertex_buffers(&self) -> &[Arc<dyn RhiBuffer>] {
        &self.vertex_buffers
    }

    fn index_buffer(&self) -> Option<&Arc<dyn RhiBuffer>> {
        self.index_buffer.as_ref()
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.name);
        }
    }
}

// ============================================================================
// BufferManager
// ============================================================================

/// Creates OpenGL buffers and vertex arrays
pub struct BufferManager {
    ctx: Arc<GlContext>,
    /// Largest uniform block the driver accepts, in bytes
    maximum_uniform_buffer_size: u32,
}

impl BufferManager {
    pub(crate) fn new(ctx: Arc<GlContext>, maximum_uniform_buffer_size: u32) -> Self {
        Self { ctx, maximum_uniform_buffer_size }
    }

    fn create(&self, kind: BufferKind, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn RhiBuffer>> {
        Ok(Arc::new(Buffer::create(Arc::clone(&self.ctx), kind, desc, data)?))
    }
}

/// Argument record stride of an indirect buffer, None when the flags mix record kinds
pub fn indirect_buffer_stride(flags: IndirectBufferFlags) -> Option<u32> {
    if flags == IndirectBufferFlags::DRAW_ARGUMENTS {
        Some(DRAW_ARGUMENTS_STRIDE)
    } else if flags == IndirectBufferFlags::DRAW_INDEXED_ARGUMENTS {
        Some(DRAW_INDEXED_ARGUMENTS_STRIDE)
    } else if flags == IndirectBufferFlags::DRAW_MESH_TASKS_ARGUMENTS {
        Some(DRAW_MESH_TASKS_ARGUMENTS_STRIDE)
    } else {
        None
    }
}

impl RhiBufferManager for BufferManager {
    fn create_vertex_buffer(&self, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn RhiBuffer>> {
        self.create(BufferKind::Vertex, desc, data)
    }

    fn create_index_buffer(
        &self,
        desc: &BufferDesc,
        format: IndexBufferFormat,
        data: Option<&[u8]>,
    ) -> Result<Arc<dyn RhiBuffer>> {
        rhi_assert!(
            desc.number_of_bytes % format.number_of_bytes() == 0,
            SOURCE,
            "index buffer '{}' size {} isn't a multiple of the {:?} index size",
            desc.debug_name,
            desc.number_of_bytes,
            format
        );
        self.create(BufferKind::Index(format), desc, data)
    }

    fn create_vertex_array(
        &self,
        vertex_attributes: &VertexAttributes,
        vertex_buffers: Vec<Arc<dyn RhiBuffer>>,
        index_buffer: Option<Arc<dyn RhiBuffer>>,
    ) -> Result<Arc<dyn RhiVertexArray>> {
        Ok(Arc::new(VertexArray::create(
            Arc::clone(&self.ctx),
            vertex_attributes,
            vertex_buffers,
            index_buffer,
        )?))
    }

    fn create_uniform_buffer(&self, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn RhiBuffer>> {
        if desc.number_of_bytes > self.maximum_uniform_buffer_size {
            return Err(Error::Unsupported(format!(
                "uniform buffer '{}' is {} bytes, the driver allows {}",
                desc.debug_name, desc.number_of_bytes, self.maximum_uniform_buffer_size
            )));
        }
        self.create(BufferKind::Uniform, desc, data)
    }

    fn create_texture_buffer(
        &self,
        desc: &BufferDesc,
        format: TextureFormat,
        data: Option<&[u8]>,
    ) -> Result<Arc<dyn RhiBuffer>> {
        rhi_assert!(
            !format.is_compressed() && !format.is_depth() && format != TextureFormat::Unknown,
            SOURCE,
            "texture buffer '{}' can't use format {:?}",
            desc.debug_name,
            format
        );
        self.create(BufferKind::Texture(format), desc, data)
    }

    fn create_structured_buffer(
        &self,
        desc: &BufferDesc,
        number_of_structure_bytes: u32,
        data: Option<&[u8]>,
    ) -> Result<Arc<dyn RhiBuffer>> {
        rhi_assert!(
            number_of_structure_bytes > 0 && desc.number_of_bytes % number_of_structure_bytes == 0,
            SOURCE,
            "structured buffer '{}' size {} isn't a multiple of its {} byte structure",
            desc.debug_name,
            desc.number_of_bytes,
            number_of_structure_bytes
        );
        self.create(BufferKind::Structured { number_of_structure_bytes }, desc, data)
    }

    fn create_indirect_buffer(
        &self,
        desc: &BufferDesc,
        flags: IndirectBufferFlags,
        data: Option<&[u8]>,
    ) -> Result<Arc<dyn RhiBuffer>> {
        let Some(stride) = indirect_buffer_stride(flags) else {
            rhi_violation!(
                SOURCE,
                "indirect buffer '{}' must hold exactly one kind of argument record, got {:?}",
                desc.debug_name,
                flags
            );
        };
        rhi_assert!(
            desc.number_of_bytes % stride == 0,
            SOURCE,
            "indirect buffer '{}' size {} isn't a multiple of the {} byte record",
            desc.debug_name,
            desc.number_of_bytes,
            stride
        );
        self.create(BufferKind::Indirect(flags), desc, data)
    }
}

#[cfg(test)]
#[path = "opengl_buffer_tests.rs"]
mod tests;
