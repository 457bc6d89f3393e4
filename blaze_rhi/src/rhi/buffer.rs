/// Buffer traits, buffer descriptor, vertex attribute layout and vertex array

use std::sync::Arc;
use bitflags::bitflags;
use crate::error::Result;
use crate::rhi::{Resource, ResourceType, TextureFormat};
use crate::rhi_assert;

const SOURCE: &str = "blaze::rhi::Buffer";

/// Buffer usage (update frequency x access pattern)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    StreamDraw,
    StreamRead,
    StreamCopy,
    #[default]
    StaticDraw,
    StaticRead,
    StaticCopy,
    DynamicDraw,
    DynamicRead,
    DynamicCopy,
}

impl BufferUsage {
    /// Written once at creation time
    pub fn is_static(self) -> bool {
        matches!(self, BufferUsage::StaticDraw | BufferUsage::StaticRead | BufferUsage::StaticCopy)
    }

    pub fn is_dynamic(self) -> bool {
        !self.is_static()
    }
}

bitflags! {
    /// Buffer creation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BufferFlags: u32 {
        /// Can be written by shaders (UAV / shader storage)
        const UNORDERED_ACCESS = 1 << 0;
        /// Can be read by shaders (SRV)
        const SHADER_RESOURCE  = 1 << 1;
    }
}

bitflags! {
    /// Argument layouts an indirect buffer may contain
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IndirectBufferFlags: u32 {
        const DRAW_ARGUMENTS            = 1 << 0;
        const DRAW_INDEXED_ARGUMENTS    = 1 << 1;
        const DRAW_MESH_TASKS_ARGUMENTS = 1 << 2;
    }
}

/// `DrawArguments` record size in an indirect buffer
pub const DRAW_ARGUMENTS_STRIDE: u32 = 16;
/// `DrawIndexedArguments` record size in an indirect buffer
pub const DRAW_INDEXED_ARGUMENTS_STRIDE: u32 = 20;
/// `DrawMeshTasksArguments` record size in an indirect buffer
pub const DRAW_MESH_TASKS_ARGUMENTS_STRIDE: u32 = 8;

/// Index element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexBufferFormat {
    UnsignedChar,
    UnsignedShort,
    UnsignedInt,
}

impl IndexBufferFormat {
    pub fn number_of_bytes(self) -> u32 {
        match self {
            IndexBufferFormat::UnsignedChar => 1,
            IndexBufferFormat::UnsignedShort => 2,
            IndexBufferFormat::UnsignedInt => 4,
        }
    }
}

// ===== VERTEX ATTRIBUTES =====

/// Vertex attribute element format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    Float1,
    Float2,
    Float3,
    Float4,
    /// Four unsigned bytes, normalized to [0, 1]
    R8G8B8A8Unorm,
    /// Four unsigned bytes, integer in the shader
    R8G8B8A8Uint,
    /// Two signed shorts, converted to float
    Short2,
    /// Four signed shorts, converted to float
    Short4,
    /// One unsigned int, integer in the shader
    Uint1,
}

impl VertexAttributeFormat {
    pub fn number_of_components(self) -> u32 {
        match self {
            VertexAttributeFormat::Float1 | VertexAttributeFormat::Uint1 => 1,
            VertexAttributeFormat::Float2 | VertexAttributeFormat::Short2 => 2,
            VertexAttributeFormat::Float3 => 3,
            VertexAttributeFormat::Float4
            | VertexAttributeFormat::R8G8B8A8Unorm
            | VertexAttributeFormat::R8G8B8A8Uint
            | VertexAttributeFormat::Short4 => 4,
        }
    }

    pub fn number_of_bytes(self) -> u32 {
        match self {
            VertexAttributeFormat::Float1 => 4,
            VertexAttributeFormat::Float2 => 8,
            VertexAttributeFormat::Float3 => 12,
            VertexAttributeFormat::Float4 => 16,
            VertexAttributeFormat::R8G8B8A8Unorm | VertexAttributeFormat::R8G8B8A8Uint => 4,
            VertexAttributeFormat::Short2 => 4,
            VertexAttributeFormat::Short4 => 8,
            VertexAttributeFormat::Uint1 => 4,
        }
    }

    /// Read as integer (not float) in the shader
    pub fn is_integer(self) -> bool {
        matches!(self, VertexAttributeFormat::R8G8B8A8Uint | VertexAttributeFormat::Uint1)
    }

    pub fn is_normalized(self) -> bool {
        matches!(self, VertexAttributeFormat::R8G8B8A8Unorm)
    }
}

/// One vertex attribute
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    pub format: VertexAttributeFormat,
    /// Attribute name in the shader source (e.g. "Position")
    pub name: String,
    pub semantic_name: String,
    pub semantic_index: u32,
    /// Vertex buffer slot of the vertex array the attribute is read from
    pub input_slot: u32,
    pub aligned_byte_offset: u32,
    pub stride_in_bytes: u32,
    /// 0 = per vertex, n = advance every n instances
    pub instances_per_element: u32,
}

impl VertexAttribute {
    /// Per-vertex attribute in slot 0
    pub fn new(name: impl Into<String>, format: VertexAttributeFormat, aligned_byte_offset: u32, stride_in_bytes: u32) -> Self {
        let name = name.into();
        Self {
            format,
            semantic_name: name.to_uppercase(),
            name,
            semantic_index: 0,
            input_slot: 0,
            aligned_byte_offset,
            stride_in_bytes,
            instances_per_element: 0,
        }
    }

    pub fn with_input_slot(mut self, input_slot: u32) -> Self {
        self.input_slot = input_slot;
        self
    }

    pub fn with_instances_per_element(mut self, instances_per_element: u32) -> Self {
        self.instances_per_element = instances_per_element;
        self
    }
}

/// Vertex attribute layout shared by vertex arrays and graphics pipeline states
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexAttributes {
    pub attributes: Vec<VertexAttribute>,
}

impl VertexAttributes {
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self { attributes }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Vertex buffers needed (highest input slot + 1)
    pub fn number_of_input_slots(&self) -> u32 {
        self.attributes.iter().map(|a| a.input_slot + 1).max().unwrap_or(0)
    }

    pub fn validate(&self) -> Result<()> {
        for (index, attribute) in self.attributes.iter().enumerate() {
            rhi_assert!(!attribute.name.is_empty(), SOURCE, "vertex attribute {} has no name", index);
            rhi_assert!(
                attribute.stride_in_bytes == 0
                    || attribute.aligned_byte_offset + attribute.format.number_of_bytes() <= attribute.stride_in_bytes,
                SOURCE,
                "vertex attribute '{}' ends past its stride of {} bytes",
                attribute.name,
                attribute.stride_in_bytes
            );
            let duplicate = self.attributes[..index].iter().any(|other| other.name == attribute.name);
            rhi_assert!(!duplicate, SOURCE, "vertex attribute '{}' declared twice", attribute.name);
        }
        Ok(())
    }
}

// ===== BUFFER DESC =====

/// Descriptor for creating a buffer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BufferDesc {
    /// Size in bytes
    pub number_of_bytes: u32,
    pub usage: BufferUsage,
    pub flags: BufferFlags,
    pub debug_name: String,
}

impl BufferDesc {
    pub fn new(number_of_bytes: u32, usage: BufferUsage) -> Self {
        Self {
            number_of_bytes,
            usage,
            flags: BufferFlags::empty(),
            debug_name: String::new(),
        }
    }

    pub fn with_flags(mut self, flags: BufferFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_debug_name(mut self, name: impl Into<String>) -> Self {
        self.debug_name = name.into();
        self
    }

    /// Check the descriptor and the optional initial data against each other
    ///
    /// A static buffer is never written after creation, so creating one
    /// without data is a caller bug.
    pub fn validate(&self, data: Option<&[u8]>) -> Result<()> {
        rhi_assert!(self.number_of_bytes > 0, SOURCE, "buffer '{}' has zero size", self.debug_name);
        match data {
            Some(data) => {
                rhi_assert!(
                    data.len() == self.number_of_bytes as usize,
                    SOURCE,
                    "buffer '{}' data is {} bytes, descriptor says {}",
                    self.debug_name,
                    data.len(),
                    self.number_of_bytes
                );
            }
            None => {
                rhi_assert!(
                    self.usage.is_dynamic() || self.flags.contains(BufferFlags::UNORDERED_ACCESS),
                    SOURCE,
                    "static buffer '{}' created without data",
                    self.debug_name
                );
            }
        }
        Ok(())
    }
}

/// What a buffer is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index(IndexBufferFormat),
    Uniform,
    /// Typed buffer read through a texture view
    Texture(TextureFormat),
    Structured { number_of_structure_bytes: u32 },
    Indirect(IndirectBufferFlags),
}

impl BufferKind {
    pub fn resource_type(self) -> ResourceType {
        match self {
            BufferKind::Vertex => ResourceType::VertexBuffer,
            BufferKind::Index(_) => ResourceType::IndexBuffer,
            BufferKind::Uniform => ResourceType::UniformBuffer,
            BufferKind::Texture(_) => ResourceType::TextureBuffer,
            BufferKind::Structured { .. } => ResourceType::StructuredBuffer,
            BufferKind::Indirect(_) => ResourceType::IndirectBuffer,
        }
    }
}

/// Read-only properties of a created buffer
#[derive(Debug, Clone, PartialEq)]
pub struct BufferInfo {
    pub kind: BufferKind,
    pub desc: BufferDesc,
}

// ===== BUFFER TRAITS =====

/// Buffer resource
pub trait Buffer: Resource {
    /// Kind and descriptor the buffer was created with
    fn info(&self) -> &BufferInfo;

    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset in bytes into the buffer
    /// * `data` - Bytes to write
    fn update(&self, offset: u32, data: &[u8]) -> Result<()>;

    fn kind(&self) -> BufferKind {
        self.info().kind
    }

    fn number_of_bytes(&self) -> u32 {
        self.info().desc.number_of_bytes
    }
}

/// Check an update range against a buffer
pub fn validate_buffer_update(info: &BufferInfo, offset: u32, data: &[u8]) -> Result<()> {
    let end = offset as u64 + data.len() as u64;
    rhi_assert!(
        end <= info.desc.number_of_bytes as u64,
        SOURCE,
        "update of {} bytes at offset {} overflows buffer '{}' ({} bytes)",
        data.len(),
        offset,
        info.desc.debug_name,
        info.desc.number_of_bytes
    );
    Ok(())
}

/// Vertex buffers + optional index buffer + attribute layout
pub trait VertexArray: Resource {
    fn vertex_attributes(&self) -> &VertexAttributes;

    /// Vertex buffers, indexed by input slot
    fn vertex_buffers(&self) -> &[Arc<dyn Buffer>];

    fn index_buffer(&self) -> Option<&Arc<dyn Buffer>>;

    /// Index format of the index buffer, if any
    fn index_format(&self) -> Option<IndexBufferFormat> {
        match self.index_buffer()?.kind() {
            BufferKind::Index(format) => Some(format),
            _ => None,
        }
    }
}

/// Check the pieces of a vertex array before the backend builds it
pub fn validate_vertex_array(
    vertex_attributes: &VertexAttributes,
    vertex_buffers: &[Arc<dyn Buffer>],
    index_buffer: Option<&Arc<dyn Buffer>>,
) -> Result<()> {
    vertex_attributes.validate()?;
    rhi_assert!(
        vertex_buffers.len() as u32 >= vertex_attributes.number_of_input_slots(),
        SOURCE,
        "vertex array has {} vertex buffers, attributes read {} slots",
        vertex_buffers.len(),
        vertex_attributes.number_of_input_slots()
    );
    for (slot, buffer) in vertex_buffers.iter().enumerate() {
        rhi_assert!(
            buffer.kind() == BufferKind::Vertex,
            SOURCE,
            "vertex array slot {} holds a {:?} buffer",
            slot,
            buffer.kind()
        );
    }
    if let Some(index_buffer) = index_buffer {
        rhi_assert!(
            matches!(index_buffer.kind(), BufferKind::Index(_)),
            SOURCE,
            "vertex array index buffer is a {:?} buffer",
            index_buffer.kind()
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
