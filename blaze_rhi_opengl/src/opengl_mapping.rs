/// Translation tables from RHI enums to OpenGL enums
///
/// Pure functions, unit-tested without a context.

use blaze_rhi::blaze::rhi::{
    Blend, BlendOp, BufferKind, BufferUsage, ClearFlags, ComparisonFunc, CullMode, FillMode,
    FilterMode, IndexBufferFormat, MapType, PrimitiveTopology, ShaderType, StencilOp,
    TextureAddressMode, TextureDimension, TextureFormat, VertexAttributeFormat,
};
use blaze_rhi::blaze::{Error, Result};
use gl::types::{GLbitfield, GLboolean, GLenum, GLint};

// S3TC is an extension in every OpenGL version, the `gl` crate only generates core enums
pub const COMPRESSED_RGBA_S3TC_DXT1_EXT: GLenum = 0x83F1;
pub const COMPRESSED_RGBA_S3TC_DXT3_EXT: GLenum = 0x83F2;
pub const COMPRESSED_RGBA_S3TC_DXT5_EXT: GLenum = 0x83F3;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT1_EXT: GLenum = 0x8C4D;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT3_EXT: GLenum = 0x8C4E;
pub const COMPRESSED_SRGB_ALPHA_S3TC_DXT5_EXT: GLenum = 0x8C4F;

// ARB_texture_filter_anisotropic (core in 4.6)
pub const TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FE;
pub const MAX_TEXTURE_MAX_ANISOTROPY: GLenum = 0x84FF;

// ===== TEXTURES =====

/// How a texture format is stored and uploaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlTextureFormat {
    pub internal_format: GLenum,
    /// Client pixel format (0 for compressed formats)
    pub format: GLenum,
    /// Client component type (0 for compressed formats)
    pub data_type: GLenum,
    pub compressed: bool,
}

impl GlTextureFormat {
    const fn uncompressed(internal_format: GLenum, format: GLenum, data_type: GLenum) -> Self {
        Self { internal_format, format, data_type, compressed: false }
    }

    const fn compressed(internal_format: GLenum) -> Self {
        Self { internal_format, format: 0, data_type: 0, compressed: true }
    }
}

pub fn texture_format(format: TextureFormat) -> Result<GlTextureFormat> {
    let mapping = match format {
        TextureFormat::R8 => GlTextureFormat::uncompressed(gl::R8, gl::RED, gl::UNSIGNED_BYTE),
        TextureFormat::R8G8B8 => GlTextureFormat::uncompressed(gl::RGB8, gl::RGB, gl::UNSIGNED_BYTE),
        TextureFormat::R8G8B8A8 => GlTextureFormat::uncompressed(gl::RGBA8, gl::RGBA, gl::UNSIGNED_BYTE),
        TextureFormat::R8G8B8A8_SRGB => GlTextureFormat::uncompressed(gl::SRGB8_ALPHA8, gl::RGBA, gl::UNSIGNED_BYTE),
        TextureFormat::B8G8R8A8 => GlTextureFormat::uncompressed(gl::RGBA8, gl::BGRA, gl::UNSIGNED_BYTE),
        TextureFormat::R11G11B10F => {
            GlTextureFormat::uncompressed(gl::R11F_G11F_B10F, gl::RGB, gl::UNSIGNED_INT_10F_11F_11F_REV)
        }
        TextureFormat::R16G16B16A16F => GlTextureFormat::uncompressed(gl::RGBA16F, gl::RGBA, gl::HALF_FLOAT),
        TextureFormat::R32G32B32A32F => GlTextureFormat::uncompressed(gl::RGBA32F, gl::RGBA, gl::FLOAT),
        TextureFormat::BC1 => GlTextureFormat::compressed(COMPRESSED_RGBA_S3TC_DXT1_EXT),
        TextureFormat::BC1_SRGB => GlTextureFormat::compressed(COMPRESSED_SRGB_ALPHA_S3TC_DXT1_EXT),
        TextureFormat::BC2 => GlTextureFormat::compressed(COMPRESSED_RGBA_S3TC_DXT3_EXT),
        TextureFormat::BC2_SRGB => GlTextureFormat::compressed(COMPRESSED_SRGB_ALPHA_S3TC_DXT3_EXT),
        TextureFormat::BC3 => GlTextureFormat::compressed(COMPRESSED_RGBA_S3TC_DXT5_EXT),
        TextureFormat::BC3_SRGB => GlTextureFormat::compressed(COMPRESSED_SRGB_ALPHA_S3TC_DXT5_EXT),
        TextureFormat::BC4 => GlTextureFormat::compressed(gl::COMPRESSED_RED_RGTC1),
        TextureFormat::BC5 => GlTextureFormat::compressed(gl::COMPRESSED_RG_RGTC2),
        // ETC2 decoders read ETC1 data
        TextureFormat::ETC1 => GlTextureFormat::compressed(gl::COMPRESSED_RGB8_ETC2),
        TextureFormat::R16_UNORM => GlTextureFormat::uncompressed(gl::R16, gl::RED, gl::UNSIGNED_SHORT),
        TextureFormat::R32_UINT => GlTextureFormat::uncompressed(gl::R32UI, gl::RED_INTEGER, gl::UNSIGNED_INT),
        TextureFormat::R32_FLOAT => GlTextureFormat::uncompressed(gl::R32F, gl::RED, gl::FLOAT),
        TextureFormat::D32_FLOAT => {
            GlTextureFormat::uncompressed(gl::DEPTH_COMPONENT32F, gl::DEPTH_COMPONENT, gl::FLOAT)
        }
        TextureFormat::R16G16_SNORM => GlTextureFormat::uncompressed(gl::RG16_SNORM, gl::RG, gl::SHORT),
        TextureFormat::R16G16_FLOAT => GlTextureFormat::uncompressed(gl::RG16F, gl::RG, gl::HALF_FLOAT),
        TextureFormat::Unknown => {
            return Err(Error::Unsupported("texture format Unknown has no OpenGL equivalent".to_string()))
        }
    };
    Ok(mapping)
}

/// Texture target of a dimension
pub fn texture_target(dimension: TextureDimension, multisampled: bool) -> GLenum {
    match dimension {
        TextureDimension::Texture1D => gl::TEXTURE_1D,
        TextureDimension::Texture1DArray => gl::TEXTURE_1D_ARRAY,
        TextureDimension::Texture2D if multisampled => gl::TEXTURE_2D_MULTISAMPLE,
        TextureDimension::Texture2D => gl::TEXTURE_2D,
        TextureDimension::Texture2DArray => gl::TEXTURE_2D_ARRAY,
        TextureDimension::Texture3D => gl::TEXTURE_3D,
        TextureDimension::TextureCube => gl::TEXTURE_CUBE_MAP,
        TextureDimension::TextureCubeArray => gl::TEXTURE_CUBE_MAP_ARRAY,
    }
}

// ===== BUFFERS =====

pub fn buffer_usage(usage: BufferUsage) -> GLenum {
    match usage {
        BufferUsage::StreamDraw => gl::STREAM_DRAW,
        BufferUsage::StreamRead => gl::STREAM_READ,
        BufferUsage::StreamCopy => gl::STREAM_COPY,
        BufferUsage::StaticDraw => gl::STATIC_DRAW,
        BufferUsage::StaticRead => gl::STATIC_READ,
        BufferUsage::StaticCopy => gl::STATIC_COPY,
        BufferUsage::DynamicDraw => gl::DYNAMIC_DRAW,
        BufferUsage::DynamicRead => gl::DYNAMIC_READ,
        BufferUsage::DynamicCopy => gl::DYNAMIC_COPY,
    }
}

/// Binding target a buffer kind is used through
pub fn buffer_target(kind: BufferKind) -> GLenum {
    match kind {
        BufferKind::Vertex => gl::ARRAY_BUFFER,
        BufferKind::Index(_) => gl::ELEMENT_ARRAY_BUFFER,
        BufferKind::Uniform => gl::UNIFORM_BUFFER,
        BufferKind::Texture(_) => gl::TEXTURE_BUFFER,
        BufferKind::Structured { .. } => gl::SHADER_STORAGE_BUFFER,
        BufferKind::Indirect(_) => gl::DRAW_INDIRECT_BUFFER,
    }
}

/// `glMapBufferRange` access bits
pub fn map_access(map_type: MapType) -> GLbitfield {
    match map_type {
        MapType::Read => gl::MAP_READ_BIT,
        MapType::Write => gl::MAP_WRITE_BIT,
        MapType::ReadWrite => gl::MAP_READ_BIT | gl::MAP_WRITE_BIT,
        MapType::WriteDiscard => gl::MAP_WRITE_BIT | gl::MAP_INVALIDATE_BUFFER_BIT,
        MapType::WriteNoOverwrite => gl::MAP_WRITE_BIT | gl::MAP_UNSYNCHRONIZED_BIT,
    }
}

pub fn index_type(format: IndexBufferFormat) -> GLenum {
    match format {
        IndexBufferFormat::UnsignedChar => gl::UNSIGNED_BYTE,
        IndexBufferFormat::UnsignedShort => gl::UNSIGNED_SHORT,
        IndexBufferFormat::UnsignedInt => gl::UNSIGNED_INT,
    }
}

/// Vertex attribute pointer parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlVertexAttributeFormat {
    pub number_of_components: GLint,
    pub data_type: GLenum,
    pub normalized: GLboolean,
    /// Use `glVertexAttribIPointer`
    pub integer: bool,
}

pub fn vertex_attribute_format(format: VertexAttributeFormat) -> GlVertexAttributeFormat {
    let data_type = match format {
        VertexAttributeFormat::Float1
        | VertexAttributeFormat::Float2
        | VertexAttributeFormat::Float3
        | VertexAttributeFormat::Float4 => gl::FLOAT,
        VertexAttributeFormat::R8G8B8A8Unorm | VertexAttributeFormat::R8G8B8A8Uint => gl::UNSIGNED_BYTE,
        VertexAttributeFormat::Short2 | VertexAttributeFormat::Short4 => gl::SHORT,
        VertexAttributeFormat::Uint1 => gl::UNSIGNED_INT,
    };
    GlVertexAttributeFormat {
        number_of_components: format.number_of_components() as GLint,
        data_type,
        normalized: if format.is_normalized() { gl::TRUE } else { gl::FALSE },
        integer: format.is_integer(),
    }
}

// ===== PIPELINE STATE =====

pub fn primitive_mode(topology: PrimitiveTopology) -> GLenum {
    match topology {
        PrimitiveTopology::PointList => gl::POINTS,
        PrimitiveTopology::LineList => gl::LINES,
        PrimitiveTopology::LineStrip => gl::LINE_STRIP,
        PrimitiveTopology::TriangleList => gl::TRIANGLES,
        PrimitiveTopology::TriangleStrip => gl::TRIANGLE_STRIP,
        PrimitiveTopology::PatchList(_) => gl::PATCHES,
    }
}

pub fn comparison_func(func: ComparisonFunc) -> GLenum {
    match func {
        ComparisonFunc::Never => gl::NEVER,
        ComparisonFunc::Less => gl::LESS,
        ComparisonFunc::Equal => gl::EQUAL,
        ComparisonFunc::LessEqual => gl::LEQUAL,
        ComparisonFunc::Greater => gl::GREATER,
        ComparisonFunc::NotEqual => gl::NOTEQUAL,
        ComparisonFunc::GreaterEqual => gl::GEQUAL,
        ComparisonFunc::Always => gl::ALWAYS,
    }
}

pub fn stencil_op(op: StencilOp) -> GLenum {
    match op {
        StencilOp::Keep => gl::KEEP,
        StencilOp::Zero => gl::ZERO,
        StencilOp::Replace => gl::REPLACE,
        StencilOp::IncrementAndClamp => gl::INCR,
        StencilOp::DecrementAndClamp => gl::DECR,
        StencilOp::Invert => gl::INVERT,
        StencilOp::IncrementAndWrap => gl::INCR_WRAP,
        StencilOp::DecrementAndWrap => gl::DECR_WRAP,
    }
}

pub fn blend_factor(blend: Blend) -> GLenum {
    match blend {
        Blend::Zero => gl::ZERO,
        Blend::One => gl::ONE,
        Blend::SrcColor => gl::SRC_COLOR,
        Blend::InvSrcColor => gl::ONE_MINUS_SRC_COLOR,
        Blend::SrcAlpha => gl::SRC_ALPHA,
        Blend::InvSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
        Blend::DestAlpha => gl::DST_ALPHA,
        Blend::InvDestAlpha => gl::ONE_MINUS_DST_ALPHA,
        Blend::DestColor => gl::DST_COLOR,
        Blend::InvDestColor => gl::ONE_MINUS_DST_COLOR,
        Blend::SrcAlphaSat => gl::SRC_ALPHA_SATURATE,
        Blend::BlendFactor => gl::CONSTANT_COLOR,
        Blend::InvBlendFactor => gl::ONE_MINUS_CONSTANT_COLOR,
    }
}

pub fn blend_op(op: BlendOp) -> GLenum {
    match op {
        BlendOp::Add => gl::FUNC_ADD,
        BlendOp::Subtract => gl::FUNC_SUBTRACT,
        BlendOp::RevSubtract => gl::FUNC_REVERSE_SUBTRACT,
        BlendOp::Min => gl::MIN,
        BlendOp::Max => gl::MAX,
    }
}

/// Face to cull, None disables culling
pub fn cull_face(mode: CullMode) -> Option<GLenum> {
    match mode {
        CullMode::None => None,
        CullMode::Front => Some(gl::FRONT),
        CullMode::Back => Some(gl::BACK),
    }
}

pub fn polygon_mode(mode: FillMode) -> GLenum {
    match mode {
        FillMode::Wireframe => gl::LINE,
        FillMode::Solid => gl::FILL,
    }
}

// ===== SAMPLERS =====

/// Minification filter, magnification filter, depth comparison enabled
pub fn filter_mode(filter: FilterMode) -> (GLenum, GLenum, bool) {
    let (min, mag) = match filter {
        FilterMode::MinMagMipPoint | FilterMode::ComparisonMinMagMipPoint => (gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST),
        FilterMode::MinMagPointMipLinear => (gl::NEAREST_MIPMAP_LINEAR, gl::NEAREST),
        FilterMode::MinPointMagLinearMipPoint => (gl::NEAREST_MIPMAP_NEAREST, gl::LINEAR),
        FilterMode::MinPointMagMipLinear => (gl::NEAREST_MIPMAP_LINEAR, gl::LINEAR),
        FilterMode::MinLinearMagMipPoint => (gl::LINEAR_MIPMAP_NEAREST, gl::NEAREST),
        FilterMode::MinLinearMagPointMipLinear => (gl::LINEAR_MIPMAP_LINEAR, gl::NEAREST),
        FilterMode::MinMagLinearMipPoint => (gl::LINEAR_MIPMAP_NEAREST, gl::LINEAR),
        FilterMode::MinMagMipLinear
        | FilterMode::Anisotropic
        | FilterMode::ComparisonMinMagMipLinear
        | FilterMode::ComparisonAnisotropic => (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR),
    };
    (min, mag, filter.is_comparison())
}

pub fn address_mode(mode: TextureAddressMode) -> GLenum {
    match mode {
        TextureAddressMode::Wrap => gl::REPEAT,
        TextureAddressMode::Mirror => gl::MIRRORED_REPEAT,
        TextureAddressMode::Clamp => gl::CLAMP_TO_EDGE,
        TextureAddressMode::Border => gl::CLAMP_TO_BORDER,
        TextureAddressMode::MirrorOnce => gl::MIRROR_CLAMP_TO_EDGE,
    }
}

// ===== COMMANDS / SHADERS =====

pub fn clear_mask(flags: ClearFlags) -> GLbitfield {
    let mut mask = 0;
    if flags.contains(ClearFlags::COLOR) {
        mask |= gl::COLOR_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::DEPTH) {
        mask |= gl::DEPTH_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::STENCIL) {
        mask |= gl::STENCIL_BUFFER_BIT;
    }
    mask
}

/// Shader object kind; task and mesh shaders have no core OpenGL stage
pub fn shader_kind(shader_type: ShaderType) -> Option<GLenum> {
    match shader_type {
        ShaderType::Vertex => Some(gl::VERTEX_SHADER),
        ShaderType::TessellationControl => Some(gl::TESS_CONTROL_SHADER),
        ShaderType::TessellationEvaluation => Some(gl::TESS_EVALUATION_SHADER),
        ShaderType::Geometry => Some(gl::GEOMETRY_SHADER),
        ShaderType::Fragment => Some(gl::FRAGMENT_SHADER),
        ShaderType::Compute => Some(gl::COMPUTE_SHADER),
        ShaderType::Task | ShaderType::Mesh => None,
    }
}

#[cfg(test)]
#[path = "opengl_mapping_tests.rs"]
mod tests;
