/// Texture and TextureManager - OpenGL implementations
///
/// Storage is immutable (glTexStorage*). Initial data is laid out mip-major:
/// every slice/face of mipmap 0, then every slice/face of mipmap 1, and so on.

use std::any::Any;
use std::ffi::c_void;
use std::sync::Arc;
use blaze_rhi::blaze::rhi::{
    Resource, ResourceType, Texture as RhiTexture, TextureDesc, TextureDimension, TextureFlags,
    TextureManager as RhiTextureManager,
};
use blaze_rhi::blaze::{Error, Result};
use blaze_rhi::rhi_violation;
use gl::types::{GLenum, GLint, GLsizei, GLuint};

use crate::opengl_context::{get_binding, get_integer, GlContext};
use crate::opengl_mapping::{self, GlTextureFormat};

const SOURCE: &str = "blaze::opengl::Texture";

// ============================================================================
// Upload planning (pure)
// ============================================================================

/// One glTexSubImage call worth of initial data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadRegion {
    pub mipmap: u32,
    /// Cube face (0..6) for cube textures
    pub face: Option<u32>,
    /// Byte offset into the initial data
    pub offset: usize,
    pub size: usize,
    pub width: u32,
    /// Slices for 1D arrays
    pub height: u32,
    /// Depth for 3D textures, layers for 2D and cube arrays
    pub depth: u32,
}

/// Split initial data into per-mipmap (and per-face) uploads
pub fn upload_regions(desc: &TextureDesc) -> Result<Vec<UploadRegion>> {
    let number_of_mipmaps = if desc.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS) {
        desc.number_of_mipmaps()
    } else {
        1
    };

    let mut regions = Vec::new();
    let mut offset = 0;
    for mipmap in 0..number_of_mipmaps {
        let (width, height, depth) = desc.mip_extent(mipmap);
        let Some(size) = desc.mip_data_size(mipmap) else {
            rhi_violation!(SOURCE, "mipmap {} of '{}' is too large to address", mipmap, desc.debug_name)
        };
        let region = |face, offset, size, height, depth| UploadRegion {
            mipmap,
            face,
            offset,
            size,
            width,
            height,
            depth,
        };
        match desc.dimension {
            TextureDimension::TextureCube => {
                let face_size = size / 6;
                for face in 0..6 {
                    regions.push(region(Some(face), offset + face as usize * face_size, face_size, height, 1));
                }
            }
            TextureDimension::Texture1D => regions.push(region(None, offset, size, 1, 1)),
            TextureDimension::Texture1DArray => regions.push(region(None, offset, size, desc.number_of_slices, 1)),
            TextureDimension::Texture2D => regions.push(region(None, offset, size, height, 1)),
            TextureDimension::Texture2DArray | TextureDimension::TextureCubeArray => {
                regions.push(region(None, offset, size, height, desc.number_of_layers()))
            }
            TextureDimension::Texture3D => regions.push(region(None, offset, size, height, depth)),
        }
        offset += size;
    }
    Ok(regions)
}

/// Every mipmap of a texture as `(mipmap, width, height, depth)` for whole-texture copies
///
/// Array layers and cube faces are addressed through the depth, 1D array
/// slices through the height, as glCopyImageSubData expects.
pub fn copy_extents(desc: &TextureDesc) -> Vec<(u32, u32, u32, u32)> {
    (0..desc.number_of_mipmaps())
        .map(|mipmap| {
            let (width, height, depth) = desc.mip_extent(mipmap);
            let (height, depth) = match desc.dimension {
                TextureDimension::Texture1D => (1, 1),
                TextureDimension::Texture1DArray => (desc.number_of_slices, 1),
                TextureDimension::Texture2D => (height, 1),
                TextureDimension::Texture2DArray | TextureDimension::TextureCube | TextureDimension::TextureCubeArray => {
                    (height, desc.number_of_layers())
                }
                TextureDimension::Texture3D => (height, depth),
            };
            (mipmap, width, height, depth)
        })
        .collect()
}

/// glGet binding query of a texture target
pub fn texture_binding(target: GLenum) -> GLenum {
    match target {
        gl::TEXTURE_1D => gl::TEXTURE_BINDING_1D,
        gl::TEXTURE_1D_ARRAY => gl::TEXTURE_BINDING_1D_ARRAY,
        gl::TEXTURE_2D_ARRAY => gl::TEXTURE_BINDING_2D_ARRAY,
        gl::TEXTURE_2D_MULTISAMPLE => gl::TEXTURE_BINDING_2D_MULTISAMPLE,
        gl::TEXTURE_3D => gl::TEXTURE_BINDING_3D,
        gl::TEXTURE_CUBE_MAP => gl::TEXTURE_BINDING_CUBE_MAP,
        gl::TEXTURE_CUBE_MAP_ARRAY => gl::TEXTURE_BINDING_CUBE_MAP_ARRAY,
        gl::TEXTURE_BUFFER => gl::TEXTURE_BINDING_BUFFER,
        _ => gl::TEXTURE_BINDING_2D,
    }
}

// ============================================================================
// Texture
// ============================================================================

/// OpenGL texture object
pub struct Texture {
    ctx: Arc<GlContext>,
    pub(crate) name: GLuint,
    pub(crate) target: GLenum,
    pub(crate) format: GlTextureFormat,
    desc: TextureDesc,
}

impl Texture {
    pub(crate) fn create(ctx: Arc<GlContext>, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Self> {
        desc.validate(data)?;
        let format = opengl_mapping::texture_format(desc.format)?;
        let regions = match data {
            Some(_) => upload_regions(desc)?,
            None => Vec::new(),
        };
        let multisampled = desc.number_of_multisamples > 1;
        let target = opengl_mapping::texture_target(desc.dimension, multisampled);

        let mut name: GLuint = 0;
        unsafe {
            gl::GenTextures(1, &mut name);
        }
        let texture = Self {
            ctx: Arc::clone(&ctx),
            name,
            target,
            format,
            desc: desc.clone(),
        };

        unsafe {
            let previous = get_binding(texture_binding(target));
            let previous_alignment = get_integer(gl::UNPACK_ALIGNMENT);
            gl::BindTexture(target, name);

            texture.allocate_storage();
            if let Some(data) = data {
                gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
                texture.upload(data, &regions);
                gl::PixelStorei(gl::UNPACK_ALIGNMENT, previous_alignment);
            }

            if !multisampled {
                let minification = if desc.number_of_mipmaps() > 1 {
                    gl::LINEAR_MIPMAP_LINEAR
                } else {
                    gl::LINEAR
                };
                gl::TexParameteri(target, gl::TEXTURE_MIN_FILTER, minification as GLint);
                gl::TexParameteri(target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
                if desc.flags.contains(TextureFlags::GENERATE_MIPMAPS) {
                    gl::GenerateMipmap(target);
                }
            }

            gl::BindTexture(target, previous);
        }

        ctx.check_error(&format!("creating texture '{}'", desc.debug_name))?;
        ctx.label(gl::TEXTURE, name, &desc.debug_name);
        Ok(texture)
    }

    /// Immutable storage for every mipmap and layer; the texture must be bound
    unsafe fn allocate_storage(&self) {
        let desc = &self.desc;
        let levels = desc.number_of_mipmaps() as GLsizei;
        let internal_format = self.format.internal_format;
        let (width, height) = (desc.width as GLsizei, desc.height as GLsizei);
        match desc.dimension {
            TextureDimension::Texture1D => gl::TexStorage1D(self.target, levels, internal_format, width),
            TextureDimension::Texture1DArray => {
                gl::TexStorage2D(self.target, levels, internal_format, width, desc.number_of_slices as GLsizei)
            }
            TextureDimension::Texture2D if desc.number_of_multisamples > 1 => gl::TexStorage2DMultisample(
                self.target,
                desc.number_of_multisamples as GLsizei,
                internal_format,
                width,
                height,
                gl::TRUE,
            ),
            TextureDimension::Texture2D | TextureDimension::TextureCube => {
                gl::TexStorage2D(self.target, levels, internal_format, width, height)
            }
            TextureDimension::Texture2DArray | TextureDimension::TextureCubeArray => gl::TexStorage3D(
                self.target,
                levels,
                internal_format,
                width,
                height,
                desc.number_of_layers() as GLsizei,
            ),
            TextureDimension::Texture3D => {
                gl::TexStorage3D(self.target, levels, internal_format, width, height, desc.depth as GLsizei)
            }
        }
    }

    /// Upload initial data region by region; the texture must be bound
    unsafe fn upload(&self, data: &[u8], regions: &[UploadRegion]) {
        let format = self.format;
        for region in regions {
            let pixels = data[region.offset..region.offset + region.size].as_ptr() as *const c_void;
            let level = region.mipmap as GLint;
            let (width, height, depth) = (region.width as GLsizei, region.height as GLsizei, region.depth as GLsizei);
            let target = match region.face {
                Some(face) => gl::TEXTURE_CUBE_MAP_POSITIVE_X + face,
                None => self.target,
            };
            let size = region.size as GLsizei;

            match (self.desc.dimension, format.compressed) {
                (TextureDimension::Texture1D, false) => {
                    gl::TexSubImage1D(target, level, 0, width, format.format, format.data_type, pixels)
                }
                (TextureDimension::Texture1D, true) => {
                    gl::CompressedTexSubImage1D(target, level, 0, width, format.internal_format, size, pixels)
                }
                (TextureDimension::Texture1DArray | TextureDimension::Texture2D | TextureDimension::TextureCube, false) => {
                    gl::TexSubImage2D(target, level, 0, 0, width, height, format.format, format.data_type, pixels)
                }
                (TextureDimension::Texture1DArray | TextureDimension::Texture2D | TextureDimension::TextureCube, true) => {
                    gl::CompressedTexSubImage2D(target, level, 0, 0, width, height, format.internal_format, size, pixels)
                }
                (_, false) => gl::TexSubImage3D(
                    target,
                    level,
                    0,
                    0,
                    0,
                    width,
                    height,
                    depth,
                    format.format,
                    format.data_type,
                    pixels,
                ),
                (_, true) => gl::CompressedTexSubImage3D(
                    target,
                    level,
                    0,
                    0,
                    0,
                    width,
                    height,
                    depth,
                    format.internal_format,
                    size,
                    pixels,
                ),
            }
        }
    }

    /// Restrict sampling to mipmaps `minimum..=maximum`
    pub(crate) fn set_minimum_maximum_mipmap_index(&self, minimum: u32, maximum: u32) {
        unsafe {
            let previous = get_binding(texture_binding(self.target));
            gl::BindTexture(self.target, self.name);
            gl::TexParameteri(self.target, gl::TEXTURE_BASE_LEVEL, minimum as GLint);
            gl::TexParameteri(self.target, gl::TEXTURE_MAX_LEVEL, maximum as GLint);
            gl::BindTexture(self.target, previous);
        }
    }

    /// Rebuild mipmaps 1.. from mipmap 0
    pub(crate) fn generate_mipmaps(&self) -> Result<()> {
        unsafe {
            let previous = get_binding(texture_binding(self.target));
            gl::BindTexture(self.target, self.name);
            gl::GenerateMipmap(self.target);
            gl::BindTexture(self.target, previous);
        }
        self.ctx.check_error(&format!("generating mipmaps of '{}'", self.desc.debug_name))
    }
}

impl Resource for Texture {
    fn resource_type(&self) -> ResourceType {
        self.desc.dimension.resource_type()
    }

    fn debug_name(&self) -> &str {
        &self.desc.debug_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiTexture for Texture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteTextures(1, &self.name);
        }
    }
}

/// The OpenGL texture behind an RHI texture
pub(crate) fn gl_texture(texture: &dyn RhiTexture) -> Result<&Texture> {
    match texture.as_any().downcast_ref::<Texture>() {
        Some(texture) => Ok(texture),
        None => rhi_violation!(SOURCE, "texture '{}' wasn't created by the OpenGL device", texture.debug_name()),
    }
}

// ============================================================================
// TextureManager
// ============================================================================

/// Driver limits checked before creating a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureLimits {
    pub maximum_texture_dimension: u32,
    pub maximum_3d_texture_dimension: u32,
    pub maximum_array_slices: u32,
    pub maximum_number_of_multisamples: u8,
}

impl TextureLimits {
    /// Why `desc` exceeds these limits, None if it fits
    pub fn check(&self, desc: &TextureDesc) -> Option<String> {
        let (largest, maximum) = if desc.dimension == TextureDimension::Texture3D {
            (desc.width.max(desc.height).max(desc.depth), self.maximum_3d_texture_dimension)
        } else {
            (desc.width.max(desc.height), self.maximum_texture_dimension)
        };
        if largest > maximum {
            return Some(format!("extent {} exceeds the driver maximum {}", largest, maximum));
        }
        if desc.number_of_layers() > self.maximum_array_slices {
            return Some(format!(
                "{} layers exceed the driver maximum {}",
                desc.number_of_layers(),
                self.maximum_array_slices
            ));
        }
        if desc.number_of_multisamples > self.maximum_number_of_multisamples {
            return Some(format!(
                "{} samples exceed the driver maximum {}",
                desc.number_of_multisamples, self.maximum_number_of_multisamples
            ));
        }
        None
    }
}

/// Creates OpenGL textures
pub struct TextureManager {
    ctx: Arc<GlContext>,
    limits: TextureLimits,
}

impl TextureManager {
    pub(crate) fn new(ctx: Arc<GlContext>, limits: TextureLimits) -> Self {
        Self { ctx, limits }
    }
}

impl RhiTextureManager for TextureManager {
    fn create_texture(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn RhiTexture>> {
        desc.validate(data)?;
        if let Some(reason) = self.limits.check(desc) {
            return Err(Error::Unsupported(format!("texture '{}': {}", desc.debug_name, reason)));
        }
        Ok(Arc::new(Texture::create(Arc::clone(&self.ctx), desc, data)?))
    }
}

#[cfg(test)]
#[path = "opengl_texture_tests.rs"]
mod tests;
