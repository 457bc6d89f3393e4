/// Texture trait, texture formats, flags and texture descriptor

use bitflags::bitflags;
use crate::error::Result;
use crate::rhi::{Resource, ResourceType};
use crate::{rhi_assert, rhi_violation};

const SOURCE: &str = "blaze::rhi::Texture";

/// Texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    /// 8-bit single channel, unsigned normalized
    R8,
    /// 24-bit RGB, unsigned normalized
    R8G8B8,
    /// 32-bit RGBA, unsigned normalized
    R8G8B8A8,
    /// 32-bit RGBA, sRGB
    R8G8B8A8_SRGB,
    /// 32-bit BGRA, unsigned normalized
    B8G8R8A8,
    /// 32-bit packed float RGB (11/11/10)
    R11G11B10F,
    /// 64-bit half float RGBA
    R16G16B16A16F,
    /// 128-bit float RGBA
    R32G32B32A32F,
    /// DXT1 (8 bytes per 4x4 block)
    BC1,
    BC1_SRGB,
    /// DXT3 (16 bytes per 4x4 block)
    BC2,
    BC2_SRGB,
    /// DXT5 (16 bytes per 4x4 block)
    BC3,
    BC3_SRGB,
    /// 1 component (8 bytes per 4x4 block)
    BC4,
    /// 2 components (16 bytes per 4x4 block)
    BC5,
    /// ETC1 RGB (8 bytes per 4x4 block)
    ETC1,
    /// 16-bit single channel, unsigned normalized
    R16_UNORM,
    /// 32-bit single channel, unsigned integer
    R32_UINT,
    /// 32-bit single channel, float
    R32_FLOAT,
    /// 32-bit depth
    D32_FLOAT,
    /// 32-bit two channel, signed normalized
    R16G16_SNORM,
    /// 32-bit two channel, half float
    R16G16_FLOAT,
    /// Unknown/unset format
    Unknown,
}

impl TextureFormat {
    /// Block-compressed format (4x4 blocks)
    pub fn is_compressed(self) -> bool {
        matches!(
            self,
            TextureFormat::BC1
                | TextureFormat::BC1_SRGB
                | TextureFormat::BC2
                | TextureFormat::BC2_SRGB
                | TextureFormat::BC3
                | TextureFormat::BC3_SRGB
                | TextureFormat::BC4
                | TextureFormat::BC5
                | TextureFormat::ETC1
        )
    }

    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::D32_FLOAT)
    }

    pub fn is_srgb(self) -> bool {
        matches!(
            self,
            TextureFormat::R8G8B8A8_SRGB
                | TextureFormat::BC1_SRGB
                | TextureFormat::BC2_SRGB
                | TextureFormat::BC3_SRGB
        )
    }

    /// Bytes per pixel, or bytes per 4x4 block for compressed formats
    pub fn number_of_bytes_per_element(self) -> u32 {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::R8G8B8 => 3,
            TextureFormat::R8G8B8A8
            | TextureFormat::R8G8B8A8_SRGB
            | TextureFormat::B8G8R8A8
            | TextureFormat::R11G11B10F => 4,
            TextureFormat::R16G16B16A16F => 8,
            TextureFormat::R32G32B32A32F => 16,
            TextureFormat::BC1
            | TextureFormat::BC1_SRGB
            | TextureFormat::BC4
            | TextureFormat::ETC1 => 8,
            TextureFormat::BC2
            | TextureFormat::BC2_SRGB
            | TextureFormat::BC3
            | TextureFormat::BC3_SRGB
            | TextureFormat::BC5 => 16,
            TextureFormat::R16_UNORM => 2,
            TextureFormat::R32_UINT
            | TextureFormat::R32_FLOAT
            | TextureFormat::D32_FLOAT
            | TextureFormat::R16G16_SNORM
            | TextureFormat::R16G16_FLOAT => 4,
            TextureFormat::Unknown => 0,
        }
    }

    /// Bytes of one row of `width` pixels (one row of blocks if compressed)
    pub fn number_of_bytes_per_row(self, width: u32) -> u64 {
        let elements = if self.is_compressed() { width.div_ceil(4) } else { width };
        elements as u64 * self.number_of_bytes_per_element() as u64
    }

    /// Bytes of one `width` x `height` image, `None` when it doesn't fit in 64 bits
    pub fn number_of_bytes_per_slice(self, width: u32, height: u32) -> Option<u64> {
        let rows = if self.is_compressed() { height.div_ceil(4) } else { height };
        self.number_of_bytes_per_row(width).checked_mul(rows as u64)
    }
}

bitflags! {
    /// Texture creation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureFlags: u32 {
        /// The data contains a complete mipmap chain (mip-major: all slices of mip 0, then mip 1, ...)
        const DATA_CONTAINS_MIPMAPS = 1 << 0;
        /// Let the backend generate the mipmap chain from level 0
        const GENERATE_MIPMAPS      = 1 << 1;
        /// Can be bound as a shader resource (SRV)
        const SHADER_RESOURCE       = 1 << 2;
        /// Can be bound as an unordered access view (image load/store)
        const UNORDERED_ACCESS      = 1 << 3;
        /// Can be attached to a framebuffer
        const RENDER_TARGET         = 1 << 4;
    }
}

impl Default for TextureFlags {
    fn default() -> Self {
        TextureFlags::SHADER_RESOURCE
    }
}

/// Texture usage (update frequency hint)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureUsage {
    /// GPU read/write
    #[default]
    Default,
    /// GPU read only, must be initialized at creation time
    Immutable,
    /// GPU read, CPU write
    Dynamic,
    /// GPU to CPU transfer
    Staging,
}

/// Texture dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDimension {
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture3D,
    TextureCube,
    TextureCubeArray,
}

impl TextureDimension {
    pub fn resource_type(self) -> ResourceType {
        match self {
            TextureDimension::Texture1D => ResourceType::Texture1D,
            TextureDimension::Texture1DArray => ResourceType::Texture1DArray,
            TextureDimension::Texture2D => ResourceType::Texture2D,
            TextureDimension::Texture2DArray => ResourceType::Texture2DArray,
            TextureDimension::Texture3D => ResourceType::Texture3D,
            TextureDimension::TextureCube => ResourceType::TextureCube,
            TextureDimension::TextureCubeArray => ResourceType::TextureCubeArray,
        }
    }

    pub fn from_resource_type(resource_type: ResourceType) -> Option<Self> {
        match resource_type {
            ResourceType::Texture1D => Some(TextureDimension::Texture1D),
            ResourceType::Texture1DArray => Some(TextureDimension::Texture1DArray),
            ResourceType::Texture2D => Some(TextureDimension::Texture2D),
            ResourceType::Texture2DArray => Some(TextureDimension::Texture2DArray),
            ResourceType::Texture3D => Some(TextureDimension::Texture3D),
            ResourceType::TextureCube => Some(TextureDimension::TextureCube),
            ResourceType::TextureCubeArray => Some(TextureDimension::TextureCubeArray),
            _ => None,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(
            self,
            TextureDimension::Texture1DArray
                | TextureDimension::Texture2DArray
                | TextureDimension::TextureCubeArray
        )
    }

    pub fn is_cube(self) -> bool {
        matches!(self, TextureDimension::TextureCube | TextureDimension::TextureCubeArray)
    }
}

/// Clear value the backend may optimize render target clears for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimizedTextureClearValue {
    Color([f32; 4]),
    DepthStencil { depth: f32, stencil: u32 },
}

// ===== TEXTURE DESC =====

/// Descriptor for creating a texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDesc {
    pub dimension: TextureDimension,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels (1 for 1D textures)
    pub height: u32,
    /// Depth in pixels (3D textures only, 1 otherwise)
    pub depth: u32,
    /// Array slices; number of cubes for cube arrays (1 for non-array textures)
    pub number_of_slices: u32,
    pub format: TextureFormat,
    pub flags: TextureFlags,
    pub usage: TextureUsage,
    /// 1, 2, 4 or 8 (2D render targets only)
    pub number_of_multisamples: u8,
    pub optimized_clear_value: Option<OptimizedTextureClearValue>,
    pub debug_name: String,
}

impl TextureDesc {
    fn new(dimension: TextureDimension, width: u32, height: u32, depth: u32, slices: u32, format: TextureFormat) -> Self {
        Self {
            dimension,
            width,
            height,
            depth,
            number_of_slices: slices,
            format,
            flags: TextureFlags::default(),
            usage: TextureUsage::default(),
            number_of_multisamples: 1,
            optimized_clear_value: None,
            debug_name: String::new(),
        }
    }

    pub fn texture_1d(width: u32, format: TextureFormat) -> Self {
        Self::new(TextureDimension::Texture1D, width, 1, 1, 1, format)
    }

    pub fn texture_1d_array(width: u32, number_of_slices: u32, format: TextureFormat) -> Self {
        Self::new(TextureDimension::Texture1DArray, width, 1, 1, number_of_slices, format)
    }

    pub fn texture_2d(width: u32, height: u32, format: TextureFormat) -> Self {
        Self::new(TextureDimension::Texture2D, width, height, 1, 1, format)
    }

    pub fn texture_2d_array(width: u32, height: u32, number_of_slices: u32, format: TextureFormat) -> Self {
        Self::new(TextureDimension::Texture2DArray, width, height, 1, number_of_slices, format)
    }

    pub fn texture_3d(width: u32, height: u32, depth: u32, format: TextureFormat) -> Self {
        Self::new(TextureDimension::Texture3D, width, height, depth, 1, format)
    }

    pub fn texture_cube(size: u32, format: TextureFormat) -> Self {
        Self::new(TextureDimension::TextureCube, size, size, 1, 1, format)
    }

    pub fn texture_cube_array(size: u32, number_of_cubes: u32, format: TextureFormat) -> Self {
        Self::new(TextureDimension::TextureCubeArray, size, size, 1, number_of_cubes, format)
    }

    pub fn with_flags(mut self, flags: TextureFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_usage(mut self, usage: TextureUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_multisamples(mut self, number_of_multisamples: u8) -> Self {
        self.number_of_multisamples = number_of_multisamples;
        self
    }

    pub fn with_optimized_clear_value(mut self, value: OptimizedTextureClearValue) -> Self {
        self.optimized_clear_value = Some(value);
        self
    }

    pub fn with_debug_name(mut self, name: impl Into<String>) -> Self {
        self.debug_name = name.into();
        self
    }

    /// Number of 2D layers (array slices, six per cube)
    pub fn number_of_layers(&self) -> u32 {
        match self.dimension {
            TextureDimension::TextureCube => 6,
            TextureDimension::TextureCubeArray => self.number_of_slices.saturating_mul(6),
            _ => self.number_of_slices,
        }
    }

    fn number_of_layers_wide(&self) -> u64 {
        match self.dimension {
            TextureDimension::TextureCube => 6,
            TextureDimension::TextureCubeArray => 6 * self.number_of_slices as u64,
            _ => self.number_of_slices as u64,
        }
    }

    /// Mipmap levels the texture will have
    pub fn number_of_mipmaps(&self) -> u32 {
        if self.flags.intersects(TextureFlags::DATA_CONTAINS_MIPMAPS | TextureFlags::GENERATE_MIPMAPS) {
            let largest = self.width.max(self.height).max(self.depth).max(1);
            32 - largest.leading_zeros()
        } else {
            1
        }
    }

    /// Extent of a mipmap level (never smaller than 1)
    pub fn mip_extent(&self, mipmap: u32) -> (u32, u32, u32) {
        (
            (self.width >> mipmap).max(1),
            (self.height >> mipmap).max(1),
            (self.depth >> mipmap).max(1),
        )
    }

    /// Bytes of one mipmap level across all layers
    ///
    /// `None` when the size can't be addressed on this platform.
    pub fn mip_data_size(&self, mipmap: u32) -> Option<usize> {
        let (width, height, depth) = self.mip_extent(mipmap);
        let size = self
            .format
            .number_of_bytes_per_slice(width, height)?
            .checked_mul(depth as u64)?
            .checked_mul(self.number_of_layers_wide())?;
        usize::try_from(size).ok()
    }

    /// Bytes expected in the initial data (whole mip chain with DATA_CONTAINS_MIPMAPS)
    ///
    /// `None` when the size can't be addressed on this platform.
    pub fn expected_data_size(&self) -> Option<usize> {
        if self.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS) {
            (0..self.number_of_mipmaps())
                .try_fold(0usize, |total, mip| total.checked_add(self.mip_data_size(mip)?))
        } else {
            self.mip_data_size(0)
        }
    }

    /// Check the descriptor and the optional initial data against each other
    pub fn validate(&self, data: Option<&[u8]>) -> Result<()> {
        rhi_assert!(
            !(self.flags.contains(TextureFlags::RENDER_TARGET) && data.is_some()),
            SOURCE,
            "render target texture '{}' can't be initialized with data",
            self.debug_name
        );
        rhi_assert!(self.format != TextureFormat::Unknown, SOURCE, "texture format is unknown");
        rhi_assert!(
            self.width > 0 && self.height > 0 && self.depth > 0 && self.number_of_slices > 0,
            SOURCE,
            "texture extent {}x{}x{} with {} slices must be non-zero",
            self.width, self.height, self.depth, self.number_of_slices
        );
        match self.dimension {
            TextureDimension::Texture1D | TextureDimension::Texture1DArray => {
                rhi_assert!(self.height == 1 && self.depth == 1, SOURCE, "1D texture must have height and depth 1");
            }
            TextureDimension::Texture3D => {}
            TextureDimension::TextureCube | TextureDimension::TextureCubeArray => {
                rhi_assert!(self.depth == 1, SOURCE, "cube texture must have depth 1");
                rhi_assert!(
                    self.width == self.height,
                    SOURCE,
                    "cube texture faces must be square, got {}x{}",
                    self.width, self.height
                );
            }
            TextureDimension::Texture2D | TextureDimension::Texture2DArray => {
                rhi_assert!(self.depth == 1, SOURCE, "2D texture must have depth 1");
            }
        }
        if !self.dimension.is_array() {
            rhi_assert!(self.number_of_slices == 1, SOURCE, "{:?} can't have array slices", self.dimension);
        }
        rhi_assert!(
            !self.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS | TextureFlags::GENERATE_MIPMAPS),
            SOURCE,
            "DATA_CONTAINS_MIPMAPS and GENERATE_MIPMAPS are mutually exclusive"
        );
        rhi_assert!(
            !(self.flags.contains(TextureFlags::DATA_CONTAINS_MIPMAPS) && data.is_none()),
            SOURCE,
            "DATA_CONTAINS_MIPMAPS requires initial data"
        );
        if self.format.is_compressed() {
            rhi_assert!(
                !self.flags.intersects(TextureFlags::RENDER_TARGET | TextureFlags::UNORDERED_ACCESS | TextureFlags::GENERATE_MIPMAPS),
                SOURCE,
                "compressed format {:?} can't be rendered to, written or mipmap-generated",
                self.format
            );
        }
        rhi_assert!(
            matches!(self.number_of_multisamples, 1 | 2 | 4 | 8),
            SOURCE,
            "invalid number of multisamples {}",
            self.number_of_multisamples
        );
        if self.number_of_multisamples > 1 {
            rhi_assert!(
                self.dimension == TextureDimension::Texture2D
                    && self.flags.contains(TextureFlags::RENDER_TARGET)
                    && !self.flags.intersects(TextureFlags::DATA_CONTAINS_MIPMAPS | TextureFlags::GENERATE_MIPMAPS),
                SOURCE,
                "multisampling is only available for 2D render targets without mipmaps"
            );
        }
        rhi_assert!(
            !(self.usage == TextureUsage::Immutable && data.is_none()),
            SOURCE,
            "immutable texture '{}' must be initialized with data",
            self.debug_name
        );
        if let Some(data) = data {
            let Some(expected) = self.expected_data_size() else {
                rhi_violation!(
                    SOURCE,
                    "texture '{}' of {}x{}x{} {:?} is too large to address",
                    self.debug_name,
                    self.width,
                    self.height,
                    self.depth,
                    self.format
                )
            };
            rhi_assert!(
                data.len() >= expected,
                SOURCE,
                "texture data is {} bytes, {} expected",
                data.len(),
                expected
            );
        }
        Ok(())
    }
}

// ===== TEXTURE TRAIT =====

/// Texture resource
pub trait Texture: Resource {
    /// Descriptor the texture was created from
    fn desc(&self) -> &TextureDesc;

    fn dimension(&self) -> TextureDimension {
        self.desc().dimension
    }

    fn format(&self) -> TextureFormat {
        self.desc().format
    }

    fn number_of_mipmaps(&self) -> u32 {
        self.desc().number_of_mipmaps()
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
