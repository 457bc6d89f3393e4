/// Sampler state trait and sampler state descriptor

use crate::error::Result;
use crate::rhi::Resource;
use crate::rhi_assert;

const SOURCE: &str = "blaze::rhi::SamplerState";

/// Minification/magnification/mip filter combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    MinMagMipPoint,
    MinMagPointMipLinear,
    MinPointMagLinearMipPoint,
    MinPointMagMipLinear,
    MinLinearMagMipPoint,
    MinLinearMagPointMipLinear,
    MinMagLinearMipPoint,
    MinMagMipLinear,
    Anisotropic,
    ComparisonMinMagMipPoint,
    ComparisonMinMagMipLinear,
    ComparisonAnisotropic,
}

impl FilterMode {
    /// Filter that compares against a reference value (shadow samplers)
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            FilterMode::ComparisonMinMagMipPoint
                | FilterMode::ComparisonMinMagMipLinear
                | FilterMode::ComparisonAnisotropic
        )
    }
}

/// Texture coordinate addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureAddressMode {
    Wrap,
    Mirror,
    Clamp,
    Border,
    MirrorOnce,
}

/// Comparison function (depth test, stencil test, comparison samplers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Descriptor for creating a sampler state
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerStateDesc {
    pub filter: FilterMode,
    pub address_u: TextureAddressMode,
    pub address_v: TextureAddressMode,
    pub address_w: TextureAddressMode,
    pub mip_lod_bias: f32,
    /// 1..=16, only used by anisotropic filters
    pub max_anisotropy: u32,
    pub comparison_func: ComparisonFunc,
    pub border_color: [f32; 4],
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Default for SamplerStateDesc {
    fn default() -> Self {
        Self {
            filter: FilterMode::MinMagMipLinear,
            address_u: TextureAddressMode::Wrap,
            address_v: TextureAddressMode::Wrap,
            address_w: TextureAddressMode::Wrap,
            mip_lod_bias: 0.0,
            max_anisotropy: 16,
            comparison_func: ComparisonFunc::Never,
            border_color: [0.0, 0.0, 0.0, 0.0],
            min_lod: f32::MIN,
            max_lod: f32::MAX,
        }
    }
}

impl SamplerStateDesc {
    pub fn validate(&self) -> Result<()> {
        rhi_assert!(
            (1..=16).contains(&self.max_anisotropy),
            SOURCE,
            "max anisotropy {} outside 1..=16",
            self.max_anisotropy
        );
        rhi_assert!(
            self.min_lod <= self.max_lod,
            SOURCE,
            "min LOD {} greater than max LOD {}",
            self.min_lod,
            self.max_lod
        );
        Ok(())
    }
}

/// Sampler state resource
pub trait SamplerState: Resource {
    fn desc(&self) -> &SamplerStateDesc;
}
