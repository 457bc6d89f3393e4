/// SamplerState - OpenGL sampler object

use std::any::Any;
use std::sync::Arc;
use blaze_rhi::blaze::rhi::{FilterMode, Resource, ResourceType, SamplerState as RhiSamplerState, SamplerStateDesc};
use blaze_rhi::blaze::Result;
use blaze_rhi::{rhi_violation, rhi_warn};
use gl::types::{GLint, GLuint};

use crate::opengl_context::GlContext;
use crate::opengl_mapping;

const SOURCE: &str = "blaze::opengl::SamplerState";

/// OpenGL sampler object
pub struct SamplerState {
    pub(crate) name: GLuint,
    desc: SamplerStateDesc,
}

impl SamplerState {
    pub(crate) fn create(ctx: &GlContext, desc: &SamplerStateDesc) -> Result<Self> {
        desc.validate()?;

        let (min_filter, mag_filter, compare) = opengl_mapping::filter_mode(desc.filter);
        let mut name: GLuint = 0;
        unsafe {
            gl::GenSamplers(1, &mut name);
            gl::SamplerParameteri(name, gl::TEXTURE_MIN_FILTER, min_filter as GLint);
            gl::SamplerParameteri(name, gl::TEXTURE_MAG_FILTER, mag_filter as GLint);
            gl::SamplerParameteri(name, gl::TEXTURE_WRAP_S, opengl_mapping::address_mode(desc.address_u) as GLint);
            gl::SamplerParameteri(name, gl::TEXTURE_WRAP_T, opengl_mapping::address_mode(desc.address_v) as GLint);
            gl::SamplerParameteri(name, gl::TEXTURE_WRAP_R, opengl_mapping::address_mode(desc.address_w) as GLint);
            gl::SamplerParameterf(name, gl::TEXTURE_LOD_BIAS, desc.mip_lod_bias);
            gl::SamplerParameterf(name, gl::TEXTURE_MIN_LOD, desc.min_lod);
            gl::SamplerParameterf(name, gl::TEXTURE_MAX_LOD, desc.max_lod);
            gl::SamplerParameterfv(name, gl::TEXTURE_BORDER_COLOR, desc.border_color.as_ptr());
            if compare {
                gl::SamplerParameteri(name, gl::TEXTURE_COMPARE_MODE, gl::COMPARE_REF_TO_TEXTURE as GLint);
                gl::SamplerParameteri(
                    name,
                    gl::TEXTURE_COMPARE_FUNC,
                    opengl_mapping::comparison_func(desc.comparison_func) as GLint,
                );
            }
        }

        if matches!(desc.filter, FilterMode::Anisotropic | FilterMode::ComparisonAnisotropic) {
            let anisotropy = anisotropy(desc.max_anisotropy, ctx.max_anisotropy);
            if anisotropy < desc.max_anisotropy as f32 {
                rhi_warn!(SOURCE, "Anisotropy {} clamped to {}", desc.max_anisotropy, anisotropy);
            }
            if anisotropy > 1.0 {
                unsafe {
                    gl::SamplerParameterf(name, opengl_mapping::TEXTURE_MAX_ANISOTROPY, anisotropy);
                }
            }
        }

        let sampler = Self { name, desc: desc.clone() };
        ctx.check_error("creating sampler state")?;
        Ok(sampler)
    }
}

/// Requested anisotropy clamped to what the driver supports
pub fn anisotropy(requested: u32, driver_maximum: f32) -> f32 {
    (requested as f32).min(driver_maximum.max(1.0))
}

impl Resource for SamplerState {
    fn resource_type(&self) -> ResourceType {
        ResourceType::SamplerState
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiSamplerState for SamplerState {
    fn desc(&self) -> &SamplerStateDesc {
        &self.desc
    }
}

impl Drop for SamplerState {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteSamplers(1, &self.name);
        }
    }
}

/// The OpenGL sampler behind an RHI sampler state
pub(crate) fn gl_sampler_state(sampler_state: &Arc<dyn RhiSamplerState>) -> Result<&SamplerState> {
    match sampler_state.as_any().downcast_ref::<SamplerState>() {
        Some(sampler_state) => Ok(sampler_state),
        None => rhi_violation!(SOURCE, "sampler state wasn't created by the OpenGL device"),
    }
}
