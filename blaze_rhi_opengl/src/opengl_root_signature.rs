//! RootSignature / ResourceGroup - descriptor tables on OpenGL binding points
//!
//! OpenGL has no descriptor sets. Each descriptor range maps to one binding
//! point of the matching kind, numbered by its base shader register:
//!
//! | Range   | Resource                         | Binding point                |
//! |---------|----------------------------------|------------------------------|
//! | Ubv     | uniform buffer                   | `GL_UNIFORM_BUFFER` index    |
//! | Srv     | texture, texture buffer          | texture unit                 |
//! | Srv     | structured / vertex / index ...  | `GL_SHADER_STORAGE_BUFFER`   |
//! | Uav     | texture, texture buffer          | image unit                   |
//! | Uav     | structured / indirect buffer     | `GL_SHADER_STORAGE_BUFFER`   |
//! | Sampler | sampler state                    | texture unit                 |
//!
//! Register spaces are ignored. Programs get their block and sampler
//! bindings assigned at link time from the same table.

use std::any::Any;
use std::sync::Arc;
use blaze_rhi::blaze::rhi::{
    Buffer as RhiBuffer, BufferKind, DescriptorRange, DescriptorRangeType, Resource, ResourceGroup as RhiResourceGroup,
    ResourceGroupData, ResourceHandle, ResourceType, RootSignature as RhiRootSignature,
    RootSignatureDesc, SamplerState as RhiSamplerState,
};
use blaze_rhi::blaze::Result;
use blaze_rhi::{rhi_debug, rhi_violation};
use gl::types::{GLboolean, GLenum, GLuint};

use crate::opengl_buffer::gl_buffer;
use crate::opengl_context::GlContext;
use crate::opengl_mapping;
use crate::opengl_sampler::{gl_sampler_state, SamplerState};
use crate::opengl_texture::gl_texture;

const SOURCE: &str = "blaze::opengl::RootSignature";

// ============================================================================
// Binding kinds
// ============================================================================

/// OpenGL binding point family a descriptor range is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    UniformBuffer,
    Texture,
    Image,
    StorageBuffer,
    Sampler,
}

/// Binding point family of a descriptor range
pub fn binding_kind(range: &DescriptorRange) -> BindingKind {
    match range.range_type {
        DescriptorRangeType::Ubv => BindingKind::UniformBuffer,
        DescriptorRangeType::Sampler => BindingKind::Sampler,
        DescriptorRangeType::Srv => {
            if range.resource_type.is_texture() || range.resource_type == ResourceType::TextureBuffer {
                BindingKind::Texture
            } else {
                BindingKind::StorageBuffer
            }
        }
        DescriptorRangeType::Uav => {
            if range.resource_type.is_texture() || range.resource_type == ResourceType::TextureBuffer {
                BindingKind::Image
            } else {
                BindingKind::StorageBuffer
            }
        }
    }
}

/// Image bindings of arrays, cube maps and volumes expose every layer
pub fn is_layered(resource_type: ResourceType) -> bool {
    matches!(
        resource_type,
        ResourceType::Texture1DArray
            | ResourceType::Texture2DArray
            | ResourceType::Texture3D
            | ResourceType::TextureCube
            | ResourceType::TextureCubeArray
    )
}

// ============================================================================
// GlBinding
// ============================================================================

/// One resolved binding, ready to issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GlBinding {
    UniformBuffer { index: GLuint, buffer: GLuint },
    StorageBuffer { index: GLuint, buffer: GLuint },
    Texture { unit: GLuint, target: GLenum, texture: GLuint, sampler: Option<GLuint> },
    Image { unit: GLuint, texture: GLuint, layered: bool, format: GLenum },
    Sampler { unit: GLuint, sampler: GLuint },
}

impl GlBinding {
    pub(crate) fn bind(&self) {
        unsafe {
            match *self {
                GlBinding::UniformBuffer { index, buffer } => gl::BindBufferBase(gl::UNIFORM_BUFFER, index, buffer),
                GlBinding::StorageBuffer { index, buffer } => {
                    gl::BindBufferBase(gl::SHADER_STORAGE_BUFFER, index, buffer)
                }
                GlBinding::Texture { unit, target, texture, sampler } => {
                    gl::ActiveTexture(gl::TEXTURE0 + unit);
                    gl::BindTexture(target, texture);
                    if let Some(sampler) = sampler {
                        gl::BindSampler(unit, sampler);
                    }
                }
                GlBinding::Image { unit, texture, layered, format } => {
                    gl::BindImageTexture(unit, texture, 0, layered as GLboolean, 0, gl::READ_WRITE, format)
                }
                GlBinding::Sampler { unit, sampler } => gl::BindSampler(unit, sampler),
            }
        }
    }
}

/// Texture unit whose sampler is owned by a static sampler or a sampler range
fn unit_has_own_sampler(desc: &RootSignatureDesc, unit: GLuint) -> bool {
    desc.static_samplers.iter().any(|static_sampler| static_sampler.shader_register == unit)
        || desc
            .parameters
            .iter()
            .flat_map(|parameter| &parameter.ranges)
            .any(|range| range.range_type == DescriptorRangeType::Sampler && range.base_shader_register == unit)
}

/// Sampler object a texture binding leaves on its unit
///
/// `None` keeps the sampler already there. A texture without a sampler of its
/// own gets sampler 0 unless something else in the root signature feeds that
/// unit, so a sampler from an earlier group can't leak onto it.
pub fn texture_unit_sampler(desc: &RootSignatureDesc, unit: GLuint, sampler: Option<GLuint>) -> Option<GLuint> {
    match sampler {
        Some(sampler) => Some(sampler),
        None if unit_has_own_sampler(desc, unit) => None,
        None => Some(0),
    }
}

/// Resolve one resource of a group against its range
fn resolve_binding(
    range: &DescriptorRange,
    resource: &ResourceHandle,
    sampler_state: Option<&Arc<dyn RhiSamplerState>>,
) -> Result<GlBinding> {
    let register = range.base_shader_register;
    match (binding_kind(range), resource) {
        (BindingKind::UniformBuffer, ResourceHandle::Buffer(buffer)) => Ok(GlBinding::UniformBuffer {
            index: register,
            buffer: gl_buffer(buffer.as_ref())?.name,
        }),
        (BindingKind::StorageBuffer, ResourceHandle::Buffer(buffer)) => Ok(GlBinding::StorageBuffer {
            index: register,
            buffer: gl_buffer(buffer.as_ref())?.name,
        }),
        (BindingKind::Texture, ResourceHandle::Texture(texture)) => {
            let texture = gl_texture(texture.as_ref())?;
            let sampler = match sampler_state {
                Some(sampler_state) => Some(gl_sampler_state(sampler_state)?.name),
                None => None,
            };
            Ok(GlBinding::Texture { unit: register, target: texture.target, texture: texture.name, sampler })
        }
        (BindingKind::Texture, ResourceHandle::Buffer(buffer)) => Ok(GlBinding::Texture {
            unit: register,
            target: gl::TEXTURE_BUFFER,
            texture: gl_buffer(buffer.as_ref())?.texture,
            sampler: None,
        }),
        (BindingKind::Image, ResourceHandle::Texture(texture)) => {
            let resource_type = texture.resource_type();
            let texture = gl_texture(texture.as_ref())?;
            Ok(GlBinding::Image {
                unit: register,
                texture: texture.name,
                layered: is_layered(resource_type),
                format: texture.format.internal_format,
            })
        }
        (BindingKind::Image, ResourceHandle::Buffer(buffer)) => {
            let gl_buffer = gl_buffer(buffer.as_ref())?;
            let format = match gl_buffer.info().kind {
                BufferKind::Texture(format) => opengl_mapping::texture_format(format)?,
                kind => rhi_violation!(SOURCE, "image binding {} needs a texture buffer, got {:?}", register, kind),
            };
            Ok(GlBinding::Image { unit: register, texture: gl_buffer.texture, layered: false, format: format.internal_format })
        }
        (BindingKind::Sampler, ResourceHandle::SamplerState(sampler_state)) => Ok(GlBinding::Sampler {
            unit: register,
            sampler: gl_sampler_state(sampler_state)?.name,
        }),
        (kind, resource) => rhi_violation!(
            SOURCE,
            "{:?} binding {} can't hold {:?} '{}'",
            kind,
            register,
            resource.resource_type(),
            resource.debug_name()
        ),
    }
}

// ============================================================================
// RootSignature
// ============================================================================

/// OpenGL root signature
///
/// Keeps the layout and owns the sampler objects of its static samplers.
pub struct RootSignature {
    desc: Arc<RootSignatureDesc>,
    static_samplers: Vec<(GLuint, SamplerState)>,
}

impl RootSignature {
    pub(crate) fn create(ctx: &GlContext, desc: RootSignatureDesc) -> Result<Self> {
        desc.validate()?;

        let mut static_samplers = Vec::with_capacity(desc.static_samplers.len());
        for static_sampler in &desc.static_samplers {
            let sampler_state = SamplerState::create(ctx, &static_sampler.desc)?;
            static_samplers.push((static_sampler.shader_register, sampler_state));
        }

        rhi_debug!(
            SOURCE,
            "Root signature created ({} parameters, {} static samplers)",
            desc.parameters.len(),
            static_samplers.len()
        );

        Ok(Self { desc: Arc::new(desc), static_samplers })
    }

    /// Bind the static samplers to their texture units
    pub(crate) fn bind_static_samplers(&self) {
        for (unit, sampler_state) in &self.static_samplers {
            unsafe {
                gl::BindSampler(*unit, sampler_state.name);
            }
        }
    }
}

impl Resource for RootSignature {
    fn resource_type(&self) -> ResourceType {
        ResourceType::RootSignature
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiRootSignature for RootSignature {
    fn desc(&self) -> &Arc<RootSignatureDesc> {
        &self.desc
    }

    fn create_resource_group(
        &self,
        root_parameter_index: u32,
        resources: Vec<Option<ResourceHandle>>,
        sampler_states: Option<Vec<Option<Arc<dyn RhiSamplerState>>>>,
    ) -> Result<Arc<dyn RhiResourceGroup>> {
        let data = ResourceGroupData::new(Arc::clone(&self.desc), root_parameter_index, resources, sampler_states)?;
        let group = ResourceGroup::create(data)?;
        Ok(Arc::new(group))
    }
}

/// The OpenGL root signature behind an RHI root signature
pub(crate) fn gl_root_signature(root_signature: &Arc<dyn RhiRootSignature>) -> Result<&RootSignature> {
    match root_signature.as_any().downcast_ref::<RootSignature>() {
        Some(root_signature) => Ok(root_signature),
        None => rhi_violation!(SOURCE, "root signature wasn't created by the OpenGL device"),
    }
}

// ============================================================================
// ResourceGroup
// ============================================================================

/// OpenGL resource group: validated resources plus their resolved bindings
pub struct ResourceGroup {
    data: ResourceGroupData,
    bindings: Vec<GlBinding>,
}

impl ResourceGroup {
    fn create(data: ResourceGroupData) -> Result<Self> {
        let mut bindings = Vec::with_capacity(data.resources().len());
        for ((range, resource), sampler_state) in
            data.ranges().iter().zip(data.resources()).zip(data.sampler_states())
        {
            // Unbound slots keep whatever the binding point holds
            let Some(resource) = resource else {
                continue;
            };
            let binding = match resolve_binding(range, resource, sampler_state.as_ref())? {
                GlBinding::Texture { unit, target, texture, sampler } => GlBinding::Texture {
                    unit,
                    target,
                    texture,
                    sampler: texture_unit_sampler(data.root_signature_desc(), unit, sampler),
                },
                binding => binding,
            };
            bindings.push(binding);
        }
        Ok(Self { data, bindings })
    }

    pub(crate) fn bind(&self) {
        for binding in &self.bindings {
            binding.bind();
        }
    }
}

impl Resource for ResourceGroup {
    fn resource_type(&self) -> ResourceType {
        ResourceType::ResourceGroup
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiResourceGroup for ResourceGroup {
    fn data(&self) -> &ResourceGroupData {
        &self.data
    }
}

/// The OpenGL resource group behind an RHI resource group
pub(crate) fn gl_resource_group(resource_group: &Arc<dyn RhiResourceGroup>) -> Result<&ResourceGroup> {
    match resource_group.as_any().downcast_ref::<ResourceGroup>() {
        Some(resource_group) => Ok(resource_group),
        None => rhi_violation!(SOURCE, "resource group wasn't created by the OpenGL device"),
    }
}

#[cfg(test)]
#[path = "opengl_root_signature_tests.rs"]
mod tests;
