/// Root signature and resource group: the binding model
///
/// A root signature declares, per root parameter, a descriptor table: an
/// ordered list of descriptor ranges (resource type, register, visibility).
/// A resource group binds concrete resources to one of those tables. Slot `i`
/// of a resource group always matches range `i` of its root parameter.

use std::sync::Arc;
use bitflags::bitflags;
use crate::error::Result;
use crate::rhi::{Resource, ResourceHandle, ResourceType, SamplerState, SamplerStateDesc};
use crate::{rhi_assert, rhi_violation};

const SOURCE: &str = "blaze::rhi::RootSignature";

/// Descriptor range kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorRangeType {
    /// Shader resource view (sampled texture, read-only buffer)
    Srv,
    /// Unordered access view (image load/store, writable buffer)
    Uav,
    /// Uniform buffer view
    Ubv,
    Sampler,
}

impl DescriptorRangeType {
    /// Resource types a range of this kind may declare
    pub fn accepts(self, resource_type: ResourceType) -> bool {
        match self {
            DescriptorRangeType::Srv | DescriptorRangeType::Uav => {
                resource_type.is_texture()
                    || matches!(
                        resource_type,
                        ResourceType::TextureBuffer
                            | ResourceType::StructuredBuffer
                            | ResourceType::VertexBuffer
                            | ResourceType::IndexBuffer
                            | ResourceType::IndirectBuffer
                    )
            }
            DescriptorRangeType::Ubv => resource_type == ResourceType::UniformBuffer,
            DescriptorRangeType::Sampler => resource_type == ResourceType::SamplerState,
        }
    }
}

/// Shader stages a binding is visible to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderVisibility {
    All,
    AllGraphics,
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Fragment,
    Task,
    Mesh,
    Compute,
}

impl ShaderVisibility {
    /// Two visibilities share at least one stage
    pub fn overlaps(self, other: ShaderVisibility) -> bool {
        match (self, other) {
            (ShaderVisibility::All, _) | (_, ShaderVisibility::All) => true,
            (ShaderVisibility::AllGraphics, v) | (v, ShaderVisibility::AllGraphics) => v != ShaderVisibility::Compute,
            (a, b) => a == b,
        }
    }
}

/// One range of a descriptor table
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorRange {
    pub range_type: DescriptorRangeType,
    /// Descriptor arrays are expressed as consecutive ranges, so this is always 1
    pub number_of_descriptors: u32,
    pub base_shader_register: u32,
    pub register_space: u32,
    /// Name of the uniform block / sampler / image in the shader source (backends without
    /// explicit register syntax bind by name)
    pub base_shader_register_name: String,
    /// Resource type that must be bound in this slot
    pub resource_type: ResourceType,
    pub shader_visibility: ShaderVisibility,
}

impl DescriptorRange {
    fn new(
        range_type: DescriptorRangeType,
        base_shader_register: u32,
        name: impl Into<String>,
        resource_type: ResourceType,
        shader_visibility: ShaderVisibility,
    ) -> Self {
        Self {
            range_type,
            number_of_descriptors: 1,
            base_shader_register,
            register_space: 0,
            base_shader_register_name: name.into(),
            resource_type,
            shader_visibility,
        }
    }

    /// Shader resource view range
    pub fn srv(base_shader_register: u32, name: impl Into<String>, resource_type: ResourceType, shader_visibility: ShaderVisibility) -> Self {
        Self::new(DescriptorRangeType::Srv, base_shader_register, name, resource_type, shader_visibility)
    }

    /// Unordered access view range
    pub fn uav(base_shader_register: u32, name: impl Into<String>, resource_type: ResourceType, shader_visibility: ShaderVisibility) -> Self {
        Self::new(DescriptorRangeType::Uav, base_shader_register, name, resource_type, shader_visibility)
    }

    /// Uniform buffer range
    pub fn ubv(base_shader_register: u32, name: impl Into<String>, shader_visibility: ShaderVisibility) -> Self {
        Self::new(DescriptorRangeType::Ubv, base_shader_register, name, ResourceType::UniformBuffer, shader_visibility)
    }

    /// Sampler state range
    pub fn sampler(base_shader_register: u32, shader_visibility: ShaderVisibility) -> Self {
        Self::new(DescriptorRangeType::Sampler, base_shader_register, "", ResourceType::SamplerState, shader_visibility)
    }

    pub fn with_register_space(mut self, register_space: u32) -> Self {
        self.register_space = register_space;
        self
    }

    fn collides_with(&self, other: &DescriptorRange) -> bool {
        self.range_type == other.range_type
            && self.register_space == other.register_space
            && self.base_shader_register == other.base_shader_register
            && self.shader_visibility.overlaps(other.shader_visibility)
    }
}

/// Root parameter (a descriptor table)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootParameter {
    pub ranges: Vec<DescriptorRange>,
}

impl RootParameter {
    pub fn descriptor_table(ranges: Vec<DescriptorRange>) -> Self {
        Self { ranges }
    }
}

/// Sampler baked into the root signature
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSampler {
    pub desc: SamplerStateDesc,
    pub shader_register: u32,
    pub register_space: u32,
    pub shader_visibility: ShaderVisibility,
}

bitflags! {
    /// Root signature flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RootSignatureFlags: u32 {
        /// Pipeline states using this root signature read vertex attributes
        const ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT = 1 << 0;
    }
}

/// Descriptor for creating a root signature
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootSignatureDesc {
    pub parameters: Vec<RootParameter>,
    pub static_samplers: Vec<StaticSampler>,
    pub flags: RootSignatureFlags,
}

impl RootSignatureDesc {
    pub fn new(parameters: Vec<RootParameter>) -> Self {
        Self {
            parameters,
            static_samplers: Vec::new(),
            flags: RootSignatureFlags::ALLOW_INPUT_ASSEMBLER_INPUT_LAYOUT,
        }
    }

    pub fn with_static_samplers(mut self, static_samplers: Vec<StaticSampler>) -> Self {
        self.static_samplers = static_samplers;
        self
    }

    pub fn with_flags(mut self, flags: RootSignatureFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Check the layout before the backend creates a root signature from it
    pub fn validate(&self) -> Result<()> {
        for (parameter_index, parameter) in self.parameters.iter().enumerate() {
            rhi_assert!(
                !parameter.ranges.is_empty(),
                SOURCE,
                "root parameter {} has an empty descriptor table",
                parameter_index
            );
            for (range_index, range) in parameter.ranges.iter().enumerate() {
                rhi_assert!(
                    range.number_of_descriptors == 1,
                    SOURCE,
                    "root parameter {} range {} declares {} descriptors, use one range per descriptor",
                    parameter_index,
                    range_index,
                    range.number_of_descriptors
                );
                rhi_assert!(
                    range.range_type.accepts(range.resource_type),
                    SOURCE,
                    "root parameter {} range {}: a {:?} range can't hold a {:?}",
                    parameter_index,
                    range_index,
                    range.range_type,
                    range.resource_type
                );
                let collision = parameter.ranges[..range_index]
                    .iter()
                    .position(|other| other.collides_with(range));
                rhi_assert!(
                    collision.is_none(),
                    SOURCE,
                    "root parameter {}: ranges {} and {} both use {:?} register {} (space {})",
                    parameter_index,
                    collision.unwrap_or_default(),
                    range_index,
                    range.range_type,
                    range.base_shader_register,
                    range.register_space
                );
            }
        }
        Ok(())
    }

    /// Check a resource group against root parameter `root_parameter_index`
    ///
    /// * `resources` - One slot per range of the descriptor table, `None` leaves it unbound
    /// * `sampler_states` - Optional sampler per slot, only for texture slots
    pub fn validate_resource_group(
        &self,
        root_parameter_index: u32,
        resources: &[Option<ResourceHandle>],
        sampler_states: Option<&[Option<Arc<dyn SamplerState>>]>,
    ) -> Result<()> {
        let Some(parameter) = self.parameters.get(root_parameter_index as usize) else {
            rhi_violation!(
                SOURCE,
                "root parameter index {} out of range ({} parameters)",
                root_parameter_index,
                self.parameters.len()
            );
        };

        rhi_assert!(
            resources.len() == parameter.ranges.len(),
            SOURCE,
            "resource group for root parameter {} has {} resources, descriptor table has {} ranges",
            root_parameter_index,
            resources.len(),
            parameter.ranges.len()
        );
        for (slot, (resource, range)) in resources.iter().zip(&parameter.ranges).enumerate() {
            let Some(resource) = resource else {
                continue;
            };
            rhi_assert!(
                resource.resource_type() == range.resource_type,
                SOURCE,
                "resource group slot {}: {:?} '{}' bound to a {:?} range",
                slot,
                resource.resource_type(),
                resource.debug_name(),
                range.resource_type
            );
        }
        if let Some(sampler_states) = sampler_states {
            rhi_assert!(
                sampler_states.len() == parameter.ranges.len(),
                SOURCE,
                "resource group has {} sampler states for {} ranges",
                sampler_states.len(),
                parameter.ranges.len()
            );
            for (slot, (sampler, range)) in sampler_states.iter().zip(&parameter.ranges).enumerate() {
                rhi_assert!(
                    sampler.is_none() || (range.range_type == DescriptorRangeType::Srv && range.resource_type.is_texture()),
                    SOURCE,
                    "resource group slot {}: sampler state given for a non-texture {:?} range",
                    slot,
                    range.range_type
                );
            }
        }
        Ok(())
    }
}

// ===== TRAITS =====

/// Root signature resource
pub trait RootSignature: Resource {
    fn desc(&self) -> &Arc<RootSignatureDesc>;

    /// Bind resources to root parameter `root_parameter_index`
    ///
    /// # Arguments
    ///
    /// * `root_parameter_index` - Descriptor table the group is created for
    /// * `resources` - One slot per range of that table, in range order (`None` = unbound)
    /// * `sampler_states` - Optional per-slot sampler for texture slots
    fn create_resource_group(
        &self,
        root_parameter_index: u32,
        resources: Vec<Option<ResourceHandle>>,
        sampler_states: Option<Vec<Option<Arc<dyn SamplerState>>>>,
    ) -> Result<Arc<dyn ResourceGroup>>;
}

/// Validated, immutable content of a resource group
#[derive(Clone)]
pub struct ResourceGroupData {
    root_signature_desc: Arc<RootSignatureDesc>,
    root_parameter_index: u32,
    resources: Vec<Option<ResourceHandle>>,
    sampler_states: Vec<Option<Arc<dyn SamplerState>>>,
}

impl ResourceGroupData {
    pub fn new(
        root_signature_desc: Arc<RootSignatureDesc>,
        root_parameter_index: u32,
        resources: Vec<Option<ResourceHandle>>,
        sampler_states: Option<Vec<Option<Arc<dyn SamplerState>>>>,
    ) -> Result<Self> {
        root_signature_desc.validate_resource_group(
            root_parameter_index,
            &resources,
            sampler_states.as_deref(),
        )?;
        let sampler_states = sampler_states.unwrap_or_else(|| vec![None; resources.len()]);
        Ok(Self {
            root_signature_desc,
            root_parameter_index,
            resources,
            sampler_states,
        })
    }

    pub fn root_signature_desc(&self) -> &Arc<RootSignatureDesc> {
        &self.root_signature_desc
    }

    pub fn root_parameter_index(&self) -> u32 {
        self.root_parameter_index
    }

    /// One entry per slot (None where the slot is left unbound)
    pub fn resources(&self) -> &[Option<ResourceHandle>] {
        &self.resources
    }

    /// One entry per slot (None where no sampler is attached)
    pub fn sampler_states(&self) -> &[Option<Arc<dyn SamplerState>>] {
        &self.sampler_states
    }

    /// Descriptor ranges, parallel to `resources()`
    pub fn ranges(&self) -> &[DescriptorRange] {
        &self.root_signature_desc.parameters[self.root_parameter_index as usize].ranges
    }
}

/// Resource group resource (immutable; rebinding means creating a new group)
pub trait ResourceGroup: Resource {
    fn data(&self) -> &ResourceGroupData;

    fn root_parameter_index(&self) -> u32 {
        self.data().root_parameter_index()
    }

    fn resources(&self) -> &[Option<ResourceHandle>] {
        self.data().resources()
    }

    fn sampler_states(&self) -> &[Option<Arc<dyn SamplerState>>] {
        self.data().sampler_states()
    }
}

#[cfg(test)]
#[path = "root_signature_tests.rs"]
mod tests;
