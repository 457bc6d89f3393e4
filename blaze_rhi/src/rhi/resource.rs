/// Resource base trait, resource type tags and the type-erased bindable handle

use std::any::Any;
use std::sync::Arc;
use crate::rhi::{Buffer, SamplerState, Texture};

/// Type tag of every RHI resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    RootSignature,
    ResourceGroup,
    GraphicsProgram,
    VertexArray,
    RenderPass,
    SwapChain,
    Framebuffer,
    IndexBuffer,
    VertexBuffer,
    TextureBuffer,
    StructuredBuffer,
    IndirectBuffer,
    UniformBuffer,
    Texture1D,
    Texture1DArray,
    Texture2D,
    Texture2DArray,
    Texture3D,
    TextureCube,
    TextureCubeArray,
    GraphicsPipelineState,
    ComputePipelineState,
    SamplerState,
    VertexShader,
    TessellationControlShader,
    TessellationEvaluationShader,
    GeometryShader,
    FragmentShader,
    TaskShader,
    MeshShader,
    ComputeShader,
}

impl ResourceType {
    pub fn is_texture(self) -> bool {
        matches!(
            self,
            ResourceType::Texture1D
                | ResourceType::Texture1DArray
                | ResourceType::Texture2D
                | ResourceType::Texture2DArray
                | ResourceType::Texture3D
                | ResourceType::TextureCube
                | ResourceType::TextureCubeArray
        )
    }

    pub fn is_buffer(self) -> bool {
        matches!(
            self,
            ResourceType::IndexBuffer
                | ResourceType::VertexBuffer
                | ResourceType::TextureBuffer
                | ResourceType::StructuredBuffer
                | ResourceType::IndirectBuffer
                | ResourceType::UniformBuffer
        )
    }

    pub fn is_shader(self) -> bool {
        matches!(
            self,
            ResourceType::VertexShader
                | ResourceType::TessellationControlShader
                | ResourceType::TessellationEvaluationShader
                | ResourceType::GeometryShader
                | ResourceType::FragmentShader
                | ResourceType::TaskShader
                | ResourceType::MeshShader
                | ResourceType::ComputeShader
        )
    }
}

/// Base trait of every backend-created resource
///
/// Resources are shared through `Arc`; the backend releases its native
/// handle when the last reference is dropped.
pub trait Resource: Send + Sync {
    /// Type tag of this resource
    fn resource_type(&self) -> ResourceType;

    /// Debug name given at creation (empty if none)
    fn debug_name(&self) -> &str {
        ""
    }

    /// Downcast support for backends (`as_any().downcast_ref::<GlTexture>()`)
    fn as_any(&self) -> &dyn Any;
}

/// A resource that can be placed in a resource group slot
#[derive(Clone)]
pub enum ResourceHandle {
    Texture(Arc<dyn Texture>),
    Buffer(Arc<dyn Buffer>),
    SamplerState(Arc<dyn SamplerState>),
}

impl ResourceHandle {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceHandle::Texture(texture) => texture.resource_type(),
            ResourceHandle::Buffer(buffer) => buffer.resource_type(),
            ResourceHandle::SamplerState(sampler) => sampler.resource_type(),
        }
    }

    pub fn debug_name(&self) -> &str {
        match self {
            ResourceHandle::Texture(texture) => texture.debug_name(),
            ResourceHandle::Buffer(buffer) => buffer.debug_name(),
            ResourceHandle::SamplerState(sampler) => sampler.debug_name(),
        }
    }

    pub fn as_texture(&self) -> Option<&Arc<dyn Texture>> {
        match self {
            ResourceHandle::Texture(texture) => Some(texture),
            _ => None,
        }
    }

    pub fn as_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        match self {
            ResourceHandle::Buffer(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn as_sampler_state(&self) -> Option<&Arc<dyn SamplerState>> {
        match self {
            ResourceHandle::SamplerState(sampler) => Some(sampler),
            _ => None,
        }
    }

    /// Identity comparison (same underlying resource)
    pub fn ptr_eq(&self, other: &ResourceHandle) -> bool {
        match (self, other) {
            (ResourceHandle::Texture(a), ResourceHandle::Texture(b)) => same_object(a, b),
            (ResourceHandle::Buffer(a), ResourceHandle::Buffer(b)) => same_object(a, b),
            (ResourceHandle::SamplerState(a), ResourceHandle::SamplerState(b)) => same_object(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}(\"{}\")", self.resource_type(), self.debug_name())
    }
}

impl From<Arc<dyn Texture>> for ResourceHandle {
    fn from(texture: Arc<dyn Texture>) -> Self {
        ResourceHandle::Texture(texture)
    }
}

impl From<Arc<dyn Buffer>> for ResourceHandle {
    fn from(buffer: Arc<dyn Buffer>) -> Self {
        ResourceHandle::Buffer(buffer)
    }
}

impl From<Arc<dyn SamplerState>> for ResourceHandle {
    fn from(sampler: Arc<dyn SamplerState>) -> Self {
        ResourceHandle::SamplerState(sampler)
    }
}

/// Identity comparison for any shared trait object
pub(crate) fn same_object<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
