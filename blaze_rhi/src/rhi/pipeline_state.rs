/// Pipeline state traits, fixed-function state blocks and pipeline state descriptors

use std::sync::Arc;
use bitflags::bitflags;
use crate::error::Result;
use crate::rhi::{
    ComparisonFunc, GraphicsProgram, RenderPass, Resource, RootSignature, Shader, ShaderType,
    VertexAttributes,
};
use crate::rhi::render_target::MAX_NUMBER_OF_COLOR_ATTACHMENTS;
use crate::rhi_assert;

const SOURCE: &str = "blaze::rhi::PipelineState";

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
    /// Tessellation patches with the given number of control points (1..=32)
    PatchList(u8),
}

impl PrimitiveTopology {
    pub fn topology_type(self) -> PrimitiveTopologyType {
        match self {
            PrimitiveTopology::PointList => PrimitiveTopologyType::Point,
            PrimitiveTopology::LineList | PrimitiveTopology::LineStrip => PrimitiveTopologyType::Line,
            PrimitiveTopology::TriangleList | PrimitiveTopology::TriangleStrip => PrimitiveTopologyType::Triangle,
            PrimitiveTopology::PatchList(_) => PrimitiveTopologyType::Patch,
        }
    }
}

/// Primitive topology class the pipeline state is compiled for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopologyType {
    Point,
    Line,
    Triangle,
    Patch,
}

// ===== RASTERIZER STATE =====

/// Polygon rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Draw edges only (wireframe)
    Wireframe,
    Solid,
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Depth bias parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBias {
    /// Constant depth offset
    pub constant_factor: f32,
    /// Slope-based depth offset
    pub slope_factor: f32,
    /// Maximum depth bias clamp
    pub clamp: f32,
}

/// Rasterizer fixed-function state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerState {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_counter_clockwise: bool,
    /// None = disabled
    pub depth_bias: Option<DepthBias>,
    pub depth_clip_enable: bool,
    pub multisample_enable: bool,
    pub scissor_enable: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            fill_mode: FillMode::Solid,
            cull_mode: CullMode::Back,
            front_counter_clockwise: false,
            depth_bias: None,
            depth_clip_enable: true,
            multisample_enable: false,
            scissor_enable: false,
        }
    }
}

// ===== DEPTH/STENCIL STATE =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthWriteMask {
    Zero,
    All,
}

/// Stencil operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

/// Stencil operations of one face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilOpDesc {
    pub stencil_fail_op: StencilOp,
    pub stencil_depth_fail_op: StencilOp,
    pub stencil_pass_op: StencilOp,
    pub stencil_func: ComparisonFunc,
}

impl Default for DepthStencilOpDesc {
    fn default() -> Self {
        Self {
            stencil_fail_op: StencilOp::Keep,
            stencil_depth_fail_op: StencilOp::Keep,
            stencil_pass_op: StencilOp::Keep,
            stencil_func: ComparisonFunc::Always,
        }
    }
}

/// Depth and stencil testing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_enable: bool,
    pub depth_write_mask: DepthWriteMask,
    pub depth_func: ComparisonFunc,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub front_face: DepthStencilOpDesc,
    pub back_face: DepthStencilOpDesc,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_enable: true,
            depth_write_mask: DepthWriteMask::All,
            depth_func: ComparisonFunc::Less,
            stencil_enable: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            front_face: DepthStencilOpDesc::default(),
            back_face: DepthStencilOpDesc::default(),
        }
    }
}

// ===== BLEND STATE =====

/// Blend factor for color blending equations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blend {
    Zero,
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DestAlpha,
    InvDestAlpha,
    DestColor,
    InvDestColor,
    SrcAlphaSat,
    BlendFactor,
    InvBlendFactor,
}

/// Blend operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOp {
    /// result = src * srcFactor + dst * dstFactor
    Add,
    /// result = src * srcFactor - dst * dstFactor
    Subtract,
    /// result = dst * dstFactor - src * srcFactor
    RevSubtract,
    Min,
    Max,
}

bitflags! {
    /// Color channels written to a render target
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteEnable: u8 {
        const RED   = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE  = 1 << 2;
        const ALPHA = 1 << 3;
        const ALL   = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits() | Self::ALPHA.bits();
    }
}

/// Blending of one render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetBlendDesc {
    pub blend_enable: bool,
    pub src_blend: Blend,
    pub dest_blend: Blend,
    pub blend_op: BlendOp,
    pub src_blend_alpha: Blend,
    pub dest_blend_alpha: Blend,
    pub blend_op_alpha: BlendOp,
    pub render_target_write_mask: ColorWriteEnable,
}

impl Default for RenderTargetBlendDesc {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_blend: Blend::One,
            dest_blend: Blend::Zero,
            blend_op: BlendOp::Add,
            src_blend_alpha: Blend::One,
            dest_blend_alpha: Blend::Zero,
            blend_op_alpha: BlendOp::Add,
            render_target_write_mask: ColorWriteEnable::ALL,
        }
    }
}

/// Color blending state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlendState {
    pub alpha_to_coverage_enable: bool,
    /// Use `render_targets[i]` per target instead of `render_targets[0]` everywhere
    pub independent_blend_enable: bool,
    pub render_targets: [RenderTargetBlendDesc; MAX_NUMBER_OF_COLOR_ATTACHMENTS],
}

impl BlendState {
    /// Blend description used for render target `index`
    pub fn render_target(&self, index: usize) -> &RenderTargetBlendDesc {
        if self.independent_blend_enable {
            &self.render_targets[index]
        } else {
            &self.render_targets[0]
        }
    }
}

// ===== PIPELINE STATE DESCRIPTORS =====

/// Descriptor for creating a graphics pipeline state
#[derive(Clone)]
pub struct GraphicsPipelineStateDesc {
    pub root_signature: Arc<dyn RootSignature>,
    pub graphics_program: Arc<dyn GraphicsProgram>,
    pub vertex_attributes: VertexAttributes,
    /// Render pass whose attachment formats this pipeline state renders to
    pub render_pass: Arc<dyn RenderPass>,
    pub primitive_topology: PrimitiveTopology,
    pub primitive_topology_type: PrimitiveTopologyType,
    pub rasterizer_state: RasterizerState,
    pub depth_stencil_state: DepthStencilState,
    pub blend_state: BlendState,
}

impl GraphicsPipelineStateDesc {
    /// Descriptor with default fixed-function state: no blending, depth test on, solid fill, triangle list
    pub fn new(
        root_signature: Arc<dyn RootSignature>,
        graphics_program: Arc<dyn GraphicsProgram>,
        vertex_attributes: VertexAttributes,
        render_pass: Arc<dyn RenderPass>,
    ) -> Self {
        Self {
            root_signature,
            graphics_program,
            vertex_attributes,
            render_pass,
            primitive_topology: PrimitiveTopology::TriangleList,
            primitive_topology_type: PrimitiveTopologyType::Triangle,
            rasterizer_state: RasterizerState::default(),
            depth_stencil_state: DepthStencilState::default(),
            blend_state: BlendState::default(),
        }
    }

    /// Set the topology and the matching topology type
    pub fn with_primitive_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.primitive_topology = topology;
        self.primitive_topology_type = topology.topology_type();
        self
    }

    pub fn with_rasterizer_state(mut self, state: RasterizerState) -> Self {
        self.rasterizer_state = state;
        self
    }

    pub fn with_depth_stencil_state(mut self, state: DepthStencilState) -> Self {
        self.depth_stencil_state = state;
        self
    }

    pub fn with_blend_state(mut self, state: BlendState) -> Self {
        self.blend_state = state;
        self
    }

    pub fn validate(&self) -> Result<()> {
        rhi_assert!(
            self.primitive_topology.topology_type() == self.primitive_topology_type,
            SOURCE,
            "topology {:?} doesn't match topology type {:?}",
            self.primitive_topology,
            self.primitive_topology_type
        );
        if let PrimitiveTopology::PatchList(control_points) = self.primitive_topology {
            rhi_assert!(
                (1..=32).contains(&control_points),
                SOURCE,
                "patch list with {} control points, expected 1..=32",
                control_points
            );
        }
        if self.graphics_program.is_mesh_program() {
            rhi_assert!(
                self.vertex_attributes.is_empty(),
                SOURCE,
                "mesh shader programs don't read vertex attributes"
            );
        }
        self.vertex_attributes.validate()?;
        rhi_assert!(
            !self.rasterizer_state.multisample_enable || self.render_pass.desc().number_of_multisamples > 1,
            SOURCE,
            "multisampling enabled on a single sample render pass"
        );
        Ok(())
    }
}

/// Descriptor for creating a compute pipeline state
#[derive(Clone)]
pub struct ComputePipelineStateDesc {
    pub root_signature: Arc<dyn RootSignature>,
    pub compute_shader: Arc<dyn Shader>,
}

impl ComputePipelineStateDesc {
    pub fn new(root_signature: Arc<dyn RootSignature>, compute_shader: Arc<dyn Shader>) -> Self {
        Self { root_signature, compute_shader }
    }

    pub fn validate(&self) -> Result<()> {
        rhi_assert!(
            self.compute_shader.shader_type() == ShaderType::Compute,
            SOURCE,
            "compute pipeline state built from a {:?} shader",
            self.compute_shader.shader_type()
        );
        Ok(())
    }
}

// ===== TRAITS =====

/// Compiled graphics pipeline state
///
/// Immutable; the backend releases its native objects when dropped.
pub trait GraphicsPipelineState: Resource {
    fn desc(&self) -> &GraphicsPipelineStateDesc;
}

/// Compiled compute pipeline state
pub trait ComputePipelineState: Resource {
    fn desc(&self) -> &ComputePipelineStateDesc;
}

#[cfg(test)]
#[path = "pipeline_state_tests.rs"]
mod tests;
