/// GraphicsPipelineState / ComputePipelineState - fixed-function state + program
///
/// OpenGL has no pipeline objects; a graphics pipeline state is applied as
/// a batch of state calls when the dispatcher binds it.

use std::any::Any;
use std::sync::Arc;
use blaze_rhi::blaze::rhi::{
    BlendState, ColorWriteEnable, ComputePipelineState as RhiComputePipelineState, ComputePipelineStateDesc,
    DepthStencilOpDesc, DepthStencilState, DepthWriteMask, GraphicsPipelineState as RhiGraphicsPipelineState,
    GraphicsPipelineStateDesc, PrimitiveTopology, RasterizerState, Resource, ResourceType,
};
use blaze_rhi::blaze::Result;
use blaze_rhi::{rhi_debug, rhi_violation, rhi_warn};
use gl::types::{GLboolean, GLenum, GLint, GLuint};

use crate::opengl_context::GlContext;
use crate::opengl_mapping;
use crate::opengl_root_signature::gl_root_signature;
use crate::opengl_shader::{gl_graphics_program, gl_shader, link_program, Program};

const SOURCE: &str = "blaze::opengl::PipelineState";

/// glEnable / glDisable
unsafe fn set_capability(capability: GLenum, enabled: bool) {
    if enabled {
        gl::Enable(capability);
    } else {
        gl::Disable(capability);
    }
}

unsafe fn apply_rasterizer_state(state: &RasterizerState) {
    gl::PolygonMode(gl::FRONT_AND_BACK, opengl_mapping::polygon_mode(state.fill_mode));
    match opengl_mapping::cull_face(state.cull_mode) {
        Some(face) => {
            gl::Enable(gl::CULL_FACE);
            gl::CullFace(face);
        }
        None => gl::Disable(gl::CULL_FACE),
    }
    gl::FrontFace(if state.front_counter_clockwise { gl::CCW } else { gl::CW });

    match state.depth_bias {
        Some(bias) => {
            gl::Enable(gl::POLYGON_OFFSET_FILL);
            gl::PolygonOffset(bias.slope_factor, bias.constant_factor);
        }
        None => gl::Disable(gl::POLYGON_OFFSET_FILL),
    }

    // Disabling depth clipping clamps depth instead
    set_capability(gl::DEPTH_CLAMP, !state.depth_clip_enable);
    set_capability(gl::MULTISAMPLE, state.multisample_enable);
    set_capability(gl::SCISSOR_TEST, state.scissor_enable);
}

unsafe fn apply_stencil_face(face: GLenum, desc: &DepthStencilOpDesc, read_mask: u8) {
    gl::StencilFuncSeparate(face, opengl_mapping::comparison_func(desc.stencil_func), 0, read_mask as GLuint);
    gl::StencilOpSeparate(
        face,
        opengl_mapping::stencil_op(desc.stencil_fail_op),
        opengl_mapping::stencil_op(desc.stencil_depth_fail_op),
        opengl_mapping::stencil_op(desc.stencil_pass_op),
    );
}

unsafe fn apply_depth_stencil_state(state: &DepthStencilState) {
    set_capability(gl::DEPTH_TEST, state.depth_enable);
    gl::DepthMask((state.depth_write_mask == DepthWriteMask::All) as GLboolean);
    gl::DepthFunc(opengl_mapping::comparison_func(state.depth_func));

    set_capability(gl::STENCIL_TEST, state.stencil_enable);
    if state.stencil_enable {
        apply_stencil_face(gl::FRONT, &state.front_face, state.stencil_read_mask);
        apply_stencil_face(gl::BACK, &state.back_face, state.stencil_read_mask);
        gl::StencilMask(state.stencil_write_mask as GLuint);
    }
}

unsafe fn apply_blend_state(state: &BlendState, number_of_render_targets: usize) {
    set_capability(gl::SAMPLE_ALPHA_TO_COVERAGE, state.alpha_to_coverage_enable);
    for index in 0..number_of_render_targets.max(1) {
        let desc = state.render_target(index);
        let buffer = index as GLuint;
        if desc.blend_enable {
            gl::Enablei(gl::BLEND, buffer);
            gl::BlendFuncSeparatei(
                buffer,
                opengl_mapping::blend_factor(desc.src_blend),
                opengl_mapping::blend_factor(desc.dest_blend),
                opengl_mapping::blend_factor(desc.src_blend_alpha),
                opengl_mapping::blend_factor(desc.dest_blend_alpha),
            );
            gl::BlendEquationSeparatei(
                buffer,
                opengl_mapping::blend_op(desc.blend_op),
                opengl_mapping::blend_op(desc.blend_op_alpha),
            );
        } else {
            gl::Disablei(gl::BLEND, buffer);
        }
        let mask = desc.render_target_write_mask;
        gl::ColorMaski(
            buffer,
            mask.contains(ColorWriteEnable::RED) as GLboolean,
            mask.contains(ColorWriteEnable::GREEN) as GLboolean,
            mask.contains(ColorWriteEnable::BLUE) as GLboolean,
            mask.contains(ColorWriteEnable::ALPHA) as GLboolean,
        );
    }
}

// ============================================================================
// GraphicsPipelineState
// ============================================================================

/// OpenGL graphics pipeline state
pub struct GraphicsPipelineState {
    desc: GraphicsPipelineStateDesc,
    /// Program of `desc.graphics_program`, kept alive by the desc
    pub(crate) program: GLuint,
    /// Draw mode of the primitive topology
    pub(crate) primitive_mode: GLenum,
}

impl GraphicsPipelineState {
    pub(crate) fn create(desc: GraphicsPipelineStateDesc) -> Result<Self> {
        desc.validate()?;
        gl_root_signature(&desc.root_signature)?;
        let program = gl_graphics_program(&desc.graphics_program)?.name();
        if desc.rasterizer_state.depth_bias.is_some_and(|bias| bias.clamp != 0.0) {
            rhi_warn!(SOURCE, "Depth bias clamp isn't supported on OpenGL 4.3, ignored");
        }
        let primitive_mode = opengl_mapping::primitive_mode(desc.primitive_topology);

        rhi_debug!(SOURCE, "Graphics pipeline state created ({:?})", desc.primitive_topology);
        Ok(Self { desc, program, primitive_mode })
    }

    /// Issue every fixed-function state call
    ///
    /// The program is bound by the dispatcher's binding state.
    pub(crate) fn apply(&self) {
        let number_of_render_targets = self.desc.render_pass.desc().number_of_color_attachments();
        unsafe {
            apply_rasterizer_state(&self.desc.rasterizer_state);
            apply_depth_stencil_state(&self.desc.depth_stencil_state);
            apply_blend_state(&self.desc.blend_state, number_of_render_targets);
            if let PrimitiveTopology::PatchList(control_points) = self.desc.primitive_topology {
                gl::PatchParameteri(gl::PATCH_VERTICES, control_points as GLint);
            }
        }
    }
}

impl Resource for GraphicsPipelineState {
    fn resource_type(&self) -> ResourceType {
        ResourceType::GraphicsPipelineState
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiGraphicsPipelineState for GraphicsPipelineState {
    fn desc(&self) -> &GraphicsPipelineStateDesc {
        &self.desc
    }
}

pub(crate) fn gl_graphics_pipeline_state(
    pipeline_state: &Arc<dyn RhiGraphicsPipelineState>,
) -> Result<&GraphicsPipelineState> {
    match pipeline_state.as_any().downcast_ref::<GraphicsPipelineState>() {
        Some(pipeline_state) => Ok(pipeline_state),
        None => rhi_violation!(SOURCE, "graphics pipeline state wasn't created by the OpenGL device"),
    }
}

// ============================================================================
// ComputePipelineState
// ============================================================================

/// OpenGL compute pipeline state: a linked compute program
pub struct ComputePipelineState {
    desc: ComputePipelineStateDesc,
    program: Program,
}

impl ComputePipelineState {
    pub(crate) fn create(ctx: &GlContext, desc: ComputePipelineStateDesc) -> Result<Self> {
        desc.validate()?;
        gl_root_signature(&desc.root_signature)?;
        let shader = gl_shader(&desc.compute_shader)?.name;
        let program = link_program(ctx, &[shader], None, desc.root_signature.desc())?;

        rhi_debug!(SOURCE, "Compute pipeline state created");
        Ok(Self { desc, program })
    }

    pub(crate) fn program(&self) -> GLuint {
        self.program.name
    }
}

impl Resource for ComputePipelineState {
    fn resource_type(&self) -> ResourceType {
        ResourceType::ComputePipelineState
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiComputePipelineState for ComputePipelineState {
    fn desc(&self) -> &ComputePipelineStateDesc {
        &self.desc
    }
}

pub(crate) fn gl_compute_pipeline_state(
    pipeline_state: &Arc<dyn RhiComputePipelineState>,
) -> Result<&ComputePipelineState> {
    match pipeline_state.as_any().downcast_ref::<ComputePipelineState>() {
        Some(pipeline_state) => Ok(pipeline_state),
        None => rhi_violation!(SOURCE, "compute pipeline state wasn't created by the OpenGL device"),
    }
}
