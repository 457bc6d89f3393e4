/// Shader traits, shader sources and the shader language factory

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::rhi::{Resource, ResourceType, RootSignature, VertexAttributes};
use crate::rhi_assert;

const SOURCE: &str = "blaze::rhi::Shader";

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Fragment,
    Task,
    Mesh,
    Compute,
}

impl ShaderType {
    pub fn resource_type(self) -> ResourceType {
        match self {
            ShaderType::Vertex => ResourceType::VertexShader,
            ShaderType::TessellationControl => ResourceType::TessellationControlShader,
            ShaderType::TessellationEvaluation => ResourceType::TessellationEvaluationShader,
            ShaderType::Geometry => ResourceType::GeometryShader,
            ShaderType::Fragment => ResourceType::FragmentShader,
            ShaderType::Task => ResourceType::TaskShader,
            ShaderType::Mesh => ResourceType::MeshShader,
            ShaderType::Compute => ResourceType::ComputeShader,
        }
    }
}

/// Shader source code plus preprocessor definitions injected before it
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShaderSourceCode {
    pub source_code: String,
    /// Lines such as `#define USE_FOG 1`, inserted right after the version directive
    pub preprocessor_definitions: String,
}

impl ShaderSourceCode {
    pub fn new(source_code: impl Into<String>) -> Self {
        Self {
            source_code: source_code.into(),
            preprocessor_definitions: String::new(),
        }
    }

    pub fn with_preprocessor_definitions(mut self, definitions: impl Into<String>) -> Self {
        self.preprocessor_definitions = definitions.into();
        self
    }
}

/// Precompiled shader bytecode (backend-specific format)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShaderBytecode {
    pub bytes: Vec<u8>,
}

/// Compiled shader stage
pub trait Shader: Resource {
    fn shader_type(&self) -> ShaderType;

    /// Name of the shader language that created this shader
    fn shader_language_name(&self) -> &str;
}

/// Linked set of graphics shader stages
pub trait GraphicsProgram: Resource {
    fn shader_language_name(&self) -> &str;

    /// Task/mesh pipeline instead of the vertex pipeline
    fn is_mesh_program(&self) -> bool;
}

/// Stages making up a graphics program
#[derive(Clone)]
pub enum GraphicsProgramShaders {
    /// Vertex pipeline
    Traditional {
        vertex: Arc<dyn Shader>,
        tessellation_control: Option<Arc<dyn Shader>>,
        tessellation_evaluation: Option<Arc<dyn Shader>>,
        geometry: Option<Arc<dyn Shader>>,
        fragment: Option<Arc<dyn Shader>>,
    },
    /// Task/mesh pipeline
    Mesh {
        task: Option<Arc<dyn Shader>>,
        mesh: Arc<dyn Shader>,
        fragment: Option<Arc<dyn Shader>>,
    },
}

impl GraphicsProgramShaders {
    /// Vertex + fragment program
    pub fn vertex_fragment(vertex: Arc<dyn Shader>, fragment: Arc<dyn Shader>) -> Self {
        GraphicsProgramShaders::Traditional {
            vertex,
            tessellation_control: None,
            tessellation_evaluation: None,
            geometry: None,
            fragment: Some(fragment),
        }
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self, GraphicsProgramShaders::Mesh { .. })
    }

    /// Present stages with the stage each one is bound to
    pub fn stages(&self) -> Vec<(ShaderType, &Arc<dyn Shader>)> {
        let mut stages = Vec::new();
        match self {
            GraphicsProgramShaders::Traditional {
                vertex,
                tessellation_control,
                tessellation_evaluation,
                geometry,
                fragment,
            } => {
                stages.push((ShaderType::Vertex, vertex));
                if let Some(shader) = tessellation_control {
                    stages.push((ShaderType::TessellationControl, shader));
                }
                if let Some(shader) = tessellation_evaluation {
                    stages.push((ShaderType::TessellationEvaluation, shader));
                }
                if let Some(shader) = geometry {
                    stages.push((ShaderType::Geometry, shader));
                }
                if let Some(shader) = fragment {
                    stages.push((ShaderType::Fragment, shader));
                }
            }
            GraphicsProgramShaders::Mesh { task, mesh, fragment } => {
                if let Some(shader) = task {
                    stages.push((ShaderType::Task, shader));
                }
                stages.push((ShaderType::Mesh, mesh));
                if let Some(shader) = fragment {
                    stages.push((ShaderType::Fragment, shader));
                }
            }
        }
        stages
    }

    /// Check stage types and that every stage comes from `language_name`
    pub fn validate(&self, language_name: &str) -> Result<()> {
        for (stage, shader) in self.stages() {
            rhi_assert!(
                shader.shader_type() == stage,
                SOURCE,
                "{:?} shader bound to the {:?} stage",
                shader.shader_type(),
                stage
            );
            rhi_assert!(
                shader.shader_language_name() == language_name,
                SOURCE,
                "{:?} shader comes from shader language '{}', program uses '{}'",
                stage,
                shader.shader_language_name(),
                language_name
            );
        }
        if let GraphicsProgramShaders::Traditional { tessellation_control, tessellation_evaluation, .. } = self {
            rhi_assert!(
                tessellation_control.is_some() == tessellation_evaluation.is_some(),
                SOURCE,
                "tessellation control and evaluation shaders must be used together"
            );
        }
        Ok(())
    }
}

/// Shader language factory (GLSL, HLSL, SPIR-V, ...)
pub trait ShaderLanguage {
    /// Language name (e.g. "GLSL")
    fn name(&self) -> &str;

    /// Compile one shader stage from source code
    fn create_shader_from_source_code(
        &self,
        shader_type: ShaderType,
        source: &ShaderSourceCode,
    ) -> Result<Arc<dyn Shader>>;

    /// Load one shader stage from precompiled bytecode
    fn create_shader_from_bytecode(
        &self,
        shader_type: ShaderType,
        _bytecode: &ShaderBytecode,
    ) -> Result<Arc<dyn Shader>> {
        Err(Error::Unsupported(format!(
            "shader language '{}' can't load {:?} shader bytecode",
            self.name(),
            shader_type
        )))
    }

    /// Link shader stages into a graphics program
    ///
    /// The root signature lets the backend assign binding points to the
    /// program's uniform blocks and samplers.
    fn create_graphics_program(
        &self,
        root_signature: &Arc<dyn RootSignature>,
        vertex_attributes: &VertexAttributes,
        shaders: GraphicsProgramShaders,
    ) -> Result<Arc<dyn GraphicsProgram>>;

    fn create_vertex_shader_from_source_code(&self, source_code: &str) -> Result<Arc<dyn Shader>> {
        self.create_shader_from_source_code(ShaderType::Vertex, &ShaderSourceCode::new(source_code))
    }

    fn create_tessellation_control_shader_from_source_code(&self, source_code: &str) -> Result<Arc<dyn Shader>> {
        self.create_shader_from_source_code(ShaderType::TessellationControl, &ShaderSourceCode::new(source_code))
    }

    fn create_tessellation_evaluation_shader_from_source_code(&self, source_code: &str) -> Result<Arc<dyn Shader>> {
        self.create_shader_from_source_code(ShaderType::TessellationEvaluation, &ShaderSourceCode::new(source_code))
    }

    fn create_geometry_shader_from_source_code(&self, source_code: &str) -> Result<Arc<dyn Shader>> {
        self.create_shader_from_source_code(ShaderType::Geometry, &ShaderSourceCode::new(source_code))
    }

    fn create_fragment_shader_from_source_code(&self, source_code: &str) -> Result<Arc<dyn Shader>> {
        self.create_shader_from_source_code(ShaderType::Fragment, &ShaderSourceCode::new(source_code))
    }

    fn create_task_shader_from_source_code(&self, source_code: &str) -> Result<Arc<dyn Shader>> {
        self.create_shader_from_source_code(ShaderType::Task, &ShaderSourceCode::new(source_code))
    }

    fn create_mesh_shader_from_source_code(&self, source_code: &str) -> Result<Arc<dyn Shader>> {
        self.create_shader_from_source_code(ShaderType::Mesh, &ShaderSourceCode::new(source_code))
    }

    fn create_compute_shader_from_source_code(&self, source_code: &str) -> Result<Arc<dyn Shader>> {
        self.create_shader_from_source_code(ShaderType::Compute, &ShaderSourceCode::new(source_code))
    }
}
