//! GLSL shader language - shader objects and linked programs
//!
//! Shaders compile from source only; OpenGL shader binaries are driver
//! specific so `create_shader_from_bytecode` keeps the default `Unsupported`.
//! Programs are linked against a vertex attribute layout (attribute `i` gets
//! location `i`) and a root signature (uniform blocks, samplers, images and
//! storage blocks get the binding point of their descriptor range).

use std::any::Any;
use std::ffi::CString;
use std::sync::Arc;
use blaze_rhi::blaze::rhi::{
    GraphicsProgram as RhiGraphicsProgram, GraphicsProgramShaders, Resource, ResourceType,
    RootSignature as RhiRootSignature, RootSignatureDesc, Shader as RhiShader, ShaderLanguage,
    ShaderSourceCode, ShaderType, VertexAttributes,
};
use blaze_rhi::blaze::{Error, Result};
use blaze_rhi::{rhi_bail, rhi_debug, rhi_violation, rhi_warn};
use gl::types::{GLchar, GLint, GLsizei, GLuint};

use crate::opengl_context::GlContext;
use crate::opengl_mapping;
use crate::opengl_root_signature::{binding_kind, BindingKind};

const SOURCE: &str = "blaze::opengl::Shader";

/// Name reported by the shader language and every object it creates
pub const GLSL_NAME: &str = "GLSL";

// ============================================================================
// Preprocessing
// ============================================================================

/// Insert preprocessor definitions into GLSL source
///
/// `#version` must stay the first directive, so the definitions go right
/// after it, followed by a `#line` directive that keeps compiler messages
/// pointing at the original line numbers. Without a `#version` line they
/// are prepended.
pub fn inject_preprocessor_definitions(source_code: &str, definitions: &str) -> String {
    if definitions.trim().is_empty() {
        return source_code.to_string();
    }

    let mut block = definitions.to_string();
    if !block.ends_with('\n') {
        block.push('\n');
    }

    let mut offset = 0;
    for (index, line) in source_code.split_inclusive('\n').enumerate() {
        offset += line.len();
        if line.trim_start().starts_with("#version") {
            let mut result = String::with_capacity(source_code.len() + block.len() + 16);
            result.push_str(&source_code[..offset]);
            if !line.ends_with('\n') {
                result.push('\n');
            }
            result.push_str(&block);
            result.push_str(&format!("#line {}\n", index + 2));
            result.push_str(&source_code[offset..]);
            return result;
        }
    }

    let mut result = block;
    result.push_str("#line 1\n");
    result.push_str(source_code);
    result
}

// ============================================================================
// Info logs
// ============================================================================

fn shader_info_log(shader: GLuint) -> String {
    let mut length: GLint = 0;
    unsafe {
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut length);
    }
    let mut log = vec![0u8; length.max(1) as usize];
    let mut written: GLsizei = 0;
    unsafe {
        gl::GetShaderInfoLog(shader, log.len() as GLsizei, &mut written, log.as_mut_ptr() as *mut GLchar);
    }
    log.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&log).trim_end().to_string()
}

fn program_info_log(program: GLuint) -> String {
    let mut length: GLint = 0;
    unsafe {
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut length);
    }
    let mut log = vec![0u8; length.max(1) as usize];
    let mut written: GLsizei = 0;
    unsafe {
        gl::GetProgramInfoLog(program, log.len() as GLsizei, &mut written, log.as_mut_ptr() as *mut GLchar);
    }
    log.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&log).trim_end().to_string()
}

// ============================================================================
// Shader
// ============================================================================

/// Compiled GLSL shader object
pub struct Shader {
    pub(crate) name: GLuint,
    shader_type: ShaderType,
}

impl Shader {
    pub(crate) fn compile(ctx: &GlContext, shader_type: ShaderType, source: &ShaderSourceCode) -> Result<Self> {
        let kind = match opengl_mapping::shader_kind(shader_type) {
            Some(kind) => kind,
            None => {
                return Err(Error::Unsupported(format!("{:?} shaders aren't supported by OpenGL", shader_type)))
            }
        };

        let source_code = inject_preprocessor_definitions(&source.source_code, &source.preprocessor_definitions);
        let pointer = source_code.as_ptr() as *const GLchar;
        let length = source_code.len() as GLint;

        let mut status: GLint = 0;
        let name = unsafe {
            let name = gl::CreateShader(kind);
            gl::ShaderSource(name, 1, &pointer, &length);
            gl::CompileShader(name);
            gl::GetShaderiv(name, gl::COMPILE_STATUS, &mut status);
            name
        };
        // Owned from here on so every early return deletes it
        let shader = Self { name, shader_type };

        if status != gl::TRUE as GLint {
            rhi_bail!(SOURCE, "{:?} shader compilation failed:\n{}", shader_type, shader_info_log(name));
        }
        let log = shader_info_log(name);
        if !log.is_empty() {
            rhi_warn!(SOURCE, "{:?} shader compiled with messages:\n{}", shader_type, log);
        }

        ctx.check_error("compiling shader")?;
        Ok(shader)
    }
}

impl Resource for Shader {
    fn resource_type(&self) -> ResourceType {
        self.shader_type.resource_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiShader for Shader {
    fn shader_type(&self) -> ShaderType {
        self.shader_type
    }

    fn shader_language_name(&self) -> &str {
        GLSL_NAME
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteShader(self.name);
        }
    }
}

/// The GLSL shader behind an RHI shader
pub(crate) fn gl_shader(shader: &Arc<dyn RhiShader>) -> Result<&Shader> {
    match shader.as_any().downcast_ref::<Shader>() {
        Some(shader) => Ok(shader),
        None => rhi_violation!(SOURCE, "{:?} shader wasn't created by the GLSL shader language", shader.shader_type()),
    }
}

// ============================================================================
// Program linking
// ============================================================================

/// Program object deleted on drop
pub(crate) struct Program {
    pub(crate) name: GLuint,
}

impl Drop for Program {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.name);
        }
    }
}

/// Link shader objects into a program and assign its binding points
pub(crate) fn link_program(
    ctx: &GlContext,
    shaders: &[GLuint],
    vertex_attributes: Option<&VertexAttributes>,
    root_signature: &RootSignatureDesc,
) -> Result<Program> {
    let program = Program { name: unsafe { gl::CreateProgram() } };

    unsafe {
        for shader in shaders {
            gl::AttachShader(program.name, *shader);
        }
    }

    if let Some(vertex_attributes) = vertex_attributes {
        for (location, attribute) in vertex_attributes.attributes.iter().enumerate() {
            match CString::new(attribute.name.as_str()) {
                Ok(name) => unsafe { gl::BindAttribLocation(program.name, location as GLuint, name.as_ptr()) },
                Err(_) => rhi_violation!(SOURCE, "vertex attribute name {:?} contains a NUL byte", attribute.name),
            }
        }
    }

    let mut status: GLint = 0;
    unsafe {
        gl::LinkProgram(program.name);
        gl::GetProgramiv(program.name, gl::LINK_STATUS, &mut status);
        for shader in shaders {
            gl::DetachShader(program.name, *shader);
        }
    }
    if status != gl::TRUE as GLint {
        rhi_bail!(SOURCE, "Program link failed:\n{}", program_info_log(program.name));
    }

    assign_bindings(program.name, root_signature);
    ctx.check_error("linking program")?;
    Ok(program)
}

/// Point named blocks and samplers of `program` at their descriptor range binding
fn assign_bindings(program: GLuint, root_signature: &RootSignatureDesc) {
    let ranges = root_signature.parameters.iter().flat_map(|parameter| parameter.ranges.iter());
    for range in ranges {
        if range.base_shader_register_name.is_empty() {
            continue;
        }
        let Ok(name) = CString::new(range.base_shader_register_name.as_str()) else {
            continue;
        };
        let register = range.base_shader_register;
        unsafe {
            match binding_kind(range) {
                BindingKind::UniformBuffer => {
                    let index = gl::GetUniformBlockIndex(program, name.as_ptr());
                    if index != gl::INVALID_INDEX {
                        gl::UniformBlockBinding(program, index, register);
                    }
                }
                BindingKind::StorageBuffer => {
                    let index = gl::GetProgramResourceIndex(program, gl::SHADER_STORAGE_BLOCK, name.as_ptr());
                    if index != gl::INVALID_INDEX {
                        gl::ShaderStorageBlockBinding(program, index, register);
                    }
                }
                BindingKind::Texture | BindingKind::Image | BindingKind::Sampler => {
                    let location = gl::GetUniformLocation(program, name.as_ptr());
                    if location != -1 {
                        gl::ProgramUniform1i(program, location, register as GLint);
                    }
                }
            }
        }
    }
}

// ============================================================================
// GraphicsProgram
// ============================================================================

/// Linked GLSL graphics program
pub struct GraphicsProgram {
    program: Program,
    /// Keeps the stages alive as long as the program
    _shaders: GraphicsProgramShaders,
}

impl GraphicsProgram {
    pub(crate) fn name(&self) -> GLuint {
        self.program.name
    }
}

impl Resource for GraphicsProgram {
    fn resource_type(&self) -> ResourceType {
        ResourceType::GraphicsProgram
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RhiGraphicsProgram for GraphicsProgram {
    fn shader_language_name(&self) -> &str {
        GLSL_NAME
    }

    fn is_mesh_program(&self) -> bool {
        false
    }
}

/// The GLSL program behind an RHI graphics program
pub(crate) fn gl_graphics_program(program: &Arc<dyn RhiGraphicsProgram>) -> Result<&GraphicsProgram> {
    match program.as_any().downcast_ref::<GraphicsProgram>() {
        Some(program) => Ok(program),
        None => rhi_violation!(SOURCE, "graphics program wasn't created by the GLSL shader language"),
    }
}

// ============================================================================
// ShaderLanguageGlsl
// ============================================================================

/// GLSL shader language of the OpenGL device
pub struct ShaderLanguageGlsl {
    ctx: Arc<GlContext>,
}

impl ShaderLanguageGlsl {
    pub(crate) fn new(ctx: Arc<GlContext>) -> Self {
        Self { ctx }
    }
}

impl ShaderLanguage for ShaderLanguageGlsl {
    fn name(&self) -> &str {
        GLSL_NAME
    }

    fn create_shader_from_source_code(
        &self,
        shader_type: ShaderType,
        source: &ShaderSourceCode,
    ) -> Result<Arc<dyn RhiShader>> {
        let shader = Shader::compile(&self.ctx, shader_type, source)?;
        rhi_debug!(SOURCE, "{:?} shader compiled", shader_type);
        Ok(Arc::new(shader))
    }

    fn create_graphics_program(
        &self,
        root_signature: &Arc<dyn RhiRootSignature>,
        vertex_attributes: &VertexAttributes,
        shaders: GraphicsProgramShaders,
    ) -> Result<Arc<dyn RhiGraphicsProgram>> {
        shaders.validate(GLSL_NAME)?;
        if shaders.is_mesh() {
            return Err(Error::Unsupported("mesh shader programs aren't supported by OpenGL".to_string()));
        }
        vertex_attributes.validate()?;

        let mut names = Vec::new();
        for (_, shader) in shaders.stages() {
            names.push(gl_shader(shader)?.name);
        }
        let program = link_program(&self.ctx, &names, Some(vertex_attributes), root_signature.desc())?;
        rhi_debug!(SOURCE, "Graphics program linked ({} stages)", names.len());

        Ok(Arc::new(GraphicsProgram { program, _shaders: shaders }))
    }
}

#[cfg(test)]
#[path = "opengl_shader_tests.rs"]
mod tests;
