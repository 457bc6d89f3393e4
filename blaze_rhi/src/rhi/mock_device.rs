/// Mock device for unit tests (no GPU required)
///
/// Every resource kind has a mock that keeps its descriptor; the mock
/// dispatcher records one line per dispatched command so tests can compare
/// call sequences.

use std::any::Any;
use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::rhi::{
    validate_buffer_update, validate_framebuffer, validate_vertex_array, Buffer, BufferDesc,
    BufferInfo, BufferKind, BufferManager, Capabilities, ClearFlags, CommandDispatcher,
    ComputePipelineState, ComputePipelineStateDesc, Device, DeviceStatistics, DrawArguments,
    DrawIndexedArguments, DrawMeshTasksArguments, DrawSource, Framebuffer, FramebufferAttachment,
    GraphicsPipelineState, GraphicsPipelineStateDesc, GraphicsProgram, GraphicsProgramShaders,
    IndexBufferFormat, IndirectBufferFlags, MapType, RenderPass, RenderPassDesc,
    RenderTargetHandle, Resource, ResourceGroup, ResourceGroupData, ResourceHandle, ResourceType,
    RootSignature, RootSignatureDesc, SamplerState, SamplerStateDesc, ScissorRectangle, Shader,
    ShaderLanguage, ShaderSourceCode, ShaderType, SwapChain, Texture, TextureDesc, TextureFormat,
    TextureManager, VertexArray, VertexAttributes, Viewport, WindowHandle,
};
use crate::rhi_bail;

const SOURCE: &str = "blaze::rhi::mock";

// ============================================================================
// Mock Texture
// ============================================================================

pub struct MockTexture {
    pub desc: TextureDesc,
}

impl MockTexture {
    pub fn new(desc: TextureDesc) -> Self {
        Self { desc }
    }
}

impl Resource for MockTexture {
    fn resource_type(&self) -> ResourceType {
        self.desc.dimension.resource_type()
    }

    fn debug_name(&self) -> &str {
        &self.desc.debug_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Texture for MockTexture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }
}

/// Shader-resource 2D RGBA texture
pub fn mock_texture_2d(width: u32, height: u32) -> Arc<dyn Texture> {
    Arc::new(MockTexture::new(
        TextureDesc::texture_2d(width, height, TextureFormat::R8G8B8A8).with_debug_name("mock_texture_2d"),
    ))
}

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    pub info: BufferInfo,
    /// Buffer content, written by `update` and `map_buffer`
    pub data: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn new(kind: BufferKind, desc: BufferDesc, data: Option<&[u8]>) -> Self {
        let bytes = match data {
            Some(data) => data.to_vec(),
            None => vec![0; desc.number_of_bytes as usize],
        };
        Self {
            info: BufferInfo { kind, desc },
            data: Mutex::new(bytes),
        }
    }
}

impl Resource for MockBuffer {
    fn resource_type(&self) -> ResourceType {
        self.info.kind.resource_type()
    }

    fn debug_name(&self) -> &str {
        &self.info.desc.debug_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Buffer for MockBuffer {
    fn info(&self) -> &BufferInfo {
        &self.info
    }

    fn update(&self, offset: u32, data: &[u8]) -> Result<()> {
        validate_buffer_update(&self.info, offset, data)?;
        let mut bytes = self.data.lock().map_err(|_| Error::BackendError("poisoned".to_string()))?;
        bytes[offset as usize..offset as usize + data.len()].copy_from_slice(data);
        Ok(())
    }
}

pub fn mock_buffer(kind: BufferKind, number_of_bytes: u32) -> Arc<dyn Buffer> {
    let desc = BufferDesc::new(number_of_bytes, crate::rhi::BufferUsage::DynamicDraw)
        .with_debug_name(format!("mock_{:?}", kind.resource_type()));
    Arc::new(MockBuffer::new(kind, desc, None))
}

// ============================================================================
// Mock VertexArray
// ============================================================================

pub struct MockVertexArray {
    pub vertex_attributes: VertexAttributes,
    pub vertex_buffers: Vec<Arc<dyn Buffer>>,
    pub index_buffer: Option<Arc<dyn Buffer>>,
}

impl Resource for MockVertexArray {
    fn resource_type(&self) -> ResourceType {
        ResourceType::VertexArray
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl VertexArray for MockVertexArray {
    fn vertex_attributes(&self) -> &VertexAttributes {
        &self.vertex_attributes
    }

    fn vertex_buffers(&self) -> &[Arc<dyn Buffer>] {
        &self.vertex_buffers
    }

    fn index_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.index_buffer.as_ref()
    }
}

// ============================================================================
// Mock SamplerState
// ============================================================================

pub struct MockSamplerState {
    pub desc: SamplerStateDesc,
}

impl Resource for MockSamplerState {
    fn resource_type(&self) -> ResourceType {
        ResourceType::SamplerState
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SamplerState for MockSamplerState {
    fn desc(&self) -> &SamplerStateDesc {
        &self.desc
    }
}

pub fn mock_sampler_state() -> Arc<dyn SamplerState> {
    Arc::new(MockSamplerState { desc: SamplerStateDesc::default() })
}

// ============================================================================
// Mock Shader / GraphicsProgram / ShaderLanguage
// ============================================================================

pub const MOCK_SHADER_LANGUAGE: &str = "MockSL";

pub struct MockShader {
    pub shader_type: ShaderType,
    pub language_name: &'static str,
}

impl Resource for MockShader {
    fn resource_type(&self) -> ResourceType {
        self.shader_type.resource_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Shader for MockShader {
    fn shader_type(&self) -> ShaderType {
        self.shader_type
    }

    fn shader_language_name(&self) -> &str {
        self.language_name
    }
}

pub fn mock_shader(shader_type: ShaderType) -> Arc<dyn Shader> {
    Arc::new(MockShader { shader_type, language_name: MOCK_SHADER_LANGUAGE })
}

pub struct MockGraphicsProgram {
    pub is_mesh: bool,
}

impl Resource for MockGraphicsProgram {
    fn resource_type(&self) -> ResourceType {
        ResourceType::GraphicsProgram
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl GraphicsProgram for MockGraphicsProgram {
    fn shader_language_name(&self) -> &str {
        MOCK_SHADER_LANGUAGE
    }

    fn is_mesh_program(&self) -> bool {
        self.is_mesh
    }
}

pub struct MockShaderLanguage;

impl ShaderLanguage for MockShaderLanguage {
    fn name(&self) -> &str {
        MOCK_SHADER_LANGUAGE
    }

    fn create_shader_from_source_code(&self, shader_type: ShaderType, source: &ShaderSourceCode) -> Result<Arc<dyn Shader>> {
        if source.source_code.is_empty() {
            rhi_bail!(SOURCE, "empty {:?} shader source", shader_type);
        }
        Ok(mock_shader(shader_type))
    }

    fn create_graphics_program(
        &self,
        _root_signature: &Arc<dyn RootSignature>,
        vertex_attributes: &VertexAttributes,
        shaders: GraphicsProgramShaders,
    ) -> Result<Arc<dyn GraphicsProgram>> {
        vertex_attributes.validate()?;
        shaders.validate(MOCK_SHADER_LANGUAGE)?;
        Ok(Arc::new(MockGraphicsProgram { is_mesh: shaders.is_mesh() }))
    }
}

// ============================================================================
// Mock RootSignature / ResourceGroup
// ============================================================================

pub struct MockRootSignature {
    pub desc: Arc<RootSignatureDesc>,
}

impl Resource for MockRootSignature {
    fn resource_type(&self) -> ResourceType {
        ResourceType::RootSignature
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RootSignature for MockRootSignature {
    fn desc(&self) -> &Arc<RootSignatureDesc> {
        &self.desc
    }

    fn create_resource_group(
        &self,
        root_parameter_index: u32,
        resources: Vec<Option<ResourceHandle>>,
        sampler_states: Option<Vec<Option<Arc<dyn SamplerState>>>>,
    ) -> Result<Arc<dyn ResourceGroup>> {
        let data = ResourceGroupData::new(Arc::clone(&self.desc), root_parameter_index, resources, sampler_states)?;
        Ok(Arc::new(MockResourceGroup { data }))
    }
}

pub struct MockResourceGroup {
    pub data: ResourceGroupData,
}

impl Resource for MockResourceGroup {
    fn resource_type(&self) -> ResourceType {
        ResourceType::ResourceGroup
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ResourceGroup for MockResourceGroup {
    fn data(&self) -> &ResourceGroupData {
        &self.data
    }
}

pub fn mock_root_signature(desc: RootSignatureDesc) -> Result<Arc<dyn RootSignature>> {
    desc.validate()?;
    Ok(Arc::new(MockRootSignature { desc: Arc::new(desc) }))
}

// ============================================================================
// Mock RenderPass / SwapChain / Framebuffer
// ============================================================================

pub struct MockRenderPass {
    pub desc: RenderPassDesc,
}

impl Resource for MockRenderPass {
    fn resource_type(&self) -> ResourceType {
        ResourceType::RenderPass
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl RenderPass for MockRenderPass {
    fn desc(&self) -> &RenderPassDesc {
        &self.desc
    }
}

pub fn mock_render_pass(desc: RenderPassDesc) -> Arc<dyn RenderPass> {
    Arc::new(MockRenderPass { desc })
}

pub struct MockSwapChain {
    pub render_pass: Arc<dyn RenderPass>,
    pub size: Mutex<(u32, u32)>,
    pub presented: Mutex<u32>,
}

impl Resource for MockSwapChain {
    fn resource_type(&self) -> ResourceType {
        ResourceType::SwapChain
    }

    fn debug_name(&self) -> &str {
        "mock_swap_chain"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl SwapChain for MockSwapChain {
    fn render_pass(&self) -> &Arc<dyn RenderPass> {
        &self.render_pass
    }

    fn width_and_height(&self) -> (u32, u32) {
        self.size.lock().map(|size| *size).unwrap_or((0, 0))
    }

    fn present(&self) -> Result<()> {
        if let Ok(mut presented) = self.presented.lock() {
            *presented += 1;
        }
        Ok(())
    }

    fn resize_buffers(&self) -> Result<()> {
        Ok(())
    }

    fn set_vertical_synchronization_interval(&self, _interval: u32) -> Result<()> {
        Ok(())
    }
}

pub struct MockFramebuffer {
    pub render_pass: Arc<dyn RenderPass>,
    pub color_attachments: Vec<FramebufferAttachment>,
    pub depth_stencil_attachment: Option<FramebufferAttachment>,
    pub size: (u32, u32),
}

impl Resource for MockFramebuffer {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Framebuffer
    }

    fn debug_name(&self) -> &str {
        "mock_framebuffer"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Framebuffer for MockFramebuffer {
    fn render_pass(&self) -> &Arc<dyn RenderPass> {
        &self.render_pass
    }

    fn color_attachments(&self) -> &[FramebufferAttachment] {
        &self.color_attachments
    }

    fn depth_stencil_attachment(&self) -> Option<&FramebufferAttachment> {
        self.depth_stencil_attachment.as_ref()
    }

    fn width_and_height(&self) -> (u32, u32) {
        self.size
    }
}

// ============================================================================
// Mock pipeline states
// ============================================================================

pub struct MockGraphicsPipelineState {
    pub desc: GraphicsPipelineStateDesc,
}

impl Resource for MockGraphicsPipelineState {
    fn resource_type(&self) -> ResourceType {
        ResourceType::GraphicsPipelineState
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl GraphicsPipelineState for MockGraphicsPipelineState {
    fn desc(&self) -> &GraphicsPipelineStateDesc {
        &self.desc
    }
}

pub struct MockComputePipelineState {
    pub desc: ComputePipelineStateDesc,
}

impl Resource for MockComputePipelineState {
    fn resource_type(&self) -> ResourceType {
        ResourceType::ComputePipelineState
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ComputePipelineState for MockComputePipelineState {
    fn desc(&self) -> &ComputePipelineStateDesc {
        &self.desc
    }
}

// ============================================================================
// Mock managers
// ============================================================================

/// Buffer manager recording the debug names of created buffers
#[derive(Default)]
pub struct MockBufferManager {
    pub created_buffers: Mutex<Vec<String>>,
}

impl MockBufferManager {
    fn create(&self, kind: BufferKind, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>> {
        desc.validate(data)?;
        if let Ok(mut created) = self.created_buffers.lock() {
            created.push(format!("{:?}:{}", kind.resource_type(), desc.number_of_bytes));
        }
        Ok(Arc::new(MockBuffer::new(kind, desc.clone(), data)))
    }

    pub fn get_created_buffers(&self) -> Vec<String> {
        self.created_buffers.lock().map(|created| created.clone()).unwrap_or_default()
    }
}

impl BufferManager for MockBufferManager {
    fn create_vertex_buffer(&self, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>> {
        self.create(BufferKind::Vertex, desc, data)
    }

    fn create_index_buffer(&self, desc: &BufferDesc, format: IndexBufferFormat, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>> {
        self.create(BufferKind::Index(format), desc, data)
    }

    fn create_vertex_array(
        &self,
        vertex_attributes: &VertexAttributes,
        vertex_buffers: Vec<Arc<dyn Buffer>>,
        index_buffer: Option<Arc<dyn Buffer>>,
    ) -> Result<Arc<dyn VertexArray>> {
        validate_vertex_array(vertex_attributes, &vertex_buffers, index_buffer.as_ref())?;
        Ok(Arc::new(MockVertexArray {
            vertex_attributes: vertex_attributes.clone(),
            vertex_buffers,
            index_buffer,
        }))
    }

    fn create_uniform_buffer(&self, desc: &BufferDesc, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>> {
        self.create(BufferKind::Uniform, desc, data)
    }

    fn create_texture_buffer(&self, desc: &BufferDesc, format: TextureFormat, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>> {
        self.create(BufferKind::Texture(format), desc, data)
    }

    fn create_structured_buffer(
        &self,
        desc: &BufferDesc,
        number_of_structure_bytes: u32,
        data: Option<&[u8]>,
    ) -> Result<Arc<dyn Buffer>> {
        self.create(BufferKind::Structured { number_of_structure_bytes }, desc, data)
    }

    fn create_indirect_buffer(&self, desc: &BufferDesc, flags: IndirectBufferFlags, data: Option<&[u8]>) -> Result<Arc<dyn Buffer>> {
        self.create(BufferKind::Indirect(flags), desc, data)
    }
}

#[derive(Default)]
pub struct MockTextureManager {
    pub created_textures: Mutex<Vec<String>>,
}

impl MockTextureManager {
    pub fn get_created_textures(&self) -> Vec<String> {
        self.created_textures.lock().map(|created| created.clone()).unwrap_or_default()
    }
}

impl TextureManager for MockTextureManager {
    fn create_texture(&self, desc: &TextureDesc, data: Option<&[u8]>) -> Result<Arc<dyn Texture>> {
        desc.validate(data)?;
        if let Ok(mut created) = self.created_textures.lock() {
            created.push(format!("{:?}:{}x{}", desc.dimension, desc.width, desc.height));
        }
        Ok(Arc::new(MockTexture::new(desc.clone())))
    }
}

// ============================================================================
// Mock Dispatcher
// ============================================================================

/// Dispatcher recording one line per call
#[derive(Debug, Default)]
pub struct MockDispatcher {
    pub calls: Vec<String>,
    pub statistics: DeviceStatistics,
}

impl MockDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, call: String) -> Result<()> {
        self.calls.push(call);
        self.statistics.commands_dispatched += 1;
        Ok(())
    }

    fn draws<A>(source: &DrawSource<A>) -> u32 {
        match source {
            DrawSource::Direct(_) => 1,
            DrawSource::Indirect { number_of_draws, .. } => *number_of_draws,
        }
    }
}

impl CommandDispatcher for MockDispatcher {
    fn set_graphics_root_signature(&mut self, root_signature: &Arc<dyn RootSignature>) -> Result<()> {
        self.record(format!("set_graphics_root_signature({})", root_signature.desc().parameters.len()))
    }

    fn set_graphics_pipeline_state(&mut self, _pipeline_state: &Arc<dyn GraphicsPipelineState>) -> Result<()> {
        self.record("set_graphics_pipeline_state".to_string())
    }

    fn set_graphics_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: Option<&Arc<dyn ResourceGroup>>,
    ) -> Result<()> {
        self.record(format!("set_graphics_resource_group({}, {})", root_parameter_index, resource_group.is_some()))
    }

    fn set_graphics_vertex_array(&mut self, vertex_array: Option<&Arc<dyn VertexArray>>) -> Result<()> {
        self.record(format!("set_graphics_vertex_array({})", vertex_array.is_some()))
    }

    fn set_graphics_viewports(&mut self, viewports: &[Viewport]) -> Result<()> {
        self.record(format!("set_graphics_viewports({})", viewports.len()))
    }

    fn set_graphics_scissor_rectangles(&mut self, scissor_rectangles: &[ScissorRectangle]) -> Result<()> {
        self.record(format!("set_graphics_scissor_rectangles({})", scissor_rectangles.len()))
    }

    fn set_graphics_render_target(&mut self, render_target: Option<&RenderTargetHandle>) -> Result<()> {
        self.record(format!("set_graphics_render_target({:?})", render_target))
    }

    fn clear_graphics(&mut self, flags: ClearFlags, _color: [f32; 4], z: f32, stencil: u32) -> Result<()> {
        self.record(format!("clear_graphics({:?}, {}, {})", flags, z, stencil))
    }

    fn draw_graphics(&mut self, source: &DrawSource<DrawArguments>) -> Result<()> {
        self.statistics.draw_calls += Self::draws(source) as u64;
        match source {
            DrawSource::Direct(arguments) => self.record(format!(
                "draw_graphics({}, {})",
                arguments.vertex_count_per_instance, arguments.instance_count
            )),
            DrawSource::Indirect { number_of_draws, .. } => self.record(format!("draw_graphics_indirect({})", number_of_draws)),
        }
    }

    fn draw_indexed_graphics(&mut self, source: &DrawSource<DrawIndexedArguments>) -> Result<()> {
        self.statistics.draw_calls += Self::draws(source) as u64;
        match source {
            DrawSource::Direct(arguments) => self.record(format!(
                "draw_indexed_graphics({}, {})",
                arguments.index_count_per_instance, arguments.instance_count
            )),
            DrawSource::Indirect { number_of_draws, .. } => {
                self.record(format!("draw_indexed_graphics_indirect({})", number_of_draws))
            }
        }
    }

    fn draw_mesh_tasks(&mut self, source: &DrawSource<DrawMeshTasksArguments>) -> Result<()> {
        self.statistics.draw_calls += Self::draws(source) as u64;
        self.record(format!("draw_mesh_tasks({:?})", source))
    }

    fn set_compute_root_signature(&mut self, root_signature: &Arc<dyn RootSignature>) -> Result<()> {
        self.record(format!("set_compute_root_signature({})", root_signature.desc().parameters.len()))
    }

    fn set_compute_pipeline_state(&mut self, _pipeline_state: &Arc<dyn ComputePipelineState>) -> Result<()> {
        self.record("set_compute_pipeline_state".to_string())
    }

    fn set_compute_resource_group(
        &mut self,
        root_parameter_index: u32,
        resource_group: Option<&Arc<dyn ResourceGroup>>,
    ) -> Result<()> {
        self.record(format!("set_compute_resource_group({}, {})", root_parameter_index, resource_group.is_some()))
    }

    fn dispatch_compute(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Result<()> {
        self.statistics.dispatch_calls += 1;
        self.record(format!("dispatch_compute({}, {}, {})", group_count_x, group_count_y, group_count_z))
    }

    fn copy_uniform_buffer_data(&mut self, uniform_buffer: &Arc<dyn Buffer>, offset: u32, data: &[u8]) -> Result<()> {
        uniform_buffer.update(offset, data)?;
        self.record(format!("copy_uniform_buffer_data({}, {})", offset, data.len()))
    }

    fn set_texture_minimum_maximum_mipmap_index(
        &mut self,
        _texture: &Arc<dyn Texture>,
        minimum_mipmap_index: u32,
        maximum_mipmap_index: u32,
    ) -> Result<()> {
        self.record(format!(
            "set_texture_minimum_maximum_mipmap_index({}, {})",
            minimum_mipmap_index, maximum_mipmap_index
        ))
    }

    fn resolve_multisample_framebuffer(
        &mut self,
        destination: &RenderTargetHandle,
        _source: &Arc<dyn Framebuffer>,
    ) -> Result<()> {
        self.record(format!("resolve_multisample_framebuffer({:?})", destination))
    }

    fn copy_resource(&mut self, destination: &ResourceHandle, source: &ResourceHandle) -> Result<()> {
        self.record(format!("copy_resource({:?}, {:?})", destination.resource_type(), source.resource_type()))
    }

    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture>) -> Result<()> {
        self.record(format!("generate_mipmaps({})", texture.debug_name()))
    }

    fn set_debug_marker(&mut self, name: &str) -> Result<()> {
        self.record(format!("set_debug_marker({})", name))
    }

    fn begin_debug_event(&mut self, name: &str) -> Result<()> {
        self.record(format!("begin_debug_event({})", name))
    }

    fn end_debug_event(&mut self) -> Result<()> {
        self.record("end_debug_event".to_string())
    }
}

// ============================================================================
// Mock Device
// ============================================================================

/// Mock device: resources keep their descriptors, commands go to a `MockDispatcher`
pub struct MockDevice {
    pub capabilities: Capabilities,
    pub dispatcher: MockDispatcher,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities {
                device_name: "Mock".to_string(),
                maximum_texture_dimension: 16384,
                maximum_uniform_buffer_size: 65536,
                instanced_arrays: true,
                draw_instanced: true,
                base_vertex: true,
                vertex_shader: true,
                fragment_shader: true,
                compute_shader: true,
                ..Capabilities::default()
            },
            dispatcher: MockDispatcher::new(),
        }
    }
}

impl Device for MockDevice {
    fn name(&self) -> &str {
        "Mock"
    }

    fn is_debug_enabled(&self) -> bool {
        false
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn statistics(&self) -> DeviceStatistics {
        self.dispatcher.statistics
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>> {
        desc.validate()?;
        Ok(mock_render_pass(desc.clone()))
    }

    fn create_swap_chain(&self, render_pass: &Arc<dyn RenderPass>, window: WindowHandle) -> Result<Arc<dyn SwapChain>> {
        if window.native_window_handle == 0 {
            rhi_bail!(SOURCE, "null native window handle");
        }
        Ok(Arc::new(MockSwapChain {
            render_pass: Arc::clone(render_pass),
            size: Mutex::new((800, 600)),
            presented: Mutex::new(0),
        }))
    }

    fn create_framebuffer(
        &self,
        render_pass: &Arc<dyn RenderPass>,
        color_attachments: Vec<FramebufferAttachment>,
        depth_stencil_attachment: Option<FramebufferAttachment>,
    ) -> Result<Arc<dyn Framebuffer>> {
        let size = validate_framebuffer(render_pass.desc(), &color_attachments, depth_stencil_attachment.as_ref())?;
        Ok(Arc::new(MockFramebuffer {
            render_pass: Arc::clone(render_pass),
            color_attachments,
            depth_stencil_attachment,
            size,
        }))
    }

    fn create_buffer_manager(&self) -> Arc<dyn BufferManager> {
        Arc::new(MockBufferManager::default())
    }

    fn create_texture_manager(&self) -> Arc<dyn TextureManager> {
        Arc::new(MockTextureManager::default())
    }

    fn create_root_signature(&self, desc: RootSignatureDesc) -> Result<Arc<dyn RootSignature>> {
        mock_root_signature(desc)
    }

    fn create_graphics_pipeline_state(&self, desc: GraphicsPipelineStateDesc) -> Result<Arc<dyn GraphicsPipelineState>> {
        desc.validate()?;
        Ok(Arc::new(MockGraphicsPipelineState { desc }))
    }

    fn create_compute_pipeline_state(&self, desc: ComputePipelineStateDesc) -> Result<Arc<dyn ComputePipelineState>> {
        desc.validate()?;
        Ok(Arc::new(MockComputePipelineState { desc }))
    }

    fn create_sampler_state(&self, desc: &SamplerStateDesc) -> Result<Arc<dyn SamplerState>> {
        desc.validate()?;
        Ok(Arc::new(MockSamplerState { desc: desc.clone() }))
    }

    fn shader_language_names(&self) -> &[&'static str] {
        &[MOCK_SHADER_LANGUAGE]
    }

    fn shader_language(&self, name: Option<&str>) -> Result<Arc<dyn ShaderLanguage>> {
        match name {
            None | Some(MOCK_SHADER_LANGUAGE) => Ok(Arc::new(MockShaderLanguage)),
            Some(other) => Err(Error::Unsupported(format!("shader language '{}'", other))),
        }
    }

    fn map_buffer(&self, buffer: &Arc<dyn Buffer>, _map_type: MapType, f: &mut dyn FnMut(&mut [u8])) -> Result<()> {
        let Some(mock) = buffer.as_any().downcast_ref::<MockBuffer>() else {
            rhi_bail!(SOURCE, "buffer '{}' was not created by the mock device", buffer.debug_name());
        };
        let mut bytes = mock.data.lock().map_err(|_| Error::BackendError("poisoned".to_string()))?;
        f(bytes.as_mut_slice());
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        Ok(())
    }

    fn dispatcher(&mut self) -> &mut dyn CommandDispatcher {
        &mut self.dispatcher
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
