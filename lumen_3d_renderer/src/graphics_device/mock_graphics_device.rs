/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Every recorded command, submission, mip generation and read-back is
/// appended to a shared log so tests can assert on the exact GPU command
/// stream the pipeline produces.

use std::sync::{Arc, Mutex};
use rustc_hash::FxHashSet;
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, Buffer, CommandList, RenderTarget, RenderTargetDesc, ShaderProgram,
    ShaderProgramDesc, ShaderStage, Texture, TextureFormat, TextureInfo, TextureUsage,
    ClearValue, CullMode, UniformValue, Viewport,
};

// ============================================================================
// Recorded commands
// ============================================================================

/// One entry of the mock device's command log
#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    Begin,
    End,
    /// `None` is the window target
    BeginRenderPass { target: Option<String> },
    EndRenderPass,
    SetViewport(Viewport),
    SetCullMode(CullMode),
    BindProgram(String),
    SetUniform(String, UniformValue),
    BindTexture { unit: u32, texture: String },
    PushConstants { offset: u32, size: usize },
    BindVertexBuffer(String),
    Draw { vertex_count: u32, first_vertex: u32 },
    Submit { lists: usize },
    GenerateMipmaps(String),
    ReadTexel { texture: String, mip_level: u32 },
}

/// Shared command log
pub type CommandLog = Arc<Mutex<Vec<MockCommand>>>;

// ============================================================================
// Mock resources
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub label: String,
    pub size: u64,
}

impl Buffer for MockBuffer {
    fn label(&self) -> &str {
        &self.label
    }

    fn size(&self) -> u64 {
        self.size
    }
}

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
}

impl MockTexture {
    pub fn new(label: &str, width: u32, height: u32) -> Self {
        Self {
            info: TextureInfo {
                label: label.to_string(),
                width,
                height,
                format: TextureFormat::R8G8B8A8_UNORM,
                usage: TextureUsage::Sampled,
                mip_levels: 1,
            },
        }
    }
}

impl Texture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

pub struct MockRenderTarget {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub colors: Vec<Arc<dyn Texture>>,
    pub depth: Option<Arc<dyn Texture>>,
}

impl RenderTarget for MockRenderTarget {
    fn label(&self) -> &str {
        &self.label
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn color_attachments(&self) -> &[Arc<dyn Texture>] {
        &self.colors
    }

    fn depth_attachment(&self) -> Option<&Arc<dyn Texture>> {
        self.depth.as_ref()
    }
}

#[derive(Debug)]
pub struct MockShaderProgram {
    pub name: String,
}

impl ShaderProgram for MockShaderProgram {
    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Mock CommandList
// ============================================================================

/// Command list writing straight into the device's shared log
pub struct MockCommandList {
    log: CommandLog,
    recording: bool,
}

impl MockCommandList {
    fn push(&self, command: MockCommand) {
        self.log.lock().unwrap().push(command);
    }

    fn check_recording(&self) -> Result<()> {
        if !self.recording {
            return Err(Error::BackendError("command list is not recording".to_string()));
        }
        Ok(())
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        self.recording = true;
        self.push(MockCommand::Begin);
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.check_recording()?;
        self.recording = false;
        self.push(MockCommand::End);
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        target: Option<&Arc<dyn RenderTarget>>,
        _clear_values: &[ClearValue],
    ) -> Result<()> {
        self.check_recording()?;
        self.push(MockCommand::BeginRenderPass {
            target: target.map(|t| t.label().to_string()),
        });
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.check_recording()?;
        self.push(MockCommand::EndRenderPass);
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.check_recording()?;
        self.push(MockCommand::SetViewport(viewport));
        Ok(())
    }

    fn set_cull_mode(&mut self, mode: CullMode) -> Result<()> {
        self.check_recording()?;
        self.push(MockCommand::SetCullMode(mode));
        Ok(())
    }

    fn bind_program(&mut self, program: &Arc<dyn ShaderProgram>) -> Result<()> {
        self.check_recording()?;
        self.push(MockCommand::BindProgram(program.name().to_string()));
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()> {
        self.check_recording()?;
        self.push(MockCommand::SetUniform(name.to_string(), value));
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, texture: &Arc<dyn Texture>) -> Result<()> {
        self.check_recording()?;
        self.push(MockCommand::BindTexture { unit, texture: texture.info().label.clone() });
        Ok(())
    }

    fn push_constants(&mut self, _stages: &[ShaderStage], offset: u32, data: &[u8]) -> Result<()> {
        self.check_recording()?;
        self.push(MockCommand::PushConstants { offset, size: data.len() });
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, _offset: u64) -> Result<()> {
        self.check_recording()?;
        self.push(MockCommand::BindVertexBuffer(buffer.label().to_string()));
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.check_recording()?;
        self.push(MockCommand::Draw { vertex_count, first_vertex });
        Ok(())
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock device that records everything without a GPU
pub struct MockGraphicsDevice {
    /// Shared command log
    pub log: CommandLog,
    /// Value returned by every texel read-back
    pub texel: Arc<Mutex<[f32; 4]>>,
    /// Textures whose mip chain has been generated
    mipmapped: FxHashSet<String>,
    /// Program name whose compilation fails
    failing_program: Option<String>,
    /// Render target label reported as incomplete
    incomplete_target: Option<String>,
    /// Whether render target descriptors are validated before allocation
    validates_targets: bool,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            texel: Arc::new(Mutex::new([0.5, 0.5, 0.5, 1.0])),
            mipmapped: FxHashSet::default(),
            failing_program: None,
            incomplete_target: None,
            validates_targets: true,
        }
    }

    /// Make compilation of the named program fail
    pub fn with_failing_program(mut self, name: &str) -> Self {
        self.failing_program = Some(name.to_string());
        self
    }

    /// Make creation of the labelled render target report incompleteness
    pub fn with_incomplete_target(mut self, label: &str) -> Self {
        self.incomplete_target = Some(label.to_string());
        self
    }

    /// Accept any render target descriptor, like a backend that never validates
    pub fn without_target_validation(mut self) -> Self {
        self.validates_targets = false;
        self
    }

    /// Snapshot of the command log
    pub fn commands(log: &CommandLog) -> Vec<MockCommand> {
        log.lock().unwrap().clone()
    }

    fn record(&self, command: MockCommand) {
        self.log.lock().unwrap().push(command);
    }

    fn make_attachment(desc: &RenderTargetDesc, label: String, format: TextureFormat) -> Arc<dyn Texture> {
        let (usage, mip_levels) = if format.is_depth() {
            (TextureUsage::DepthStencil, 1)
        } else {
            (TextureUsage::SampledAndRenderTarget, desc.color_mip_levels)
        };
        Arc::new(MockTexture {
            info: TextureInfo {
                label,
                width: desc.width,
                height: desc.height,
                format,
                usage,
                mip_levels,
            },
        })
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<Arc<dyn RenderTarget>> {
        if self.validates_targets {
            desc.validate()?;
        }
        if self.incomplete_target.as_deref() == Some(desc.label.as_str()) {
            return Err(Error::IncompleteRenderTarget(format!(
                "'{}': attachment size mismatch", desc.label
            )));
        }

        let colors = desc.color_formats.iter().enumerate()
            .map(|(i, format)| Self::make_attachment(desc, format!("{}.color{}", desc.label, i), *format))
            .collect();
        let depth = desc.depth_format
            .map(|format| Self::make_attachment(desc, format!("{}.depth", desc.label), format));

        Ok(Arc::new(MockRenderTarget {
            label: desc.label.clone(),
            width: desc.width,
            height: desc.height,
            colors,
            depth,
        }))
    }

    fn create_shader_program(&mut self, desc: &ShaderProgramDesc) -> Result<Arc<dyn ShaderProgram>> {
        desc.validate()?;
        if self.failing_program.as_deref() == Some(desc.name.as_str()) {
            return Err(Error::ShaderCompilation(format!("{}: link failed", desc.name)));
        }
        Ok(Arc::new(MockShaderProgram { name: desc.name.clone() }))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(MockCommandList { log: Arc::clone(&self.log), recording: false }))
    }

    fn submit(&self, commands: &[&dyn CommandList]) -> Result<()> {
        self.record(MockCommand::Submit { lists: commands.len() });
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture>) -> Result<()> {
        let label = texture.info().label.clone();
        self.record(MockCommand::GenerateMipmaps(label.clone()));
        self.mipmapped.insert(label);
        Ok(())
    }

    fn read_texel(
        &mut self,
        texture: &Arc<dyn Texture>,
        mip_level: u32,
        x: u32,
        y: u32,
    ) -> Result<[f32; 4]> {
        let info = texture.info();
        let level_width = (info.width >> mip_level).max(1);
        let level_height = (info.height >> mip_level).max(1);
        if x >= level_width || y >= level_height {
            return Err(Error::InvalidResource(format!(
                "{}: texel ({}, {}) outside mip {} ({}x{})",
                info.label, x, y, mip_level, level_width, level_height
            )));
        }
        if mip_level > 0 && !self.mipmapped.contains(&info.label) {
            return Err(Error::BackendError(format!(
                "{}: mip {} read before mip generation", info.label, mip_level
            )));
        }
        self.record(MockCommand::ReadTexel { texture: info.label.clone(), mip_level });
        Ok(*self.texel.lock().unwrap())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
