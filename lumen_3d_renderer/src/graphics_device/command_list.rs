/// CommandList trait - for recording rendering commands

use std::sync::Arc;
use glam::{Mat4, Vec3, Vec4};
use crate::error::Result;
use crate::graphics_device::{Buffer, RenderTarget, ShaderProgram, ShaderStage, Texture};

/// Command list for recording rendering commands
///
/// Commands are recorded and later submitted via `GraphicsDevice::submit()`.
/// Uniform and texture state applies to the currently bound program.
pub trait CommandList: Send + Sync {
    /// Begin recording commands
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Begin a render pass
    ///
    /// # Arguments
    ///
    /// * `target` - Offscreen target, or `None` for the window target
    /// * `clear_values` - Clear values, one per attachment
    fn begin_render_pass(
        &mut self,
        target: Option<&Arc<dyn RenderTarget>>,
        clear_values: &[ClearValue],
    ) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Set face culling
    fn set_cull_mode(&mut self, mode: CullMode) -> Result<()>;

    /// Bind a linked shader program
    fn bind_program(&mut self, program: &Arc<dyn ShaderProgram>) -> Result<()>;

    /// Set a member of the bound program's uniform block (set 0, binding 0)
    ///
    /// Array elements are addressed as `name[index]`.
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()>;

    /// Bind a texture to a texture unit
    ///
    /// Unit `n` is the `texture2D` at set 2, binding `n`, sampled through
    /// the shared sampler at set 1, binding 0.
    fn bind_texture(&mut self, unit: u32, texture: &Arc<dyn Texture>) -> Result<()>;

    /// Push constants to the bound program
    ///
    /// # Arguments
    ///
    /// * `stages` - Shader stages that read the push constants
    /// * `offset` - Offset in bytes into the push constant range
    /// * `data` - Data to push
    fn push_constants(&mut self, stages: &[ShaderStage], offset: u32, data: &[u8]) -> Result<()>;

    /// Bind a vertex buffer
    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()>;

    /// Draw vertices
    ///
    /// A draw with no vertex buffer bound is a full-screen triangle whose
    /// positions come from the vertex index.
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-surface viewport with the [0, 1] depth range
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// Draw both faces
    None,
    /// Cull back faces
    Back,
}

/// Value for a named uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}
