/// GraphicsDevice trait - the factory and submission interface of a backend

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    CommandList, RenderTarget, RenderTargetDesc, ShaderProgram, ShaderProgramDesc, Texture,
};

/// Main graphics device trait
///
/// Implemented by the backend owned by the windowing layer. All calls
/// happen on the thread that owns the graphics context.
pub trait GraphicsDevice: Send + Sync {
    /// Create an offscreen render target
    ///
    /// # Errors
    ///
    /// `Error::IncompleteRenderTarget` if the attachments do not form a
    /// complete framebuffer.
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<Arc<dyn RenderTarget>>;

    /// Compile and link a shader program
    ///
    /// # Errors
    ///
    /// `Error::ShaderCompilation` on compile or link failure.
    fn create_shader_program(&mut self, desc: &ShaderProgramDesc) -> Result<Arc<dyn ShaderProgram>>;

    /// Create a command list
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Submit recorded command lists in order
    fn submit(&self, commands: &[&dyn CommandList]) -> Result<()>;

    /// Regenerate the mip chain of a texture from its level 0
    ///
    /// Allocates the chain first if the texture was created without one.
    fn generate_mipmaps(&mut self, texture: &Arc<dyn Texture>) -> Result<()>;

    /// Read back a single RGBA texel
    ///
    /// Stalls until prior submissions writing the texture have completed.
    fn read_texel(
        &mut self,
        texture: &Arc<dyn Texture>,
        mip_level: u32,
        x: u32,
        y: u32,
    ) -> Result<[f32; 4]>;
}
