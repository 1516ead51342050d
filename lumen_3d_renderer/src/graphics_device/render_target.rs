/// RenderTarget trait - an offscreen surface with color and/or depth attachments

use std::sync::Arc;
use crate::error::{Error, Result};
use crate::graphics_device::{Texture, TextureFormat};

/// Descriptor for creating an offscreen render target
///
/// All attachments share the target's size. Color attachments that must be
/// read back through their mip chain (the HDR target) set `color_mip_levels`.
#[derive(Debug, Clone)]
pub struct RenderTargetDesc {
    /// Debug label (also the TargetManager name)
    pub label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// One entry per color attachment
    pub color_formats: Vec<TextureFormat>,
    /// Optional depth attachment
    pub depth_format: Option<TextureFormat>,
    /// Mip levels allocated for every color attachment (1 = none)
    pub color_mip_levels: u32,
}

impl RenderTargetDesc {
    /// Check that the attachments form a complete framebuffer
    ///
    /// Color attachments must be floating point. `TargetManager` runs this
    /// before reaching the device. An incomplete target is a fatal
    /// initialization error.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::IncompleteRenderTarget(format!(
                "'{}': zero-sized target {}x{}", self.label, self.width, self.height
            )));
        }
        if self.color_formats.is_empty() && self.depth_format.is_none() {
            return Err(Error::IncompleteRenderTarget(format!(
                "'{}': no attachments", self.label
            )));
        }
        if let Some(format) = self.color_formats.iter().find(|f| f.is_depth()) {
            return Err(Error::IncompleteRenderTarget(format!(
                "'{}': depth format {:?} used as color attachment", self.label, format
            )));
        }
        if let Some(format) = self.color_formats.iter().find(|f| !f.is_float()) {
            return Err(Error::IncompleteRenderTarget(format!(
                "'{}': color attachment {:?} is not floating point", self.label, format
            )));
        }
        if let Some(format) = self.depth_format {
            if !format.is_depth() {
                return Err(Error::IncompleteRenderTarget(format!(
                    "'{}': color format {:?} used as depth attachment", self.label, format
                )));
            }
        }
        if self.color_mip_levels == 0 {
            return Err(Error::IncompleteRenderTarget(format!(
                "'{}': color attachments need at least one mip level", self.label
            )));
        }
        Ok(())
    }
}

/// Render target trait
///
/// Offscreen destination for a render pass. The window target is not a
/// `RenderTarget`: passes address it with `None` in `begin_render_pass`.
pub trait RenderTarget: Send + Sync {
    /// Debug label
    fn label(&self) -> &str;

    /// Width in pixels
    fn width(&self) -> u32;

    /// Height in pixels
    fn height(&self) -> u32;

    /// Color attachment textures, in attachment order
    fn color_attachments(&self) -> &[Arc<dyn Texture>];

    /// Depth attachment texture, if any
    fn depth_attachment(&self) -> Option<&Arc<dyn Texture>>;

    /// First color attachment
    fn color_attachment(&self) -> Option<&Arc<dyn Texture>> {
        self.color_attachments().first()
    }
}
