/// Texture trait, texture descriptor, and texture info

/// Texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    // Color formats
    R8G8B8A8_UNORM,
    R8G8B8A8_SRGB,
    /// Half-float HDR color (values above 1.0 preserved)
    R16G16B16A16_SFLOAT,
    /// Full-float HDR color
    R32G32B32A32_SFLOAT,

    // Depth formats
    D16_UNORM,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    /// Whether this is a depth (or depth/stencil) format
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::D16_UNORM | TextureFormat::D32_FLOAT | TextureFormat::D24_UNORM_S8_UINT
        )
    }

    /// Whether this color format stores values outside [0, 1]
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            TextureFormat::R16G16B16A16_SFLOAT | TextureFormat::R32G32B32A32_SFLOAT
        )
    }
}

/// Texture usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as a color attachment and sampled afterwards
    SampledAndRenderTarget,
    /// Texture can be used as depth attachment and sampled afterwards
    DepthStencil,
}

/// Read-only properties of a created texture
#[derive(Debug, Clone)]
pub struct TextureInfo {
    /// Debug label
    pub label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage
    pub usage: TextureUsage,
    /// Number of mip levels
    pub mip_levels: u32,
}

impl TextureInfo {
    /// Whether the full mip chain down to 1x1 is allocated
    pub fn has_full_mip_chain(&self) -> bool {
        self.mip_levels >= mip_chain_length(self.width, self.height)
    }
}

/// Index of the deepest mip level (the 1x1 texel) of a `width` x `height` image
///
/// `floor(log2(max(width, height)))`. A zero-sized image is treated as 1x1.
pub fn deepest_mip_level(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    31 - largest.leading_zeros()
}

/// Number of mip levels in a full chain for a `width` x `height` image
pub fn mip_chain_length(width: u32, height: u32) -> u32 {
    deepest_mip_level(width, height) + 1
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types.
/// The texture is destroyed when the last reference is dropped.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}
