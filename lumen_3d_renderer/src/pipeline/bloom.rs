/// Bloom compositor - bright pass, ping-pong blur, tone-mapped composite.
///
/// The compositor also owns the adaptive exposure state. Each frame it reads
/// the deepest mip of the HDR target (the scene average), converts it to
/// luminance and eases exposure and gamma toward the values that luminance
/// calls for.

use std::sync::Arc;
use glam::Vec3;
use winit::dpi::PhysicalSize;
use crate::error::Result;
use crate::graphics_device::{
    deepest_mip_level, ClearValue, CommandList, CullMode, GraphicsDevice, RenderTarget,
    RenderTargetDesc, ShaderProgram, Texture, TextureFormat, UniformValue, Viewport,
};
use crate::target::TargetManager;
use crate::{engine_bail, engine_trace};
use super::config::{ExposureSettings, PipelineConfig};
use super::shaders::{self, uniforms};

pub const BRIGHT_TARGET: &str = "bright";
pub const PING_TARGET: &str = "bloom_ping";
pub const PONG_TARGET: &str = "bloom_pong";

/// Vertices of the fullscreen triangle
const FULLSCREEN_VERTICES: u32 = 3;

// ===== CPU REFERENCE MATH =====

/// Rec. 709 relative luminance
pub fn luminance(rgb: Vec3) -> f32 {
    0.2126 * rgb.x + 0.7152 * rgb.y + 0.0722 * rgb.z
}

/// Bright pass of one texel: unchanged at or above `threshold`, black below
pub fn bright_pass(rgb: Vec3, threshold: f32) -> Vec3 {
    if luminance(rgb) >= threshold {
        rgb
    } else {
        Vec3::ZERO
    }
}

/// Exponential tone map followed by gamma correction
pub fn tone_map(hdr: Vec3, exposure: f32, gamma: f32) -> Vec3 {
    Vec3::from_array(hdr.to_array().map(|c| (1.0 - (-c * exposure).exp()).powf(1.0 / gamma)))
}

/// A read-back texel is usable when every color channel is finite and in (0, 1)
pub fn is_valid_sample(texel: [f32; 4]) -> bool {
    texel[..3].iter().all(|c| c.is_finite() && *c > 0.0 && *c < 1.0)
}

/// One smoothing step; never passes `target`
pub fn smooth_toward(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor.clamp(0.0, 1.0)
}

// ===== EXPOSURE STATE =====

/// Persistent exposure and gamma, smoothed across frames
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureState {
    exposure: f32,
    gamma: f32,
    /// Last accepted scene luminance
    average_luminance: f32,
    settings: ExposureSettings,
}

impl ExposureState {
    pub fn new(settings: ExposureSettings) -> Self {
        Self {
            exposure: settings.initial_exposure,
            gamma: settings.initial_gamma,
            average_luminance: 0.5 * (settings.luminance_low + settings.luminance_high),
            settings,
        }
    }

    /// Feed one read-back texel and advance one frame
    ///
    /// A rejected sample keeps the previous average; smoothing still runs.
    /// Returns whether the sample was accepted.
    pub fn update(&mut self, texel: [f32; 4]) -> bool {
        let accepted = is_valid_sample(texel);
        if accepted {
            self.average_luminance = luminance(Vec3::new(texel[0], texel[1], texel[2]));
        }
        self.step();
        accepted
    }

    /// Move current exposure and gamma toward the targets by the smoothing factor
    pub fn step(&mut self) {
        let (exposure, gamma) = self.targets();
        self.exposure = smooth_toward(self.exposure, exposure, self.settings.smoothing);
        self.gamma = smooth_toward(self.gamma, gamma, self.settings.smoothing);
    }

    /// Target exposure and gamma for the current average luminance
    ///
    /// An empty or inverted luminance band becomes a step at `luminance_low`.
    pub fn targets(&self) -> (f32, f32) {
        let s = &self.settings;
        let band = s.luminance_high - s.luminance_low;
        let t = if band > 0.0 && band.is_finite() {
            ((self.average_luminance - s.luminance_low) / band).clamp(0.0, 1.0)
        } else if self.average_luminance >= s.luminance_low {
            1.0
        } else {
            0.0
        };
        (
            s.exposure_dark + (s.exposure_bright - s.exposure_dark) * t,
            s.gamma_dark + (s.gamma_bright - s.gamma_dark) * t,
        )
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    pub fn average_luminance(&self) -> f32 {
        self.average_luminance
    }
}

// ===== COMPOSITOR =====

pub struct BloomCompositor {
    bright_program: Arc<dyn ShaderProgram>,
    blur_program: Arc<dyn ShaderProgram>,
    combine_program: Arc<dyn ShaderProgram>,
    bright: Arc<dyn RenderTarget>,
    ping: Arc<dyn RenderTarget>,
    pong: Arc<dyn RenderTarget>,
    hdr_color: Arc<dyn Texture>,
    exposure: ExposureState,
}

impl BloomCompositor {
    /// Compile the post-process programs and create the bright and ping-pong targets
    pub fn new(
        device: &mut dyn GraphicsDevice,
        targets: &mut TargetManager,
        config: &PipelineConfig,
        hdr_color: Arc<dyn Texture>,
    ) -> Result<Self> {
        let bright_program = shaders::compile(device, &shaders::bright_program())?;
        let blur_program = shaders::compile(device, &shaders::blur_program())?;
        let combine_program = shaders::compile(device, &shaders::combine_program())?;

        let (width, height) = (hdr_color.info().width, hdr_color.info().height);
        let bright = Self::create_target(device, targets, BRIGHT_TARGET, width, height)?;
        let ping = Self::create_target(device, targets, PING_TARGET, width, height)?;
        let pong = Self::create_target(device, targets, PONG_TARGET, width, height)?;

        Ok(Self {
            bright_program,
            blur_program,
            combine_program,
            bright,
            ping,
            pong,
            hdr_color,
            exposure: ExposureState::new(config.exposure.clone()),
        })
    }

    fn create_target(
        device: &mut dyn GraphicsDevice,
        targets: &mut TargetManager,
        name: &str,
        width: u32,
        height: u32,
    ) -> Result<Arc<dyn RenderTarget>> {
        let key = targets.create_render_target(device, &RenderTargetDesc {
            label: name.to_string(),
            width,
            height,
            color_formats: vec![TextureFormat::R16G16B16A16_SFLOAT],
            depth_format: None,
            color_mip_levels: 1,
        })?;
        match targets.get(key) {
            Some(target) if target.color_attachment().is_some() => Ok(Arc::clone(target)),
            _ => engine_bail!("lumen3d::BloomCompositor", IncompleteRenderTarget,
                "'{}' has no color attachment", name),
        }
    }

    /// Keep HDR texels whose luminance reaches `threshold`
    pub fn extract_bright(&self, cmd: &mut dyn CommandList, threshold: f32) -> Result<()> {
        Self::begin_fullscreen(cmd, &self.bright, &self.bright_program)?;
        Self::bind_source(cmd, &self.hdr_color)?;
        cmd.set_uniform(uniforms::THRESHOLD, UniformValue::Float(threshold))?;
        cmd.draw(FULLSCREEN_VERTICES, 0)?;
        cmd.end_render_pass()
    }

    /// Separable blur over the ping-pong targets
    ///
    /// Even iterations blur horizontally into ping, odd ones vertically into
    /// pong. The first reads the bright target, every later one the previous
    /// output. Returns the texture written last.
    pub fn blur(&self, cmd: &mut dyn CommandList, iterations: u32) -> Result<Arc<dyn Texture>> {
        let mut source = self.color_of(&self.bright)?;
        for iteration in 0..iterations {
            let horizontal = iteration % 2 == 0;
            let destination = if horizontal { &self.ping } else { &self.pong };

            Self::begin_fullscreen(cmd, destination, &self.blur_program)?;
            Self::bind_source(cmd, &source)?;
            cmd.set_uniform(uniforms::HORIZONTAL, UniformValue::Bool(horizontal))?;
            cmd.draw(FULLSCREEN_VERTICES, 0)?;
            cmd.end_render_pass()?;

            source = self.color_of(destination)?;
        }
        engine_trace!("lumen3d::BloomCompositor", "Blur: {} iterations", iterations);
        Ok(source)
    }

    /// Read the scene average from the deepest HDR mip and update exposure
    ///
    /// Must run after the main pass has been submitted. Returns whether the
    /// sample was accepted.
    pub fn update_exposure(&mut self, device: &mut dyn GraphicsDevice) -> Result<bool> {
        device.generate_mipmaps(&self.hdr_color)?;
        let info = self.hdr_color.info();
        let level = deepest_mip_level(info.width, info.height);
        let texel = device.read_texel(&self.hdr_color, level, 0, 0)?;

        let accepted = self.exposure.update(texel);
        if !accepted {
            engine_trace!("lumen3d::BloomCompositor",
                "Rejected luminance sample {:?}, keeping {}", texel, self.exposure.average_luminance());
        }
        Ok(accepted)
    }

    /// Tone-map the HDR image and add the blurred bloom into the window target
    pub fn combine(
        &self,
        cmd: &mut dyn CommandList,
        window_size: PhysicalSize<u32>,
        bloom_intensity: f32,
        blurred: &Arc<dyn Texture>,
    ) -> Result<()> {
        cmd.begin_render_pass(None, &[ClearValue::Color([0.0, 0.0, 0.0, 1.0])])?;
        cmd.set_viewport(Viewport::full(window_size.width, window_size.height))?;
        cmd.set_cull_mode(CullMode::None)?;
        cmd.bind_program(&self.combine_program)?;

        Self::bind_source(cmd, &self.hdr_color)?;
        cmd.bind_texture(shaders::BLOOM_TEXTURE_UNIT, blurred)?;
        cmd.set_uniform(uniforms::EXPOSURE, UniformValue::Float(self.exposure.exposure()))?;
        cmd.set_uniform(uniforms::GAMMA, UniformValue::Float(self.exposure.gamma()))?;
        cmd.set_uniform(uniforms::BLOOM_INTENSITY, UniformValue::Float(bloom_intensity))?;
        cmd.draw(FULLSCREEN_VERTICES, 0)?;
        cmd.end_render_pass()
    }

    pub fn exposure(&self) -> &ExposureState {
        &self.exposure
    }

    fn begin_fullscreen(
        cmd: &mut dyn CommandList,
        target: &Arc<dyn RenderTarget>,
        program: &Arc<dyn ShaderProgram>,
    ) -> Result<()> {
        cmd.begin_render_pass(Some(target), &[ClearValue::Color([0.0, 0.0, 0.0, 1.0])])?;
        cmd.set_viewport(Viewport::full(target.width(), target.height()))?;
        cmd.set_cull_mode(CullMode::None)?;
        cmd.bind_program(program)
    }

    fn bind_source(cmd: &mut dyn CommandList, texture: &Arc<dyn Texture>) -> Result<()> {
        cmd.bind_texture(shaders::SOURCE_TEXTURE_UNIT, texture)
    }

    fn color_of(&self, target: &Arc<dyn RenderTarget>) -> Result<Arc<dyn Texture>> {
        match target.color_attachment() {
            Some(texture) => Ok(Arc::clone(texture)),
            None => engine_bail!("lumen3d::BloomCompositor", InvalidResource,
                "'{}' lost its color attachment", target.label()),
        }
    }
}

#[cfg(test)]
#[path = "bloom_tests.rs"]
mod tests;
