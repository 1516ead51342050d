/// Main pass - lit, textured drawables into the HDR target.
///
/// Drawables are drawn in list order, restricted to the frame's RenderView.
/// There is no sorting, so transparent drawables must be supplied back to
/// front by the caller.

use std::sync::Arc;
use glam::Mat4;
use crate::camera::{Camera, RenderView};
use crate::error::Result;
use crate::graphics_device::{
    mip_chain_length, ClearValue, CommandList, CullMode, GraphicsDevice, RenderTarget,
    RenderTargetDesc, ShaderProgram, ShaderStage, Texture, TextureFormat, UniformValue, Viewport,
};
use crate::scene::{Drawable, Light, MapRole};
use crate::target::TargetManager;
use crate::{engine_bail, engine_warn};
use super::config::PipelineConfig;
use super::shaders::{self, uniforms, DrawConstants, SHADOW_MAP_UNIT};

/// Name of the HDR scene target in the target manager
pub const HDR_TARGET: &str = "hdr";

/// Shadow inputs of the main pass for one frame
#[derive(Clone)]
pub struct ShadowBinding<'a> {
    pub shadow_map: &'a Arc<dyn Texture>,
    pub light_space_matrix: Mat4,
    /// Index of the shadow-casting light in the frame's light list
    pub light_index: usize,
    pub resolution: u32,
}

/// Counters of one main pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MainPassStats {
    /// Visible drawables actually drawn, in draw order
    pub drawn: Vec<usize>,
    pub lights_uploaded: usize,
    pub lights_dropped: usize,
}

pub struct MainPass {
    program: Arc<dyn ShaderProgram>,
    target: Arc<dyn RenderTarget>,
    hdr_color: Arc<dyn Texture>,
    light_capacity: usize,
    clear_color: [f32; 4],
    /// Set once the light overflow has been reported
    overflow_reported: bool,
}

impl MainPass {
    /// Compile the main program and create the HDR target
    ///
    /// The HDR color attachment carries a full mip chain so the bloom
    /// compositor can read the scene average from its 1×1 level.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        targets: &mut TargetManager,
        config: &PipelineConfig,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let program = shaders::compile(device, &shaders::main_program())?;

        let key = targets.create_render_target(device, &RenderTargetDesc {
            label: HDR_TARGET.to_string(),
            width,
            height,
            color_formats: vec![TextureFormat::R16G16B16A16_SFLOAT],
            depth_format: Some(TextureFormat::D24_UNORM_S8_UINT),
            color_mip_levels: mip_chain_length(width, height),
        })?;
        let Some(target) = targets.get(key).cloned() else {
            engine_bail!("lumen3d::MainPass", IncompleteRenderTarget,
                "'{}' missing after creation", HDR_TARGET);
        };
        let Some(hdr_color) = target.color_attachment().cloned() else {
            engine_bail!("lumen3d::MainPass", IncompleteRenderTarget,
                "'{}' has no color attachment", HDR_TARGET);
        };

        Ok(Self {
            program,
            target,
            hdr_color,
            light_capacity: config.light_capacity,
            clear_color: config.clear_color,
            overflow_reported: false,
        })
    }

    /// Record the main pass for the drawables visible in `view`
    pub fn render(
        &mut self,
        cmd: &mut dyn CommandList,
        drawables: &[Drawable],
        view: &RenderView,
        lights: &[Light],
        camera: &Camera,
        projection: &Mat4,
        shadow: Option<ShadowBinding<'_>>,
    ) -> Result<MainPassStats> {
        cmd.begin_render_pass(
            Some(&self.target),
            &[
                ClearValue::Color(self.clear_color),
                ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
            ],
        )?;
        cmd.set_viewport(Viewport::full(self.target.width(), self.target.height()))?;
        cmd.bind_program(&self.program)?;

        cmd.set_uniform(uniforms::PROJECTION_MATRIX, UniformValue::Mat4(*projection))?;
        cmd.set_uniform(uniforms::VIEW_MATRIX, UniformValue::Mat4(*camera.view_matrix()))?;
        cmd.set_uniform(uniforms::CAMERA_POSITION, UniformValue::Vec3(camera.position()))?;

        let (lights_uploaded, lights_dropped) = self.upload_lights(cmd, lights)?;
        self.bind_shadow(cmd, shadow)?;

        let mut drawn = Vec::with_capacity(view.visible_count());
        for &index in view.visible() {
            let Some(drawable) = drawables.get(index) else {
                continue;
            };
            Self::draw(cmd, drawable)?;
            drawn.push(index);
        }

        cmd.end_render_pass()?;

        Ok(MainPassStats {
            drawn,
            lights_uploaded,
            lights_dropped,
        })
    }

    /// Upload the lights that fit; lights past capacity are dropped
    fn upload_lights(&mut self, cmd: &mut dyn CommandList, lights: &[Light]) -> Result<(usize, usize)> {
        let uploaded = lights.len().min(self.light_capacity);
        let dropped = lights.len() - uploaded;
        if dropped > 0 && !self.overflow_reported {
            engine_warn!("lumen3d::MainPass",
                "{} lights supplied, capacity is {}; ignoring the rest",
                lights.len(), self.light_capacity);
            self.overflow_reported = true;
        }

        // The shader loops over lightCount slots only
        cmd.set_uniform(uniforms::LIGHT_COUNT, UniformValue::Int(uploaded as i32))?;
        for (slot, light) in lights.iter().take(uploaded).enumerate() {
            cmd.set_uniform(
                &uniforms::indexed(uniforms::LIGHT_POSITION, slot),
                UniformValue::Vec4(light.shader_vector()),
            )?;
            cmd.set_uniform(&uniforms::indexed(uniforms::LIGHT_COLOUR, slot), UniformValue::Vec3(light.color()))?;
            cmd.set_uniform(
                &uniforms::indexed(uniforms::ATTENUATION, slot),
                UniformValue::Vec3(light.attenuation().to_vec3()),
            )?;
        }

        Ok((uploaded, dropped))
    }

    fn bind_shadow(&self, cmd: &mut dyn CommandList, shadow: Option<ShadowBinding<'_>>) -> Result<()> {
        // A shadow light that did not fit in the light array casts nothing
        let shadow = shadow.filter(|binding| binding.light_index < self.light_capacity);
        cmd.set_uniform(uniforms::HAS_SHADOW_MAP, UniformValue::Bool(shadow.is_some()))?;

        match shadow {
            Some(binding) => {
                cmd.bind_texture(SHADOW_MAP_UNIT, binding.shadow_map)?;
                cmd.set_uniform(uniforms::LIGHT_SPACE_MATRIX, UniformValue::Mat4(binding.light_space_matrix))?;
                cmd.set_uniform(uniforms::SHADOW_MAP_SIZE, UniformValue::Float(binding.resolution as f32))?;
                cmd.set_uniform(uniforms::SHADOW_LIGHT_INDEX, UniformValue::Int(binding.light_index as i32))?;
            }
            None => {
                cmd.set_uniform(uniforms::LIGHT_SPACE_MATRIX, UniformValue::Mat4(Mat4::IDENTITY))?;
                cmd.set_uniform(uniforms::SHADOW_LIGHT_INDEX, UniformValue::Int(-1))?;
            }
        }
        Ok(())
    }

    fn draw(cmd: &mut dyn CommandList, drawable: &Drawable) -> Result<()> {
        let material = drawable.material();

        for role in MapRole::ALL {
            let texture = material.maps.get(role);
            cmd.set_uniform(role.presence_uniform(), UniformValue::Bool(texture.is_some()))?;
            if let Some(texture) = texture {
                cmd.bind_texture(role.texture_unit(), texture)?;
            }
        }

        cmd.set_uniform(uniforms::SHINE_DAMPER, UniformValue::Float(material.shine_damper))?;
        cmd.set_uniform(uniforms::REFLECTIVITY, UniformValue::Float(material.reflectivity))?;
        if material.maps.has(MapRole::Height) {
            cmd.set_uniform(uniforms::PARALLAX_SCALE, UniformValue::Float(material.parallax.scale))?;
            cmd.set_uniform(uniforms::PARALLAX_LAYERS, UniformValue::Int(material.parallax.layers as i32))?;
        }

        cmd.set_cull_mode(if drawable.is_transparent() { CullMode::None } else { CullMode::Back })?;

        let constants = DrawConstants::new(drawable.transform().matrix());
        cmd.push_constants(&[ShaderStage::Vertex], 0, bytemuck::bytes_of(&constants))?;

        let geometry = drawable.geometry();
        cmd.bind_vertex_buffer(geometry.vertex_buffer(), 0)?;
        cmd.draw(geometry.vertex_count(), 0)
    }

    /// HDR color attachment (full mip chain)
    pub fn hdr_color(&self) -> &Arc<dyn Texture> {
        &self.hdr_color
    }

    pub fn target(&self) -> &Arc<dyn RenderTarget> {
        &self.target
    }

    pub fn light_capacity(&self) -> usize {
        self.light_capacity
    }
}

#[cfg(test)]
#[path = "main_pass_tests.rs"]
mod tests;
