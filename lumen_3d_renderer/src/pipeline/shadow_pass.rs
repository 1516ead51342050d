/// Shadow pass - depth from the light's point of view.
///
/// The light volume is an orthographic box centered on the camera and
/// oriented along the light direction. Its translation is snapped to the
/// shadow map's texel grid so shadow edges stay put while the camera moves.

use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::camera::Camera;
use crate::error::Result;
use crate::graphics_device::{
    ClearValue, CommandList, CullMode, GraphicsDevice, RenderTarget, RenderTargetDesc,
    ShaderProgram, ShaderStage, Texture, TextureFormat, UniformValue, Viewport,
};
use crate::scene::{Drawable, Light, MapRole};
use crate::target::TargetManager;
use crate::engine_bail;
use super::config::ShadowSettings;
use super::shaders::{self, uniforms, DrawConstants};

/// Name of the depth target in the target manager
pub const SHADOW_TARGET: &str = "shadow_map";

/// |dir.y| above which +Y is too close to the view axis to serve as `up`
const UP_PARALLEL_LIMIT: f32 = 0.99;

/// First directional light, else the first light
pub fn select_shadow_light(lights: &[Light]) -> Option<(usize, &Light)> {
    lights.iter()
        .enumerate()
        .find(|(_, light)| light.is_directional())
        .or_else(|| lights.iter().enumerate().next())
}

/// Direction the shadow camera looks along
///
/// Point lights look from the light toward the camera; straight down when
/// the two coincide.
pub fn light_direction(light: &Light, camera_position: Vec3) -> Vec3 {
    match light {
        Light::Directional { direction, .. } => *direction,
        Light::Point { position, .. } => {
            (camera_position - *position).try_normalize().unwrap_or(Vec3::NEG_Y)
        }
    }
}

/// Texel-snapped orthographic light-space matrix centered on `center`
pub fn light_space_matrix(direction: Vec3, center: Vec3, settings: &ShadowSettings) -> Mat4 {
    let direction = direction.try_normalize().unwrap_or(Vec3::NEG_Y);
    let up = if direction.y.abs() > UP_PARALLEL_LIMIT { Vec3::Z } else { Vec3::Y };
    let eye = center - direction * settings.distance;
    let view = Mat4::look_at_rh(eye, center, up);

    // World origin in light view space, snapped to whole texels
    let texel_size = 2.0 * settings.half_extent / settings.resolution as f32;
    let origin = view.transform_point3(Vec3::ZERO);
    let snapped_x = (origin.x / texel_size).round() * texel_size;
    let snapped_y = (origin.y / texel_size).round() * texel_size;
    let snap = Mat4::from_translation(Vec3::new(snapped_x - origin.x, snapped_y - origin.y, 0.0));

    let h = settings.half_extent;
    let projection = Mat4::orthographic_rh(-h, h, -h, h, settings.near, settings.far);
    projection * snap * view
}

/// Depth-only pass into the shadow map
pub struct ShadowPass {
    program: Arc<dyn ShaderProgram>,
    target: Arc<dyn RenderTarget>,
    shadow_map: Arc<dyn Texture>,
    settings: ShadowSettings,
}

impl ShadowPass {
    /// Compile the depth program and create the shadow map target
    ///
    /// # Errors
    ///
    /// Shader compile/link failure or an incomplete depth target.
    pub fn new(
        device: &mut dyn GraphicsDevice,
        targets: &mut TargetManager,
        settings: &ShadowSettings,
    ) -> Result<Self> {
        let program = shaders::compile(device, &shaders::shadow_program())?;

        let key = targets.create_render_target(device, &RenderTargetDesc {
            label: SHADOW_TARGET.to_string(),
            width: settings.resolution,
            height: settings.resolution,
            color_formats: Vec::new(),
            depth_format: Some(TextureFormat::D32_FLOAT),
            color_mip_levels: 1,
        })?;
        let Some(target) = targets.get(key).cloned() else {
            engine_bail!("lumen3d::ShadowPass", IncompleteRenderTarget,
                "'{}' missing after creation", SHADOW_TARGET);
        };
        let Some(shadow_map) = target.depth_attachment().cloned() else {
            engine_bail!("lumen3d::ShadowPass", IncompleteRenderTarget,
                "'{}' has no depth attachment", SHADOW_TARGET);
        };

        Ok(Self {
            program,
            target,
            shadow_map,
            settings: settings.clone(),
        })
    }

    /// Light-space matrix for `light` around the camera
    pub fn compute_light_space_matrix(&self, light: &Light, camera: &Camera) -> Mat4 {
        let direction = light_direction(light, camera.position());
        light_space_matrix(direction, camera.position(), &self.settings)
    }

    /// Record depth-only draws of `casters` (indices into `drawables`)
    ///
    /// Transparent drawables with a diffuse map bind it for alpha testing.
    /// Returns the number of casters drawn.
    pub fn render(
        &self,
        cmd: &mut dyn CommandList,
        drawables: &[Drawable],
        casters: &[usize],
        light_space_matrix: &Mat4,
    ) -> Result<u32> {
        let resolution = self.settings.resolution;
        cmd.begin_render_pass(
            Some(&self.target),
            &[ClearValue::DepthStencil { depth: 1.0, stencil: 0 }],
        )?;
        cmd.set_viewport(Viewport::full(resolution, resolution))?;
        cmd.bind_program(&self.program)?;
        cmd.set_uniform(uniforms::LIGHT_SPACE_MATRIX, UniformValue::Mat4(*light_space_matrix))?;

        let mut drawn = 0;
        for &index in casters {
            let Some(drawable) = drawables.get(index) else {
                continue;
            };

            let alpha_map = drawable.material().maps.get(MapRole::Diffuse)
                .filter(|_| drawable.is_transparent());
            cmd.set_cull_mode(if drawable.is_transparent() { CullMode::None } else { CullMode::Back })?;
            cmd.set_uniform(uniforms::HAS_TRANSPARENCY, UniformValue::Bool(alpha_map.is_some()))?;
            if let Some(texture) = alpha_map {
                cmd.bind_texture(MapRole::Diffuse.texture_unit(), texture)?;
            }

            let constants = DrawConstants::new(drawable.transform().matrix());
            cmd.push_constants(&[ShaderStage::Vertex], 0, bytemuck::bytes_of(&constants))?;

            let geometry = drawable.geometry();
            cmd.bind_vertex_buffer(geometry.vertex_buffer(), 0)?;
            cmd.draw(geometry.vertex_count(), 0)?;
            drawn += 1;
        }

        cmd.end_render_pass()?;
        Ok(drawn)
    }

    /// Depth texture sampled by the main pass
    pub fn shadow_map(&self) -> &Arc<dyn Texture> {
        &self.shadow_map
    }

    pub fn settings(&self) -> &ShadowSettings {
        &self.settings
    }
}

#[cfg(test)]
#[path = "shadow_pass_tests.rs"]
mod tests;
