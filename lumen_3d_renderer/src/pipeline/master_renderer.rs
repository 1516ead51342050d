/// Master renderer - orchestrates one frame.
///
/// Owns every persistent GPU resource of the pipeline (render targets,
/// programs), the projection matrix and the window viewport. A frame runs
/// cull → shadow → main → bloom composite → present, strictly in that order,
/// and always ends on the window target.

use std::sync::{Arc, Mutex};
use glam::Mat4;
use winit::dpi::PhysicalSize;
use crate::camera::{Camera, Frustum, RenderView};
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, Viewport};
use crate::scene::{Drawable, Light};
use crate::target::TargetManager;
use crate::{engine_bail, engine_debug, engine_err, engine_info, engine_trace};
use super::bloom::{BloomCompositor, ExposureState};
use super::config::PipelineConfig;
use super::main_pass::{MainPass, ShadowBinding};
use super::shadow_pass::{select_shadow_light, ShadowPass};

const SOURCE: &str = "lumen3d::MasterRenderer";

/// Position of the renderer within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    FrustumCulled,
    ShadowRendered,
    MainRendered,
    BloomComposited,
    Presented,
}

/// What one call to `render` did
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    /// Drawables supplied by the caller
    pub submitted: usize,
    /// Drawables rejected by the frustum test
    pub culled: usize,
    /// Drawables drawn by the main pass, in draw order
    pub drawn: Vec<usize>,
    /// Every draw recorded this frame, all passes included
    pub draw_calls: u32,
    pub shadow_casters: u32,
    pub lights_uploaded: usize,
    pub lights_dropped: usize,
    /// Whether this frame's luminance sample was accepted
    pub luminance_accepted: bool,
    pub exposure: f32,
    pub gamma: f32,
}

pub struct MasterRenderer {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    config: PipelineConfig,
    targets: TargetManager,
    shadow_pass: Option<ShadowPass>,
    main_pass: MainPass,
    bloom: BloomCompositor,
    projection: Mat4,
    window_size: PhysicalSize<u32>,
    state: FrameState,
}

impl MasterRenderer {
    /// Build the whole pipeline
    ///
    /// Offscreen targets are created once at the initial window size.
    ///
    /// # Errors
    ///
    /// Invalid configuration, shader compile/link failure or an incomplete
    /// render target. Nothing is rendered with a partial pipeline.
    pub fn new(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        config: PipelineConfig,
        window_size: PhysicalSize<u32>,
    ) -> Result<Self> {
        config.validate()?;
        if window_size.width == 0 || window_size.height == 0 {
            engine_bail!(SOURCE, InvalidConfig,
                "window size must be non-zero, got {}x{}", window_size.width, window_size.height);
        }

        let mut targets = TargetManager::new();
        let (shadow_pass, main_pass, bloom) = {
            let mut guard = device.lock()
                .map_err(|_| engine_err!(SOURCE, InitializationFailed, "graphics device lock poisoned"))?;
            let device = &mut *guard;

            let shadow_pass = if config.shadow.enabled {
                Some(ShadowPass::new(device, &mut targets, &config.shadow)?)
            } else {
                None
            };
            let main_pass = MainPass::new(device, &mut targets, &config, window_size.width, window_size.height)?;
            let bloom = BloomCompositor::new(device, &mut targets, &config, Arc::clone(main_pass.hdr_color()))?;
            (shadow_pass, main_pass, bloom)
        };

        engine_info!(SOURCE, "Pipeline ready: {}x{}, {} render targets, shadows {}",
            window_size.width, window_size.height, targets.render_target_count(),
            if shadow_pass.is_some() { "on" } else { "off" });

        Ok(Self {
            projection: projection_matrix(&config, window_size),
            device,
            config,
            targets,
            shadow_pass,
            main_pass,
            bloom,
            window_size,
            state: FrameState::Idle,
        })
    }

    /// Render one frame into the window target
    ///
    /// Drawables and lights are only read. A failed frame leaves the
    /// renderer `Idle` and ready for the next one.
    pub fn render(&mut self, drawables: &[Drawable], lights: &[Light], camera: &Camera) -> Result<FrameStats> {
        let result = self.render_frame(drawables, lights, camera);
        if result.is_err() {
            self.state = FrameState::Idle;
        }
        result
    }

    fn render_frame(&mut self, drawables: &[Drawable], lights: &[Light], camera: &Camera) -> Result<FrameStats> {
        let device = Arc::clone(&self.device);
        let mut guard = device.lock()
            .map_err(|_| engine_err!(SOURCE, "graphics device lock poisoned"))?;
        let device = &mut *guard;

        // Frustum once per frame, shared by both passes
        let mut frustum = Frustum::new(self.config.frustum_buffer_distance);
        frustum.calculate(&self.projection, camera.view_matrix());
        let view = RenderView::cull(frustum, drawables);
        advance(&mut self.state, FrameState::FrustumCulled);

        let mut cmd = device.create_command_list()?;
        cmd.begin()?;

        let mut shadow_casters = 0;
        let mut shadow = None;
        if let (Some(pass), Some((light_index, light))) = (&self.shadow_pass, select_shadow_light(lights)) {
            let light_space_matrix = pass.compute_light_space_matrix(light, camera);
            let casters: Vec<usize> = if pass.settings().cull_casters {
                view.visible().to_vec()
            } else {
                (0..drawables.len()).collect()
            };
            shadow_casters = pass.render(&mut *cmd, drawables, &casters, &light_space_matrix)?;
            shadow = Some(ShadowBinding {
                shadow_map: pass.shadow_map(),
                light_space_matrix,
                light_index,
                resolution: pass.settings().resolution,
            });
            advance(&mut self.state, FrameState::ShadowRendered);
        }

        let main = self.main_pass.render(
            &mut *cmd, drawables, &view, lights, camera, &self.projection, shadow,
        )?;
        advance(&mut self.state, FrameState::MainRendered);

        cmd.end()?;
        device.submit(&[&*cmd])?;

        // The HDR image must be complete before its mips are read back
        let luminance_accepted = self.bloom.update_exposure(device)?;

        let iterations = self.config.blur_iterations;
        let mut post = device.create_command_list()?;
        post.begin()?;
        self.bloom.extract_bright(&mut *post, self.config.bloom_threshold)?;
        let blurred = self.bloom.blur(&mut *post, iterations)?;
        self.bloom.combine(&mut *post, self.window_size, self.config.bloom_intensity, &blurred)?;
        advance(&mut self.state, FrameState::BloomComposited);
        post.end()?;
        device.submit(&[&*post])?;
        advance(&mut self.state, FrameState::Presented);

        let draw_calls = shadow_casters + main.drawn.len() as u32 + 1 + iterations + 1;
        let exposure = self.bloom.exposure();
        let stats = FrameStats {
            submitted: drawables.len(),
            culled: view.culled_count(),
            drawn: main.drawn,
            draw_calls,
            shadow_casters,
            lights_uploaded: main.lights_uploaded,
            lights_dropped: main.lights_dropped,
            luminance_accepted,
            exposure: exposure.exposure(),
            gamma: exposure.gamma(),
        };

        advance(&mut self.state, FrameState::Idle);
        Ok(stats)
    }

    /// Track a window resize: projection aspect and viewport
    ///
    /// A zero-sized window (minimized) keeps the previous projection.
    /// Offscreen targets keep their creation size.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            engine_debug!(SOURCE, "Ignoring resize to {}x{}", size.width, size.height);
            return;
        }
        self.window_size = size;
        self.projection = projection_matrix(&self.config, size);
        engine_info!(SOURCE, "Resized to {}x{}", size.width, size.height);
    }

    // ===== GETTERS =====

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Viewport covering the window target
    pub fn viewport(&self) -> Viewport {
        Viewport::full(self.window_size.width, self.window_size.height)
    }

    pub fn window_size(&self) -> PhysicalSize<u32> {
        self.window_size
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn targets(&self) -> &TargetManager {
        &self.targets
    }

    pub fn exposure(&self) -> &ExposureState {
        self.bloom.exposure()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

fn advance(state: &mut FrameState, next: FrameState) {
    engine_trace!(SOURCE, "{:?} -> {:?}", state, next);
    *state = next;
}

/// Perspective projection for the window's aspect ratio
fn projection_matrix(config: &PipelineConfig, size: PhysicalSize<u32>) -> Mat4 {
    let aspect = size.width as f32 / size.height as f32;
    Mat4::perspective_rh(config.fov_degrees.to_radians(), aspect, config.near_plane, config.far_plane)
}

#[cfg(test)]
#[path = "master_renderer_tests.rs"]
mod tests;
