/// Pipeline configuration
///
/// Plain data with defaults. `validate()` runs once when the master renderer
/// is built; an out-of-range value is a fatal initialization error.

use crate::engine_bail;
use crate::error::Result;
use super::shaders::MAX_LIGHT_CAPACITY;

const SOURCE: &str = "lumen3d::PipelineConfig";

/// Shadow pass settings
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowSettings {
    /// Render the shadow pass at all
    pub enabled: bool,
    /// Shadow map width and height in texels
    pub resolution: u32,
    /// Half-extent of the orthographic light volume (world units)
    pub half_extent: f32,
    /// Orthographic near plane, measured from the light eye
    pub near: f32,
    /// Orthographic far plane, measured from the light eye
    pub far: f32,
    /// Distance the light eye is pulled back from the camera
    pub distance: f32,
    /// Skip shadow casters outside the camera frustum
    pub cull_casters: bool,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            resolution: 2048,
            half_extent: 64.0,
            near: 0.1,
            far: 300.0,
            distance: 150.0,
            cull_casters: false,
        }
    }
}

/// Adaptive exposure settings
///
/// Scene luminance at or below `luminance_low` maps to the dark endpoints,
/// at or above `luminance_high` to the bright endpoints, linearly between.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposureSettings {
    /// Fraction of the remaining distance covered each frame
    pub smoothing: f32,
    pub luminance_low: f32,
    pub luminance_high: f32,
    pub exposure_dark: f32,
    pub exposure_bright: f32,
    pub gamma_dark: f32,
    pub gamma_bright: f32,
    /// Exposure before the first sample
    pub initial_exposure: f32,
    /// Gamma before the first sample
    pub initial_gamma: f32,
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self {
            smoothing: 0.01,
            luminance_low: 0.05,
            luminance_high: 0.5,
            exposure_dark: 1.6,
            exposure_bright: 0.6,
            gamma_dark: 2.4,
            gamma_bright: 2.0,
            initial_exposure: 1.0,
            initial_gamma: 2.2,
        }
    }
}

/// Master renderer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    /// Outward expansion of every frustum plane
    pub frustum_buffer_distance: f32,
    /// Slots in the main pass light array
    pub light_capacity: usize,
    /// Ping-pong blur passes
    pub blur_iterations: u32,
    /// Minimum luminance kept by the bright pass
    pub bloom_threshold: f32,
    /// Weight of the blurred bright image in the composite
    pub bloom_intensity: f32,
    /// Clear color of the HDR target
    pub clear_color: [f32; 4],
    pub shadow: ShadowSettings,
    pub exposure: ExposureSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 70.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            frustum_buffer_distance: 1.0,
            light_capacity: 4,
            blur_iterations: 12,
            bloom_threshold: 1.0,
            bloom_intensity: 0.5,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            shadow: ShadowSettings::default(),
            exposure: ExposureSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject values the pipeline cannot render with
    pub fn validate(&self) -> Result<()> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            engine_bail!(SOURCE, InvalidConfig,
                "fov_degrees must be in (0, 180), got {}", self.fov_degrees);
        }
        if !(self.near_plane > 0.0 && self.far_plane > self.near_plane) {
            engine_bail!(SOURCE, InvalidConfig,
                "clip planes need 0 < near < far, got near={} far={}",
                self.near_plane, self.far_plane);
        }
        if !(self.frustum_buffer_distance >= 0.0 && self.frustum_buffer_distance.is_finite()) {
            engine_bail!(SOURCE, InvalidConfig,
                "frustum_buffer_distance must be finite and >= 0, got {}",
                self.frustum_buffer_distance);
        }
        if self.light_capacity == 0 || self.light_capacity > MAX_LIGHT_CAPACITY {
            engine_bail!(SOURCE, InvalidConfig,
                "light_capacity must be in 1..={}, got {}",
                MAX_LIGHT_CAPACITY, self.light_capacity);
        }
        if self.blur_iterations == 0 {
            engine_bail!(SOURCE, InvalidConfig, "blur_iterations must be at least 1");
        }
        if !(self.bloom_threshold >= 0.0) || !(self.bloom_intensity >= 0.0) {
            engine_bail!(SOURCE, InvalidConfig,
                "bloom threshold and intensity must be >= 0, got {} and {}",
                self.bloom_threshold, self.bloom_intensity);
        }

        let shadow = &self.shadow;
        if shadow.resolution == 0 || shadow.resolution > 16384 {
            engine_bail!(SOURCE, InvalidConfig,
                "shadow resolution must be in 1..=16384, got {}", shadow.resolution);
        }
        if !(shadow.half_extent > 0.0) || !(shadow.distance > 0.0) {
            engine_bail!(SOURCE, InvalidConfig,
                "shadow half_extent and distance must be > 0, got {} and {}",
                shadow.half_extent, shadow.distance);
        }
        if !(shadow.far > shadow.near) {
            engine_bail!(SOURCE, InvalidConfig,
                "shadow near/far inverted: near={} far={}", shadow.near, shadow.far);
        }

        let exposure = &self.exposure;
        if !(exposure.smoothing > 0.0 && exposure.smoothing <= 1.0) {
            engine_bail!(SOURCE, InvalidConfig,
                "exposure smoothing must be in (0, 1], got {}", exposure.smoothing);
        }
        if !(exposure.luminance_high > exposure.luminance_low) {
            engine_bail!(SOURCE, InvalidConfig,
                "luminance band is empty: low={} high={}",
                exposure.luminance_low, exposure.luminance_high);
        }
        let positive = [
            exposure.exposure_dark, exposure.exposure_bright,
            exposure.gamma_dark, exposure.gamma_bright,
            exposure.initial_exposure, exposure.initial_gamma,
        ];
        if positive.iter().any(|value| !(*value > 0.0 && value.is_finite())) {
            engine_bail!(SOURCE, InvalidConfig,
                "exposure and gamma values must be finite and > 0: {:?}", positive);
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
