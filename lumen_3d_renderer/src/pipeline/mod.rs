//! Rendering pipeline module
//!
//! One frame is cull → shadow → main → bloom composite → present. The
//! `MasterRenderer` owns every pass and runs them in that order; the passes
//! are public so each can be driven and tested on its own.

mod config;
mod shadow_pass;
mod main_pass;
mod bloom;
mod master_renderer;
pub mod shaders;
#[cfg(test)]
pub(crate) mod shader_reflection;

pub use config::{ExposureSettings, PipelineConfig, ShadowSettings};
pub use shadow_pass::{
    light_direction, light_space_matrix, select_shadow_light, ShadowPass, SHADOW_TARGET,
};
pub use main_pass::{MainPass, MainPassStats, ShadowBinding, HDR_TARGET};
pub use bloom::{
    bright_pass, is_valid_sample, luminance, smooth_toward, tone_map, BloomCompositor,
    ExposureState, BRIGHT_TARGET, PING_TARGET, PONG_TARGET,
};
pub use master_renderer::{FrameState, FrameStats, MasterRenderer};
