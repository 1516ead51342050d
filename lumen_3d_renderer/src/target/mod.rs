//! Render target management module
//!
//! The master renderer's offscreen surfaces (shadow map, HDR scene, bloom
//! buffers) live here, created once and looked up by name or key.

mod target_manager;

pub use target_manager::{TargetKey, TargetManager};
