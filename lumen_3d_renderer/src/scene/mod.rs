//! Scene module - per-frame inputs of the pipeline.
//!
//! Drawables and lights are owned by the caller and borrowed for one
//! `render()` call. Nothing here is retained across frames.

mod drawable;
mod light;
mod material;

pub use drawable::{Drawable, Geometry, Transform};
pub use light::{Attenuation, Light};
pub use material::{MapFlags, MapRole, Material, MaterialMaps, Parallax};
