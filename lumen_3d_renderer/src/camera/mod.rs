//! Camera module - camera, frustum, and render view.
//!
//! The camera is a value supplied by the caller each frame. The frustum is
//! recomputed from it once per frame and the resulting RenderView is shared
//! by every pass of that frame.

mod camera;
mod frustum;
mod render_view;

pub use camera::Camera;
pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use render_view::RenderView;
