/// Camera - view matrix and eye position supplied by the caller each frame.
///
/// Camera controls live outside the pipeline. The projection matrix is not
/// part of the camera: the master renderer owns it together with the
/// viewport, and rebuilds it on window resize.

use glam::{Mat4, Vec3};

/// Determinant below which a view matrix is treated as singular.
const SINGULAR_EPSILON: f32 = 1e-8;

/// Low-level camera: a passive value type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    view_matrix: Mat4,
    position: Vec3,
}

impl Camera {
    /// Create a camera from an explicit view matrix and eye position.
    pub fn new(view: Mat4, position: Vec3) -> Self {
        Self {
            view_matrix: view,
            position,
        }
    }

    /// Right-handed camera at `eye` looking at `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self::new(Mat4::look_at_rh(eye, target, up), eye)
    }

    /// Camera from a view matrix alone; the position is recovered from its inverse.
    ///
    /// A singular (or non-finite) view matrix cannot be inverted; the
    /// position then falls back to the world origin.
    pub fn from_view_matrix(view: Mat4) -> Self {
        Self::new(view, eye_position(&view))
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// Eye position in world space.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    // ===== SETTERS =====

    /// Set the view matrix and position together.
    pub fn set_view(&mut self, view: Mat4, position: Vec3) {
        self.view_matrix = view;
        self.position = position;
    }

    /// Move the eye and re-aim it at `target`.
    pub fn set_look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        *self = Self::look_at(eye, target, up);
    }
}

fn eye_position(view: &Mat4) -> Vec3 {
    let det = view.determinant();
    if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
        return Vec3::ZERO;
    }
    view.inverse().w_axis.truncate()
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
