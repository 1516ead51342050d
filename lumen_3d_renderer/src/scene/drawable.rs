/// Drawable - one renderable object as supplied by the caller each frame.
///
/// A drawable pairs a geometry handle with a material, a world transform and
/// a transparency flag. The pipeline only borrows drawables for the duration
/// of one `render()` call.

use std::fmt;
use std::sync::Arc;
use glam::{Mat4, Quat, Vec3};
use crate::graphics_device::Buffer;
use super::material::Material;

// ===== GEOMETRY =====

/// GPU geometry handle: a non-indexed vertex buffer and its bounds
#[derive(Clone)]
pub struct Geometry {
    vertex_buffer: Arc<dyn Buffer>,
    vertex_count: u32,
    bounding_radius: f32,
}

impl Geometry {
    /// `bounding_radius` must enclose every vertex, measured from the local origin.
    pub fn new(vertex_buffer: Arc<dyn Buffer>, vertex_count: u32, bounding_radius: f32) -> Self {
        Self {
            vertex_buffer,
            vertex_count,
            bounding_radius: bounding_radius.abs(),
        }
    }

    pub fn vertex_buffer(&self) -> &Arc<dyn Buffer> {
        &self.vertex_buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }
}

impl fmt::Debug for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geometry")
            .field("vertex_buffer", &self.vertex_buffer.label())
            .field("vertex_count", &self.vertex_count)
            .field("bounding_radius", &self.bounding_radius)
            .finish()
    }
}

// ===== TRANSFORM =====

/// World placement with uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: f32,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat, scale: f32) -> Self {
        Self { position, rotation, scale }
    }

    /// Unrotated, unit-scale transform at `position`
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY, 1.0)
    }

    // ===== GETTERS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Model matrix (scale, then rotation, then translation)
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }

    // ===== SETTERS =====

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Move by `offset` in world space
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_position(Vec3::ZERO)
    }
}

// ===== DRAWABLE =====

/// Renderable object: geometry, material, transform and transparency
#[derive(Debug, Clone)]
pub struct Drawable {
    geometry: Geometry,
    material: Material,
    transform: Transform,
    transparent: bool,
}

impl Drawable {
    /// Opaque drawable
    pub fn new(geometry: Geometry, material: Material, transform: Transform) -> Self {
        Self {
            geometry,
            material,
            transform,
            transparent: false,
        }
    }

    /// Builder: mark as transparent (rendered without back-face culling)
    pub fn with_transparency(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    // ===== GETTERS =====

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// World-space radius of the bounding sphere
    pub fn culling_radius(&self) -> f32 {
        self.geometry.bounding_radius * self.transform.scale.abs()
    }

    // ===== SETTERS =====

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    pub fn set_transparent(&mut self, transparent: bool) {
        self.transparent = transparent;
    }
}

#[cfg(test)]
#[path = "drawable_tests.rs"]
mod tests;
