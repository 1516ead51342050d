/// Frustum - six clipping planes for bounding-sphere visibility culling.
///
/// Each plane is a Vec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing unit normal
/// - D is the signed offset, already widened by the buffer distance
/// - A sphere (p, r) is visible if dot(normal, p) + D >= -r for all planes
///
/// Planes are recomputed every frame from the current projection and view.
/// Depth follows glam's right-handed zero-to-one convention.

use glam::{Mat4, Vec3, Vec4};

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Plane stored for a degenerate row combination: distance is always 0,
/// so every sphere passes it.
const ALWAYS_INSIDE: Vec4 = Vec4::ZERO;

/// Six frustum planes with an outward safety margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
    buffer_distance: f32,
}

impl Frustum {
    /// Frustum that contains everything until `calculate` is called.
    pub fn new(buffer_distance: f32) -> Self {
        Self {
            planes: [ALWAYS_INSIDE; 6],
            buffer_distance,
        }
    }

    /// Build a frustum directly from a combined projection * view matrix.
    pub fn from_view_projection(vp: &Mat4, buffer_distance: f32) -> Self {
        let mut frustum = Self::new(buffer_distance);
        frustum.extract(vp);
        frustum
    }

    /// Recompute the six planes from the current projection and view.
    ///
    /// Same inputs always produce bit-identical planes.
    pub fn calculate(&mut self, projection: &Mat4, view: &Mat4) {
        self.extract(&(*projection * *view));
    }

    fn extract(&mut self, vp: &Mat4) {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        let raw = [
            row3 + row0, // left
            row3 - row0, // right
            row3 + row1, // bottom
            row3 - row1, // top
            row2,        // near (zero-to-one depth)
            row3 - row2, // far
        ];

        for (plane, raw_plane) in self.planes.iter_mut().zip(raw) {
            *plane = normalize_plane(raw_plane, self.buffer_distance);
        }
    }

    /// Test a bounding sphere against the frustum.
    ///
    /// Returns false as soon as the sphere is entirely on the outer side of
    /// one plane. Conservative: never rejects a sphere that intersects the
    /// widened frustum.
    pub fn contains(&self, center: Vec3, radius: f32) -> bool {
        let radius = radius.max(0.0);
        for plane in &self.planes {
            let distance = plane.truncate().dot(center) + plane.w;
            if distance < -radius {
                return false;
            }
        }
        true
    }

    /// Test a single point against the frustum.
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.contains(point, 0.0)
    }

    /// All six planes: left, right, bottom, top, near, far
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// One plane by index (`PLANE_LEFT`..`PLANE_FAR`)
    pub fn plane(&self, index: usize) -> Vec4 {
        self.planes[index]
    }

    /// Outward margin added to every plane offset
    pub fn buffer_distance(&self) -> f32 {
        self.buffer_distance
    }

    /// Change the margin; takes effect at the next `calculate`.
    pub fn set_buffer_distance(&mut self, buffer_distance: f32) {
        self.buffer_distance = buffer_distance;
    }
}

/// Normalize a raw plane by the length of its normal and widen it.
///
/// A zero-length or non-finite normal comes from a degenerate projection;
/// such a plane is replaced by one that rejects nothing.
fn normalize_plane(plane: Vec4, buffer_distance: f32) -> Vec4 {
    let normal_len = Vec3::new(plane.x, plane.y, plane.z).length();
    if normal_len <= f32::EPSILON || !normal_len.is_finite() || !plane.w.is_finite() {
        return ALWAYS_INSIDE;
    }
    let mut normalized = plane / normal_len;
    normalized.w += buffer_distance;
    normalized
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
