//! Integration tests for frustum culling through the public API
//!
//! These tests build drawables with a host-side buffer and check the
//! visible set the orchestrator would hand to its passes. No GPU required.

use std::sync::Arc;
use lumen_3d_renderer::glam::{Mat4, Vec3};
use lumen_3d_renderer::lumen3d::camera::{Camera, Frustum, RenderView};
use lumen_3d_renderer::lumen3d::render::Buffer;
use lumen_3d_renderer::lumen3d::scene::{Drawable, Geometry, Material, Transform};

struct HostBuffer;

impl Buffer for HostBuffer {
    fn label(&self) -> &str {
        "host"
    }

    fn size(&self) -> u64 {
        0
    }
}

fn sphere(position: Vec3, radius: f32) -> Drawable {
    Drawable::new(
        Geometry::new(Arc::new(HostBuffer), 36, radius),
        Material::default(),
        Transform::from_position(position),
    )
}

fn frustum(far: f32) -> Frustum {
    let camera = Camera::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, far);
    let mut frustum = Frustum::new(1.0);
    frustum.calculate(&projection, camera.view_matrix());
    frustum
}

// ============================================================================
// CULLING TESTS
// ============================================================================

#[test]
fn test_integration_origin_sphere_is_visible() {
    let drawables = vec![sphere(Vec3::ZERO, 1.0)];
    let view = RenderView::cull(frustum(10.0), &drawables);
    assert_eq!(view.visible(), &[0]);
}

#[test]
fn test_integration_sphere_past_far_plane_is_culled() {
    let drawables = vec![sphere(Vec3::new(0.0, 0.0, -100.0), 1.0)];
    let view = RenderView::cull(frustum(10.0), &drawables);
    assert!(view.visible().is_empty());
    assert_eq!(view.culled_count(), 1);
}

#[test]
fn test_integration_mixed_scene_keeps_list_order() {
    let drawables = vec![
        sphere(Vec3::new(2.0, 0.0, 0.0), 1.0),
        sphere(Vec3::new(50.0, 0.0, 0.0), 1.0),
        sphere(Vec3::new(0.0, 0.0, 10.0), 1.0),
        sphere(Vec3::new(-1.0, 1.0, -2.0), 0.5),
    ];
    let view = RenderView::cull(frustum(10.0), &drawables);
    assert_eq!(view.visible(), &[0, 3]);
}

#[test]
fn test_integration_scale_widens_culling_sphere() {
    // Just outside the right plane at radius 1, inside once scaled up
    let position = Vec3::new(8.0, 0.0, 0.0);
    let mut drawable = sphere(position, 1.0);
    assert!(!frustum(10.0).contains(position, drawable.culling_radius()));

    drawable.set_transform(Transform::new(position, Default::default(), 4.0));
    assert!(frustum(10.0).contains(position, drawable.culling_radius()));
}

#[test]
fn test_integration_calculate_is_idempotent() {
    let first = frustum(10.0);
    let second = frustum(10.0);
    assert_eq!(first.planes(), second.planes());
}
