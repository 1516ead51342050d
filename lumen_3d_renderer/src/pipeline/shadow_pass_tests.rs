use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::camera::Camera;
use crate::error::Error;
use crate::graphics_device::{CullMode, GraphicsDevice, UniformValue};
use crate::graphics_device::mock_graphics_device::{
    MockBuffer, MockCommand, MockGraphicsDevice, MockTexture,
};
use crate::scene::{Attenuation, Drawable, Geometry, Material, MaterialMaps, Transform};
use crate::target::TargetManager;
use super::*;

// ============================================================================
// Helpers
// ============================================================================

fn settings() -> ShadowSettings {
    ShadowSettings {
        resolution: 2048,
        half_extent: 64.0,
        ..ShadowSettings::default()
    }
}

/// Texel size in NDC units
fn ndc_texel() -> f32 {
    2.0 / 2048.0
}

fn origin_ndc(matrix: &Mat4) -> Vec3 {
    matrix.transform_point3(Vec3::ZERO)
}

fn drawable(label: &str, maps: MaterialMaps) -> Drawable {
    let buffer = Arc::new(MockBuffer { label: label.to_string(), size: 1024 });
    Drawable::new(Geometry::new(buffer, 36, 1.0), Material::new(maps), Transform::default())
}

// ============================================================================
// Tests: light selection / direction
// ============================================================================

#[test]
fn test_select_prefers_first_directional() {
    let lights = vec![
        Light::point(Vec3::ONE, Vec3::ONE, Attenuation::NONE),
        Light::directional(Vec3::NEG_Y, Vec3::ONE),
        Light::directional(Vec3::X, Vec3::ONE),
    ];
    let (index, light) = select_shadow_light(&lights).unwrap();
    assert_eq!(index, 1);
    assert!(light.is_directional());
}

#[test]
fn test_select_falls_back_to_first_light() {
    let lights = vec![
        Light::point(Vec3::ONE, Vec3::ONE, Attenuation::NONE),
        Light::point(Vec3::ZERO, Vec3::ONE, Attenuation::NONE),
    ];
    assert_eq!(select_shadow_light(&lights).unwrap().0, 0);
    assert!(select_shadow_light(&[]).is_none());
}

#[test]
fn test_point_light_direction() {
    let light = Light::point(Vec3::new(0.0, 10.0, 0.0), Vec3::ONE, Attenuation::NONE);
    assert_eq!(light_direction(&light, Vec3::ZERO), Vec3::NEG_Y);

    let coincident = Light::point(Vec3::new(3.0, 3.0, 3.0), Vec3::ONE, Attenuation::NONE);
    assert_eq!(light_direction(&coincident, Vec3::new(3.0, 3.0, 3.0)), Vec3::NEG_Y);
}

// ============================================================================
// Tests: texel snapping
// ============================================================================

#[test]
fn test_sub_texel_motion_keeps_snapped_origin() {
    let texel = 2.0 * 64.0 / 2048.0;
    let direction = Vec3::new(0.0, 0.0, -1.0);

    let before = light_space_matrix(direction, Vec3::ZERO, &settings());
    let after = light_space_matrix(direction, Vec3::new(0.4 * texel, 0.0, 0.0), &settings());

    let delta = origin_ndc(&after) - origin_ndc(&before);
    assert!(delta.x.abs() < 1e-7, "moved by {}", delta.x);
    assert!(delta.y.abs() < 1e-7);
}

#[test]
fn test_one_texel_motion_moves_snapped_origin_one_texel() {
    let texel = 2.0 * 64.0 / 2048.0;
    let direction = Vec3::new(0.0, 0.0, -1.0);

    let before = light_space_matrix(direction, Vec3::ZERO, &settings());
    let after = light_space_matrix(direction, Vec3::new(texel, 0.0, 0.0), &settings());

    let delta = origin_ndc(&after) - origin_ndc(&before);
    assert!((delta.x.abs() - ndc_texel()).abs() < 1e-7, "moved by {}", delta.x);
    assert!(delta.y.abs() < 1e-7);
}

#[test]
fn test_snapped_origin_lies_on_texel_grid() {
    let direction = Vec3::new(0.3, -1.0, 0.2);
    let matrix = light_space_matrix(direction, Vec3::new(12.34, 5.0, -7.77), &settings());

    let origin = origin_ndc(&matrix);
    for value in [origin.x, origin.y] {
        let texels = value / ndc_texel();
        assert!((texels - texels.round()).abs() < 1e-2, "{} is off-grid", texels);
    }
}

#[test]
fn test_camera_stays_inside_light_volume() {
    let camera = Vec3::new(40.0, 2.0, -15.0);
    let matrix = light_space_matrix(Vec3::new(-0.5, -1.0, 0.25), camera, &settings());
    let ndc = matrix.transform_point3(camera);

    assert!(ndc.x.abs() < 0.01 && ndc.y.abs() < 0.01);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}

#[test]
fn test_vertical_light_uses_z_up() {
    let matrix = light_space_matrix(Vec3::NEG_Y, Vec3::ZERO, &settings());
    assert!(matrix.is_finite());
    assert!(matrix.determinant().abs() > 0.0);
}

// ============================================================================
// Tests: construction / recording
// ============================================================================

#[test]
fn test_new_creates_depth_target() {
    let mut device = MockGraphicsDevice::new();
    let mut targets = TargetManager::new();
    let pass = ShadowPass::new(&mut device, &mut targets, &settings()).unwrap();

    assert_eq!(pass.shadow_map().info().label, "shadow_map.depth");
    assert_eq!(pass.shadow_map().info().width, 2048);
    assert!(targets.render_target(SHADOW_TARGET).is_some());
}

#[test]
fn test_new_fails_on_incomplete_target() {
    let mut device = MockGraphicsDevice::new().with_incomplete_target(SHADOW_TARGET);
    let mut targets = TargetManager::new();
    let result = ShadowPass::new(&mut device, &mut targets, &settings());
    assert!(matches!(result, Err(Error::IncompleteRenderTarget(_))));
}

#[test]
fn test_new_fails_on_shader_error() {
    let mut device = MockGraphicsDevice::new().with_failing_program(shaders::SHADOW_PROGRAM);
    let mut targets = TargetManager::new();
    let result = ShadowPass::new(&mut device, &mut targets, &settings());
    assert!(matches!(result, Err(Error::ShaderCompilation(_))));
}

#[test]
fn test_compute_light_space_matrix_uses_camera_position() {
    let mut device = MockGraphicsDevice::new();
    let mut targets = TargetManager::new();
    let pass = ShadowPass::new(&mut device, &mut targets, &settings()).unwrap();

    let light = Light::directional(Vec3::new(0.0, 0.0, -1.0), Vec3::ONE);
    let camera = Camera::look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
    let expected = light_space_matrix(Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 3.0), &settings());
    assert_eq!(pass.compute_light_space_matrix(&light, &camera), expected);
}

#[test]
fn test_render_records_depth_only_draws() {
    let mut device = MockGraphicsDevice::new();
    let mut targets = TargetManager::new();
    let pass = ShadowPass::new(&mut device, &mut targets, &settings()).unwrap();

    let leaf: Arc<dyn Texture> = Arc::new(MockTexture::new("leaf", 8, 8));
    let drawables = vec![
        drawable("rock", MaterialMaps::new()),
        drawable("foliage", MaterialMaps::new().with(MapRole::Diffuse, leaf)).with_transparency(true),
        drawable("skipped", MaterialMaps::new()),
    ];

    let mut cmd = device.create_command_list().unwrap();
    cmd.begin().unwrap();
    let drawn = pass.render(&mut *cmd, &drawables, &[0, 1], &Mat4::IDENTITY).unwrap();
    cmd.end().unwrap();
    assert_eq!(drawn, 2);

    let log = MockGraphicsDevice::commands(&device.log);
    assert!(log.contains(&MockCommand::BeginRenderPass { target: Some("shadow_map".to_string()) }));
    assert!(log.contains(&MockCommand::BindProgram(shaders::SHADOW_PROGRAM.to_string())));
    assert!(log.contains(&MockCommand::SetUniform(
        "lightSpaceMatrix".to_string(),
        UniformValue::Mat4(Mat4::IDENTITY),
    )));

    // Alpha test only for the transparent caster
    assert_eq!(
        log.iter().filter(|c| matches!(c, MockCommand::BindTexture { .. })).count(),
        1,
    );
    assert!(log.contains(&MockCommand::BindTexture { unit: 0, texture: "leaf".to_string() }));
    assert!(log.contains(&MockCommand::SetCullMode(CullMode::None)));
    assert!(!log.contains(&MockCommand::BindVertexBuffer("skipped".to_string())));
    assert_eq!(
        log.iter().filter(|c| matches!(c, MockCommand::Draw { .. })).count(),
        2,
    );
    assert_eq!(log.last(), Some(&MockCommand::End));
}

#[test]
fn test_render_ignores_stale_indices() {
    let mut device = MockGraphicsDevice::new();
    let mut targets = TargetManager::new();
    let pass = ShadowPass::new(&mut device, &mut targets, &settings()).unwrap();

    let drawables = vec![drawable("rock", MaterialMaps::new())];
    let mut cmd = device.create_command_list().unwrap();
    cmd.begin().unwrap();
    assert_eq!(pass.render(&mut *cmd, &drawables, &[0, 5], &Mat4::IDENTITY).unwrap(), 1);
}
