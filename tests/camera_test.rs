use std::f32::consts::FRAC_PI_2;

use cgmath::{Deg, Matrix4, Point3, SquareMatrix, Transform, Vector3, Vector4};
use obj_viewer::{
    camera::{FrameUniform, OrbitCamera, Projection, world_matrix},
    config::LightConfig,
    controls::DragRotation,
    data_structures::model::{MaterialUniform, ModelVertex, Vertex},
};

fn assert_point(actual: Point3<f32>, expected: Point3<f32>) {
    let d = actual - expected;
    assert!(
        d.x.abs() < 1e-5 && d.y.abs() < 1e-5 && d.z.abs() < 1e-5,
        "{actual:?} vs {expected:?}"
    );
}

#[test]
fn should_place_camera_radius_in_front_of_target() {
    let camera = OrbitCamera::new(Point3::new(0.0, 0.0, 0.05), 2.0);
    assert_point(camera.position(), Point3::new(0.0, 0.0, 2.05));

    // the target ends up straight ahead on the view axis
    let target_in_view = camera.view_matrix().transform_point(camera.target);
    assert_point(target_in_view, Point3::new(0.0, 0.0, -2.0));
}

#[test]
fn should_only_translate_without_rotation() {
    let mut drag = DragRotation::default();
    drag.pause();
    let offset = Vector3::new(-1.0, -2.0, -3.0);

    let world = world_matrix(&drag, 123.0, offset);

    assert_eq!(world, Matrix4::from_translation(offset));
}

#[test]
fn should_add_elapsed_time_to_spin_while_running() {
    let drag = DragRotation::default();
    let world = world_matrix(&drag, FRAC_PI_2, Vector3::new(0.0, 0.0, 0.0));

    assert_point(
        world.transform_point(Point3::new(1.0, 0.0, 0.0)),
        Point3::new(0.0, 0.0, -1.0),
    );
}

#[test]
fn should_freeze_spin_while_paused() {
    let mut drag = DragRotation::default();
    drag.pause();

    let early = world_matrix(&drag, 1.0, Vector3::new(0.0, 0.0, 0.0));
    let late = world_matrix(&drag, 50.0, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(early, late);
    assert_eq!(early, Matrix4::identity());
}

#[test]
fn should_rotate_x_before_y() {
    let mut drag = DragRotation::default();
    drag.pause();
    drag.press(0.0, 0.0);
    // quarter turn about X, then quarter turn about Y
    drag.motion(FRAC_PI_2 as f64 * 100.0, FRAC_PI_2 as f64 * 100.0);

    let world = world_matrix(&drag, 0.0, Vector3::new(0.0, 0.0, 0.0));
    // +Y -> +Z under RotX, then +Z -> +X under RotY
    assert_point(
        world.transform_point(Point3::new(0.0, 1.0, 0.0)),
        Point3::new(1.0, 0.0, 0.0),
    );
}

#[test]
fn should_map_near_and_far_to_wgpu_depth_range() {
    let projection = Projection::new(800, 600, Deg(60.0), 0.1, 10.0);
    let matrix = projection.calc_matrix();

    let near = matrix * Vector4::new(0.0, 0.0, -0.1, 1.0);
    let far = matrix * Vector4::new(0.0, 0.0, -10.0, 1.0);
    assert!((near.z / near.w).abs() < 1e-4);
    assert!((far.z / far.w - 1.0).abs() < 1e-4);
    assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);
}

#[test]
fn should_keep_sixty_degree_field_of_view() {
    let projection = Projection::new(600, 600, Deg(60.0), 0.1, 10.0);
    let matrix = projection.calc_matrix();
    let half_height = (30.0_f32).to_radians().tan();

    // points on the top edge of the frustum land on the top of clip space
    for depth in [0.1_f32, 1.0, 5.0, 10.0] {
        let edge = matrix * Vector4::new(0.0, half_height * depth, -depth, 1.0);
        assert!((edge.y / edge.w - 1.0).abs() < 1e-4, "depth {depth}: {}", edge.y / edge.w);
        assert!((edge.w - depth).abs() < 1e-4, "depth {depth}: w {}", edge.w);
    }
}

#[test]
fn should_survive_zero_sized_projection() {
    let mut projection = Projection::new(0, 0, Deg(60.0), 0.1, 10.0);
    projection.resize(0, 0);
    assert!(projection.aspect().is_finite());
}

#[test]
fn should_normalize_light_direction() {
    let camera = OrbitCamera::new(Point3::new(0.0, 0.0, 0.05), 2.0);
    let projection = Projection::new(800, 600, Deg(60.0), 0.02, 6.0);
    let light = LightConfig::default();
    let uniform = FrameUniform::new(&projection, &camera, Matrix4::identity(), &light);

    let [x, y, z] = uniform.light_direction;
    assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-6);
    assert!(x < 0.0 && y > 0.0 && z > 0.0);
    assert_eq!(uniform.ambient_light, [0.35, 0.35, 0.35]);
    assert_point(uniform.view_world_position.into(), Point3::new(0.0, 0.0, 2.05));
}

#[test]
fn should_match_shader_layouts() {
    assert_eq!(std::mem::size_of::<FrameUniform>(), 240);
    assert_eq!(std::mem::size_of::<MaterialUniform>(), 64);
    assert_eq!(std::mem::size_of::<ModelVertex>(), 60);

    let layout = ModelVertex::desc();
    assert_eq!(layout.array_stride, 60);
    let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
    assert_eq!(offsets, vec![0, 12, 20, 32, 44]);
}
