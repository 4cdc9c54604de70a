use cgmath::{InnerSpace, Point3, Vector3};
use obj_viewer::{
    config::CameraConfig,
    data_structures::geometry::{GeometryPart, RawGeometry},
    scene::{Extents, SceneFraming, sort_by_render_order},
};

fn part(position: Vec<f32>) -> GeometryPart {
    GeometryPart::from_raw(RawGeometry {
        position,
        ..Default::default()
    })
}

#[test]
fn should_center_bounding_box_at_origin() {
    let extents = Extents::of_positions(&[1.0, 2.0, 3.0, 5.0, -2.0, 7.0]).expect("extents");
    let framing = SceneFraming::from_extents(&extents, &CameraConfig::default());

    let centered = extents.center() + framing.center_offset;
    assert!((centered - Point3::new(0.0, 0.0, 0.0)).magnitude() < 1e-6);
    assert_eq!(framing.center_offset, Vector3::new(-3.0, 0.0, -5.0));
}

#[test]
fn should_derive_radius_and_clip_planes_from_diagonal() {
    let extents = Extents::of_positions(&[0.0, 0.0, 0.0, 3.0, 4.0, 0.0]).expect("extents");
    let framing = SceneFraming::from_extents(&extents, &CameraConfig::default());

    assert!((framing.radius - 4.0).abs() < 1e-6);
    assert!((framing.z_near - 0.04).abs() < 1e-6);
    assert!((framing.z_far - 12.0).abs() < 1e-5);
    assert_eq!(framing.target, Point3::new(0.0, 0.0, 0.05));
}

#[test]
fn should_union_extents_of_all_parts() {
    let parts = [
        part(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
        part(vec![]),
        part(vec![-2.0, 0.5, 0.5, -1.0, 3.0, 0.5]),
    ];
    let extents = Extents::of_geometries(&parts).expect("extents");

    assert_eq!(extents.min, Point3::new(-2.0, 0.0, 0.0));
    assert_eq!(extents.max, Point3::new(1.0, 3.0, 1.0));
}

#[test]
fn should_have_no_extents_without_positions() {
    assert_eq!(Extents::of_positions(&[]), None);
    assert_eq!(Extents::of_geometries(&[part(vec![]), part(vec![])]), None);
}

#[test]
fn should_use_unit_radius_for_single_point() {
    let extents = Extents::of_positions(&[4.0, 4.0, 4.0]).expect("extents");
    let framing = SceneFraming::from_extents(&extents, &CameraConfig::default());

    assert_eq!(framing.radius, 1.0);
    assert!(framing.z_near > 0.0 && framing.z_near < framing.z_far);
    assert_eq!(framing.center_offset, Vector3::new(-4.0, -4.0, -4.0));
}

#[test]
fn should_apply_camera_config_factors() {
    let extents = Extents::of_positions(&[0.0, 0.0, 0.0, 0.0, 0.0, 10.0]).expect("extents");
    let camera = CameraConfig {
        radius_factor: 1.0,
        near_divisor: 10.0,
        far_factor: 2.0,
        ..Default::default()
    };
    let framing = SceneFraming::from_extents(&extents, &camera);

    assert_eq!(framing.radius, 10.0);
    assert_eq!(framing.z_near, 1.0);
    assert_eq!(framing.z_far, 20.0);
}

#[test]
fn should_keep_geometry_order_for_equal_render_order() {
    let mut parts = vec![("a", 0), ("top", 1), ("b", 0), ("under", -1), ("c", 0)];
    sort_by_render_order(&mut parts, |(_, order)| *order);

    let names: Vec<&str> = parts.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["under", "a", "b", "c", "top"]);
}
