use nalgebra::{Point3, Vector3, Vector4};
use pathlight::kernel::SKY_COLOR;
use pathlight::{vec4_to_rgba, Camera, Error, Material, Ray, Renderer, Scene, Settings, Sphere, Triangle};

fn camera_at_three(width: u32, height: u32) -> Camera {
    let mut camera = Camera::new(45.0, 0.1, 100.0, width, height);
    assert!(camera.look_at(Point3::new(0.0, 0.0, 3.0), Point3::origin()));
    camera
}

fn unit_sphere_scene(roughness: f32) -> Scene {
    let mut scene = Scene::new();
    let material = scene.add_material(Material {
        albedo: Vector3::new(0.8, 0.4, 0.2),
        roughness,
        metallic: 0.0,
        ..Default::default()
    });
    scene.add_shape(Sphere::new(Point3::origin(), 1.0, material)).unwrap();
    scene
}

fn assert_buffers_close(actual: &[Vector4<f32>], expected: &[Vector4<f32>]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).magnitude() < 1e-5, "{a} != {e}");
    }
}

#[test]
fn test_unit_sphere_center_pixel() {
    let scene = unit_sphere_scene(1.0);
    let camera = camera_at_three(8, 8);

    let center = Ray::new(camera.position(), camera.rays()[4 + 4 * 8]);
    let payload = scene.trace_ray(&center).expect("center pixel should hit the sphere");

    assert_eq!(payload.object_index, 0);
    assert!((payload.normal.into_inner() - Vector3::z()).magnitude() < 1e-3);
    assert!((payload.distance - 2.0).abs() < 1e-3);
}

#[test]
fn test_corner_pixel_misses() {
    let scene = unit_sphere_scene(1.0);
    let camera = camera_at_three(8, 8);

    let corner = Ray::new(camera.position(), camera.rays()[0]);
    assert!(scene.trace_ray(&corner).is_none());
}

#[test]
fn test_empty_scene_renders_sky() {
    let scene = Scene::new();
    let camera = camera_at_three(5, 3);
    let mut renderer = Renderer::new(5, 3).with_settings(Settings {
        accumulate: false,
        ..Default::default()
    });

    renderer.render(&scene, &camera).unwrap();

    let sky = Vector4::new(SKY_COLOR.x, SKY_COLOR.y, SKY_COLOR.z, 1.0);
    assert!(renderer.accumulation().iter().all(|sample| *sample == sky));
    assert!(renderer
        .image()
        .pixels()
        .iter()
        .all(|&pixel| pixel == vec4_to_rgba(&sky)));
}

#[test]
fn test_accumulation_is_mean_of_samples() {
    const FRAMES: u32 = 4;
    let scene = unit_sphere_scene(0.7);
    let camera = camera_at_three(6, 6);
    let settings = Settings {
        seed: 42,
        ..Default::default()
    };

    let mut accumulating = Renderer::new(6, 6).with_settings(settings.clone());
    for _ in 0..FRAMES {
        accumulating.render(&scene, &camera).unwrap();
    }

    // 누적을 끄면 매 프레임 버퍼가 비워지니, 버퍼가 곧 그 프레임의 샘플
    let mut single = Renderer::new(6, 6).with_settings(Settings {
        accumulate: false,
        ..settings
    });
    let mut sum = vec![Vector4::zeros(); 36];
    for _ in 0..FRAMES {
        single.render(&scene, &camera).unwrap();
        for (total, sample) in sum.iter_mut().zip(single.accumulation()) {
            *total += sample;
        }
    }

    let mean: Vec<_> = sum.iter().map(|total| total / FRAMES as f32).collect();
    let averaged: Vec<_> = accumulating
        .accumulation()
        .iter()
        .map(|total| total / FRAMES as f32)
        .collect();
    assert_buffers_close(&averaged, &mean);

    let expected: Vec<_> = mean.iter().map(vec4_to_rgba).collect();
    assert_eq!(accumulating.image().pixels(), expected.as_slice());
}

#[test]
fn test_resize_discards_accumulation() {
    // 거울 재질이라 매 프레임 결과가 같음
    let scene = unit_sphere_scene(0.0);
    let mut camera = camera_at_three(4, 4);
    let mut renderer = Renderer::new(4, 4);

    renderer.render(&scene, &camera).unwrap();
    renderer.render(&scene, &camera).unwrap();
    assert_eq!(renderer.frame_index(), 3);

    renderer.resize(6, 4);
    camera.resize(6, 4);
    assert_eq!(renderer.frame_index(), 1);
    assert_eq!(renderer.accumulation().len(), 24);

    renderer.render(&scene, &camera).unwrap();

    let mut fresh = Renderer::new(6, 4);
    fresh.render(&scene, &camera).unwrap();
    assert_buffers_close(renderer.accumulation(), fresh.accumulation());
    assert_eq!(renderer.image().pixels(), fresh.image().pixels());
}

#[test]
fn test_same_size_resize_keeps_accumulation() {
    let scene = unit_sphere_scene(0.5);
    let camera = camera_at_three(4, 4);
    let mut renderer = Renderer::new(4, 4);

    renderer.render(&scene, &camera).unwrap();
    renderer.render(&scene, &camera).unwrap();

    let before = renderer.accumulation().to_vec();
    let buffer = renderer.accumulation().as_ptr();

    renderer.resize(4, 4);
    renderer.resize(4, 4);

    assert_eq!(renderer.frame_index(), 3);
    assert_eq!(renderer.accumulation().as_ptr(), buffer);
    assert_eq!(renderer.accumulation(), before.as_slice());
}

#[test]
fn test_triangle_scenario() {
    let triangle = Triangle::new(
        Point3::new(3.0, 2.0, 0.0),
        Point3::new(-3.0, 2.0, 0.0),
        Point3::new(0.0, -1.0, 0.0),
        0,
    );
    let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Point3::origin() - Point3::new(0.0, 0.0, -5.0));

    let hit = triangle.intersect_barycentric(&ray).expect("ray should hit the triangle");
    assert!((0.0..=1.0).contains(&hit.u));
    assert!((0.0..=1.0).contains(&hit.v));
    assert!(hit.u + hit.v <= 1.0);

    let mut scene = Scene::new();
    scene.add_material(Material::default());
    scene.add_shape(triangle).unwrap();
    let payload = scene.trace_ray(&ray).unwrap();
    assert_eq!(payload.object_index, 0);
    assert!((payload.position - Point3::origin()).magnitude() < 1e-5);
}

#[test]
fn test_invalid_material_fails_fast() {
    let mut scene = Scene::new();
    let result = scene.add_shape(Sphere::new(Point3::origin(), 1.0, 0));
    assert!(matches!(result, Err(Error::InvalidMaterialIndex { .. })));
}
