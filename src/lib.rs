//! 점진적으로 수렴하는 CPU 패스 트레이서 커널
//!
//! 호스트는 매 프레임 [`Renderer::resize`]와 [`Renderer::render`]를 차례로 호출하고,
//! [`Renderer::image`]로 결과를 가져가 화면에 띄움

use std::time::Instant;

use log::info;
use nalgebra::{Point3, Vector3, Vector4};

pub mod camera;
pub mod error;
pub mod kernel;
mod util;

pub use camera::Camera;
pub use error::{Error, Result};
pub use kernel::payload::HitPayload;
pub use kernel::ray::Ray;
pub use kernel::scene::{Material, Scene};
pub use kernel::shape::{Shape, Sphere, Triangle, TriangleHit};
pub use kernel::texture::Image;
pub use kernel::{Renderer, Settings, Shading};

// R이 하위 바이트, A가 상위 바이트
pub fn vec4_to_rgba(color: &Vector4<f32>) -> u32 {
    let clamped = color.map(|channel| channel.clamp(0.0, 1.0) * 255.0);

    let r = clamped.x as u8 as u32;
    let g = clamped.y as u8 as u32;
    let b = clamped.z as u8 as u32;
    let a = clamped.w as u8 as u32;

    (a << 24) | (b << 16) | (g << 8) | r
}

const DEMO_WIDTH: u32 = 640;
const DEMO_HEIGHT: u32 = 360;
const DEMO_FRAMES: u32 = 64;
const DEMO_OUTPUT: &str = "pathlight.png";

// 분홍 거울 구 + 파란 바닥 구
pub fn demo_scene() -> Result<Scene> {
    let mut scene = Scene::new();

    let pink = scene.add_material(Material {
        albedo: Vector3::new(1.0, 0.0, 1.0),
        roughness: 0.0,
        ..Default::default()
    });
    let blue = scene.add_material(Material {
        albedo: Vector3::new(0.2, 0.3, 1.0),
        roughness: 0.1,
        ..Default::default()
    });

    scene.add_shape(Sphere::new(Point3::origin(), 1.0, pink))?;
    scene.add_shape(Sphere::new(Point3::new(0.0, -101.0, -5.0), 100.0, blue))?;

    Ok(scene)
}

// 창 없이 호스트 루프를 흉내냄: 크기 맞추고, 여러 프레임 누적한 뒤 png로 저장
pub fn run() -> Result<()> {
    let scene = demo_scene()?;
    let mut camera = Camera::new(45.0, 0.1, 100.0, DEMO_WIDTH, DEMO_HEIGHT);
    let mut renderer = Renderer::new(DEMO_WIDTH, DEMO_HEIGHT);

    for frame in 0..DEMO_FRAMES {
        let started = Instant::now();

        renderer.resize(DEMO_WIDTH, DEMO_HEIGHT);
        camera.resize(DEMO_WIDTH, DEMO_HEIGHT);
        renderer.render(&scene, &camera)?;

        info!("frame {}: last render {:.3}ms", frame, started.elapsed().as_secs_f64() * 1000.0);
    }

    renderer.image().save(DEMO_OUTPUT)?;
    info!("saved {}", DEMO_OUTPUT);
    Ok(())
}
