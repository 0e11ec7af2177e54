use std::time::Instant;

use log::{debug, trace};
use nalgebra::{Vector3, Vector4};
use rand::Rng;
use rayon::prelude::*;

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::kernel::integrator::Integrator;
use crate::kernel::ray::Ray;
use crate::kernel::scene::Scene;
use crate::kernel::texture::{pixel_index, Image};
use crate::util::pixel_rng;
use crate::vec4_to_rgba;

pub mod integrator;
pub mod payload;
pub mod ray;
pub mod scene;
pub mod shape;
pub mod texture;

pub const DEFAULT_BOUNCES: u32 = 5;
pub const SKY_COLOR: Vector3<f32> = Vector3::new(0.6, 0.7, 0.9);
// 방향광 하나만 사용. 쓸 때 정규화함
pub const LIGHT_DIRECTION: Vector3<f32> = Vector3::new(-1.0, -1.0, -1.0);
pub const RAY_EPSILON: f32 = 0.0001;

/// 한 번의 빌드/렌더 동안 하나만 골라 써야 함. 둘의 공식을 섞으면 결과가 달라짐
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Shading {
    /// 방향광 하나 + 거울 반사, 튕길 때마다 기여도 절반
    #[default]
    DirectLighting,
    /// 발광 재질 + albedo 누적, 확산 반사만
    Emissive,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub accumulate: bool,
    pub shading: Shading,
    pub bounces: u32,
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            accumulate: true,
            shading: Shading::default(),
            bounces: DEFAULT_BOUNCES,
            seed: 0,
        }
    }
}

pub struct Renderer {
    final_image: Image,
    path_acc: Vec<Vector4<f32>>,
    // 1이면 다음 프레임에서 누적 버퍼를 비움
    acc_counter: u32,
    // 지금까지 그린 프레임 수. 난수 시드에만 쓰고 초기화하지 않음
    sample_counter: u64,
    camera_revision: Option<u64>,
    active_shading: Shading,
    pub settings: Settings,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        let settings = Settings::default();

        Self {
            final_image: Image::new(width, height, "Pathlight Output"),
            path_acc: vec![Vector4::zeros(); width as usize * height as usize],
            acc_counter: 1,
            sample_counter: 0,
            camera_revision: None,
            active_shading: settings.shading,
            settings,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.active_shading = settings.shading;
        self.settings = settings;
        self
    }

    pub fn size(&self) -> (u32, u32) {
        self.final_image.size()
    }

    // 크기가 같으면 누적된 내용을 그대로 둠
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.final_image.resize(width, height) {
            return;
        }

        self.path_acc = vec![Vector4::zeros(); width as usize * height as usize];
        self.acc_counter = 1;
    }

    pub fn image(&self) -> &Image {
        &self.final_image
    }

    pub fn accumulation(&self) -> &[Vector4<f32>] {
        &self.path_acc
    }

    pub fn frame_index(&self) -> u32 {
        self.acc_counter
    }

    pub fn reset_accumulation(&mut self) {
        debug!("accumulation reset at frame {}", self.acc_counter);
        self.acc_counter = 1;
    }

    pub fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()> {
        let started = Instant::now();
        scene.validate()?;

        let (width, height) = self.final_image.size();
        // 개수만 같고 가로세로가 뒤바뀐 경우도 걸러야 x + y * width 인덱스가 맞음
        if camera.viewport_size() != (width, height) || camera.rays().len() != self.path_acc.len() {
            return Err(Error::ViewportMismatch {
                expected: (width, height),
                actual: camera.viewport_size(),
            });
        }

        if self.camera_revision != Some(camera.revision()) {
            self.camera_revision = Some(camera.revision());
            self.acc_counter = 1;
        }
        if self.active_shading != self.settings.shading {
            debug!("shading {:?} -> {:?}", self.active_shading, self.settings.shading);
            self.active_shading = self.settings.shading;
            self.acc_counter = 1;
        }

        if self.acc_counter == 1 {
            self.path_acc.fill(Vector4::zeros());
        }

        // 0으로 나누지 않도록 픽셀이 없으면 건너뜀
        if !self.path_acc.is_empty() {
            let row = width as usize;
            let frame = self.acc_counter as f32;
            let sample = self.sample_counter;
            let seed = self.settings.seed;
            let integrator = Integrator::new(scene, &self.settings);

            self.path_acc
                .par_chunks_mut(row)
                .zip(self.final_image.pixels_mut().par_chunks_mut(row))
                .enumerate()
                .for_each(|(y, (paths, pixels))| {
                    for (x, (path, pixel)) in paths.iter_mut().zip(pixels.iter_mut()).enumerate() {
                        let index = x + y * row;
                        let mut rng = pixel_rng(seed, sample, index);
                        if let Some(color) = raygen(&integrator, camera, index, &mut rng) {
                            *path += color;
                        }

                        let accumulated = *path / frame;
                        *pixel = vec4_to_rgba(&accumulated);
                    }
                });
        }

        self.sample_counter += 1;
        if self.settings.accumulate {
            self.acc_counter += 1;
        } else {
            self.acc_counter = 1;
        }

        trace!(
            "{}x{} frame rendered in {:?} (frame index {})",
            width,
            height,
            started.elapsed(),
            self.acc_counter
        );
        Ok(())
    }

    pub fn per_pixel<G: Rng + ?Sized>(
        &self,
        scene: &Scene,
        camera: &Camera,
        x: u32,
        y: u32,
        rng: &mut G,
    ) -> Option<Vector4<f32>> {
        let (width, height) = self.final_image.size();
        if x >= width || y >= height {
            return None;
        }

        let index = pixel_index(x, y, width);
        raygen(&Integrator::new(scene, &self.settings), camera, index, rng)
    }
}

// DirectX의 RayGen 쉐이더와 같음. render와 per_pixel이 같이 씀
fn raygen<G: Rng + ?Sized>(
    integrator: &Integrator,
    camera: &Camera,
    index: usize,
    rng: &mut G,
) -> Option<Vector4<f32>> {
    let direction = *camera.rays().get(index)?;
    Some(integrator.sample(Ray::new(camera.position(), direction), rng))
}
