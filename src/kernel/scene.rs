use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::kernel::payload::HitPayload;
use crate::kernel::ray::Ray;
use crate::kernel::shape::Shape;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub albedo: Vector3<f32>,
    // 0이면 거울, 1이면 반사 방향이 제일 많이 흔들림
    pub roughness: f32,
    // 아직 반사 계산에는 안 씀
    pub metallic: f32,
    pub emission_color: Vector3<f32>,
    pub emission_power: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vector3::new(1.0, 1.0, 1.0),
            roughness: 1.0,
            metallic: 0.0,
            emission_color: Vector3::zeros(),
            emission_power: 0.0,
        }
    }
}

impl Material {
    pub fn emission(&self) -> Vector3<f32> {
        self.emission_color * self.emission_power
    }
}

/// 도형과 재질 목록. 도형은 재질을 인덱스로만 가리킴
///
/// 도형을 추가할 때 재질 인덱스를 검사하고, 렌더러도 매 프레임 시작 전에
/// [`Scene::validate`]를 호출함
#[derive(Debug, Clone, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
    materials: Vec<Material>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_shape(&mut self, shape: impl Into<Shape>) -> Result<usize> {
        let shape = shape.into();
        let index = self.shapes.len();
        self.check_material(index, &shape)?;

        self.shapes.push(shape);
        Ok(index)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    // 재질은 수정만 가능하고 개수는 못 바꾸니 인덱스가 깨질 일이 없음
    pub fn materials_mut(&mut self) -> &mut [Material] {
        &mut self.materials
    }

    pub fn material_of(&self, object_index: usize) -> Option<&Material> {
        let shape = self.shapes.get(object_index)?;
        self.materials.get(shape.material_index())
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.materials.clear();
    }

    pub fn validate(&self) -> Result<()> {
        self.shapes
            .iter()
            .enumerate()
            .try_for_each(|(index, shape)| self.check_material(index, shape))
    }

    fn check_material(&self, shape_index: usize, shape: &Shape) -> Result<()> {
        let index = shape.material_index();
        if index >= self.materials.len() {
            return Err(Error::InvalidMaterialIndex {
                shape: shape_index,
                index,
                materials: self.materials.len(),
            });
        }
        Ok(())
    }

    // DirectX의 TraceRay와 같음. 0보다 큰 거리 중 가장 가까운 도형만 채택
    pub fn trace_ray(&self, ray: &Ray) -> Option<HitPayload> {
        let mut closest: Option<(usize, f32)> = None;

        for (index, shape) in self.shapes.iter().enumerate() {
            let Some(distance) = shape.intersect(ray) else {
                continue;
            };
            if distance <= 0.0 {
                continue;
            }

            match closest {
                Some((_, previous)) if previous <= distance => {}
                _ => closest = Some((index, distance)),
            }
        }

        closest.map(|(index, distance)| self.shapes[index].payload(ray, distance, index))
    }
}
