use nalgebra::{Point3, Unit, Vector3};

use crate::kernel::payload::HitPayload;
use crate::kernel::ray::Ray;

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
    pub material_index: usize,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            radius: 0.5,
            material_index: 0,
        }
    }
}

impl Sphere {
    pub fn new(center: Point3<f32>, radius: f32, material_index: usize) -> Self {
        Self {
            center,
            radius,
            material_index,
        }
    }

    // o = 빔 시작 (구 중심 기준), d = 빔 방향, r = 구 반지름
    // (d·d) * t^2 + 2 * (o·d) * t + (o·o - r^2) = 0
    // 가까운 근만 돌려줌. 음수여도 그대로 돌려주고, 거르는건 Scene이 함
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let origin = ray.origin - self.center;

        let first = ray.direction.magnitude_squared();
        if first <= f32::EPSILON {
            return None;
        }
        let second = 2.0 * origin.dot(&ray.direction);
        let third = origin.magnitude_squared() - self.radius.powi(2);

        // 판별식
        let discriminant = second.powi(2) - 4.0 * first * third;
        if discriminant < 0.0 {
            return None;
        }

        Some((-second - discriminant.sqrt()) / (2.0 * first))
    }

    pub fn payload(&self, ray: &Ray, distance: f32, object_index: usize) -> HitPayload {
        let position = ray.at(distance);
        let normal = Unit::new_normalize(position - self.center);

        HitPayload {
            distance,
            position,
            normal,
            object_index,
        }
    }
}

/// Möller–Trumbore 교차 결과. u, v는 무게중심 좌표
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub distance: f32,
    pub u: f32,
    pub v: f32,
}

// 법선은 저장하지 않고 매번 변으로 계산함. 꼭짓점 순서에 따라 방향이 바뀜
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
    pub material_index: usize,
}

impl Triangle {
    pub fn new(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>, material_index: usize) -> Self {
        Self {
            vertices: [a, b, c],
            material_index,
        }
    }

    fn edges(&self) -> (Vector3<f32>, Vector3<f32>) {
        let [a, b, c] = self.vertices;
        (b - a, c - a)
    }

    pub fn normal(&self) -> Unit<Vector3<f32>> {
        let (edge1, edge2) = self.edges();
        Unit::new_normalize(edge1.cross(&edge2))
    }

    // 거리가 양수인지는 확인하지 않음. 구와 마찬가지로 Scene이 거름
    pub fn intersect_barycentric(&self, ray: &Ray) -> Option<TriangleHit> {
        let (edge1, edge2) = self.edges();

        let h = ray.direction.cross(&edge2);
        let determinant = edge1.dot(&h);

        // 레이가 삼각형 평면과 평행함
        if determinant.abs() < f32::EPSILON {
            return None;
        }

        let inverse = 1.0 / determinant;
        let s = ray.origin - self.vertices[0];
        let u = inverse * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = inverse * ray.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        Some(TriangleHit {
            distance: inverse * edge2.dot(&q),
            u,
            v,
        })
    }

    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.intersect_barycentric(ray).map(|hit| hit.distance)
    }

    pub fn payload(&self, ray: &Ray, distance: f32, object_index: usize) -> HitPayload {
        HitPayload {
            distance,
            position: ray.at(distance),
            normal: self.normal(),
            object_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Triangle(Triangle),
}

impl Shape {
    pub fn material_index(&self) -> usize {
        match self {
            Shape::Sphere(sphere) => sphere.material_index,
            Shape::Triangle(triangle) => triangle.material_index,
        }
    }

    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        match self {
            Shape::Sphere(sphere) => sphere.intersect(ray),
            Shape::Triangle(triangle) => triangle.intersect(ray),
        }
    }

    pub fn payload(&self, ray: &Ray, distance: f32, object_index: usize) -> HitPayload {
        match self {
            Shape::Sphere(sphere) => sphere.payload(ray, distance, object_index),
            Shape::Triangle(triangle) => triangle.payload(ray, distance, object_index),
        }
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}

impl From<Triangle> for Shape {
    fn from(triangle: Triangle) -> Self {
        Shape::Triangle(triangle)
    }
}
