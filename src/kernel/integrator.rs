use nalgebra::{Reflection3, Unit, Vector3, Vector4};
use rand::Rng;

use crate::kernel::ray::Ray;
use crate::kernel::scene::Scene;
use crate::kernel::{Settings, Shading, LIGHT_DIRECTION, RAY_EPSILON, SKY_COLOR};
use crate::util::{random_unit_vec, random_vec};

// 한 레이의 빛 경로를 따라가며 색을 모음. 두 방식은 섞지 않음
pub struct Integrator<'a> {
    scene: &'a Scene,
    settings: &'a Settings,
}

impl<'a> Integrator<'a> {
    pub fn new(scene: &'a Scene, settings: &'a Settings) -> Self {
        Self { scene, settings }
    }

    pub fn sample<G: Rng + ?Sized>(&self, ray: Ray, rng: &mut G) -> Vector4<f32> {
        let color = match self.settings.shading {
            Shading::DirectLighting => self.direct_lighting(ray, rng),
            Shading::Emissive => self.emissive(ray, rng),
        };

        Vector4::new(color.x, color.y, color.z, 1.0)
    }

    fn direct_lighting<G: Rng + ?Sized>(&self, mut ray: Ray, rng: &mut G) -> Vector3<f32> {
        let light_direction = LIGHT_DIRECTION.normalize();

        let mut color = Vector3::zeros();
        let mut multiplier = 1.0;

        for _ in 0..self.settings.bounces {
            let Some(payload) = self.scene.trace_ray(&ray) else {
                color += SKY_COLOR * multiplier;
                break;
            };
            let Some(material) = self.scene.material_of(payload.object_index) else {
                break;
            };

            let intensity = payload.normal.dot(&-light_direction).max(0.0); // == cos(angle)
            color += material.albedo * intensity * multiplier;
            multiplier *= 0.5;

            // position 자체가 표면에 접하기 때문에 그대로 쓰면 자기 자신과 다시 부딪힘
            // 그래서 조금이라도 옮겨야 함
            ray.origin = payload.position + payload.normal.as_ref() * RAY_EPSILON;

            let jitter: Vector3<f32> = random_vec(rng, -0.5..0.5) * material.roughness;
            let reflection_axis = Unit::try_new(payload.normal.as_ref() + jitter, f32::EPSILON)
                .unwrap_or(payload.normal);
            Reflection3::new(reflection_axis, 0.0).reflect(&mut ray.direction);
        }

        color
    }

    fn emissive<G: Rng + ?Sized>(&self, mut ray: Ray, rng: &mut G) -> Vector3<f32> {
        let mut light = Vector3::zeros();
        let mut throughput = Vector3::repeat(1.0);

        for _ in 0..self.settings.bounces {
            let Some(payload) = self.scene.trace_ray(&ray) else {
                light += SKY_COLOR.component_mul(&throughput);
                break;
            };
            let Some(material) = self.scene.material_of(payload.object_index) else {
                break;
            };

            throughput.component_mul_assign(&material.albedo);
            light += material.emission();

            ray.origin = payload.position + payload.normal.as_ref() * RAY_EPSILON;
            ray.direction = (payload.normal.as_ref() + random_unit_vec(rng).as_ref())
                .try_normalize(f32::EPSILON)
                .unwrap_or(payload.normal.into_inner());
        }

        light
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;
    use crate::kernel::scene::Material;
    use crate::kernel::shape::Sphere;
    use crate::util::pixel_rng;

    fn toward_origin() -> Ray {
        Ray::new(Point3::new(0.0, 0.0, 3.0), Vector3::new(0.0, 0.0, -1.0))
    }

    fn assert_close(actual: Vector4<f32>, expected: Vector4<f32>) {
        assert!((actual - expected).magnitude() < 1e-5, "{actual} != {expected}");
    }

    #[test]
    fn test_empty_scene_is_sky() {
        let scene = Scene::new();
        for shading in [Shading::DirectLighting, Shading::Emissive] {
            let settings = Settings {
                shading,
                ..Default::default()
            };
            let color = Integrator::new(&scene, &settings).sample(toward_origin(), &mut pixel_rng(0, 0, 0));
            assert_eq!(color, Vector4::new(SKY_COLOR.x, SKY_COLOR.y, SKY_COLOR.z, 1.0));
        }
    }

    #[test]
    fn test_zero_bounces_is_black() {
        let scene = Scene::new();
        let settings = Settings {
            bounces: 0,
            ..Default::default()
        };
        let color = Integrator::new(&scene, &settings).sample(toward_origin(), &mut pixel_rng(0, 0, 0));
        assert_eq!(color, Vector4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_direct_lighting_mirror() {
        // 거울 구를 정면에서 보면: 첫 반사는 빛 세기 1/sqrt(3), 그 다음은 뒤로 튕겨 하늘
        let mut scene = Scene::new();
        let material = scene.add_material(Material {
            albedo: Vector3::new(1.0, 0.0, 1.0),
            roughness: 0.0,
            ..Default::default()
        });
        scene.add_shape(Sphere::new(Point3::origin(), 1.0, material)).unwrap();

        let settings = Settings::default();
        let color = Integrator::new(&scene, &settings).sample(toward_origin(), &mut pixel_rng(0, 0, 0));

        let intensity = 1.0 / 3.0f32.sqrt();
        let expected = Vector3::new(intensity, 0.0, intensity) + SKY_COLOR * 0.5;
        assert_close(color, Vector4::new(expected.x, expected.y, expected.z, 1.0));
    }

    #[test]
    fn test_emissive_accumulates_emission() {
        // 튕긴 레이는 처리하지 않고 첫 충돌의 발광만 확인
        let mut scene = Scene::new();
        let glow = scene.add_material(Material {
            albedo: Vector3::new(0.5, 0.5, 0.5),
            emission_color: Vector3::new(1.0, 0.8, 0.6),
            emission_power: 2.0,
            ..Default::default()
        });
        scene.add_shape(Sphere::new(Point3::origin(), 1.0, glow)).unwrap();

        let settings = Settings {
            shading: Shading::Emissive,
            bounces: 1,
            ..Default::default()
        };
        let color = Integrator::new(&scene, &settings).sample(toward_origin(), &mut pixel_rng(0, 0, 0));
        assert_close(color, Vector4::new(2.0, 1.6, 1.2, 1.0));
    }

    #[test]
    fn test_emissive_sky_is_weighted_by_throughput() {
        // 바닥 삼각형에 한 번 맞고 하늘로 빠져나감
        let mut scene = Scene::new();
        let red = scene.add_material(Material {
            albedo: Vector3::new(1.0, 0.0, 0.0),
            ..Default::default()
        });
        scene
            .add_shape(crate::kernel::shape::Triangle::new(
                Point3::new(-100.0, 0.0, 100.0),
                Point3::new(100.0, 0.0, 100.0),
                Point3::new(0.0, 0.0, -100.0),
                red,
            ))
            .unwrap();

        let settings = Settings {
            shading: Shading::Emissive,
            ..Default::default()
        };
        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vector3::new(0.0, -1.0, 0.0));
        let color = Integrator::new(&scene, &settings).sample(ray, &mut pixel_rng(3, 1, 4));
        assert_close(color, Vector4::new(SKY_COLOR.x, 0.0, 0.0, 1.0));
    }
}
