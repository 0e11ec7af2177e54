use nalgebra::{Isometry3, Perspective3, Point3, Unit, Vector2, Vector3};
use rayon::prelude::*;

// 창/입력 처리는 호스트가 하고, 여기서는 픽셀마다 레이 방향만 계산해 둠
pub struct Camera {
    projection: Option<Perspective3<f32>>,
    view: Isometry3<f32>,

    vertical_fov: f32,
    near: f32,
    far: f32,

    position: Point3<f32>,
    forward: Unit<Vector3<f32>>,

    rays: Vec<Vector3<f32>>,
    viewport_size: (u32, u32),

    // 레이를 다시 계산할 때마다 증가. 렌더러가 이 값으로 누적을 초기화할지 판단함
    revision: u64,
}

impl Camera {
    /// `vertical_fov`는 도 단위
    pub fn new(vertical_fov: f32, near: f32, far: f32, width: u32, height: u32) -> Self {
        let position = Point3::new(0.0, 0.0, 6.0);
        let forward = -Vector3::z_axis();
        let view = Isometry3::look_at_rh(&position, &(position + forward.into_inner()), &Vector3::y());

        let mut to_return = Self {
            projection: None,
            view,
            vertical_fov,
            near,
            far,
            position,
            forward,
            rays: vec![],
            viewport_size: (width, height),
            revision: 0,
        };

        to_return.reevaluate_projection();
        to_return.reevaluate_rays();

        to_return
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn forward(&self) -> Unit<Vector3<f32>> {
        self.forward
    }

    /// 픽셀 (x, y)의 레이 방향은 `rays()[x + y * width]`
    pub fn rays(&self) -> &[Vector3<f32>] {
        &self.rays
    }

    pub fn viewport_size(&self) -> (u32, u32) {
        self.viewport_size
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    // 크기가 같으면 아무것도 안 함
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.viewport_size == (width, height) {
            return false;
        }
        self.viewport_size = (width, height);

        self.reevaluate_projection();
        self.reevaluate_rays();
        true
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;

        self.reevaluate_view();
        self.reevaluate_rays();
    }

    // 위치와 바라보는 곳이 같으면 방향을 알 수 없으니 무시
    pub fn look_at(&mut self, position: Point3<f32>, target: Point3<f32>) -> bool {
        let Some(forward) = Unit::try_new(target - position, f32::EPSILON) else {
            return false;
        };
        self.position = position;
        self.forward = forward;

        self.reevaluate_view();
        self.reevaluate_rays();
        true
    }

    fn reevaluate_projection(&mut self) {
        let (width, height) = self.viewport_size;
        if width == 0 || height == 0 {
            self.projection = None;
            return;
        }

        let aspect = width as f32 / height as f32;
        self.projection = Some(Perspective3::new(
            aspect,
            self.vertical_fov.to_radians(),
            self.near,
            self.far,
        ));
    }

    fn reevaluate_view(&mut self) {
        let target = self.position + self.forward.into_inner();
        // 정면이 y축과 평행하면 다른 up 벡터 사용
        let up = if self.forward.cross(&Vector3::y()).magnitude_squared() < 1e-6 {
            Vector3::z()
        } else {
            Vector3::y()
        };
        self.view = Isometry3::look_at_rh(&self.position, &target, &up);
    }

    fn reevaluate_rays(&mut self) {
        self.revision += 1;

        let Some(projection) = self.projection.as_ref() else {
            self.rays = vec![];
            return;
        };
        let (width, height) = self.viewport_size;
        let view = &self.view;

        self.rays = (0..width as usize * height as usize)
            .into_par_iter()
            .map(|index| {
                let x = (index % width as usize) as f32;
                let y = (index / width as usize) as f32;

                let mut coord = Vector2::new(x / width as f32, y / height as f32);
                coord *= 2.0;
                coord -= Vector2::new(1.0, 1.0);

                // 원평면 위의 점 (카메라 공간)
                let target = projection.unproject_point(&Point3::new(coord.x, coord.y, 1.0));
                let direction = target.coords.normalize();

                view.inverse_transform_vector(&direction)
            })
            .collect();
    }
}
