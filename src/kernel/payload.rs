use nalgebra::{Point3, Unit, Vector3};

// 원본과 같은 디자인. HitPayload는 빛의 경로에 대한 정보만 담고
// 이를 이용해 색상을 알아내는건 적분기에서 함
// 레이가 아무것도 맞추지 못하면 HitPayload 자체가 없음 (Option::None)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitPayload {
    pub distance: f32,
    pub position: Point3<f32>,
    pub normal: Unit<Vector3<f32>>,
    /// Scene의 도형 목록에서의 인덱스
    pub object_index: usize,
}
