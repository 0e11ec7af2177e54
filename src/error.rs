use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// 도형이 존재하지 않는 재질을 가리킴
    #[error("shape {shape} refers to material {index}, but the scene only has {materials} materials")]
    InvalidMaterialIndex {
        shape: usize,
        index: usize,
        materials: usize,
    },

    /// 카메라와 렌더러의 크기가 다름. 둘 중 하나만 resize 했을 때 발생
    #[error("camera viewport is {actual:?} but the output image is {expected:?}")]
    ViewportMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
