use std::path::Path;

use bytemuck::cast_slice;
use image::imageops::flip_vertical_in_place;
use image::RgbaImage;
use log::debug;

use crate::error::Result;

/// 렌더러가 소유하는 출력 이미지. 픽셀 하나당 u32 하나 (R이 하위 바이트, A가 상위 바이트)
///
/// 0번 행이 화면 아래쪽임. 화면에 띄우거나 저장할 때는 위아래를 뒤집어야 함
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<u32>,
    pub name: String,
}

impl Image {
    pub fn new(width: u32, height: u32, label: &str) -> Image {
        Self {
            width,
            height,
            data: vec![0; pixel_count(width, height)],
            name: label.to_string(),
        }
    }

    // 크기가 바뀌었을 때만 새로 할당. 예전 내용은 버림
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.size() == (width, height) {
            return false;
        }

        debug!("{}: {}x{} -> {}x{}", self.name, self.width, self.height, width, height);
        self.width = width;
        self.height = height;
        self.data = vec![0; pixel_count(width, height)];
        true
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.data
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(pixel_index(x, y, self.width)).copied()
    }

    // 텍스쳐 업로드용. 리틀 엔디언에서는 RGBA 순서 그대로임
    pub fn as_bytes(&self) -> &[u8] {
        cast_slice(&self.data)
    }

    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        let bytes = self.data.iter().flat_map(|pixel| pixel.to_le_bytes()).collect();
        let mut image = RgbaImage::from_raw(self.width, self.height, bytes)?;
        flip_vertical_in_place(&mut image);
        Some(image)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        match self.to_rgba_image() {
            Some(image) if !self.data.is_empty() => image.save(path)?,
            _ => debug!("{}: nothing to save", self.name),
        }
        Ok(())
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

// u32로 곱하면 큰 이미지에서 넘치니 usize로 먼저 바꿈
pub(crate) fn pixel_index(x: u32, y: u32, width: u32) -> usize {
    x as usize + y as usize * width as usize
}
