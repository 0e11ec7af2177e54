use nalgebra::{Unit, Vector3};
use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn random_vec<T, R, G>(rng: &mut G, range: R) -> Vector3<T>
where
    T: SampleUniform,
    R: SampleRange<T> + Clone,
    G: Rng + ?Sized,
{
    Vector3::new(
        rng.gen_range(range.clone()),
        rng.gen_range(range.clone()),
        rng.gen_range(range),
    )
}

pub fn random_unit_vec<G: Rng + ?Sized>(rng: &mut G) -> Unit<Vector3<f32>> {
    loop {
        // 원점 근처에서 뽑히면 정규화가 불안정하니 다시 뽑기
        if let Some(unit) = Unit::try_new(random_vec(rng, -1.0..1.0), 1e-6) {
            return unit;
        }
    }
}

// 픽셀마다 독립적인 난수 생성기. 같은 (seed, sample, pixel)이면 언제나 같은 결과
pub fn pixel_rng(seed: u64, sample: u64, pixel: usize) -> StdRng {
    let mixed = seed
        ^ sample.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (pixel as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    StdRng::seed_from_u64(mixed)
}
