use fastnoise_lite::{FastNoiseLite, NoiseType};

const CRUST_FREQUENCY: f32 = 0.045;

/// Seeded crust-thickness field sampled in world coordinates, so adjacent
/// tiles agree along their shared edge.
pub struct CrustNoise {
    noise: FastNoiseLite,
    crust_max: i32,
}

impl CrustNoise {
    pub fn new(seed: i32, crust_max: i32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed ^ 0x5eed_c0de);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(CRUST_FREQUENCY));
        Self {
            noise,
            crust_max: crust_max.max(1),
        }
    }

    /// Thickness in `[1, crust_max]` at world column `(x, z)`.
    pub fn thickness(&self, x: i32, z: i32) -> i32 {
        let n = self.noise.get_noise_2d(x as f32, z as f32);
        let t = ((n + 1.0) * 0.5 * self.crust_max as f32).floor() as i32 + 1;
        t.clamp(1, self.crust_max)
    }
}
