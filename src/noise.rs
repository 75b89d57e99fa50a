//! Seeded gradient noise evaluable at arbitrary real coordinates.
//!
//! Each field owns an immutable 256-entry permutation table built once from
//! its layer seed by a seeded Fisher-Yates shuffle, duplicated to 512
//! entries so lattice hashing never needs a wrap check. Evaluation is pure:
//! the same (seed, x, y) always produces the same value, on any platform.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeded 2D gradient noise field. Stateless beyond the permutation table.
#[derive(Clone)]
pub struct NoiseField {
    perm: [u8; 512],
}

impl NoiseField {
    /// Build a noise field from a layer seed.
    pub fn new(seed: u64) -> Self {
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = i as u8;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        table.shuffle(&mut rng);

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&table);
        perm[256..].copy_from_slice(&table);

        Self { perm }
    }

    /// Hash a lattice corner to a gradient selector.
    fn corner(&self, xi: i64, yi: i64) -> u8 {
        let x = (xi & 255) as usize;
        let y = (yi & 255) as usize;
        self.perm[self.perm[x] as usize + y]
    }

    /// Evaluate gradient noise at (x, y). Returns a value in [-1, 1],
    /// continuous across lattice boundaries and defined for any finite input.
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let xi = x0 as i64;
        let yi = y0 as i64;

        let fx = x - x0;
        let fy = y - y0;

        let n00 = gradient(self.corner(xi, yi), fx, fy);
        let n10 = gradient(self.corner(xi + 1, yi), fx - 1.0, fy);
        let n01 = gradient(self.corner(xi, yi + 1), fx, fy - 1.0);
        let n11 = gradient(self.corner(xi + 1, yi + 1), fx - 1.0, fy - 1.0);

        let u = fade(fx);
        let v = fade(fy);

        let nx0 = lerp(n00, n10, u);
        let nx1 = lerp(n01, n11, u);
        lerp(nx0, nx1, v).clamp(-1.0, 1.0)
    }

    /// Multi-octave fractal noise, normalized back to [-1, 1].
    pub fn fractal(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves.max(1) {
            total += self.noise(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        (total / max_amplitude).clamp(-1.0, 1.0)
    }
}

/// Quintic fade curve 6t^5 - 15t^4 + 10t^3; zero first and second
/// derivative at the endpoints, which keeps lattice seams invisible.
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Dot the offset vector with one of 8 gradient directions selected by the
/// corner hash's low 3 bits.
fn gradient(hash: u8, x: f64, y: f64) -> f64 {
    let h = hash & 7;
    let u = if h < 4 { x } else { y };
    let v = if h < 4 { y } else { x };
    let u = if h & 1 != 0 { -u } else { u };
    let v = if h & 2 != 0 { -2.0 * v } else { 2.0 * v };
    u + v
}

/// Ridged transform: sign-preserving power compression that sharpens the
/// noise into ridge lines and steep valleys.
pub fn ridged(value: f64, exponent: f64) -> f64 {
    value.signum() * value.abs().powf(exponent)
}
