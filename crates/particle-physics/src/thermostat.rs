//! Dissipative particle dynamics (DPD) thermostat
//!
//! Noise is drawn from a counter-based stream: every draw is seeded from
//! (seed, counter, pair ids), so results depend only on the seed and on how
//! many times the stream has been advanced, not on thread or process layout.

use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::UNIFORM_NOISE_FACTOR;
use crate::interactions::IaParams;
use crate::particle::Particle;

#[derive(Clone, Debug, PartialEq)]
pub struct DpdThermostat {
    pub kt: f64,
    pub time_step: f64,
    seed: u64,
    counter: u64,
}

impl DpdThermostat {
    pub fn new(kt: f64, time_step: f64, seed: u64) -> Self {
        Self {
            kt,
            time_step,
            seed,
            counter: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of stream units consumed so far
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Advance the random stream by one unit
    pub fn rng_increment(&mut self) {
        self.counter += 1;
    }

    /// Uniform noise in [-0.5, 0.5) for the pair (id1, id2) at the current counter
    fn noise(&self, id1: i32, id2: i32) -> f64 {
        let (a, b) = if id1 <= id2 { (id1, id2) } else { (id2, id1) };
        let key = mix(mix(mix(self.seed) ^ self.counter) ^ (a as u32 as u64))
            ^ ((b as u32 as u64) << 32);
        let mut rng = StdRng::seed_from_u64(mix(key));
        rng.random::<f64>() - 0.5
    }

    /// Dissipative + random force on `p1` from `p2`.
    ///
    /// F = (−γ w² (r̂·v₁₂) + σ w ξ) r̂ with w = 1 − r/r_c and σ = sqrt(24 kT γ / dt).
    pub fn pair_force(
        &self,
        p1: &Particle,
        p2: &Particle,
        ia: &IaParams,
        d: DVec3,
        dist: f64,
    ) -> DVec3 {
        let Some(dpd) = ia.dpd.filter(|dpd| dpd.is_active()) else {
            return DVec3::ZERO;
        };
        if dist <= 0.0 || dist >= dpd.cutoff {
            return DVec3::ZERO;
        }

        let r_hat = d / d.length();
        let weight = 1.0 - dist / dpd.cutoff;
        let v12 = p1.velocity() - p2.velocity();
        let sigma = (UNIFORM_NOISE_FACTOR * self.kt * dpd.gamma / self.time_step).sqrt();

        let friction = -dpd.gamma * weight * weight * r_hat.dot(v12);
        let random = sigma * weight * self.noise(p1.id, p2.id);
        r_hat * (friction + random)
    }
}

// splitmix64 finaliser
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
