//! Numerical constants shared by the pair kernels and the thermostat
//!
//! Values are in reduced (Lennard-Jones) units.

/// Cutoff value marking a pair interaction as switched off
pub const INACTIVE_CUTOFF: f64 = -1.0;

/// WCA cutoff in units of sigma: 2^(1/6)
pub const WCA_CUTOFF_FACTOR: f64 = 1.122_462_048_309_373;

/// Energy shift of the WCA potential in units of 4·epsilon
pub const WCA_SHIFT: f64 = 0.25;

/// Number of dipolar energy slots (real space and k-space)
pub const DIPOLAR_SLOTS: usize = 2;

/// Variance normalisation for uniform noise in [-0.5, 0.5): sigma² = 24 kT gamma / dt
pub const UNIFORM_NOISE_FACTOR: f64 = 24.0;
