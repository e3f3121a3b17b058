//! External magnetic field constraints
//!
//! Both fields act on the dipole moment only: they produce a torque, never a
//! linear force. Particles without rotational degrees of freedom or without a
//! dipole get a zero contribution.

use glam::DVec3;
use particle_physics::{ObservableStat, Particle, ParticleForce};

use crate::constraint::{has_magnetic_dof, Constraint};
use crate::context::ForceContext;

/// Spatially uniform field oscillating in time: H(t) = H0 sin(ωt)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AlternatingMagneticField {
    amplitude: DVec3,
    frequency: f64,
}

impl AlternatingMagneticField {
    pub fn new(amplitude: DVec3, frequency: f64) -> Self {
        Self {
            amplitude,
            frequency,
        }
    }

    pub fn h0(&self) -> DVec3 {
        self.amplitude
    }

    pub fn set_h0(&mut self, amplitude: DVec3) {
        self.amplitude = amplitude;
    }

    /// Angular frequency ω
    pub fn omega(&self) -> f64 {
        self.frequency
    }

    pub fn set_omega(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Field at time `t`
    pub fn field_at(&self, t: f64) -> DVec3 {
        self.amplitude * (self.frequency * t).sin()
    }
}

impl Constraint for AlternatingMagneticField {
    fn force(
        &mut self,
        p: &Particle,
        _folded_pos: DVec3,
        time: f64,
        _ctx: &mut ForceContext<'_>,
    ) -> ParticleForce {
        if !has_magnetic_dof(p) {
            return ParticleForce::ZERO;
        }
        ParticleForce::from_torque(p.dipole().cross(self.field_at(time)))
    }

    fn add_energy(
        &self,
        p: &Particle,
        _folded_pos: DVec3,
        time: f64,
        _ctx: &mut ForceContext<'_>,
        stats: &mut ObservableStat,
    ) {
        if p.has_dipole() {
            stats.dipolar_mut()[0] += -self.field_at(time).dot(p.dipole());
        }
    }

    fn fits_in_box(&self, _box_l: DVec3) -> bool {
        true
    }
}

/// Barnett field: a rotating magnetic body feels an effective field
/// H = −ω/γ along its lab-frame angular velocity.
///
/// `gamma` must be non-zero; the parameter layer rejects zero before a
/// value reaches this type.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BarnettField {
    gamma: f64,
}

impl BarnettField {
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn set_gamma(&mut self, gamma: f64) {
        self.gamma = gamma;
    }

    /// Effective field seen by `p`
    pub fn field_on(&self, p: &Particle) -> DVec3 {
        -p.omega_lab() / self.gamma
    }
}

impl Constraint for BarnettField {
    fn force(
        &mut self,
        p: &Particle,
        _folded_pos: DVec3,
        _time: f64,
        _ctx: &mut ForceContext<'_>,
    ) -> ParticleForce {
        if !has_magnetic_dof(p) {
            return ParticleForce::ZERO;
        }
        ParticleForce::from_torque(p.dipole().cross(self.field_on(p)))
    }

    fn add_energy(
        &self,
        p: &Particle,
        _folded_pos: DVec3,
        _time: f64,
        _ctx: &mut ForceContext<'_>,
        stats: &mut ObservableStat,
    ) {
        if p.has_dipole() {
            stats.dipolar_mut()[0] += p.omega_lab().dot(p.dipole()) / self.gamma;
        }
    }

    /// The relativistic dissipation of the Barnett effect is not modelled;
    /// this contributes nothing.
    fn add_magnetic_losses(
        &self,
        _p: &Particle,
        _folded_pos: DVec3,
        _time: f64,
        _stats: &mut ObservableStat,
    ) {
    }

    fn fits_in_box(&self, _box_l: DVec3) -> bool {
        true
    }
}
