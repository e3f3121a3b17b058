//! Idealised magnetization dynamics: a fixed per-step growth of the magnetic moment

use glam::DVec3;
use particle_physics::{ObservableStat, Particle, ParticleForce};

use crate::constraint::{has_magnetic_dof, Constraint, MagneticConstraint};
use crate::context::ForceContext;

/// Adds `dm` to the magnetic moment of every dipolar particle each step.
///
/// Only add it to a [`MagneticConstraintSet`](crate::set::MagneticConstraintSet),
/// which reads the boost and never applies the placeholder from `force`. In a
/// plain constraint set the placeholder would act as a real torque.
///
/// The energy of the injected moment is not modelled.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MagnetizationDynamics {
    dm: DVec3,
}

impl MagnetizationDynamics {
    pub fn new(dm: DVec3) -> Self {
        Self { dm }
    }

    pub fn dm(&self) -> DVec3 {
        self.dm
    }

    pub fn set_dm(&mut self, dm: DVec3) {
        self.dm = dm;
    }
}

impl Constraint for MagnetizationDynamics {
    /// No physical force. The current dipole is reported in the torque slot
    /// as a placeholder; the real output is [`MagneticConstraint::dipole_boost`].
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
        ParticleForce::from_torque(p.dipole())
    }

    fn add_energy(
        &self,
        _p: &Particle,
        _folded_pos: DVec3,
        _time: f64,
        _ctx: &mut ForceContext<'_>,
        _stats: &mut ObservableStat,
    ) {
    }

    fn fits_in_box(&self, _box_l: DVec3) -> bool {
        true
    }
}

impl MagneticConstraint for MagnetizationDynamics {
    fn dipole_boost(&self, p: &Particle, _folded_pos: DVec3, _time: f64) -> DVec3 {
        if p.has_dipole() {
            self.dm
        } else {
            DVec3::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boost_is_configured_increment() {
        let md = MagnetizationDynamics::new(DVec3::new(0.0, 0.0, 0.1));
        let p = Particle::new(0, 0, DVec3::ZERO).with_dipole(DVec3::X);
        assert_eq!(md.dipole_boost(&p, DVec3::ZERO, 3.0), DVec3::new(0.0, 0.0, 0.1));
    }

    #[test]
    fn test_no_boost_without_dipole() {
        let md = MagnetizationDynamics::new(DVec3::ONE);
        let p = Particle::new(0, 0, DVec3::ZERO).with_rotation();
        assert_eq!(md.dipole_boost(&p, DVec3::ZERO, 0.0), DVec3::ZERO);
    }

    #[test]
    fn test_setter() {
        let mut md = MagnetizationDynamics::default();
        assert_eq!(md.dm(), DVec3::ZERO);
        md.set_dm(DVec3::Y);
        assert_eq!(md.dm(), DVec3::Y);
        assert!(md.fits_in_box(DVec3::ONE));
    }
}
