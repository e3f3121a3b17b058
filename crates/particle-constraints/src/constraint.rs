//! Constraint capabilities and shared handles

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec3;
use particle_physics::{ObservableStat, Particle, ParticleForce};

use crate::context::ForceContext;

/// A source of force, torque and energy acting on single particles,
/// independent of particle-particle interactions.
///
/// Implementations read particle state and return a contribution; applying
/// it to the particle is the caller's job.
pub trait Constraint {
    /// Force and torque on `p` at `folded_pos` (position folded into the
    /// primary cell) and simulation time `time`
    fn force(
        &mut self,
        p: &Particle,
        folded_pos: DVec3,
        time: f64,
        ctx: &mut ForceContext<'_>,
    ) -> ParticleForce;

    /// Add the potential energy of `p` into its category of `stats`.
    /// Must be called once per particle and step.
    fn add_energy(
        &self,
        p: &Particle,
        folded_pos: DVec3,
        time: f64,
        ctx: &mut ForceContext<'_>,
        stats: &mut ObservableStat,
    );

    /// Dissipated magnetic energy; most constraints have none
    fn add_magnetic_losses(
        &self,
        _p: &Particle,
        _folded_pos: DVec3,
        _time: f64,
        _stats: &mut ObservableStat,
    ) {
    }

    /// Whether the constraint is well defined everywhere in a box of edge lengths `box_l`
    fn fits_in_box(&self, box_l: DVec3) -> bool;

    /// Clear per-step accumulators
    fn reset_force(&mut self) {}
}

/// A constraint that also changes the magnitude of a particle's magnetic
/// moment each step
pub trait MagneticConstraint: Constraint {
    /// Additive increment of the dipole moment of `p` for this step
    fn dipole_boost(&self, p: &Particle, folded_pos: DVec3, time: f64) -> DVec3;
}

pub type ConstraintHandle = Rc<RefCell<dyn Constraint>>;
pub type MagneticConstraintHandle = Rc<RefCell<dyn MagneticConstraint>>;

/// Wrap a constraint into a shared handle. The concrete handle coerces into
/// [`ConstraintHandle`] when added to a set, and stays usable for queries.
pub fn shared<C>(constraint: C) -> Rc<RefCell<C>> {
    Rc::new(RefCell::new(constraint))
}

/// Field models only act on particles that rotate and carry a dipole
pub(crate) fn has_magnetic_dof(p: &Particle) -> bool {
    p.has_rotation() && p.has_dipole()
}
