//! Energy and magnetic-loss observables built on the constraint sets
//!
//! Every function here ends in a collective reduction: all workers of the
//! group must call it together.

use std::cell::RefCell;

use particle_physics::{ObservableStat, Particle};

use crate::context::ForceContext;
use crate::reduction::{Communicator, ReduceOp};
use crate::set::{ConstraintSet, MagneticConstraintSet};
use crate::shape_based::ShapeBasedConstraint;

/// Sum `stats` over all workers, in place
pub fn reduce_stats(stats: &mut ObservableStat, comm: &dyn Communicator) {
    comm.all_reduce(stats.as_mut_slice(), ReduceOp::Sum);
}

/// Energy of the local particles in every constraint, summed over all workers
pub fn calculate_energy(
    constraints: &ConstraintSet,
    magnetic: &MagneticConstraintSet,
    particles: &[Particle],
    time: f64,
    ctx: &mut ForceContext<'_>,
    comm: &dyn Communicator,
) -> ObservableStat {
    let mut stats = ObservableStat::new(ctx.interactions.n_types());
    constraints.add_energy(particles, time, ctx, &mut stats);
    magnetic.add_energy(particles, time, ctx, &mut stats);
    reduce_stats(&mut stats, comm);
    log::debug!(
        "Constraint energy at t={time}: dipolar {} non-bonded {}",
        stats.total_dipolar(),
        stats.total_non_bonded()
    );
    stats
}

/// Dissipated magnetic energy of the local particles, summed over all workers
pub fn calculate_magnetic_losses(
    constraints: &ConstraintSet,
    particles: &[Particle],
    time: f64,
    ctx: &ForceContext<'_>,
    comm: &dyn Communicator,
) -> ObservableStat {
    let mut stats = ObservableStat::new(ctx.interactions.n_types());
    constraints.add_magnetic_losses(particles, time, ctx.box_geo, &mut stats);
    reduce_stats(&mut stats, comm);
    stats
}

/// Total dissipated magnetic energy over every category
pub fn observable_compute_magnetic_losses(
    constraints: &ConstraintSet,
    particles: &[Particle],
    time: f64,
    ctx: &ForceContext<'_>,
    comm: &dyn Communicator,
) -> f64 {
    calculate_magnetic_losses(constraints, particles, time, ctx, comm).accumulate()
}

/// A reduced quantity computed on demand
pub trait Observable {
    /// Dimensions of the flattened result
    fn shape(&self) -> Vec<usize>;

    /// Collective: every worker must evaluate together
    fn evaluate(&self, comm: &dyn Communicator) -> Vec<f64>;
}

pub struct MagneticLosses<'a, 'c> {
    pub constraints: &'a ConstraintSet,
    pub particles: &'a [Particle],
    pub time: f64,
    pub ctx: &'a ForceContext<'c>,
}

impl Observable for MagneticLosses<'_, '_> {
    fn shape(&self) -> Vec<usize> {
        vec![1]
    }

    fn evaluate(&self, comm: &dyn Communicator) -> Vec<f64> {
        vec![observable_compute_magnetic_losses(
            self.constraints,
            self.particles,
            self.time,
            self.ctx,
            comm,
        )]
    }
}

/// Total force the particles exert on one shape-based constraint
pub struct ConstraintForce<'a> {
    pub constraint: &'a RefCell<ShapeBasedConstraint>,
}

impl Observable for ConstraintForce<'_> {
    fn shape(&self) -> Vec<usize> {
        vec![3]
    }

    fn evaluate(&self, comm: &dyn Communicator) -> Vec<f64> {
        self.constraint.borrow().total_force(comm).to_array().to_vec()
    }
}
