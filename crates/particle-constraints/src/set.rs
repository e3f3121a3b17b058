//! Ordered collections of constraints applied to the local particles
//!
//! Constraints are applied in insertion order. Every worker must hold the
//! same constraints in the same order for the per-worker results to be
//! consistent.

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec3;
use particle_physics::{BoxGeometry, ObservableStat, Particle, ParticleForce};

use crate::constraint::{Constraint, MagneticConstraint};
use crate::context::ForceContext;

/// Insertion-ordered list of shared constraint handles.
///
/// Every structural change (add, remove, clear) fires the notification
/// passed at construction, synchronously.
pub struct ConstraintList<C: ?Sized> {
    constraints: Vec<Rc<RefCell<C>>>,
    on_change: Box<dyn FnMut()>,
}

pub type ConstraintSet = ConstraintList<dyn Constraint>;
pub type MagneticConstraintSet = ConstraintList<dyn MagneticConstraint>;

impl<C: ?Sized> Default for ConstraintList<C> {
    fn default() -> Self {
        Self::new(|| {})
    }
}

impl<C: ?Sized> ConstraintList<C> {
    pub fn new(on_change: impl FnMut() + 'static) -> Self {
        Self {
            constraints: Vec::new(),
            on_change: Box::new(on_change),
        }
    }

    /// Append a constraint. Adding the same handle twice is a caller bug.
    pub fn add(&mut self, constraint: Rc<RefCell<C>>) {
        debug_assert!(
            !self.contains(&constraint),
            "constraint is already in this set"
        );
        self.constraints.push(constraint);
        log::debug!("Added constraint, {} in set", self.constraints.len());
        (self.on_change)();
    }

    /// Remove the constraint behind `constraint`, which may be a concrete
    /// handle to the same allocation. Removing an absent constraint is a
    /// caller bug.
    pub fn remove<T: ?Sized>(&mut self, constraint: &Rc<RefCell<T>>) {
        debug_assert!(self.contains(constraint), "constraint is not in this set");
        self.constraints
            .retain(|c| !std::ptr::addr_eq(Rc::as_ptr(c), Rc::as_ptr(constraint)));
        log::debug!("Removed constraint, {} in set", self.constraints.len());
        (self.on_change)();
    }

    pub fn clear(&mut self) {
        self.constraints.clear();
        log::debug!("Cleared constraint set");
        (self.on_change)();
    }

    pub fn contains<T: ?Sized>(&self, constraint: &Rc<RefCell<T>>) -> bool {
        self.constraints
            .iter()
            .any(|c| std::ptr::addr_eq(Rc::as_ptr(c), Rc::as_ptr(constraint)))
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<RefCell<C>>> {
        self.constraints.iter()
    }
}

impl<C: ?Sized + Constraint> ConstraintList<C> {
    /// Clear the per-step accumulators of every constraint
    pub fn reset_forces(&self) {
        for c in &self.constraints {
            c.borrow_mut().reset_force();
        }
    }

    /// Add the energy of every particle from every constraint into `stats`
    pub fn add_energy(
        &self,
        particles: &[Particle],
        time: f64,
        ctx: &mut ForceContext<'_>,
        stats: &mut ObservableStat,
    ) {
        for p in particles {
            let folded = ctx.box_geo.fold_position(p.position());
            for c in &self.constraints {
                c.borrow().add_energy(p, folded, time, ctx, stats);
            }
        }
    }

    pub fn add_magnetic_losses(
        &self,
        particles: &[Particle],
        time: f64,
        box_geo: &BoxGeometry,
        stats: &mut ObservableStat,
    ) {
        for p in particles {
            let folded = box_geo.fold_position(p.position());
            for c in &self.constraints {
                c.borrow().add_magnetic_losses(p, folded, time, stats);
            }
        }
    }

    /// Whether every constraint is well defined in a box of edge lengths `box_l`
    pub fn fits_in_box(&self, box_l: DVec3) -> bool {
        self.constraints.iter().all(|c| c.borrow().fits_in_box(box_l))
    }
}

impl ConstraintList<dyn Constraint> {
    /// Apply every constraint to every particle. Each particle's force and
    /// torque are written exactly once, with the sum over all constraints.
    pub fn add_forces(&self, particles: &mut [Particle], time: f64, ctx: &mut ForceContext<'_>) {
        if self.constraints.is_empty() {
            return;
        }
        self.reset_forces();

        for p in particles.iter_mut() {
            let folded = ctx.box_geo.fold_position(p.position());
            let mut total = ParticleForce::ZERO;
            for c in &self.constraints {
                total += c.borrow_mut().force(p, folded, time, ctx);
            }
            p.add_force(total.force);
            p.add_torque(total.torque);
        }
    }
}

impl ConstraintList<dyn MagneticConstraint> {
    /// Grow the magnetic moment of every particle by the sum of all boosts.
    /// Each particle's boost is written exactly once.
    pub fn add_forces(&self, particles: &mut [Particle], time: f64, box_geo: &BoxGeometry) {
        if self.constraints.is_empty() {
            return;
        }
        self.reset_forces();

        for p in particles.iter_mut() {
            let folded = box_geo.fold_position(p.position());
            let boost: DVec3 = self
                .constraints
                .iter()
                .map(|c| c.borrow().dipole_boost(p, folded, time))
                .sum();
            p.add_dipole_boost(boost);
        }
    }
}
