//! Rigid boundary interacting with particles through a short-range pair potential
//!
//! The boundary behaves like an extra "virtual particle" whose type selects
//! the pair parameters. Per step it accumulates the total force the particles
//! exert on it; those worker-local totals are only combined across workers
//! on demand, through the collective queries.

use glam::DVec3;
use particle_physics::{
    calc_opposing_force, IaParams, ObservableStat, Particle, ParticleForce,
};

use crate::constraint::Constraint;
use crate::context::ForceContext;
use crate::errors::ConstraintError;
use crate::reduction::{Communicator, ReduceOp};
use crate::shapes::Shape;

/// How a particle at signed distance `d` couples to the boundary
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Contact {
    /// Evaluate the pair kernel at this separation
    Interact(f64),
    /// No contribution, and no error
    Ignore,
    /// The particle crossed an impenetrable boundary
    Violation,
}

pub struct ShapeBasedConstraint {
    shape: Box<dyn Shape>,
    part_rep: Particle,
    penetrable: bool,
    only_positive: bool,
    local_force: DVec3,
    outer_normal_force: f64,
}

impl ShapeBasedConstraint {
    /// Impenetrable boundary whose pair parameters are those of `particle_type`
    pub fn new(shape: impl Shape + 'static, particle_type: i32) -> Self {
        Self {
            shape: Box::new(shape),
            part_rep: Particle::new(-1, particle_type, DVec3::ZERO),
            penetrable: false,
            only_positive: false,
            local_force: DVec3::ZERO,
            outer_normal_force: 0.0,
        }
    }

    pub fn penetrable(mut self, penetrable: bool) -> Self {
        self.penetrable = penetrable;
        self
    }

    pub fn only_positive(mut self, only_positive: bool) -> Self {
        self.only_positive = only_positive;
        self
    }

    /// Velocity of the boundary, seen by the dissipative pair force
    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.part_rep.velocity = velocity.to_array();
        self
    }

    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }

    pub fn particle_type(&self) -> i32 {
        self.part_rep.particle_type
    }

    pub fn set_particle_type(&mut self, particle_type: i32) {
        self.part_rep.particle_type = particle_type;
    }

    pub fn is_penetrable(&self) -> bool {
        self.penetrable
    }

    pub fn set_penetrable(&mut self, penetrable: bool) {
        self.penetrable = penetrable;
    }

    pub fn is_only_positive(&self) -> bool {
        self.only_positive
    }

    pub fn set_only_positive(&mut self, only_positive: bool) {
        self.only_positive = only_positive;
    }

    /// Torque accumulated on the boundary during the current step
    pub fn rep_torque(&self) -> DVec3 {
        self.part_rep.torque()
    }

    /// Force exerted on the boundary by this worker's particles
    pub fn local_force(&self) -> DVec3 {
        self.local_force
    }

    /// Outward-normal force on the boundary from this worker's particles
    pub fn local_normal_force(&self) -> f64 {
        self.outer_normal_force
    }

    /// Classify signed distance `dist` under the penetration policy.
    ///
    /// Only `dist > 0` counts as outside; a particle exactly on the boundary
    /// of an impenetrable shape is a violation.
    pub fn contact(&self, dist: f64) -> Contact {
        if dist > 0.0 {
            Contact::Interact(dist)
        } else if self.penetrable {
            if !self.only_positive && dist < 0.0 {
                Contact::Interact(-dist)
            } else {
                Contact::Ignore
            }
        } else {
            Contact::Violation
        }
    }

    fn pair_params<'a>(&self, p: &Particle, ctx: &ForceContext<'a>) -> Option<&'a IaParams> {
        let interactions = ctx.interactions;
        interactions
            .get(p.particle_type, self.part_rep.particle_type)
            .filter(|ia| ia.interacts())
    }

    /// Sum of the boundary force over all workers (collective)
    pub fn total_force(&self, comm: &dyn Communicator) -> DVec3 {
        comm.all_reduce_vec3(self.local_force, ReduceOp::Sum)
    }

    /// Sum of the outward-normal force over all workers (collective)
    pub fn total_normal_force(&self, comm: &dyn Communicator) -> f64 {
        comm.all_reduce_sum(self.outer_normal_force)
    }

    /// Smallest signed distance of any interacting particle to the boundary,
    /// over all workers (collective). `+inf` when no particle interacts.
    pub fn min_dist(
        &self,
        particles: &[Particle],
        ctx: &ForceContext<'_>,
        comm: &dyn Communicator,
    ) -> f64 {
        let local = particles
            .iter()
            .filter(|p| self.pair_params(p, ctx).is_some())
            .map(|p| {
                let folded = ctx.box_geo.fold_position(p.position());
                self.shape.calculate_dist(folded).0
            })
            .fold(f64::INFINITY, f64::min);
        comm.all_reduce_min(local)
    }
}

impl Constraint for ShapeBasedConstraint {
    fn force(
        &mut self,
        p: &Particle,
        folded_pos: DVec3,
        _time: f64,
        ctx: &mut ForceContext<'_>,
    ) -> ParticleForce {
        let Some(ia) = self.pair_params(p, ctx) else {
            return ParticleForce::ZERO;
        };
        let (dist, dist_vec) = self.shape.calculate_dist(folded_pos);

        let mut pf = ParticleForce::ZERO;
        let mut dpd_force = DVec3::ZERO;
        let mut outer_normal = DVec3::ZERO;

        match self.contact(dist) {
            Contact::Interact(sep) => {
                if dist > 0.0 {
                    outer_normal = -dist_vec / dist;
                }
                pf = ctx.kernel.pair_force(p, &self.part_rep, ia, dist_vec, sep);
                if let Some(thermostat) = ctx.thermostat.as_deref_mut() {
                    dpd_force = thermostat.pair_force(p, &self.part_rep, ia, dist_vec, sep);
                    // Each evaluation consumes one unit of the noise stream
                    thermostat.rng_increment();
                }
            }
            Contact::Ignore => {}
            Contact::Violation => ctx.errors.report(ConstraintError::Violated {
                particle_id: p.id,
                distance: dist,
            }),
        }

        if p.has_rotation() {
            self.part_rep
                .add_torque(calc_opposing_force(&pf, dist_vec).torque);
        }
        pf.force += dpd_force;
        self.local_force -= pf.force;
        self.outer_normal_force -= outer_normal.dot(pf.force);
        pf
    }

    fn add_energy(
        &self,
        p: &Particle,
        folded_pos: DVec3,
        _time: f64,
        ctx: &mut ForceContext<'_>,
        stats: &mut ObservableStat,
    ) {
        let mut energy = 0.0;
        if let Some(ia) = self.pair_params(p, ctx) {
            let (dist, vec) = self.shape.calculate_dist(folded_pos);
            match self.contact(dist) {
                Contact::Interact(sep) => {
                    energy = ctx.kernel.pair_energy(p, &self.part_rep, ia, vec, sep);
                }
                Contact::Ignore => {}
                Contact::Violation => ctx.errors.report(ConstraintError::Violated {
                    particle_id: p.id,
                    distance: dist,
                }),
            }
        }

        if let (Ok(t1), Ok(t2)) = (
            usize::try_from(p.particle_type),
            usize::try_from(self.part_rep.particle_type),
        ) {
            stats.add_non_bonded_contribution(t1, t2, energy);
        }
    }

    fn fits_in_box(&self, box_l: DVec3) -> bool {
        self.shape.fits_in_box(box_l)
    }

    fn reset_force(&mut self) {
        self.local_force = DVec3::ZERO;
        self.outer_normal_force = 0.0;
        self.part_rep.reset_force();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RuntimeErrors;
    use crate::reduction::SingleProcess;
    use crate::shapes::Wall;
    use approx::assert_abs_diff_eq;
    use particle_physics::{
        BoxGeometry, DpdParams, DpdThermostat, InteractionTable, NonBondedKernel, PairKernel,
        Wca,
    };

    /// Unit-strength kernel: force = d̂, energy = separation
    struct UnitKernel;

    impl PairKernel for UnitKernel {
        fn pair_force(
            &self,
            _p1: &Particle,
            _p2: &Particle,
            _ia: &IaParams,
            d: DVec3,
            _dist: f64,
        ) -> ParticleForce {
            ParticleForce::from_force(d.normalize_or_zero())
        }

        fn pair_energy(
            &self,
            _p1: &Particle,
            _p2: &Particle,
            _ia: &IaParams,
            _d: DVec3,
            dist: f64,
        ) -> f64 {
            dist
        }
    }

    const WALL_TYPE: i32 = 1;

    fn table() -> InteractionTable {
        let mut table = InteractionTable::new(2);
        table.set(0, WALL_TYPE as usize, IaParams::wca(Wca::new(1.0, 1.0)));
        table
    }

    fn floor() -> Wall {
        Wall::new(DVec3::Z, 0.0)
    }

    #[test]
    fn test_contact_policy_matrix() {
        use Contact::*;
        let cases = [
            // (d, penetrable, only_positive, expected)
            (1.0, false, false, Interact(1.0)),
            (1.0, false, true, Interact(1.0)),
            (1.0, true, false, Interact(1.0)),
            (1.0, true, true, Interact(1.0)),
            (-1.0, false, false, Violation),
            (-1.0, false, true, Violation),
            (-1.0, true, false, Interact(1.0)),
            (-1.0, true, true, Ignore),
            (0.0, false, false, Violation),
            (0.0, false, true, Violation),
            (0.0, true, false, Ignore),
            (0.0, true, true, Ignore),
        ];
        for (d, penetrable, only_positive, expected) in cases {
            let c = ShapeBasedConstraint::new(floor(), WALL_TYPE)
                .penetrable(penetrable)
                .only_positive(only_positive);
            assert_eq!(
                c.contact(d),
                expected,
                "d={d} penetrable={penetrable} only_positive={only_positive}"
            );
        }
    }

    #[test]
    fn test_force_matrix_with_violation_reports() {
        let box_geo = BoxGeometry::cubic(10.0).with_periodicity([true, true, false]);
        let table = table();
        let kernel = UnitKernel;

        for (d, penetrable, only_positive, force_z, violation) in [
            (1.0, false, false, 1.0, false),
            (1.0, true, true, 1.0, false),
            (-1.0, false, false, 0.0, true),
            (-1.0, false, true, 0.0, true),
            (-1.0, true, false, -1.0, false),
            (-1.0, true, true, 0.0, false),
            (0.0, false, false, 0.0, true),
            (0.0, true, false, 0.0, false),
        ] {
            let mut errors = RuntimeErrors::new();
            let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);
            let mut c = ShapeBasedConstraint::new(floor(), WALL_TYPE)
                .penetrable(penetrable)
                .only_positive(only_positive);
            let p = Particle::new(11, 0, DVec3::new(1.0, 1.0, d));

            let pf = c.force(&p, p.position(), 0.0, &mut ctx);
            assert_eq!(pf.force, DVec3::new(0.0, 0.0, force_z), "d={d}");
            assert_eq!(c.local_force(), -pf.force);
            assert_eq!(errors.len(), usize::from(violation), "d={d}");
            if violation {
                assert_eq!(
                    errors.drain()[0],
                    ConstraintError::Violated {
                        particle_id: 11,
                        distance: d
                    }
                );
            }
        }
    }

    #[test]
    fn test_non_interacting_pair_contributes_nothing() {
        let box_geo = BoxGeometry::cubic(10.0);
        let table = table();
        let kernel = UnitKernel;
        let mut errors = RuntimeErrors::new();
        let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);

        // Type 1 does not interact with the wall type, even when violating
        let mut c = ShapeBasedConstraint::new(floor(), WALL_TYPE);
        let p = Particle::new(0, 1, DVec3::new(1.0, 1.0, -2.0));
        assert_eq!(c.force(&p, p.position(), 0.0, &mut ctx), ParticleForce::ZERO);
        assert!(ctx.errors.is_empty());
    }

    #[test]
    fn test_normal_force_and_reset() {
        let box_geo = BoxGeometry::cubic(10.0);
        let table = table();
        let kernel = NonBondedKernel::new();
        let mut errors = RuntimeErrors::new();
        let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);

        let mut c = ShapeBasedConstraint::new(floor(), WALL_TYPE);
        let p = Particle::new(0, 0, DVec3::new(2.0, 3.0, 0.9));
        let pf = c.force(&p, p.position(), 0.0, &mut ctx);
        assert!(pf.force.z > 0.0);

        assert_eq!(c.local_force(), -pf.force);
        assert_abs_diff_eq!(c.local_normal_force(), pf.force.z, epsilon = 1e-12);
        assert_eq!(c.total_force(&SingleProcess), -pf.force);
        assert_abs_diff_eq!(c.total_normal_force(&SingleProcess), pf.force.z, epsilon = 1e-12);

        c.reset_force();
        assert_eq!(c.local_force(), DVec3::ZERO);
        assert_eq!(c.local_normal_force(), 0.0);
    }

    #[test]
    fn test_radial_force_leaves_boundary_untorqued() {
        let box_geo = BoxGeometry::cubic(10.0);
        let table = table();
        let kernel = UnitKernel;
        let mut errors = RuntimeErrors::new();
        let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);

        let mut c = ShapeBasedConstraint::new(floor(), WALL_TYPE);
        let plain = Particle::new(0, 0, DVec3::new(1.0, 1.0, 0.5));
        c.force(&plain, plain.position(), 0.0, &mut ctx);
        assert_eq!(c.rep_torque(), DVec3::ZERO);

        // Force parallel to the separation: the opposing torque vanishes
        let rotating = plain.with_rotation();
        c.force(&rotating, rotating.position(), 0.0, &mut ctx);
        assert_eq!(c.rep_torque(), DVec3::ZERO);
    }

    /// Sideways force with a spin, independent of the separation
    struct ShearKernel;

    impl PairKernel for ShearKernel {
        fn pair_force(
            &self,
            _p1: &Particle,
            _p2: &Particle,
            _ia: &IaParams,
            _d: DVec3,
            _dist: f64,
        ) -> ParticleForce {
            ParticleForce {
                force: DVec3::X,
                torque: DVec3::new(0.0, 0.0, 2.0),
            }
        }

        fn pair_energy(
            &self,
            _p1: &Particle,
            _p2: &Particle,
            _ia: &IaParams,
            _d: DVec3,
            _dist: f64,
        ) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_opposing_torque_accumulates_on_boundary() {
        let box_geo = BoxGeometry::cubic(10.0).with_periodicity([true, true, false]);
        let table = table();
        let kernel = ShearKernel;
        let mut errors = RuntimeErrors::new();
        let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);

        let wall = crate::constraint::shared(ShapeBasedConstraint::new(floor(), WALL_TYPE));
        let mut p = Particle::new(0, 0, DVec3::new(1.0, 1.0, 0.5)).with_rotation();
        let pf = wall.borrow_mut().force(&p, p.position(), 0.0, &mut ctx);
        // The particle keeps its own torque, the boundary gets the opposite
        assert_eq!(pf.torque, DVec3::new(0.0, 0.0, 2.0));
        let d = DVec3::new(0.0, 0.0, 0.5);
        let expected = -(pf.torque + d.cross(pf.force));
        assert_eq!(expected, DVec3::new(0.0, -0.5, -2.0));
        assert_eq!(wall.borrow().rep_torque(), expected);

        wall.borrow_mut().force(&p, p.position(), 0.0, &mut ctx);
        assert_eq!(wall.borrow().rep_torque(), expected * 2.0);

        // A new force pass starts from a clean accumulator. The particle now
        // violates the wall, so nothing is added back.
        let mut set = crate::set::ConstraintSet::default();
        set.add(wall.clone());
        p.position[2] = -0.5;
        let mut ps = [p];
        set.add_forces(&mut ps, 0.0, &mut ctx);
        assert_eq!(ctx.errors.len(), 1);
        assert_eq!(wall.borrow().rep_torque(), DVec3::ZERO);
        assert_eq!(wall.borrow().local_force(), DVec3::ZERO);
    }

    #[test]
    fn test_dissipative_coupling_consumes_stream() {
        let box_geo = BoxGeometry::cubic(10.0);
        let mut table = InteractionTable::new(2);
        table.set(
            0,
            WALL_TYPE as usize,
            IaParams::default().with_dpd(DpdParams::new(2.0, 1.0)),
        );
        let kernel = NonBondedKernel::new();
        let mut errors = RuntimeErrors::new();
        let mut thermostat = DpdThermostat::new(0.0, 0.01, 5);
        let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors)
            .with_thermostat(&mut thermostat);
        assert!(ctx.thermostat_active());

        let mut c = ShapeBasedConstraint::new(floor(), WALL_TYPE);
        // Moving towards the wall at unit speed, half a cutoff away
        let p = Particle::new(0, 0, DVec3::new(1.0, 1.0, 0.5)).with_velocity(-DVec3::Z);
        let pf = c.force(&p, p.position(), 0.0, &mut ctx);
        // γ w² v = 2 · 0.25 · 1, pushing back out
        assert_abs_diff_eq!(pf.force.z, 0.5, epsilon = 1e-12);
        drop(ctx);
        assert_eq!(thermostat.counter(), 1);
    }

    #[test]
    fn test_mirrored_coupling_consumes_stream() {
        let box_geo = BoxGeometry::cubic(10.0).with_periodicity([true, true, false]);
        let mut table = InteractionTable::new(2);
        table.set(
            0,
            WALL_TYPE as usize,
            IaParams::default().with_dpd(DpdParams::new(2.0, 1.0)),
        );
        let kernel = NonBondedKernel::new();
        let mut errors = RuntimeErrors::new();
        let mut thermostat = DpdThermostat::new(0.0, 0.01, 5);
        let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors)
            .with_thermostat(&mut thermostat);

        let mut c = ShapeBasedConstraint::new(floor(), WALL_TYPE)
            .penetrable(true)
            .only_positive(false);
        let inside = Particle::new(0, 0, DVec3::new(1.0, 1.0, -0.5));
        c.force(&inside, inside.position(), 0.0, &mut ctx);
        assert!(ctx.errors.is_empty());

        // Exactly on a penetrable boundary: no kernel, no draw
        let on = Particle::new(1, 0, DVec3::new(1.0, 1.0, 0.0));
        assert_eq!(c.force(&on, on.position(), 0.0, &mut ctx), ParticleForce::ZERO);
        drop(ctx);
        assert_eq!(thermostat.counter(), 1);
    }

    #[test]
    fn test_energy_goes_to_type_pair() {
        let box_geo = BoxGeometry::cubic(10.0);
        let table = table();
        let kernel = UnitKernel;
        let mut errors = RuntimeErrors::new();
        let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);

        let c = ShapeBasedConstraint::new(floor(), WALL_TYPE)
            .penetrable(true)
            .only_positive(false);
        let mut stats = ObservableStat::new(2);
        let above = Particle::new(0, 0, DVec3::new(1.0, 1.0, 0.75));
        let below = Particle::new(1, 0, DVec3::new(1.0, 1.0, -0.25));
        c.add_energy(&above, above.position(), 0.0, &mut ctx, &mut stats);
        c.add_energy(&below, below.position(), 0.0, &mut ctx, &mut stats);
        assert_eq!(stats.non_bonded(0, WALL_TYPE as usize), 1.0);
        assert_eq!(stats.total_dipolar(), 0.0);
    }

    #[test]
    fn test_energy_violation_is_reported() {
        let box_geo = BoxGeometry::cubic(10.0);
        let table = table();
        let kernel = UnitKernel;
        let mut errors = RuntimeErrors::new();
        let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);

        let c = ShapeBasedConstraint::new(floor(), WALL_TYPE);
        let mut stats = ObservableStat::new(2);
        let p = Particle::new(4, 0, DVec3::new(1.0, 1.0, -0.25));
        c.add_energy(&p, p.position(), 0.0, &mut ctx, &mut stats);
        assert_eq!(stats.accumulate(), 0.0);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_min_dist_single_worker() {
        let box_geo = BoxGeometry::cubic(10.0).with_periodicity([true, true, false]);
        let table = table();
        let kernel = UnitKernel;
        let mut errors = RuntimeErrors::new();
        let ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);

        let c = ShapeBasedConstraint::new(floor(), WALL_TYPE);
        let particles = [
            Particle::new(0, 0, DVec3::new(1.0, 1.0, 3.0)),
            Particle::new(1, 0, DVec3::new(12.0, -4.0, 0.7)),
            // Closer, but does not interact with the wall
            Particle::new(2, 1, DVec3::new(1.0, 1.0, 0.1)),
        ];
        assert_eq!(c.min_dist(&particles, &ctx, &SingleProcess), 0.7);
        assert_eq!(
            c.min_dist(&particles[2..], &ctx, &SingleProcess),
            f64::INFINITY
        );
    }
}
