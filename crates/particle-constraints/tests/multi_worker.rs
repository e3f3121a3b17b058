//! Collective queries of shape-based constraints across in-process workers

use std::thread;

use approx::assert_relative_eq;
use glam::DVec3;
use particle_constraints::{
    calculate_energy, shared, Communicator, ConstraintSet, ForceContext, LocalGroup,
    MagneticConstraintSet, RuntimeErrors, ShapeBasedConstraint, Wall,
};
use particle_physics::{BoxGeometry, IaParams, InteractionTable, NonBondedKernel, Particle, Wca};

const WALL_TYPE: usize = 1;

#[derive(Debug, Clone, Copy)]
struct Outcome {
    total_force: DVec3,
    total_normal_force: f64,
    min_dist: f64,
    errors: usize,
}

fn box_geo() -> BoxGeometry {
    BoxGeometry::cubic(10.0).with_periodicity([true, true, false])
}

fn table() -> InteractionTable {
    let mut table = InteractionTable::new(2);
    table.set(0, WALL_TYPE, IaParams::wca(Wca::new(1.0, 1.0)));
    table
}

/// Particles spread over the slab above the floor, some within range of it
fn slab(n: usize) -> Vec<Particle> {
    (0..n)
        .map(|i| {
            let f = i as f64;
            let pos = DVec3::new(
                (f * 2.3).rem_euclid(10.0),
                (f * 3.7).rem_euclid(10.0),
                0.4 + (f * 0.618_033_988_75).fract() * 1.2,
            );
            Particle::new(i as i32, 0, pos)
        })
        .collect()
}

/// Run one force step on `ranks` workers, particles dealt round-robin, and
/// return what every worker observed
fn run_partitioned(ranks: usize, particles: &[Particle]) -> Vec<Outcome> {
    let handles: Vec<_> = LocalGroup::create(ranks)
        .into_iter()
        .map(|comm| {
            let mut local: Vec<Particle> = particles
                .iter()
                .enumerate()
                .filter(|(i, _)| i % ranks == comm.rank())
                .map(|(_, p)| *p)
                .collect();
            thread::spawn(move || {
                let box_geo = box_geo();
                let table = table();
                let kernel = NonBondedKernel::new();
                let mut errors = RuntimeErrors::new();
                let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);

                let wall = shared(ShapeBasedConstraint::new(
                    Wall::new(DVec3::Z, 0.0),
                    WALL_TYPE as i32,
                ));
                let mut set = ConstraintSet::default();
                set.add(wall.clone());
                set.add_forces(&mut local, 0.0, &mut ctx);

                let wall = wall.borrow();
                let total_force = wall.total_force(&comm);
                let total_normal_force = wall.total_normal_force(&comm);
                let min_dist = wall.min_dist(&local, &ctx, &comm);
                drop(ctx);
                Outcome {
                    total_force,
                    total_normal_force,
                    min_dist,
                    errors: errors.count_all(&comm),
                }
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

#[test]
fn test_total_force_invariant_under_repartitioning() {
    let particles = slab(40);
    let single = run_partitioned(1, &particles)[0];
    assert!(single.total_force.z < 0.0, "particles push the floor down");
    assert!(single.total_normal_force > 0.0);

    for outcome in run_partitioned(3, &particles) {
        assert_relative_eq!(
            outcome.total_force.z,
            single.total_force.z,
            max_relative = 1e-12
        );
        assert_eq!(outcome.total_force.x, 0.0);
        assert_eq!(outcome.total_force.y, 0.0);
        assert_relative_eq!(
            outcome.total_normal_force,
            single.total_normal_force,
            max_relative = 1e-12
        );
        assert_eq!(outcome.min_dist, single.min_dist);
        assert_eq!(outcome.errors, 0);
    }
}

#[test]
fn test_normal_force_matches_force_on_flat_wall() {
    let particles = slab(12);
    for outcome in run_partitioned(2, &particles) {
        assert_relative_eq!(
            outcome.total_normal_force,
            -outcome.total_force.z,
            max_relative = 1e-12
        );
    }
}

#[test]
fn test_min_dist_with_empty_workers() {
    // Two particles on four workers: ranks 2 and 3 own nothing
    let particles = vec![
        Particle::new(0, 0, DVec3::new(1.0, 1.0, 2.5)),
        Particle::new(1, 0, DVec3::new(3.0, 4.0, 0.75)),
    ];
    let outcomes = run_partitioned(4, &particles);
    assert_eq!(outcomes.len(), 4);
    for outcome in outcomes {
        assert_eq!(outcome.min_dist, 0.75);
    }
}

#[test]
fn test_min_dist_without_interacting_particles() {
    let particles = vec![Particle::new(0, 1, DVec3::new(1.0, 1.0, 0.5))];
    for outcome in run_partitioned(2, &particles) {
        assert_eq!(outcome.min_dist, f64::INFINITY);
        assert_eq!(outcome.total_force, DVec3::ZERO);
    }
}

#[test]
fn test_violations_counted_over_all_workers() {
    let mut particles = slab(9);
    // One violating particle per worker
    for i in [0, 1, 2] {
        particles[i].position[2] = -0.1;
    }
    for outcome in run_partitioned(3, &particles) {
        assert_eq!(outcome.errors, 3);
        assert_relative_eq!(outcome.min_dist, -0.1);
    }
}

#[test]
fn test_energy_with_untyped_wall_and_empty_worker() {
    // The wall type has no row in the table; rank 1 owns no particle
    let handles: Vec<_> = LocalGroup::create(2)
        .into_iter()
        .map(|comm| {
            thread::spawn(move || {
                let box_geo = box_geo();
                let table = table();
                let kernel = NonBondedKernel::new();
                let mut errors = RuntimeErrors::new();
                let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);

                let mut constraints = ConstraintSet::default();
                constraints.add(shared(ShapeBasedConstraint::new(
                    Wall::new(DVec3::Z, 0.0),
                    3,
                )));
                constraints.add(shared(ShapeBasedConstraint::new(
                    Wall::new(DVec3::Z, 0.0),
                    WALL_TYPE as i32,
                )));
                let local = if comm.rank() == 0 {
                    vec![Particle::new(0, 0, DVec3::new(1.0, 1.0, 0.9))]
                } else {
                    Vec::new()
                };
                let stats = calculate_energy(
                    &constraints,
                    &MagneticConstraintSet::default(),
                    &local,
                    0.0,
                    &mut ctx,
                    &comm,
                );
                (stats.as_slice().len(), stats.non_bonded(0, WALL_TYPE))
            })
        })
        .collect();

    let outcomes: Vec<(usize, f64)> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wca = Wca::new(1.0, 1.0).as_lennard_jones();
    for (len, energy) in &outcomes {
        assert_eq!(*len, outcomes[0].0);
        assert_eq!(*energy, wca.energy(0.9));
    }
    assert!(outcomes[0].1 > 0.0);
}
