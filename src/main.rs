//! Magnetic Particle Slab Simulation
//!
//! Dipolar particles between two repulsive walls, driven by an alternating
//! magnetic field and the Barnett field, run on in-process worker threads.

mod params;
mod worker;

use std::process::ExitCode;
use std::thread;

use glam::DVec3;
use params::SimulationParams;
use particle_constraints::{Communicator, LocalGroup};
use particle_physics::Particle;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use worker::{run_worker, WorkerReport, SOLVENT_TYPE};

/// Gap kept free next to each wall when placing particles
const WALL_MARGIN: f64 = 1.0;

/// Place particles uniformly in the slab with random orientations and
/// thermal velocities. Deterministic for a given seed.
fn initialize_particles(params: &SimulationParams) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let l = params.box_length;
    let slab = (l - 2.0 * WALL_MARGIN).max(0.0);
    // Uniform in [-0.5, 0.5) has variance 1/12
    let thermal = (12.0 * params.kt).sqrt();

    let particles: Vec<Particle> = (0..params.particle_count)
        .map(|i| {
            let pos = DVec3::new(
                rng.random::<f64>() * l,
                rng.random::<f64>() * l,
                WALL_MARGIN + rng.random::<f64>() * slab,
            );
            let velocity = DVec3::new(
                rng.random::<f64>() - 0.5,
                rng.random::<f64>() - 0.5,
                rng.random::<f64>() - 0.5,
            ) * thermal;
            let direction = random_unit_vector(&mut rng);

            Particle::new(i as i32, SOLVENT_TYPE as i32, pos)
                .with_velocity(velocity)
                .with_rotation()
                .with_dipole(direction)
        })
        .collect();

    log::info!("✓ Initialized {} particles", particles.len());
    log::info!(
        "  Particle struct size: {} bytes",
        std::mem::size_of::<Particle>()
    );
    particles
}

fn random_unit_vector(rng: &mut StdRng) -> DVec3 {
    let theta = rng.random::<f64>() * std::f64::consts::TAU;
    let cos_phi = rng.random::<f64>() * 2.0 - 1.0;
    let sin_phi = (1.0 - cos_phi * cos_phi).sqrt();
    DVec3::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
}

/// Round-robin share of `rank` among `workers`
fn partition(particles: &[Particle], rank: usize, workers: usize) -> Vec<Particle> {
    particles
        .iter()
        .skip(rank)
        .step_by(workers.max(1))
        .copied()
        .collect()
}

fn main() -> ExitCode {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let params = SimulationParams::from_env();
    log::info!("Starting magnetic slab simulation...");
    log::info!(
        "  {} particles, box {}, {} steps of {}, {} workers",
        params.particle_count,
        params.box_length,
        params.steps,
        params.time_step,
        params.workers
    );

    let particles = initialize_particles(&params);

    let handles: Vec<_> = LocalGroup::create(params.workers)
        .into_iter()
        .map(|comm| {
            let local = partition(&particles, comm.rank(), params.workers);
            let params = params.clone();
            thread::spawn(move || run_worker(&comm, local, &params))
        })
        .collect();

    let mut reports: Vec<WorkerReport> = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.join() {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(e)) => {
                log::error!("Invalid configuration: {e}");
                return ExitCode::FAILURE;
            }
            Err(_) => {
                log::error!("A worker thread panicked");
                return ExitCode::FAILURE;
            }
        }
    }

    for r in &reports {
        log::info!("  rank {}: {} particles", r.rank, r.local_particles);
    }
    if let Some(r) = reports.first() {
        log::info!(
            "Done: E={:.6}, floor force {}, ceiling normal force {:.4}, min floor distance {:.4}, {} violations",
            r.energy,
            r.floor_force,
            r.ceiling_normal_force,
            r.min_floor_dist,
            r.violations
        );
    }
    ExitCode::SUCCESS
}
