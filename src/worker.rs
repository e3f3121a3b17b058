//! Per-worker simulation loop
//!
//! Every worker runs the same loop over its own particle partition. The
//! observable reports are collective, so all workers reach them on the same
//! steps.

use glam::{DQuat, DVec3};
use particle_constraints::{
    calculate_energy, shared, AlternatingMagneticField, BarnettField, Communicator,
    ConstraintSet, ForceContext, MagneticConstraintSet, MagnetizationDynamics, ParamError,
    ParamValue, Parameterized, RuntimeErrors, ShapeBasedConstraint, Wall,
};
use particle_physics::{
    BoxGeometry, DpdParams, DpdThermostat, IaParams, InteractionTable, NonBondedKernel,
    Particle, Wca,
};

use crate::params::SimulationParams;

pub const SOLVENT_TYPE: usize = 0;
pub const WALL_TYPE: usize = 1;

/// Range of the dissipative wall coupling
const DPD_CUTOFF: f64 = 1.0;

/// What one worker observed at the last report
#[derive(Clone, Debug, PartialEq)]
pub struct WorkerReport {
    pub rank: usize,
    pub local_particles: usize,
    pub energy: f64,
    pub floor_force: DVec3,
    pub ceiling_normal_force: f64,
    pub min_floor_dist: f64,
    pub violations: usize,
}

/// Run the whole simulation on one worker
pub fn run_worker(
    comm: &dyn Communicator,
    mut particles: Vec<Particle>,
    params: &SimulationParams,
) -> Result<WorkerReport, ParamError> {
    let rank = comm.rank();
    let box_geo = BoxGeometry::cubic(params.box_length).with_periodicity([true, true, false]);

    let mut table = InteractionTable::new(2);
    table.set(
        SOLVENT_TYPE,
        WALL_TYPE,
        IaParams::wca(Wca::new(params.wall_epsilon, params.wall_sigma))
            .with_dpd(DpdParams::new(params.dpd_gamma, DPD_CUTOFF)),
    );
    let kernel = NonBondedKernel::new();
    let mut thermostat = DpdThermostat::new(params.kt, params.time_step, params.seed);
    let mut errors = RuntimeErrors::new();

    let mut field = AlternatingMagneticField::default();
    field.set_parameter("H0", ParamValue::Vector(params.field_amplitude))?;
    field.set_parameter("omega", ParamValue::Scalar(params.field_frequency))?;
    let mut barnett = BarnettField::new(1.0);
    barnett.set_parameter("gamma_e", ParamValue::Scalar(params.gamma_e))?;
    let mut magnetization = MagnetizationDynamics::default();
    magnetization.set_parameter("dm", ParamValue::Vector(params.dm))?;

    let floor = shared(ShapeBasedConstraint::new(
        Wall::new(DVec3::Z, 0.0),
        WALL_TYPE as i32,
    ));
    let ceiling = shared(ShapeBasedConstraint::new(
        Wall::new(-DVec3::Z, -params.box_length),
        WALL_TYPE as i32,
    ));

    let mut constraints =
        ConstraintSet::new(move || log::debug!("rank {rank}: constraint set changed"));
    constraints.add(floor.clone());
    constraints.add(ceiling.clone());
    constraints.add(shared(field));
    constraints.add(shared(barnett));

    let mut magnetic =
        MagneticConstraintSet::new(move || log::debug!("rank {rank}: magnetic set changed"));
    magnetic.add(shared(magnetization));

    if !constraints.fits_in_box(box_geo.length()) {
        log::warn!("rank {rank}: constraints do not fit the box");
    }
    log::info!(
        "rank {rank}: {} particles, {} constraints, {} magnetic",
        particles.len(),
        constraints.len(),
        magnetic.len()
    );

    let mut report = None;
    for step in 0..params.steps {
        let time = step as f64 * params.time_step;

        for p in particles.iter_mut() {
            p.reset_force();
        }
        {
            let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors)
                .with_thermostat(&mut thermostat);
            constraints.add_forces(&mut particles, time, &mut ctx);
        }
        magnetic.add_forces(&mut particles, time, &box_geo);

        let last = step + 1 == params.steps;
        if step % params.report_interval.max(1) == 0 || last {
            let mut ctx = ForceContext::new(&box_geo, &table, &kernel, &mut errors);
            let stats = calculate_energy(&constraints, &magnetic, &particles, time, &mut ctx, comm);
            let floor = floor.borrow();
            let current = WorkerReport {
                rank,
                local_particles: particles.len(),
                energy: stats.accumulate(),
                floor_force: floor.total_force(comm),
                ceiling_normal_force: ceiling.borrow().total_normal_force(comm),
                min_floor_dist: floor.min_dist(&particles, &ctx, comm),
                violations: ctx.errors.count_all(comm),
            };
            if rank == 0 {
                log::info!(
                    "step {step}: E={:.6} floor F={} ceiling Fn={:.4} min dist={:.4} violations={}",
                    current.energy,
                    current.floor_force,
                    current.ceiling_normal_force,
                    current.min_floor_dist,
                    current.violations
                );
            }
            report = Some(current);
        }

        integrate(&mut particles, params.time_step);
    }

    Ok(report.unwrap_or(WorkerReport {
        rank,
        local_particles: particles.len(),
        energy: 0.0,
        floor_force: DVec3::ZERO,
        ceiling_normal_force: 0.0,
        min_floor_dist: f64::INFINITY,
        violations: 0,
    }))
}

/// Explicit Euler step with unit mass and unit moment of inertia.
///
/// The magnetic boost of the step changes the size of the moment; its
/// direction stays tied to the body z axis.
pub fn integrate(particles: &mut [Particle], dt: f64) {
    for p in particles.iter_mut() {
        let velocity = p.velocity() + p.force() * dt;
        p.velocity = velocity.to_array();
        p.position = (p.position() + velocity * dt).to_array();

        if p.has_rotation() {
            let torque_body = p.orientation().inverse() * p.torque();
            let omega = p.omega() + torque_body * dt;
            p.omega = omega.to_array();
            let q = (p.orientation() * DQuat::from_scaled_axis(omega * dt)).normalize();
            p.quat = q.to_array();
        }

        if p.has_dipole() {
            p.dipm = (p.dipole() + p.dipole_boost()).length();
            p.dipole_boost = [0.0; 3];
        }
    }
}
