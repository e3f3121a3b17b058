//! Run configuration for the driver
//!
//! Every field has a default and can be overridden by a `DIPOLE_SIM_*`
//! environment variable. Vectors are written as `x,y,z`.

use std::str::FromStr;

use glam::DVec3;

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParams {
    pub particle_count: usize,
    pub box_length: f64,
    pub steps: usize,
    pub time_step: f64,
    pub seed: u64,
    pub workers: usize,
    /// Steps between observable reports
    pub report_interval: usize,

    // Thermostat
    pub kt: f64,
    pub dpd_gamma: f64,

    // Wall repulsion (WCA)
    pub wall_epsilon: f64,
    pub wall_sigma: f64,

    // Fields
    pub field_amplitude: DVec3,
    pub field_frequency: f64,
    pub gamma_e: f64,
    pub dm: DVec3,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            particle_count: 256,
            box_length: 12.0,
            steps: 400,
            time_step: 0.005,
            seed: 42,
            workers: 2,
            report_interval: 50,

            kt: 1.0,
            dpd_gamma: 1.0,

            wall_epsilon: 1.0,
            wall_sigma: 1.0,

            field_amplitude: DVec3::new(2.0, 0.0, 0.0),
            field_frequency: std::f64::consts::PI,
            gamma_e: 10.0,
            dm: DVec3::new(0.0, 0.0, 1.0e-4),
        }
    }
}

impl SimulationParams {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    /// Unparsable values are reported and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut params = Self::default();
        let read = |key: &str| lookup(&format!("DIPOLE_SIM_{key}"));

        override_with(&mut params.particle_count, "PARTICLES", read("PARTICLES"));
        override_with(&mut params.box_length, "BOX", read("BOX"));
        override_with(&mut params.steps, "STEPS", read("STEPS"));
        override_with(&mut params.time_step, "DT", read("DT"));
        override_with(&mut params.seed, "SEED", read("SEED"));
        override_with(&mut params.workers, "WORKERS", read("WORKERS"));
        override_with(&mut params.report_interval, "REPORT", read("REPORT"));
        override_with(&mut params.kt, "KT", read("KT"));
        override_with(&mut params.dpd_gamma, "DPD_GAMMA", read("DPD_GAMMA"));
        override_with(&mut params.wall_epsilon, "WALL_EPSILON", read("WALL_EPSILON"));
        override_with(&mut params.wall_sigma, "WALL_SIGMA", read("WALL_SIGMA"));
        override_vec(&mut params.field_amplitude, "H0", read("H0"));
        override_with(&mut params.field_frequency, "OMEGA", read("OMEGA"));
        override_with(&mut params.gamma_e, "GAMMA_E", read("GAMMA_E"));
        override_vec(&mut params.dm, "DM", read("DM"));

        params.workers = params.workers.max(1);
        params.report_interval = params.report_interval.max(1);
        params
    }
}

fn override_with<T: FromStr>(field: &mut T, key: &str, raw: Option<String>) {
    let Some(raw) = raw else { return };
    match raw.trim().parse() {
        Ok(value) => *field = value,
        Err(_) => log::warn!("Ignoring DIPOLE_SIM_{key}={raw:?}: not a valid value"),
    }
}

fn override_vec(field: &mut DVec3, key: &str, raw: Option<String>) {
    let Some(raw) = raw else { return };
    match parse_vec3(&raw) {
        Some(v) => *field = v,
        None => log::warn!("Ignoring DIPOLE_SIM_{key}={raw:?}: expected x,y,z"),
    }
}

fn parse_vec3(raw: &str) -> Option<DVec3> {
    let parts = raw
        .split(',')
        .map(|s| s.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        &[x, y, z] => Some(DVec3::new(x, y, z)),
        _ => None,
    }
}
