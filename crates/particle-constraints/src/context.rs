//! Collaborators a constraint needs while evaluating a particle

use particle_physics::{BoxGeometry, DpdThermostat, InteractionTable, PairKernel};

use crate::errors::RuntimeErrors;

/// Everything outside the constraint itself that a force or energy pass reads
/// or advances: box, pair parameters, pair kernel, the thermostat (present
/// only while it is active) and the runtime-error channel.
pub struct ForceContext<'a> {
    pub box_geo: &'a BoxGeometry,
    pub interactions: &'a InteractionTable,
    pub kernel: &'a dyn PairKernel,
    pub thermostat: Option<&'a mut DpdThermostat>,
    pub errors: &'a mut RuntimeErrors,
}

impl<'a> ForceContext<'a> {
    pub fn new(
        box_geo: &'a BoxGeometry,
        interactions: &'a InteractionTable,
        kernel: &'a dyn PairKernel,
        errors: &'a mut RuntimeErrors,
    ) -> Self {
        Self {
            box_geo,
            interactions,
            kernel,
            thermostat: None,
            errors,
        }
    }

    /// Activate dissipative coupling through `thermostat`
    pub fn with_thermostat(mut self, thermostat: &'a mut DpdThermostat) -> Self {
        self.thermostat = Some(thermostat);
        self
    }

    pub fn thermostat_active(&self) -> bool {
        self.thermostat.is_some()
    }
}
