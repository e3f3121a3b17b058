//! # Particle Physics
//!
//! Particle model and the short-range physics consumed by the constraint
//! core: periodic box folding, pair parameters, pair kernels, the DPD
//! thermostat and the energy accumulator.

pub mod constants;
pub mod forces;
pub mod geometry;
pub mod interactions;
pub mod observable_stat;
pub mod particle;
pub mod thermostat;

pub use constants::*;
pub use forces::*;
pub use geometry::*;
pub use interactions::*;
pub use observable_stat::*;
pub use particle::*;
pub use thermostat::*;
