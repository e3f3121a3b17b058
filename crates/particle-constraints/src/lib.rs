//! # Particle Constraints
//!
//! External constraints acting on single particles: uniform alternating
//! magnetic fields, the Barnett field, idealised magnetization dynamics and
//! rigid shape-based boundaries. Constraints are grouped into sets that
//! apply them to a worker's local particles, and the shape boundaries expose
//! collective queries over all workers.

pub mod constraint;
pub mod context;
pub mod errors;
pub mod fields;
pub mod magnetization;
pub mod observables;
pub mod params;
pub mod reduction;
pub mod set;
pub mod shape_based;
pub mod shapes;

pub use constraint::{
    shared, Constraint, ConstraintHandle, MagneticConstraint, MagneticConstraintHandle,
};
pub use context::ForceContext;
pub use errors::{ConstraintError, RuntimeErrors};
pub use fields::{AlternatingMagneticField, BarnettField};
pub use magnetization::MagnetizationDynamics;
pub use observables::{
    calculate_energy, calculate_magnetic_losses, observable_compute_magnetic_losses,
    reduce_stats, ConstraintForce, MagneticLosses, Observable,
};
pub use params::{ParamError, ParamValue, Parameterized};
pub use reduction::{Communicator, LocalGroup, ReduceOp, SingleProcess};
pub use set::{ConstraintList, ConstraintSet, MagneticConstraintSet};
pub use shape_based::{Contact, ShapeBasedConstraint};
pub use shapes::{Cylinder, Shape, Sphere, Wall};
