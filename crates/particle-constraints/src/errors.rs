//! Worker-local runtime-error channel
//!
//! Physics code never aborts a step. Recoverable problems are recorded here
//! and inspected by the caller after the step, typically collectively via
//! [`RuntimeErrors::count_all`].

use thiserror::Error;

use crate::reduction::Communicator;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintError {
    #[error("Constraint violated by particle {particle_id} dist {distance}")]
    Violated { particle_id: i32, distance: f64 },
}

#[derive(Debug, Default)]
pub struct RuntimeErrors {
    errors: Vec<ConstraintError>,
}

impl RuntimeErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, error: ConstraintError) {
        log::warn!("{error}");
        self.errors.push(error);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConstraintError> {
        self.errors.iter()
    }

    /// Take every recorded error, leaving the channel empty
    pub fn drain(&mut self) -> Vec<ConstraintError> {
        std::mem::take(&mut self.errors)
    }

    /// Total number of recorded errors over all workers (collective)
    pub fn count_all(&self, comm: &dyn Communicator) -> usize {
        comm.all_reduce_sum(self.errors.len() as f64) as usize
    }
}
