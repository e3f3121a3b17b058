//! Collective reductions across worker processes
//!
//! Every worker owns a disjoint partition of the particles. A reduction is a
//! barrier: all workers of the group must call it with buffers of the same
//! length, and all of them receive the combined result. Calling it on a
//! subset of the group hangs; that is a misuse, not a recoverable error.

use std::sync::{Arc, Barrier, Mutex, PoisonError};

use glam::DVec3;

/// Commutative operator applied element-wise by a reduction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReduceOp {
    Sum,
    Min,
}

impl ReduceOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            ReduceOp::Sum => a + b,
            ReduceOp::Min => a.min(b),
        }
    }
}

/// A group of cooperating workers
pub trait Communicator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    /// Reduce `values` element-wise over all workers; every worker receives the result in place
    fn all_reduce(&self, values: &mut [f64], op: ReduceOp);

    fn all_reduce_sum(&self, value: f64) -> f64 {
        let mut buf = [value];
        self.all_reduce(&mut buf, ReduceOp::Sum);
        buf[0]
    }

    fn all_reduce_min(&self, value: f64) -> f64 {
        let mut buf = [value];
        self.all_reduce(&mut buf, ReduceOp::Min);
        buf[0]
    }

    fn all_reduce_vec3(&self, value: DVec3, op: ReduceOp) -> DVec3 {
        let mut buf = [value];
        self.all_reduce(bytemuck::cast_slice_mut(&mut buf), op);
        buf[0]
    }
}

/// A group of exactly one worker
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleProcess;

impl Communicator for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn all_reduce(&self, _values: &mut [f64], _op: ReduceOp) {}
}

struct GroupState {
    barrier: Barrier,
    slots: Mutex<Vec<Vec<f64>>>,
}

/// In-process group: one handle per worker thread.
///
/// Contributions are combined in rank order, so every worker gets a
/// bit-identical result regardless of the order in which workers arrive.
#[derive(Clone)]
pub struct LocalGroup {
    rank: usize,
    size: usize,
    state: Arc<GroupState>,
}

impl LocalGroup {
    /// Create the handles of a group of `size` workers, indexed by rank
    pub fn create(size: usize) -> Vec<LocalGroup> {
        assert!(size > 0, "a worker group needs at least one member");
        let state = Arc::new(GroupState {
            barrier: Barrier::new(size),
            slots: Mutex::new(vec![Vec::new(); size]),
        });
        (0..size)
            .map(|rank| LocalGroup {
                rank,
                size,
                state: Arc::clone(&state),
            })
            .collect()
    }
}

impl Communicator for LocalGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn all_reduce(&self, values: &mut [f64], op: ReduceOp) {
        {
            let mut slots = self
                .state
                .slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            slots[self.rank].clear();
            slots[self.rank].extend_from_slice(values);
        }
        self.state.barrier.wait();

        {
            let slots = self
                .state
                .slots
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            assert!(
                slots.iter().all(|s| s.len() == values.len()),
                "collective called with mismatched buffer lengths"
            );
            for (i, value) in values.iter_mut().enumerate() {
                *value = slots[1..]
                    .iter()
                    .fold(slots[0][i], |acc, slot| op.apply(acc, slot[i]));
            }
        }
        log::trace!("rank {} finished {:?} over {} values", self.rank, op, values.len());

        // Nobody may overwrite a slot before every worker has read it
        self.state.barrier.wait();
    }
}

/// A process group launched by an MPI runner, one particle partition per rank
#[cfg(feature = "mpi")]
mod process_group {
    use mpi::collective::SystemOperation;
    use mpi::topology::SimpleCommunicator;
    use mpi::traits::CommunicatorCollectives;

    use super::{Communicator, ReduceOp};

    impl Communicator for SimpleCommunicator {
        fn rank(&self) -> usize {
            mpi::traits::Communicator::rank(self) as usize
        }

        fn size(&self) -> usize {
            mpi::traits::Communicator::size(self) as usize
        }

        fn all_reduce(&self, values: &mut [f64], op: ReduceOp) {
            let local = values.to_vec();
            let operation = match op {
                ReduceOp::Sum => SystemOperation::sum(),
                ReduceOp::Min => SystemOperation::min(),
            };
            self.all_reduce_into(&local[..], values, operation);
            log::trace!(
                "rank {} finished {:?} over {} values",
                Communicator::rank(self),
                op,
                values.len()
            );
        }
    }
}
