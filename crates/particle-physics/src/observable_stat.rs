//! Per-category energy accumulator

use crate::constants::DIPOLAR_SLOTS;
use crate::interactions::{pair_count, pair_index};

/// Energy contributions split by category.
///
/// All categories live in one flat buffer so the owner can reduce the whole
/// accumulator across workers in a single collective call. Every worker must
/// construct it with the same number of types; the layout never changes after
/// that, whatever the local particles are.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservableStat {
    n_types: usize,
    data: Vec<f64>,
}

impl ObservableStat {
    pub fn new(n_types: usize) -> Self {
        Self {
            n_types,
            data: vec![0.0; DIPOLAR_SLOTS + pair_count(n_types)],
        }
    }

    pub fn n_types(&self) -> usize {
        self.n_types
    }

    /// Dipolar energy slots: `[0]` real space, `[1]` k-space
    pub fn dipolar(&self) -> &[f64] {
        &self.data[..DIPOLAR_SLOTS]
    }

    pub fn dipolar_mut(&mut self) -> &mut [f64] {
        &mut self.data[..DIPOLAR_SLOTS]
    }

    /// Non-bonded energy of the unordered type pair (t1, t2)
    pub fn non_bonded(&self, t1: usize, t2: usize) -> f64 {
        self.data
            .get(DIPOLAR_SLOTS + pair_index(t1, t2))
            .copied()
            .unwrap_or(0.0)
    }

    /// Add `energy` under the pair (t1, t2). Types outside the accumulator
    /// have no pair parameters, so their contribution is dropped.
    pub fn add_non_bonded_contribution(&mut self, t1: usize, t2: usize, energy: f64) {
        if t1.max(t2) >= self.n_types {
            if energy != 0.0 {
                log::debug!("Dropping energy {energy} of unknown type pair ({t1}, {t2})");
            }
            return;
        }
        self.data[DIPOLAR_SLOTS + pair_index(t1, t2)] += energy;
    }

    pub fn total_dipolar(&self) -> f64 {
        self.dipolar().iter().sum()
    }

    pub fn total_non_bonded(&self) -> f64 {
        self.data[DIPOLAR_SLOTS..].iter().sum()
    }

    /// Sum over every category
    pub fn accumulate(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Flat view of all categories, for collective reduction
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
