//! Non-bonded pair parameters and the (type, type) lookup table

use crate::constants::*;

/// Lennard-Jones parameters.
///
/// V(r) = 4 ε [(σ/(r−offset))¹² − (σ/(r−offset))⁶ + shift] for min + offset < r < cutoff + offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LennardJones {
    pub epsilon: f64,
    pub sigma: f64,
    pub cutoff: f64,
    pub shift: f64,
    pub offset: f64,
    pub min: f64,
}

impl LennardJones {
    pub fn new(epsilon: f64, sigma: f64, cutoff: f64) -> Self {
        Self {
            epsilon,
            sigma,
            cutoff,
            shift: 0.0,
            offset: 0.0,
            min: 0.0,
        }
    }

    /// Choose `shift` so the energy is continuous at the cutoff
    pub fn with_auto_shift(mut self) -> Self {
        let frac6 = (self.sigma / self.cutoff).powi(6);
        self.shift = -(frac6 * frac6 - frac6);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn is_active(&self) -> bool {
        self.epsilon > 0.0 && self.cutoff > 0.0
    }

    fn in_range(&self, dist: f64) -> bool {
        dist < self.cutoff + self.offset && dist > self.min + self.offset
    }

    /// Scalar factor `fac` such that the force on the first particle is `fac * d`
    pub fn force_factor(&self, dist: f64) -> f64 {
        if !self.in_range(dist) {
            return 0.0;
        }
        let r_off = dist - self.offset;
        let frac6 = (self.sigma / r_off).powi(6);
        48.0 * self.epsilon * frac6 * (frac6 - 0.5) / (r_off * dist)
    }

    pub fn energy(&self, dist: f64) -> f64 {
        if !self.in_range(dist) {
            return 0.0;
        }
        let frac6 = (self.sigma / (dist - self.offset)).powi(6);
        4.0 * self.epsilon * (frac6 * frac6 - frac6 + self.shift)
    }
}

/// Weeks-Chandler-Andersen: purely repulsive, shifted Lennard-Jones cut at the minimum
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wca {
    pub epsilon: f64,
    pub sigma: f64,
}

impl Wca {
    pub fn new(epsilon: f64, sigma: f64) -> Self {
        Self { epsilon, sigma }
    }

    pub fn cutoff(&self) -> f64 {
        self.sigma * WCA_CUTOFF_FACTOR
    }

    pub fn as_lennard_jones(&self) -> LennardJones {
        LennardJones {
            shift: WCA_SHIFT,
            ..LennardJones::new(self.epsilon, self.sigma, self.cutoff())
        }
    }

    pub fn is_active(&self) -> bool {
        self.epsilon > 0.0 && self.sigma > 0.0
    }
}

/// Dissipative particle dynamics pair parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DpdParams {
    pub gamma: f64,
    pub cutoff: f64,
}

impl DpdParams {
    pub fn new(gamma: f64, cutoff: f64) -> Self {
        Self { gamma, cutoff }
    }

    pub fn is_active(&self) -> bool {
        self.gamma > 0.0 && self.cutoff > 0.0
    }
}

/// Pair parameters for one unordered pair of particle types
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IaParams {
    pub lj: Option<LennardJones>,
    pub wca: Option<Wca>,
    pub dpd: Option<DpdParams>,
}

impl IaParams {
    pub fn lennard_jones(lj: LennardJones) -> Self {
        Self {
            lj: Some(lj),
            ..Self::default()
        }
    }

    pub fn wca(wca: Wca) -> Self {
        Self {
            wca: Some(wca),
            ..Self::default()
        }
    }

    pub fn with_dpd(mut self, dpd: DpdParams) -> Self {
        self.dpd = Some(dpd);
        self
    }

    /// Largest cutoff over all active parts, or `INACTIVE_CUTOFF`
    pub fn max_cut(&self) -> f64 {
        let lj = self
            .lj
            .filter(LennardJones::is_active)
            .map(|lj| lj.cutoff + lj.offset);
        let wca = self.wca.filter(Wca::is_active).map(|wca| wca.cutoff());
        let dpd = self.dpd.filter(DpdParams::is_active).map(|dpd| dpd.cutoff);

        [lj, wca, dpd]
            .into_iter()
            .flatten()
            .fold(INACTIVE_CUTOFF, f64::max)
    }

    /// Whether this pair interacts at all
    pub fn interacts(&self) -> bool {
        self.max_cut() != INACTIVE_CUTOFF
    }
}

/// Position of the unordered pair (t1, t2) in a packed lower-triangular table.
///
/// Indices of existing pairs do not change when the number of types grows.
pub fn pair_index(t1: usize, t2: usize) -> usize {
    let (i, j) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
    j * (j + 1) / 2 + i
}

/// Number of unordered pairs for `n_types` types
pub fn pair_count(n_types: usize) -> usize {
    n_types * (n_types + 1) / 2
}

/// Symmetric lookup of pair parameters keyed by (type, type)
#[derive(Clone, Debug, Default)]
pub struct InteractionTable {
    n_types: usize,
    params: Vec<IaParams>,
}

impl InteractionTable {
    pub fn new(n_types: usize) -> Self {
        Self {
            n_types,
            params: vec![IaParams::default(); pair_count(n_types)],
        }
    }

    pub fn n_types(&self) -> usize {
        self.n_types
    }

    /// Parameters of the pair, or `None` when either type is unknown
    pub fn get(&self, t1: i32, t2: i32) -> Option<&IaParams> {
        let (t1, t2) = (usize::try_from(t1).ok()?, usize::try_from(t2).ok()?);
        if t1 >= self.n_types || t2 >= self.n_types {
            return None;
        }
        self.params.get(pair_index(t1, t2))
    }

    /// Set the parameters of a pair, growing the table when a new type appears
    pub fn set(&mut self, t1: usize, t2: usize, params: IaParams) {
        let needed = t1.max(t2) + 1;
        if needed > self.n_types {
            log::debug!("Growing interaction table to {} types", needed);
            self.n_types = needed;
            self.params.resize(pair_count(needed), IaParams::default());
        }
        self.params[pair_index(t1, t2)] = params;
    }

    /// Largest cutoff over all pairs
    pub fn max_cut(&self) -> f64 {
        self.params
            .iter()
            .map(IaParams::max_cut)
            .fold(INACTIVE_CUTOFF, f64::max)
    }
}
