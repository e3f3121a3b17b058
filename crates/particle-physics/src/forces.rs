//! Pair force and energy kernels
//!
//! Kernels take the separation vector `d = x1 - x2` and its length `dist`
//! separately so callers can evaluate a pair at a distance other than |d|
//! (mirrored wall interactions do this).

use std::ops::{Add, AddAssign, Neg};

use glam::DVec3;

use crate::interactions::{IaParams, LennardJones};
use crate::particle::Particle;

/// Force and torque acting on one particle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParticleForce {
    pub force: DVec3,
    pub torque: DVec3,
}

impl ParticleForce {
    pub const ZERO: Self = Self {
        force: DVec3::ZERO,
        torque: DVec3::ZERO,
    };

    pub fn from_force(force: DVec3) -> Self {
        Self {
            force,
            torque: DVec3::ZERO,
        }
    }

    pub fn from_torque(torque: DVec3) -> Self {
        Self {
            force: DVec3::ZERO,
            torque,
        }
    }
}

impl Add for ParticleForce {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            force: self.force + rhs.force,
            torque: self.torque + rhs.torque,
        }
    }
}

impl AddAssign for ParticleForce {
    fn add_assign(&mut self, rhs: Self) {
        self.force += rhs.force;
        self.torque += rhs.torque;
    }
}

impl Neg for ParticleForce {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            force: -self.force,
            torque: -self.torque,
        }
    }
}

/// Reaction on the partner of a pair: the opposite force, and the torque
/// that keeps the total angular momentum of the pair unchanged.
pub fn calc_opposing_force(pf: &ParticleForce, d: DVec3) -> ParticleForce {
    ParticleForce {
        force: -pf.force,
        torque: -(pf.torque + d.cross(pf.force)),
    }
}

/// Short-range pair kernel, evaluated for particle `p1` against partner `p2`
pub trait PairKernel {
    fn pair_force(
        &self,
        p1: &Particle,
        p2: &Particle,
        ia: &IaParams,
        d: DVec3,
        dist: f64,
    ) -> ParticleForce;

    fn pair_energy(&self, p1: &Particle, p2: &Particle, ia: &IaParams, d: DVec3, dist: f64)
        -> f64;
}

/// Screened Coulomb interaction
/// V(r) = prefactor * q1 * q2 * exp(-κr) / r for r < cutoff
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebyeHueckel {
    pub prefactor: f64,
    pub kappa: f64,
    pub cutoff: f64,
}

impl DebyeHueckel {
    pub fn new(prefactor: f64, kappa: f64, cutoff: f64) -> Self {
        Self {
            prefactor,
            kappa,
            cutoff,
        }
    }

    pub fn force(&self, q1q2: f64, d: DVec3, dist: f64) -> DVec3 {
        if q1q2 == 0.0 || dist >= self.cutoff || dist <= 0.0 {
            return DVec3::ZERO;
        }
        let kr = self.kappa * dist;
        let fac = self.prefactor * q1q2 * (-kr).exp() * (1.0 + kr) / (dist * dist * dist);
        d * fac
    }

    pub fn energy(&self, q1q2: f64, dist: f64) -> f64 {
        if q1q2 == 0.0 || dist >= self.cutoff || dist <= 0.0 {
            return 0.0;
        }
        self.prefactor * q1q2 * (-self.kappa * dist).exp() / dist
    }
}

/// Lennard-Jones-family force on the first particle of the pair
pub fn lennard_jones_force(lj: &LennardJones, d: DVec3, dist: f64) -> DVec3 {
    d * lj.force_factor(dist)
}

/// Sum of every active short-range part of `ia`, plus optional electrostatics
#[derive(Clone, Copy, Debug, Default)]
pub struct NonBondedKernel {
    pub electrostatics: Option<DebyeHueckel>,
}

impl NonBondedKernel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_electrostatics(mut self, dh: DebyeHueckel) -> Self {
        self.electrostatics = Some(dh);
        self
    }

    fn short_range_parts(ia: &IaParams) -> impl Iterator<Item = LennardJones> {
        let lj = ia.lj.filter(LennardJones::is_active);
        let wca = ia.wca.filter(|w| w.is_active()).map(|w| w.as_lennard_jones());
        lj.into_iter().chain(wca)
    }
}

impl PairKernel for NonBondedKernel {
    fn pair_force(
        &self,
        p1: &Particle,
        p2: &Particle,
        ia: &IaParams,
        d: DVec3,
        dist: f64,
    ) -> ParticleForce {
        let mut force: DVec3 = Self::short_range_parts(ia)
            .map(|lj| lennard_jones_force(&lj, d, dist))
            .sum();
        if let Some(dh) = &self.electrostatics {
            force += dh.force(p1.charge * p2.charge, d, dist);
        }
        ParticleForce::from_force(force)
    }

    fn pair_energy(
        &self,
        p1: &Particle,
        p2: &Particle,
        ia: &IaParams,
        _d: DVec3,
        dist: f64,
    ) -> f64 {
        let mut energy: f64 = Self::short_range_parts(ia).map(|lj| lj.energy(dist)).sum();
        if let Some(dh) = &self.electrostatics {
            energy += dh.energy(p1.charge * p2.charge, dist);
        }
        energy
    }
}
