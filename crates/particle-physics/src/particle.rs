//! Particle record and the per-particle capability flags

use bytemuck::{Pod, Zeroable};
use glam::{DQuat, DVec3};

/// Particle has rotational degrees of freedom
pub const FLAG_ROTATION: u32 = 1 << 0;
/// Particle carries a magnetic dipole moment
pub const FLAG_DIPOLE: u32 = 1 << 1;

/// Particle record as stored in a worker's local particle range.
///
/// Laid out as plain `f64`/`i32` data so a partition can be shipped between
/// workers as raw bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Position in the lab frame (unfolded)
    pub position: [f64; 3],
    /// Velocity in the lab frame
    pub velocity: [f64; 3],
    /// Force accumulator
    pub force: [f64; 3],
    /// Torque accumulator (lab frame)
    pub torque: [f64; 3],
    /// Angular velocity in the body frame
    pub omega: [f64; 3],
    /// Orientation quaternion, stored as (x, y, z, w)
    pub quat: [f64; 4],
    /// Per-step increment of the magnetic moment ("magnetic boost")
    pub dipole_boost: [f64; 3],

    /// Electric charge
    pub charge: f64,
    /// Magnitude of the dipole moment; the direction is the body z axis
    pub dipm: f64,

    pub id: i32,
    /// Type id used for pair-parameter lookup
    pub particle_type: i32,
    /// Capability bits (`FLAG_ROTATION`, `FLAG_DIPOLE`)
    pub flags: u32,
    pub _padding: u32,
}

impl Particle {
    /// Create a particle at rest with identity orientation and no capabilities
    pub fn new(id: i32, particle_type: i32, position: DVec3) -> Self {
        Self {
            position: position.to_array(),
            quat: DQuat::IDENTITY.to_array(),
            id,
            particle_type,
            ..Self::zeroed()
        }
    }

    /// Enable rotational degrees of freedom
    pub fn with_rotation(mut self) -> Self {
        self.flags |= FLAG_ROTATION;
        self
    }

    /// Give the particle a dipole moment `dip` (lab frame).
    ///
    /// The orientation is rotated so that the body z axis points along `dip`.
    pub fn with_dipole(mut self, dip: DVec3) -> Self {
        self.flags |= FLAG_DIPOLE;
        self.dipm = dip.length();
        if self.dipm > 0.0 {
            self.quat = DQuat::from_rotation_arc(DVec3::Z, dip / self.dipm).to_array();
        }
        self
    }

    pub fn with_velocity(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity.to_array();
        self
    }

    /// Set the angular velocity, given in the body frame
    pub fn with_omega(mut self, omega: DVec3) -> Self {
        self.omega = omega.to_array();
        self
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    pub fn has_rotation(&self) -> bool {
        self.flags & FLAG_ROTATION != 0
    }

    pub fn has_dipole(&self) -> bool {
        self.flags & FLAG_DIPOLE != 0
    }

    pub fn position(&self) -> DVec3 {
        DVec3::from_array(self.position)
    }

    pub fn velocity(&self) -> DVec3 {
        DVec3::from_array(self.velocity)
    }

    pub fn force(&self) -> DVec3 {
        DVec3::from_array(self.force)
    }

    pub fn torque(&self) -> DVec3 {
        DVec3::from_array(self.torque)
    }

    /// Angular velocity in the body frame
    pub fn omega(&self) -> DVec3 {
        DVec3::from_array(self.omega)
    }

    pub fn orientation(&self) -> DQuat {
        DQuat::from_array(self.quat)
    }

    pub fn dipole_boost(&self) -> DVec3 {
        DVec3::from_array(self.dipole_boost)
    }

    /// Body z axis in the lab frame
    pub fn director(&self) -> DVec3 {
        self.body_to_space(DVec3::Z)
    }

    /// Dipole moment in the lab frame
    pub fn dipole(&self) -> DVec3 {
        self.director() * self.dipm
    }

    /// Rotate a body-frame vector into the lab frame
    pub fn body_to_space(&self, v: DVec3) -> DVec3 {
        self.orientation() * v
    }

    /// Angular velocity in the lab frame
    pub fn omega_lab(&self) -> DVec3 {
        self.body_to_space(self.omega())
    }

    pub fn add_force(&mut self, f: DVec3) {
        self.force = (self.force() + f).to_array();
    }

    pub fn add_torque(&mut self, t: DVec3) {
        self.torque = (self.torque() + t).to_array();
    }

    pub fn add_dipole_boost(&mut self, dm: DVec3) {
        self.dipole_boost = (self.dipole_boost() + dm).to_array();
    }

    /// Zero the force and torque accumulators
    pub fn reset_force(&mut self) {
        self.force = [0.0; 3];
        self.torque = [0.0; 3];
    }
}
