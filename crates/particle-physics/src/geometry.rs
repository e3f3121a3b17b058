//! Simulation box and periodic folding

use glam::DVec3;

/// Rectangular simulation box anchored at the origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxGeometry {
    length: DVec3,
    periodic: [bool; 3],
}

impl BoxGeometry {
    /// Fully periodic box with edge lengths `length`
    pub fn new(length: DVec3) -> Self {
        Self {
            length,
            periodic: [true; 3],
        }
    }

    pub fn cubic(length: f64) -> Self {
        Self::new(DVec3::splat(length))
    }

    pub fn with_periodicity(mut self, periodic: [bool; 3]) -> Self {
        self.periodic = periodic;
        self
    }

    pub fn length(&self) -> DVec3 {
        self.length
    }

    pub fn periodic(&self, axis: usize) -> bool {
        self.periodic[axis]
    }

    /// Map a position into the primary cell `[0, L)` along every periodic axis.
    /// Non-periodic axes are left untouched.
    pub fn fold_position(&self, pos: DVec3) -> DVec3 {
        let mut folded = pos;
        for axis in 0..3 {
            if self.periodic[axis] {
                folded[axis] = fold_coordinate(pos[axis], self.length[axis]);
            }
        }
        folded
    }
}

fn fold_coordinate(x: f64, length: f64) -> f64 {
    let folded = x.rem_euclid(length);
    // rem_euclid rounds tiny negative inputs up to `length`
    if folded >= length {
        folded - length
    } else {
        folded
    }
}
