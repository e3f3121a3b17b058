//! Geometric boundaries for shape-based constraints

use glam::DVec3;

/// Boundary geometry queried by signed distance.
pub trait Shape {
    /// Signed distance from `pos` to the boundary and the vector from the
    /// nearest boundary point to `pos`. Positive distances are on the allowed
    /// side; `|vec| == |dist|`.
    fn calculate_dist(&self, pos: DVec3) -> (f64, DVec3);

    /// Whether the shape lies within a box of edge lengths `box_l`
    fn fits_in_box(&self, _box_l: DVec3) -> bool {
        true
    }
}

/// Infinite plane `normal · x = offset`; the allowed side is along `normal`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wall {
    normal: DVec3,
    offset: f64,
}

impl Wall {
    /// `normal` is normalised here
    pub fn new(normal: DVec3, offset: f64) -> Self {
        Self {
            normal: normal.normalize(),
            offset,
        }
    }

    pub fn normal(&self) -> DVec3 {
        self.normal
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl Shape for Wall {
    fn calculate_dist(&self, pos: DVec3) -> (f64, DVec3) {
        let dist = self.normal.dot(pos) - self.offset;
        (dist, self.normal * dist)
    }
}

/// Sphere; `direction = 1` keeps particles outside, `-1` inside
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
    pub direction: f64,
}

impl Sphere {
    pub fn new(center: DVec3, radius: f64, direction: f64) -> Self {
        Self {
            center,
            radius,
            direction,
        }
    }
}

impl Shape for Sphere {
    fn calculate_dist(&self, pos: DVec3) -> (f64, DVec3) {
        let c_dist = pos - self.center;
        let c_norm = c_dist.length();
        let dist = self.direction * (c_norm - self.radius);
        if c_norm == 0.0 {
            // Every surface point is equally near
            return (dist, DVec3::Z * -self.radius);
        }
        (dist, c_dist * ((c_norm - self.radius) / c_norm))
    }

    fn fits_in_box(&self, box_l: DVec3) -> bool {
        let lo = self.center - DVec3::splat(self.radius);
        let hi = self.center + DVec3::splat(self.radius);
        lo.cmpge(DVec3::ZERO).all() && hi.cmple(box_l).all()
    }
}

/// Infinite cylinder around the line `center + s·axis`; `direction` as for [`Sphere`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cylinder {
    center: DVec3,
    axis: DVec3,
    radius: f64,
    direction: f64,
}

impl Cylinder {
    /// `axis` is normalised here
    pub fn new(center: DVec3, axis: DVec3, radius: f64, direction: f64) -> Self {
        Self {
            center,
            axis: axis.normalize(),
            radius,
            direction,
        }
    }

    pub fn axis(&self) -> DVec3 {
        self.axis
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Shape for Cylinder {
    fn calculate_dist(&self, pos: DVec3) -> (f64, DVec3) {
        let rel = pos - self.center;
        let radial = rel - self.axis * rel.dot(self.axis);
        let r = radial.length();
        let dist = self.direction * (r - self.radius);
        if r == 0.0 {
            return (dist, self.axis.any_orthonormal_vector() * -self.radius);
        }
        (dist, radial * ((r - self.radius) / r))
    }

    /// An infinite cylinder only fits a box it crosses along a coordinate axis
    /// with its whole cross-section inside.
    fn fits_in_box(&self, box_l: DVec3) -> bool {
        let Some(along) = (0..3).find(|&a| self.axis[a].abs() == 1.0) else {
            return false;
        };
        (0..3).filter(|&a| a != along).all(|a| {
            self.center[a] - self.radius >= 0.0 && self.center[a] + self.radius <= box_l[a]
        })
    }
}
