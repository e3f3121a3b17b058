//! Named parameter access for constraints
//!
//! The force code never checks its inputs; values are validated here, before
//! they reach a constraint.

use glam::DVec3;
use thiserror::Error;

use crate::fields::{AlternatingMagneticField, BarnettField};
use crate::magnetization::MagnetizationDynamics;
use crate::shape_based::ShapeBasedConstraint;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    Scalar(f64),
    Vector(DVec3),
    Flag(bool),
    Int(i32),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Scalar(_) => "scalar",
            ParamValue::Vector(_) => "vector",
            ParamValue::Flag(_) => "flag",
            ParamValue::Int(_) => "int",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("Unknown parameter '{0}'")]
    Unknown(String),
    #[error("Parameter '{name}' expects a {expected}, got a {got}")]
    WrongType {
        name: &'static str,
        expected: &'static str,
        got: &'static str,
    },
    #[error("Invalid value for '{name}': {reason}")]
    Invalid { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ParamError>;

/// A constraint whose parameters can be read and written by name
pub trait Parameterized {
    fn parameter_names(&self) -> &'static [&'static str];

    fn get_parameter(&self, name: &str) -> Result<ParamValue>;

    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<()>;
}

fn scalar(name: &'static str, value: ParamValue) -> Result<f64> {
    match value {
        ParamValue::Scalar(x) if x.is_finite() => Ok(x),
        ParamValue::Scalar(x) => Err(ParamError::Invalid {
            name,
            reason: format!("{x} is not finite"),
        }),
        other => Err(wrong_type(name, "scalar", other)),
    }
}

fn vector(name: &'static str, value: ParamValue) -> Result<DVec3> {
    match value {
        ParamValue::Vector(v) if v.is_finite() => Ok(v),
        ParamValue::Vector(v) => Err(ParamError::Invalid {
            name,
            reason: format!("{v} is not finite"),
        }),
        other => Err(wrong_type(name, "vector", other)),
    }
}

fn flag(name: &'static str, value: ParamValue) -> Result<bool> {
    match value {
        ParamValue::Flag(b) => Ok(b),
        other => Err(wrong_type(name, "flag", other)),
    }
}

fn int(name: &'static str, value: ParamValue) -> Result<i32> {
    match value {
        ParamValue::Int(i) => Ok(i),
        other => Err(wrong_type(name, "int", other)),
    }
}

fn wrong_type(name: &'static str, expected: &'static str, got: ParamValue) -> ParamError {
    ParamError::WrongType {
        name,
        expected,
        got: got.kind(),
    }
}

impl Parameterized for AlternatingMagneticField {
    fn parameter_names(&self) -> &'static [&'static str] {
        &["H0", "omega"]
    }

    fn get_parameter(&self, name: &str) -> Result<ParamValue> {
        match name {
            "H0" => Ok(ParamValue::Vector(self.h0())),
            "omega" => Ok(ParamValue::Scalar(self.omega())),
            _ => Err(ParamError::Unknown(name.to_owned())),
        }
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match name {
            "H0" => self.set_h0(vector("H0", value)?),
            "omega" => {
                let omega = scalar("omega", value)?;
                if omega < 0.0 {
                    return Err(ParamError::Invalid {
                        name: "omega",
                        reason: "frequency must be non-negative".to_owned(),
                    });
                }
                self.set_omega(omega);
            }
            _ => return Err(ParamError::Unknown(name.to_owned())),
        }
        Ok(())
    }
}

impl Parameterized for BarnettField {
    fn parameter_names(&self) -> &'static [&'static str] {
        &["gamma_e"]
    }

    fn get_parameter(&self, name: &str) -> Result<ParamValue> {
        match name {
            "gamma_e" => Ok(ParamValue::Scalar(self.gamma())),
            _ => Err(ParamError::Unknown(name.to_owned())),
        }
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match name {
            "gamma_e" => {
                let gamma = scalar("gamma_e", value)?;
                if gamma == 0.0 {
                    return Err(ParamError::Invalid {
                        name: "gamma_e",
                        reason: "gyromagnetic ratio must be non-zero".to_owned(),
                    });
                }
                self.set_gamma(gamma);
                Ok(())
            }
            _ => Err(ParamError::Unknown(name.to_owned())),
        }
    }
}

impl Parameterized for MagnetizationDynamics {
    fn parameter_names(&self) -> &'static [&'static str] {
        &["dm"]
    }

    fn get_parameter(&self, name: &str) -> Result<ParamValue> {
        match name {
            "dm" => Ok(ParamValue::Vector(self.dm())),
            _ => Err(ParamError::Unknown(name.to_owned())),
        }
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match name {
            "dm" => {
                self.set_dm(vector("dm", value)?);
                Ok(())
            }
            _ => Err(ParamError::Unknown(name.to_owned())),
        }
    }
}

impl Parameterized for ShapeBasedConstraint {
    fn parameter_names(&self) -> &'static [&'static str] {
        &["penetrable", "only_positive", "particle_type"]
    }

    fn get_parameter(&self, name: &str) -> Result<ParamValue> {
        match name {
            "penetrable" => Ok(ParamValue::Flag(self.is_penetrable())),
            "only_positive" => Ok(ParamValue::Flag(self.is_only_positive())),
            "particle_type" => Ok(ParamValue::Int(self.particle_type())),
            _ => Err(ParamError::Unknown(name.to_owned())),
        }
    }

    fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<()> {
        match name {
            "penetrable" => self.set_penetrable(flag("penetrable", value)?),
            "only_positive" => self.set_only_positive(flag("only_positive", value)?),
            "particle_type" => self.set_particle_type(int("particle_type", value)?),
            _ => return Err(ParamError::Unknown(name.to_owned())),
        }
        Ok(())
    }
}
