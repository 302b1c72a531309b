//! # umbra_math - Shadow Subsystem Math
//!
//! The handful of math primitives the shadow volume pipeline needs:
//! a plain 3D vector, axis rotations with fixed sign conventions, and an
//! Euler-angle transform that can move points both into and out of an
//! object's local frame.

pub mod vector;
pub mod rotation;
pub mod transform;

pub use vector::*;
pub use rotation::*;
pub use transform::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const FRAC_PI_2: f32 = PI / 2.0;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

pub mod prelude {
    pub use crate::vector::Vec3;
    pub use crate::rotation::{rotate_x, rotate_y, rotate_z};
    pub use crate::transform::EulerTransform;
    pub use crate::radians;
}
