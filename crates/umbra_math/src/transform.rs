//! Euler-angle transform for shadow casters
//!
//! A caster is placed by a translation and three accumulated rotation
//! angles applied X, then Y, then Z on the matrix stack, so local points map
//! to world space as `T * Rx * Ry * Rz * p`.

use crate::rotation::{rotate_x, rotate_y, rotate_z};
use crate::vector::Vec3;

/// Translation plus X/Y/Z rotation angles in radians
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EulerTransform {
    pub translation: Vec3,
    pub angles: Vec3,
}

impl EulerTransform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        angles: Vec3::ZERO,
    };

    #[inline]
    pub const fn new(translation: Vec3, angles: Vec3) -> Self {
        Self { translation, angles }
    }

    /// Create from translation only
    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, angles: Vec3::ZERO }
    }

    /// Set rotation angles (builder pattern)
    #[inline]
    pub fn with_angles(mut self, angles: Vec3) -> Self {
        self.angles = angles;
        self
    }

    /// Both translation and angles are finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.translation.is_finite() && self.angles.is_finite()
    }

    /// Map a local point into world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        let p = rotate_z(point, self.angles.z);
        let p = rotate_y(p, self.angles.y);
        let p = rotate_x(p, self.angles.x);
        p + self.translation
    }

    /// Map a world point into this transform's local space.
    ///
    /// Subtracts the translation, then undoes the rotations with the
    /// negated angles about X, then Y, then Z.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        let p = point - self.translation;
        let p = rotate_x(p, -self.angles.x);
        let p = rotate_y(p, -self.angles.y);
        rotate_z(p, -self.angles.z)
    }

    /// Column-major 4x4 matrix equivalent of [`Self::transform_point`]
    pub fn to_matrix(&self) -> [[f32; 4]; 4] {
        let x = self.transform_point(Vec3::X) - self.translation;
        let y = self.transform_point(Vec3::Y) - self.translation;
        let z = self.transform_point(Vec3::Z) - self.translation;
        let t = self.translation;
        [
            [x.x, x.y, x.z, 0.0],
            [y.x, y.y, y.z, 0.0],
            [z.x, z.y, z.z, 0.0],
            [t.x, t.y, t.z, 1.0],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(EulerTransform::IDENTITY.transform_point(p), p);
        assert_eq!(EulerTransform::IDENTITY.inverse_transform_point(p), p);
    }

    #[test]
    fn test_inverse_round_trip() {
        let t = EulerTransform::new(Vec3::new(-4.0, 5.0, 0.5), Vec3::new(0.3, 1.55, -0.8));
        let p = Vec3::new(0.25, -1.0, 7.0);
        let back = t.inverse_transform_point(t.transform_point(p));
        assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-4);
        assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-4);
        assert_abs_diff_eq!(back.z, p.z, epsilon = 1e-4);
    }

    #[test]
    fn test_translation_only() {
        let t = EulerTransform::from_translation(Vec3::new(0.0, -6.0, 0.0));
        let local = t.inverse_transform_point(Vec3::new(0.0, 18.0, 0.0));
        assert_eq!(local, Vec3::new(0.0, 24.0, 0.0));
    }

    #[test]
    fn test_matrix_matches_point_transform() {
        let t = EulerTransform::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.1, 0.2, 0.3));
        let m = t.to_matrix();
        let p = Vec3::new(0.5, -0.5, 2.0);
        let expected = t.transform_point(p);
        let x = m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0];
        let y = m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1];
        let z = m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2];
        assert_abs_diff_eq!(x, expected.x, epsilon = 1e-5);
        assert_abs_diff_eq!(y, expected.y, epsilon = 1e-5);
        assert_abs_diff_eq!(z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn test_non_finite_detected() {
        let t = EulerTransform::from_translation(Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(!t.is_finite());
        assert!(EulerTransform::IDENTITY.is_finite());
    }

    #[test]
    fn test_serialization() {
        let t = EulerTransform::new(Vec3::new(8.0, -6.0, -8.0), Vec3::new(0.0, 1.55, 0.0));
        let json = serde_json::to_string(&t).unwrap();
        let restored: EulerTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, t);
    }
}
