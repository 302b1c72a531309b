//! Single-axis rotations
//!
//! Right-handed rotations by `angle` radians. A zero angle returns the input
//! untouched so repeated no-op rotations never accumulate rounding error.

use crate::vector::Vec3;

/// Rotate about the X axis
#[inline]
pub fn rotate_x(v: Vec3, angle: f32) -> Vec3 {
    if angle == 0.0 {
        return v;
    }
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x, v.y * cos - v.z * sin, v.y * sin + v.z * cos)
}

/// Rotate about the Y axis
#[inline]
pub fn rotate_y(v: Vec3, angle: f32) -> Vec3 {
    if angle == 0.0 {
        return v;
    }
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.z * sin + v.x * cos, v.y, v.z * cos - v.x * sin)
}

/// Rotate about the Z axis
#[inline]
pub fn rotate_z(v: Vec3, angle: f32) -> Vec3 {
    if angle == 0.0 {
        return v;
    }
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAC_PI_2 as HALF_PI;
    use approx::assert_abs_diff_eq;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-5);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-5);
        assert_abs_diff_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn test_quarter_turns() {
        assert_vec_eq(rotate_x(Vec3::Y, HALF_PI), Vec3::Z);
        assert_vec_eq(rotate_y(Vec3::Z, HALF_PI), Vec3::X);
        assert_vec_eq(rotate_z(Vec3::X, HALF_PI), Vec3::Y);
    }

    #[test]
    fn test_zero_angle_is_identity() {
        let v = Vec3::new(0.1, 0.2, 0.3);
        assert_eq!(rotate_x(v, 0.0), v);
        assert_eq!(rotate_y(v, 0.0), v);
        assert_eq!(rotate_z(v, 0.0), v);
    }

    #[test]
    fn test_rotation_preserves_length() {
        let v = Vec3::new(1.0, -2.0, 3.0);
        let r = rotate_z(rotate_y(rotate_x(v, 0.3), 1.1), -0.7);
        assert_abs_diff_eq!(r.length(), v.length(), epsilon = 1e-5);
    }
}
