//! Axis convention remapping
//!
//! Source data is left-handed with Y up; the script target is right-handed
//! with Z up. Positions map `(x, y, z) -> (-x, -z, y)`. That map is a
//! reflection (determinant -1), so rotation axes flip sign as well:
//! `(x, y, z, w) -> (x, z, -y, w)`.

use glam::{Quat, Vec3};

/// Remap a position or direction into the target convention
pub fn remap_position(v: Vec3) -> Vec3 {
    Vec3::new(-v.x, -v.z, v.y)
}

/// Remap a rotation into the target convention
pub fn remap_rotation(q: Quat) -> Quat {
    Quat::from_xyzw(q.x, q.z, -q.y, q.w)
}

/// Scale is passed through unchanged
pub fn remap_scale(s: Vec3) -> Vec3 {
    s
}

/// Components of a target rotation in the `(w, x, y, z)` order Blender expects
pub fn wxyz(q: Quat) -> [f32; 4] {
    [q.w, q.x, q.y, q.z]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_remap_known_vector() {
        assert_eq!(remap_position(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(-1.0, -3.0, 2.0));
    }

    #[test]
    fn test_identity_rotation_survives() {
        assert_eq!(remap_rotation(Quat::IDENTITY), Quat::IDENTITY);
        assert_eq!(wxyz(Quat::IDENTITY), [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_yaw_becomes_negative_z_turn() {
        let yaw = Quat::from_rotation_y(FRAC_PI_2);
        let mapped = remap_rotation(yaw);
        let expected = Quat::from_rotation_z(-FRAC_PI_2);
        assert!(mapped.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_scale_passthrough() {
        let s = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(remap_scale(s), s);
    }

    proptest! {
        #[test]
        fn remapped_rotation_agrees_with_remapped_vectors(
            ax in -1.0f32..1.0, ay in -1.0f32..1.0, az in -1.0f32..1.0,
            angle in -3.1f32..3.1,
            vx in -10.0f32..10.0, vy in -10.0f32..10.0, vz in -10.0f32..10.0,
        ) {
            let axis = Vec3::new(ax, ay, az);
            prop_assume!(axis.length() > 0.1);
            let q = Quat::from_axis_angle(axis.normalize(), angle);
            let v = Vec3::new(vx, vy, vz);

            let rotated_then_mapped = remap_position(q * v);
            let mapped_then_rotated = remap_rotation(q) * remap_position(v);
            prop_assert!(rotated_then_mapped.abs_diff_eq(mapped_then_rotated, 1e-3));
        }
    }
}
