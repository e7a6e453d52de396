//! Rotation about principal and arbitrary axes.

use glam::DVec3;

/// Rotate `point` by Euler angles `rotation` (radians, per axis) applying
/// Yaw (Z) first, then Pitch (Y), then Roll (X).
pub fn rotate_zyx(point: DVec3, rotation: DVec3) -> DVec3 {
    let yawed = rotate_around_axis(point, DVec3::Z, rotation.z, None);
    let pitched = rotate_around_axis(yawed, DVec3::Y, rotation.y, None);
    rotate_around_axis(pitched, DVec3::X, rotation.x, None)
}

/// Rodrigues rotation of `point` around `axis` by `angle` radians, about
/// `center` (origin when `None`). The axis is normalized internally.
pub fn rotate_around_axis(point: DVec3, axis: DVec3, angle: f64, center: Option<DVec3>) -> DVec3 {
    let center = center.unwrap_or(DVec3::ZERO);
    let p = point - center;
    let k = axis.normalize();

    // v' = v cosθ + (k×v) sinθ + k (k·v)(1 − cosθ)
    let (sin_t, cos_t) = angle.sin_cos();
    let k_dot_v = k.dot(p);
    let k_cross_v = k.cross(p);
    let rotated = p * cos_t + k_cross_v * sin_t + k * (k_dot_v * (1.0 - cos_t));
    rotated + center
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn axis_rotation_matches_planar_rotation() {
        let p = DVec3::new(2.0, 1.0, 7.0);
        let theta = 0.8;
        let via_axis = rotate_around_axis(p, DVec3::Z, theta, None);
        let via_planar = crate::geom::rotate2d(p, theta);
        assert!(close(via_axis, via_planar), "{via_axis:?} vs {via_planar:?}");
    }

    #[test]
    fn rotation_about_center_keeps_center_fixed() {
        let center = DVec3::new(5.0, -3.0, 1.0);
        let rotated = rotate_around_axis(center, DVec3::new(1.0, 2.0, 3.0), 1.1, Some(center));
        assert!(close(rotated, center));
    }

    #[test]
    fn full_turn_is_identity() {
        let p = DVec3::new(1.0, 2.0, 3.0);
        let axis = DVec3::new(0.3, -0.4, 0.9);
        let r = rotate_around_axis(p, axis, std::f64::consts::TAU, None);
        assert!(close(r, p));
    }

    #[test]
    fn zyx_order_applies_yaw_first() {
        // Yaw a forward vector a quarter turn, then pitch: if yaw ran first,
        // the pitch axis sees the already-yawed vector.
        let p = DVec3::new(1.0, 0.0, 0.0);
        let r = rotate_zyx(
            p,
            DVec3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2),
        );
        // Pure yaw: forward stays in the XY plane.
        assert!(r.z.abs() < 1e-9);
        assert!((r.length() - 1.0).abs() < 1e-9);
    }
}
