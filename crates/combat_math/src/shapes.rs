//! Planar selection-shape predicates. All tests run in the XY plane; Z is
//! ignored. Angles are degrees, matching the selector tables.

use glam::DVec3;

use crate::geom::{distance_sq_2d, normalize2d, radian2d};

/// Point inside (or on) the circle of `radius` around `center`.
#[inline]
pub fn in_circle_2d(center: DVec3, radius: f64, point: DVec3) -> bool {
    radius > 0.0 && distance_sq_2d(center, point) <= radius * radius
}

/// Point inside the annulus between `radius` (outer) and `inner_radius`.
#[inline]
pub fn in_ring_2d(center: DVec3, inner_radius: f64, radius: f64, point: DVec3) -> bool {
    if radius <= 0.0 || radius < inner_radius {
        return false;
    }
    let d2 = distance_sq_2d(center, point);
    let inner = inner_radius.max(0.0);
    d2 >= inner * inner && d2 <= radius * radius
}

/// Point inside the cone with apex `apex`, axis `dir`, full opening
/// `angle_deg` degrees and range `radius`.
pub fn in_cone_2d(apex: DVec3, dir: DVec3, angle_deg: f64, radius: f64, point: DVec3) -> bool {
    if radius <= 0.0 || angle_deg <= 0.0 {
        return false;
    }
    if distance_sq_2d(apex, point) > radius * radius {
        return false;
    }
    let to = DVec3::new(point.x - apex.x, point.y - apex.y, 0.0);
    if to.x * to.x + to.y * to.y <= 1e-12 {
        // The apex itself counts.
        return true;
    }
    let half = (angle_deg * 0.5).to_radians();
    radian2d(normalize2d(dir), to).abs() <= half
}

/// Point inside the rectangle extending `length` along `dir` from `origin`
/// with total width `width` (half on each side).
pub fn in_rect_2d(origin: DVec3, dir: DVec3, width: f64, length: f64, point: DVec3) -> bool {
    if width <= 0.0 || length <= 0.0 {
        return false;
    }
    let axis = normalize2d(dir);
    let to = DVec3::new(point.x - origin.x, point.y - origin.y, 0.0);
    let forward = to.x * axis.x + to.y * axis.y;
    if forward < 0.0 || forward > length {
        return false;
    }
    // Lateral offset: cross product magnitude in the plane.
    let lateral = (to.x * axis.y - to.y * axis.x).abs();
    lateral <= width * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    const O: DVec3 = DVec3::ZERO;
    const FWD: DVec3 = DVec3::new(1.0, 0.0, 0.0);

    fn p(x: f64, y: f64) -> DVec3 {
        DVec3::new(x, y, 0.0)
    }

    #[test]
    fn circle_boundary_inclusive() {
        assert!(in_circle_2d(O, 3.0, p(3.0, 0.0)));
        assert!(!in_circle_2d(O, 3.0, p(3.0001, 0.0)));
        assert!(!in_circle_2d(O, 0.0, O));
    }

    #[test]
    fn circle_ignores_z() {
        assert!(in_circle_2d(O, 1.0, DVec3::new(0.5, 0.0, 99.0)));
    }

    #[test]
    fn ring_excludes_inner_disc() {
        assert!(in_ring_2d(O, 2.0, 4.0, p(3.0, 0.0)));
        assert!(!in_ring_2d(O, 2.0, 4.0, p(1.0, 0.0)));
        assert!(in_ring_2d(O, 2.0, 4.0, p(2.0, 0.0)));
        assert!(!in_ring_2d(O, 5.0, 4.0, p(4.5, 0.0)));
    }

    #[test]
    fn cone_respects_angle_and_range() {
        // 90 degree cone looking down +X with range 5.
        assert!(in_cone_2d(O, FWD, 90.0, 5.0, p(3.0, 1.0)));
        assert!(in_cone_2d(O, FWD, 90.0, 5.0, p(3.0, -1.0)));
        assert!(!in_cone_2d(O, FWD, 90.0, 5.0, p(1.0, 2.0)));
        assert!(!in_cone_2d(O, FWD, 90.0, 5.0, p(6.0, 0.0)));
        assert!(in_cone_2d(O, FWD, 90.0, 5.0, O), "apex is inside");
    }

    #[test]
    fn rect_is_forward_only() {
        assert!(in_rect_2d(O, FWD, 2.0, 6.0, p(4.0, 0.9)));
        assert!(!in_rect_2d(O, FWD, 2.0, 6.0, p(4.0, 1.1)));
        assert!(!in_rect_2d(O, FWD, 2.0, 6.0, p(-0.5, 0.0)));
        assert!(!in_rect_2d(O, FWD, 2.0, 6.0, p(6.5, 0.0)));
    }

    #[test]
    fn rect_follows_direction() {
        let dir = p(0.0, 1.0);
        assert!(in_rect_2d(O, dir, 2.0, 6.0, p(0.5, 4.0)));
        assert!(!in_rect_2d(O, dir, 2.0, 6.0, p(4.0, 0.5)));
    }
}
