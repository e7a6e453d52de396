//! Segment/capsule geometry, planar rotation and the projectile-arc helper.

use glam::DVec3;

/// Unit forward vector of the frame (X forward).
pub const FORWARD: DVec3 = DVec3::new(1.0, 0.0, 0.0);

#[inline]
pub fn length2d(v: DVec3) -> f64 {
    (v.x * v.x + v.y * v.y).sqrt()
}

#[inline]
pub fn distance_sq_2d(a: DVec3, b: DVec3) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

#[inline]
pub fn distance2d(a: DVec3, b: DVec3) -> f64 {
    distance_sq_2d(a, b).sqrt()
}

/// Signed XY-plane angle from `v` to `to`, in radians. Left-handed: a positive
/// angle rotates forward toward right.
#[inline]
pub fn radian2d(v: DVec3, to: DVec3) -> f64 {
    let sin = v.x * to.y - to.x * v.y;
    let cos = v.x * to.x + v.y * to.y;
    -sin.atan2(cos)
}

/// Like [`radian2d`] but in degrees.
#[inline]
pub fn angle2d(v: DVec3, to: DVec3) -> f64 {
    radian2d(v, to).to_degrees()
}

/// Rotate `v` around the Z axis by `alpha` radians (left-handed). Z is kept.
#[inline]
pub fn rotate2d(v: DVec3, alpha: f64) -> DVec3 {
    let (s, c) = alpha.sin_cos();
    DVec3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
}

/// Like [`rotate2d`] but in degrees.
#[inline]
pub fn rotate2d_deg(v: DVec3, alpha_deg: f64) -> DVec3 {
    rotate2d(v, alpha_deg.to_radians())
}

/// Normalize in the XY plane; a zero-length input falls back to [`FORWARD`].
#[inline]
pub fn normalize2d(v: DVec3) -> DVec3 {
    let len_sq = v.x * v.x + v.y * v.y;
    if len_sq == 0.0 {
        return FORWARD;
    }
    let inv = 1.0 / len_sq.sqrt();
    DVec3::new(v.x * inv, v.y * inv, v.z)
}

#[inline]
pub fn lerp(a: DVec3, b: DVec3, t: f64) -> DVec3 {
    a + (b - a) * t
}

/// Scalar division; dividing by zero returns the input unchanged.
#[inline]
pub fn div(v: DVec3, s: f64) -> DVec3 {
    if s == 0.0 {
        return v;
    }
    v / s
}

/// Scalar division in the XY plane; dividing by zero returns the input
/// unchanged. Z is kept.
#[inline]
pub fn div2d(v: DVec3, s: f64) -> DVec3 {
    if s == 0.0 {
        return v;
    }
    DVec3::new(v.x / s, v.y / s, v.z)
}

/// Closest point to `point` on the XY-projected segment `[seg_a, seg_b]`.
/// The result carries `seg_a.z`.
pub fn closest_point_on_segment_2d(seg_a: DVec3, seg_b: DVec3, point: DVec3) -> DVec3 {
    let vl = DVec3::new(seg_b.x - seg_a.x, seg_b.y - seg_a.y, 0.0);
    let len_sq = vl.x * vl.x + vl.y * vl.y;
    if len_sq <= 1e-12 {
        return seg_a;
    }
    let vp = DVec3::new(point.x - seg_a.x, point.y - seg_a.y, 0.0);
    let ratio = ((vp.x * vl.x + vp.y * vl.y) / len_sq).clamp(0.0, 1.0);
    DVec3::new(seg_a.x + vl.x * ratio, seg_a.y + vl.y * ratio, seg_a.z)
}

/// Whether a 2D capsule (segment `[p1, p2]` inflated by `radius`) covers `point`.
#[inline]
pub fn capsule_hits_point_2d(p1: DVec3, p2: DVec3, radius: f64, point: DVec3) -> bool {
    distance_sq_2d(closest_point_on_segment_2d(p1, p2, point), point) <= radius * radius
}

/// Whether a 2D capsule overlaps a circle.
#[inline]
pub fn capsule_hits_circle_2d(
    p1: DVec3,
    p2: DVec3,
    radius: f64,
    center: DVec3,
    circle_radius: f64,
) -> bool {
    let r = radius + circle_radius;
    distance_sq_2d(closest_point_on_segment_2d(p1, p2, center), center) <= r * r
}

/// Whether two 2D capsules overlap. Approximated by testing the second
/// capsule's endpoints against the first, which is exact for the segment
/// lengths used by hit volumes here.
#[inline]
pub fn capsule_hits_capsule_2d(
    a1: DVec3,
    a2: DVec3,
    ra: f64,
    b1: DVec3,
    b2: DVec3,
    rb: f64,
) -> bool {
    capsule_hits_circle_2d(a1, a2, ra, b1, rb) || capsule_hits_circle_2d(a1, a2, ra, b2, rb)
}

/// Suggest a launch velocity that carries a projectile from `start` to `end`
/// along a gravity arc. `arc_param` selects the arc: 0 launches straight up,
/// 1 launches flat along the line of sight. `override_gravity_z` of ~0 uses
/// the default 980 units/s^2. Returns `(velocity, travel_time)`, or `None`
/// when the arc cannot reach the target.
pub fn suggest_projectile_velocity_custom_arc(
    start: DVec3,
    end: DVec3,
    override_gravity_z: f64,
    arc_param: f64,
) -> Option<(DVec3, f64)> {
    let to_end = end - start;
    let dist = to_end.length();
    if dist <= 1e-7 {
        return None;
    }
    let gravity_z = if override_gravity_z.abs() < 1e-7 {
        980.0
    } else {
        override_gravity_z
    };

    let dir = to_end / dist;
    let launch_dir = lerp(DVec3::Z, dir, arc_param).normalize();

    // Split into planar reach and height difference; solve the ballistic
    // time for the chosen launch slope a = vz / v_planar.
    let planar = (launch_dir.x * launch_dir.x + launch_dir.y * launch_dir.y).sqrt();
    if planar <= 1e-9 {
        return None;
    }
    let a = launch_dir.z / planar;
    let reach = (to_end.x * to_end.x + to_end.y * to_end.y).sqrt();
    let rise = to_end.z;
    if reach * a - rise <= 0.0 {
        return None;
    }
    let move_time = (2.0 * (reach * a - rise) / gravity_z).sqrt();
    let v_planar = reach / move_time;
    let v_z = a * v_planar;
    let speed = (v_planar * v_planar + v_z * v_z).sqrt();
    Some((launch_dir * speed, move_time))
}
