//! Planar and spatial math helpers for the combat core.
//!
//! Coordinate frame is left-handed: X forward, Y right, Z up. "2D" operations
//! work in the XY plane and leave Z untouched. Positions and directions are
//! `glam::DVec3`; helpers are free functions so callers are not forced through
//! a bespoke vector type.

pub mod geom;
pub mod rotate;
pub mod shapes;

pub use geom::{
    angle2d, capsule_hits_capsule_2d, capsule_hits_circle_2d, capsule_hits_point_2d,
    closest_point_on_segment_2d, distance2d, distance_sq_2d, div, div2d, length2d, lerp,
    normalize2d, radian2d, rotate2d, rotate2d_deg, suggest_projectile_velocity_custom_arc,
};
pub use rotate::{rotate_around_axis, rotate_zyx};
pub use shapes::{in_circle_2d, in_cone_2d, in_rect_2d, in_ring_2d};
