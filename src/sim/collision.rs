//! Circle and radius predicates shared by every resolver
//!
//! Everything in the arena is a circle. Body-to-body contact uses the strict
//! radius-sum test; area effects include their boundary.

use glam::Vec2;

/// Two circles overlap (strict: touching edges do not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// `point` lies inside or on a circle of `radius` around `center`
#[inline]
pub fn within_radius(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance(point) <= radius
}

/// Unit direction from `from` to `to`, or None when they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Option<Vec2> {
    let delta = to - from;
    let dist = delta.length();
    if dist > 0.0 { Some(delta / dist) } else { None }
}
