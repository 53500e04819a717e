//! Circle and ellipse overlap tests plus the vector helpers the simulation
//! leans on every frame.
//!
//! Everything here is pure. The overlap tests compare squared distances so
//! the hot projectile-vs-enemy loop never takes a square root.

use bevy::prelude::*;

/// Anything with a circular collision extent.
pub trait CircleBody {
    fn center(&self) -> Vec2;
    fn radius(&self) -> f32;
}

/// True if two circles intersect (touching edges do not count).
pub fn circle_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let reach = radius_a + radius_b;
    distance_squared(a, b) < reach * reach
}

/// [`circle_overlap`] for two bodies.
pub fn bodies_overlap(a: &impl CircleBody, b: &impl CircleBody) -> bool {
    circle_overlap(a.center(), a.radius(), b.center(), b.radius())
}

/// Ellipse (axis aligned, semi-axes `radii`) against a circle.
///
/// The circle radius is folded into both semi-axes and the offset is
/// normalized against them, so a unit-circle test decides membership.
pub fn ellipse_circle_overlap(center: Vec2, radii: Vec2, point: Vec2, radius: f32) -> bool {
    let rx = radii.x + radius;
    let ry = radii.y + radius;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let nx = (point.x - center.x) / rx;
    let ny = (point.y - center.y) / ry;
    nx * nx + ny * ny < 1.0
}

pub fn distance(a: Vec2, b: Vec2) -> f32 {
    distance_squared(a, b).sqrt()
}

pub fn distance_squared(a: Vec2, b: Vec2) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

/// Unit vector from `from` toward `to`, or zero when the points coincide.
pub fn direction(from: Vec2, to: Vec2) -> Vec2 {
    normalize(to - from)
}

/// Unit vector along `v`, or zero for a zero-length input.
pub fn normalize(v: Vec2) -> Vec2 {
    let length = v.length();
    if length == 0.0 {
        Vec2::ZERO
    } else {
        v / length
    }
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut wrapped = angle % TAU;
    if wrapped > PI {
        wrapped -= TAU;
    } else if wrapped <= -PI {
        wrapped += TAU;
    }
    wrapped
}

/// Whether `point` lies inside the circular sector anchored at `origin`,
/// starting at `start_angle` and sweeping `sweep` radians counter-clockwise.
pub fn point_in_sector(origin: Vec2, radius: f32, start_angle: f32, sweep: f32, point: Vec2) -> bool {
    if distance_squared(origin, point) > radius * radius {
        return false;
    }
    if sweep >= std::f32::consts::TAU {
        return true;
    }
    let offset = point - origin;
    if offset == Vec2::ZERO {
        return true;
    }
    let relative = wrap_angle(offset.y.atan2(offset.x) - start_angle);
    let relative = if relative < 0.0 {
        relative + std::f32::consts::TAU
    } else {
        relative
    };
    relative <= sweep
}

/// Axis-aligned world rectangle starting at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp `point` so it keeps `radius` clearance from every edge.
    pub fn clamp(&self, point: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            point.x.clamp(radius, (self.width - radius).max(radius)),
            point.y.clamp(radius, (self.height - radius).max(radius)),
        )
    }

    /// True if `point` is farther than `margin` outside the rectangle.
    pub fn is_outside(&self, point: Vec2, margin: f32) -> bool {
        point.x < -margin
            || point.y < -margin
            || point.x > self.width + margin
            || point.y > self.height + margin
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn touching_circles_do_not_overlap() {
        assert!(!circle_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(circle_overlap(Vec2::ZERO, 5.0, Vec2::new(9.9, 0.0), 5.0));
    }

    #[test]
    fn direction_of_coincident_points_is_zero() {
        let p = Vec2::new(42.0, -7.0);
        assert_eq!(direction(p, p), Vec2::ZERO);
        assert_eq!(normalize(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn direction_is_unit_length() {
        let d = direction(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0));
        assert!((d.length() - 1.0).abs() < 1e-5);
        assert!((d.x - 0.6).abs() < 1e-5);
        assert!((d.y - 0.8).abs() < 1e-5);
    }

    #[test]
    fn ellipse_uses_separate_axes() {
        let center = Vec2::ZERO;
        let radii = Vec2::new(100.0, 20.0);
        assert!(ellipse_circle_overlap(center, radii, Vec2::new(105.0, 0.0), 10.0));
        assert!(!ellipse_circle_overlap(center, radii, Vec2::new(0.0, 35.0), 10.0));
        assert!(ellipse_circle_overlap(center, radii, Vec2::new(0.0, 25.0), 10.0));
    }

    #[test]
    fn sector_membership_handles_wraparound() {
        let origin = Vec2::ZERO;
        // Sector from 135 degrees sweeping 90 degrees crosses the -PI/PI seam.
        let start = 3.0 * PI / 4.0;
        let sweep = PI / 2.0;
        assert!(point_in_sector(origin, 50.0, start, sweep, Vec2::new(-30.0, 0.0)));
        assert!(!point_in_sector(origin, 50.0, start, sweep, Vec2::new(30.0, 0.0)));
        assert!(!point_in_sector(origin, 20.0, start, sweep, Vec2::new(-30.0, 0.0)));
    }

    #[test]
    fn bounds_clamp_and_outside() {
        let bounds = WorldBounds::new(1000.0, 500.0);
        assert_eq!(bounds.clamp(Vec2::new(-10.0, 900.0), 20.0), Vec2::new(20.0, 480.0));
        assert!(bounds.is_outside(Vec2::new(-101.0, 10.0), 100.0));
        assert!(!bounds.is_outside(Vec2::new(-99.0, 10.0), 100.0));
    }
}
