use crate::foundation::core::{Point, Vec2};

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Angle of `v` in radians, measured the same way `Affine::rotate` turns.
pub(crate) fn angle_of(v: Vec2) -> f64 {
    v.y.atan2(v.x)
}

/// Wrap an angle into `(-pi, pi]`.
pub(crate) fn wrap_angle(theta: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut t = theta % TAU;
    if t <= -PI {
        t += TAU;
    } else if t > PI {
        t -= TAU;
    }
    t
}

/// Flip a bottom-left-origin point into top-left-origin pixel space.
pub(crate) fn flip_y(p: Point, height: f64) -> Point {
    Point::new(p.x, height - p.y)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
