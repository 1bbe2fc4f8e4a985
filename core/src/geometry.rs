//! 3-vector arithmetic for scan-axis geometry
//!
//! Slice ordering projects each slice position onto the series' scan axis,
//! the normal of the image plane. Only the three operations needed for that
//! projection live here.

/// A 3D vector in patient space
pub type Vec3 = [f64; 3];

/// Component-wise difference `a - b`
pub fn subtract(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Cross product `a x b`
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Dot product `a . b`
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
