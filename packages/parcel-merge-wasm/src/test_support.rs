// Shared fixtures for the unit tests
use geo_types::{polygon, MultiPolygon};

/// Axis-aligned square with its lower-left corner at (x, y).
pub fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
    MultiPolygon::new(vec![polygon![
        (x: x, y: y),
        (x: x + size, y: y),
        (x: x + size, y: y + size),
        (x: x, y: y + size),
        (x: x, y: y),
    ]])
}

pub fn approx_eq(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "value mismatch: {a} vs {b}");
}
