//! Geometry primitives on 3-D points.
//!
//! Small pure functions shared by the mesh container and the edit operators.
//! All of them work on `nalgebra` points and vectors in `f64`.

use nalgebra::{Point3, Vector3};

/// Vector from `tail` to `head`.
#[inline]
pub fn make_vector(head: &Point3<f64>, tail: &Point3<f64>) -> Vector3<f64> {
    head - tail
}

/// Squared distance between two points.
#[inline]
pub fn length2(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm_squared()
}

/// Unit normal of the triangle `(a, b, c)` following its winding.
///
/// Returns `None` for a zero-area triangle, which has no defined normal.
pub fn unit_normal(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Vector3<f64>> {
    let n = make_vector(b, a).cross(&make_vector(c, a));
    let mag = n.norm();
    if mag > 0.0 {
        Some(n / mag)
    } else {
        None
    }
}

/// Area of the triangle `(a, b, c)`.
pub fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    0.5 * make_vector(b, a).cross(&make_vector(c, a)).norm()
}

/// Centroid of the triangle `(a, b, c)`.
pub fn centroid(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Point3<f64> {
    Point3::from((a.coords + b.coords + c.coords) / 3.0)
}

/// Interior angle at `apex` of the triangle `(apex, b, c)`, in degrees.
///
/// Uses the law of cosines with the cosine clamped to `[-1, 1]`. Returns
/// `None` when either edge leaving `apex` has zero length.
pub fn angle_at(apex: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<f64> {
    let a2 = length2(b, c);
    let b2 = length2(c, apex);
    let c2 = length2(apex, b);

    let denom = 2.0 * (b2 * c2).sqrt();
    if denom <= 0.0 {
        return None;
    }

    let cos_a = ((b2 + c2 - a2) / denom).clamp(-1.0, 1.0);
    Some(cos_a.acos().to_degrees())
}
