use crate::model::Vec2;

/// Squared distance from `p` to segment AB and the clamped parameter of the
/// closest point.
pub fn seg_distance_sq(p: Vec2, a: Vec2, b: Vec2) -> (f64, f64) {
    let v = b - a;
    let w = p - a;
    let vv = v.length_sq();
    let t = if vv > 0.0 { (w.dot(v) / vv).clamp(0.0, 1.0) } else { 0.0 };
    let proj = a + v * t;
    (p.distance_sq(proj), t)
}

pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let (_, t) = seg_distance_sq(p, a, b);
    a + (b - a) * t
}

pub fn dist_point_to_seg(p: Vec2, a: Vec2, b: Vec2) -> f64 {
    seg_distance_sq(p, a, b).0.sqrt()
}

/// Signed shoelace area. Positive for loops that are clockwise in the
/// y-down world frame.
pub fn polygon_area(poly: &[Vec2]) -> f64 {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut a = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        a += poly[i].cross(poly[j]);
    }
    0.5 * a
}

pub fn polygon_centroid(poly: &[Vec2]) -> Vec2 {
    let n = poly.len();
    if n == 0 {
        return Vec2::ZERO;
    }
    let mut c = Vec2::ZERO;
    let mut a = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let cross = poly[i].cross(poly[j]);
        a += cross;
        c += (poly[i] + poly[j]) * cross;
    }
    let a = a * 0.5;
    if a.abs() < crate::geometry::tolerance::EPS_FACE_AREA {
        // Degenerate ring: fall back to the vertex average
        let sum = poly.iter().fold(Vec2::ZERO, |acc, p| acc + *p);
        return sum / n as f64;
    }
    c / (6.0 * a)
}

pub fn bbox_of(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    let mut lo = first;
    let mut hi = first;
    for p in &points[1..] {
        lo.x = lo.x.min(p.x);
        lo.y = lo.y.min(p.y);
        hi.x = hi.x.max(p.x);
        hi.y = hi.y.max(p.y);
    }
    Some((lo, hi))
}

/// Unsigned angle between two directions, in radians `[0, π]`.
pub fn angle_between(a: Vec2, b: Vec2) -> f64 {
    let na = a.normalize();
    let nb = b.normalize();
    na.dot(nb).clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_point_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(closest_point_on_segment(Vec2::new(-5.0, 3.0), a, b), a);
        assert_eq!(closest_point_on_segment(Vec2::new(4.0, 3.0), a, b), Vec2::new(4.0, 0.0));
        assert!((dist_point_to_seg(Vec2::new(4.0, 3.0), a, b) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_of_square() {
        let sq = [
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ];
        assert!(polygon_centroid(&sq).approx_eq(Vec2::new(2.0, 2.0), 1e-12));
        assert!((polygon_area(&sq) - 16.0).abs() < 1e-12);
    }
}
