//! Arterial detection: splitting a block boundary into runs between sharp
//! corners.

use crate::geometry::math::angle_between;
use crate::geometry::path::Path;
use crate::geometry::shape::Shape;
use crate::geometry::tolerance::EPS_POS;
use crate::model::Vec2;

fn dedup_ring(points: &[Vec2]) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().map_or(true, |q| !q.approx_eq(p, EPS_POS)) {
            out.push(p);
        }
    }
    while out.len() > 1 && out[0].approx_eq(out[out.len() - 1], EPS_POS) {
        out.pop();
    }
    out
}

/// Turn angle at each vertex of a closed ring, in radians.
pub fn turn_angles(points: &[Vec2]) -> Vec<f64> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            angle_between(cur - prev, next - cur)
        })
        .collect()
}

/// Arterials of one block. A boundary without sharp corners is a single
/// closed arterial; otherwise each run between consecutive sharp corners is
/// an open one.
pub fn detect_arterials(shape: &Shape, threshold_deg: f64) -> Vec<Path> {
    let pts = dedup_ring(&shape.points);
    let n = pts.len();
    if n < 3 {
        return Vec::new();
    }
    let threshold = threshold_deg.to_radians();
    let sharp: Vec<bool> = turn_angles(&pts).into_iter().map(|a| a > threshold).collect();
    let Some(first) = sharp.iter().position(|&s| s) else {
        return vec![Path::new(pts, true)];
    };

    let mut out = Vec::new();
    let mut run = vec![pts[first]];
    for k in 1..=n {
        let i = (first + k) % n;
        run.push(pts[i]);
        if sharp[i] {
            if run.len() >= 2 {
                out.push(Path::open(std::mem::take(&mut run)));
            }
            run = vec![pts[i]];
        }
    }
    out
}

fn same_arterial(a: &Path, b: &Path) -> bool {
    if a.len() != b.len() || a.closed != b.closed {
        return false;
    }
    let (Some(a0), Some(a1), Some(b0), Some(b1)) = (a.first(), a.last(), b.first(), b.last()) else {
        return false;
    };
    let fwd = a0.approx_eq(b0, EPS_POS) && a1.approx_eq(b1, EPS_POS);
    let rev = a0.approx_eq(b1, EPS_POS) && a1.approx_eq(b0, EPS_POS);
    if !(fwd || rev) {
        return false;
    }
    if a.len() <= 2 {
        return true;
    }
    let mid = a.points[a.len() / 2];
    b.points.iter().any(|p| p.approx_eq(mid, EPS_POS))
}

/// Arterials of every block, with runs shared by neighbouring blocks
/// reported once.
pub fn detect_all(shapes: &[Shape], threshold_deg: f64) -> Vec<Path> {
    let mut out: Vec<Path> = Vec::new();
    for shape in shapes {
        for path in detect_arterials(shape, threshold_deg) {
            if !out.iter().any(|p| same_arterial(p, &path)) {
                out.push(path);
            }
        }
    }
    out
}

/// The longest arterial of a block by arc length.
pub fn longest_arterial(shape: &Shape, threshold_deg: f64) -> Option<Path> {
    detect_arterials(shape, threshold_deg)
        .into_iter()
        .max_by(|a, b| a.length().total_cmp(&b.length()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    fn circle(n: usize, r: f64) -> Shape {
        Shape::new(
            (0..n)
                .map(|i| Vec2::from_angle(i as f64 / n as f64 * std::f64::consts::TAU) * r)
                .collect(),
        )
    }

    #[test]
    fn smooth_boundary_is_one_closed_arterial() {
        let arts = detect_arterials(&circle(36, 50.0), 45.0);
        assert_eq!(arts.len(), 1);
        assert!(arts[0].closed);
        assert_eq!(arts[0].len(), 36);
    }

    #[test]
    fn square_corners_split_into_sides() {
        let sq = Shape::new(vec![v(0.0, 0.0), v(5.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)]);
        let arts = detect_arterials(&sq, 45.0);
        assert_eq!(arts.len(), 4);
        assert!(arts.iter().all(|a| !a.closed && a.len() >= 2));
        let total: f64 = arts.iter().map(Path::length).sum();
        assert!((total - 40.0).abs() < 1e-9);
        // the side with the collinear midpoint keeps it
        assert!(arts.iter().any(|a| a.len() == 3));
    }

    #[test]
    fn shared_side_is_reported_once() {
        let a = Shape::new(vec![v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)]);
        let b = Shape::new(vec![v(10.0, 0.0), v(20.0, 0.0), v(20.0, 10.0), v(10.0, 10.0)]);
        assert_eq!(detect_all(&[a, b], 45.0).len(), 7);
    }

    #[test]
    fn longest_picks_the_long_side() {
        let r = Shape::new(vec![v(0.0, 0.0), v(30.0, 0.0), v(30.0, 10.0), v(0.0, 10.0)]);
        let long = longest_arterial(&r, 45.0).unwrap();
        assert!((long.length() - 30.0).abs() < 1e-9);
    }
}
