use serde::{Deserialize, Serialize};

use crate::geometry::segment::Segment;
use crate::geometry::tolerance::EPS_POS;
use crate::model::Vec2;

/// Polyline, optionally closed. Arterials are reported as paths.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Vec2>,
    #[serde(default)]
    pub closed: bool,
}

impl Path {
    pub fn new(points: Vec<Vec2>, closed: bool) -> Self {
        Path { points, closed }
    }

    pub fn open(points: Vec<Vec2>) -> Self {
        Path { points, closed: false }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<Vec2> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    /// Consecutive pieces; the closing piece only for closed paths of more
    /// than two points.
    pub fn segments(&self) -> Vec<Segment> {
        let mut out: Vec<Segment> = self
            .points
            .windows(2)
            .map(|w| Segment::new(w[0], w[1]))
            .collect();
        if self.closed && self.points.len() > 2 {
            if let (Some(&a), Some(&b)) = (self.points.last(), self.points.first()) {
                out.push(Segment::new(a, b));
            }
        }
        out
    }

    pub fn length(&self) -> f64 {
        self.segments().iter().map(Segment::length).sum()
    }

    /// Point at arc length `d` from the start, clamped to the path.
    pub fn point_at_length(&self, d: f64) -> Option<Vec2> {
        let first = self.first()?;
        if d <= 0.0 {
            return Some(first);
        }
        let mut acc = 0.0;
        let mut end = first;
        for s in self.segments() {
            let len = s.length();
            if acc + len >= d && len > 0.0 {
                return Some(s.p1.lerp(s.p2, (d - acc) / len));
            }
            acc += len;
            end = s.p2;
        }
        Some(end)
    }

    pub fn intersections_with_segment(&self, seg: &Segment) -> Vec<Vec2> {
        let mut hits: Vec<Vec2> = Vec::new();
        for s in self.segments() {
            if let Some(p) = s.intersection(seg) {
                if !hits.iter().any(|h| h.approx_eq(p, EPS_POS)) {
                    hits.push(p);
                }
            }
        }
        hits
    }

    pub fn intersections_with_path(&self, other: &Path) -> Vec<Vec2> {
        let mut hits: Vec<Vec2> = Vec::new();
        for seg in other.segments() {
            for p in self.intersections_with_segment(&seg) {
                if !hits.iter().any(|h| h.approx_eq(p, EPS_POS)) {
                    hits.push(p);
                }
            }
        }
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn loop_segment_only_when_closed_and_long_enough() {
        let tri = vec![v(0.0, 0.0), v(1.0, 0.0), v(0.0, 1.0)];
        assert_eq!(Path::new(tri.clone(), true).segments().len(), 3);
        assert_eq!(Path::new(tri, false).segments().len(), 2);
        assert_eq!(Path::new(vec![v(0.0, 0.0), v(1.0, 0.0)], true).segments().len(), 1);
    }

    #[test]
    fn point_at_length_walks_segments() {
        let p = Path::open(vec![v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0)]);
        assert_eq!(p.length(), 20.0);
        assert!(p.point_at_length(15.0).unwrap().approx_eq(v(10.0, 5.0), 1e-12));
        assert_eq!(p.point_at_length(99.0), Some(v(10.0, 10.0)));
    }

    #[test]
    fn path_path_crossings() {
        let a = Path::open(vec![v(0.0, 5.0), v(20.0, 5.0)]);
        let b = Path::open(vec![v(5.0, 0.0), v(5.0, 10.0), v(15.0, 10.0), v(15.0, 0.0)]);
        assert_eq!(a.intersections_with_path(&b).len(), 2);
    }
}
