use serde::{Deserialize, Serialize};

use crate::geometry::intersect::{intersect_segments, SegIntersection};
use crate::geometry::math::{closest_point_on_segment, seg_distance_sq};
use crate::geometry::tolerance::{EPS_DENOM, EPS_POS};
use crate::model::{quantize, QKey, Vec2};

/// Order-independent key of a segment's quantized endpoints.
pub type SegKey = (QKey, QKey);

#[inline]
pub fn seg_key(a: Vec2, b: Vec2) -> SegKey {
    let ka = quantize(a);
    let kb = quantize(b);
    if ka <= kb { (ka, kb) } else { (kb, ka) }
}

/// Undirected road piece. Equality is symmetric in the endpoints and ignores
/// the bridge flag.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Segment {
    pub p1: Vec2,
    pub p2: Vec2,
    #[serde(default, rename = "isBridge")]
    pub is_bridge: bool,
}

impl PartialEq for Segment {
    fn eq(&self, o: &Segment) -> bool {
        (self.p1 == o.p1 && self.p2 == o.p2) || (self.p1 == o.p2 && self.p2 == o.p1)
    }
}

impl Segment {
    pub fn new(p1: Vec2, p2: Vec2) -> Self {
        Segment { p1, p2, is_bridge: false }
    }

    pub fn bridge(p1: Vec2, p2: Vec2) -> Self {
        Segment { p1, p2, is_bridge: true }
    }

    pub fn key(&self) -> SegKey {
        seg_key(self.p1, self.p2)
    }

    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }

    /// Unit direction from `p1` to `p2`.
    pub fn direction(&self) -> Vec2 {
        (self.p2 - self.p1).normalize()
    }

    pub fn is_degenerate(&self) -> bool {
        self.p1.approx_eq(self.p2, EPS_POS)
    }

    pub fn aabb(&self) -> (Vec2, Vec2) {
        (
            Vec2::new(self.p1.x.min(self.p2.x), self.p1.y.min(self.p2.y)),
            Vec2::new(self.p1.x.max(self.p2.x), self.p1.y.max(self.p2.y)),
        )
    }

    pub fn classify(&self, o: &Segment) -> SegIntersection {
        intersect_segments(self.p1, self.p2, o.p1, o.p2, EPS_POS, EPS_DENOM)
    }

    /// Point where the two segments meet, endpoint touches included.
    /// Parallel, collinear and disjoint pairs give `None`.
    pub fn intersection(&self, o: &Segment) -> Option<Vec2> {
        self.classify(o).point()
    }

    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        closest_point_on_segment(p, self.p1, self.p2)
    }

    pub fn distance_to(&self, p: Vec2) -> f64 {
        seg_distance_sq(p, self.p1, self.p2).0.sqrt()
    }

    pub fn has_endpoint(&self, p: Vec2, eps: f64) -> bool {
        self.p1.approx_eq(p, eps) || self.p2.approx_eq(p, eps)
    }

    /// The endpoint both segments share, if any.
    pub fn shared_vertex(&self, o: &Segment, eps: f64) -> Option<Vec2> {
        [self.p1, self.p2].into_iter().find(|p| o.has_endpoint(*p, eps))
    }

    /// True when both segments lie on one line and overlap over a span longer
    /// than `eps` (touching end to end does not count).
    pub fn collinear_overlap(&self, o: &Segment, eps: f64) -> bool {
        match self.classify(o) {
            SegIntersection::CollinearOverlap { t0, t1, .. } => (t1 - t0) * self.length() > eps,
            _ => false,
        }
    }

    /// Split at `p`, both halves inheriting the bridge flag.
    pub fn split_at(&self, p: Vec2) -> (Segment, Segment) {
        (
            Segment { p1: self.p1, p2: p, is_bridge: self.is_bridge },
            Segment { p1: p, p2: self.p2, is_bridge: self.is_bridge },
        )
    }

    /// Parameter of the projection of `p` onto the carrier line.
    pub fn project_t(&self, p: Vec2) -> f64 {
        let d = self.p2 - self.p1;
        let dd = d.length_sq();
        if dd <= 0.0 { 0.0 } else { (p - self.p1).dot(d) / dd }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn equality_is_symmetric_and_ignores_bridge() {
        let a = Segment::new(v(0.0, 0.0), v(5.0, 1.0));
        let b = Segment::bridge(v(5.0, 1.0), v(0.0, 0.0));
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn split_keeps_bridge_flag() {
        let s = Segment::bridge(v(0.0, 0.0), v(10.0, 0.0));
        let (l, r) = s.split_at(v(4.0, 0.0));
        assert!(l.is_bridge && r.is_bridge);
        assert_eq!(l.p2, r.p1);
    }

    #[test]
    fn shared_vertex_and_overlap() {
        let a = Segment::new(v(0.0, 0.0), v(10.0, 0.0));
        let b = Segment::new(v(10.0, 0.0), v(10.0, 5.0));
        let c = Segment::new(v(5.0, 0.0), v(15.0, 0.0));
        assert_eq!(a.shared_vertex(&b, 1e-9), Some(v(10.0, 0.0)));
        assert!(a.collinear_overlap(&c, 1e-6));
        assert!(!a.collinear_overlap(&b, 1e-6));
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        let a = Segment::new(v(0.0, 0.0), v(10.0, 0.0));
        let b = Segment::new(v(0.0, 1.0), v(10.0, 1.0));
        assert!(a.intersection(&b).is_none());
    }
}
