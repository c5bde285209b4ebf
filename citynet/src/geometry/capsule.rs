use crate::geometry::intersect::{intersect_segments, SegIntersection};
use crate::geometry::math::dist_point_to_seg;
use crate::geometry::tolerance::{EPS_DENOM, EPS_POS};
use crate::model::Vec2;

/// A segment swept by a disc: the footprint of a road stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub a: Vec2,
    pub b: Vec2,
    pub radius: f64,
}

impl Capsule {
    pub fn new(a: Vec2, b: Vec2, radius: f64) -> Self {
        Capsule { a, b, radius }
    }

    /// Minimum distance between the two core segments.
    pub fn core_distance(&self, o: &Capsule) -> f64 {
        match intersect_segments(self.a, self.b, o.a, o.b, EPS_POS, EPS_DENOM) {
            SegIntersection::None => {}
            _ => return 0.0,
        }
        dist_point_to_seg(self.a, o.a, o.b)
            .min(dist_point_to_seg(self.b, o.a, o.b))
            .min(dist_point_to_seg(o.a, self.a, self.b))
            .min(dist_point_to_seg(o.b, self.a, self.b))
    }

    pub fn intersects(&self, o: &Capsule) -> bool {
        self.core_distance(o) <= self.radius + o.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn crossing_cores_touch() {
        let a = Capsule::new(v(0.0, 0.0), v(10.0, 10.0), 0.1);
        let b = Capsule::new(v(0.0, 10.0), v(10.0, 0.0), 0.1);
        assert_eq!(a.core_distance(&b), 0.0);
        assert!(a.intersects(&b));
    }

    #[test]
    fn parallel_capsules_by_radius() {
        let a = Capsule::new(v(0.0, 0.0), v(10.0, 0.0), 1.0);
        let b = Capsule::new(v(0.0, 3.0), v(10.0, 3.0), 1.0);
        assert!((a.core_distance(&b) - 3.0).abs() < 1e-12);
        assert!(!a.intersects(&b));
        let c = Capsule::new(v(0.0, 3.0), v(10.0, 3.0), 2.5);
        assert!(a.intersects(&c));
    }
}
