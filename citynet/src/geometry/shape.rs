use serde::{Deserialize, Serialize};

use crate::algorithms::winding::point_in_polygon;
use crate::geometry::math::{bbox_of, polygon_area, polygon_centroid};
use crate::geometry::segment::Segment;
use crate::geometry::tolerance::{EPS_COLLINEAR, EPS_FACE_AREA, EPS_POS};
use crate::model::Vec2;

/// A block boundary: an implicitly closed ring.
///
/// Winding is read in the y-down world frame: a ring that runs clockwise on
/// screen has a positive shoelace area and is solid; the reverse is a hole.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub points: Vec<Vec2>,
    /// Primary growth direction, set once by subdivision and reused by both waves.
    #[serde(default, rename = "guideVector", skip_serializing_if = "Option::is_none")]
    pub guide_vector: Option<Vec2>,
}

impl Shape {
    pub fn new(points: Vec<Vec2>) -> Self {
        Shape { points, guide_vector: None }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn signed_area(&self) -> f64 {
        polygon_area(&self.points)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_solid(&self) -> bool {
        self.signed_area() > EPS_FACE_AREA
    }

    pub fn is_hole(&self) -> bool {
        self.signed_area() < -EPS_FACE_AREA
    }

    pub fn contains(&self, p: Vec2) -> bool {
        point_in_polygon(p, &self.points)
    }

    pub fn centroid(&self) -> Vec2 {
        polygon_centroid(&self.points)
    }

    pub fn bbox(&self) -> Option<(Vec2, Vec2)> {
        bbox_of(&self.points)
    }

    pub fn segments(&self) -> Vec<Segment> {
        let n = self.points.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n)
            .map(|i| Segment::new(self.points[i], self.points[(i + 1) % n]))
            .filter(|s| !s.is_degenerate())
            .collect()
    }

    /// Unit normal at vertex `i` pointing into the shape's interior.
    pub fn inward_normal_at(&self, i: usize) -> Option<Vec2> {
        let n = self.points.len();
        if n < 3 || i >= n {
            return None;
        }
        let prev = self.points[(i + n - 1) % n];
        let cur = self.points[i];
        let next = self.points[(i + 1) % n];
        let e_in = (cur - prev).normalize();
        let e_out = (next - cur).normalize();
        // Positive area: the interior lies to the left of every edge in math orientation
        let mut normal = (e_in.perp() + e_out.perp()).normalize();
        if normal == Vec2::ZERO {
            normal = e_in.perp();
        }
        if self.signed_area() < 0.0 {
            normal = -normal;
        }
        if normal == Vec2::ZERO { None } else { Some(normal) }
    }

    /// Copy with duplicate and collinear vertices removed.
    pub fn simplified(&self) -> Shape {
        Shape {
            points: simplify_ring(&self.points),
            guide_vector: self.guide_vector,
        }
    }

    pub fn reversed(&self) -> Shape {
        let mut points = self.points.clone();
        points.reverse();
        Shape { points, guide_vector: self.guide_vector }
    }
}

/// Drop consecutive duplicates (wrap included) and vertices whose neighbours
/// are collinear with them, until nothing changes.
pub fn simplify_ring(points: &[Vec2]) -> Vec<Vec2> {
    let mut pts: Vec<Vec2> = Vec::with_capacity(points.len());
    for &p in points {
        if pts.last().map_or(true, |q: &Vec2| !q.approx_eq(p, EPS_POS)) {
            pts.push(p);
        }
    }
    while pts.len() > 1 && pts[0].approx_eq(pts[pts.len() - 1], EPS_POS) {
        pts.pop();
    }
    loop {
        let n = pts.len();
        if n < 3 {
            return pts;
        }
        let mut removed = false;
        let mut i = 0;
        while i < pts.len() && pts.len() >= 3 {
            let n = pts.len();
            let prev = pts[(i + n - 1) % n];
            let cur = pts[i];
            let next = pts[(i + 1) % n];
            let a = (cur - prev).normalize();
            let b = (next - cur).normalize();
            if a.cross(b).abs() <= EPS_COLLINEAR || a == Vec2::ZERO || b == Vec2::ZERO {
                pts.remove(i);
                removed = true;
            } else {
                i += 1;
            }
        }
        if !removed {
            return pts;
        }
    }
}
