//! Winding number calculation for point-in-polygon testing.
//!
//! Uses horizontal ray casting with signed crossing count to determine
//! the winding number of a point relative to a block boundary.

use crate::model::Vec2;

/// Compute the winding number of a point relative to a polygon.
///
/// Returns the number of times the polygon winds around the point.
/// The sign follows the shoelace sign of the ring; zero means outside.
pub fn winding_number(p: Vec2, polygon: &[Vec2]) -> i32 {
    if polygon.len() < 3 {
        return 0;
    }

    let mut winding = 0i32;
    let n = polygon.len();

    for i in 0..n {
        let p1 = polygon[i];
        let p2 = polygon[(i + 1) % n];
        let cross = (p1 - p).cross(p2 - p);

        if p1.y <= p.y {
            // Upward crossing
            if p2.y > p.y && cross > 0.0 {
                winding += 1;
            }
        } else if p2.y <= p.y && cross < 0.0 {
            // Downward crossing
            winding -= 1;
        }
    }

    winding
}

/// Non-zero rule containment.
#[inline]
pub fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    winding_number(p, polygon) != 0
}
