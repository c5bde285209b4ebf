use serde::Serialize;

use crate::algorithms::network::RoadNetwork;
use crate::geometry::math::seg_distance_sq;
use crate::model::Vec2;

/// What a pointer at some world position lands on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pick {
    Vertex { pos: Vec2, dist: f64 },
    Segment { index: usize, t: f64, dist: f64 },
}

/// Vertices win over segments; among each, the closest within `tol`.
pub fn pick(net: &RoadNetwork, p: Vec2, tol: f64) -> Option<Pick> {
    if !p.is_finite() || !(tol >= 0.0) {
        return None;
    }
    if let Some(v) = net.nearest_vertex(p, tol) {
        return Some(Pick::Vertex { pos: v, dist: v.distance(p) });
    }
    let pad = Vec2::new(tol, tol);
    let tol2 = tol * tol;
    let mut best: Option<(usize, f64, f64)> = None;
    for i in net.segments_near(p - pad, p + pad) {
        let Some(s) = net.segments().get(i) else { continue };
        let (d2, t) = seg_distance_sq(p, s.p1, s.p2);
        if d2 <= tol2 && best.map_or(true, |(_, bd, _)| d2 < bd) {
            best = Some((i, d2, t));
        }
    }
    best.map(|(index, d2, t)| Pick::Segment { index, t, dist: d2.sqrt() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::segment::Segment;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    fn net() -> RoadNetwork {
        RoadNetwork::from_segments(vec![
            Segment::new(v(0.0, 0.0), v(100.0, 0.0)),
            Segment::new(v(100.0, 0.0), v(100.0, 100.0)),
        ])
    }

    #[test]
    fn vertex_beats_segment() {
        match pick(&net(), v(99.0, 1.0), 3.0) {
            Some(Pick::Vertex { pos, .. }) => assert_eq!(pos, v(100.0, 0.0)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn segment_with_parameter() {
        match pick(&net(), v(25.0, 2.0), 3.0) {
            Some(Pick::Segment { index, t, dist }) => {
                assert_eq!(index, 0);
                assert!((t - 0.25).abs() < 1e-12);
                assert!((dist - 2.0).abs() < 1e-12);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(pick(&net(), v(50.0, 50.0), 3.0).is_none());
    }
}
