//! Block extraction by planar face tracing.
//!
//! Vertices are keyed by [`quantize`], so endpoints closer than the key
//! precision fuse into one node. Dangling branches are pruned before tracing;
//! each remaining directed edge is walked once, always leaving a vertex by
//! the first outgoing edge met when sweeping from the reversed incoming edge
//! in decreasing-angle order. In the y-down frame that is the tightest
//! clockwise turn, so bounded faces come out with positive signed area and
//! the unbounded face comes out negative and is discarded.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::geometry::limits::MAX_TRACE_VERTICES;
use crate::geometry::segment::Segment;
use crate::geometry::shape::Shape;
use crate::geometry::tolerance::EPS_ANG;
use crate::model::{quantize, QKey, Vec2};

/// Undirected graph over quantized vertices; neighbours sorted by outgoing angle.
#[derive(Clone, Debug, Default)]
pub struct PlanarGraph {
    verts: Vec<Vec2>,
    adj: Vec<Vec<(f64, usize)>>,
}

impl PlanarGraph {
    pub fn build(segments: &[Segment]) -> Self {
        let mut index: HashMap<QKey, usize> = HashMap::new();
        let mut verts: Vec<Vec2> = Vec::new();
        let mut nbrs: Vec<Vec<usize>> = Vec::new();
        let mut vid = |p: Vec2, verts: &mut Vec<Vec2>, nbrs: &mut Vec<Vec<usize>>| -> usize {
            *index.entry(quantize(p)).or_insert_with(|| {
                verts.push(p);
                nbrs.push(Vec::new());
                verts.len() - 1
            })
        };
        for s in segments {
            let a = vid(s.p1, &mut verts, &mut nbrs);
            let b = vid(s.p2, &mut verts, &mut nbrs);
            if a == b || nbrs[a].contains(&b) {
                continue;
            }
            nbrs[a].push(b);
            nbrs[b].push(a);
        }
        prune_dangling(&mut nbrs);
        let adj = nbrs
            .iter()
            .enumerate()
            .map(|(u, list)| {
                let mut out: Vec<(f64, usize)> =
                    list.iter().map(|&v| ((verts[v] - verts[u]).angle(), v)).collect();
                out.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                out
            })
            .collect();
        PlanarGraph { verts, adj }
    }

    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    pub fn degree(&self, v: usize) -> usize {
        self.adj.get(v).map_or(0, Vec::len)
    }

    /// Outgoing edge at `v` when arriving from `u`.
    fn next_edge(&self, u: usize, v: usize) -> Option<usize> {
        let list = &self.adj[v];
        if list.is_empty() || (list.len() == 1 && list[0].1 == u) {
            return None;
        }
        let back = (self.verts[u] - self.verts[v]).angle();
        let pick = list
            .iter()
            .rev()
            .find(|(ang, _)| *ang < back - EPS_ANG)
            .or_else(|| list.last())?;
        Some(pick.1)
    }

    /// Walk the face to the right of `start -> next`. `None` for dead ends
    /// and runaway traces.
    fn trace(&self, start: usize, next: usize, visited: &mut HashSet<(usize, usize)>) -> Option<Vec<Vec2>> {
        let (mut u, mut v) = (start, next);
        let mut ring = Vec::new();
        loop {
            visited.insert((u, v));
            ring.push(self.verts[u]);
            if ring.len() > MAX_TRACE_VERTICES {
                log::warn!("face trace exceeded {MAX_TRACE_VERTICES} vertices; discarded");
                return None;
            }
            let w = self.next_edge(u, v)?;
            u = v;
            v = w;
            if u == start && v == next {
                return Some(ring);
            }
        }
    }

    /// Every solid face of the graph.
    pub fn faces(&self) -> Vec<Shape> {
        let mut visited: HashSet<(usize, usize)> = HashSet::new();
        let mut shapes = Vec::new();
        let mut discarded = 0usize;
        for u in 0..self.verts.len() {
            for &(_, v) in &self.adj[u] {
                if visited.contains(&(u, v)) {
                    continue;
                }
                match self.trace(u, v, &mut visited) {
                    Some(ring) if ring.len() >= 3 => {
                        let shape = Shape::new(ring);
                        if shape.is_solid() {
                            shapes.push(shape);
                        } else {
                            discarded += 1;
                        }
                    }
                    _ => discarded += 1,
                }
            }
        }
        log::debug!("face tracing: {} solid faces, {discarded} discarded", shapes.len());
        shapes
    }
}

/// Iteratively remove vertices of degree one so only cycles remain.
fn prune_dangling(nbrs: &mut [Vec<usize>]) {
    let mut queue: VecDeque<usize> = (0..nbrs.len()).filter(|&v| nbrs[v].len() == 1).collect();
    while let Some(v) = queue.pop_front() {
        let Some(&w) = nbrs[v].first() else { continue };
        if nbrs[v].len() != 1 {
            continue;
        }
        nbrs[v].clear();
        nbrs[w].retain(|&x| x != v);
        if nbrs[w].len() == 1 {
            queue.push_back(w);
        }
    }
}

/// Enclosed blocks of a road graph.
pub fn detect_shapes(segments: &[Segment]) -> Vec<Shape> {
    PlanarGraph::build(segments).faces()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    fn ring_segments(pts: &[Vec2]) -> Vec<Segment> {
        (0..pts.len()).map(|i| Segment::new(pts[i], pts[(i + 1) % pts.len()])).collect()
    }

    #[test]
    fn square_is_one_solid_face() {
        let segs = ring_segments(&[v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)]);
        let shapes = detect_shapes(&segs);
        assert_eq!(shapes.len(), 1);
        assert!((shapes[0].signed_area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn winding_of_input_does_not_matter() {
        let segs = ring_segments(&[v(0.0, 10.0), v(10.0, 10.0), v(10.0, 0.0), v(0.0, 0.0)]);
        let shapes = detect_shapes(&segs);
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].is_solid());
    }

    #[test]
    fn dangling_chain_is_pruned() {
        let mut segs = ring_segments(&[v(0.0, 0.0), v(10.0, 0.0), v(5.0, 8.0)]);
        segs.push(Segment::new(v(10.0, 0.0), v(20.0, 0.0)));
        segs.push(Segment::new(v(20.0, 0.0), v(25.0, 5.0)));
        let g = PlanarGraph::build(&segs);
        assert_eq!(g.degree(3), 0);
        assert_eq!(detect_shapes(&segs).len(), 1);
    }

    #[test]
    fn inner_spur_does_not_break_the_face() {
        let mut segs = ring_segments(&[v(0.0, 0.0), v(10.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)]);
        segs.push(Segment::new(v(10.0, 0.0), v(5.0, 5.0)));
        let shapes = detect_shapes(&segs);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].len(), 4);
    }

    #[test]
    fn grid_of_three_by_two() {
        let mut segs = Vec::new();
        for i in 0..=3 {
            let x = i as f64 * 10.0;
            segs.push(Segment::new(v(x, 0.0), v(x, 10.0)));
            segs.push(Segment::new(v(x, 10.0), v(x, 20.0)));
        }
        for j in 0..=2 {
            let y = j as f64 * 10.0;
            for i in 0..3 {
                segs.push(Segment::new(v(i as f64 * 10.0, y), v(i as f64 * 10.0 + 10.0, y)));
            }
        }
        let shapes = detect_shapes(&segs);
        assert_eq!(shapes.len(), 6);
        assert!(shapes.iter().all(|s| (s.area() - 100.0).abs() < 1e-9));
    }

    #[test]
    fn empty_and_degenerate_inputs() {
        assert!(detect_shapes(&[]).is_empty());
        assert!(detect_shapes(&[Segment::new(v(0.0, 0.0), v(0.0, 0.0))]).is_empty());
        assert!(detect_shapes(&[Segment::new(v(0.0, 0.0), v(3.0, 0.0))]).is_empty());
    }
}
