//! Terrain-aware shortest paths over the finished road graph.

use std::collections::HashMap;

use pathfinding::prelude::astar;

use crate::geometry::segment::Segment;
use crate::model::{quantize, QKey, Vec2};

/// Fixed-point scale for A* costs. Edge costs round up and the heuristic
/// rounds down, which keeps the heuristic admissible.
const COST_SCALE: f64 = 1000.0;

#[derive(Clone, Debug, Default)]
pub struct Pathfinder {
    nodes: Vec<Vec2>,
    index: HashMap<QKey, usize>,
    adj: Vec<Vec<(usize, u64)>>,
}

impl Pathfinder {
    /// Graph with plain Euclidean edge costs.
    pub fn new(segments: &[Segment]) -> Self {
        Self::build(segments, |_, _| 1.0)
    }

    /// Graph whose directed edges cost `length * (1 + max(0, dh) * slope_sensitivity)`.
    /// Descending costs the flat distance.
    pub fn with_elevation<F>(segments: &[Segment], elevation: F, slope_sensitivity: f64) -> Self
    where
        F: Fn(Vec2) -> f64,
    {
        let s = if slope_sensitivity.is_finite() { slope_sensitivity.max(0.0) } else { 0.0 };
        Self::build(segments, |a, b| {
            let dh = elevation(b) - elevation(a);
            if dh.is_finite() { 1.0 + dh.max(0.0) * s } else { 1.0 }
        })
    }

    fn build(segments: &[Segment], factor: impl Fn(Vec2, Vec2) -> f64) -> Self {
        let mut pf = Pathfinder::default();
        for seg in segments {
            let a = pf.node(seg.p1);
            let b = pf.node(seg.p2);
            if a == b {
                continue;
            }
            let len = seg.length();
            for (from, to) in [(a, b), (b, a)] {
                let w = len * factor(pf.nodes[from], pf.nodes[to]);
                let cost = (w * COST_SCALE).ceil() as u64;
                match pf.adj[from].iter_mut().find(|(n, _)| *n == to) {
                    Some(edge) => edge.1 = edge.1.min(cost),
                    None => pf.adj[from].push((to, cost)),
                }
            }
        }
        pf
    }

    fn node(&mut self, p: Vec2) -> usize {
        let k = quantize(p);
        if let Some(&i) = self.index.get(&k) {
            return i;
        }
        let i = self.nodes.len();
        self.nodes.push(p);
        self.adj.push(Vec::new());
        self.index.insert(k, i);
        i
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Graph node closest to `p` by direct distance.
    pub fn nearest_node(&self, p: Vec2) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance_sq(p).total_cmp(&b.distance_sq(p)))
            .map(|(i, _)| i)
    }

    /// Node positions from the node nearest `start` to the node nearest
    /// `end`, or `None` when the graph is empty or `end` is unreachable.
    pub fn find_path(&self, start: Vec2, end: Vec2) -> Option<Vec<Vec2>> {
        let s = self.nearest_node(start)?;
        let e = self.nearest_node(end)?;
        let goal = self.nodes[e];
        let (path, _cost) = astar(
            &s,
            |&n| self.adj[n].iter().copied(),
            |&n| (self.nodes[n].distance(goal) * COST_SCALE).floor() as u64,
            |&n| n == e,
        )?;
        Some(path.into_iter().map(|n| self.nodes[n]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn straight_line_path() {
        let pf = Pathfinder::new(&[
            Segment::new(v(0.0, 0.0), v(10.0, 0.0)),
            Segment::new(v(10.0, 0.0), v(20.0, 0.0)),
        ]);
        let path = pf.find_path(v(-1.0, 0.5), v(19.0, 1.0)).unwrap();
        assert_eq!(path, vec![v(0.0, 0.0), v(10.0, 0.0), v(20.0, 0.0)]);
    }

    #[test]
    fn start_equals_end_is_single_point() {
        let pf = Pathfinder::new(&[Segment::new(v(0.0, 0.0), v(10.0, 0.0))]);
        assert_eq!(pf.find_path(v(0.1, 0.0), v(0.2, 0.0)), Some(vec![v(0.0, 0.0)]));
    }

    #[test]
    fn empty_graph_and_unreachable() {
        assert!(Pathfinder::new(&[]).find_path(v(0.0, 0.0), v(1.0, 1.0)).is_none());
        let pf = Pathfinder::new(&[
            Segment::new(v(0.0, 0.0), v(10.0, 0.0)),
            Segment::new(v(50.0, 0.0), v(60.0, 0.0)),
        ]);
        assert!(pf.find_path(v(0.0, 0.0), v(60.0, 0.0)).is_none());
    }

    #[test]
    fn uphill_costs_more_downhill_costs_flat() {
        let segs = [Segment::new(v(0.0, 0.0), v(10.0, 0.0))];
        let pf = Pathfinder::with_elevation(&segs, |p| p.x / 10.0, 2.0);
        let up = pf.adj[0][0].1;
        let down = pf.adj[1][0].1;
        assert_eq!(down, 10_000);
        assert_eq!(up, 30_000);
    }
}
