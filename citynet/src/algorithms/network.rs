//! Road network assembly.
//!
//! The network is a flat segment list plus an order-independent key map, so
//! no two segments ever share both endpoints (in either direction). Vertices
//! closer than a snap threshold are the same node. Live agents only see
//! nearby vertices through [`RoadNetwork::add_segment_snapped`], so once a
//! stage ends [`RoadNetwork::cleanup_network`] resnaps globally and re-splits
//! every crossing.

use std::collections::{HashMap, HashSet};

use crate::algorithms::spatial_grid::{BoxGrid, SpatialGrid};
use crate::geometry::intersect::SegIntersection;
use crate::geometry::limits::{MAX_SPLIT_PASSES, MAX_TOTAL_SPLITS};
use crate::geometry::segment::{seg_key, SegKey, Segment};
use crate::geometry::tolerance::SPLIT_EPS;
use crate::model::{quantize, QKey, Vec2};

/// Vertex and segment lookup built for a given segment count.
#[derive(Clone, Debug)]
struct NetworkIndex {
    built_for: usize,
    vertices: SpatialGrid<()>,
    seen: HashSet<QKey>,
    boxes: BoxGrid,
}

impl NetworkIndex {
    fn build(segments: &[Segment], cell: f64) -> Self {
        let mut idx = NetworkIndex {
            built_for: 0,
            vertices: SpatialGrid::new(cell),
            seen: HashSet::new(),
            boxes: BoxGrid::new(cell),
        };
        for (i, s) in segments.iter().enumerate() {
            idx.add(i, s);
        }
        idx.built_for = segments.len();
        idx
    }

    fn add(&mut self, i: usize, s: &Segment) {
        for p in [s.p1, s.p2] {
            if self.seen.insert(quantize(p)) {
                self.vertices.insert(p, ());
            }
        }
        let (lo, hi) = s.aabb();
        self.boxes.insert(i, lo, hi);
    }
}

#[derive(Clone, Debug, Default)]
pub struct RoadNetwork {
    segments: Vec<Segment>,
    keys: HashMap<SegKey, usize>,
    index: Option<NetworkIndex>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Network over `segments`, dropping collapsed pieces and duplicates.
    /// Duplicate pieces OR their bridge flags onto the first occurrence.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let mut net = RoadNetwork::new();
        net.replace_all(segments);
        net
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.keys.clear();
        self.index = None;
    }

    pub fn contains(&self, a: Vec2, b: Vec2) -> bool {
        self.keys.contains_key(&seg_key(a, b))
    }

    pub fn index_of(&self, a: Vec2, b: Vec2) -> Option<usize> {
        self.keys.get(&seg_key(a, b)).copied()
    }

    pub fn set_bridge(&mut self, idx: usize) {
        if let Some(s) = self.segments.get_mut(idx) {
            s.is_bridge = true;
        }
    }

    /// Build the vertex grid, or rebuild it if the segment count moved since
    /// it was last built.
    pub fn ensure_index(&mut self, cell: f64) {
        let stale = match &self.index {
            Some(idx) => idx.built_for != self.segments.len() || idx.vertices.cell_size() != cell,
            None => true,
        };
        if stale {
            self.index = Some(NetworkIndex::build(&self.segments, cell));
        }
    }

    pub fn has_index(&self) -> bool {
        self.index.as_ref().map_or(false, |i| i.built_for == self.segments.len())
    }

    fn current_index(&self) -> Option<&NetworkIndex> {
        self.index.as_ref().filter(|i| i.built_for == self.segments.len())
    }

    /// Closest existing vertex within `radius`.
    pub fn nearest_vertex(&self, p: Vec2, radius: f64) -> Option<Vec2> {
        if let Some(idx) = self.current_index() {
            return idx.vertices.nearest(p, radius).map(|(q, _)| q);
        }
        let r2 = radius * radius;
        let mut best: Option<(f64, Vec2)> = None;
        for s in &self.segments {
            for q in [s.p1, s.p2] {
                let d2 = q.distance_sq(p);
                if d2 <= r2 && best.map_or(true, |(bd, _)| d2 < bd) {
                    best = Some((d2, q));
                }
            }
        }
        best.map(|(_, q)| q)
    }

    /// Indices of segments whose boxes may overlap `[min, max]`, ascending.
    pub fn segments_near(&self, min: Vec2, max: Vec2) -> Vec<usize> {
        if let Some(idx) = self.current_index() {
            return idx.boxes.query_box(min, max);
        }
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                let (lo, hi) = s.aabb();
                hi.x >= min.x && lo.x <= max.x && hi.y >= min.y && lo.y <= max.y
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Snap both endpoints onto existing vertices within `threshold` and
    /// insert the segment.
    ///
    /// Returns `None` when the snapped endpoints collapse onto one vertex.
    /// An equal segment already present is returned unmodified.
    pub fn add_segment_snapped(&mut self, p1: Vec2, p2: Vec2, threshold: f64) -> Option<usize> {
        if !p1.is_finite() || !p2.is_finite() {
            return None;
        }
        let a = self.nearest_vertex(p1, threshold).unwrap_or(p1);
        let snapped_b = self.nearest_vertex(p2, threshold);
        // The first endpoint is a snap candidate for the second as well.
        let da = a.distance_sq(p2);
        let b = match snapped_b {
            Some(q) if q.distance_sq(p2) <= da => q,
            _ if da <= threshold * threshold => a,
            Some(q) => q,
            None => p2,
        };
        if quantize(a) == quantize(b) {
            return None;
        }
        let key = seg_key(a, b);
        if let Some(&i) = self.keys.get(&key) {
            return Some(i);
        }
        Some(self.push(Segment::new(a, b), key))
    }

    fn push(&mut self, s: Segment, key: SegKey) -> usize {
        let i = self.segments.len();
        self.segments.push(s);
        self.keys.insert(key, i);
        if let Some(idx) = self.index.as_mut() {
            if idx.built_for == i {
                idx.add(i, &s);
                idx.built_for = i + 1;
            }
        }
        i
    }

    fn replace_all(&mut self, segments: Vec<Segment>) {
        self.segments.clear();
        self.keys.clear();
        self.index = None;
        for s in segments {
            if quantize(s.p1) == quantize(s.p2) {
                continue;
            }
            let key = s.key();
            match self.keys.get(&key) {
                Some(&i) => self.segments[i].is_bridge |= s.is_bridge,
                None => {
                    let i = self.segments.len();
                    self.segments.push(s);
                    self.keys.insert(key, i);
                }
            }
        }
    }

    /// First existing segment crossed by the step `from -> to`, with the hit
    /// point. Hits within `SPLIT_EPS` of `from` or of `anchor` are ignored.
    pub fn first_crossing(&self, from: Vec2, to: Vec2, anchor: Option<Vec2>) -> Option<(usize, Vec2)> {
        let step = Segment::new(from, to);
        let (lo, hi) = step.aabb();
        let pad = Vec2::new(SPLIT_EPS, SPLIT_EPS);
        let mut best: Option<(f64, usize, Vec2)> = None;
        for i in self.segments_near(lo - pad, hi + pad) {
            let Some(s) = self.segments.get(i) else { continue };
            let Some(p) = step.intersection(s) else { continue };
            let d = p.distance(from);
            if d <= SPLIT_EPS || anchor.map_or(false, |a| p.distance(a) <= SPLIT_EPS) {
                continue;
            }
            if best.map_or(true, |(bd, _, _)| d < bd) {
                best = Some((d, i, p));
            }
        }
        best.map(|(_, i, p)| (i, p))
    }

    /// Split every pair of segments crossing in the interior of either one.
    ///
    /// Bounded by `MAX_SPLIT_PASSES` passes and `MAX_TOTAL_SPLITS` split
    /// points; whatever is left over stays for a later pass. Returns the
    /// number of split points applied.
    pub fn split_intersections(&mut self) -> usize {
        let mut total = 0usize;
        for pass in 0..MAX_SPLIT_PASSES {
            let budget = MAX_TOTAL_SPLITS.saturating_sub(total);
            if budget == 0 {
                log::warn!("split budget of {MAX_TOTAL_SPLITS} exhausted");
                break;
            }
            let splits = self.collect_split_points();
            if splits.iter().all(Vec::is_empty) {
                break;
            }
            let (next, applied) = apply_splits(&self.segments, splits, budget);
            total += applied;
            log::debug!("split pass {pass}: {applied} splits, {} segments", next.len());
            self.replace_all(next);
            if applied == 0 {
                break;
            }
        }
        total
    }

    fn collect_split_points(&self) -> Vec<Vec<Vec2>> {
        let n = self.segments.len();
        let mut splits: Vec<Vec<Vec2>> = vec![Vec::new(); n];
        if n < 2 {
            return splits;
        }
        let mean = self.segments.iter().map(Segment::length).sum::<f64>() / n as f64;
        let mut grid = BoxGrid::new((mean * 2.0).max(1.0));
        let pad = Vec2::new(SPLIT_EPS, SPLIT_EPS);
        for (i, s) in self.segments.iter().enumerate() {
            let (lo, hi) = s.aabb();
            grid.insert(i, lo - pad, hi + pad);
        }
        for i in 0..n {
            let si = self.segments[i];
            let (lo, hi) = si.aabb();
            for j in grid.query_box(lo - pad, hi + pad) {
                if j <= i {
                    continue;
                }
                let sj = self.segments[j];
                match si.classify(&sj) {
                    SegIntersection::None => {}
                    SegIntersection::Proper { p, .. } | SegIntersection::Touch { p, .. } => {
                        if interior(&si, p) {
                            splits[i].push(p);
                        }
                        if interior(&sj, p) {
                            splits[j].push(p);
                        }
                    }
                    // only endpoints inside the shared span cut the other piece
                    SegIntersection::CollinearOverlap { .. } => {
                        for p in [sj.p1, sj.p2] {
                            if interior(&si, p) {
                                splits[i].push(p);
                            }
                        }
                        for p in [si.p1, si.p2] {
                            if interior(&sj, p) {
                                splits[j].push(p);
                            }
                        }
                    }
                }
            }
        }
        splits
    }

    /// Resnap every endpoint to the first-seen vertex within `threshold`,
    /// drop collapsed and duplicate segments, then re-split crossings.
    pub fn cleanup_network(&mut self, threshold: f64) {
        let threshold = if threshold.is_finite() { threshold.max(0.0) } else { 0.0 };
        let before = self.segments.len();
        let mut reps: SpatialGrid<()> = SpatialGrid::new(threshold.max(1.0));
        let mut canonical = |p: Vec2| -> Vec2 {
            match reps.nearest(p, threshold) {
                Some((q, _)) => q,
                None => {
                    reps.insert(p, ());
                    p
                }
            }
        };
        let mut out = Vec::with_capacity(self.segments.len());
        for s in &self.segments {
            let a = canonical(s.p1);
            let b = canonical(s.p2);
            out.push(Segment { p1: a, p2: b, is_bridge: s.is_bridge });
        }
        self.replace_all(out);
        let merged = self.segments.len();
        let splits = self.split_intersections();
        log::debug!(
            "cleanup: {before} -> {merged} segments after resnap, {splits} splits, {} final",
            self.segments.len()
        );
    }

    /// Distinct vertices in first-seen order.
    pub fn vertices(&self) -> Vec<Vec2> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for s in &self.segments {
            for p in [s.p1, s.p2] {
                if seen.insert(quantize(p)) {
                    out.push(p);
                }
            }
        }
        out
    }

    pub fn degrees(&self) -> HashMap<QKey, usize> {
        let mut deg: HashMap<QKey, usize> = HashMap::new();
        for s in &self.segments {
            *deg.entry(quantize(s.p1)).or_default() += 1;
            *deg.entry(quantize(s.p2)).or_default() += 1;
        }
        deg
    }

    /// Vertices with exactly one incident segment, in first-seen order.
    pub fn dead_ends(&self) -> Vec<Vec2> {
        let deg = self.degrees();
        self.vertices()
            .into_iter()
            .filter(|p| deg.get(&quantize(*p)) == Some(&1))
            .collect()
    }
}

/// `p` lies on `s` strictly between its endpoints.
#[inline]
fn interior(s: &Segment, p: Vec2) -> bool {
    let t = s.project_t(p);
    t > 0.0
        && t < 1.0
        && p.distance(s.p1) > SPLIT_EPS
        && p.distance(s.p2) > SPLIT_EPS
        && s.distance_to(p) <= SPLIT_EPS
}

fn apply_splits(segments: &[Segment], splits: Vec<Vec<Vec2>>, budget: usize) -> (Vec<Segment>, usize) {
    let mut applied = 0usize;
    let mut out = Vec::with_capacity(segments.len() + splits.iter().map(Vec::len).sum::<usize>());
    for (s, mut pts) in segments.iter().zip(splits) {
        if pts.is_empty() || applied >= budget {
            out.push(*s);
            continue;
        }
        pts.sort_by(|a, b| s.project_t(*a).total_cmp(&s.project_t(*b)));
        pts.dedup_by(|a, b| quantize(*a) == quantize(*b));
        pts.truncate(budget - applied);
        applied += pts.len();
        let mut rest = *s;
        for p in pts {
            let (head, tail) = rest.split_at(p);
            out.push(head);
            rest = tail;
        }
        out.push(rest);
    }
    (out, applied)
}
