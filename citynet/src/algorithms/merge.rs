//! Sliver consolidation: folding undersized blocks into a neighbour.

use std::collections::HashSet;

use crate::algorithms::shapes::detect_shapes;
use crate::geometry::limits::MAX_MERGE_PASSES;
use crate::geometry::segment::{SegKey, Segment};
use crate::geometry::shape::Shape;

fn boundary_keys(s: &Shape) -> HashSet<SegKey> {
    s.segments().iter().map(Segment::key).collect()
}

pub fn shares_boundary(a: &Shape, b: &Shape) -> bool {
    let ka = boundary_keys(a);
    b.segments().iter().any(|s| ka.contains(&s.key()))
}

/// Union of two blocks sharing at least one boundary segment.
///
/// The shared segments cancel out; the largest solid face of what remains,
/// simplified, is the result.
pub fn merge(a: &Shape, b: &Shape) -> Option<Shape> {
    let sa = a.segments();
    let sb = b.segments();
    let ka: HashSet<SegKey> = sa.iter().map(Segment::key).collect();
    let kb: HashSet<SegKey> = sb.iter().map(Segment::key).collect();
    if ka.is_disjoint(&kb) {
        return None;
    }
    let remaining: Vec<Segment> = sa
        .iter()
        .filter(|s| !kb.contains(&s.key()))
        .chain(sb.iter().filter(|s| !ka.contains(&s.key())))
        .copied()
        .collect();
    let best = detect_shapes(&remaining)
        .into_iter()
        .max_by(|x, y| x.area().total_cmp(&y.area()))?;
    let merged = best.simplified();
    if merged.len() < 3 || !merged.is_solid() {
        return None;
    }
    Some(merged)
}

/// Fold every block below `area_threshold` into its largest neighbour.
///
/// One merge per pass, then the neighbour scan restarts since adjacency
/// changed; at most `MAX_MERGE_PASSES` passes.
pub fn run_auto_merge(shapes: &[Shape], area_threshold: f64) -> Vec<Shape> {
    let mut shapes = shapes.to_vec();
    let mut failed: HashSet<(usize, usize)> = HashSet::new();
    let mut merges = 0usize;
    for pass in 0..MAX_MERGE_PASSES {
        let keys: Vec<HashSet<SegKey>> = shapes.iter().map(boundary_keys).collect();
        let mut done: Option<(usize, usize, Shape)> = None;
        'scan: for i in 0..shapes.len() {
            if shapes[i].area() >= area_threshold {
                continue;
            }
            let mut nbrs: Vec<usize> = (0..shapes.len())
                .filter(|&j| j != i && !keys[i].is_disjoint(&keys[j]))
                .collect();
            nbrs.sort_by(|&x, &y| shapes[y].area().total_cmp(&shapes[x].area()));
            for j in nbrs {
                if failed.contains(&(i, j)) {
                    continue;
                }
                match merge(&shapes[i], &shapes[j]) {
                    Some(m) => {
                        done = Some((i, j, m));
                        break 'scan;
                    }
                    None => {
                        failed.insert((i, j));
                    }
                }
            }
        }
        let Some((i, j, m)) = done else { break };
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        shapes.remove(hi);
        shapes[lo] = m;
        failed.clear();
        merges += 1;
        if pass + 1 == MAX_MERGE_PASSES {
            log::warn!("auto-merge stopped after {MAX_MERGE_PASSES} passes");
        }
    }
    log::debug!("auto-merge: {merges} merges, {} blocks", shapes.len());
    shapes
}
