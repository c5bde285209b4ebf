//! Block subdivision.
//!
//! Each block gets a guide vector (inward normal at the middle of its
//! longest arterial). Large blocks are cut by two waves of perpendicular
//! agents; mid-sized blocks get a rotated, jittered lattice clipped to their
//! boundary.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::agents::spawn::Spawner;
use crate::agents::{Agent, AgentKind, ShapeHandle};
use crate::algorithms::arterials::longest_arterial;
use crate::config::GenConfig;
use crate::geometry::intersect::{intersect_segments, SegIntersection};
use crate::geometry::segment::Segment;
use crate::geometry::shape::Shape;
use crate::geometry::tolerance::{EPS_DENOM, EPS_POS};
use crate::model::Vec2;

const MAX_LATTICE_POINTS: usize = 40_000;

/// Lattice shape parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LotParams {
    pub spacing: f64,
    pub ratio_min: f64,
    pub ratio_max: f64,
    pub warp: f64,
    pub relax_passes: u32,
    pub snap: f64,
}

impl LotParams {
    pub fn from_config(cfg: &GenConfig) -> Self {
        LotParams {
            spacing: cfg.lot_spacing,
            ratio_min: cfg.lot_ratio_min,
            ratio_max: cfg.lot_ratio_max,
            warp: cfg.lot_warp,
            relax_passes: cfg.lot_relax_passes,
            snap: cfg.subdivide_snap,
        }
    }
}

/// Inward normal at the block vertex closest to the arc-length midpoint of
/// its longest arterial.
pub fn compute_guide_vector(shape: &Shape, threshold_deg: f64) -> Option<Vec2> {
    let longest = longest_arterial(shape, threshold_deg)?;
    let mid = longest.point_at_length(longest.length() * 0.5)?;
    let (i, _) = shape
        .points
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.distance_sq(mid).total_cmp(&b.distance_sq(mid)))?;
    shape.inward_normal_at(i)
}

impl Shape {
    /// Guide vector, computed on first use and cached.
    pub fn ensure_guide_vector(&mut self, threshold_deg: f64) -> Option<Vec2> {
        if self.guide_vector.is_none() {
            self.guide_vector = compute_guide_vector(self, threshold_deg);
        }
        self.guide_vector
    }
}

/// Pieces of `a -> b` lying inside `shape`.
fn clip_to_shape(a: Vec2, b: Vec2, shape: &Shape, boundary: &[Segment]) -> Vec<(Vec2, Vec2)> {
    let mut ts = vec![0.0, 1.0];
    for s in boundary {
        match intersect_segments(a, b, s.p1, s.p2, EPS_POS, EPS_DENOM) {
            SegIntersection::None => {}
            SegIntersection::Proper { t, .. } | SegIntersection::Touch { t, .. } => ts.push(t),
            SegIntersection::CollinearOverlap { t0, t1, .. } => {
                ts.push(t0);
                ts.push(t1);
            }
        }
    }
    ts.sort_by(f64::total_cmp);
    ts.dedup_by(|x, y| (*x - *y).abs() < 1e-9);
    ts.windows(2)
        .filter_map(|w| {
            let (p, q) = (a.lerp(b, w[0]), a.lerp(b, w[1]));
            shape.contains((p + q) * 0.5).then_some((p, q))
        })
        .collect()
}

/// Pull `p` onto a boundary vertex, else onto the boundary, when within `snap`.
fn snap_to_boundary(p: Vec2, shape: &Shape, boundary: &[Segment], snap: f64) -> Vec2 {
    let vertex = shape
        .points
        .iter()
        .copied()
        .filter(|v| v.distance(p) <= snap)
        .min_by(|a, b| a.distance_sq(p).total_cmp(&b.distance_sq(p)));
    if let Some(v) = vertex {
        return v;
    }
    boundary
        .iter()
        .map(|s| s.closest_point(p))
        .filter(|q| q.distance(p) <= snap)
        .min_by(|a, b| a.distance_sq(p).total_cmp(&b.distance_sq(p)))
        .unwrap_or(p)
}

/// Lot boundaries for one block: a lattice centred on the block's bbox,
/// rotated to `guide`, jittered, relaxed and clipped to the block.
pub fn transpose_grid(shape: &Shape, guide: Vec2, params: &LotParams, rng: &mut ChaCha8Rng) -> Vec<Segment> {
    let u = guide.normalize();
    let Some((lo, hi)) = shape.bbox() else { return Vec::new() };
    if u == Vec2::ZERO || !(params.spacing > 0.0) || shape.len() < 3 {
        return Vec::new();
    }
    let w = u.perp();
    let center = (lo + hi) * 0.5;
    let reach = (hi - lo).length() * 0.5;
    let ratio = if params.ratio_max > params.ratio_min {
        rng.gen_range(params.ratio_min..=params.ratio_max)
    } else {
        params.ratio_min
    };
    let row = params.spacing;
    let col = params.spacing * ratio.max(0.1);
    let nu = (reach / row).ceil() as i64 + 1;
    let nw = (reach / col).ceil() as i64 + 1;
    let (rows, cols) = ((2 * nu + 1) as usize, (2 * nw + 1) as usize);
    if rows.saturating_mul(cols) > MAX_LATTICE_POINTS {
        log::warn!("lattice of {rows}x{cols} points skipped");
        return Vec::new();
    }

    let mut pts: Vec<Vec2> = Vec::with_capacity(rows * cols);
    for i in -nu..=nu {
        for j in -nw..=nw {
            let mut p = center + u * (i as f64 * row) + w * (j as f64 * col);
            if params.warp > 0.0 {
                p += u * (rng.gen_range(-1.0..=1.0) * params.warp * row);
                p += w * (rng.gen_range(-1.0..=1.0) * params.warp * col);
            }
            pts.push(p);
        }
    }
    let at = |r: usize, c: usize| r * cols + c;
    for _ in 0..params.relax_passes {
        let prev = pts.clone();
        for r in 1..rows - 1 {
            for c in 1..cols - 1 {
                let avg = (prev[at(r - 1, c)] + prev[at(r + 1, c)] + prev[at(r, c - 1)] + prev[at(r, c + 1)]) * 0.25;
                pts[at(r, c)] = prev[at(r, c)] * 0.5 + avg * 0.5;
            }
        }
    }

    let boundary = shape.segments();
    let mut out = Vec::new();
    let mut emit = |a: Vec2, b: Vec2| {
        for (p, q) in clip_to_shape(a, b, shape, &boundary) {
            let p = snap_to_boundary(p, shape, &boundary, params.snap);
            let q = snap_to_boundary(q, shape, &boundary, params.snap);
            if p.distance(q) >= params.snap.max(EPS_POS) {
                out.push(Segment::new(p, q));
            }
        }
    };
    for r in 0..rows {
        for c in 0..cols {
            if r + 1 < rows {
                emit(pts[at(r, c)], pts[at(r + 1, c)]);
            }
            if c + 1 < cols {
                emit(pts[at(r, c)], pts[at(r, c + 1)]);
            }
        }
    }
    out
}

/// Wave-1 agents for every block above `maxSubdivisionArea`: evenly spaced
/// along the longest arterial, heading along the guide vector.
pub fn wave_one_agents(sp: &mut Spawner, blocks: &mut [Shape], cfg: &GenConfig) -> Vec<Agent> {
    let spacing = cfg.lot_spacing * 2.0;
    let mut out = Vec::new();
    for (i, block) in blocks.iter_mut().enumerate() {
        if block.area() <= cfg.max_subdivision_area {
            continue;
        }
        let Some(guide) = block.ensure_guide_vector(cfg.arterial_angle_threshold) else { continue };
        let Some(axis) = longest_arterial(block, cfg.arterial_angle_threshold) else { continue };
        let len = axis.length();
        let mut d = spacing;
        while d < len - spacing * 0.5 {
            if let Some(p) = axis.point_at_length(d) {
                let start = p + guide * (cfg.ant_speed * 0.5);
                if block.contains(start) {
                    let kind = AgentKind::Perpendicular { wave: 1 };
                    let mut a = sp.make(kind, start, guide, cfg).with_parent(ShapeHandle(i));
                    // First street piece starts on the arterial itself.
                    a.commit_trail(p);
                    out.push(a);
                }
            }
            d += spacing;
        }
    }
    out
}

/// Wave-2 agents from points recorded along wave-1 streets, heading both
/// ways across the guide vector. A side is skipped unless its first short
/// step stays inside the parent block.
pub fn wave_two_agents(sp: &mut Spawner, blocks: &[Shape], seeds: &[(Vec2, ShapeHandle)], cfg: &GenConfig) -> Vec<Agent> {
    let mut out = Vec::new();
    for &(p, handle) in seeds {
        let Some(block) = blocks.get(handle.0) else { continue };
        let Some(guide) = block.guide_vector else { continue };
        let side = guide.perp();
        for dir in [side, -side] {
            if block.contains(p + dir * (cfg.ant_speed * 2.0)) {
                let kind = AgentKind::Perpendicular { wave: 2 };
                out.push(sp.make(kind, p, dir, cfg).with_parent(handle));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn v(x: f64, y: f64) -> Vec2 {
        Vec2::new(x, y)
    }

    fn square(size: f64) -> Shape {
        Shape::new(vec![v(0.0, 0.0), v(size, 0.0), v(size, size), v(0.0, size)])
    }

    fn plain(spacing: f64) -> LotParams {
        LotParams { spacing, ratio_min: 1.0, ratio_max: 1.0, warp: 0.0, relax_passes: 0, snap: 1.0 }
    }

    #[test]
    fn guide_points_into_the_block() {
        let block = Shape::new(vec![v(0.0, 0.0), v(50.0, 0.0), v(100.0, 0.0), v(100.0, 20.0), v(0.0, 20.0)]);
        let g = compute_guide_vector(&block, 45.0).unwrap();
        assert!(g.approx_eq(v(0.0, 1.0), 1e-9));
    }

    #[test]
    fn guide_is_cached() {
        let mut block = square(50.0);
        block.guide_vector = Some(v(1.0, 0.0));
        assert_eq!(block.ensure_guide_vector(45.0), Some(v(1.0, 0.0)));
    }

    #[test]
    fn axis_aligned_lattice_in_square() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let segs = transpose_grid(&square(100.0), v(0.0, 1.0), &plain(20.0), &mut rng);
        assert_eq!(segs.len(), 60);
        let sq = square(100.0);
        assert!(segs.iter().all(|s| sq.contains(s.midpoint())));
        assert!(segs.iter().all(|s| s.length() >= 1.0));
    }

    #[test]
    fn jittered_lattice_stays_inside() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let params = LotParams { spacing: 15.0, ratio_min: 1.2, ratio_max: 2.0, warp: 0.2, relax_passes: 3, snap: 2.0 };
        let tri = Shape::new(vec![v(0.0, 0.0), v(120.0, 0.0), v(60.0, 90.0)]);
        let segs = transpose_grid(&tri, v(0.6, 0.8), &params, &mut rng);
        assert!(!segs.is_empty());
        let edges = tri.segments();
        let on_or_inside = |p: Vec2| tri.contains(p) || edges.iter().any(|e| e.distance_to(p) < 1e-6);
        assert!(segs.iter().all(|s| on_or_inside(s.p1) && on_or_inside(s.p2) && on_or_inside(s.midpoint())));
    }

    #[test]
    fn waves_spawn_inside_their_block() {
        let cfg = GenConfig { max_subdivision_area: 1000.0, lot_spacing: 10.0, ..GenConfig::default() };
        let mut blocks = vec![Shape::new(vec![v(0.0, 0.0), v(100.0, 0.0), v(100.0, 40.0), v(0.0, 40.0)]), square(10.0)];
        let mut sp = Spawner::new();
        let wave1 = wave_one_agents(&mut sp, &mut blocks, &cfg);
        assert!(!wave1.is_empty());
        assert!(wave1.iter().all(|a| a.parent_shape == Some(ShapeHandle(0)) && blocks[0].contains(a.position)));
        assert!(blocks[1].guide_vector.is_none());

        let seeds = [(v(50.0, 20.0), ShapeHandle(0)), (v(1.0, 20.0), ShapeHandle(0))];
        let wave2 = wave_two_agents(&mut sp, &blocks, &seeds, &cfg);
        // the seed hugging the left edge only grows inward
        assert_eq!(wave2.len(), 3);
    }
}
