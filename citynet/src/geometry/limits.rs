// Safety caps for every loop that could otherwise run unbounded, plus
// ingestion limits for snapshot JSON.

// Face tracing: longer traces are treated as malformed and discarded
pub const MAX_TRACE_VERTICES: usize = 1_000;

// Intersection splitting
pub const MAX_SPLIT_PASSES: usize = 5;
pub const MAX_TOTAL_SPLITS: usize = 2_000;

// Auto-merge restarts
pub const MAX_MERGE_PASSES: usize = 10;

// Fast-forward ticking
pub const MAX_RESOLVE_ITERATIONS: usize = 5_000;

// Agents
pub const STALE_TICKS: u32 = 400;
pub const TARGET_REACHED_DIST: f64 = 5.0;
pub const SEEK_SUPPRESS_DIST: f64 = 30.0;
pub const MAX_LIVE_AGENTS: usize = 4_000;

// Snapshot caps
pub const MAX_SEGMENTS: usize = 500_000;
pub const MAX_SHAPES: usize = 100_000;
pub const MAX_SHAPE_POINTS: usize = 10_000;

// Numeric bounds
pub const COORD_MIN: f64 = -10_000_000.0;
pub const COORD_MAX: f64 =  10_000_000.0;

#[inline]
pub fn in_coord_bounds(x: f64) -> bool {
    x.is_finite() && (COORD_MIN..=COORD_MAX).contains(&x)
}
