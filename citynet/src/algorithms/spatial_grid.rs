//! Uniform-grid proximity indices.
//!
//! [`SpatialGrid`] buckets point items by `floor(coord / cell)`. A radius
//! query scans every cell touched by the query's bounding square and filters
//! by exact distance. [`BoxGrid`] buckets indices into every cell an AABB
//! overlaps, and [`ShapeSpatialGrid`] uses it to shortlist blocks before the
//! exact containment test.
//!
//! None of these are patched in place by their owners: when the indexed
//! collection changes size they are rebuilt.

use std::collections::HashMap;

use crate::geometry::shape::Shape;
use crate::model::Vec2;

pub type CellKey = (i64, i64);

#[inline]
fn cell_ix(cell: f64, x: f64) -> i64 {
    (x / cell).floor() as i64
}

#[derive(Clone, Debug)]
pub struct SpatialGrid<T> {
    cell: f64,
    cells: HashMap<CellKey, Vec<(Vec2, T)>>,
    len: usize,
}

impl<T> SpatialGrid<T> {
    pub fn new(cell_size: f64) -> Self {
        let cell = if cell_size.is_finite() && cell_size > 0.0 { cell_size } else { 1.0 };
        SpatialGrid { cell, cells: HashMap::new(), len: 0 }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }

    pub fn key_of(&self, p: Vec2) -> CellKey {
        (cell_ix(self.cell, p.x), cell_ix(self.cell, p.y))
    }

    pub fn insert(&mut self, p: Vec2, item: T) {
        let key = self.key_of(p);
        self.cells.entry(key).or_default().push((p, item));
        self.len += 1;
    }

    /// Items within `radius` of `center` (inclusive), in no particular order.
    pub fn query_radius(&self, center: Vec2, radius: f64) -> Vec<(Vec2, &T)> {
        let mut out = Vec::new();
        self.for_each_within(center, radius, |p, item| out.push((p, item)));
        out
    }

    /// Closest item within `radius`.
    pub fn nearest(&self, center: Vec2, radius: f64) -> Option<(Vec2, &T)> {
        let mut best: Option<(f64, Vec2, &T)> = None;
        self.for_each_within(center, radius, |p, item| {
            let d2 = p.distance_sq(center);
            if best.as_ref().map_or(true, |(bd, _, _)| d2 < *bd) {
                best = Some((d2, p, item));
            }
        });
        best.map(|(_, p, item)| (p, item))
    }

    fn for_each_within<'a>(&'a self, center: Vec2, radius: f64, mut f: impl FnMut(Vec2, &'a T)) {
        if !(radius >= 0.0) || !center.is_finite() {
            return;
        }
        let r2 = radius * radius;
        let ix0 = cell_ix(self.cell, center.x - radius);
        let ix1 = cell_ix(self.cell, center.x + radius);
        let iy0 = cell_ix(self.cell, center.y - radius);
        let iy1 = cell_ix(self.cell, center.y + radius);
        for ix in ix0..=ix1 {
            for iy in iy0..=iy1 {
                if let Some(list) = self.cells.get(&(ix, iy)) {
                    for (p, item) in list {
                        if p.distance_sq(center) <= r2 {
                            f(*p, item);
                        }
                    }
                }
            }
        }
    }
}

/// Index buckets keyed by every cell an AABB overlaps.
#[derive(Clone, Debug)]
pub struct BoxGrid {
    cell: f64,
    cells: HashMap<CellKey, Vec<usize>>,
}

impl BoxGrid {
    pub fn new(cell_size: f64) -> Self {
        let cell = if cell_size.is_finite() && cell_size > 0.0 { cell_size } else { 1.0 };
        BoxGrid { cell, cells: HashMap::new() }
    }

    pub fn insert(&mut self, idx: usize, min: Vec2, max: Vec2) {
        let ix0 = cell_ix(self.cell, min.x);
        let ix1 = cell_ix(self.cell, max.x);
        let iy0 = cell_ix(self.cell, min.y);
        let iy1 = cell_ix(self.cell, max.y);
        for ix in ix0..=ix1 {
            for iy in iy0..=iy1 {
                self.cells.entry((ix, iy)).or_default().push(idx);
            }
        }
    }

    /// Sorted, de-duplicated indices whose boxes share a cell with the query box.
    pub fn query_box(&self, min: Vec2, max: Vec2) -> Vec<usize> {
        let mut out = Vec::new();
        let ix0 = cell_ix(self.cell, min.x);
        let ix1 = cell_ix(self.cell, max.x);
        let iy0 = cell_ix(self.cell, min.y);
        let iy1 = cell_ix(self.cell, max.y);
        for ix in ix0..=ix1 {
            for iy in iy0..=iy1 {
                if let Some(list) = self.cells.get(&(ix, iy)) {
                    out.extend_from_slice(list);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn query_point(&self, p: Vec2) -> &[usize] {
        self.cells
            .get(&(cell_ix(self.cell, p.x), cell_ix(self.cell, p.y)))
            .map_or(&[], |v| v.as_slice())
    }
}

/// AABB-bucketed index over a block list.
#[derive(Clone, Debug)]
pub struct ShapeSpatialGrid {
    grid: BoxGrid,
    count: usize,
}

impl ShapeSpatialGrid {
    pub fn build(shapes: &[Shape], cell_size: f64) -> Self {
        let mut grid = BoxGrid::new(cell_size);
        for (i, s) in shapes.iter().enumerate() {
            if let Some((lo, hi)) = s.bbox() {
                grid.insert(i, lo, hi);
            }
        }
        ShapeSpatialGrid { grid, count: shapes.len() }
    }

    /// Number of shapes the index was built for.
    pub fn built_for(&self) -> usize {
        self.count
    }

    pub fn candidates(&self, p: Vec2) -> &[usize] {
        self.grid.query_point(p)
    }

    /// Index of the first shape containing `p`.
    pub fn find_containing(&self, shapes: &[Shape], p: Vec2) -> Option<usize> {
        self.candidates(p)
            .iter()
            .copied()
            .find(|&i| shapes.get(i).map_or(false, |s| s.contains(p)))
    }
}
