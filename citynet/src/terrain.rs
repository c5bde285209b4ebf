//! Terrain queries the generator consumes: a height in `[0, 1]` and a unit
//! flow direction at any world point.

use crate::model::Vec2;

pub trait Terrain {
    fn height(&self, p: Vec2) -> f64;
    fn flow_at(&self, p: Vec2) -> Vec2;

    /// Central-difference gradient of the height.
    fn gradient(&self, p: Vec2, h: f64) -> Vec2 {
        let dx = self.height(p + Vec2::new(h, 0.0)) - self.height(p - Vec2::new(h, 0.0));
        let dy = self.height(p + Vec2::new(0.0, h)) - self.height(p - Vec2::new(0.0, h));
        Vec2::new(dx, dy) / (2.0 * h)
    }
}

/// Dry land everywhere, no flow.
#[derive(Clone, Copy, Debug)]
pub struct FlatTerrain {
    pub level: f64,
}

impl Default for FlatTerrain {
    fn default() -> Self {
        FlatTerrain { level: 0.5 }
    }
}

impl Terrain for FlatTerrain {
    fn height(&self, _p: Vec2) -> f64 {
        self.level
    }

    fn flow_at(&self, _p: Vec2) -> Vec2 {
        Vec2::ZERO
    }
}

/// Terrain from two closures.
pub struct FnTerrain<H, F> {
    height: H,
    flow: F,
}

impl<H, F> FnTerrain<H, F>
where
    H: Fn(Vec2) -> f64,
    F: Fn(Vec2) -> Vec2,
{
    pub fn new(height: H, flow: F) -> Self {
        FnTerrain { height, flow }
    }
}

impl<H, F> Terrain for FnTerrain<H, F>
where
    H: Fn(Vec2) -> f64,
    F: Fn(Vec2) -> Vec2,
{
    fn height(&self, p: Vec2) -> f64 {
        (self.height)(p)
    }

    fn flow_at(&self, p: Vec2) -> Vec2 {
        (self.flow)(p).normalize()
    }
}

/// Row-major sampled height grid with bilinear lookup.
///
/// Without stored flow vectors, flow runs along the contour lines, i.e.
/// perpendicular to the gradient.
#[derive(Clone, Debug, Default)]
pub struct HeightField {
    pub cols: usize,
    pub rows: usize,
    pub cell: f64,
    pub origin: Vec2,
    pub heights: Vec<f64>,
    pub flow: Option<Vec<Vec2>>,
}

impl HeightField {
    pub fn new(cols: usize, rows: usize, cell: f64, heights: Vec<f64>) -> Option<Self> {
        if cols == 0 || rows == 0 || !(cell > 0.0) || !cell.is_finite() || heights.len() != cols * rows {
            return None;
        }
        Some(HeightField { cols, rows, cell, origin: Vec2::ZERO, heights, flow: None })
    }

    pub fn with_flow(mut self, flow: Vec<Vec2>) -> Self {
        if flow.len() == self.cols * self.rows {
            self.flow = Some(flow);
        }
        self
    }

    fn sample(&self, cx: usize, cy: usize) -> f64 {
        let h = self.heights[cy * self.cols + cx];
        if h.is_finite() { h } else { 0.0 }
    }

    /// Fractional cell coordinates, clamped to the grid.
    fn locate(&self, p: Vec2) -> (usize, usize, f64, f64) {
        let fx = ((p.x - self.origin.x) / self.cell).clamp(0.0, (self.cols - 1) as f64);
        let fy = ((p.y - self.origin.y) / self.cell).clamp(0.0, (self.rows - 1) as f64);
        let x0 = (fx.floor() as usize).min(self.cols.saturating_sub(2));
        let y0 = (fy.floor() as usize).min(self.rows.saturating_sub(2));
        (x0, y0, fx - x0 as f64, fy - y0 as f64)
    }
}

impl Terrain for HeightField {
    fn height(&self, p: Vec2) -> f64 {
        if !p.is_finite() {
            return 0.0;
        }
        let (x0, y0, tx, ty) = self.locate(p);
        let x1 = (x0 + 1).min(self.cols - 1);
        let y1 = (y0 + 1).min(self.rows - 1);
        let top = self.sample(x0, y0) * (1.0 - tx) + self.sample(x1, y0) * tx;
        let bottom = self.sample(x0, y1) * (1.0 - tx) + self.sample(x1, y1) * tx;
        top * (1.0 - ty) + bottom * ty
    }

    fn flow_at(&self, p: Vec2) -> Vec2 {
        if let Some(flow) = &self.flow {
            let (x0, y0, tx, ty) = self.locate(p);
            let cx = if tx >= 0.5 { (x0 + 1).min(self.cols - 1) } else { x0 };
            let cy = if ty >= 0.5 { (y0 + 1).min(self.rows - 1) } else { y0 };
            return flow[cy * self.cols + cx].normalize();
        }
        self.gradient(p, self.cell * 0.5).perp().normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilinear_interpolates_between_samples() {
        let hf = HeightField::new(2, 2, 10.0, vec![0.0, 1.0, 0.0, 1.0]).unwrap();
        assert!((hf.height(Vec2::new(5.0, 5.0)) - 0.5).abs() < 1e-12);
        assert!((hf.height(Vec2::new(10.0, 0.0)) - 1.0).abs() < 1e-12);
        // clamped outside the grid
        assert!((hf.height(Vec2::new(-50.0, 3.0)) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn derived_flow_follows_contours() {
        let hf = HeightField::new(3, 3, 10.0, vec![0.0, 0.5, 1.0, 0.0, 0.5, 1.0, 0.0, 0.5, 1.0]).unwrap();
        let f = hf.flow_at(Vec2::new(10.0, 10.0));
        assert!(f.x.abs() < 1e-9);
        assert!((f.length() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_mismatched_grid() {
        assert!(HeightField::new(3, 3, 1.0, vec![0.0; 8]).is_none());
        assert!(HeightField::new(2, 2, 0.0, vec![0.0; 4]).is_none());
    }

    #[test]
    fn fn_terrain_normalizes_flow() {
        let t = FnTerrain::new(|p: Vec2| p.x * 0.01, |_| Vec2::new(3.0, 4.0));
        assert!((t.flow_at(Vec2::ZERO).length() - 1.0).abs() < 1e-12);
        assert!((t.gradient(Vec2::new(5.0, 5.0), 1.0).x - 0.01).abs() < 1e-12);
    }
}
