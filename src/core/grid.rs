//! Uniform-grid broad phase.
//!
//! Bodies are inserted into every cell their bounding box overlaps. Pairs
//! sharing a cell are candidates; pairs sharing several cells are reported
//! once. The grid is rebuilt from scratch every frame.

use std::collections::HashSet;

use super::body::{Body, BodyId};
use super::bounds::Aabb;
use crate::error::{Error, Result};

/// How many mean body widths fit across one cell at minimum.
const FOOTPRINT_FACTOR: f64 = 4.0;

/// Cell edge length for `bodies` inside `area`.
///
/// `max(sqrt(area / n), 4 * mean width, 4 * mean height)` over moving
/// bodies, which keeps a few bodies per cell independent of `n`. With no
/// moving bodies the cell spans the short side of the area.
pub fn cell_size_for(area: &Aabb, bodies: &[Body]) -> f64 {
    let (n, sum_w, sum_h) = bodies
        .iter()
        .filter(|b| b.is_moving())
        .map(|b| b.bounds())
        .fold((0usize, 0.0, 0.0), |(n, w, h), bb| {
            (n + 1, w + bb.width(), h + bb.height())
        });
    if n == 0 {
        return area.width().min(area.height());
    }
    let n_f = n as f64;
    let by_density = (area.width() * area.height() / n_f).sqrt();
    by_density
        .max(FOOTPRINT_FACTOR * sum_w / n_f)
        .max(FOOTPRINT_FACTOR * sum_h / n_f)
}

/// Grid of cells holding body handles.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    origin_x: f64,
    origin_y: f64,
    cell_size: f64,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<BodyId>>,
}

impl SpatialGrid {
    /// Errors: `Error::InvalidParam` if `cell_size` is not positive or the area is empty.
    pub fn new(area: Aabb, cell_size: f64) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "grid cell size must be finite and > 0, got {cell_size}"
            )));
        }
        if !(area.width() > 0.0 && area.height() > 0.0) {
            return Err(Error::InvalidParam("grid area must have positive extent".into()));
        }
        let cols = ((area.width() / cell_size).ceil() as usize).max(1);
        let rows = ((area.height() / cell_size).ceil() as usize).max(1);
        Ok(Self {
            origin_x: area.min.x,
            origin_y: area.min.y,
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// `(cols, rows)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    #[inline]
    fn col_of(&self, x: f64) -> usize {
        clamp_index((x - self.origin_x) / self.cell_size, self.cols)
    }

    #[inline]
    fn row_of(&self, y: f64) -> usize {
        clamp_index((y - self.origin_y) / self.cell_size, self.rows)
    }

    /// Insert `id` into every cell overlapped by `bounds` (clamped into the grid).
    pub fn insert(&mut self, id: BodyId, bounds: &Aabb) {
        let (c0, c1) = (self.col_of(bounds.min.x), self.col_of(bounds.max.x));
        let (r0, r1) = (self.row_of(bounds.min.y), self.row_of(bounds.max.y));
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.cells[row * self.cols + col].push(id);
            }
        }
    }

    /// Clear and insert every body under its arena index.
    pub fn rebuild(&mut self, bodies: &[Body]) {
        self.clear();
        for (i, body) in bodies.iter().enumerate() {
            self.insert(BodyId(i as u32), &body.bounds());
        }
    }

    /// Occupancy of each non-empty cell, for tuning diagnostics.
    pub fn occupancy(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().map(Vec::len).filter(|&n| n > 0)
    }

    /// Unordered candidate pairs `(low, high)`, each reported once, in
    /// row-major cell order.
    pub fn candidate_pairs(&self) -> Vec<(BodyId, BodyId)> {
        let mut seen: HashSet<(BodyId, BodyId)> = HashSet::new();
        let mut pairs = Vec::new();
        for cell in &self.cells {
            for (k, &a) in cell.iter().enumerate() {
                for &b in &cell[k + 1..] {
                    let key = if a < b { (a, b) } else { (b, a) };
                    if seen.insert(key) {
                        pairs.push(key);
                    }
                }
            }
        }
        pairs
    }
}

#[inline]
fn clamp_index(t: f64, n: usize) -> usize {
    if t.is_nan() || t <= 0.0 {
        0
    } else {
        (t.floor() as usize).min(n - 1)
    }
}
