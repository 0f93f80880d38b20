/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for efficient neighbor lookups.
 * It divides a square region starting at the origin into uniform square
 * cells, owns the authoritative list of boids, and keeps a per-cell list of
 * boid indices so a query only touches the cells around a point instead of
 * the whole population.
 *
 * Membership is only refreshed by `rebuild`; between rebuilds the cells
 * describe where the boids were at the end of the previous frame.
 */

use crate::boid::Boid;
use crate::error::SimError;

/// Integer cell coordinate `(i, j)`, with `i` along x and `j` along y.
pub type CellCoord = (usize, usize);

/// Upper bound on `divisions²`.
pub const MAX_CELLS: usize = 1 << 24;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_width: f32,
    divisions: usize,
    // Row-major: index = j * divisions + i
    cells: Vec<Vec<usize>>,
    boids: Vec<Boid>,
}

impl SpatialGrid {
    /// Build an empty grid of `floor(width / cell_width)` divisions per side.
    pub fn new(width: f32, cell_width: f32) -> Result<Self, SimError> {
        if !(cell_width.is_finite() && cell_width > 0.0) {
            return Err(SimError::InvalidConfig("cell width must be positive"));
        }
        if !(width.is_finite() && width > 0.0) {
            return Err(SimError::InvalidConfig("grid width must be positive"));
        }
        let divisions = (width / cell_width).floor() as usize;
        if divisions == 0 {
            return Err(SimError::InvalidConfig(
                "grid width must hold at least one cell",
            ));
        }
        let num_cells = divisions
            .checked_mul(divisions)
            .filter(|&n| n <= MAX_CELLS)
            .ok_or(SimError::InvalidConfig("grid has too many cells"))?;

        Ok(Self {
            cell_width,
            divisions,
            cells: vec![Vec::new(); num_cells],
            boids: Vec::new(),
        })
    }

    #[inline]
    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    #[inline]
    pub fn divisions(&self) -> usize {
        self.divisions
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn boids_mut(&mut self) -> &mut [Boid] {
        &mut self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    /// Take ownership of a boid. It joins a cell on the next `rebuild`.
    pub fn add(&mut self, boid: Boid) {
        self.boids.push(boid);
    }

    /// Cell containing (x, y). Points outside the grid are pinned to the border cell.
    #[inline]
    pub fn cell_index_of(&self, x: f32, y: f32) -> CellCoord {
        (self.axis_index(x), self.axis_index(y))
    }

    #[inline]
    fn axis_index(&self, v: f32) -> usize {
        let last = (self.divisions - 1) as f32;
        // max/min rather than clamp so NaN lands on cell 0
        (v / self.cell_width).floor().max(0.0).min(last) as usize
    }

    #[inline]
    fn slot(&self, (i, j): CellCoord) -> usize {
        j * self.divisions + i
    }

    /// Boid indices stored in cell `coord`, or `None` outside the grid.
    pub fn cell(&self, coord: CellCoord) -> Option<&[usize]> {
        if coord.0 >= self.divisions || coord.1 >= self.divisions {
            return None;
        }
        Some(&self.cells[self.slot(coord)])
    }

    pub fn find_cell_containing(&self, x: f32, y: f32) -> &[usize] {
        &self.cells[self.slot(self.cell_index_of(x, y))]
    }

    /// Candidate neighbours of (x, y) as indices into `boids()`.
    ///
    /// Up to one cell width this is only the containing cell, not its eight
    /// neighbours. Larger ranges scan a `2·ext × 2·ext` block starting `ext`
    /// cells before the containing cell, where `ext = ceil(range / cell_width)`;
    /// the block stops one short of `ext` cells after it.
    pub fn find_near(&self, x: f32, y: f32, range: f32) -> Vec<usize> {
        if range <= self.cell_width {
            return self.find_cell_containing(x, y).to_vec();
        }
        let ext = (range / self.cell_width).ceil() as i64;
        self.find_extended(x, y, ext)
    }

    fn find_extended(&self, x: f32, y: f32, ext: i64) -> Vec<usize> {
        let (ci, cj) = self.cell_index_of(x, y);
        let (ci, cj) = (ci as i64, cj as i64);
        let divisions = self.divisions as i64;

        // Clip the window to the grid first; the upper end stays exclusive
        let clip = |c: i64| {
            let lo = c.saturating_sub(ext).max(0);
            let hi = c.saturating_add(ext).min(divisions);
            lo as usize..hi.max(lo) as usize
        };

        let mut group = Vec::new();
        for i in clip(ci) {
            for j in clip(cj) {
                group.extend_from_slice(&self.cells[self.slot((i, j))]);
            }
        }
        group
    }

    /// Re-bucket every boid by its current position.
    pub fn rebuild(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        for idx in 0..self.boids.len() {
            let position = self.boids[idx].position;
            let slot = self.slot(self.cell_index_of(position.x, position.y));
            self.cells[slot].push(idx);
        }
        tracing::trace!(boids = self.boids.len(), cells = self.cells.len(), "grid rebuilt");
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }
}
