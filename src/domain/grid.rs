/// Cell grid: a fixed-size 2D field of boolean cells.
///
/// A dumb container: it stores cells and answers index queries,
/// nothing more. Coordinates are NOT wrapped here; toroidal addressing
/// belongs to the step function (sim::step).

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimension { width: usize, height: usize },
}

/// Row-major field of cells. `true` = alive.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>, // len == width * height, every coordinate defined
}

impl Grid {
    /// All-dead grid. Zero width or height is a configuration error,
    /// never a valid field.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimension { width, height });
        }
        Ok(Grid {
            width,
            height,
            cells: vec![false; width * height],
        })
    }

    /// Randomly seeded grid: each cell is independently alive with
    /// probability `density`.
    pub fn random(
        width: usize,
        height: usize,
        rng: &mut impl Rng,
        density: f64,
    ) -> Result<Self, GridError> {
        let mut grid = Grid::new(width, height)?;
        grid.scatter(rng, density);
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Out-of-range coordinates are a caller bug, not a recoverable
    /// condition; this indexes directly and panics on violation.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        self.cells[row * self.width + col] = alive;
    }

    /// Refill every cell with an independent random draw. Used for the
    /// initial seeding and for reseed commands.
    pub fn scatter(&mut self, rng: &mut impl Rng, density: f64) {
        for cell in &mut self.cells {
            *cell = rng.gen_bool(density);
        }
    }

    /// Number of live cells. Shown in the HUD.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
