/// The step function: computes the next generation from the current one.
///
/// Double-buffer discipline:
///   - reads ONLY from `source`, writes ONLY to `dest`
///   - every neighbor count is therefore taken against a fully settled
///     generation; no cell is read after being overwritten
///   - `source` and `dest` must never alias; the caller's borrows
///     (`&Grid` vs `&mut Grid`) make that a compile-time fact
///
/// Addressing is toroidal: edges connect to the opposite edge, so
/// neighbor lookups never fall outside the field.

use thiserror::Error;

use crate::domain::grid::Grid;
use crate::domain::rules;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    /// Buffers of different shapes can only arise from a construction
    /// bug, never from user input. Fatal upstream.
    #[error("buffer shapes differ: source {src_w}x{src_h}, destination {dst_w}x{dst_h}")]
    DimensionMismatch {
        src_w: usize,
        src_h: usize,
        dst_w: usize,
        dst_h: usize,
    },
}

/// The 8 neighbor offsets as (Δrow, Δcol).
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    ( 0, -1),          ( 0, 1),
    ( 1, -1), ( 1, 0), ( 1, 1),
];

/// Apply the rule to every cell of `source`, writing the next
/// generation into `dest`. Deterministic; never mutates `source`.
pub fn advance(source: &Grid, dest: &mut Grid) -> Result<(), StepError> {
    if source.width() != dest.width() || source.height() != dest.height() {
        return Err(StepError::DimensionMismatch {
            src_w: source.width(),
            src_h: source.height(),
            dst_w: dest.width(),
            dst_h: dest.height(),
        });
    }

    for row in 0..source.height() {
        for col in 0..source.width() {
            let neighbors = live_neighbors(source, row, col);
            dest.set(row, col, rules::next_state(source.get(row, col), neighbors));
        }
    }

    Ok(())
}

/// Count live cells among the 8 toroidal neighbors of (row, col).
fn live_neighbors(grid: &Grid, row: usize, col: usize) -> u8 {
    let height = grid.height() as isize;
    let width = grid.width() as isize;

    NEIGHBOR_OFFSETS
        .iter()
        .filter(|(d_row, d_col)| {
            let r = (row as isize + d_row).rem_euclid(height) as usize;
            let c = (col as isize + d_col).rem_euclid(width) as usize;
            grid.get(r, c)
        })
        .count() as u8
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
