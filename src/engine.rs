use std::fmt;

use clap::ValueEnum;

use crate::grid::Grid;

/// Advances the automaton by one generation.
///
/// Every cell of `src` is evaluated against the same snapshot and the result
/// is written to `dst`; implementations never read a value written during the
/// current generation. Neighborhoods are clamped at the board edges, no
/// wraparound.
pub trait Stepper: Send + Sync {
    fn advance_into(&self, src: &Grid, dst: &mut Grid);

    fn label(&self) -> &'static str;
}

/// Conway's rule: a live cell survives with 2 or 3 live neighbors, a dead
/// cell is born with exactly 3.
#[inline]
fn next_state(alive: bool, neighbors: u8) -> bool {
    neighbors == 3 || (alive && neighbors == 2)
}

/// Live cells in the 3x3 window around (row, column), excluding the center.
/// Cells outside the board contribute nothing.
fn live_neighbors(grid: &Grid, row: usize, column: usize) -> u8 {
    let (rows, columns) = grid.dimensions();
    let mut count = 0;
    for r in row.saturating_sub(1)..=(row + 1).min(rows - 1) {
        for c in column.saturating_sub(1)..=(column + 1).min(columns - 1) {
            if (r, c) != (row, column) && grid.get(r, c) {
                count += 1;
            }
        }
    }
    count
}

/// Straightforward per-cell evaluation of the clamped 3x3 window.
pub struct ScalarStepper;

impl Stepper for ScalarStepper {
    fn advance_into(&self, src: &Grid, dst: &mut Grid) {
        assert_eq!(
            src.dimensions(),
            dst.dimensions(),
            "generation buffers must have identical dimensions"
        );
        let (rows, columns) = src.dimensions();
        for row in 0..rows {
            for column in 0..columns {
                let alive = src.get(row, column);
                dst.set(row, column, next_state(alive, live_neighbors(src, row, column)));
            }
        }
    }

    fn label(&self) -> &'static str {
        "scalar"
    }
}

/// Row-banded evaluation: per row, sum the three-row column band once, then
/// slide a three-column window across it. Same output as [`ScalarStepper`]
/// with far fewer bounds checks.
pub struct WindowedStepper;

impl Stepper for WindowedStepper {
    fn advance_into(&self, src: &Grid, dst: &mut Grid) {
        assert_eq!(
            src.dimensions(),
            dst.dimensions(),
            "generation buffers must have identical dimensions"
        );
        let (rows, columns) = src.dimensions();
        let mut band = vec![0u8; columns];
        for row in 0..rows {
            let here = src.row(row);
            let above = (row > 0).then(|| src.row(row - 1));
            let below = (row + 1 < rows).then(|| src.row(row + 1));
            for column in 0..columns {
                band[column] = here[column] as u8
                    + above.map_or(0, |r| r[column] as u8)
                    + below.map_or(0, |r| r[column] as u8);
            }

            let out = dst.row_mut(row);
            // window holds the band sum over the clamped [column-1, column+1]
            // span; the center cell is part of it and subtracted back out.
            let mut window = band[0] + if columns > 1 { band[1] } else { 0 };
            for column in 0..columns {
                let alive = here[column];
                out[column] = next_state(alive, window - alive as u8);
                if column + 2 < columns {
                    window += band[column + 2];
                }
                if column >= 1 {
                    window -= band[column - 1];
                }
            }
        }
    }

    fn label(&self) -> &'static str {
        "windowed"
    }
}

/// Startup choice between the two stepping implementations. They produce
/// identical generations; only their evaluation strategy differs.
#[derive(ValueEnum, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StepperKind {
    #[default]
    Scalar,
    Windowed,
}

impl StepperKind {
    pub fn build(self) -> Box<dyn Stepper> {
        match self {
            Self::Scalar => Box::new(ScalarStepper),
            Self::Windowed => Box::new(WindowedStepper),
        }
    }
}

impl fmt::Display for StepperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scalar => "scalar",
            Self::Windowed => "windowed",
        })
    }
}
