//! Toroidal binary grid holding an automaton's state.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::schema::NEIGHBOURS;

/// Smallest allowed extent along either axis.
pub const MIN_DIMENSION: usize = 2;

/// Row-major binary grid with wraparound adjacency on both axes.
///
/// Grids are never mutated in place by the transition engine; every step
/// produces a new grid from one consistent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Check that a shape is usable.
    pub fn check_dimensions(rows: usize, cols: usize) -> Result<(), GridError> {
        if rows < MIN_DIMENSION || cols < MIN_DIMENSION {
            return Err(GridError::TooSmall { rows, cols });
        }
        Ok(())
    }

    /// Build from a flat row-major cell buffer.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<u8>) -> Result<Self, GridError> {
        Self::check_dimensions(rows, cols)?;
        if cells.len() != rows * cols {
            return Err(GridError::CellCount {
                expected: rows * cols,
                actual: cells.len(),
            });
        }
        if let Some(index) = cells.iter().position(|&v| v > 1) {
            return Err(GridError::NonBinary {
                row: index / cols,
                col: index % cols,
                value: cells[index],
            });
        }
        Ok(Self { rows, cols, cells })
    }

    /// Build from nested rows. Rows must all have the same length.
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);

        if let Some((row, actual)) = rows
            .iter()
            .enumerate()
            .find_map(|(i, r)| (r.len() != width).then_some((i, r.len())))
        {
            return Err(GridError::NotRectangular {
                row,
                expected: width,
                actual,
            });
        }

        Self::from_cells(height, width, rows.into_iter().flatten().collect())
    }

    /// All-dead grid with the given live cells set.
    pub fn from_live_cells(
        rows: usize,
        cols: usize,
        live: &[(usize, usize)],
    ) -> Result<Self, GridError> {
        Self::check_dimensions(rows, cols)?;
        let mut cells = vec![0u8; rows * cols];
        for &(r, c) in live {
            if r >= rows || c >= cols {
                return Err(GridError::OutOfBounds {
                    row: r,
                    col: c,
                    rows,
                    cols,
                });
            }
            cells[r * cols + c] = 1;
        }
        Ok(Self { rows, cols, cells })
    }

    /// Uniformly random grid.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Result<Self, GridError> {
        Self::check_dimensions(rows, cols)?;
        let cells = (0..rows * cols).map(|_| rng.gen_range(0..=1u8)).collect();
        Ok(Self { rows, cols, cells })
    }

    /// All-dead grid with the same shape as `other`.
    pub(crate) fn blank_like(other: &Grid) -> Self {
        Self {
            rows: other.rows,
            cols: other.cols,
            cells: vec![0; other.cells.len()],
        }
    }

    /// Resize to `other`'s shape if needed, for buffer reuse.
    pub(crate) fn match_shape(&mut self, other: &Grid) {
        if self.rows != other.rows || self.cols != other.cols {
            self.rows = other.rows;
            self.cols = other.cols;
            self.cells.clear();
            self.cells.resize(other.cells.len(), 0);
        }
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Row-major cell buffer.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Cell value at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.cols + col]
    }

    /// Number of live cells.
    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 1).count()
    }

    /// Proportion of live cells in [0, 1].
    pub fn live_proportion(&self) -> f64 {
        self.live_cells() as f64 / self.size() as f64
    }

    /// The 8 wrapped neighbours of (row, col), clockwise from upper-left.
    pub fn neighbourhood(&self, row: usize, col: usize) -> [u8; NEIGHBOURS] {
        let (up, down) = wrap(row, self.rows);
        let (left, right) = wrap(col, self.cols);
        ring(&self.cells, self.cols, (up, row, down), (left, col, right))
    }

    /// Number of live cells among the 8 wrapped neighbours of (row, col).
    pub fn live_neighbours(&self, row: usize, col: usize) -> u8 {
        self.neighbourhood(row, col).iter().sum()
    }

    /// Nested row representation.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells.chunks(self.cols).map(<[u8]>::to_vec).collect()
    }
}

/// Previous and next index along an axis of length `len`, with wraparound.
#[inline]
pub(crate) fn wrap(index: usize, len: usize) -> (usize, usize) {
    ((index + len - 1) % len, (index + 1) % len)
}

/// Neighbour states clockwise from upper-left: UL, U, UR, R, DR, D, DL, L.
#[inline]
pub(crate) fn ring(
    cells: &[u8],
    cols: usize,
    (up, row, down): (usize, usize, usize),
    (left, col, right): (usize, usize, usize),
) -> [u8; NEIGHBOURS] {
    let above = up * cols;
    let here = row * cols;
    let below = down * cols;
    [
        cells[above + left],
        cells[above + col],
        cells[above + right],
        cells[here + right],
        cells[below + right],
        cells[below + col],
        cells[below + left],
        cells[here + left],
    ]
}

impl TryFrom<Vec<Vec<u8>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Grid::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<u8>> {
    fn from(grid: Grid) -> Self {
        grid.to_rows()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            for &cell in row {
                f.write_str(if cell == 1 { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Grid validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Grid must be at least 2x2, got {rows}x{cols}")]
    TooSmall { rows: usize, cols: usize },
    #[error("Grid is not two-dimensional: row {row} has {actual} cells, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("Grid cell ({row}, {col}) has non-binary value {value}")]
    NonBinary { row: usize, col: usize, value: u8 },
    #[error("Grid buffer has {actual} cells, expected {expected}")]
    CellCount { expected: usize, actual: usize },
    #[error("Cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_from_rows_valid() {
        let grid = Grid::from_rows(vec![vec![0, 1, 0], vec![1, 1, 0]]).unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.get(1, 0), 1);
        assert_eq!(grid.live_cells(), 3);
        assert!((grid.live_proportion() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            Grid::from_rows(vec![vec![0, 1]]),
            Err(GridError::TooSmall { rows: 1, cols: 2 })
        );
        assert_eq!(
            Grid::from_rows(vec![vec![0], vec![1]]),
            Err(GridError::TooSmall { rows: 2, cols: 1 })
        );
        assert_eq!(
            Grid::from_rows(vec![vec![0, 1], vec![1]]),
            Err(GridError::NotRectangular {
                row: 1,
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            Grid::from_rows(vec![vec![0, 1], vec![2, 0]]),
            Err(GridError::NonBinary {
                row: 1,
                col: 0,
                value: 2
            })
        );
        assert!(matches!(
            Grid::from_cells(2, 2, vec![0; 3]),
            Err(GridError::CellCount { .. })
        ));
        assert!(Grid::from_rows(Vec::new()).is_err());
    }

    #[test]
    fn test_toroidal_neighbours() {
        // Only the top-left corner is alive
        let grid = Grid::from_live_cells(3, 3, &[(0, 0)]).unwrap();
        assert_eq!(grid.live_neighbours(2, 2), 1);
        assert_eq!(grid.live_neighbours(0, 2), 1);
        assert_eq!(grid.live_neighbours(2, 0), 1);
        assert_eq!(grid.live_neighbours(0, 0), 0);
    }

    #[test]
    fn test_neighbourhood_is_clockwise() {
        let grid = Grid::from_rows(vec![
            vec![1, 0, 0, 0],
            vec![0, 0, 1, 0],
            vec![0, 0, 0, 0],
            vec![0, 0, 0, 0],
        ])
        .unwrap();
        // Around (1, 1): upper-left is live, right is live
        assert_eq!(grid.neighbourhood(1, 1), [1, 0, 0, 1, 0, 0, 0, 0]);
        // Around (3, 3): the corner (0, 0) is the lower-right neighbour via wraparound
        assert_eq!(grid.neighbourhood(3, 3), [0, 0, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_random_is_binary_and_seeded() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let g1 = Grid::random(10, 12, &mut a).unwrap();
        let g2 = Grid::random(10, 12, &mut b).unwrap();
        assert_eq!(g1, g2);
        assert!(g1.cells().iter().all(|&v| v <= 1));
        assert!(Grid::random(1, 5, &mut a).is_err());
    }

    #[test]
    fn test_serialization() {
        let grid = Grid::from_rows(vec![vec![0, 1], vec![1, 0]]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, "[[0,1],[1,0]]");
        let parsed: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, grid);
        assert!(serde_json::from_str::<Grid>("[[0,3],[1,0]]").is_err());
    }

    #[test]
    fn test_display() {
        let grid = Grid::from_rows(vec![vec![0, 1], vec![1, 1]]).unwrap();
        assert_eq!(grid.to_string(), ".#\n##\n");
    }
}
