//! Propositional deduction for an automated Minesweeper player.
//!
//! Observations (a revealed cell and its adjacent mine count) are turned into
//! [`Constraint`]s, which the [`Solver`] keeps in a [`KnowledgeBase`] and pushes
//! to a fixed point: certain cells are extracted, the store is purged, and one of
//! seven [`InferenceStrategy`] variants derives new statements by subset
//! comparison. A [`Metrics`] recorder measures what each strategy costs.

use std::fmt;

pub mod config;
pub mod constraint;
pub mod game;
pub mod knowledge;
pub mod metrics;
pub mod oracle;
pub mod policy;
pub mod runner;
pub mod solver;
pub mod strategy;

pub use config::{Resolved, SolverConfig, UnknownKey};
pub use constraint::Constraint;
pub use game::{Cell, Game, GameState, StartPosition};
pub use knowledge::KnowledgeBase;
pub use metrics::{Metrics, MetricsSummary};
pub use policy::SafeCellPolicy;
pub use solver::Solver;
pub use strategy::InferenceStrategy;

/// A cell on the square board, addressed by row then column.
///
/// The derived ordering is lexicographic on `(row, col)`, which is what the
/// position-sorted safe-cell policy pops by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// All valid neighbour coordinates of `point` on a `size` x `size` board.
/// Board edges and corners yield fewer than eight.
pub fn neighbours(point: Point, size: usize) -> impl Iterator<Item = Point> {
    (-1..=1isize).flat_map(move |dr| {
        (-1..=1isize).filter_map(move |dc| {
            if dr == 0 && dc == 0 {
                return None;
            }

            let row = point.row as isize + dr;
            let col = point.col as isize + dc;

            if row >= 0 && row < size as isize && col >= 0 && col < size as isize {
                Some(Point::new(row as usize, col as usize))
            } else {
                None
            }
        })
    })
}

/// Every cell of a `size` x `size` board in row-major order.
pub fn all_points(size: usize) -> impl Iterator<Item = Point> {
    (0..size).flat_map(move |row| (0..size).map(move |col| Point::new(row, col)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbours() {
        // Corner, edge and centre cells of a 3x3 board.
        assert_eq!(neighbours(Point::new(0, 0), 3).count(), 3);
        assert_eq!(neighbours(Point::new(0, 1), 3).count(), 5);
        assert_eq!(neighbours(Point::new(1, 1), 3).count(), 8);

        let around_corner: Vec<Point> = neighbours(Point::new(2, 2), 3).collect();
        assert_eq!(
            around_corner,
            vec![Point::new(1, 1), Point::new(1, 2), Point::new(2, 1)]
        );
    }

    #[test]
    fn test_single_cell_board_has_no_neighbours() {
        assert_eq!(neighbours(Point::new(0, 0), 1).count(), 0);
    }

    #[test]
    fn test_all_points() {
        let points: Vec<Point> = all_points(2).collect();
        assert_eq!(
            points,
            vec![
                Point::new(0, 0),
                Point::new(0, 1),
                Point::new(1, 0),
                Point::new(1, 1)
            ]
        );
    }
}
