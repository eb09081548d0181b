use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;

use crate::Point;

/// A logical statement about the board: exactly `mine_count` of `cells` are mines.
///
/// Cells live in a `BTreeSet`, so two statements built from the same cells in a
/// different order compare and hash equal, and iteration is always sorted.
///
/// The count is signed. Consistent observations never produce a negative count,
/// but the exhaustive strategy does not filter its output and may derive one when
/// it is fed contradictory input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Constraint {
    cells: BTreeSet<Point>,
    mine_count: i32,
}

impl Constraint {
    pub fn new(cells: impl IntoIterator<Item = Point>, mine_count: i32) -> Self {
        Constraint {
            cells: cells.into_iter().collect(),
            mine_count,
        }
    }

    pub fn cells(&self) -> &BTreeSet<Point> {
        &self.cells
    }

    pub fn mine_count(&self) -> i32 {
        self.mine_count
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: &Point) -> bool {
        self.cells.contains(cell)
    }

    /// Every cell is a mine when the count equals the number of cells.
    pub fn known_mines(&self) -> BTreeSet<Point> {
        if usize::try_from(self.mine_count).is_ok_and(|count| count == self.cells.len()) {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when the count is zero.
    pub fn known_safes(&self) -> BTreeSet<Point> {
        if self.mine_count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Removes a cell known to hold a mine, lowering the count with it.
    ///
    /// Returns `false` (and changes nothing) if the cell is not part of this statement.
    pub fn mark_cell_as_mine(&mut self, cell: Point) -> bool {
        if self.cells.remove(&cell) {
            self.mine_count -= 1;
            true
        } else {
            false
        }
    }

    /// Removes a cell known to be safe. The count is unaffected.
    pub fn mark_cell_as_safe(&mut self, cell: Point) -> bool {
        self.cells.remove(&cell)
    }

    pub fn is_subset_of(&self, other: &Constraint) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// Subset inference: if `self ⊆ superset`, the cells of `superset` outside
    /// `self` hold exactly `superset.mine_count - self.mine_count` mines.
    pub fn difference_from(&self, superset: &Constraint) -> Option<Constraint> {
        if !self.is_subset_of(superset) {
            return None;
        }
        Some(Constraint {
            cells: superset.cells.difference(&self.cells).copied().collect(),
            mine_count: superset.mine_count - self.mine_count,
        })
    }

    /// Sort key shared by several strategies. Not an identity: distinct statements
    /// of equal size and count compare equal.
    pub fn by_size_and_count(a: &Constraint, b: &Constraint) -> Ordering {
        (a.cells.len(), a.mine_count).cmp(&(b.cells.len(), b.mine_count))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}} = {}", self.cells.iter().join(", "), self.mine_count)
    }
}
