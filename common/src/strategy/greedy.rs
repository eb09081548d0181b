use std::cmp::Reverse;

use super::Search;
use crate::Constraint;

/// For each statement, smallest first, scans the working list from the smallest
/// statement up and stops at the first candidate that is not strictly smaller.
///
/// Derived statements join the working list, which is re-sorted after every
/// outer step, so later statements can use them as subsets. The outer pass only
/// visits the statements that were handed in.
pub(super) fn by_size(statements: &[Constraint]) -> Search {
    let mut working = statements.to_vec();
    working.sort_by_key(Constraint::len);
    let outer = working.clone();

    let mut search = Search::default();

    for current in &outer {
        let mut derived = Vec::new();

        for candidate in &working {
            search.comparisons += 1;
            if candidate.len() >= current.len() {
                break;
            }

            if let Some(inferred) = candidate.difference_from(current) {
                if search.record(inferred.clone()) {
                    derived.push(inferred);
                }
            }
        }

        working.extend(derived);
        working.sort_by_key(Constraint::len);
    }

    search
}

/// Sorts by mine count, highest first (larger statements first on ties), and
/// scans forward from each statement for as long as the candidates are subsets
/// of it.
///
/// The first non-subset ends the scan, so valid pairs further down the list are
/// missed. That shortcut is what makes this strategy cheap.
pub(super) fn by_mine_count(statements: &[Constraint]) -> Search {
    let mut sorted = statements.to_vec();
    sorted.sort_by_key(|statement| Reverse((statement.mine_count(), statement.len())));

    let mut search = Search::default();

    for (i, current) in sorted.iter().enumerate() {
        for next in &sorted[i + 1..] {
            match search.compare(next, current) {
                Some(inferred) => {
                    search.record(inferred);
                }
                None => break,
            }
        }
    }

    search
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn p(row: usize, col: usize) -> Point {
        Point::new(row, col)
    }

    #[test]
    fn test_by_size_breaks_on_size_crossover() {
        let store = vec![
            Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 2),
            Constraint::new([p(0, 0), p(0, 1)], 1),
        ];
        let search = by_size(&store);

        // Smallest statement: one look, immediate break.
        // Largest: the pair, then the break on itself.
        assert_eq!(search.comparisons, 3);
        assert_eq!(search.inferred, vec![Constraint::new([p(0, 2)], 1)]);
    }

    #[test]
    fn test_by_size_chains_through_derived_statements() {
        // {(0,0)} = 0 inside {(0,0),(0,1)} = 1 gives {(0,1)} = 1, which in turn
        // sits inside the three-cell statement.
        let store = vec![
            Constraint::new([p(0, 0)], 0),
            Constraint::new([p(0, 0), p(0, 1)], 1),
            Constraint::new([p(0, 1), p(0, 2), p(0, 3)], 1),
        ];
        let search = by_size(&store);
        assert!(search.inferred.contains(&Constraint::new([p(0, 1)], 1)));
        assert!(search.inferred.contains(&Constraint::new([p(0, 2), p(0, 3)], 0)));
    }

    #[test]
    fn test_by_mine_count_scans_while_subsets() {
        let store = vec![
            Constraint::new([p(0, 0)], 1),
            Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 2),
            Constraint::new([p(0, 1), p(0, 2)], 1),
        ];
        let search = by_mine_count(&store);

        // Order: {3 cells}=2, {2 cells}=1, {1 cell}=1.
        // The third is not inside the second, so the second's scan stops at once.
        assert_eq!(search.comparisons, 3);
        assert_eq!(
            search.inferred,
            vec![
                Constraint::new([p(0, 0)], 1),
                Constraint::new([p(0, 1), p(0, 2)], 1)
            ]
        );
    }

    #[test]
    fn test_by_mine_count_misses_pairs_past_a_non_subset() {
        let store = vec![
            Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 3),
            Constraint::new([p(5, 5)], 2),
            Constraint::new([p(0, 0)], 1),
        ];
        let search = by_mine_count(&store);
        // {(5,5)} sits between the superset and its subset and ends the scan.
        assert!(search.inferred.is_empty());
    }
}
