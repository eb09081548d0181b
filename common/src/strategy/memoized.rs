use std::collections::HashSet;

use super::{is_informative, Search};
use crate::Constraint;

/// Sorts by `(size, count)` and compares each statement with the ones after it,
/// skipping pairs already in the memo.
///
/// A productive pair is memoized, and when the derived statement still has more
/// than one cell, `(derived, source)` is memoized as well so that pair is never
/// reworked. Negative counts and empty results are rejected.
pub(super) fn search(statements: &[Constraint]) -> Search {
    let mut sorted = statements.to_vec();
    sorted.sort_by(Constraint::by_size_and_count);

    let mut search = Search::default();
    let mut memo: HashSet<(Constraint, Constraint)> = HashSet::new();

    for (i, statement) in sorted.iter().enumerate() {
        for other in &sorted[i + 1..] {
            let key = (statement.clone(), other.clone());
            if memo.contains(&key) {
                continue;
            }

            let Some(inferred) = search.compare(statement, other) else {
                continue;
            };
            if !is_informative(&inferred) {
                continue;
            }

            memo.insert(key);

            let seeds_memo = inferred.len() > 1;
            if search.record(inferred.clone()) && seeds_memo {
                memo.insert((inferred, statement.clone()));
            }
        }
    }

    search
}
