use super::Search;
use crate::Constraint;

/// Compares every ordered pair, a statement with itself included.
///
/// Nothing is filtered, so contradictory input can come back as a negative
/// count, and self-pairs come back as the empty statement.
pub(super) fn search(statements: &[Constraint]) -> Search {
    let mut search = Search::default();

    for statement in statements {
        for other in statements {
            if let Some(inferred) = search.compare(statement, other) {
                search.record(inferred);
            }
        }
    }

    search
}
