use super::Search;
use crate::Constraint;

/// Splits the store in half, recurses into each half independently, and then
/// compares only what the two halves hand back: the left results as subsets
/// against the right results.
///
/// Pairs that sit inside the same half are never compared across the full
/// product, so this finds less than the exhaustive scan.
pub(super) fn search(statements: &[Constraint]) -> Search {
    let mut search = Search::default();
    if !statements.is_empty() {
        let _ = split(statements, &mut search);
    }
    search
}

/// Returns the half's inputs followed by everything derived inside it.
fn split(statements: &[Constraint], search: &mut Search) -> Vec<Constraint> {
    match statements {
        [] => Vec::new(),
        [single] => vec![single.clone()],
        _ => {
            // The left half takes the middle element.
            let mid = statements.len().div_ceil(2);
            let left = split(&statements[..mid], search);
            let right = split(&statements[mid..], search);

            let mut merged = left.clone();
            merged.extend(right.iter().cloned());

            for left_statement in &left {
                for right_statement in &right {
                    let Some(inferred) = search.compare(left_statement, right_statement) else {
                        continue;
                    };
                    if !merged.contains(&inferred) {
                        merged.push(inferred.clone());
                        search.record(inferred);
                    }
                }
            }

            merged
        }
    }
}
