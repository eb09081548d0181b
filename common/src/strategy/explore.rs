use std::cmp::Reverse;
use std::collections::{HashSet, VecDeque};

use itertools::Itertools;

use super::{is_informative, Search};
use crate::{Constraint, Point};

/// Which end of the frontier the next snapshot comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Frontier {
    /// Oldest snapshot first: breadth-first.
    Queue,
    /// Newest snapshot first: depth-first.
    Stack,
}

/// Canonical identity of a snapshot: each statement's sorted cells, the lists
/// themselves sorted. Counts are not part of the key.
type SnapshotKey = Vec<Vec<Point>>;

fn snapshot_key(snapshot: &[Constraint]) -> SnapshotKey {
    snapshot
        .iter()
        .map(|statement| statement.cells().iter().copied().collect_vec())
        .sorted()
        .collect()
}

/// Explores snapshots of the store as a search tree.
///
/// The root is the input, sorted ascending by size for the queue and descending
/// for the stack. Every unordered pair of a snapshot is examined once, in both
/// subset orientations; each statement that is neither derived before nor
/// already in the snapshot is recorded and spawns a child snapshot, its parent
/// plus that statement. Snapshots are immutable values, and a visited set on
/// [`snapshot_key`] stops identical snapshots from being expanded twice.
///
/// The stack variant additionally drops negative and empty derivations.
pub(super) fn search(statements: &[Constraint], order: Frontier) -> Search {
    let mut root = statements.to_vec();
    match order {
        Frontier::Queue => root.sort_by_key(Constraint::len),
        Frontier::Stack => root.sort_by_key(|statement| Reverse(statement.len())),
    }

    let mut search = Search::default();
    let mut visited: HashSet<SnapshotKey> = HashSet::new();
    let mut frontier: VecDeque<Vec<Constraint>> = VecDeque::from([root]);

    while let Some(snapshot) = next(&mut frontier, order) {
        if !visited.insert(snapshot_key(&snapshot)) {
            continue;
        }

        for (i, statement) in snapshot.iter().enumerate() {
            for other in &snapshot[i + 1..] {
                search.comparisons += 1;

                let derived = [statement.difference_from(other), other.difference_from(statement)];
                for inferred in derived.into_iter().flatten() {
                    if order == Frontier::Stack && !is_informative(&inferred) {
                        continue;
                    }
                    if search.contains(&inferred) || snapshot.contains(&inferred) {
                        continue;
                    }

                    let mut child = snapshot.clone();
                    child.push(inferred.clone());
                    frontier.push_back(child);
                    search.record(inferred);
                }
            }
        }
    }

    search
}

fn next(frontier: &mut VecDeque<Vec<Constraint>>, order: Frontier) -> Option<Vec<Constraint>> {
    match order {
        Frontier::Queue => frontier.pop_front(),
        Frontier::Stack => frontier.pop_back(),
    }
}
