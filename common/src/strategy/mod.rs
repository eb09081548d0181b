//! Subset-inference search strategies.
//!
//! Every strategy looks for pairs `A ⊆ B` in a snapshot of the store and derives
//! `(B.cells - A.cells, B.mine_count - A.mine_count)`. They differ in which
//! pairs they look at and in what they prune, which trades coverage for cost.
//! None of them mutate their input, and each returns only derived statements;
//! merging into the store is the solver's job.

mod exhaustive;
mod explore;
mod greedy;
mod memoized;
mod partition;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::{Constraint, Metrics, UnknownKey};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum InferenceStrategy {
    /// Every ordered pair of the store.
    #[default]
    Exhaustive,
    /// Halve, recurse, and cross-compare only what each half produced.
    RecursivePartition,
    /// Ascending `(size, count)` order with a memo of pairs already used.
    SortedMemoized,
    /// Ascending size, scanning only strictly smaller statements.
    GreedyBySize,
    /// Descending mine count, scanning forward while candidates stay subsets.
    GreedyByMineCount,
    /// Snapshot exploration with a FIFO frontier.
    BreadthFirst,
    /// Snapshot exploration with a LIFO frontier.
    DepthFirst,
}

const REGISTRY: [(&str, InferenceStrategy); 7] = [
    ("brute_force", InferenceStrategy::Exhaustive),
    ("divide_and_conquer", InferenceStrategy::RecursivePartition),
    ("dynamic_programming", InferenceStrategy::SortedMemoized),
    ("greedy_algorithm_size", InferenceStrategy::GreedyBySize),
    ("greedy_algorithm_minecount", InferenceStrategy::GreedyByMineCount),
    ("bfs", InferenceStrategy::BreadthFirst),
    ("dfs", InferenceStrategy::DepthFirst),
];

impl InferenceStrategy {
    pub const ALL: [InferenceStrategy; 7] = [
        InferenceStrategy::Exhaustive,
        InferenceStrategy::RecursivePartition,
        InferenceStrategy::SortedMemoized,
        InferenceStrategy::GreedyBySize,
        InferenceStrategy::GreedyByMineCount,
        InferenceStrategy::BreadthFirst,
        InferenceStrategy::DepthFirst,
    ];

    /// The registry key this strategy is selected by.
    pub fn key(self) -> &'static str {
        REGISTRY
            .iter()
            .find(|&&(_, strategy)| strategy == self)
            .map(|&(key, _)| key)
            .unwrap_or("brute_force")
    }

    /// Runs one scan over `statements` and records its cost in `metrics`.
    pub fn infer(self, statements: &[Constraint], metrics: &mut Metrics) -> Vec<Constraint> {
        let search = match self {
            InferenceStrategy::Exhaustive => exhaustive::search(statements),
            InferenceStrategy::RecursivePartition => partition::search(statements),
            InferenceStrategy::SortedMemoized => memoized::search(statements),
            InferenceStrategy::GreedyBySize => greedy::by_size(statements),
            InferenceStrategy::GreedyByMineCount => greedy::by_mine_count(statements),
            InferenceStrategy::BreadthFirst => {
                explore::search(statements, explore::Frontier::Queue)
            }
            InferenceStrategy::DepthFirst => explore::search(statements, explore::Frontier::Stack),
        };

        metrics.record_search(search.comparisons, search.inferred.len());
        log::trace!(
            "{}: {} comparisons, {} inferences over {} statements",
            self,
            search.comparisons,
            search.inferred.len(),
            statements.len()
        );

        search.inferred
    }
}

impl FromStr for InferenceStrategy {
    type Err = UnknownKey;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        REGISTRY
            .iter()
            .find(|&&(key, _)| key == name.trim())
            .map(|&(_, strategy)| strategy)
            .ok_or_else(|| UnknownKey {
                kind: "inference strategy",
                name: name.to_string(),
                fallback: InferenceStrategy::default().key(),
            })
    }
}

impl fmt::Display for InferenceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Working state of one scan: what has been derived so far, in discovery order,
/// and how many pairs were examined to get there.
#[derive(Debug, Default)]
struct Search {
    inferred: Vec<Constraint>,
    seen: HashSet<Constraint>,
    comparisons: u64,
}

impl Search {
    /// Counts one pair examination and applies the subset rule to it.
    fn compare(&mut self, subset: &Constraint, superset: &Constraint) -> Option<Constraint> {
        self.comparisons += 1;
        subset.difference_from(superset)
    }

    /// Keeps `statement` unless it was already derived. Returns whether it was new.
    fn record(&mut self, statement: Constraint) -> bool {
        if self.seen.contains(&statement) {
            return false;
        }
        self.seen.insert(statement.clone());
        self.inferred.push(statement);
        true
    }

    fn contains(&self, statement: &Constraint) -> bool {
        self.seen.contains(statement)
    }
}

/// The guard some strategies apply: a derived statement with a negative count or
/// no cells tells the solver nothing it can use.
fn is_informative(statement: &Constraint) -> bool {
    statement.mine_count() >= 0 && !statement.is_empty()
}
