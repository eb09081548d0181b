use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::{Point, UnknownKey};

/// How the next cell is taken from the queue of known-safe, unplayed cells.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
pub enum SafeCellPolicy {
    /// Oldest discovery first.
    #[default]
    Fifo,
    /// Newest discovery first.
    Lifo,
    /// Smallest `(row, col)` first.
    Sorted,
    /// Uniformly at random.
    Random,
}

const REGISTRY: [(&str, SafeCellPolicy); 8] = [
    ("First In, First Out", SafeCellPolicy::Fifo),
    ("Last In, First Out", SafeCellPolicy::Lifo),
    ("Sorted by position", SafeCellPolicy::Sorted),
    ("Random", SafeCellPolicy::Random),
    ("fifo", SafeCellPolicy::Fifo),
    ("lifo", SafeCellPolicy::Lifo),
    ("sorted", SafeCellPolicy::Sorted),
    ("random", SafeCellPolicy::Random),
];

impl SafeCellPolicy {
    pub const ALL: [SafeCellPolicy; 4] = [
        SafeCellPolicy::Fifo,
        SafeCellPolicy::Lifo,
        SafeCellPolicy::Sorted,
        SafeCellPolicy::Random,
    ];

    pub fn key(self) -> &'static str {
        REGISTRY
            .iter()
            .find(|&&(_, policy)| policy == self)
            .map(|&(key, _)| key)
            .unwrap_or("First In, First Out")
    }

    /// Removes and returns one cell, or `None` if the queue is empty.
    pub fn select<R: Rng + ?Sized>(self, queue: &mut VecDeque<Point>, rng: &mut R) -> Option<Point> {
        match self {
            SafeCellPolicy::Fifo => queue.pop_front(),
            SafeCellPolicy::Lifo => queue.pop_back(),
            SafeCellPolicy::Sorted => {
                let (index, _) = queue.iter().enumerate().min_by_key(|&(_, cell)| cell)?;
                queue.remove(index)
            }
            SafeCellPolicy::Random => {
                if queue.is_empty() {
                    return None;
                }
                let index = rng.random_range(0..queue.len());
                queue.remove(index)
            }
        }
    }
}

impl FromStr for SafeCellPolicy {
    type Err = UnknownKey;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        REGISTRY
            .iter()
            .find(|&&(key, _)| key == name.trim())
            .map(|&(_, policy)| policy)
            .ok_or_else(|| UnknownKey {
                kind: "safe cell strategy",
                name: name.to_string(),
                fallback: SafeCellPolicy::default().key(),
            })
    }
}

impl fmt::Display for SafeCellPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
