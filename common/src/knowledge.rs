use std::collections::{BTreeSet, HashSet};

use crate::{Constraint, Point};

/// The live, ordered collection of statements the solver reasons over.
///
/// Statements are owned by value. Strategies only ever borrow the store as a
/// slice for the length of one call, so a mark can never be observed through
/// a stale alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase {
    statements: Vec<Constraint>,
}

/// What a purge removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Purge {
    pub empty: usize,
    pub duplicates: usize,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Constraint) {
        self.statements.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.statements.iter()
    }

    pub fn as_slice(&self) -> &[Constraint] {
        &self.statements
    }

    /// Cells that some statement pins down, as `(mines, safes)`.
    pub fn certain_cells(&self) -> (BTreeSet<Point>, BTreeSet<Point>) {
        let mut mines = BTreeSet::new();
        let mut safes = BTreeSet::new();
        for statement in &self.statements {
            mines.extend(statement.known_mines());
            safes.extend(statement.known_safes());
        }
        (mines, safes)
    }

    /// Removes a known mine from every statement. Returns how many statements changed.
    pub fn mark_mine(&mut self, cell: Point) -> usize {
        self.statements
            .iter_mut()
            .map(|statement| statement.mark_cell_as_mine(cell))
            .filter(|&changed| changed)
            .count()
    }

    /// Removes a known safe cell from every statement. Returns how many statements changed.
    pub fn mark_safe(&mut self, cell: Point) -> usize {
        self.statements
            .iter_mut()
            .map(|statement| statement.mark_cell_as_safe(cell))
            .filter(|&changed| changed)
            .count()
    }

    /// Drops empty statements and every repeat of a statement already kept.
    /// The first occurrence wins, so relative order is preserved.
    pub fn purge(&mut self) -> Purge {
        let mut kept = HashSet::with_capacity(self.statements.len());
        let mut purge = Purge::default();

        self.statements.retain(|statement| {
            if statement.is_empty() {
                purge.empty += 1;
                false
            } else if kept.contains(statement) {
                purge.duplicates += 1;
                false
            } else {
                kept.insert(statement.clone());
                true
            }
        });

        purge
    }
}

impl Extend<Constraint> for KnowledgeBase {
    fn extend<I: IntoIterator<Item = Constraint>>(&mut self, iter: I) {
        self.statements.extend(iter);
    }
}

impl FromIterator<Constraint> for KnowledgeBase {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        KnowledgeBase {
            statements: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
