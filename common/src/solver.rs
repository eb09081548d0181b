use std::collections::{BTreeSet, HashSet, VecDeque};

use rand::SeedableRng;
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;

use crate::{
    Constraint, InferenceStrategy, KnowledgeBase, Metrics, Point, SafeCellPolicy, SolverConfig,
    UnknownKey, all_points, neighbours,
};

/// The propagation engine: owns everything the player knows about one board.
///
/// Observations go in through [`Solver::add_knowledge`], which runs deduction to a
/// fixed point before returning. Moves come out through [`Solver::make_safe_move`]
/// and, when logic has nothing left, [`Solver::make_random_move`].
#[derive(Debug)]
pub struct Solver {
    grid_size: usize,
    strategy: InferenceStrategy,
    policy: SafeCellPolicy,
    moves_made: HashSet<Point>,
    identified_mines: HashSet<Point>,
    identified_safe_cells: HashSet<Point>,
    safe_cell_queue: VecDeque<Point>,
    knowledge_base: KnowledgeBase,
    metrics: Metrics,
    rng: StdRng,
    fallbacks: Vec<UnknownKey>,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Solver {
            grid_size: config.grid_size,
            strategy: config.strategy,
            policy: config.policy,
            moves_made: HashSet::new(),
            identified_mines: HashSet::new(),
            identified_safe_cells: HashSet::new(),
            safe_cell_queue: VecDeque::new(),
            knowledge_base: KnowledgeBase::new(),
            metrics: Metrics::new(),
            rng,
            fallbacks: Vec::new(),
        }
    }

    /// Builds a solver from registry keys. Unknown keys fall back to the
    /// defaults and are kept in [`Solver::fallbacks`].
    pub fn from_keys(grid_size: usize, strategy: &str, policy: &str, seed: Option<u64>) -> Self {
        let (mut config, fallbacks) = SolverConfig::from_keys(grid_size, strategy, policy);
        config.seed = seed;

        let mut solver = Solver::new(config);
        solver.fallbacks = fallbacks;
        solver
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn strategy(&self) -> InferenceStrategy {
        self.strategy
    }

    pub fn policy(&self) -> SafeCellPolicy {
        self.policy
    }

    /// Selector keys that were not recognised at construction.
    pub fn fallbacks(&self) -> &[UnknownKey] {
        &self.fallbacks
    }

    pub fn moves_made(&self) -> &HashSet<Point> {
        &self.moves_made
    }

    pub fn identified_mines(&self) -> &HashSet<Point> {
        &self.identified_mines
    }

    pub fn identified_safe_cells(&self) -> &HashSet<Point> {
        &self.identified_safe_cells
    }

    pub fn safe_cell_queue(&self) -> &VecDeque<Point> {
        &self.safe_cell_queue
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Records a cell as a mine and removes it from every statement.
    pub fn mark_cell_as_mine(&mut self, cell: Point) {
        self.identified_mines.insert(cell);
        self.knowledge_base.mark_mine(cell);
    }

    /// Records a cell as safe, queueing it for play the first time it is seen,
    /// and removes it from every statement.
    pub fn mark_cell_as_safe(&mut self, cell: Point) {
        if self.identified_safe_cells.insert(cell) {
            self.safe_cell_queue.push_back(cell);
        }
        self.knowledge_base.mark_safe(cell);
    }

    /// Ingests one observation: `cell` was revealed and has `adjacent_mines`
    /// mines among its neighbours. The count must match the real board.
    pub fn add_knowledge(&mut self, cell: Point, adjacent_mines: u8) {
        self.moves_made.insert(cell);
        self.mark_cell_as_safe(cell);

        let mut mine_count = i32::from(adjacent_mines);
        let mut neighbourhood = BTreeSet::new();
        for neighbour in neighbours(cell, self.grid_size) {
            if self.identified_safe_cells.contains(&neighbour) {
                continue;
            }
            if self.identified_mines.contains(&neighbour) {
                mine_count -= 1;
                continue;
            }
            neighbourhood.insert(neighbour);
        }

        if !neighbourhood.is_empty() {
            let statement = Constraint::new(neighbourhood, mine_count);
            log::debug!("{cell} reveals {adjacent_mines}: adding {statement}");
            self.knowledge_base.push(statement);
        }

        self.propagate();
    }

    /// Runs deduction until a pass changes nothing, and returns the number of
    /// passes. Each pass marks every cell some statement pins down, purges the
    /// store, and merges whatever the strategy derives that this call has not
    /// seen yet.
    pub fn propagate(&mut self) -> usize {
        let mut seen: HashSet<Constraint> = self.knowledge_base.iter().cloned().collect();
        let mut iterations = 0;
        let mut changed = true;

        while changed {
            iterations += 1;
            changed = false;

            let (mines, safes) = self.knowledge_base.certain_cells();
            if !mines.is_empty() || !safes.is_empty() {
                log::trace!("pass {iterations}: {} mines, {} safe cells", mines.len(), safes.len());
                changed = true;
            }
            for cell in safes {
                self.mark_cell_as_safe(cell);
            }
            for cell in mines {
                self.mark_cell_as_mine(cell);
            }

            let purge = self.knowledge_base.purge();
            self.metrics.record_knowledge_base_size(self.knowledge_base.len());
            self.metrics.record_duplicates(purge.duplicates);
            seen.extend(self.knowledge_base.iter().cloned());

            let inferred = self.strategy.infer(self.knowledge_base.as_slice(), &mut self.metrics);
            // The empty statement says nothing, and the next purge would drop it anyway.
            let fresh: Vec<Constraint> = inferred
                .into_iter()
                .filter(|statement| !statement.is_empty() && seen.insert(statement.clone()))
                .collect();

            if !fresh.is_empty() {
                log::trace!("pass {iterations}: {} new statements", fresh.len());
                self.knowledge_base.extend(fresh);
                changed = true;
            }
        }

        self.metrics.record_iterations(iterations);
        iterations
    }

    /// Pops a known-safe cell that has not been played yet.
    pub fn make_safe_move(&mut self) -> Option<Point> {
        while let Some(cell) = self.policy.select(&mut self.safe_cell_queue, &mut self.rng) {
            if !self.moves_made.contains(&cell) {
                return Some(cell);
            }
        }
        None
    }

    /// Picks uniformly among cells that are neither played nor known mines.
    pub fn make_random_move(&mut self) -> Option<Point> {
        let candidates: Vec<Point> = all_points(self.grid_size)
            .filter(|cell| !self.moves_made.contains(cell) && !self.identified_mines.contains(cell))
            .collect();
        candidates.choose(&mut self.rng).copied()
    }
}
