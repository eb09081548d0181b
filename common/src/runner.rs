//! Plays whole games with a [`Solver`] and reports how they went.

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::oracle::{self, DeducedState};
use crate::{
    Cell, Constraint, Game, GameState, InferenceStrategy, Metrics, Point, SafeCellPolicy, Solver,
    SolverConfig, StartPosition,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Outcome {
    Won,
    Lost,
    /// Neither a safe nor a random move was left while the game was still running.
    Stalled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self {
            Outcome::Won => "won",
            Outcome::Lost => "lost",
            Outcome::Stalled => "stalled",
        };
        f.write_str(outcome)
    }
}

/// The result of one game.
///
/// Metrics are kept as raw counters so the report stays free of floats and can
/// be encoded with `bcs`; call [`Metrics::summary`] for the derived figures.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameReport {
    /// The inference strategy the solver ran.
    pub strategy: InferenceStrategy,
    /// How the solver picked among known-safe cells.
    pub policy: SafeCellPolicy,
    pub outcome: Outcome,
    /// Every reveal, the opening move included.
    pub moves: usize,
    /// Reveals of cells the solver had deduced to be safe.
    pub safe_moves: usize,
    /// Guesses made because no safe cell was known.
    pub random_moves: usize,
    /// Size of the solver's mine set when the game ended.
    pub identified_mines: usize,
    /// Size of the solver's safe set when the game ended, played cells included.
    pub identified_safe_cells: usize,
    /// The solver's counters over the whole game.
    pub metrics: Metrics,
}

/// Plays `game` to the end: the start cell first, then known-safe cells, and a
/// random guess whenever deduction has nothing to offer.
pub fn play(game: &mut Game, solver: &mut Solver) -> anyhow::Result<GameReport> {
    if game.size != solver.grid_size() {
        anyhow::bail!(
            "solver expects a {0}x{0} board, game is {1}x{1}",
            solver.grid_size(),
            game.size
        );
    }

    let (mut moves, mut safe_moves, mut random_moves) = (0, 0, 0);
    let mut next = Some(game.start);

    while let Some(at) = next {
        moves += 1;
        match game.reveal_cell(at)? {
            Some(count) => solver.add_knowledge(at, count),
            None => {
                log::debug!("move {moves}: {at} was a mine");
                solver.mark_cell_as_mine(at);
                break;
            }
        }
        for &mine in solver.identified_mines() {
            game.flag(mine);
        }
        if game.game_state != GameState::Playing {
            break;
        }

        next = match solver.make_safe_move() {
            Some(cell) => {
                safe_moves += 1;
                Some(cell)
            }
            None => {
                let guess = solver.make_random_move();
                if let Some(cell) = guess {
                    log::debug!("move {}: no safe cell known, guessing {cell}", moves + 1);
                    random_moves += 1;
                }
                guess
            }
        };
    }

    let outcome = match game.game_state {
        GameState::Won => Outcome::Won,
        GameState::Lost => Outcome::Lost,
        GameState::Playing => Outcome::Stalled,
    };
    log::info!(
        "{} / {}: {outcome} after {moves} moves ({random_moves} guesses)",
        solver.strategy(),
        solver.policy()
    );

    Ok(GameReport {
        strategy: solver.strategy(),
        policy: solver.policy(),
        outcome,
        moves,
        safe_moves,
        random_moves,
        identified_mines: solver.identified_mines().len(),
        identified_safe_cells: solver.identified_safe_cells().len(),
        metrics: solver.metrics().clone(),
    })
}

/// Totals for one strategy over a series of boards.
#[derive(Debug, Clone, PartialEq)]
pub struct Benchmark {
    pub strategy: InferenceStrategy,
    /// Games played.
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    /// Games that ended with no move left to make.
    pub stalls: usize,
    /// Reveals summed over every game.
    pub moves: usize,
    /// Guesses summed over every game.
    pub random_moves: usize,
    /// Counters of every game merged together.
    pub metrics: Metrics,
}

impl Benchmark {
    fn new(strategy: InferenceStrategy) -> Self {
        Benchmark {
            strategy,
            games: 0,
            wins: 0,
            losses: 0,
            stalls: 0,
            moves: 0,
            random_moves: 0,
            metrics: Metrics::new(),
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }

    fn add(&mut self, report: &GameReport) {
        self.games += 1;
        match report.outcome {
            Outcome::Won => self.wins += 1,
            Outcome::Lost => self.losses += 1,
            Outcome::Stalled => self.stalls += 1,
        }
        self.moves += report.moves;
        self.random_moves += report.random_moves;
        self.metrics.merge(&report.metrics);
    }
}

/// Plays the same `games` seeded boards under every strategy.
///
/// Only the mine layouts are generated up front. Each strategy replays layout
/// `i` through [`Game::from_layout`] with its own generator seeded from `seed`
/// and `i`, which also seeds the solver, so every strategy sees identical
/// layouts, start cells and guesses for as long as their play agrees.
pub fn compare_strategies(
    size: usize,
    total_mines: usize,
    games: usize,
    start: StartPosition,
    policy: SafeCellPolicy,
    seed: u64,
) -> anyhow::Result<Vec<Benchmark>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let layouts = (0..games)
        .map(|_| Game::new(size, total_mines, start, &mut rng).map(|game| game.layout()))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut benchmarks = Vec::new();
    for strategy in InferenceStrategy::ALL {
        let mut benchmark = Benchmark::new(strategy);

        for (i, layout) in layouts.iter().enumerate() {
            let board_seed = seed.wrapping_add(i as u64);
            let mut game = Game::from_layout(
                layout.clone(),
                start,
                &mut StdRng::seed_from_u64(board_seed),
            )?;
            let config = SolverConfig::new(size)
                .with_strategy(strategy)
                .with_policy(policy)
                .with_seed(board_seed);
            let mut solver = Solver::new(config);

            let report = play(&mut game, &mut solver)?;
            benchmark.add(&report);
        }

        log::info!(
            "{strategy}: {}/{} won, {} guesses",
            benchmark.wins,
            benchmark.games,
            benchmark.random_moves
        );
        benchmarks.push(benchmark);
    }

    Ok(benchmarks)
}

/// Everything the solver believes that the revealed board does not support.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Audit {
    /// Cells marked as mines that the board does not force to be mines, sorted.
    pub unsound_mines: Vec<Point>,
    /// Unrevealed cells marked safe that the board does not force to be safe, sorted.
    pub unsound_safe_cells: Vec<Point>,
    /// Live statements that do not follow from the board.
    pub unsound_statements: Vec<Constraint>,
}

impl Audit {
    pub fn is_sound(&self) -> bool {
        self.unsound_mines.is_empty()
            && self.unsound_safe_cells.is_empty()
            && self.unsound_statements.is_empty()
    }
}

/// Checks every identified cell and live statement of `solver` against the
/// observations visible on `game`.
pub fn audit(game: &Game, solver: &Solver) -> anyhow::Result<Audit> {
    let evidence = game.build_constraints();
    let deductions = oracle::deduce(&evidence)?;
    let forced = |cell: &Point, state: DeducedState| deductions.get(cell) == Some(&state);

    let mut audit = Audit::default();

    for cell in solver.identified_mines() {
        if !forced(cell, DeducedState::ForcedMine) {
            audit.unsound_mines.push(*cell);
        }
    }
    for cell in solver.identified_safe_cells() {
        let revealed = matches!(game.cell(*cell), Some(Cell::Revealed(_)));
        if !revealed && !forced(cell, DeducedState::ForcedSafe) {
            audit.unsound_safe_cells.push(*cell);
        }
    }
    for statement in solver.knowledge_base() {
        if !oracle::entails(&evidence, statement)? {
            audit.unsound_statements.push(statement.clone());
        }
    }

    audit.unsound_mines.sort();
    audit.unsound_safe_cells.sort();
    Ok(audit)
}
