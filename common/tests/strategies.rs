use minesweeper_ai::oracle;
use minesweeper_ai::runner;
use minesweeper_ai::{
    Constraint, Game, GameState, InferenceStrategy, KnowledgeBase, Metrics, Point, Solver,
    SolverConfig, StartPosition,
};
use rand::SeedableRng;
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;

fn p(row: usize, col: usize) -> Point {
    Point::new(row, col)
}

/// Reveals random safe cells of a seeded board, stopping while the board is
/// still being played.
fn partially_revealed(seed: u64, size: usize, mines: usize, reveals: usize) -> Game {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::new(size, mines, StartPosition::Random, &mut rng).unwrap();
    game.reveal_cell(game.start).unwrap();

    for _ in 0..reveals {
        let hidden: Vec<Point> = minesweeper_ai::all_points(size)
            .filter(|&at| !game.contains_mine(at))
            .filter(|&at| game.cell(at) == Some(minesweeper_ai::Cell::Hidden))
            .collect();
        let Some(&at) = hidden.choose(&mut rng) else {
            break;
        };
        game.reveal_cell(at).unwrap();
        if game.game_state != GameState::Playing {
            break;
        }
    }
    game
}

#[test]
fn test_nested_pair_example() {
    let store = [
        Constraint::new([p(0, 0), p(0, 1)], 1),
        Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 2),
    ];
    let mut metrics = Metrics::new();
    let inferred = InferenceStrategy::Exhaustive.infer(&store, &mut metrics);
    assert!(inferred.contains(&Constraint::new([p(0, 2)], 1)));
    assert_eq!(metrics.searches(), 1);
}

#[test]
fn test_every_strategy_derives_only_entailed_statements() {
    for seed in 0..6 {
        let game = partially_revealed(seed, 6, 6, 6);
        let evidence = game.build_constraints();
        assert!(oracle::is_consistent(&evidence).unwrap());

        for strategy in InferenceStrategy::ALL {
            let mut metrics = Metrics::new();
            for statement in strategy.infer(&evidence, &mut metrics) {
                if statement.is_empty() {
                    continue;
                }
                assert!(
                    oracle::entails(&evidence, &statement).unwrap(),
                    "seed {seed}, {strategy}: {statement} does not follow"
                );
            }
        }
    }
}

#[test]
fn test_exhaustive_finds_everything_the_others_find() {
    for seed in 0..6 {
        let game = partially_revealed(seed, 6, 6, 6);
        let evidence = game.build_constraints();

        let mut metrics = Metrics::new();
        let exhaustive = InferenceStrategy::Exhaustive.infer(&evidence, &mut metrics);
        let single_pass = [
            InferenceStrategy::GreedyByMineCount,
            InferenceStrategy::SortedMemoized,
        ];
        for strategy in single_pass {
            for statement in strategy.infer(&evidence, &mut metrics) {
                assert!(
                    exhaustive.contains(&statement),
                    "seed {seed}, {strategy}: {statement}"
                );
            }
        }
    }
}

#[test]
fn test_solvers_fed_a_real_game_stay_sound() {
    for strategy in InferenceStrategy::ALL {
        for seed in 0..4 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut game = Game::new(8, 10, StartPosition::Centre, &mut rng).unwrap();
            let mut solver = Solver::new(
                SolverConfig::new(8)
                    .with_strategy(strategy)
                    .with_seed(seed),
            );
            let report = runner::play(&mut game, &mut solver).unwrap();

            let audit = runner::audit(&game, &solver).unwrap();
            assert!(audit.is_sound(), "seed {seed}, {strategy}: {audit:?}");
            assert_eq!(report.identified_mines, solver.identified_mines().len());
        }
    }
}

#[test]
fn test_duplicate_statements_collapse_in_the_store() {
    let statement = Constraint::new([p(2, 2), p(2, 3)], 1);
    let mut store: KnowledgeBase = [statement.clone(), statement.clone()].into_iter().collect();
    let purge = store.purge();
    assert_eq!(purge.duplicates, 1);
    assert_eq!(store.as_slice(), &[statement]);
}
