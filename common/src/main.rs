use std::time::Instant;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;

use minesweeper_ai::runner::{self, Benchmark};
use minesweeper_ai::{Cell, Game, Resolved, SafeCellPolicy, Solver, StartPosition};

/// Plays Minesweeper with a subset-inference solver.
#[derive(Parser)]
struct Cli {
    /// Side length of the square board.
    #[arg(long, default_value_t = 16)]
    size: usize,

    /// Share of cells holding a mine, in percent.
    #[arg(long, default_value_t = 15)]
    mine_percentage: usize,

    /// Inference strategy: brute_force, divide_and_conquer, dynamic_programming,
    /// greedy_algorithm_size, greedy_algorithm_minecount, bfs or dfs.
    #[arg(long, default_value = "brute_force")]
    strategy: String,

    /// Safe cell strategy: "First In, First Out", "Last In, First Out",
    /// "Sorted by position" or "Random".
    #[arg(long, default_value = "First In, First Out")]
    policy: String,

    /// Opening cell: first, centre, last or random.
    #[arg(long, default_value = "centre")]
    start: String,

    /// Seed for board generation and every random choice.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of games to play.
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Play the same boards under every strategy and print a comparison.
    #[arg(long)]
    compare: bool,

    /// Check the solver's conclusions against a SAT oracle after each game.
    #[arg(long)]
    verify: bool,

    /// Print the final board of each game.
    #[arg(long)]
    show_board: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let total_mines = mine_count(cli.size, cli.mine_percentage)?;

    let start = Resolved::<StartPosition>::resolve(&cli.start).value;

    if cli.compare {
        let policy = Resolved::<SafeCellPolicy>::resolve(&cli.policy).value;
        let seed = cli.seed.unwrap_or_else(rand::random);

        let timer = Instant::now();
        let benchmarks =
            runner::compare_strategies(cli.size, total_mines, cli.games, start, policy, seed)?;
        print_comparison(&benchmarks);
        println!("seed {seed}, {:.2?} elapsed", timer.elapsed());
        return Ok(());
    }

    for i in 0..cli.games {
        let seed = cli.seed.map(|seed| seed.wrapping_add(i as u64));
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut game = Game::new(cli.size, total_mines, start, &mut rng)?;
        let mut solver = Solver::from_keys(cli.size, &cli.strategy, &cli.policy, seed);

        let timer = Instant::now();
        let report = runner::play(&mut game, &mut solver)?;
        let elapsed = timer.elapsed();

        println!("\n--- Game {} ---", i + 1);
        if cli.show_board {
            print_board(&game);
        }
        println!(
            "{} / {}: {} after {} moves ({} safe, {} guesses) in {elapsed:.2?}",
            report.strategy,
            report.policy,
            report.outcome,
            report.moves,
            report.safe_moves,
            report.random_moves
        );
        println!(
            "identified {} mines and {} safe cells",
            report.identified_mines, report.identified_safe_cells
        );
        println!("{}", report.metrics.summary());

        if cli.verify {
            let audit = runner::audit(&game, &solver)?;
            if !audit.is_sound() {
                anyhow::bail!("solver drew unsupported conclusions: {audit:?}");
            }
            println!("verified against the board");
        }
    }

    Ok(())
}

/// Mines for a `size` x `size` board holding `percentage` percent of mines, rounded down.
fn mine_count(size: usize, percentage: usize) -> anyhow::Result<usize> {
    if size == 0 || percentage > 100 {
        anyhow::bail!(
            "board size must be greater than zero and percentage of mines between 0 and 100"
        );
    }
    let total_mines = size
        .checked_mul(size)
        .and_then(|cells| cells.checked_mul(percentage))
        .ok_or_else(|| anyhow::anyhow!("a {size}x{size} board is too large"))?
        / 100;
    if total_mines == 0 {
        anyhow::bail!("the calculated number of mines must be greater than zero");
    }
    Ok(total_mines)
}

fn print_comparison(benchmarks: &[Benchmark]) {
    println!(
        "{:<28}{:>8}{:>10}{:>12}{:>14}{:>10}{:>12}",
        "strategy", "won", "guesses", "avg kb", "avg compares", "ratio", "avg passes"
    );
    for benchmark in benchmarks {
        let summary = benchmark.metrics.summary();
        println!(
            "{:<28}{:>8}{:>10}{:>12.2}{:>14.2}{:>10.4}{:>12.2}",
            benchmark.strategy.key(),
            format!("{}/{}", benchmark.wins, benchmark.games),
            benchmark.random_moves,
            summary.knowledge_base_avg_size,
            summary.subset_comparisons_avg,
            summary.inference_to_comparison_ratio,
            summary.iterations_avg
        );
    }
}

fn print_board(game: &Game) {
    print!("   ");
    for col in 0..game.size {
        print!("{:^3}", col % 100);
    }
    println!("\n  +{}", "---".repeat(game.size));

    for (row, cells) in game.board.iter().enumerate() {
        print!("{:^2}|", row % 100);
        for cell in cells {
            let display = match cell {
                Cell::Hidden => " ■ ".to_string(),
                Cell::Flagged => " F ".to_string(),
                Cell::Detonated => " * ".to_string(),
                Cell::Revealed(n) => format!(" {n} "),
            };
            print!("{display}");
        }
        println!();
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mine_count() {
        assert_eq!(mine_count(16, 15).unwrap(), 38);
        assert_eq!(mine_count(10, 100).unwrap(), 100);
        assert!(mine_count(0, 15).is_err());
        assert!(mine_count(16, 101).is_err());
        assert!(mine_count(3, 5).is_err());
    }

    #[test]
    fn test_mine_count_overflow_is_an_error() {
        // Test that a board whose cell count overflows is refused rather than
        // wrapping or panicking.
        assert!(mine_count(usize::MAX, 15).is_err());
        assert!(mine_count(1 << (usize::BITS / 2), 100).is_err());
    }
}
