use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::prelude::IndexedRandom;

use crate::{Constraint, Point, UnknownKey, all_points, neighbours};

/// The visible state of a single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Cell {
    Hidden,
    Revealed(u8), // Number of adjacent mines.
    Flagged,
    /// A mine that was revealed. Ends the game.
    Detonated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// Where the first move is made. Mines are never placed on it when a layout is generated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
pub enum StartPosition {
    /// The top-left corner.
    First,
    Centre,
    /// The bottom-right corner.
    Last,
    #[default]
    Random,
}

impl StartPosition {
    pub fn key(self) -> &'static str {
        match self {
            StartPosition::First => "first",
            StartPosition::Centre => "centre",
            StartPosition::Last => "last",
            StartPosition::Random => "random",
        }
    }

    /// The fixed cell for this position, or `None` for [`StartPosition::Random`].
    pub fn fixed(self, size: usize) -> Option<Point> {
        match self {
            StartPosition::First => Some(Point::new(0, 0)),
            StartPosition::Centre => Some(Point::new(size / 2, size / 2)),
            StartPosition::Last => Some(Point::new(size - 1, size - 1)),
            StartPosition::Random => None,
        }
    }
}

impl FromStr for StartPosition {
    type Err = UnknownKey;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "first" => Ok(StartPosition::First),
            "centre" | "center" => Ok(StartPosition::Centre),
            "last" => Ok(StartPosition::Last),
            "random" => Ok(StartPosition::Random),
            _ => Err(UnknownKey {
                kind: "start position",
                name: name.to_string(),
                fallback: StartPosition::default().key(),
            }),
        }
    }
}

impl fmt::Display for StartPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A square Minesweeper board with its hidden mine layout.
///
/// The layout is fixed when the game is created, so the same board can be
/// replayed through [`Game::layout`] and [`Game::from_layout`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Game {
    /// Side length of the square board.
    pub size: usize,
    mines: Vec<Vec<bool>>,
    /// What a player can see.
    pub board: Vec<Vec<Cell>>,
    /// Number of `true` cells in the layout.
    pub total_mines: usize,
    /// The cell the first move is made on.
    pub start: Point,
    pub game_state: GameState,
}

impl Game {
    /// Generates a board with `total_mines` mines placed uniformly at random,
    /// never on the start cell.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        total_mines: usize,
        start: StartPosition,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        if size == 0 {
            anyhow::bail!("board size must be greater than zero");
        }
        let cells = size
            .checked_mul(size)
            .ok_or_else(|| anyhow::anyhow!("a {size}x{size} board is too large"))?;
        if total_mines >= cells {
            anyhow::bail!(
                "total mines ({total_mines}) must be less than the number of cells ({cells})"
            );
        }

        let start = match start.fixed(size) {
            Some(point) => point,
            None => Point::new(rng.random_range(0..size), rng.random_range(0..size)),
        };

        let candidates: Vec<Point> = all_points(size).filter(|&point| point != start).collect();
        let mut mines = vec![vec![false; size]; size];
        for point in candidates.choose_multiple(rng, total_mines) {
            mines[point.row][point.col] = true;
        }

        Ok(Game::with_mines(mines, total_mines, start))
    }

    /// Replays an existing layout (`true` marks a mine). A random start picks a
    /// cell without a mine; a fixed start is used as is.
    pub fn from_layout<R: Rng + ?Sized>(
        layout: Vec<Vec<bool>>,
        start: StartPosition,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        let size = layout.len();
        if size == 0 || layout.iter().any(|row| row.len() != size) {
            anyhow::bail!("layout must be a non-empty square");
        }

        let safe_cells: Vec<Point> = all_points(size)
            .filter(|point| !layout[point.row][point.col])
            .collect();
        if safe_cells.is_empty() {
            anyhow::bail!("layout has no safe cell");
        }
        let total_mines = size * size - safe_cells.len();

        let start = match start.fixed(size) {
            Some(point) => point,
            None => *safe_cells
                .choose(rng)
                .ok_or_else(|| anyhow::anyhow!("layout has no safe cell"))?,
        };

        Ok(Game::with_mines(layout, total_mines, start))
    }

    fn with_mines(mines: Vec<Vec<bool>>, total_mines: usize, start: Point) -> Self {
        let size = mines.len();
        Game {
            size,
            mines,
            board: vec![vec![Cell::Hidden; size]; size],
            total_mines,
            start,
            game_state: GameState::Playing,
        }
    }

    /// The mine layout, for replaying the same board.
    pub fn layout(&self) -> Vec<Vec<bool>> {
        self.mines.clone()
    }

    /// Decodes a game and rejects boards whose parts disagree on their shape.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        let game: Game = bcs::from_bytes(bts)?;
        game.check_shape()?;
        Ok(game)
    }

    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    fn check_shape(&self) -> anyhow::Result<()> {
        if self.size == 0
            || !is_square(&self.mines, self.size)
            || !is_square(&self.board, self.size)
        {
            anyhow::bail!("board is not {0}x{0}", self.size);
        }

        let mines = self.mines.iter().flatten().filter(|&&mine| mine).count();
        if mines != self.total_mines || mines >= self.size * self.size {
            anyhow::bail!(
                "total mines ({}) does not match a layout holding {mines}",
                self.total_mines
            );
        }
        if !self.on_board(self.start) {
            anyhow::bail!("start {} is off the board", self.start);
        }
        Ok(())
    }

    fn on_board(&self, at: Point) -> bool {
        at.row < self.size && at.col < self.size
    }

    /// `false` for cells off the board.
    pub fn contains_mine(&self, at: Point) -> bool {
        self.mines
            .get(at.row)
            .and_then(|row| row.get(at.col))
            .copied()
            .unwrap_or(false)
    }

    /// `None` for cells off the board.
    pub fn cell(&self, at: Point) -> Option<Cell> {
        self.board.get(at.row).and_then(|row| row.get(at.col)).copied()
    }

    pub fn count_adjacent_mines(&self, at: Point) -> u8 {
        neighbours(at, self.size)
            .filter(|&neighbour| self.contains_mine(neighbour))
            .count() as u8
    }

    /// Reveals a cell. Returns its adjacent mine count, or `None` when it held
    /// a mine, which loses the game. Revealing an already revealed cell returns
    /// its count again.
    pub fn reveal_cell(&mut self, at: Point) -> anyhow::Result<Option<u8>> {
        let Some(cell) = self.cell(at) else {
            anyhow::bail!("cell {at} is off the board");
        };
        if let Cell::Revealed(count) = cell {
            return Ok(Some(count));
        }
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        if self.contains_mine(at) {
            self.board[at.row][at.col] = Cell::Detonated;
            self.game_state = GameState::Lost;
            return Ok(None);
        }

        let count = self.count_adjacent_mines(at);
        self.board[at.row][at.col] = Cell::Revealed(count);

        if self.check_win_condition() {
            self.game_state = GameState::Won;
        }

        Ok(Some(count))
    }

    /// Flags a hidden cell as a mine. Flags are only markers; they do not
    /// affect the outcome. Cells off the board are ignored.
    pub fn flag(&mut self, at: Point) {
        if let Some(cell) = self.board.get_mut(at.row).and_then(|row| row.get_mut(at.col)) {
            if *cell == Cell::Hidden {
                *cell = Cell::Flagged;
            }
        }
    }

    pub fn revealed_count(&self) -> usize {
        self.board
            .iter()
            .flatten()
            .filter(|cell| matches!(cell, Cell::Revealed(_)))
            .count()
    }

    /// Won once every cell without a mine has been revealed.
    pub fn check_win_condition(&self) -> bool {
        self.revealed_count() == self.size * self.size - self.total_mines
    }

    /// Translates the visible board into observation statements.
    ///
    /// Each revealed number yields a statement over its neighbours that are not
    /// revealed, and each detonated mine yields a single-cell statement with a
    /// count of one. Flags are treated as hidden.
    pub fn build_constraints(&self) -> Vec<Constraint> {
        let mut constraints = Vec::new();

        for point in all_points(self.size) {
            match self.cell(point) {
                Some(Cell::Revealed(count)) => {
                    let unknown: Vec<Point> = neighbours(point, self.size)
                        .filter(|&neighbour| {
                            !matches!(self.cell(neighbour), Some(Cell::Revealed(_)))
                        })
                        .collect();
                    if !unknown.is_empty() {
                        constraints.push(Constraint::new(unknown, i32::from(count)));
                    }
                }
                Some(Cell::Detonated) => constraints.push(Constraint::new([point], 1)),
                Some(Cell::Hidden | Cell::Flagged) | None => {}
            }
        }

        constraints
    }
}

fn is_square<T>(grid: &[Vec<T>], size: usize) -> bool {
    grid.len() == size && grid.iter().all(|row| row.len() == size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn p(row: usize, col: usize) -> Point {
        Point::new(row, col)
    }

    // . * .
    // . . .
    // * . .
    fn layout() -> Vec<Vec<bool>> {
        vec![
            vec![false, true, false],
            vec![false, false, false],
            vec![true, false, false],
        ]
    }

    fn replay(start: StartPosition) -> Game {
        Game::from_layout(layout(), start, &mut StdRng::seed_from_u64(0)).unwrap()
    }

    #[test]
    fn test_game_initialization() {
        // Test that a new game has the requested dimensions and an untouched board.
        let mut rng = StdRng::seed_from_u64(1);
        let game = Game::new(5, 3, StartPosition::Centre, &mut rng).unwrap();
        assert_eq!(game.size, 5);
        assert_eq!(game.total_mines, 3);
        assert_eq!(game.start, p(2, 2));
        assert_eq!(game.game_state, GameState::Playing);
        assert!(game.board.iter().flatten().all(|&cell| cell == Cell::Hidden));

        let mines = game.layout().into_iter().flatten().filter(|&mine| mine).count();
        assert_eq!(mines, 3);
    }

    #[test]
    fn test_game_initialization_too_many_mines() {
        // Test that boards without a safe cell, or without any cell, are refused.
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Game::new(3, 9, StartPosition::First, &mut rng).is_err());
        assert!(Game::new(0, 0, StartPosition::First, &mut rng).is_err());
    }

    #[test]
    fn test_start_cell_never_holds_a_mine() {
        // Test that generation never puts a mine under the start cell.
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            // Every cell but one is a mine, so the start must be the safe one.
            let game = Game::new(3, 8, StartPosition::Random, &mut rng).unwrap();
            assert!(!game.contains_mine(game.start));
        }
    }

    #[test]
    fn test_start_positions() {
        assert_eq!(StartPosition::First.fixed(5), Some(p(0, 0)));
        assert_eq!(StartPosition::Centre.fixed(5), Some(p(2, 2)));
        assert_eq!(StartPosition::Last.fixed(5), Some(p(4, 4)));
        assert_eq!(StartPosition::Random.fixed(5), None);

        assert_eq!("Centre".parse(), Ok(StartPosition::Centre));
        assert_eq!("center".parse(), Ok(StartPosition::Centre));
        let unknown = "corner".parse::<StartPosition>().unwrap_err();
        assert_eq!(unknown.fallback, "random");
    }

    #[test]
    fn test_same_seed_same_layout() {
        let build = || {
            let mut rng = StdRng::seed_from_u64(99);
            Game::new(8, 10, StartPosition::Random, &mut rng).unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_replayed_random_start_is_safe() {
        let game = replay(StartPosition::Random);
        assert_eq!(game.total_mines, 2);
        assert!(!game.contains_mine(game.start));
        assert_eq!(game.layout(), layout());
    }

    #[test]
    fn test_count_adjacent_mines() {
        // Test that adjacent counts match the hand-drawn layout.
        let game = replay(StartPosition::First);
        assert_eq!(game.count_adjacent_mines(p(0, 0)), 1);
        assert_eq!(game.count_adjacent_mines(p(1, 0)), 2);
        assert_eq!(game.count_adjacent_mines(p(1, 1)), 2);
        assert_eq!(game.count_adjacent_mines(p(2, 2)), 0);
    }

    #[test]
    fn test_reveal_mine_loses() {
        // Test that revealing a mine detonates it and ends the game.
        let mut game = replay(StartPosition::First);
        assert_eq!(game.reveal_cell(p(0, 1)).unwrap(), None);
        assert_eq!(game.game_state, GameState::Lost);
        assert_eq!(game.cell(p(0, 1)), Some(Cell::Detonated));
        assert!(game.reveal_cell(p(2, 2)).is_err());
    }

    #[test]
    fn test_revealing_every_safe_cell_wins() {
        // Test that the game is won exactly when the last safe cell is revealed.
        let mut game = replay(StartPosition::First);
        let safe: Vec<Point> = all_points(3).filter(|&at| !game.contains_mine(at)).collect();

        for (i, &at) in safe.iter().enumerate() {
            assert_eq!(game.game_state, GameState::Playing);
            assert_eq!(game.reveal_cell(at).unwrap(), Some(game.count_adjacent_mines(at)));
            assert_eq!(game.revealed_count(), i + 1);
        }
        assert_eq!(game.game_state, GameState::Won);
        // Revealed cells answer again even after the game ends.
        assert_eq!(game.reveal_cell(p(2, 2)).unwrap(), Some(0));
    }

    #[test]
    fn test_reveal_off_the_board() {
        let mut game = replay(StartPosition::First);
        assert!(game.reveal_cell(p(3, 0)).is_err());
    }

    #[test]
    fn test_flag_only_marks_hidden_cells() {
        let mut game = replay(StartPosition::First);
        game.reveal_cell(p(0, 0)).unwrap();
        game.flag(p(0, 0));
        game.flag(p(0, 1));
        assert_eq!(game.cell(p(0, 0)), Some(Cell::Revealed(1)));
        assert_eq!(game.cell(p(0, 1)), Some(Cell::Flagged));
    }

    #[test]
    fn test_off_board_points_are_ignored() {
        // Test that lookups and flags outside the board neither panic nor
        // change anything.
        let mut game = replay(StartPosition::First);
        let before = game.clone();
        game.flag(p(3, 0));
        game.flag(p(0, 7));
        assert_eq!(game, before);
        assert_eq!(game.cell(p(3, 3)), None);
        assert!(!game.contains_mine(p(5, 1)));
    }

    #[test]
    fn test_constraint_building() {
        // Test that statements are built correctly from a partially revealed board.
        let mut game = replay(StartPosition::First);
        game.reveal_cell(p(1, 1)).unwrap();
        game.reveal_cell(p(0, 0)).unwrap();
        game.flag(p(2, 0));

        let constraints = game.build_constraints();
        assert_eq!(
            constraints,
            vec![
                Constraint::new([p(0, 1), p(1, 0)], 1),
                Constraint::new(
                    [p(0, 1), p(0, 2), p(1, 0), p(1, 2), p(2, 0), p(2, 1), p(2, 2)],
                    2
                ),
            ]
        );

        game.reveal_cell(p(0, 1)).unwrap();
        assert!(game.build_constraints().contains(&Constraint::new([p(0, 1)], 1)));
    }

    #[test]
    fn test_serialization() {
        // Test that a game survives a bcs round trip unchanged.
        let mut game = replay(StartPosition::Last);
        game.reveal_cell(p(2, 2)).unwrap();
        let bytes = game.serialize().unwrap();
        assert_eq!(Game::deserialize(&bytes).unwrap(), game);
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_boards() {
        // Test that a decoded game whose size, mine count or start disagree
        // with its grids is refused instead of panicking later.
        let game = replay(StartPosition::First);
        let rejects = |tampered: Game| Game::deserialize(&tampered.serialize().unwrap()).is_err();

        assert!(rejects(Game { size: 4, ..game.clone() }));
        assert!(rejects(Game { size: 0, ..game.clone() }));
        assert!(rejects(Game { total_mines: 3, ..game.clone() }));
        assert!(rejects(Game { start: p(0, 3), ..game.clone() }));

        let mut short_row = game.clone();
        short_row.board[1].pop();
        assert!(rejects(short_row));

        let mut all_mines = game.clone();
        all_mines.mines = vec![vec![true; 3]; 3];
        all_mines.total_mines = 9;
        assert!(rejects(all_mines));
    }
}
