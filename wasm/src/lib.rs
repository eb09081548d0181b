use minesweeper_ai as ms;
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[wasm_bindgen]
pub fn create_game(size: u8, mines: u16, start: &str, seed: Option<u64>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let start = ms::Resolved::<ms::StartPosition>::resolve(start).value;
    let game = ms::Game::new(size as usize, mines as usize, start, &mut rng(seed))
        .map_err(|e| e.to_string())?;
    game.serialize().map_err(|e| e.to_string())
}

/// Plays the game to the end. Returns the finished game followed by the
/// bcs-encoded report, as `[game_len: u32 LE][game][report]`.
#[wasm_bindgen]
pub fn autoplay(
    bts: Vec<u8>,
    strategy: &str,
    policy: &str,
    seed: Option<u64>,
) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    let mut solver = ms::Solver::from_keys(game.size, strategy, policy, seed);
    let report = ms::runner::play(&mut game, &mut solver).map_err(|e| e.to_string())?;

    let game = game.serialize().map_err(|e| e.to_string())?;
    let report = bcs::to_bytes(&report).map_err(|e| e.to_string())?;

    let mut xs = (game.len() as u32).to_le_bytes().to_vec();
    xs.extend(game);
    xs.extend(report);
    Ok(xs)
}

#[wasm_bindgen]
pub fn validate(bts: Vec<u8>) -> Result<bool, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(game.check_win_condition())
}

/// Row-major cell states: the adjacent count when revealed, -1 hidden,
/// -2 flagged, -3 detonated.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(game
        .board
        .into_iter()
        .flat_map(|row| {
            row.into_iter().map(|cell| match cell {
                ms::Cell::Hidden => -1,
                ms::Cell::Flagged => -2,
                ms::Cell::Detonated => -3,
                ms::Cell::Revealed(n) => n as i8,
            })
        })
        .collect())
}
