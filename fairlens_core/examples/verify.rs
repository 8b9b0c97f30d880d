use fairlens_core::{format_multiplier, render_grid, CrashChain, DiceRoll, MinesRound};

fn main() -> fairlens_core::Result<()> {
    // Example end-to-end verification of each game
    let game_hash = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    let chain = CrashChain::new("example-salt");
    for game in chain.walk(game_hash, 5) {
        let game = game?;
        println!("crash hash={} point={}", game.hash, format_multiplier(game.multiplier));
    }

    let roll = DiceRoll::verify(game_hash, "cafe", "01")?;
    println!("dice roll={}", roll.display());

    let grid = MinesRound::new(game_hash, "example-client-seed", "1", 3).verify()?;
    println!("mines at {:?}\n{}", grid.mine_positions(), render_grid(&grid, &[]));
    Ok(())
}
