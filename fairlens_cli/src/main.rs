use clap::{Parser, Subcommand, ValueEnum};
use fairlens_core::{
    format_multiplier, render_grid, ClientSecretEncoding, CrashChain, CrashGame, DiceRoll,
    LinkEncoding, MedianClass, MinesRound,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Walks at or above this many games get a warning; they take a while.
const NUM_GAMES_THRESHOLD: usize = 10_000;

#[derive(Parser)]
#[command(name = "fairlens", about = "Verify provably fair crash, dice and mines outcomes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify crash points, walking back from a revealed game hash
    Crash {
        game_hash: String,
        #[arg(long, env = "FAIRLENS_SALT")]
        salt: String,
        #[arg(short = 'n', long, default_value_t = 10)]
        num_games: usize,
        #[arg(long, value_enum, default_value_t = Link::Bytes)]
        link: Link,
    },
    /// Verify a dice roll
    Dice {
        #[arg(long)]
        server_hash: String,
        #[arg(long, env = "FAIRLENS_CLIENT_SECRET")]
        client_secret: String,
        #[arg(long)]
        nonce: String,
    },
    /// Verify a mines board
    Mines {
        #[arg(long)]
        server_secret: String,
        #[arg(long, env = "FAIRLENS_CLIENT_SECRET")]
        client_secret: String,
        /// Decimal round nonce
        #[arg(long)]
        nonce: String,
        #[arg(long, default_value_t = 3)]
        mine_count: usize,
        #[arg(long, value_enum, default_value_t = SecretEncoding::Utf8)]
        client_secret_encoding: SecretEncoding,
        /// Comma-separated cell indices the player opened
        #[arg(long, value_delimiter = ',')]
        opened: Vec<usize>,
    },
    /// Export a crash chain walk to CSV
    ExportCrash {
        game_hash: String,
        path: String,
        #[arg(long, env = "FAIRLENS_SALT")]
        salt: String,
        #[arg(short = 'n', long, default_value_t = 1000)]
        num_games: usize,
        #[arg(long, value_enum, default_value_t = Link::Bytes)]
        link: Link,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Link {
    Bytes,
    Text,
}

impl From<Link> for LinkEncoding {
    fn from(link: Link) -> Self {
        match link {
            Link::Bytes => LinkEncoding::Bytes,
            Link::Text => LinkEncoding::Text,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SecretEncoding {
    Utf8,
    Hex,
    NumericCoerced,
}

impl From<SecretEncoding> for ClientSecretEncoding {
    fn from(encoding: SecretEncoding) -> Self {
        match encoding {
            SecretEncoding::Utf8 => ClientSecretEncoding::Utf8,
            SecretEncoding::Hex => ClientSecretEncoding::Hex,
            SecretEncoding::NumericCoerced => ClientSecretEncoding::NumericCoerced,
        }
    }
}

fn crash_line(game: &CrashGame) -> String {
    let marker = match MedianClass::of(game.multiplier) {
        MedianClass::Under => "-",
        MedianClass::At => "=",
        MedianClass::Over => "+",
    };
    format!(
        "{} {:>10} {}",
        game.hash,
        format_multiplier(game.multiplier),
        marker
    )
}

fn crash_chain(salt: String, num_games: usize, link: Link) -> CrashChain {
    if num_games >= NUM_GAMES_THRESHOLD {
        warn!(num_games, "large chain walk requested, this may take a while");
    }
    CrashChain::new(salt).link_encoding(link.into())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Crash {
            game_hash,
            salt,
            num_games,
            link,
        } => {
            let chain = crash_chain(salt, num_games, link);
            for game in chain.walk(&game_hash, num_games) {
                let game = game?;
                debug!(hash = %game.hash, multiplier = game.multiplier, "verified game");
                println!("{}", crash_line(&game));
            }
        }
        Commands::Dice {
            server_hash,
            client_secret,
            nonce,
        } => {
            let roll = DiceRoll::verify(&server_hash, &client_secret, &nonce)?;
            println!("{}", roll.display());
        }
        Commands::Mines {
            server_secret,
            client_secret,
            nonce,
            mine_count,
            client_secret_encoding,
            opened,
        } => {
            let grid = MinesRound::new(server_secret, client_secret, nonce, mine_count)
                .client_secret_encoding(client_secret_encoding.into())
                .verify()?;
            print!("{}", render_grid(&grid, &opened));
            println!("{} mines: {:?}", grid.mine_count(), grid.mine_positions());
        }
        Commands::ExportCrash {
            game_hash,
            path,
            salt,
            num_games,
            link,
        } => {
            let mut wtr = csv::Writer::from_path(&path)?;
            wtr.write_record(["hash", "multiplier"])?;
            let mut total = 0usize;
            let chain = crash_chain(salt, num_games, link);
            for game in chain.walk(&game_hash, num_games) {
                let game = game?;
                let multiplier = format_multiplier(game.multiplier);
                wtr.write_record([game.hash.as_str(), multiplier.as_str()])?;
                total += 1;
            }
            wtr.flush()?;
            println!("Exported {} games to {}", total, path);
        }
    }

    Ok(())
}
