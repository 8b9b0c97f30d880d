use fairlens_core::{ClientSecretEncoding, CrashGame, LinkEncoding, MedianClass, VerifyError};
use serde::{Deserialize, Serialize};

fn default_games() -> usize {
    1
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CrashRequest {
    pub game_hash: String,
    pub salt: String,
    #[serde(default = "default_games")]
    pub num_games: usize,
    #[serde(default)]
    pub link_encoding: LinkEncoding,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CrashRow {
    pub hash: String,
    /// `None` when the crash point is unbounded; `display` then reads `inf`.
    pub multiplier: Option<f64>,
    pub display: String,
    pub class: MedianClass,
}

impl From<CrashGame> for CrashRow {
    fn from(game: CrashGame) -> Self {
        Self {
            display: fairlens_core::format_multiplier(game.multiplier),
            class: MedianClass::of(game.multiplier),
            hash: game.hash,
            multiplier: game.multiplier.is_finite().then_some(game.multiplier),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CrashResponse {
    pub games: Vec<CrashRow>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiceRequest {
    pub server_hash: String,
    pub client_secret: String,
    pub nonce: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiceResponse {
    pub roll: f64,
    pub display: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MinesRequest {
    pub server_secret: String,
    pub client_secret: String,
    pub nonce: String,
    pub mine_count: usize,
    #[serde(default)]
    pub client_secret_encoding: ClientSecretEncoding,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MinesResponse {
    /// Row-major mine flags.
    pub grid: Vec<Vec<bool>>,
    pub mine_positions: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("internal server error")]
    Internal,
}
