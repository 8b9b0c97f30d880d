use serde::{Deserialize, Serialize};

use crate::codec::{decode_hex, uint64_from_string, ClientSecretEncoding};
use crate::digest::CryptoProvider;
use crate::error::{Result, VerifyError};
use crate::stream::{DeterministicStream, SeedMode};

/// Cells on the standard 5x5 mines board.
pub const MINES_GRID_SIZE: usize = 25;

/// Dice roll in `[0, 100)`, shown with two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiceRoll(pub f64);

impl DiceRoll {
    pub fn verify(server_hash: &str, client_secret: &str, nonce: &str) -> Result<Self> {
        Self::verify_with(&DeterministicStream::new(), server_hash, client_secret, nonce)
    }

    /// All three inputs are hex; the stream is seeded from the hash of each.
    pub fn verify_with<P: CryptoProvider>(
        stream: &DeterministicStream<P>,
        server_hash: &str,
        client_secret: &str,
        nonce: &str,
    ) -> Result<Self> {
        let inputs = [
            decode_hex(server_hash)?,
            decode_hex(client_secret)?,
            decode_hex(nonce)?,
        ];
        let unit = stream.uniform01(&inputs, 1, SeedMode::ConcatOfHashes)?;
        Ok(Self(unit * 100.0))
    }

    pub fn display(&self) -> String {
        format!("{:.2}", self.0)
    }
}

/// Inputs of one mines round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinesRound {
    pub server_secret: String,
    pub client_secret: String,
    pub nonce: String,
    pub mine_count: usize,
    #[serde(default)]
    pub client_secret_encoding: ClientSecretEncoding,
}

impl MinesRound {
    pub fn new(
        server_secret: impl Into<String>,
        client_secret: impl Into<String>,
        nonce: impl Into<String>,
        mine_count: usize,
    ) -> Self {
        Self {
            server_secret: server_secret.into(),
            client_secret: client_secret.into(),
            nonce: nonce.into(),
            mine_count,
            client_secret_encoding: ClientSecretEncoding::default(),
        }
    }

    pub fn client_secret_encoding(mut self, encoding: ClientSecretEncoding) -> Self {
        self.client_secret_encoding = encoding;
        self
    }

    /// `[server_secret, client_secret, nonce]` as seed bytes: hex, per
    /// [`ClientSecretEncoding`], and a little-endian u64.
    pub fn seed_inputs(&self) -> Result<[Vec<u8>; 3]> {
        Ok([
            decode_hex(&self.server_secret)?,
            self.client_secret_encoding.encode(&self.client_secret)?,
            uint64_from_string(&self.nonce)?.to_vec(),
        ])
    }

    pub fn verify(&self) -> Result<MineGrid> {
        self.verify_with(&DeterministicStream::new())
    }

    pub fn verify_with<P: CryptoProvider>(&self, stream: &DeterministicStream<P>) -> Result<MineGrid> {
        let inputs = self.seed_inputs()?;
        let cells = stream.mine_grid(MINES_GRID_SIZE, self.mine_count, &inputs)?;
        MineGrid::new(cells)
    }
}

/// Square board of mine flags, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineGrid {
    cells: Vec<bool>,
    side: usize,
}

impl MineGrid {
    pub fn new(cells: Vec<bool>) -> Result<Self> {
        let side = (cells.len() as f64).sqrt() as usize;
        if side * side != cells.len() {
            return Err(VerifyError::InvalidParameter(format!(
                "grid of {} cells is not square",
                cells.len()
            )));
        }
        Ok(Self { cells, side })
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn mine_count(&self) -> usize {
        self.cells.iter().filter(|&&m| m).count()
    }

    pub fn mine_positions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        // chunks(0) panics; an empty grid has no rows
        self.cells.chunks(self.side.max(1))
    }
}

/// Text board for terminals: `*` mine, `.` safe. Opened cells are bracketed.
pub fn render_grid(grid: &MineGrid, opened: &[usize]) -> String {
    let mut out = String::new();
    for (r, row) in grid.rows().enumerate() {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(c, &mine)| {
                let symbol = if mine { '*' } else { '.' };
                if opened.contains(&(r * grid.side() + c)) {
                    format!("[{symbol}]")
                } else {
                    format!(" {symbol} ")
                }
            })
            .collect();
        out.push_str(&line.join(""));
        out.push('\n');
    }
    out
}
