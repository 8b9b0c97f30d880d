//! Seeded byte stream shared by the dice and mines verifiers.
//!
//! Inputs are folded into a 48-byte SHA-384 seed; the first 32 bytes key
//! AES-256 and the last 16 are the initial CTR counter. The resulting
//! keystream is the game's randomness.

use serde::{Deserialize, Serialize};

use crate::codec::concat;
use crate::digest::{
    aes_ctr_keystream, CryptoProvider, CtrCounter, RustCryptoProvider, AES_BLOCK_LEN, SHA384_LEN,
};
use crate::error::{Result, VerifyError};

/// How the input buffers are combined into the seed.
///
/// Each game fixes one of these; they produce unrelated streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeedMode {
    /// `sha384(a || b || ...)`
    #[default]
    Concat,
    /// `sha384(sha384(a) || sha384(b) || ...)`
    ConcatOfHashes,
}

#[derive(Debug, Clone, Default)]
pub struct DeterministicStream<P = RustCryptoProvider> {
    provider: P,
}

impl DeterministicStream {
    pub fn new() -> Self {
        Self::with_provider(RustCryptoProvider)
    }
}

impl<P: CryptoProvider> DeterministicStream<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    pub fn seed<B: AsRef<[u8]>>(&self, inputs: &[B], mode: SeedMode) -> Result<[u8; SHA384_LEN]> {
        match mode {
            SeedMode::Concat => self.provider.sha384(&concat(inputs)),
            SeedMode::ConcatOfHashes => {
                let hashed = inputs
                    .iter()
                    .map(|input| self.provider.sha384(input.as_ref()))
                    .collect::<Result<Vec<_>>>()?;
                self.provider.sha384(&concat(&hashed))
            }
        }
    }

    /// `block_count * 16` keystream bytes from a 48-byte seed.
    pub fn expand(&self, seed: &[u8], block_count: usize) -> Result<Vec<u8>> {
        if seed.len() < SHA384_LEN {
            return Err(VerifyError::InvalidLength {
                expected: SHA384_LEN,
                actual: seed.len(),
            });
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&seed[..32]);
        let mut counter = [0u8; AES_BLOCK_LEN];
        counter.copy_from_slice(&seed[32..SHA384_LEN]);
        aes_ctr_keystream(&self.provider, &key, CtrCounter::new(counter), block_count)
    }

    pub fn bytes<B: AsRef<[u8]>>(
        &self,
        inputs: &[B],
        block_count: usize,
        mode: SeedMode,
    ) -> Result<Vec<u8>> {
        let seed = self.seed(inputs, mode)?;
        self.expand(&seed, block_count)
    }

    /// XOR-fold of the keystream's little-endian 32-bit words, scaled as
    /// `0.5 + acc / 0xFFFFFFFF`.
    ///
    /// The accumulator is a signed 32-bit integer, so results lie in
    /// roughly `[0, 1)`.
    pub fn uniform01<B: AsRef<[u8]>>(
        &self,
        inputs: &[B],
        block_count: usize,
        mode: SeedMode,
    ) -> Result<f64> {
        let bytes = self.bytes(inputs, block_count, mode)?;
        let acc = bytes
            .chunks_exact(4)
            .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
            .fold(0u32, |acc, word| acc ^ word);
        Ok(0.5 + f64::from(acc as i32) / f64::from(u32::MAX))
    }

    /// In-place Fisher-Yates shuffle driven by the `Concat` stream of
    /// `inputs`.
    pub fn shuffle<B: AsRef<[u8]>, T>(&self, inputs: &[B], items: &mut [T]) -> Result<()> {
        let block_count = (items.len() * 4).div_ceil(AES_BLOCK_LEN);
        let bytes = self.bytes(inputs, block_count, SeedMode::Concat)?;
        let mut draws = UnitDraws::new(&bytes);
        for i in (1..items.len()).rev() {
            let j = (draws.next_unit()? * (i + 1) as f64).floor() as usize;
            items.swap(i, j);
        }
        Ok(())
    }

    /// Mine layout for a `grid_size` board: the first `mine_count` cells of
    /// the shuffled positions are mines.
    pub fn mine_grid<B: AsRef<[u8]>>(
        &self,
        grid_size: usize,
        mine_count: usize,
        inputs: &[B],
    ) -> Result<Vec<bool>> {
        if mine_count > grid_size {
            return Err(VerifyError::InvalidParameter(format!(
                "mine count {mine_count} exceeds grid size {grid_size}"
            )));
        }
        let mut positions: Vec<usize> = (0..grid_size).collect();
        self.shuffle(inputs, &mut positions)?;

        let mut grid = vec![false; grid_size];
        for &cell in &positions[..mine_count] {
            grid[cell] = true;
        }
        Ok(grid)
    }
}

/// Big-endian 32-bit words mapped to `[0, 1)`.
struct UnitDraws<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> UnitDraws<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn next_unit(&mut self) -> Result<f64> {
        let end = self.offset + 4;
        let word = self.bytes.get(self.offset..end).ok_or(VerifyError::InvalidLength {
            expected: end,
            actual: self.bytes.len(),
        })?;
        self.offset = end;
        let value = u32::from_be_bytes([word[0], word[1], word[2], word[3]]);
        Ok(f64::from(value) / 4_294_967_296.0)
    }
}

pub fn seed<B: AsRef<[u8]>>(inputs: &[B], mode: SeedMode) -> Result<[u8; SHA384_LEN]> {
    DeterministicStream::new().seed(inputs, mode)
}

pub fn expand(seed: &[u8], block_count: usize) -> Result<Vec<u8>> {
    DeterministicStream::new().expand(seed, block_count)
}

pub fn uniform01<B: AsRef<[u8]>>(inputs: &[B], block_count: usize, mode: SeedMode) -> Result<f64> {
    DeterministicStream::new().uniform01(inputs, block_count, mode)
}

pub fn shuffle<B: AsRef<[u8]>, T>(inputs: &[B], items: &mut [T]) -> Result<()> {
    DeterministicStream::new().shuffle(inputs, items)
}

pub fn mine_grid<B: AsRef<[u8]>>(
    grid_size: usize,
    mine_count: usize,
    inputs: &[B],
) -> Result<Vec<bool>> {
    DeterministicStream::new().mine_grid(grid_size, mine_count, inputs)
}
