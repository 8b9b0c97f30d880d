pub mod codec;
pub mod crash;
pub mod digest;
pub mod error;
pub mod games;
pub mod stream;

pub use crate::codec::{concat, decode_hex, encode_hex, uint64_from_string, ClientSecretEncoding};
pub use crate::crash::{
    crash_multiplier, format_multiplier, previous_hash, ChainWalk, CrashChain, CrashGame,
    LinkEncoding, MedianClass, CRASH_MEDIAN,
};
pub use crate::digest::{
    aes_ctr_keystream, hmac_sha256, sha256, sha384, CryptoProvider, CtrCounter, RustCryptoProvider,
};
pub use crate::error::{Result, VerifyError};
pub use crate::games::{render_grid, DiceRoll, MineGrid, MinesRound, MINES_GRID_SIZE};
pub use crate::stream::{expand, mine_grid, seed, shuffle, uniform01, DeterministicStream, SeedMode};
