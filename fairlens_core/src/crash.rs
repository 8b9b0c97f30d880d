use serde::{Deserialize, Serialize};

use crate::codec::{decode_hex, encode_hex};
use crate::digest::{CryptoProvider, RustCryptoProvider};
use crate::error::{Result, VerifyError};

/// Bits of the HMAC taken as the game's random value.
const CRASH_BITS: u32 = 52;
/// Significant decimal digits kept when rounding the random value.
const CRASH_PRECISION: usize = 9;
/// Multipliers below this are classed as under the median.
pub const CRASH_MEDIAN: f64 = 1.98;

/// How one chain link is hashed to reach the previously played game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkEncoding {
    /// SHA-256 over the decoded hash bytes.
    #[default]
    Bytes,
    /// SHA-256 over the hex text of the hash.
    Text,
}

/// One verified crash game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashGame {
    pub hash: String,
    pub multiplier: f64,
}

/// Where a multiplier falls relative to [`CRASH_MEDIAN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedianClass {
    Under,
    At,
    Over,
}

impl MedianClass {
    pub fn of(multiplier: f64) -> Self {
        if multiplier < CRASH_MEDIAN {
            Self::Under
        } else if multiplier > CRASH_MEDIAN {
            Self::Over
        } else {
            Self::At
        }
    }
}

/// Crash-game verifier for one salt.
///
/// Game hashes form a one-way chain: the hash of game `n - 1` is derived
/// from the hash of game `n`, so verification walks from the latest revealed
/// hash back through history.
#[derive(Debug, Clone)]
pub struct CrashChain<P = RustCryptoProvider> {
    provider: P,
    salt: String,
    link: LinkEncoding,
}

impl CrashChain {
    pub fn new(salt: impl Into<String>) -> Self {
        Self::with_provider(RustCryptoProvider, salt)
    }
}

impl<P: CryptoProvider> CrashChain<P> {
    pub fn with_provider(provider: P, salt: impl Into<String>) -> Self {
        Self {
            provider,
            salt: salt.into(),
            link: LinkEncoding::default(),
        }
    }

    pub fn link_encoding(mut self, link: LinkEncoding) -> Self {
        self.link = link;
        self
    }

    /// Crash point of the game identified by `game_hash`.
    ///
    /// The result is at least 1.0. A random value that rounds to exactly 1
    /// yields `f64::INFINITY`, as the live game does.
    pub fn multiplier(&self, game_hash: &str) -> Result<f64> {
        let message = decode_hex(game_hash)?;
        let mac = self.provider.hmac_sha256(&message, self.salt.as_bytes())?;
        let digest = encode_hex(&mac);

        // 13 hex characters, not bytes
        let head = &digest[..(CRASH_BITS / 4) as usize];
        let r = u64::from_str_radix(head, 16)
            .map_err(|e| VerifyError::InvalidEncoding(format!("HMAC prefix {head}: {e}")))?;

        let x = r as f64 / 2f64.powi(CRASH_BITS as i32);
        let x = round_significant(x, CRASH_PRECISION)?;
        let x = 99.0 / (1.0 - x);

        Ok((x.floor() / 100.0).max(1.0))
    }

    /// Hash of the game played before `game_hash`.
    pub fn previous_hash(&self, game_hash: &str) -> Result<String> {
        let digest = match self.link {
            LinkEncoding::Bytes => self.provider.sha256(&decode_hex(game_hash)?)?,
            LinkEncoding::Text => self.provider.sha256(game_hash.as_bytes())?,
        };
        Ok(encode_hex(&digest))
    }

    pub fn game(&self, game_hash: &str) -> Result<CrashGame> {
        Ok(CrashGame {
            hash: game_hash.to_string(),
            multiplier: self.multiplier(game_hash)?,
        })
    }

    /// Lazily verify `count` games, starting at `start_hash` and moving to
    /// the previous game after each one.
    ///
    /// The walk stops after the first error.
    pub fn walk(&self, start_hash: &str, count: usize) -> ChainWalk<'_, P> {
        ChainWalk {
            chain: self,
            next_hash: Some(start_hash.to_string()),
            remaining: count,
        }
    }
}

/// Iterator returned by [`CrashChain::walk`].
pub struct ChainWalk<'a, P> {
    chain: &'a CrashChain<P>,
    next_hash: Option<String>,
    remaining: usize,
}

impl<P: CryptoProvider> Iterator for ChainWalk<'_, P> {
    type Item = Result<CrashGame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let hash = self.next_hash.take()?;
        self.remaining -= 1;

        let game = match self.chain.game(&hash) {
            Ok(game) => game,
            Err(e) => return Some(Err(e)),
        };
        if self.remaining > 0 {
            match self.chain.previous_hash(&hash) {
                Ok(prev) => self.next_hash = Some(prev),
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(game))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next_hash {
            Some(_) => (0, Some(self.remaining)),
            None => (0, Some(0)),
        }
    }
}

/// Crash point for `game_hash` under `salt` using the default provider.
pub fn crash_multiplier(game_hash: &str, salt: &str) -> Result<f64> {
    CrashChain::new(salt).multiplier(game_hash)
}

/// `encode_hex(sha256(decode_hex(current)))`.
pub fn previous_hash(current: &str) -> Result<String> {
    CrashChain::new("").previous_hash(current)
}

/// Two decimal places, the way crash points are displayed.
pub fn format_multiplier(multiplier: f64) -> String {
    format!("{multiplier:.2}")
}

/// Round to `digits` significant decimal digits, ties away from zero,
/// then re-parse. Works on the exact decimal expansion of `x` so the result
/// never depends on intermediate binary rounding.
fn round_significant(x: f64, digits: usize) -> Result<f64> {
    if x == 0.0 || !x.is_finite() || digits == 0 {
        return Ok(x);
    }
    // exact for r / 2^52 (at most 52 significant digits)
    let exact = format!("{:.80e}", x.abs());
    let (mantissa, exponent) = exact
        .split_once('e')
        .ok_or_else(|| VerifyError::InvalidParameter(format!("cannot round {x}")))?;
    let mut exponent: i32 = exponent
        .parse()
        .map_err(|_| VerifyError::InvalidParameter(format!("cannot round {x}")))?;

    let all: Vec<u8> = mantissa
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect();
    if digits >= all.len() {
        return Ok(x);
    }
    let mut kept = all[..digits].to_vec();
    if all[digits] >= 5 {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, 1);
                kept.pop();
                exponent += 1;
                break;
            }
            i -= 1;
            if kept[i] == 9 {
                kept[i] = 0;
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let digits_str: String = kept.iter().map(|d| char::from(b'0' + d)).collect();
    let text = format!(
        "{}{}.{}e{}",
        if x < 0.0 { "-" } else { "" },
        &digits_str[..1],
        &digits_str[1..],
        exponent
    );
    text.parse::<f64>()
        .map_err(|e| VerifyError::InvalidParameter(format!("cannot round {x}: {e}")))
}
