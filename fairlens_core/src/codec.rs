use serde::{Deserialize, Serialize};

use crate::error::{Result, VerifyError};

/// Decode a hex string into bytes.
///
/// Whitespace anywhere in the input is ignored and case is folded. An odd
/// number of digits is left-padded with a single `0`, so `"abc"` decodes to
/// `[0x0a, 0xbc]`.
pub fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let mut digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if let Some(bad) = digits.chars().find(|c| !matches!(c, '0'..='9' | 'a'..='f')) {
        return Err(VerifyError::InvalidEncoding(format!(
            "invalid hex string: unexpected character {bad:?}"
        )));
    }
    if digits.len() % 2 != 0 {
        digits.insert(0, '0');
    }
    hex::decode(&digits).map_err(|e| VerifyError::InvalidEncoding(format!("invalid hex string: {e}")))
}

/// Two lowercase hex digits per byte, in order.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Concatenate buffers preserving their order.
pub fn concat<B: AsRef<[u8]>>(parts: &[B]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.as_ref().len()).sum();
    let mut out = Vec::with_capacity(len);
    for part in parts {
        out.extend_from_slice(part.as_ref());
    }
    out
}

/// Parse a decimal nonce into its 8-byte little-endian representation.
pub fn uint64_from_string(input: &str) -> Result<[u8; 8]> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VerifyError::InvalidEncoding(format!(
            "nonce must be a decimal integer, got {input:?}"
        )));
    }
    let value: u64 = trimmed.parse().map_err(|_| {
        VerifyError::InvalidEncoding(format!("nonce {trimmed} does not fit in 64 bits"))
    })?;
    Ok(value.to_le_bytes())
}

/// How a client secret typed by the player becomes seed bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientSecretEncoding {
    /// Raw UTF-8 bytes of the text.
    #[default]
    Utf8,
    /// The text is a hex string.
    Hex,
    /// One byte per UTF-16 code unit: decimal digits keep their numeric
    /// value, every other unit becomes 0. Matches verifiers that copied the
    /// text straight into a byte array.
    NumericCoerced,
}

impl ClientSecretEncoding {
    pub fn encode(self, secret: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(secret.as_bytes().to_vec()),
            Self::Hex => decode_hex(secret),
            Self::NumericCoerced => Ok(secret
                .encode_utf16()
                .map(|unit| match char::from_u32(u32::from(unit)).and_then(|c| c.to_digit(10)) {
                    Some(d) => d as u8,
                    None => 0,
                })
                .collect()),
        }
    }
}
