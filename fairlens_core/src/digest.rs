use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes256;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384};

use crate::error::{Result, VerifyError};

pub type HmacSha256 = Hmac<Sha256>;

pub const SHA256_LEN: usize = 32;
pub const SHA384_LEN: usize = 48;
pub const AES_BLOCK_LEN: usize = 16;

/// The primitives every verifier is built from.
///
/// Derivations take a provider instead of reaching for a global one, so tests
/// can substitute a recording or failing implementation.
pub trait CryptoProvider: Send + Sync {
    fn sha256(&self, data: &[u8]) -> Result<[u8; SHA256_LEN]>;

    fn sha384(&self, data: &[u8]) -> Result<[u8; SHA384_LEN]>;

    /// HMAC-SHA256 with `key` as the MAC key and `message` as the signed data.
    fn hmac_sha256(&self, message: &[u8], key: &[u8]) -> Result<[u8; SHA256_LEN]>;

    /// One AES-256 encryption of the counter block, i.e. one block of CTR
    /// keystream.
    fn aes_ctr_encrypt_block(
        &self,
        key: &[u8; 32],
        counter: &[u8; AES_BLOCK_LEN],
    ) -> Result<[u8; AES_BLOCK_LEN]>;
}

/// Provider backed by the RustCrypto `sha2`, `hmac` and `aes` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl CryptoProvider for RustCryptoProvider {
    fn sha256(&self, data: &[u8]) -> Result<[u8; SHA256_LEN]> {
        Ok(sha256(data))
    }

    fn sha384(&self, data: &[u8]) -> Result<[u8; SHA384_LEN]> {
        Ok(sha384(data))
    }

    fn hmac_sha256(&self, message: &[u8], key: &[u8]) -> Result<[u8; SHA256_LEN]> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
            .map_err(|e| VerifyError::CryptoProvider(format!("HMAC key rejected: {e}")))?;
        mac.update(message);
        let mut out = [0u8; SHA256_LEN];
        out.copy_from_slice(&mac.finalize().into_bytes());
        Ok(out)
    }

    fn aes_ctr_encrypt_block(
        &self,
        key: &[u8; 32],
        counter: &[u8; AES_BLOCK_LEN],
    ) -> Result<[u8; AES_BLOCK_LEN]> {
        let cipher = Aes256::new(GenericArray::from_slice(key));
        let mut block = GenericArray::clone_from_slice(counter);
        cipher.encrypt_block(&mut block);
        let mut out = [0u8; AES_BLOCK_LEN];
        out.copy_from_slice(&block);
        Ok(out)
    }
}

/// 128-bit AES-CTR counter.
///
/// Owned by exactly one keystream generation; it is moved in, never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CtrCounter([u8; AES_BLOCK_LEN]);

impl CtrCounter {
    pub fn new(bytes: [u8; AES_BLOCK_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; AES_BLOCK_LEN] {
        &self.0
    }

    /// Big-endian increment. Overflow past the top byte wraps to zero.
    pub fn increment(&mut self) {
        for byte in self.0.iter_mut().rev() {
            if *byte == u8::MAX {
                *byte = 0;
            } else {
                *byte += 1;
                break;
            }
        }
    }
}

/// `block_count` blocks of AES-256-CTR keystream starting at `counter`.
///
/// Equivalent to encrypting `block_count * 16` zero bytes in CTR mode.
pub fn aes_ctr_keystream<P: CryptoProvider + ?Sized>(
    provider: &P,
    key: &[u8; 32],
    mut counter: CtrCounter,
    block_count: usize,
) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(block_count * AES_BLOCK_LEN);
    for _ in 0..block_count {
        out.extend_from_slice(&provider.aes_ctr_encrypt_block(key, counter.as_bytes())?);
        counter.increment();
    }
    Ok(out)
}

pub fn sha256(data: &[u8]) -> [u8; SHA256_LEN] {
    let mut out = [0u8; SHA256_LEN];
    out.copy_from_slice(&Sha256::digest(data));
    out
}

pub fn sha384(data: &[u8]) -> [u8; SHA384_LEN] {
    let mut out = [0u8; SHA384_LEN];
    out.copy_from_slice(&Sha384::digest(data));
    out
}

pub fn hmac_sha256(message: &[u8], key: &[u8]) -> Result<[u8; SHA256_LEN]> {
    RustCryptoProvider.hmac_sha256(message, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_hex, encode_hex};

    #[test]
    fn sha256_empty() {
        assert_eq!(
            encode_hex(&sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha384_abc() {
        assert_eq!(
            encode_hex(&sha384(b"abc")),
            "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed\
             8086072ba1e7cc2358baeca134c825a7"
        );
    }

    #[test]
    fn hmac_rfc4231_case_2() {
        let mac = hmac_sha256(b"what do ya want for nothing?", b"Jefe").unwrap();
        assert_eq!(
            encode_hex(&mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hmac_rfc4231_case_6_long_key() {
        let key = [0xaau8; 131];
        let mac =
            hmac_sha256(b"Test Using Larger Than Block-Size Key - Hash Key First", &key).unwrap();
        assert_eq!(
            encode_hex(&mac),
            "60e431591ee0b67f0d8a26aacbf5b77f8e0bc6213728c5140546040f0ee37f54"
        );
    }

    #[test]
    fn provider_hmac_matches_free_function() {
        let via_provider = RustCryptoProvider.hmac_sha256(b"seed", b"salt").unwrap();
        assert_eq!(via_provider, hmac_sha256(b"seed", b"salt").unwrap());
    }

    #[test]
    fn keystream_first_block_is_fips197_ciphertext() {
        let key: [u8; 32] = core::array::from_fn(|i| i as u8);
        let counter: [u8; 16] = decode_hex("00112233445566778899aabbccddeeff")
            .unwrap()
            .try_into()
            .unwrap();
        let stream =
            aes_ctr_keystream(&RustCryptoProvider, &key, CtrCounter::new(counter), 1).unwrap();
        assert_eq!(encode_hex(&stream), "8ea2b7ca516745bfeafc49904b496089");
    }

    #[test]
    fn keystream_wraps_counter_silently() {
        let key: [u8; 32] = core::array::from_fn(|i| i as u8);
        let stream =
            aes_ctr_keystream(&RustCryptoProvider, &key, CtrCounter::new([0xff; 16]), 2).unwrap();
        assert_eq!(
            encode_hex(&stream),
            "e999e41d4ca770da5387117b5d8f57eef29000b62a499fd0a9f39a6add2e7780"
        );
    }

    #[test]
    fn zero_blocks_is_empty() {
        let stream =
            aes_ctr_keystream(&RustCryptoProvider, &[0; 32], CtrCounter::new([0; 16]), 0).unwrap();
        assert!(stream.is_empty());
    }

    #[test]
    fn counter_carries_leftward() {
        let mut counter = CtrCounter::new([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01, 0xff]);
        counter.increment();
        assert_eq!(counter.as_bytes()[14..], [0x02, 0x00]);

        let mut top = CtrCounter::new([0xff; 16]);
        top.increment();
        assert_eq!(top.as_bytes(), &[0; 16]);
    }
}
