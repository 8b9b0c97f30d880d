use fairlens_core::{
    crash_multiplier, decode_hex, encode_hex, mine_grid, previous_hash, sha256, shuffle,
    CrashChain, CryptoProvider, DeterministicStream, LinkEncoding, Result, RustCryptoProvider,
    SeedMode, VerifyError,
};

const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Returns a fixed HMAC so the crash formula can be driven to its edges.
struct FixedMac([u8; 32]);

impl CryptoProvider for FixedMac {
    fn sha256(&self, data: &[u8]) -> Result<[u8; 32]> {
        RustCryptoProvider.sha256(data)
    }

    fn sha384(&self, data: &[u8]) -> Result<[u8; 48]> {
        RustCryptoProvider.sha384(data)
    }

    fn hmac_sha256(&self, _message: &[u8], _key: &[u8]) -> Result<[u8; 32]> {
        Ok(self.0)
    }

    fn aes_ctr_encrypt_block(&self, key: &[u8; 32], counter: &[u8; 16]) -> Result<[u8; 16]> {
        RustCryptoProvider.aes_ctr_encrypt_block(key, counter)
    }
}

struct Unavailable;

impl CryptoProvider for Unavailable {
    fn sha256(&self, _data: &[u8]) -> Result<[u8; 32]> {
        Err(VerifyError::CryptoProvider("sha256 unavailable".into()))
    }

    fn sha384(&self, _data: &[u8]) -> Result<[u8; 48]> {
        Err(VerifyError::CryptoProvider("sha384 unavailable".into()))
    }

    fn hmac_sha256(&self, _message: &[u8], _key: &[u8]) -> Result<[u8; 32]> {
        Err(VerifyError::CryptoProvider("hmac unavailable".into()))
    }

    fn aes_ctr_encrypt_block(&self, _key: &[u8; 32], _counter: &[u8; 16]) -> Result<[u8; 16]> {
        Err(VerifyError::CryptoProvider("aes unavailable".into()))
    }
}

#[test]
fn derivations_are_repeatable() {
    let a = crash_multiplier(ZERO_HASH, "salt").unwrap();
    let b = crash_multiplier(ZERO_HASH, "salt").unwrap();
    assert_eq!(a, b);

    let inputs = [decode_hex("abcdef").unwrap(), b"client".to_vec()];
    let stream = DeterministicStream::new();
    assert_eq!(
        stream.bytes(&inputs, 4, SeedMode::Concat).unwrap(),
        stream.bytes(&inputs, 4, SeedMode::Concat).unwrap()
    );
}

#[test]
fn seed_modes_differ() {
    let inputs = [b"server".to_vec(), b"client".to_vec()];
    let stream = DeterministicStream::new();
    assert_ne!(
        stream.seed(&inputs, SeedMode::Concat).unwrap(),
        stream.seed(&inputs, SeedMode::ConcatOfHashes).unwrap()
    );
}

#[test]
fn hex_round_trips() {
    let bytes: Vec<u8> = (0..=255).collect();
    assert_eq!(decode_hex(&encode_hex(&bytes)).unwrap(), bytes);
    let text = "00ff10a0";
    assert_eq!(encode_hex(&decode_hex(text).unwrap()), text);
}

#[test]
fn crash_reference_games() {
    assert_eq!(crash_multiplier(ZERO_HASH, "test").unwrap(), 1.1);
    let salt = "0000000000000000000fa3b65e43e4240d71762a5bf397d5304b2596d116859c";
    assert_eq!(crash_multiplier(&"a".repeat(64), salt).unwrap(), 1.59);
    assert_eq!(
        crash_multiplier(
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            "bustabit"
        )
        .unwrap(),
        3.94
    );
}

#[test]
fn crash_never_below_one() {
    let mut hash = ZERO_HASH.to_string();
    for _ in 0..200 {
        assert!(crash_multiplier(&hash, "salt").unwrap() >= 1.0);
        hash = previous_hash(&hash).unwrap();
    }
}

#[test]
fn crash_zero_random_value_is_one() {
    let chain = CrashChain::with_provider(FixedMac([0; 32]), "salt");
    assert_eq!(chain.multiplier(ZERO_HASH).unwrap(), 1.0);
}

#[test]
fn crash_random_value_rounding_to_one_is_infinite() {
    let chain = CrashChain::with_provider(FixedMac([0xff; 32]), "salt");
    assert_eq!(chain.multiplier(ZERO_HASH).unwrap(), f64::INFINITY);
}

#[test]
fn crash_uses_first_13_hex_characters() {
    // "8000000000000" then a stray nibble that must be ignored: X = 0.5
    let mut mac = [0xff; 32];
    mac[..7].copy_from_slice(&[0x80, 0, 0, 0, 0, 0, 0x0f]);
    let chain = CrashChain::with_provider(FixedMac(mac), "salt");
    assert_eq!(chain.multiplier(ZERO_HASH).unwrap(), 1.98);
}

#[test]
fn chain_consistency() {
    let h = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    let once = previous_hash(h).unwrap();
    assert_eq!(once, encode_hex(&sha256(&decode_hex(h).unwrap())));
    let twice = previous_hash(&once).unwrap();
    assert_eq!(
        decode_hex(&twice).unwrap(),
        sha256(&sha256(&decode_hex(h).unwrap())).to_vec()
    );
}

#[test]
fn chain_walk_bytes_links() {
    let chain = CrashChain::new("test");
    let games: Vec<_> = chain.walk(ZERO_HASH, 3).collect::<Result<_>>().unwrap();
    let hashes: Vec<&str> = games.iter().map(|g| g.hash.as_str()).collect();
    assert_eq!(
        hashes,
        vec![
            ZERO_HASH,
            "66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925",
            "2b32db6c2c0a6235fb1397e8225ea85e0f0e6e8c7b126d0016ccbde0e667151e",
        ]
    );
    let multipliers: Vec<f64> = games.iter().map(|g| g.multiplier).collect();
    assert_eq!(multipliers, vec![1.1, 2.01, 1.51]);
}

#[test]
fn chain_walk_text_links() {
    let chain = CrashChain::new("test").link_encoding(LinkEncoding::Text);
    let games: Vec<_> = chain.walk(ZERO_HASH, 3).collect::<Result<_>>().unwrap();
    assert_eq!(
        games[1].hash,
        "60e05bd1b195af2f94112fa7197a5c88289058840ce7c6df9693756bc6250f55"
    );
    assert_eq!(
        games[2].hash,
        "632500b1742987815bf1e7ebc49d1da6ed2dd9659623bef3f9b96bf5e75ab702"
    );
    let multipliers: Vec<f64> = games.iter().map(|g| g.multiplier).collect();
    assert_eq!(multipliers, vec![1.1, 1.39, 1.0]);
}

#[test]
fn chain_walk_can_stop_early() {
    let chain = CrashChain::new("test");
    let first_two: Vec<_> = chain.walk(ZERO_HASH, 1000).take(2).collect();
    assert_eq!(first_two.len(), 2);
    assert_eq!(chain.walk(ZERO_HASH, 0).count(), 0);
}

#[test]
fn mine_grid_has_exact_mine_count() {
    let inputs = [decode_hex("ff00").unwrap(), b"player".to_vec(), 7u64.to_le_bytes().to_vec()];
    for k in 0..=25 {
        let grid = mine_grid(25, k, &inputs).unwrap();
        assert_eq!(grid.len(), 25);
        assert_eq!(grid.iter().filter(|&&m| m).count(), k);
    }
    assert!(mine_grid(25, 0, &inputs).unwrap().iter().all(|&m| !m));
    assert!(mine_grid(25, 25, &inputs).unwrap().iter().all(|&m| m));
}

#[test]
fn shuffle_is_a_permutation() {
    for n in [2usize, 3, 5, 16, 25, 100] {
        let inputs = [n.to_le_bytes().to_vec()];
        let mut items: Vec<usize> = (0..n).collect();
        shuffle(&inputs, &mut items).unwrap();
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..n).collect::<Vec<_>>());
    }
}

#[test]
fn provider_failures_propagate() {
    let chain = CrashChain::with_provider(Unavailable, "salt");
    assert_eq!(
        chain.multiplier(ZERO_HASH),
        Err(VerifyError::CryptoProvider("hmac unavailable".into()))
    );
    let stream = DeterministicStream::with_provider(Unavailable);
    assert!(matches!(
        stream.uniform01(&[b"x".to_vec()], 1, SeedMode::Concat),
        Err(VerifyError::CryptoProvider(_))
    ));
}
