use msr_core::SEED_LEN;
use rand::Rng as _;
use rand::SeedableRng;

/// Generate a short opaque seed string for a new match.
///
/// The seed is stored verbatim and served to every client; all board
/// derivation flows from [`fold`]-ing it.
pub fn generate() -> String {
    let mut rng = rand::rngs::SmallRng::from_os_rng();
    (0..SEED_LEN)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect()
}

/// Fold a seed string into the 64-bit value that drives [`super::Rng`].
///
/// SHA-256 keeps the folding stable across platforms and releases; the
/// first eight digest bytes are taken little-endian.
pub fn fold(seed: &str) -> u64 {
    use sha2::Digest;
    let digest = sha2::Sha256::digest(seed.as_bytes());
    u64::from_le_bytes(digest[..8].try_into().expect("digest is 32 bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn generated_seeds_are_opaque_and_short() {
        let seed = generate();
        assert_eq!(seed.len(), SEED_LEN);
        assert!(seed.chars().all(|c| c.is_ascii_alphanumeric()));
    }
    #[test]
    fn generated_seeds_differ() {
        assert_ne!(generate(), generate());
    }
    #[test]
    fn fold_is_stable() {
        assert_eq!(fold("abc123"), fold("abc123"));
        assert_ne!(fold("abc123"), fold("abc124"));
    }
}
