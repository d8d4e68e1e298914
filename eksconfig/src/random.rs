//! Random identifiers used for generated names, passwords and tokens.
//!
//! Every helper takes the generator as an argument so callers decide how it
//! is seeded. Tests pass a seeded `StdRng`; production code uses the thread RNG.

use rand::Rng;

const ALPHANUMERIC: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Returns `n` characters drawn from `[0-9a-z]`.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use eksconfig::random::rand_string;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let s = rand_string(&mut rng, 12);
/// assert_eq!(s.len(), 12);
/// assert!(s.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
/// ```
pub fn rand_string<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
    (0..n)
        .map(|_| char::from(ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())]))
        .collect()
}

/// Returns `n` random bytes encoded as lowercase hex (`2 * n` characters).
pub fn rand_hex<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
    let mut bytes = vec![0u8; n];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rand_string_length_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [0, 1, 5, 12, 64] {
            let s = rand_string(&mut rng, n);
            assert_eq!(s.len(), n);
            assert!(s.bytes().all(|b| ALPHANUMERIC.contains(&b)));
        }
    }

    #[test]
    fn test_rand_string_seeded_is_deterministic() {
        let a = rand_string(&mut StdRng::seed_from_u64(42), 16);
        let b = rand_string(&mut StdRng::seed_from_u64(42), 16);
        assert_eq!(a, b);
    }

    #[test]
    fn test_rand_hex_decodes() {
        let mut rng = StdRng::seed_from_u64(3);
        let token = rand_hex(&mut rng, 32);
        assert_eq!(token.len(), 64);
        assert_eq!(hex::decode(&token).unwrap().len(), 32);
    }
}
