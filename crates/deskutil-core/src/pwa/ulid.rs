//! ULID-shaped identifiers for sites and profiles.
//!
//! The launcher only requires 26 upper-case Crockford base32 characters with a
//! leading digit in `0-7`; no timestamp is encoded. Collisions across a single
//! user's registry are treated as negligible and are not checked.

use crate::config::PwaConfig;
use rand::Rng;

/// Generate a fresh identifier.
pub fn generate_ulid() -> String {
    let mut rng = rand::rng();
    let mut id = String::with_capacity(PwaConfig::ULID_LEN);

    let first = PwaConfig::ULID_FIRST_ALPHABET;
    id.push(first[rng.random_range(0..first.len())] as char);

    let alphabet = PwaConfig::ULID_ALPHABET;
    for _ in 1..PwaConfig::ULID_LEN {
        id.push(alphabet[rng.random_range(0..alphabet.len())] as char);
    }

    id
}

/// Check that `s` has the shape produced by [`generate_ulid`].
pub fn is_ulid(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == PwaConfig::ULID_LEN
        && PwaConfig::ULID_FIRST_ALPHABET.contains(&bytes[0])
        && bytes[1..]
            .iter()
            .all(|b| PwaConfig::ULID_ALPHABET.contains(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_have_expected_shape() {
        for _ in 0..500 {
            let id = generate_ulid();
            assert_eq!(id.len(), 26);
            assert!(id.bytes().all(|b| PwaConfig::ULID_ALPHABET.contains(&b)), "{id}");
            assert!(PwaConfig::ULID_FIRST_ALPHABET.contains(&id.as_bytes()[0]), "{id}");
            assert!(is_ulid(&id));
        }
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(generate_ulid(), generate_ulid());
    }

    #[test]
    fn test_is_ulid_rejects_bad_input() {
        assert!(!is_ulid(""));
        assert!(!is_ulid("01ARZ3NDEKTSV4RRFFQ69G5FA")); // 25 chars
        assert!(!is_ulid("81ARZ3NDEKTSV4RRFFQ69G5FAV")); // first char above 7
        assert!(!is_ulid("01ARZ3NDEKTSV4RRFFQ69G5FAI")); // I is not Crockford
        assert!(!is_ulid("01arz3ndektsv4rrffq69g5fav"));
        assert!(is_ulid("01ARZ3NDEKTSV4RRFFQ69G5FAV"));
    }
}
