//! Entry identifiers.

use std::fmt;

use rand::Rng;

/// Symbols used for generated guids. `I`, `L`, `O` and `V` are left out so a
/// guid read off a screen can't be mistaken for `1`, `0` or `U`.
pub const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTUWXYZ";

/// Length of a generated guid.
pub const GUID_LEN: usize = 20;

/// Stable identifier of an entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Guid(String);

impl Guid {
    /// Generate a fresh guid from the thread-local RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::rng())
    }

    /// Generate a guid from the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let guid = (0..GUID_LEN)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        Self(guid)
    }

    /// The guid as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Guid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Guid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Guid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Guid {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Guid {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generated_guid_shape() {
        let guid = Guid::generate();
        assert_eq!(guid.as_str().len(), GUID_LEN);
        assert!(guid.as_str().bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_alphabet_skips_ambiguous_letters() {
        for letter in [b'I', b'L', b'O', b'V'] {
            assert!(!ALPHABET.contains(&letter));
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = Guid::generate_with(&mut StdRng::seed_from_u64(100));
        let b = Guid::generate_with(&mut StdRng::seed_from_u64(100));
        assert_eq!(a, b);
    }
}
