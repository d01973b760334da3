use sha2::{Digest, Sha256};
use std::fmt;

/// Fixed-size digest standing in for document content.
///
/// Two fingerprints are equal iff their canonical texts were
/// byte-identical at computation time. Compared only for equality, never
/// reversed. An accidental SHA-256 collision would read as a false
/// negative; that is an accepted limitation, not something this code
/// engineers around.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Digest canonical text into a fingerprint.
    pub fn digest(canonical_text: &str) -> Self {
        let hash = Sha256::digest(canonical_text.as_bytes());
        Fingerprint(hash.into())
    }

    /// Full lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex prefix for log lines and event details.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({}…)", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_input_yields_identical_digest() {
        assert_eq!(
            Fingerprint::digest("Price: 10"),
            Fingerprint::digest("Price: 10")
        );
    }

    #[test]
    fn any_difference_yields_a_different_digest() {
        assert_ne!(
            Fingerprint::digest("Price: 10"),
            Fingerprint::digest("Price: 12")
        );
        assert_ne!(Fingerprint::digest(""), Fingerprint::digest(" "));
    }

    #[test]
    fn hex_renderings() {
        let print = Fingerprint::digest("x");
        assert_eq!(print.to_hex().len(), 64);
        assert_eq!(print.short().len(), 12);
        assert!(print.to_hex().starts_with(&print.short()));
    }
}
