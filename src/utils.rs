//! Utility functions for hashing and identifiers

use uuid7::uuid7;

// a fresh 64-hex transaction id: the sha256 digest of a uuid7
pub fn new_tx_id() -> String {
    sha256::digest(uuid7().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_ids_are_unique_hex_digests() {
        let a = new_tx_id();
        let b = new_tx_id();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
