//! Canonical message digest
//!
//! The wallet and this verifier independently compute
//! `SHA256(raw_identifier ‖ 0x00×8 ‖ message_utf8)`; the layout must match
//! bit for bit, including the eight-byte zero block separating the address
//! from the payload.

use sha2::{Digest, Sha256};

const PADDING: [u8; 8] = [0u8; 8];

/// Build the 32-byte digest that is actually signed.
pub fn build(raw_identifier: &[u8; 32], message: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(raw_identifier);
    hasher.update(PADDING);
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_matches_manual_concatenation() {
        let raw = [3u8; 32];
        let message = "Login with code: 048213";

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&raw);
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(message.as_bytes());
        let expected: [u8; 32] = Sha256::digest(&bytes).into();

        assert_eq!(build(&raw, message), expected);
    }

    #[test]
    fn test_message_byte_flip_changes_digest() {
        let raw = [3u8; 32];
        assert_ne!(
            build(&raw, "Login with code: 048213"),
            build(&raw, "Login with code: 048214")
        );
    }

    #[test]
    fn test_padding_is_exactly_eight_zero_bytes() {
        let raw = [3u8; 32];
        let with_padding = build(&raw, "abc");

        let mut nine = Vec::new();
        nine.extend_from_slice(&raw);
        nine.extend_from_slice(&[0u8; 9]);
        nine.extend_from_slice(b"abc");
        let nine_pad: [u8; 32] = Sha256::digest(&nine).into();
        assert_ne!(with_padding, nine_pad);

        let mut seven = Vec::new();
        seven.extend_from_slice(&raw);
        seven.extend_from_slice(&[0u8; 7]);
        seven.extend_from_slice(b"abc");
        let seven_pad: [u8; 32] = Sha256::digest(&seven).into();
        assert_ne!(with_padding, seven_pad);
    }
}
