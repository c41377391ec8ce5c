//! Concordium account address decoding
//!
//! Addresses are base58check strings carrying a 1-byte version prefix, the
//! 32-byte raw account identifier and a 4-byte checksum trailer.

use crate::error::AuthError;

const VERSION_BYTES: usize = 1;
const CHECKSUM_BYTES: usize = 4;
const RAW_IDENTIFIER_BYTES: usize = 32;
const DECODED_BYTES: usize = VERSION_BYTES + RAW_IDENTIFIER_BYTES + CHECKSUM_BYTES;

/// Decode a checksummed account address into its raw 32-byte identifier.
///
/// The checksum trailer is stripped without being re-verified. The wallet
/// signer derives the signed digest from the same stripped bytes, so the
/// two sides agree regardless of trailer validity; verification elsewhere
/// depends on this staying permissive.
pub fn decode(address: &str) -> Result<[u8; 32], AuthError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| AuthError::MalformedAddress(e.to_string()))?;

    if decoded.len() < DECODED_BYTES {
        return Err(AuthError::MalformedAddress(format!(
            "expected at least {} decoded bytes, got {}",
            DECODED_BYTES,
            decoded.len()
        )));
    }

    let body = &decoded[VERSION_BYTES..decoded.len() - CHECKSUM_BYTES];

    body.try_into().map_err(|_| {
        AuthError::MalformedAddress(format!(
            "raw identifier must be {} bytes, got {}",
            RAW_IDENTIFIER_BYTES,
            body.len()
        ))
    })
}
