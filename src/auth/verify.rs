//! Two-level threshold signature verification
//!
//! A proof passes when at least `account_threshold` credentials each supply
//! at least their own `threshold` of valid key signatures over the canonical
//! digest. One bad signature anywhere invalidates the whole proof. Index
//! lookups that reference non-existent account data are structural errors,
//! not failed proofs.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::error::AuthError;
use crate::models::{AccountInfo, SignatureSet, VerifyKey};

use super::{address, digest};

const ED25519_SCHEME: &str = "Ed25519";

/// Verify a signature set against the account's credential structure.
///
/// Returns `Ok(false)` for threshold shortfalls and signature mismatches;
/// raises only for structurally invalid input. Neither argument is mutated.
pub fn verify_message_signature(
    message: &str,
    signatures: &SignatureSet,
    account: &AccountInfo,
) -> Result<bool, AuthError> {
    // Account-level threshold gate before any cryptographic work.
    if signatures.len() < account.account_threshold as usize {
        tracing::debug!(
            account = %account.account_address,
            submitted = signatures.len(),
            required = account.account_threshold,
            "credential count below account threshold"
        );
        return Ok(false);
    }

    // Recomputed fresh per call; the digest depends on the caller-determined
    // message, so it is never cached.
    let raw = address::decode(&account.account_address)?;
    let digest = digest::build(&raw, message);

    for (&credential_index, credential_signatures) in signatures {
        let credential = account
            .account_credentials
            .get(&credential_index)
            .ok_or(AuthError::UnknownCredential(credential_index))?;
        let public_keys = &credential.credential_public_keys;

        if credential_signatures.len() < public_keys.threshold as usize {
            tracing::debug!(
                account = %account.account_address,
                credential = credential_index,
                "key count below credential threshold"
            );
            return Ok(false);
        }

        for (&key_index, signature_hex) in credential_signatures {
            let verify_key = public_keys.keys.get(&key_index).ok_or(
                AuthError::UnknownKeyIndex {
                    credential: credential_index,
                    key: key_index,
                },
            )?;

            if !verify_single(verify_key, signature_hex, &digest)? {
                tracing::debug!(
                    account = %account.account_address,
                    credential = credential_index,
                    key = key_index,
                    "signature mismatch"
                );
                return Ok(false);
            }
        }
    }

    Ok(true)
}

/// Check one hex-encoded Ed25519 signature over the digest.
fn verify_single(
    key: &VerifyKey,
    signature_hex: &str,
    digest: &[u8; 32],
) -> Result<bool, AuthError> {
    if key.scheme_id != ED25519_SCHEME {
        return Err(AuthError::InvalidVerifyKey(format!(
            "unsupported signature scheme {}",
            key.scheme_id
        )));
    }

    let key_bytes: [u8; 32] = hex::decode(&key.verify_key)
        .map_err(|e| AuthError::InvalidHex(format!("verify key: {e}")))?
        .try_into()
        .map_err(|_| AuthError::InvalidHex("verify key must be 32 bytes".to_string()))?;

    let verifying_key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| AuthError::InvalidVerifyKey(e.to_string()))?;

    let signature_bytes = hex::decode(signature_hex)
        .map_err(|e| AuthError::InvalidHex(format!("signature: {e}")))?;
    let signature = Signature::from_slice(&signature_bytes)
        .map_err(|_| AuthError::InvalidHex("signature must be 64 bytes".to_string()))?;

    Ok(verifying_key.verify(digest, &signature).is_ok())
}
