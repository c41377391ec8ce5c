//! Data model for the Concordium login core
//!
//! The account-info tree mirrors the JSON the node returns for
//! `getAccountInfo`, so it deserializes directly with camelCase keys.
//! Credential and key collections are sparse-tolerant ordered maps keyed by
//! integer index; index lookup is the only access pattern.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Per-credential, per-key signature set submitted by the wallet.
/// Signatures are 64-byte Ed25519 values, hex-encoded at the boundary.
pub type SignatureSet = BTreeMap<u8, BTreeMap<u8, String>>;

/// Persisted challenge record, one per account address
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct NonceRecord {
    pub account_address: String,
    /// Zero-padded 6-digit decimal code
    pub nonce: String,
    pub created_at: DateTime<Utc>,
    /// Local user association, owned by the identity layer; read-only here
    pub user_id: Option<i64>,
}

impl NonceRecord {
    /// A record is fresh while its age stays within the expiry window.
    pub fn is_fresh(&self, expiry: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.created_at <= expiry
    }
}

/// On-chain account state, externally supplied and treated as read-only
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub account_address: String,
    /// Minimum number of credentials that must co-sign
    pub account_threshold: u8,
    pub account_credentials: BTreeMap<u8, AccountCredential>,
}

/// A sub-identity within an account with its own keys and threshold
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountCredential {
    pub credential_public_keys: CredentialPublicKeys,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPublicKeys {
    /// Minimum number of keys of this credential that must sign
    pub threshold: u8,
    pub keys: BTreeMap<u8, VerifyKey>,
}

/// A single verification key as published on chain
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerifyKey {
    pub scheme_id: String,
    /// 32-byte Ed25519 public key, hex-encoded
    pub verify_key: String,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Response containing the issued challenge
#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub nonce: String,
    /// The exact message the wallet must sign
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

/// Outcome of an authentication attempt.
///
/// `failure` keeps the typed error so callers can still tell structural
/// faults from transient ones when logging; a plain verification miss has
/// `verified: false` and no failure.
#[derive(Debug)]
pub struct AuthOutcome {
    pub verified: bool,
    pub account_address: String,
    pub failure: Option<AuthError>,
}

impl AuthOutcome {
    pub fn verified(account_address: &str) -> Self {
        Self {
            verified: true,
            account_address: account_address.to_string(),
            failure: None,
        }
    }

    pub fn rejected(account_address: &str) -> Self {
        Self {
            verified: false,
            account_address: account_address.to_string(),
            failure: None,
        }
    }

    pub fn failed(account_address: &str, failure: AuthError) -> Self {
        Self {
            verified: false,
            account_address: account_address.to_string(),
            failure: Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_nonce_record_freshness() {
        let now = Utc::now();
        let record = NonceRecord {
            account_address: "addr".to_string(),
            nonce: "042137".to_string(),
            created_at: now - Duration::minutes(9),
            user_id: None,
        };

        assert!(record.is_fresh(Duration::minutes(10), now));
        assert!(!record.is_fresh(Duration::minutes(5), now));
    }

    #[test]
    fn test_account_info_deserializes_node_json() {
        let json = r#"{
            "accountAddress": "3kBx2h5Y2veb4hZgAJWPrr8RyQESKm5TjzF3ti1QQ4VSYLwK1G",
            "accountThreshold": 2,
            "accountCredentials": {
                "0": {
                    "credentialPublicKeys": {
                        "threshold": 1,
                        "keys": {
                            "0": {
                                "schemeId": "Ed25519",
                                "verifyKey": "aa"
                            }
                        }
                    }
                },
                "3": {
                    "credentialPublicKeys": {
                        "threshold": 1,
                        "keys": {}
                    }
                }
            }
        }"#;

        let info: AccountInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.account_threshold, 2);
        // Sparse credential indices survive the round trip
        assert_eq!(
            info.account_credentials.keys().copied().collect::<Vec<_>>(),
            vec![0, 3]
        );
        let keys = &info.account_credentials[&0].credential_public_keys;
        assert_eq!(keys.threshold, 1);
        assert_eq!(keys.keys[&0].scheme_id, "Ed25519");
    }

    #[test]
    fn test_signature_set_deserializes_string_indices() {
        let json = r#"{"0": {"0": "deadbeef"}, "1": {"2": "cafe"}}"#;
        let set: SignatureSet = serde_json::from_str(json).unwrap();
        assert_eq!(set[&0][&0], "deadbeef");
        assert_eq!(set[&1][&2], "cafe");
    }
}
