//! Challenge issuance
//!
//! One nonce record per account address. Requests inside the expiry window
//! are idempotent so a client retry does not invalidate an in-flight signing
//! attempt; an expired record is overwritten in place with a fresh code.

use chrono::{Duration, Utc};
use rand::Rng;

use crate::error::AuthError;
use crate::models::NonceRecord;
use crate::store::NonceStore;

pub struct ChallengeStore<S> {
    store: S,
    expiry: Duration,
}

impl<S: NonceStore> ChallengeStore<S> {
    pub fn new(store: S, expiry: Duration) -> Self {
        Self { store, expiry }
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Return the live nonce record for an address, minting one if absent
    /// or expired.
    pub async fn get_or_create(&self, account_address: &str) -> Result<NonceRecord, AuthError> {
        let now = Utc::now();

        if let Some(record) = self.store.load(account_address).await? {
            if record.is_fresh(self.expiry, now) {
                tracing::info!(account = %account_address, "found live nonce record");
                return Ok(record);
            }
            tracing::info!(account = %account_address, "nonce expired, minting a new one");
        } else {
            tracing::info!(account = %account_address, "minting first nonce");
        }

        let candidate = NonceRecord {
            account_address: account_address.to_string(),
            nonce: generate_nonce(),
            created_at: now,
            user_id: None,
        };

        // The conditional upsert arbitrates concurrent refreshes; a loser is
        // handed the winner's record.
        let live = self
            .store
            .upsert_if_stale(candidate, now - self.expiry)
            .await?;

        Ok(live)
    }

    /// Return the record a prior challenge request created. Expiry is an
    /// issuance concern only: an old record still authenticates, it just
    /// stops being handed out.
    pub async fn issued(&self, account_address: &str) -> Result<NonceRecord, AuthError> {
        self.store
            .load(account_address)
            .await?
            .ok_or(AuthError::ChallengeNotFound)
    }
}

/// Uniformly random zero-padded 6-digit decimal code, 000000-999999 inclusive
fn generate_nonce() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..=999_999))
}
