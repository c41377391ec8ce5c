//! Authentication coordinator
//!
//! Orchestrates challenge issuance and verification. The coordinator, not
//! the caller, rebuilds the message fed to the verifier from the stored
//! nonce, so a caller can never substitute an arbitrary signed message.

use crate::config::Config;
use crate::error::AuthError;
use crate::identity::{AccountInfoProvider, IdentityLinker, LinkedUser};
use crate::models::{AuthOutcome, ChallengeResponse, SignatureSet};
use crate::store::NonceStore;

use super::challenge::ChallengeStore;
use super::verify;

pub struct AuthService<S, P> {
    challenges: ChallengeStore<S>,
    provider: P,
    template: String,
}

impl<S: NonceStore, P: AccountInfoProvider> AuthService<S, P> {
    pub fn new(store: S, provider: P, config: &Config) -> Self {
        Self {
            challenges: ChallengeStore::new(store, config.nonce_expiry),
            provider,
            template: config.challenge_template.clone(),
        }
    }

    /// Issue (or re-issue) the login challenge for an account address.
    pub async fn challenge(&self, account_address: &str) -> Result<ChallengeResponse, AuthError> {
        tracing::info!(account = %account_address, "issuing login challenge");

        let record = self.challenges.get_or_create(account_address).await?;
        let message = self.challenge_message(&record.nonce);

        Ok(ChallengeResponse {
            message,
            expires_at: record.created_at + self.challenges.expiry(),
            nonce: record.nonce,
        })
    }

    /// Verify a submitted signature set against the stored challenge and the
    /// account's on-chain credential structure.
    ///
    /// All failure classes are folded into the outcome; the typed error is
    /// preserved there for logging. The nonce record is never mutated on any
    /// outcome, success included: a captured proof stays replayable until
    /// the nonce expires naturally, matching the wire-compatible reference
    /// behavior.
    pub async fn authenticate(
        &self,
        account_address: &str,
        signatures: &SignatureSet,
    ) -> AuthOutcome {
        tracing::info!(account = %account_address, "authenticating");

        match self.try_authenticate(account_address, signatures).await {
            Ok(true) => {
                tracing::info!(account = %account_address, "signature set verified");
                AuthOutcome::verified(account_address)
            }
            Ok(false) => {
                tracing::warn!(account = %account_address, "signature set rejected");
                AuthOutcome::rejected(account_address)
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(account = %account_address, error = %e, "authentication aborted on transient fault");
                AuthOutcome::failed(account_address, e)
            }
            Err(e) => {
                tracing::error!(account = %account_address, error = %e, "structurally invalid authentication request");
                AuthOutcome::failed(account_address, e)
            }
        }
    }

    /// Authenticate and, on success, forward the verified address to the
    /// identity layer. An unverified proof or an unlinked account surfaces
    /// as an error here because a login cannot proceed either way.
    pub async fn complete_login(
        &self,
        account_address: &str,
        signatures: &SignatureSet,
        linker: &dyn IdentityLinker,
    ) -> Result<LinkedUser, AuthError> {
        let outcome = self.authenticate(account_address, signatures).await;

        if let Some(failure) = outcome.failure {
            return Err(failure);
        }
        if !outcome.verified {
            return Err(AuthError::VerificationFailed);
        }

        let user = linker.link(account_address).await?;
        tracing::info!(account = %account_address, user_id = user.user_id, "login completed");

        Ok(user)
    }

    async fn try_authenticate(
        &self,
        account_address: &str,
        signatures: &SignatureSet,
    ) -> Result<bool, AuthError> {
        let record = self.challenges.issued(account_address).await?;
        let message = self.challenge_message(&record.nonce);

        let account = self.provider.fetch(account_address).await?;
        tracing::info!(account = %account_address, "got account info");

        verify::verify_message_signature(&message, signatures, &account)
    }

    fn challenge_message(&self, nonce: &str) -> String {
        self.template.replace("{nonce}", nonce)
    }
}
