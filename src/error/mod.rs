//! Error taxonomy for the login core
//!
//! Three classes of failure are kept apart:
//! - structural errors (malformed address, unknown credential/key index,
//!   bad hex, missing challenge) are always surfaced as errors;
//! - plain verification misses (threshold shortfall, bad signature) are a
//!   boolean outcome, never an error;
//! - provider and store faults are transient and retryable.

use thiserror::Error;

/// Nonce store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// Account-info provider errors (transient, distinct from verification)
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("account info request failed: {0}")]
    Request(String),

    #[error("account info request timed out")]
    Timeout,

    #[error("malformed account info response: {0}")]
    Malformed(String),
}

/// Identity-layer errors, raised when forwarding a verified address
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("no local user is linked to this account")]
    NotLinked,

    #[error("identity lookup failed: {0}")]
    Lookup(String),
}

/// Top-level authentication error
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("malformed account address: {0}")]
    MalformedAddress(String),

    #[error("unknown credential index {0}")]
    UnknownCredential(u8),

    #[error("unknown key index {key} for credential {credential}")]
    UnknownKeyIndex { credential: u8, key: u8 },

    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("unusable verify key: {0}")]
    InvalidVerifyKey(String),

    #[error("no challenge issued for this account")]
    ChallengeNotFound,

    #[error("signature verification failed")]
    VerificationFailed,

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Structural errors indicate a malformed or forged request rather than
    /// an honest failed proof.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            AuthError::MalformedAddress(_)
                | AuthError::UnknownCredential(_)
                | AuthError::UnknownKeyIndex { .. }
                | AuthError::InvalidHex(_)
                | AuthError::InvalidVerifyKey(_)
                | AuthError::ChallengeNotFound
                | AuthError::Identity(IdentityError::NotLinked)
        )
    }

    /// Transient errors may succeed on retry and never mean "not verified".
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AuthError::Provider(_)
                | AuthError::Store(_)
                | AuthError::Identity(IdentityError::Lookup(_))
        )
    }
}

/// Result type alias using AuthError
pub type AuthResult<T> = Result<T, AuthError>;
