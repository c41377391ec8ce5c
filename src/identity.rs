//! Boundary traits for the external collaborators
//!
//! The core consumes on-chain account data through [`AccountInfoProvider`]
//! and hands verified addresses to the surrounding system through
//! [`IdentityLinker`]. Neither side's mechanics (node client, session and
//! user storage) live in this crate.

use async_trait::async_trait;

use crate::error::{IdentityError, ProviderError};
use crate::models::AccountInfo;

/// Supplies authoritative chain state for an account.
///
/// Implementations talk to a node and must be timeout-bound; a timeout or
/// transport fault surfaces as [`ProviderError`], never as a verification
/// result.
#[async_trait]
pub trait AccountInfoProvider: Send + Sync {
    async fn fetch(&self, account_address: &str) -> Result<AccountInfo, ProviderError>;
}

/// Local user resolved for a verified account address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedUser {
    pub user_id: i64,
}

/// Resolves a verified account address to a local user identity.
///
/// Invoked only after signature verification succeeded. Establishing the
/// session for the returned user is the caller's concern.
#[async_trait]
pub trait IdentityLinker: Send + Sync {
    async fn link(&self, account_address: &str) -> Result<LinkedUser, IdentityError>;
}
